//! Generation parameters and their JSON dump for seed reproduction.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateParameter {
    /// 32-bit seed; 0 means "pick one from the wall clock". The effective
    /// seed is written back after generation so a run can be replayed.
    pub random_seed: u32,
    /// Number of distinct z-levels candidate rooms are sampled onto.
    pub number_of_candidate_floors: u8,
    pub number_of_candidate_rooms: u16,
    pub min_room_width: u32,
    pub max_room_width: u32,
    pub min_room_depth: u32,
    pub max_room_depth: u32,
    pub min_room_height: u32,
    pub max_room_height: u32,
    /// Cells kept free between room footprints during separation.
    pub horizontal_room_margin: u32,
    /// Cells between sampled floor levels.
    pub vertical_room_margin: u32,
    /// Abutting same-height rooms skip the dividing wall when set.
    pub merge_rooms: bool,
    /// Hard cap on separation passes before giving up on the seed.
    pub separation_iteration_limit: u32,
}

impl Default for GenerateParameter {
    fn default() -> Self {
        Self {
            random_seed: 0,
            number_of_candidate_floors: 3,
            number_of_candidate_rooms: 20,
            min_room_width: 3,
            max_room_width: 9,
            min_room_depth: 3,
            max_room_depth: 9,
            min_room_height: 2,
            max_room_height: 3,
            horizontal_room_margin: 1,
            vertical_room_margin: 2,
            merge_rooms: false,
            separation_iteration_limit: 256,
        }
    }
}

impl GenerateParameter {
    /// Copy with every range put in order and every count made workable.
    /// Callers get a dungeon out of sloppy input instead of a panic.
    pub fn validated(&self) -> GenerateParameter {
        let mut parameter = self.clone();
        parameter.number_of_candidate_floors = parameter.number_of_candidate_floors.max(1);
        parameter.number_of_candidate_rooms = parameter.number_of_candidate_rooms.max(1);
        parameter.min_room_width = parameter.min_room_width.max(1);
        parameter.min_room_depth = parameter.min_room_depth.max(1);
        parameter.min_room_height = parameter.min_room_height.max(1);
        parameter.max_room_width = parameter.max_room_width.max(parameter.min_room_width);
        parameter.max_room_depth = parameter.max_room_depth.max(parameter.min_room_depth);
        parameter.max_room_height = parameter.max_room_height.max(parameter.min_room_height);
        parameter.separation_iteration_limit = parameter.separation_iteration_limit.max(1);
        parameter
    }

    /// Mean of the sampled horizontal extents, used to scale the Gaussian
    /// spread of candidate room centres.
    pub(crate) fn average_room_extent(&self) -> f64 {
        let width = (self.min_room_width + self.max_room_width) as f64 / 2.0;
        let depth = (self.min_room_depth + self.max_room_depth) as f64 / 2.0;
        (width + depth) / 2.0
    }

    /// Vertical distance between candidate floor levels.
    pub(crate) fn floor_spacing(&self) -> i32 {
        (self.max_room_height + self.vertical_room_margin) as i32
    }

    /// Writes the effective parameters as pretty JSON, for attaching to bug
    /// reports alongside the dumped diagrams.
    pub fn dump_to_json(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn validation_orders_ranges_and_floors_counts() {
        let parameter = GenerateParameter {
            number_of_candidate_floors: 0,
            min_room_width: 9,
            max_room_width: 4,
            min_room_height: 0,
            ..GenerateParameter::default()
        };
        let validated = parameter.validated();
        assert_eq!(validated.number_of_candidate_floors, 1);
        assert_eq!(validated.max_room_width, 9);
        assert_eq!(validated.min_room_height, 1);
    }

    #[test]
    fn floor_spacing_leaves_the_vertical_margin() {
        let parameter = GenerateParameter {
            max_room_height: 3,
            vertical_room_margin: 2,
            ..GenerateParameter::default()
        };
        assert_eq!(parameter.floor_spacing(), 5);
    }

    #[test]
    fn json_dump_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parameter.json");

        let parameter =
            GenerateParameter { random_seed: 77, merge_rooms: true, ..GenerateParameter::default() };
        parameter.dump_to_json(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let loaded: GenerateParameter = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded, parameter);
    }
}
