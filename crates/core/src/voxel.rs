//! The voxel: a dense 3D grid of cells, plus the A* corridor router that
//! carves aisles and slopes through it.
//!
//! Reads outside the bounds return a synthetic OutOfBounds cell; such a cell
//! is never stored. Indexing is row-major in (x, y, z) with z vertical.

use std::collections::{BTreeMap, BTreeSet};

use crate::cell::{Cell, CellKind};
use crate::error::GenerateError;
use crate::geometry::{Direction, IVec3};

/// Traversal cost of one slope segment; a horizontal step costs 1.
pub const SLOPE_COST: u32 = 3;

pub struct Voxel {
    width: u32,
    depth: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Voxel {
    pub fn new(width: u32, depth: u32, height: u32) -> Self {
        Self { width, depth, height, cells: vec![Cell::empty(); (width * depth * height) as usize] }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, location: IVec3) -> bool {
        location.x >= 0
            && location.y >= 0
            && location.z >= 0
            && (location.x as u32) < self.width
            && (location.y as u32) < self.depth
            && (location.z as u32) < self.height
    }

    fn index(&self, location: IVec3) -> usize {
        ((location.z as u32 * self.depth + location.y as u32) * self.width + location.x as u32)
            as usize
    }

    pub fn get(&self, location: IVec3) -> Cell {
        if !self.contains(location) {
            return Cell::out_of_bounds();
        }
        self.cells[self.index(location)]
    }

    /// Bounds-checked write; returns whether the cell was stored.
    pub fn set(&mut self, location: IVec3, cell: Cell) -> bool {
        debug_assert!(cell.kind() != CellKind::OutOfBounds);
        if !self.contains(location) {
            return false;
        }
        let index = self.index(location);
        self.cells[index] = cell;
        true
    }

    pub(crate) fn update(&mut self, location: IVec3, apply: impl FnOnce(&mut Cell)) -> bool {
        if !self.contains(location) {
            return false;
        }
        let index = self.index(location);
        apply(&mut self.cells[index]);
        true
    }

    /// Visits every cell in storage order until `visit` returns false.
    pub fn each(&self, mut visit: impl FnMut(IVec3, &Cell) -> bool) {
        for z in 0..self.height as i32 {
            for y in 0..self.depth as i32 {
                for x in 0..self.width as i32 {
                    let location = IVec3::new(x, y, z);
                    if !visit(location, &self.cells[self.index(location)]) {
                        return;
                    }
                }
            }
        }
    }

    /// Byte-stable serialisation of the whole grid, for determinism checks
    /// and snapshot comparison.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(12 + self.cells.len() * 6);
        bytes.extend(self.width.to_le_bytes());
        bytes.extend(self.depth.to_le_bytes());
        bytes.extend(self.height.to_le_bytes());
        for cell in &self.cells {
            bytes.push(cell.kind() as u8);
            bytes.extend(cell.identifier().to_le_bytes());
            bytes.push(cell.direction() as u8);
            bytes.push(cell.props() as u8);
            bytes.push(cell.flags());
        }
        bytes
    }

    // ------------------------------------------------------------------
    // Corridor routing
    // ------------------------------------------------------------------

    /// Routes and carves one aisle from `start` to `goal`, both cells just
    /// outside their room gates. Returns every cell the corridor now
    /// occupies, in travel order.
    pub fn carve_aisle(
        &mut self,
        start: IVec3,
        goal: IVec3,
        identifier: u16,
    ) -> Result<Vec<IVec3>, GenerateError> {
        if !self.contains(goal) || self.get(goal).is_room_kind() {
            return Err(GenerateError::GoalPointIsOutsideGoalRange);
        }
        if !self.contains(start) || !self.walkable(start) {
            return Err(GenerateError::RouteSearchFailed);
        }
        if start == goal {
            self.carve_walk_cell(start, identifier);
            return Ok(vec![start]);
        }

        let mut open_set = BTreeSet::new();
        let mut g_score = BTreeMap::new();
        let mut came_from: BTreeMap<IVec3, (IVec3, Step)> = BTreeMap::new();

        let h = start.manhattan(goal);
        open_set.insert(OpenNode { f: h, h, z: start.z, y: start.y, x: start.x });
        g_score.insert(start, 0u32);

        while let Some(current) = open_set.pop_first() {
            let position = IVec3::new(current.x, current.y, current.z);
            if position == goal {
                return Ok(self.carve_route(start, goal, identifier, &came_from));
            }
            let current_g = *g_score.get(&position).unwrap_or(&u32::MAX);

            for (next, cost, step) in self.successors(position, goal) {
                let tentative = current_g + cost;
                if tentative < *g_score.get(&next).unwrap_or(&u32::MAX) {
                    came_from.insert(next, (position, step));
                    g_score.insert(next, tentative);
                    let h = next.manhattan(goal);
                    open_set.insert(OpenNode {
                        f: tentative + h,
                        h,
                        z: next.z,
                        y: next.y,
                        x: next.x,
                    });
                }
            }
        }

        Err(GenerateError::RouteSearchFailed)
    }

    fn successors(&self, position: IVec3, goal: IVec3) -> Vec<(IVec3, u32, Step)> {
        let mut moves = Vec::with_capacity(12);
        for direction in Direction::ALL {
            let unit = direction.unit_vector();
            let ahead = position + unit;

            if self.walkable(ahead) || ahead == goal {
                let cost = if self.get(ahead).is_aisle_kind() { 0 } else { 1 };
                moves.push((ahead, cost, Step::Walk));
            }

            // Ascending slope segment: lower step on the entered cell, upper
            // step one further along and one level up. The walker exits on
            // the upper step.
            let upper = position + unit * 2 + IVec3::UP;
            if self.slope_cell_free(ahead, direction) && self.slope_cell_free(upper, direction) {
                moves.push((upper, SLOPE_COST, Step::SlopeUp(direction)));
            }

            // Descending segment: same staircase walked the other way, so the
            // carved cells keep the ascent direction.
            let lower = position + unit * 2 + IVec3::DOWN;
            let ascent = direction.inverse();
            if self.slope_cell_free(ahead, ascent) && self.slope_cell_free(lower, ascent) {
                moves.push((lower, SLOPE_COST, Step::SlopeDown(direction)));
            }
        }
        moves
    }

    fn walkable(&self, location: IVec3) -> bool {
        matches!(self.get(location).kind(), CellKind::Empty | CellKind::Aisle)
    }

    /// A cell a slope step may occupy: empty, or an already carved slope in
    /// the same ascent direction (reuse). Anything else, including room
    /// interiors, blocks the segment.
    fn slope_cell_free(&self, location: IVec3, ascent: Direction) -> bool {
        if !self.contains(location) {
            return false;
        }
        let cell = self.get(location);
        match cell.kind() {
            CellKind::Empty => true,
            CellKind::Slope => cell.direction() == ascent,
            _ => false,
        }
    }

    fn carve_route(
        &mut self,
        start: IVec3,
        goal: IVec3,
        identifier: u16,
        came_from: &BTreeMap<IVec3, (IVec3, Step)>,
    ) -> Vec<IVec3> {
        let mut nodes = vec![(goal, Step::Walk)];
        let mut cursor = goal;
        while cursor != start {
            let (previous, step) = came_from[&cursor];
            nodes.last_mut().expect("route has at least the goal node").1 = step;
            nodes.push((previous, Step::Walk));
            cursor = previous;
        }
        nodes.reverse();

        let mut carved = Vec::with_capacity(nodes.len() + 4);
        let (first, _) = nodes[0];
        self.carve_walk_cell(first, identifier);
        carved.push(first);

        for window in nodes.windows(2) {
            let (previous, _) = window[0];
            let (node, step) = window[1];
            match step {
                Step::Walk => {
                    self.carve_walk_cell(node, identifier);
                    carved.push(node);
                }
                Step::SlopeUp(direction) => {
                    let lower = previous + direction.unit_vector();
                    self.carve_slope_cell(lower, direction, identifier);
                    self.carve_slope_cell(node, direction, identifier);
                    carved.push(lower);
                    carved.push(node);
                }
                Step::SlopeDown(direction) => {
                    let upper = previous + direction.unit_vector();
                    let ascent = direction.inverse();
                    self.carve_slope_cell(upper, ascent, identifier);
                    self.carve_slope_cell(node, ascent, identifier);
                    carved.push(upper);
                    carved.push(node);
                }
            }
        }
        carved
    }

    fn carve_walk_cell(&mut self, location: IVec3, identifier: u16) {
        if self.get(location).kind() == CellKind::Empty {
            self.set(location, Cell::new(CellKind::Aisle, identifier, Direction::North));
        }
    }

    fn carve_slope_cell(&mut self, location: IVec3, ascent: Direction, identifier: u16) {
        let existing = self.get(location);
        // A cell this same corridor already claimed as Aisle still becomes a
        // slope step; the segment owns both of its cells.
        if existing.kind() == CellKind::Empty
            || (existing.kind() == CellKind::Aisle && existing.identifier() == identifier)
        {
            self.set(location, Cell::new(CellKind::Slope, identifier, ascent));
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    z: i32,
    y: i32,
    x: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Step {
    Walk,
    SlopeUp(Direction),
    SlopeDown(Direction),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_are_synthetic_and_unwritable() {
        let mut voxel = Voxel::new(4, 4, 2);
        assert_eq!(voxel.get(IVec3::new(-1, 0, 0)).kind(), CellKind::OutOfBounds);
        assert_eq!(voxel.get(IVec3::new(0, 0, 2)).kind(), CellKind::OutOfBounds);
        assert!(!voxel.set(IVec3::new(4, 0, 0), Cell::empty()));
        assert!(voxel.set(IVec3::new(3, 3, 1), Cell::new(CellKind::Floor, 1, Direction::North)));
    }

    #[test]
    fn each_visits_every_cell_until_stopped() {
        let voxel = Voxel::new(3, 2, 2);
        let mut visited = 0;
        voxel.each(|_, _| {
            visited += 1;
            true
        });
        assert_eq!(visited, 12);

        let mut limited = 0;
        voxel.each(|_, _| {
            limited += 1;
            limited < 5
        });
        assert_eq!(limited, 5);
    }

    #[test]
    fn straight_corridor_carves_aisle_cells() {
        let mut voxel = Voxel::new(9, 3, 2);
        let path = voxel.carve_aisle(IVec3::new(1, 1, 0), IVec3::new(7, 1, 0), 4).unwrap();

        assert_eq!(path.len(), 7);
        for x in 1..=7 {
            let cell = voxel.get(IVec3::new(x, 1, 0));
            assert_eq!(cell.kind(), CellKind::Aisle);
            assert_eq!(cell.identifier(), 4);
        }
    }

    #[test]
    fn vertical_transition_carves_a_paired_slope() {
        let mut voxel = Voxel::new(12, 3, 4);
        voxel.carve_aisle(IVec3::new(1, 1, 0), IVec3::new(10, 1, 1), 2).unwrap();

        let mut slopes = Vec::new();
        voxel.each(|location, cell| {
            if cell.kind() == CellKind::Slope {
                slopes.push((location, cell.direction()));
            }
            true
        });
        assert_eq!(slopes.len(), 2, "one segment: {slopes:?}");

        // The lower step's pair sits one ahead and one up, same direction.
        let (lower, direction) = slopes[0];
        let upper = lower + direction.unit_vector() + IVec3::UP;
        assert!(slopes.contains(&(upper, direction)), "unpaired slopes: {slopes:?}");
        assert_eq!(voxel.get(IVec3::new(10, 1, 1)).kind(), CellKind::Aisle);
    }

    #[test]
    fn descending_route_keeps_the_ascent_direction() {
        let mut voxel = Voxel::new(12, 3, 4);
        voxel.carve_aisle(IVec3::new(1, 1, 1), IVec3::new(10, 1, 0), 2).unwrap();

        let mut slopes = Vec::new();
        voxel.each(|location, cell| {
            if cell.kind() == CellKind::Slope {
                slopes.push((location, cell.direction()));
            }
            true
        });
        assert_eq!(slopes.len(), 2);
        // Travelling east downhill, the staircase ascends west.
        assert!(slopes.iter().all(|&(_, direction)| direction == Direction::West));
        let (lower, direction) =
            *slopes.iter().min_by_key(|(location, _)| location.z).unwrap();
        assert!(slopes.contains(&(lower + direction.unit_vector() + IVec3::UP, direction)));
    }

    #[test]
    fn existing_corridors_are_reused_not_overwritten() {
        let mut voxel = Voxel::new(9, 3, 2);
        voxel.carve_aisle(IVec3::new(1, 1, 0), IVec3::new(7, 1, 0), 1).unwrap();
        voxel.carve_aisle(IVec3::new(1, 1, 0), IVec3::new(7, 1, 0), 2).unwrap();

        for x in 1..=7 {
            assert_eq!(voxel.get(IVec3::new(x, 1, 0)).identifier(), 1);
        }
    }

    #[test]
    fn goal_inside_a_room_is_rejected() {
        let mut voxel = Voxel::new(6, 3, 2);
        voxel.set(IVec3::new(4, 1, 0), Cell::new(CellKind::Floor, 9, Direction::North));
        let result = voxel.carve_aisle(IVec3::new(0, 1, 0), IVec3::new(4, 1, 0), 1);
        assert_eq!(result, Err(GenerateError::GoalPointIsOutsideGoalRange));

        let outside = voxel.carve_aisle(IVec3::new(0, 1, 0), IVec3::new(6, 1, 0), 1);
        assert_eq!(outside, Err(GenerateError::GoalPointIsOutsideGoalRange));
    }

    #[test]
    fn blocked_route_reports_search_failure() {
        let mut voxel = Voxel::new(5, 3, 1);
        for y in 0..3 {
            voxel.set(IVec3::new(2, y, 0), Cell::new(CellKind::Floor, 9, Direction::North));
        }
        // Height 1 leaves no room to climb over the blocking room.
        let result = voxel.carve_aisle(IVec3::new(0, 1, 0), IVec3::new(4, 1, 0), 1);
        assert_eq!(result, Err(GenerateError::RouteSearchFailed));
    }

    #[test]
    fn canonical_bytes_react_to_any_cell_change() {
        let mut voxel = Voxel::new(3, 3, 2);
        let before = voxel.canonical_bytes();
        voxel.set(IVec3::new(1, 1, 1), Cell::new(CellKind::Aisle, 3, Direction::East));
        let after = voxel.canonical_bytes();
        assert_ne!(before, after);
        assert_eq!(after.len(), before.len());
        assert_eq!(after, voxel.canonical_bytes());
    }
}
