//! Rooms: integer boxes in grid space plus routing metadata.

use crate::geometry::{Box3, IVec3, Vec3};

/// Structural role a room plays in the dungeon. `Any` means "not decided";
/// the locator callback may pin a role before voxelisation, and the pipeline
/// fills in the rest after routing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoomParts {
    Start,
    End,
    /// Dead-end side room hanging off the main structure.
    Hanare,
    /// Junction room with three or more corridors.
    Hall,
    #[default]
    Any,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoomItem {
    #[default]
    Empty,
    Key,
    UniqueKey,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    identifier: u16,
    x: i32,
    y: i32,
    z: i32,
    width: u32,
    depth: u32,
    height: u32,
    parts: RoomParts,
    item: RoomItem,
    branch_id: u8,
    depth_from_start: u8,
    no_floor_mesh_generation: bool,
    no_roof_mesh_generation: bool,
}

impl Room {
    pub fn new(identifier: u16, x: i32, y: i32, z: i32, width: u32, depth: u32, height: u32) -> Self {
        debug_assert!(identifier > 0);
        debug_assert!(width >= 1 && depth >= 1 && height >= 1);
        Self {
            identifier,
            x,
            y,
            z,
            width,
            depth,
            height,
            parts: RoomParts::Any,
            item: RoomItem::Empty,
            branch_id: 0,
            depth_from_start: 0,
            no_floor_mesh_generation: false,
            no_roof_mesh_generation: false,
        }
    }

    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    pub fn min_x(&self) -> i32 {
        self.x
    }

    pub fn min_y(&self) -> i32 {
        self.y
    }

    pub fn min_z(&self) -> i32 {
        self.z
    }

    pub fn max_x(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn max_y(&self) -> i32 {
        self.y + self.depth as i32
    }

    pub fn max_z(&self) -> i32 {
        self.z + self.height as i32
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

    pub fn to_box3(&self) -> Box3 {
        Box3::new(IVec3::new(self.x, self.y, self.z), IVec3::new(self.max_x(), self.max_y(), self.max_z()))
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.depth as f64 / 2.0,
            self.z as f64 + self.height as f64 / 2.0,
        )
    }

    /// Centre of the walkable floor layer.
    pub fn ground_center(&self) -> Vec3 {
        Vec3::new(
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.depth as f64 / 2.0,
            self.z as f64,
        )
    }

    pub fn extent(&self) -> Vec3 {
        Vec3::new(self.width as f64 / 2.0, self.depth as f64 / 2.0, self.height as f64 / 2.0)
    }

    pub fn contains(&self, point: IVec3) -> bool {
        self.to_box3().contains(point)
    }

    /// Overlap test with `margin` extra cells required between footprints.
    pub fn intersects_with_margin(&self, other: &Room, margin: i32) -> bool {
        self.to_box3().expanded_horizontally(margin).intersects(&other.to_box3())
    }

    pub fn translate(&mut self, dx: i32, dy: i32, dz: i32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// One-shot size override from the locator callback; position keeps the
    /// min corner so the room stays inside the expanded space.
    pub fn set_size(&mut self, width: u32, depth: u32, height: u32) {
        debug_assert!(width >= 1 && depth >= 1 && height >= 1);
        self.width = width;
        self.depth = depth;
        self.height = height;
    }

    pub fn parts(&self) -> RoomParts {
        self.parts
    }

    pub fn set_parts(&mut self, parts: RoomParts) {
        self.parts = parts;
    }

    pub fn item(&self) -> RoomItem {
        self.item
    }

    pub fn set_item(&mut self, item: RoomItem) {
        self.item = item;
    }

    pub fn branch_id(&self) -> u8 {
        self.branch_id
    }

    pub(crate) fn set_branch_id(&mut self, branch_id: u8) {
        self.branch_id = branch_id;
    }

    pub fn depth_from_start(&self) -> u8 {
        self.depth_from_start
    }

    pub(crate) fn set_depth_from_start(&mut self, depth: u8) {
        self.depth_from_start = depth;
    }

    pub fn no_floor_mesh_generation(&self) -> bool {
        self.no_floor_mesh_generation
    }

    pub fn no_roof_mesh_generation(&self) -> bool {
        self.no_roof_mesh_generation
    }

    pub fn set_no_mesh_generation(&mut self, no_roof: bool, no_floor: bool) {
        self.no_roof_mesh_generation = no_roof;
        self.no_floor_mesh_generation = no_floor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_edges_are_half_open() {
        let room = Room::new(1, 2, 3, 0, 4, 5, 2);
        assert_eq!(room.max_x(), 6);
        assert_eq!(room.max_y(), 8);
        assert_eq!(room.max_z(), 2);
        assert!(room.contains(IVec3::new(5, 7, 1)));
        assert!(!room.contains(IVec3::new(6, 7, 1)));
    }

    #[test]
    fn margin_counts_as_overlap() {
        let a = Room::new(1, 0, 0, 0, 3, 3, 2);
        let mut b = Room::new(2, 3, 0, 0, 3, 3, 2);
        assert!(!a.intersects_with_margin(&b, 0));
        assert!(a.intersects_with_margin(&b, 1));
        b.translate(0, 0, 5);
        assert!(!a.intersects_with_margin(&b, 1));
    }

    #[test]
    fn center_sits_mid_box() {
        let room = Room::new(1, 0, 0, 0, 3, 3, 2);
        assert_eq!(room.center(), Vec3::new(1.5, 1.5, 1.0));
        assert_eq!(room.ground_center().z, 0.0);
    }
}
