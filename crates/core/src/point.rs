//! Grid points that remember which room they came from.
//!
//! The room back-reference is an arena key, never shared ownership: the
//! `Generator` owns every `Room`, and a `RoomPoint` dangles harmlessly (the
//! lookup returns `None`) if its room is ever removed.

use slotmap::new_key_type;

use crate::geometry::IVec3;

new_key_type! {
    /// Key into the generator's room arena.
    pub struct RoomId;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RoomPoint {
    point: IVec3,
    room: Option<RoomId>,
}

impl RoomPoint {
    pub fn new(point: IVec3, room: Option<RoomId>) -> Self {
        Self { point, room }
    }

    pub fn point(&self) -> IVec3 {
        self.point
    }

    pub fn room(&self) -> Option<RoomId> {
        self.room
    }
}

/// Equality is by coordinates only; the room back-reference is bookkeeping,
/// not identity.
impl PartialEq for RoomPoint {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}

impl Eq for RoomPoint {}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    #[test]
    fn equality_ignores_the_room_reference() {
        let mut arena: SlotMap<RoomId, ()> = SlotMap::with_key();
        let id = arena.insert(());
        let with_room = RoomPoint::new(IVec3::new(1, 2, 3), Some(id));
        let without = RoomPoint::new(IVec3::new(1, 2, 3), None);
        let elsewhere = RoomPoint::new(IVec3::new(1, 2, 4), Some(id));
        assert_eq!(with_room, without);
        assert_ne!(with_room, elsewhere);
    }
}
