//! Aisles: graph edges joining two rooms through their gates.

use crate::geometry::IVec3;
use crate::point::{RoomId, RoomPoint};

#[derive(Clone, Debug)]
pub struct Aisle {
    identifier: u16,
    points: [RoomPoint; 2],
    unique_locked: bool,
    main_route: bool,
    spanning: bool,
    path: Vec<IVec3>,
}

impl Aisle {
    pub fn new(identifier: u16, a: RoomPoint, b: RoomPoint, spanning: bool) -> Self {
        Self {
            identifier,
            points: [a, b],
            unique_locked: false,
            main_route: false,
            spanning,
            path: Vec::new(),
        }
    }

    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    pub fn point(&self, index: usize) -> &RoomPoint {
        &self.points[index]
    }

    /// The endpoint anchored in `room`, if either is.
    pub fn point_at(&self, room: RoomId) -> Option<&RoomPoint> {
        self.points.iter().find(|point| point.room() == Some(room))
    }

    pub fn connects(&self, room: RoomId) -> bool {
        self.points.iter().any(|point| point.room() == Some(room))
    }

    pub fn other_room(&self, room: RoomId) -> Option<RoomId> {
        let [a, b] = &self.points;
        match (a.room(), b.room()) {
            (Some(first), other) if first == room => other,
            (other, Some(second)) if second == room => other,
            _ => None,
        }
    }

    pub fn unique_locked(&self) -> bool {
        self.unique_locked
    }

    pub(crate) fn set_unique_locked(&mut self, locked: bool) {
        self.unique_locked = locked;
    }

    pub fn main_route(&self) -> bool {
        self.main_route
    }

    pub(crate) fn set_main_route(&mut self, main_route: bool) {
        self.main_route = main_route;
    }

    /// Whether this edge belongs to the spanning tree (as opposed to one of
    /// the re-added loop edges). Branch labelling and leaf detection only
    /// look at spanning edges.
    pub fn spanning(&self) -> bool {
        self.spanning
    }

    /// Cells the corridor router carved for this edge, gate to gate.
    pub fn path(&self) -> &[IVec3] {
        &self.path
    }

    pub(crate) fn set_path(&mut self, path: Vec<IVec3>) {
        self.path = path;
    }
}
