//! The generation pipeline and the query surface over its results.
//!
//! `generate` runs every phase to completion (or to the first failing phase)
//! synchronously; the outcome is read back through `last_error` and the
//! accessors. A generator owns all of its state and shares nothing, so
//! callers may run several generators in parallel, one per thread.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use slotmap::SlotMap;

use crate::aisle::Aisle;
use crate::canvas::{Canvas, Rgb};
use crate::cell::{Cell, CellKind, Props};
use crate::error::GenerateError;
use crate::geometry::{Direction, IVec3};
use crate::mst::{self, Edge};
use crate::params::GenerateParameter;
use crate::point::{RoomId, RoomPoint};
use crate::random::Random;
use crate::room::{Room, RoomItem, RoomParts};
use crate::triangulation;
use crate::voxel::Voxel;

/// Locator callback invoked once per room before voxelisation. It may pin a
/// room's parts or override its size; it must not call back into the
/// generator.
pub type QueryPartsHandler = Box<dyn FnMut(&mut Room)>;

/// Observer sink notified at fixed pipeline points. Sinks see finished data
/// and cannot mutate generator state.
#[derive(Default)]
pub struct GenerationEvents {
    on_room: Option<Box<dyn FnMut(&Room)>>,
    on_aisle: Option<Box<dyn FnMut(&Aisle)>>,
    on_cell: Option<Box<dyn FnMut(IVec3, &Cell)>>,
}

impl GenerationEvents {
    pub fn on_room(mut self, handler: impl FnMut(&Room) + 'static) -> Self {
        self.on_room = Some(Box::new(handler));
        self
    }

    pub fn on_aisle(mut self, handler: impl FnMut(&Aisle) + 'static) -> Self {
        self.on_aisle = Some(Box::new(handler));
        self
    }

    pub fn on_cell(mut self, handler: impl FnMut(IVec3, &Cell) + 'static) -> Self {
        self.on_cell = Some(Box::new(handler));
        self
    }

    fn emit_room(&mut self, room: &Room) {
        if let Some(handler) = &mut self.on_room {
            handler(room);
        }
    }

    fn emit_aisle(&mut self, aisle: &Aisle) {
        if let Some(handler) = &mut self.on_aisle {
            handler(aisle);
        }
    }

    fn emit_cell(&mut self, location: IVec3, cell: &Cell) {
        if let Some(handler) = &mut self.on_cell {
            handler(location, cell);
        }
    }
}

pub struct Generator {
    parameter: GenerateParameter,
    random: Random,
    voxel: Voxel,
    rooms: SlotMap<RoomId, Room>,
    room_order: Vec<RoomId>,
    aisles: Vec<Aisle>,
    floor_heights: Vec<i32>,
    start_room: Option<RoomId>,
    goal_room: Option<RoomId>,
    start_point: RoomPoint,
    goal_point: RoomPoint,
    leaf_points: Vec<RoomPoint>,
    deepest_depth: u8,
    last_error: GenerateError,
    query_parts: Option<QueryPartsHandler>,
    events: GenerationEvents,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Self {
            parameter: GenerateParameter::default(),
            random: Random::new(0),
            voxel: Voxel::new(0, 0, 0),
            rooms: SlotMap::with_key(),
            room_order: Vec::new(),
            aisles: Vec::new(),
            floor_heights: Vec::new(),
            start_room: None,
            goal_room: None,
            start_point: RoomPoint::default(),
            goal_point: RoomPoint::default(),
            leaf_points: Vec::new(),
            deepest_depth: 0,
            last_error: GenerateError::Success,
            query_parts: None,
            events: GenerationEvents::default(),
        }
    }

    /// Registers the locator callback consulted once per room in phase 5.
    pub fn on_query_parts(&mut self, handler: impl FnMut(&mut Room) + 'static) {
        self.query_parts = Some(Box::new(handler));
    }

    pub fn set_events(&mut self, events: GenerationEvents) {
        self.events = events;
    }

    /// Runs the whole pipeline. The outcome is read via `last_error`; on any
    /// failure the partial state is left in place for diagnostics only.
    pub fn generate(&mut self, parameter: &GenerateParameter) {
        self.reset();
        let mut parameter = parameter.validated();
        parameter.random_seed = resolve_seed(parameter.random_seed);
        self.random = Random::new(parameter.random_seed);
        self.parameter = parameter;

        if let Err(error) = self.generate_impl() {
            self.last_error = error;
        }
    }

    fn generate_impl(&mut self) -> Result<(), GenerateError> {
        self.generate_rooms();
        self.separate_rooms()?;
        self.remove_invalid_rooms();
        self.expand_space();
        self.query_parts_pass();
        self.detect_floor_height();
        let edges = self.extract_aisles()?;
        self.generate_voxel();
        self.generate_aisles(&edges)?;
        self.resolve_routes()
    }

    fn reset(&mut self) {
        self.voxel = Voxel::new(0, 0, 0);
        self.rooms.clear();
        self.room_order.clear();
        self.aisles.clear();
        self.floor_heights.clear();
        self.start_room = None;
        self.goal_room = None;
        self.start_point = RoomPoint::default();
        self.goal_point = RoomPoint::default();
        self.leaf_points.clear();
        self.deepest_depth = 0;
        self.last_error = GenerateError::Success;
    }

    // ------------------------------------------------------------------
    // Phase 1: candidate rooms
    // ------------------------------------------------------------------

    fn generate_rooms(&mut self) {
        let count = self.parameter.number_of_candidate_rooms as usize;
        let spread = self.parameter.average_room_extent() * (count as f64).sqrt() * 0.5;
        let spacing = self.parameter.floor_spacing();

        for index in 0..count {
            let center_x = self.random.gauss(0.0, spread);
            let center_y = self.random.gauss(0.0, spread);
            let width = self.random.int_in(
                self.parameter.min_room_width as i32,
                self.parameter.max_room_width as i32,
            ) as u32;
            let depth = self.random.int_in(
                self.parameter.min_room_depth as i32,
                self.parameter.max_room_depth as i32,
            ) as u32;
            let height = self.random.int_in(
                self.parameter.min_room_height as i32,
                self.parameter.max_room_height as i32,
            ) as u32;
            let floor =
                self.random.int_in(0, self.parameter.number_of_candidate_floors as i32 - 1);

            let x = (center_x - width as f64 / 2.0).round() as i32;
            let y = (center_y - depth as f64 / 2.0).round() as i32;
            let z = floor * spacing;

            let room = Room::new((index + 1) as u16, x, y, z, width, depth, height);
            let id = self.rooms.insert(room);
            self.room_order.push(id);
        }
    }

    // ------------------------------------------------------------------
    // Phase 2: separation
    // ------------------------------------------------------------------

    fn separate_rooms(&mut self) -> Result<(), GenerateError> {
        let margin = self.parameter.horizontal_room_margin as i32;
        let limit = self.parameter.separation_iteration_limit;

        for _ in 0..limit {
            let mut overlaps = 0usize;
            for first in 0..self.room_order.len() {
                for second in (first + 1)..self.room_order.len() {
                    let id_a = self.room_order[first];
                    let id_b = self.room_order[second];
                    let Some((push_a, push_b)) =
                        separation_push(&self.rooms[id_a], &self.rooms[id_b], margin)
                    else {
                        continue;
                    };
                    overlaps += 1;
                    self.rooms[id_a].translate(push_a.x, push_a.y, 0);
                    self.rooms[id_b].translate(push_b.x, push_b.y, 0);
                }
            }
            if overlaps == 0 {
                return Ok(());
            }
        }

        // The cap ran out; accept the layout only if the last pass happened
        // to resolve everything.
        for first in 0..self.room_order.len() {
            for second in (first + 1)..self.room_order.len() {
                let a = &self.rooms[self.room_order[first]];
                let b = &self.rooms[self.room_order[second]];
                if separation_push(a, b, margin).is_some() {
                    return Err(GenerateError::SeparateRoomsFailed);
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Phases 3-6: cleanup, normalisation, locator callback, floors
    // ------------------------------------------------------------------

    fn remove_invalid_rooms(&mut self) {
        let min_width = self.parameter.min_room_width;
        let min_depth = self.parameter.min_room_depth;
        let rooms = &self.rooms;
        self.room_order
            .retain(|&id| rooms[id].width() >= min_width && rooms[id].depth() >= min_depth);
        let keep: BTreeSet<RoomId> = self.room_order.iter().copied().collect();
        self.rooms.retain(|id, _| keep.contains(&id));
    }

    fn expand_space(&mut self) {
        let Some(&first) = self.room_order.first() else {
            return;
        };
        let mut min = IVec3::new(
            self.rooms[first].min_x(),
            self.rooms[first].min_y(),
            self.rooms[first].min_z(),
        );
        for &id in &self.room_order {
            let room = &self.rooms[id];
            min.x = min.x.min(room.min_x());
            min.y = min.y.min(room.min_y());
            min.z = min.z.min(room.min_z());
        }
        // One-cell margin on the low faces; the high-face margin is added
        // when the voxel is sized.
        for &id in &self.room_order {
            self.rooms[id].translate(1 - min.x, 1 - min.y, -min.z);
        }
    }

    fn query_parts_pass(&mut self) {
        let Some(handler) = &mut self.query_parts else {
            return;
        };
        for &id in &self.room_order {
            handler(&mut self.rooms[id]);
        }
    }

    fn detect_floor_height(&mut self) {
        let heights: BTreeSet<i32> =
            self.room_order.iter().map(|&id| self.rooms[id].min_z()).collect();
        self.floor_heights = heights.into_iter().collect();
    }

    // ------------------------------------------------------------------
    // Phase 7: triangulation + spanning tree
    // ------------------------------------------------------------------

    fn extract_aisles(&mut self) -> Result<Vec<Edge>, GenerateError> {
        if self.room_order.len() < 2 {
            return Ok(Vec::new());
        }
        let centers: Vec<_> =
            self.room_order.iter().map(|&id| self.rooms[id].center()).collect();
        let edges = triangulation::triangulate(&centers)?;
        Ok(mst::minimum_spanning_tree(
            &centers,
            &edges,
            &mut self.random,
            mst::EXTRA_EDGE_PROBABILITY,
        ))
    }

    // ------------------------------------------------------------------
    // Phase 8: voxelisation
    // ------------------------------------------------------------------

    fn generate_voxel(&mut self) {
        let mut max = IVec3::ZERO;
        for &id in &self.room_order {
            let room = &self.rooms[id];
            max.x = max.x.max(room.max_x());
            max.y = max.y.max(room.max_y());
            max.z = max.z.max(room.max_z());
        }
        self.voxel = Voxel::new((max.x + 1) as u32, (max.y + 1) as u32, (max.z + 1) as u32);

        for &id in &self.room_order {
            let room = &self.rooms[id];
            let identifier = room.identifier();
            for y in room.min_y()..room.max_y() {
                for x in room.min_x()..room.max_x() {
                    let mut floor = Cell::new(CellKind::Floor, identifier, Direction::North);
                    if room.no_floor_mesh_generation() {
                        floor.set_flag(Cell::NO_FLOOR_MESH);
                    }
                    self.voxel.set(IVec3::new(x, y, room.min_z()), floor);

                    // The top layer of a tall room is its walkable roof deck.
                    if room.height() >= 2 {
                        let mut deck = Cell::new(CellKind::Deck, identifier, Direction::North);
                        if room.no_roof_mesh_generation() {
                            deck.set_flag(Cell::NO_ROOF_MESH);
                        }
                        self.voxel.set(IVec3::new(x, y, room.max_z() - 1), deck);
                    }
                }
            }
            self.events.emit_room(room);
        }
    }

    // ------------------------------------------------------------------
    // Phase 9: corridor carving
    // ------------------------------------------------------------------

    fn generate_aisles(&mut self, edges: &[Edge]) -> Result<(), GenerateError> {
        for (index, edge) in edges.iter().enumerate() {
            let identifier = (index + 1) as u16;
            let id_a = self.room_order[edge.a];
            let id_b = self.room_order[edge.b];
            let aisle = self.connect_rooms(id_a, id_b, identifier, edge.spanning)?;
            self.events.emit_aisle(&aisle);
            self.aisles.push(aisle);
        }
        Ok(())
    }

    fn connect_rooms(
        &mut self,
        id_a: RoomId,
        id_b: RoomId,
        identifier: u16,
        spanning: bool,
    ) -> Result<Aisle, GenerateError> {
        let (gate_a, outside_a, direction_a) = self.select_gate(id_a, id_b)?;
        self.stamp_gate(gate_a, self.rooms[id_a].identifier(), direction_a);

        // Abutting rooms: the cell in front of the gate already belongs to
        // the partner room, so the doorway is a facing gate pair with no
        // corridor between.
        let facing = self.voxel.get(outside_a);
        if facing.is_room_kind() && facing.identifier() == self.rooms[id_b].identifier() {
            self.stamp_gate(outside_a, self.rooms[id_b].identifier(), direction_a.inverse());
            let aisle = Aisle::new(
                identifier,
                RoomPoint::new(gate_a, Some(id_a)),
                RoomPoint::new(outside_a, Some(id_b)),
                spanning,
            );
            return Ok(aisle);
        }

        let (gate_b, outside_b, direction_b) = self.select_gate(id_b, id_a)?;
        self.stamp_gate(gate_b, self.rooms[id_b].identifier(), direction_b);

        let path = self.voxel.carve_aisle(outside_a, outside_b, identifier)?;
        self.stamp_catwalks(&path);
        for &location in &path {
            let cell = self.voxel.get(location);
            self.events.emit_cell(location, &cell);
        }

        let mut aisle = Aisle::new(
            identifier,
            RoomPoint::new(gate_a, Some(id_a)),
            RoomPoint::new(gate_b, Some(id_b)),
            spanning,
        );
        aisle.set_path(path);
        Ok(aisle)
    }

    /// Picks a boundary cell of `from` that can open toward `to`: the facing
    /// side is tried first, then the flanks, then the far side. A room whose
    /// every candidate is blocked by foreign room interior has no usable
    /// gate.
    fn select_gate(
        &self,
        from: RoomId,
        to: RoomId,
    ) -> Result<(IVec3, IVec3, Direction), GenerateError> {
        let from_room = &self.rooms[from];
        let to_room = &self.rooms[to];
        let from_center = from_room.center();
        let to_center = to_room.center();

        let primary =
            Direction::from_delta(to_center.x - from_center.x, to_center.y - from_center.y);
        let tries = [
            primary,
            primary.rotate_clockwise(),
            primary.rotate_clockwise().inverse(),
            primary.inverse(),
        ];

        for direction in tries {
            for gate in boundary_cells(from_room, direction, to_center.x, to_center.y) {
                let gate_cell = self.voxel.get(gate);
                let gate_usable = match gate_cell.kind() {
                    CellKind::Floor => gate_cell.identifier() == from_room.identifier(),
                    CellKind::Gate => {
                        gate_cell.identifier() == from_room.identifier()
                            && gate_cell.direction() == direction
                    }
                    _ => false,
                };
                if !gate_usable {
                    continue;
                }

                let outside = gate + direction.unit_vector();
                let outside_cell = self.voxel.get(outside);
                let outside_usable = match outside_cell.kind() {
                    CellKind::Empty | CellKind::Aisle => true,
                    CellKind::Floor | CellKind::Deck | CellKind::Gate => {
                        outside_cell.identifier() == to_room.identifier()
                    }
                    _ => false,
                };
                if outside_usable {
                    return Ok((gate, outside, direction));
                }
            }
        }
        Err(GenerateError::GateSearchFailed)
    }

    fn stamp_gate(&mut self, location: IVec3, identifier: u16, direction: Direction) {
        let existing = self.voxel.get(location);
        if existing.kind() == CellKind::Gate {
            return;
        }
        self.voxel.set(location, Cell::new(CellKind::Gate, identifier, direction));
    }

    /// Corridor cells running through a room's upper volume are catwalks.
    fn stamp_catwalks(&mut self, path: &[IVec3]) {
        for &location in path {
            let over_room = self.room_order.iter().any(|&id| {
                let room = &self.rooms[id];
                room.contains(location) && location.z > room.min_z()
            });
            if over_room {
                self.voxel.update(location, |cell| cell.set_flag(Cell::CATWALK));
            }
        }
    }

    // ------------------------------------------------------------------
    // Phase 10: start, goal, depths, branches, leaves
    // ------------------------------------------------------------------

    fn resolve_routes(&mut self) -> Result<(), GenerateError> {
        let Some(start_room) = self.pick_start_room() else {
            return Ok(());
        };
        self.start_room = Some(start_room);

        if self.aisles.is_empty() {
            // Single-room dungeon: start and goal collapse onto its floor.
            let room = &self.rooms[start_room];
            let center = room.ground_center();
            let point = IVec3::new(center.x as i32, center.y as i32, room.min_z());
            self.start_point = RoomPoint::new(point, Some(start_room));
            self.goal_point = self.start_point;
            self.goal_room = Some(start_room);
            self.apply_parts_defaults();
            return Ok(());
        }

        let adjacency = self.adjacency(false);
        let spanning_adjacency = self.adjacency(true);

        // Depth labelling over the full aisle graph.
        let depths = breadth_first_depths(&adjacency, start_room);
        let mut deepest = 0u8;
        for (&id, &depth) in &depths {
            self.rooms[id].set_depth_from_start(depth);
            deepest = deepest.max(depth);
        }
        self.deepest_depth = deepest;

        // Goal: the deepest spanning-tree leaf.
        let goal_room = self.pick_goal_room(&spanning_adjacency, &depths, start_room);
        self.goal_room = Some(goal_room);

        // Main route start -> goal over the full graph.
        let route_aisles = shortest_route_aisles(&adjacency, start_room, goal_room);
        for &aisle_index in &route_aisles {
            self.aisles[aisle_index].set_main_route(true);
            let cells: Vec<IVec3> = self.aisles[aisle_index].path().to_vec();
            for location in cells {
                self.voxel.update(location, |cell| cell.set_flag(Cell::MAIN_ROUTE));
            }
            for endpoint in 0..2 {
                let location = self.aisles[aisle_index].point(endpoint).point();
                self.voxel.update(location, |cell| cell.set_flag(Cell::MAIN_ROUTE));
            }
        }

        self.start_point = self
            .gate_point(&route_aisles, start_room)
            .unwrap_or_else(|| self.any_gate_point(start_room));
        self.goal_point = self
            .gate_point(&route_aisles, goal_room)
            .unwrap_or_else(|| self.any_gate_point(goal_room));

        if !self.rooms[goal_room].contains(self.goal_point.point()) {
            return Err(GenerateError::GoalPointIsOutsideGoalRange);
        }

        // Branch ids on the spanning-tree projection only; the re-added loop
        // edges would make the walk revisit vertices forever.
        let branches = assign_branches(&spanning_adjacency, start_room);
        for (id, branch) in branches {
            self.rooms[id].set_branch_id(branch);
        }

        self.collect_leaf_points(&spanning_adjacency, start_room, goal_room);
        self.apply_parts_defaults();
        self.place_locks_and_keys(&route_aisles, goal_room, start_room);
        Ok(())
    }

    fn pick_start_room(&self) -> Option<RoomId> {
        self.room_order
            .iter()
            .copied()
            .find(|&id| self.rooms[id].parts() == RoomParts::Start)
            .or_else(|| self.room_order.first().copied())
    }

    fn pick_goal_room(
        &self,
        spanning_adjacency: &AdjacencyMap,
        depths: &BTreeMap<RoomId, u8>,
        start_room: RoomId,
    ) -> RoomId {
        let mut best: Option<(u8, u16, RoomId)> = None;
        for &id in &self.room_order {
            if id == start_room {
                continue;
            }
            let degree = spanning_adjacency.get(&id).map_or(0, Vec::len);
            if degree != 1 {
                continue;
            }
            let Some(&depth) = depths.get(&id) else {
                continue;
            };
            let identifier = self.rooms[id].identifier();
            let better = match best {
                None => true,
                Some((best_depth, best_identifier, _)) => {
                    depth > best_depth || (depth == best_depth && identifier < best_identifier)
                }
            };
            if better {
                best = Some((depth, identifier, id));
            }
        }
        best.map(|(_, _, id)| id).unwrap_or(start_room)
    }

    fn gate_point(&self, route_aisles: &[usize], room: RoomId) -> Option<RoomPoint> {
        route_aisles
            .iter()
            .filter_map(|&index| self.aisles[index].point_at(room))
            .next()
            .copied()
    }

    fn any_gate_point(&self, room: RoomId) -> RoomPoint {
        self.aisles
            .iter()
            .filter_map(|aisle| aisle.point_at(room))
            .next()
            .copied()
            .unwrap_or_else(|| {
                let center = self.rooms[room].ground_center();
                RoomPoint::new(
                    IVec3::new(center.x as i32, center.y as i32, self.rooms[room].min_z()),
                    Some(room),
                )
            })
    }

    fn collect_leaf_points(
        &mut self,
        spanning_adjacency: &AdjacencyMap,
        start_room: RoomId,
        goal_room: RoomId,
    ) {
        for &id in &self.room_order {
            if id == start_room || id == goal_room {
                continue;
            }
            let Some(edges) = spanning_adjacency.get(&id) else {
                continue;
            };
            if edges.len() != 1 {
                continue;
            }
            let (aisle_index, _) = edges[0];
            if let Some(point) = self.aisles[aisle_index].point_at(id) {
                self.leaf_points.push(*point);
            }
        }
    }

    /// Rooms the locator left as `Any` get a role from the finished graph.
    fn apply_parts_defaults(&mut self) {
        let spanning_adjacency = self.adjacency(true);
        for &id in &self.room_order {
            if self.rooms[id].parts() != RoomParts::Any {
                continue;
            }
            let degree = spanning_adjacency.get(&id).map_or(0, Vec::len);
            let parts = if Some(id) == self.start_room {
                RoomParts::Start
            } else if Some(id) == self.goal_room {
                RoomParts::End
            } else if degree == 1 {
                RoomParts::Hanare
            } else if degree >= 3 {
                RoomParts::Hall
            } else {
                RoomParts::Any
            };
            self.rooms[id].set_parts(parts);
        }
    }

    /// The last main-route door is uniquely locked; the matching key sits in
    /// the deepest dead end off the main route.
    fn place_locks_and_keys(
        &mut self,
        route_aisles: &[usize],
        goal_room: RoomId,
        start_room: RoomId,
    ) {
        let Some(&goal_aisle) = route_aisles
            .iter()
            .find(|&&index| self.aisles[index].connects(goal_room))
        else {
            return;
        };
        self.aisles[goal_aisle].set_unique_locked(true);
        for endpoint in 0..2 {
            let location = self.aisles[goal_aisle].point(endpoint).point();
            self.voxel.update(location, |cell| cell.set_props(Props::UniqueLock));
        }

        let key_room = self
            .room_order
            .iter()
            .copied()
            .filter(|&id| {
                id != start_room && id != goal_room && self.rooms[id].parts() == RoomParts::Hanare
            })
            .max_by_key(|&id| {
                (self.rooms[id].depth_from_start(), u16::MAX - self.rooms[id].identifier())
            });
        if let Some(id) = key_room {
            self.rooms[id].set_item(RoomItem::UniqueKey);
        }
    }

    fn adjacency(&self, spanning_only: bool) -> AdjacencyMap {
        let mut adjacency: AdjacencyMap = BTreeMap::new();
        for (index, aisle) in self.aisles.iter().enumerate() {
            if spanning_only && !aisle.spanning() {
                continue;
            }
            let (Some(room_a), Some(room_b)) =
                (aisle.point(0).room(), aisle.point(1).room())
            else {
                continue;
            };
            adjacency.entry(room_a).or_default().push((index, room_b));
            adjacency.entry(room_b).or_default().push((index, room_a));
        }
        adjacency
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn last_error(&self) -> GenerateError {
        self.last_error
    }

    /// Parameters as actually used, including the resolved nonzero seed.
    pub fn parameter(&self) -> &GenerateParameter {
        &self.parameter
    }

    pub fn effective_seed(&self) -> u32 {
        self.parameter.random_seed
    }

    pub fn voxel(&self) -> &Voxel {
        &self.voxel
    }

    pub fn room_count(&self) -> usize {
        self.room_order.len()
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.room_order.iter().map(|&id| &self.rooms[id])
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn aisles(&self) -> &[Aisle] {
        &self.aisles
    }

    pub fn each_aisle(&self, mut visit: impl FnMut(&Aisle)) {
        for aisle in &self.aisles {
            visit(aisle);
        }
    }

    /// Visits the aisles touching `room` until `visit` returns false.
    pub fn find_aisle(&self, room: RoomId, mut visit: impl FnMut(&Aisle) -> bool) {
        for aisle in &self.aisles {
            if aisle.connects(room) && !visit(aisle) {
                return;
            }
        }
    }

    pub fn start_room(&self) -> Option<RoomId> {
        self.start_room
    }

    pub fn goal_room(&self) -> Option<RoomId> {
        self.goal_room
    }

    pub fn start_point(&self) -> &RoomPoint {
        &self.start_point
    }

    pub fn goal_point(&self) -> &RoomPoint {
        &self.goal_point
    }

    pub fn each_leaf_point(&self, mut visit: impl FnMut(&RoomPoint)) {
        for point in &self.leaf_points {
            visit(point);
        }
    }

    pub fn leaf_point_count(&self) -> usize {
        self.leaf_points.len()
    }

    pub fn deepest_depth_from_start(&self) -> u8 {
        self.deepest_depth
    }

    /// First room containing `point`, in generation order.
    pub fn find_room_at(&self, point: IVec3) -> Option<&Room> {
        self.room_order
            .iter()
            .map(|&id| &self.rooms[id])
            .find(|room| room.contains(point))
    }

    pub fn find_all_rooms_at(&self, point: IVec3) -> Vec<&Room> {
        self.room_order
            .iter()
            .map(|&id| &self.rooms[id])
            .filter(|room| room.contains(point))
            .collect()
    }

    pub fn find_by_depth(&self, depth: u8) -> Vec<&Room> {
        self.rooms().filter(|room| room.depth_from_start() == depth).collect()
    }

    pub fn find_by_branch(&self, branch_id: u8) -> Vec<&Room> {
        self.rooms().filter(|room| room.branch_id() == branch_id).collect()
    }

    /// Rooms reachable from `start_room` through the aisle graph, in
    /// breadth-first order (the room itself first).
    pub fn find_by_route(&self, start_room: RoomId) -> Vec<&Room> {
        if !self.rooms.contains_key(start_room) {
            return Vec::new();
        }
        let adjacency = self.adjacency(false);
        let order = breadth_first_depths(&adjacency, start_room);
        let mut reachable: Vec<(u8, u16, RoomId)> = order
            .iter()
            .map(|(&id, &depth)| (depth, self.rooms[id].identifier(), id))
            .collect();
        reachable.sort_unstable();
        reachable.into_iter().map(|(_, _, id)| &self.rooms[id]).collect()
    }

    pub fn floor_heights(&self) -> &[i32] {
        &self.floor_heights
    }

    /// Index of the floor containing height `z`: the largest `i` with
    /// `floor_heights[i] <= z`, or 0 when `z` lies below every floor.
    pub fn find_floor(&self, z: i32) -> usize {
        self.floor_heights.iter().rposition(|&height| height <= z).unwrap_or(0)
    }

    // ------------------------------------------------------------------
    // Debug dumps
    // ------------------------------------------------------------------

    /// Writes the room graph as PlantUML.
    pub fn dump_room_diagram(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "@startuml")?;
        for room in self.rooms() {
            let identifier = room.identifier();
            writeln!(writer, "rectangle \"room_{identifier}\" as R{identifier}")?;
        }
        for aisle in &self.aisles {
            let (Some(room_a), Some(room_b)) = (aisle.point(0).room(), aisle.point(1).room())
            else {
                continue;
            };
            writeln!(
                writer,
                "R{} -- R{}",
                self.rooms[room_a].identifier(),
                self.rooms[room_b].identifier()
            )?;
        }
        writeln!(writer, "@enduml")?;
        writer.flush()
    }

    /// Writes one line per aisle: endpoints, path length, and flags.
    pub fn dump_aisle(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for aisle in &self.aisles {
            let describe = |index: usize| {
                aisle
                    .point(index)
                    .room()
                    .and_then(|id| self.rooms.get(id))
                    .map_or(0, Room::identifier)
            };
            writeln!(
                writer,
                "aisle_{}: room_{} -- room_{} cells={} spanning={} main={} locked={}",
                aisle.identifier(),
                describe(0),
                describe(1),
                aisle.path().len(),
                aisle.spanning(),
                aisle.main_route(),
                aisle.unique_locked(),
            )?;
        }
        writer.flush()
    }

    /// Writes a plan-view BMP of rooms, corridors, and gates.
    pub fn dump_room_image(&self, path: &Path) -> io::Result<()> {
        const SCALE: i32 = 4;
        let width = (self.voxel.width() as i32).max(1) * SCALE;
        let depth = (self.voxel.depth() as i32).max(1) * SCALE;
        let mut canvas = Canvas::new(width as u32, depth as u32);

        for aisle in &self.aisles {
            for &location in aisle.path() {
                let kind = self.voxel.get(location).kind();
                canvas.rectangle(
                    location.x * SCALE,
                    location.y * SCALE,
                    (location.x + 1) * SCALE,
                    (location.y + 1) * SCALE,
                    kind.color(),
                );
            }
        }
        for room in self.rooms() {
            canvas.rectangle(
                room.min_x() * SCALE,
                room.min_y() * SCALE,
                room.max_x() * SCALE,
                room.max_y() * SCALE,
                CellKind::Floor.color(),
            );
            canvas.frame(
                room.min_x() * SCALE,
                room.min_y() * SCALE,
                room.max_x() * SCALE,
                room.max_y() * SCALE,
                Rgb::WHITE,
            );
        }
        for aisle in &self.aisles {
            for endpoint in 0..2 {
                let location = aisle.point(endpoint).point();
                canvas.rectangle(
                    location.x * SCALE,
                    location.y * SCALE,
                    (location.x + 1) * SCALE,
                    (location.y + 1) * SCALE,
                    CellKind::Gate.color(),
                );
            }
        }
        canvas.write(path)
    }
}

type AdjacencyMap = BTreeMap<RoomId, Vec<(usize, RoomId)>>;

fn resolve_seed(seed: u32) -> u32 {
    if seed != 0 {
        return seed;
    }
    let clock = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(1);
    let folded = (clock as u32) ^ ((clock >> 32) as u32);
    folded.max(1)
}

/// Overlap test plus the push resolving it: half the smaller overlap, applied
/// to both rooms in opposite directions. `None` when the pair is clear.
fn separation_push(a: &Room, b: &Room, margin: i32) -> Option<(IVec3, IVec3)> {
    if a.min_z() >= b.max_z() || b.min_z() >= a.max_z() {
        return None;
    }
    let overlap_x = (a.max_x() + margin).min(b.max_x()) - (a.min_x() - margin).max(b.min_x());
    let overlap_y = (a.max_y() + margin).min(b.max_y()) - (a.min_y() - margin).max(b.min_y());
    if overlap_x <= 0 || overlap_y <= 0 {
        return None;
    }

    if overlap_x <= overlap_y {
        let push = (overlap_x + 1) / 2;
        let a_left = a.min_x() * 2 + a.width() as i32 <= b.min_x() * 2 + b.width() as i32;
        let sign = if a_left { -1 } else { 1 };
        Some((IVec3::new(sign * push, 0, 0), IVec3::new(-sign * push, 0, 0)))
    } else {
        let push = (overlap_y + 1) / 2;
        let a_front = a.min_y() * 2 + a.depth() as i32 <= b.min_y() * 2 + b.depth() as i32;
        let sign = if a_front { -1 } else { 1 };
        Some((IVec3::new(0, sign * push, 0), IVec3::new(0, -sign * push, 0)))
    }
}

/// Candidate gate cells along one side of a room's floor layer, nearest to
/// the partner room's centre first.
fn boundary_cells(room: &Room, direction: Direction, target_x: f64, target_y: f64) -> Vec<IVec3> {
    let z = room.min_z();
    let mut cells: Vec<IVec3> = match direction {
        Direction::East => {
            (room.min_y()..room.max_y()).map(|y| IVec3::new(room.max_x() - 1, y, z)).collect()
        }
        Direction::West => {
            (room.min_y()..room.max_y()).map(|y| IVec3::new(room.min_x(), y, z)).collect()
        }
        Direction::South => {
            (room.min_x()..room.max_x()).map(|x| IVec3::new(x, room.max_y() - 1, z)).collect()
        }
        Direction::North => {
            (room.min_x()..room.max_x()).map(|x| IVec3::new(x, room.min_y(), z)).collect()
        }
    };
    cells.sort_by_key(|cell| {
        let distance = if direction.is_north_south() {
            (cell.x as f64 + 0.5 - target_x).abs()
        } else {
            (cell.y as f64 + 0.5 - target_y).abs()
        };
        ((distance * 16.0) as i64, cell.x, cell.y)
    });
    cells
}

fn breadth_first_depths(adjacency: &AdjacencyMap, start: RoomId) -> BTreeMap<RoomId, u8> {
    let mut depths = BTreeMap::new();
    depths.insert(start, 0u8);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        let depth = depths[&current];
        let Some(edges) = adjacency.get(&current) else {
            continue;
        };
        for &(_, next) in edges {
            if depths.contains_key(&next) {
                continue;
            }
            depths.insert(next, depth.saturating_add(1));
            queue.push_back(next);
        }
    }
    depths
}

/// Aisle indices of one shortest start-to-goal route.
fn shortest_route_aisles(adjacency: &AdjacencyMap, start: RoomId, goal: RoomId) -> Vec<usize> {
    let mut parents: BTreeMap<RoomId, (RoomId, usize)> = BTreeMap::new();
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        if current == goal {
            break;
        }
        let Some(edges) = adjacency.get(&current) else {
            continue;
        };
        for &(aisle_index, next) in edges {
            if seen.insert(next) {
                parents.insert(next, (current, aisle_index));
                queue.push_back(next);
            }
        }
    }

    let mut route = Vec::new();
    let mut cursor = goal;
    while cursor != start {
        let Some(&(previous, aisle_index)) = parents.get(&cursor) else {
            return Vec::new();
        };
        route.push(aisle_index);
        cursor = previous;
    }
    route.reverse();
    route
}

/// Branch labelling on the spanning tree: a depth-first walk that bumps the
/// label every time it takes another branch out of an already-visited fork.
fn assign_branches(adjacency: &AdjacencyMap, start: RoomId) -> BTreeMap<RoomId, u8> {
    let mut branches = BTreeMap::new();
    let mut counter = 0u8;
    branch_walk(adjacency, start, &mut counter, &mut branches);
    branches
}

fn branch_walk(
    adjacency: &AdjacencyMap,
    room: RoomId,
    counter: &mut u8,
    branches: &mut BTreeMap<RoomId, u8>,
) {
    branches.insert(room, *counter);
    let Some(edges) = adjacency.get(&room) else {
        return;
    };
    let mut descended = false;
    for &(_, next) in edges {
        if branches.contains_key(&next) {
            continue;
        }
        if descended {
            *counter = counter.saturating_add(1);
        }
        branch_walk(adjacency, next, counter, branches);
        descended = true;
    }
}
