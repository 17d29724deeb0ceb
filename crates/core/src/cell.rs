//! Voxel cell classification and the adjacency predicates that decide where
//! floors, walls, roofs, gates, and pillars get built.
//!
//! A predicate is a pure function of two cells (self and one neighbour) plus,
//! for walls and gates, the direction from self to the neighbour. Downstream
//! mesh placement asks these questions for every cell/side pair; nothing here
//! mutates the grid.

use crate::canvas::Rgb;
use crate::geometry::Direction;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CellKind {
    Floor,
    Deck,
    Gate,
    Aisle,
    Slope,
    Atrium,
    #[default]
    Empty,
    OutOfBounds,
}

impl CellKind {
    pub fn name(self) -> &'static str {
        match self {
            CellKind::Floor => "Floor",
            CellKind::Deck => "Deck",
            CellKind::Gate => "Gate",
            CellKind::Aisle => "Aisle",
            CellKind::Slope => "Slope",
            CellKind::Atrium => "Atrium",
            CellKind::Empty => "Empty",
            CellKind::OutOfBounds => "OutOfBounds",
        }
    }

    /// Stable minimap colour mapping. Empty and OutOfBounds intentionally
    /// share black.
    pub fn color(self) -> Rgb {
        match self {
            CellKind::Floor => Rgb::new(0, 0, 255),
            CellKind::Deck => Rgb::new(255, 255, 0),
            CellKind::Gate => Rgb::new(255, 0, 0),
            CellKind::Aisle => Rgb::new(0, 255, 0),
            CellKind::Slope => Rgb::new(255, 0, 255),
            CellKind::Atrium => Rgb::new(0, 255, 255),
            CellKind::Empty | CellKind::OutOfBounds => Rgb::BLACK,
        }
    }
}

/// Prop placed on a gate cell when the aisle behind it is locked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Props {
    #[default]
    None,
    Lock,
    UniqueLock,
}

impl Props {
    pub fn name(self) -> &'static str {
        match self {
            Props::None => "None",
            Props::Lock => "Lock",
            Props::UniqueLock => "UniqueLock",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    kind: CellKind,
    identifier: u16,
    direction: Direction,
    props: Props,
    flags: u8,
}

impl Cell {
    pub const NO_FLOOR_MESH: u8 = 1 << 0;
    pub const NO_ROOF_MESH: u8 = 1 << 1;
    pub const MAIN_ROUTE: u8 = 1 << 2;
    pub const CATWALK: u8 = 1 << 3;

    pub const fn empty() -> Cell {
        Cell {
            kind: CellKind::Empty,
            identifier: 0,
            direction: Direction::North,
            props: Props::None,
            flags: 0,
        }
    }

    /// Synthetic cell returned for reads outside the voxel; never stored.
    pub const fn out_of_bounds() -> Cell {
        Cell {
            kind: CellKind::OutOfBounds,
            identifier: 0,
            direction: Direction::North,
            props: Props::None,
            flags: 0,
        }
    }

    pub fn new(kind: CellKind, identifier: u16, direction: Direction) -> Cell {
        Cell { kind, identifier, direction, props: Props::None, flags: 0 }
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn props(&self) -> Props {
        self.props
    }

    pub fn set_props(&mut self, props: Props) {
        self.props = props;
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn has_flag(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    pub fn set_flag(&mut self, flag: u8) {
        self.flags |= flag;
    }

    // ------------------------------------------------------------------
    // Kind groups
    // ------------------------------------------------------------------

    pub fn is_room_kind(&self) -> bool {
        matches!(self.kind, CellKind::Floor | CellKind::Deck | CellKind::Gate)
    }

    pub fn is_room_kind_without_gate(&self) -> bool {
        matches!(self.kind, CellKind::Floor | CellKind::Deck)
    }

    pub fn is_gate_kind(&self) -> bool {
        self.kind == CellKind::Gate
    }

    pub fn is_aisle_kind(&self) -> bool {
        self.kind == CellKind::Aisle
    }

    pub fn is_slope_kind(&self) -> bool {
        matches!(self.kind, CellKind::Slope | CellKind::Atrium)
    }

    pub fn is_spatial_kind(&self) -> bool {
        matches!(self.kind, CellKind::Empty | CellKind::OutOfBounds)
    }

    pub fn is_horizontally_passable(&self) -> bool {
        self.is_room_kind() || self.is_aisle_kind() || self.is_slope_kind()
    }

    /// Aisles are deliberately absent here: a corridor cell does not carry
    /// vertical traffic, only slopes and room volumes do.
    pub fn is_vertically_passable(&self) -> bool {
        self.is_room_kind() || self.is_slope_kind()
    }

    // ------------------------------------------------------------------
    // Build predicates
    // ------------------------------------------------------------------

    /// Is there a walkable floor face between this cell and `below`?
    pub fn can_build_floor(&self, below: &Cell, check_mesh_suppression: bool) -> bool {
        if check_mesh_suppression && self.has_flag(Cell::NO_FLOOR_MESH) {
            return false;
        }
        if self.is_room_kind() {
            return below.identifier != self.identifier
                || below.is_aisle_kind()
                || below.is_slope_kind()
                || below.is_spatial_kind();
        }
        if self.is_aisle_kind() {
            // Room identifiers live in a different namespace, so a numeric
            // match with a room cell below still builds the floor.
            return below.identifier != self.identifier
                || below.is_room_kind()
                || below.is_aisle_kind()
                || below.is_slope_kind()
                || below.is_spatial_kind();
        }
        false
    }

    pub fn can_build_slope(&self) -> bool {
        self.kind == CellKind::Slope
    }

    /// Is there a roof face between this cell and `above`?
    pub fn can_build_roof(&self, above: &Cell, check_mesh_suppression: bool) -> bool {
        if check_mesh_suppression && self.has_flag(Cell::NO_ROOF_MESH) {
            return false;
        }
        if self.is_room_kind() {
            return matches!(above.kind, CellKind::Deck | CellKind::Gate)
                || above.is_aisle_kind()
                || above.is_slope_kind()
                || above.is_spatial_kind();
        }
        if self.is_aisle_kind() {
            return above.is_room_kind()
                || above.is_aisle_kind()
                || above.is_slope_kind()
                || above.is_spatial_kind();
        }
        if self.is_slope_kind() {
            return above.is_room_kind()
                || above.is_aisle_kind()
                || above.kind == CellKind::Slope
                || above.is_spatial_kind();
        }
        false
    }

    /// Is there a wall between this cell and the neighbour in `direction`?
    pub fn can_build_wall(
        &self,
        neighbor: &Cell,
        direction: Direction,
        merge_rooms: bool,
    ) -> bool {
        // Adjacent rooms keep a dividing wall unless the caller merges them.
        if !merge_rooms
            && self.is_room_kind_without_gate()
            && neighbor.is_room_kind_without_gate()
        {
            return self.identifier != neighbor.identifier;
        }

        match self.kind {
            CellKind::Gate => {
                if neighbor.is_room_kind() || neighbor.is_slope_kind() {
                    return self.identifier != neighbor.identifier
                        && self.direction.is_north_south() != direction.is_north_south();
                }
                neighbor.is_spatial_kind()
            }
            CellKind::Floor | CellKind::Deck => {
                neighbor.is_aisle_kind() || neighbor.is_slope_kind() || neighbor.is_spatial_kind()
            }
            CellKind::Aisle => {
                if neighbor.is_aisle_kind() || neighbor.is_slope_kind() {
                    return neighbor.identifier != self.identifier;
                }
                neighbor.is_room_kind_without_gate() || neighbor.is_spatial_kind()
            }
            CellKind::Slope | CellKind::Atrium => {
                if neighbor.is_slope_kind() {
                    return neighbor.direction.is_north_south() != direction.is_north_south()
                        || neighbor.identifier != self.identifier;
                }
                neighbor.is_spatial_kind()
            }
            CellKind::Empty | CellKind::OutOfBounds => false,
        }
    }

    /// Minimap wall rule. Differs from `can_build_wall` in exactly one case:
    /// a room cell next to a slope draws no wall, so staircases visually
    /// connect rooms on the map. Kept as its own function on purpose.
    pub fn can_build_wall_for_minimap(
        &self,
        neighbor: &Cell,
        direction: Direction,
        merge_rooms: bool,
    ) -> bool {
        if self.is_room_kind_without_gate() && neighbor.is_slope_kind() {
            return false;
        }
        self.can_build_wall(neighbor, direction, merge_rooms)
    }

    /// Does the neighbour's presence call for a corner pillar?
    pub fn can_build_pillar(&self, neighbor: &Cell) -> bool {
        neighbor.is_horizontally_passable()
            && !matches!(neighbor.kind, CellKind::Empty | CellKind::Atrium | CellKind::Slope)
    }

    /// Is there a doorway between this gate and the neighbour in `direction`?
    pub fn can_build_gate(&self, neighbor: &Cell, direction: Direction) -> bool {
        if self.kind != CellKind::Gate {
            return false;
        }
        if neighbor.kind == CellKind::Gate {
            // Two gates facing each other with no corridor between them
            // build a single door on the side away from the goal.
            return self.direction == neighbor.direction
                && self.direction.inverse() == direction;
        }
        if neighbor.is_slope_kind() {
            return self.direction.is_north_south() == neighbor.direction.is_north_south()
                && self.direction.is_north_south() == direction.is_north_south();
        }
        neighbor.is_aisle_kind()
    }
}
