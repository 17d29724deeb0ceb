//! Grid-space vectors, boxes, and the four cardinal directions.
//!
//! The generator works in integer cell coordinates (z up) and switches to
//! `f64` only for room centres, separation math, and triangulation. North is
//! -Y, South +Y, East +X, West -X.

use std::ops::{Add, Mul, Neg, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IVec2 {
    pub x: i32,
    pub y: i32,
}

impl IVec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IVec3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl IVec3 {
    pub const ZERO: IVec3 = IVec3::new(0, 0, 0);
    pub const UP: IVec3 = IVec3::new(0, 0, 1);
    pub const DOWN: IVec3 = IVec3::new(0, 0, -1);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn manhattan(self, other: IVec3) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl Add for IVec3 {
    type Output = IVec3;
    fn add(self, rhs: IVec3) -> IVec3 {
        IVec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for IVec3 {
    type Output = IVec3;
    fn sub(self, rhs: IVec3) -> IVec3 {
        IVec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<i32> for IVec3 {
    type Output = IVec3;
    fn mul(self, rhs: i32) -> IVec3 {
        IVec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for IVec3 {
    type Output = IVec3;
    fn neg(self) -> IVec3 {
        IVec3::new(-self.x, -self.y, -self.z)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn distance(self, other: Vec3) -> f64 {
        (self - other).length()
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn xy(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Axis-aligned integer box, half-open on every axis: `[min, max)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Box3 {
    pub min: IVec3,
    pub max: IVec3,
}

impl Box3 {
    pub const fn new(min: IVec3, max: IVec3) -> Self {
        Self { min, max }
    }

    pub fn intersects(&self, other: &Box3) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
            && self.min.z < other.max.z
            && other.min.z < self.max.z
    }

    /// Grows the box by `margin` cells on both horizontal axes.
    pub fn expanded_horizontally(&self, margin: i32) -> Box3 {
        Box3::new(
            IVec3::new(self.min.x - margin, self.min.y - margin, self.min.z),
            IVec3::new(self.max.x + margin, self.max.y + margin, self.max.z),
        )
    }

    pub fn contains(&self, point: IVec3) -> bool {
        point.x >= self.min.x
            && point.x < self.max.x
            && point.y >= self.min.y
            && point.y < self.max.y
            && point.z >= self.min.z
            && point.z < self.max.z
    }

    pub fn union(&self, other: &Box3) -> Box3 {
        Box3::new(
            IVec3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            IVec3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        )
    }

    pub fn size(&self) -> IVec3 {
        self.max - self.min
    }
}

/// One of the four horizontal cardinal directions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    #[default]
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    pub fn inverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub fn rotate_clockwise(self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub fn is_north_south(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }

    pub fn unit_vector(self) -> IVec3 {
        match self {
            Direction::North => IVec3::new(0, -1, 0),
            Direction::East => IVec3::new(1, 0, 0),
            Direction::South => IVec3::new(0, 1, 0),
            Direction::West => IVec3::new(-1, 0, 0),
        }
    }

    pub fn yaw_degrees(self) -> f32 {
        match self {
            Direction::North => 0.0,
            Direction::East => 90.0,
            Direction::South => 180.0,
            Direction::West => 270.0,
        }
    }

    /// Dominant-axis direction of a horizontal offset. X wins ties so that a
    /// zero offset never occurs in practice (callers pass distinct centres).
    pub fn from_delta(dx: f64, dy: f64) -> Direction {
        if dx.abs() >= dy.abs() {
            if dx >= 0.0 { Direction::East } else { Direction::West }
        } else if dy >= 0.0 {
            Direction::South
        } else {
            Direction::North
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_inverse_and_rotation_cycle() {
        for direction in Direction::ALL {
            assert_eq!(direction.inverse().inverse(), direction);
            assert_eq!(
                direction
                    .rotate_clockwise()
                    .rotate_clockwise()
                    .rotate_clockwise()
                    .rotate_clockwise(),
                direction
            );
            assert_eq!(direction.rotate_clockwise().rotate_clockwise(), direction.inverse());
        }
    }

    #[test]
    fn direction_axes_follow_grid_convention() {
        assert_eq!(Direction::North.unit_vector(), IVec3::new(0, -1, 0));
        assert_eq!(Direction::East.unit_vector(), IVec3::new(1, 0, 0));
        assert!(Direction::North.is_north_south());
        assert!(!Direction::East.is_north_south());
        assert_eq!(Direction::South.yaw_degrees(), 180.0);
    }

    #[test]
    fn from_delta_picks_dominant_axis() {
        assert_eq!(Direction::from_delta(3.0, 1.0), Direction::East);
        assert_eq!(Direction::from_delta(-3.0, 1.0), Direction::West);
        assert_eq!(Direction::from_delta(1.0, -4.0), Direction::North);
        assert_eq!(Direction::from_delta(0.5, 4.0), Direction::South);
    }

    #[test]
    fn box_intersection_is_half_open() {
        let a = Box3::new(IVec3::ZERO, IVec3::new(3, 3, 1));
        let touching = Box3::new(IVec3::new(3, 0, 0), IVec3::new(6, 3, 1));
        let overlapping = Box3::new(IVec3::new(2, 2, 0), IVec3::new(4, 4, 1));
        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
        assert!(a.expanded_horizontally(1).intersects(&touching));
    }

    #[test]
    fn box_contains_excludes_max_corner() {
        let b = Box3::new(IVec3::ZERO, IVec3::new(2, 2, 2));
        assert!(b.contains(IVec3::new(1, 1, 1)));
        assert!(!b.contains(IVec3::new(2, 1, 1)));
    }
}
