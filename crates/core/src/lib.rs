pub mod aisle;
pub mod canvas;
pub mod cell;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod minimap;
pub mod mst;
pub mod params;
pub mod point;
pub mod random;
pub mod room;
pub mod triangulation;
pub mod voxel;

pub use aisle::Aisle;
pub use canvas::{Canvas, Rgb};
pub use cell::{Cell, CellKind, Props};
pub use error::GenerateError;
pub use generator::{GenerationEvents, Generator};
pub use geometry::{Box3, Direction, IVec2, IVec3, Vec2, Vec3};
pub use params::GenerateParameter;
pub use point::{RoomId, RoomPoint};
pub use random::Random;
pub use room::{Room, RoomItem, RoomParts};
pub use voxel::Voxel;
