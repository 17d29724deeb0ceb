//! Flat colour projection of one voxel level, using the stable cell-kind
//! palette. Anything fancier (scaling, wall strokes, texture upload) belongs
//! to the host; this module only fixes the grid-to-colour mapping.

use crate::canvas::Rgb;
use crate::geometry::IVec3;
use crate::voxel::Voxel;

/// Row-major (x fastest) pixel buffer for the level containing height `z`.
pub fn render_level(voxel: &Voxel, z: i32) -> Vec<Rgb> {
    let mut pixels = Vec::with_capacity((voxel.width() * voxel.depth()) as usize);
    for y in 0..voxel.depth() as i32 {
        for x in 0..voxel.width() as i32 {
            pixels.push(voxel.get(IVec3::new(x, y, z)).kind().color());
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use crate::cell::{Cell, CellKind};
    use crate::geometry::Direction;

    use super::*;

    #[test]
    fn level_projection_uses_the_stable_palette() {
        let mut voxel = Voxel::new(3, 2, 2);
        voxel.set(IVec3::new(0, 0, 0), Cell::new(CellKind::Floor, 1, Direction::North));
        voxel.set(IVec3::new(1, 0, 0), Cell::new(CellKind::Aisle, 2, Direction::North));
        voxel.set(IVec3::new(2, 1, 0), Cell::new(CellKind::Slope, 2, Direction::East));

        let pixels = render_level(&voxel, 0);
        assert_eq!(pixels.len(), 6);
        assert_eq!(pixels[0], Rgb::new(0, 0, 255));
        assert_eq!(pixels[1], Rgb::new(0, 255, 0));
        assert_eq!(pixels[5], Rgb::new(255, 0, 255));
        assert_eq!(pixels[2], Rgb::BLACK);

        // A level above the voxel is all out-of-bounds, which shares black.
        assert!(render_level(&voxel, 5).iter().all(|&pixel| pixel == Rgb::BLACK));
    }
}
