//! Delaunay triangulation of room centres.
//!
//! Bowyer-Watson over the 3D centres inside a large super-tetrahedron,
//! reduced to the undirected edge set the spanning-tree pass consumes.
//! Single-floor dungeons have coplanar centres, where every tetrahedron is
//! degenerate; those fall back to a 2D Bowyer-Watson on (x, y) carried over
//! the same point indices. Collinear inputs cannot be triangulated at all and
//! report `TriangulationFailed`.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::error::GenerateError;
use crate::geometry::{Vec2, Vec3};

const EPSILON: f64 = 1e-9;

/// Undirected edges (index pairs, `a < b`) of the Delaunay triangulation of
/// `points`. Fewer than two points yield no edges; exactly two yield the
/// single connecting edge.
pub fn triangulate(points: &[Vec3]) -> Result<Vec<(usize, usize)>, GenerateError> {
    match points.len() {
        0 | 1 => return Ok(Vec::new()),
        2 => return Ok(vec![(0, 1)]),
        _ => {}
    }

    let first_z = points[0].z;
    let coplanar_horizontal = points.iter().all(|point| (point.z - first_z).abs() < EPSILON);

    if !coplanar_horizontal {
        let edges = triangulate_3d(points);
        if !edges.is_empty() {
            return Ok(edges);
        }
    }

    let flat: Vec<Vec2> = points.iter().map(|point| point.xy()).collect();
    let edges = triangulate_2d(&flat);
    if edges.is_empty() {
        return Err(GenerateError::TriangulationFailed);
    }
    Ok(edges)
}

// ---------------------------------------------------------------------------
// 3D Bowyer-Watson
// ---------------------------------------------------------------------------

struct Tetrahedron {
    vertices: [usize; 4],
    center: Vec3,
    radius_squared: f64,
}

fn triangulate_3d(points: &[Vec3]) -> Vec<(usize, usize)> {
    let n = points.len();

    // Super-tetrahedron: alternate corners of a cube comfortably larger than
    // the point cloud's bounding sphere.
    let center = bounding_center_3d(points);
    let radius = points
        .iter()
        .map(|point| point.distance(center))
        .fold(0.0f64, f64::max);
    let l = 64.0 * (radius + 1.0);
    let mut vertices: Vec<Vec3> = points.to_vec();
    vertices.push(center + Vec3::new(l, l, l));
    vertices.push(center + Vec3::new(l, -l, -l));
    vertices.push(center + Vec3::new(-l, l, -l));
    vertices.push(center + Vec3::new(-l, -l, l));

    let mut tetrahedra: Vec<Tetrahedron> = Vec::new();
    if let Some(seed) = make_tetrahedron(&vertices, [n, n + 1, n + 2, n + 3]) {
        tetrahedra.push(seed);
    } else {
        return Vec::new();
    }

    for point_index in 0..n {
        let point = vertices[point_index];

        let mut bad: Vec<Tetrahedron> = Vec::new();
        let mut keep: Vec<Tetrahedron> = Vec::new();
        for tetrahedron in tetrahedra {
            let inside =
                point.distance(tetrahedron.center).powi(2) <= tetrahedron.radius_squared;
            if inside {
                bad.push(tetrahedron);
            } else {
                keep.push(tetrahedron);
            }
        }
        if bad.is_empty() {
            // Numerical dead end; the caller falls back to 2D.
            return Vec::new();
        }

        // Faces appearing exactly once among the bad tetrahedra bound the
        // cavity the new point re-fills.
        let mut face_counts: BTreeMap<[usize; 3], u32> = BTreeMap::new();
        for tetrahedron in &bad {
            for face in tetrahedron_faces(tetrahedron.vertices) {
                *face_counts.entry(face).or_insert(0) += 1;
            }
        }

        tetrahedra = keep;
        for (face, count) in face_counts {
            if count != 1 {
                continue;
            }
            if let Some(tetrahedron) =
                make_tetrahedron(&vertices, [face[0], face[1], face[2], point_index])
            {
                tetrahedra.push(tetrahedron);
            }
        }
    }

    let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();
    for tetrahedron in &tetrahedra {
        if tetrahedron.vertices.iter().any(|&vertex| vertex >= n) {
            continue;
        }
        let v = tetrahedron.vertices;
        for i in 0..4 {
            for j in (i + 1)..4 {
                edges.insert(ordered(v[i], v[j]));
            }
        }
    }
    edges.into_iter().collect()
}

fn bounding_center_3d(points: &[Vec3]) -> Vec3 {
    let mut min = points[0];
    let mut max = points[0];
    for point in points {
        min = Vec3::new(min.x.min(point.x), min.y.min(point.y), min.z.min(point.z));
        max = Vec3::new(max.x.max(point.x), max.y.max(point.y), max.z.max(point.z));
    }
    (min + max) * 0.5
}

fn tetrahedron_faces(vertices: [usize; 4]) -> [[usize; 3]; 4] {
    let [a, b, c, d] = vertices;
    [sorted3(a, b, c), sorted3(a, b, d), sorted3(a, c, d), sorted3(b, c, d)]
}

fn sorted3(a: usize, b: usize, c: usize) -> [usize; 3] {
    let mut face = [a, b, c];
    face.sort_unstable();
    face
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Circumsphere via the linear system `2(b - a) . x = |b|^2 - |a|^2` (and the
/// two analogues), solved with Cramer's rule. `None` when the four points are
/// (near-)coplanar.
fn make_tetrahedron(vertices: &[Vec3], indices: [usize; 4]) -> Option<Tetrahedron> {
    let [a, b, c, d] = indices.map(|index| vertices[index]);

    let ab = b - a;
    let ac = c - a;
    let ad = d - a;

    let det = ab.dot(ac.cross(ad));
    let scale = ab.length() * ac.length() * ad.length();
    if det.abs() <= EPSILON * scale.max(1.0) {
        return None;
    }

    let ab2 = (b.length_squared() - a.length_squared()) * 0.5;
    let ac2 = (c.length_squared() - a.length_squared()) * 0.5;
    let ad2 = (d.length_squared() - a.length_squared()) * 0.5;

    let rhs = Vec3::new(ab2, ac2, ad2);
    let col_x = Vec3::new(ab.x, ac.x, ad.x);
    let col_y = Vec3::new(ab.y, ac.y, ad.y);
    let col_z = Vec3::new(ab.z, ac.z, ad.z);

    let denominator = col_x.dot(col_y.cross(col_z));
    if denominator.abs() <= f64::MIN_POSITIVE {
        return None;
    }
    let center = Vec3::new(
        rhs.dot(col_y.cross(col_z)) / denominator,
        col_x.dot(rhs.cross(col_z)) / denominator,
        col_x.dot(col_y.cross(rhs)) / denominator,
    );

    Some(Tetrahedron {
        vertices: indices,
        center,
        radius_squared: center.distance(a).powi(2),
    })
}

// ---------------------------------------------------------------------------
// 2D Bowyer-Watson fallback
// ---------------------------------------------------------------------------

struct Triangle {
    vertices: [usize; 3],
    center: Vec2,
    radius_squared: f64,
}

fn triangulate_2d(points: &[Vec2]) -> Vec<(usize, usize)> {
    let n = points.len();

    let (min, max) = bounding_box_2d(points);
    let center = Vec2::new((min.x + max.x) * 0.5, (min.y + max.y) * 0.5);
    let radius = points
        .iter()
        .map(|point| (*point - center).length())
        .fold(0.0f64, f64::max);
    let l = 64.0 * (radius + 1.0);
    let mut vertices: Vec<Vec2> = points.to_vec();
    vertices.push(Vec2::new(center.x - 2.0 * l, center.y - l));
    vertices.push(Vec2::new(center.x + 2.0 * l, center.y - l));
    vertices.push(Vec2::new(center.x, center.y + 2.0 * l));

    let mut triangles: Vec<Triangle> = Vec::new();
    if let Some(seed) = make_triangle(&vertices, [n, n + 1, n + 2]) {
        triangles.push(seed);
    } else {
        return Vec::new();
    }

    for point_index in 0..n {
        let point = vertices[point_index];

        let mut bad: Vec<Triangle> = Vec::new();
        let mut keep: Vec<Triangle> = Vec::new();
        for triangle in triangles {
            let offset = point - triangle.center;
            if offset.length() * offset.length() <= triangle.radius_squared {
                bad.push(triangle);
            } else {
                keep.push(triangle);
            }
        }
        if bad.is_empty() {
            return Vec::new();
        }

        let mut edge_counts: BTreeMap<(usize, usize), u32> = BTreeMap::new();
        for triangle in &bad {
            let [a, b, c] = triangle.vertices;
            for edge in [ordered(a, b), ordered(a, c), ordered(b, c)] {
                *edge_counts.entry(edge).or_insert(0) += 1;
            }
        }

        triangles = keep;
        for (edge, count) in edge_counts {
            if count != 1 {
                continue;
            }
            if let Some(triangle) = make_triangle(&vertices, [edge.0, edge.1, point_index]) {
                triangles.push(triangle);
            }
        }
    }

    let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();
    for triangle in &triangles {
        if triangle.vertices.iter().any(|&vertex| vertex >= n) {
            continue;
        }
        let [a, b, c] = triangle.vertices;
        edges.insert(ordered(a, b));
        edges.insert(ordered(a, c));
        edges.insert(ordered(b, c));
    }
    edges.into_iter().collect()
}

fn bounding_box_2d(points: &[Vec2]) -> (Vec2, Vec2) {
    let mut min = points[0];
    let mut max = points[0];
    for point in points {
        min = Vec2::new(min.x.min(point.x), min.y.min(point.y));
        max = Vec2::new(max.x.max(point.x), max.y.max(point.y));
    }
    (min, max)
}

fn make_triangle(vertices: &[Vec2], indices: [usize; 3]) -> Option<Triangle> {
    let [a, b, c] = indices.map(|index| vertices[index]);

    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    let scale = (b - a).length() * (c - a).length();
    if d.abs() <= EPSILON * scale.max(1.0) {
        return None;
    }

    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    let center = Vec2::new(
        (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    );
    let offset = a - center;

    Some(Triangle {
        vertices: indices,
        center,
        radius_squared: offset.length() * offset.length(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(x: f64, y: f64) -> Vec3 {
        Vec3::new(x, y, 0.0)
    }

    #[test]
    fn trivial_point_counts() {
        assert!(triangulate(&[]).unwrap().is_empty());
        assert!(triangulate(&[flat(1.0, 1.0)]).unwrap().is_empty());
        assert_eq!(triangulate(&[flat(0.0, 0.0), flat(4.0, 1.0)]).unwrap(), vec![(0, 1)]);
    }

    #[test]
    fn square_on_one_floor_uses_the_flat_fallback() {
        let points =
            [flat(0.0, 0.0), flat(10.0, 0.0), flat(10.0, 10.0), flat(0.0, 10.0)];
        let edges = triangulate(&points).unwrap();

        for hull in [(0, 1), (1, 2), (2, 3), (0, 3)] {
            assert!(edges.contains(&hull), "missing hull edge {hull:?} in {edges:?}");
        }
        // Four hull edges plus one (cocircular tie) or both diagonals.
        assert!(edges.len() == 5 || edges.len() == 6, "unexpected edges {edges:?}");
    }

    #[test]
    fn collinear_centres_cannot_be_triangulated() {
        let points = [flat(0.0, 0.0), flat(3.0, 0.0), flat(9.0, 0.0)];
        assert_eq!(triangulate(&points), Err(GenerateError::TriangulationFailed));
    }

    #[test]
    fn tetrahedron_with_interior_point_connects_everything() {
        let points = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(2.5, 2.5, 2.5),
        ];
        let edges = triangulate(&points).unwrap();
        for corner in 0..4 {
            assert!(
                edges.contains(&(corner, 4)),
                "interior point should reach corner {corner}: {edges:?}"
            );
        }
        assert_eq!(edges.len(), 10, "five mutually visible points: {edges:?}");
    }

    #[test]
    fn two_floor_layout_triangulates_in_3d() {
        let points = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(8.0, 1.0, 0.0),
            Vec3::new(4.0, 7.0, 0.0),
            Vec3::new(3.0, 3.0, 5.0),
        ];
        let edges = triangulate(&points).unwrap();
        assert_eq!(edges.len(), 6, "one tetrahedron: {edges:?}");
    }

    #[test]
    fn output_is_deterministic() {
        let points = [
            flat(0.0, 0.0),
            flat(7.0, 2.0),
            flat(3.0, 8.0),
            flat(9.0, 9.0),
            flat(1.0, 5.0),
        ];
        assert_eq!(triangulate(&points).unwrap(), triangulate(&points).unwrap());
    }
}
