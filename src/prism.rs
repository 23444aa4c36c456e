//! Solid prisms swept along a member's centreline.
//!
//! Each generator returns a small [`Mesh`] whose faces use 1-based indices local
//! to that mesh; [`Mesh::append`] shifts them when members are combined.

use std::f64::consts::TAU;

use nalgebra::Vector3;

use crate::errors::GeometryError;
use crate::geometry::{orthonormal_basis, rotation_matrix, Point};
use crate::mesh::Mesh;

/// Faces of a rectangular prism: the start cap, the end cap, then the four sides.
const BOX_FACES: [[usize; 4]; 6] = [
    [1, 2, 3, 4],
    [5, 6, 7, 8],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 4, 8, 7],
    [4, 1, 5, 8],
];

/// Axis of a member, rejecting coincident endpoints.
fn member_axis(start: Point, end: Point) -> Result<Vector3<f64>, GeometryError> {
    let direction = end.to_vector() - start.to_vector();
    if direction.norm() == 0.0 {
        return Err(GeometryError::DegenerateGeometry);
    }
    Ok(direction)
}

/// Generate the box swept by a `width` x `height` rectangle from `start` to `end`.
///
/// The width runs along the first vector of [`orthonormal_basis`] and the height
/// along the second, after both are rolled by `rotation_degrees` about the
/// member axis. Corners are emitted in `++, -+, --, +-` order at `start`, then in
/// the same order at `end`, and the six quads close the box.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateGeometry`] when `start == end`.
///
/// # Examples
/// ```
/// use trussmesh::{point, rectangular_prism};
///
/// let beam = rectangular_prism(point(0.0, 0.0, 0.0), point(10.0, 0.0, 0.0), 0.0, 2.0, 4.0)
///     .expect("non-degenerate member");
/// assert_eq!(beam.vertex_count(), 8);
/// assert_eq!(beam.face_count(), 6);
/// ```
pub fn rectangular_prism(
    start: Point,
    end: Point,
    rotation_degrees: f64,
    width: f64,
    height: f64,
) -> Result<Mesh, GeometryError> {
    let direction = member_axis(start, end)?;
    let (mut v1, mut v2) = orthonormal_basis(direction);
    if rotation_degrees != 0.0 {
        let roll = rotation_matrix(&direction.normalize(), rotation_degrees);
        v1 = roll * v1;
        v2 = roll * v2;
    }

    let half_width = v1 * (width / 2.0);
    let half_height = v2 * (height / 2.0);
    let offsets = [
        half_width + half_height,
        -half_width + half_height,
        -half_width - half_height,
        half_width - half_height,
    ];

    let mut mesh = Mesh::with_capacity(8, BOX_FACES.len());
    for centre in [start.to_vector(), end.to_vector()] {
        for offset in &offsets {
            mesh.push_vertex(Point::from(centre + offset));
        }
    }
    for face in BOX_FACES {
        mesh.push_face(face.to_vec());
    }
    Ok(mesh)
}

/// Generate a closed cylinder of `radius` from `start` to `end`.
///
/// Vertex layout (1-based): the start centre, the `n` start ring vertices, the
/// end centre, then the `n` end ring vertices, where `n = segment_count`. Ring
/// vertex `k` sits at angle `2 pi k / n` measured from the first basis vector.
/// Faces are a triangle fan on each cap and one quad per side segment, all
/// wound consistently and wrapping back to ring vertex 0, so every edge is
/// shared by exactly two faces.
///
/// # Errors
///
/// Returns [`GeometryError::TooFewSegments`] when `segment_count < 3` and
/// [`GeometryError::DegenerateGeometry`] when `start == end`.
///
/// # Examples
/// ```
/// use trussmesh::{circular_prism, point};
///
/// let pipe = circular_prism(point(0.0, 0.0, 0.0), point(0.0, 5.0, 0.0), 0.5, 16)
///     .expect("non-degenerate member");
/// assert_eq!(pipe.vertex_count(), 34);
/// assert_eq!(pipe.face_count(), 48);
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn circular_prism(
    start: Point,
    end: Point,
    radius: f64,
    segment_count: usize,
) -> Result<Mesh, GeometryError> {
    if segment_count < 3 {
        return Err(GeometryError::TooFewSegments(segment_count));
    }
    let direction = member_axis(start, end)?;
    let (v1, v2) = orthonormal_basis(direction);

    let n = segment_count;
    let ring: Vec<Vector3<f64>> = (0..n)
        .map(|k| {
            let angle = TAU * k as f64 / n as f64;
            (v1 * angle.cos() + v2 * angle.sin()) * radius
        })
        .collect();

    let mut mesh = Mesh::with_capacity(2 * n + 2, 3 * n);
    for centre in [start.to_vector(), end.to_vector()] {
        mesh.push_vertex(Point::from(centre));
        for offset in &ring {
            mesh.push_vertex(Point::from(centre + offset));
        }
    }

    let start_centre = 1;
    let end_centre = n + 2;
    let start_ring = |k: usize| 2 + k % n;
    let end_ring = |k: usize| n + 3 + k % n;

    for k in 0..n {
        mesh.push_face(vec![start_centre, start_ring(k + 1), start_ring(k)]);
    }
    for k in 0..n {
        mesh.push_face(vec![end_centre, end_ring(k), end_ring(k + 1)]);
    }
    for k in 0..n {
        mesh.push_face(vec![
            start_ring(k),
            start_ring(k + 1),
            end_ring(k + 1),
            end_ring(k),
        ]);
    }
    Ok(mesh)
}
