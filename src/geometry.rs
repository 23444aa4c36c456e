//! Fundamental geometric types and frame construction for member meshes.

use nalgebra::{Matrix3, Vector3};
use tracing::error;

/// Absolute tolerance used when testing whether a direction lies on an axis.
const AXIS_ABS_TOLERANCE: f64 = 1.0e-8;
/// Relative tolerance used when testing whether a direction lies on an axis.
const AXIS_REL_TOLERANCE: f64 = 1.0e-5;

/// Position in three dimensional space, in model length units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Distance along the global X axis.
    pub x: f64,
    /// Distance along the global Y axis.
    pub y: f64,
    /// Distance along the global Z axis.
    pub z: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<Vector3<f64>> for Point {
    fn from(value: Vector3<f64>) -> Self {
        Self::new(value.x, value.y, value.z)
    }
}

impl From<Point> for Vector3<f64> {
    fn from(value: Point) -> Self {
        value.to_vector()
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use trussmesh::point;
///
/// let origin = point(0.0, 0.0, 0.0);
/// assert_eq!(origin.x, 0.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64, z: f64) -> Point {
    Point::new(x, y, z)
}

/// Component-wise closeness check between two vectors.
fn is_close(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x - y).abs() <= AXIS_ABS_TOLERANCE + AXIS_REL_TOLERANCE * y.abs())
}

/// Returns true when `unit` points along `+axis` or `-axis`.
fn is_parallel_to(unit: &Vector3<f64>, axis: &Vector3<f64>) -> bool {
    is_close(unit, axis) || is_close(unit, &-axis)
}

/// Build two unit vectors perpendicular to `direction` and to each other.
///
/// The pair spans the cross-section plane of a member: the first vector carries
/// the width and the second the height. The helper axis used for the first
/// cross product is Y when the direction lies on X, Z when it lies on Y, and X
/// otherwise, so the orientation of the returned pair is fixed for every input.
///
/// A zero-length `direction` has no perpendicular plane. The error is logged
/// and two zero vectors are returned; callers treat that as "no geometry".
///
/// # Examples
/// ```
/// use nalgebra::Vector3;
/// use trussmesh::orthonormal_basis;
///
/// let (v1, v2) = orthonormal_basis(Vector3::new(10.0, 0.0, 0.0));
/// assert_eq!(v1, Vector3::new(0.0, 0.0, 1.0));
/// assert_eq!(v2, Vector3::new(0.0, -1.0, 0.0));
/// ```
#[must_use]
pub fn orthonormal_basis(direction: Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let Some(unit) = direction.try_normalize(0.0) else {
        error!(?direction, "cannot build a cross-section frame for a zero-length direction");
        return (Vector3::zeros(), Vector3::zeros());
    };

    let helper = if is_parallel_to(&unit, &Vector3::x()) {
        Vector3::y()
    } else if is_parallel_to(&unit, &Vector3::y()) {
        Vector3::z()
    } else {
        Vector3::x()
    };

    let v1 = unit.cross(&helper).normalize();
    let v2 = unit.cross(&v1).normalize();
    (v1, v2)
}

/// Rotation of `angle_degrees` about the unit vector `axis` (Rodrigues' formula).
///
/// `R = I cos(t) + (1 - cos(t)) a a^T + sin(t) [a]x`
#[must_use]
pub fn rotation_matrix(axis: &Vector3<f64>, angle_degrees: f64) -> Matrix3<f64> {
    let theta = angle_degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let cross = axis.cross_matrix();
    Matrix3::identity() * cos + (axis * axis.transpose()) * (1.0 - cos) + cross * sin
}

/// Angle in degrees between `vector` and the plane whose normal is `normal`.
///
/// A vector lying in the plane gives 0 and one along the normal gives 90.
/// Returns `None` when either input has zero length.
#[must_use]
pub fn plane_angle(vector: &Vector3<f64>, normal: &Vector3<f64>) -> Option<f64> {
    let magnitude = vector.norm() * normal.norm();
    if magnitude == 0.0 {
        return None;
    }
    let cos_theta = (vector.dot(normal) / magnitude).clamp(-1.0, 1.0);
    Some(90.0 - cos_theta.acos().to_degrees())
}
