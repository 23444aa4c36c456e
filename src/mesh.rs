//! Per-view mesh assembly and Wavefront OBJ output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Vector3;
use tracing::{debug, warn};

use crate::convert::ConversionOptions;
use crate::errors::{ExportError, GeometryError, ViewError};
use crate::geometry::{plane_angle, Point};
use crate::model::{StructuralModel, ViewTag};
use crate::prism::{circular_prism, rectangular_prism};
use crate::section::CrossSection;

/// Largest number of decimals that still changes an `f64`.
const MAX_PRECISION: u32 = 15;

/// Indexed polygon mesh with 1-based face indices, as in OBJ.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions in output order.
    vertices: Vec<Point>,
    /// Polygons as lists of 1-based vertex indices.
    faces: Vec<Vec<usize>>,
}

impl Mesh {
    /// Create an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with room for the given number of elements.
    #[must_use]
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    /// Vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Faces as 1-based vertex indices.
    #[must_use]
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns true when the mesh has no vertex.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append a vertex.
    pub fn push_vertex(&mut self, vertex: Point) {
        self.vertices.push(vertex);
    }

    /// Append a face of 1-based indices.
    pub fn push_face(&mut self, face: Vec<usize>) {
        self.faces.push(face);
    }

    /// Append `part`, shifting its local face indices past the current vertices.
    ///
    /// # Examples
    /// ```
    /// use trussmesh::{point, rectangular_prism, Mesh};
    ///
    /// let beam = rectangular_prism(point(0.0, 0.0, 0.0), point(1.0, 0.0, 0.0), 0.0, 0.1, 0.1)
    ///     .expect("valid member");
    /// let mut mesh = Mesh::new();
    /// mesh.append(beam.clone());
    /// mesh.append(beam);
    /// assert_eq!(mesh.faces()[6], vec![9, 10, 11, 12]);
    /// ```
    pub fn append(&mut self, part: Self) {
        let offset = self.vertices.len();
        self.vertices.extend(part.vertices);
        self.faces.extend(
            part.faces
                .into_iter()
                .map(|face| face.into_iter().map(|index| index + offset).collect()),
        );
    }

    /// Copy of the mesh with every coordinate rounded to `precision` decimals.
    ///
    /// Only meant for the export boundary; geometry is generated at full
    /// precision. Negative zero is normalised so it prints as `0`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn rounded(&self, precision: u32) -> Self {
        let scale = 10_f64.powi(precision.min(MAX_PRECISION) as i32);
        let round = |value: f64| (value * scale).round() / scale + 0.0;
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| Point::new(round(v.x), round(v.y), round(v.z)))
                .collect(),
            faces: self.faces.clone(),
        }
    }
}

/// Build the prism of one member.
///
/// A zero radius marks a section without round dimensions and falls back to
/// the zero-size box.
#[allow(clippy::float_cmp)]
fn member_prism(
    section: CrossSection,
    rotation: f64,
    start: Point,
    end: Point,
    segment_count: usize,
) -> Result<Mesh, GeometryError> {
    match section {
        CrossSection::Circular { radius } if radius != 0.0 => {
            circular_prism(start, end, radius, segment_count)
        }
        CrossSection::Circular { .. } => rectangular_prism(start, end, rotation, 0.0, 0.0),
        CrossSection::Rectangular { width, height, .. } => {
            rectangular_prism(start, end, rotation, width, height)
        }
    }
}

/// Assemble the mesh of every member drawn in `view`.
///
/// Members whose geometry cannot be built are logged and skipped; the rest of
/// the view is still produced.
///
/// # Errors
///
/// Returns [`ViewError::EmptyView`] when no member contributed a vertex.
pub fn generate_view(
    model: &StructuralModel,
    view: ViewTag,
    options: &ConversionOptions,
) -> Result<Mesh, ViewError> {
    if view != ViewTag::ThreeD && !model.is_classified() {
        warn!(%view, "model has not been classified; planar views will be empty");
    }

    let mut mesh = Mesh::new();
    for (member, start, end) in model.member_endpoints() {
        if !member.in_view(view) {
            continue;
        }
        let axis: Vector3<f64> = end.to_vector() - start.to_vector();
        debug!(
            member = %member.label,
            theta_yz = ?plane_angle(&axis, &Vector3::x()),
            theta_xz = ?plane_angle(&axis, &Vector3::y()),
            theta_xy = ?plane_angle(&axis, &Vector3::z()),
            "generating member"
        );
        match member_prism(member.section, member.rotation, start, end, options.segment_count) {
            Ok(part) => mesh.append(part),
            Err(err) => warn!(member = %member.label, %err, "skipping member"),
        }
    }

    if mesh.is_empty() {
        return Err(ViewError::EmptyView(view));
    }
    Ok(mesh)
}

/// Write `mesh` as OBJ `v` and `f` records.
///
/// # Errors
///
/// Propagates any error from `writer`.
pub fn write_obj<W: Write>(mesh: &Mesh, mut writer: W) -> std::io::Result<()> {
    for vertex in mesh.vertices() {
        writeln!(writer, "v {} {} {}", vertex.x, vertex.y, vertex.z)?;
    }
    for face in mesh.faces() {
        write!(writer, "f")?;
        for index in face {
            write!(writer, " {index}")?;
        }
        writeln!(writer)?;
    }
    writer.flush()
}

/// Write `mesh` to an OBJ file at `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`ExportError::Io`] when the file cannot be created or written.
pub fn export_obj(mesh: &Mesh, path: &Path) -> Result<(), ExportError> {
    let to_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_error)?;
    write_obj(mesh, BufWriter::new(file)).map_err(to_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;
    use crate::model::{Member, Node};
    use crate::views::classify_views;

    fn beam(label: &str, start: usize, end: usize) -> Member {
        Member::new(label, start, end).with_section(CrossSection::rectangle(0.2, 0.4))
    }

    fn portal_frame() -> StructuralModel {
        StructuralModel::from_parts(
            [
                Node::new("A", point(0.0, 0.0, 0.0)),
                Node::new("B", point(0.0, 3.0, 0.0)),
                Node::new("C", point(4.0, 3.0, 0.0)),
                Node::new("D", point(4.0, 0.0, 0.0)),
            ],
            [
                beam("col1", 1, 2),
                beam("girder", 2, 3),
                beam("col2", 3, 4),
                Member::new("pipe", 1, 3).with_section(CrossSection::Circular { radius: 0.05 }),
            ],
        )
        .expect("valid model")
    }

    #[test]
    fn append_offsets_face_indices() {
        let mut mesh = Mesh::new();
        let mut part = Mesh::new();
        for i in 0..3 {
            part.push_vertex(point(f64::from(i), 0.0, 0.0));
        }
        part.push_face(vec![1, 2, 3]);
        mesh.append(part.clone());
        mesh.append(part);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.faces(), [vec![1, 2, 3], vec![4, 5, 6]]);
    }

    #[test]
    fn assembled_indices_stay_in_range_per_member() {
        let model = portal_frame();
        let options = ConversionOptions::default();
        let mesh = generate_view(&model, ViewTag::ThreeD, &options).expect("geometry");

        // Three boxes then one 16-segment cylinder.
        assert_eq!(mesh.vertex_count(), 3 * 8 + 34);
        assert_eq!(mesh.face_count(), 3 * 6 + 48);

        let ranges = [(1, 8), (9, 16), (17, 24), (25, 58)];
        let face_ranges = [(0, 6), (6, 12), (12, 18), (18, 66)];
        for ((low, high), (first, last)) in ranges.into_iter().zip(face_ranges) {
            for face in &mesh.faces()[first..last] {
                assert!(face.iter().all(|&i| (low..=high).contains(&i)));
            }
        }
    }

    #[test]
    fn degenerate_members_contribute_nothing() {
        let model = StructuralModel::from_parts(
            [
                Node::new("A", point(0.0, 0.0, 0.0)),
                Node::new("B", point(2.0, 0.0, 0.0)),
                Node::new("A'", point(0.0, 0.0, 0.0)),
            ],
            [beam("zero", 1, 3), beam("real", 1, 2), beam("self", 2, 2)],
        )
        .expect("valid model");
        let mesh = generate_view(&model, ViewTag::ThreeD, &ConversionOptions::default())
            .expect("one member survives");
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.faces()[0], vec![1, 2, 3, 4]);
    }

    #[test]
    fn only_degenerate_members_make_an_empty_view() {
        let model = StructuralModel::from_parts(
            [Node::new("A", point(1.0, 1.0, 1.0))],
            [beam("self", 1, 1)],
        )
        .expect("valid model");
        assert_eq!(
            generate_view(&model, ViewTag::ThreeD, &ConversionOptions::default()),
            Err(ViewError::EmptyView(ViewTag::ThreeD))
        );
    }

    #[test]
    fn zero_radius_sections_become_zero_size_boxes() {
        let model = StructuralModel::from_parts(
            [
                Node::new("A", point(0.0, 0.0, 0.0)),
                Node::new("B", point(0.0, 0.0, 5.0)),
            ],
            [Member::new("rod", 1, 2).with_section(CrossSection::from_diameter(0.0))],
        )
        .expect("valid model");
        let mesh = generate_view(&model, ViewTag::ThreeD, &ConversionOptions::default())
            .expect("flat box");
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 6);
        assert!(mesh
            .vertices()
            .iter()
            .all(|v| v.x.abs() < 1.0e-12 && v.y.abs() < 1.0e-12));
    }

    #[test]
    fn planar_views_follow_classification() {
        let mut model = portal_frame();
        classify_views(&mut model);
        let options = ConversionOptions::default();

        // Only the girder lies on the maximum-Y plane.
        let top = generate_view(&model, ViewTag::Top, &options).expect("girder");
        assert_eq!(top.vertex_count(), 8);
        assert!(top
            .vertices()
            .iter()
            .all(|v| v.x.abs() < 1.0e-9 || (v.x - 4.0).abs() < 1.0e-9));

        // No member has both ends on the minimum-Y plane.
        assert_eq!(
            generate_view(&model, ViewTag::Bottom, &options),
            Err(ViewError::EmptyView(ViewTag::Bottom))
        );

        // Every member lies on z = 0, which is both the minimum and maximum Z.
        let side = generate_view(&model, ViewTag::Side1, &options).expect("whole frame");
        assert_eq!(side.vertex_count(), 3 * 8 + 34);
    }

    #[test]
    fn rounding_applies_only_to_coordinates() {
        let mut mesh = Mesh::new();
        mesh.push_vertex(point(1.23456, -0.0004, 2.0006));
        mesh.push_face(vec![1, 1, 1]);
        let rounded = mesh.rounded(3);
        assert_eq!(rounded.vertices()[0], point(1.235, 0.0, 2.001));
        assert!(rounded.vertices()[0].y.is_sign_positive());
        assert_eq!(rounded.faces(), mesh.faces());
        assert_eq!(mesh.rounded(0).vertices()[0], point(1.0, 0.0, 2.0));
    }

    #[test]
    fn writes_vertex_then_face_records() {
        let mut mesh = Mesh::new();
        mesh.push_vertex(point(0.0, 1.5, -2.0));
        mesh.push_vertex(point(1.0, 0.0, 0.25));
        mesh.push_vertex(point(0.0, 0.0, 0.0));
        mesh.push_face(vec![1, 2, 3]);

        let mut buffer = Vec::new();
        write_obj(&mesh, &mut buffer).expect("writing to memory cannot fail");
        let text = String::from_utf8(buffer).expect("utf-8 output");
        assert_eq!(text, "v 0 1.5 -2\nv 1 0 0.25\nv 0 0 0\nf 1 2 3\n");
    }
}
