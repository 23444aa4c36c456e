//! Reader for ModelSmart text exports (`.3dd`).
//!
//! Layout, one record per non-blank line:
//!
//! ```text
//! <file type>
//! <version>
//! num_shapes num_materials num_joints num_members metric_flag
//! num x y z tx ty tz rx ry rz type subtype      (num_joints lines)
//! num name [depth thickness width]              (num_shapes lines)
//! num start_joint end_joint shape_num [rotation] (num_members lines)
//! ```
//!
//! Members refer to joints and shapes by their `num` column, not by position.

use std::collections::HashMap;

use crate::errors::ParseError;
use crate::formats::{invalid, number, InputFormat, ParsedModel};
use crate::geometry::Point;
use crate::model::{Member, Node};
use crate::section::{CrossSection, ShapeTable};
use crate::units::{LengthUnit, SectionUnit, Units};

/// Counts from the third header line.
struct Header {
    /// Number of shape lines.
    shapes: usize,
    /// Number of joint lines.
    joints: usize,
    /// Number of member lines.
    members: usize,
    /// Nonzero metric flag.
    metric: bool,
}

/// Non-blank lines paired with their 0-based line index.
struct Lines<'a> {
    /// Remaining records.
    inner: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
}

impl<'a> Lines<'a> {
    /// Records of `text`.
    fn new(text: &'a str) -> Self {
        Self {
            inner: Box::new(
                text.lines()
                    .enumerate()
                    .map(|(index, line)| (index, line.trim()))
                    .filter(|(_, line)| !line.is_empty()),
            ),
        }
    }

    /// Next record of `section`, or a truncation error quoting `expected`.
    fn record(
        &mut self,
        section: &'static str,
        expected: usize,
    ) -> Result<(usize, Vec<&'a str>), ParseError> {
        let (index, line) = self
            .inner
            .next()
            .ok_or(ParseError::Truncated { section, expected })?;
        Ok((index, line.split_whitespace().collect()))
    }
}

/// Skip the type and version lines and read the counts.
fn parse_header(lines: &mut Lines<'_>) -> Result<Header, ParseError> {
    lines.record("HEADER", 3)?;
    lines.record("HEADER", 3)?;
    let (index, fields) = lines.record("HEADER", 3)?;
    let field = |position: usize| fields.get(position).copied();
    let flag: i64 = number(field(4), index, "metric flag")?;
    Ok(Header {
        shapes: number(field(0), index, "shape count")?,
        joints: number(field(2), index, "joint count")?,
        members: number(field(3), index, "member count")?,
        metric: flag != 0,
    })
}

/// Parse the text of a ModelSmart export.
///
/// Metric files are read as metres with millimetre sections, all others as
/// feet with inch sections. A shape line without dimensions is resolved from
/// its name, like an unknown RISA shape.
///
/// # Errors
///
/// Returns [`ParseError`] when the header is incomplete, the file holds fewer
/// records than declared, a field is not numeric, or a member names a joint or
/// shape that does not exist.
#[allow(clippy::float_cmp)]
pub fn parse(text: &str) -> Result<ParsedModel, ParseError> {
    let mut lines = Lines::new(text);
    let header = parse_header(&mut lines)?;

    let mut nodes = Vec::new();
    let mut joint_index = HashMap::new();
    for _ in 0..header.joints {
        let (index, fields) = lines.record("JOINTS", header.joints)?;
        let field = |position: usize| fields.get(position).copied();
        let num: i64 = number(field(0), index, "joint number")?;
        let position = Point::new(
            number(field(1), index, "x coordinate")?,
            number(field(2), index, "y coordinate")?,
            number(field(3), index, "z coordinate")?,
        );
        nodes.push(Node::new(num.to_string(), position));
        joint_index.insert(num, nodes.len());
    }

    let mut shapes = ShapeTable::new();
    let mut shape_names = HashMap::new();
    for _ in 0..header.shapes {
        let (index, fields) = lines.record("SHAPES", header.shapes)?;
        let field = |position: usize| fields.get(position).copied();
        let num: i64 = number(field(0), index, "shape number")?;
        let name = field(1)
            .ok_or_else(|| invalid(index, "missing shape name"))?
            .to_owned();
        if fields.len() >= 5 {
            let depth: f64 = number(field(2), index, "shape depth")?;
            let thickness: f64 = number(field(3), index, "wall thickness")?;
            let width: f64 = number(field(4), index, "shape width")?;
            let section = if width == 0.0 {
                CrossSection::from_diameter(depth)
            } else {
                CrossSection::Rectangular {
                    width,
                    height: depth,
                    wall_thickness: Some(thickness),
                }
            };
            shapes.insert(name.clone(), section);
        }
        shape_names.insert(num, name);
    }

    let mut members = Vec::new();
    for _ in 0..header.members {
        let (index, fields) = lines.record("MEMBERS", header.members)?;
        let field = |position: usize| fields.get(position).copied();
        let num: i64 = number(field(0), index, "member number")?;
        let joint = |position: usize, name: &str| -> Result<usize, ParseError> {
            let joint: i64 = number(field(position), index, name)?;
            joint_index
                .get(&joint)
                .copied()
                .ok_or_else(|| invalid(index, format!("{name} {joint} is not a joint")))
        };
        let start = joint(1, "start joint")?;
        let end = joint(2, "end joint")?;
        let shape_num: i64 = number(field(3), index, "shape number")?;
        let shape = shape_names
            .get(&shape_num)
            .ok_or_else(|| invalid(index, format!("shape {shape_num} is not defined")))?;
        let rotation = match field(4) {
            Some(raw) => number(Some(raw), index, "rotation")?,
            None => 0.0,
        };
        members.push(
            Member::new(num.to_string(), start, end)
                .with_rotation(rotation)
                .with_section(shapes.resolve(shape))
                .with_shape_label(shape.clone()),
        );
    }

    let units = if header.metric {
        Units {
            length: LengthUnit::Meters,
            section: SectionUnit::Millimeters,
        }
    } else {
        Units::default()
    };

    Ok(ParsedModel {
        format: InputFormat::ModelSmart,
        units,
        nodes,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;

    const SAMPLE: &str = "\
ModelSmart 3D
Version 4.0
2 1 3 2 1

10 0 0 0 0 0 0 0 0 0 1 0
20 3.5 0 0 0 0 0 0 0 0 0 0
30 3.5 2 0 0 0 0 0 0 0 1 0
1 RECT100X50X5 100 5 50
2 ROD20X
1 10 20 1 30
2 20 30 2
";

    #[test]
    fn parses_sample_model() {
        let model = parse(SAMPLE).expect("valid ModelSmart text");
        assert_eq!(model.format, InputFormat::ModelSmart);
        assert_eq!(model.units.length, LengthUnit::Meters);
        assert_eq!(model.units.section, SectionUnit::Millimeters);
        assert_eq!(model.nodes[1], Node::new("20", point(3.5, 0.0, 0.0)));

        let [rect, rod] = model.members.as_slice() else {
            panic!("expected two members, got {}", model.members.len());
        };
        // Joint numbers map onto 1-based node positions.
        assert_eq!((rect.start_node, rect.end_node), (1, 2));
        assert_eq!((rod.start_node, rod.end_node), (2, 3));
        assert!((rect.rotation - 30.0).abs() < f64::EPSILON);
        assert_eq!(
            rect.section,
            CrossSection::Rectangular {
                width: 50.0,
                height: 100.0,
                wall_thickness: Some(5.0)
            }
        );
        assert_eq!(rod.section, CrossSection::Circular { radius: 10.0 });
        assert_eq!(rod.shape_label, "ROD20X");
    }

    #[test]
    fn imperial_flag_gives_feet_and_inches() {
        let text = "t\nv\n1 0 2 1 0\n1 0 0 0\n2 0 1 0\n1 PIPE 4 0.2 0\n1 1 2 1\n";
        let model = parse(text).expect("valid ModelSmart text");
        assert_eq!(model.units, Units::default());
        assert_eq!(model.members[0].section, CrossSection::Circular { radius: 2.0 });
    }

    #[test]
    fn reports_malformed_files() {
        assert!(matches!(
            parse("type\nversion\n"),
            Err(ParseError::Truncated { section: "HEADER", .. })
        ));
        assert!(matches!(
            parse("t\nv\n0 0 2 0 0\n1 0 0 0\n"),
            Err(ParseError::Truncated { section: "JOINTS", expected: 2 })
        ));
        assert!(matches!(
            parse("t\nv\n0 0 1 0 zero\n"),
            Err(ParseError::InvalidRecord { line: 3, .. })
        ));
        let unknown_joint = "t\nv\n1 0 1 1 0\n1 0 0 0\n1 A 1 0 1\n1 1 7 1\n";
        let error = parse(unknown_joint).expect_err("joint 7 does not exist");
        assert_eq!(error.to_string(), "line 6: end joint 7 is not a joint");
        let unknown_shape = "t\nv\n1 0 2 1 0\n1 0 0 0\n2 1 0 0\n1 A 1 0 1\n1 1 2 9\n";
        assert!(matches!(
            parse(unknown_shape),
            Err(ParseError::InvalidRecord { line: 7, .. })
        ));
    }

    #[test]
    fn oversized_header_counts_are_truncation_errors() {
        assert!(matches!(
            parse("t\nv\n0 0 18446744073709551615 0 0\n"),
            Err(ParseError::Truncated {
                section: "JOINTS",
                expected: usize::MAX
            })
        ));
        assert!(matches!(
            parse("t\nv\n18446744073709551615 0 0 0 0\n"),
            Err(ParseError::Truncated { section: "SHAPES", .. })
        ));
        assert!(matches!(
            parse("t\nv\n0 0 0 9223372036854775807 0\n"),
            Err(ParseError::Truncated { section: "MEMBERS", .. })
        ));
    }
}
