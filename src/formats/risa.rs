//! Reader for RISA-3D text exports (`.r3d`).
//!
//! The file is a sequence of bracketed sections such as `[NODES] <12>`, where
//! the number in angle brackets is the count of record lines that follow.
//! Only the sections needed for geometry are read; everything else is skipped.

use crate::errors::ParseError;
use crate::formats::{invalid, number, InputFormat, ParsedModel};
use crate::geometry::Point;
use crate::model::{Member, Node};
use crate::section::{CrossSection, ShapeTable};
use crate::units::{LengthUnit, SectionUnit, Units};

/// Sections the reader understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    /// `[UNITS]`
    Units,
    /// `[NODES]`
    Nodes,
    /// `[.MEMBERS_MAIN_DATA]`
    Members,
    /// `[SHAPES_LIST]`
    Shapes,
}

impl Section {
    /// Every section, with the heading text that introduces it.
    const HEADINGS: [(Self, &'static str); 4] = [
        (Self::Units, "UNITS"),
        (Self::Nodes, "NODES"),
        (Self::Members, ".MEMBERS_MAIN_DATA"),
        (Self::Shapes, "SHAPES_LIST"),
    ];

    /// Section introduced by `line`, if any.
    fn of_heading(line: &str) -> Option<(Self, &'static str)> {
        let line = line.trim_start();
        Self::HEADINGS.into_iter().find(|(_, name)| {
            line.strip_prefix('[')
                .and_then(|rest| rest.strip_prefix(name))
                .is_some_and(|rest| rest.starts_with(']'))
        })
    }
}

/// Record count at the end of a heading line, as in `[NODES] <12>`.
fn entry_count(line: &str) -> Option<usize> {
    let (_, tail) = line.rsplit_once('<')?;
    tail.trim().trim_end_matches('>').trim().parse().ok()
}

/// One record line split into its quoted fields and its bare values.
#[derive(Debug, Default)]
struct Record<'a> {
    /// Double-quoted fields, in order.
    quoted: Vec<&'a str>,
    /// Whitespace-separated unquoted tokens, in order.
    values: Vec<&'a str>,
}

impl<'a> Record<'a> {
    /// Split a record, dropping the trailing `;`.
    fn tokenize(line: &'a str) -> Self {
        let mut record = Self::default();
        let mut rest = line.trim().trim_end_matches(';');
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            if let Some(after) = rest.strip_prefix('"') {
                let (field, tail) = after.split_once('"').unwrap_or((after, ""));
                record.quoted.push(field.trim());
                rest = tail;
            } else {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '"')
                    .unwrap_or(rest.len());
                record.values.push(&rest[..end]);
                rest = &rest[end..];
            }
        }
        record
    }

    /// Quoted field `position`, or a record error.
    fn label(&self, position: usize, index: usize, field: &str) -> Result<&'a str, ParseError> {
        self.quoted
            .get(position)
            .copied()
            .ok_or_else(|| invalid(index, format!("missing quoted {field}")))
    }

    /// Bare value `position` parsed as a number.
    fn value<T: std::str::FromStr>(
        &self,
        position: usize,
        index: usize,
        field: &str,
    ) -> Result<T, ParseError> {
        number(self.values.get(position).copied(), index, field)
    }
}

/// Member fields before the shape is resolved.
struct MemberRecord {
    /// Member label.
    label: String,
    /// Shape name, looked up once every section has been read.
    shape_label: String,
    /// 1-based `i` node.
    start_node: usize,
    /// 1-based `j` node.
    end_node: usize,
    /// Roll about the member axis, in degrees.
    rotation: f64,
}

impl MemberRecord {
    /// Resolve the shape and build the member.
    fn resolve(self, shapes: &ShapeTable) -> Member {
        let section = shapes.resolve(&self.shape_label);
        Member::new(self.label, self.start_node, self.end_node)
            .with_rotation(self.rotation)
            .with_section(section)
            .with_shape_label(self.shape_label)
    }
}

/// `_ length_code section_code`
fn parse_units(records: &[&str], first: usize) -> Result<Units, ParseError> {
    let Some(line) = records.first() else {
        return Ok(Units::default());
    };
    let tokens: Vec<&str> = line.trim().trim_end_matches(';').split_whitespace().collect();
    let length_code = number(tokens.get(1).copied(), first, "length unit code")?;
    let section_code = number(tokens.get(2).copied(), first, "section unit code")?;
    Ok(Units {
        length: LengthUnit::from_code(length_code)
            .ok_or_else(|| invalid(first, format!("unknown length unit code {length_code}")))?,
        section: SectionUnit::from_code(section_code)
            .ok_or_else(|| invalid(first, format!("unknown section unit code {section_code}")))?,
    })
}

/// `"label" x y z ...`
fn parse_nodes(records: &[&str], first: usize) -> Result<Vec<Node>, ParseError> {
    records
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            let index = first + offset;
            let record = Record::tokenize(line);
            let label = record.label(0, index, "node label")?;
            let position = Point::new(
                record.value(0, index, "x coordinate")?,
                record.value(1, index, "y coordinate")?,
                record.value(2, index, "z coordinate")?,
            );
            Ok(Node::new(label, position))
        })
        .collect()
}

/// `"label" "design list" "shape" i j k rotation ...`
fn parse_members(records: &[&str], first: usize) -> Result<Vec<MemberRecord>, ParseError> {
    records
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            let index = first + offset;
            let record = Record::tokenize(line);
            Ok(MemberRecord {
                label: record.label(0, index, "member label")?.to_owned(),
                shape_label: record.label(2, index, "shape label")?.to_owned(),
                start_node: record.value(0, index, "i node")?,
                end_node: record.value(1, index, "j node")?,
                rotation: record.value(3, index, "rotation")?,
            })
        })
        .collect()
}

/// `"name" p0 p1 p2 p3 depth thickness width ...`
///
/// A zero width marks a round shape whose depth column holds the diameter.
#[allow(clippy::float_cmp)]
fn parse_shapes(records: &[&str], first: usize) -> Result<ShapeTable, ParseError> {
    records
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            let index = first + offset;
            let record = Record::tokenize(line);
            let name = record.label(0, index, "shape name")?;
            let depth: f64 = record.value(4, index, "shape depth")?;
            let thickness: f64 = record.value(5, index, "wall thickness")?;
            let width: f64 = record.value(6, index, "shape width")?;
            let section = if width == 0.0 {
                CrossSection::from_diameter(depth)
            } else {
                CrossSection::Rectangular {
                    width,
                    height: depth,
                    wall_thickness: Some(thickness),
                }
            };
            Ok((name.to_owned(), section))
        })
        .collect()
}

/// Parse the text of a RISA-3D export.
///
/// `[NODES]` and `[.MEMBERS_MAIN_DATA]` are required. Without `[UNITS]` the
/// model is taken to be in feet with sections in inches; without
/// `[SHAPES_LIST]` every section is parsed from its label.
///
/// # Errors
///
/// Returns [`ParseError`] when a required section is missing, a heading has no
/// record count, the file ends early or a record cannot be read.
pub fn parse(text: &str) -> Result<ParsedModel, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut units = None;
    let mut nodes = None;
    let mut members = None;
    let mut shapes = ShapeTable::new();

    let mut index = 0;
    while index < lines.len() {
        let Some((section, name)) = Section::of_heading(lines[index]) else {
            index += 1;
            continue;
        };
        let count = entry_count(lines[index]).ok_or(ParseError::MissingCount {
            section: name,
            line: index + 1,
        })?;
        let first = index + 1;
        let records = first
            .checked_add(count)
            .and_then(|end| lines.get(first..end))
            .ok_or(ParseError::Truncated {
                section: name,
                expected: count,
            })?;
        match section {
            Section::Units => units = Some(parse_units(records, first)?),
            Section::Nodes => nodes = Some(parse_nodes(records, first)?),
            Section::Members => members = Some(parse_members(records, first)?),
            Section::Shapes => shapes = parse_shapes(records, first)?,
        }
        index = first + count;
    }

    let nodes = nodes.ok_or(ParseError::MissingSection("NODES"))?;
    let members = members
        .ok_or(ParseError::MissingSection(".MEMBERS_MAIN_DATA"))?
        .into_iter()
        .map(|record| record.resolve(&shapes))
        .collect();

    Ok(ParsedModel {
        format: InputFormat::Risa,
        units: units.unwrap_or_default(),
        nodes,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;

    const SAMPLE: &str = r#"[VERSION] <1>
"RISA-3D" 17.0 ;
[END_VERSION]
[UNITS] <1>
"Units" 2 2 ;
[END_UNITS]
[NODES] <3>
"N1" 0 0 0 0 0 ;
"N2" 10 0 0 0 0 ;
"N3" 10 5.5 -2 0 0 ;
[END_NODES]
[.MEMBERS_MAIN_DATA] <3>
"M1" "Beams" "TUBE 4x2" 1 2 0 0 0 0 0 1 ;
"M2" "Pipes" "PIPE3X" 2 3 0 45 0 0 0 1 ;
"M3" "Misc" "W8" 1 3 0 0 0 0 0 1 ;
[END_.MEMBERS_MAIN_DATA]
[SHAPES_LIST] <2>
"TUBE 4x2" 0 0 0 0 4 0.25 2 ;
"ROD1" 0 0 0 0 1.5 0 0 ;
[END_SHAPES_LIST]
"#;

    #[test]
    fn tokenizer_separates_quoted_and_bare_fields() {
        let record = Record::tokenize(r#""M1" "Beam list" "HSS4X4X4" 1 2 0 90;"#);
        assert_eq!(record.quoted, ["M1", "Beam list", "HSS4X4X4"]);
        assert_eq!(record.values, ["1", "2", "0", "90"]);
    }

    #[test]
    fn heading_detection_ignores_end_markers() {
        assert_eq!(
            Section::of_heading("[NODES] <3>").map(|(s, _)| s),
            Some(Section::Nodes)
        );
        assert!(Section::of_heading("[END_NODES]").is_none());
        assert!(Section::of_heading("[NODE_LOADS] <1>").is_none());
        assert_eq!(entry_count("[.MEMBERS_MAIN_DATA] <42>"), Some(42));
        assert_eq!(entry_count("[NODES]"), None);
    }

    #[test]
    fn parses_sample_model() {
        let model = parse(SAMPLE).expect("valid RISA text");
        assert_eq!(model.format, InputFormat::Risa);
        assert_eq!(
            model.units,
            Units {
                length: LengthUnit::Meters,
                section: SectionUnit::Millimeters
            }
        );
        assert_eq!(model.nodes.len(), 3);
        assert_eq!(model.nodes[2], Node::new("N3", point(10.0, 5.5, -2.0)));

        let [tube, pipe, unknown] = model.members.as_slice() else {
            panic!("expected three members, got {}", model.members.len());
        };
        // Shapes listed after the members still resolve through the table.
        assert_eq!(
            tube.section,
            CrossSection::Rectangular {
                width: 2.0,
                height: 4.0,
                wall_thickness: Some(0.25)
            }
        );
        assert_eq!((tube.start_node, tube.end_node), (1, 2));
        assert_eq!(pipe.section, CrossSection::Circular { radius: 1.5 });
        assert!((pipe.rotation - 45.0).abs() < f64::EPSILON);
        assert_eq!(pipe.shape_label, "PIPE3X");
        assert_eq!(unknown.section, CrossSection::EMPTY);
    }

    #[test]
    fn missing_units_default_to_imperial() {
        let text = concat!(
            "[NODES] <2>\n\"A\" 0 0 0 ;\n\"B\" 0 1 0 ;\n",
            "[.MEMBERS_MAIN_DATA] <1>\n\"M\" \"\" \"ROD1X\" 1 2 0 0 ;\n",
        );
        let model = parse(text).expect("valid RISA text");
        assert_eq!(model.units, Units::default());
        assert_eq!(
            model.members[0].section,
            CrossSection::Circular { radius: 0.5 }
        );
    }

    #[test]
    fn reports_structural_problems() {
        assert!(matches!(
            parse("[NODES] <1>\n\"A\" 0 0 0 ;\n"),
            Err(ParseError::MissingSection(".MEMBERS_MAIN_DATA"))
        ));
        assert!(matches!(
            parse("[NODES]\n"),
            Err(ParseError::MissingCount { section: "NODES", line: 1 })
        ));
        assert!(matches!(
            parse("[NODES] <3>\n\"A\" 0 0 0 ;\n"),
            Err(ParseError::Truncated { section: "NODES", expected: 3 })
        ));
        assert!(matches!(
            parse("[NODES] <1>\n\"A\" 0 zero 0 ;\n"),
            Err(ParseError::InvalidRecord { line: 2, .. })
        ));
        assert!(matches!(
            parse("[UNITS] <1>\n\"Units\" 9 0 ;\n"),
            Err(ParseError::InvalidRecord { line: 2, .. })
        ));
    }

    #[test]
    fn oversized_counts_are_truncation_errors() {
        assert!(matches!(
            parse("[NODES] <18446744073709551615>\n\"A\" 0 0 0 ;\n"),
            Err(ParseError::Truncated {
                section: "NODES",
                expected: usize::MAX
            })
        ));
        assert!(matches!(
            parse("[.MEMBERS_MAIN_DATA] <4000000000>\n"),
            Err(ParseError::Truncated { section: ".MEMBERS_MAIN_DATA", .. })
        ));
    }
}
