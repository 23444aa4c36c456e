//! Cross-section profiles and their resolution from shape labels.

use std::collections::HashMap;

use tracing::{error, warn};

use crate::errors::SectionError;

/// The 2D profile swept along a member's centreline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CrossSection {
    /// A solid or tube rectangle.
    Rectangular {
        /// Extent along the first cross-section axis.
        width: f64,
        /// Extent along the second cross-section axis.
        height: f64,
        /// Wall thickness of tube profiles. Not used geometrically.
        wall_thickness: Option<f64>,
    },
    /// A round bar or pipe.
    Circular {
        /// Outer radius.
        radius: f64,
    },
}

impl CrossSection {
    /// Zero-size rectangle given to members whose shape cannot be resolved.
    pub const EMPTY: Self = Self::Rectangular {
        width: 0.0,
        height: 0.0,
        wall_thickness: None,
    };

    /// Rectangular section without wall thickness.
    #[must_use]
    pub const fn rectangle(width: f64, height: f64) -> Self {
        Self::Rectangular {
            width,
            height,
            wall_thickness: None,
        }
    }

    /// Circular section from its outer diameter.
    #[must_use]
    pub fn from_diameter(diameter: f64) -> Self {
        Self::Circular {
            radius: diameter / 2.0,
        }
    }

    /// Returns true for round profiles.
    #[must_use]
    pub const fn is_circular(&self) -> bool {
        matches!(self, Self::Circular { .. })
    }

    /// Multiply every dimension by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        match self {
            Self::Rectangular {
                width,
                height,
                wall_thickness,
            } => Self::Rectangular {
                width: width * factor,
                height: height * factor,
                wall_thickness: wall_thickness.map(|t| t * factor),
            },
            Self::Circular { radius } => Self::Circular {
                radius: radius * factor,
            },
        }
    }
}

impl Default for CrossSection {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Named shapes declared by a model file, keyed by shape name.
#[derive(Clone, Debug, Default)]
pub struct ShapeTable {
    /// Shapes by exact name.
    shapes: HashMap<String, CrossSection>,
}

impl ShapeTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shape, replacing any previous entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, section: CrossSection) {
        self.shapes.insert(name.into(), section);
    }

    /// Look up a shape by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<CrossSection> {
        self.shapes.get(name).copied()
    }

    /// Number of registered shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns true when no shape is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Resolve a member's section: table first, then the label itself.
    ///
    /// A miss in the table is logged as a warning. A label that cannot be parsed
    /// either is logged as an error and yields [`CrossSection::EMPTY`], which
    /// produces an invisible member rather than aborting the file.
    #[must_use]
    pub fn resolve(&self, label: &str) -> CrossSection {
        if let Some(section) = self.get(label) {
            return section;
        }
        warn!(shape = label, "shape not found, attempting to parse dimensions from label");
        match parse_shape_label(label) {
            Ok(section) => section,
            Err(err) => {
                error!(%err, "member gets a zero-size section");
                CrossSection::EMPTY
            }
        }
    }
}

impl FromIterator<(String, CrossSection)> for ShapeTable {
    fn from_iter<I: IntoIterator<Item = (String, CrossSection)>>(iter: I) -> Self {
        Self {
            shapes: iter.into_iter().collect(),
        }
    }
}

/// Keep only the characters that can appear in a decimal number.
fn clean_dimension(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Parse one `X`-separated component of a shape label.
fn dimension(raw: &str, label: &str) -> Result<f64, SectionError> {
    clean_dimension(raw)
        .parse()
        .map_err(|_| SectionError::Unresolved {
            label: label.to_owned(),
        })
}

/// Derive a section from a label that encodes its dimensions.
///
/// `"HxWxT"` (three components) is a rectangle of height `H`, width `W` and
/// wall thickness `T`; `"Dx..."` (two components) is a round section of outer
/// diameter `D`. Letters in each component are ignored, so `"HSS4X6X.25"` and
/// `"PIPE2.5X"` both parse.
///
/// # Errors
///
/// Returns [`SectionError::Unresolved`] when the label has another number of
/// components or a component holds no number.
///
/// # Examples
/// ```
/// use trussmesh::{parse_shape_label, CrossSection};
///
/// let tube = parse_shape_label("HSS4X6X.25").expect("rectangular label");
/// assert_eq!(
///     tube,
///     CrossSection::Rectangular { width: 6.0, height: 4.0, wall_thickness: Some(0.25) }
/// );
/// let pipe = parse_shape_label("PIPE3X").expect("round label");
/// assert_eq!(pipe, CrossSection::Circular { radius: 1.5 });
/// ```
pub fn parse_shape_label(label: &str) -> Result<CrossSection, SectionError> {
    let upper = label.to_uppercase();
    let parts: Vec<&str> = upper.split('X').collect();
    match parts.as_slice() {
        [diameter, _] => Ok(CrossSection::from_diameter(dimension(diameter, label)?)),
        [height, width, thickness] => Ok(CrossSection::Rectangular {
            width: dimension(width, label)?,
            height: dimension(height, label)?,
            wall_thickness: Some(dimension(thickness, label)?),
        }),
        _ => Err(SectionError::Unresolved {
            label: label.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_part_labels_as_rectangles() {
        let section = parse_shape_label("RE2x4x0.5").expect("valid label");
        assert_eq!(
            section,
            CrossSection::Rectangular {
                width: 4.0,
                height: 2.0,
                wall_thickness: Some(0.5)
            }
        );
    }

    #[test]
    fn parses_two_part_labels_as_diameters() {
        let section = parse_shape_label("pipe_4.5x").expect("valid label");
        assert_eq!(section, CrossSection::Circular { radius: 2.25 });
        assert!(section.is_circular());
    }

    #[test]
    fn rejects_labels_without_dimensions() {
        for label in ["W8", "AxBxC", "1X2X3X4", ""] {
            let error = parse_shape_label(label).expect_err("label rejected");
            assert_eq!(
                error,
                SectionError::Unresolved {
                    label: label.to_owned()
                }
            );
        }
    }

    #[test]
    fn table_lookup_takes_precedence_over_label() {
        let mut table = ShapeTable::new();
        table.insert("2X4X1", CrossSection::rectangle(10.0, 20.0));
        assert_eq!(table.resolve("2X4X1"), CrossSection::rectangle(10.0, 20.0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn falls_back_to_label_then_to_empty_section() {
        let table = ShapeTable::new();
        assert!(table.is_empty());
        assert_eq!(table.resolve("PIPE2X"), CrossSection::Circular { radius: 1.0 });
        assert_eq!(table.resolve("W10"), CrossSection::EMPTY);
    }

    #[test]
    fn scaling_touches_every_dimension() {
        let tube = CrossSection::Rectangular {
            width: 2.0,
            height: 3.0,
            wall_thickness: Some(0.5),
        };
        assert_eq!(
            tube.scaled(2.0),
            CrossSection::Rectangular {
                width: 4.0,
                height: 6.0,
                wall_thickness: Some(1.0)
            }
        );
        assert_eq!(
            CrossSection::Circular { radius: 1.0 }.scaled(0.5),
            CrossSection::Circular { radius: 0.5 }
        );
    }
}
