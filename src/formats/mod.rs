//! Readers for the supported structural model files.
//!
//! Both readers produce a [`ParsedModel`], which exposes the format-independent
//! [`ModelSource`] view the geometry core consumes.

pub mod modelsmart;
pub mod risa;

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::errors::ParseError;
use crate::model::{Member, ModelSource, Node};
use crate::units::Units;

/// File formats that can be converted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum InputFormat {
    /// RISA-3D text export (`.r3d`).
    Risa,
    /// ModelSmart text export (`.3dd`).
    ModelSmart,
}

impl InputFormat {
    /// Pick the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnsupportedFormat`] for any other extension.
    ///
    /// # Examples
    /// ```
    /// use std::path::Path;
    /// use trussmesh::InputFormat;
    ///
    /// let format = InputFormat::from_path(Path::new("bridge.R3D")).expect("known extension");
    /// assert_eq!(format, InputFormat::Risa);
    /// ```
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("r3d") => Ok(Self::Risa),
            Some("3dd") => Ok(Self::ModelSmart),
            _ => Err(ParseError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Parse `text` in this format.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first malformed part of the text.
    pub fn parse(self, text: &str) -> Result<ParsedModel, ParseError> {
        match self {
            Self::Risa => risa::parse(text),
            Self::ModelSmart => modelsmart::parse(text),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Risa => "RISA-3D",
            Self::ModelSmart => "ModelSmart",
        })
    }
}

/// Nodes and resolved members read from one file.
#[derive(Clone, Debug)]
pub struct ParsedModel {
    /// Format the model was read from.
    pub format: InputFormat,
    /// Units declared by the file.
    pub units: Units,
    /// Nodes in file order.
    pub nodes: Vec<Node>,
    /// Members with resolved sections.
    pub members: Vec<Member>,
}

impl ModelSource for ParsedModel {
    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn members(&self) -> &[Member] {
        &self.members
    }
}

/// Read and parse the model at `path`, choosing the reader by extension.
///
/// # Errors
///
/// Returns [`ParseError`] when the extension is unknown, the file cannot be
/// read or its content is malformed.
pub fn read_model(path: &Path) -> Result<ParsedModel, ParseError> {
    let format = InputFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model = format.parse(&text)?;
    info!(
        path = %path.display(),
        %format,
        nodes = model.nodes.len(),
        members = model.members.len(),
        units = ?model.units,
        "model parsed"
    );
    Ok(model)
}

/// Build a record error for 0-based line `index`.
pub(crate) fn invalid(index: usize, reason: impl Into<String>) -> ParseError {
    ParseError::InvalidRecord {
        line: index + 1,
        reason: reason.into(),
    }
}

/// Parse a numeric field, naming it in the error.
pub(crate) fn number<T: std::str::FromStr>(
    raw: Option<&str>,
    index: usize,
    field: &str,
) -> Result<T, ParseError> {
    let raw = raw.ok_or_else(|| invalid(index, format!("missing {field}")))?;
    raw.parse()
        .map_err(|_| invalid(index, format!("{field} `{raw}` is not a number")))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn detects_format_by_extension() {
        assert_eq!(
            InputFormat::from_path(Path::new("a/b/tower.r3d")).ok(),
            Some(InputFormat::Risa)
        );
        assert_eq!(
            InputFormat::from_path(Path::new("Test-truss.3DD")).ok(),
            Some(InputFormat::ModelSmart)
        );
        for path in ["truss.obj", "truss"] {
            assert!(matches!(
                InputFormat::from_path(Path::new(path)),
                Err(ParseError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn missing_files_are_reported() {
        let error = read_model(Path::new("definitely/not/here.r3d")).expect_err("no file");
        assert!(matches!(error, ParseError::Io { .. }));
    }

    #[test]
    fn number_errors_name_the_field() {
        let error = number::<f64>(Some("abc"), 4, "x coordinate").expect_err("not numeric");
        assert_eq!(error.to_string(), "line 5: x coordinate `abc` is not a number");
        let error = number::<f64>(None, 0, "rotation").expect_err("absent");
        assert_eq!(error.to_string(), "line 1: missing rotation");
    }
}
