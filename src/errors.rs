//! Error types produced while reading models and generating meshes.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ViewTag;

/// Error returned when a member cannot be turned into a solid.
///
/// These are local to a single member: the assembler logs them and moves on to
/// the next member.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum GeometryError {
    /// Returned when the two endpoints of a member coincide.
    #[error("endpoints coincide; cannot build a frame along a zero-length axis")]
    DegenerateGeometry,
    /// Returned when a circular section is tessellated with fewer than three segments.
    #[error("circular sections need at least 3 segments (received {0})")]
    TooFewSegments(usize),
}

/// Error returned when a shape label cannot be resolved into dimensions.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SectionError {
    /// Returned when a label is neither in the shapes table nor parseable.
    #[error("shape `{label}` is not in the shapes table and its dimensions cannot be parsed")]
    Unresolved {
        /// The offending shape label.
        label: String,
    },
}

/// Error returned when a view name is not recognised.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown view `{0}`; expected one of 3D, Top, Bottom, Side1, Side2")]
pub struct UnknownViewError(pub String);

/// Error returned when assembling a model with invalid connectivity.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    /// Returned when a member references a node outside `1..=node_count`.
    #[error("member `{member}` references node {index}, but the model has {node_count} nodes")]
    UnknownNode {
        /// Label of the offending member.
        member: String,
        /// The 1-based node index that was requested.
        index: usize,
        /// Number of nodes available.
        node_count: usize,
    },
}

/// Error returned when a source file is malformed.
///
/// Any of these aborts the conversion of the affected file only.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Returned when the file cannot be read.
    #[error("could not read {path}: {source}")]
    Io {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Returned when the file extension does not name a supported format.
    #[error("unsupported model format for {0}; expected .r3d or .3dd")]
    UnsupportedFormat(PathBuf),
    /// Returned when a required section is absent.
    #[error("required section `{0}` is missing")]
    MissingSection(&'static str),
    /// Returned when a section header does not carry a usable entry count.
    #[error("section `{section}` has no entry count (line {line})")]
    MissingCount {
        /// Section heading.
        section: &'static str,
        /// 1-based line number of the heading.
        line: usize,
    },
    /// Returned when the file ends before all announced records were read.
    #[error("section `{section}` announced {expected} records but the file ended")]
    Truncated {
        /// Section heading.
        section: &'static str,
        /// Number of records the heading announced.
        expected: usize,
    },
    /// Returned when a record cannot be interpreted.
    #[error("line {line}: {reason}")]
    InvalidRecord {
        /// 1-based line number of the record.
        line: usize,
        /// Description of what went wrong.
        reason: String,
    },
    /// Returned when the parsed records do not form a valid model.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Outcome of a view that produced no geometry.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    /// Returned when no eligible member contributed any vertex to the view.
    #[error("no members found for the {0} view")]
    EmptyView(ViewTag),
}

/// Error returned when writing an OBJ file.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Returned when the destination cannot be written.
    #[error("could not write {path}: {source}")]
    Io {
        /// Destination file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Error returned when conversion options are not usable.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Returned when the tessellation detail is below a triangle.
    #[error("segment count must be at least 3 (received {0})")]
    SegmentCount(usize),
    /// Returned when no view was requested.
    #[error("at least one view must be requested")]
    NoViews,
    /// Returned when the options file cannot be read.
    #[error("could not read options file {path}: {source}")]
    Io {
        /// Options file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Returned when the options file is not valid JSON for
    /// [`ConversionOptions`](crate::ConversionOptions).
    #[error("invalid options file {path}: {source}")]
    Json {
        /// Options file.
        path: PathBuf,
        /// Underlying deserialization failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Error returned when a whole file cannot be converted.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The source file could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The destination directory could not be prepared.
    #[error(transparent)]
    Export(#[from] ExportError),
}
