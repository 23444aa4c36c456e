//! File-level conversion: options, the per-file pipeline and batch runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::errors::{ConvertError, ExportError, OptionsError, ParseError};
use crate::formats::{read_model, InputFormat, ParsedModel};
use crate::mesh::{export_obj, generate_view};
use crate::model::{StructuralModel, ViewSet, ViewTag};
use crate::units::Units;
use crate::views::classify_views;

/// Settings shared by every file of a run.
///
/// Every field has a default, so a JSON options file only needs the values it
/// changes.
///
/// # Examples
/// ```
/// use trussmesh::{ConversionOptions, ViewTag};
///
/// let options: ConversionOptions =
///     serde_json::from_str(r#"{ "segment_count": 8, "requested_views": ["3D", "Top"] }"#)
///         .expect("valid options");
/// assert_eq!(options.coordinate_precision, 3);
/// assert_eq!(options.requested_views, [ViewTag::ThreeD, ViewTag::Top]);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionOptions {
    /// Number of sides used for circular sections.
    pub segment_count: usize,
    /// Decimals kept in exported coordinates.
    pub coordinate_precision: u32,
    /// Views to generate, in output order.
    pub requested_views: Vec<ViewTag>,
    /// Directory receiving the OBJ files.
    pub destination_directory: PathBuf,
    /// Convert section dimensions into model length units before meshing.
    pub scale_sections: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            segment_count: 16,
            coordinate_precision: 3,
            requested_views: ViewTag::ALL.to_vec(),
            destination_directory: PathBuf::from("."),
            scale_sections: false,
        }
    }
}

impl ConversionOptions {
    /// Check that the options can produce geometry.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::SegmentCount`] for fewer than three segments and
    /// [`OptionsError::NoViews`] when no view is requested.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.segment_count < 3 {
            return Err(OptionsError::SegmentCount(self.segment_count));
        }
        if self.requested_views.is_empty() {
            return Err(OptionsError::NoViews);
        }
        Ok(())
    }

    /// Load and validate options from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError`] when the file cannot be read, is not valid
    /// JSON for these options, or fails [`validate`](Self::validate).
    pub fn from_json_file(path: &Path) -> Result<Self, OptionsError> {
        let text = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let options: Self = serde_json::from_str(&text).map_err(|source| OptionsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        options.validate()?;
        Ok(options)
    }
}

/// What happened to one requested view.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewStatus {
    /// The OBJ file was written.
    Written {
        /// Path of the OBJ file.
        path: PathBuf,
        /// Number of vertices written.
        vertices: usize,
        /// Number of faces written.
        faces: usize,
    },
    /// No member belongs to the view; nothing was written.
    Empty,
    /// The OBJ file could not be written.
    Failed {
        /// Description of the failure.
        message: String,
    },
}

/// Outcome of one view of one file.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewOutcome {
    /// The view.
    pub view: ViewTag,
    /// What happened to it.
    #[serde(flatten)]
    pub status: ViewStatus,
}

/// Summary of the conversion of one model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConversionReport {
    /// Base name used for the output files.
    pub source_name: String,
    /// Format of the source file, when converted from a file.
    pub format: Option<InputFormat>,
    /// Units declared by the source file, when converted from a file.
    pub units: Option<Units>,
    /// Number of nodes in the model.
    pub nodes: usize,
    /// Number of members in the model.
    pub members: usize,
    /// One entry per requested view, in request order.
    pub views: Vec<ViewOutcome>,
}

impl ConversionReport {
    /// Number of views written to disk.
    #[must_use]
    pub fn written(&self) -> usize {
        self.views
            .iter()
            .filter(|outcome| matches!(outcome.status, ViewStatus::Written { .. }))
            .count()
    }

    /// Returns true when any view failed to be written.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.views
            .iter()
            .any(|outcome| matches!(outcome.status, ViewStatus::Failed { .. }))
    }
}

/// Outcome of one file of a batch.
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The file was read and its views processed.
    Converted(ConversionReport),
    /// The file could not be converted at all.
    Failed {
        /// Source file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },
}

impl FileOutcome {
    /// Returns true when the file failed or any of its views did.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        match self {
            Self::Converted(report) => report.has_failures(),
            Self::Failed { .. } => true,
        }
    }
}

/// Views of `requested`, in order, without repeats.
fn distinct_views(requested: &[ViewTag]) -> Vec<ViewTag> {
    let mut seen = ViewSet::empty();
    requested
        .iter()
        .copied()
        .filter(|&view| {
            let fresh = !seen.contains(view);
            seen.insert(view);
            fresh
        })
        .collect()
}

/// Classify `model`, mesh each requested view and write the OBJ files.
///
/// Files are named `{source_name}_{view}.obj` inside the destination
/// directory, which is created when missing. Empty views are reported and not
/// written.
///
/// # Errors
///
/// Returns [`ExportError::Io`] when the destination directory cannot be
/// created. Failures to write individual views are recorded in the report.
pub fn convert_model(
    model: &mut StructuralModel,
    source_name: &str,
    options: &ConversionOptions,
) -> Result<ConversionReport, ExportError> {
    let directory = &options.destination_directory;
    std::fs::create_dir_all(directory).map_err(|source| ExportError::Io {
        path: directory.clone(),
        source,
    })?;

    classify_views(model);
    let model: &StructuralModel = model;

    let views = distinct_views(&options.requested_views)
        .into_iter()
        .map(|view| {
            let status = match generate_view(model, view, options) {
                Ok(mesh) => {
                    let mesh = mesh.rounded(options.coordinate_precision);
                    let path = directory.join(format!("{source_name}_{view}.obj"));
                    match export_obj(&mesh, &path) {
                        Ok(()) => {
                            info!(
                                path = %path.display(),
                                vertices = mesh.vertex_count(),
                                faces = mesh.face_count(),
                                "view written"
                            );
                            ViewStatus::Written {
                                path,
                                vertices: mesh.vertex_count(),
                                faces: mesh.face_count(),
                            }
                        }
                        Err(err) => {
                            error!(%err, "view not written");
                            ViewStatus::Failed {
                                message: err.to_string(),
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(source = source_name, %err, "view skipped");
                    ViewStatus::Empty
                }
            };
            ViewOutcome { view, status }
        })
        .collect();

    Ok(ConversionReport {
        source_name: source_name.to_owned(),
        format: None,
        units: None,
        nodes: model.node_count(),
        members: model.member_count(),
        views,
    })
}

/// Express every section in the model's coordinate unit.
fn scale_sections(parsed: &mut ParsedModel) {
    let factor = parsed.units.section_scale();
    for member in &mut parsed.members {
        member.section = member.section.scaled(factor);
    }
}

/// Read the model at `path` and convert it.
///
/// Output files take the file stem of `path` as their base name.
///
/// # Errors
///
/// Returns [`ConvertError::Parse`] when the file cannot be read or is
/// malformed, and [`ConvertError::Export`] when the destination directory
/// cannot be created.
pub fn convert_file(
    path: &Path,
    options: &ConversionOptions,
) -> Result<ConversionReport, ConvertError> {
    let mut parsed = read_model(path)?;
    if options.scale_sections {
        scale_sections(&mut parsed);
    }
    let mut model = StructuralModel::from_source(&parsed).map_err(ParseError::from)?;
    let source_name = path
        .file_stem()
        .map_or_else(|| "model".into(), |stem| stem.to_string_lossy());
    let mut report = convert_model(&mut model, &source_name, options)?;
    report.format = Some(parsed.format);
    report.units = Some(parsed.units);
    Ok(report)
}

/// Convert each file independently.
///
/// A file that fails is logged and reported; the remaining files are still
/// converted.
pub fn convert_batch(paths: &[impl AsRef<Path>], options: &ConversionOptions) -> Vec<FileOutcome> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            match convert_file(path, options) {
                Ok(report) => FileOutcome::Converted(report),
                Err(err) => {
                    error!(path = %path.display(), %err, "conversion failed");
                    FileOutcome::Failed {
                        path: path.to_path_buf(),
                        message: err.to_string(),
                    }
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;
    use crate::model::{Member, Node};
    use crate::section::CrossSection;

    fn options_in(directory: &Path) -> ConversionOptions {
        ConversionOptions {
            destination_directory: directory.to_path_buf(),
            ..ConversionOptions::default()
        }
    }

    #[test]
    fn defaults_are_valid() {
        let options = ConversionOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.segment_count, 16);
        assert_eq!(options.requested_views.len(), 5);
        assert!(!options.scale_sections);
    }

    #[test]
    fn validation_rejects_unusable_options() {
        let options = ConversionOptions {
            segment_count: 2,
            ..ConversionOptions::default()
        };
        assert!(matches!(options.validate(), Err(OptionsError::SegmentCount(2))));

        let options = ConversionOptions {
            requested_views: Vec::new(),
            ..ConversionOptions::default()
        };
        assert!(matches!(options.validate(), Err(OptionsError::NoViews)));
    }

    #[test]
    fn options_load_from_json() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{ "coordinate_precision": 5, "scale_sections": true }"#)
            .expect("write options");
        let options = ConversionOptions::from_json_file(&path).expect("valid options");
        assert_eq!(options.coordinate_precision, 5);
        assert!(options.scale_sections);
        assert_eq!(options.segment_count, 16);

        std::fs::write(&path, r#"{ "segment_count": 1 }"#).expect("write options");
        assert!(matches!(
            ConversionOptions::from_json_file(&path),
            Err(OptionsError::SegmentCount(1))
        ));

        std::fs::write(&path, r#"{ "segments": 8 }"#).expect("write options");
        assert!(matches!(
            ConversionOptions::from_json_file(&path),
            Err(OptionsError::Json { .. })
        ));
    }

    #[test]
    fn repeated_views_are_processed_once() {
        let views = distinct_views(&[ViewTag::Top, ViewTag::ThreeD, ViewTag::Top]);
        assert_eq!(views, [ViewTag::Top, ViewTag::ThreeD]);
    }

    #[test]
    fn model_conversion_writes_nonempty_views() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let out = dir.path().join("nested").join("out");
        let mut model = StructuralModel::from_parts(
            [
                Node::new("A", point(0.0, 0.0, 0.0)),
                Node::new("B", point(10.0, 0.0, 0.0)),
            ],
            [Member::new("M1", 1, 2).with_section(CrossSection::rectangle(4.0, 2.0))],
        )
        .expect("valid model");

        let report = convert_model(&mut model, "beam", &options_in(&out)).expect("directory");
        assert_eq!(report.views.len(), 5);
        // A single member touches every bounding plane.
        assert_eq!(report.written(), 5);
        assert!(!report.has_failures());
        let expected = out.join("beam_3D.obj");
        assert_eq!(
            report.views[0].status,
            ViewStatus::Written {
                path: expected.clone(),
                vertices: 8,
                faces: 6
            }
        );
        assert!(expected.is_file());
    }

    #[test]
    fn section_scaling_uses_declared_units() {
        let text = "t\nv\n1 0 2 1 1\n1 0 0 0\n2 1 0 0\n1 BAR 100 0 50\n1 1 2 1\n";
        let mut parsed = InputFormat::ModelSmart.parse(text).expect("valid text");
        scale_sections(&mut parsed);
        let CrossSection::Rectangular { width, height, .. } = parsed.members[0].section else {
            panic!("rectangular section expected");
        };
        approx::assert_relative_eq!(width, 0.05, epsilon = 1.0e-12);
        approx::assert_relative_eq!(height, 0.1, epsilon = 1.0e-12);
    }
}
