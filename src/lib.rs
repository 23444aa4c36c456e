#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_doc_code_examples)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod convert;
pub mod errors;
pub mod formats;
pub mod geometry;
pub mod mesh;
pub mod model;
pub mod prism;
pub mod report;
pub mod section;
pub mod units;
pub mod views;

pub use convert::{
    convert_batch, convert_file, convert_model, ConversionOptions, ConversionReport, FileOutcome,
    ViewOutcome, ViewStatus,
};
pub use errors::{
    ConvertError, ExportError, GeometryError, ModelError, OptionsError, ParseError, SectionError,
    UnknownViewError, ViewError,
};
pub use formats::{read_model, InputFormat, ParsedModel};
pub use geometry::{orthonormal_basis, plane_angle, point, rotation_matrix, Point};
pub use mesh::{export_obj, generate_view, write_obj, Mesh};
pub use model::{Member, ModelSource, Node, StructuralModel, ViewSet, ViewTag};
pub use prism::{circular_prism, rectangular_prism};
pub use report::{render_outcomes, render_report};
pub use section::{parse_shape_label, CrossSection, ShapeTable};
pub use units::{LengthUnit, SectionUnit, Units};
pub use views::{classify_views, BoundingExtremes};
