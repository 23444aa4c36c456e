//! Plain-text summaries of conversion runs.

use std::fmt::Write;

use crate::convert::{ConversionReport, FileOutcome, ViewStatus};

/// Render the summary of one converted model.
///
/// The first line names the model and its size; each requested view follows
/// on its own indented line.
#[must_use]
pub fn render_report(report: &ConversionReport) -> String {
    let mut output = String::new();

    write!(
        &mut output,
        "{}: {} nodes, {} members",
        report.source_name, report.nodes, report.members
    )
    .expect("writing to string cannot fail");
    if let Some(format) = report.format {
        write!(&mut output, " ({format})").expect("writing to string cannot fail");
    }
    output.push('\n');

    for outcome in &report.views {
        let view = outcome.view;
        let written = match &outcome.status {
            ViewStatus::Written {
                path,
                vertices,
                faces,
            } => writeln!(
                &mut output,
                "  {view:<6} {vertices} vertices, {faces} faces -> {}",
                path.display()
            ),
            ViewStatus::Empty => writeln!(&mut output, "  {view:<6} no members, not written"),
            ViewStatus::Failed { message } => {
                writeln!(&mut output, "  {view:<6} failed: {message}")
            }
        };
        written.expect("writing to string cannot fail");
    }

    output
}

/// Render every file of a batch, failures included.
#[must_use]
pub fn render_outcomes(outcomes: &[FileOutcome]) -> String {
    outcomes
        .iter()
        .map(|outcome| match outcome {
            FileOutcome::Converted(report) => render_report(report),
            FileOutcome::Failed { path, message } => {
                format!("{}: not converted: {message}\n", path.display())
            }
        })
        .collect()
}
