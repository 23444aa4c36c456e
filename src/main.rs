//! Command-line front end: convert structural model files into OBJ meshes.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use trussmesh::{convert_batch, render_outcomes, ConversionOptions, ViewTag};

/// Convert RISA-3D (.r3d) and ModelSmart (.3dd) models into Wavefront OBJ meshes
#[derive(Parser)]
#[command(name = "trussmesh")]
#[command(version, long_about = None)]
struct Cli {
    /// Model files to convert
    #[arg(required = true, name = "FILES")]
    files: Vec<PathBuf>,

    /// Views to write (3D, Top, Bottom, Side1, Side2)
    #[arg(long, value_delimiter = ',')]
    views: Option<Vec<ViewTag>>,

    /// Number of sides used for circular sections
    #[arg(long)]
    segments: Option<usize>,

    /// Decimals kept in exported coordinates
    #[arg(long)]
    precision: Option<u32>,

    /// Directory receiving the OBJ files
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Convert section dimensions into model length units
    #[arg(long)]
    scale_sections: bool,

    /// JSON options file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the run report as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Options from the config file (or defaults) with flags applied on top.
    fn options(&self) -> Result<ConversionOptions> {
        let mut options = match &self.config {
            Some(path) => ConversionOptions::from_json_file(path)?,
            None => ConversionOptions::default(),
        };
        if let Some(views) = &self.views {
            options.requested_views.clone_from(views);
        }
        if let Some(segments) = self.segments {
            options.segment_count = segments;
        }
        if let Some(precision) = self.precision {
            options.coordinate_precision = precision;
        }
        if let Some(out_dir) = &self.out_dir {
            options.destination_directory.clone_from(out_dir);
        }
        options.scale_sections |= self.scale_sections;
        options.validate()?;
        Ok(options)
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.options().context("invalid conversion options")?;
    let outcomes = convert_batch(&cli.files, &options);

    if cli.json {
        let json = serde_json::to_string_pretty(&outcomes).context("could not serialize report")?;
        println!("{json}");
    } else {
        print!("{}", render_outcomes(&outcomes));
    }

    if outcomes.iter().any(|outcome| outcome.is_failure()) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
