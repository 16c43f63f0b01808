use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use aqualens_core::io::image_io::load_image;
use aqualens_core::pipeline::persist;
use aqualens_core::pipeline::types::CancelToken;
use aqualens_core::session::EnhanceSession;

use crate::report::print_quality_report;

#[derive(Args)]
pub struct QualityArgs {
    /// Input image (PNG, TIFF, JPEG)
    pub input: PathBuf,

    /// Preset JSON to load instead of defaults
    #[arg(long)]
    pub preset: Option<PathBuf>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &QualityArgs) -> Result<()> {
    let mut session = match &args.preset {
        Some(path) => EnhanceSession::with_config(persist::load_preset(path)?),
        None => EnhanceSession::new(),
    };
    session.load_source(load_image(&args.input)?)?;

    let report = session.analyze_quality(&CancelToken::new())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_quality_report(&report);
    }
    Ok(())
}
