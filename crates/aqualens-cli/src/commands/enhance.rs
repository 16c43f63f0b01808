use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use aqualens_core::io::image_io::{load_image, save_image};
use aqualens_core::pipeline::persist;
use aqualens_core::pipeline::types::{CancelToken, Context, MessageKey, ProgressSink};
use aqualens_core::session::EnhanceSession;

use crate::progress::BarSink;

#[derive(Args)]
pub struct EnhanceArgs {
    /// Input image (PNG, TIFF, JPEG)
    pub input: PathBuf,

    /// Output file; format chosen by extension
    #[arg(short, long)]
    pub output: PathBuf,

    /// Preset JSON to load instead of defaults
    #[arg(long)]
    pub preset: Option<PathBuf>,

    /// Disable auto-tuning; use preset or default parameters as-is
    #[arg(long)]
    pub no_auto: bool,

    /// Save the preview-resolution result instead of full resolution
    #[arg(long)]
    pub preview: bool,
}

pub fn run(args: &EnhanceArgs) -> Result<()> {
    let mut session = match &args.preset {
        Some(path) => EnhanceSession::with_config(persist::load_preset(path)?),
        None => EnhanceSession::new(),
    };
    if args.no_auto {
        session.global_auto_tune(false);
    }

    session.load_source(load_image(&args.input)?)?;

    let sink = Arc::new(BarSink::new());
    let ctx = Context::new(sink.clone(), CancelToken::new());

    let result = if args.preview {
        session.process_preview(&ctx)?
    } else {
        session.process_full(&ctx)?
    };

    sink.report(MessageKey::SavePrepare, 100);
    sink.report(MessageKey::SaveWrite, 100);
    save_image(&result, &args.output)?;
    sink.finish();

    println!("Saved {}", args.output.display());
    Ok(())
}
