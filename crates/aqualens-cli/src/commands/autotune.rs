use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use aqualens_core::autotune::classify_water;
use aqualens_core::io::image_io::load_image;
use aqualens_core::pipeline::persist;
use aqualens_core::session::EnhanceSession;

#[derive(Args)]
pub struct AutotuneArgs {
    /// Input image (PNG, TIFF, JPEG)
    pub file: PathBuf,

    /// Pretty-print the configuration JSON
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: &AutotuneArgs) -> Result<()> {
    let mut session = EnhanceSession::new();
    session.load_source(load_image(&args.file)?)?;

    if let Some(sig) = session.signature() {
        eprintln!("water type: {}", classify_water(sig));
    }
    let json = if args.pretty {
        persist::to_json(session.config())?
    } else {
        persist::to_json_compact(session.config())?
    };
    println!("{json}");
    Ok(())
}
