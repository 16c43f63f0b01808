use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use aqualens_core::pipeline::config::PipelineConfig;
use aqualens_core::pipeline::persist;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the default preset to this path instead of printing it
    #[arg(long)]
    pub write: Option<PathBuf>,

    /// Validate an existing preset file and echo the effective config
    #[arg(long)]
    pub check: Option<PathBuf>,
}

pub fn run(args: &ConfigArgs) -> Result<()> {
    if let Some(path) = &args.check {
        let config = persist::load_preset(path)?;
        println!("{}", persist::to_json(&config)?);
        return Ok(());
    }

    let config = PipelineConfig::default();
    match &args.write {
        Some(path) => {
            persist::save_preset(&config, path)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", persist::to_json(&config)?),
    }
    Ok(())
}
