use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;

use aqualens_core::error::Result as CoreResult;
use aqualens_core::frame::Image;
use aqualens_core::io::image_io::{load_image, save_image};
use aqualens_core::pipeline::persist;
use aqualens_core::pipeline::types::{CancelToken, Context};
use aqualens_core::session::EnhanceSession;
use aqualens_core::video::{FrameSink, FrameSource};

use crate::progress::BarSink;

const FRAME_EXTENSIONS: [&str; 5] = ["png", "tif", "tiff", "jpg", "jpeg"];

#[derive(Args)]
pub struct VideoArgs {
    /// Directory of decoded frames, processed in name order
    pub input_dir: PathBuf,

    /// Output directory for processed frames
    pub output_dir: PathBuf,

    /// Preset JSON to load instead of defaults
    #[arg(long)]
    pub preset: Option<PathBuf>,
}

/// Frame source reading an image sequence from a directory.
struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    index: usize,
}

impl ImageSequenceSource {
    fn open(dir: &Path) -> Result<Self> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("reading {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();
        anyhow::ensure!(!paths.is_empty(), "no frames found in {}", dir.display());
        Ok(Self { paths, index: 0 })
    }
}

impl FrameSource for ImageSequenceSource {
    fn frame_count(&self) -> usize {
        self.paths.len()
    }

    fn next_frame(&mut self) -> CoreResult<Option<Image>> {
        if self.index >= self.paths.len() {
            return Ok(None);
        }
        let image = load_image(&self.paths[self.index])?;
        self.index += 1;
        Ok(Some(image))
    }
}

/// Frame sink writing numbered PNG frames.
struct ImageSequenceSink {
    dir: PathBuf,
    index: usize,
}

impl FrameSink for ImageSequenceSink {
    fn write_frame(&mut self, frame: &Image) -> CoreResult<()> {
        let path = self.dir.join(format!("frame_{:06}.png", self.index));
        save_image(frame, &path)?;
        self.index += 1;
        Ok(())
    }
}

pub fn run(args: &VideoArgs) -> Result<()> {
    fs::create_dir_all(&args.output_dir)?;

    let mut session = match &args.preset {
        Some(path) => EnhanceSession::with_config(persist::load_preset(path)?),
        None => EnhanceSession::new(),
    };

    let mut source = ImageSequenceSource::open(&args.input_dir)?;

    // Tune once from the first frame; the config then stays frozen for the run.
    let first = load_image(&source.paths[0])?;
    session.load_source(first)?;

    let mut sink = ImageSequenceSink {
        dir: args.output_dir.clone(),
        index: 0,
    };

    let bar = Arc::new(BarSink::new());
    let ctx = Context::new(bar.clone(), CancelToken::new());
    let summary = session.process_video(&mut source, &mut sink, &ctx)?;
    bar.finish();

    println!(
        "Processed {} frames into {} ({} degraded)",
        summary.frames_processed,
        args.output_dir.display(),
        summary.degraded_frames
    );
    Ok(())
}
