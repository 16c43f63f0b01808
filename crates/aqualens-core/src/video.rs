//! Frame-by-frame video processing.
//!
//! Container decode/encode stays outside the core: the driver consumes a
//! [`FrameSource`] yielding decoded RGB frames and pushes processed frames
//! into a [`FrameSink`]. Every output frame is a pure function of its input
//! frame and the configuration frozen at the start of the run.

use tracing::{info, warn};

use crate::consts::VIDEO_BAND_START;
use crate::error::Result;
use crate::frame::Image;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::types::{Context, MessageKey};
use crate::pipeline;

/// Supplier of decoded RGB frames.
pub trait FrameSource {
    /// Total number of frames this source will yield.
    fn frame_count(&self) -> usize;

    /// Next decoded frame, or `None` when the stream ends.
    fn next_frame(&mut self) -> Result<Option<Image>>;
}

/// Consumer of processed RGB frames.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Image) -> Result<()>;
}

/// Summary of a completed video run.
#[derive(Clone, Debug)]
pub struct VideoSummary {
    pub frames_processed: usize,
    /// Frames on which at least one stage failed and was passed through.
    pub degraded_frames: usize,
}

/// Process every frame of `source` into `sink` with the current config.
///
/// The config is frozen for the whole run; per-frame re-tuning is the
/// caller's choice and never happens implicitly. Frame progress occupies
/// the [10, 90] band, divided equally among frames.
pub fn process_video(
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    config: &PipelineConfig,
    ctx: &Context,
) -> Result<VideoSummary> {
    let snapshot = config.clone();
    let frame_count = source.frame_count();
    info!(frames = frame_count, "starting video run");

    ctx.progress.report(MessageKey::Init, VIDEO_BAND_START);

    let mut summary = VideoSummary {
        frames_processed: 0,
        degraded_frames: 0,
    };

    let mut index = 0usize;
    while let Some(frame) = source.next_frame()? {
        ctx.cancel.check()?;
        let outcome = pipeline::process_frame(&frame, &snapshot, index, frame_count.max(1), ctx)?;
        if !outcome.degraded.is_empty() {
            warn!(frame = index, stages = ?outcome.degraded, "frame processed with degraded stages");
            summary.degraded_frames += 1;
        }
        sink.write_frame(&outcome.image)?;
        summary.frames_processed += 1;
        index += 1;
    }

    ctx.progress.report(MessageKey::Finalize, 100);
    info!(
        frames = summary.frames_processed,
        degraded = summary.degraded_frames,
        "video run complete"
    );
    Ok(summary)
}
