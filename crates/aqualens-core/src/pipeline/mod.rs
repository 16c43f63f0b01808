pub mod config;
pub mod params;
pub mod persist;
pub mod types;

use tracing::{debug, warn};

use crate::consts::{STAGE_BAND_END, STAGE_BAND_START, VIDEO_BAND_END, VIDEO_BAND_START};
use crate::error::{AqualensError, Result};
use crate::frame::Image;
use crate::stages::{beer_lambert, clahe, color_rebalance, fusion, udcp, white_balance, StageId};

use self::config::PipelineConfig;
use self::types::{CancelToken, Context, MessageKey, ProcessOutcome};

/// Apply one stage to an image using the parameters in `config`.
pub fn apply_stage(
    image: &Image,
    id: StageId,
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Result<Image> {
    match id {
        StageId::WhiteBalance => white_balance::apply(image, &config.white_balance.params),
        StageId::Udcp => udcp::apply(image, &config.udcp.params),
        StageId::BeerLambert => beer_lambert::apply(image, &config.beer_lambert.params),
        StageId::ColorRebalance => color_rebalance::apply(image, &config.color_rebalance.params),
        StageId::Clahe => clahe::apply(image, &config.clahe.params),
        StageId::MultiscaleFusion => fusion::apply(image, &config.multiscale_fusion.params, cancel),
    }
}

/// Run the enabled stages in fixed order on a still image.
///
/// The configuration is snapshotted at entry; concurrent writes affect the
/// next run, never this one. A failing stage is logged, recorded in the
/// outcome, and passed through unchanged; cancellation aborts the run.
pub fn process(image: &Image, config: &PipelineConfig, ctx: &Context) -> Result<ProcessOutcome> {
    let snapshot = config.clone();
    ctx.progress.report(MessageKey::Init, STAGE_BAND_START);
    let outcome = run_stages(image, &snapshot, ctx, None)?;
    ctx.progress.report(MessageKey::Finalize, 100);
    Ok(outcome)
}

/// Run the enabled stages on one video frame, mapping stage progress into
/// the frame's sub-band of the global [10, 90] video band.
pub fn process_frame(
    image: &Image,
    config: &PipelineConfig,
    frame_index: usize,
    frame_count: usize,
    ctx: &Context,
) -> Result<ProcessOutcome> {
    let snapshot = config.clone();
    run_stages(image, &snapshot, ctx, Some((frame_index, frame_count)))
}

fn run_stages(
    image: &Image,
    config: &PipelineConfig,
    ctx: &Context,
    frame: Option<(usize, usize)>,
) -> Result<ProcessOutcome> {
    let enabled = config.enabled_stages();
    let count = enabled.len();

    let mut current = image.clone();
    let mut degraded = Vec::new();

    for (i, id) in enabled.iter().copied().enumerate() {
        ctx.cancel.check()?;

        let (key, percent) = match frame {
            None => {
                let span = (STAGE_BAND_END - STAGE_BAND_START) as usize;
                let percent = STAGE_BAND_START + (span * i / count) as u8;
                (MessageKey::Stage(id), percent)
            }
            Some((frame_index, frame_count)) => {
                let band = (VIDEO_BAND_END - VIDEO_BAND_START) as f64;
                let lo = VIDEO_BAND_START as f64 + band * frame_index as f64 / frame_count as f64;
                let hi =
                    VIDEO_BAND_START as f64 + band * (frame_index + 1) as f64 / frame_count as f64;
                let percent = (lo + (hi - lo) * i as f64 / count as f64).round() as u8;
                (
                    MessageKey::Frame {
                        index: frame_index + 1,
                        count: frame_count,
                        stage: id,
                    },
                    percent,
                )
            }
        };
        ctx.progress.report(key, percent);

        match apply_stage(&current, id, config, &ctx.cancel) {
            Ok(result) => {
                debug!(stage = %id, "stage complete");
                current = result;
            }
            Err(AqualensError::Cancelled) => return Err(AqualensError::Cancelled),
            Err(err) => {
                warn!(stage = %id, error = %err, "stage failed, passing image through");
                degraded.push(id);
            }
        }
    }

    Ok(ProcessOutcome {
        image: current,
        degraded,
    })
}
