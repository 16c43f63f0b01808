//! Post-processing quality analysis.
//!
//! Runs a fixed battery of seven checks comparing the original against the
//! processed image at preview resolution, scoring each in [0, 10] and
//! producing recommendations from a fixed catalog. Preview resolution is
//! mandatory here: the metrics are ratio- and fraction-based and
//! scale-robust, and full resolution would stall interactive use.

pub mod checks;
mod components;

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::warn;

use crate::error::{AqualensError, Result};
use crate::frame::Image;
use crate::pipeline::types::CancelToken;

/// Score assigned to a check that failed to run.
const NEUTRAL_SCORE: f64 = 5.0;

/// Fixed catalog of user-facing recommendations.
pub mod recommendation {
    pub const REDUCE_RED_GAIN: &str =
        "Unnatural red tones detected: reduce white-balance max gain or Beer-Lambert depth factor";
    pub const REDUCE_MAGENTA: &str =
        "Strong magenta cast detected: lower the color-rebalance saturation limit";
    pub const RED_OVERCOMPENSATED: &str =
        "Red channel overcompensated: reduce the Beer-Lambert red coefficient";
    pub const REDUCE_SATURATION: &str =
        "Saturation is clipping: reduce enhancement strength or fusion saturation weight";
    pub const REDUCE_NOISE_AMPLIFICATION: &str =
        "Shadow noise amplified: lower the CLAHE clip limit or raise the UDCP guided epsilon";
    pub const REDUCE_SHARPENING: &str =
        "Halo artifacts near edges: reduce the fusion sharpen amount";
    pub const LIFT_SHADOWS: &str =
        "Image is mostly shadow: increase contrast or CLAHE clip limit";
    pub const REDUCE_CONTRAST: &str =
        "Blacks appear crushed: reduce contrast gain or the UDCP post-contrast gain";
    pub const CHECK_FAILED: &str = "A quality check failed to run and was scored neutrally";
}

/// Outcome of one named check.
#[derive(Clone, Debug, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    /// Score in [0, 10]; 10 is best.
    pub score: f64,
    /// Raw measurements backing the score.
    pub details: BTreeMap<&'static str, f64>,
    pub recommendations: Vec<&'static str>,
}

impl CheckResult {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            score: 10.0,
            details: BTreeMap::new(),
            recommendations: Vec::new(),
        }
    }

    pub(crate) fn clamp_score(mut self) -> Self {
        self.score = self.score.clamp(0.0, 10.0);
        self
    }
}

/// Full analysis report.
#[derive(Clone, Debug, Serialize)]
pub struct QualityReport {
    pub checks: Vec<CheckResult>,
    /// Clamped mean of the check scores, in [0, 10].
    pub overall_score: f64,
    /// Seconds since the Unix epoch at analysis time.
    pub timestamp_secs: u64,
}

type CheckFn = fn(&Image, &Image) -> Result<CheckResult>;

const CHECKS: [(&str, CheckFn); 7] = [
    ("unrealistic_colors", checks::unrealistic_colors),
    ("red_balance", checks::red_balance),
    ("saturation_clipping", checks::saturation_clipping),
    ("color_noise", checks::color_noise),
    ("halo_artifacts", checks::halo_artifacts),
    ("midtone_balance", checks::midtone_balance),
    ("improvements", checks::improvements),
];

/// Run every check. A failing check contributes a neutral score and a
/// failure recommendation instead of aborting the report.
pub fn analyze(original: &Image, processed: &Image, cancel: &CancelToken) -> Result<QualityReport> {
    if original.data.dim() != processed.data.dim() {
        return Err(AqualensError::InvalidInput(format!(
            "original {:?} and processed {:?} sizes differ",
            original.data.dim(),
            processed.data.dim()
        )));
    }

    let mut results = Vec::with_capacity(CHECKS.len());
    for (name, check) in CHECKS {
        cancel.check()?;
        let result = match check(original, processed) {
            Ok(result) => result,
            Err(err) => {
                warn!(check = name, error = %err, "quality check failed");
                let mut failed = CheckResult::new(name);
                failed.score = NEUTRAL_SCORE;
                failed.recommendations.push(recommendation::CHECK_FAILED);
                failed
            }
        };
        results.push(result);
    }

    let overall = results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64;
    Ok(QualityReport {
        checks: results,
        overall_score: overall.clamp(0.0, 10.0),
        timestamp_secs: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
    })
}
