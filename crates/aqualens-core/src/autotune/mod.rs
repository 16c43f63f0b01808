pub mod signature;

use tracing::{info, warn};

use crate::pipeline::config::PipelineConfig;
use crate::stages::{beer_lambert, clahe, color_rebalance, fusion, udcp, white_balance, StageId};

pub use self::signature::{classify_water, compute_signature, SceneSignature, WaterType};

/// Tune one stage's parameters from the signature, writing into `config`.
///
/// A tuner that panics would poison the whole config, so each runs behind
/// `catch_unwind`; on failure the previous parameter values are kept.
pub fn tune_stage(config: &mut PipelineConfig, id: StageId, sig: &SceneSignature) {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| match id {
        StageId::WhiteBalance => {
            config.white_balance.params = white_balance::auto_tune(sig, &config.white_balance.params)
        }
        StageId::Udcp => config.udcp.params = udcp::auto_tune(sig, &config.udcp.params),
        StageId::BeerLambert => {
            config.beer_lambert.params = beer_lambert::auto_tune(sig, &config.beer_lambert.params)
        }
        StageId::ColorRebalance => {
            config.color_rebalance.params =
                color_rebalance::auto_tune(sig, &config.color_rebalance.params)
        }
        StageId::Clahe => config.clahe.params = clahe::auto_tune(sig, &config.clahe.params),
        StageId::MultiscaleFusion => {
            config.multiscale_fusion.params =
                fusion::auto_tune(sig, &config.multiscale_fusion.params)
        }
    }));
    if result.is_err() {
        warn!(stage = %id, "auto-tune failed, keeping previous parameters");
    }
}

/// Run the tuner of every stage whose auto-tune flag is on.
pub fn tune(config: &mut PipelineConfig, sig: &SceneSignature) {
    let water = classify_water(sig);
    info!(water = %water, "auto-tuning pipeline");
    for id in StageId::ORDER {
        if config.auto_tune_on(id) {
            tune_stage(config, id, sig);
        }
    }
}

/// Flip the auto-tune flag on every stage in one call, tuning immediately
/// when switching on.
pub fn global_auto_tune(config: &mut PipelineConfig, on: bool, sig: Option<&SceneSignature>) {
    for id in StageId::ORDER {
        config.set_auto_tune_flag(id, on);
    }
    if on {
        if let Some(sig) = sig {
            tune(config, sig);
        }
    }
}
