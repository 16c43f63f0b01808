use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{AqualensError, Result};
use crate::stages::beer_lambert::BeerLambertParams;
use crate::stages::clahe::ClaheParams;
use crate::stages::color_rebalance::ColorRebalanceParams;
use crate::stages::fusion::FusionParams;
use crate::stages::udcp::UdcpParams;
use crate::stages::white_balance::WhiteBalanceParams;
use crate::stages::StageId;

use super::params::{ParamDescriptor, ParameterValue, StageParams};

/// Per-stage switchboard: the stage's enabled flag, its auto-tune flag,
/// and its typed parameters. The two flags are independent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    default,
    bound(
        serialize = "P: serde::Serialize",
        deserialize = "P: serde::Deserialize<'de> + Default"
    )
)]
pub struct StageConfig<P> {
    pub enabled: bool,
    pub auto_tune: bool,
    pub params: P,
}

impl<P: Default> Default for StageConfig<P> {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_tune: true,
            params: P::default(),
        }
    }
}

/// Full pipeline configuration. Every stage is always present; parameter
/// values are clamped into their declared bounds on every write.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub white_balance: StageConfig<WhiteBalanceParams>,
    pub udcp: StageConfig<UdcpParams>,
    pub beer_lambert: StageConfig<BeerLambertParams>,
    pub color_rebalance: StageConfig<ColorRebalanceParams>,
    pub clahe: StageConfig<ClaheParams>,
    pub multiscale_fusion: StageConfig<FusionParams>,
}

/// Deterministic hash of all enabled flags and parameter values, used as
/// the cache key for processed results. Auto-tune flags do not affect the
/// output image and are not part of the fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConfigFingerprint(u64);

impl PipelineConfig {
    pub fn is_enabled(&self, id: StageId) -> bool {
        match id {
            StageId::WhiteBalance => self.white_balance.enabled,
            StageId::Udcp => self.udcp.enabled,
            StageId::BeerLambert => self.beer_lambert.enabled,
            StageId::ColorRebalance => self.color_rebalance.enabled,
            StageId::Clahe => self.clahe.enabled,
            StageId::MultiscaleFusion => self.multiscale_fusion.enabled,
        }
    }

    pub fn set_enabled(&mut self, id: StageId, enabled: bool) {
        match id {
            StageId::WhiteBalance => self.white_balance.enabled = enabled,
            StageId::Udcp => self.udcp.enabled = enabled,
            StageId::BeerLambert => self.beer_lambert.enabled = enabled,
            StageId::ColorRebalance => self.color_rebalance.enabled = enabled,
            StageId::Clahe => self.clahe.enabled = enabled,
            StageId::MultiscaleFusion => self.multiscale_fusion.enabled = enabled,
        }
    }

    pub fn auto_tune_on(&self, id: StageId) -> bool {
        match id {
            StageId::WhiteBalance => self.white_balance.auto_tune,
            StageId::Udcp => self.udcp.auto_tune,
            StageId::BeerLambert => self.beer_lambert.auto_tune,
            StageId::ColorRebalance => self.color_rebalance.auto_tune,
            StageId::Clahe => self.clahe.auto_tune,
            StageId::MultiscaleFusion => self.multiscale_fusion.auto_tune,
        }
    }

    pub fn set_auto_tune_flag(&mut self, id: StageId, on: bool) {
        match id {
            StageId::WhiteBalance => self.white_balance.auto_tune = on,
            StageId::Udcp => self.udcp.auto_tune = on,
            StageId::BeerLambert => self.beer_lambert.auto_tune = on,
            StageId::ColorRebalance => self.color_rebalance.auto_tune = on,
            StageId::Clahe => self.clahe.auto_tune = on,
            StageId::MultiscaleFusion => self.multiscale_fusion.auto_tune = on,
        }
    }

    /// Stages that will run, in pipeline order.
    pub fn enabled_stages(&self) -> Vec<StageId> {
        StageId::ORDER
            .into_iter()
            .filter(|id| self.is_enabled(*id))
            .collect()
    }

    /// Declared parameters of a stage, for UI generation.
    pub fn descriptors(id: StageId) -> &'static [ParamDescriptor] {
        match id {
            StageId::WhiteBalance => WhiteBalanceParams::descriptors(),
            StageId::Udcp => UdcpParams::descriptors(),
            StageId::BeerLambert => BeerLambertParams::descriptors(),
            StageId::ColorRebalance => ColorRebalanceParams::descriptors(),
            StageId::Clahe => ClaheParams::descriptors(),
            StageId::MultiscaleFusion => FusionParams::descriptors(),
        }
    }

    /// Write one parameter by name, clamping into bounds.
    pub fn set_parameter(
        &mut self,
        id: StageId,
        name: &str,
        value: &ParameterValue,
    ) -> Result<()> {
        let outcome = match id {
            StageId::WhiteBalance => self.white_balance.params.set(name, value),
            StageId::Udcp => self.udcp.params.set(name, value),
            StageId::BeerLambert => self.beer_lambert.params.set(name, value),
            StageId::ColorRebalance => self.color_rebalance.params.set(name, value),
            StageId::Clahe => self.clahe.params.set(name, value),
            StageId::MultiscaleFusion => self.multiscale_fusion.params.set(name, value),
        };
        outcome.map_err(|reason| AqualensError::InvalidParameter {
            stage: id,
            name: name.to_string(),
            reason,
        })
    }

    /// Read one parameter by name.
    pub fn get_parameter(&self, id: StageId, name: &str) -> Result<ParameterValue> {
        let value = match id {
            StageId::WhiteBalance => self.white_balance.params.get(name),
            StageId::Udcp => self.udcp.params.get(name),
            StageId::BeerLambert => self.beer_lambert.params.get(name),
            StageId::ColorRebalance => self.color_rebalance.params.get(name),
            StageId::Clahe => self.clahe.params.get(name),
            StageId::MultiscaleFusion => self.multiscale_fusion.params.get(name),
        };
        value.ok_or_else(|| AqualensError::InvalidParameter {
            stage: id,
            name: name.to_string(),
            reason: "unknown parameter".to_string(),
        })
    }

    /// Clamp every parameter of every stage into its declared bounds.
    /// Run after deserializing externally supplied presets.
    pub fn clamp_all(&mut self) {
        self.white_balance.params.clamp();
        self.udcp.params.clamp();
        self.beer_lambert.params.clamp();
        self.color_rebalance.params.clamp();
        self.clahe.params.clamp();
        self.multiscale_fusion.params.clamp();
    }

    /// Cache key over enabled flags and parameter values.
    pub fn fingerprint(&self) -> ConfigFingerprint {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        for id in StageId::ORDER {
            id.key().hash(&mut hasher);
            self.is_enabled(id).hash(&mut hasher);
            let params_json = match id {
                StageId::WhiteBalance => serde_json::to_string(&self.white_balance.params),
                StageId::Udcp => serde_json::to_string(&self.udcp.params),
                StageId::BeerLambert => serde_json::to_string(&self.beer_lambert.params),
                StageId::ColorRebalance => serde_json::to_string(&self.color_rebalance.params),
                StageId::Clahe => serde_json::to_string(&self.clahe.params),
                StageId::MultiscaleFusion => serde_json::to_string(&self.multiscale_fusion.params),
            }
            .expect("stage parameters serialize to JSON");
            params_json.hash(&mut hasher);
        }
        ConfigFingerprint(hasher.finish())
    }
}
