pub mod beer_lambert;
pub mod clahe;
pub mod color_rebalance;
pub mod fusion;
pub mod udcp;
pub mod white_balance;

use serde::{Deserialize, Serialize};

/// The six pipeline stages. Order is fixed: stages may be disabled but
/// never reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    WhiteBalance,
    Udcp,
    BeerLambert,
    ColorRebalance,
    Clahe,
    MultiscaleFusion,
}

impl StageId {
    /// Execution order of the pipeline.
    pub const ORDER: [StageId; 6] = [
        StageId::WhiteBalance,
        StageId::Udcp,
        StageId::BeerLambert,
        StageId::ColorRebalance,
        StageId::Clahe,
        StageId::MultiscaleFusion,
    ];

    /// Stable identifier used in presets and parameter lookups.
    pub fn key(&self) -> &'static str {
        match self {
            StageId::WhiteBalance => "white_balance",
            StageId::Udcp => "udcp",
            StageId::BeerLambert => "beer_lambert",
            StageId::ColorRebalance => "color_rebalance",
            StageId::Clahe => "clahe",
            StageId::MultiscaleFusion => "multiscale_fusion",
        }
    }

    /// Stable progress message key.
    pub fn message_key(&self) -> &'static str {
        match self {
            StageId::WhiteBalance => "stage.white_balance",
            StageId::Udcp => "stage.udcp",
            StageId::BeerLambert => "stage.beer_lambert",
            StageId::ColorRebalance => "stage.color_rebalance",
            StageId::Clahe => "stage.clahe",
            StageId::MultiscaleFusion => "stage.multiscale_fusion",
        }
    }

    /// Parse a stable identifier back into a stage.
    pub fn from_key(key: &str) -> Option<StageId> {
        StageId::ORDER.into_iter().find(|id| id.key() == key)
    }

    /// One-line human description of what the stage does.
    pub fn describe(&self) -> &'static str {
        match self {
            StageId::WhiteBalance => "Neutralizes the water color cast before the physical models",
            StageId::Udcp => "Dark-channel dehazing adapted to underwater transmission",
            StageId::BeerLambert => "Compensates wavelength-dependent absorption with distance",
            StageId::ColorRebalance => "User-driven 3x3 channel mix with a magenta guard",
            StageId::Clahe => "Contrast-limited adaptive histogram equalization on LAB L",
            StageId::MultiscaleFusion => "Fuses contrast/sharpness variants of the corrected image",
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
