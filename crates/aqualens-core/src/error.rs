use thiserror::Error;

use crate::stages::StageId;

#[derive(Error, Debug)]
pub enum AqualensError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input image: {0}")]
    InvalidInput(String),

    #[error("Invalid parameter `{name}` for stage {stage}: {reason}")]
    InvalidParameter {
        stage: StageId,
        name: String,
        reason: String,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Stage {stage} failed: {message}")]
    Stage { stage: StageId, message: String },

    #[error("Cached result no longer matches the current configuration")]
    CacheInconsistency,

    #[error("No source image loaded")]
    NoSource,

    #[error("Image format error: {0}")]
    ImageFormat(#[from] image::ImageError),

    #[error("Preset error: {0}")]
    Preset(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AqualensError>;
