//! Synchronous processing facade tying together configuration, preview
//! caches, auto-tuning, and analysis for a front-end.
//!
//! The session owns the pipeline configuration and the preview state; the
//! scene signature is computed once per source image (on the preview
//! rendition, whose statistics are scale-robust) and reused by every tune.

use tracing::info;

use crate::autotune::{self, classify_water, SceneSignature, WaterType};
use crate::error::{AqualensError, Result};
use crate::frame::Image;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::params::ParameterValue;
use crate::pipeline::types::{CancelToken, Context};
use crate::preview::PreviewState;
use crate::quality::{self, QualityReport};
use crate::stages::StageId;
use crate::video::{self, FrameSink, FrameSource, VideoSummary};

#[derive(Default)]
pub struct EnhanceSession {
    config: PipelineConfig,
    preview: Option<PreviewState>,
    signature: Option<SceneSignature>,
}

impl EnhanceSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            config,
            preview: None,
            signature: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Replace the whole configuration, e.g. from a loaded preset.
    pub fn set_config(&mut self, mut config: PipelineConfig) {
        config.clamp_all();
        self.config = config;
        self.invalidate();
    }

    /// Load a new source image. Resets caches, recomputes the signature,
    /// and immediately tunes every stage whose auto-tune flag is on.
    pub fn load_source(&mut self, image: Image) -> Result<()> {
        if let Some(state) = self.preview.as_mut() {
            state.set_source(image);
        } else {
            self.preview = Some(PreviewState::new(image));
        }
        let state = self.preview.as_ref().expect("preview state present");
        let signature = autotune::compute_signature(state.source_preview());
        info!(
            width = signature.width,
            height = signature.height,
            water = %classify_water(&signature),
            "source loaded"
        );
        autotune::tune(&mut self.config, &signature);
        self.signature = Some(signature);
        Ok(())
    }

    pub fn signature(&self) -> Option<&SceneSignature> {
        self.signature.as_ref()
    }

    pub fn water_type(&self) -> Option<WaterType> {
        self.signature.as_ref().map(classify_water)
    }

    fn state_mut(&mut self) -> Result<&mut PreviewState> {
        self.preview.as_mut().ok_or(AqualensError::NoSource)
    }

    fn state(&self) -> Result<&PreviewState> {
        self.preview.as_ref().ok_or(AqualensError::NoSource)
    }

    /// Write one parameter. Clamps to bounds and invalidates both the
    /// preview and the full-resolution cache.
    pub fn set_parameter(&mut self, stage: StageId, name: &str, value: &ParameterValue) -> Result<()> {
        self.config.set_parameter(stage, name, value)?;
        self.invalidate();
        Ok(())
    }

    pub fn set_enabled(&mut self, stage: StageId, enabled: bool) {
        self.config.set_enabled(stage, enabled);
        self.invalidate();
    }

    /// Flip a stage's auto-tune flag. Switching it on re-tunes that stage
    /// immediately from the cached signature.
    pub fn set_auto_tune(&mut self, stage: StageId, on: bool) {
        self.config.set_auto_tune_flag(stage, on);
        if on {
            if let Some(sig) = self.signature.clone() {
                autotune::tune_stage(&mut self.config, stage, &sig);
            }
        }
        self.invalidate();
    }

    /// Toggle auto-tune on every stage at once.
    pub fn global_auto_tune(&mut self, on: bool) {
        let sig = self.signature.clone();
        autotune::global_auto_tune(&mut self.config, on, sig.as_ref());
        self.invalidate();
    }

    fn invalidate(&mut self) {
        if let Some(state) = self.preview.as_mut() {
            state.invalidate();
        }
    }

    /// Processed preview for interactive display.
    pub fn process_preview(&mut self, ctx: &Context) -> Result<Image> {
        let config = self.config.clone();
        self.state_mut()?.get_processed_preview(&config, ctx)
    }

    /// Processed full-resolution image for saving.
    pub fn process_full(&mut self, ctx: &Context) -> Result<Image> {
        let config = self.config.clone();
        self.state_mut()?.get_processed_full(&config, ctx)
    }

    /// Quality report of the current settings, computed on preview
    /// resolution.
    pub fn analyze_quality(&mut self, cancel: &CancelToken) -> Result<QualityReport> {
        let ctx = Context {
            cancel: cancel.clone(),
            ..Context::default()
        };
        let processed = self.process_preview(&ctx)?;
        let original = self.state()?.source_preview().clone();
        quality::analyze(&original, &processed, cancel)
    }

    /// Apply the pipeline to every frame of a video stream with the
    /// current configuration.
    pub fn process_video(
        &mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        ctx: &Context,
    ) -> Result<VideoSummary> {
        video::process_video(source, sink, &self.config, ctx)
    }
}
