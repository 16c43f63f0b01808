/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-10;

/// Longest side of the interactive preview, in pixels.
pub const PREVIEW_MAX_SIDE: usize = 1024;

/// Progress band occupied by the stages of a single still-image run.
pub const STAGE_BAND_START: u8 = 10;
pub const STAGE_BAND_END: u8 = 85;

/// Progress band divided among frames in a video run.
pub const VIDEO_BAND_START: u8 = 10;
pub const VIDEO_BAND_END: u8 = 90;

/// Percentile grid sampled into the scene signature.
pub const PERCENTILE_GRID: [f32; 9] = [1.0, 5.0, 10.0, 25.0, 50.0, 75.0, 90.0, 95.0, 99.0];

/// Pixel value treated as saturated when gauging white-balance headroom.
pub const SATURATION_LEVEL: f32 = 0.98;
