pub mod autotune;
pub mod config;
pub mod enhance;
pub mod info;
pub mod quality;
pub mod video;
