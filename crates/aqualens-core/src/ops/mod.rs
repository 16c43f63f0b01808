pub mod blur;
pub mod color;
pub mod gradient;
pub mod guided;
pub mod pyramid;
pub mod resize;
pub mod stats;
pub mod window;
