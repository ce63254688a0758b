//! Simulated sensor scene: moving point targets and the raw image they produce.

pub mod motion;
pub mod raster;
pub mod rasterizer;

pub use motion::{MotionConfig, MotionModel, Target};
pub use raster::RasterBuffer;
pub use rasterizer::{RasterConfig, RenderStats, SceneRasterizer};
