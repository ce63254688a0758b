pub mod geometry;
pub mod stats;

pub use geometry::{disc_pixels, line_pixels, polar_to_cartesian};
pub use stats::StatsHelper;
