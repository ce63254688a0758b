pub mod detection;
pub mod frame;

pub use detection::DetectionRecord;
pub use frame::FrameSummary;
