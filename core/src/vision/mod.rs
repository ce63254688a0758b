//! Per-frame vision chain: grayscale, blur, threshold, blob detection.

pub mod blob;
pub mod blur;
pub mod grayscale;
pub mod pipeline;
pub mod threshold;

pub use blob::{Blob, BlobDetector, BlobFilter, Detections};
pub use blur::BoxBlurStage;
pub use grayscale::{luma, GrayImage, GrayscaleStage};
pub use pipeline::{VisionFrame, VisionPipeline};
pub use threshold::{threshold_value, BinaryMap, ThresholdStage};
