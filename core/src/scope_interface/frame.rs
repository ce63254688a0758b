use serde::{Deserialize, Serialize};

use crate::scope_interface::detection::DetectionRecord;

/// Per-tick summary published to the display and control layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub tick: u64,
    pub detection_count: usize,
    pub detections: Vec<DetectionRecord>,
    pub sweep_angle: f32,
    pub target_resets: usize,
    pub noise_pixels: usize,
}

impl FrameSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
