use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub frames: u64,
    pub detections: u64,
    pub rejected_components: u64,
    pub target_resets: u64,
    pub noise_pixels: u64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_frame(&self, detections: usize, rejected: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames += 1;
            metrics.detections += detections as u64;
            metrics.rejected_components += rejected as u64;
        }
    }

    pub fn record_scene(&self, target_resets: usize, noise_pixels: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.target_resets += target_resets as u64;
            metrics.noise_pixels += noise_pixels as u64;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
