use serde::{Deserialize, Serialize};

use crate::vision::blob::Blob;

/// Detection record handed to the display layer.
///
/// `width` and `height` are coordinate spans (`max - min`), so a
/// single-pixel detection reports zero for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub min_x: usize,
    pub min_y: usize,
    pub width: usize,
    pub height: usize,
    pub area: usize,
}

impl DetectionRecord {
    pub fn new(min_x: usize, min_y: usize, width: usize, height: usize, area: usize) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
            area,
        }
    }
}

impl From<&Blob> for DetectionRecord {
    fn from(blob: &Blob) -> Self {
        Self::new(blob.min_x, blob.min_y, blob.width(), blob.height(), blob.area)
    }
}
