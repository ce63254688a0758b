use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::prelude::ProcessingStage;
use crate::vision::threshold::BinaryMap;

/// Seeds are sampled every `SEED_STRIDE` rows and columns.
pub const SEED_STRIDE: usize = 2;

/// Axis-aligned bounds and pixel count of one 4-connected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
    pub area: usize,
}

impl Blob {
    fn seeded(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            area: 0,
        }
    }

    fn include(&mut self, x: usize, y: usize) {
        self.area += 1;
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// Horizontal coordinate span, `max_x - min_x`.
    pub fn width(&self) -> usize {
        self.max_x - self.min_x
    }

    /// Vertical coordinate span, `max_y - min_y`.
    pub fn height(&self) -> usize {
        self.max_y - self.min_y
    }

    /// Width over height, with the height floored at one.
    pub fn aspect_ratio(&self) -> f32 {
        self.width() as f32 / self.height().max(1) as f32
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) as f32 / 2.0,
            (self.min_y + self.max_y) as f32 / 2.0,
        )
    }
}

/// Size and shape gates applied to every component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobFilter {
    /// Exclusive lower bound on area.
    pub min_area: usize,
    /// Exclusive upper bound on area.
    pub max_area: usize,
    pub min_aspect: f32,
    pub max_aspect: f32,
}

impl BlobFilter {
    /// Blurred maps carry less residual clutter and accept smaller blobs.
    pub fn for_blur(blur_active: bool) -> Self {
        Self {
            min_area: if blur_active { 5 } else { 10 },
            max_area: 1000,
            min_aspect: 0.2,
            max_aspect: 5.0,
        }
    }

    pub fn accepts(&self, blob: &Blob) -> bool {
        if blob.area <= self.min_area || blob.area >= self.max_area {
            return false;
        }
        let ratio = blob.aspect_ratio();
        ratio > self.min_aspect && ratio < self.max_aspect
    }
}

/// Components found in one pass, split by the filter verdict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detections {
    pub accepted: Vec<Blob>,
    pub rejected: usize,
}

impl Detections {
    pub fn count(&self) -> usize {
        self.accepted.len()
    }
}

/// Connected-component extraction over a binary map.
pub struct BlobDetector {
    filter: BlobFilter,
}

impl BlobDetector {
    pub fn new(filter: BlobFilter) -> Self {
        Self { filter }
    }

    pub fn for_blur(blur_active: bool) -> Self {
        Self::new(BlobFilter::for_blur(blur_active))
    }

    pub fn filter(&self) -> &BlobFilter {
        &self.filter
    }

    /// Every component reachable from a stride-2 seed, in row-major seed order.
    pub fn components(map: &BinaryMap) -> Vec<Blob> {
        let (height, width) = map.dim();
        let mut visited = Array2::from_elem((height, width), false);
        let mut stack = Vec::new();
        let mut components = Vec::new();

        for y in (0..height).step_by(SEED_STRIDE) {
            for x in (0..width).step_by(SEED_STRIDE) {
                if !map[[y, x]] || visited[[y, x]] {
                    continue;
                }

                let mut blob = Blob::seeded(x, y);
                visited[[y, x]] = true;
                stack.push((x, y));

                while let Some((cx, cy)) = stack.pop() {
                    blob.include(cx, cy);

                    let mut visit = |nx: usize, ny: usize| {
                        if map[[ny, nx]] && !visited[[ny, nx]] {
                            visited[[ny, nx]] = true;
                            stack.push((nx, ny));
                        }
                    };
                    if cx > 0 {
                        visit(cx - 1, cy);
                    }
                    if cx + 1 < width {
                        visit(cx + 1, cy);
                    }
                    if cy > 0 {
                        visit(cx, cy - 1);
                    }
                    if cy + 1 < height {
                        visit(cx, cy + 1);
                    }
                }
                components.push(blob);
            }
        }
        components
    }

    pub fn detect(&self, map: &BinaryMap) -> Detections {
        let mut detections = Detections::default();
        for blob in Self::components(map) {
            if self.filter.accepts(&blob) {
                detections.accepted.push(blob);
            } else {
                detections.rejected += 1;
            }
        }
        detections
    }
}

impl ProcessingStage for BlobDetector {
    type Input = BinaryMap;
    type Output = Detections;

    fn name(&self) -> &'static str {
        "blob-detector"
    }

    fn execute(&mut self, input: &BinaryMap) -> Detections {
        self.detect(input)
    }
}
