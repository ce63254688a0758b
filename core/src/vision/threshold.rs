use ndarray::Array2;

use crate::prelude::{ProcessingStage, SensorGeometry, OPTION_PERCENT_MAX};
use crate::vision::grayscale::GrayImage;

/// Foreground flags indexed `[[y, x]]`.
pub type BinaryMap = Array2<bool>;

/// Maps a `[0, 100]` percentage onto the 8-bit intensity scale.
pub fn threshold_value(percent: u8) -> f32 {
    percent.min(OPTION_PERCENT_MAX) as f32 / 100.0 * 255.0
}

/// Marks in-sensor pixels at or above the threshold intensity.
pub struct ThresholdStage {
    geometry: SensorGeometry,
    level: f32,
}

impl ThresholdStage {
    pub fn new(geometry: SensorGeometry, percent: u8) -> Self {
        Self {
            geometry,
            level: threshold_value(percent),
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }
}

impl ProcessingStage for ThresholdStage {
    type Input = GrayImage;
    type Output = BinaryMap;

    fn name(&self) -> &'static str {
        "threshold"
    }

    fn execute(&mut self, input: &GrayImage) -> BinaryMap {
        assert_eq!(
            input.dim(),
            (self.geometry.height, self.geometry.width),
            "threshold input does not match sensor geometry"
        );
        Array2::from_shape_fn(input.dim(), |(y, x)| {
            self.geometry.in_sensor(x, y) && input[[y, x]] as f32 >= self.level
        })
    }
}

/// All-background map, used when thresholding is switched off.
pub fn empty_map(geometry: &SensorGeometry) -> BinaryMap {
    Array2::from_elem((geometry.height, geometry.width), false)
}
