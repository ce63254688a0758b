use ndarray::Array2;

use crate::prelude::ProcessingStage;
use crate::scene::raster::RasterBuffer;

/// Single-channel intensity image indexed `[[y, x]]`.
pub type GrayImage = Array2<u8>;

/// Perceptual luma `0.30 R + 0.59 G + 0.11 B`, truncated to a byte.
pub fn luma(rgb: [u8; 3]) -> u8 {
    let [r, g, b] = rgb.map(u32::from);
    ((30 * r + 59 * g + 11 * b) / 100) as u8
}

pub struct GrayscaleStage;

impl ProcessingStage for GrayscaleStage {
    type Input = RasterBuffer;
    type Output = GrayImage;

    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn execute(&mut self, input: &RasterBuffer) -> GrayImage {
        let samples: Vec<u8> = input.pixels().map(luma).collect();
        Array2::from_shape_vec((input.height(), input.width()), samples)
            .expect("raster length is width * height by construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::SensorGeometry;

    #[test]
    fn luma_weights_channels() {
        assert_eq!(luma([0, 0, 0]), 0);
        assert_eq!(luma([255, 255, 255]), 255);
        assert_eq!(luma([0, 255, 0]), 150);
        assert_eq!(luma([100, 0, 0]), 30);
        assert_eq!(luma([50, 100, 50]), 79);
    }

    #[test]
    fn fractional_luma_is_truncated() {
        // 165.63 stores as 165
        assert_eq!(luma([0, 255, 138]), 165);
    }

    #[test]
    fn luma_is_stable_on_gray_samples() {
        for v in 0..=255u8 {
            let once = luma([v, v, v]);
            let twice = luma([once, once, once]);
            assert_eq!(once, v);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn stage_preserves_layout() {
        let geometry = SensorGeometry::new(5, 3, 1.0).unwrap();
        let mut raster = RasterBuffer::new(&geometry);
        raster.set_rgb(4, 1, [255, 255, 255]);

        let gray = GrayscaleStage.execute(&raster);
        assert_eq!(gray.dim(), (3, 5));
        assert_eq!(gray[[1, 4]], 255);
        assert_eq!(gray.iter().filter(|&&v| v > 0).count(), 1);
    }
}
