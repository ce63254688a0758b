use ndarray::Array2;

use crate::prelude::ProcessingStage;
use crate::vision::grayscale::GrayImage;

/// Unweighted 3x3 box filter over the interior of the image.
///
/// The one-pixel border is left at zero rather than clamped or replicated,
/// so nothing on the outermost rows and columns survives the blur.
pub struct BoxBlurStage;

impl ProcessingStage for BoxBlurStage {
    type Input = GrayImage;
    type Output = GrayImage;

    fn name(&self) -> &'static str {
        "box-blur"
    }

    fn execute(&mut self, input: &GrayImage) -> GrayImage {
        let (height, width) = input.dim();
        let mut output = Array2::zeros((height, width));
        if height < 3 || width < 3 {
            return output;
        }

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let sum: u32 = input
                    .slice(ndarray::s![y - 1..=y + 1, x - 1..=x + 1])
                    .iter()
                    .map(|&v| v as u32)
                    .sum();
                output[[y, x]] = (sum / 9) as u8;
            }
        }
        output
    }
}
