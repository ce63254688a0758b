use crate::prelude::{CoreError, CoreResult, SensorGeometry};

pub const CHANNELS: usize = 4;

/// Row-major RGBA sensor image that persists between ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RasterBuffer {
    /// Opaque black buffer covering the field.
    pub fn new(geometry: &SensorGeometry) -> Self {
        let mut pixels = vec![0; geometry.pixel_count() * CHANNELS];
        for alpha in pixels.iter_mut().skip(3).step_by(CHANNELS) {
            *alpha = u8::MAX;
        }
        Self {
            width: geometry.width,
            height: geometry.height,
            pixels,
        }
    }

    /// Wraps externally produced RGBA bytes.
    pub fn from_rgba(geometry: &SensorGeometry, pixels: Vec<u8>) -> CoreResult<Self> {
        let expected = geometry.pixel_count() * CHANNELS;
        if pixels.len() != expected {
            return Err(CoreError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width: geometry.width,
            height: geometry.height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.pixels
            .chunks_exact(CHANNELS)
            .map(|px| [px[0], px[1], px[2]])
    }

    pub fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = self.index(x, y);
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    pub fn set_rgb(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let idx = self.index(x, y);
        self.pixels[idx..idx + 3].copy_from_slice(&rgb);
    }

    /// Source-over blend of `rgb` onto the pixel with opacity `alpha` in `[0, 1]`.
    pub fn blend_rgb(&mut self, x: usize, y: usize, rgb: [u8; 3], alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        let idx = self.index(x, y);
        for (dst, &src) in self.pixels[idx..idx + 3].iter_mut().zip(rgb.iter()) {
            *dst = (src as f32 * alpha + *dst as f32 * (1.0 - alpha)).round() as u8;
        }
    }

    /// Fades every pixel toward `floor` by `alpha`, leaving a decaying trail.
    pub fn fade(&mut self, floor: [u8; 3], alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        let keep = 1.0 - alpha;
        let lift = floor.map(|c| c as f32 * alpha);
        for px in self.pixels.chunks_exact_mut(CHANNELS) {
            for (channel, offset) in px.iter_mut().zip(lift.iter()) {
                *channel = (*channel as f32 * keep + offset) as u8;
            }
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} raster",
            self.width,
            self.height
        );
        (y * self.width + x) * CHANNELS
    }
}
