use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::geometry::{disc_pixels, line_pixels};
use crate::prelude::{SensorGeometry, OPTION_PERCENT_MAX};
use crate::scene::motion::Target;
use crate::scene::raster::RasterBuffer;

/// Per-pixel clutter probability is `noise_level / NOISE_DIVISOR`.
pub const NOISE_DIVISOR: f64 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    pub decay_alpha: f32,
    pub decay_floor: [u8; 3],
    pub target_color: [u8; 3],
    pub sweep_enabled: bool,
    pub sweep_color: [u8; 3],
    pub sweep_increment: f32,
    /// Opacity at the sweep origin and at its tip.
    pub sweep_alpha: (f32, f32),
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            decay_alpha: 0.06,
            decay_floor: [0, 5, 0],
            target_color: [255, 255, 255],
            sweep_enabled: true,
            sweep_color: [0, 255, 0],
            sweep_increment: 0.04,
            sweep_alpha: (0.1, 0.8),
        }
    }
}

/// Pixel counts from one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub target_pixels: usize,
    pub noise_pixels: usize,
}

/// Paints targets, the sweep line and clutter into the persistent raw buffer.
#[derive(Debug, Clone)]
pub struct SceneRasterizer {
    geometry: SensorGeometry,
    config: RasterConfig,
    sweep_angle: f32,
}

impl SceneRasterizer {
    pub fn new(geometry: SensorGeometry, config: RasterConfig) -> Self {
        Self {
            geometry,
            config,
            sweep_angle: 0.0,
        }
    }

    pub fn sweep_angle(&self) -> f32 {
        self.sweep_angle
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    pub fn render<R: Rng + ?Sized>(
        &mut self,
        buffer: &mut RasterBuffer,
        targets: &[Target],
        noise_level: u8,
        rng: &mut R,
    ) -> RenderStats {
        assert_eq!(
            (buffer.width(), buffer.height()),
            (self.geometry.width, self.geometry.height),
            "raster does not match sensor geometry"
        );

        buffer.fade(self.config.decay_floor, self.config.decay_alpha);
        let target_pixels = self.draw_targets(buffer, targets);

        self.sweep_angle = (self.sweep_angle + self.config.sweep_increment) % TAU;
        if self.config.sweep_enabled {
            self.draw_sweep(buffer);
        }

        let noise_pixels = inject_noise(buffer, noise_level, rng);
        RenderStats {
            target_pixels,
            noise_pixels,
        }
    }

    fn draw_targets(&self, buffer: &mut RasterBuffer, targets: &[Target]) -> usize {
        let mut painted = 0;
        for target in targets {
            for (x, y) in disc_pixels(
                target.x,
                target.y,
                target.radius,
                self.geometry.width,
                self.geometry.height,
            ) {
                buffer.set_rgb(x, y, self.config.target_color);
                painted += 1;
            }
        }
        painted
    }

    fn draw_sweep(&self, buffer: &mut RasterBuffer) {
        let (cx, cy) = self.geometry.center();
        let radius = self.geometry.radius;
        let tip = (
            cx + radius * self.sweep_angle.cos(),
            cy + radius * self.sweep_angle.sin(),
        );
        let (origin_alpha, tip_alpha) = self.config.sweep_alpha;

        for (x, y, t) in line_pixels((cx, cy), tip, self.geometry.width, self.geometry.height) {
            let alpha = origin_alpha + (tip_alpha - origin_alpha) * t;
            buffer.blend_rgb(x, y, self.config.sweep_color, alpha);
        }
    }
}

/// Overwrites random pixels with bright greenish clutter.
fn inject_noise<R: Rng + ?Sized>(buffer: &mut RasterBuffer, noise_level: u8, rng: &mut R) -> usize {
    let density = noise_level.min(OPTION_PERCENT_MAX) as f64 / NOISE_DIVISOR;
    if density <= 0.0 {
        return 0;
    }

    let mut injected = 0;
    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            if rng.gen::<f64>() < density {
                let value = rng.gen::<f32>() * 150.0 + 50.0;
                let half = (value * 0.5) as u8;
                buffer.set_rgb(x, y, [half, value as u8, half]);
                injected += 1;
            }
        }
    }
    injected
}
