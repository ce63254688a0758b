use serde::{Deserialize, Deserializer, Serialize};

/// Upper bound for the percentage-style frame options.
pub const OPTION_PERCENT_MAX: u8 = 100;

/// Saturates any integer into `[0, 100]`.
pub fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, OPTION_PERCENT_MAX as i64) as u8
}

/// Reads a percentage from any integer, clamping instead of rejecting.
pub fn deserialize_percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_percent)
}

/// Fixed dimensions of the sensor field and the radius of its circular face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorGeometry {
    pub width: usize,
    pub height: usize,
    pub radius: f32,
}

impl Default for SensorGeometry {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            radius: 190.0,
        }
    }
}

impl SensorGeometry {
    pub fn new(width: usize, height: usize, radius: f32) -> CoreResult<Self> {
        let geometry = Self {
            width,
            height,
            radius,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Square field with the sensor face inset 10 px from the edges.
    pub fn square(side: usize) -> CoreResult<Self> {
        Self::new(side, side, side as f32 / 2.0 - 10.0)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::InvalidGeometry(format!(
                "field must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(CoreError::InvalidGeometry(format!(
                "sensor radius must be positive, got {}",
                self.radius
            )));
        }
        let diagonal = (self.width as f32).hypot(self.height as f32);
        if self.radius > diagonal {
            return Err(CoreError::InvalidGeometry(format!(
                "sensor radius {} exceeds field diagonal {:.1}",
                self.radius, diagonal
            )));
        }
        Ok(())
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Whether the pixel at `(x, y)` lies strictly inside the sensor face.
    pub fn in_sensor(&self, x: usize, y: usize) -> bool {
        let (cx, cy) = self.center();
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        (dx * dx + dy * dy).sqrt() < self.radius
    }
}

/// Runtime-tunable options for one tick, mirroring the operator control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameOptions {
    #[serde(deserialize_with = "deserialize_percent")]
    pub noise_level: u8,
    #[serde(deserialize_with = "deserialize_percent")]
    pub threshold_percent: u8,
    pub use_blur: bool,
    pub use_threshold: bool,
    pub use_detection: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            noise_level: 15,
            threshold_percent: 65,
            use_blur: true,
            use_threshold: true,
            use_detection: true,
        }
    }
}

impl FrameOptions {
    /// Copy with the percentage options clamped into `[0, 100]`.
    pub fn clamped(&self) -> Self {
        Self {
            noise_level: self.noise_level.min(OPTION_PERCENT_MAX),
            threshold_percent: self.threshold_percent.min(OPTION_PERCENT_MAX),
            ..*self
        }
    }

    /// Detection depends on the binary map, so it is off whenever thresholding is.
    pub fn detection_enabled(&self) -> bool {
        self.use_threshold && self.use_detection
    }
}

/// Errors raised at construction time or at the boundary of the core.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },
    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// A single step of the per-frame vision chain.
///
/// Stages are stateless across frames; everything they produce is derived
/// from `input` and recomputed every tick.
pub trait ProcessingStage {
    type Input: ?Sized;
    type Output;

    fn name(&self) -> &'static str;
    fn execute(&mut self, input: &Self::Input) -> Self::Output;
}
