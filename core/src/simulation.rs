use rand::Rng;

use crate::prelude::{CoreError, CoreResult, FrameOptions, SensorGeometry};
use crate::scene::motion::{MotionConfig, MotionModel, Target};
use crate::scene::raster::RasterBuffer;
use crate::scene::rasterizer::{RasterConfig, RenderStats, SceneRasterizer};
use crate::scope_interface::{DetectionRecord, FrameSummary};
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use crate::vision::pipeline::{VisionFrame, VisionPipeline};

/// Output of one tick.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub tick: u64,
    pub target_resets: usize,
    pub render: RenderStats,
    pub sweep_angle: f32,
    pub vision: VisionFrame,
}

impl FrameReport {
    pub fn detection_count(&self) -> usize {
        self.vision.detection_count()
    }

    pub fn summary(&self) -> FrameSummary {
        FrameSummary {
            tick: self.tick,
            detection_count: self.detection_count(),
            detections: self.vision.blobs().iter().map(DetectionRecord::from).collect(),
            sweep_angle: self.sweep_angle,
            target_resets: self.target_resets,
            noise_pixels: self.render.noise_pixels,
        }
    }
}

/// Owns the cross-frame state (targets, sweep angle, decaying raw image)
/// and drives motion, rendering and vision once per tick.
pub struct SweepSimulation {
    geometry: SensorGeometry,
    motion: MotionModel,
    rasterizer: SceneRasterizer,
    raw: RasterBuffer,
    vision: VisionPipeline,
    metrics: MetricsRecorder,
    logger: LogManager,
    tick: u64,
}

impl SweepSimulation {
    pub fn new(motion: MotionModel, raster: RasterConfig) -> CoreResult<Self> {
        let geometry = *motion.geometry();
        geometry.validate()?;
        let logger = LogManager::new("simulation");
        logger.notice(&format!(
            "sensor {}x{} radius {:.1} with {} target(s)",
            geometry.width,
            geometry.height,
            geometry.radius,
            motion.targets().len()
        ));

        Ok(Self {
            geometry,
            rasterizer: SceneRasterizer::new(geometry, raster),
            raw: RasterBuffer::new(&geometry),
            vision: VisionPipeline::new(geometry),
            metrics: MetricsRecorder::new(),
            logger,
            motion,
            tick: 0,
        })
    }

    /// Simulation over randomly placed targets.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        geometry: SensorGeometry,
        motion: MotionConfig,
        raster: RasterConfig,
    ) -> CoreResult<Self> {
        geometry.validate()?;
        Self::new(MotionModel::random(rng, geometry, motion), raster)
    }

    /// Simulation over an explicit target list.
    pub fn with_targets(
        geometry: SensorGeometry,
        motion: MotionConfig,
        raster: RasterConfig,
        targets: Vec<Target>,
    ) -> CoreResult<Self> {
        if targets.is_empty() {
            return Err(CoreError::InvalidTarget("target list is empty".into()));
        }
        Self::new(MotionModel::with_targets(geometry, motion, targets), raster)
    }

    pub fn geometry(&self) -> &SensorGeometry {
        &self.geometry
    }

    pub fn targets(&self) -> &[Target] {
        self.motion.targets()
    }

    /// Raw sensor image produced by the latest tick.
    pub fn raw(&self) -> &RasterBuffer {
        &self.raw
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, options: &FrameOptions, rng: &mut R) -> FrameReport {
        let options = options.clamped();

        let target_resets = self.motion.advance(rng);
        let render = self.rasterizer.render(
            &mut self.raw,
            self.motion.targets(),
            options.noise_level,
            rng,
        );
        let vision = self.vision.process(&self.raw, &options);

        self.tick += 1;
        self.metrics.record_scene(target_resets, render.noise_pixels);
        self.metrics
            .record_frame(vision.detection_count(), vision.detections.rejected);
        self.logger.record(&format!(
            "tick {} detections {} noise {}",
            self.tick,
            vision.detection_count(),
            render.noise_pixels
        ));

        FrameReport {
            tick: self.tick,
            target_resets,
            render,
            sweep_angle: self.rasterizer.sweep_angle(),
            vision,
        }
    }
}
