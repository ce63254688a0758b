use crate::generator::scenario::build_simulation;
use crate::workflow::config::WorkflowConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sweepcore::scope_interface::FrameSummary;
use sweepcore::scene::RasterBuffer;
use sweepcore::telemetry::MetricsSnapshot;
use sweepcore::{FrameOptions, FrameReport, SweepSimulation};

pub struct WorkflowResult {
    pub detection_counts: Vec<usize>,
    pub final_summary: FrameSummary,
    pub metrics: MetricsSnapshot,
}

impl WorkflowResult {
    pub fn ticks(&self) -> usize {
        self.detection_counts.len()
    }

    pub fn total_detections(&self) -> usize {
        self.detection_counts.iter().sum()
    }

    pub fn max_detections(&self) -> usize {
        self.detection_counts.iter().copied().max().unwrap_or(0)
    }

    pub fn mean_detections(&self) -> f32 {
        if self.detection_counts.is_empty() {
            return 0.0;
        }
        self.total_detections() as f32 / self.detection_counts.len() as f32
    }
}

/// A simulation paired with the seeded random source that drives it.
pub struct Session {
    simulation: SweepSimulation,
    rng: StdRng,
}

impl Session {
    pub fn step(&mut self, options: &FrameOptions) -> FrameReport {
        self.simulation.tick(options, &mut self.rng)
    }

    pub fn raw(&self) -> &RasterBuffer {
        self.simulation.raw()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.simulation.metrics()
    }
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn session(&self) -> anyhow::Result<Session> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let simulation = build_simulation(
            &mut rng,
            self.config.geometry,
            self.config.motion,
            self.config.raster,
            self.config.scenario.as_ref(),
        )?;
        Ok(Session { simulation, rng })
    }

    /// Runs the configured number of ticks with fixed options.
    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let mut session = self.session()?;
        let mut detection_counts = Vec::with_capacity(self.config.ticks as usize);
        let mut final_summary = FrameSummary::default();

        for _ in 0..self.config.ticks {
            let report = session.step(&self.config.options);
            detection_counts.push(report.detection_count());
            final_summary = report.summary();
        }

        Ok(WorkflowResult {
            detection_counts,
            final_summary,
            metrics: session.metrics(),
        })
    }
}
