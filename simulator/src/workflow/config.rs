use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use sweepcore::scene::{MotionConfig, RasterConfig};
use sweepcore::{FrameOptions, SensorGeometry};

use crate::generator::scenario::ScenarioConfig;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub ticks: u64,
    pub seed: u64,
    pub geometry: SensorGeometry,
    pub motion: MotionConfig,
    pub raster: RasterConfig,
    pub options: FrameOptions,
    pub scenario: Option<ScenarioConfig>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            seed: 0,
            geometry: SensorGeometry::default(),
            motion: MotionConfig::default(),
            raster: RasterConfig::default(),
            options: FrameOptions::default(),
            scenario: None,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .geometry
            .validate()
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config.clamped())
    }

    pub fn from_args(ticks: u64, seed: u64, options: FrameOptions) -> Self {
        Self {
            ticks,
            seed,
            options: options.clamped(),
            ..Default::default()
        }
    }

    fn clamped(mut self) -> Self {
        self.options = self.options.clamped();
        self
    }
}
