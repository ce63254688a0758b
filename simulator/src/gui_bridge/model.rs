use serde::{Deserialize, Serialize};
use sweepcore::scene::RasterBuffer;
use sweepcore::scope_interface::FrameSummary;
use sweepcore::telemetry::MetricsSnapshot;
use sweepcore::{FrameOptions, FrameReport};

/// Latest frame as seen by the external display.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub summary: FrameSummary,
    pub options: FrameOptions,
    pub metrics: MetricsSnapshot,
    pub width: usize,
    pub height: usize,
    #[serde(skip)]
    pub raw: Vec<u8>,
}

impl VisualizationModel {
    pub fn from_report(
        report: &FrameReport,
        raw: &RasterBuffer,
        options: FrameOptions,
        metrics: MetricsSnapshot,
    ) -> Self {
        Self {
            summary: report.summary(),
            options,
            metrics,
            width: raw.width(),
            height: raw.height(),
            raw: raw.as_bytes().to_vec(),
        }
    }
}
