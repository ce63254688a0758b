use log::{debug, info};

/// Stage-tagged front end over the `log` facade.
pub struct LogManager {
    stage: &'static str,
}

impl LogManager {
    pub fn new(stage: &'static str) -> Self {
        Self { stage }
    }

    /// Per-frame chatter.
    pub fn record(&self, message: &str) {
        debug!("[{}] {}", self.stage, message);
    }

    pub fn notice(&self, message: &str) {
        info!("[{}] {}", self.stage, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("sweepcore")
    }
}
