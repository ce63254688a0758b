use anyhow::Context;
use clap::Parser;
use gui_bridge::bridge::{gui_bind_address, GuiBridge};
use gui_bridge::model::VisualizationModel;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use sweepcore::prelude::clamp_percent;
use sweepcore::FrameOptions;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Rotating-sweep scope simulator")]
struct Args {
    /// Run a fixed number of ticks and emit a detection summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Clutter level, 0-100
    #[arg(long, value_parser = parse_percent)]
    noise: Option<u8>,
    /// Threshold as a percentage of full intensity, 0-100
    #[arg(long, value_parser = parse_percent)]
    threshold: Option<u8>,
    #[arg(long, default_value_t = false)]
    no_blur: bool,
    #[arg(long, default_value_t = false)]
    no_threshold: bool,
    #[arg(long, default_value_t = false)]
    no_detection: bool,
    /// Append the offline summary to this file
    #[arg(long, default_value = "tools/data/offline_detection.log")]
    report: PathBuf,
    /// Run the live loop and serve frames over HTTP until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Live loop cadence in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
}

/// Accepts any integer and saturates it into `[0, 100]`.
fn parse_percent(raw: &str) -> Result<u8, String> {
    raw.trim()
        .parse::<i64>()
        .map(clamp_percent)
        .map_err(|err| format!("expected an integer percentage: {err}"))
}

impl Args {
    fn apply_overrides(&self, options: &mut FrameOptions) {
        if let Some(noise) = self.noise {
            options.noise_level = noise;
        }
        if let Some(threshold) = self.threshold {
            options.threshold_percent = threshold;
        }
        options.use_blur &= !self.no_blur;
        options.use_threshold &= !self.no_threshold;
        options.use_detection &= !self.no_detection;
        *options = options.clamped();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow.as_ref() {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.ticks, args.seed, FrameOptions::default())
    };
    args.apply_overrides(&mut workflow_config.options);

    let runner = Runner::new(workflow_config.clone());

    if args.offline {
        let result = runner.execute()?;

        println!(
            "Offline run -> ticks {}, detections total {}, mean {:.2}, max {}, final {}",
            result.ticks(),
            result.total_detections(),
            result.mean_detections(),
            result.max_detections(),
            result.final_summary.detection_count
        );

        let report = format!(
            "seed={} ticks={} total={} mean={:.3} max={} rejected={} final={}\n",
            workflow_config.seed,
            result.ticks(),
            result.total_detections(),
            result.mean_detections(),
            result.max_detections(),
            result.metrics.rejected_components,
            result
                .final_summary
                .to_json()
                .context("serializing final frame summary")?
        );
        if let Some(parent) = args.report.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&args.report)
            .with_context(|| format!("opening report {}", args.report.display()))?;
        file.write_all(report.as_bytes())?;
    }

    if args.serve {
        let bridge = GuiBridge::new(workflow_config.options);
        bridge.spawn(gui_bind_address())?;
        bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");

        let mut session = runner.session()?;
        let cadence = Duration::from_millis(args.frame_ms.max(1));
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for the live loop")?;
        runtime.block_on(async {
            let mut interval = tokio::time::interval(cadence);
            let shutdown = signal::ctrl_c();
            tokio::pin!(shutdown);
            loop {
                tokio::select! {
                    result = &mut shutdown => {
                        result.context("awaiting Ctrl+C to exit")?;
                        break;
                    }
                    _ = interval.tick() => {
                        let options = bridge.current_options();
                        let report = session.step(&options);
                        bridge.publish(VisualizationModel::from_report(
                            &report,
                            session.raw(),
                            options,
                            session.metrics(),
                        ));
                    }
                }
            }
            Ok::<(), anyhow::Error>(())
        })?;
        bridge.publish_status("Live loop stopped.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_flags_saturate_instead_of_failing() {
        let args = Args::try_parse_from(["simulator", "--noise", "300", "--threshold", "70"]).unwrap();
        assert_eq!(args.noise, Some(100));
        assert_eq!(args.threshold, Some(70));
    }

    #[test]
    fn non_numeric_percent_is_rejected() {
        assert!(Args::try_parse_from(["simulator", "--noise", "loud"]).is_err());
    }

    #[test]
    fn overrides_replace_loaded_options() {
        let args = Args::try_parse_from(["simulator", "--threshold", "40", "--no-blur"]).unwrap();
        let mut options = FrameOptions::default();
        args.apply_overrides(&mut options);
        assert_eq!(options.threshold_percent, 40);
        assert_eq!(options.noise_level, 15);
        assert!(!options.use_blur);
        assert!(options.use_detection);
    }
}
