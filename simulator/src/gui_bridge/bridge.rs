use crate::gui_bridge::model::VisualizationModel;
use anyhow::{Context, Result};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use sweepcore::FrameOptions;
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

pub fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

type SharedModel = Arc<RwLock<VisualizationModel>>;
type SharedOptions = Arc<RwLock<FrameOptions>>;

/// HTTP bridge between the tick loop and the external display/control panel.
#[derive(Clone)]
pub struct GuiBridge {
    state: SharedModel,
    options: SharedOptions,
}

impl GuiBridge {
    pub fn new(options: FrameOptions) -> Self {
        Self {
            state: Arc::new(RwLock::new(VisualizationModel::default())),
            options: Arc::new(RwLock::new(options.clamped())),
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone + Send + Sync + 'static
    {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());
        let options = self.options.clone();
        let options_filter = warp::any().map(move || options.clone());

        let frame_route = warp::path("frame")
            .and(warp::path::end())
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: SharedModel| {
                let summary = state
                    .read()
                    .map(|guard| guard.summary.clone())
                    .unwrap_or_default();
                warp::reply::json(&summary)
            });

        let raw_route = warp::path("raw")
            .and(warp::path::end())
            .and(warp::get())
            .and(state_filter)
            .map(|state: SharedModel| {
                let bytes = state
                    .read()
                    .map(|guard| guard.raw.clone())
                    .unwrap_or_default();
                warp::http::Response::builder()
                    .header("content-type", "application/octet-stream")
                    .body(bytes)
            });

        let get_options = warp::path("options")
            .and(warp::path::end())
            .and(warp::get())
            .and(options_filter.clone())
            .map(|options: SharedOptions| {
                let current = options.read().map(|guard| *guard).unwrap_or_default();
                warp::reply::json(&current)
            });

        let post_options = warp::path("options")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(options_filter)
            .map(|requested: FrameOptions, options: SharedOptions| {
                let applied = requested.clamped();
                match options.write() {
                    Ok(mut guard) => {
                        *guard = applied;
                        log::info!("[bridge] options updated: {:?}", applied);
                        warp::reply::with_status(
                            warp::reply::json(&json!({"status": "ok", "options": applied})),
                            StatusCode::OK,
                        )
                    }
                    Err(_) => warp::reply::with_status(
                        warp::reply::json(&json!({"status": "error"})),
                        StatusCode::INTERNAL_SERVER_ERROR,
                    ),
                }
            });

        frame_route.or(raw_route).or(get_options).or(post_options)
    }

    /// Serves the routes from a dedicated thread.
    pub fn spawn(&self, addr: SocketAddr) -> Result<thread::JoinHandle<()>> {
        let routes = self.routes();
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("building bridge runtime")?;
        let handle = thread::Builder::new()
            .name("gui-bridge".into())
            .spawn(move || {
                runtime.block_on(async move {
                    warp::serve(routes).run(addr).await;
                });
            })
            .context("spawning bridge thread")?;
        log::info!("[bridge] serving on http://{}", addr);
        Ok(handle)
    }

    pub fn publish(&self, model: VisualizationModel) {
        if let Ok(mut guard) = self.state.write() {
            *guard = model;
        }
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    /// Options the control panel last requested.
    pub fn current_options(&self) -> FrameOptions {
        self.options.read().map(|guard| *guard).unwrap_or_default()
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> sweepcore::scope_interface::FrameSummary {
        self.state
            .read()
            .map(|guard| guard.summary.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::WorkflowConfig;
    use crate::workflow::runner::Runner;

    fn bridge_with_frame() -> (GuiBridge, usize) {
        let cfg = WorkflowConfig::from_args(1, 3, FrameOptions::default());
        let runner = Runner::new(cfg.clone());
        let mut session = runner.session().unwrap();
        let report = session.step(&cfg.options);
        let bridge = GuiBridge::new(cfg.options);
        bridge.publish(VisualizationModel::from_report(
            &report,
            session.raw(),
            cfg.options,
            session.metrics(),
        ));
        (bridge, report.detection_count())
    }

    #[test]
    fn gui_bridge_updates_state() {
        let (bridge, count) = bridge_with_frame();
        assert_eq!(bridge.snapshot().detection_count, count);
        assert_eq!(bridge.snapshot().tick, 1);
    }

    #[tokio::test]
    async fn frame_route_serves_latest_summary() {
        let (bridge, count) = bridge_with_frame();
        let response = warp::test::request()
            .method("GET")
            .path("/frame")
            .reply(&bridge.routes())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["detection_count"], count);
    }

    #[tokio::test]
    async fn raw_route_serves_rgba_bytes() {
        let (bridge, _) = bridge_with_frame();
        let response = warp::test::request()
            .method("GET")
            .path("/raw")
            .reply(&bridge.routes())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().len(), 400 * 400 * 4);
    }

    #[tokio::test]
    async fn posted_options_are_clamped_and_applied() {
        let bridge = GuiBridge::new(FrameOptions::default());
        let response = warp::test::request()
            .method("POST")
            .path("/options")
            .json(&json!({"noise_level": 180, "threshold_percent": 40, "use_blur": false}))
            .reply(&bridge.routes())
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let options = bridge.current_options();
        assert_eq!(options.noise_level, 100);
        assert_eq!(options.threshold_percent, 40);
        assert!(!options.use_blur);
        assert!(options.use_threshold);
    }

    #[tokio::test]
    async fn posted_options_beyond_byte_range_are_clamped() {
        let bridge = GuiBridge::new(FrameOptions::default());
        let response = warp::test::request()
            .method("POST")
            .path("/options")
            .json(&json!({"noise_level": 300, "threshold_percent": 40}))
            .reply(&bridge.routes())
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let options = bridge.current_options();
        assert_eq!(options.noise_level, 100);
        assert_eq!(options.threshold_percent, 40);
    }
}
