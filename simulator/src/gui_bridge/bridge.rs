use crate::generator::profile::{build_scenario, GeneratorConfig};
use crate::gui_bridge::model::RenderModel;
use crate::workflow::runner::Runner;
use crate::workflow::samples::ScenarioPayload;
use anyhow::Result;
use log::{error, info};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc, thread};
use tokio::runtime::Builder;
use tokio::sync::RwLock;
use warp::{http::StatusCode, Filter};

fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug)]
struct WarpError;

impl warp::reject::Reject for WarpError {}

async fn run_and_publish(
    runner: Arc<Runner>,
    state: Arc<RwLock<RenderModel>>,
    scenario: ScenarioPayload,
) -> Result<RenderModel> {
    let result = runner.execute(&scenario).await?;
    let model = RenderModel::from_result(result, scenario.description.clone());
    *state.write().await = model.clone();
    Ok(model)
}

/// Hosts the HTTP endpoint the renderer polls and accepts new scenarios.
pub struct GuiBridge {
    state: Arc<RwLock<RenderModel>>,
    runner: Arc<Runner>,
}

impl GuiBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        Self {
            state: Arc::new(RwLock::new(RenderModel::default())),
            runner,
        }
    }

    /// Starts the warp server on its own thread and runtime.
    pub fn serve(&self) {
        let state_for_filter = self.state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let runner = self.runner.clone();
        let runner_filter = warp::any().map(move || runner.clone());

        let get_route = warp::path("stations")
            .and(warp::get())
            .and(state_filter.clone())
            .and_then(|state: Arc<RwLock<RenderModel>>| async move {
                let model = state.read().await;
                Ok::<_, warp::Rejection>(warp::reply::json(&*model))
            });

        let post_route = warp::path("ingest")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter.clone())
            .and(runner_filter.clone())
            .and_then(
                |scenario: ScenarioPayload, state: Arc<RwLock<RenderModel>>, runner: Arc<Runner>| async move {
                    match run_and_publish(runner, state, scenario).await {
                        Ok(model) => Ok::<_, warp::Rejection>(warp::reply::with_status(
                            warp::reply::json(&json!({
                                "status": "ok",
                                "stations": model.stations.len(),
                                "reused": model.stats.reused,
                            })),
                            StatusCode::OK,
                        )),
                        Err(err) => {
                            error!("ingest error: {:#}", err);
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        let generator_route = warp::path("ingest-config")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .and_then(
                |config: GeneratorConfig, state: Arc<RwLock<RenderModel>>, runner: Arc<Runner>| async move {
                    let outcome = match build_scenario(&config) {
                        Ok(scenario) => run_and_publish(runner, state, scenario).await,
                        Err(err) => Err(err),
                    };
                    match outcome {
                        Ok(model) => {
                            if let Some(name) = config.scenario.as_ref() {
                                info!("[GUI] Scenario {} -> stations {}", name, model.stations.len());
                            }
                            Ok::<_, warp::Rejection>(warp::reply::with_status(
                                warp::reply::json(&json!({
                                    "status": "ok",
                                    "stations": model.stations.len(),
                                    "description": config.description.clone().unwrap_or_default()
                                })),
                                StatusCode::OK,
                            ))
                        }
                        Err(err) => {
                            error!("ingest-config error: {:#}", err);
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        thread::spawn(move || {
            let routes = get_route.or(post_route).or(generator_route);
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(gui_bind_address()).await;
            });
        });
    }

    pub async fn publish(&self, model: &RenderModel) -> Result<()> {
        let mut guard = self.state.write().await;
        *guard = model.clone();
        info!(
            "[GUI] stations: {}, offsets: {}, bounds: {}",
            guard.stations.len(),
            guard.offsets.len(),
            guard.bounds.len()
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        info!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub async fn snapshot(&self) -> RenderModel {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::WorkflowConfig;
    use waveviewcore::alignment::AlignmentMode;

    #[tokio::test]
    async fn gui_bridge_updates_state() {
        let cfg = WorkflowConfig::from_args(3, 2, AlignmentMode::PredictedPhase, false);
        let runner = Arc::new(Runner::new(cfg.clone()));
        let gui = GuiBridge::new(runner.clone());
        let scenario = build_scenario(&cfg.generator).unwrap();

        let model = run_and_publish(runner, gui.state.clone(), scenario).await.unwrap();
        assert_eq!(gui.snapshot().await.stations.len(), model.stations.len());

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["stations"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn publish_replaces_state() {
        let runner = Arc::new(Runner::new(WorkflowConfig::default()));
        let gui = GuiBridge::new(runner);
        let model = RenderModel {
            description: Some("manual".into()),
            ..Default::default()
        };
        gui.publish(&model).await.unwrap();
        assert_eq!(gui.snapshot().await.description.as_deref(), Some("manual"));
    }
}
