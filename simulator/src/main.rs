use anyhow::Context;
use clap::{Parser, ValueEnum};
use generator::profile::build_scenario;
use gui_bridge::bridge::GuiBridge;
use gui_bridge::model::RenderModel;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use waveviewcore::alignment::AlignmentMode;
use waveviewcore::boundaries::ScalingPolicy;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;
use workflow::samples::ScenarioPayload;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Clone, Copy, ValueEnum)]
enum AlignArg {
    Time,
    Predicted,
    Observed,
}

impl From<AlignArg> for AlignmentMode {
    fn from(arg: AlignArg) -> Self {
        match arg {
            AlignArg::Time => AlignmentMode::Time,
            AlignArg::Predicted => AlignmentMode::PredictedPhase,
            AlignArg::Observed => AlignmentMode::ObservedPhase,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Waveform view-model driver")]
struct Args {
    /// Run a single synthesis pass and emit a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Load a scenario (YAML or JSON) instead of generating one
    #[arg(long)]
    scenario: Option<PathBuf>,
    #[arg(long, default_value_t = 6)]
    stations: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, value_enum, default_value_t = AlignArg::Predicted)]
    align: AlignArg,
    /// Scale every channel to this fixed amplitude
    #[arg(long)]
    fixed_scale: Option<f64>,
    /// Start in measurement mode
    #[arg(long, default_value_t = false)]
    measurement: bool,
    /// Keep the render bridge alive for incoming scenarios
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.stations, args.seed, args.align.into(), args.measurement)
    };

    let scenario_path = args.scenario.or_else(|| workflow_config.scenario.clone());
    let scenario = match scenario_path {
        Some(path) => ScenarioPayload::load(path)?,
        None => build_scenario(&workflow_config.generator)?,
    };

    let runner = Arc::new(Runner::new(workflow_config));
    let gui_bridge = GuiBridge::new(runner.clone());
    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating driver runtime")?;
    if let Some(value) = args.fixed_scale {
        runtime.block_on(runner.set_scaling(ScalingPolicy::Fixed(value)));
    }

    if args.offline {
        let result = runtime
            .block_on(runner.execute(&scenario))
            .context("running offline pass")?;

        println!(
            "Offline run -> stations {}, offsets {}, bounds {}",
            result.stations.len(),
            result.offsets.len(),
            result.bounds.len()
        );

        let offsets = result
            .offsets
            .iter()
            .map(|offset| format!("{}={:.2}", offset.receiver_name, offset.offset))
            .collect::<Vec<_>>();
        let model = RenderModel::from_result(result, scenario.description.clone());
        runtime.block_on(gui_bridge.publish(&model))?;
        gui_bridge.publish_status("Offline view model ready.");

        let report = format!(
            "stations={} offsets={:?} zoom={:?} reconcile={:?}\n",
            model.stations.len(),
            offsets,
            model.zoom_interval,
            model.stats
        );
        let report_path = PathBuf::from("tools/data/offline_view.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        file.write_all(report.as_bytes())?;
    }
    if args.serve {
        gui_bridge.serve();
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
