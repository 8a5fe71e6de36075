use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use waveviewcore::alignment::AlignmentMode;
use waveviewcore::boundaries::ScalingPolicy;
use waveviewcore::prelude::DisplayConfig;
use waveviewcore::synthesis::{DisplayMode, DisplayParameters};

use crate::generator::profile::{GeneratorConfig, GENERATED_EVENT_ID};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub display: DisplayConfig,
    pub params: DisplayParameters,
    pub scaling: ScalingPolicy,
    pub generator: GeneratorConfig,
    /// Scenario file to load instead of generating one.
    pub scenario: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(station_count: usize, seed: u64, alignment: AlignmentMode, measurement: bool) -> Self {
        let params = DisplayParameters {
            alignment,
            mode: if measurement {
                DisplayMode::Measurement
            } else {
                DisplayMode::Default
            },
            open_event_id: Some(GENERATED_EVENT_ID.to_string()),
            ..Default::default()
        };
        Self {
            params,
            generator: GeneratorConfig {
                station_count,
                seed,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
