use serde::{Deserialize, Serialize};

use crate::domain::{Phase, WaveformFilter};

/// Interval in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_time_secs: f64,
    pub end_time_secs: f64,
}

impl TimeRange {
    pub fn new(start_time_secs: f64, end_time_secs: f64) -> Self {
        Self {
            start_time_secs,
            end_time_secs,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time_secs - self.start_time_secs
    }

    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        start <= self.end_time_secs && end >= self.start_time_secs
    }
}

/// Primary measurement window placed around a detection's arrival time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub id_prefix: String,
    pub start_offset_secs: f64,
    pub end_offset_secs: f64,
    pub is_moveable: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            id_prefix: "selection-measurement-selection-".into(),
            start_offset_secs: -0.5,
            end_offset_secs: 5.0,
            is_moveable: false,
        }
    }
}

/// Peak/trough window derived from an amplitude measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakTroughConfig {
    pub id_prefix: String,
    pub is_moveable: bool,
    pub min_period_secs: f64,
    pub max_period_secs: f64,
}

impl Default for PeakTroughConfig {
    fn default() -> Self {
        Self {
            id_prefix: "selection-measurement-peaktrough-".into(),
            is_moveable: true,
            min_period_secs: 0.4,
            max_period_secs: 1.0,
        }
    }
}

/// Analyst configuration shared by every synthesis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Phases whose detections get measurement windows.
    pub measurement_phases: Vec<Phase>,
    pub selection: SelectionConfig,
    pub peak_trough: PeakTroughConfig,
    /// Predicted phases always drawn, regardless of the alignment phase.
    pub priority_phases: Vec<Phase>,
    /// Phases offered for alignment when predictions exist.
    pub default_phases: Vec<Phase>,
    pub default_alignment_phase: Phase,
    /// Width of the zoom applied when an event is opened.
    pub zoom_interval_secs: Option<f64>,
    /// Filter forced onto every row in measurement mode.
    pub measurement_filter: Option<WaveformFilter>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            measurement_phases: vec!["P".into(), "Pg".into(), "Pn".into()],
            selection: SelectionConfig::default(),
            peak_trough: PeakTroughConfig::default(),
            priority_phases: vec!["P".into(), "Pn".into(), "Pg".into(), "S".into(), "Lg".into()],
            default_phases: ["P", "Pn", "Pg", "pP", "S", "Sn", "Lg", "Rg", "PKP", "PcP"]
                .into_iter()
                .map(Phase::from)
                .collect(),
            default_alignment_phase: "P".into(),
            zoom_interval_secs: None,
            measurement_filter: None,
        }
    }
}

/// Errors raised while building the view model.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ViewError {
    #[error("couldn't determine station label: detections from {0} and {1} were mixed")]
    MixedStations(String, String),
    #[error("couldn't determine station label: detection {0} has no feature measurements")]
    MissingFeatureMeasurement(String),
    #[error("no distance entry for station {0}")]
    MissingDistance(String),
}

pub type ViewResult<T> = Result<T, ViewError>;

/// Errors raised while resolving amplitude boundaries.
#[derive(thiserror::Error, Debug)]
pub enum BoundaryError {
    #[error("sample data unavailable for {0}")]
    Unavailable(String),
    #[error("invalid time range: start {0} after end {1}")]
    InvalidRange(f64, f64),
}

pub type BoundaryResult<T> = Result<T, BoundaryError>;
