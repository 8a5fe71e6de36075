use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use waveviewcore::alignment::Offset;
use waveviewcore::boundaries::AmplitudeBounds;
use waveviewcore::prelude::TimeRange;
use waveviewcore::reconcile::ReconcileStats;
use waveviewcore::synthesis::ViewStation;

use crate::workflow::runner::WorkflowResult;

/// Tree published to the external renderer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RenderModel {
    pub description: Option<String>,
    pub stations: Vec<Arc<ViewStation>>,
    pub offsets: Vec<Offset>,
    pub zoom_interval: Option<TimeRange>,
    pub bounds: BTreeMap<String, AmplitudeBounds>,
    pub stats: ReconcileStats,
}

impl RenderModel {
    pub fn from_result(result: WorkflowResult, description: Option<String>) -> Self {
        Self {
            description,
            stations: result.stations,
            offsets: result.offsets,
            zoom_interval: result.zoom_interval,
            bounds: result.bounds,
            stats: result.stats,
        }
    }
}
