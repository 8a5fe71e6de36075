use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QcMaskCategory {
    AnalystDefined,
    ChannelProcessing,
    DataAuthentication,
    Rejected,
    StationSoh,
    WaveformQuality,
}

/// Annotated interval flagging a data-quality issue on a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcMask {
    pub id: String,
    pub channel_name: String,
    pub category: QcMaskCategory,
    pub start_time: f64,
    pub end_time: f64,
}

/// Which mask categories are drawn. Categories missing from the map are hidden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct MaskDisplayFilters(pub HashMap<QcMaskCategory, bool>);

impl MaskDisplayFilters {
    pub fn all_visible() -> Self {
        use QcMaskCategory::*;
        Self(
            [
                AnalystDefined,
                ChannelProcessing,
                DataAuthentication,
                Rejected,
                StationSoh,
                WaveformQuality,
            ]
            .into_iter()
            .map(|category| (category, true))
            .collect(),
        )
    }

    pub fn is_visible(&self, category: QcMaskCategory) -> bool {
        self.0.get(&category).copied().unwrap_or(false)
    }
}
