use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::station::{Channel, Station};

/// Analyst-controlled display state for one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StationVisibility {
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub hidden_channels: Vec<String>,
}

impl StationVisibility {
    pub fn new(visible: bool, expanded: bool) -> Self {
        Self {
            visible,
            expanded,
            hidden_channels: Vec::new(),
        }
    }

    pub fn is_channel_visible(&self, channel_name: &str) -> bool {
        !self.hidden_channels.iter().any(|name| name == channel_name)
    }

    /// Copy of this state with `channel_name` hidden. Unchanged if already hidden.
    pub fn with_hidden_channel(&self, channel_name: &str) -> Self {
        let mut changed = self.clone();
        if self.is_channel_visible(channel_name) {
            changed.hidden_channels.push(channel_name.to_string());
        }
        changed
    }

    pub fn with_visible_channel(&self, channel_name: &str) -> Self {
        let mut changed = self.clone();
        changed.hidden_channels.retain(|name| name != channel_name);
        changed
    }
}

/// Station visibility keyed by station name. Missing stations are hidden and collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct VisibilityDictionary(pub HashMap<String, StationVisibility>);

impl VisibilityDictionary {
    pub fn get(&self, station_name: &str) -> Option<&StationVisibility> {
        self.0.get(station_name)
    }

    pub fn insert(&mut self, station_name: impl Into<String>, visibility: StationVisibility) {
        self.0.insert(station_name.into(), visibility);
    }

    pub fn is_station_visible(&self, station_name: &str) -> bool {
        self.get(station_name).map(|v| v.visible).unwrap_or(false)
    }

    pub fn is_station_expanded(&self, station_name: &str) -> bool {
        self.get(station_name).map(|v| v.expanded).unwrap_or(false)
    }

    pub fn is_channel_visible(&self, station_name: &str, channel_name: &str) -> bool {
        self.get(station_name)
            .map(|v| v.is_channel_visible(channel_name))
            .unwrap_or(true)
    }

    /// Unhidden channels in canonical order.
    pub fn visible_channels<'a>(&self, station: &'a Station) -> Vec<&'a Channel> {
        station
            .sorted_channels()
            .into_iter()
            .filter(|channel| self.is_channel_visible(&station.name, &channel.name))
            .collect()
    }

    /// Channels drawn beneath the station: visible station, expanded, channel not hidden.
    pub fn displayed_channels<'a>(&self, station: &'a Station) -> Vec<&'a Channel> {
        if self.is_station_visible(&station.name) && self.is_station_expanded(&station.name) {
            self.visible_channels(station)
        } else {
            Vec::new()
        }
    }
}
