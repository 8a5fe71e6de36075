use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Raw channel belonging to a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub station_name: String,
    pub nominal_sample_rate_hz: f64,
    /// Site or array element, e.g. `AS01`.
    pub channel_group: String,
    pub band_code: char,
    pub instrument_code: char,
    pub orientation_code: char,
}

impl Channel {
    fn orientation_rank(&self) -> u8 {
        match self.orientation_code {
            'Z' => 0,
            'N' => 1,
            'E' => 2,
            '1' => 3,
            '2' => 4,
            '3' => 5,
            _ => 6,
        }
    }

    /// Canonical display order: group, band, instrument, then orientation.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.channel_group
            .cmp(&other.channel_group)
            .then_with(|| self.band_code.cmp(&other.band_code))
            .then_with(|| self.instrument_code.cmp(&other.instrument_code))
            .then_with(|| self.orientation_rank().cmp(&other.orientation_rank()))
            .then_with(|| self.name.cmp(&other.name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub channels: Vec<Channel>,
}

impl Station {
    /// Raw channels in canonical channel-group/orientation order.
    pub fn sorted_channels(&self) -> Vec<&Channel> {
        let mut channels: Vec<&Channel> = self.channels.iter().collect();
        channels.sort_by(|a, b| a.canonical_cmp(b));
        channels
    }

    pub fn nominal_sample_rate_hz(&self) -> Option<f64> {
        self.channels.first().map(|channel| channel.nominal_sample_rate_hz)
    }
}

/// Distance and azimuth from the open event to a receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDistance {
    pub id: String,
    pub distance_degrees: f64,
    pub distance_km: f64,
    pub azimuth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DistanceUnits {
    #[default]
    Degrees,
    Km,
}

impl LocationDistance {
    pub fn in_units(&self, units: DistanceUnits) -> f64 {
        match units {
            DistanceUnits::Degrees => self.distance_degrees,
            DistanceUnits::Km => self.distance_km,
        }
    }
}

pub fn find_distance<'a>(distances: &'a [LocationDistance], id: &str) -> Option<&'a LocationDistance> {
    distances.iter().find(|distance| distance.id == id)
}
