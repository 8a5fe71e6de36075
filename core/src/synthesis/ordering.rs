use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

use crate::domain::station::find_distance;
use crate::domain::{Event, LocationDistance, SignalDetection, Station};
use crate::prelude::{ViewError, ViewResult};
use crate::synthesis::view::ViewStation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DisplayMode {
    #[default]
    Default,
    Measurement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortType {
    #[default]
    Distance,
    StationNameAz,
    StationNameZa,
}

/// In measurement mode a station survives only when one of its detections is
/// associated to the open event through a non-rejected current hypothesis.
pub fn filter_station_on_mode(
    mode: DisplayMode,
    station: &Station,
    detections: &[SignalDetection],
    open_event: Option<&Event>,
) -> bool {
    if mode != DisplayMode::Measurement {
        return true;
    }
    let Some(event) = open_event else {
        return false;
    };
    let associated = event.associated_hypothesis_ids();
    detections
        .iter()
        .filter(|detection| detection.station_name == station.name)
        .filter_map(SignalDetection::current_hypothesis)
        .any(|hypothesis| !hypothesis.rejected && associated.contains(hypothesis.id.as_str()))
}

fn compare_by_sort(sort: SortType, a: (&str, f64), b: (&str, f64)) -> Ordering {
    match sort {
        SortType::Distance => a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal),
        SortType::StationNameAz => a.0.cmp(b.0),
        SortType::StationNameZa => b.0.cmp(a.0),
    }
}

/// Stable sort of catalog stations. Distance sorting needs a distance entry
/// for every station.
pub fn sort_stations<'a>(
    mut stations: Vec<&'a Station>,
    sort: SortType,
    distances: &[LocationDistance],
) -> ViewResult<Vec<&'a Station>> {
    if sort == SortType::Distance {
        let mut keyed = Vec::with_capacity(stations.len());
        for station in stations {
            let distance = find_distance(distances, &station.name)
                .ok_or_else(|| ViewError::MissingDistance(station.name.clone()))?;
            keyed.push((station, distance.distance_degrees));
        }
        keyed.sort_by(|a, b| compare_by_sort(sort, (&a.0.name, a.1), (&b.0.name, b.1)));
        return Ok(keyed.into_iter().map(|(station, _)| station).collect());
    }
    stations.sort_by(|a, b| compare_by_sort(sort, (&a.name, 0.0), (&b.name, 0.0)));
    Ok(stations)
}

/// Stable sort of already-built view stations using their resolved distance.
pub fn sort_view_stations(stations: &mut [Arc<ViewStation>], sort: SortType) {
    stations.sort_by(|a, b| compare_by_sort(sort, (&a.name, a.distance), (&b.name, b.distance)));
}

/// Mode-filtered stations, sorted only when an event is open or when the
/// caller forces a distance sort (zooming to the closest station).
pub fn sorted_filtered_default_stations<'a>(
    stations: &'a [Station],
    mode: DisplayMode,
    detections: &[SignalDetection],
    open_event: Option<&Event>,
    sort: SortType,
    distances: &[LocationDistance],
    force_distance_sort: bool,
) -> ViewResult<Vec<&'a Station>> {
    let filtered: Vec<&Station> = stations
        .iter()
        .filter(|station| filter_station_on_mode(mode, station, detections, open_event))
        .collect();
    if force_distance_sort {
        return sort_stations(filtered, SortType::Distance, distances);
    }
    if open_event.is_some() {
        return sort_stations(filtered, sort, distances);
    }
    Ok(filtered)
}
