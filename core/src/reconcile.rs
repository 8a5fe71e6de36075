//! Merges a freshly synthesized tree into the previously published one.
//!
//! Anything deep-equal to its old counterpart is replaced by the old `Arc`,
//! so the renderer can treat pointer inequality as its redraw signal.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::synthesis::view::{ViewChannel, ViewStation};

/// Per-pass station counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStats {
    pub reused: usize,
    pub updated: usize,
    pub added: usize,
}

/// Returns the old `Arc` when the values match, otherwise the new one.
fn keep_if_equal<T: PartialEq>(old: &Arc<T>, new: Arc<T>) -> Arc<T> {
    if Arc::ptr_eq(old, &new) || **old == *new {
        Arc::clone(old)
    } else {
        new
    }
}

fn channel_scalars_equal(old: &ViewChannel, new: &ViewChannel) -> bool {
    old.id == new.id
        && old.name == new.name
        && old.channel_label == new.channel_label
        && old.tooltip == new.tooltip
        && old.time_offset_seconds == new.time_offset_seconds
        && old.base_station_time == new.base_station_time
        && old.height == new.height
        && old.distance == new.distance
        && old.azimuth == new.azimuth
}

pub fn reconcile_channel(old: &Arc<ViewChannel>, new: Arc<ViewChannel>) -> Arc<ViewChannel> {
    if Arc::ptr_eq(old, &new) {
        return new;
    }
    let new = Arc::unwrap_or_clone(new);
    let merged = ViewChannel {
        waveform: keep_if_equal(&old.waveform, new.waveform),
        signal_detection_markers: keep_if_equal(&old.signal_detection_markers, new.signal_detection_markers),
        predicted_phase_markers: keep_if_equal(&old.predicted_phase_markers, new.predicted_phase_markers),
        selection_windows: keep_if_equal(&old.selection_windows, new.selection_windows),
        vertical_markers: keep_if_equal(&old.vertical_markers, new.vertical_markers),
        masks: keep_if_equal(&old.masks, new.masks),
        ..new
    };

    let composites_reused = Arc::ptr_eq(&old.waveform, &merged.waveform)
        && Arc::ptr_eq(&old.signal_detection_markers, &merged.signal_detection_markers)
        && Arc::ptr_eq(&old.predicted_phase_markers, &merged.predicted_phase_markers)
        && Arc::ptr_eq(&old.selection_windows, &merged.selection_windows)
        && Arc::ptr_eq(&old.vertical_markers, &merged.vertical_markers)
        && Arc::ptr_eq(&old.masks, &merged.masks);

    if composites_reused && channel_scalars_equal(old, &merged) {
        Arc::clone(old)
    } else {
        Arc::new(merged)
    }
}

/// Raw channels are matched by id. A channel missing from the old list is
/// taken as new without diffing.
fn reconcile_non_default_channels(
    old: &Arc<Vec<Arc<ViewChannel>>>,
    new: Arc<Vec<Arc<ViewChannel>>>,
) -> Arc<Vec<Arc<ViewChannel>>> {
    if Arc::ptr_eq(old, &new) {
        return new;
    }
    let merged: Vec<Arc<ViewChannel>> = Arc::unwrap_or_clone(new)
        .into_iter()
        .map(|channel| match old.iter().find(|previous| previous.id == channel.id) {
            Some(previous) => reconcile_channel(previous, channel),
            None => channel,
        })
        .collect();

    let unchanged = merged.len() == old.len()
        && merged
            .iter()
            .zip(old.iter())
            .all(|(merged, previous)| Arc::ptr_eq(merged, previous));
    if unchanged {
        Arc::clone(old)
    } else {
        Arc::new(merged)
    }
}

/// Merges one station, reporting whether the old node survived.
pub fn reconcile_station(old: &Arc<ViewStation>, new: Arc<ViewStation>) -> (Arc<ViewStation>, bool) {
    if Arc::ptr_eq(old, &new) {
        return (new, true);
    }
    let new = Arc::unwrap_or_clone(new);
    let merged = ViewStation {
        default_channel: reconcile_channel(&old.default_channel, new.default_channel),
        non_default_channels: reconcile_non_default_channels(
            &old.non_default_channels,
            new.non_default_channels,
        ),
        ..new
    };

    let reused = Arc::ptr_eq(&old.default_channel, &merged.default_channel)
        && Arc::ptr_eq(&old.non_default_channels, &merged.non_default_channels)
        && old.id == merged.id
        && old.name == merged.name
        && old.distance == merged.distance
        && old.azimuth == merged.azimuth
        && old.are_channels_showing == merged.are_channels_showing;
    if reused {
        (Arc::clone(old), true)
    } else {
        (Arc::new(merged), false)
    }
}

/// Merges the new station list into the previous one. Order follows `new`.
pub fn reconcile_stations(
    old: &[Arc<ViewStation>],
    new: Vec<Arc<ViewStation>>,
) -> (Vec<Arc<ViewStation>>, ReconcileStats) {
    let mut stats = ReconcileStats::default();
    let merged = new
        .into_iter()
        .map(|station| match old.iter().find(|previous| previous.id == station.id) {
            Some(previous) => {
                let (merged, reused) = reconcile_station(previous, station);
                if reused {
                    stats.reused += 1;
                } else {
                    stats.updated += 1;
                }
                merged
            }
            None => {
                stats.added += 1;
                station
            }
        })
        .collect();
    (merged, stats)
}
