//! Builds the per-station render tree from a domain snapshot.

pub mod builder;
pub mod label;
pub mod markers;
pub mod ordering;
pub mod selection;
pub mod view;

use std::sync::Arc;

use crate::alignment::{calculate_offsets, zoom_interval_for_open_event, AlignmentInputs, Offset};
use crate::domain::detection::detections_for_station;
use crate::domain::event::find_event;
use crate::domain::DomainSnapshot;
use crate::prelude::{DisplayConfig, TimeRange, ViewResult};
use crate::telemetry::{LogManager, MetricsRecorder};

pub use builder::{create_view_station, BuildContext, DisplayParameters};
pub use label::get_channel_label_and_tooltip;
pub use ordering::{
    filter_station_on_mode, sort_stations, sort_view_stations, sorted_filtered_default_stations,
    DisplayMode, SortType,
};
pub use selection::generate_selection_windows;
pub use view::{
    LineStyle, Marker, PickMarker, SelectionWindow, SelectionWindowKind, ThemeTokens, ViewChannel,
    ViewMask, ViewStation, WaveformContent,
};

/// Result of one synthesis pass.
#[derive(Debug, Clone, Default)]
pub struct SynthesisOutput {
    pub stations: Vec<Arc<ViewStation>>,
    pub offsets: Vec<Offset>,
}

pub struct ViewModelSynthesizer {
    config: DisplayConfig,
    logger: LogManager,
    metrics: Arc<MetricsRecorder>,
}

impl ViewModelSynthesizer {
    pub fn new(config: DisplayConfig, metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            config,
            logger: LogManager::for_target("waveviewcore::synthesis"),
            metrics,
        }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Offsets plus the ordered station list for the current display state.
    pub fn synthesize(
        &self,
        snapshot: &DomainSnapshot,
        params: &DisplayParameters,
    ) -> ViewResult<SynthesisOutput> {
        let open_event = find_event(&snapshot.events, params.open_event_id.as_deref());
        let ordered = sorted_filtered_default_stations(
            &snapshot.stations,
            params.mode,
            &snapshot.detections,
            open_event,
            params.sort_type,
            &snapshot.distances,
            false,
        )?;
        let visible: Vec<_> = ordered
            .into_iter()
            .filter(|station| params.visibility.is_station_visible(&station.name))
            .collect();

        let inputs = AlignmentInputs {
            mode: params.alignment,
            phase: &params.phase_to_align_on,
            predictions: snapshot.predictions.as_ref(),
            detections: &snapshot.detections,
            events: &snapshot.events,
            open_event_id: params.open_event_id.as_deref(),
        };
        let base_station = visible.first().map(|station| station.name.as_str());
        let offsets = calculate_offsets(&inputs, base_station);

        let context = BuildContext {
            snapshot,
            params,
            config: &self.config,
            offsets: &offsets,
            open_event,
            logger: &self.logger,
        };
        let mut stations: Vec<Arc<ViewStation>> = visible
            .iter()
            .map(|station| {
                let detections = detections_for_station(&station.name, &snapshot.detections);
                Arc::new(create_view_station(station, &detections, &context))
            })
            .collect();
        sort_view_stations(&mut stations, params.sort_type);

        self.metrics.record_synthesis_pass();
        self.logger.trace_pass(&format!(
            "synthesized {} stations with {} offsets",
            stations.len(),
            offsets.len()
        ));
        Ok(SynthesisOutput { stations, offsets })
    }

    /// Zoom window around the default phase at the closest visible station.
    pub fn calculate_zoom_interval(
        &self,
        snapshot: &DomainSnapshot,
        params: &DisplayParameters,
    ) -> ViewResult<Option<TimeRange>> {
        let Some(open_event) = find_event(&snapshot.events, params.open_event_id.as_deref()) else {
            return Ok(None);
        };
        let by_distance = sorted_filtered_default_stations(
            &snapshot.stations,
            params.mode,
            &snapshot.detections,
            Some(open_event),
            params.sort_type,
            &snapshot.distances,
            true,
        )?;
        let closest = by_distance
            .into_iter()
            .find(|station| params.visibility.is_station_visible(&station.name))
            .map(|station| station.name.as_str());
        Ok(zoom_interval_for_open_event(
            snapshot.predictions.as_ref(),
            closest,
            &self.config,
        ))
    }
}
