use crate::alignment::offsets::get_alignment_time;
use crate::domain::PredictionsByReceiver;
use crate::prelude::{DisplayConfig, TimeRange};

const DEFAULT_BUFFER_SECS: f64 = 30.0;

/// Zoom interval centred on the default-phase arrival at the closest station.
///
/// `closest_station` is the first visible station after sorting by distance.
pub fn zoom_interval_for_open_event(
    predictions: Option<&PredictionsByReceiver>,
    closest_station: Option<&str>,
    config: &DisplayConfig,
) -> Option<TimeRange> {
    let buffer = match config.zoom_interval_secs {
        Some(interval) if !interval.is_nan() => interval / 2.0,
        _ => DEFAULT_BUFFER_SECS,
    };
    let alignment_time = get_alignment_time(
        predictions?,
        closest_station?,
        &config.default_alignment_phase,
    )?;
    Some(TimeRange::new(alignment_time - buffer, alignment_time + buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeaturePrediction, Phase, PredictionType, ReceiverPredictions};

    fn predictions() -> PredictionsByReceiver {
        PredictionsByReceiver::from([(
            "AAK".to_string(),
            ReceiverPredictions {
                feature_predictions: vec![FeaturePrediction {
                    phase: Phase::from("P"),
                    prediction_type: PredictionType::ArrivalTime,
                    arrival_time: Some(1_000.0),
                    standard_deviation: Some(0.5),
                }],
            },
        )])
    }

    #[test]
    fn default_buffer_is_thirty_seconds() {
        let range = zoom_interval_for_open_event(Some(&predictions()), Some("AAK"), &DisplayConfig::default())
            .unwrap();
        assert_eq!(range, TimeRange::new(970.0, 1_030.0));
    }

    #[test]
    fn configured_interval_is_split_around_arrival() {
        let config = DisplayConfig {
            zoom_interval_secs: Some(20.0),
            ..Default::default()
        };
        let range = zoom_interval_for_open_event(Some(&predictions()), Some("AAK"), &config).unwrap();
        assert_eq!(range.duration(), 20.0);
        assert!(zoom_interval_for_open_event(Some(&predictions()), None, &config).is_none());
    }
}
