use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::detection::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionType {
    ArrivalTime,
    Slowness,
    ReceiverToSourceAzimuth,
}

/// Model-predicted feature for one phase at one receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePrediction {
    pub phase: Phase,
    pub prediction_type: PredictionType,
    #[serde(default)]
    pub arrival_time: Option<f64>,
    #[serde(default)]
    pub standard_deviation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReceiverPredictions {
    pub feature_predictions: Vec<FeaturePrediction>,
}

impl ReceiverPredictions {
    /// Predicted arrival time for `phase`, if the receiver has one.
    pub fn arrival_time(&self, phase: &Phase) -> Option<f64> {
        self.arrival_time_prediction(phase)
            .and_then(|prediction| prediction.arrival_time)
    }

    pub fn arrival_time_prediction(&self, phase: &Phase) -> Option<&FeaturePrediction> {
        self.feature_predictions.iter().find(|prediction| {
            prediction.phase == *phase && prediction.prediction_type == PredictionType::ArrivalTime
        })
    }
}

/// Predictions keyed by receiver (station or channel) name.
pub type PredictionsByReceiver = BTreeMap<String, ReceiverPredictions>;
