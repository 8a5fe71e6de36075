//! Read-only domain snapshot consumed by the view-model engine.

pub mod detection;
pub mod event;
pub mod prediction;
pub mod qc;
pub mod snapshot;
pub mod station;
pub mod visibility;
pub mod waveform;

pub use detection::{
    AmplitudeKind, AmplitudeMeasurement, FeatureMeasurement, MeasurementValue, Phase,
    SignalDetection, SignalDetectionHypothesis,
};
pub use event::{AssociationStatus, Event, EventHypothesis, EventStatus};
pub use prediction::{FeaturePrediction, PredictionType, PredictionsByReceiver, ReceiverPredictions};
pub use qc::{MaskDisplayFilters, QcMask, QcMaskCategory};
pub use snapshot::DomainSnapshot;
pub use station::{Channel, DistanceUnits, LocationDistance, Station};
pub use visibility::{StationVisibility, VisibilityDictionary};
pub use waveform::{ChannelSegmentDescriptor, ChannelSegmentsByChannel, WaveformFilter};
