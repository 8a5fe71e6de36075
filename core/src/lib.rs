//! Waveform alignment and view-model synthesis core for the analyst review
//! workstation.
//!
//! Turns a read-only domain snapshot into an aligned, sorted station/channel
//! tree, reconciles it against the previously published tree, and resolves
//! amplitude bounds on demand for the external renderer.

pub mod alignment;
pub mod boundaries;
pub mod domain;
pub mod math;
pub mod prelude;
pub mod reconcile;
pub mod synthesis;
pub mod telemetry;

pub use prelude::{DisplayConfig, TimeRange, ViewError, ViewResult};
pub use reconcile::{reconcile_stations, ReconcileStats};
pub use synthesis::{DisplayParameters, SynthesisOutput, ViewModelSynthesizer};
