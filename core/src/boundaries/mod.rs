//! Vertical amplitude scaling for rendered channels.

pub mod bounds;
pub mod cache;
pub mod calculator;
pub mod source;

pub use bounds::{bounds_for_windows, AmplitudeBounds, SampleWindow};
pub use cache::{BoundaryCache, BoundaryKey};
pub use calculator::{AmplitudeBoundaryCalculator, BoundaryRequest, ScalingPolicy};
pub use source::SampleSource;
