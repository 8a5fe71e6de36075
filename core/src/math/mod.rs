pub mod stats;

pub use stats::{Extrema, StatsHelper};
