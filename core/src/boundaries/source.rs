use std::future::Future;

use crate::boundaries::bounds::SampleWindow;
use crate::prelude::{BoundaryResult, TimeRange};

/// Sample data held by the renderer's waveform cache.
pub trait SampleSource: Send + Sync {
    /// Windows for a channel overlapping `range`. `channel_segment_id`
    /// narrows the read to one filtered segment when given.
    fn read_windows(
        &self,
        channel_id: &str,
        channel_segment_id: Option<&str>,
        range: TimeRange,
    ) -> impl Future<Output = BoundaryResult<Vec<SampleWindow>>> + Send;

    /// Interval currently zoomed to in the renderer.
    fn visible_interval(&self) -> TimeRange;
}
