use ndarray::{s, Array1};
use serde::{Deserialize, Serialize};

use crate::math::StatsHelper;
use crate::prelude::TimeRange;

/// Vertical scale for one channel. Always centred on zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmplitudeBounds {
    pub top_max: f64,
    pub bottom_max: f64,
    pub offset: f64,
    pub channel_avg: f64,
    pub channel_segment_id: String,
    /// `-1` when the bounds did not come from samples.
    pub samples_count: i64,
    #[serde(default)]
    pub top_max_secs: Option<f64>,
    #[serde(default)]
    pub bottom_max_secs: Option<f64>,
}

impl AmplitudeBounds {
    pub fn fixed(channel_segment_id: &str, value: f64) -> Self {
        Self {
            top_max: value,
            bottom_max: -value,
            offset: value,
            channel_avg: 0.0,
            channel_segment_id: channel_segment_id.to_string(),
            samples_count: -1,
            top_max_secs: None,
            bottom_max_secs: None,
        }
    }

    /// Widens `self` to cover `other`, keeping the time of whichever extreme wins.
    pub fn merge(self, other: &AmplitudeBounds) -> AmplitudeBounds {
        let (top_max, top_max_secs) = if self.top_max > other.top_max {
            (self.top_max, self.top_max_secs)
        } else {
            (other.top_max, other.top_max_secs)
        };
        let (bottom_max, bottom_max_secs) = if self.bottom_max < other.bottom_max {
            (self.bottom_max, self.bottom_max_secs)
        } else {
            (other.bottom_max, other.bottom_max_secs)
        };
        AmplitudeBounds {
            top_max,
            bottom_max,
            offset: top_max.abs().max(bottom_max.abs()),
            channel_avg: 0.0,
            channel_segment_id: self.channel_segment_id,
            samples_count: self.samples_count + other.samples_count,
            top_max_secs,
            bottom_max_secs,
        }
    }
}

/// Contiguous block of evenly sampled data.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleWindow {
    pub channel_segment_id: String,
    pub start_time_secs: f64,
    pub sample_rate_hz: f64,
    pub values: Array1<f32>,
}

impl SampleWindow {
    pub fn end_time_secs(&self) -> f64 {
        if self.values.is_empty() || self.sample_rate_hz <= 0.0 {
            return self.start_time_secs;
        }
        self.start_time_secs + (self.values.len() - 1) as f64 / self.sample_rate_hz
    }

    pub fn time_of(&self, index: usize) -> f64 {
        self.start_time_secs + index as f64 / self.sample_rate_hz
    }

    /// Inclusive sample index range covering `range`, clamped to the data.
    fn index_range(&self, range: &TimeRange) -> Option<(usize, usize)> {
        if self.values.is_empty() || self.sample_rate_hz <= 0.0 {
            return None;
        }
        if range.end_time_secs < self.start_time_secs || range.start_time_secs > self.end_time_secs() {
            return None;
        }
        let last = self.values.len() - 1;
        let to_index = |time: f64| {
            let index = ((time - self.start_time_secs) * self.sample_rate_hz).round();
            index.clamp(0.0, last as f64) as usize
        };
        Some((to_index(range.start_time_secs), to_index(range.end_time_secs)))
    }

    /// Symmetric bounds for the samples inside `range`.
    pub fn bounds_within(&self, range: &TimeRange) -> Option<AmplitudeBounds> {
        let (start, end) = self.index_range(range)?;
        let window = self.values.slice(s![start..=end]);
        let extrema = StatsHelper::extrema(window)?;
        let offset = f64::from(extrema.max.abs().max(extrema.min.abs()));
        Some(AmplitudeBounds {
            top_max: offset,
            bottom_max: -offset,
            offset,
            channel_avg: 0.0,
            channel_segment_id: self.channel_segment_id.clone(),
            samples_count: window.len() as i64,
            top_max_secs: Some(self.time_of(start + extrema.max_index)),
            bottom_max_secs: Some(self.time_of(start + extrema.min_index)),
        })
    }
}

/// Merged bounds over every window overlapping `range`.
pub fn bounds_for_windows(windows: &[SampleWindow], range: &TimeRange) -> Option<AmplitudeBounds> {
    windows
        .iter()
        .filter_map(|window| window.bounds_within(range))
        .reduce(|merged, next| merged.merge(&next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn window(id: &str, start: f64, values: Array1<f32>) -> SampleWindow {
        SampleWindow {
            channel_segment_id: id.into(),
            start_time_secs: start,
            sample_rate_hz: 1.0,
            values,
        }
    }

    #[test]
    fn bounds_are_symmetric_about_zero() {
        let data = window("seg", 100.0, array![0.5, -4.0, 2.0, 1.0]);
        let bounds = data.bounds_within(&TimeRange::new(100.0, 103.0)).unwrap();
        assert_eq!(bounds.top_max, 4.0);
        assert_eq!(bounds.bottom_max, -4.0);
        assert_eq!(bounds.offset, 4.0);
        assert_eq!(bounds.channel_avg, 0.0);
        assert_eq!(bounds.samples_count, 4);
        assert_eq!(bounds.bottom_max_secs, Some(101.0));
        assert_eq!(bounds.top_max_secs, Some(102.0));
    }

    #[test]
    fn range_limits_the_samples_considered() {
        let data = window("seg", 100.0, array![9.0, 1.0, -2.0, 9.0]);
        let bounds = data.bounds_within(&TimeRange::new(101.0, 102.0)).unwrap();
        assert_eq!(bounds.offset, 2.0);
        assert_eq!(bounds.samples_count, 2);
        assert!(data.bounds_within(&TimeRange::new(200.0, 300.0)).is_none());
    }

    #[test]
    fn windows_merge_into_widest_bounds() {
        let windows = vec![
            window("seg", 0.0, array![1.0, -1.0]),
            window("seg", 10.0, array![3.0, 0.5]),
        ];
        let bounds = bounds_for_windows(&windows, &TimeRange::new(0.0, 20.0)).unwrap();
        assert_eq!(bounds.top_max, 3.0);
        assert_eq!(bounds.bottom_max, -3.0);
        assert_eq!(bounds.top_max_secs, Some(10.0));
        assert_eq!(bounds.samples_count, 4);
        assert!(bounds.bottom_max <= bounds.channel_avg && bounds.channel_avg <= bounds.top_max);
    }
}
