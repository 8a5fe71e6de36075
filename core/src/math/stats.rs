use ndarray::ArrayView1;

/// Largest and smallest sample in a slice with their indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrema {
    pub max: f32,
    pub max_index: usize,
    pub min: f32,
    pub min_index: usize,
}

pub struct StatsHelper;

impl StatsHelper {
    /// Extrema over the finite samples; `None` when there are none.
    pub fn extrema(samples: ArrayView1<f32>) -> Option<Extrema> {
        let mut result: Option<Extrema> = None;
        for (index, &value) in samples.iter().enumerate() {
            if !value.is_finite() {
                continue;
            }
            let current = result.get_or_insert(Extrema {
                max: value,
                max_index: index,
                min: value,
                min_index: index,
            });
            if value > current.max {
                current.max = value;
                current.max_index = index;
            }
            if value < current.min {
                current.min = value;
                current.min_index = index;
            }
        }
        result
    }
}
