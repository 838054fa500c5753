// Descriptive statistics for repeated benchmark trials
//
// Population statistics only: each group holds every trial of a
// configuration, not a sample drawn from a larger population, so the
// variance divisor is n.

use serde::{Deserialize, Serialize};

/// Mean, median and population standard deviation of one metric in one group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub mean: f64,
    #[serde(default)]
    pub median: f64,
    #[serde(default)]
    pub stdev: f64,
}

impl Aggregate {
    /// Aggregate a list of trial values
    ///
    /// An empty list yields all zeros; grouping never produces one.
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            mean: mean(values),
            median: median(values),
            stdev: stdev(values),
        }
    }

    /// Coefficient of variation (stdev / mean), `None` for a non-positive mean
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        (self.mean > 0.0).then_some(self.stdev / self.mean)
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle element for odd counts, average of the two central ones otherwise
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

/// Square root of the population variance
pub fn stdev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mean = mean(values);
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
