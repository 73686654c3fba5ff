//! Trend classification over a value series.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of change between the two halves of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a series by comparing the means of its halves.
///
/// The series splits at `len / 2`. Returns the trend and the percent change
/// of the second half's mean relative to the first, rounded to 2 decimals.
/// A half with no values, or a first-half mean of 0, yields `(Stable, 0.0)`
/// for the change.
pub fn classify(values: &[f64]) -> (Trend, f64) {
    let mid = values.len() / 2;
    let (first, second) = values.split_at(mid);

    let (Some(first_avg), Some(second_avg)) = (mean(first), mean(second)) else {
        return (Trend::Stable, 0.0);
    };

    let trend = if second_avg > first_avg {
        Trend::Up
    } else if second_avg < first_avg {
        Trend::Down
    } else {
        Trend::Stable
    };

    let change = if first_avg == 0.0 {
        0.0
    } else {
        round2((second_avg - first_avg) / first_avg * 100.0)
    };

    (trend, change)
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
