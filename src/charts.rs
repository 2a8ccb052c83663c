//! Chart projections derived from a dataset's aggregates
//!
//! [`derive_charts`] is a pure function of the selected [`DatasetDetail`].
//! It is re-run on every read; projections are never stored next to the
//! detail they came from.

use crate::models::{AggregateStats, DatasetDetail};

/// Fixed categories of the bar chart, in display order
pub const BAR_LABELS: [&str; 3] = ["Avg Flowrate", "Avg Pressure", "Avg Temperature"];

/// Average flowrate, pressure and temperature
#[derive(Debug, Clone, PartialEq)]
pub struct BarProjection {
    pub labels: [&'static str; 3],
    pub values: [f64; 3],
}

impl BarProjection {
    pub fn from_stats(stats: &AggregateStats) -> Self {
        Self {
            labels: BAR_LABELS,
            values: [
                stats.avg_flowrate.unwrap_or(0.0),
                stats.avg_pressure.unwrap_or(0.0),
                stats.avg_temperature.unwrap_or(0.0),
            ],
        }
    }

    /// `(label, value)` pairs in display order
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.labels.iter().copied().zip(self.values.iter().copied())
    }

    /// Largest value, used to scale bars; 0 when every value is 0
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieSlice {
    pub label: String,
    pub count: u64,
}

/// Equipment type distribution
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PieProjection {
    pub slices: Vec<PieSlice>,
}

impl PieProjection {
    pub fn from_stats(stats: &AggregateStats) -> Self {
        let slices = stats
            .equipment_types
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|(label, count)| PieSlice {
                label: label.clone(),
                count: *count,
            })
            .collect();
        Self { slices }
    }

    pub fn total(&self) -> u64 {
        self.slices.iter().map(|s| s.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Fraction of the total a slice represents; 0 when the total is 0
    pub fn share(&self, slice: &PieSlice) -> f64 {
        match self.total() {
            0 => 0.0,
            total => slice.count as f64 / total as f64,
        }
    }
}

/// Outcome of [`derive_charts`]
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// No dataset selected, or the dataset has no summary
    NoData,
    Charts {
        bar: BarProjection,
        pie: PieProjection,
    },
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        matches!(self, ChartData::NoData)
    }
}

/// Project a dataset's summary into chart-ready data.
///
/// Never fails: missing detail or summary yields [`ChartData::NoData`],
/// missing averages read as 0, a missing type mapping yields an empty pie.
///
/// # Examples
///
/// ```
/// use chemviz::charts::{derive_charts, ChartData};
///
/// assert_eq!(derive_charts(None), ChartData::NoData);
/// ```
pub fn derive_charts(detail: Option<&DatasetDetail>) -> ChartData {
    match detail.and_then(|d| d.summary.as_ref()) {
        Some(stats) => ChartData::Charts {
            bar: BarProjection::from_stats(stats),
            pie: PieProjection::from_stats(stats),
        },
        None => ChartData::NoData,
    }
}
