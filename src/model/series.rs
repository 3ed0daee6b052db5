use crate::foundation::error::{ChartcastError, ChartcastResult};

/// One labelled value inside a series.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DataPoint {
    /// Human-readable label ("Q1", "Berlin", ...).
    pub label: String,
    /// Numeric value; must be finite.
    pub value: f64,
}

/// An ordered, named sequence of data points.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSeries {
    /// Series name shown in legends.
    pub name: String,
    /// Points in presentation order.
    #[serde(rename = "dataPoints")]
    pub points: Vec<DataPoint>,
}

/// The full set of series being visualized.
///
/// The recording core only ever derives a point-count from this; values are
/// never interpreted.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SeriesSet {
    /// Series in presentation order.
    pub series: Vec<DataSeries>,
}

impl SeriesSet {
    /// Build a set from a list of series.
    pub fn new(series: Vec<DataSeries>) -> Self {
        Self { series }
    }

    /// The largest point-count across all series; 0 for an empty set.
    pub fn max_points(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).max().unwrap_or(0)
    }

    /// True when there is no data at all.
    pub fn is_empty(&self) -> bool {
        self.max_points() == 0
    }

    /// Check that every point carries a label and a finite value.
    pub fn validate(&self) -> ChartcastResult<()> {
        for s in &self.series {
            for p in &s.points {
                if p.label.is_empty() {
                    return Err(ChartcastError::validation(format!(
                        "series '{}' contains a point with an empty label",
                        s.name
                    )));
                }
                if !p.value.is_finite() {
                    return Err(ChartcastError::validation(format!(
                        "series '{}' point '{}' has a non-finite value",
                        s.name, p.label
                    )));
                }
            }
        }
        Ok(())
    }
}
