//! Threshold classifier: a point is anomalous when its value is strictly above
//! the configured threshold. Each point is judged on its own; neighbours,
//! lower bounds and hysteresis play no role.

use serde::{Deserialize, Serialize};

/// Threshold used when the caller does not supply one.
pub const DEFAULT_THRESHOLD: f64 = 100.0;

/// One labelled observation of a KPI series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedPoint {
    pub timestamp: String,
    pub value: f64,
    #[serde(rename = "isAnomaly")]
    pub is_anomaly: bool,
}

/// Every input point (input order) plus the anomalous subsequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub threshold: f64,
    pub points: Vec<ClassifiedPoint>,
    pub anomalies: Vec<ClassifiedPoint>,
}

impl Classification {
    pub fn anomaly_count(&self) -> usize {
        self.anomalies.len()
    }
}

pub fn classify(series: &[SeriesPoint], threshold: f64) -> Classification {
    let points: Vec<ClassifiedPoint> = series
        .iter()
        .map(|p| ClassifiedPoint {
            timestamp: p.timestamp.clone(),
            value: p.value,
            is_anomaly: p.value > threshold,
        })
        .collect();

    let anomalies = points.iter().filter(|p| p.is_anomaly).cloned().collect();

    Classification {
        threshold,
        points,
        anomalies,
    }
}

/// Short labels ("2024-01-04: 125") used when handing anomalies to a model.
pub fn anomaly_labels(c: &Classification) -> Vec<String> {
    c.anomalies
        .iter()
        .map(|p| format!("{}: {}", p.timestamp, p.value))
        .collect()
}
