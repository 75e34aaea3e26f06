//! Linear trend forecaster.
//!
//! The slope is the average delta over the series, `(last - first) / len`,
//! not a least-squares fit. Each projected point gets uniform noise in
//! `[-jitter, +jitter]` drawn from the caller's RNG, is floored at zero and
//! rounded to an integer. Pass a seeded `StdRng` for reproducible output.

use chrono::{Days, Months, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::anomaly::SeriesPoint;
use super::error::{AnalysisError, Result};

pub const DEFAULT_HORIZON: usize = 6;
pub const DEFAULT_JITTER: f64 = 2.5;
/// Any forecast above this marks the projection as rising.
pub const DEFAULT_RISING_CUTOFF: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastParams {
    pub horizon: usize,
    pub jitter: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            jitter: DEFAULT_JITTER,
        }
    }
}

/// A row of the combined chart: historical rows carry only `historical`,
/// projected rows carry only `forecast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// Average per-step delta used for the projection.
    pub trend: f64,
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    pub fn projected(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(|p| p.forecast.is_some())
    }

    /// "Increasing" as soon as one projected value exceeds `cutoff`.
    pub fn direction(&self, cutoff: f64) -> TrendDirection {
        if self
            .projected()
            .filter_map(|p| p.forecast)
            .any(|v| v > cutoff)
        {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }
}

/// Average delta slope: `(last - first) / len`.
pub fn average_trend(series: &[SeriesPoint]) -> Result<f64> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(AnalysisError::EmptySeries),
    };
    Ok((last.value - first.value) / series.len() as f64)
}

pub fn forecast<R: Rng>(
    series: &[SeriesPoint],
    params: ForecastParams,
    rng: &mut R,
) -> Result<Forecast> {
    if let Some((index, p)) = series.iter().enumerate().find(|(_, p)| !p.value.is_finite()) {
        return Err(AnalysisError::NonFiniteValue {
            index,
            value: p.value,
        });
    }
    let trend = average_trend(series)?;
    let last = series.last().ok_or(AnalysisError::EmptySeries)?;

    let mut points: Vec<ForecastPoint> = series
        .iter()
        .map(|p| ForecastPoint {
            timestamp: p.timestamp.clone(),
            historical: Some(p.value),
            forecast: None,
        })
        .collect();
    points.reserve(params.horizon);

    for step in 1..=params.horizon {
        let noise = if params.jitter > 0.0 {
            rng.random_range(-params.jitter..=params.jitter)
        } else {
            0.0
        };
        let raw = last.value + trend * step as f64 + noise;
        points.push(ForecastPoint {
            timestamp: next_label(&last.timestamp, step as u32),
            historical: None,
            forecast: Some(raw.max(0.0).round()),
        });
    }

    Ok(Forecast { trend, points })
}

/// Continue a timestamp label: `YYYY-MM-DD` by days, `YYYY-MM` by months,
/// anything else as `"<label>+<step>"`.
pub fn next_label(last: &str, step: u32) -> String {
    if let Ok(d) = NaiveDate::parse_from_str(last, "%Y-%m-%d") {
        if let Some(n) = d.checked_add_days(Days::new(step as u64)) {
            return n.format("%Y-%m-%d").to_string();
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{last}-01"), "%Y-%m-%d") {
        if let Some(n) = d.checked_add_months(Months::new(step)) {
            return n.format("%Y-%m").to_string();
        }
    }
    format!("{last}+{step}")
}
