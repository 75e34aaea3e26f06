// src/analyze/mod.rs
//! Rule-based analysis pipeline. Every function here is synchronous and
//! side-effect free; the forecaster's only impurity is the RNG it is handed.

pub mod ai_adapter;
pub mod anomaly;
pub mod error;
pub mod forecast;
pub mod report;
pub mod responder;
pub mod summarize;
pub mod tips;

// Re-export convenient types.
pub use crate::analyze::anomaly::{classify, Classification, ClassifiedPoint, SeriesPoint};
pub use crate::analyze::error::AnalysisError;
pub use crate::analyze::forecast::{forecast, Forecast, ForecastParams, ForecastPoint, TrendDirection};
pub use crate::analyze::report::{compose_report, ReportFields};
pub use crate::analyze::responder::{classify_message, respond, ChatTopic, ResponseMatch};
pub use crate::analyze::summarize::{summarize, SummaryParams};
pub use crate::analyze::tips::eco_tips;
