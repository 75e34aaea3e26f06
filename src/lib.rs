// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod assistant;
pub mod config;
pub mod conversation;
pub mod metrics;
pub mod samples;

// Rule-based pipeline (anomalies, forecast, summaries, tips, chat, reports)
pub mod analyze;

// ---- Re-exports for stable public API ----
pub use analyze::ai_adapter;
pub use crate::api::{create_router, router, AppState};
pub use crate::assistant::{Assistant, Assisted, ResponseSource};
