//! # Assistant service
//! Ties the rule-based pipeline to the optional hosted model. Every
//! model-capable operation asks the model first and falls back to the
//! deterministic pipeline when it is disabled, fails, or returns nothing.
//! Failures are logged and counted, never surfaced and never retried.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::analyze::ai_adapter::{AiTask, DisabledClient, DynAiClient};
use crate::analyze::anomaly::{self, Classification, SeriesPoint};
use crate::analyze::error::Result;
use crate::analyze::forecast::{self, Forecast, TrendDirection};
use crate::analyze::{report, responder, summarize, tips};
use crate::config::AssistantConfig;
use crate::metrics;

/// Where an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Ai,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assisted<T> {
    pub value: T,
    pub source: ResponseSource,
}

impl<T> Assisted<T> {
    fn ai(value: T) -> Self {
        Self {
            value,
            source: ResponseSource::Ai,
        }
    }

    fn fallback(value: T) -> Self {
        Self {
            value,
            source: ResponseSource::Fallback,
        }
    }

    pub fn ai_used(&self) -> bool {
        self.source == ResponseSource::Ai
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    #[serde(flatten)]
    pub forecast: Forecast,
    pub direction: TrendDirection,
}

pub struct Assistant {
    cfg: AssistantConfig,
    ai: DynAiClient,
}

impl Assistant {
    pub fn new(cfg: AssistantConfig, ai: DynAiClient) -> Self {
        Self { cfg, ai }
    }

    /// No model at all; every answer comes from the pipeline.
    pub fn rule_based(cfg: AssistantConfig) -> Self {
        Self::new(cfg, std::sync::Arc::new(DisabledClient))
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.cfg
    }

    pub fn provider_name(&self) -> &'static str {
        self.ai.provider_name()
    }

    async fn simulate_latency(&self) {
        if let Some(d) = self.cfg.simulated_delay() {
            tokio::time::sleep(d).await;
        }
    }

    async fn ask(&self, task: AiTask, prompt: &str) -> Option<String> {
        let out = self.ai.generate(task, prompt).await;
        match &out {
            Some(text) => debug!(task = task.as_str(), len = text.len(), "model answered"),
            None if self.ai.provider_name() != "disabled" => warn!(
                task = task.as_str(),
                provider = self.ai.provider_name(),
                "model gave no answer; using rule-based fallback"
            ),
            None => {}
        }
        if out.is_none() {
            metrics::record_fallback(task.as_str());
        }
        out
    }

    pub async fn summarize_policy(&self, text: &str) -> Assisted<String> {
        let prompt = format!("Please summarize this policy document:\n\n{text}");
        if let Some(summary) = self.ask(AiTask::PolicySummary, &prompt).await {
            return Assisted::ai(summary);
        }
        self.simulate_latency().await;
        Assisted::fallback(summarize::summarize(text, self.cfg.summary_params()))
    }

    pub async fn eco_tips(&self, topic: &str) -> Assisted<Vec<String>> {
        let prompt = format!("Generate eco-friendly tips for: {topic}");
        if let Some(text) = self.ask(AiTask::EcoTips, &prompt).await {
            let lines: Vec<String> = text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .take(4)
                .map(str::to_string)
                .collect();
            if !lines.is_empty() {
                return Assisted::ai(lines);
            }
        }
        self.simulate_latency().await;
        debug!(topic = ?tips::matched_topic(topic), "eco tips lookup");
        Assisted::fallback(tips::eco_tips(topic))
    }

    /// `context` holds the recent turns, the current message included.
    pub async fn chat(&self, message: &str, context: &[String]) -> Assisted<String> {
        let prompt = format!("Context:\n{}\n\nUser: {message}", context.join("\n"));
        if let Some(reply) = self.ask(AiTask::Chat, &prompt).await {
            return Assisted::ai(reply);
        }
        self.simulate_latency().await;
        let matched = responder::classify_message(message);
        debug!(?matched, "chat fallback");
        Assisted::fallback(responder::respond(message).to_string())
    }

    pub fn detect_anomalies(&self, series: &[SeriesPoint], threshold: Option<f64>) -> Classification {
        let t = threshold
            .filter(|t| t.is_finite())
            .unwrap_or(self.cfg.anomaly_threshold);
        anomaly::classify(series, t)
    }

    pub async fn anomaly_insights(&self, c: &Classification) -> Assisted<String> {
        let labels = anomaly::anomaly_labels(c);
        let prompt = format!(
            "Anomalies: {} (threshold: {}). Provide insights.",
            labels.join(", "),
            c.threshold
        );
        if let Some(insights) = self.ask(AiTask::AnomalyInsights, &prompt).await {
            return Assisted::ai(insights);
        }
        Assisted::fallback(fallback_insights(c.anomaly_count(), c.threshold))
    }

    pub fn forecast<R: Rng>(
        &self,
        series: &[SeriesPoint],
        horizon: Option<usize>,
        rng: &mut R,
    ) -> Result<ForecastReport> {
        let f = forecast::forecast(series, self.cfg.forecast_params(horizon), rng)?;
        let direction = f.direction(self.cfg.trend_rising_cutoff);
        Ok(ForecastReport {
            forecast: f,
            direction,
        })
    }

    pub fn compose_report(&self, fields: &report::ReportFields, at: DateTime<Utc>) -> String {
        report::compose_report(fields, at)
    }
}

pub fn fallback_insights(count: usize, threshold: f64) -> String {
    format!(
        "Detected {count} anomalies above threshold {threshold}. Possible causes include seasonal effects, equipment faults or special events. Investigate further."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::ai_adapter::MockProvider;
    use std::sync::Arc;

    #[tokio::test]
    async fn disabled_model_uses_pipeline() {
        let a = Assistant::rule_based(AssistantConfig::default());
        let tips = a.eco_tips("solar").await;
        assert!(!tips.ai_used());
        assert_eq!(tips.value, crate::analyze::tips::eco_tips("solar"));
    }

    #[tokio::test]
    async fn model_tips_are_capped_at_four_lines() {
        let mock = MockProvider::new("one\n\ntwo\nthree\nfour\nfive");
        let a = Assistant::new(AssistantConfig::default(), Arc::new(mock));
        let tips = a.eco_tips("anything").await;
        assert!(tips.ai_used());
        assert_eq!(tips.value, vec!["one", "two", "three", "four"]);
    }

    #[tokio::test]
    async fn blank_model_tips_fall_back() {
        let a = Assistant::new(AssistantConfig::default(), Arc::new(MockProvider::new("\n \n")));
        let tips = a.eco_tips("water").await;
        assert_eq!(tips.source, ResponseSource::Fallback);
        assert_eq!(tips.value.len(), 4);
    }

    #[test]
    fn insights_text_mentions_count_and_threshold() {
        assert_eq!(
            fallback_insights(2, 100.0),
            "Detected 2 anomalies above threshold 100. Possible causes include seasonal effects, equipment faults or special events. Investigate further."
        );
    }

    #[test]
    fn non_finite_threshold_uses_configured_default() {
        let a = Assistant::rule_based(AssistantConfig::default());
        let c = a.detect_anomalies(&[SeriesPoint::new("d", 101.0)], Some(f64::NAN));
        assert_eq!(c.threshold, 100.0);
        assert_eq!(c.anomaly_count(), 1);
    }
}
