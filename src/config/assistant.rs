// src/config/assistant.rs
//! Pipeline tunables, loaded from TOML.
//!
//! Lookup order:
//! 1) $ASSISTANT_CONFIG_PATH
//! 2) config/assistant.toml
//! 3) built-in defaults

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analyze::anomaly::DEFAULT_THRESHOLD;
use crate::analyze::forecast::{
    ForecastParams, DEFAULT_HORIZON, DEFAULT_JITTER, DEFAULT_RISING_CUTOFF,
};
use crate::analyze::summarize::{SummaryParams, DEFAULT_MAX_POINTS, DEFAULT_MIN_SENTENCE_LEN};

pub const DEFAULT_ASSISTANT_CONFIG_PATH: &str = "config/assistant.toml";
pub const ENV_ASSISTANT_CONFIG_PATH: &str = "ASSISTANT_CONFIG_PATH";

const DEFAULT_CHAT_CONTEXT_LEN: usize = 5;
pub const MAX_HORIZON: usize = 60;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub anomaly_threshold: f64,
    pub forecast_horizon: usize,
    pub forecast_jitter: f64,
    pub trend_rising_cutoff: f64,
    pub summary_max_points: usize,
    pub summary_min_sentence_len: usize,
    /// Artificial latency before answers; 0 disables it.
    pub simulated_delay_ms: u64,
    pub chat_context_len: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: DEFAULT_THRESHOLD,
            forecast_horizon: DEFAULT_HORIZON,
            forecast_jitter: DEFAULT_JITTER,
            trend_rising_cutoff: DEFAULT_RISING_CUTOFF,
            summary_max_points: DEFAULT_MAX_POINTS,
            summary_min_sentence_len: DEFAULT_MIN_SENTENCE_LEN,
            simulated_delay_ms: 0,
            chat_context_len: DEFAULT_CHAT_CONTEXT_LEN,
        }
    }
}

impl AssistantConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading assistant config from {}", path.display()))?;
        let cfg: AssistantConfig = toml::from_str(&content)
            .with_context(|| format!("parsing assistant config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_ASSISTANT_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("ASSISTANT_CONFIG_PATH points to non-existent path"));
        }
        let p = PathBuf::from(DEFAULT_ASSISTANT_CONFIG_PATH);
        if p.exists() {
            return Self::load_from(&p);
        }
        Ok(Self::default())
    }

    /// Replace out-of-range values with defaults.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        if !self.anomaly_threshold.is_finite() {
            self.anomaly_threshold = d.anomaly_threshold;
        }
        if self.forecast_horizon == 0 || self.forecast_horizon > MAX_HORIZON {
            self.forecast_horizon = d.forecast_horizon;
        }
        if !self.forecast_jitter.is_finite() || self.forecast_jitter < 0.0 {
            self.forecast_jitter = d.forecast_jitter;
        }
        if !self.trend_rising_cutoff.is_finite() {
            self.trend_rising_cutoff = d.trend_rising_cutoff;
        }
        if self.summary_max_points == 0 {
            self.summary_max_points = d.summary_max_points;
        }
        if self.chat_context_len == 0 {
            self.chat_context_len = d.chat_context_len;
        }
        self
    }

    pub fn forecast_params(&self, horizon: Option<usize>) -> ForecastParams {
        let horizon = horizon
            .filter(|h| (1..=MAX_HORIZON).contains(h))
            .unwrap_or(self.forecast_horizon);
        ForecastParams {
            horizon,
            jitter: self.forecast_jitter,
        }
    }

    pub fn summary_params(&self) -> SummaryParams {
        SummaryParams {
            max_points: self.summary_max_points,
            min_sentence_len: self.summary_min_sentence_len,
        }
    }

    pub fn simulated_delay(&self) -> Option<Duration> {
        (self.simulated_delay_ms > 0).then(|| Duration::from_millis(self.simulated_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: AssistantConfig = toml::from_str("anomaly_threshold = 120.0\n").unwrap();
        assert_eq!(cfg.anomaly_threshold, 120.0);
        assert_eq!(cfg.forecast_horizon, 6);
        assert_eq!(cfg.summary_min_sentence_len, 20);
        assert!(cfg.simulated_delay().is_none());
    }

    #[test]
    fn sanitize_restores_bad_values() {
        let cfg = AssistantConfig {
            forecast_horizon: 0,
            forecast_jitter: -1.0,
            summary_max_points: 0,
            chat_context_len: 0,
            ..AssistantConfig::default()
        }
        .sanitized();
        assert_eq!(cfg, AssistantConfig::default());
    }

    #[test]
    fn request_horizon_overrides_within_bounds() {
        let cfg = AssistantConfig::default();
        assert_eq!(cfg.forecast_params(Some(12)).horizon, 12);
        assert_eq!(cfg.forecast_params(Some(0)).horizon, 6);
        assert_eq!(cfg.forecast_params(Some(1000)).horizon, 6);
        assert_eq!(cfg.forecast_params(None).horizon, 6);
    }

    #[serial_test::serial]
    #[test]
    fn env_path_takes_precedence() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_ASSISTANT_CONFIG_PATH);
        assert_eq!(
            AssistantConfig::load_default().unwrap(),
            AssistantConfig::default()
        );

        let p = tmp.path().join("custom.toml");
        fs::write(&p, "simulated_delay_ms = 250\nforecast_horizon = 3\n").unwrap();
        env::set_var(ENV_ASSISTANT_CONFIG_PATH, p.display().to_string());
        let cfg = AssistantConfig::load_default().unwrap();
        assert_eq!(cfg.forecast_horizon, 3);
        assert_eq!(cfg.simulated_delay(), Some(Duration::from_millis(250)));

        env::set_var(ENV_ASSISTANT_CONFIG_PATH, tmp.path().join("missing.toml"));
        assert!(AssistantConfig::load_default().is_err());
        env::remove_var(ENV_ASSISTANT_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
