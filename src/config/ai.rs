// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};
use tracing::{info, warn};

pub const DEFAULT_AI_CONFIG_PATH: &str = "config/ai.json";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

fn default_provider() -> String {
    "openai".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Only "openai" is wired up (case-insensitive).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Defaults to `gpt-4o` when absent.
    #[serde(default)]
    pub model: Option<String>,
    /// "ENV" means: read from OPENAI_API_KEY.
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: None,
            api_key: String::new(),
        }
    }
}

impl AiConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: AiConfig = serde_json::from_str(&data)?;

        cfg.provider = cfg.provider.trim().to_lowercase();

        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = match cfg.provider.as_str() {
                "openai" => env::var(ENV_OPENAI_API_KEY)
                    .map_err(|_| anyhow::anyhow!("Missing OPENAI_API_KEY env var"))?,
                other => anyhow::bail!("Unsupported provider in config: {other}"),
            };
        }

        Ok(cfg)
    }

    /// Never fails: a broken or missing file means "no model". Without a
    /// file, a non-empty OPENAI_API_KEY alone enables the default provider.
    pub fn load_or_disabled<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if path.exists() {
            return match Self::load_from_file(path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "AI config unusable; using rule-based fallback");
                    Self::default()
                }
            };
        }
        match env::var(ENV_OPENAI_API_KEY) {
            Ok(key) if !key.trim().is_empty() => {
                info!("AI config file absent; enabling openai from OPENAI_API_KEY");
                Self {
                    enabled: true,
                    api_key: key,
                    ..Self::default()
                }
            }
            _ => Self::default(),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[serial_test::serial]
    #[test]
    fn env_key_is_resolved() {
        env::set_var(ENV_OPENAI_API_KEY, "sk-test");
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"enabled":true,"provider":"OpenAI","api_key":"ENV"}}"#).unwrap();
        let cfg = AiConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg.provider, "openai");
        assert_eq!(cfg.api_key, "sk-test");
        assert!(cfg.is_usable());
        env::remove_var(ENV_OPENAI_API_KEY);
    }

    #[serial_test::serial]
    #[test]
    fn missing_key_disables_ai() {
        env::remove_var(ENV_OPENAI_API_KEY);
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"enabled":true,"api_key":"ENV"}}"#).unwrap();
        assert!(AiConfig::load_from_file(f.path()).is_err());
        assert!(!AiConfig::load_or_disabled(f.path()).is_usable());
    }

    #[serial_test::serial]
    #[test]
    fn absent_file_without_key_is_disabled() {
        env::remove_var(ENV_OPENAI_API_KEY);
        let cfg = AiConfig::load_or_disabled("does/not/exist.json");
        assert!(!cfg.enabled);
        assert!(!cfg.is_usable());
    }
}
