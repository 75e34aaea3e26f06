//! AI adapter: hosted text-generation behind a small trait so the service
//! layer can fall back to the rule-based pipeline whenever the model is
//! absent or fails.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ai::AiConfig;

pub const DEFAULT_MODEL: &str = "gpt-4o";
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// What the model is being asked to do; selects the system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AiTask {
    PolicySummary,
    EcoTips,
    Chat,
    AnomalyInsights,
}

impl AiTask {
    pub fn as_str(self) -> &'static str {
        match self {
            AiTask::PolicySummary => "policy_summary",
            AiTask::EcoTips => "eco_tips",
            AiTask::Chat => "chat",
            AiTask::AnomalyInsights => "anomaly_insights",
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            AiTask::PolicySummary => "You are an expert policy analyst. Summarize the given policy document focusing on key sustainability initiatives, environmental regulations, and citizen impact. Provide 3-5 key points.",
            AiTask::EcoTips => "You are a sustainability expert. Generate 4 practical, actionable eco-friendly tips for the given topic. Each tip should be concise and implementable.",
            AiTask::Chat => "You are a helpful Smart City Assistant focused on sustainability, urban planning, and environmental issues. Provide clear, accurate answers.",
            AiTask::AnomalyInsights => "You are a data analyst specialising in urban KPI analysis. Analyse anomalies and provide potential causes and recommendations.",
        }
    }
}

/// Trait object used by the service layer and tests.
pub trait AiClient: Send + Sync {
    /// Generate text for `prompt`. `None` means "no usable answer"; callers
    /// fall back to the rule-based pipeline.
    fn generate<'a>(
        &'a self,
        task: AiTask,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
    /// Provider name for diagnostics/headers.
    fn provider_name(&self) -> &'static str;
}

pub type DynAiClient = Arc<dyn AiClient>;

/// Factory: build a client according to config and environment variables.
///
/// * `AI_TEST_MODE=mock` returns a deterministic mock client.
/// * Disabled config or missing key returns a disabled client.
/// * Otherwise the OpenAI provider.
pub fn build_client_from_config(config: &AiConfig) -> DynAiClient {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(MockProvider::new("Mock model answer"));
    }

    if !config.is_usable() {
        return Arc::new(DisabledClient);
    }

    match config.provider.as_str() {
        "openai" => match OpenAiProvider::new(&config.api_key, config.model.as_deref()) {
            Ok(p) => Arc::new(p),
            Err(e) => {
                warn!(error = %e, "failed to build OpenAI client; AI disabled");
                Arc::new(DisabledClient)
            }
        },
        other => {
            warn!(provider = other, "unsupported AI provider; AI disabled");
            Arc::new(DisabledClient)
        }
    }
}

/// OpenAI Chat Completions client.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model_override: Option<&str>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("smart-city-assistant/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            model: model_override.unwrap_or(DEFAULT_MODEL).to_string(),
        })
    }

    async fn complete(&self, task: AiTask, prompt: &str) -> Option<String> {
        if self.api_key.is_empty() {
            return None;
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: task.system_prompt(),
                },
                Msg {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.3,
        };

        let resp = match self
            .http
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(task = task.as_str(), error = %e, "openai request failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            warn!(task = task.as_str(), status = %resp.status(), "openai returned non-success");
            return None;
        }
        let body: Resp = resp.json().await.ok()?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.trim())
            .unwrap_or("");
        debug!(task = task.as_str(), len = content.len(), "openai answered");
        if content.is_empty() {
            None
        } else {
            Some(content.to_string())
        }
    }
}

impl AiClient for OpenAiProvider {
    fn generate<'a>(
        &'a self,
        task: AiTask,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(self.complete(task, prompt))
    }
    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Returns `None` always; used when AI is disabled.
pub struct DisabledClient;

impl AiClient for DisabledClient {
    fn generate<'a>(
        &'a self,
        _task: AiTask,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed-answer client for tests and local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: String,
}

impl MockProvider {
    pub fn new(fixed: impl Into<String>) -> Self {
        Self {
            fixed: fixed.into(),
        }
    }
}

impl AiClient for MockProvider {
    fn generate<'a>(
        &'a self,
        _task: AiTask,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
