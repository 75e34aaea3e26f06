use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::analyze::ai_adapter::{build_client_from_config, DynAiClient};
use crate::analyze::anomaly::{ClassifiedPoint, SeriesPoint};
use crate::analyze::error::AnalysisError;
use crate::analyze::report::{report_file_name, ReportFields};
use crate::analyze::responder::{self, ResponseMatch};
use crate::assistant::{Assistant, ForecastReport, ResponseSource};
use crate::config::ai::{AiConfig, DEFAULT_AI_CONFIG_PATH};
use crate::config::assistant::MAX_HORIZON;
use crate::config::AssistantConfig;
use crate::conversation::{ConversationStore, DEFAULT_SESSION};
use crate::metrics::record_request;
use crate::samples::{self, SampleKpi};

pub const AI_USED_HEADER: &str = "X-AI-Used";

#[derive(Clone)]
pub struct AppState {
    assistant: Arc<Assistant>,
    conversations: Arc<ConversationStore>,
}

impl AppState {
    pub fn new(cfg: AssistantConfig, ai: DynAiClient) -> Self {
        let conversations = Arc::new(ConversationStore::new(cfg.chat_context_len));
        Self {
            assistant: Arc::new(Assistant::new(cfg, ai)),
            conversations,
        }
    }

    /// Pipeline-only state; used by tests and when no model is configured.
    pub fn rule_based(cfg: AssistantConfig) -> Self {
        let conversations = Arc::new(ConversationStore::new(cfg.chat_context_len));
        Self {
            assistant: Arc::new(Assistant::rule_based(cfg)),
            conversations,
        }
    }

    /// Load both configs from their default locations.
    pub fn from_env() -> anyhow::Result<Self> {
        let cfg = AssistantConfig::load_default()?;
        let ai_cfg = AiConfig::load_or_disabled(DEFAULT_AI_CONFIG_PATH);
        let ai = build_client_from_config(&ai_cfg);
        info!(
            provider = ai.provider_name(),
            threshold = cfg.anomaly_threshold,
            horizon = cfg.forecast_horizon,
            "assistant state ready"
        );
        Ok(Self::new(cfg, ai))
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/dashboard", get(dashboard))
        .route("/anomalies", post(anomalies))
        .route("/forecast", post(forecast))
        .route("/summarize", post(summarize))
        .route("/tips", post(tips))
        .route("/chat", post(chat))
        .route("/report", post(report))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Alias kept for callers that build the router directly.
pub fn router(state: AppState) -> Router {
    create_router(state)
}

// ---- errors ----

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
        }
    }

    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.into(),
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        Self::unprocessable(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn ai_header(source: ResponseSource) -> HeaderMap {
    let mut h = HeaderMap::new();
    let v = if source == ResponseSource::Ai { "1" } else { "0" };
    h.insert(AI_USED_HEADER, HeaderValue::from_static(v));
    h
}

fn require_text<'a>(value: &'a str, field: &str) -> ApiResult<&'a str> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(&format!("'{field}' must not be empty")));
    }
    Ok(value)
}

// ---- dashboard ----

#[derive(Serialize)]
struct DashboardResp {
    kpis: Vec<samples::KpiCard>,
    monthly: Vec<samples::MonthlyKpis>,
}

async fn dashboard() -> Json<DashboardResp> {
    record_request("dashboard");
    Json(DashboardResp {
        kpis: samples::CURRENT_KPIS.to_vec(),
        monthly: samples::monthly_overview(),
    })
}

// ---- anomalies ----

#[derive(Deserialize, Default)]
struct AnomalyReq {
    #[serde(default)]
    series: Option<Vec<SeriesPoint>>,
    #[serde(default)]
    threshold: Option<f64>,
}

#[derive(Serialize)]
struct AnomalyResp {
    threshold: f64,
    points: Vec<ClassifiedPoint>,
    anomalies: Vec<ClassifiedPoint>,
    insights: String,
    source: ResponseSource,
}

async fn anomalies(
    State(state): State<AppState>,
    Json(body): Json<AnomalyReq>,
) -> (HeaderMap, Json<AnomalyResp>) {
    record_request("anomalies");
    let series = body.series.unwrap_or_else(samples::anomaly_sample);
    let c = state.assistant.detect_anomalies(&series, body.threshold);
    info!(
        points = c.points.len(),
        anomalies = c.anomaly_count(),
        threshold = c.threshold,
        "anomaly scan"
    );
    let insights = state.assistant.anomaly_insights(&c).await;
    (
        ai_header(insights.source),
        Json(AnomalyResp {
            threshold: c.threshold,
            points: c.points,
            anomalies: c.anomalies,
            insights: insights.value,
            source: insights.source,
        }),
    )
}

// ---- forecast ----

#[derive(Deserialize, Default)]
struct ForecastReq {
    #[serde(default)]
    kpi: Option<String>,
    #[serde(default)]
    series: Option<Vec<SeriesPoint>>,
    #[serde(default)]
    horizon: Option<usize>,
    #[serde(default)]
    seed: Option<u64>,
}

async fn forecast(
    State(state): State<AppState>,
    Json(body): Json<ForecastReq>,
) -> ApiResult<Json<ForecastReport>> {
    record_request("forecast");
    if let Some(h) = body.horizon {
        if !(1..=MAX_HORIZON).contains(&h) {
            return Err(ApiError::bad_request(&format!(
                "horizon must be between 1 and {MAX_HORIZON}"
            )));
        }
    }
    let series = match (body.series, body.kpi.as_deref()) {
        (Some(s), _) => s,
        (None, Some(k)) => match SampleKpi::parse(k) {
            Some(kpi) => samples::kpi_history(kpi),
            None => return Err(ApiError::bad_request("unknown kpi; expected water, energy or air")),
        },
        (None, None) => return Err(ApiError::bad_request("provide 'kpi' or 'series'")),
    };
    let mut rng = match body.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let report = state
        .assistant
        .forecast(&series, body.horizon, &mut rng)
        .inspect_err(|e| warn!(error = %e, "forecast rejected"))?;
    info!(
        history = series.len(),
        trend = report.forecast.trend,
        direction = ?report.direction,
        "forecast generated"
    );
    Ok(Json(report))
}

// ---- summarize ----

#[derive(Deserialize)]
struct SummarizeReq {
    text: String,
}

#[derive(Serialize)]
struct SummarizeResp {
    summary: String,
    source: ResponseSource,
}

async fn summarize(
    State(state): State<AppState>,
    Json(body): Json<SummarizeReq>,
) -> ApiResult<(HeaderMap, Json<SummarizeResp>)> {
    record_request("summarize");
    let text = require_text(&body.text, "text")?;
    let out = state.assistant.summarize_policy(text).await;
    info!(chars = text.chars().count(), source = ?out.source, "policy summarized");
    Ok((
        ai_header(out.source),
        Json(SummarizeResp {
            summary: out.value,
            source: out.source,
        }),
    ))
}

// ---- tips ----

#[derive(Deserialize)]
struct TipsReq {
    topic: String,
}

#[derive(Serialize)]
struct TipsResp {
    tips: Vec<String>,
    topic: Option<&'static str>,
    source: ResponseSource,
}

async fn tips(
    State(state): State<AppState>,
    Json(body): Json<TipsReq>,
) -> ApiResult<(HeaderMap, Json<TipsResp>)> {
    record_request("tips");
    let topic = require_text(&body.topic, "topic")?;
    let out = state.assistant.eco_tips(topic).await;
    let matched = match out.source {
        ResponseSource::Fallback => crate::analyze::tips::matched_topic(topic),
        ResponseSource::Ai => None,
    };
    Ok((
        ai_header(out.source),
        Json(TipsResp {
            tips: out.value,
            topic: matched,
            source: out.source,
        }),
    ))
}

// ---- chat ----

#[derive(Deserialize)]
struct ChatReq {
    message: String,
    #[serde(default)]
    session: Option<String>,
}

#[derive(Serialize)]
struct ChatResp {
    reply: String,
    source: ResponseSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    matched: Option<ResponseMatch>,
    context_len: usize,
}

async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatReq>,
) -> ApiResult<(HeaderMap, Json<ChatResp>)> {
    record_request("chat");
    let message = require_text(&body.message, "message")?;
    let session = body
        .session
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SESSION);

    let context = state.conversations.record(session, message);
    let out = state.assistant.chat(message, &context).await;
    let after = state.conversations.record(session, &out.value);

    let matched = match out.source {
        ResponseSource::Fallback => Some(responder::classify_message(message)),
        ResponseSource::Ai => None,
    };
    Ok((
        ai_header(out.source),
        Json(ChatResp {
            reply: out.value,
            source: out.source,
            matched,
            context_len: after.len(),
        }),
    ))
}

// ---- report ----

async fn report(
    State(state): State<AppState>,
    Json(fields): Json<ReportFields>,
) -> ApiResult<Response> {
    record_request("report");
    require_text(&fields.city_name, "cityName")?;
    require_text(&fields.report_type, "reportType")?;

    let md = state.assistant.compose_report(&fields, Utc::now());
    let disposition = format!(
        "attachment; filename=\"{}\"",
        report_file_name(&fields.city_name)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    info!(report_type = %fields.report_type, bytes = md.len(), "report composed");

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/markdown; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        md,
    )
        .into_response())
}
