use std::net::SocketAddr;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::Method,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use moodify_shared::protocol::{
    AnalyzeMoodRequest, AnalyzeMoodResponse, DailyQuestionRequest, DailyQuestionResponse,
    FeedbackRequest, FeedbackResponse,
};
use moodify_shared::resources::{random_fun_fact, CrisisContact, Resource, CRISIS_CONTACTS, RESOURCES};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::gemini::GeminiClient;
use crate::mailer::Mailer;
use crate::prompts::{analysis_prompt, daily_question_prompt};
use crate::rate_limit::{rate_limit_middleware, RateLimiter};

/// Mood histories are small; anything past this is not a real client.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub gemini: GeminiClient,
    pub mailer: Mailer,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        let http = reqwest::Client::new();
        Self {
            gemini: GeminiClient::new(http.clone(), config),
            mailer: Mailer::new(http, config),
            rate_limiter: RateLimiter::from_config(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/analyze-mood", post(analyze_mood))
        .route("/api/daily-checkin", post(daily_checkin))
        .route("/api/feedback", post(feedback))
        .route("/api/resources", get(resources))
        .route("/api/resources/crisis", get(crisis_contacts))
        .route("/api/fun-fact", get(fun_fact))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct FunFactResponse {
    fact: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Always 200. Any failure, including an unreadable body, yields the
/// fallback analysis.
async fn analyze_mood(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeMoodRequest>, JsonRejection>,
) -> Json<AnalyzeMoodResponse> {
    let req = match body {
        Ok(Json(req)) => req,
        Err(e) => {
            warn!(error = %e, "Unreadable analysis request");
            return Json(AnalyzeMoodResponse::fallback());
        }
    };

    match state.gemini.generate(&analysis_prompt(&req)).await {
        Ok(analysis) => Json(AnalyzeMoodResponse {
            analysis,
            fallback: false,
        }),
        Err(e) => {
            warn!(error = %e, moods = req.mood_history.len(), "Mood analysis failed, serving fallback");
            Json(AnalyzeMoodResponse::fallback())
        }
    }
}

async fn daily_checkin(
    State(state): State<AppState>,
    body: Result<Json<DailyQuestionRequest>, JsonRejection>,
) -> Json<DailyQuestionResponse> {
    let req = body.map(|Json(r)| r).unwrap_or_default();

    match state.gemini.generate(&daily_question_prompt(&req)).await {
        Ok(question) => Json(DailyQuestionResponse {
            question,
            fallback: false,
        }),
        Err(e) => {
            warn!(error = %e, "Daily question generation failed, serving fallback");
            Json(DailyQuestionResponse::fallback())
        }
    }
}

async fn feedback(
    State(state): State<AppState>,
    body: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<FeedbackResponse>, ServerError> {
    let Json(req) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    req.validate()?;

    let id = state.mailer.send_feedback(&req).await.map_err(|e| {
        tracing::error!(error = %e, kind = %req.kind, "Feedback relay failed");
        e
    })?;

    Ok(Json(FeedbackResponse {
        message: "Feedback sent successfully!".to_string(),
        id,
    }))
}

async fn resources() -> Json<&'static [Resource]> {
    let all: &'static [Resource] = &RESOURCES;
    Json(all)
}

async fn crisis_contacts() -> Json<&'static [CrisisContact]> {
    let contacts: &'static [CrisisContact] = &CRISIS_CONTACTS;
    Json(contacts)
}

async fn fun_fact() -> Json<FunFactResponse> {
    Json(FunFactResponse {
        fact: random_fun_fact(),
    })
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use moodify_shared::constants::{FALLBACK_ANALYSIS, FALLBACK_QUESTIONS};

    fn app() -> Router {
        build_router(AppState::from_config(&ServerConfig::default()))
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = call(app(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_analysis_falls_back_without_key() {
        let req = post_json(
            "/api/analyze-mood",
            json!({
                "moodHistory": [{"id": "1", "mood": "happy", "intensity": 7, "createdAt": "2025-01-01T10:00:00Z"}],
                "assessmentHistory": []
            }),
        );
        let (status, body) = call(app(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis"], FALLBACK_ANALYSIS);
        assert_eq!(body["fallback"], true);
    }

    #[tokio::test]
    async fn test_analysis_falls_back_on_garbage_body() {
        let req = Request::post("/api/analyze-mood")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = call(app(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fallback"], true);
    }

    #[tokio::test]
    async fn test_daily_question_falls_back_without_key() {
        let req = post_json("/api/daily-checkin", json!({"userContext": "Regular user"}));
        let (status, body) = call(app(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fallback"], true);
        let question = body["question"].as_str().unwrap();
        assert!(FALLBACK_QUESTIONS.contains(&question));
    }

    #[tokio::test]
    async fn test_blank_feedback_rejected() {
        let req = post_json("/api/feedback", json!({"type": "bug", "message": "  \n "}));
        let (status, body) = call(app(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Feedback message is required"}));
    }

    #[tokio::test]
    async fn test_feedback_relay_failure_is_500() {
        let req = post_json("/api/feedback", json!({"type": "general", "message": "love it"}));
        let (status, body) = call(app(), req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Failed to send feedback. Please try again later."})
        );
    }

    #[tokio::test]
    async fn test_resources() {
        let req = Request::get("/api/resources").body(Body::empty()).unwrap();
        let (status, body) = call(app(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), RESOURCES.len());

        let req = Request::get("/api/resources/crisis").body(Body::empty()).unwrap();
        let (_, body) = call(app(), req).await;
        assert_eq!(body[0]["number"], "988");
    }

    #[tokio::test]
    async fn test_rate_limited_requests_get_429() {
        let config = ServerConfig {
            rate_limit_burst: 1.0,
            rate_limit_per_sec: 0.001,
            ..ServerConfig::default()
        };
        let app = build_router(AppState::from_config(&config));
        let get = || {
            Request::get("/health")
                .header("x-forwarded-for", "203.0.113.9")
                .body(Body::empty())
                .unwrap()
        };

        let (status, _) = call(app.clone(), get()).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(app, get()).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Too many requests");
    }
}
