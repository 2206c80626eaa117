//! REST and WebSocket API for the accounts agent
//!
//! Agent failures are reported inside the response body (`success = false`);
//! only malformed requests get a non-200 status.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::demo::{run_demo, EXAMPLE_QUERIES};
use crate::models::{AgentInfo, AgentResponse, Context, Query};
use crate::orchestrator::Orchestrator;
use crate::stats::StatsSnapshot;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub context: Option<Context>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatRequest {
    fn into_query(self) -> Query {
        Query::new(self.message)
            .with_context(self.context.unwrap_or_default())
            .with_user(self.user_id, self.session_id)
    }
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
    pub timestamp: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator>,
    pub app_name: String,
    pub version: String,
}

impl ApiState {
    pub fn new(orchestrator: Arc<Orchestrator>, settings: &Settings) -> Self {
        Self {
            orchestrator,
            app_name: settings.app_name.clone(),
            version: settings.app_version.clone(),
        }
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": state.app_name,
        "version": state.version,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoints
/// =============================

async fn chat(
    State(state): State<ApiState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<AgentResponse>, (StatusCode, Json<ApiError>)> {
    if req.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("message must not be empty")),
        ));
    }

    info!(
        chars = req.message.chars().count(),
        user_id = ?req.user_id,
        "Chat request received"
    );

    let response = state.orchestrator.process_query(req.into_query()).await;
    Ok(Json(response))
}

async fn chat_batch(
    State(state): State<ApiState>,
    Json(requests): Json<Vec<ChatRequest>>,
) -> Json<Value> {
    info!(count = requests.len(), "Batch chat request received");

    let mut responses = Vec::with_capacity(requests.len());
    for req in requests {
        let response = if req.message.trim().is_empty() {
            serde_json::to_value(ApiError::new("message must not be empty"))
        } else {
            serde_json::to_value(state.orchestrator.process_query(req.into_query()).await)
        };
        responses.push(response.unwrap_or(Value::Null));
    }

    Json(json!({ "responses": responses }))
}

/// =============================
/// Agent Info & Stats
/// =============================

async fn agents(State(state): State<ApiState>) -> Json<Vec<AgentInfo>> {
    Json(state.orchestrator.list_agents())
}

async fn stats(State(state): State<ApiState>) -> Json<StatsSnapshot> {
    Json(state.orchestrator.stats())
}

/// =============================
/// Examples
/// =============================

async fn examples() -> Json<BTreeMap<String, Vec<&'static str>>> {
    Json(
        EXAMPLE_QUERIES
            .iter()
            .map(|(kind, queries)| (kind.to_string(), queries.to_vec()))
            .collect(),
    )
}

async fn examples_demo(State(state): State<ApiState>) -> Json<Value> {
    let results = run_demo(&state.orchestrator).await;
    Json(json!({ "demo_results": results }))
}

/// =============================
/// WebSocket
/// =============================

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One JSON response frame per text frame; the connection ends on close or error
async fn handle_socket(mut socket: WebSocket, state: ApiState) {
    debug!("WebSocket connected");

    while let Some(frame) = socket.recv().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "WebSocket receive failed");
                break;
            }
        };

        let reply = match serde_json::from_str::<ChatRequest>(&text) {
            Ok(req) if req.message.trim().is_empty() => continue,
            Ok(req) => {
                let response = state.orchestrator.process_query(req.into_query()).await;
                serde_json::to_string(&response)
            }
            Err(e) => serde_json::to_string(&ApiError::new(format!("invalid message: {}", e))),
        };

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Failed to encode WebSocket reply");
                continue;
            }
        };
        if socket.send(Message::Text(reply)).await.is_err() {
            break;
        }
    }

    debug!("WebSocket disconnected");
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/chat/batch", post(chat_batch))
        .route("/agents", get(agents))
        .route("/stats", get(stats))
        .route("/examples", get(examples))
        .route("/examples/demo", post(examples_demo))
        .route("/ws", get(ws_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(orchestrator: Arc<Orchestrator>, settings: &Settings) -> crate::Result<()> {
    let router = create_router(ApiState::new(orchestrator, settings));
    let addr = settings.bind_addr();

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(address = %addr, "API server listening");
    info!("Local: http://127.0.0.1:{}", settings.port);

    axum::serve(listener, router).await?;

    Ok(())
}
