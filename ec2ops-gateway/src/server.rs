//! HTTP surface: the slash command endpoint, liveness and metrics.

use crate::features::command_dispatch::controller::CommandDispatcher;
use crate::features::deferred_delivery::repo::CallbackRepository;
use crate::features::deferred_delivery::service::DeferredDeliveryService;
use crate::features::instance_directory::service::InstanceDirectory;
use crate::features::observability::controller::ObservabilityController;
use crate::shared::error::ERROR_GLYPH;
use crate::shared::types::{InboundRequest, Reply};
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ec2ops_providers::ComputeProvider;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn};
use uuid::Uuid;

pub const COMMANDS_PATH: &str = "/slack/commands";

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<CommandDispatcher>,
    pub delivery: Arc<DeferredDeliveryService>,
    pub observability: Arc<ObservabilityController>,
}

impl AppState {
    /// Wires the dispatcher and delivery services around one provider handle.
    pub fn build(
        provider: Arc<dyn ComputeProvider>,
        region: &str,
        slash_command: &str,
        callbacks: Arc<dyn CallbackRepository>,
    ) -> Result<Self, String> {
        let observability = ObservabilityController::with_registry()?;
        let directory = Arc::new(InstanceDirectory::new(provider, region));
        Ok(Self {
            dispatcher: Arc::new(CommandDispatcher::new(
                directory,
                slash_command,
                observability.clone(),
            )),
            delivery: Arc::new(DeferredDeliveryService::new(
                callbacks,
                observability.clone(),
            )),
            observability,
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(COMMANDS_PATH, post(handle_command))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = Uuid::new_v4();
            info_span!(
                "request",
                %request_id,
                method = %request.method(),
                uri = %request.uri()
            )
        }))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "ec2ops gateway listening");
    axum::serve(listener, create_router(state)).await
}

async fn handle_command(State(state): State<AppState>, body: Bytes) -> Response {
    let started = Instant::now();

    let response = if body.is_empty() {
        warn!("Rejected request without body");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "text": format!("{ERROR_GLYPH} Invalid request format") })),
        )
            .into_response()
    } else {
        match state
            .dispatcher
            .dispatch(InboundRequest::from_form_body(&body))
            .await
        {
            Reply::Inline(message) => Json(message.to_payload()).into_response(),
            Reply::Deferred {
                callback_url,
                message,
            } => {
                let delivery = state.delivery.clone();
                tokio::spawn(async move {
                    delivery.deliver(&callback_url, &message).await;
                });
                StatusCode::OK.into_response()
            }
            Reply::Acknowledge => StatusCode::OK.into_response(),
        }
    };

    state.observability.record_api_request(
        COMMANDS_PATH,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

async fn health() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> Response {
    match state.observability.render_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e).into_response(),
    }
}
