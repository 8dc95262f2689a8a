//! HTTP Handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use agent_core::{
    provider::ModelInfo,
    reasoning::Agent,
    session::{Session, SessionId, SessionStore},
};
use user_service::{NewUser, UserError, UserStore};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider_connected: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub conversation_id: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub age: u32,
    pub designation: String,
    pub salary: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider_connected,
    })
}

/// List models available at the provider
pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<Vec<ModelInfo>>, (StatusCode, Json<ErrorResponse>)> {
    let models = state.provider.list_models().await.map_err(|e| {
        tracing::error!("Model listing error: {}", e);
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: e.user_message(),
                code: "PROVIDER_UNAVAILABLE".into(),
            }),
        )
    })?;

    Ok(Json(models))
}

/// Main chat endpoint.
///
/// A `conversation_id` keys a persistent session whose transcript grows
/// across turns; without one, a fresh session is created and its id
/// returned so the client can continue the conversation.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut config = state.agent_config.clone();
    if let Some(model) = payload.model.clone() {
        config.generation.model = model;
    }
    let model = config.generation.model.clone();

    let mut session = match payload.conversation_id {
        Some(ref id) => {
            let id = SessionId::from_string(id.clone());
            state
                .sessions
                .load(&id)
                .map_err(internal_error)?
                .unwrap_or_else(|| Session::with_id(id))
        }
        None => Session::new(),
    };

    let agent = Agent::new(state.provider.clone(), state.tools.clone(), config);

    // The turn never fails: tool and provider errors come back as the
    // answer string.
    let response = agent.chat(&mut session.transcript, &payload.message).await;

    session.touch();
    state.sessions.save(&session).map_err(internal_error)?;

    Ok(Json(ChatResponse {
        message: response,
        conversation_id: session.id.to_string(),
        model,
    }))
}

/// User registration endpoint
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user = state
        .users
        .create(NewUser {
            email: payload.email,
            name: payload.name,
            age: payload.age,
            designation: payload.designation,
            salary: payload.salary,
        })
        .map_err(|e| {
            tracing::warn!("User registration rejected: {}", e);
            let code = match e {
                UserError::EmailTaken(_) => "EMAIL_TAKEN",
                UserError::InvalidEmail(_) => "INVALID_EMAIL",
                _ => "REGISTRATION_ERROR",
            };
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                    code: code.into(),
                }),
            )
        })?;

    Ok(Json(CreateUserResponse {
        id: user.id.to_string(),
        email: user.email,
        name: user.name,
    }))
}

fn internal_error(e: agent_core::AgentError) -> (StatusCode, Json<ErrorResponse>) {
    tracing::error!("Session store error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".into(),
            code: "INTERNAL_ERROR".into(),
        }),
    )
}
