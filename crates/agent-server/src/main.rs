//! FinPal HTTP Server
//!
//! Axum-based server exposing the financial-assistant agent over a REST
//! API, plus the standalone user-registration endpoint.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{session::MemorySessionStore, AgentConfig, ReasoningProvider, ToolRegistry};
use agent_runtime::MistralProvider;
use finpal_advisor::{
    tools::{CurrencyConverterTool, SipCalculatorTool},
    FINPAL_SYSTEM_PROMPT,
};
use user_service::MemoryUserStore;

use crate::handlers::{chat_handler, create_user, health_check, list_models};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Initialize the reasoning provider (requires MISTRAL_API_KEY)
    let provider = Arc::new(MistralProvider::from_env()?);

    // Verify provider connection
    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to Mistral API"),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Mistral API not reachable - agent turns will fail");
            tracing::warn!("  Check MISTRAL_API_KEY and network connectivity");
        }
    }

    // Initialize tools
    let mut tools = ToolRegistry::new();
    tools.register(SipCalculatorTool)?;
    tools.register(CurrencyConverterTool)?;

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    // Build application state
    let state = AppState {
        provider,
        tools: Arc::new(tools),
        sessions: Arc::new(MemorySessionStore::new()),
        users: Arc::new(MemoryUserStore::new()),
        agent_config: AgentConfig {
            system_prompt: FINPAL_SYSTEM_PROMPT.into(),
            ..AgentConfig::default()
        },
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/models", get(list_models))
        // Agent API
        .route("/api/chat", post(chat_handler))
        // User registration
        .route("/users", post(create_user))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 FinPal server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health      - Health check");
    tracing::info!("  GET  /api/models  - List available models");
    tracing::info!("  POST /api/chat    - Send message");
    tracing::info!("  POST /users       - Register a user");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
