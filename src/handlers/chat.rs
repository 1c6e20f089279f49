use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ChatError, Result};
use crate::handlers::ClientKey;
use crate::metrics::{CHAT_REQUESTS, RATE_LIMITED};
use crate::models::{ChatRequest, ChatResponse};
use crate::prompt::build_prompt;
use crate::state::AppState;

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    ClientKey(client): ClientKey,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    CHAT_REQUESTS.inc();

    // the attempt counts even if validation fails below
    if !state.rate_limiter.check_and_record(&client) {
        RATE_LIMITED.inc();
        warn!(%client, "rate limit exceeded");
        return Err(ChatError::RateLimited);
    }

    let message = payload.message.trim();
    if message.is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let prompt = build_prompt(payload.history.as_deref(), message);
    debug!(%client, prompt_len = prompt.len(), "forwarding chat message");

    let reply = state.gateway.generate(&prompt).await?;
    Ok(Json(ChatResponse { reply }))
}
