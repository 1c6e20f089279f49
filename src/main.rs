use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gemini_chat_backend::app;
use gemini_chat_backend::config::Args;
use gemini_chat_backend::rate_limit::SlidingWindowLimiter;
use gemini_chat_backend::state::AppState;
use gemini_chat_backend::upstream::GeminiGateway;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // local .env for development, absent file is fine
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let gateway = GeminiGateway::new(args.gateway_config())?;
    if !gateway.has_api_key() {
        warn!("GEMINI_API_KEY (or GOOGLE_API_KEY) not set, /api/chat will error until provided");
    }

    let limiter = SlidingWindowLimiter::new(args.rate_limit_max_per_window, args.rate_window());
    let state = Arc::new(AppState::new(gateway, Arc::new(limiter)));

    if !args.frontend_dir.is_dir() {
        warn!(dir = %args.frontend_dir.display(), "frontend directory not found, static files will 404");
    }
    let router = app(Arc::clone(&state), &args.frontend_dir);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Chat backend running on http://{}", addr);
    info!("Forwarding to {}", state.gateway.endpoint());
    info!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit_max_per_window, args.rate_limit_window_seconds
    );
    info!("Serving frontend from {}", args.frontend_dir.display());

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
