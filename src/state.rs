use std::sync::Arc;
use crate::rate_limit::RateLimitStore;
use crate::upstream::GeminiGateway;

// app's shared state, injected into every handler
pub struct AppState {
    pub gateway: GeminiGateway,
    pub rate_limiter: Arc<dyn RateLimitStore>,
}

impl AppState {
    pub fn new(gateway: GeminiGateway, rate_limiter: Arc<dyn RateLimitStore>) -> Self {
        Self {
            gateway,
            rate_limiter,
        }
    }
}
