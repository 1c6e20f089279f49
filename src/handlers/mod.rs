mod chat;
mod client_key;
mod health;
mod metrics;

pub use chat::chat_handler;
pub use client_key::ClientKey;
pub use health::health_handler;
pub use metrics::metrics_handler;
