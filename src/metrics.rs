use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};

lazy_static! {
    pub static ref CHAT_REQUESTS: Counter =
        register_counter!("chat_requests_total", "Total number of chat requests").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("chat_rate_limited_total", "Chat requests rejected by the rate limiter").unwrap();
    pub static ref UPSTREAM_ERRORS: Counter =
        register_counter!("chat_upstream_errors_total", "Failed calls to the upstream API").unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "chat_upstream_latency_seconds",
        "Upstream call latency in seconds"
    )
    .unwrap();
}
