use prometheus::{Encoder, TextEncoder};

use crate::error::{ChatError, Result};

pub async fn metrics_handler() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ChatError::Internal(format!("failed to encode metrics: {e}")))?;
    String::from_utf8(buffer).map_err(|e| ChatError::Internal(e.to_string()))
}
