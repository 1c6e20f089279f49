mod extract;
mod gateway;

pub use extract::extract_reply;
pub use gateway::GeminiGateway;
