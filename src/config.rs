use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://generativelanguage.googleapis.com";

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "gemini-chat-backend")]
#[command(about = "Chat backend that proxies messages to the Gemini API")]
pub struct Args {
    // Gemini API key, chat answers 500 until it is set
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // Older variable name, used when GEMINI_API_KEY is absent
    #[arg(long, env = "GOOGLE_API_KEY", hide = true, hide_env_values = true)]
    pub google_api_key: Option<String>,

    #[arg(long, env = "MODEL", default_value = "gemini-2.5-flash")]
    pub model: String,

    #[arg(long, env = "MAX_OUTPUT_TOKENS", default_value_t = 1024)]
    pub max_output_tokens: u32,

    #[arg(long, env = "TEMPERATURE", default_value_t = 0.4)]
    pub temperature: f64,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECONDS", default_value_t = 60)]
    pub rate_limit_window_seconds: u64,

    // Rate limit max requests per window
    #[arg(long, env = "RATE_LIMIT_MAX_PER_WINDOW", default_value_t = 30)]
    pub rate_limit_max_per_window: usize,

    // Static frontend served at /
    #[arg(long, env = "FRONTEND_DIR", default_value = "../frontend")]
    pub frontend_dir: PathBuf,

    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    #[arg(long, env = "UPSTREAM_BASE_URL", default_value = DEFAULT_UPSTREAM_BASE_URL)]
    pub upstream_base_url: String,

    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub upstream_timeout_secs: u64,
}

impl Args {
    /// Resolved API key. Blank values count as missing.
    pub fn resolved_api_key(&self) -> Option<String> {
        [&self.api_key, &self.google_api_key]
            .into_iter()
            .flatten()
            .map(|k| k.trim())
            .find(|k| !k.is_empty())
            .map(str::to_string)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_seconds)
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.upstream_base_url.clone(),
            model: self.model.clone(),
            api_key: self.resolved_api_key(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            timeout: Duration::from_secs(self.upstream_timeout_secs),
        }
    }
}

// Everything the upstream gateway needs, fixed for the process lifetime
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            temperature: 0.4,
            max_output_tokens: 1024,
            timeout: Duration::from_secs(30),
        }
    }
}
