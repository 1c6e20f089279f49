use serde::{Deserialize, Serialize};

// Inbound chat request
#[derive(Deserialize, Clone, Debug)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Option<Vec<HistoryItem>>,
}

// One prior turn supplied by the caller
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct HistoryItem {
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

fn default_role() -> String {
    "user".to_string()
}

#[derive(Serialize, Clone, Debug)]
pub struct ChatResponse {
    pub reply: String,
}

// Gemini generateContent request body
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
    pub generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
pub struct Content<'a> {
    pub parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
pub struct Part<'a> {
    pub text: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl<'a> GenerateContentRequest<'a> {
    /// Single-turn body carrying the whole prompt as one text part.
    pub fn single_prompt(prompt: &'a str, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config,
        }
    }
}
