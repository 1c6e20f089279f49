//! Best-effort reply extraction from upstream response bodies.
//!
//! The upstream does not guarantee one response shape, so extraction runs a
//! prioritized list of strategies and takes the first non-empty result.

use serde_json::Value;
use tracing::debug;

type Strategy = fn(&Value) -> Option<String>;

/// Strategies in the order they are tried.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("candidate_content_parts", candidate_content_parts),
    ("candidate_content_text", candidate_content_text),
    ("candidate_text", candidate_text),
    ("response_field", response_field),
    ("message_like_field", message_like_field),
];

const MESSAGE_LIKE_KEYS: [&str; 4] = ["output", "generated_text", "content", "message"];

/// Reply text for `body`, or an empty string when no strategy finds any.
pub fn extract_reply(body: &Value) -> String {
    STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let text = strategy(body)?;
            debug!(strategy = *name, "extracted reply");
            Some(text)
        })
        .unwrap_or_default()
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

// Strings as-is, other scalars rendered; null and containers yield nothing
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn first_candidate(body: &Value) -> Option<&Value> {
    body.get("candidates")?.as_array()?.first()
}

// Parts may be bare strings or objects carrying a `text` field
fn join_parts(parts: &[Value]) -> String {
    parts
        .iter()
        .filter_map(|part| match part {
            Value::Object(_) => part.get("text").and_then(scalar_text),
            other => scalar_text(other),
        })
        .collect()
}

pub fn candidate_content_parts(body: &Value) -> Option<String> {
    let parts = first_candidate(body)?.get("content")?.get("parts")?.as_array()?;
    non_empty(join_parts(parts))
}

pub fn candidate_content_text(body: &Value) -> Option<String> {
    let text = first_candidate(body)?.get("content")?.get("text")?;
    scalar_text(text).and_then(non_empty)
}

pub fn candidate_text(body: &Value) -> Option<String> {
    scalar_text(first_candidate(body)?.get("text")?).and_then(non_empty)
}

pub fn response_field(body: &Value) -> Option<String> {
    scalar_text(body.get("response")?).and_then(non_empty)
}

pub fn message_like_field(body: &Value) -> Option<String> {
    MESSAGE_LIKE_KEYS.iter().find_map(|key| match body.get(*key)? {
        Value::String(s) => non_empty(s.clone()),
        Value::Object(inner) => match inner.get("text") {
            Some(Value::String(s)) => non_empty(s.clone()),
            _ => match inner.get("parts") {
                Some(Value::String(s)) => non_empty(s.clone()),
                Some(Value::Array(parts)) => non_empty(join_parts(parts)),
                _ => None,
            },
        },
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn concatenates_candidate_parts() {
        let body = json!({"candidates":[{"content":{"parts":[{"text":"A"},{"text":"B"}]}}]});
        assert_eq!(extract_reply(&body), "AB");
    }

    #[test]
    fn parts_may_be_plain_strings() {
        let body = json!({"candidates":[{"content":{"parts":["A", {"text":"B"}, {"inlineData":{}}]}}]});
        assert_eq!(extract_reply(&body), "AB");
    }

    #[test]
    fn only_first_candidate_is_used() {
        let body = json!({"candidates":[
            {"content":{"parts":[{"text":"first"}]}},
            {"content":{"parts":[{"text":"second"}]}}
        ]});
        assert_eq!(extract_reply(&body), "first");
    }

    #[test]
    fn empty_parts_fall_through_to_content_text() {
        let body = json!({"candidates":[{"content":{"parts":[], "text":"direct"}}]});
        assert_eq!(candidate_content_parts(&body), None);
        assert_eq!(extract_reply(&body), "direct");
    }

    #[test]
    fn candidate_top_level_text() {
        let body = json!({"candidates":[{"text":"plain"}]});
        assert_eq!(extract_reply(&body), "plain");
    }

    #[test]
    fn response_field_without_candidates() {
        assert_eq!(extract_reply(&json!({"response":"hi"})), "hi");
    }

    #[test]
    fn empty_response_field_keeps_looking() {
        let body = json!({"response":"", "output":"later"});
        assert_eq!(extract_reply(&body), "later");
    }

    #[test]
    fn message_like_fields_in_priority_order() {
        let body = json!({"message":"m", "generated_text":"g"});
        assert_eq!(extract_reply(&body), "g");

        let body = json!({"content":{"text":"nested"}});
        assert_eq!(extract_reply(&body), "nested");

        let body = json!({"output":{"parts":[{"text":"x"}, "y"]}});
        assert_eq!(extract_reply(&body), "xy");
    }

    #[test]
    fn empty_or_unknown_shapes_yield_empty_string() {
        assert_eq!(extract_reply(&json!({})), "");
        assert_eq!(extract_reply(&json!([1, 2])), "");
        assert_eq!(extract_reply(&json!({"candidates": []})), "");
        assert_eq!(extract_reply(&json!({"candidates":[{"content":{"parts":[{"text":""}]}}]})), "");
    }
}
