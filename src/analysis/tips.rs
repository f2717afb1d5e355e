use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use super::defaults::TIP_BATCH;
use super::prediction::Tip;
use crate::nutrition::coerce::is_truthy;

lazy_static! {
    static ref WIDEST_ARRAY_RE: Regex = Regex::new(r"(?s)\[.*\]").unwrap();
    static ref FIRST_ARRAY_RE: Regex = Regex::new(r"(?s)\[.*?\]").unwrap();
}

/// Extracts up to five tips from model output.
///
/// Returns `None` when no array can be recovered; substituting defaults is
/// the caller's decision. Short lists are returned as-is.
pub fn parse_tips_from_llm(output: &str) -> Option<Vec<Tip>> {
    if let Ok(wrapper) = serde_json::from_str::<Value>(output) {
        if let Some(tips) = tips_from_wrapper(&wrapper) {
            return Some(tips);
        }
    }

    let span = FIRST_ARRAY_RE.find(output)?;
    let unescaped = span.as_str().replace("\\\"", "\"");
    match serde_json::from_str::<Value>(&unescaped) {
        Ok(Value::Array(items)) => Some(normalize(&items)),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "failed to parse tips from model output");
            None
        }
    }
}

/// Probes the text fields common response envelopes put generated text in.
fn tips_from_wrapper(wrapper: &Value) -> Option<Vec<Tip>> {
    let candidates = [
        &wrapper["response"],
        &wrapper["text"],
        &wrapper["output"][0]["content"],
        &wrapper["result"]["content"],
        &wrapper["choices"][0]["message"]["content"],
        &wrapper["choices"][0]["text"],
    ];

    for candidate in candidates {
        let Some(text) = candidate.as_str().filter(|s| !s.is_empty()) else {
            continue;
        };

        let trimmed = text.trim();
        if trimmed.starts_with('[') {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
                return Some(normalize(&items));
            }
        }

        if let Some(span) = WIDEST_ARRAY_RE.find(text) {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(span.as_str()) {
                return Some(normalize(&items));
            }
        }
    }
    None
}

fn normalize(items: &[Value]) -> Vec<Tip> {
    items
        .iter()
        .take(TIP_BATCH)
        .map(|item| {
            let content = item
                .get("content")
                .filter(|c| is_truthy(c))
                .unwrap_or(item);
            Tip::new(as_text(content))
        })
        .collect()
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
