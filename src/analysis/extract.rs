//! Staged recovery of a JSON payload from free-form model output.
//!
//! Every stage returns a tagged [`ParseFailure`] instead of bailing, so the
//! parsers can route any failure into their degraded branch.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use super::defaults::default_tips;
use super::prediction::HealthPrediction;
use crate::nutrition::coerce::is_truthy;

#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("no JSON found in model response")]
    NoJson,
    #[error("malformed JSON after sanitization: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("JSON does not match the prediction shape: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Which bracketed spans the extractor may fall back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spans {
    ObjectsAndArrays,
    ObjectsOnly,
}

lazy_static! {
    static ref FENCE_RE: Regex = Regex::new(r"(?is)```(?:json\n)?(.*?)```").unwrap();
    static ref OBJECT_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
    static ref ARRAY_RE: Regex = Regex::new(r"(?s)\[.*\]").unwrap();
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",\s*([}\]])").unwrap();
}

const CURLY_QUOTES: [char; 4] = ['\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}'];

/// Locates the JSON payload: fenced block, then the widest `{...}` span, then
/// `[...]` (when allowed), then first `{` to last `}`.
pub fn extract_json(text: &str, spans: Spans) -> Result<&str, ParseFailure> {
    let fenced = FENCE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .filter(|body| !body.as_str().is_empty());
    if let Some(body) = fenced {
        let trimmed = body.as_str().trim();
        return if trimmed.is_empty() {
            Err(ParseFailure::NoJson)
        } else {
            Ok(trimmed)
        };
    }

    if let Some(span) = OBJECT_RE.find(text) {
        return Ok(span.as_str());
    }

    if spans == Spans::ObjectsAndArrays {
        if let Some(span) = ARRAY_RE.find(text) {
            return Ok(span.as_str());
        }
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(first), Some(last)) if last > first => Ok(&text[first..=last]),
        _ => Err(ParseFailure::NoJson),
    }
}

/// Straightens curly quotes and drops trailing commas before `}` / `]`.
pub fn sanitize(payload: &str) -> String {
    let straightened = payload.replace(CURLY_QUOTES, "\"");
    TRAILING_COMMA_RE
        .replace_all(&straightened, "$1")
        .into_owned()
}

/// Strict parse, then one retry on the sanitized payload.
pub fn parse_json(payload: &str) -> Result<Value, ParseFailure> {
    match serde_json::from_str(payload) {
        Ok(value) => Ok(value),
        Err(strict) => {
            debug!(error = %strict, "strict JSON parse failed; retrying sanitized payload");
            serde_json::from_str(&sanitize(payload)).map_err(ParseFailure::Malformed)
        }
    }
}

/// Inserts the default tip table when `healthTip` is missing or falsy.
pub fn complete_tips(value: &mut Value) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };
    if obj.get("healthTip").is_some_and(is_truthy) {
        return;
    }
    let risky = obj.get("prediction").and_then(Value::as_str) == Some("Risky");
    let tips = default_tips(risky)
        .iter()
        .map(|tip| json!({ "content": tip.content }))
        .collect();
    obj.insert("healthTip".to_owned(), Value::Array(tips));
}

pub fn validate(value: Value) -> Result<HealthPrediction, ParseFailure> {
    serde_json::from_value(value).map_err(ParseFailure::Shape)
}
