//! Structured-output parsing with progressively forgiving fallbacks.
//!
//! Models are told to answer with a bare JSON object, but the contract is
//! enforced here, not trusted: raw parse, then fence/prose stripping, then
//! mechanical JSON repair, then per-field regex extraction as a last resort.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LlmError, Result};

/// The schema the model must produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub technologies: Vec<String>,
    pub structure: String,
}

const REQUIRED_KEYS: &[&str] = &["summary", "technologies", "structure"];

static FENCED_JSON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid fenced-JSON regex")
});
static TRAILING_COMMA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("valid trailing-comma regex"));
static LINE_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"//[^\n]*").expect("valid line-comment regex"));
static PYTHON_TRUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bTrue\b").expect("valid literal regex"));
static PYTHON_FALSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bFalse\b").expect("valid literal regex"));
static PYTHON_NONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bNone\b").expect("valid literal regex"));
static SUMMARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)["']?summary["']?\s*:\s*["']([^"'{\[]+)["']"#).expect("valid summary regex")
});
static TECHNOLOGIES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)["']?technologies["']?\s*:\s*\[([^\]]+)\]"#)
        .expect("valid technologies regex")
});
static STRUCTURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)["']?structure["']?\s*:\s*["']([^"'{\[]+)["']"#)
        .expect("valid structure regex")
});
static QUOTED_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["']([^"']+)["']"#).expect("valid quoted-item regex"));

/// Parse and strictly validate the model's raw output.
///
/// Four-pass fallback: raw JSON, extracted JSON block, repaired JSON, then
/// regex field extraction. Each successfully parsed candidate still has to
/// survive validation.
pub fn parse_response(raw: &str) -> Result<SummaryResult> {
    let mut last_validation_error: Option<LlmError> = None;
    let candidates = [
        raw.to_string(),
        extract_json_block(raw).to_string(),
        repair_json(raw),
    ];

    for candidate in &candidates {
        let Ok(obj) = serde_json::from_str::<Value>(candidate) else {
            continue;
        };
        match validate_result(&obj) {
            Ok(result) => return Ok(result),
            Err(err) => last_validation_error = Some(err),
        }
    }

    if let Some(fields) = regex_extract_fields(raw) {
        log::warn!("LLM response required regex extraction fallback");
        match validate_result(&fields) {
            Ok(result) => return Ok(result),
            Err(err) => last_validation_error = Some(err),
        }
    }

    let prefix: String = raw.chars().take(500).collect();
    match last_validation_error {
        Some(err) => Err(LlmError::Parse(format!(
            "{err}. Raw response (first 500 chars): {prefix}"
        ))),
        None => Err(LlmError::Parse(format!(
            "no parsing strategy succeeded. Raw response (first 500 chars): {prefix}"
        ))),
    }
}

/// Strip markdown code fences and leading/trailing prose to isolate the
/// outermost JSON object.
fn extract_json_block(text: &str) -> &str {
    if let Some(captures) = FENCED_JSON_RE.captures(text) {
        return captures.get(1).map(|m| m.as_str()).unwrap_or(text);
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

/// Best-effort repair of the most common model JSON mistakes: trailing
/// commas, single-quoted strings, Python literals, and `//` comments.
fn repair_json(text: &str) -> String {
    let block = extract_json_block(text);

    let mut repaired = TRAILING_COMMA_RE.replace_all(block, "$1").into_owned();
    repaired = replace_unescaped_single_quotes(&repaired);
    repaired = PYTHON_TRUE_RE.replace_all(&repaired, "true").into_owned();
    repaired = PYTHON_FALSE_RE.replace_all(&repaired, "false").into_owned();
    repaired = PYTHON_NONE_RE.replace_all(&repaired, "null").into_owned();
    LINE_COMMENT_RE.replace_all(&repaired, "").into_owned()
}

// Single quotes acting as string delimiters become double quotes; escaped
// apostrophes survive.
fn replace_unescaped_single_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        if ch == '\'' && prev != Some('\\') {
            out.push('"');
        } else {
            out.push(ch);
        }
        prev = Some(ch);
    }
    out
}

/// Last resort: pull each required field individually when the response
/// cannot be made to parse as JSON at all.
fn regex_extract_fields(text: &str) -> Option<Value> {
    let mut result = serde_json::Map::new();

    if let Some(captures) = SUMMARY_RE.captures(text) {
        result.insert(
            "summary".to_string(),
            Value::String(captures[1].trim().to_string()),
        );
    }

    if let Some(captures) = TECHNOLOGIES_RE.captures(text) {
        let body = &captures[1];
        let mut items: Vec<Value> = QUOTED_ITEM_RE
            .captures_iter(body)
            .map(|c| Value::String(c[1].to_string()))
            .collect();
        if items.is_empty() {
            items = body
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| Value::String(t.to_string()))
                .collect();
        }
        result.insert("technologies".to_string(), Value::Array(items));
    }

    if let Some(captures) = STRUCTURE_RE.captures(text) {
        result.insert(
            "structure".to_string(),
            Value::String(captures[1].trim().to_string()),
        );
    }

    if REQUIRED_KEYS.iter().all(|key| result.contains_key(*key)) {
        Some(Value::Object(result))
    } else {
        None
    }
}

/// Strictly type-check and coerce a parsed object into a [`SummaryResult`].
fn validate_result(obj: &Value) -> Result<SummaryResult> {
    let map = obj
        .as_object()
        .ok_or_else(|| LlmError::Parse("response is not a JSON object".to_string()))?;

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !map.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(LlmError::Parse(format!(
            "response missing required key(s): {missing:?}"
        )));
    }

    let summary = require_text(map, "summary")?;
    let structure = require_text(map, "structure")?;
    let technologies = coerce_technologies(&map["technologies"])?;

    Ok(SummaryResult {
        summary,
        technologies,
        structure,
    })
}

fn require_text(map: &serde_json::Map<String, Value>, key: &str) -> Result<String> {
    match map[key].as_str().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(LlmError::Parse(format!(
            "\"{key}\" must be a non-empty string, got {}",
            map[key]
        ))),
    }
}

fn coerce_technologies(value: &Value) -> Result<Vec<String>> {
    let items: Vec<String> = match value {
        // Comma-separated string instead of an array.
        Value::String(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect(),
        Value::Array(values) => values
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => {
                    let text = text.trim();
                    (!text.is_empty()).then(|| text.to_string())
                }
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        other => {
            return Err(LlmError::Parse(format!(
                "\"technologies\" must be an array, got {other}"
            )))
        }
    };

    // Deduplicate while preserving order.
    let mut seen = HashSet::new();
    Ok(items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn expected() -> SummaryResult {
        SummaryResult {
            summary: "A tool.".to_string(),
            technologies: vec!["Python".to_string(), "FastAPI".to_string()],
            structure: "Flat layout.".to_string(),
        }
    }

    #[test]
    fn parses_clean_json() {
        let raw = r#"{"summary": "A tool.", "technologies": ["Python", "FastAPI"], "structure": "Flat layout."}"#;
        assert_eq!(parse_response(raw).unwrap(), expected());
    }

    #[test]
    fn strips_code_fences() {
        let raw = "Here you go:\n```json\n{\"summary\": \"A tool.\", \"technologies\": [\"Python\", \"FastAPI\"], \"structure\": \"Flat layout.\"}\n```\nDone.";
        assert_eq!(parse_response(raw).unwrap(), expected());
    }

    #[test]
    fn strips_surrounding_prose() {
        let raw = "Sure! {\"summary\": \"A tool.\", \"technologies\": [\"Python\", \"FastAPI\"], \"structure\": \"Flat layout.\"} Hope that helps.";
        assert_eq!(parse_response(raw).unwrap(), expected());
    }

    #[test]
    fn repairs_trailing_commas_and_python_literals() {
        let raw = r#"{"summary": "A tool.", "technologies": ["Python", "FastAPI",], "structure": "Flat layout.",}"#;
        assert_eq!(parse_response(raw).unwrap(), expected());

        let raw = r#"{'summary': 'A tool.', 'technologies': ['Python', 'FastAPI'], 'structure': 'Flat layout.'}"#;
        assert_eq!(parse_response(raw).unwrap(), expected());
    }

    #[test]
    fn regex_fallback_recovers_fields() {
        let raw = "summary: \"A tool.\"\ntechnologies: [\"Python\", \"FastAPI\"]\nstructure: \"Flat layout.\"";
        assert_eq!(parse_response(raw).unwrap(), expected());
    }

    #[test]
    fn technologies_comma_string_is_coerced() {
        let raw = r#"{"summary": "A tool.", "technologies": "Python, FastAPI", "structure": "Flat layout."}"#;
        assert_eq!(parse_response(raw).unwrap(), expected());
    }

    #[test]
    fn technologies_deduplicated_in_order() {
        let raw = r#"{"summary": "A tool.", "technologies": ["Python", "FastAPI", "Python"], "structure": "Flat layout."}"#;
        assert_eq!(parse_response(raw).unwrap(), expected());
    }

    #[test]
    fn rejects_empty_summary() {
        let raw = r#"{"summary": "  ", "technologies": [], "structure": "Flat layout."}"#;
        assert!(matches!(parse_response(raw), Err(LlmError::Parse(_))));
    }

    #[test]
    fn unparseable_response_reports_prefix() {
        let err = parse_response("total nonsense").unwrap_err();
        let LlmError::Parse(message) = err else {
            panic!("expected parse error");
        };
        assert!(message.contains("total nonsense"));
    }
}
