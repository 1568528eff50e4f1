//! Best-effort recovery of a decision from free-form reasoner text.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use crate::decision::{self, DEFAULT_TTL_SECS, Decision};

/// Greedy: first `{` through the last `}` in the text.
static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("json block pattern is valid"));

/// Extract, parse and sanitize the reasoner's answer.
pub fn parse(text: &str) -> Decision {
    let Some(block) = JSON_BLOCK.find(text) else {
        tracing::debug!("reasoner reply contains no json object");
        return Decision::none();
    };

    match serde_json::from_str::<Value>(block.as_str()) {
        Ok(raw) => decision::sanitize(&raw),
        Err(err) => {
            tracing::debug!(error = %err, "reasoner json block did not parse, trying keyword fallback");
            keyword_fallback(text)
                .map(|raw| decision::sanitize(&raw))
                .unwrap_or_else(Decision::none)
        }
    }
}

/// Heuristic, not a contract: look for `should_show` plus a boolean word anywhere
/// in the text. Never yields a message, so a positive result is still dropped
/// before display.
fn keyword_fallback(text: &str) -> Option<Value> {
    let lower = text.to_lowercase();
    if !lower.contains("should_show") {
        return None;
    }
    let says_true = lower.contains("true");
    if !says_true && !lower.contains("false") {
        return None;
    }
    Some(json!({
        "should_show": says_true,
        "message": null,
        "ttl_seconds": if says_true { DEFAULT_TTL_SECS } else { 0 },
    }))
}
