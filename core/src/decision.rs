//! The popup decision and the rules that keep it bounded.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

pub const MAX_MESSAGE_CHARS: usize = 120;
pub const ELLIPSIS: &str = "...";
pub const MIN_TTL_SECS: u32 = 30;
pub const MAX_TTL_SECS: u32 = 180;
/// Used when the reasoner wants a popup but gives no usable ttl.
pub const DEFAULT_TTL_SECS: u32 = 90;

const QUOTE_PAIRS: [(char, char); 5] = [
    ('"', '"'),
    ('\'', '\''),
    ('`', '`'),
    ('\u{201C}', '\u{201D}'),
    ('\u{2018}', '\u{2019}'),
];

/// Whether to show a popup, what it says, and how long it stays up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Decision {
    pub should_show: bool,
    /// At most 120 characters; null when no popup is shown
    pub message: Option<String>,
    /// Display duration in seconds; 0 when no popup is shown
    pub ttl_seconds: u32,
}

impl Decision {
    /// The safe default every failure degrades to.
    pub fn none() -> Self {
        Self {
            should_show: false,
            message: None,
            ttl_seconds: 0,
        }
    }

    pub fn show(message: impl Into<String>, ttl_seconds: u32) -> Self {
        Self {
            should_show: true,
            message: Some(message.into()),
            ttl_seconds,
        }
    }

    /// A popup without text is not displayable; collapse it to no popup.
    pub fn into_displayable(self) -> Self {
        let has_text = self.message.as_deref().is_some_and(|m| !m.is_empty());
        if self.should_show && has_text {
            self
        } else {
            Self::none()
        }
    }

    /// Raw object form, accepted back by [`sanitize`].
    pub fn to_raw(&self) -> Value {
        serde_json::json!({
            "should_show": self.should_show,
            "message": self.message,
            "ttl_seconds": self.ttl_seconds,
        })
    }
}

impl Default for Decision {
    fn default() -> Self {
        Self::none()
    }
}

/// Turn an untrusted reasoner object into a bounded decision.
///
/// Non-object input is treated as an empty object. The result may still be
/// "show without message"; callers run [`Decision::into_displayable`] before
/// anything reaches a client.
pub fn sanitize(raw: &Value) -> Decision {
    let should_show = raw.get("should_show").is_some_and(truthy);
    if !should_show {
        return Decision::none();
    }

    let message = raw
        .get("message")
        .and_then(Value::as_str)
        .map(clean_message)
        .filter(|m| !m.is_empty());

    let ttl = raw
        .get("ttl_seconds")
        .and_then(numeric)
        .unwrap_or(i64::from(DEFAULT_TTL_SECS))
        .clamp(i64::from(MIN_TTL_SECS), i64::from(MAX_TTL_SECS));

    Decision {
        should_show,
        message,
        // clamped into u32 range above
        ttl_seconds: ttl as u32,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            !matches!(s.as_str(), "" | "false" | "0" | "no" | "off" | "null" | "none")
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn numeric(value: &Value) -> Option<i64> {
    let float = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            n.as_f64()?
        }
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    float.is_finite().then(|| float.trunc() as i64)
}

/// Trim whitespace and wrapping quotes, then cap the length at
/// [`MAX_MESSAGE_CHARS`] with a trailing ellipsis.
pub fn clean_message(raw: &str) -> String {
    let mut text = raw.trim();
    while let Some(inner) = strip_quote_pair(text) {
        text = inner.trim();
    }

    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }

    let keep = MAX_MESSAGE_CHARS - ELLIPSIS.chars().count();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

fn strip_quote_pair(text: &str) -> Option<&str> {
    let mut chars = text.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    QUOTE_PAIRS
        .iter()
        .any(|&(open, close)| first == open && last == close)
        .then(|| &text[first.len_utf8()..text.len() - last.len_utf8()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hidden_decision_drops_message_and_ttl() {
        let decision = sanitize(&json!({
            "should_show": false,
            "message": "Free shipping today",
            "ttl_seconds": 120
        }));
        assert_eq!(decision, Decision::none());
    }

    #[test]
    fn missing_should_show_defaults_to_hidden() {
        assert_eq!(sanitize(&json!({"message": "hi", "ttl_seconds": 60})), Decision::none());
        assert_eq!(sanitize(&json!("not an object")), Decision::none());
    }

    #[test]
    fn ttl_is_clamped_to_bounds() {
        let high = sanitize(&json!({"should_show": true, "message": "m", "ttl_seconds": 500}));
        assert_eq!(high.ttl_seconds, 180);
        let low = sanitize(&json!({"should_show": true, "message": "m", "ttl_seconds": 5}));
        assert_eq!(low.ttl_seconds, 30);
        let negative = sanitize(&json!({"should_show": true, "message": "m", "ttl_seconds": -40}));
        assert_eq!(negative.ttl_seconds, 30);
        let within = sanitize(&json!({"should_show": true, "message": "m", "ttl_seconds": 45}));
        assert_eq!(within.ttl_seconds, 45);
    }

    #[test]
    fn ttl_defaults_to_ninety_when_unusable() {
        let absent = sanitize(&json!({"should_show": true, "message": "m"}));
        assert_eq!(absent.ttl_seconds, DEFAULT_TTL_SECS);
        let garbage = sanitize(&json!({"should_show": true, "message": "m", "ttl_seconds": "soon"}));
        assert_eq!(garbage.ttl_seconds, DEFAULT_TTL_SECS);
        let textual = sanitize(&json!({"should_show": true, "message": "m", "ttl_seconds": "60"}));
        assert_eq!(textual.ttl_seconds, 60);
        let fractional = sanitize(&json!({"should_show": true, "message": "m", "ttl_seconds": 75.8}));
        assert_eq!(fractional.ttl_seconds, 75);
    }

    #[test]
    fn truthy_coercion_of_should_show() {
        for raw in [json!(true), json!(1), json!("yes"), json!("true"), json!([0])] {
            assert!(sanitize(&json!({"should_show": raw.clone(), "message": "m"})).should_show, "{raw}");
        }
        for raw in [json!(false), json!(0), json!(""), json!("false"), json!(null), json!({})] {
            assert!(!sanitize(&json!({"should_show": raw.clone(), "message": "m"})).should_show, "{raw}");
        }
    }

    #[test]
    fn long_message_is_cut_to_exactly_max_chars() {
        let long = "x".repeat(300);
        let decision = sanitize(&json!({"should_show": true, "message": long, "ttl_seconds": 60}));
        let message = decision.message.expect("message kept");
        assert_eq!(message.chars().count(), MAX_MESSAGE_CHARS);
        assert!(message.ends_with(ELLIPSIS));
    }

    #[test]
    fn multibyte_message_is_cut_on_char_boundaries() {
        let long = "é".repeat(150);
        let message = clean_message(&long);
        assert_eq!(message.chars().count(), MAX_MESSAGE_CHARS);
        assert!(message.starts_with("ééé"));
        assert!(message.ends_with(ELLIPSIS));
    }

    #[test]
    fn message_loses_whitespace_and_wrapping_quotes() {
        assert_eq!(clean_message("  \"Need a hand?\"  "), "Need a hand?");
        assert_eq!(clean_message("'Still deciding?'"), "Still deciding?");
        assert_eq!(clean_message("\u{201C}Free returns\u{201D}"), "Free returns");
        assert_eq!(clean_message("He said \"hi\""), "He said \"hi\"");
        assert_eq!(clean_message("\""), "\"");
    }

    #[test]
    fn empty_message_survives_sanitize_but_is_not_displayable() {
        let decision = sanitize(&json!({"should_show": true, "message": "   ", "ttl_seconds": 60}));
        assert!(decision.should_show);
        assert_eq!(decision.message, None);
        assert_eq!(decision.into_displayable(), Decision::none());
    }

    #[test]
    fn displayable_keeps_complete_popups() {
        let decision = Decision::show("Questions about sizing?", 60);
        assert_eq!(decision.clone().into_displayable(), decision);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let raws = [
            json!({"should_show": true, "message": "  \"Need help deciding?\" ", "ttl_seconds": 500}),
            json!({"should_show": true, "message": "y".repeat(200), "ttl_seconds": 3}),
            json!({"should_show": true, "message": "'\"nested\"'"}),
            json!({"should_show": true, "message": null, "ttl_seconds": 40}),
            json!({"should_show": "no", "message": "ignored", "ttl_seconds": 100}),
            json!({}),
        ];
        for raw in raws {
            let once = sanitize(&raw);
            let twice = sanitize(&once.to_raw());
            assert_eq!(once, twice, "sanitize not idempotent for {raw}");
        }
    }

    #[test]
    fn decision_serializes_null_message() {
        let value = serde_json::to_value(Decision::none()).expect("decision serializes");
        assert_eq!(value, json!({"should_show": false, "message": null, "ttl_seconds": 0}));
    }
}
