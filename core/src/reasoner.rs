//! Seam to the external reasoning service and the prompt it receives.

use async_trait::async_trait;
use thiserror::Error;

use crate::payload::EnhancedPayload;

/// Why a reasoner call produced no text. Never leaves the analyzer.
#[derive(Debug, Error)]
pub enum ReasonerError {
    #[error("reasoning service credential is not configured")]
    MissingCredential,
    #[error("reasoning service request failed: {0}")]
    Transport(String),
    #[error("reasoning service did not answer within {0} seconds")]
    Timeout(u64),
    #[error("reasoning service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("reasoning service response was malformed: {0}")]
    Malformed(String),
    #[error("failed to encode session payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A text-generation backend: one system instruction, one user message, one reply.
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ReasonerError>;
}

pub const SYSTEM_PROMPT: &str = "You are a conversion assistant for an e-commerce storefront. \
Given a compact session summary with behavioral signals, decide whether to show a popup NOW \
and, if yes, write the message.\n\
Rules:\n\
- Only flag high-value moments: cart abandonment, extended browsing without progress, or purchase hesitation.\n\
- Do not interrupt active shopping. Recent add_to_cart or quantity changes (qty_*) mean the visitor is busy; stay quiet.\n\
- Message must be at most 120 characters, helpful and neutral in tone, with no emojis.\n\
- ttl_seconds reflects urgency: shorter for time-sensitive nudges, longer for gentle help (30 to 180).\n\
Respond with a single JSON object and nothing else.";

const RESPONSE_SHAPE: &str = "Return JSON with keys: should_show (boolean), message (string or null), ttl_seconds (integer).";

/// User message carrying the serialized payload.
pub fn user_message(payload: &EnhancedPayload) -> Result<String, ReasonerError> {
    let session = serde_json::to_string(payload)?;
    Ok(format!("{RESPONSE_SHAPE}\nSession: {session}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{PageType, SessionSnapshot};
    use crate::{insights, payload};

    #[test]
    fn user_message_embeds_payload_json() {
        let session = SessionSnapshot {
            events: Vec::new(),
            current_page: PageType::Cart,
            cart_items: 3,
            time_on_site: 95,
        };
        let payload = payload::build(&session, &insights::extract(&session));
        let message = user_message(&payload).expect("payload encodes");

        assert!(message.starts_with(RESPONSE_SHAPE));
        let json = message.split_once("Session: ").expect("session marker").1;
        let value: serde_json::Value = serde_json::from_str(json).expect("embedded json parses");
        assert_eq!(value["cart_items"], 3);
        assert_eq!(value["current_page"], "cart");
    }

    #[test]
    fn system_prompt_states_the_limits() {
        assert!(SYSTEM_PROMPT.contains("120 characters"));
        assert!(SYSTEM_PROMPT.contains("no emojis"));
        assert!(SYSTEM_PROMPT.contains("add_to_cart"));
    }
}
