//! The decision pipeline: gate, insights, payload, reasoner, sanitization.

use std::sync::Arc;
use std::time::Duration;

use crate::decision::Decision;
use crate::reasoner::{self, Reasoner, ReasonerError};
use crate::session::SessionSnapshot;
use crate::{gate, insights, payload, reply};

pub const DEFAULT_REASONER_TIMEOUT: Duration = Duration::from_secs(15);

/// Runs the expensive half of a decision. Holds no per-session state, so one
/// instance is shared by every request.
#[derive(Clone)]
pub struct SessionAnalyzer {
    reasoner: Option<Arc<dyn Reasoner>>,
    timeout: Duration,
}

impl SessionAnalyzer {
    pub fn new(reasoner: Arc<dyn Reasoner>, timeout: Duration) -> Self {
        Self {
            reasoner: Some(reasoner),
            timeout,
        }
    }

    /// Analyzer without a reasoning backend; every analysis returns no popup.
    pub fn disabled() -> Self {
        Self {
            reasoner: None,
            timeout: DEFAULT_REASONER_TIMEOUT,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.reasoner.is_some()
    }

    /// Analyze a session. Every failure degrades to [`Decision::none`].
    pub async fn analyze(&self, session: &SessionSnapshot) -> Decision {
        match self.try_analyze(session).await {
            Ok(decision) => decision,
            Err(ReasonerError::MissingCredential) => {
                tracing::debug!("analyzer disabled, no reasoning credential configured");
                Decision::none()
            }
            Err(err) => {
                tracing::warn!(error = %err, "session analysis failed, defaulting to no popup");
                Decision::none()
            }
        }
    }

    async fn try_analyze(&self, session: &SessionSnapshot) -> Result<Decision, ReasonerError> {
        let reasoner = self
            .reasoner
            .as_ref()
            .ok_or(ReasonerError::MissingCredential)?;

        let insights = insights::extract(session);
        let payload = payload::build(session, &insights);
        tracing::debug!(
            signals = ?payload.behavioral_signals,
            journey = ?payload.recent_journey,
            "session insights extracted"
        );
        let user = reasoner::user_message(&payload)?;

        let text = tokio::time::timeout(
            self.timeout,
            reasoner.complete(reasoner::SYSTEM_PROMPT, &user),
        )
        .await
        .map_err(|_| ReasonerError::Timeout(self.timeout.as_secs()))??;

        Ok(reply::parse(&text))
    }
}

/// Full decision for one snapshot: gate first, then analysis, then the
/// displayability check the client contract requires.
pub async fn decide(analyzer: &SessionAnalyzer, session: &SessionSnapshot) -> Decision {
    let eligible = gate::is_eligible(session);
    tracing::info!(
        eligible,
        current_page = session.current_page.as_str(),
        time_on_site = session.time_on_site,
        events = session.events.len(),
        "eligibility gate evaluated"
    );
    if !eligible {
        return Decision::none();
    }

    let decision = analyzer.analyze(session).await.into_displayable();
    tracing::info!(
        should_show = decision.should_show,
        ttl_seconds = decision.ttl_seconds,
        "session analysis finished"
    );
    decision
}
