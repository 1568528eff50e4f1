use serde::Serialize;

use crate::insights::{BehavioralSignals, Insights};
use crate::session::{EventKind, PageType, SessionSnapshot};

/// Journey tags forwarded to the reasoner.
pub const JOURNEY_TAIL: usize = 5;
/// Raw events inspected for the recent-actions window.
pub const RECENT_EVENT_WINDOW: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentAction {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub action: Option<String>,
    pub page: PageType,
}

/// Compact session summary sent to the reasoner. Bounded in size no matter how
/// long the session history is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancedPayload {
    pub current_page: PageType,
    pub cart_items: u32,
    pub time_on_site_sec: u64,
    pub events_count: usize,
    pub page_views: usize,
    pub interactions: usize,
    pub recent_journey: Vec<String>,
    pub behavioral_signals: BehavioralSignals,
    pub recent_actions: Vec<RecentAction>,
}

pub fn build(session: &SessionSnapshot, insights: &Insights) -> EnhancedPayload {
    let journey_start = insights.journey.len().saturating_sub(JOURNEY_TAIL);
    let events_start = session.events.len().saturating_sub(RECENT_EVENT_WINDOW);

    // Window over the raw tail first, then keep clicks and page views.
    let recent_actions = session.events[events_start..]
        .iter()
        .filter(|e| matches!(e.kind, EventKind::Click | EventKind::PageView))
        .map(|e| RecentAction {
            kind: e.kind,
            action: e.action().map(str::to_string),
            page: e.page,
        })
        .collect();

    EnhancedPayload {
        current_page: session.current_page,
        cart_items: session.cart_items,
        time_on_site_sec: session.time_on_site,
        events_count: session.events.len(),
        page_views: insights.page_views.len(),
        interactions: insights.interactions.len(),
        recent_journey: insights.journey[journey_start..].to_vec(),
        behavioral_signals: insights.signals,
        recent_actions,
    }
}
