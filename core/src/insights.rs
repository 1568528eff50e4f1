//! Behavioral insights derived from a session's event history.
//!
//! Extraction is a single ordered pass over the events followed by a handful of
//! threshold rules. Everything here is pure and lives only for one analysis call.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::session::{EventKind, PageType, SessionSnapshot};

pub const ADD_TO_CART_ACTION: &str = "add_to_cart";
const QUANTITY_ACTION_MARKER: &str = "qty";
/// Journey tag action used when a click carries no `action` meta.
const FALLBACK_CLICK_ACTION: &str = "click";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageViewRecord {
    pub page: PageType,
    pub path: Option<String>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionRecord {
    pub action: Option<String>,
    pub page: PageType,
    pub quantity: Option<i64>,
    pub timestamp: i64,
}

impl InteractionRecord {
    fn action_is(&self, expected: &str) -> bool {
        self.action.as_deref() == Some(expected)
    }

    fn action_contains(&self, needle: &str) -> bool {
        self.action.as_deref().is_some_and(|a| a.contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DwellRecord {
    pub page: PageType,
    pub elapsed_sec: Option<i64>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseIntent {
    Low,
    Exploring,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowsePattern {
    Focused,
    Exploring,
    BrowsingWidely,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInvestment {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonmentRisk {
    Low,
    Medium,
    High,
}

/// Categorical signals handed to the reasoner. Serializes as a flat
/// `signal name -> label` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BehavioralSignals {
    pub engagement_level: EngagementLevel,
    pub purchase_intent: PurchaseIntent,
    pub browse_pattern: BrowsePattern,
    pub time_investment: TimeInvestment,
    pub abandonment_risk: AbandonmentRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub page_views: Vec<PageViewRecord>,
    pub interactions: Vec<InteractionRecord>,
    pub dwell: Vec<DwellRecord>,
    pub journey: Vec<String>,
    pub signals: BehavioralSignals,
}

impl Insights {
    /// Number of distinct pages among the page views.
    pub fn distinct_pages_viewed(&self) -> usize {
        self.page_views
            .iter()
            .map(|pv| pv.page)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Walk the session's events once and derive its behavioral signals.
pub fn extract(session: &SessionSnapshot) -> Insights {
    let mut page_views = Vec::new();
    let mut interactions = Vec::new();
    let mut dwell = Vec::new();
    let mut journey = Vec::new();

    for event in &session.events {
        match event.kind {
            EventKind::PageView => {
                journey.push(format!("viewed_{}", event.page.as_str()));
                page_views.push(PageViewRecord {
                    page: event.page,
                    path: event.meta_str("path").map(str::to_string),
                    timestamp: event.timestamp,
                });
            }
            EventKind::Click => {
                let action = event.action().map(str::to_string);
                journey.push(format!(
                    "{}_on_{}",
                    action.as_deref().unwrap_or(FALLBACK_CLICK_ACTION),
                    event.page.as_str()
                ));
                interactions.push(InteractionRecord {
                    action,
                    page: event.page,
                    quantity: event.meta_i64("quantity"),
                    timestamp: event.timestamp,
                });
            }
            EventKind::DwellTick => dwell.push(DwellRecord {
                page: event.page,
                elapsed_sec: event.meta_i64("elapsed_sec"),
                timestamp: event.timestamp,
            }),
            EventKind::CartUpdate => {}
        }
    }

    let mut insights = Insights {
        page_views,
        interactions,
        dwell,
        journey,
        signals: BehavioralSignals {
            engagement_level: EngagementLevel::Low,
            purchase_intent: PurchaseIntent::Low,
            browse_pattern: BrowsePattern::Focused,
            time_investment: TimeInvestment::Low,
            abandonment_risk: AbandonmentRisk::Low,
        },
    };
    insights.signals = derive_signals(session, &insights);
    insights
}

fn derive_signals(session: &SessionSnapshot, insights: &Insights) -> BehavioralSignals {
    let interactions = &insights.interactions;
    let distinct_pages = insights.distinct_pages_viewed();
    let has_add_to_cart = interactions.iter().any(|i| i.action_is(ADD_TO_CART_ACTION));
    let on_cart = session.current_page == PageType::Cart;

    let engagement_level = match interactions.len() {
        n if n >= 3 => EngagementLevel::High,
        n if n >= 1 => EngagementLevel::Medium,
        _ => EngagementLevel::Low,
    };

    let purchase_intent = if has_add_to_cart {
        PurchaseIntent::High
    } else if on_cart
        || interactions
            .iter()
            .any(|i| i.action_contains(QUANTITY_ACTION_MARKER))
    {
        PurchaseIntent::Medium
    } else if distinct_pages > 1 {
        PurchaseIntent::Exploring
    } else {
        PurchaseIntent::Low
    };

    // Zero page views counts as focused.
    let browse_pattern = match distinct_pages {
        0 | 1 => BrowsePattern::Focused,
        2 | 3 => BrowsePattern::Exploring,
        _ => BrowsePattern::BrowsingWidely,
    };

    let time_investment = match session.time_on_site {
        t if t >= 120 => TimeInvestment::High,
        t if t >= 30 => TimeInvestment::Medium,
        _ => TimeInvestment::Low,
    };

    let abandonment_risk = if session.cart_items > 0 && !on_cart {
        AbandonmentRisk::High
    } else if has_add_to_cart && session.current_page == PageType::Product {
        AbandonmentRisk::Medium
    } else {
        AbandonmentRisk::Low
    };

    BehavioralSignals {
        engagement_level,
        purchase_intent,
        browse_pattern,
        time_investment,
        abandonment_risk,
    }
}
