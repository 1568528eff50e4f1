use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Storefront page category, as reported by the tracker snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Home,
    Collection,
    Product,
    Cart,
    Checkout,
}

impl PageType {
    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Home => "home",
            PageType::Collection => "collection",
            PageType::Product => "product",
            PageType::Cart => "cart",
            PageType::Checkout => "checkout",
        }
    }
}

/// Kind of user action captured by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PageView,
    Click,
    CartUpdate,
    DwellTick,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::PageView => "page_view",
            EventKind::Click => "click",
            EventKind::CartUpdate => "cart_update",
            EventKind::DwellTick => "dwell_tick",
        }
    }
}

/// One user action. Events arrive in chronological order and are never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub page: PageType,
    /// Free-form context: `path`, `action`, `quantity`, `elapsed_sec`, ...
    #[serde(default)]
    #[schema(value_type = Object)]
    pub meta: Map<String, Value>,
    /// Milliseconds since epoch
    pub timestamp: i64,
}

impl Event {
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(Value::as_str)
    }

    /// Integer meta value. Fractional numbers are truncated toward zero.
    pub fn meta_i64(&self, key: &str) -> Option<i64> {
        let value = self.meta.get(key)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
    }

    pub fn action(&self) -> Option<&str> {
        self.meta_str("action")
    }
}

/// Point-in-time view of one visitor's session, submitted once per decision request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionSnapshot {
    pub events: Vec<Event>,
    pub current_page: PageType,
    #[serde(default)]
    pub cart_items: u32,
    /// Seconds since the session started
    #[serde(default)]
    pub time_on_site: u64,
}

/// Body of `POST /decide`
#[derive(Debug, Deserialize, ToSchema)]
pub struct DecisionRequest {
    pub session: SessionSnapshot,
}
