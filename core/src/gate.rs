//! Cost gate in front of the session analyzer.

use crate::session::{PageType, SessionSnapshot};

/// Sessions younger than this never reach the reasoner.
pub const MIN_TIME_ON_SITE_SECS: u64 = 30;

/// Pages where a popup can still change the outcome of the visit.
pub const ELIGIBLE_PAGES: [PageType; 2] = [PageType::Product, PageType::Cart];

/// Whether a session is worth the cost of a full analysis.
pub fn is_eligible(session: &SessionSnapshot) -> bool {
    ELIGIBLE_PAGES.contains(&session.current_page)
        && session.time_on_site >= MIN_TIME_ON_SITE_SECS
}
