//! Popup decision pipeline for the proactive engagement service.
//!
//! A [`session::SessionSnapshot`] passes the cheap [`gate`], gets summarized by
//! [`insights`] and [`payload`], is judged by an external [`reasoner::Reasoner`],
//! and comes back as a bounded [`decision::Decision`].

pub mod analyzer;
pub mod decision;
pub mod error;
pub mod gate;
pub mod insights;
pub mod payload;
pub mod reasoner;
pub mod reply;
pub mod session;

pub use analyzer::{SessionAnalyzer, decide};
pub use decision::Decision;
pub use session::SessionSnapshot;
