#![warn(clippy::all, missing_docs)]

//! Core logic for fishwatch.
//!
//! Recognises fishing activity in localised game chat logs: a per-locale
//! pattern catalog, the fishing state machine driven by it, and the session,
//! journal, configuration and log-following layers used by the terminal UI.

pub mod config;
pub mod error;
pub mod event;
pub mod journal;
pub mod locale;
pub mod parser;
pub mod patterns;
pub mod session;
pub mod source;

pub use config::AppConfig;
pub use error::FishwatchError;
pub use event::{FishingPhase, FishingState, ParseEvent};
pub use journal::SpotJournal;
pub use locale::Locale;
pub use parser::FishingParser;
pub use patterns::{patterns_for, patterns_for_code, LineMatch, PatternSet, SpotMatch};
pub use session::{FishingSession, SessionEntry, SessionStats};
pub use source::{LineReader, LogFollower, SourceEvent};
