#![allow(missing_docs)]

//! Bookkeeping around one parser: event history, counters and the spot journal.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    event::{FishingState, ParseEvent},
    journal::SpotJournal,
    locale::Locale,
    parser::FishingParser,
};

/// Recognised event with the time it was seen and its input line number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub at: DateTime<Local>,
    pub line: u64,
    pub event: ParseEvent,
}

/// Running totals for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub lines: u64,
    pub casts: u64,
    pub undiscovered_casts: u64,
    pub mooches: u64,
    pub discoveries: u64,
}

/// A fishing session for one consumer.
#[derive(Debug)]
pub struct FishingSession {
    parser: FishingParser,
    history: VecDeque<SessionEntry>,
    history_limit: usize,
    stats: SessionStats,
    journal: SpotJournal,
    journal_dirty: bool,
}

impl FishingSession {
    pub fn new(locale: Locale, history_limit: usize) -> Self {
        Self {
            parser: FishingParser::new(locale),
            history: VecDeque::new(),
            history_limit: history_limit.max(1),
            stats: SessionStats::default(),
            journal: SpotJournal::default(),
            journal_dirty: false,
        }
    }

    /// Attach a previously loaded journal.
    pub fn with_journal(mut self, journal: SpotJournal) -> Self {
        self.journal = journal;
        self
    }

    pub fn locale(&self) -> Locale {
        self.parser.locale()
    }

    pub fn state(&self) -> &FishingState {
        self.parser.state()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn journal(&self) -> &SpotJournal {
        &self.journal
    }

    /// Most recent entries first.
    pub fn history(&self) -> impl Iterator<Item = &SessionEntry> {
        self.history.iter().rev()
    }

    /// Feed one raw log line.
    pub fn ingest(&mut self, line: &str) -> Option<ParseEvent> {
        self.stats.lines += 1;
        let event = self.parser.process_line(line)?;

        match &event {
            ParseEvent::CastStarted { undiscovered, .. } => {
                self.stats.casts += 1;
                if *undiscovered {
                    self.stats.undiscovered_casts += 1;
                }
            }
            ParseEvent::AreaDiscovered { spot } => {
                self.stats.discoveries += 1;
                if self.journal.record(self.parser.locale(), spot) {
                    info!(locale = %self.parser.locale(), spot = %spot, "new fishing spot recorded");
                    self.journal_dirty = true;
                }
            }
            ParseEvent::MoochAttempted => self.stats.mooches += 1,
        }

        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(SessionEntry {
            at: Local::now(),
            line: self.stats.lines,
            event: event.clone(),
        });
        Some(event)
    }

    /// The player left the water. History and totals are kept.
    pub fn reset(&mut self) {
        self.parser.reset();
    }

    /// Switch client language: state and history start over.
    pub fn set_locale(&mut self, locale: Locale) {
        info!(from = %self.parser.locale(), to = %locale, "switching locale");
        self.parser.set_locale(locale);
        self.history.clear();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Returns `true` once after the journal gained a new spot.
    pub fn take_journal_dirty(&mut self) -> bool {
        std::mem::take(&mut self.journal_dirty)
    }
}
