//! Fishing spots seen being added to the fishing log, persisted between runs.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// File name used under the data directory.
pub const JOURNAL_FILE: &str = "fishwatch/journal.json";

/// Discovered spot names per locale. Spot names are localised, so each
/// client language keeps its own set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotJournal {
    #[serde(default)]
    spots: BTreeMap<Locale, BTreeSet<String>>,
    /// Timestamp of the last new entry.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SpotJournal {
    /// Default location under the user's data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(JOURNAL_FILE)
    }

    /// Record a discovered spot. Returns `true` when it was not known yet.
    pub fn record(&mut self, locale: Locale, spot: &str) -> bool {
        let inserted = self
            .spots
            .entry(locale)
            .or_default()
            .insert(spot.to_string());
        if inserted {
            self.updated_at = Some(Utc::now());
        }
        inserted
    }

    /// Whether `spot` has been recorded for `locale`.
    pub fn contains(&self, locale: Locale, spot: &str) -> bool {
        self.spots
            .get(&locale)
            .map(|spots| spots.contains(spot))
            .unwrap_or(false)
    }

    /// Recorded spots for `locale` in sorted order.
    pub fn spots(&self, locale: Locale) -> impl Iterator<Item = &str> {
        self.spots
            .get(&locale)
            .into_iter()
            .flat_map(|spots| spots.iter().map(String::as_str))
    }

    /// Number of spots recorded for `locale`.
    pub fn count(&self, locale: Locale) -> usize {
        self.spots.get(&locale).map(BTreeSet::len).unwrap_or(0)
    }

    /// Total number of spots across all locales.
    pub fn len(&self) -> usize {
        self.spots.values().map(BTreeSet::len).sum()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load the journal from `path`, returning `None` if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read journal {}", path.display()))?;
        let journal = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse journal {}", path.display()))?;
        Ok(Some(journal))
    }

    /// Persist the journal, creating parent directories if needed.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create journal directory {}", parent.display())
            })?;
        }

        let serialized =
            serde_json::to_string_pretty(self).context("failed to serialize spot journal")?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write journal {}", path.display()))
    }
}
