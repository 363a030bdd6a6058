//! Locale-specific chat line patterns.
//!
//! Every [`Locale`] owns exactly one [`PatternSet`]. Sets are compiled lazily on
//! first use and then shared read-only for the rest of the process, so
//! [`patterns_for`] is cheap enough to call per line.
//!
//! All patterns use the `regex` crate, which matches in time linear in the
//! length of the line. Matching is unanchored and case-sensitive; no
//! normalisation is applied to the input.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::warn;

use crate::{error::FishwatchError, locale::Locale};

const SPOT_GROUP: &str = "FishingSpot";
const SPOT_WITH_ARTICLE_GROUP: &str = "FishingSpotWithArticle";

/// Compiled matching rules for one client language.
#[derive(Debug)]
pub struct PatternSet {
    locale: Locale,
    cast: Regex,
    area_discovered: Regex,
    mooch: Regex,
    undiscovered: &'static str,
}

/// Spot resolved from a cast line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpotMatch {
    /// A real fishing spot name.
    Named(String),
    /// The line named the locale's placeholder for a spot missing from the fishing log.
    Undiscovered,
}

/// Outcome of testing one line against a [`PatternSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    /// Someone cast their line.
    Cast(SpotMatch),
    /// A fishing hole was added to the fishing log.
    AreaDiscovered(String),
    /// A mooch was attempted.
    Mooch,
}

impl PatternSet {
    fn build(
        locale: Locale,
        cast: &str,
        area_discovered: &str,
        mooch: &str,
        undiscovered: &'static str,
    ) -> Self {
        Self {
            locale,
            cast: Regex::new(cast).expect("invalid cast pattern"),
            area_discovered: Regex::new(area_discovered)
                .expect("invalid area discovered pattern"),
            mooch: Regex::new(mooch).expect("invalid mooch pattern"),
            undiscovered,
        }
    }

    // Korean clients print the English phrasing.
    fn english_phrasing(locale: Locale) -> Self {
        Self::build(
            locale,
            r"(?:You cast your|.*? casts (?:her|his)) line (?:on|in|at) (?P<FishingSpot>.+)\.",
            r"^(?:.*?Data (?:on|at) )?(?P<FishingSpot>.+) is added to your fishing log\.",
            r"line with the fish still hooked.",
            "undiscovered fishing hole",
        )
    }

    fn german() -> Self {
        Self::build(
            Locale::German,
            r".*? has?t mit dem Fischen (?P<FishingSpotWithArticle>.+) begonnen\.(?P<FishingSpot>invalid)?",
            r"Die neue Angelstelle (?P<FishingSpot>.*) wurde in deinem Fischer-Notizbuch vermerkt\.",
            r"Du hast die Leine mit",
            "unerforschten Angelplatz",
        )
    }

    fn french() -> Self {
        Self::build(
            Locale::French,
            r".*? commencez? à pêcher\.\s*Point de pêche: (?P<FishingSpot>.+)\.",
            r"Vous notez le banc de poissons “(?P<FishingSpot>.+)” dans votre carnet\.",
            r"Vous essayez de pêcher au vif avec",
            "Zone de pêche inconnue",
        )
    }

    fn japanese() -> Self {
        Self::build(
            Locale::Japanese,
            r".+\x{306F}(?P<FishingSpot>.+)で釣りを開始した。",
            r"釣り手帳に新しい釣り場「(?P<FishingSpot>.+)」の情報を記録した！",
            r"は釣り上げた.+を慎重に投げ込み、泳がせ釣りを試みた。",
            "未知の釣り場",
        )
    }

    /// Locale this set was built for.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Phrase that stands in for the spot name when the hole is not in the fishing log yet.
    pub fn undiscovered_marker(&self) -> &'static str {
        self.undiscovered
    }

    /// Match a cast line and resolve its spot.
    pub fn match_cast(&self, line: &str) -> Option<SpotMatch> {
        let caps = self.cast.captures(line)?;
        let spot = self.resolve_spot(&caps)?;
        if spot.contains(self.undiscovered) {
            Some(SpotMatch::Undiscovered)
        } else {
            Some(SpotMatch::Named(spot))
        }
    }

    /// Match a "new fishing hole recorded" line.
    pub fn match_area_discovered(&self, line: &str) -> Option<String> {
        let caps = self.area_discovered.captures(line)?;
        self.resolve_spot(&caps)
    }

    /// Whether the line reports a mooch attempt.
    pub fn matches_mooch(&self, line: &str) -> bool {
        self.mooch.is_match(line)
    }

    /// Test a line against cast, area discovered and mooch rules in that order.
    ///
    /// The first rule that matches wins, even when a later one would match too.
    pub fn classify(&self, line: &str) -> Option<LineMatch> {
        if let Some(spot) = self.match_cast(line) {
            return Some(LineMatch::Cast(spot));
        }
        if let Some(spot) = self.match_area_discovered(line) {
            return Some(LineMatch::AreaDiscovered(spot));
        }
        if self.matches_mooch(line) {
            return Some(LineMatch::Mooch);
        }
        None
    }

    /// Pick the spot text from whichever capture slot produced it.
    ///
    /// The plain slot and the article slot are expected to be mutually
    /// exclusive. When both hold text the pattern is broken; the plain slot is
    /// used and the conflict is logged.
    fn resolve_spot(&self, caps: &Captures<'_>) -> Option<String> {
        let plain = non_empty_group(caps, SPOT_GROUP);
        let with_article = non_empty_group(caps, SPOT_WITH_ARTICLE_GROUP);
        let raw = match (plain, with_article) {
            (Some(plain), Some(with_article)) => {
                warn!(
                    locale = %self.locale,
                    plain,
                    with_article,
                    "both fishing spot captures populated; using the plain capture"
                );
                plain
            }
            (Some(plain), None) => plain,
            (None, Some(with_article)) => with_article,
            (None, None) => return None,
        };

        let spot = raw.strip_suffix('.').unwrap_or(raw);
        if spot.is_empty() {
            None
        } else {
            Some(spot.to_string())
        }
    }
}

fn non_empty_group<'t>(caps: &Captures<'t>, name: &str) -> Option<&'t str> {
    caps.name(name)
        .map(|m| m.as_str())
        .filter(|text| !text.is_empty())
}

static ENGLISH: Lazy<PatternSet> = Lazy::new(|| PatternSet::english_phrasing(Locale::English));
static GERMAN: Lazy<PatternSet> = Lazy::new(PatternSet::german);
static FRENCH: Lazy<PatternSet> = Lazy::new(PatternSet::french);
static JAPANESE: Lazy<PatternSet> = Lazy::new(PatternSet::japanese);
static KOREAN: Lazy<PatternSet> = Lazy::new(|| PatternSet::english_phrasing(Locale::Korean));

/// Shared pattern set for `locale`, compiled on first request.
pub fn patterns_for(locale: Locale) -> &'static PatternSet {
    match locale {
        Locale::English => Lazy::force(&ENGLISH),
        Locale::German => Lazy::force(&GERMAN),
        Locale::French => Lazy::force(&FRENCH),
        Locale::Japanese => Lazy::force(&JAPANESE),
        Locale::Korean => Lazy::force(&KOREAN),
    }
}

/// Look up a pattern set from a locale code or name.
///
/// Fails with [`FishwatchError::UnsupportedLocale`] for anything outside [`Locale::ALL`].
pub fn patterns_for_code(code: &str) -> Result<&'static PatternSet, FishwatchError> {
    let locale: Locale = code.parse()?;
    Ok(patterns_for(locale))
}
