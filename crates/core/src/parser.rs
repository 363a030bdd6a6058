//! Fishing state machine driven by chat log lines.

use tracing::debug;

use crate::{
    error::FishwatchError,
    event::{FishingPhase, FishingState, ParseEvent},
    locale::Locale,
    patterns::{patterns_for, LineMatch, PatternSet, SpotMatch},
};

/// Consumes log lines one at a time and tracks what the player is doing at the water.
///
/// A parser is bound to one locale and owned by one consumer. Switching
/// locale rebinds the shared pattern set and clears the state.
#[derive(Debug)]
pub struct FishingParser {
    patterns: &'static PatternSet,
    state: FishingState,
}

impl FishingParser {
    /// Create a parser in the idle state.
    pub fn new(locale: Locale) -> Self {
        Self {
            patterns: patterns_for(locale),
            state: FishingState::default(),
        }
    }

    /// Create a parser from a locale code or name, failing on unsupported locales.
    pub fn from_code(code: &str) -> Result<Self, FishwatchError> {
        Ok(Self::new(code.parse()?))
    }

    /// Locale the parser is bound to.
    pub fn locale(&self) -> Locale {
        self.patterns.locale()
    }

    /// Pattern set in use.
    pub fn patterns(&self) -> &'static PatternSet {
        self.patterns
    }

    /// Current state record.
    pub fn state(&self) -> &FishingState {
        &self.state
    }

    /// Feed one line. Returns the recognised event, or `None` for unrelated text.
    pub fn process_line(&mut self, line: &str) -> Option<ParseEvent> {
        let event = match self.patterns.classify(line)? {
            LineMatch::Cast(spot) => self.on_cast(spot),
            LineMatch::AreaDiscovered(spot) => self.on_area_discovered(spot),
            LineMatch::Mooch => self.on_mooch(),
        };
        debug!(
            locale = %self.locale(),
            event = event.kind(),
            phase = self.state.phase.label(),
            "fishing line recognised"
        );
        Some(event)
    }

    /// Drop back to idle, e.g. when the player leaves the water or changes zone.
    pub fn reset(&mut self) {
        if !self.state.is_cleared() {
            debug!(locale = %self.locale(), "fishing state reset");
        }
        self.state.clear();
    }

    /// Bind to another locale. Always clears the state.
    pub fn set_locale(&mut self, locale: Locale) {
        self.patterns = patterns_for(locale);
        self.state.clear();
    }

    fn on_cast(&mut self, spot: SpotMatch) -> ParseEvent {
        let (spot, undiscovered) = match spot {
            SpotMatch::Named(name) => (Some(name), false),
            SpotMatch::Undiscovered => (None, true),
        };
        self.state.phase = FishingPhase::Casting;
        self.state.current_spot = spot.clone();
        self.state.is_undiscovered_spot = undiscovered;
        self.state.is_mooching = false;
        ParseEvent::CastStarted { spot, undiscovered }
    }

    fn on_area_discovered(&mut self, spot: String) -> ParseEvent {
        // The hole we are standing at just got its name.
        if self.state.is_undiscovered_spot {
            self.state.is_undiscovered_spot = false;
            self.state.current_spot = Some(spot.clone());
        }
        ParseEvent::AreaDiscovered { spot }
    }

    fn on_mooch(&mut self) -> ParseEvent {
        self.state.is_mooching = true;
        if self.state.phase == FishingPhase::Casting {
            self.state.phase = FishingPhase::Mooching;
        }
        ParseEvent::MoochAttempted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAST: &str = "You cast your line on The Minnow Ponds.";
    const CAST_UNDISCOVERED: &str = "Boco casts his line on an undiscovered fishing hole.";
    const DISCOVERED: &str = "The Minnow Ponds is added to your fishing log.";
    const MOOCH: &str = "You lose your line with the fish still hooked.";
    const CHATTER: &str = "Player123 says: hi";

    fn cast_line(locale: Locale) -> &'static str {
        match locale {
            Locale::English | Locale::Korean => CAST,
            Locale::German => "Du hast mit dem Fischen am Mittellauf begonnen.",
            Locale::French => "Vous commencez à pêcher. Point de pêche: Mittellauf.",
            Locale::Japanese => "ボコは泳がせ池で釣りを開始した。",
        }
    }

    #[test]
    fn cast_moves_to_casting() {
        let mut parser = FishingParser::new(Locale::English);
        let event = parser.process_line(CAST);
        assert_eq!(
            event,
            Some(ParseEvent::CastStarted {
                spot: Some("The Minnow Ponds".to_string()),
                undiscovered: false,
            })
        );
        let state = parser.state();
        assert_eq!(state.phase, FishingPhase::Casting);
        assert_eq!(state.current_spot.as_deref(), Some("The Minnow Ponds"));
        assert!(!state.is_undiscovered_spot);
        assert!(!state.is_mooching);
    }

    #[test]
    fn every_locale_casts() {
        for locale in Locale::ALL {
            let mut parser = FishingParser::new(locale);
            match parser.process_line(cast_line(locale)) {
                Some(ParseEvent::CastStarted {
                    spot: Some(_),
                    undiscovered: false,
                }) => {}
                other => panic!("{locale}: unexpected {other:?}"),
            }
            assert_eq!(parser.state().phase, FishingPhase::Casting, "{locale}");
        }
    }

    #[test]
    fn undiscovered_cast_hides_marker() {
        let mut parser = FishingParser::new(Locale::English);
        assert_eq!(
            parser.process_line(CAST_UNDISCOVERED),
            Some(ParseEvent::CastStarted {
                spot: None,
                undiscovered: true,
            })
        );
        assert!(parser.state().is_undiscovered_spot);
        assert_eq!(parser.state().current_spot, None);
        assert_eq!(parser.state().phase, FishingPhase::Casting);
    }

    #[test]
    fn discovery_names_the_undiscovered_spot() {
        let mut parser = FishingParser::new(Locale::English);
        parser.process_line(CAST_UNDISCOVERED);
        assert_eq!(
            parser.process_line(DISCOVERED),
            Some(ParseEvent::AreaDiscovered {
                spot: "The Minnow Ponds".to_string()
            })
        );
        let state = parser.state();
        assert_eq!(state.phase, FishingPhase::Casting);
        assert!(!state.is_undiscovered_spot);
        assert_eq!(state.current_spot.as_deref(), Some("The Minnow Ponds"));
    }

    #[test]
    fn discovery_while_idle_keeps_phase() {
        let mut parser = FishingParser::new(Locale::English);
        assert!(matches!(
            parser.process_line(DISCOVERED),
            Some(ParseEvent::AreaDiscovered { .. })
        ));
        assert!(parser.state().is_cleared());
    }

    #[test]
    fn mooch_after_cast_moves_to_mooching() {
        let mut parser = FishingParser::new(Locale::English);
        parser.process_line(CAST);
        assert_eq!(parser.process_line(MOOCH), Some(ParseEvent::MoochAttempted));
        assert_eq!(parser.state().phase, FishingPhase::Mooching);
        assert!(parser.state().is_mooching);
        assert_eq!(
            parser.state().current_spot.as_deref(),
            Some("The Minnow Ponds")
        );
    }

    #[test]
    fn mooch_while_idle_stays_idle() {
        let mut parser = FishingParser::new(Locale::English);
        assert_eq!(parser.process_line(MOOCH), Some(ParseEvent::MoochAttempted));
        assert_eq!(parser.state().phase, FishingPhase::Idle);
        assert!(parser.state().is_mooching);
    }

    #[test]
    fn cast_clears_mooching() {
        let mut parser = FishingParser::new(Locale::English);
        parser.process_line(CAST);
        parser.process_line(MOOCH);
        parser.process_line("You cast your line at Costa del Sol.");
        let state = parser.state();
        assert_eq!(state.phase, FishingPhase::Casting);
        assert!(!state.is_mooching);
        assert_eq!(state.current_spot.as_deref(), Some("Costa del Sol"));
    }

    #[test]
    fn reset_always_returns_to_idle() {
        let mut parser = FishingParser::new(Locale::English);
        parser.reset();
        assert!(parser.state().is_cleared());

        parser.process_line(CAST_UNDISCOVERED);
        parser.process_line(MOOCH);
        assert_eq!(parser.state().phase, FishingPhase::Mooching);
        parser.reset();
        assert!(parser.state().is_cleared());
    }

    #[test]
    fn unrelated_lines_are_ignored() {
        let mut parser = FishingParser::new(Locale::English);
        parser.process_line(CAST);
        let before = parser.state().clone();
        for _ in 0..3 {
            assert_eq!(parser.process_line(CHATTER), None);
            assert_eq!(parser.state(), &before);
        }
        assert_eq!(parser.process_line(""), None);
        assert_eq!(parser.process_line("\u{0}\u{fffd}ünïcödé 釣り"), None);
        assert_eq!(parser.state(), &before);
    }

    #[test]
    fn other_locale_lines_do_not_match() {
        let mut parser = FishingParser::new(Locale::German);
        assert_eq!(parser.process_line(CAST), None);
        assert_eq!(parser.process_line(MOOCH), None);
    }

    #[test]
    fn set_locale_rebinds_and_clears() {
        let mut parser = FishingParser::new(Locale::English);
        parser.process_line(CAST);
        parser.set_locale(Locale::Japanese);
        assert_eq!(parser.locale(), Locale::Japanese);
        assert!(parser.state().is_cleared());
        assert!(matches!(
            parser.process_line(cast_line(Locale::Japanese)),
            Some(ParseEvent::CastStarted { .. })
        ));
    }

    #[test]
    fn from_code_rejects_unsupported_locale() {
        assert!(FishingParser::from_code("fr").is_ok());
        assert_eq!(
            FishingParser::from_code("pt-BR").map(|parser| parser.locale()),
            Err(FishwatchError::UnsupportedLocale("pt-BR".to_string()))
        );
    }
}
