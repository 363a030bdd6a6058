//! Events and state records produced by the fishing parser.

use serde::{Deserialize, Serialize};

/// Recognised fishing event for a single log line.
///
/// Lines that match nothing produce no event at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParseEvent {
    /// A line was cast. `spot` is `None` when the hole is not in the fishing log yet.
    CastStarted {
        /// Resolved spot name.
        spot: Option<String>,
        /// The cast named the undiscovered placeholder instead of a spot.
        undiscovered: bool,
    },
    /// A fishing hole was recorded in the fishing log.
    AreaDiscovered {
        /// Name of the recorded spot.
        spot: String,
    },
    /// The line was grabbed with the fish still hooked.
    MoochAttempted,
}

impl ParseEvent {
    /// Short label used in logs and the UI.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseEvent::CastStarted { .. } => "cast",
            ParseEvent::AreaDiscovered { .. } => "discovered",
            ParseEvent::MoochAttempted => "mooch",
        }
    }
}

/// Coarse activity of the fishing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FishingPhase {
    /// Not fishing.
    #[default]
    Idle,
    /// A cast was recognised.
    Casting,
    /// A mooch was attempted since the last cast.
    Mooching,
}

impl FishingPhase {
    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            FishingPhase::Idle => "Idle",
            FishingPhase::Casting => "Casting",
            FishingPhase::Mooching => "Mooching",
        }
    }
}

/// Mutable record owned by a [`FishingParser`](crate::parser::FishingParser).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FishingState {
    /// Current activity.
    pub phase: FishingPhase,
    /// Spot of the last cast, absent when idle or the spot is undiscovered.
    pub current_spot: Option<String>,
    /// The last cast was at a hole missing from the fishing log.
    pub is_undiscovered_spot: bool,
    /// A mooch was attempted since the last cast or reset.
    pub is_mooching: bool,
}

impl FishingState {
    /// Return to the cleared, idle record.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether the record is in its initial state.
    pub fn is_cleared(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = ParseEvent::CastStarted {
            spot: None,
            undiscovered: true,
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "cast_started");
        assert_eq!(json["undiscovered"], true);
        assert_eq!(
            serde_json::to_value(ParseEvent::MoochAttempted).expect("serialize")["type"],
            "mooch_attempted"
        );
    }

    #[test]
    fn clear_restores_default() {
        let mut state = FishingState {
            phase: FishingPhase::Mooching,
            current_spot: Some("Upper Paths".to_string()),
            is_undiscovered_spot: false,
            is_mooching: true,
        };
        assert!(!state.is_cleared());
        state.clear();
        assert!(state.is_cleared());
        assert_eq!(state.phase, FishingPhase::Idle);
    }
}
