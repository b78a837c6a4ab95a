// ABOUTME: Challenge-type driven auto-population of evaluation phases
// Fills default phases for a newly chosen challenge type without clobbering entered phases

use crate::models::EntityDraft;
use crate::schema::firm::{CHALLENGE, PHASES, PHASE_COUNT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown challenge type: {0}")]
pub struct UnknownChallengeType(pub String);

/// Closed set of evaluation programs a firm can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChallengeType {
    SinglePhase,
    TwoPhase,
    ThreePhase,
    /// Instant funding, no evaluation at all
    Instant,
}

/// Default sub-structure for a challenge type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseLayout {
    /// Ordered phase names; the count is the slice length
    Phases(&'static [&'static str]),
    NoPhases,
}

impl PhaseLayout {
    pub fn count(&self) -> usize {
        match self {
            PhaseLayout::Phases(names) => names.len(),
            PhaseLayout::NoPhases => 0,
        }
    }
}

impl ChallengeType {
    pub fn all() -> &'static [ChallengeType] {
        &[
            Self::SinglePhase,
            Self::TwoPhase,
            Self::ThreePhase,
            Self::Instant,
        ]
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::SinglePhase => "single-phase",
            Self::TwoPhase => "two-phase",
            Self::ThreePhase => "three-phase",
            Self::Instant => "instant",
        }
    }

    pub fn phase_layout(&self) -> PhaseLayout {
        match self {
            Self::SinglePhase => PhaseLayout::Phases(&["Evaluation"]),
            Self::TwoPhase => PhaseLayout::Phases(&["Phase 1", "Phase 2"]),
            Self::ThreePhase => PhaseLayout::Phases(&["Phase 1", "Phase 2", "Phase 3"]),
            Self::Instant => PhaseLayout::NoPhases,
        }
    }

    /// Blank phase templates in order, `stepNumber` starting at 1
    pub fn default_phases(&self) -> Vec<EvaluationPhase> {
        match self.phase_layout() {
            PhaseLayout::Phases(names) => names
                .iter()
                .enumerate()
                .map(|(i, name)| EvaluationPhase::blank(i + 1, name))
                .collect(),
            PhaseLayout::NoPhases => Vec::new(),
        }
    }
}

impl FromStr for ChallengeType {
    type Err = UnknownChallengeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChallengeType::all()
            .iter()
            .copied()
            .find(|t| t.tag() == s.trim())
            .ok_or_else(|| UnknownChallengeType(s.to_string()))
    }
}

impl std::fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// One stage of an evaluation program as edited in the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationPhase {
    pub step_number: usize,
    pub name: String,
    pub profit_target: String,
    pub max_daily_loss: String,
    pub max_total_loss: String,
    pub min_trading_days: String,
    pub time_limit: String,
}

impl EvaluationPhase {
    pub fn blank(step_number: usize, name: &str) -> Self {
        Self {
            step_number,
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Why auto-population is being asked to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationContext {
    /// The user picked a challenge type
    Interactive,
    /// An edit session is loading the stored record
    Hydrating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulationOutcome {
    /// Empty phase list filled with the canonical templates
    Applied { challenge_type: ChallengeType, count: usize },
    /// Instant funding selected; existing phases removed and the count zeroed
    /// (`removed: 0` leaves the draft untouched)
    Cleared { removed: usize },
    /// Phases already entered were left alone
    Preserved { existing: usize, canonical: usize },
    /// Nothing to do (unknown tag or hydration)
    Skipped,
}

impl PopulationOutcome {
    /// `(phases in list, phases the challenge type expects)` when they disagree
    pub fn count_mismatch(&self) -> Option<(usize, usize)> {
        match *self {
            PopulationOutcome::Preserved { existing, canonical } if existing != canonical => {
                Some((existing, canonical))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoPopulationEngine;

impl AutoPopulationEngine {
    pub fn new() -> Self {
        Self
    }

    /// React to the challenge type becoming `tag`.
    ///
    /// A non-empty phase list is never overwritten; only switching to instant
    /// funding empties it (and zeroes the count, when there was anything to clear). The phase count follows the canonical count of the
    /// chosen type even when existing phases are kept.
    pub fn apply(
        &self,
        draft: &mut EntityDraft,
        tag: &str,
        context: PopulationContext,
    ) -> PopulationOutcome {
        if context == PopulationContext::Hydrating {
            debug!("Skipping phase auto-population while hydrating edit session");
            return PopulationOutcome::Skipped;
        }

        let challenge_type = match ChallengeType::from_str(tag) {
            Ok(t) => t,
            Err(e) => {
                debug!("{}; leaving phases untouched", e);
                return PopulationOutcome::Skipped;
            }
        };

        let existing = draft.list(CHALLENGE, PHASES).len();

        match challenge_type.phase_layout() {
            PhaseLayout::NoPhases => {
                // An already-empty list keeps whatever phase count it has
                if existing > 0 {
                    draft.list_mut(CHALLENGE, PHASES).clear();
                    draft.set(Some(CHALLENGE), PHASE_COUNT, Value::from(0));
                    info!("Cleared {} phases for {}", existing, challenge_type);
                }
                PopulationOutcome::Cleared { removed: existing }
            }
            layout @ PhaseLayout::Phases(_) => {
                let canonical = layout.count();
                draft.set(Some(CHALLENGE), PHASE_COUNT, Value::from(canonical));

                if existing > 0 {
                    if existing != canonical {
                        warn!(
                            "Kept {} existing phases although {} expects {}",
                            existing, challenge_type, canonical
                        );
                    }
                    return PopulationOutcome::Preserved { existing, canonical };
                }

                let phases = draft.list_mut(CHALLENGE, PHASES);
                phases.extend(
                    challenge_type
                        .default_phases()
                        .iter()
                        .map(EvaluationPhase::to_value),
                );
                debug!("Applied {} default phases for {}", canonical, challenge_type);
                PopulationOutcome::Applied {
                    challenge_type,
                    count: canonical,
                }
            }
        }
    }
}
