//! Scenario oracle set.
//!
//! Turns an [`OracleKind`] into the predicate handed to the poller, checks
//! the secondary invariants a satisfied oracle must still respect, and maps
//! an unsatisfied oracle to the matching fault.

use std::time::Duration;

use crate::domain::errors::ScenarioFault;
use crate::domain::models::{ApplyMode, OracleKind, Scenario};

/// Oracle bound to one scenario and, for MonotonicGrowth, to the earlier
/// observation it compares against.
#[derive(Debug, Clone)]
pub struct BoundOracle<'a> {
    kind: &'a OracleKind,
    previous: Option<String>,
}

impl<'a> BoundOracle<'a> {
    pub const fn new(kind: &'a OracleKind) -> Self {
        Self {
            kind,
            previous: None,
        }
    }

    /// Thread the previous observation through explicitly.
    #[must_use]
    pub fn with_previous(mut self, previous: impl Into<String>) -> Self {
        self.previous = Some(previous.into());
        self
    }

    pub const fn kind(&self) -> &OracleKind {
        self.kind
    }

    pub fn holds(&self, observed: &str) -> bool {
        self.kind.holds(observed, self.previous.as_deref())
    }

    /// Predicate the poller waits on.
    ///
    /// A MonotonicGrowth output that was cleared after the checkpoint is an
    /// intermediate debounced state, so polling continues past it.
    pub fn settled(&self, observed: &str) -> bool {
        if matches!(self.kind, OracleKind::MonotonicGrowth)
            && observed.is_empty()
            && self.previous.as_deref().is_some_and(|p| !p.is_empty())
        {
            return false;
        }
        self.holds(observed)
    }

    /// Secondary invariants a value must respect once the oracle held.
    ///
    /// ScriptPresence holding on an empty input means the wrong oracle was
    /// chosen for the scenario.
    pub fn check_settled(&self, scenario: &Scenario, observed: &str) -> Result<(), ScenarioFault> {
        match self.kind {
            OracleKind::ScriptPresence { script } if scenario.input_text.trim().is_empty() => {
                Err(ScenarioFault::OracleMismatch {
                    reason: format!("{script} script present although the input was empty"),
                    observed: observed.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Fault for an oracle that never held within the settle budget.
    #[allow(clippy::cast_possible_truncation)]
    pub fn timeout_fault(&self, last_observed: Option<String>, elapsed: Duration) -> ScenarioFault {
        let elapsed_ms = elapsed.as_millis() as u64;
        match self.kind {
            OracleKind::ScriptPresence { script } => ScenarioFault::TransformationAbsent {
                script: *script,
                last_observed,
                elapsed_ms,
            },
            other => ScenarioFault::TimeoutExceeded {
                oracle: other.to_string(),
                last_observed,
                elapsed_ms,
            },
        }
    }
}

/// Check that a scenario's oracle can be evaluated at all.
///
/// Run at catalog-build time so an unusable oracle aborts before any
/// scenario executes.
pub fn resolve(scenario: &Scenario) -> Result<(), String> {
    match &scenario.oracle {
        OracleKind::SubstringPreserved { token } if token.is_empty() => {
            Err("substring_preserved needs a non-empty token".to_string())
        }
        OracleKind::SubstringPreserved { token } if !scenario.input_text.contains(token.as_str()) => {
            Err(format!("token {token:?} does not occur in the input text"))
        }
        OracleKind::MonotonicGrowth => match &scenario.apply_mode {
            ApplyMode::Atomic => {
                Err("monotonic_growth needs incremental apply mode".to_string())
            }
            ApplyMode::Incremental { .. } if scenario.stages().len() < 2 => Err(
                "monotonic_growth needs at least one checkpoint inside the input text".to_string(),
            ),
            ApplyMode::Incremental { .. } => Ok(()),
        },
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{FaultKind, ScenarioId, Script, TimingProfile};

    fn scenario(id: &str, input: &str, oracle: OracleKind, apply_mode: ApplyMode) -> Scenario {
        let id = ScenarioId::parse(id).unwrap();
        let category = id.implied_category().unwrap();
        Scenario {
            id,
            title: "test".to_string(),
            category,
            input_text: input.to_string(),
            apply_mode,
            oracle,
            timing: TimingProfile::for_category(category),
        }
    }

    fn incremental(checkpoints: Vec<usize>) -> ApplyMode {
        ApplyMode::Incremental {
            per_char_delay_ms: 120,
            checkpoints,
        }
    }

    #[test]
    fn test_bound_script_presence() {
        let oracle = OracleKind::tamil();
        let bound = BoundOracle::new(&oracle);
        assert!(bound.holds("நான்"));
        assert!(!bound.holds("naan"));
        assert_eq!(bound.kind(), &oracle);
    }

    #[test]
    fn test_previous_is_threaded_explicitly() {
        let oracle = OracleKind::MonotonicGrowth;
        let first = BoundOracle::new(&oracle);
        assert!(!first.holds("நான்"));

        let second = BoundOracle::new(&oracle).with_previous("நான்");
        assert!(!second.holds("நான்"));
        assert!(second.holds("நான் வீட்டுக்கு போறேன்"));
    }

    #[test]
    fn test_script_presence_on_empty_input_is_mismatch() {
        let oracle = OracleKind::tamil();
        let s = scenario("Neg_Fun_0010", "", oracle.clone(), ApplyMode::Atomic);
        let fault = BoundOracle::new(&oracle).check_settled(&s, "அ").unwrap_err();
        assert_eq!(fault.kind(), FaultKind::OracleMismatch);
        assert_eq!(fault.last_observed(), Some("அ"));
    }

    #[test]
    fn test_non_crash_on_empty_input_is_fine() {
        let oracle = OracleKind::NonCrash;
        let s = scenario("Neg_Fun_0010", "", oracle.clone(), ApplyMode::Atomic);
        assert!(BoundOracle::new(&oracle).check_settled(&s, "").is_ok());
    }

    #[test]
    fn test_cleared_output_keeps_polling() {
        let oracle = OracleKind::MonotonicGrowth;
        let s = scenario("Pos_UI_0001", "naan veetukku", oracle.clone(), incremental(vec![4]));
        let bound = BoundOracle::new(&oracle).with_previous("நான்");
        assert!(bound.holds(""));
        assert!(!bound.settled(""));
        assert!(bound.settled("நான் வீட்டுக்கு"));
        assert!(bound.check_settled(&s, "நான் வீட்டுக்கு").is_ok());

        let fresh = BoundOracle::new(&oracle).with_previous("");
        assert!(!fresh.settled(""));
    }

    #[test]
    fn test_timeout_fault_by_oracle() {
        let tamil = OracleKind::tamil();
        let fault = BoundOracle::new(&tamil).timeout_fault(Some("naan".into()), Duration::from_secs(15));
        assert!(matches!(
            fault,
            ScenarioFault::TransformationAbsent {
                script: Script::Tamil,
                elapsed_ms: 15_000,
                ..
            }
        ));

        let growth = OracleKind::MonotonicGrowth;
        let fault = BoundOracle::new(&growth).timeout_fault(Some("நான்".into()), Duration::from_secs(15));
        assert_eq!(fault.kind(), FaultKind::TimeoutExceeded);
        assert_eq!(fault.last_observed(), Some("நான்"));
    }

    #[test]
    fn test_resolve_rejects_unusable_oracles() {
        let empty_token = scenario("Neg_Fun_0007", "order 42", OracleKind::substring(""), ApplyMode::Atomic);
        assert!(resolve(&empty_token).is_err());

        let foreign_token = scenario("Neg_Fun_0007", "order 42", OracleKind::substring("43"), ApplyMode::Atomic);
        assert!(resolve(&foreign_token).is_err());

        let atomic_growth = scenario("Pos_UI_0001", "naan", OracleKind::MonotonicGrowth, ApplyMode::Atomic);
        assert!(resolve(&atomic_growth).is_err());

        let no_checkpoint = scenario("Pos_UI_0001", "naan", OracleKind::MonotonicGrowth, incremental(vec![]));
        assert!(resolve(&no_checkpoint).is_err());

        let ok = scenario("Pos_UI_0001", "naan poren", OracleKind::MonotonicGrowth, incremental(vec![4]));
        assert!(resolve(&ok).is_ok());
    }
}
