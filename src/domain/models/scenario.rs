use serde::{Deserialize, Serialize};
use std::fmt;

use super::oracle::OracleKind;
use super::timing::TimingProfile;

/// Scenario category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Well-formed input that must be transformed
    Positive,
    /// Adversarial or malformed input; only availability is guaranteed
    Negative,
    /// Live-update behavior of the widget while typing
    UiBehavior,
}

impl Category {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::UiBehavior => "ui_behavior",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "positive" | "pos" => Some(Self::Positive),
            "negative" | "neg" => Some(Self::Negative),
            "ui_behavior" | "ui" => Some(Self::UiBehavior),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scenario identifier of the form `<Category>_<Kind>_<NNNN>`, e.g. `Pos_Fun_0001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScenarioId(String);

impl ScenarioId {
    /// Parse and validate an identifier.
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidScenarioId> {
        let raw = raw.into();
        let mut parts = raw.split('_');
        let (Some(category), Some(kind), Some(sequence), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(InvalidScenarioId(raw));
        };

        let category_ok = category
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase())
            && category.chars().all(|c| c.is_ascii_alphabetic());
        let kind_ok = !kind.is_empty() && kind.chars().all(|c| c.is_ascii_alphanumeric());
        let sequence_ok = sequence.len() == 4 && sequence.chars().all(|c| c.is_ascii_digit());

        if category_ok && kind_ok && sequence_ok {
            Ok(Self(raw))
        } else {
            Err(InvalidScenarioId(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Category implied by the identifier prefix, if it uses a known one.
    ///
    /// `Pos_UI_*` is a UI behavior scenario, other `Pos_*` ids are positive
    /// and `Neg_*` ids are negative.
    pub fn implied_category(&self) -> Option<Category> {
        let mut parts = self.0.split('_');
        let prefix = parts.next()?;
        let kind = parts.next()?;
        if kind.eq_ignore_ascii_case("ui") {
            return Some(Category::UiBehavior);
        }
        match prefix {
            "Pos" => Some(Category::Positive),
            "Neg" => Some(Category::Negative),
            _ => None,
        }
    }
}

impl TryFrom<String> for ScenarioId {
    type Error = InvalidScenarioId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ScenarioId> for String {
    fn from(id: ScenarioId) -> Self {
        id.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier that does not follow `<Category>_<Kind>_<NNNN>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid scenario id '{0}': expected <Category>_<Kind>_<4-digit-sequence>")]
pub struct InvalidScenarioId(pub String);

const fn default_per_char_delay_ms() -> u64 {
    120
}

/// How the scenario input is written to the input surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ApplyMode {
    /// Replace the whole value in one step (bulk paste)
    #[default]
    Atomic,
    /// Type one character at a time
    Incremental {
        /// Delay between two keystrokes
        #[serde(default = "default_per_char_delay_ms")]
        per_char_delay_ms: u64,
        /// Character offsets after which the output is observed
        #[serde(default)]
        checkpoints: Vec<usize>,
    },
}

impl ApplyMode {
    pub const fn is_incremental(&self) -> bool {
        matches!(self, Self::Incremental { .. })
    }
}

/// One fully specified test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Scenario {
    pub id: ScenarioId,
    pub title: String,
    pub category: Category,
    pub input_text: String,
    pub apply_mode: ApplyMode,
    pub oracle: OracleKind,
    pub timing: TimingProfile,
}

impl Scenario {
    /// Input split into the segments typed between two observations.
    ///
    /// Atomic scenarios have exactly one stage. Checkpoints beyond the end of
    /// the text, or not strictly increasing, are ignored.
    pub fn stages(&self) -> Vec<&str> {
        let ApplyMode::Incremental { checkpoints, .. } = &self.apply_mode else {
            return vec![self.input_text.as_str()];
        };

        let char_count = self.input_text.chars().count();
        let mut stages = Vec::with_capacity(checkpoints.len() + 1);
        let mut start_byte = 0;
        let mut last_offset = 0;

        for &offset in checkpoints {
            if offset <= last_offset || offset >= char_count {
                continue;
            }
            let end_byte = byte_offset(&self.input_text, offset);
            stages.push(&self.input_text[start_byte..end_byte]);
            start_byte = end_byte;
            last_offset = offset;
        }
        stages.push(&self.input_text[start_byte..]);
        stages
    }
}

fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ui_scenario(text: &str, checkpoints: Vec<usize>) -> Scenario {
        Scenario {
            id: ScenarioId::parse("Pos_UI_0001").unwrap(),
            title: "Real-time output".to_string(),
            category: Category::UiBehavior,
            input_text: text.to_string(),
            apply_mode: ApplyMode::Incremental {
                per_char_delay_ms: 120,
                checkpoints,
            },
            oracle: OracleKind::MonotonicGrowth,
            timing: TimingProfile::for_category(Category::UiBehavior),
        }
    }

    #[test]
    fn test_parse_valid_ids() {
        for raw in ["Pos_Fun_0001", "Neg_Fun_0010", "Pos_UI_0001", "Edge_Perf2_9999"] {
            assert!(ScenarioId::parse(raw).is_ok(), "{raw} should parse");
        }
    }

    #[test]
    fn test_parse_invalid_ids() {
        for raw in ["", "Pos_Fun_1", "pos_Fun_0001", "Pos_Fun_00012", "Pos__0001", "Pos_Fun_0001_x", "Pos_Fun_00a1"] {
            assert!(ScenarioId::parse(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_implied_category() {
        let id = |s: &str| ScenarioId::parse(s).unwrap();
        assert_eq!(id("Pos_Fun_0001").implied_category(), Some(Category::Positive));
        assert_eq!(id("Neg_Fun_0001").implied_category(), Some(Category::Negative));
        assert_eq!(id("Pos_UI_0001").implied_category(), Some(Category::UiBehavior));
        assert_eq!(id("Edge_Fun_0001").implied_category(), None);
    }

    #[test]
    fn test_id_deserialize_rejects_bad_pattern() {
        let result: Result<ScenarioId, _> = serde_json::from_str("\"not-an-id\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(Category::from_str("UI"), Some(Category::UiBehavior));
        assert_eq!(Category::from_str("ui-behavior"), Some(Category::UiBehavior));
        assert_eq!(Category::from_str("Negative"), Some(Category::Negative));
        assert_eq!(Category::from_str("structural"), None);
    }

    #[test]
    fn test_stages_split_on_checkpoint() {
        let scenario = ui_scenario("naan veetukku poren", vec![4]);
        assert_eq!(scenario.stages(), vec!["naan", " veetukku poren"]);
    }

    #[test]
    fn test_stages_respect_multibyte_characters() {
        let scenario = ui_scenario("naan வீடு", vec![6]);
        assert_eq!(scenario.stages(), vec!["naan வ", "ீடு"]);
    }

    #[test]
    fn test_stages_ignore_out_of_range_checkpoints() {
        let scenario = ui_scenario("abc", vec![0, 5, 2, 1]);
        assert_eq!(scenario.stages(), vec!["ab", "c"]);
    }

    #[test]
    fn test_atomic_has_single_stage() {
        let mut scenario = ui_scenario("naan", vec![2]);
        scenario.apply_mode = ApplyMode::Atomic;
        assert_eq!(scenario.stages(), vec!["naan"]);
    }
}
