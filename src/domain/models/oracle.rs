use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Writing system whose Unicode block the ScriptPresence oracle looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Script {
    #[default]
    Tamil,
    Sinhala,
    Devanagari,
}

impl Script {
    /// Unicode block of the script.
    pub const fn block(&self) -> RangeInclusive<char> {
        match self {
            Self::Tamil => '\u{0B80}'..='\u{0BFF}',
            Self::Sinhala => '\u{0D80}'..='\u{0DFF}',
            Self::Devanagari => '\u{0900}'..='\u{097F}',
        }
    }

    pub fn contains(&self, c: char) -> bool {
        self.block().contains(&c)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tamil => "tamil",
            Self::Sinhala => "sinhala",
            Self::Devanagari => "devanagari",
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of success predicates a scenario can be judged by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OracleKind {
    /// Output contains at least one code point of the target script
    ScriptPresence {
        #[serde(default)]
        script: Script,
    },
    /// Any readable value passes, including the empty string
    NonCrash,
    /// Output still contains a literal token
    SubstringPreserved { token: String },
    /// A later incremental observation differs from the earlier one
    MonotonicGrowth,
}

impl OracleKind {
    pub const fn tamil() -> Self {
        Self::ScriptPresence {
            script: Script::Tamil,
        }
    }

    pub fn substring(token: impl Into<String>) -> Self {
        Self::SubstringPreserved {
            token: token.into(),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::ScriptPresence { .. } => "script_presence",
            Self::NonCrash => "non_crash",
            Self::SubstringPreserved { .. } => "substring_preserved",
            Self::MonotonicGrowth => "monotonic_growth",
        }
    }

    /// Evaluate the oracle on an observed value.
    ///
    /// `previous` is only read by MonotonicGrowth, which never holds without
    /// an earlier observation to compare against.
    pub fn holds(&self, observed: &str, previous: Option<&str>) -> bool {
        match self {
            Self::ScriptPresence { script } => observed.chars().any(|c| script.contains(c)),
            Self::NonCrash => true,
            Self::SubstringPreserved { token } => observed.contains(token.as_str()),
            Self::MonotonicGrowth => previous.is_some_and(|earlier| earlier != observed),
        }
    }

    /// Whether the oracle needs the previous observation as an argument.
    pub const fn is_stateful(&self) -> bool {
        matches!(self, Self::MonotonicGrowth)
    }
}

impl fmt::Display for OracleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScriptPresence { script } => write!(f, "script_presence({script})"),
            Self::SubstringPreserved { token } => write!(f, "substring_preserved({token:?})"),
            other => f.write_str(other.name()),
        }
    }
}
