//! Scenario catalog.
//!
//! Ordered, immutable collection of scenarios. Records come from the builtin
//! suite or a YAML file and are validated once, at build time: a catalog that
//! builds is a catalog whose every oracle resolves.

pub mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

use crate::domain::errors::CatalogError;
use crate::domain::models::{
    ApplyMode, Category, OracleKind, Scenario, ScenarioId, TimingDefaults, TimingProfile,
};
use crate::services::oracle;

/// Scenario as written in a catalog file, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioRecord {
    pub id: String,

    #[serde(default)]
    pub title: String,

    pub category: Category,

    #[serde(default)]
    pub input_text: String,

    #[serde(default)]
    pub apply_mode: ApplyMode,

    pub oracle: OracleKind,

    /// Falls back to the category default when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingProfile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    scenarios: Vec<ScenarioRecord>,
}

/// Validated, ordered scenarios.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    /// Validate records and build the catalog.
    ///
    /// Fails on the first malformed id, duplicate id, category mismatch,
    /// invalid timing profile or unresolvable oracle.
    pub fn build(
        records: Vec<ScenarioRecord>,
        defaults: &TimingDefaults,
    ) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(records.len());
        let mut scenarios = Vec::with_capacity(records.len());

        for record in records {
            let id = ScenarioId::parse(record.id)?;
            if !seen.insert(id.clone()) {
                return Err(CatalogError::DuplicateId(id));
            }

            if let Some(implied) = id.implied_category() {
                if implied != record.category {
                    return Err(CatalogError::CategoryMismatch {
                        id,
                        declared: record.category,
                        implied,
                    });
                }
            }

            let timing = record
                .timing
                .unwrap_or_else(|| defaults.for_category(record.category));
            if let Err(source) = timing.validate() {
                return Err(CatalogError::InvalidTiming { id, source });
            }
            if !timing.has_recommended_ratio() {
                warn!(
                    scenario_id = %id,
                    poll_ms = timing.poll_interval_ms,
                    settle_ms = timing.settle_timeout_ms,
                    "poll interval is coarse relative to the settle timeout"
                );
            }

            let scenario = Scenario {
                id,
                title: record.title,
                category: record.category,
                input_text: record.input_text,
                apply_mode: record.apply_mode,
                oracle: record.oracle,
                timing,
            };

            if let Err(reason) = oracle::resolve(&scenario) {
                return Err(CatalogError::UnresolvableOracle {
                    id: scenario.id,
                    reason,
                });
            }
            scenarios.push(scenario);
        }

        debug!(count = scenarios.len(), "catalog built");
        Ok(Self { scenarios })
    }

    /// The builtin transliteration suite.
    pub fn builtin(defaults: &TimingDefaults) -> Result<Self, CatalogError> {
        Self::build(builtin::records(), defaults)
    }

    /// Parse a YAML catalog document with a top-level `scenarios` list.
    pub fn from_yaml_str(yaml: &str, defaults: &TimingDefaults) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::build(file.scenarios, defaults)
    }

    /// Load a YAML catalog file.
    pub fn load(path: impl AsRef<Path>, defaults: &TimingDefaults) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml, defaults)
    }

    /// Serialize back to the YAML catalog format.
    pub fn to_yaml(&self) -> Result<String, CatalogError> {
        let file = CatalogFile {
            scenarios: self
                .scenarios
                .iter()
                .map(|s| ScenarioRecord {
                    id: s.id.to_string(),
                    title: s.title.clone(),
                    category: s.category,
                    input_text: s.input_text.clone(),
                    apply_mode: s.apply_mode.clone(),
                    oracle: s.oracle.clone(),
                    timing: Some(s.timing),
                })
                .collect(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }

    /// Subset matching a category and/or id prefix, in catalog order.
    #[must_use]
    pub fn filter(&self, category: Option<Category>, id_prefix: Option<&str>) -> Self {
        let scenarios = self
            .scenarios
            .iter()
            .filter(|s| category.map_or(true, |c| s.category == c))
            .filter(|s| id_prefix.map_or(true, |p| s.id.as_str().starts_with(p)))
            .cloned()
            .collect();
        Self { scenarios }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id.as_str() == id)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scenario> {
        self.scenarios.iter()
    }
}

impl<'a> IntoIterator for &'a ScenarioCatalog {
    type Item = &'a Scenario;
    type IntoIter = std::slice::Iter<'a, Scenario>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenarios.iter()
    }
}
