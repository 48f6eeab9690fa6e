// ⚙️ Configuration - where the files live and how to read them
//
// Every field has a default, so an empty file (or no file) reproduces the
// stock layout: Optimization_CSVs/output_{code}.csv + data_ba-results.csv.

use crate::error::ReconcileError;
use crate::locator::{DirectoryLocator, CODE_PLACEHOLDER};
use crate::matcher::FuzzyPolicy;
use crate::teams::{EntityGroup, GroupAlias, TeamRegistry};
use crate::values::ScoreRegime;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub prediction_file_pattern: String,
    pub ground_truth_file: PathBuf,
    pub score_regime: ScoreRegime,
    pub fuzzy_policy: FuzzyPolicy,

    /// Replaces the built-in MLB table when non-empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupEntry>,

    /// Replaces the built-in aliases when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<GroupAlias>>,
}

/// `[[groups]]` table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub code: String,
    pub name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("Optimization_CSVs"),
            prediction_file_pattern: format!("output_{}.csv", CODE_PLACEHOLDER),
            ground_truth_file: PathBuf::from("data_ba-results.csv"),
            score_regime: ScoreRegime::default(),
            fuzzy_policy: FuzzyPolicy::default(),
            groups: Vec::new(),
            aliases: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconcileError> {
        let config: AppConfig =
            toml::from_str(input).map_err(|e| ReconcileError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&input).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ReconcileError> {
        if !self.prediction_file_pattern.contains(CODE_PLACEHOLDER) {
            return Err(ReconcileError::Config(format!(
                "prediction_file_pattern must contain {}, got {:?}",
                CODE_PLACEHOLDER, self.prediction_file_pattern
            )));
        }

        if let ScoreRegime::Proportion { scale } = self.score_regime {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(ReconcileError::Config(format!(
                    "score_regime scale must be a positive number, got {}",
                    scale
                )));
            }
        }

        self.registry().map(|_| ())
    }

    /// Built-in MLB table unless groups or aliases are overridden.
    pub fn registry(&self) -> Result<TeamRegistry, ReconcileError> {
        if self.groups.is_empty() && self.aliases.is_none() {
            return Ok(TeamRegistry::mlb());
        }

        let builtin = TeamRegistry::mlb();
        let groups = if self.groups.is_empty() {
            builtin.groups().cloned().collect()
        } else {
            self.groups
                .iter()
                .map(|g| EntityGroup::new(&g.code, &g.name))
                .collect()
        };
        let aliases = match &self.aliases {
            Some(aliases) => aliases.clone(),
            None => builtin.aliases().to_vec(),
        };

        TeamRegistry::build(groups, aliases)
    }

    pub fn locator(&self) -> DirectoryLocator {
        DirectoryLocator::new(&self.data_dir, &self.prediction_file_pattern, &self.ground_truth_file)
    }
}
