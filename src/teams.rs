// 🏟️ Team Registry - code ↔ canonical name, with table-driven aliases
//
// Problem solved:
// - Prediction files are named by a code that may differ from the club's
//   current code ("OAK" on disk, "ATH" in the registry)
// - Ground-truth rows carry club names, sometimes historical ones
// - Two distinct clubs must never be merged by a guess, so every alias is
//   listed explicitly and scoped to the data source it was observed in

use crate::error::ReconcileError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// TYPES
// ============================================================================

/// A real-world club: short code plus canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityGroup {
    pub code: String,
    pub canonical_name: String,
}

impl EntityGroup {
    pub fn new(code: &str, canonical_name: &str) -> Self {
        EntityGroup {
            code: code.to_string(),
            canonical_name: canonical_name.to_string(),
        }
    }

    /// "Athletics (ATH)"
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.canonical_name, self.code)
    }
}

/// Where an identifier was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Prediction-file naming.
    PredictionFile,
    /// Ground-truth rows.
    GroundTruth,
}

/// Which sources an alias applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasScope {
    PredictionFile,
    GroundTruth,
    Both,
}

impl AliasScope {
    fn covers(&self, source: DataSource) -> bool {
        match (self, source) {
            (AliasScope::Both, _) => true,
            (AliasScope::PredictionFile, DataSource::PredictionFile) => true,
            (AliasScope::GroundTruth, DataSource::GroundTruth) => true,
            _ => false,
        }
    }

    fn overlaps(&self, other: AliasScope) -> bool {
        matches!((self, other), (AliasScope::Both, _) | (_, AliasScope::Both)) || *self == other
    }
}

/// Whether an alias stands in for a code or for a canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasKind {
    /// Alternate code, e.g. a file-naming code ("OAK").
    #[default]
    Code,
    /// Alternate name, e.g. a historical club name.
    Name,
}

/// An alternate identifier (code or name) for a canonical code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAlias {
    pub alternate: String,
    pub code: String,
    #[serde(rename = "source")]
    pub scope: AliasScope,
    #[serde(default)]
    pub kind: AliasKind,
}

impl GroupAlias {
    /// Alternate code.
    pub fn new(alternate: &str, code: &str, scope: AliasScope) -> Self {
        GroupAlias {
            alternate: alternate.to_string(),
            code: code.to_string(),
            scope,
            kind: AliasKind::Code,
        }
    }

    /// Alternate name.
    pub fn name(alternate: &str, code: &str, scope: AliasScope) -> Self {
        GroupAlias {
            kind: AliasKind::Name,
            ..Self::new(alternate, code, scope)
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Immutable bidirectional code/name table.
///
/// Built once at startup and shared by reference; there are no mutators
/// after `build`.
#[derive(Debug, Clone)]
pub struct TeamRegistry {
    by_code: BTreeMap<String, EntityGroup>,
    code_by_name: BTreeMap<String, String>,
    aliases: Vec<GroupAlias>,
}

impl TeamRegistry {
    /// Build a registry, rejecting duplicate codes/names and aliases that
    /// point at unknown codes, shadow a canonical code or name, or give one
    /// alternate two different targets in the same source.
    pub fn build(groups: Vec<EntityGroup>, aliases: Vec<GroupAlias>) -> Result<Self, ReconcileError> {
        let mut by_code = BTreeMap::new();
        let mut code_by_name = BTreeMap::new();

        for group in groups {
            if code_by_name.contains_key(&group.canonical_name) {
                return Err(ReconcileError::Config(format!(
                    "duplicate group name: {}",
                    group.canonical_name
                )));
            }
            code_by_name.insert(group.canonical_name.clone(), group.code.clone());

            if by_code.insert(group.code.clone(), group.clone()).is_some() {
                return Err(ReconcileError::Config(format!(
                    "duplicate group code: {}",
                    group.code
                )));
            }
        }

        for alias in &aliases {
            if !by_code.contains_key(&alias.code) {
                return Err(ReconcileError::Config(format!(
                    "alias {} points at unknown group {}",
                    alias.alternate, alias.code
                )));
            }
            if by_code.contains_key(&alias.alternate) {
                return Err(ReconcileError::Config(format!(
                    "alias {} shadows an existing group code",
                    alias.alternate
                )));
            }
            if code_by_name.contains_key(&alias.alternate) {
                return Err(ReconcileError::Config(format!(
                    "alias {} shadows an existing group name",
                    alias.alternate
                )));
            }
        }

        for (i, alias) in aliases.iter().enumerate() {
            let conflict = aliases[i + 1..].iter().find(|other| {
                other.alternate == alias.alternate
                    && other.code != alias.code
                    && other.scope.overlaps(alias.scope)
            });
            if let Some(other) = conflict {
                return Err(ReconcileError::Config(format!(
                    "alias {} points at both {} and {}",
                    alias.alternate, alias.code, other.code
                )));
            }
        }

        Ok(TeamRegistry {
            by_code,
            code_by_name,
            aliases,
        })
    }

    fn from_static(groups: &[(&str, &str)], aliases: Vec<GroupAlias>) -> Self {
        let by_code = groups
            .iter()
            .map(|(code, name)| (code.to_string(), EntityGroup::new(code, name)))
            .collect();
        let code_by_name = groups
            .iter()
            .map(|(code, name)| (name.to_string(), code.to_string()))
            .collect();

        TeamRegistry {
            by_code,
            code_by_name,
            aliases,
        }
    }

    /// The 30 MLB clubs, with the Athletics' file code and historical name.
    pub fn mlb() -> Self {
        let aliases = vec![
            // Prediction files for the Athletics are still named output_OAK.csv
            GroupAlias::new("OAK", "ATH", AliasScope::PredictionFile),
            // Older results exports use the pre-relocation name
            GroupAlias::name("Oakland Athletics", "ATH", AliasScope::GroundTruth),
        ];

        Self::from_static(MLB_TEAMS, aliases)
    }

    /// All groups, ordered by code.
    pub fn groups(&self) -> impl Iterator<Item = &EntityGroup> {
        self.by_code.values()
    }

    pub fn count(&self) -> usize {
        self.by_code.len()
    }

    pub fn aliases(&self) -> &[GroupAlias] {
        &self.aliases
    }

    pub fn group(&self, code: &str) -> Result<&EntityGroup, ReconcileError> {
        self.by_code
            .get(code)
            .ok_or_else(|| ReconcileError::UnknownGroup(code.to_string()))
    }

    /// Code → canonical name.
    pub fn canonical_name(&self, code: &str) -> Result<&str, ReconcileError> {
        self.group(code).map(|g| g.canonical_name.as_str())
    }

    /// Canonical name → code.
    pub fn code_for_name(&self, name: &str) -> Result<&str, ReconcileError> {
        self.code_by_name
            .get(name)
            .map(|c| c.as_str())
            .ok_or_else(|| ReconcileError::UnknownGroup(name.to_string()))
    }

    /// Resolve a code as it appears in `source` to the canonical code.
    ///
    /// Canonical codes resolve to themselves from any source. An alternate
    /// code only resolves from the source its alias is scoped to; name
    /// aliases are not codes and never resolve here.
    pub fn resolve_alias(&self, code: &str, source: DataSource) -> Result<&str, ReconcileError> {
        if let Some((canonical, _)) = self.by_code.get_key_value(code) {
            return Ok(canonical.as_str());
        }

        self.aliases
            .iter()
            .find(|a| a.kind == AliasKind::Code && a.alternate == code && a.scope.covers(source))
            .map(|a| a.code.as_str())
            .ok_or_else(|| ReconcileError::UnknownGroup(code.to_string()))
    }

    /// The code `source` uses for a canonical group.
    ///
    /// For `PredictionFile` this answers "which file do I open for X"; for
    /// `GroundTruth` it answers "which code do ground-truth rows use for X".
    /// Only `AliasKind::Code` aliases count here.
    pub fn source_code(&self, code: &str, source: DataSource) -> Result<&str, ReconcileError> {
        let group = self.group(code)?;

        let alternate = self.aliases.iter().find(|a| {
            a.code == group.code && a.kind == AliasKind::Code && a.scope.covers(source)
        });

        Ok(alternate
            .map(|a| a.alternate.as_str())
            .unwrap_or(group.code.as_str()))
    }

    /// Resolve a ground-truth group label (canonical name, scoped alias, or
    /// code) to the canonical code. `None` when nothing matches exactly.
    pub fn resolve_ground_truth_label(&self, label: &str) -> Option<&str> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        if let Some(code) = self.code_by_name.get(label) {
            return Some(code.as_str());
        }

        if let Some(alias) = self.aliases.iter().find(|a| {
            a.kind == AliasKind::Name && a.alternate == label && a.scope.covers(DataSource::GroundTruth)
        }) {
            return Some(alias.code.as_str());
        }

        self.resolve_alias(label, DataSource::GroundTruth).ok()
    }
}

impl Default for TeamRegistry {
    fn default() -> Self {
        Self::mlb()
    }
}

const MLB_TEAMS: &[(&str, &str)] = &[
    ("ARI", "Arizona Diamondbacks"),
    ("ATL", "Atlanta Braves"),
    ("BAL", "Baltimore Orioles"),
    ("BOS", "Boston Red Sox"),
    ("CHC", "Chicago Cubs"),
    ("CHW", "Chicago White Sox"),
    ("CIN", "Cincinnati Reds"),
    ("CLE", "Cleveland Guardians"),
    ("COL", "Colorado Rockies"),
    ("DET", "Detroit Tigers"),
    ("HOU", "Houston Astros"),
    ("KCR", "Kansas City Royals"),
    ("LAA", "Los Angeles Angels"),
    ("LAD", "Los Angeles Dodgers"),
    ("MIA", "Miami Marlins"),
    ("MIL", "Milwaukee Brewers"),
    ("MIN", "Minnesota Twins"),
    ("NYM", "New York Mets"),
    ("NYY", "New York Yankees"),
    ("ATH", "Athletics"),
    ("PHI", "Philadelphia Phillies"),
    ("PIT", "Pittsburgh Pirates"),
    ("SDP", "San Diego Padres"),
    ("SFG", "San Francisco Giants"),
    ("SEA", "Seattle Mariners"),
    ("STL", "St. Louis Cardinals"),
    ("TBR", "Tampa Bay Rays"),
    ("TEX", "Texas Rangers"),
    ("TOR", "Toronto Blue Jays"),
    ("WSN", "Washington Nationals"),
];

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mlb_registry_initialization() {
        let registry = TeamRegistry::mlb();
        assert_eq!(registry.count(), 30);
        assert_eq!(registry.canonical_name("BOS").unwrap(), "Boston Red Sox");
        assert_eq!(registry.code_for_name("Colorado Rockies").unwrap(), "COL");
    }

    #[test]
    fn test_groups_are_code_ordered() {
        let registry = TeamRegistry::mlb();
        let codes: Vec<&str> = registry.groups().map(|g| g.code.as_str()).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_unknown_code_is_an_error() {
        let registry = TeamRegistry::mlb();
        assert!(matches!(
            registry.canonical_name("XYZ"),
            Err(ReconcileError::UnknownGroup(code)) if code == "XYZ"
        ));
        assert!(registry.code_for_name("Montreal Expos").is_err());
        assert!(registry.resolve_alias("XYZ", DataSource::PredictionFile).is_err());
    }

    #[test]
    fn test_file_code_differs_from_registry_code() {
        let registry = TeamRegistry::mlb();

        assert_eq!(registry.source_code("ATH", DataSource::PredictionFile).unwrap(), "OAK");
        assert_eq!(registry.source_code("ATH", DataSource::GroundTruth).unwrap(), "ATH");
        assert_eq!(registry.source_code("BOS", DataSource::PredictionFile).unwrap(), "BOS");
    }

    #[test]
    fn test_one_way_alias_resolves_only_in_its_direction() {
        let registry = TeamRegistry::mlb();

        // OAK is only ever seen in prediction-file names
        assert_eq!(registry.resolve_alias("OAK", DataSource::PredictionFile).unwrap(), "ATH");
        assert!(matches!(
            registry.resolve_alias("OAK", DataSource::GroundTruth),
            Err(ReconcileError::UnknownGroup(_))
        ));

        // Canonical codes resolve from anywhere
        assert_eq!(registry.resolve_alias("ATH", DataSource::GroundTruth).unwrap(), "ATH");
    }

    #[test]
    fn test_two_way_alias_resolves_in_both_directions() {
        let registry = TeamRegistry::build(
            vec![EntityGroup::new("WSN", "Washington Nationals")],
            vec![GroupAlias::new("WAS", "WSN", AliasScope::Both)],
        )
        .unwrap();

        assert_eq!(registry.resolve_alias("WAS", DataSource::PredictionFile).unwrap(), "WSN");
        assert_eq!(registry.resolve_alias("WAS", DataSource::GroundTruth).unwrap(), "WSN");
        assert_eq!(registry.source_code("WSN", DataSource::PredictionFile).unwrap(), "WAS");
        assert_eq!(registry.source_code("WSN", DataSource::GroundTruth).unwrap(), "WAS");
    }

    #[test]
    fn test_ground_truth_labels() {
        let registry = TeamRegistry::mlb();

        assert_eq!(registry.resolve_ground_truth_label("Athletics"), Some("ATH"));
        assert_eq!(registry.resolve_ground_truth_label(" Oakland Athletics "), Some("ATH"));
        assert_eq!(registry.resolve_ground_truth_label("TEX"), Some("TEX"));
        assert_eq!(registry.resolve_ground_truth_label("OAK"), None);
        assert_eq!(registry.resolve_ground_truth_label("Boston"), None);
        assert_eq!(registry.resolve_ground_truth_label(""), None);
    }

    #[test]
    fn test_build_rejects_inconsistent_tables() {
        let dup_code = TeamRegistry::build(
            vec![EntityGroup::new("AAA", "One"), EntityGroup::new("AAA", "Two")],
            vec![],
        );
        assert!(matches!(dup_code, Err(ReconcileError::Config(_))));

        let dup_name = TeamRegistry::build(
            vec![EntityGroup::new("AAA", "One"), EntityGroup::new("BBB", "One")],
            vec![],
        );
        assert!(dup_name.is_err());

        let dangling = TeamRegistry::build(
            vec![EntityGroup::new("AAA", "One")],
            vec![GroupAlias::new("ZZZ", "QQQ", AliasScope::Both)],
        );
        assert!(dangling.is_err());

        let shadowing = TeamRegistry::build(
            vec![EntityGroup::new("AAA", "One"), EntityGroup::new("BBB", "Two")],
            vec![GroupAlias::new("BBB", "AAA", AliasScope::PredictionFile)],
        );
        assert!(shadowing.is_err());

        let shadowing_name = TeamRegistry::build(
            vec![EntityGroup::new("AAA", "One"), EntityGroup::new("BBB", "Two")],
            vec![GroupAlias::name("Two", "AAA", AliasScope::GroundTruth)],
        );
        assert!(matches!(shadowing_name, Err(ReconcileError::Config(_))));

        let two_targets = TeamRegistry::build(
            vec![
                EntityGroup::new("WSN", "Washington Nationals"),
                EntityGroup::new("ATH", "Athletics"),
            ],
            vec![
                GroupAlias::new("WAS", "WSN", AliasScope::Both),
                GroupAlias::new("WAS", "ATH", AliasScope::PredictionFile),
            ],
        );
        assert!(matches!(two_targets, Err(ReconcileError::Config(_))));
    }

    #[test]
    fn test_same_alternate_in_disjoint_sources_is_allowed() {
        let registry = TeamRegistry::build(
            vec![EntityGroup::new("AAA", "One"), EntityGroup::new("BBB", "Two")],
            vec![
                GroupAlias::new("XX", "AAA", AliasScope::PredictionFile),
                GroupAlias::new("XX", "BBB", AliasScope::GroundTruth),
            ],
        )
        .unwrap();

        assert_eq!(registry.resolve_alias("XX", DataSource::PredictionFile).unwrap(), "AAA");
        assert_eq!(registry.resolve_alias("XX", DataSource::GroundTruth).unwrap(), "BBB");
    }

    #[test]
    fn test_file_code_alias_is_used_whatever_its_spelling() {
        let registry = TeamRegistry::build(
            vec![EntityGroup::new("ATH", "Athletics")],
            vec![GroupAlias::new("Oak", "ATH", AliasScope::PredictionFile)],
        )
        .unwrap();

        assert_eq!(registry.source_code("ATH", DataSource::PredictionFile).unwrap(), "Oak");
        assert_eq!(registry.resolve_alias("Oak", DataSource::PredictionFile).unwrap(), "ATH");
    }

    #[test]
    fn test_name_alias_is_not_a_code() {
        let registry = TeamRegistry::mlb();

        assert_eq!(registry.source_code("ATH", DataSource::GroundTruth).unwrap(), "ATH");
        assert!(registry
            .resolve_alias("Oakland Athletics", DataSource::GroundTruth)
            .is_err());
        assert_eq!(registry.resolve_ground_truth_label("Oakland Athletics"), Some("ATH"));
    }

    #[test]
    fn test_builtin_table_passes_validation() {
        let builtin = TeamRegistry::mlb();
        let groups: Vec<EntityGroup> = builtin.groups().cloned().collect();
        let rebuilt = TeamRegistry::build(groups, builtin.aliases().to_vec()).unwrap();
        assert_eq!(rebuilt.count(), builtin.count());
    }

    #[test]
    fn test_display_name() {
        let group = EntityGroup::new("ATH", "Athletics");
        assert_eq!(group.display_name(), "Athletics (ATH)");
    }
}
