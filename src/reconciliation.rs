// ⚖️ Reconciliation Engine - predictions vs. what actually happened
//
// For one group:
//   resolve code → open prediction file → filter ground truth to the group
//   → match each prediction in file order
//
// A missing or malformed prediction file fails that group only. Missing
// ground truth does not fail anything: every prediction comes back NONE.

use crate::config::AppConfig;
use crate::error::ReconcileError;
use crate::format::TableFormat;
use crate::ground_truth::{ActualOutcomeRecord, GroundTruth};
use crate::locator::ArtifactLocator;
use crate::matcher::{EntityMatcher, MatchKind, MatchResult};
use crate::parser::load_predictions;
use crate::teams::{DataSource, EntityGroup, TeamRegistry};
use crate::values::{Aggregate, ScoreRegime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

// ============================================================================
// RECONCILIATION REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciliation {
    pub group: EntityGroup,

    /// Export variant the prediction file was read as.
    pub format: TableFormat,

    /// One entry per prediction, in file order.
    pub results: Vec<MatchResult>,

    /// The group's full ground truth, including outcomes nobody predicted.
    pub outcomes: Vec<ActualOutcomeRecord>,

    pub ground_truth_available: bool,
    pub score_regime: ScoreRegime,
    pub reconciled_at: chrono::DateTime<chrono::Utc>,
}

/// One round of the draft, with the prediction made for that slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSlot {
    pub round: String,
    pub picks: Vec<RoundPick>,

    /// `None` once the model has run out of predictions.
    pub prediction: Option<MatchResult>,
}

impl RoundSlot {
    pub fn model_applied(&self) -> bool {
        self.prediction.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundPick {
    pub outcome: ActualOutcomeRecord,

    /// Some prediction matched this outcome.
    pub predicted: bool,
}

impl Reconciliation {
    pub fn matched_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_matched()).count()
    }

    pub fn count_by_kind(&self, kind: MatchKind) -> usize {
        self.results.iter().filter(|r| r.match_kind == kind).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} predictions ({}), {} exact, {} fuzzy, {} unmatched, {} outcomes{}",
            self.group.display_name(),
            self.results.len(),
            self.format.name(),
            self.count_by_kind(MatchKind::Exact),
            self.count_by_kind(MatchKind::Fuzzy),
            self.count_by_kind(MatchKind::None),
            self.outcomes.len(),
            if self.ground_truth_available {
                ""
            } else {
                " (ground truth unavailable)"
            }
        )
    }

    /// Whether any prediction was matched to this outcome.
    pub fn is_predicted(&self, outcome: &ActualOutcomeRecord) -> bool {
        self.results
            .iter()
            .filter_map(|r| r.outcome.as_ref())
            .any(|o| o.row_index == outcome.row_index)
    }

    /// Outcomes ordered by pick number, unknown picks last.
    pub fn outcomes_by_pick(&self) -> Vec<&ActualOutcomeRecord> {
        let mut ordered: Vec<&ActualOutcomeRecord> = self.outcomes.iter().collect();
        ordered.sort_by(|a, b| a.cmp_by_sequence(b));
        ordered
    }

    /// Outcomes grouped by round (in pick order), slot i paired with
    /// prediction i.
    pub fn rounds(&self) -> Vec<RoundSlot> {
        let mut slots: Vec<RoundSlot> = Vec::new();

        for outcome in self.outcomes_by_pick() {
            let pick = RoundPick {
                outcome: outcome.clone(),
                predicted: self.is_predicted(outcome),
            };

            match slots.iter_mut().find(|s| s.round == outcome.sequence_major) {
                Some(slot) => slot.picks.push(pick),
                None => slots.push(RoundSlot {
                    round: outcome.sequence_major.clone(),
                    picks: vec![pick],
                    prediction: None,
                }),
            }
        }

        for (slot, result) in slots.iter_mut().zip(&self.results) {
            slot.prediction = Some(result.clone());
        }

        slots
    }

    /// Observed amounts across the group's outcomes.
    pub fn outcome_amounts(&self) -> Aggregate {
        Aggregate::from_values(self.outcomes.iter().map(|o| o.amount))
    }

    /// Raw prediction scores.
    pub fn score_summary(&self) -> Aggregate {
        Aggregate::from_values(self.results.iter().map(|r| r.prediction.score))
    }

    /// Prediction scores projected to money under the report's regime.
    pub fn projected_amounts(&self) -> Aggregate {
        Aggregate::from_values(
            self.results
                .iter()
                .map(|r| r.projected_amount(&self.score_regime)),
        )
    }
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

pub struct ReconciliationEngine {
    registry: Arc<TeamRegistry>,
    locator: Box<dyn ArtifactLocator>,

    /// Loaded once; `None` when the file was missing or unreadable.
    ground_truth: Option<GroundTruth>,

    matcher: EntityMatcher,
    regime: ScoreRegime,
}

impl ReconciliationEngine {
    /// Build an engine, loading ground truth through the locator.
    pub fn new(registry: Arc<TeamRegistry>, locator: Box<dyn ArtifactLocator>) -> Self {
        let ground_truth = match Self::load_ground_truth(&registry, locator.as_ref()) {
            Ok(truth) => Some(truth),
            Err(e) => {
                warn!(error = %e, "ground truth unavailable, every prediction will be unmatched");
                None
            }
        };

        ReconciliationEngine {
            registry,
            locator,
            ground_truth,
            matcher: EntityMatcher::default(),
            regime: ScoreRegime::default(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ReconcileError> {
        let registry = Arc::new(config.registry()?);
        let engine = Self::new(registry, Box::new(config.locator()))
            .with_matcher(EntityMatcher::new(config.fuzzy_policy))
            .with_regime(config.score_regime);
        Ok(engine)
    }

    /// Read the ground-truth file the locator points at.
    pub fn load_ground_truth(
        registry: &TeamRegistry,
        locator: &dyn ArtifactLocator,
    ) -> Result<GroundTruth, ReconcileError> {
        let path = locator.ground_truth_path();
        GroundTruth::from_path(&path, registry)
            .map_err(|source| ReconcileError::GroundTruth { path, source })
    }

    pub fn with_ground_truth(mut self, ground_truth: Option<GroundTruth>) -> Self {
        self.ground_truth = ground_truth;
        self
    }

    pub fn with_matcher(mut self, matcher: EntityMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_regime(mut self, regime: ScoreRegime) -> Self {
        self.regime = regime;
        self
    }

    pub fn registry(&self) -> &TeamRegistry {
        &self.registry
    }

    pub fn ground_truth(&self) -> Option<&GroundTruth> {
        self.ground_truth.as_ref()
    }

    /// Reconcile one group, identified by canonical code or file code.
    pub fn reconcile(&self, group_identifier: &str) -> Result<Reconciliation, ReconcileError> {
        let code = self
            .registry
            .resolve_alias(group_identifier.trim(), DataSource::PredictionFile)?;
        let group = self.registry.group(code)?.clone();

        let file_code = self.registry.source_code(&group.code, DataSource::PredictionFile)?;
        let path = self.locator.prediction_path(file_code);
        if !self.locator.prediction_exists(file_code) {
            return Err(ReconcileError::FileNotAvailable {
                group: group.code,
                path,
            });
        }

        let predictions = match load_predictions(&path) {
            Ok(set) => set,
            Err(source) => {
                return Err(ReconcileError::Prediction {
                    group: group.code,
                    path,
                    source,
                })
            }
        };

        let outcomes = self
            .ground_truth
            .as_ref()
            .map(|truth| truth.for_group(&group.code))
            .unwrap_or_default();

        let results = self.matcher.match_all(&predictions.records, &outcomes);

        let report = Reconciliation {
            group,
            format: predictions.format,
            results,
            outcomes,
            ground_truth_available: self.ground_truth.is_some(),
            score_regime: self.regime,
            reconciled_at: chrono::Utc::now(),
        };

        info!(
            group = %report.group.code,
            predictions = report.results.len(),
            matched = report.matched_count(),
            outcomes = report.outcomes.len(),
            "group reconciled"
        );

        Ok(report)
    }

    /// Reconcile every registered group; one failure never stops the rest.
    pub fn reconcile_all(&self) -> Vec<(String, Result<Reconciliation, ReconcileError>)> {
        self.registry
            .groups()
            .map(|g| (g.code.clone(), self.reconcile(&g.code)))
            .collect()
    }

    /// Canonical codes whose prediction file exists, in code order.
    pub fn available_groups(&self) -> Vec<String> {
        self.registry
            .groups()
            .filter(|g| {
                self.registry
                    .source_code(&g.code, DataSource::PredictionFile)
                    .map(|file_code| self.locator.prediction_exists(file_code))
                    .unwrap_or(false)
            })
            .map(|g| g.code.clone())
            .collect()
    }

    /// Where did this entity actually go? Searches every group.
    pub fn locate(&self, entity_name: &str) -> Option<(&ActualOutcomeRecord, MatchKind)> {
        let truth = self.ground_truth.as_ref()?;
        match self.matcher.find(entity_name, truth.records()) {
            (Some(outcome), kind) => Some((outcome, kind)),
            (None, _) => None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use crate::locator::DirectoryLocator;
    use std::path::{Path, PathBuf};

    const RESULTS_CSV: &str = "\
Round,Pick,Team,Name,Position,School,Bonus,Signed
1,3,Colorado Rockies,Charlie Condon,OF,Georgia,\"$9,250,000\",Y
1,4,Athletics,Nick Kurtz,1B,Wake Forest,\"$7,025,000\",Y
CB1,36,Colorado Rockies,Jared Thomas,OF,Texas,\"$2,300,000\",Y
2,42,Athletics,Gage Jump,LHP,LSU,\"$1,600,000\",Y
2,45,Colorado Rockies,Brody Brecht,RHP,Iowa,\"$2,000,000\",Y
3,81,Colorado Rockies,Cameron Smith,P,Florida,\"$850,000\",Y
3,79,Chicago Cubs,Cam Smith,3B,Florida State,\"$1,000,000\",Y
";

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    fn engine_in(dir: &Path) -> ReconciliationEngine {
        let locator = DirectoryLocator::new(dir, "output_{code}.csv", "data_ba-results.csv");
        ReconciliationEngine::new(Arc::new(TeamRegistry::mlb()), Box::new(locator))
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "data_ba-results.csv", RESULTS_CSV);
        write(
            dir.path(),
            "output_COL.csv",
            "Name,Optimization_Value\nCharlie Condon,0.95\nBrody Brecht,0.21\nCam Smith,0.09\nKavares Tears,0.05\n",
        );
        write(dir.path(), "output_OAK.csv", "x1,x2\nAny,Float64\nNick Kurtz,0.76\n");
        dir
    }

    #[test]
    fn test_reconcile_group() {
        let dir = fixture();
        let engine = engine_in(dir.path());
        let report = engine.reconcile("COL").unwrap();

        assert_eq!(report.format, TableFormat::Standard);
        assert_eq!(report.results.len(), 4);
        assert_eq!(report.outcomes.len(), 4);

        let kinds: Vec<MatchKind> = report.results.iter().map(|r| r.match_kind).collect();
        assert_eq!(
            kinds,
            vec![MatchKind::Exact, MatchKind::Exact, MatchKind::None, MatchKind::None]
        );
        assert_eq!(report.matched_count(), 2);

        println!("✅ {}", report.summary());
    }

    #[test]
    fn test_group_isolation() {
        let dir = fixture();
        let engine = engine_in(dir.path());
        let report = engine.reconcile("COL").unwrap();

        // "Cam Smith" exists, but for the Cubs
        assert!(report.outcomes.iter().all(|o| o.group_code == "COL"));
        assert!(report
            .results
            .iter()
            .filter_map(|r| r.outcome.as_ref())
            .all(|o| o.group_code == "COL"));
    }

    #[test]
    fn test_file_code_alias_is_followed() {
        let dir = fixture();
        let engine = engine_in(dir.path());

        let report = engine.reconcile("ATH").unwrap();
        assert_eq!(report.group.code, "ATH");
        assert_eq!(report.format, TableFormat::TypeAnnotated);
        assert_eq!(report.results[0].match_kind, MatchKind::Exact);
        assert_eq!(report.outcomes.len(), 2);

        // the file code itself is also accepted as an identifier
        let via_file_code = engine.reconcile("OAK").unwrap();
        assert_eq!(via_file_code.group.code, "ATH");
    }

    #[test]
    fn test_missing_prediction_file() {
        let dir = fixture();
        let engine = engine_in(dir.path());

        match engine.reconcile("BOS") {
            Err(ReconcileError::FileNotAvailable { group, path }) => {
                assert_eq!(group, "BOS");
                assert!(path.ends_with("output_BOS.csv"));
            }
            other => panic!("expected FileNotAvailable, got {:?}", other.map(|r| r.summary())),
        }
    }

    /// Directory layout with an allow-list of codes that count as present.
    struct AllowListLocator {
        inner: DirectoryLocator,
        present: Vec<&'static str>,
    }

    impl ArtifactLocator for AllowListLocator {
        fn prediction_path(&self, file_code: &str) -> PathBuf {
            self.inner.prediction_path(file_code)
        }

        fn ground_truth_path(&self) -> PathBuf {
            self.inner.ground_truth_path()
        }

        fn prediction_exists(&self, file_code: &str) -> bool {
            self.present.iter().any(|p| *p == file_code)
        }
    }

    #[test]
    fn test_existence_is_decided_by_the_locator() {
        let dir = fixture();
        let locator = AllowListLocator {
            inner: DirectoryLocator::new(dir.path(), "output_{code}.csv", "data_ba-results.csv"),
            present: vec!["OAK"],
        };
        let engine = ReconciliationEngine::new(Arc::new(TeamRegistry::mlb()), Box::new(locator));

        // output_COL.csv is on disk, but the locator says it is not available
        assert!(matches!(
            engine.reconcile("COL"),
            Err(ReconcileError::FileNotAvailable { group, .. }) if group == "COL"
        ));
        assert!(engine.reconcile("ATH").is_ok());
        assert_eq!(engine.available_groups(), vec!["ATH".to_string()]);
    }

    #[test]
    fn test_unknown_group() {
        let dir = fixture();
        let engine = engine_in(dir.path());
        assert!(matches!(
            engine.reconcile("MON"),
            Err(ReconcileError::UnknownGroup(code)) if code == "MON"
        ));
    }

    #[test]
    fn test_empty_blob_is_reported_distinctly() {
        let dir = fixture();
        write(dir.path(), "output_SEA.csv", "x1\n\"no rows in this rendered table\"\n");
        let engine = engine_in(dir.path());

        let err = engine.reconcile("SEA").unwrap_err();
        assert!(err.is_empty_parse());
        assert!(matches!(
            err,
            ReconcileError::Prediction {
                source: TableError::EmptyParseResult,
                ..
            }
        ));
        assert_eq!(err.group(), Some("SEA"));
    }

    #[test]
    fn test_missing_ground_truth_degrades_gracefully() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "output_COL.csv", "Name,Optimization_Value\nCharlie Condon,0.95\n");
        let engine = engine_in(dir.path());

        assert!(engine.ground_truth().is_none());
        let report = engine.reconcile("COL").unwrap();
        assert!(!report.ground_truth_available);
        assert!(report.outcomes.is_empty());
        assert!(report.results.iter().all(|r| r.match_kind == MatchKind::None));
        assert!(report.summary().contains("ground truth unavailable"));
    }

    #[test]
    fn test_available_groups_and_reconcile_all() {
        let dir = fixture();
        let engine = engine_in(dir.path());

        assert_eq!(engine.available_groups(), vec!["ATH".to_string(), "COL".to_string()]);

        let all = engine.reconcile_all();
        assert_eq!(all.len(), 30);
        let ok: Vec<&str> = all
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(code, _)| code.as_str())
            .collect();
        assert_eq!(ok, vec!["ATH", "COL"]);
        assert!(all
            .iter()
            .filter(|(_, r)| r.is_err())
            .all(|(_, r)| matches!(r, Err(ReconcileError::FileNotAvailable { .. }))));
    }

    #[test]
    fn test_rounds_pair_slots_with_predictions() {
        let dir = fixture();
        let engine = engine_in(dir.path());
        let report = engine.reconcile("COL").unwrap();

        let rounds = report.rounds();
        let labels: Vec<&str> = rounds.iter().map(|s| s.round.as_str()).collect();
        assert_eq!(labels, vec!["1", "CB1", "2", "3"]);

        assert_eq!(rounds[0].prediction.as_ref().unwrap().prediction.entity_name, "Charlie Condon");
        assert!(rounds[0].picks[0].predicted);
        assert!(!rounds[1].picks[0].predicted);
        assert!(rounds[2].picks[0].predicted);
        assert!(rounds.iter().all(|s| s.model_applied()));
    }

    #[test]
    fn test_rounds_beyond_predictions_have_no_model() {
        let dir = fixture();
        write(dir.path(), "output_COL.csv", "Name,Optimization_Value\nCharlie Condon,0.95\n");
        let engine = engine_in(dir.path());
        let rounds = engine.reconcile("COL").unwrap().rounds();

        assert!(rounds[0].model_applied());
        assert!(rounds[1..].iter().all(|s| !s.model_applied()));
    }

    #[test]
    fn test_aggregates() {
        let dir = fixture();
        let engine = engine_in(dir.path()).with_regime(ScoreRegime::Proportion { scale: 100.0 });
        let report = engine.reconcile("COL").unwrap();

        let amounts = report.outcome_amounts();
        assert_eq!(amounts.count, 4);
        assert_eq!(amounts.sum, 14_400_000.0);

        let scores = report.score_summary();
        assert_eq!(scores.count, 4);
        assert!((scores.sum - 1.30).abs() < 1e-9);

        let projected = report.projected_amounts();
        assert!((projected.sum - 130.0).abs() < 1e-6);
    }

    #[test]
    fn test_locate_searches_every_group() {
        let dir = fixture();
        let engine = engine_in(dir.path());

        let (outcome, kind) = engine.locate("Nick Kurtz").unwrap();
        assert_eq!(outcome.group_code, "ATH");
        assert_eq!(kind, MatchKind::Exact);

        let (outcome, kind) = engine.locate("Cam Smith").unwrap();
        assert_eq!(outcome.group_code, "CHC");
        assert_eq!(kind, MatchKind::Exact);

        assert!(engine.locate("Kavares Tears").is_none());
    }

    #[test]
    fn test_from_config() {
        let dir = fixture();
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        let engine = ReconciliationEngine::from_config(&config).unwrap();

        assert_eq!(engine.ground_truth().map(|t| t.len()), Some(7));
        assert_eq!(engine.reconcile("COL").unwrap().score_regime, ScoreRegime::default());
    }

    #[test]
    fn test_reconcile_is_repeatable() {
        let dir = fixture();
        let engine = engine_in(dir.path());

        let first = engine.reconcile("COL").unwrap();
        let second = engine.reconcile("COL").unwrap();
        assert_eq!(first.results, second.results);
        assert_eq!(first.outcomes, second.outcomes);
    }
}
