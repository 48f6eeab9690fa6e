// 🔗 Entity Matcher - predicted name → observed outcome
//
// Two stages, first hit wins:
//   1. exact: trimmed, internal whitespace collapsed, case-sensitive
//   2. fuzzy: case-insensitive containment of the predicted name
// Candidates are scanned in ground-truth row order, so results are stable.

use crate::ground_truth::ActualOutcomeRecord;
use crate::normalize::PredictionRecord;
use crate::values::ScoreRegime;
use serde::{Deserialize, Serialize};

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    None,
}

impl MatchKind {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchKind::None)
    }
}

/// How loose the fuzzy stage is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzyPolicy {
    /// Plain substring containment.
    #[default]
    Containment,
    /// Containment that must start and end on a word boundary
    /// ("Lee" matches "Lee Jr." but not "Leeds").
    WordBoundary,
}

/// A prediction paired with the outcome it was matched to, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub prediction: PredictionRecord,
    pub outcome: Option<ActualOutcomeRecord>,
    pub match_kind: MatchKind,
}

impl MatchResult {
    pub fn unmatched(prediction: PredictionRecord) -> Self {
        MatchResult {
            prediction,
            outcome: None,
            match_kind: MatchKind::None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.match_kind.is_match()
    }

    /// Monetary estimate for the prediction under the given regime.
    pub fn projected_amount(&self, regime: &ScoreRegime) -> Option<f64> {
        regime.project(self.prediction.score)
    }

    /// Observed amount of the matched outcome.
    pub fn actual_amount(&self) -> Option<f64> {
        self.outcome.as_ref().and_then(|o| o.amount)
    }
}

// ============================================================================
// MATCHER
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct EntityMatcher {
    pub policy: FuzzyPolicy,
}

impl EntityMatcher {
    pub fn new(policy: FuzzyPolicy) -> Self {
        EntityMatcher { policy }
    }

    /// Find the outcome for one name. Pure: same inputs, same answer.
    pub fn find<'a>(
        &self,
        entity_name: &str,
        candidates: &'a [ActualOutcomeRecord],
    ) -> (Option<&'a ActualOutcomeRecord>, MatchKind) {
        let wanted = collapse_whitespace(entity_name);
        if wanted.is_empty() {
            return (None, MatchKind::None);
        }

        if let Some(hit) = candidates
            .iter()
            .find(|c| collapse_whitespace(&c.entity_name) == wanted)
        {
            return (Some(hit), MatchKind::Exact);
        }

        let needle = wanted.to_lowercase();
        if let Some(hit) = candidates
            .iter()
            .find(|c| self.contains(&c.entity_name.to_lowercase(), &needle))
        {
            return (Some(hit), MatchKind::Fuzzy);
        }

        (None, MatchKind::None)
    }

    /// Match one prediction against a candidate set.
    pub fn match_one(&self, prediction: &PredictionRecord, candidates: &[ActualOutcomeRecord]) -> MatchResult {
        let (outcome, match_kind) = self.find(&prediction.entity_name, candidates);
        MatchResult {
            prediction: prediction.clone(),
            outcome: outcome.cloned(),
            match_kind,
        }
    }

    /// Match every prediction, preserving prediction order.
    pub fn match_all(&self, predictions: &[PredictionRecord], candidates: &[ActualOutcomeRecord]) -> Vec<MatchResult> {
        predictions
            .iter()
            .map(|p| self.match_one(p, candidates))
            .collect()
    }

    fn contains(&self, haystack: &str, needle: &str) -> bool {
        match self.policy {
            FuzzyPolicy::Containment => haystack.contains(needle),
            FuzzyPolicy::WordBoundary => haystack.match_indices(needle).any(|(start, _)| {
                let end = start + needle.len();
                let before = haystack[..start].chars().next_back();
                let after = haystack[end..].chars().next();
                !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
            }),
        }
    }
}

/// Trim and fold internal whitespace runs to a single space.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
