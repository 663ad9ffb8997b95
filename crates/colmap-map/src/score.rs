//! Fuzzy matching of field names against column headers.
//!
//! [`FuzzyMatcher`] is the seam the auto-mapper scores through. The default
//! [`JaroWinklerMatcher`] uses Jaro-Winkler similarity on normalized names,
//! adjusted by how many name tokens the two strings share.

use std::collections::BTreeSet;
use std::fmt;

use rapidfuzz::distance::jaro_winkler;

/// Score for an exact match after trimming (and case folding when insensitive).
const EXACT_SCORE: f64 = 1.0;
/// Score when names differ only in separators or casing style.
const NORMALIZED_SCORE: f64 = 0.95;
/// Multiplier when the names share no token.
const TOKEN_NO_OVERLAP_PENALTY: f64 = 0.6;
/// Floor for candidates containing every query token.
const CONTAINS_FLOOR: f64 = 0.5;

/// Why a candidate scored the way it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchReason {
    Exact,
    /// Equal once separators and case are ignored.
    Normalized,
    /// Every query token appears in the candidate.
    Contains { shared: usize, total: usize },
    /// Some tokens are shared.
    TokenOverlap { shared: usize, total: usize },
    /// Character similarity only.
    Similarity,
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact name match"),
            Self::Normalized => write!(f, "same name ignoring case and separators"),
            Self::Contains { shared, total } => {
                write!(f, "contains all name tokens ({shared} of {total})")
            }
            Self::TokenOverlap { shared, total } => {
                write!(f, "shares {shared} of {total} name tokens")
            }
            Self::Similarity => write!(f, "character similarity"),
        }
    }
}

/// A scored candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub candidate: String,
    /// Position of the candidate in the input slice.
    pub index: usize,
    /// Similarity in `0..=1`.
    pub score: f64,
    pub reason: MatchReason,
}

/// Lexical similarity scorer.
pub trait FuzzyMatcher {
    /// Scores every candidate against `query`.
    ///
    /// Returns candidates scoring at least `min_score`, highest first; ties
    /// keep input order.
    fn find_matches(
        &self,
        query: &str,
        candidates: &[String],
        min_score: f64,
        case_sensitive: bool,
    ) -> Vec<FuzzyMatch>;
}

impl<M: FuzzyMatcher + ?Sized> FuzzyMatcher for &M {
    fn find_matches(
        &self,
        query: &str,
        candidates: &[String],
        min_score: f64,
        case_sensitive: bool,
    ) -> Vec<FuzzyMatch> {
        (**self).find_matches(query, candidates, min_score, case_sensitive)
    }
}

/// Orders matches by descending score, then by input position.
pub fn rank_matches(matches: &mut [FuzzyMatch]) {
    matches.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.index.cmp(&b.index))
    });
}

/// Jaro-Winkler scorer with token adjustments.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinklerMatcher;

impl JaroWinklerMatcher {
    /// Scores one pair.
    pub fn score(&self, query: &str, candidate: &str, case_sensitive: bool) -> (f64, MatchReason) {
        let (query, candidate) = (query.trim(), candidate.trim());
        let exact = if case_sensitive {
            query == candidate
        } else {
            query.to_lowercase() == candidate.to_lowercase()
        };
        if exact && !query.is_empty() {
            return (EXACT_SCORE, MatchReason::Exact);
        }

        let query_tokens = tokenize(query, case_sensitive);
        let candidate_tokens = tokenize(candidate, case_sensitive);
        if query_tokens.is_empty() || candidate_tokens.is_empty() {
            return (0.0, MatchReason::Similarity);
        }

        let query_compact = query_tokens.concat();
        let candidate_compact = candidate_tokens.concat();
        if query_compact == candidate_compact {
            return (NORMALIZED_SCORE, MatchReason::Normalized);
        }

        let base = jaro_winkler::similarity(query_compact.chars(), candidate_compact.chars());

        let query_set: BTreeSet<&str> = query_tokens.iter().map(String::as_str).collect();
        let candidate_set: BTreeSet<&str> = candidate_tokens.iter().map(String::as_str).collect();
        let shared = query_set.intersection(&candidate_set).count();
        let total = query_set.union(&candidate_set).count();

        if shared == 0 {
            return (
                (base * TOKEN_NO_OVERLAP_PENALTY).clamp(0.0, 1.0),
                MatchReason::Similarity,
            );
        }

        let overlap = shared as f64 / total as f64;
        let score = base * (0.75 + 0.25 * overlap);
        if shared == query_set.len() {
            let floor = CONTAINS_FLOOR + 0.4 * overlap;
            (
                score.max(floor).clamp(0.0, 1.0),
                MatchReason::Contains { shared, total },
            )
        } else {
            (
                score.clamp(0.0, 1.0),
                MatchReason::TokenOverlap { shared, total },
            )
        }
    }
}

impl FuzzyMatcher for JaroWinklerMatcher {
    fn find_matches(
        &self,
        query: &str,
        candidates: &[String],
        min_score: f64,
        case_sensitive: bool,
    ) -> Vec<FuzzyMatch> {
        let mut matches: Vec<FuzzyMatch> = candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let (score, reason) = self.score(query, candidate, case_sensitive);
                (score >= min_score).then(|| FuzzyMatch {
                    candidate: candidate.clone(),
                    index,
                    score,
                    reason,
                })
            })
            .collect();
        rank_matches(&mut matches);
        matches
    }
}

/// Splits a name into tokens on separators, case changes and digit runs.
///
/// `"Bus_ID"`, `"BusId"` and `"bus id"` all yield `["bus", "id"]` when case
/// is ignored.
pub fn tokenize(name: &str, case_sensitive: bool) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut previous: Option<char> = None;

    for ch in name.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            previous = None;
            continue;
        }
        if let Some(prev) = previous {
            let case_boundary = ch.is_uppercase() && (prev.is_lowercase() || prev.is_numeric());
            let digit_boundary = ch.is_numeric() != prev.is_numeric();
            if (case_boundary || digit_boundary) && !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
        previous = Some(ch);
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    if case_sensitive {
        tokens
    } else {
        tokens.into_iter().map(|t| t.to_lowercase()).collect()
    }
}
