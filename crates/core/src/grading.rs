//! Weighted grade averages and grading-period helpers.
//!
//! Scores are on the French 0–20 scale. A subject average weights each
//! grade by its own coefficient; the general average weights each subject
//! average by the subject coefficient.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Coefficient applied when none is given.
pub const DEFAULT_COEFFICIENT: f64 = 1.0;

static PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,16}$").expect("period regex is valid"));

/// A validated grade as it enters the average computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedGrade {
    pub matiere_id: DbId,
    pub score: f64,
    pub coefficient: f64,
}

/// Average of one subject for one student and period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAverage {
    pub matiere_id: DbId,
    /// Rounded to two decimals.
    pub average: f64,
    /// Subject coefficient used for the general average.
    pub coefficient: f64,
    pub grade_count: usize,
    #[serde(skip)]
    raw_average: f64,
}

/// `Σ(value × weight) / Σ(weight)`, or `None` when the weights sum to zero.
pub fn weighted_average<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (sum, weights) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(s, w), (value, weight)| (s + value * weight, w + weight));
    if weights > 0.0 {
        Some(sum / weights)
    } else {
        None
    }
}

/// Group grades by subject and compute each subject's weighted average.
///
/// Subjects are returned in ascending id order. A subject missing from
/// `subject_coefficients` gets [`DEFAULT_COEFFICIENT`].
pub fn subject_averages(
    grades: &[WeightedGrade],
    subject_coefficients: &HashMap<DbId, f64>,
) -> Vec<SubjectAverage> {
    let mut by_subject: BTreeMap<DbId, Vec<(f64, f64)>> = BTreeMap::new();
    for g in grades {
        by_subject
            .entry(g.matiere_id)
            .or_default()
            .push((g.score, g.coefficient));
    }

    by_subject
        .into_iter()
        .filter_map(|(matiere_id, pairs)| {
            let grade_count = pairs.len();
            weighted_average(pairs).map(|raw| SubjectAverage {
                matiere_id,
                average: round2(raw),
                coefficient: subject_coefficients
                    .get(&matiere_id)
                    .copied()
                    .unwrap_or(DEFAULT_COEFFICIENT),
                grade_count,
                raw_average: raw,
            })
        })
        .collect()
}

/// Coefficient-weighted mean of subject averages, rounded to two decimals.
pub fn general_average(subjects: &[SubjectAverage]) -> Option<f64> {
    weighted_average(subjects.iter().map(|s| (s.raw_average, s.coefficient))).map(round2)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Validate a grading period label such as `T1` or `S2`.
pub fn validate_period(period: &str) -> Result<(), CoreError> {
    if PERIOD_RE.is_match(period) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid period '{period}'. Expected 1-16 letters, digits, '-' or '_'"
        )))
    }
}
