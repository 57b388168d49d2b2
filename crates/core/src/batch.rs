//! Helpers for bulk upsert batches.

use std::collections::HashSet;
use std::hash::Hash;

/// Collapse rows sharing a logical key, keeping the last occurrence.
///
/// PostgreSQL refuses an `INSERT .. ON CONFLICT DO UPDATE` that touches the
/// same row twice, so batches are deduplicated before they reach the
/// database. Surviving rows keep the relative order of their last
/// occurrence.
pub fn dedup_last_wins<T, K, F>(rows: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(rows.len());
    let mut kept: Vec<T> = rows
        .into_iter()
        .rev()
        .filter(|row| seen.insert(key(row)))
        .collect();
    kept.reverse();
    kept
}
