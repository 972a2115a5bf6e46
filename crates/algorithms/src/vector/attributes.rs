//! Attribute schema merging
//!
//! When two inputs contribute columns to one output, name collisions are
//! resolved deterministically and silently: every occurrence of a repeated
//! name (the first included) gets an incrementing `_n` suffix, in order of
//! appearance, left side before right. Unique names pass through unchanged
//! unless they happen to collide with a generated name.

use std::collections::{HashMap, HashSet};

/// Rename a column list so every name is unique.
///
/// `["X", "area", "X"]` becomes `["X_1", "area", "X_2"]`.
pub fn uniquify(columns: &[String]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for col in columns {
        *counts.entry(col.as_str()).or_insert(0) += 1;
    }

    let mut taken: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<&str, usize> = HashMap::new();
    let mut out = Vec::with_capacity(columns.len());

    for col in columns {
        let name = if counts[col.as_str()] == 1 && !taken.contains(col.as_str()) {
            col.clone()
        } else {
            let n = next_suffix.entry(col.as_str()).or_insert(0);
            loop {
                *n += 1;
                let candidate = format!("{}_{}", col, n);
                if !taken.contains(&candidate) {
                    break candidate;
                }
            }
        };
        taken.insert(name.clone());
        out.push(name);
    }
    out
}

/// Merge two ordered schemas, left columns first, with collision suffixing.
pub fn merged_columns(left: &[String], right: &[String]) -> Vec<String> {
    let combined: Vec<String> = left.iter().chain(right.iter()).cloned().collect();
    uniquify(&combined)
}
