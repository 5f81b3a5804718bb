//! Fault Persistence Window
//!
//! Row-wise rules only raise a flag once their raw predicate has held for
//! `window` consecutive rows, which is the same as a trailing rolling sum of
//! the 0/1 predicate reaching `window`. Rows before the window fills are
//! never flagged.

/// Apply a persistence window to raw per-row predicate outcomes
pub fn persist(raw: &[bool], window: usize) -> Vec<bool> {
    let window = window.max(1);
    let mut run = 0usize;
    raw.iter()
        .map(|&hit| {
            run = if hit { run + 1 } else { 0 };
            run >= window
        })
        .collect()
}
