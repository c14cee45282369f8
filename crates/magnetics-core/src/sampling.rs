// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Sampling Helpers
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Time-base checks used before a trace becomes a [`crate::signal::Signal`].

/// Index of the first timestamp that is non-finite or not strictly greater
/// than its predecessor.
pub fn first_non_increasing(t: &[f64]) -> Option<usize> {
    if let Some(first) = t.first() {
        if !first.is_finite() {
            return Some(0);
        }
    }
    t.windows(2)
        .position(|w| !w[1].is_finite() || w[1] <= w[0])
        .map(|i| i + 1)
}

/// Median of consecutive spacings. `None` for fewer than two samples.
pub fn median_spacing(t: &[f64]) -> Option<f64> {
    if t.len() < 2 {
        return None;
    }
    let mut dt: Vec<f64> = t.windows(2).map(|w| w[1] - w[0]).collect();
    dt.sort_by(|a, b| a.total_cmp(b));
    let mid = dt.len() / 2;
    if dt.len() % 2 == 0 {
        Some(0.5 * (dt[mid - 1] + dt[mid]))
    } else {
        Some(dt[mid])
    }
}

/// First spacing deviating from `median_dt` by more than `rel_tol`.
/// Returns the index of the later sample and the offending spacing.
pub fn first_nonuniform(t: &[f64], median_dt: f64, rel_tol: f64) -> Option<(usize, f64)> {
    let limit = rel_tol * median_dt.abs();
    t.windows(2)
        .map(|w| w[1] - w[0])
        .enumerate()
        .find(|(_, dt)| (dt - median_dt).abs() > limit)
        .map(|(i, dt)| (i + 1, dt))
}
