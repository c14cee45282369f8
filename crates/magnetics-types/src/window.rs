// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Time Window
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{MagneticsError, MagneticsResult};

/// Closed time interval `[t_start, t_stop]` in seconds.
///
/// Always satisfies `t_start < t_stop` with both bounds finite. Bounds are
/// never swapped: a reversed pair is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct TimeWindow {
    t_start: f64,
    t_stop: f64,
}

impl TimeWindow {
    pub fn new(t_start: f64, t_stop: f64) -> MagneticsResult<Self> {
        if !t_start.is_finite() || !t_stop.is_finite() || t_start >= t_stop {
            return Err(MagneticsError::InvalidWindow { t_start, t_stop });
        }
        Ok(TimeWindow { t_start, t_stop })
    }

    pub fn t_start(&self) -> f64 {
        self.t_start
    }

    pub fn t_stop(&self) -> f64 {
        self.t_stop
    }

    pub fn duration(&self) -> f64 {
        self.t_stop - self.t_start
    }

    /// Inclusive on both edges.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.t_start && t <= self.t_stop
    }

    /// Index range `[first, last + 1)` of the samples of a sorted time base
    /// that fall inside the window. Empty when no sample is inside.
    pub fn index_range(&self, t: &[f64]) -> std::ops::Range<usize> {
        let first = t.partition_point(|&v| v < self.t_start);
        let end = t.partition_point(|&v| v <= self.t_stop);
        first..end.max(first)
    }
}

impl TryFrom<[f64; 2]> for TimeWindow {
    type Error = MagneticsError;

    fn try_from(value: [f64; 2]) -> Result<Self, Self::Error> {
        TimeWindow::new(value[0], value[1])
    }
}

impl From<TimeWindow> for [f64; 2] {
    fn from(window: TimeWindow) -> Self {
        [window.t_start, window.t_stop]
    }
}
