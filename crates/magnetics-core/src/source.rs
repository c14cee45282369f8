// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Raw Trace Sources
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Lookup of raw point-name traces by (shot, point name).
//!
//! The acquisition system and its transfer protocol sit behind
//! [`TraceSource`]. Implementations must be shareable across the fetch pool.

use std::collections::{HashMap, HashSet};

use magnetics_types::constants::SECONDS_PER_MS;
use magnetics_types::error::SourceError;
use magnetics_types::window::TimeWindow;

/// Unit of the timestamps a source hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    #[default]
    Seconds,
    /// DIII-D point-name data convention.
    Milliseconds,
}

impl TimeUnit {
    pub fn to_seconds(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Milliseconds => SECONDS_PER_MS,
        }
    }

    /// `[t_start, t_stop]` of `window` expressed in this unit.
    pub fn native_bounds(self, window: &TimeWindow) -> (f64, f64) {
        let scale = self.to_seconds();
        (window.t_start() / scale, window.t_stop() / scale)
    }
}

/// Timestamped samples exactly as delivered by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTrace {
    pub t: Vec<f64>,
    pub x: Vec<f64>,
    pub time_unit: TimeUnit,
}

impl RawTrace {
    pub fn new(t: Vec<f64>, x: Vec<f64>, time_unit: TimeUnit) -> Self {
        RawTrace { t, x, time_unit }
    }

    /// Uniform trace starting at `t0` [s] sampled at `fs` [Hz].
    pub fn uniform(t0: f64, fs: f64, x: Vec<f64>) -> Self {
        let t = (0..x.len()).map(|k| t0 + k as f64 / fs).collect();
        RawTrace {
            t,
            x,
            time_unit: TimeUnit::Seconds,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Raw-trace lookup by (shot, point name).
///
/// `hint` is the window the caller will trim to, always in seconds whatever
/// unit the source records in (see [`TimeUnit::native_bounds`]). A source
/// may use it to transfer less data; it may also ignore it and return the
/// full record.
pub trait TraceSource: Send + Sync {
    fn fetch(
        &self,
        shot: i64,
        pointname: &str,
        hint: Option<TimeWindow>,
    ) -> Result<RawTrace, SourceError>;
}

/// In-memory table of traces and injected faults.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    shots: HashSet<i64>,
    entries: HashMap<(i64, String), Result<RawTrace, SourceError>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, shot: i64, pointname: impl Into<String>, trace: RawTrace) {
        self.shots.insert(shot);
        self.entries.insert((shot, pointname.into()), Ok(trace));
    }

    /// Make every fetch of (shot, pointname) fail with `error`.
    pub fn insert_fault(&mut self, shot: i64, pointname: impl Into<String>, error: SourceError) {
        self.shots.insert(shot);
        self.entries.insert((shot, pointname.into()), Err(error));
    }

    pub fn with_trace(mut self, shot: i64, pointname: impl Into<String>, trace: RawTrace) -> Self {
        self.insert(shot, pointname, trace);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TraceSource for MemorySource {
    fn fetch(
        &self,
        shot: i64,
        pointname: &str,
        _hint: Option<TimeWindow>,
    ) -> Result<RawTrace, SourceError> {
        if !self.shots.contains(&shot) {
            return Err(SourceError::UnknownShot { shot });
        }
        match self.entries.get(&(shot, pointname.to_string())) {
            Some(entry) => entry.clone(),
            None => Err(SourceError::UnknownPointname {
                shot,
                pointname: pointname.to_string(),
            }),
        }
    }
}
