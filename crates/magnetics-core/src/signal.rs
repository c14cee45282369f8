// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Magnetics Signal
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! One retrieved magnetics channel.
//!
//! A [`Signal`] is built in a single pass: one retrieval, one trim to the
//! closed window, one derivation of `fs` and `t0`. It is immutable after.
//!
//! Trimming keeps the existing samples with `t_start <= t <= t_stop`; the
//! edges are never interpolated.

use magnetics_types::config::SamplingTolerance;
use magnetics_types::error::{MagneticsError, MagneticsResult};
use magnetics_types::window::TimeWindow;
use ndarray::{s, Array1};
use tracing::debug;

use crate::sampling::{first_non_increasing, first_nonuniform, median_spacing};
use crate::source::{RawTrace, TimeUnit, TraceSource};

#[derive(Debug, Clone)]
pub struct Signal {
    shot: i64,
    pointname: String,
    tlim: Option<TimeWindow>,
    x: Array1<f64>,
    t: Array1<f64>,
    fs: f64,
    t0: f64,
    tolerance: SamplingTolerance,
}

impl Signal {
    /// Retrieve `pointname` for `shot`, optionally restricted to `tlim` [s].
    pub fn fetch<S: TraceSource + ?Sized>(
        source: &S,
        shot: i64,
        pointname: &str,
        tlim: Option<(f64, f64)>,
    ) -> MagneticsResult<Self> {
        Self::fetch_with(source, shot, pointname, tlim, &SamplingTolerance::default())
    }

    pub fn fetch_with<S: TraceSource + ?Sized>(
        source: &S,
        shot: i64,
        pointname: &str,
        tlim: Option<(f64, f64)>,
        tolerance: &SamplingTolerance,
    ) -> MagneticsResult<Self> {
        let window = tlim
            .map(|(t_start, t_stop)| TimeWindow::new(t_start, t_stop))
            .transpose()?;
        Self::fetch_windowed(source, shot, pointname, window, tolerance)
    }

    pub(crate) fn fetch_windowed<S: TraceSource + ?Sized>(
        source: &S,
        shot: i64,
        pointname: &str,
        window: Option<TimeWindow>,
        tolerance: &SamplingTolerance,
    ) -> MagneticsResult<Self> {
        debug!(shot, pointname, ?window, "fetching magnetics trace");
        let raw = source
            .fetch(shot, pointname, window)
            .map_err(|source| MagneticsError::Retrieval {
                shot,
                pointname: pointname.to_string(),
                source,
            })?;
        Self::from_raw(shot, pointname, window, raw, tolerance)
    }

    /// Build from a trace that was already retrieved.
    pub fn from_raw(
        shot: i64,
        pointname: &str,
        window: Option<TimeWindow>,
        raw: RawTrace,
        tolerance: &SamplingTolerance,
    ) -> MagneticsResult<Self> {
        let malformed = |message: String| MagneticsError::MalformedTrace {
            shot,
            pointname: pointname.to_string(),
            message,
        };

        if raw.t.len() != raw.x.len() {
            return Err(malformed(format!(
                "{} timestamps for {} samples",
                raw.t.len(),
                raw.x.len()
            )));
        }

        let scale = raw.time_unit.to_seconds();
        let mut t = Array1::from(raw.t);
        if raw.time_unit != TimeUnit::Seconds {
            t.mapv_inplace(|v| v * scale);
        }
        let x = Array1::from(raw.x);

        let t_slice = t
            .as_slice()
            .ok_or_else(|| malformed("time base is not contiguous".to_string()))?;
        if let Some(index) = first_non_increasing(t_slice) {
            return Err(malformed(format!(
                "timestamps are not finite and strictly increasing at index {index}"
            )));
        }

        let (t, x) = match window {
            Some(w) => {
                let range = w.index_range(t_slice);
                if range.is_empty() {
                    return Err(MagneticsError::EmptyWindow {
                        shot,
                        pointname: pointname.to_string(),
                        t_start: w.t_start(),
                        t_stop: w.t_stop(),
                    });
                }
                (
                    t.slice(s![range.clone()]).to_owned(),
                    x.slice(s![range]).to_owned(),
                )
            }
            None => (t, x),
        };

        Self::from_trimmed(shot, pointname, window, t, x, tolerance)
    }

    fn from_trimmed(
        shot: i64,
        pointname: &str,
        tlim: Option<TimeWindow>,
        t: Array1<f64>,
        x: Array1<f64>,
        tolerance: &SamplingTolerance,
    ) -> MagneticsResult<Self> {
        let t_slice = t.as_slice().ok_or_else(|| MagneticsError::MalformedTrace {
            shot,
            pointname: pointname.to_string(),
            message: "time base is not contiguous".to_string(),
        })?;

        let median_dt = match median_spacing(t_slice) {
            Some(dt) => dt,
            None if t.is_empty() => {
                return Err(match tlim {
                    Some(w) => MagneticsError::EmptyWindow {
                        shot,
                        pointname: pointname.to_string(),
                        t_start: w.t_start(),
                        t_stop: w.t_stop(),
                    },
                    None => MagneticsError::TooFewSamples {
                        shot,
                        pointname: pointname.to_string(),
                        n_samples: 0,
                    },
                });
            }
            None => {
                return Err(MagneticsError::TooFewSamples {
                    shot,
                    pointname: pointname.to_string(),
                    n_samples: t.len(),
                });
            }
        };

        if let Some((index, observed_dt)) =
            first_nonuniform(t_slice, median_dt, tolerance.uniformity_rel)
        {
            return Err(MagneticsError::NonUniformSampling {
                shot,
                pointname: pointname.to_string(),
                index,
                observed_dt,
                median_dt,
            });
        }

        let t0 = t[0];
        let fs = 1.0 / median_dt;
        debug!(shot, pointname, n_samples = t.len(), fs, t0, "built magnetics signal");

        Ok(Signal {
            shot,
            pointname: pointname.to_string(),
            tlim,
            x,
            t,
            fs,
            t0,
            tolerance: *tolerance,
        })
    }

    /// Restrict an existing signal to `tlim`. Trimming to the window the
    /// signal was built with returns identical samples.
    pub fn trimmed(&self, tlim: (f64, f64)) -> MagneticsResult<Self> {
        let window = TimeWindow::new(tlim.0, tlim.1)?;
        let range = self
            .t
            .as_slice()
            .map(|t| window.index_range(t))
            .unwrap_or(0..0);
        if range.is_empty() {
            return Err(MagneticsError::EmptyWindow {
                shot: self.shot,
                pointname: self.pointname.clone(),
                t_start: window.t_start(),
                t_stop: window.t_stop(),
            });
        }
        Self::from_trimmed(
            self.shot,
            &self.pointname,
            Some(window),
            self.t.slice(s![range.clone()]).to_owned(),
            self.x.slice(s![range]).to_owned(),
            &self.tolerance,
        )
    }

    pub fn shot(&self) -> i64 {
        self.shot
    }

    pub fn pointname(&self) -> &str {
        &self.pointname
    }

    pub fn tlim(&self) -> Option<TimeWindow> {
        self.tlim
    }

    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    /// Timestamps [s].
    pub fn t(&self) -> &Array1<f64> {
        &self.t
    }

    /// Sampling rate [Hz].
    pub fn fs(&self) -> f64 {
        self.fs
    }

    /// First retained timestamp [s].
    pub fn t0(&self) -> f64 {
        self.t0
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false for a constructed signal.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Span between first and last sample [s].
    pub fn duration(&self) -> f64 {
        self.t[self.t.len() - 1] - self.t0
    }

    /// Ideal time base `t0 + k / fs`, regenerated from the derived metadata.
    pub fn time_base(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.len(), |k| self.t0 + k as f64 / self.fs)
    }
}
