// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Synthetic Mirnov Source
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Synthetic toroidal Mirnov traces.
//!
//! Each catalog probe at toroidal angle φ records a rotating mode
//! `A cos(2π f t − n φ)` plus Gaussian pickup noise. Dead channels, clock
//! offsets and wrong digitizer rates can be injected per point name.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use magnetics_types::catalog::ProbeCatalog;
use magnetics_types::error::SourceError;
use magnetics_types::window::TimeWindow;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::source::{RawTrace, TimeUnit, TraceSource};

/// Digitizer rate [Hz]. DIII-D fast magnetics: 500 kHz.
const DEFAULT_FS: f64 = 500e3;

/// Recorded span [s].
const DEFAULT_T_START: f64 = 0.0;
const DEFAULT_T_STOP: f64 = 0.1;

/// Toroidal mode number.
const DEFAULT_MODE_NUMBER: i32 = 2;

/// Mode frequency [Hz].
const DEFAULT_FREQUENCY: f64 = 50e3;

/// Fluctuation amplitude [T/s].
const DEFAULT_AMPLITUDE: f64 = 1.0;

/// Pickup noise σ [T/s].
const DEFAULT_NOISE: f64 = 0.01;

const DEFAULT_SEED: u64 = 0x5eed;

/// Largest record a synthetic channel will generate.
const MAX_RECORD_SAMPLES: usize = 1 << 28;

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    shot: i64,
    catalog: ProbeCatalog,
    fs: f64,
    t_start: f64,
    t_stop: f64,
    mode_number: i32,
    frequency_hz: f64,
    amplitude: f64,
    noise_sigma: f64,
    seed: u64,
    dead: HashSet<String>,
    clock_offsets: HashMap<String, f64>,
    rate_overrides: HashMap<String, f64>,
}

impl SyntheticSource {
    pub fn new(shot: i64, catalog: ProbeCatalog) -> Self {
        SyntheticSource {
            shot,
            catalog,
            fs: DEFAULT_FS,
            t_start: DEFAULT_T_START,
            t_stop: DEFAULT_T_STOP,
            mode_number: DEFAULT_MODE_NUMBER,
            frequency_hz: DEFAULT_FREQUENCY,
            amplitude: DEFAULT_AMPLITUDE,
            noise_sigma: DEFAULT_NOISE,
            seed: DEFAULT_SEED,
            dead: HashSet::new(),
            clock_offsets: HashMap::new(),
            rate_overrides: HashMap::new(),
        }
    }

    /// Record `[t_start, t_stop]` [s] at `fs` [Hz].
    pub fn with_sampling(mut self, fs: f64, t_start: f64, t_stop: f64) -> Self {
        self.fs = fs;
        self.t_start = t_start;
        self.t_stop = t_stop;
        self
    }

    pub fn with_mode(mut self, mode_number: i32, frequency_hz: f64, amplitude: f64) -> Self {
        self.mode_number = mode_number;
        self.frequency_hz = frequency_hz;
        self.amplitude = amplitude;
        self
    }

    pub fn with_noise(mut self, noise_sigma: f64, seed: u64) -> Self {
        self.noise_sigma = noise_sigma;
        self.seed = seed;
        self
    }

    /// Channel exists in the catalog but recorded nothing.
    pub fn with_dead_channel(mut self, pointname: impl Into<String>) -> Self {
        self.dead.insert(pointname.into());
        self
    }

    /// Shift the channel's time base by `offset` [s].
    pub fn with_clock_offset(mut self, pointname: impl Into<String>, offset: f64) -> Self {
        self.clock_offsets.insert(pointname.into(), offset);
        self
    }

    /// Digitize the channel at `fs` [Hz] instead of the common rate.
    pub fn with_rate(mut self, pointname: impl Into<String>, fs: f64) -> Self {
        self.rate_overrides.insert(pointname.into(), fs);
        self
    }

    pub fn shot(&self) -> i64 {
        self.shot
    }

    pub fn catalog(&self) -> &ProbeCatalog {
        &self.catalog
    }

    /// Noise-free value of the mode at probe angle `phi_deg` and time `t`.
    pub fn mode_value(&self, phi_deg: f64, t: f64) -> f64 {
        let phase = 2.0 * PI * self.frequency_hz * t - self.mode_number as f64 * phi_deg.to_radians();
        self.amplitude * phase.cos()
    }

    /// Number of samples in the full record at `fs`.
    fn record_len(&self, fs: f64) -> Result<usize, SourceError> {
        if !fs.is_finite() || fs <= 0.0 {
            return Err(SourceError::Transfer(format!(
                "synthetic digitizer rate must be finite and > 0, got {fs}"
            )));
        }
        if !(self.t_stop > self.t_start) {
            return Err(SourceError::Transfer(format!(
                "synthetic record [{}, {}] is empty",
                self.t_start, self.t_stop
            )));
        }
        let span = ((self.t_stop - self.t_start) * fs + 1e-9).floor();
        if !(span < MAX_RECORD_SAMPLES as f64) {
            return Err(SourceError::Transfer(format!(
                "synthetic record of {span} samples exceeds {MAX_RECORD_SAMPLES}"
            )));
        }
        Ok(span as usize + 1)
    }
}

impl TraceSource for SyntheticSource {
    fn fetch(
        &self,
        shot: i64,
        pointname: &str,
        hint: Option<TimeWindow>,
    ) -> Result<RawTrace, SourceError> {
        if shot != self.shot {
            return Err(SourceError::UnknownShot { shot });
        }
        let (index, probe) = self
            .catalog
            .iter()
            .enumerate()
            .find(|(_, p)| p.pointname == pointname)
            .ok_or_else(|| SourceError::UnknownPointname {
                shot,
                pointname: pointname.to_string(),
            })?;
        if self.dead.contains(pointname) {
            return Err(SourceError::NoData {
                shot,
                pointname: pointname.to_string(),
            });
        }

        let fs = self.rate_overrides.get(pointname).copied().unwrap_or(self.fs);
        let n_total = self.record_len(fs)?;
        let origin = self.t_start + self.clock_offsets.get(pointname).copied().unwrap_or(0.0);

        // Transfer only the hinted span, padded by one sample on each side.
        let (k_lo, k_hi) = match hint {
            Some(w) => {
                let lo = ((w.t_start() - origin) * fs).floor() - 1.0;
                let hi = ((w.t_stop() - origin) * fs).ceil() + 1.0;
                (lo.max(0.0) as usize, (hi.max(-1.0) + 1.0) as usize)
            }
            None => (0, n_total),
        };
        let k_hi = k_hi.min(n_total);
        let k_lo = k_lo.min(k_hi);

        let noise = Normal::new(0.0, self.noise_sigma)
            .map_err(|e| SourceError::Transfer(format!("invalid synthetic noise: {e}")))?;
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(index as u64));
        // Noise of sample k is the k-th draw of the channel stream.
        for _ in 0..k_lo {
            noise.sample(&mut rng);
        }

        let capacity = k_hi.saturating_sub(k_lo);
        let mut t = Vec::with_capacity(capacity);
        let mut x = Vec::with_capacity(capacity);
        for k in k_lo..k_hi {
            let tk = origin + k as f64 / fs;
            t.push(tk);
            x.push(self.mode_value(probe.phi_deg, tk) + noise.sample(&mut rng));
        }

        Ok(RawTrace::new(t, x, TimeUnit::Seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_source() -> SyntheticSource {
        SyntheticSource::new(180000, ProbeCatalog::diii_d_toroidal())
            .with_sampling(1e5, 0.0, 0.01)
            .with_noise(0.0, 1)
    }

    #[test]
    fn test_full_record_length() {
        let src = make_source();
        let trace = src.fetch(180000, "MPI66M067D", None).unwrap();
        assert_eq!(trace.len(), 1001);
        assert_eq!(trace.t[0], 0.0);
    }

    #[test]
    fn test_hint_limits_transfer() {
        let src = make_source();
        let w = TimeWindow::new(0.002, 0.003).unwrap();
        let trace = src.fetch(180000, "MPI66M067D", Some(w)).unwrap();
        assert!(trace.len() <= 104, "transferred {} samples", trace.len());
        assert!(trace.t[0] <= 0.002 && *trace.t.last().unwrap() >= 0.003);
    }

    #[test]
    fn test_hinted_samples_match_full_record() {
        let src = make_source().with_noise(0.01, 7);
        let full = src.fetch(180000, "MPI66M067D", None).unwrap();
        let w = TimeWindow::new(0.005, 0.006).unwrap();
        let hinted = src.fetch(180000, "MPI66M067D", Some(w)).unwrap();
        let offset = full.t.iter().position(|&t| t == hinted.t[0]).unwrap();
        assert_eq!(&full.t[offset..offset + hinted.len()], &hinted.t[..]);
        assert_eq!(&full.x[offset..offset + hinted.len()], &hinted.x[..]);
    }

    #[test]
    fn test_windowed_signal_equals_retrimmed_record() {
        use crate::signal::Signal;

        let src = SyntheticSource::new(1, ProbeCatalog::diii_d_toroidal())
            .with_sampling(1e5, 0.0, 0.01)
            .with_noise(0.01, 7);
        let windowed = Signal::fetch(&src, 1, "MPI66M067D", Some((0.005, 0.006))).unwrap();
        let retrimmed = Signal::fetch(&src, 1, "MPI66M067D", None)
            .unwrap()
            .trimmed((0.005, 0.006))
            .unwrap();
        assert_eq!(windowed.t(), retrimmed.t());
        assert_eq!(windowed.x(), retrimmed.x());
    }

    #[test]
    fn test_oversized_record_is_transfer_fault() {
        let src = make_source().with_sampling(1e30, 0.0, 1.0);
        assert!(matches!(
            src.fetch(180000, "MPI66M067D", None),
            Err(SourceError::Transfer(_))
        ));
    }

    #[test]
    fn test_hint_outside_record_is_empty_trace() {
        let src = make_source();
        let w = TimeWindow::new(5.0, 6.0).unwrap();
        assert!(src.fetch(180000, "MPI66M067D", Some(w)).unwrap().is_empty());
    }

    #[test]
    fn test_noise_free_trace_follows_mode() {
        let src = make_source();
        let probe = &ProbeCatalog::diii_d_toroidal().probes[3];
        let trace = src.fetch(180000, &probe.pointname, None).unwrap();
        for (t, x) in trace.t.iter().zip(&trace.x).step_by(97) {
            assert!((x - src.mode_value(probe.phi_deg, *t)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_noise_is_bounded() {
        let src = make_source().with_noise(0.01, 7);
        let trace = src.fetch(180000, "MPI66M157D", None).unwrap();
        for (t, x) in trace.t.iter().zip(&trace.x) {
            assert!((x - src.mode_value(157.0, *t)).abs() < 0.1);
        }
    }

    #[test]
    fn test_fault_injection() {
        let src = make_source()
            .with_dead_channel("MPI66M097D")
            .with_clock_offset("MPI66M127D", 1e-3)
            .with_rate("MPI66M132D", 2e5);
        assert_eq!(
            src.fetch(180000, "MPI66M097D", None),
            Err(SourceError::NoData {
                shot: 180000,
                pointname: "MPI66M097D".to_string()
            })
        );
        let shifted = src.fetch(180000, "MPI66M127D", None).unwrap();
        assert!((shifted.t[0] - 1e-3).abs() < 1e-15);
        let fast = src.fetch(180000, "MPI66M132D", None).unwrap();
        assert_eq!(fast.len(), 2001);
        assert!(matches!(
            src.fetch(1, "MPI66M067D", None),
            Err(SourceError::UnknownShot { shot: 1 })
        ));
        assert!(matches!(
            src.fetch(180000, "MPI99X000D", None),
            Err(SourceError::UnknownPointname { .. })
        ));
    }

    #[test]
    fn test_invalid_rate_is_transfer_fault() {
        let src = make_source().with_rate("MPI66M067D", 0.0);
        assert!(matches!(
            src.fetch(180000, "MPI66M067D", None),
            Err(SourceError::Transfer(_))
        ));
    }
}
