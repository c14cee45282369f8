// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Toroidal Magnetics Array
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Assembly of the toroidal Mirnov array into one multi-channel block.
//!
//! Channels are fetched on a bounded Rayon pool, collected in catalog order,
//! checked for a common clock and stacked into a `(channels, samples)`
//! array with a parallel vector of toroidal angles.

use magnetics_types::catalog::ProbeCatalog;
use magnetics_types::config::{MissingChannelPolicy, RetrievalConfig};
use magnetics_types::error::{ChannelFailure, MagneticsError, MagneticsResult};
use magnetics_types::window::TimeWindow;
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::consistency::check_consistency;
use crate::signal::Signal;
use crate::source::TraceSource;

/// A channel dropped under [`MissingChannelPolicy::Exclude`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedChannel {
    pub pointname: String,
    pub phi_deg: f64,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ToroidalSignals {
    shot: i64,
    tlim: Option<TimeWindow>,
    catalog_version: String,
    pointnames: Vec<String>,
    locations: Array1<f64>,
    signals: Vec<Signal>,
    x: Array2<f64>,
    fs: f64,
    t0: f64,
    excluded: Vec<ExcludedChannel>,
}

impl ToroidalSignals {
    /// Retrieve the built-in DIII-D toroidal array with default settings.
    pub fn fetch<S: TraceSource + ?Sized>(
        source: &S,
        shot: i64,
        tlim: Option<(f64, f64)>,
    ) -> MagneticsResult<Self> {
        Self::fetch_with(
            source,
            &ProbeCatalog::diii_d_toroidal(),
            shot,
            tlim,
            &RetrievalConfig::default(),
        )
    }

    pub fn fetch_with<S: TraceSource + ?Sized>(
        source: &S,
        catalog: &ProbeCatalog,
        shot: i64,
        tlim: Option<(f64, f64)>,
        config: &RetrievalConfig,
    ) -> MagneticsResult<Self> {
        config.validate()?;
        catalog.validate()?;
        let window = tlim
            .map(|(t_start, t_stop)| TimeWindow::new(t_start, t_stop))
            .transpose()?;
        if catalog.is_empty() {
            return Err(MagneticsError::EmptyArray { shot });
        }

        let results = fetch_channels(source, catalog, shot, window, config)?;

        let mut pointnames = Vec::with_capacity(catalog.len());
        let mut locations = Vec::with_capacity(catalog.len());
        let mut signals = Vec::with_capacity(catalog.len());
        let mut excluded = Vec::new();
        let mut failures = Vec::new();

        for (probe, result) in catalog.iter().zip(results) {
            match result {
                Ok(signal) => {
                    pointnames.push(probe.pointname.clone());
                    locations.push(probe.phi_deg);
                    signals.push(signal);
                }
                Err(err @ MagneticsError::Retrieval { .. })
                    if config.missing_channel_policy == MissingChannelPolicy::Exclude =>
                {
                    warn!(shot, pointname = %probe.pointname, error = %err, "excluding channel");
                    excluded.push(ExcludedChannel {
                        pointname: probe.pointname.clone(),
                        phi_deg: probe.phi_deg,
                        reason: err.to_string(),
                    });
                }
                Err(err) => failures.push(ChannelFailure {
                    pointname: probe.pointname.clone(),
                    error: Box::new(err),
                }),
            }
        }

        if !failures.is_empty() {
            warn!(shot, n_failed = failures.len(), "toroidal array retrieval failed");
            return Err(MagneticsError::ArrayRetrieval { shot, failures });
        }

        let clock = check_consistency(&signals, &config.tolerance)
            .into_result(shot)
            .map_err(|err| {
                warn!(shot, error = %err, "toroidal array rejected");
                err
            })?;

        let mut x = Array2::zeros((signals.len(), clock.n_samples));
        for (mut row, signal) in x.rows_mut().into_iter().zip(&signals) {
            row.assign(signal.x());
        }

        debug!(
            shot,
            n_channels = signals.len(),
            n_samples = clock.n_samples,
            fs = clock.fs,
            t0 = clock.t0,
            n_excluded = excluded.len(),
            "assembled toroidal array"
        );

        Ok(ToroidalSignals {
            shot,
            tlim: window,
            catalog_version: catalog.version.clone(),
            pointnames,
            locations: Array1::from(locations),
            signals,
            x,
            fs: clock.fs,
            t0: clock.t0,
            excluded,
        })
    }

    pub fn shot(&self) -> i64 {
        self.shot
    }

    pub fn tlim(&self) -> Option<TimeWindow> {
        self.tlim
    }

    pub fn catalog_version(&self) -> &str {
        &self.catalog_version
    }

    /// Point names in channel order.
    pub fn pointnames(&self) -> &[String] {
        &self.pointnames
    }

    /// Toroidal angle of each channel [deg], parallel to `signals`.
    pub fn locations(&self) -> &Array1<f64> {
        &self.locations
    }

    /// Toroidal angle of each channel [rad].
    pub fn locations_rad(&self) -> Array1<f64> {
        self.locations.mapv(f64::to_radians)
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Channel with the given point name.
    pub fn signal(&self, pointname: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.pointname() == pointname)
    }

    /// Samples, shape `(n_channels, n_samples)`, rows in channel order.
    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn fs(&self) -> f64 {
        self.fs
    }

    pub fn t0(&self) -> f64 {
        self.t0
    }

    pub fn n_channels(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.x.ncols()
    }

    pub fn excluded(&self) -> &[ExcludedChannel] {
        &self.excluded
    }

    /// Shared time base `t0 + k / fs`.
    pub fn time_base(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.n_samples(), |k| self.t0 + k as f64 / self.fs)
    }
}

/// Fetch every catalog channel on a pool of at most `max_concurrency`
/// threads. The returned vector is in catalog order and is only produced
/// once every fetch has finished.
fn fetch_channels<S: TraceSource + ?Sized>(
    source: &S,
    catalog: &ProbeCatalog,
    shot: i64,
    window: Option<TimeWindow>,
    config: &RetrievalConfig,
) -> MagneticsResult<Vec<MagneticsResult<Signal>>> {
    let n_threads = config.max_concurrency.min(catalog.len()).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .thread_name(|i| format!("magnetics-fetch-{i}"))
        .build()
        .map_err(|e| MagneticsError::ConfigError(format!("failed to build fetch pool: {e}")))?;

    debug!(shot, n_channels = catalog.len(), n_threads, "fetching toroidal array");
    Ok(pool.install(|| {
        catalog
            .probes
            .par_iter()
            .map(|probe| {
                Signal::fetch_windowed(source, shot, &probe.pointname, window, &config.tolerance)
            })
            .collect()
    }))
}
