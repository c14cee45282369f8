// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Magnetics Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::fmt;
use thiserror::Error;

/// Failure reported by a raw-trace source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("unknown shot {shot}")]
    UnknownShot { shot: i64 },

    #[error("no channel '{pointname}' recorded for shot {shot}")]
    UnknownPointname { shot: i64, pointname: String },

    #[error("channel '{pointname}' holds no data for shot {shot}")]
    NoData { shot: i64, pointname: String },

    #[error("transfer fault: {0}")]
    Transfer(String),
}

/// How one channel disagrees with the reference channel of an array.
#[derive(Debug, Clone, PartialEq)]
pub enum Discrepancy {
    SampleCount { expected: usize, observed: usize },
    SamplingRate { expected: f64, observed: f64 },
    TimeOrigin { expected: f64, observed: f64 },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::SampleCount { expected, observed } => {
                write!(f, "{observed} samples, expected {expected}")
            }
            Discrepancy::SamplingRate { expected, observed } => {
                write!(f, "Fs = {observed:.6e} Hz, expected {expected:.6e} Hz")
            }
            Discrepancy::TimeOrigin { expected, observed } => {
                write!(f, "t0 = {observed:.9} s, expected {expected:.9} s")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMismatch {
    pub pointname: String,
    pub discrepancy: Discrepancy,
}

/// A channel that could not be turned into a signal.
#[derive(Debug)]
pub struct ChannelFailure {
    pub pointname: String,
    pub error: Box<MagneticsError>,
}

#[derive(Error, Debug)]
pub enum MagneticsError {
    #[error("Retrieval failed for shot {shot}, point name '{pointname}': {source}")]
    Retrieval {
        shot: i64,
        pointname: String,
        #[source]
        source: SourceError,
    },

    #[error("Invalid time window [{t_start}, {t_stop}]: t_start must be finite and < t_stop")]
    InvalidWindow { t_start: f64, t_stop: f64 },

    #[error("Time window [{t_start}, {t_stop}] excludes every sample of '{pointname}' (shot {shot})")]
    EmptyWindow {
        shot: i64,
        pointname: String,
        t_start: f64,
        t_stop: f64,
    },

    #[error("'{pointname}' (shot {shot}) has {n_samples} sample(s); at least 2 are needed to derive Fs")]
    TooFewSamples {
        shot: i64,
        pointname: String,
        n_samples: usize,
    },

    #[error("Malformed trace for '{pointname}' (shot {shot}): {message}")]
    MalformedTrace {
        shot: i64,
        pointname: String,
        message: String,
    },

    #[error("'{pointname}' (shot {shot}) is not uniformly sampled: spacing {observed_dt:e} s at index {index}, median {median_dt:e} s")]
    NonUniformSampling {
        shot: i64,
        pointname: String,
        index: usize,
        observed_dt: f64,
        median_dt: f64,
    },

    #[error("Retrieval failed for {} channel(s) of shot {shot}: {}", .failures.len(), format_failures(.failures))]
    ArrayRetrieval {
        shot: i64,
        failures: Vec<ChannelFailure>,
    },

    /// Channels whose clock disagrees with `reference`, the first retrieved
    /// channel. The reference is not judged against the others: when it is
    /// the faulty channel, every healthy channel is listed in `mismatches`.
    #[error("Inconsistent toroidal array for shot {shot} (reference '{reference}'): {}", format_mismatches(.mismatches))]
    InconsistentArray {
        shot: i64,
        reference: String,
        mismatches: Vec<ChannelMismatch>,
    },

    #[error("No usable channels in toroidal array for shot {shot}")]
    EmptyArray { shot: i64 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MagneticsError {
    /// Point names this error is about, each listed once. For array errors
    /// this includes every failing channel and, for inconsistencies, the
    /// reference channel first.
    pub fn pointnames(&self) -> Vec<&str> {
        match self {
            MagneticsError::Retrieval { pointname, .. }
            | MagneticsError::EmptyWindow { pointname, .. }
            | MagneticsError::TooFewSamples { pointname, .. }
            | MagneticsError::MalformedTrace { pointname, .. }
            | MagneticsError::NonUniformSampling { pointname, .. } => vec![pointname.as_str()],
            MagneticsError::ArrayRetrieval { failures, .. } => {
                failures.iter().map(|f| f.pointname.as_str()).collect()
            }
            MagneticsError::InconsistentArray {
                reference,
                mismatches,
                ..
            } => {
                let mut names = vec![reference.as_str()];
                for m in mismatches {
                    if !names.contains(&m.pointname.as_str()) {
                        names.push(m.pointname.as_str());
                    }
                }
                names
            }
            _ => Vec::new(),
        }
    }
}

fn format_failures(failures: &[ChannelFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("[{}] {}", f.pointname, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_mismatches(mismatches: &[ChannelMismatch]) -> String {
    mismatches
        .iter()
        .map(|m| format!("[{}] {}", m.pointname, m.discrepancy))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type MagneticsResult<T> = Result<T, MagneticsError>;
