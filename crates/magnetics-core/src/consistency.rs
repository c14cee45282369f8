// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Array Consistency
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cross-channel sampling checks for a toroidal array.
//!
//! Every channel is compared with the first (reference) channel on sample
//! count, sampling rate and time origin. Disagreeing channels are reported,
//! never truncated or resampled.

use magnetics_types::config::SamplingTolerance;
use magnetics_types::error::{ChannelMismatch, Discrepancy, MagneticsError, MagneticsResult};

use crate::signal::Signal;

/// Shared clock of a consistent array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedClock {
    pub fs: f64,
    pub t0: f64,
    pub n_samples: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Consistency {
    Consistent(SharedClock),
    Inconsistent {
        reference: String,
        mismatches: Vec<ChannelMismatch>,
    },
    Empty,
}

impl Consistency {
    pub fn is_consistent(&self) -> bool {
        matches!(self, Consistency::Consistent(_))
    }

    pub fn into_result(self, shot: i64) -> MagneticsResult<SharedClock> {
        match self {
            Consistency::Consistent(clock) => Ok(clock),
            Consistency::Inconsistent {
                reference,
                mismatches,
            } => Err(MagneticsError::InconsistentArray {
                shot,
                reference,
                mismatches,
            }),
            Consistency::Empty => Err(MagneticsError::EmptyArray { shot }),
        }
    }
}

/// Compare every signal with the first one.
///
/// The shared clock takes `fs` and `t0` from the reference channel. The
/// `t0` tolerance is `tolerance.t0_samples` periods of the reference rate.
/// No majority vote is taken, so a faulty reference shows up as every other
/// channel mismatching it.
pub fn check_consistency(signals: &[Signal], tolerance: &SamplingTolerance) -> Consistency {
    let Some(reference) = signals.first() else {
        return Consistency::Empty;
    };
    let fs_ref = reference.fs();
    let t0_ref = reference.t0();
    let n_ref = reference.len();
    let t0_tol = tolerance.t0_samples / fs_ref;

    let mut mismatches = Vec::new();
    for signal in &signals[1..] {
        let mut report = |discrepancy| {
            mismatches.push(ChannelMismatch {
                pointname: signal.pointname().to_string(),
                discrepancy,
            })
        };
        if signal.len() != n_ref {
            report(Discrepancy::SampleCount {
                expected: n_ref,
                observed: signal.len(),
            });
        }
        if (signal.fs() - fs_ref).abs() > tolerance.fs_rel * fs_ref {
            report(Discrepancy::SamplingRate {
                expected: fs_ref,
                observed: signal.fs(),
            });
        }
        if (signal.t0() - t0_ref).abs() > t0_tol {
            report(Discrepancy::TimeOrigin {
                expected: t0_ref,
                observed: signal.t0(),
            });
        }
    }

    if mismatches.is_empty() {
        Consistency::Consistent(SharedClock {
            fs: fs_ref,
            t0: t0_ref,
            n_samples: n_ref,
        })
    } else {
        Consistency::Inconsistent {
            reference: reference.pointname().to_string(),
            mismatches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RawTrace;

    fn signal(name: &str, t0: f64, fs: f64, n: usize) -> Signal {
        Signal::from_raw(
            1,
            name,
            None,
            RawTrace::uniform(t0, fs, vec![0.0; n]),
            &SamplingTolerance::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_slice() {
        let result = check_consistency(&[], &SamplingTolerance::default());
        assert_eq!(result, Consistency::Empty);
        assert!(matches!(
            result.into_result(9),
            Err(MagneticsError::EmptyArray { shot: 9 })
        ));
    }

    #[test]
    fn test_identical_clocks_pass() {
        let signals = vec![signal("A", 0.0, 1e6, 100), signal("B", 0.0, 1e6, 100)];
        let clock = check_consistency(&signals, &SamplingTolerance::default())
            .into_result(1)
            .unwrap();
        assert_eq!(clock.n_samples, 100);
        assert_eq!(clock.t0, 0.0);
        assert!((clock.fs - 1e6).abs() < 1e-3);
    }

    #[test]
    fn test_sub_sample_jitter_in_t0_tolerated() {
        let signals = vec![signal("A", 0.0, 1e6, 100), signal("B", 0.2e-6, 1e6, 100)];
        assert!(check_consistency(&signals, &SamplingTolerance::default()).is_consistent());
    }

    #[test]
    fn test_shifted_t0_names_both_channels() {
        let signals = vec![signal("A", 0.0, 1e6, 100), signal("B", 5e-6, 1e6, 100)];
        let err = check_consistency(&signals, &SamplingTolerance::default())
            .into_result(1)
            .unwrap_err();
        assert_eq!(err.pointnames(), vec!["A", "B"]);
        match err {
            MagneticsError::InconsistentArray { mismatches, .. } => {
                assert_eq!(mismatches.len(), 1);
                assert!(matches!(
                    mismatches[0].discrepancy,
                    Discrepancy::TimeOrigin { .. }
                ));
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_faulty_reference_flags_every_other_channel() {
        let signals = vec![
            signal("A", 5e-6, 1e6, 100),
            signal("B", 0.0, 1e6, 100),
            signal("C", 0.0, 1e6, 100),
        ];
        let err = check_consistency(&signals, &SamplingTolerance::default())
            .into_result(1)
            .unwrap_err();
        assert_eq!(err.pointnames(), vec!["A", "B", "C"]);
        match err {
            MagneticsError::InconsistentArray {
                reference,
                mismatches,
                ..
            } => {
                assert_eq!(reference, "A");
                assert!(mismatches.iter().all(|m| matches!(
                    m.discrepancy,
                    Discrepancy::TimeOrigin { expected, .. } if expected == 5e-6
                )));
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_every_discrepancy_reported() {
        let signals = vec![
            signal("A", 0.0, 1e6, 100),
            signal("B", 0.0, 1e6, 90),
            signal("C", 0.0, 5e5, 100),
            signal("D", 0.0, 1e6, 100),
        ];
        match check_consistency(&signals, &SamplingTolerance::default()) {
            Consistency::Inconsistent {
                reference,
                mismatches,
            } => {
                assert_eq!(reference, "A");
                let names: Vec<&str> = mismatches.iter().map(|m| m.pointname.as_str()).collect();
                assert_eq!(names, vec!["B", "C"]);
                assert!(matches!(
                    mismatches[0].discrepancy,
                    Discrepancy::SampleCount {
                        expected: 100,
                        observed: 90
                    }
                ));
                assert!(matches!(
                    mismatches[1].discrepancy,
                    Discrepancy::SamplingRate { .. }
                ));
            }
            other => panic!("Unexpected result: {other:?}"),
        }
    }
}
