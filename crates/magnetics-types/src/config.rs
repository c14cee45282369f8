// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Magnetics Retrieval Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FS_REL_TOL, DEFAULT_MAX_CONCURRENCY, DEFAULT_T0_TOL_SAMPLES,
    DEFAULT_UNIFORMITY_REL_TOL,
};
use crate::error::{MagneticsError, MagneticsResult};

/// What to do with a toroidal channel the source cannot deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingChannelPolicy {
    /// Any retrieval failure fails the whole array.
    #[default]
    Fail,
    /// Drop channels whose retrieval failed and record them as excluded.
    /// Window misuse and inconsistent sampling stay fatal.
    Exclude,
}

/// Tolerances applied when deriving Fs and when comparing channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingTolerance {
    /// Max relative deviation of any spacing from the median spacing.
    #[serde(default = "default_uniformity_rel")]
    pub uniformity_rel: f64,
    /// Max relative Fs difference between two channels of one array.
    #[serde(default = "default_fs_rel")]
    pub fs_rel: f64,
    /// Max t0 difference between two channels, in sample periods.
    #[serde(default = "default_t0_samples")]
    pub t0_samples: f64,
}

fn default_uniformity_rel() -> f64 {
    DEFAULT_UNIFORMITY_REL_TOL
}
fn default_fs_rel() -> f64 {
    DEFAULT_FS_REL_TOL
}
fn default_t0_samples() -> f64 {
    DEFAULT_T0_TOL_SAMPLES
}
fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl Default for SamplingTolerance {
    fn default() -> Self {
        SamplingTolerance {
            uniformity_rel: default_uniformity_rel(),
            fs_rel: default_fs_rel(),
            t0_samples: default_t0_samples(),
        }
    }
}

impl SamplingTolerance {
    pub fn validate(&self) -> MagneticsResult<()> {
        for (name, value) in [
            ("uniformity_rel", self.uniformity_rel),
            ("fs_rel", self.fs_rel),
            ("t0_samples", self.t0_samples),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(MagneticsError::ConfigError(format!(
                    "tolerance {name} must be finite and >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Settings for assembling a toroidal array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Upper bound on channels fetched at the same time.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default)]
    pub missing_channel_policy: MissingChannelPolicy,
    #[serde(default)]
    pub tolerance: SamplingTolerance,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        RetrievalConfig {
            max_concurrency: default_max_concurrency(),
            missing_channel_policy: MissingChannelPolicy::default(),
            tolerance: SamplingTolerance::default(),
        }
    }
}

impl RetrievalConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &str) -> MagneticsResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MagneticsResult<()> {
        if self.max_concurrency == 0 {
            return Err(MagneticsError::ConfigError(
                "max_concurrency must be >= 1".to_string(),
            ));
        }
        self.tolerance.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_json() {
        let cfg: RetrievalConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RetrievalConfig::default());
        assert_eq!(cfg.max_concurrency, DEFAULT_MAX_CONCURRENCY);
        assert_eq!(cfg.missing_channel_policy, MissingChannelPolicy::Fail);
    }

    #[test]
    fn test_partial_tolerance_override() {
        let cfg: RetrievalConfig = serde_json::from_str(
            r#"{"missing_channel_policy": "exclude", "tolerance": {"fs_rel": 1e-3}}"#,
        )
        .unwrap();
        assert_eq!(cfg.missing_channel_policy, MissingChannelPolicy::Exclude);
        assert!((cfg.tolerance.fs_rel - 1e-3).abs() < 1e-15);
        assert!((cfg.tolerance.t0_samples - DEFAULT_T0_TOL_SAMPLES).abs() < 1e-15);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let cfg = RetrievalConfig {
            max_concurrency: 0,
            ..RetrievalConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(MagneticsError::ConfigError(_))));
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let mut cfg = RetrievalConfig::default();
        cfg.tolerance.t0_samples = -1.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("t0_samples"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_concurrency": 2}}"#).unwrap();
        let cfg = RetrievalConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.max_concurrency, 2);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("retrieval.json");
        let cfg = RetrievalConfig::from_file(&path.to_string_lossy()).unwrap();
        assert_eq!(cfg, RetrievalConfig::default());
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_concurrency": 0}}"#).unwrap();
        assert!(RetrievalConfig::from_file(file.path().to_str().unwrap()).is_err());
    }
}
