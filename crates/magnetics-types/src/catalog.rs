// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Toroidal Probe Catalog
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Static table of toroidal-array point names and their toroidal angles.
//!
//! The catalog order is the canonical channel order of every assembled
//! array. Geometry changes belong in the table (or a JSON file loaded with
//! [`ProbeCatalog::from_file`]), never in the assembly code.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::constants::DIII_D_TOROIDAL_CATALOG_VERSION;
use crate::error::{MagneticsError, MagneticsResult};

/// DIII-D toroidal Mirnov array at the midplane (66M), point name → φ [deg].
/// The three digits after `M` encode the toroidal angle.
const DIII_D_TOROIDAL: [(&str, f64); 12] = [
    ("MPI66M067D", 67.0),
    ("MPI66M097D", 97.0),
    ("MPI66M127D", 127.0),
    ("MPI66M132D", 132.0),
    ("MPI66M137D", 137.0),
    ("MPI66M157D", 157.0),
    ("MPI66M247D", 247.0),
    ("MPI66M277D", 277.0),
    ("MPI66M307D", 307.0),
    ("MPI66M312D", 312.0),
    ("MPI66M322D", 322.0),
    ("MPI66M340D", 340.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeLocation {
    pub pointname: String,
    /// Toroidal angle [deg].
    pub phi_deg: f64,
}

impl ProbeLocation {
    pub fn new(pointname: impl Into<String>, phi_deg: f64) -> Self {
        ProbeLocation {
            pointname: pointname.into(),
            phi_deg,
        }
    }

    pub fn phi_rad(&self) -> f64 {
        self.phi_deg.to_radians()
    }
}

/// Versioned, ordered probe table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeCatalog {
    pub version: String,
    pub probes: Vec<ProbeLocation>,
}

impl ProbeCatalog {
    pub fn new(version: impl Into<String>, probes: Vec<ProbeLocation>) -> MagneticsResult<Self> {
        let catalog = ProbeCatalog {
            version: version.into(),
            probes,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Built-in DIII-D toroidal array.
    pub fn diii_d_toroidal() -> Self {
        ProbeCatalog {
            version: DIII_D_TOROIDAL_CATALOG_VERSION.to_string(),
            probes: DIII_D_TOROIDAL
                .iter()
                .map(|&(name, phi)| ProbeLocation::new(name, phi))
                .collect(),
        }
    }

    /// Load from JSON and validate.
    pub fn from_file(path: &str) -> MagneticsResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let catalog: Self = serde_json::from_str(&contents)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Point names must be non-empty and unique, angles finite.
    /// An empty table is valid here; assembly reports it as an empty array.
    pub fn validate(&self) -> MagneticsResult<()> {
        let mut seen = HashSet::with_capacity(self.probes.len());
        for probe in &self.probes {
            if probe.pointname.trim().is_empty() {
                return Err(MagneticsError::ConfigError(format!(
                    "catalog '{}' contains an empty point name",
                    self.version
                )));
            }
            if !probe.phi_deg.is_finite() {
                return Err(MagneticsError::ConfigError(format!(
                    "catalog '{}': non-finite angle for '{}'",
                    self.version, probe.pointname
                )));
            }
            if !seen.insert(probe.pointname.as_str()) {
                return Err(MagneticsError::ConfigError(format!(
                    "catalog '{}': duplicate point name '{}'",
                    self.version, probe.pointname
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProbeLocation> {
        self.probes.iter()
    }

    pub fn pointnames(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.pointname.as_str()).collect()
    }

    pub fn locations_deg(&self) -> Vec<f64> {
        self.probes.iter().map(|p| p.phi_deg).collect()
    }

    pub fn location_of(&self, pointname: &str) -> Option<f64> {
        self.probes
            .iter()
            .find(|p| p.pointname == pointname)
            .map(|p| p.phi_deg)
    }
}

impl Default for ProbeCatalog {
    fn default() -> Self {
        ProbeCatalog::diii_d_toroidal()
    }
}
