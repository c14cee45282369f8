// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Magnetics Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Seconds per millisecond. DIII-D point-name data records time in ms.
pub const SECONDS_PER_MS: f64 = 1e-3;

/// Default number of channels fetched at once. The digitizer transfer
/// system is load-sensitive, so this stays small.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Default relative deviation allowed between any sample spacing and the
/// median spacing before a trace counts as non-uniform.
pub const DEFAULT_UNIFORMITY_REL_TOL: f64 = 1e-3;

/// Default relative tolerance on Fs between channels of one array.
pub const DEFAULT_FS_REL_TOL: f64 = 1e-6;

/// Default tolerance on t0 between channels, in sample periods.
pub const DEFAULT_T0_TOL_SAMPLES: f64 = 0.5;

/// Version tag of the built-in DIII-D toroidal Mirnov catalog.
pub const DIII_D_TOROIDAL_CATALOG_VERSION: &str = "diii-d-mpi66m-v1";
