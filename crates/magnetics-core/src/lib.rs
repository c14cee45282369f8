// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Magnetics Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Magnetics signal retrieval and toroidal-array assembly.
//!
//! Raw-trace sources, single-channel signals, cross-channel consistency
//! checks and the assembled toroidal Mirnov array.

pub mod consistency;
pub mod npz;
pub mod sampling;
pub mod signal;
pub mod source;
pub mod synthetic;
pub mod toroidal;

pub use signal::Signal;
pub use source::{RawTrace, TimeUnit, TraceSource};
pub use toroidal::ToroidalSignals;
