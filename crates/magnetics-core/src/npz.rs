// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — NPZ Shot Archive
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Read-only archive of exported shots: one `<shot>.npz` per shot holding
//! `<pointname>_t` and `<pointname>_x` arrays.

use std::fs::File;
use std::path::{Path, PathBuf};

use magnetics_types::error::SourceError;
use magnetics_types::window::TimeWindow;
use ndarray::Array1;
use ndarray_npy::NpzReader;

use crate::source::{RawTrace, TimeUnit, TraceSource};

#[derive(Debug, Clone)]
pub struct NpzArchive {
    root: PathBuf,
    time_unit: TimeUnit,
}

impl NpzArchive {
    pub fn new(root: impl Into<PathBuf>, time_unit: TimeUnit) -> Self {
        NpzArchive {
            root: root.into(),
            time_unit,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn shot_path(&self, shot: i64) -> PathBuf {
        self.root.join(format!("{shot}.npz"))
    }
}

impl TraceSource for NpzArchive {
    fn fetch(
        &self,
        shot: i64,
        pointname: &str,
        _hint: Option<TimeWindow>,
    ) -> Result<RawTrace, SourceError> {
        let path = self.shot_path(shot);
        if !path.is_file() {
            return Err(SourceError::UnknownShot { shot });
        }
        let file = File::open(&path)
            .map_err(|e| SourceError::Transfer(format!("Failed to open '{}': {e}", path.display())))?;
        let mut npz = NpzReader::new(file)
            .map_err(|e| SourceError::Transfer(format!("Failed to read npz '{}': {e}", path.display())))?;

        let names = npz
            .names()
            .map_err(|e| SourceError::Transfer(format!("Failed to list '{}': {e}", path.display())))?;
        let t_key = format!("{pointname}_t");
        let x_key = format!("{pointname}_x");
        let has = |key: &str| names.iter().any(|n| n == key || *n == format!("{key}.npy"));
        if !has(&t_key) && !has(&x_key) {
            return Err(SourceError::UnknownPointname {
                shot,
                pointname: pointname.to_string(),
            });
        }
        if !has(&t_key) || !has(&x_key) {
            return Err(SourceError::NoData {
                shot,
                pointname: pointname.to_string(),
            });
        }

        let t = read_array1(&mut npz, &t_key)?;
        let x = read_array1(&mut npz, &x_key)?;
        Ok(RawTrace::new(t.to_vec(), x.to_vec(), self.time_unit))
    }
}

fn read_array1(npz: &mut NpzReader<File>, key: &str) -> Result<Array1<f64>, SourceError> {
    npz.by_name::<ndarray::OwnedRepr<f64>, ndarray::Ix1>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<ndarray::OwnedRepr<f64>, ndarray::Ix1>(key))
        .map_err(|e| SourceError::Transfer(format!("Failed to read {key} from npz: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use ndarray_npy::NpzWriter;

    fn write_shot(dir: &Path, shot: i64) {
        let file = File::create(dir.join(format!("{shot}.npz"))).unwrap();
        let mut npz = NpzWriter::new(file);
        let t: Array1<f64> = Array1::from_shape_fn(10, |k| 1000.0 + k as f64 * 0.002);
        let x: Array1<f64> = Array1::from_shape_fn(10, |k| k as f64);
        npz.add_array("MPI66M067D_t", &t).unwrap();
        npz.add_array("MPI66M067D_x", &x).unwrap();
        npz.add_array("MPI66M097D_t", &array![0.0, 1.0]).unwrap();
        npz.finish().unwrap();
    }

    #[test]
    fn test_reads_trace_in_native_units() {
        let dir = tempfile::tempdir().unwrap();
        write_shot(dir.path(), 150792);
        let archive = NpzArchive::new(dir.path(), TimeUnit::Milliseconds);
        let trace = archive.fetch(150792, "MPI66M067D", None).unwrap();
        assert_eq!(trace.len(), 10);
        assert_eq!(trace.time_unit, TimeUnit::Milliseconds);
        assert_eq!(trace.t[0], 1000.0);
        assert_eq!(trace.x[9], 9.0);
    }

    #[test]
    fn test_missing_shot_and_channel() {
        let dir = tempfile::tempdir().unwrap();
        write_shot(dir.path(), 150792);
        let archive = NpzArchive::new(dir.path(), TimeUnit::Milliseconds);
        assert_eq!(
            archive.fetch(1, "MPI66M067D", None),
            Err(SourceError::UnknownShot { shot: 1 })
        );
        assert!(matches!(
            archive.fetch(150792, "MPI66M340D", None),
            Err(SourceError::UnknownPointname { .. })
        ));
        assert!(matches!(
            archive.fetch(150792, "MPI66M097D", None),
            Err(SourceError::NoData { .. })
        ));
    }

    #[test]
    fn test_corrupt_archive_is_transfer_fault() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("7.npz"), b"not a zip").unwrap();
        let archive = NpzArchive::new(dir.path(), TimeUnit::Seconds);
        assert!(matches!(
            archive.fetch(7, "MPI66M067D", None),
            Err(SourceError::Transfer(_))
        ));
    }
}
