//! JSON persistence for dataset envelopes.
//!
//! Layout of an artifact:
//!
//! ```json
//! {
//!   "source": "...",
//!   "frequency": "monthly",
//!   "start": "YYYY-MM",
//!   "end": "YYYY-MM",
//!   "series": [ { "date": "YYYY-MM", "value": 1.0 } ]
//! }
//! ```
//!
//! Writes are atomic: the document goes to `<path>.tmp` and is renamed into
//! place, so a reader never sees a half-written file and a failed build leaves
//! any previous artifact untouched.

use crate::data::error::{PipelineError, ValidationFailure};
use crate::data::validate::validate;
use crate::domain::{DatasetEnvelope, Frequency, MonthKey, ObservationPoint};
use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// What a completed write produced.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReport {
    pub path: PathBuf,
    pub points: usize,
    pub start: MonthKey,
    pub end: MonthKey,
    /// blake3 hex digest of the bytes on disk.
    pub digest: String,
}

/// Serialize an envelope: pretty JSON, two-space indent, trailing newline.
pub fn encode(envelope: &DatasetEnvelope) -> Result<Vec<u8>, PipelineError> {
    let mut bytes = serde_json::to_vec_pretty(envelope).map_err(|e| PipelineError::Write {
        what: envelope.source().to_string(),
        reason: format!("serialization: {e}"),
    })?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write an envelope to `path`, creating parent directories as needed.
pub fn write_dataset(envelope: &DatasetEnvelope, path: &Path) -> Result<WriteReport, PipelineError> {
    let write_err = |reason: String| PipelineError::Write {
        what: path.display().to_string(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| write_err(format!("create {}: {e}", parent.display())))?;
    }

    let bytes = encode(envelope)?;
    let tmp = tmp_path(path);
    fs::write(&tmp, &bytes).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        write_err(format!("write temp file: {e}"))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        write_err(format!("atomic rename failed: {e}"))
    })?;

    let report = WriteReport {
        path: path.to_path_buf(),
        points: envelope.series().len(),
        start: envelope.start(),
        end: envelope.end(),
        digest: blake3::hash(&bytes).to_hex().to_string(),
    };
    tracing::info!(
        path = %report.path.display(),
        points = report.points,
        digest = %report.digest,
        "wrote dataset"
    );
    Ok(report)
}

/// On-disk shape, before the series is re-validated.
#[derive(Deserialize)]
struct StoredEnvelope {
    source: String,
    #[serde(rename = "frequency")]
    _frequency: Frequency,
    start: MonthKey,
    end: MonthKey,
    series: Vec<ObservationPoint>,
}

/// Load an artifact and re-run the validation gate over it, including the
/// check that the declared `start`/`end` agree with the series.
pub fn read_dataset(path: &Path, min_points: usize) -> Result<DatasetEnvelope, PipelineError> {
    let text = fs::read_to_string(path).map_err(|e| PipelineError::Read {
        what: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let stored: StoredEnvelope = serde_json::from_str(&text).map_err(|e| PipelineError::Read {
        what: path.display().to_string(),
        reason: format!("invalid dataset JSON: {e}"),
    })?;

    let series = validate(stored.series, min_points)?;
    let envelope = DatasetEnvelope::new(stored.source, series);
    for (field, declared, actual) in [
        ("start", stored.start, envelope.start()),
        ("end", stored.end, envelope.end()),
    ] {
        if declared != actual {
            return Err(ValidationFailure::EnvelopeMismatch {
                field,
                declared,
                actual,
            }
            .into());
        }
    }
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("longmath_writer_{}_{id}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn key(y: i32, m: u32) -> MonthKey {
        MonthKey::new(y, m).unwrap()
    }

    fn sample() -> DatasetEnvelope {
        let points = vec![
            ObservationPoint::new(key(1871, 1), 1.0),
            ObservationPoint::new(key(1871, 2), 1.02),
            ObservationPoint::new(key(1871, 3), 1.05),
        ];
        DatasetEnvelope::new("test source", validate(points, 1).unwrap())
    }

    #[test]
    fn encoding_is_pretty_with_trailing_newline() {
        let text = String::from_utf8(encode(&sample()).unwrap()).unwrap();
        assert!(text.starts_with("{\n  \"source\": \"test source\",\n  \"frequency\": \"monthly\","));
        assert!(text.contains("\"start\": \"1871-01\""));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn write_then_read_back() {
        let dir = temp_dir();
        let path = dir.join("nested").join("out.json");
        let report = write_dataset(&sample(), &path).unwrap();
        assert_eq!(report.points, 3);
        assert_eq!(report.start, key(1871, 1));
        assert_eq!(report.end, key(1871, 3));
        assert_eq!(report.digest.len(), 64);
        assert!(!tmp_path(&path).exists());

        let loaded = read_dataset(&path, 3).unwrap();
        assert_eq!(loaded, sample());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn rewrite_is_byte_identical() {
        let dir = temp_dir();
        let path = dir.join("out.json");
        let a = write_dataset(&sample(), &path).unwrap();
        let first = fs::read(&path).unwrap();
        let b = write_dataset(&sample(), &path).unwrap();
        assert_eq!(first, fs::read(&path).unwrap());
        assert_eq!(a.digest, b.digest);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_rejects_declared_range_mismatch() {
        let dir = temp_dir();
        let path = dir.join("bad.json");
        fs::write(
            &path,
            r#"{"source":"x","frequency":"monthly","start":"1871-01","end":"1871-05",
               "series":[{"date":"1871-01","value":1.0},{"date":"1871-02","value":2.0}]}"#,
        )
        .unwrap();
        assert!(matches!(
            read_dataset(&path, 1),
            Err(PipelineError::ValidationFailed(ValidationFailure::EnvelopeMismatch { field: "end", .. }))
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_rejects_unordered_series() {
        let dir = temp_dir();
        let path = dir.join("unordered.json");
        fs::write(
            &path,
            r#"{"source":"x","frequency":"monthly","start":"1871-02","end":"1871-01",
               "series":[{"date":"1871-02","value":1.0},{"date":"1871-01","value":2.0}]}"#,
        )
        .unwrap();
        assert!(matches!(
            read_dataset(&path, 1),
            Err(PipelineError::ValidationFailed(ValidationFailure::NotIncreasing { index: 1, .. }))
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_missing_file() {
        let path = temp_dir().join("absent.json");
        assert!(matches!(read_dataset(&path, 1), Err(PipelineError::Read { .. })));
    }
}
