use super::{CheckKind, Crossing, CrossingDetail, Outcome, Severity};
use crate::error::CheckError;
use crate::model::MetadataRecord;
use std::fs;
use std::io;
use std::path::Path;

/// Asserts that none of `paths` exist.
///
/// Paths are checked in order; the first one found yields a crossing at the
/// configured `severity` carrying its metadata. Symlinks are followed, so a
/// dangling link counts as absent.
pub fn existence_verdict<P: AsRef<Path>>(paths: &[P], severity: Severity) -> Outcome {
    for path in paths {
        let path = path.as_ref();
        if path.as_os_str().to_string_lossy().trim().is_empty() {
            return Outcome::Fatal(CheckError::EmptyPath);
        }

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(source) => {
                return Outcome::Fatal(CheckError::Existence {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        return match MetadataRecord::from_metadata(path.to_path_buf(), &metadata) {
            Ok(record) => Outcome::Crossed(Crossing {
                kind: CheckKind::Exists,
                severity,
                record: Some(record),
                detail: CrossingDetail::Exists,
            }),
            Err(source) => Outcome::Fatal(CheckError::Existence {
                path: path.to_path_buf(),
                source,
            }),
        };
    }

    Outcome::Ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_absent_paths_are_ok() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![dir.path().join("nope"), dir.path().join("also-nope")];
        assert!(existence_verdict(&paths, Severity::Critical).is_ok());
    }

    #[test]
    fn test_first_existing_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.lock");
        fs::write(&present, b"pid").unwrap();
        let paths = vec![dir.path().join("missing"), present.clone(), dir.path().to_path_buf()];

        match existence_verdict(&paths, Severity::Warning) {
            Outcome::Crossed(crossing) => {
                assert_eq!(crossing.kind, CheckKind::Exists);
                assert_eq!(crossing.severity, Severity::Warning);
                assert_eq!(crossing.record.unwrap().path, present);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_empty_path_is_fatal() {
        let paths = vec![PathBuf::from("  ")];
        assert!(matches!(
            existence_verdict(&paths, Severity::Critical),
            Outcome::Fatal(CheckError::EmptyPath)
        ));
    }
}
