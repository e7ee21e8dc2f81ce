//! Coverage of the required (subdir × Python) matrix by index records.
//!
//! Each record contributes the set of targets it can be installed on; a
//! specifier is available once the contributions cover the whole matrix.
//! Overlapping contributions are expected (many builds cover the same
//! target) and never take coverage away.

use condenv_schema::{IndexRecord, PythonConstraint, PythonVersion, Subdir};
use std::collections::BTreeSet;

/// One (subdir, Python version) pair that must be installable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target {
    pub subdir: Subdir,
    pub python: PythonVersion,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.subdir, self.python)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MatrixError {
    #[error("At least one required platform is needed")]
    NoPlatforms,

    #[error("At least one required Python version is needed")]
    NoPythons,

    #[error("'noarch' cannot be a required platform; noarch releases already cover every platform")]
    NoarchRequired,
}

/// The required platforms and interpreter versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    platforms: Vec<Subdir>,
    pythons: Vec<PythonVersion>,
}

impl Matrix {
    /// Create a matrix. Platforms keep their order, which is also the order
    /// the index is queried in.
    ///
    /// # Errors
    ///
    /// Returns an error if either axis is empty or `noarch` is listed as a
    /// required platform.
    pub fn new(platforms: Vec<Subdir>, pythons: Vec<PythonVersion>) -> Result<Self, MatrixError> {
        if platforms.is_empty() {
            return Err(MatrixError::NoPlatforms);
        }
        if pythons.is_empty() {
            return Err(MatrixError::NoPythons);
        }
        if platforms.iter().any(Subdir::is_noarch) {
            return Err(MatrixError::NoarchRequired);
        }
        Ok(Self { platforms, pythons })
    }

    pub fn platforms(&self) -> &[Subdir] {
        &self.platforms
    }

    pub fn pythons(&self) -> &[PythonVersion] {
        &self.pythons
    }

    /// Every target of the matrix.
    pub fn targets(&self) -> BTreeSet<Target> {
        product(self.platforms.iter(), self.pythons.iter())
    }
}

fn product<'a>(
    subdirs: impl Iterator<Item = &'a Subdir>,
    pythons: impl Iterator<Item = &'a PythonVersion> + Clone,
) -> BTreeSet<Target> {
    subdirs
        .flat_map(|subdir| {
            pythons.clone().map(move |python| Target {
                subdir: subdir.clone(),
                python: python.clone(),
            })
        })
        .collect()
}

/// Outcome of checking one specifier's records against the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coverage {
    /// Every target is covered by at least one record.
    Complete,
    /// Some targets remain uncovered.
    Incomplete {
        /// Name of the last record that was considered, if any was.
        last_name: Option<String>,
        /// The uncovered targets, sorted.
        missing: Vec<Target>,
    },
}

impl Coverage {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Whether a record was published for a subdir this matrix cares about.
fn is_relevant(record: &IndexRecord, matrix: &Matrix) -> bool {
    record.is_platform_independent() || matrix.platforms.contains(&record.subdir)
}

/// The targets a single record makes installable.
///
/// Records for subdirs outside the matrix contribute nothing; `noarch`
/// records count for every required platform, and `noarch: python` records
/// for every required interpreter.
pub fn covered_targets(record: &IndexRecord, matrix: &Matrix) -> BTreeSet<Target> {
    if !is_relevant(record, matrix) {
        return BTreeSet::new();
    }

    let constraint = record.python_constraint();
    if constraint == PythonConstraint::None {
        return BTreeSet::new();
    }
    let pythons = matrix.pythons.iter().filter(|v| constraint.admits(v));

    if record.is_platform_independent() {
        product(matrix.platforms.iter(), pythons)
    } else {
        product(std::iter::once(&record.subdir), pythons)
    }
}

/// Check records (in index order) against the matrix, stopping as soon as
/// everything is covered.
pub fn evaluate(records: &[IndexRecord], matrix: &Matrix) -> Coverage {
    let mut remaining = matrix.targets();
    let mut last_name = None;

    for record in records.iter().filter(|r| is_relevant(r, matrix)) {
        for target in covered_targets(record, matrix) {
            remaining.remove(&target);
        }
        if remaining.is_empty() {
            return Coverage::Complete;
        }
        last_name = Some(record.name.clone());
    }

    Coverage::Incomplete {
        last_name,
        missing: remaining.into_iter().collect(),
    }
}

/// Convenience wrapper around [`evaluate`].
pub fn is_available(records: &[IndexRecord], matrix: &Matrix) -> bool {
    evaluate(records, matrix).is_complete()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn matrix(platforms: &[&str], pythons: &[&str]) -> Matrix {
        Matrix::new(
            platforms.iter().map(|p| p.parse().unwrap()).collect(),
            pythons.iter().map(|p| p.parse().unwrap()).collect(),
        )
        .unwrap()
    }

    pub(crate) fn record(name: &str, subdir: &str, depends: &[&str]) -> IndexRecord {
        IndexRecord {
            name: name.into(),
            version: "1.0.0".into(),
            build: "0".into(),
            subdir: subdir.parse().unwrap(),
            depends: depends.iter().map(ToString::to_string).collect(),
            noarch: None,
            package_type: None,
        }
    }

    pub(crate) fn noarch_python(name: &str) -> IndexRecord {
        IndexRecord {
            noarch: Some(serde_json::Value::String("python".into())),
            package_type: Some("noarch_python".into()),
            ..record(name, "noarch", &["python >=3.6"])
        }
    }

    #[test]
    fn test_matrix_validation() {
        assert_eq!(
            Matrix::new(vec![], vec!["3.8".parse().unwrap()]),
            Err(MatrixError::NoPlatforms)
        );
        assert_eq!(
            Matrix::new(vec!["linux-64".parse().unwrap()], vec![]),
            Err(MatrixError::NoPythons)
        );
        assert_eq!(
            Matrix::new(vec![Subdir::noarch()], vec!["3.8".parse().unwrap()]),
            Err(MatrixError::NoarchRequired)
        );
        assert_eq!(matrix(&["a", "b", "c"], &["3.8", "3.9"]).targets().len(), 6);
    }

    #[test]
    fn test_empty_records_are_incomplete() {
        let m = matrix(&["linux-64"], &["3.9"]);
        assert_eq!(
            evaluate(&[], &m),
            Coverage::Incomplete {
                last_name: None,
                missing: m.targets().into_iter().collect(),
            }
        );
    }

    #[test]
    fn test_single_platform_single_version_is_wanted() {
        let m = matrix(&["a", "b", "c"], &["3.8", "3.9"]);
        let records = vec![record("pkg", "a", &["python_abi 3.8.* *_cp38"])];

        match evaluate(&records, &m) {
            Coverage::Incomplete { last_name, missing } => {
                assert_eq!(last_name.as_deref(), Some("pkg"));
                assert_eq!(missing.len(), 5);
                assert!(!missing.iter().any(|t| t.subdir.as_str() == "a"
                    && t.python.as_str() == "3.8.*"));
            }
            Coverage::Complete => panic!("expected incomplete coverage"),
        }
    }

    #[test]
    fn test_noarch_abi_pinned_record_misses_other_versions() {
        let m = matrix(&["a", "b", "c"], &["3.8", "3.9"]);
        let records = vec![record("pkg", "noarch", &["python_abi 3.8.* *_cp38"])];

        match evaluate(&records, &m) {
            Coverage::Incomplete { missing, .. } => {
                assert_eq!(missing.len(), 3);
                assert!(missing.iter().all(|t| t.python.as_str() == "3.9.*"));
            }
            Coverage::Complete => panic!("expected incomplete coverage"),
        }
    }

    #[test]
    fn test_noarch_python_covers_any_matrix() {
        let small = matrix(&["linux-64"], &["3.9"]);
        let large = matrix(
            &["linux-64", "osx-64", "win-64", "osx-arm64", "linux-aarch64"],
            &["3.7", "3.8", "3.9", "3.10", "3.11"],
        );
        let records = vec![noarch_python("tqdm")];
        assert!(is_available(&records, &small));
        assert!(is_available(&records, &large));
    }

    #[test]
    fn test_builds_combine_across_platforms() {
        let m = matrix(&["linux-64", "win-64"], &["3.8", "3.9"]);
        let records = vec![
            record("numpy", "linux-64", &["python >=3.8,<3.9.0a0"]),
            record("numpy", "linux-64", &["python_abi 3.9.* *_cp39"]),
            // duplicate coverage is harmless
            record("numpy", "linux-64", &["python_abi 3.9.* *_cp39"]),
            record("numpy", "win-64", &["python_abi 3.8.* *_cp38"]),
            record("numpy", "win-64", &["python_abi 3.9.* *_cp39"]),
        ];
        assert!(is_available(&records, &m));
        assert!(!is_available(&records[..4], &m));
    }

    #[test]
    fn test_foreign_subdirs_are_ignored() {
        let m = matrix(&["linux-64"], &["3.9"]);
        let foreign = record("pkg", "linux-ppc64le", &["python_abi 3.9.* *_cp39"]);
        assert!(covered_targets(&foreign, &m).is_empty());

        match evaluate(&[foreign], &m) {
            Coverage::Incomplete { last_name, .. } => assert_eq!(last_name, None),
            Coverage::Complete => panic!("expected incomplete coverage"),
        }
    }

    #[test]
    fn test_records_without_python_cover_nothing() {
        let m = matrix(&["linux-64"], &["3.9"]);
        let lib = record("libfoo", "linux-64", &["libgcc-ng >=9"]);
        assert!(covered_targets(&lib, &m).is_empty());
        assert!(!is_available(&[lib], &m));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let m = matrix(&["linux-64", "osx-64"], &["3.8", "3.9"]);
        let records = vec![
            record("scipy", "linux-64", &["python_abi 3.8.* *_cp38"]),
            record("scipy", "osx-64", &["python_abi 3.9.* *_cp39"]),
        ];
        assert_eq!(evaluate(&records, &m), evaluate(&records, &m));
    }
}
