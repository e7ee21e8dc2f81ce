//! Wire format of `conda search --json`.
//!
//! On success conda prints an object mapping each package name to its list of
//! release records, oldest first. On failure it prints an object with an
//! `error` field (and exits non-zero).

use crate::python::PythonConstraint;
use crate::subdir::Subdir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `package_type` value conda uses for pure-Python noarch releases.
const NOARCH_PYTHON_PACKAGE_TYPE: &str = "noarch_python";

/// One release entry from the package index.
///
/// Only the fields the availability check needs are kept; anything else in
/// the JSON is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Published package name.
    pub name: String,

    /// Release version string.
    #[serde(default)]
    pub version: String,

    /// Build string (e.g. `py39h1234_0`).
    #[serde(default)]
    pub build: String,

    /// Subdir the release was published for.
    pub subdir: Subdir,

    /// Declared run dependencies, as raw match-spec strings.
    #[serde(default)]
    pub depends: Vec<String>,

    /// `noarch` kind (`"python"`, `"generic"`), or a legacy boolean.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noarch: Option<serde_json::Value>,

    /// Package type reported by newer conda versions (`noarch_python`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,
}

impl IndexRecord {
    /// Whether the release installs on every platform.
    pub fn is_platform_independent(&self) -> bool {
        self.subdir.is_noarch()
    }

    /// Whether the release declares itself usable with any interpreter version.
    pub fn is_python_independent(&self) -> bool {
        if self.package_type.as_deref() == Some(NOARCH_PYTHON_PACKAGE_TYPE) {
            return true;
        }
        matches!(&self.noarch, Some(serde_json::Value::String(kind)) if kind == "python")
    }

    /// The interpreter constraint of this release.
    pub fn python_constraint(&self) -> PythonConstraint {
        if self.is_python_independent() {
            PythonConstraint::Any
        } else {
            PythonConstraint::from_depends(&self.depends)
        }
    }
}

/// Successful `conda search --json` output: package name to releases.
pub type SearchOutput = BTreeMap<String, Vec<IndexRecord>>;

/// Failed `conda search --json` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFailure {
    /// Human-readable error, usually prefixed with the exception name.
    pub error: String,

    /// Exception class name, when conda provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_name: Option<String>,
}

impl SearchFailure {
    /// Whether conda reported that no package matched the query.
    pub fn is_not_found(&self) -> bool {
        self.exception_name.as_deref() == Some("PackagesNotFoundError")
            || self.error.contains("PackagesNotFoundError")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "numpy": [
        {
          "build": "py39h0",
          "build_number": 0,
          "depends": ["libblas >=3.8.0,<4.0a0", "python >=3.9,<3.10.0a0", "python_abi 3.9.* *_cp39"],
          "name": "numpy",
          "subdir": "linux-64",
          "version": "1.21.0"
        }
      ],
      "typing_extensions": [
        {
          "depends": ["python >=3.6"],
          "name": "typing_extensions",
          "noarch": "python",
          "package_type": "noarch_python",
          "subdir": "noarch",
          "version": "4.0.0"
        }
      ]
    }"#;

    #[test]
    fn test_parse_search_output() {
        let out: SearchOutput = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(out.len(), 2);

        let numpy = &out["numpy"][0];
        assert_eq!(numpy.subdir.as_str(), "linux-64");
        assert!(!numpy.is_platform_independent());
        assert_eq!(
            numpy.python_constraint(),
            PythonConstraint::Wildcard("3.9".parse().unwrap())
        );

        let te = &out["typing_extensions"][0];
        assert!(te.is_platform_independent());
        assert!(te.is_python_independent());
        assert_eq!(te.python_constraint(), PythonConstraint::Any);
    }

    #[test]
    fn test_legacy_boolean_noarch_is_not_python() {
        let rec: IndexRecord = serde_json::from_str(
            r#"{"name": "x", "subdir": "noarch", "noarch": true, "depends": []}"#,
        )
        .unwrap();
        assert!(!rec.is_python_independent());
    }

    #[test]
    fn test_not_found_failure() {
        let failure: SearchFailure = serde_json::from_str(
            r#"{"caused_by": "None", "error": "PackagesNotFoundError: The following packages are not available", "exception_name": "PackagesNotFoundError"}"#,
        )
        .unwrap();
        assert!(failure.is_not_found());

        let other = SearchFailure {
            error: "CondaHTTPError: HTTP 000 CONNECTION FAILED".into(),
            exception_name: None,
        };
        assert!(!other.is_not_found());
    }
}
