//! Python version tokens and the constraints conda records place on them.
//!
//! Required versions are written the way `conda search` prints them in
//! `python_abi` dependencies: `3.9.*`. A record's constraint is parsed from
//! its dependency list into a [`PythonConstraint`]:
//!
//! | dependency entry                | constraint              |
//! |---------------------------------|-------------------------|
//! | `python_abi 3.9.* *_cp39`       | `Exact("3.9.*")`        |
//! | `python >=3.9,<3.10.0a0`        | `Wildcard("3.9.*")`     |
//! | `python 3.9.* *_cpython`        | `Exact("3.9.*")`        |
//! | `noarch: python` record         | `Any`                   |
//! | nothing of the above            | `None`                  |
//!
//! Only the first `python`/`python_abi` entry in the list is considered.

use serde::{Deserialize, Serialize};

/// A required interpreter version such as `3.9.*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PythonVersion(String);

/// Error returned for a malformed Python version token.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Invalid Python version '{0}': expected MAJOR.MINOR or MAJOR.MINOR.*")]
pub struct PythonVersionError(pub String);

impl PythonVersion {
    /// Return the version token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build a `MAJOR.MINOR.*` wildcard from any dotted version, dropping
    /// patch levels and pre-release suffixes.
    fn wildcard_of(version: &str) -> Option<Self> {
        let mut parts = version.split('.');
        let major = parts.next().filter(|p| is_number(p))?;
        let minor: String = parts
            .next()?
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        if minor.is_empty() {
            return None;
        }
        Some(Self(format!("{major}.{minor}.*")))
    }
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

impl std::fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PythonVersion {
    type Err = PythonVersionError;

    /// Accepts `3.9`, `3.9.*` and `3.9.2` (which is kept verbatim).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let trimmed = s.strip_suffix(".*").unwrap_or(s);
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() < 2 || !parts.iter().all(|p| is_number(p)) {
            return Err(PythonVersionError(s.to_string()));
        }
        if parts.len() == 2 {
            Ok(Self(format!("{trimmed}.*")))
        } else {
            Ok(Self(s.to_string()))
        }
    }
}

impl TryFrom<String> for PythonVersion {
    type Error = PythonVersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PythonVersion> for String {
    fn from(v: PythonVersion) -> Self {
        v.0
    }
}

/// The interpreter versions a single release can be installed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PythonConstraint {
    /// Pinned to one interpreter build via `python_abi` or a bare `python X.Y.*`.
    Exact(PythonVersion),
    /// Lower bound of a `python >=X.Y,...` range, read as `X.Y.*`.
    Wildcard(PythonVersion),
    /// A `noarch: python` release, usable with any interpreter.
    Any,
    /// No interpreter dependency could be found; satisfies nothing.
    None,
}

impl PythonConstraint {
    /// Derive the constraint from a record's dependency list.
    pub fn from_depends<S: AsRef<str>>(depends: &[S]) -> Self {
        depends
            .iter()
            .find_map(|dep| Self::from_dependency(dep.as_ref()))
            .unwrap_or(Self::None)
    }

    /// Parse a single dependency entry; `None` if it is not a Python entry
    /// (or is one we cannot read).
    fn from_dependency(dep: &str) -> Option<Self> {
        let mut tokens = dep.split_whitespace();
        let name = tokens.next()?;
        let spec = tokens.next();

        match name {
            "python_abi" => Some(
                spec.and_then(|s| s.parse().ok())
                    .map_or(Self::None, Self::Exact),
            ),
            "python" => Some(spec.map_or(Self::None, Self::from_python_spec)),
            _ => None,
        }
    }

    fn from_python_spec(spec: &str) -> Self {
        if let Some(lower) = spec
            .split(',')
            .find_map(|part| part.trim().strip_prefix(">="))
        {
            return PythonVersion::wildcard_of(lower).map_or(Self::None, Self::Wildcard);
        }
        if spec.starts_with(|c: char| c.is_ascii_digit()) {
            return spec.parse().map_or(Self::None, Self::Exact);
        }
        Self::None
    }

    /// Whether this constraint admits the given required version.
    pub fn admits(&self, version: &PythonVersion) -> bool {
        match self {
            Self::Exact(v) | Self::Wildcard(v) => v == version,
            Self::Any => true,
            Self::None => false,
        }
    }
}
