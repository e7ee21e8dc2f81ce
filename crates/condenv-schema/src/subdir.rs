//! Conda platform subdirectories.
//!
//! A subdir names the OS + CPU combination a conda package was built for
//! (`linux-64`, `osx-arm64`, ...). The special `noarch` subdir holds
//! platform-independent packages that install anywhere.
//!
//! # Example
//!
//! ```
//! use condenv_schema::Subdir;
//!
//! let linux: Subdir = "linux-64".parse().unwrap();
//! assert!(!linux.is_noarch());
//! assert!(Subdir::noarch().is_noarch());
//! ```

use serde::{Deserialize, Serialize};

const NOARCH: &str = "noarch";

/// A conda subdir identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subdir(String);

/// Error returned when a string is not a usable subdir name.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Invalid subdir '{0}': expected something like 'linux-64' or 'noarch'")]
pub struct SubdirError(pub String);

impl Subdir {
    /// The platform-independent pseudo-platform.
    pub fn noarch() -> Self {
        Self(NOARCH.to_string())
    }

    /// Whether this is the platform-independent pseudo-platform.
    pub fn is_noarch(&self) -> bool {
        self.0 == NOARCH
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Subdir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Subdir {
    type Err = SubdirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        // Goes straight into `name[subdir=...]` on the conda command line.
        let valid = !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(s))
        } else {
            Err(SubdirError(s))
        }
    }
}

impl TryFrom<String> for Subdir {
    type Error = SubdirError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Subdir> for String {
    fn from(subdir: Subdir) -> Self {
        subdir.0
    }
}
