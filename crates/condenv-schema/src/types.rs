//! Package names and requirement specifiers.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A normalized (lowercase) package name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageName(String);

impl PackageName {
    /// Create a new package name, normalizing the input to lowercase.
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    /// Return the normalized name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index output spells names as published; compare them case-insensitively.
impl PartialEq<str> for PackageName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.to_lowercase()
    }
}

/// Errors produced while parsing a [`Specifier`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SpecifierError {
    /// The line was empty after trimming.
    #[error("Empty requirement specifier")]
    Empty,

    /// The line does not start with a package name.
    #[error("Requirement '{0}' does not start with a package name")]
    MissingName(String),
}

/// A requested package: a name plus an optional constraint, as written in a
/// requirement file (`numpy>=1.20`, `scipy`, `pytorch-cpu ==1.9`).
///
/// Identity is the normalized name. Two specifiers naming the same package
/// compare equal regardless of their constraints, and specifiers sort by name.
#[derive(Debug, Clone)]
pub struct Specifier {
    name: PackageName,
    written_name: String,
    tail: String,
}

impl Specifier {
    /// Parse a specifier from a single requirement line.
    ///
    /// The name is the leading run of `[A-Za-z0-9._-]`; whatever follows
    /// (comparators, versions, extras) is kept verbatim as the constraint.
    ///
    /// # Errors
    ///
    /// Returns [`SpecifierError::Empty`] for a blank line and
    /// [`SpecifierError::MissingName`] if the line starts with a constraint
    /// character instead of a name.
    pub fn parse(line: &str) -> Result<Self, SpecifierError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(SpecifierError::Empty);
        }

        let end = line
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
            .unwrap_or(line.len());
        if end == 0 {
            return Err(SpecifierError::MissingName(line.to_string()));
        }

        let (written_name, tail) = line.split_at(end);
        Ok(Self {
            name: PackageName::new(written_name),
            written_name: written_name.to_string(),
            tail: tail.to_string(),
        })
    }

    /// The normalized package name.
    pub fn name(&self) -> &PackageName {
        &self.name
    }

    /// The constraint text following the name, if any (e.g. `>=1.20`).
    pub fn constraint(&self) -> Option<&str> {
        let c = self.tail.trim();
        (!c.is_empty()).then_some(c)
    }

    /// Return a copy of this specifier published under a different name.
    ///
    /// Only the name changes; the constraint is kept as written.
    pub fn renamed(&self, name: &str) -> Self {
        Self {
            name: PackageName::new(name),
            written_name: name.trim().to_string(),
            tail: self.tail.clone(),
        }
    }
}

impl std::fmt::Display for Specifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.written_name, self.tail)
    }
}

impl std::str::FromStr for Specifier {
    type Err = SpecifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for Specifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Specifier {}

impl Hash for Specifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Specifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Specifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}
