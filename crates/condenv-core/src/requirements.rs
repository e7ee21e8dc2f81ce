//! Parses the subset of pip requirement-file syntax that maps onto conda.
//!
//! Supported:
//!  * PEP 508-ish `name[constraint]` lines
//!  * `-r <file>`, `-r<file>` and `--requirement <file>` includes, relative to
//!    the including file
//!  * `# comments`, full-line and trailing
//!  * environment markers (`; python_version < "3.9"`), which are dropped
//!
//! Every other option line (`-c`, `-e`, `--index-url`, ...) is skipped.

use crate::reporter::Reporter;
use condenv_schema::{PackageName, Specifier, SpecifierError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum RequirementsError {
    #[error("Requirement file not found: {0}")]
    Missing(PathBuf),

    #[error("Requirement path is not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {source}")]
    Specifier {
        path: PathBuf,
        line: usize,
        #[source]
        source: SpecifierError,
    },

    #[error("{path}:{line}: '-r' without a file name")]
    EmptyInclude { path: PathBuf, line: usize },

    #[error("Include cycle: {0} is already being parsed")]
    IncludeCycle(PathBuf),
}

/// Name rewrites applied to every parsed specifier.
#[derive(Debug, Clone, Default)]
pub struct RequirementRules {
    /// PyPI name to conda name (e.g. `torch` to `pytorch-cpu`).
    pub rename: BTreeMap<PackageName, String>,
    /// Packages that are never requested from conda.
    pub blocklist: BTreeSet<PackageName>,
}

enum Line<'a> {
    Blank,
    Include(&'a str),
    Option,
    Requirement(&'a str),
}

fn classify(raw: &str) -> Line<'_> {
    let line = match raw.find(" #") {
        Some(i) => &raw[..i],
        None => raw,
    }
    .trim();

    if line.is_empty() || line.starts_with('#') {
        return Line::Blank;
    }
    if let Some(rest) = line.strip_prefix("--requirement") {
        if rest.starts_with([' ', '\t', '=']) || rest.is_empty() {
            return Line::Include(rest.trim_start_matches('=').trim());
        }
    }
    // Short form takes the path attached too: `-rbase.txt`.
    if let Some(rest) = line.strip_prefix("-r") {
        return Line::Include(rest.trim_start_matches('=').trim());
    }
    if line.starts_with('-') {
        return Line::Option;
    }
    Line::Requirement(line)
}

struct Parser<'r> {
    rules: &'r RequirementRules,
    reporter: &'r dyn Reporter,
    stack: Vec<PathBuf>,
}

impl Parser<'_> {
    fn parse(&mut self, path: &Path) -> Result<Vec<Specifier>, RequirementsError> {
        if !path.exists() {
            return Err(RequirementsError::Missing(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(RequirementsError::NotAFile(path.to_path_buf()));
        }
        let canonical = path.canonicalize().map_err(|source| RequirementsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if self.stack.contains(&canonical) {
            return Err(RequirementsError::IncludeCycle(canonical));
        }

        let content = std::fs::read_to_string(&canonical).map_err(|source| {
            RequirementsError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let base = canonical.parent().map(Path::to_path_buf).unwrap_or_default();

        self.stack.push(canonical);
        let result = self.parse_lines(path, &base, &content);
        self.stack.pop();
        result
    }

    fn parse_lines(
        &mut self,
        path: &Path,
        base: &Path,
        content: &str,
    ) -> Result<Vec<Specifier>, RequirementsError> {
        let mut specs = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            match classify(raw) {
                Line::Blank => {}
                Line::Include("") => {
                    return Err(RequirementsError::EmptyInclude {
                        path: path.to_path_buf(),
                        line: idx + 1,
                    });
                }
                Line::Include(target) => specs.extend(self.parse(&base.join(target))?),
                Line::Option => self.reporter.option_ignored(path, raw.trim()),
                Line::Requirement(line) => {
                    let spec = self.requirement(line).map_err(|source| {
                        RequirementsError::Specifier {
                            path: path.to_path_buf(),
                            line: idx + 1,
                            source,
                        }
                    })?;
                    specs.extend(spec);
                }
            }
        }

        Ok(specs)
    }

    fn requirement(&self, line: &str) -> Result<Option<Specifier>, SpecifierError> {
        let spec = match line.split_once(';') {
            Some((kept, _marker)) => {
                let spec = Specifier::parse(kept)?;
                self.reporter.marker_dropped(line, &spec);
                spec
            }
            None => Specifier::parse(line)?,
        };

        if self.rules.blocklist.contains(spec.name()) {
            return Ok(None);
        }
        Ok(Some(match self.rules.rename.get(spec.name()) {
            Some(conda_name) => spec.renamed(conda_name),
            None => spec,
        }))
    }
}

/// Parse one requirement file (and everything it includes) into specifiers,
/// in file order.
///
/// # Errors
///
/// Fails if any file in the include tree is missing, not a regular file,
/// unreadable, contains a line that is not a specifier, or includes itself.
pub fn parse_file(
    path: &Path,
    rules: &RequirementRules,
    reporter: &dyn Reporter,
) -> Result<Vec<Specifier>, RequirementsError> {
    Parser {
        rules,
        reporter,
        stack: Vec::new(),
    }
    .parse(path)
}

/// The deduplicated set of requested packages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementSet(BTreeSet<Specifier>);

impl RequirementSet {
    /// Parse and merge several requirement files.
    ///
    /// When two lines name the same package the first one wins.
    ///
    /// # Errors
    ///
    /// See [`parse_file`].
    pub fn from_files<P: AsRef<Path>>(
        paths: &[P],
        rules: &RequirementRules,
        reporter: &dyn Reporter,
    ) -> Result<Self, RequirementsError> {
        let mut set = Self::default();
        for path in paths {
            for spec in parse_file(path.as_ref(), rules, reporter)? {
                set.insert(spec, reporter);
            }
        }
        Ok(set)
    }

    fn insert(&mut self, spec: Specifier, reporter: &dyn Reporter) {
        if let Some(kept) = self.0.get(&spec) {
            if kept.to_string() != spec.to_string() {
                reporter.duplicate_dropped(kept, &spec);
            }
            return;
        }
        self.0.insert(spec);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Specifiers sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Specifier> {
        self.0.iter()
    }

    pub fn contains(&self, spec: &Specifier) -> bool {
        self.0.contains(spec)
    }
}

impl FromIterator<Specifier> for RequirementSet {
    fn from_iter<T: IntoIterator<Item = Specifier>>(iter: T) -> Self {
        let mut set = Self::default();
        for spec in iter {
            set.insert(spec, &crate::reporter::NullReporter);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RequirementSet {
    type Item = &'a Specifier;
    type IntoIter = std::collections::btree_set::Iter<'a, Specifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
