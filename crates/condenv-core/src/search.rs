//! Queries against the conda package index.
//!
//! `conda search` only looks at the host's native subdir unless told
//! otherwise, so every query names its subdir explicitly:
//! `conda search --channel=<channel> --json "<spec>[subdir=<subdir>]"`.

use crate::reporter::Reporter;
use condenv_schema::{IndexRecord, SearchFailure, SearchOutput, Specifier, Subdir};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("'{0}' not found. Install conda or pass its path with --conda")]
    ProgramNotFound(String),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No package matches {spec} on {subdir}")]
    NotFound { spec: String, subdir: Subdir },

    #[error("conda search failed for {spec} on {subdir}: {message}")]
    Tool {
        spec: String,
        subdir: Subdir,
        message: String,
    },

    #[error("Malformed conda search output for {spec} on {subdir}: {source}")]
    Json {
        spec: String,
        subdir: Subdir,
        #[source]
        source: serde_json::Error,
    },
}

impl SearchError {
    /// Whether the index tool ran and reported a failure (as opposed to
    /// not running at all or printing garbage).
    pub fn is_tool_failure(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Tool { .. })
    }
}

/// Something that can list the releases of a specifier on one subdir.
pub trait SearchBackend {
    /// Run a single query.
    ///
    /// # Errors
    ///
    /// [`SearchError::NotFound`] when nothing matches, other variants when
    /// the query itself could not be completed.
    fn search(&self, spec: &Specifier, subdir: &Subdir) -> Result<SearchOutput, SearchError>;
}

/// The production backend: shells out to `conda search`.
#[derive(Debug, Clone)]
pub struct CondaSearch {
    program: PathBuf,
    channel: String,
}

impl CondaSearch {
    /// Use an explicit conda executable.
    pub fn new(program: impl Into<PathBuf>, channel: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            channel: channel.into(),
        }
    }

    /// Locate `conda` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ProgramNotFound`] if no executable is found.
    pub fn from_path(channel: impl Into<String>) -> Result<Self, SearchError> {
        let program =
            which::which("conda").map_err(|_| SearchError::ProgramNotFound("conda".into()))?;
        Ok(Self::new(program, channel))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    fn args(&self, spec: &Specifier, subdir: &Subdir) -> Vec<String> {
        vec![
            "search".to_string(),
            format!("--channel={}", self.channel),
            "--json".to_string(),
            format!("{spec}[subdir={subdir}]"),
        ]
    }
}

impl SearchBackend for CondaSearch {
    fn search(&self, spec: &Specifier, subdir: &Subdir) -> Result<SearchOutput, SearchError> {
        let args = self.args(spec, subdir);
        tracing::trace!("{} {}", self.program.display(), args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| SearchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            return serde_json::from_slice(&output.stdout).map_err(|source| SearchError::Json {
                spec: spec.to_string(),
                subdir: subdir.clone(),
                source,
            });
        }

        // conda --json reports errors on stdout; fall back to stderr for anything else.
        match serde_json::from_slice::<SearchFailure>(&output.stdout) {
            Ok(failure) if failure.is_not_found() => Err(SearchError::NotFound {
                spec: spec.to_string(),
                subdir: subdir.clone(),
            }),
            Ok(failure) => Err(SearchError::Tool {
                spec: spec.to_string(),
                subdir: subdir.clone(),
                message: failure.error,
            }),
            Err(_) => Err(SearchError::Tool {
                spec: spec.to_string(),
                subdir: subdir.clone(),
                message: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }),
        }
    }
}

/// Result of [`query`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// The subdir that answered, or `None` if nothing was found anywhere.
    pub matched: Option<Subdir>,
    /// Releases of the requested package, newest first.
    pub records: Vec<IndexRecord>,
}

/// Query one subdir, falling back to `noarch` once if the tool fails.
///
/// Only records published under the specifier's own name are kept, newest
/// first.
///
/// # Errors
///
/// Returns any failure other than "not found" from the `noarch` attempt, as
/// well as spawn and decoding failures from any attempt.
pub fn query(
    backend: &dyn SearchBackend,
    spec: &Specifier,
    subdir: &Subdir,
    reporter: &dyn Reporter,
) -> Result<QueryResult, SearchError> {
    reporter.querying(spec, subdir);

    match backend.search(spec, subdir) {
        Ok(output) => {
            let mut records: Vec<IndexRecord> = output
                .into_iter()
                .filter(|(name, _)| spec.name() == name.as_str())
                .flat_map(|(_, records)| records)
                .collect();
            records.reverse();
            Ok(QueryResult {
                matched: Some(subdir.clone()),
                records,
            })
        }
        Err(err) if err.is_tool_failure() && !subdir.is_noarch() => {
            reporter.noarch_fallback(spec, subdir);
            query(backend, spec, &Subdir::noarch(), reporter)
        }
        Err(SearchError::NotFound { .. }) => Ok(QueryResult::default()),
        Err(err) => Err(err),
    }
}

/// Query every required platform in order, stopping early once a `noarch`
/// answer arrives (it already applies to all platforms).
///
/// # Errors
///
/// Propagates the first fatal [`query`] error.
pub fn sweep(
    backend: &dyn SearchBackend,
    spec: &Specifier,
    platforms: &[Subdir],
    reporter: &dyn Reporter,
) -> Result<Vec<IndexRecord>, SearchError> {
    let mut records = Vec::new();
    for subdir in platforms {
        let result = query(backend, spec, subdir, reporter)?;
        records.extend(result.records);
        if result.matched.as_ref().is_some_and(Subdir::is_noarch) {
            break;
        }
    }
    Ok(records)
}
