use crate::coverage::{Coverage, Matrix, evaluate};
use crate::environment::{EnvironmentError, EnvironmentFile};
use crate::reporter::Reporter;
use crate::requirements::{RequirementRules, RequirementSet, RequirementsError};
use crate::search::{SearchBackend, SearchError, sweep};
use condenv_schema::Specifier;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Requirements(#[from] RequirementsError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}

/// Split of the requested packages by availability. Both lists are sorted by
/// name and together hold every requested package exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub available: Vec<Specifier>,
    pub wanted: Vec<Specifier>,
}

impl Resolution {
    /// Render the environment file listing only the available packages.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Environment`] if the file cannot be rendered
    /// or written.
    pub fn write_environment(&self, env: &EnvironmentFile, path: &Path) -> Result<(), ResolveError> {
        Ok(env.write(path, &self.available)?)
    }
}

/// Drives parsing, querying and coverage for a batch of requirement files.
pub struct Resolver<'a> {
    backend: &'a dyn SearchBackend,
    matrix: Matrix,
    rules: RequirementRules,
    reporter: &'a dyn Reporter,
}

impl<'a> Resolver<'a> {
    pub fn new(
        backend: &'a dyn SearchBackend,
        matrix: Matrix,
        rules: RequirementRules,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            backend,
            matrix,
            rules,
            reporter,
        }
    }

    /// Parse `requirement_files` and classify every requested package.
    ///
    /// # Errors
    ///
    /// Fails on unreadable requirement files and on index failures other
    /// than "not found". Unmet coverage is not an error; it lands in
    /// [`Resolution::wanted`].
    pub fn resolve<P: AsRef<Path>>(&self, requirement_files: &[P]) -> Result<Resolution, ResolveError> {
        let requested = RequirementSet::from_files(requirement_files, &self.rules, self.reporter)?;
        self.classify(&requested)
    }

    /// Classify an already-parsed set.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    pub fn classify(&self, requested: &RequirementSet) -> Result<Resolution, ResolveError> {
        let mut resolution = Resolution::default();

        for spec in requested {
            let available = self.is_available(spec)?;
            self.reporter.classified(spec, available);
            if available {
                resolution.available.push(spec.clone());
            } else {
                resolution.wanted.push(spec.clone());
            }
        }

        Ok(resolution)
    }

    fn is_available(&self, spec: &Specifier) -> Result<bool, SearchError> {
        let records = sweep(self.backend, spec, self.matrix.platforms(), self.reporter)?;

        match evaluate(&records, &self.matrix) {
            Coverage::Complete => Ok(true),
            Coverage::Incomplete { last_name, missing } => {
                let name = last_name.unwrap_or_else(|| spec.name().to_string());
                self.reporter.unavailable(&name, &missing);
                Ok(false)
            }
        }
    }
}
