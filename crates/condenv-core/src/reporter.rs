//! Reporter trait for dependency injection
//!
//! Resolution steps report what they skipped, substituted, or could not
//! satisfy through this trait instead of a process-wide logger. The CLI maps
//! the calls onto its log file; tests and library callers can stay silent.

use crate::coverage::Target;
use condenv_schema::{Specifier, Subdir};
use std::path::Path;

pub trait Reporter {
    /// An environment marker was cut off a requirement line.
    fn marker_dropped(&self, line: &str, kept: &Specifier);

    /// A pip option conda cannot express was skipped.
    fn option_ignored(&self, file: &Path, line: &str);

    /// A second requirement for an already-requested package was dropped.
    fn duplicate_dropped(&self, kept: &Specifier, dropped: &Specifier);

    /// The index is about to be queried.
    fn querying(&self, spec: &Specifier, subdir: &Subdir);

    /// A subdir query failed and is being retried against `noarch`.
    fn noarch_fallback(&self, spec: &Specifier, subdir: &Subdir);

    /// No release covers the listed targets.
    fn unavailable(&self, name: &str, missing: &[Target]);

    /// Final classification of one specifier.
    fn classified(&self, spec: &Specifier, available: bool);
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn marker_dropped(&self, _: &str, _: &Specifier) {}
    fn option_ignored(&self, _: &Path, _: &str) {}
    fn duplicate_dropped(&self, _: &Specifier, _: &Specifier) {}
    fn querying(&self, _: &Specifier, _: &Subdir) {}
    fn noarch_fallback(&self, _: &Specifier, _: &Subdir) {}
    fn unavailable(&self, _: &str, _: &[Target]) {}
    fn classified(&self, _: &Specifier, _: bool) {}
}
