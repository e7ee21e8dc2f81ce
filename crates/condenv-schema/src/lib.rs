//! Shared types for condenv.
//!
//! Everything here is plain data: package names and requirement specifiers,
//! conda subdirs, Python version tokens, and the records `conda search --json`
//! prints. The resolution logic lives in `condenv-core`.

pub mod python;
pub mod record;
pub mod subdir;
pub mod types;

// Re-exports
pub use python::{PythonConstraint, PythonVersion, PythonVersionError};
pub use record::{IndexRecord, SearchFailure, SearchOutput};
pub use subdir::{Subdir, SubdirError};
pub use types::*;

/// Banner written at the top and bottom of every generated environment file.
pub const AUTOGENERATED_BANNER: &str = "# THIS FILE IS AUTOGENERATED -- DO NOT EDIT #";
