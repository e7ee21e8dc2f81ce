//! Availability resolution for conda CI environments.
//!
//! Given pip-style requirement files, find out which of the requested
//! packages the conda index provides for every required (subdir, Python)
//! combination, and render an `environment.yml` listing those.
//!
//! ```text
//! requirements.txt ──► RequirementSet ──► sweep (conda search per subdir)
//!                                              │
//!                         Coverage ◄───────────┘
//!                            │
//!               available / wanted ──► environment.yml
//! ```

pub mod config;
pub mod coverage;
pub mod environment;
pub mod reporter;
pub mod requirements;
pub mod resolver;
pub mod search;

pub use condenv_schema as schema;

pub use config::Config;
pub use coverage::{Coverage, Matrix, Target};
pub use environment::{EnvironmentError, EnvironmentFile};
pub use reporter::{NullReporter, Reporter};
pub use requirements::{RequirementRules, RequirementSet};
pub use resolver::{Resolution, Resolver};
pub use search::{CondaSearch, SearchBackend};
