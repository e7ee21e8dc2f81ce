//! `condenv.toml` configuration.
//!
//! Every key is optional; an empty file (or no file) yields the defaults
//! below, which describe a conda-forge CI environment for the three desktop
//! platforms.
//!
//! ```toml
//! channel = "conda-forge"
//! platforms = ["osx-64", "linux-64", "win-64"]
//! pythons = ["3.8", "3.9"]
//! blocklist = []
//!
//! [rename]
//! torch = "pytorch-cpu"
//!
//! [environment]
//! name = "ci"
//! dependencies = ["anaconda-client", "conda-build", "pip"]
//! pip_requirements = ["../requirements-ci.txt"]
//! ```

use crate::coverage::{Matrix, MatrixError};
use crate::environment::EnvironmentFile;
use crate::requirements::RequirementRules;
use condenv_schema::{PackageName, PythonVersion, Subdir};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the config file picked up from the working directory.
pub const CONFIG_FILE_NAME: &str = "condenv.toml";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid matrix: {0}")]
    Matrix(#[from] MatrixError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Channel passed to every `conda search`.
    pub channel: String,
    /// Required subdirs, queried in this order.
    pub platforms: Vec<Subdir>,
    /// Required Python versions.
    pub pythons: Vec<PythonVersion>,
    /// PyPI name to conda name.
    pub rename: BTreeMap<String, String>,
    /// Packages never requested from conda.
    pub blocklist: Vec<String>,
    /// Contents of the generated environment file besides the package list.
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    pub name: String,
    /// Always-installed dependencies listed before the resolved packages.
    pub dependencies: Vec<String>,
    /// Files referenced from the `pip:` section.
    pub pip_requirements: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: "conda-forge".to_string(),
            platforms: ["osx-64", "linux-64", "win-64"]
                .into_iter()
                .filter_map(|s| s.parse().ok())
                .collect(),
            pythons: ["3.8.*", "3.9.*"]
                .into_iter()
                .filter_map(|s| s.parse().ok())
                .collect(),
            rename: BTreeMap::from([("torch".to_string(), "pytorch-cpu".to_string())]),
            blocklist: Vec::new(),
            environment: EnvironmentConfig::default(),
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name: "ci".to_string(),
            dependencies: vec![
                "anaconda-client".to_string(),
                "conda-build".to_string(),
                "pip".to_string(),
            ],
            pip_requirements: Vec::new(),
        }
    }
}

impl Config {
    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML for
    /// this schema, or describes an empty matrix.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `condenv.toml` from `dir` if present, defaults otherwise.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check that the matrix can be built.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Matrix`] for an empty axis or a `noarch` platform.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matrix().map(|_| ())
    }

    /// The required platform × Python matrix.
    ///
    /// # Errors
    ///
    /// See [`Matrix::new`].
    pub fn matrix(&self) -> Result<Matrix, ConfigError> {
        Ok(Matrix::new(self.platforms.clone(), self.pythons.clone())?)
    }

    /// Name rewrites for the requirement parser.
    pub fn rules(&self) -> RequirementRules {
        RequirementRules {
            rename: self
                .rename
                .iter()
                .map(|(from, to)| (PackageName::new(from), to.clone()))
                .collect(),
            blocklist: self.blocklist.iter().map(|n| PackageName::new(n)).collect(),
        }
    }

    /// The environment file skeleton, with the configured channel.
    pub fn environment_file(&self) -> EnvironmentFile {
        EnvironmentFile {
            name: self.environment.name.clone(),
            channels: vec![self.channel.clone()],
            dependencies: self.environment.dependencies.clone(),
            pip_requirements: self.environment.pip_requirements.clone(),
        }
    }
}
