//! Rendering of the generated conda `environment.yml`.

use condenv_schema::{AUTOGENERATED_BANNER, Specifier};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

/// Registered without an `.html`/`.xml` suffix so tera leaves `>=` unescaped.
const TEMPLATE_NAME: &str = "environment.yml";

const TEMPLATE: &str = r"{{ banner }}
name: {{ name }}
channels:
{% for channel in channels %}  - {{ channel }}
{% endfor %}dependencies:
{% for dep in dependencies %}  - {{ dep }}
{% endfor %}{% for pkg in available %}  - {{ pkg }}
{% endfor %}{% if pip_requirements %}
  - pip:
{% for file in pip_requirements %}    - -r {{ file }}
{% endfor %}{% endif %}{{ banner }}
";

#[derive(thiserror::Error, Debug)]
pub enum EnvironmentError {
    #[error("Failed to render environment template: {0}")]
    Template(#[from] tera::Error),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything in the environment file except the resolved packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentFile {
    pub name: String,
    pub channels: Vec<String>,
    /// Listed ahead of the resolved packages.
    pub dependencies: Vec<String>,
    /// Requirement files handed to pip for whatever conda cannot provide.
    pub pip_requirements: Vec<String>,
}

impl EnvironmentFile {
    /// Render the file with `available` (already sorted) as the package list.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::Template`] if tera fails to render.
    pub fn render(&self, available: &[Specifier]) -> Result<String, EnvironmentError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;

        let available: Vec<String> = available.iter().map(ToString::to_string).collect();
        let mut context = Context::from_serialize(self)?;
        context.insert("banner", AUTOGENERATED_BANNER);
        context.insert("available", &available);

        Ok(tera.render(TEMPLATE_NAME, &context)?)
    }

    /// Render and write the file, replacing any previous contents.
    ///
    /// # Errors
    ///
    /// Fails if rendering fails or the file cannot be written.
    pub fn write(&self, path: &Path, available: &[Specifier]) -> Result<(), EnvironmentError> {
        let rendered = self.render(available)?;
        std::fs::write(path, rendered).map_err(|source| EnvironmentError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
