//! Project manifest (rook.toml) parsing.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MANIFEST_FILE: &str = "rook.toml";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("no rook.toml found (looked in {})", .0.display())]
    Missing(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid rook.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid rook.toml: {0}")]
    Invalid(String),
}

/// The rook.toml manifest structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub project: Project,
    #[serde(default)]
    pub imports: Imports,
    #[serde(default)]
    pub analysis: Analysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Name of the project's own library.
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Imports {
    /// Libraries the project may load by name.
    #[serde(default)]
    pub libraries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default = "default_kernel")]
    pub kernel: String,
    /// Attach "did you mean" hints to not-found diagnostics.
    #[serde(default = "default_suggestions")]
    pub suggestions: bool,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            kernel: default_kernel(),
            suggestions: default_suggestions(),
        }
    }
}

fn default_kernel() -> String {
    "kernel".to_string()
}

fn default_suggestions() -> bool {
    true
}

impl FromStr for ProjectManifest {
    type Err = ManifestError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let manifest: ProjectManifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }
}

impl ProjectManifest {
    /// Load `rook.toml` from a project directory.
    pub fn load_dir(dir: &Path) -> Result<Self, ManifestError> {
        Self::load_from(&dir.join(MANIFEST_FILE))
    }

    /// Load the manifest from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::Missing(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    /// Save the manifest to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ManifestError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Create a default manifest for a new project.
    pub fn new_project(name: &str) -> Self {
        ProjectManifest {
            project: Project {
                name: name.to_string(),
            },
            imports: Imports::default(),
            analysis: Analysis::default(),
        }
    }

    /// Whether `name` is a declared import.
    pub fn imports(&self, name: &str) -> bool {
        self.imports.libraries.iter().any(|library| library == name)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.project.name.is_empty() {
            return Err(ManifestError::Invalid("project name is empty".to_string()));
        }
        let reserved = [&self.project.name, &self.analysis.kernel];
        if self.project.name == self.analysis.kernel {
            return Err(ManifestError::Invalid(format!(
                "project name `{}` is reserved for the kernel",
                self.project.name
            )));
        }
        if let Some(name) = self
            .imports
            .libraries
            .iter()
            .find(|library| reserved.contains(library))
        {
            return Err(ManifestError::Invalid(format!(
                "`{}` cannot be imported as a library",
                name
            )));
        }
        Ok(())
    }
}
