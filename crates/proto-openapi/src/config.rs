//! Project-level conversion configuration loaded from YAML.
//!
//! Keeps API metadata and conversion policy next to the proto files
//! instead of on the command line.
//!
//! # File format
//!
//! ```yaml
//! # api/openapi/config.yaml
//! title: Greeter API
//! version: 1.2.0
//! description: Says hello over JSON.
//!
//! # Top-level `openapi` field.
//! openapi_version: 3.0.1
//!
//! # What to do when two RPCs map to the same path: error | overwrite
//! duplicate_paths: error
//!
//! # Description of every 200 response.
//! response_description: OK
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::convert::{DuplicatePaths, DEFAULT_RESPONSE_DESCRIPTION};
use crate::openapi::DEFAULT_OPENAPI_VERSION;

/// Project-level conversion config.
///
/// Loaded from a YAML file via [`ProjectConfig::load`], then applied to a
/// [`ConvertConfig`](crate::ConvertConfig) via
/// [`ConvertConfig::with_project_config`](crate::ConvertConfig::with_project_config).
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// `info.title`.
    pub title: Option<String>,

    /// `info.version`.
    pub version: Option<String>,

    /// `info.description`.
    pub description: Option<String>,

    /// Top-level `openapi` field.
    pub openapi_version: String,

    /// Duplicate path policy.
    pub duplicate_paths: DuplicatePaths,

    /// Description of every `200` response.
    pub response_description: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            title: None,
            version: None,
            description: None,
            openapi_version: DEFAULT_OPENAPI_VERSION.to_string(),
            duplicate_paths: DuplicatePaths::default(),
            response_description: DEFAULT_RESPONSE_DESCRIPTION.to_string(),
        }
    }
}

impl ProjectConfig {
    /// Load config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }
}
