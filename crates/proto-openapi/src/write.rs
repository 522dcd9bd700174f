//! Document serialization.

use std::io;

use crate::error;
use crate::openapi::OpenApi;

/// Serialized document format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// YAML (the default).
    #[default]
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Guess the format from a file extension: `.json` is JSON, anything
    /// else YAML.
    #[must_use]
    pub fn from_extension(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Serialize a document to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_yaml(doc: &OpenApi) -> error::Result<String> {
    Ok(serde_yaml_ng::to_string(doc)?)
}

/// Serialize a document to pretty-printed JSON, with a trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(doc: &OpenApi) -> error::Result<String> {
    let mut json = serde_json::to_string_pretty(doc)?;
    json.push('\n');
    Ok(json)
}

/// Serialize a document and write it to `out`.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_document(doc: &OpenApi, format: OutputFormat, mut out: impl io::Write) -> error::Result<()> {
    let text = match format {
        OutputFormat::Yaml => to_yaml(doc)?,
        OutputFormat::Json => to_json(doc)?,
    };
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}
