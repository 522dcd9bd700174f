#![allow(clippy::doc_markdown)] // README uses "OpenAPI" proper noun throughout
#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! ## API Reference

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
pub mod convert;
mod error;
pub mod graph;
pub mod openapi;
mod write;

#[cfg(test)]
mod test_support;

pub use config::ProjectConfig;
pub use convert::scalar::ScalarKind;
pub use convert::{convert, ConvertConfig, DuplicatePaths};
pub use error::{Error, Result};
pub use graph::{load, ProtoSchema};
pub use openapi::OpenApi;
pub use write::{to_json, to_yaml, write_document, OutputFormat};
