//! Protobuf descriptor types for the proto-openapi converter.
//!
//! This crate provides custom [`prost::Message`] types covering the subset of
//! `google/protobuf/descriptor.proto` that the converter reads. Unlike
//! `prost_types`, they keep the `google.api.field_behavior` extension
//! (field 1052) and the source comments recorded in `SourceCodeInfo`.
//!
//! You should not need to depend on this crate directly; use `proto-openapi`
//! instead.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod descriptor;
