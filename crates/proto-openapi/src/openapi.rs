//! OpenAPI 3 document model.
//!
//! Plain serde records, one per OpenAPI construct the converter emits.
//! Serialization omits absent and empty values (`None`, `""`, `{}`, `[]`)
//! instead of writing `null` or empty collections.
//!
//! Maps are `BTreeMap`s so the same input always serializes identically.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::convert::scalar::{ScalarKind, JSON_ARRAY, JSON_OBJECT};

/// Prefix of a `$ref` into the components schemas table.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Default `openapi` version field.
pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.1";

/// Root OpenAPI document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApi {
    /// OpenAPI specification version (e.g., `3.0.1`).
    pub openapi: String,
    /// API metadata; omitted when no title, version or description was
    /// configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    /// One tag per service, sorted by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Path string → path item.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, PathItem>,
    /// Shared components; omitted when no message or enum was reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

/// OpenAPI Info object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// API description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// API version.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
}

/// OpenAPI Tag object. Groups the operations of one service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// `<package>.<Service>`.
    pub name: String,
    /// Service documentation comment.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// A path item. Every RPC is a unary `POST` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// The RPC's operation.
    pub post: Operation,
}

/// OpenAPI Operation object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Name of the owning service's tag.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Human readable RPC name (e.g., `Say Hello`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    /// RPC documentation comment.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// `<package>.<Service>.<Rpc>`.
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Request message body.
    #[serde(rename = "requestBody", default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Status code → response.
    pub responses: BTreeMap<String, Response>,
}

/// OpenAPI RequestBody object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Media type → schema.
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI Response object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description (required by OpenAPI).
    pub description: String,
    /// Media type → schema.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI MediaType object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Body schema.
    pub schema: Schema,
}

/// OpenAPI Components object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Schema key (`<package>.<Type>`) → schema.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Schema>,
}

/// OpenAPI Schema object.
///
/// One record covers every shape the converter produces: scalar leaves,
/// `$ref`s, object placeholders, message objects, enums and arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to a components schema.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Schema title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Documentation comment.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// JSON type (`string`, `number`, `boolean`, `object`, `array`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format hint; the proto scalar kind name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Allowed values of an enum.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    /// Required property names of an object.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Object properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    /// Element schema of an array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

impl Schema {
    /// Leaf schema for a scalar kind.
    #[must_use]
    pub fn scalar(kind: ScalarKind) -> Self {
        Self {
            schema_type: Some(kind.json_type().to_string()),
            format: Some(kind.format().to_string()),
            ..Self::default()
        }
    }

    /// Generic `type: object` with no declared properties.
    #[must_use]
    pub fn object() -> Self {
        Self {
            schema_type: Some(JSON_OBJECT.to_string()),
            ..Self::default()
        }
    }

    /// `$ref` to `#/components/schemas/<key>`.
    #[must_use]
    pub fn reference(key: &str) -> Self {
        Self {
            reference: Some(format!("{SCHEMA_REF_PREFIX}{key}")),
            ..Self::default()
        }
    }

    /// `type: array` of `items`.
    #[must_use]
    pub fn array(items: Self) -> Self {
        Self {
            schema_type: Some(JSON_ARRAY.to_string()),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Components key this schema references, if it is a `$ref`.
    #[must_use]
    pub fn referenced_key(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix(SCHEMA_REF_PREFIX))
    }
}
