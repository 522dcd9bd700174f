//! Protobuf scalar kinds and their JSON representation.
//!
//! The mapping follows the proto3 JSON encoding: 64-bit integers are carried
//! as decimal strings so JavaScript clients don't lose precision, `bytes` is
//! base64 text, and every other number is a JSON number. The OpenAPI `format`
//! is always the proto kind's own name.

use proto_openapi_core::descriptor::field_type;

/// JSON type for `bool`.
pub const JSON_BOOLEAN: &str = "boolean";
/// JSON type for strings, `bytes` and 64-bit integers.
pub const JSON_STRING: &str = "string";
/// JSON type for 32-bit integers and floating point kinds.
pub const JSON_NUMBER: &str = "number";
/// JSON type for messages and maps.
pub const JSON_OBJECT: &str = "object";
/// JSON type for repeated fields.
pub const JSON_ARRAY: &str = "array";

/// A protobuf primitive field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `bool`
    Bool,
    /// `bytes`
    Bytes,
    /// `double`
    Double,
    /// `float`
    Float,
    /// `fixed32`
    Fixed32,
    /// `fixed64`
    Fixed64,
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `sfixed32`
    Sfixed32,
    /// `sfixed64`
    Sfixed64,
    /// `sint32`
    Sint32,
    /// `sint64`
    Sint64,
    /// `string`
    String,
    /// `uint32`
    Uint32,
    /// `uint64`
    Uint64,
}

impl ScalarKind {
    /// Every scalar kind, in `.proto` keyword order.
    pub const ALL: [Self; 15] = [
        Self::Bool,
        Self::Bytes,
        Self::Double,
        Self::Float,
        Self::Fixed32,
        Self::Fixed64,
        Self::Int32,
        Self::Int64,
        Self::Sfixed32,
        Self::Sfixed64,
        Self::Sint32,
        Self::Sint64,
        Self::String,
        Self::Uint32,
        Self::Uint64,
    ];

    /// Map a `FieldDescriptorProto.Type` id to a scalar kind.
    ///
    /// Returns `None` for message, enum and group fields.
    #[must_use]
    pub fn from_field_type(type_id: i32) -> Option<Self> {
        Some(match type_id {
            field_type::BOOL => Self::Bool,
            field_type::BYTES => Self::Bytes,
            field_type::DOUBLE => Self::Double,
            field_type::FLOAT => Self::Float,
            field_type::FIXED32 => Self::Fixed32,
            field_type::FIXED64 => Self::Fixed64,
            field_type::INT32 => Self::Int32,
            field_type::INT64 => Self::Int64,
            field_type::SFIXED32 => Self::Sfixed32,
            field_type::SFIXED64 => Self::Sfixed64,
            field_type::SINT32 => Self::Sint32,
            field_type::SINT64 => Self::Sint64,
            field_type::STRING => Self::String,
            field_type::UINT32 => Self::Uint32,
            field_type::UINT64 => Self::Uint64,
            _ => return None,
        })
    }

    /// The `.proto` keyword for this kind, used as the OpenAPI `format`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::Double => "double",
            Self::Float => "float",
            Self::Fixed32 => "fixed32",
            Self::Fixed64 => "fixed64",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Sfixed32 => "sfixed32",
            Self::Sfixed64 => "sfixed64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::String => "string",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
        }
    }

    /// JSON type of the proto3 JSON encoding of this kind.
    #[must_use]
    pub const fn json_type(self) -> &'static str {
        match self {
            Self::Bool => JSON_BOOLEAN,
            Self::Bytes
            | Self::Fixed64
            | Self::Int64
            | Self::Sfixed64
            | Self::Sint64
            | Self::String
            | Self::Uint64 => JSON_STRING,
            Self::Double
            | Self::Float
            | Self::Fixed32
            | Self::Int32
            | Self::Sfixed32
            | Self::Sint32
            | Self::Uint32 => JSON_NUMBER,
        }
    }

    /// OpenAPI `format` for this kind.
    #[must_use]
    pub const fn format(self) -> &'static str {
        self.name()
    }
}
