//! Minimal protobuf descriptor types with `google.api.field_behavior` and
//! `SourceCodeInfo` support.
//!
//! Standard [`prost_types::FieldOptions`] drops the `google.api.field_behavior`
//! extension (field 1052) during decoding because prost doesn't retain unknown
//! fields. These custom types preserve it, so `(google.api.field_behavior) =
//! REQUIRED` can mark a field as required in the generated schema.
//!
//! [`prost_types::FieldOptions`]: https://docs.rs/prost-types/latest/prost_types/struct.FieldOptions.html

#[allow(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
mod types {
    use prost::Message;

    #[derive(Clone, PartialEq, Message)]
    pub struct FileDescriptorSet {
        #[prost(message, repeated, tag = "1")]
        pub file: Vec<FileDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FileDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "2")]
        pub package: Option<String>,
        #[prost(message, repeated, tag = "4")]
        pub message_type: Vec<DescriptorProto>,
        #[prost(message, repeated, tag = "5")]
        pub enum_type: Vec<EnumDescriptorProto>,
        #[prost(message, repeated, tag = "6")]
        pub service: Vec<ServiceDescriptorProto>,
        /// Comments and spans; only present when compiled with
        /// `--include_source_info`.
        #[prost(message, optional, tag = "9")]
        pub source_code_info: Option<SourceCodeInfo>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct DescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub field: Vec<FieldDescriptorProto>,
        #[prost(message, repeated, tag = "3")]
        pub nested_type: Vec<DescriptorProto>,
        #[prost(message, repeated, tag = "4")]
        pub enum_type: Vec<EnumDescriptorProto>,
        #[prost(message, optional, tag = "7")]
        pub options: Option<MessageOptions>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct MessageOptions {
        /// Set by protoc on the synthesized `XxxEntry` message backing a `map<K, V>` field.
        #[prost(bool, optional, tag = "7")]
        pub map_entry: Option<bool>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FieldDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(int32, optional, tag = "3")]
        pub number: Option<i32>,
        /// Field label enum: 1=optional, 2=required, 3=repeated.
        #[prost(int32, optional, tag = "4")]
        pub label: Option<i32>,
        /// Protobuf field type enum: 1=double, 5=int32, 9=string, 11=message, 14=enum, …
        #[prost(int32, optional, tag = "5")]
        pub r#type: Option<i32>,
        /// Fully-qualified type name for message/enum fields (e.g., `.demo.v1.User`).
        #[prost(string, optional, tag = "6")]
        pub type_name: Option<String>,
        #[prost(message, optional, tag = "8")]
        pub options: Option<FieldOptions>,
    }

    /// Field-level options, including the `google.api.field_behavior` extension.
    #[derive(Clone, PartialEq, Message)]
    pub struct FieldOptions {
        /// `google.api.field_behavior` (tag 1052 from google/api/field_behavior.proto).
        #[prost(int32, repeated, packed = "false", tag = "1052")]
        pub field_behavior: Vec<i32>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub value: Vec<EnumValueDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumValueDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(int32, optional, tag = "2")]
        pub number: Option<i32>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct ServiceDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub method: Vec<MethodDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct MethodDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "2")]
        pub input_type: Option<String>,
        #[prost(string, optional, tag = "3")]
        pub output_type: Option<String>,
        #[prost(bool, optional, tag = "5")]
        pub client_streaming: Option<bool>,
        #[prost(bool, optional, tag = "6")]
        pub server_streaming: Option<bool>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct SourceCodeInfo {
        #[prost(message, repeated, tag = "1")]
        pub location: Vec<Location>,
    }

    /// A span of source text, identified by its descriptor path
    /// (e.g., `[4, 0, 2, 1]` = second field of the first message).
    #[derive(Clone, PartialEq, Message)]
    pub struct Location {
        #[prost(int32, repeated, tag = "1")]
        pub path: Vec<i32>,
        #[prost(int32, repeated, tag = "2")]
        pub span: Vec<i32>,
        #[prost(string, optional, tag = "3")]
        pub leading_comments: Option<String>,
        #[prost(string, optional, tag = "4")]
        pub trailing_comments: Option<String>,
    }
}

pub use types::*;

/// Proto field type constants (from `google.protobuf.FieldDescriptorProto.Type`).
pub mod field_type {
    /// `TYPE_DOUBLE = 1`
    pub const DOUBLE: i32 = 1;
    /// `TYPE_FLOAT = 2`
    pub const FLOAT: i32 = 2;
    /// `TYPE_INT64 = 3`
    pub const INT64: i32 = 3;
    /// `TYPE_UINT64 = 4`
    pub const UINT64: i32 = 4;
    /// `TYPE_INT32 = 5`
    pub const INT32: i32 = 5;
    /// `TYPE_FIXED64 = 6`
    pub const FIXED64: i32 = 6;
    /// `TYPE_FIXED32 = 7`
    pub const FIXED32: i32 = 7;
    /// `TYPE_BOOL = 8`
    pub const BOOL: i32 = 8;
    /// `TYPE_STRING = 9`
    pub const STRING: i32 = 9;
    /// `TYPE_GROUP = 10`
    pub const GROUP: i32 = 10;
    /// `TYPE_MESSAGE = 11`
    pub const MESSAGE: i32 = 11;
    /// `TYPE_BYTES = 12`
    pub const BYTES: i32 = 12;
    /// `TYPE_UINT32 = 13`
    pub const UINT32: i32 = 13;
    /// `TYPE_ENUM = 14`
    pub const ENUM: i32 = 14;
    /// `TYPE_SFIXED32 = 15`
    pub const SFIXED32: i32 = 15;
    /// `TYPE_SFIXED64 = 16`
    pub const SFIXED64: i32 = 16;
    /// `TYPE_SINT32 = 17`
    pub const SINT32: i32 = 17;
    /// `TYPE_SINT64 = 18`
    pub const SINT64: i32 = 18;
}

/// Proto field label constants (from `google.protobuf.FieldDescriptorProto.Label`).
pub mod label {
    /// `LABEL_OPTIONAL = 1`
    pub const OPTIONAL: i32 = 1;
    /// `LABEL_REQUIRED = 2` (proto2 only)
    pub const REQUIRED: i32 = 2;
    /// `LABEL_REPEATED = 3`
    pub const REPEATED: i32 = 3;
}

/// `google.api.FieldBehavior` values relevant to schema generation.
pub mod field_behavior {
    /// `OPTIONAL = 1`
    pub const OPTIONAL: i32 = 1;
    /// `REQUIRED = 2`
    pub const REQUIRED: i32 = 2;
}

/// Field numbers used in [`Location::path`] to address descriptor elements.
pub mod source_path {
    /// `FileDescriptorProto.message_type`
    pub const FILE_MESSAGE: i32 = 4;
    /// `FileDescriptorProto.enum_type`
    pub const FILE_ENUM: i32 = 5;
    /// `FileDescriptorProto.service`
    pub const FILE_SERVICE: i32 = 6;
    /// `DescriptorProto.field`
    pub const MESSAGE_FIELD: i32 = 2;
    /// `DescriptorProto.nested_type`
    pub const MESSAGE_NESTED: i32 = 3;
    /// `DescriptorProto.enum_type`
    pub const MESSAGE_ENUM: i32 = 4;
    /// `ServiceDescriptorProto.method`
    pub const SERVICE_METHOD: i32 = 2;
}

impl FieldDescriptorProto {
    /// Whether the field carries `label = LABEL_REPEATED`.
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        self.label == Some(label::REPEATED)
    }

    /// Whether the field is required, either through the proto2
    /// `required` label or `(google.api.field_behavior) = REQUIRED`.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.label == Some(label::REQUIRED)
            || self
                .options
                .as_ref()
                .is_some_and(|o| o.field_behavior.contains(&field_behavior::REQUIRED))
    }
}

impl DescriptorProto {
    /// Whether this message is the synthesized entry type of a `map<K, V>` field.
    #[must_use]
    pub fn is_map_entry(&self) -> bool {
        self.options
            .as_ref()
            .and_then(|o| o.map_entry)
            .unwrap_or(false)
    }
}
