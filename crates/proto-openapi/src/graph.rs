//! Protobuf schema graph loaded from a compiled descriptor set.
//!
//! Decodes a `FileDescriptorSet` and indexes every message and enum (top-level
//! and nested) by fully-qualified name, so any [`TypeRef`] can be resolved to
//! its scalar, message, enum or map form. Comments recorded in
//! `SourceCodeInfo` become documentation strings.
//!
//! The graph is read-only once built. It may contain cycles (message `A` has a
//! field of type `B`, which has a field of type `A`); the converter handles
//! them, the graph just records the references.

use std::collections::HashMap;
use std::fmt;

use log::debug;
use prost::Message as _;
use proto_openapi_core::descriptor::{
    source_path, DescriptorProto, EnumDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, SourceCodeInfo,
};

use crate::convert::scalar::ScalarKind;
use crate::error;

/// A fully-qualified protobuf type name, stored without the leading dot
/// (e.g., `demo.v1.User.Address`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(String);

impl TypeName {
    /// Build from a descriptor type name; a leading `.` is stripped.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.trim_start_matches('.').to_string())
    }

    /// Last name segment (e.g., `Address`).
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.0.rsplit_once('.').map_or(self.0.as_str(), |(_, s)| s)
    }

    /// Enclosing message path or package (e.g., `demo.v1.User`); empty for
    /// types declared outside any package.
    #[must_use]
    pub fn enclosing_type_or_package(&self) -> &str {
        self.0.rsplit_once('.').map_or("", |(e, _)| e)
    }

    /// Components table key: `<enclosing type or package>.<simple name>`.
    ///
    /// Qualifying with the package keeps `a.v1.User` and `b.v1.User` apart.
    #[must_use]
    pub fn schema_key(&self) -> String {
        match self.enclosing_type_or_package() {
            "" => self.simple_name().to_string(),
            enclosing => format!("{enclosing}.{}", self.simple_name()),
        }
    }

    /// The full dotted name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reference to a field, request or response type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A primitive kind (`int64`, `string`, …).
    Scalar(ScalarKind),
    /// A message or enum, looked up by name in the schema index.
    Named(TypeName),
    /// A `map<K, V>` field.
    Map {
        /// Map key type (always a scalar in valid protos).
        key: Box<TypeRef>,
        /// Map value type.
        value: Box<TypeRef>,
    },
}

/// One `.proto` file: its package and services.
#[derive(Debug, Clone)]
pub struct ProtoFile {
    /// File name as recorded by the compiler (e.g., `demo/v1/greeter.proto`).
    pub name: String,
    /// Proto package; empty when the file declares none.
    pub package: String,
    /// Services in declaration order.
    pub services: Vec<Service>,
}

/// A gRPC service.
#[derive(Debug, Clone)]
pub struct Service {
    /// Simple service name (e.g., `Greeter`).
    pub name: String,
    /// Leading comment of the service declaration.
    pub documentation: String,
    /// RPC methods in declaration order.
    pub rpcs: Vec<Rpc>,
}

/// A single RPC method.
#[derive(Debug, Clone)]
pub struct Rpc {
    /// Method name (e.g., `SayHello`).
    pub name: String,
    /// Leading comment of the `rpc` declaration.
    pub documentation: String,
    /// Request message.
    pub request_type: TypeRef,
    /// Response message.
    pub response_type: TypeRef,
    /// `stream` on the request side.
    pub client_streaming: bool,
    /// `stream` on the response side.
    pub server_streaming: bool,
}

/// A message definition.
#[derive(Debug, Clone)]
pub struct MessageType {
    /// Fully-qualified name.
    pub name: TypeName,
    /// Leading comment of the message declaration.
    pub documentation: String,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
    /// Names of fields marked required (proto2 `required` or
    /// `google.api.field_behavior = REQUIRED`), in declaration order.
    pub required_fields: Vec<String>,
}

/// A message field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Field name as written in the `.proto` file.
    pub name: String,
    /// Element type; for `repeated` fields, the type of each element.
    pub type_ref: TypeRef,
    /// Leading comment of the field declaration.
    pub documentation: String,
    /// `repeated` label (never set for map fields).
    pub repeated: bool,
}

/// An enum definition.
#[derive(Debug, Clone)]
pub struct EnumType {
    /// Fully-qualified name.
    pub name: TypeName,
    /// Leading comment of the enum declaration.
    pub documentation: String,
    /// Constant names in declaration order.
    pub constants: Vec<String>,
}

/// A message or enum stored in the type index.
#[derive(Debug, Clone)]
pub enum TypeDef {
    /// `message`
    Message(MessageType),
    /// `enum`
    Enum(EnumType),
}

/// The structural form a [`TypeRef`] resolves to.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedType<'a> {
    /// A primitive kind.
    Scalar(ScalarKind),
    /// A message definition.
    Message(&'a MessageType),
    /// An enum definition.
    Enum(&'a EnumType),
    /// A `map<K, V>`.
    Map {
        /// Key type.
        key: &'a TypeRef,
        /// Value type.
        value: &'a TypeRef,
    },
}

/// The loaded protobuf schema graph.
#[derive(Debug, Default)]
pub struct ProtoSchema {
    files: Vec<ProtoFile>,
    types: HashMap<TypeName, TypeDef>,
}

/// Decode `FileDescriptorSet` bytes and build the schema graph.
///
/// Accepts the output of `protoc --include_imports --include_source_info -o`
/// or `buf build --as-file-descriptor-set`. Without `--include_source_info`
/// all documentation strings are empty.
///
/// # Errors
///
/// Returns an error if the descriptor bytes cannot be decoded.
pub fn load(descriptor_bytes: &[u8]) -> error::Result<ProtoSchema> {
    let fdset = FileDescriptorSet::decode(descriptor_bytes)?;
    Ok(ProtoSchema::from_descriptor_set(&fdset))
}

impl ProtoSchema {
    /// Build the schema graph from an already decoded descriptor set.
    #[must_use]
    pub fn from_descriptor_set(fdset: &FileDescriptorSet) -> Self {
        // Map fields reference synthesized `XxxEntry` messages, which can be
        // declared after the field that uses them, so collect them up front.
        let mut map_entries = HashMap::new();
        for file in &fdset.file {
            let package = file.package.as_deref().unwrap_or("");
            collect_map_entries(&mut map_entries, package, &file.message_type);
        }

        let mut schema = Self::default();
        for file in &fdset.file {
            schema.add_file(file, &map_entries);
        }

        debug!(
            "Loaded {} files, {} types",
            schema.files.len(),
            schema.types.len()
        );
        schema
    }

    /// All files, in descriptor-set order.
    #[must_use]
    pub fn files(&self) -> &[ProtoFile] {
        &self.files
    }

    /// Look up a message or enum by name.
    #[must_use]
    pub fn get_type(&self, name: &TypeName) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Number of indexed messages and enums (map entries excluded).
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Classify a type reference.
    ///
    /// Returns `None` when a named reference is missing from the index.
    #[must_use]
    pub fn resolve<'a>(&'a self, type_ref: &'a TypeRef) -> Option<ResolvedType<'a>> {
        match type_ref {
            TypeRef::Scalar(kind) => Some(ResolvedType::Scalar(*kind)),
            TypeRef::Map { key, value } => Some(ResolvedType::Map {
                key: key.as_ref(),
                value: value.as_ref(),
            }),
            TypeRef::Named(name) => match self.types.get(name)? {
                TypeDef::Message(msg) => Some(ResolvedType::Message(msg)),
                TypeDef::Enum(en) => Some(ResolvedType::Enum(en)),
            },
        }
    }

    fn add_file(&mut self, file: &FileDescriptorProto, map_entries: &MapEntries) {
        let package = file.package.as_deref().unwrap_or("");
        let docs = Comments::new(file.source_code_info.as_ref());

        for (i, msg) in file.message_type.iter().enumerate() {
            let path = [source_path::FILE_MESSAGE, index(i)];
            self.add_message(msg, package, &path, &docs, map_entries);
        }
        for (i, en) in file.enum_type.iter().enumerate() {
            let path = [source_path::FILE_ENUM, index(i)];
            self.add_enum(en, package, &path, &docs);
        }

        let services = file
            .service
            .iter()
            .enumerate()
            .map(|(i, service)| {
                let path = [source_path::FILE_SERVICE, index(i)];
                let rpcs = service
                    .method
                    .iter()
                    .enumerate()
                    .map(|(j, method)| Rpc {
                        name: method.name.clone().unwrap_or_default(),
                        documentation: docs
                            .get(&child(&path, source_path::SERVICE_METHOD, j)),
                        request_type: TypeRef::Named(TypeName::new(
                            method.input_type.as_deref().unwrap_or(""),
                        )),
                        response_type: TypeRef::Named(TypeName::new(
                            method.output_type.as_deref().unwrap_or(""),
                        )),
                        client_streaming: method.client_streaming.unwrap_or(false),
                        server_streaming: method.server_streaming.unwrap_or(false),
                    })
                    .collect();

                Service {
                    name: service.name.clone().unwrap_or_default(),
                    documentation: docs.get(&path),
                    rpcs,
                }
            })
            .collect();

        self.files.push(ProtoFile {
            name: file.name.clone().unwrap_or_default(),
            package: package.to_string(),
            services,
        });
    }

    /// Index a message, then recurse into its nested messages and enums.
    fn add_message(
        &mut self,
        msg: &DescriptorProto,
        parent: &str,
        path: &[i32],
        docs: &Comments,
        map_entries: &MapEntries,
    ) {
        let name = qualify(parent, msg.name.as_deref().unwrap_or(""));

        for (i, nested) in msg.nested_type.iter().enumerate() {
            let nested_path = child(path, source_path::MESSAGE_NESTED, i);
            self.add_message(nested, &name, &nested_path, docs, map_entries);
        }
        for (i, en) in msg.enum_type.iter().enumerate() {
            let enum_path = child(path, source_path::MESSAGE_ENUM, i);
            self.add_enum(en, &name, &enum_path, docs);
        }

        if msg.is_map_entry() {
            return;
        }

        let fields: Vec<Field> = msg
            .field
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let type_ref = field_type_ref(field, map_entries);
                Field {
                    name: field.name.clone().unwrap_or_default(),
                    repeated: field.is_repeated() && !matches!(type_ref, TypeRef::Map { .. }),
                    type_ref,
                    documentation: docs.get(&child(path, source_path::MESSAGE_FIELD, i)),
                }
            })
            .collect();

        let required_fields = msg
            .field
            .iter()
            .filter(|f| f.is_required())
            .filter_map(|f| f.name.clone())
            .collect();

        let type_name = TypeName::new(&name);
        self.types.insert(
            type_name.clone(),
            TypeDef::Message(MessageType {
                name: type_name,
                documentation: docs.get(path),
                fields,
                required_fields,
            }),
        );
    }

    fn add_enum(&mut self, en: &EnumDescriptorProto, parent: &str, path: &[i32], docs: &Comments) {
        let type_name = TypeName::new(&qualify(parent, en.name.as_deref().unwrap_or("")));
        let constants = en
            .value
            .iter()
            .filter_map(|v| v.name.clone())
            .collect();

        self.types.insert(
            type_name.clone(),
            TypeDef::Enum(EnumType {
                name: type_name,
                documentation: docs.get(path),
                constants,
            }),
        );
    }
}

/// Map-entry message name → `(key, value)` types.
type MapEntries = HashMap<TypeName, (TypeRef, TypeRef)>;

/// Recursively collect synthesized map-entry messages.
fn collect_map_entries(map: &mut MapEntries, parent: &str, messages: &[DescriptorProto]) {
    for msg in messages {
        let name = qualify(parent, msg.name.as_deref().unwrap_or(""));

        if msg.is_map_entry() {
            let entry_field = |number: i32| {
                msg.field
                    .iter()
                    .find(|f| f.number == Some(number))
                    .map_or(TypeRef::Named(TypeName::new("")), |f| {
                        field_type_ref(f, &HashMap::new())
                    })
            };
            map.insert(TypeName::new(&name), (entry_field(1), entry_field(2)));
        }

        collect_map_entries(map, &name, &msg.nested_type);
    }
}

/// Classify a field's declared type.
///
/// Non-scalar fields keep their `type_name`; a missing one becomes a
/// `<type N>` placeholder that never resolves.
fn field_type_ref(field: &FieldDescriptorProto, map_entries: &MapEntries) -> TypeRef {
    let type_id = field.r#type.unwrap_or(0);
    if let Some(kind) = ScalarKind::from_field_type(type_id) {
        return TypeRef::Scalar(kind);
    }

    let name = match field.type_name.as_deref() {
        Some(name) => TypeName::new(name),
        None => TypeName::new(&format!("<type {type_id}>")),
    };

    match map_entries.get(&name) {
        Some((key, value)) => TypeRef::Map {
            key: Box::new(key.clone()),
            value: Box::new(value.clone()),
        },
        None => TypeRef::Named(name),
    }
}

fn qualify(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn child(path: &[i32], field_number: i32, i: usize) -> Vec<i32> {
    let mut path = path.to_vec();
    path.push(field_number);
    path.push(index(i));
    path
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn index(i: usize) -> i32 {
    i as i32
}

/// Source comments of one file, keyed by descriptor path.
struct Comments(HashMap<Vec<i32>, String>);

impl Comments {
    fn new(info: Option<&SourceCodeInfo>) -> Self {
        let mut map = HashMap::new();
        for location in info.map(|i| i.location.as_slice()).unwrap_or_default() {
            let text = location
                .leading_comments
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .or(location.trailing_comments.as_deref())
                .map(clean_comment)
                .unwrap_or_default();
            if !text.is_empty() {
                map.insert(location.path.clone(), text);
            }
        }
        Self(map)
    }

    fn get(&self, path: &[i32]) -> String {
        self.0.get(path).cloned().unwrap_or_default()
    }
}

/// Trim every line and drop blank lines at either end.
fn clean_comment(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().map(str::trim).collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |e| e + 1);
    lines[start..end].join("\n")
}
