//! Type reference → OpenAPI schema resolution.
//!
//! Messages and enums are emitted into the components table once, under
//! their [`schema_key`](crate::graph::TypeName::schema_key), and referenced
//! by `$ref` everywhere else. The key is reserved before a message's fields
//! are walked, so a type reached again while it is still being resolved
//! (directly or through a cycle) short-circuits to a `$ref`.

use std::collections::BTreeMap;

use log::debug;

use crate::convert::scalar::JSON_STRING;
use crate::error::{self, Error};
use crate::graph::{EnumType, Field, MessageType, ProtoSchema, ResolvedType, TypeRef};
use crate::openapi::Schema;

/// Resolves type references against one schema graph, owning the components
/// table it fills.
#[derive(Debug)]
pub(crate) struct SchemaResolver<'a> {
    schema: &'a ProtoSchema,
    components: BTreeMap<String, Schema>,
}

impl<'a> SchemaResolver<'a> {
    pub(crate) fn new(schema: &'a ProtoSchema) -> Self {
        Self {
            schema,
            components: BTreeMap::new(),
        }
    }

    /// Schema for a type reference.
    ///
    /// Scalars become leaf schemas, maps a bare `type: object`, messages and
    /// enums a `$ref` into the components table.
    pub(crate) fn resolve(&mut self, type_ref: &TypeRef) -> error::Result<Schema> {
        let schema = self.schema;
        match schema.resolve(type_ref) {
            Some(ResolvedType::Scalar(kind)) => Ok(Schema::scalar(kind)),
            Some(ResolvedType::Map { .. }) => Ok(Schema::object()),
            Some(ResolvedType::Message(msg)) => {
                let key = msg.name.schema_key();
                if !self.components.contains_key(&key) {
                    self.reserve(&key);
                    let resolved = self.message_schema(msg)?;
                    self.components.insert(key.clone(), resolved);
                }
                Ok(Schema::reference(&key))
            }
            Some(ResolvedType::Enum(en)) => {
                let key = en.name.schema_key();
                if !self.components.contains_key(&key) {
                    debug!("Emitting enum schema {key}");
                    self.components.insert(key.clone(), enum_schema(en));
                }
                Ok(Schema::reference(&key))
            }
            None => Err(Error::UnresolvedType {
                type_name: unresolved_name(type_ref),
            }),
        }
    }

    /// Schema for a message field, carrying the field's documentation.
    fn resolve_field(&mut self, field: &Field) -> error::Result<Schema> {
        let element = self.resolve(&field.type_ref)?;
        let schema = if field.repeated {
            Schema::array(element)
        } else {
            element
        };
        Ok(schema.with_description(&field.documentation))
    }

    fn message_schema(&mut self, msg: &MessageType) -> error::Result<Schema> {
        debug!("Emitting message schema {}", msg.name.schema_key());

        let mut properties = BTreeMap::new();
        for field in &msg.fields {
            properties.insert(field.name.clone(), self.resolve_field(field)?);
        }

        Ok(Schema {
            required: msg.required_fields.clone(),
            properties,
            ..Schema::object()
        }
        .with_description(&msg.documentation))
    }

    /// Mark `key` as in progress so re-entrant lookups return a `$ref`.
    fn reserve(&mut self, key: &str) {
        self.components.insert(key.to_string(), Schema::object());
    }

    /// Number of component schemas emitted so far.
    pub(crate) fn component_count(&self) -> usize {
        self.components.len()
    }

    /// The finished components table.
    pub(crate) fn into_components(self) -> BTreeMap<String, Schema> {
        self.components
    }
}

fn enum_schema(en: &EnumType) -> Schema {
    Schema {
        schema_type: Some(JSON_STRING.to_string()),
        enum_values: en.constants.clone(),
        ..Schema::default()
    }
    .with_description(&en.documentation)
}

/// Only named references can fail to resolve.
fn unresolved_name(type_ref: &TypeRef) -> String {
    match type_ref {
        TypeRef::Named(name) => name.to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proto_openapi_core::descriptor::field_type;

    use super::*;
    use crate::graph::TypeName;
    use crate::test_support::*;

    fn named(name: &str) -> TypeRef {
        TypeRef::Named(TypeName::new(name))
    }

    fn property<'s>(schema: &'s Schema, name: &str) -> &'s Schema {
        schema
            .properties
            .get(name)
            .unwrap_or_else(|| panic!("missing property {name}"))
    }

    #[test]
    fn scalar_int64_is_a_string() {
        let graph = schema(vec![]);
        let mut resolver = SchemaResolver::new(&graph);

        let resolved = resolver
            .resolve(&TypeRef::Scalar(crate::ScalarKind::Int64))
            .unwrap();

        assert_eq!(resolved.schema_type.as_deref(), Some("string"));
        assert_eq!(resolved.format.as_deref(), Some("int64"));
        assert_eq!(resolver.component_count(), 0);
    }

    #[test]
    fn map_field_is_a_bare_object() {
        let mut item = message("Item", vec![]);
        add_map_field(&mut item, "demo.Item", "labels", 1, field_type::STRING, field_type::INT64);
        let graph = schema(vec![file("demo", vec![item])]);
        let mut resolver = SchemaResolver::new(&graph);

        resolver.resolve(&named("demo.Item")).unwrap();
        let components = resolver.into_components();

        let labels = property(&components["demo.Item"], "labels");
        assert_eq!(labels, &Schema::object());
        assert!(labels.properties.is_empty());
        assert!(labels.reference.is_none());
        assert!(labels.items.is_none());
        assert!(!components.contains_key("demo.Item.LabelsEntry"));
    }

    #[test]
    fn mutual_recursion_terminates() {
        let a = message("A", vec![message_field("b", 1, ".demo.B")]);
        let b = message("B", vec![message_field("a", 1, ".demo.A")]);
        let graph = schema(vec![file("demo", vec![a, b])]);
        let mut resolver = SchemaResolver::new(&graph);

        let top = resolver.resolve(&named("demo.A")).unwrap();
        let components = resolver.into_components();

        assert_eq!(top.referenced_key(), Some("demo.A"));
        assert_eq!(
            components.keys().collect::<Vec<_>>(),
            vec!["demo.A", "demo.B"]
        );
        assert_eq!(
            property(&components["demo.A"], "b").referenced_key(),
            Some("demo.B")
        );
        assert_eq!(
            property(&components["demo.B"], "a").referenced_key(),
            Some("demo.A")
        );
    }

    #[test]
    fn self_reference_resolves_to_full_schema() {
        let node = message(
            "Node",
            vec![
                scalar_field("value", 1, field_type::STRING),
                message_field("next", 2, ".demo.Node"),
            ],
        );
        let graph = schema(vec![file("demo", vec![node])]);
        let mut resolver = SchemaResolver::new(&graph);

        resolver.resolve(&named("demo.Node")).unwrap();
        let components = resolver.into_components();

        let node = &components["demo.Node"];
        assert_eq!(node.properties.len(), 2);
        assert_eq!(property(node, "next").referenced_key(), Some("demo.Node"));
    }

    #[test]
    fn shared_type_is_emitted_once() {
        let user = message("User", vec![scalar_field("id", 1, field_type::STRING)]);
        let post = message("Post", vec![message_field("author", 1, ".demo.User")]);
        let comment = message(
            "Comment",
            vec![
                message_field("author", 1, ".demo.User"),
                message_field("post", 2, ".demo.Post"),
            ],
        );
        let graph = schema(vec![file("demo", vec![user, post, comment])]);
        let mut resolver = SchemaResolver::new(&graph);

        resolver.resolve(&named("demo.Comment")).unwrap();
        resolver.resolve(&named("demo.User")).unwrap();
        let components = resolver.into_components();

        assert_eq!(components.len(), 3);
        assert_eq!(
            property(&components["demo.Post"], "author").referenced_key(),
            Some("demo.User")
        );
        assert_eq!(
            property(&components["demo.Comment"], "author").referenced_key(),
            Some("demo.User")
        );
    }

    #[test]
    fn required_fields_copied_verbatim() {
        let user = message(
            "User",
            vec![
                required(scalar_field("id", 1, field_type::STRING)),
                scalar_field("note", 2, field_type::STRING),
            ],
        );
        let graph = schema(vec![file("demo", vec![user])]);
        let mut resolver = SchemaResolver::new(&graph);

        resolver.resolve(&named("demo.User")).unwrap();
        let components = resolver.into_components();

        assert_eq!(components["demo.User"].required, vec!["id"]);
        assert_eq!(components["demo.User"].schema_type.as_deref(), Some("object"));
    }

    #[test]
    fn enum_schema_lists_constants() {
        let ticket = message("Ticket", vec![enum_field("status", 1, ".demo.Status")]);
        let mut proto = file("demo", vec![ticket]);
        proto
            .enum_type
            .push(enumeration("Status", &["STATUS_UNSPECIFIED", "OPEN", "CLOSED"]));
        let graph = schema(vec![proto]);
        let mut resolver = SchemaResolver::new(&graph);

        resolver.resolve(&named("demo.Ticket")).unwrap();
        let components = resolver.into_components();

        let status = &components["demo.Status"];
        assert_eq!(status.schema_type.as_deref(), Some("string"));
        assert_eq!(status.enum_values, vec!["STATUS_UNSPECIFIED", "OPEN", "CLOSED"]);
    }

    #[test]
    fn repeated_field_becomes_array() {
        let post = message(
            "Post",
            vec![
                repeated(scalar_field("tags", 1, field_type::STRING)),
                repeated(message_field("authors", 2, ".demo.User")),
            ],
        );
        let user = message("User", vec![]);
        let graph = schema(vec![file("demo", vec![post, user])]);
        let mut resolver = SchemaResolver::new(&graph);

        resolver.resolve(&named("demo.Post")).unwrap();
        let components = resolver.into_components();
        let post = &components["demo.Post"];

        let tags = property(post, "tags");
        assert_eq!(tags.schema_type.as_deref(), Some("array"));
        assert_eq!(
            tags.items.as_deref(),
            Some(&Schema::scalar(crate::ScalarKind::String))
        );

        let authors = property(post, "authors");
        assert_eq!(
            authors.items.as_ref().and_then(|i| i.referenced_key()),
            Some("demo.User")
        );
    }

    #[test]
    fn same_simple_name_in_two_packages_does_not_collide() {
        let a = message("User", vec![scalar_field("a_id", 1, field_type::STRING)]);
        let b = message("User", vec![scalar_field("b_id", 1, field_type::STRING)]);
        let graph = schema(vec![file("a.v1", vec![a]), file("b.v1", vec![b])]);
        let mut resolver = SchemaResolver::new(&graph);

        resolver.resolve(&named("a.v1.User")).unwrap();
        resolver.resolve(&named("b.v1.User")).unwrap();
        let components = resolver.into_components();

        assert_eq!(components.len(), 2);
        assert!(components["a.v1.User"].properties.contains_key("a_id"));
        assert!(components["b.v1.User"].properties.contains_key("b_id"));
    }

    #[test]
    fn nested_type_key_uses_enclosing_message() {
        let mut outer = message("Outer", vec![message_field("inner", 1, ".demo.Outer.Inner")]);
        outer.nested_type.push(message("Inner", vec![]));
        let graph = schema(vec![file("demo", vec![outer])]);
        let mut resolver = SchemaResolver::new(&graph);

        resolver.resolve(&named("demo.Outer")).unwrap();

        assert!(resolver.into_components().contains_key("demo.Outer.Inner"));
    }

    #[test]
    fn unknown_type_is_an_error() {
        let broken = message("Broken", vec![message_field("ghost", 1, ".demo.Ghost")]);
        let graph = schema(vec![file("demo", vec![broken])]);
        let mut resolver = SchemaResolver::new(&graph);

        let err = resolver.resolve(&named("demo.Broken")).unwrap_err();

        match err {
            Error::UnresolvedType { type_name } => assert_eq!(type_name, "demo.Ghost"),
            other => panic!("expected UnresolvedType, got {other:?}"),
        }
    }
}
