//! Descriptor builders shared by unit tests.

use proto_openapi_core::descriptor::{
    field_type, label, DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto,
    FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet, MessageOptions,
    MethodDescriptorProto, ServiceDescriptorProto,
};

use crate::graph::ProtoSchema;

pub(crate) fn scalar_field(name: &str, number: i32, ty: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label::OPTIONAL),
        r#type: Some(ty),
        type_name: None,
        options: None,
    }
}

pub(crate) fn message_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        r#type: Some(field_type::MESSAGE),
        type_name: Some(type_name.to_string()),
        ..scalar_field(name, number, field_type::MESSAGE)
    }
}

pub(crate) fn enum_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        r#type: Some(field_type::ENUM),
        type_name: Some(type_name.to_string()),
        ..scalar_field(name, number, field_type::ENUM)
    }
}

pub(crate) fn required(mut field: FieldDescriptorProto) -> FieldDescriptorProto {
    field.label = Some(label::REQUIRED);
    field
}

pub(crate) fn repeated(mut field: FieldDescriptorProto) -> FieldDescriptorProto {
    field.label = Some(label::REPEATED);
    field
}

pub(crate) fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: fields,
        ..Default::default()
    }
}

/// `map<key, value>` field named `name` on `parent`, with its entry message.
pub(crate) fn add_map_field(
    parent: &mut DescriptorProto,
    parent_full_name: &str,
    name: &str,
    number: i32,
    key: i32,
    value: i32,
) {
    let entry_name = format!("{}Entry", capitalize(name));
    let mut entry = message(
        &entry_name,
        vec![scalar_field("key", 1, key), scalar_field("value", 2, value)],
    );
    entry.options = Some(MessageOptions {
        map_entry: Some(true),
    });
    parent.nested_type.push(entry);
    parent.field.push(repeated(message_field(
        name,
        number,
        &format!(".{parent_full_name}.{entry_name}"),
    )));
}

pub(crate) fn enumeration(name: &str, values: &[&str]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_string()),
        value: values
            .iter()
            .zip(0..)
            .map(|(v, number)| EnumValueDescriptorProto {
                name: Some((*v).to_string()),
                number: Some(number),
            })
            .collect(),
    }
}

pub(crate) fn service(name: &str, methods: &[(&str, &str, &str)]) -> ServiceDescriptorProto {
    ServiceDescriptorProto {
        name: Some(name.to_string()),
        method: methods
            .iter()
            .map(|(method, input, output)| MethodDescriptorProto {
                name: Some((*method).to_string()),
                input_type: Some((*input).to_string()),
                output_type: Some((*output).to_string()),
                client_streaming: None,
                server_streaming: None,
            })
            .collect(),
    }
}

pub(crate) fn file(package: &str, messages: Vec<DescriptorProto>) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(format!("{}.proto", package.replace('.', "/"))),
        package: (!package.is_empty()).then(|| package.to_string()),
        message_type: messages,
        ..Default::default()
    }
}

pub(crate) fn schema(files: Vec<FileDescriptorProto>) -> ProtoSchema {
    ProtoSchema::from_descriptor_set(&FileDescriptorSet { file: files })
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
