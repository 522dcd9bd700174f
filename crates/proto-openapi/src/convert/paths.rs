//! RPC → path item projection.
//!
//! Every RPC becomes one gRPC-style `POST /<package>.<Service>/<Rpc>` path.
//! Request and response bodies are offered as `application/json` (the
//! resolved schema) and `application/protobuf` (an opaque object named after
//! the message).

use std::collections::BTreeMap;

use crate::convert::resolver::SchemaResolver;
use crate::error;
use crate::graph::{Rpc, TypeRef};
use crate::openapi::{MediaType, Operation, PathItem, RequestBody, Response, Schema};

/// JSON body media type.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Binary protobuf body media type.
pub const PROTOBUF_MEDIA_TYPE: &str = "application/protobuf";

/// Status code of the single success response.
pub const OK_STATUS: &str = "200";

/// `<package>.<Service>`, or just `<Service>` outside any package. Also the
/// service's tag name.
#[must_use]
pub fn qualified_service(package: &str, service: &str) -> String {
    if package.is_empty() {
        service.to_string()
    } else {
        format!("{package}.{service}")
    }
}

/// HTTP path of an RPC (e.g., `/demo.Greeter/SayHello`).
#[must_use]
pub fn rpc_path(package: &str, service: &str, rpc: &str) -> String {
    format!("/{}/{rpc}", qualified_service(package, service))
}

/// Operation ID of an RPC (e.g., `demo.Greeter.SayHello`).
#[must_use]
pub fn operation_id(package: &str, service: &str, rpc: &str) -> String {
    format!("{}.{rpc}", qualified_service(package, service))
}

/// Insert a space before every upper-case letter except the first
/// character: `GetUser` → `Get User`.
#[must_use]
pub fn spacify(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if i > 0 && ch.is_uppercase() {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Build the path item for one RPC, resolving its request and response
/// types through `resolver`.
pub(crate) fn rpc_path_item(
    resolver: &mut SchemaResolver<'_>,
    package: &str,
    service: &str,
    rpc: &Rpc,
    response_description: &str,
) -> error::Result<PathItem> {
    let request_body = RequestBody {
        content: content(resolver, &rpc.request_type)?,
    };
    let response = Response {
        description: response_description.to_string(),
        content: content(resolver, &rpc.response_type)?,
    };

    Ok(PathItem {
        post: Operation {
            tags: vec![qualified_service(package, service)],
            summary: spacify(&rpc.name),
            description: rpc.documentation.clone(),
            operation_id: operation_id(package, service, &rpc.name),
            request_body: Some(request_body),
            responses: BTreeMap::from([(OK_STATUS.to_string(), response)]),
        },
    })
}

fn content(
    resolver: &mut SchemaResolver<'_>,
    type_ref: &TypeRef,
) -> error::Result<BTreeMap<String, MediaType>> {
    let json = resolver.resolve(type_ref)?;
    let protobuf = match type_ref {
        TypeRef::Named(name) => Schema::object().with_title(name.simple_name()),
        _ => Schema::object(),
    };

    Ok(BTreeMap::from([
        (JSON_MEDIA_TYPE.to_string(), MediaType { schema: json }),
        (PROTOBUF_MEDIA_TYPE.to_string(), MediaType { schema: protobuf }),
    ]))
}
