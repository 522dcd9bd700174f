//! Typed error enum for the `proto-openapi` library API.
//!
//! Library consumers can match on specific variants. The CLI (`main.rs`)
//! converts these to `anyhow::Error` at the binary boundary for richer
//! context messages.

/// Errors produced by `proto-openapi` library operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// File or stream I/O failure (reading config or descriptor files, writing output).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Proto `FileDescriptorSet` decoding failure.
    #[error("failed to decode proto descriptor: {0}")]
    ProtoDecode(#[from] prost::DecodeError),

    /// A type reference is neither a scalar, a map, a message nor an enum.
    ///
    /// Usually means the descriptor set was built without `--include_imports`,
    /// so a referenced type from another file is missing.
    #[error(
        "invalid proto type '{type_name}': not a scalar, map, message or enum in the \
         descriptor set; was it built with --include_imports?"
    )]
    UnresolvedType {
        /// The offending type name as it appears in the descriptor.
        type_name: String,
    },

    /// Two RPCs map to the same HTTP path.
    ///
    /// Only raised with [`DuplicatePaths::Error`](crate::DuplicatePaths::Error).
    #[error("duplicate path '{path}': two RPCs map to the same endpoint")]
    DuplicatePath {
        /// The path produced by both RPCs.
        path: String,
    },
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time assertion that `Error` is `Send + Sync`.
    const _: () = {
        const fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    };

    #[test]
    fn unresolved_type_names_the_type() {
        let err = Error::UnresolvedType {
            type_name: ".demo.Missing".to_string(),
        };
        assert!(err.to_string().contains("'.demo.Missing'"));
    }
}
