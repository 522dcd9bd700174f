//! Protobuf schema graph → OpenAPI document conversion.
//!
//! A single depth-first walk over every file, service and RPC of a
//! [`ProtoSchema`]:
//! - [`paths`]: projects each RPC onto a `POST` path item
//! - `resolver`: turns type references into schemas, filling the shared
//!   components table once per message or enum
//! - [`scalar`]: the fixed protobuf scalar → JSON type table

pub mod paths;
pub(crate) mod resolver;
pub mod scalar;

use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::error::{self, Error};
use crate::graph::ProtoSchema;
use crate::openapi::{Components, Info, OpenApi, PathItem, Tag, DEFAULT_OPENAPI_VERSION};

use self::resolver::SchemaResolver;

/// Default description of the `200` response.
pub const DEFAULT_RESPONSE_DESCRIPTION: &str = "OK";

/// What to do when two RPCs map to the same path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePaths {
    /// Fail with [`crate::Error::DuplicatePath`].
    #[default]
    Error,
    /// Keep the later RPC and log a warning.
    Overwrite,
}

/// Configuration for [`convert`].
///
/// Construct with [`ConvertConfig::new`] and configure via
/// [`with_project_config`](Self::with_project_config) (file-based) or
/// individual builder methods (programmatic).
///
/// # Example
///
/// ```ignore
/// let config = ConvertConfig::new()
///     .title("Greeter API")
///     .version("1.2.0")
///     .duplicate_paths(DuplicatePaths::Overwrite);
/// let doc = convert(&schema, &config)?;
/// ```
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// `info.title`; `info` is omitted when title, version and description
    /// are all unset.
    title: Option<String>,

    /// `info.version`.
    version: Option<String>,

    /// `info.description`.
    description: Option<String>,

    /// Top-level `openapi` field.
    openapi_version: String,

    /// Duplicate path policy.
    duplicate_paths: DuplicatePaths,

    /// Description of every `200` response.
    response_description: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvertConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            version: None,
            description: None,
            openapi_version: DEFAULT_OPENAPI_VERSION.to_string(),
            duplicate_paths: DuplicatePaths::default(),
            response_description: DEFAULT_RESPONSE_DESCRIPTION.to_string(),
        }
    }

    /// Apply settings from a [`ProjectConfig`](crate::ProjectConfig).
    ///
    /// Builder methods called after this override config values.
    #[must_use]
    pub fn with_project_config(mut self, project: &crate::ProjectConfig) -> Self {
        if project.title.is_some() {
            self.title.clone_from(&project.title);
        }
        if project.version.is_some() {
            self.version.clone_from(&project.version);
        }
        if project.description.is_some() {
            self.description.clone_from(&project.description);
        }
        self.openapi_version.clone_from(&project.openapi_version);
        self.duplicate_paths = project.duplicate_paths;
        self.response_description
            .clone_from(&project.response_description);
        self
    }

    /// Set the API title.
    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Set the API version.
    #[must_use]
    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Set the API description.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Set the top-level `openapi` version string.
    #[must_use]
    pub fn openapi_version(mut self, version: &str) -> Self {
        self.openapi_version = version.to_string();
        self
    }

    /// Set the duplicate path policy.
    #[must_use]
    pub fn duplicate_paths(mut self, policy: DuplicatePaths) -> Self {
        self.duplicate_paths = policy;
        self
    }

    /// Set the description of every `200` response.
    #[must_use]
    pub fn response_description(mut self, description: &str) -> Self {
        self.response_description = description.to_string();
        self
    }

    fn info(&self) -> Option<Info> {
        if self.title.is_none() && self.version.is_none() && self.description.is_none() {
            return None;
        }
        Some(Info {
            title: self.title.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            version: self.version.clone().unwrap_or_default(),
        })
    }
}

/// Convert a loaded schema graph into an OpenAPI document.
///
/// # Errors
///
/// Returns [`Error::UnresolvedType`] if an RPC or field references a type
/// missing from the graph, or [`Error::DuplicatePath`] if two RPCs map to the
/// same path under [`DuplicatePaths::Error`]. No partial document is returned.
pub fn convert(schema: &ProtoSchema, config: &ConvertConfig) -> error::Result<OpenApi> {
    ModelConverter::new(schema, config).run()
}

/// One-shot converter: owns the paths and components built during a single
/// walk and is consumed by [`run`](Self::run).
struct ModelConverter<'a> {
    schema: &'a ProtoSchema,
    config: &'a ConvertConfig,
    resolver: SchemaResolver<'a>,
    paths: BTreeMap<String, PathItem>,
    tags: BTreeMap<String, Tag>,
}

impl<'a> ModelConverter<'a> {
    fn new(schema: &'a ProtoSchema, config: &'a ConvertConfig) -> Self {
        Self {
            schema,
            config,
            resolver: SchemaResolver::new(schema),
            paths: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    fn run(mut self) -> error::Result<OpenApi> {
        let schema = self.schema;
        for file in schema.files() {
            for service in &file.services {
                if !service.rpcs.is_empty() {
                    self.insert_tag(&file.package, &service.name, &service.documentation);
                }
                for rpc in &service.rpcs {
                    let path = paths::rpc_path(&file.package, &service.name, &rpc.name);
                    let item = paths::rpc_path_item(
                        &mut self.resolver,
                        &file.package,
                        &service.name,
                        rpc,
                        &self.config.response_description,
                    )?;
                    self.insert_path(path, item)?;
                }
            }
        }

        info!(
            "Converted {} paths, {} component schemas",
            self.paths.len(),
            self.resolver.component_count()
        );

        let schemas = self.resolver.into_components();
        Ok(OpenApi {
            openapi: self.config.openapi_version.clone(),
            info: self.config.info(),
            tags: self.tags.into_values().collect(),
            paths: self.paths,
            components: (!schemas.is_empty()).then_some(Components { schemas }),
        })
    }

    /// A service declared twice keeps the first non-empty documentation.
    fn insert_tag(&mut self, package: &str, service: &str, documentation: &str) {
        let name = paths::qualified_service(package, service);
        let tag = self.tags.entry(name.clone()).or_insert_with(|| Tag {
            name,
            description: String::new(),
        });
        if tag.description.is_empty() {
            tag.description = documentation.to_string();
        }
    }

    fn insert_path(&mut self, path: String, item: PathItem) -> error::Result<()> {
        debug!("Mapped {} -> POST {path}", item.post.operation_id);

        if self.paths.contains_key(&path) {
            match self.config.duplicate_paths {
                DuplicatePaths::Error => return Err(Error::DuplicatePath { path }),
                DuplicatePaths::Overwrite => warn!("Duplicate path {path}, keeping the later RPC"),
            }
        }
        self.paths.insert(path, item);
        Ok(())
    }
}
