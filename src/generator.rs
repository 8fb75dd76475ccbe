//! Top-level document generation.
//!
//! Generation runs in two passes. The first walks every endpoint and emits
//! operations whose object types are references only, collecting the names it
//! referenced. The second expands those names into the closure of reachable
//! object types and emits one component definition per type.

use crate::decomposer::expand_closure;
use crate::document::{Components, Info, OpenApiDocument, Server, OPENAPI_VERSION};
use crate::endpoint::EndpointInfo;
use crate::error::Result;
use crate::path_builder::collect_references;
use crate::security::{map_security_schemes, SecuritySchemeConfig, SecuritySchemes};
use crate::type_graph::TypeGraph;
use log::{debug, info};

/// Document metadata and security configuration supplied by the caller
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub info: Info,
    pub servers: Vec<Server>,
    /// Declared security schemes; only those referenced by an operation are emitted
    pub security_schemes: Option<SecuritySchemes>,
}

impl DocumentInfo {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: Info::new(title, version),
            servers: Vec::new(),
            security_schemes: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    pub fn with_server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    pub fn with_security_scheme(
        mut self,
        name: impl Into<String>,
        scheme: SecuritySchemeConfig,
    ) -> Self {
        self.security_schemes
            .get_or_insert_with(SecuritySchemes::new)
            .insert(name.into(), scheme);
        self
    }
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self::new("Generated API", "1.0.0")
    }
}

/// Generate a complete OpenAPI document for `endpoints`.
///
/// Any configuration error aborts generation; no partial document is returned.
pub fn generate_document(
    doc_info: &DocumentInfo,
    graph: &TypeGraph,
    endpoints: &[EndpointInfo],
) -> Result<OpenApiDocument> {
    info!(
        "Generating OpenAPI document '{}' from {} endpoints",
        doc_info.info.title,
        endpoints.len()
    );

    let collected = collect_references(graph, endpoints)?;
    let definitions = expand_closure(graph, &collected.used_types)?;
    let security_schemes =
        map_security_schemes(doc_info.security_schemes.as_ref(), &collected.used_schemes)?;

    debug!(
        "Generated {} paths, {} schema definitions",
        collected.paths.len(),
        definitions.len()
    );

    let schemas = if definitions.is_empty() {
        None
    } else {
        Some(definitions)
    };
    let components = if schemas.is_none() && security_schemes.is_none() {
        None
    } else {
        Some(Components {
            schemas,
            security_schemes,
        })
    };

    let servers = if doc_info.servers.is_empty() {
        None
    } else {
        Some(doc_info.servers.clone())
    };

    Ok(OpenApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info: doc_info.info.clone(),
        servers,
        paths: collected.paths,
        components,
    })
}
