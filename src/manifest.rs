//! API manifest: a JSON or YAML description of types and endpoints.
//!
//! The manifest is the command-line input. It is converted into the same
//! [`TypeGraph`], [`EndpointInfo`] list and [`DocumentInfo`] that a routing
//! layer would hand to [`crate::generator::generate_document`] directly.
//!
//! Field and parameter types are written as type expressions:
//!
//! - primitive names such as `string`, `int64`, `u32`, `double`, `boolean`
//! - `list<T>` or `array<T>`, and `map<T>`
//! - the name of an object declared under `types`
//! - `name:format` for a custom scalar with a format, e.g. `string:uuid`
//! - any other name, emitted verbatim as a custom scalar type

use crate::document::{Info, Server};
use crate::endpoint::{BodyInfo, ContentSchema, EndpointInfo, ParamInfo, SecurityRequirement};
use crate::error::{Error, Result};
use crate::generator::DocumentInfo;
use crate::security::SecuritySchemes;
use crate::type_graph::{Field, PrimitiveType, TypeGraph, TypeRef};
use anyhow::Context;
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Serialization format of a manifest file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Yaml,
}

impl ManifestFormat {
    /// `.json` files are JSON, everything else is YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ManifestFormat::Json,
            _ => ManifestFormat::Yaml,
        }
    }
}

/// Parameter declaration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamManifest {
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub deprecated: bool,
}

/// A content type with its payload type
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentManifest {
    pub content_type: String,
    #[serde(rename = "type")]
    pub type_expr: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyManifest {
    #[serde(default = "default_body_name")]
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

fn default_body_name() -> String {
    "body".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseManifest {
    pub status: u16,
    #[serde(default)]
    pub description: String,
    pub content_type: String,
    #[serde(rename = "type")]
    pub type_expr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityManifest {
    pub scheme: String,
    /// Absent means no scope restriction
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
}

/// One endpoint declaration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointManifest {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub path_params: Vec<ParamManifest>,
    #[serde(default)]
    pub query_params: Vec<ParamManifest>,
    #[serde(default)]
    pub headers: Vec<ParamManifest>,
    #[serde(default)]
    pub consumes: Vec<ContentManifest>,
    #[serde(default)]
    pub body: Option<BodyManifest>,
    #[serde(default)]
    pub responses: Vec<ResponseManifest>,
    #[serde(default)]
    pub security: Vec<SecurityManifest>,
    /// Defaults to whether `security` is non-empty
    #[serde(default)]
    pub authorized: Option<bool>,
}

/// Complete manifest document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiManifest {
    pub info: Info,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub security_schemes: Option<SecuritySchemes>,
    /// Object types: qualified name to field name to type expression, fields
    /// kept in declaration order
    #[serde(default)]
    pub types: BTreeMap<String, IndexMap<String, String>>,
    #[serde(default)]
    pub endpoints: Vec<EndpointManifest>,
}

impl ApiManifest {
    /// Parse manifest text in the given format
    pub fn parse(content: &str, format: ManifestFormat) -> Result<Self> {
        let manifest: Self = match format {
            ManifestFormat::Json => serde_json::from_str(content)?,
            ManifestFormat::Yaml => serde_yaml::from_str(content)?,
        };
        Ok(manifest)
    }

    /// Read and parse a manifest file, choosing the format by extension
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        debug!("Reading manifest: {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let manifest = Self::parse(&content, ManifestFormat::from_path(path))
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;
        Ok(manifest)
    }

    /// Build the type graph, endpoints and document metadata
    pub fn into_parts(self) -> Result<(DocumentInfo, TypeGraph, Vec<EndpointInfo>)> {
        let mut graph = TypeGraph::new();

        // Declare every object first so fields may refer to any of them, cycles included
        let mut objects = Vec::with_capacity(self.types.len());
        for name in self.types.keys() {
            objects.push(graph.declare_object(name.as_str())?);
        }
        for (object, fields) in objects.into_iter().zip(self.types.values()) {
            let mut resolved = Vec::with_capacity(fields.len());
            for (field_name, type_expr) in fields {
                let ty = resolve_type(&mut graph, type_expr)?;
                resolved.push(Field::new(field_name.as_str(), ty));
            }
            graph.set_fields(object, resolved)?;
        }

        let mut endpoints = Vec::with_capacity(self.endpoints.len());
        for endpoint in self.endpoints {
            endpoints.push(build_endpoint(&mut graph, endpoint)?);
        }
        debug!(
            "Manifest declares {} types and {} endpoints",
            self.types.len(),
            endpoints.len()
        );

        let doc_info = DocumentInfo {
            info: self.info,
            servers: self.servers,
            security_schemes: self.security_schemes,
        };
        Ok((doc_info, graph, endpoints))
    }
}

fn build_params(graph: &mut TypeGraph, params: Vec<ParamManifest>) -> Result<Vec<ParamInfo>> {
    params
        .into_iter()
        .map(|param| {
            let ty = resolve_type(graph, &param.type_expr)?;
            Ok(ParamInfo {
                name: param.name,
                ty,
                description: param.description,
                required: param.required,
                deprecated: param.deprecated,
            })
        })
        .collect()
}

fn build_endpoint(graph: &mut TypeGraph, manifest: EndpointManifest) -> Result<EndpointInfo> {
    let mut endpoint = EndpointInfo::new(manifest.method, manifest.path, manifest.name);
    endpoint.summary = manifest.summary;
    endpoint.description = manifest.description;
    endpoint.headers = build_params(graph, manifest.headers)?;
    endpoint.path_params = build_params(graph, manifest.path_params)?;
    endpoint.query_params = build_params(graph, manifest.query_params)?;

    for content in manifest.consumes {
        let ty = resolve_type(graph, &content.type_expr)?;
        endpoint.consumes.push(ContentSchema::new(content.content_type, ty));
    }

    if let Some(body) = manifest.body {
        endpoint.body = Some(BodyInfo {
            name: body.name,
            ty: resolve_type(graph, &body.type_expr)?,
            content_type: body.content_type,
        });
    }

    for response in manifest.responses {
        let ty = resolve_type(graph, &response.type_expr)?;
        endpoint.add_response(response.status, response.description, response.content_type, ty);
    }

    endpoint.security_requirements = manifest
        .security
        .into_iter()
        .map(|requirement| SecurityRequirement {
            scheme: requirement.scheme,
            scopes: requirement.scopes,
        })
        .collect();
    endpoint.authorized = manifest
        .authorized
        .unwrap_or(!endpoint.security_requirements.is_empty());

    Ok(endpoint)
}

/// Resolve a type expression against `graph`, adding list, map and custom nodes as needed
pub fn resolve_type(graph: &mut TypeGraph, expr: &str) -> Result<TypeRef> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(Error::Manifest("empty type expression".to_string()));
    }

    if let Some((container, inner)) = split_generic(expr)? {
        let inner = resolve_type(graph, inner)?;
        return match container.to_ascii_lowercase().as_str() {
            "list" | "array" => Ok(graph.list_of(inner)),
            "map" => Ok(graph.map_of(inner)),
            other => Err(Error::Manifest(format!(
                "unknown container type '{}' in '{}'",
                other, expr
            ))),
        };
    }

    if let Some(primitive) = PrimitiveType::from_name(expr) {
        return Ok(graph.primitive(primitive));
    }
    if let Some(object) = graph.lookup_object(expr) {
        return Ok(object);
    }

    match expr.split_once(':') {
        Some((name, format)) if !name.is_empty() && !format.is_empty() => {
            Ok(graph.custom(name, Some(format)))
        }
        Some(_) => Err(Error::Manifest(format!("invalid custom type '{}'", expr))),
        None => {
            debug!("Treating '{}' as a custom scalar type", expr);
            Ok(graph.custom(expr, None))
        }
    }
}

/// Split `container<inner>` into its parts
fn split_generic(expr: &str) -> Result<Option<(&str, &str)>> {
    let Some(open) = expr.find('<') else {
        return Ok(None);
    };
    match expr.strip_suffix('>') {
        Some(rest) if open > 0 => Ok(Some((expr[..open].trim(), &rest[open + 1..]))),
        _ => Err(Error::Manifest(format!("malformed type expression '{}'", expr))),
    }
}
