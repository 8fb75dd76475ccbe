use crate::document::{
    MediaType, Operation, Parameter, ParameterLocation, PathItem, RequestBody, Response,
    SecurityRequirementObject,
};
use crate::endpoint::{
    is_authorization_header, BodyInfo, ContentSchema, EndpointInfo, HttpMethod, ParamInfo,
};
use crate::error::{Error, Result};
use crate::schema_generator::{Schema, SchemaGenerator, SchemaMode, UsedTypes};
use crate::type_graph::{PrimitiveType, TypeGraph, TypeKind, TypeRef};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Media type for structured (object, list, map) bodies
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Media type for scalar bodies and the synthesized default response
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

const DEFAULT_RESPONSE_STATUS: &str = "200";
const DEFAULT_RESPONSE_DESCRIPTION: &str = "success";
const REQUEST_BODY_DESCRIPTION: &str = "request body";

/// Result of the reference-collecting pass
#[derive(Debug, Clone, Default)]
pub struct CollectedPaths {
    /// Path items keyed by normalized path
    pub paths: BTreeMap<String, PathItem>,
    /// Object types referenced from any operation
    pub used_types: UsedTypes,
    /// Security schemes referenced from any operation
    pub used_schemes: BTreeSet<String>,
}

/// Builds path items and operations from endpoint descriptors.
///
/// Every type is emitted in link mode, so the builder never produces a full
/// object body; it only records which objects were referenced.
pub struct PathBuilder<'g> {
    graph: &'g TypeGraph,
    schema_gen: SchemaGenerator<'g>,
    paths: BTreeMap<String, PathItem>,
    used_schemes: BTreeSet<String>,
}

impl<'g> PathBuilder<'g> {
    pub fn new(graph: &'g TypeGraph) -> Self {
        debug!("Initializing PathBuilder");
        Self {
            graph,
            schema_gen: SchemaGenerator::new(graph),
            paths: BTreeMap::new(),
            used_schemes: BTreeSet::new(),
        }
    }

    /// Add one endpoint as an operation of its path item
    pub fn add_endpoint(&mut self, endpoint: &EndpointInfo) -> Result<()> {
        let Some(path) = normalize_path(&endpoint.path) else {
            debug!("Skipping endpoint '{}' with empty path", endpoint.name);
            return Ok(());
        };
        debug!("Adding endpoint: {} {}", endpoint.method, path);

        check_authorization(endpoint)?;

        let Some(method) = HttpMethod::parse(&endpoint.method) else {
            warn!(
                "Unsupported HTTP method '{}' for {}, no operation generated",
                endpoint.method, path
            );
            return Ok(());
        };

        let parameters = self.build_parameters(endpoint)?;
        let request_body = self.build_request_body(endpoint)?;
        let responses = self.build_responses(endpoint)?;
        let security = self.build_security(endpoint);

        let operation = Operation {
            operation_id: Some(endpoint.name.clone()).filter(|name| !name.is_empty()),
            summary: endpoint.summary.clone(),
            description: endpoint.description.clone(),
            parameters,
            request_body,
            responses,
            security,
        };

        self.paths
            .entry(path)
            .or_default()
            .set_operation(method, operation);
        Ok(())
    }

    fn build_parameters(&mut self, endpoint: &EndpointInfo) -> Result<Option<Vec<Parameter>>> {
        let headers = endpoint
            .headers
            .iter()
            .filter(|header| !is_authorization_header(&header.name))
            .map(|header| (header, ParameterLocation::Header));
        let path_params = endpoint
            .path_params
            .iter()
            .map(|param| (param, ParameterLocation::Path));
        let query_params = endpoint
            .query_params
            .iter()
            .map(|param| (param, ParameterLocation::Query));

        let mut parameters = Vec::new();
        for (param, location) in headers.chain(path_params).chain(query_params) {
            parameters.push(self.build_parameter(param, location)?);
        }

        Ok(if parameters.is_empty() {
            None
        } else {
            Some(parameters)
        })
    }

    fn build_parameter(
        &mut self,
        param: &ParamInfo,
        location: ParameterLocation,
    ) -> Result<Parameter> {
        let schema = self.schema_gen.generate_schema(param.ty, SchemaMode::Link)?;
        Ok(Parameter {
            name: param.name.clone(),
            location,
            description: param.description.clone(),
            // A path parameter is always present in a matching URL
            required: param.required || location == ParameterLocation::Path,
            deprecated: param.deprecated,
            schema,
        })
    }

    fn build_request_body(&mut self, endpoint: &EndpointInfo) -> Result<Option<RequestBody>> {
        let content = if !endpoint.consumes.is_empty() {
            self.build_content(&endpoint.consumes)?
        } else if let Some(body) = &endpoint.body {
            let content_type = self.body_content_type(body)?;
            self.build_content(&[ContentSchema::new(content_type, body.ty)])?
        } else {
            return Ok(None);
        };

        Ok(Some(RequestBody {
            description: Some(REQUEST_BODY_DESCRIPTION.to_string()),
            content,
        }))
    }

    fn build_content(&mut self, entries: &[ContentSchema]) -> Result<BTreeMap<String, MediaType>> {
        let mut content = BTreeMap::new();
        for entry in entries {
            let schema = self.schema_gen.generate_schema(entry.ty, SchemaMode::Link)?;
            content.insert(entry.content_type.clone(), MediaType { schema });
        }
        Ok(content)
    }

    fn body_content_type(&self, body: &BodyInfo) -> Result<String> {
        if let Some(content_type) = &body.content_type {
            return Ok(content_type.clone());
        }
        Ok(inferred_content_type(self.graph, body.ty)?.to_string())
    }

    fn build_responses(&mut self, endpoint: &EndpointInfo) -> Result<BTreeMap<String, Response>> {
        let mut responses = BTreeMap::new();

        if endpoint.responses.is_empty() {
            responses.insert(DEFAULT_RESPONSE_STATUS.to_string(), default_response());
            return Ok(responses);
        }

        for response in &endpoint.responses {
            let content = self.build_content(std::slice::from_ref(&response.content))?;
            let status = response.status.to_string();
            if responses.contains_key(&status) {
                debug!(
                    "Response {} of '{}' declared twice, keeping the last one",
                    status, endpoint.name
                );
            }
            responses.insert(
                status,
                Response {
                    description: response.description.clone(),
                    content: Some(content),
                },
            );
        }
        Ok(responses)
    }

    fn build_security(
        &mut self,
        endpoint: &EndpointInfo,
    ) -> Option<Vec<SecurityRequirementObject>> {
        if endpoint.security_requirements.is_empty() {
            return None;
        }

        let requirements = endpoint
            .security_requirements
            .iter()
            .map(|requirement| {
                self.used_schemes.insert(requirement.scheme.clone());
                let scopes = requirement.scopes.clone().unwrap_or_default();
                let mut object = SecurityRequirementObject::new();
                object.insert(requirement.scheme.clone(), scopes);
                object
            })
            .collect();
        Some(requirements)
    }

    /// Finish the pass, handing over the paths and both registries
    pub fn build(self) -> CollectedPaths {
        debug!(
            "Collected {} paths referencing {} types and {} security schemes",
            self.paths.len(),
            self.schema_gen.used_types().len(),
            self.used_schemes.len()
        );
        CollectedPaths {
            paths: self.paths,
            used_types: self.schema_gen.into_used_types(),
            used_schemes: self.used_schemes,
        }
    }
}

/// Run the reference-collecting pass over `endpoints` in order
pub fn collect_references(graph: &TypeGraph, endpoints: &[EndpointInfo]) -> Result<CollectedPaths> {
    let mut builder = PathBuilder::new(graph);
    for endpoint in endpoints {
        builder.add_endpoint(endpoint)?;
    }
    Ok(builder.build())
}

/// Normalize a route path: leading `/` and `:param` segments rewritten as
/// `{param}`. Returns `None` for an empty path.
pub fn normalize_path(path: &str) -> Option<String> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }

    let converted: Vec<String> = path
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) if !name.is_empty() => format!("{{{}}}", name),
            _ => segment.to_string(),
        })
        .collect();
    let converted = converted.join("/");

    if converted.starts_with('/') {
        Some(converted)
    } else {
        Some(format!("/{}", converted))
    }
}

fn check_authorization(endpoint: &EndpointInfo) -> Result<()> {
    let has_requirements = !endpoint.security_requirements.is_empty();
    match (endpoint.authorized, has_requirements) {
        (true, false) => Err(Error::AuthorizedWithoutSecurity {
            method: endpoint.method.clone(),
            path: endpoint.path.clone(),
        }),
        (false, true) => Err(Error::SecurityWithoutAuthorization {
            method: endpoint.method.clone(),
            path: endpoint.path.clone(),
        }),
        _ => Ok(()),
    }
}

fn inferred_content_type(graph: &TypeGraph, ty: TypeRef) -> Result<&'static str> {
    Ok(match graph.node(ty)?.kind() {
        TypeKind::Object(_) | TypeKind::List(_) | TypeKind::Map(_) => JSON_CONTENT_TYPE,
        TypeKind::Primitive(_) | TypeKind::Custom { .. } => TEXT_CONTENT_TYPE,
    })
}

fn default_response() -> Response {
    let schema = default_response_schema();
    let mut content = BTreeMap::new();
    content.insert(TEXT_CONTENT_TYPE.to_string(), MediaType { schema });
    Response {
        description: DEFAULT_RESPONSE_DESCRIPTION.to_string(),
        content: Some(content),
    }
}

/// Schema of the synthesized default response body
pub fn default_response_schema() -> Schema {
    SchemaGenerator::primitive_to_schema(PrimitiveType::String)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::SecurityRequirement;
    use crate::type_graph::Field;

    struct Fixture {
        graph: TypeGraph,
        id: TypeRef,
        text: TypeRef,
        pet: TypeRef,
        pets: TypeRef,
    }

    fn fixture() -> Fixture {
        let mut graph = TypeGraph::new();
        let id = graph.primitive(PrimitiveType::I64);
        let text = graph.string();
        let pet = graph
            .object_with_fields("Pet", vec![Field::new("id", id), Field::new("name", text)])
            .unwrap();
        let pets = graph.list_of(pet);
        Fixture {
            graph,
            id,
            text,
            pet,
            pets,
        }
    }

    fn collect(graph: &TypeGraph, endpoints: Vec<EndpointInfo>) -> CollectedPaths {
        collect_references(graph, &endpoints).unwrap()
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/pets"), Some("/pets".to_string()));
        assert_eq!(normalize_path("pets"), Some("/pets".to_string()));
        assert_eq!(normalize_path("/pets/:id"), Some("/pets/{id}".to_string()));
        assert_eq!(normalize_path("/pets/{id}"), Some("/pets/{id}".to_string()));
        assert_eq!(
            normalize_path("users/:user_id/posts/:post_id"),
            Some("/users/{user_id}/posts/{post_id}".to_string())
        );
        assert_eq!(normalize_path(""), None);
        assert_eq!(normalize_path("  "), None);
    }

    #[test]
    fn test_empty_path_is_skipped() {
        let f = fixture();
        let collected = collect(&f.graph, vec![EndpointInfo::new("GET", "", "nothing")]);
        assert!(collected.paths.is_empty());
    }

    #[test]
    fn test_same_path_different_methods_merge() {
        let f = fixture();
        let collected = collect(
            &f.graph,
            vec![
                EndpointInfo::new("GET", "/items", "list_items"),
                EndpointInfo::new("post", "items", "create_item"),
            ],
        );

        assert_eq!(collected.paths.len(), 1);
        let item = &collected.paths["/items"];
        assert_eq!(item.get.as_ref().unwrap().operation_id.as_deref(), Some("list_items"));
        assert_eq!(item.post.as_ref().unwrap().operation_id.as_deref(), Some("create_item"));
    }

    #[test]
    fn test_unknown_method_contributes_nothing() {
        let f = fixture();
        let collected = collect(&f.graph, vec![EndpointInfo::new("CONNECT", "/tunnel", "tunnel")]);
        assert!(collected.paths.is_empty());
    }

    #[test]
    fn test_default_response_synthesized() {
        let f = fixture();
        let collected = collect(&f.graph, vec![EndpointInfo::new("GET", "/ping", "ping")]);

        let operation = collected.paths["/ping"].get.as_ref().unwrap();
        assert_eq!(operation.responses.len(), 1);
        let response = &operation.responses["200"];
        assert_eq!(response.description, "success");
        let content = response.content.as_ref().unwrap();
        assert_eq!(content["text/plain"].schema, default_response_schema());
        assert_eq!(content["text/plain"].schema.schema_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_declared_responses_keyed_by_status() {
        let f = fixture();
        let mut endpoint = EndpointInfo::new("GET", "/pets/{id}", "get_pet");
        endpoint.add_response(200, "the pet", JSON_CONTENT_TYPE, f.pet);
        endpoint.add_response(404, "not found", TEXT_CONTENT_TYPE, f.text);

        let collected = collect(&f.graph, vec![endpoint]);
        let operation = collected.paths["/pets/{id}"].get.as_ref().unwrap();

        assert_eq!(operation.responses.len(), 2);
        let ok = operation.responses["200"].content.as_ref().unwrap();
        assert_eq!(ok[JSON_CONTENT_TYPE].schema.referenced_name(), Some("Pet"));
        assert_eq!(operation.responses["404"].description, "not found");
        assert_eq!(collected.used_types.get("Pet"), Some(&f.pet));
    }

    #[test]
    fn test_parameter_order_and_authorization_header_suppressed() {
        let f = fixture();
        let mut endpoint = EndpointInfo::new("GET", "/pets/{id}", "get_pet");
        endpoint.query_params.push(ParamInfo::new("verbose", f.text));
        endpoint.path_params.push(ParamInfo::new("id", f.id));
        endpoint.headers.push(ParamInfo::new("AUTHORIZATION", f.text).required());
        endpoint.headers.push(ParamInfo::new("X-Request-Id", f.text).deprecated());

        let collected = collect(&f.graph, vec![endpoint]);
        let parameters = collected.paths["/pets/{id}"]
            .get
            .as_ref()
            .unwrap()
            .parameters
            .as_ref()
            .unwrap();

        let summary: Vec<_> = parameters
            .iter()
            .map(|p| (p.name.as_str(), p.location, p.required, p.deprecated))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("X-Request-Id", ParameterLocation::Header, false, true),
                ("id", ParameterLocation::Path, true, false),
                ("verbose", ParameterLocation::Query, false, false),
            ]
        );
        assert_eq!(parameters[1].schema.format.as_deref(), Some("int64"));
    }

    #[test]
    fn test_no_parameters_is_none() {
        let f = fixture();
        let mut endpoint = EndpointInfo::new("GET", "/me", "me");
        endpoint.headers.push(ParamInfo::new("authorization", f.text));

        let collected = collect(&f.graph, vec![endpoint]);
        assert!(collected.paths["/me"].get.as_ref().unwrap().parameters.is_none());
    }

    #[test]
    fn test_object_parameter_is_a_reference() {
        let f = fixture();
        let mut endpoint = EndpointInfo::new("GET", "/search", "search");
        endpoint.query_params.push(ParamInfo::new("filter", f.pets));

        let collected = collect(&f.graph, vec![endpoint]);
        let operation = collected.paths["/search"].get.as_ref().unwrap();
        let parameter = &operation.parameters.as_ref().unwrap()[0];

        assert_eq!(parameter.schema.schema_type.as_deref(), Some("array"));
        assert_eq!(
            parameter.schema.items.as_ref().unwrap().referenced_name(),
            Some("Pet")
        );
        assert!(collected.used_types.contains_key("Pet"));
    }

    #[test]
    fn test_request_body_from_consumes() {
        let f = fixture();
        let mut endpoint = EndpointInfo::new("POST", "/pets", "create_pet");
        endpoint.consumes.push(ContentSchema::new(JSON_CONTENT_TYPE, f.pet));
        endpoint.consumes.push(ContentSchema::new("application/xml", f.pet));
        endpoint.body = Some(BodyInfo {
            name: "ignored".to_string(),
            ty: f.text,
            content_type: None,
        });

        let collected = collect(&f.graph, vec![endpoint]);
        let body = collected.paths["/pets"].post.as_ref().unwrap().request_body.as_ref().unwrap();

        assert_eq!(body.description.as_deref(), Some("request body"));
        let keys: Vec<_> = body.content.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["application/json", "application/xml"]);
        assert_eq!(body.content["application/xml"].schema.referenced_name(), Some("Pet"));
    }

    #[test]
    fn test_request_body_content_type_inferred() {
        let f = fixture();
        let body = |ty| BodyInfo {
            name: "body".to_string(),
            ty,
            content_type: None,
        };
        let mut structured = EndpointInfo::new("PUT", "/pets", "replace_pets");
        structured.body = Some(body(f.pets));
        let mut plain = EndpointInfo::new("POST", "/notes", "add_note");
        plain.body = Some(body(f.text));
        let mut declared = EndpointInfo::new("POST", "/upload", "upload");
        declared.body = Some(BodyInfo {
            content_type: Some("application/octet-stream".to_string()),
            ..body(f.text)
        });

        let collected = collect(&f.graph, vec![structured, plain, declared]);

        let content_type = |path: &str, method: HttpMethod| {
            collected.paths[path]
                .operation(method)
                .unwrap()
                .request_body
                .as_ref()
                .unwrap()
                .content
                .keys()
                .next()
                .unwrap()
                .clone()
        };
        assert_eq!(content_type("/pets", HttpMethod::Put), "application/json");
        assert_eq!(content_type("/notes", HttpMethod::Post), "text/plain");
        assert_eq!(content_type("/upload", HttpMethod::Post), "application/octet-stream");
    }

    #[test]
    fn test_no_body_declared() {
        let f = fixture();
        let endpoint = EndpointInfo::new("DELETE", "/pets/:id", "delete_pet");
        let collected = collect(&f.graph, vec![endpoint]);
        let operation = collected.paths["/pets/{id}"].delete.as_ref().unwrap();
        assert!(operation.request_body.is_none());
    }

    #[test]
    fn test_security_requirements_rendered() {
        let f = fixture();
        let mut endpoint = EndpointInfo::new("GET", "/admin", "admin");
        endpoint.add_security_requirement(SecurityRequirement::new("bearer"));
        endpoint.add_security_requirement(SecurityRequirement::with_scopes(
            "oauth",
            ["pets:read", "pets:write"],
        ));

        let collected = collect(&f.graph, vec![endpoint]);
        let security = collected.paths["/admin"].get.as_ref().unwrap().security.as_ref().unwrap();

        assert_eq!(security.len(), 2);
        assert_eq!(security[0]["bearer"], Vec::<String>::new());
        assert_eq!(security[1]["oauth"], vec!["pets:read", "pets:write"]);
        let used: Vec<_> = collected.used_schemes.iter().map(String::as_str).collect();
        assert_eq!(used, vec!["bearer", "oauth"]);
    }

    #[test]
    fn test_authorized_without_requirements_fails() {
        let f = fixture();
        let mut endpoint = EndpointInfo::new("GET", "/secret", "secret");
        endpoint.authorized = true;

        let result = collect_references(&f.graph, &[endpoint]);
        assert!(matches!(result, Err(Error::AuthorizedWithoutSecurity { .. })));
    }

    #[test]
    fn test_requirements_without_authorized_fails() {
        let f = fixture();
        let mut endpoint = EndpointInfo::new("GET", "/secret", "secret");
        endpoint.add_security_requirement(SecurityRequirement::new("bearer"));
        endpoint.authorized = false;

        let result = collect_references(&f.graph, &[endpoint]);
        assert!(matches!(result, Err(Error::SecurityWithoutAuthorization { .. })));
    }

    #[test]
    fn test_authorization_checked_even_for_unknown_method() {
        let f = fixture();
        let mut endpoint = EndpointInfo::new("CONNECT", "/tunnel", "tunnel");
        endpoint.authorized = true;

        assert!(collect_references(&f.graph, &[endpoint]).is_err());
    }
}
