//! Endpoint descriptors supplied by the routing layer.
//!
//! An [`EndpointInfo`] carries everything needed to generate one OpenAPI
//! operation: method and path, documentation strings, parameters, request body
//! and response types, and the security requirements of the endpoint. Types are
//! referenced through [`TypeRef`] handles into a shared [`crate::type_graph::TypeGraph`].

use crate::type_graph::TypeRef;
use std::fmt;

/// Name of the header that carries credentials. It is expressed through the
/// operation's security block and never listed as a plain parameter.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Whether `name` is the authorization header, ignoring case
pub fn is_authorization_header(name: &str) -> bool {
    name.eq_ignore_ascii_case(AUTHORIZATION_HEADER)
}

/// HTTP methods that map to an operation slot of a path item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Parse a method name case-insensitively. Returns `None` for methods
    /// without an operation slot.
    pub fn parse(method: &str) -> Option<Self> {
        match method.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "PUT" => Some(HttpMethod::Put),
            "POST" => Some(HttpMethod::Post),
            "DELETE" => Some(HttpMethod::Delete),
            "OPTIONS" => Some(HttpMethod::Options),
            "HEAD" => Some(HttpMethod::Head),
            "PATCH" => Some(HttpMethod::Patch),
            "TRACE" => Some(HttpMethod::Trace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path, query or header parameter
#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
    pub required: bool,
    pub deprecated: bool,
}

impl ParamInfo {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            required: false,
            deprecated: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A media type paired with the type of its payload
#[derive(Debug, Clone)]
pub struct ContentSchema {
    pub content_type: String,
    pub ty: TypeRef,
}

impl ContentSchema {
    pub fn new(content_type: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            content_type: content_type.into(),
            ty,
        }
    }
}

/// Single request body used when no consumed media types are declared
#[derive(Debug, Clone)]
pub struct BodyInfo {
    pub name: String,
    pub ty: TypeRef,
    /// Declared content type; inferred from the body type when absent
    pub content_type: Option<String>,
}

/// One declared response of an endpoint
#[derive(Debug, Clone)]
pub struct ResponseInfo {
    pub status: u16,
    pub description: String,
    pub content: ContentSchema,
}

/// A security scheme an endpoint demands, with optional scopes.
///
/// `scopes == None` means authentication without scope restrictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRequirement {
    pub scheme: String,
    pub scopes: Option<Vec<String>>,
}

impl SecurityRequirement {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            scopes: None,
        }
    }

    pub fn with_scopes<I, S>(scheme: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scheme: scheme.into(),
            scopes: Some(scopes.into_iter().map(Into::into).collect()),
        }
    }
}

/// Complete description of one API endpoint
#[derive(Debug, Clone)]
pub struct EndpointInfo {
    /// Raw HTTP method as registered; matched case-insensitively
    pub method: String,
    pub path: String,
    /// Operation identifier
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub path_params: Vec<ParamInfo>,
    pub query_params: Vec<ParamInfo>,
    pub headers: Vec<ParamInfo>,
    pub consumes: Vec<ContentSchema>,
    pub body: Option<BodyInfo>,
    pub responses: Vec<ResponseInfo>,
    pub security_requirements: Vec<SecurityRequirement>,
    /// Must be `true` exactly when `security_requirements` is non-empty
    pub authorized: bool,
}

impl EndpointInfo {
    /// Create an endpoint with no parameters, body, responses or security
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            name: name.into(),
            summary: None,
            description: None,
            path_params: Vec::new(),
            query_params: Vec::new(),
            headers: Vec::new(),
            consumes: Vec::new(),
            body: None,
            responses: Vec::new(),
            security_requirements: Vec::new(),
            authorized: false,
        }
    }

    /// Add a response for `status`
    pub fn add_response(
        &mut self,
        status: u16,
        description: impl Into<String>,
        content_type: impl Into<String>,
        ty: TypeRef,
    ) {
        self.responses.push(ResponseInfo {
            status,
            description: description.into(),
            content: ContentSchema::new(content_type, ty),
        });
    }

    /// Add a security requirement and mark the endpoint as authorized
    pub fn add_security_requirement(&mut self, requirement: SecurityRequirement) {
        self.security_requirements.push(requirement);
        self.authorized = true;
    }
}
