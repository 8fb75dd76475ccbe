//! Security scheme configuration and its mapping into the document model.

use crate::document::{OAuthFlow, OAuthFlows, SecurityScheme};
use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Configured security schemes keyed by scheme name
pub type SecuritySchemes = BTreeMap<String, SecuritySchemeConfig>;

/// One OAuth2 flow as configured
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlowConfig {
    #[serde(default)]
    pub authorization_url: Option<String>,
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default)]
    pub refresh_url: Option<String>,
    #[serde(default)]
    pub scopes: Option<BTreeMap<String, String>>,
}

/// Configured OAuth2 flows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlowsConfig {
    #[serde(default)]
    pub implicit: Option<OAuthFlowConfig>,
    #[serde(default)]
    pub password: Option<OAuthFlowConfig>,
    #[serde(default)]
    pub client_credentials: Option<OAuthFlowConfig>,
    #[serde(default)]
    pub authorization_code: Option<OAuthFlowConfig>,
}

/// Externally supplied definition of a security scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySchemeConfig {
    /// `http`, `apiKey`, `oauth2` or `openIdConnect`
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "in")]
    pub location: Option<String>,
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub bearer_format: Option<String>,
    #[serde(default)]
    pub flows: Option<OAuthFlowsConfig>,
    #[serde(default)]
    pub open_id_connect_url: Option<String>,
}

impl SecuritySchemeConfig {
    fn with_type(scheme_type: &str) -> Self {
        Self {
            scheme_type: scheme_type.to_string(),
            description: None,
            name: None,
            location: None,
            scheme: None,
            bearer_format: None,
            flows: None,
            open_id_connect_url: None,
        }
    }

    /// HTTP bearer authentication with an optional token format hint
    pub fn bearer(bearer_format: Option<&str>) -> Self {
        Self {
            scheme: Some("bearer".to_string()),
            bearer_format: bearer_format.map(str::to_string),
            ..Self::with_type("http")
        }
    }

    /// HTTP basic authentication
    pub fn basic() -> Self {
        Self {
            scheme: Some("basic".to_string()),
            ..Self::with_type("http")
        }
    }

    /// API key carried in `location` (`header`, `query` or `cookie`) under `name`
    pub fn api_key(location: &str, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            location: Some(location.to_string()),
            ..Self::with_type("apiKey")
        }
    }

    pub fn oauth2(flows: OAuthFlowsConfig) -> Self {
        Self {
            flows: Some(flows),
            ..Self::with_type("oauth2")
        }
    }

    pub fn open_id_connect(url: &str) -> Self {
        Self {
            open_id_connect_url: Some(url.to_string()),
            ..Self::with_type("openIdConnect")
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

fn map_flow(flow: &OAuthFlowConfig) -> OAuthFlow {
    OAuthFlow {
        authorization_url: flow.authorization_url.clone(),
        token_url: flow.token_url.clone(),
        refresh_url: flow.refresh_url.clone(),
        scopes: flow.scopes.clone(),
    }
}

fn map_flows(flows: &OAuthFlowsConfig) -> OAuthFlows {
    OAuthFlows {
        implicit: flows.implicit.as_ref().map(map_flow),
        password: flows.password.as_ref().map(map_flow),
        client_credentials: flows.client_credentials.as_ref().map(map_flow),
        authorization_code: flows.authorization_code.as_ref().map(map_flow),
    }
}

/// Copy one configured scheme into the document model
pub fn map_security_scheme(config: &SecuritySchemeConfig) -> SecurityScheme {
    SecurityScheme {
        scheme_type: config.scheme_type.clone(),
        description: config.description.clone(),
        name: config.name.clone(),
        location: config.location.clone(),
        scheme: config.scheme.clone(),
        bearer_format: config.bearer_format.clone(),
        flows: config.flows.as_ref().map(map_flows),
        open_id_connect_url: config.open_id_connect_url.clone(),
    }
}

/// Map every scheme in `used` from `configured` into the document model.
///
/// Only schemes some operation references are emitted. A referenced scheme
/// missing from the configuration is an error. Returns `None` when no scheme
/// is referenced.
pub fn map_security_schemes(
    configured: Option<&SecuritySchemes>,
    used: &BTreeSet<String>,
) -> Result<Option<BTreeMap<String, SecurityScheme>>> {
    if used.is_empty() {
        return Ok(None);
    }

    let mut schemes = BTreeMap::new();
    for name in used {
        let config = configured
            .and_then(|c| c.get(name))
            .ok_or_else(|| Error::UnknownSecurityScheme(name.clone()))?;
        debug!("Mapping security scheme: {} ({})", name, config.scheme_type);
        schemes.insert(name.clone(), map_security_scheme(config));
    }
    Ok(Some(schemes))
}
