use crate::type_graph::TypeRef;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for document generation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A type handle that does not belong to the graph it is used with
    #[error("type handle {0} is not part of this type graph")]
    UnknownType(TypeRef),

    #[error("type '{0}' is not an object type")]
    NotAnObject(String),

    #[error("object type '{0}' is already declared")]
    DuplicateType(String),

    #[error("fields of object type '{0}' are already defined")]
    FieldsAlreadyDefined(String),

    #[error("failed to realize fields of '{type_name}': {message}")]
    Realization { type_name: String, message: String },

    #[error("endpoint {method} {path} is authorized but declares no security requirements")]
    AuthorizedWithoutSecurity { method: String, path: String },

    #[error("endpoint {method} {path} declares security requirements but is not authorized")]
    SecurityWithoutAuthorization { method: String, path: String },

    #[error("security requirement references undeclared security scheme '{0}'")]
    UnknownSecurityScheme(String),

    #[error("invalid manifest: {0}")]
    Manifest(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Build a realization failure for the named type
    pub fn realization(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Realization {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML: {}", err))
    }
}
