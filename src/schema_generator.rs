use crate::error::Result;
use crate::type_graph::{PrimitiveType, TypeGraph, TypeKind, TypeRef};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of component schema references
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Object types referenced by name, keyed by qualified name
pub type UsedTypes = BTreeMap<String, TypeRef>;

/// Whether object types are emitted as references or inline bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaMode {
    /// Objects become `$ref` pointers and are recorded as used
    Link,
    /// Objects are emitted with their properties; nested objects are still linked
    Inline,
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to another schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "float", "double")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Properties for object types, in field declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

impl Schema {
    /// Reference to the component schema named `qualified_name`
    pub fn reference(qualified_name: &str) -> Self {
        Schema {
            reference: Some(format!("{}{}", SCHEMA_REF_PREFIX, qualified_name)),
            ..Default::default()
        }
    }

    pub fn typed(schema_type: impl Into<String>, format: Option<String>) -> Self {
        Schema {
            schema_type: Some(schema_type.into()),
            format,
            ..Default::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Schema {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    pub fn object(properties: IndexMap<String, Schema>) -> Self {
        Schema {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            ..Default::default()
        }
    }

    /// Name of the referenced component, if this is a reference
    pub fn referenced_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix(SCHEMA_REF_PREFIX))
    }
}

/// Schema generator - converts graph types to OpenAPI schemas.
///
/// Every object type emitted as a reference is recorded in the used-types
/// registry, which seeds the closure computed by [`crate::decomposer`].
pub struct SchemaGenerator<'g> {
    graph: &'g TypeGraph,
    used_types: UsedTypes,
}

impl<'g> SchemaGenerator<'g> {
    /// Create a generator with an empty used-types registry
    pub fn new(graph: &'g TypeGraph) -> Self {
        debug!("Initializing SchemaGenerator");
        Self {
            graph,
            used_types: UsedTypes::new(),
        }
    }

    /// Generate a schema for `ty`
    pub fn generate_schema(&mut self, ty: TypeRef, mode: SchemaMode) -> Result<Schema> {
        let graph = self.graph;
        let node = graph.node(ty)?;
        debug!("Generating schema for type: {} ({:?})", node.name(), mode);

        match node.kind() {
            TypeKind::Primitive(primitive) => Ok(Self::primitive_to_schema(*primitive)),
            TypeKind::Object(_) => self.generate_object_schema(ty, node.name(), mode),
            TypeKind::List(element) => {
                let items = self.generate_schema(*element, mode)?;
                Ok(Schema::array(items))
            }
            TypeKind::Map(_) => {
                debug!("Map types are not supported, emitting empty schema");
                Ok(Schema::default())
            }
            TypeKind::Custom { format } => Ok(Schema::typed(node.name(), format.clone())),
        }
    }

    fn generate_object_schema(
        &mut self,
        ty: TypeRef,
        qualified_name: &str,
        mode: SchemaMode,
    ) -> Result<Schema> {
        if mode == SchemaMode::Link {
            self.used_types
                .entry(qualified_name.to_string())
                .or_insert(ty);
            return Ok(Schema::reference(qualified_name));
        }

        let graph = self.graph;
        let mut properties = IndexMap::new();
        for field in graph.ensure_realized(ty)? {
            let property = self.generate_schema(field.ty, SchemaMode::Link)?;
            properties.insert(field.name.clone(), property);
        }
        Ok(Schema::object(properties))
    }

    /// Convert a primitive type to an OpenAPI schema
    pub fn primitive_to_schema(primitive: PrimitiveType) -> Schema {
        let (schema_type, format) = match primitive {
            PrimitiveType::String => ("string", None),
            PrimitiveType::I8 | PrimitiveType::I16 | PrimitiveType::I32 => {
                ("integer", Some("int32"))
            }
            PrimitiveType::I64 => ("integer", Some("int64")),
            PrimitiveType::U8 | PrimitiveType::U16 | PrimitiveType::U32 => {
                ("integer", Some("int32"))
            }
            PrimitiveType::U64 => ("integer", Some("int64")),
            PrimitiveType::F32 => ("number", Some("float")),
            PrimitiveType::F64 => ("number", Some("double")),
            PrimitiveType::Bool => ("boolean", None),
        };

        Schema::typed(schema_type, format.map(|s| s.to_string()))
    }

    /// Object types referenced so far
    pub fn used_types(&self) -> &UsedTypes {
        &self.used_types
    }

    pub fn into_used_types(self) -> UsedTypes {
        self.used_types
    }
}
