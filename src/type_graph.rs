//! Reflected type graph consumed by the schema generator.
//!
//! Types live in an arena owned by [`TypeGraph`] and are addressed through
//! copyable [`TypeRef`] handles, which lets object types reference each other
//! in cycles without reference-counted ownership loops.
//!
//! Object fields may be supplied up front or populated lazily by a
//! [`FieldRealizer`] the first time [`TypeGraph::ensure_realized`] is called.
//! Realization happens at most once per object; later calls return the cached
//! field list.

use crate::error::{Error, Result};
use log::debug;
use std::cell::{Cell, OnceCell};
use std::collections::HashMap;
use std::fmt;

/// Handle to a node in a [`TypeGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(usize);

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Primitive types with a direct schema mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    String,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
}

impl PrimitiveType {
    /// Parse a primitive type name as written in manifests
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" | "String" | "str" => Some(PrimitiveType::String),
            "int8" | "i8" => Some(PrimitiveType::I8),
            "int16" | "i16" => Some(PrimitiveType::I16),
            "int32" | "i32" | "integer" => Some(PrimitiveType::I32),
            "int64" | "i64" | "long" => Some(PrimitiveType::I64),
            "uint8" | "u8" => Some(PrimitiveType::U8),
            "uint16" | "u16" => Some(PrimitiveType::U16),
            "uint32" | "u32" => Some(PrimitiveType::U32),
            "uint64" | "u64" => Some(PrimitiveType::U64),
            "float" | "float32" | "f32" => Some(PrimitiveType::F32),
            "double" | "float64" | "f64" => Some(PrimitiveType::F64),
            "boolean" | "bool" => Some(PrimitiveType::Bool),
            _ => None,
        }
    }

    /// Canonical display name
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::String => "String",
            PrimitiveType::I8 => "Int8",
            PrimitiveType::I16 => "Int16",
            PrimitiveType::I32 => "Int32",
            PrimitiveType::I64 => "Int64",
            PrimitiveType::U8 => "UInt8",
            PrimitiveType::U16 => "UInt16",
            PrimitiveType::U32 => "UInt32",
            PrimitiveType::U64 => "UInt64",
            PrimitiveType::F32 => "Float32",
            PrimitiveType::F64 => "Float64",
            PrimitiveType::Bool => "Boolean",
        }
    }
}

/// A named field of an object type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Populates the field list of an object type on first use.
///
/// The graph is passed in so realizers can look up other object types by
/// qualified name, which is how mutually recursive types are wired together.
///
/// Realization is not reentrant. A realizer must reference other object types
/// through [`TypeGraph::lookup_object`] and must not call
/// [`TypeGraph::ensure_realized`] on any type in its own cycle; doing so fails
/// with [`Error::Realization`] instead of recursing.
pub trait FieldRealizer {
    fn realize(&self, graph: &TypeGraph) -> Result<Vec<Field>>;
}

impl<F> FieldRealizer for F
where
    F: Fn(&TypeGraph) -> Result<Vec<Field>>,
{
    fn realize(&self, graph: &TypeGraph) -> Result<Vec<Field>> {
        self(graph)
    }
}

/// Object type whose fields are filled in at most once
pub struct ObjectType {
    fields: OnceCell<Vec<Field>>,
    realizer: Option<Box<dyn FieldRealizer>>,
    realizing: Cell<bool>,
}

impl ObjectType {
    /// Whether the field list has been populated
    pub fn is_realized(&self) -> bool {
        self.fields.get().is_some()
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectType")
            .field("fields", &self.fields.get())
            .field("lazy", &self.realizer.is_some())
            .finish()
    }
}

/// The kind of a type node
#[derive(Debug)]
pub enum TypeKind {
    Primitive(PrimitiveType),
    Object(ObjectType),
    /// Homogeneous list with one element type
    List(TypeRef),
    /// String-keyed map with one value type
    Map(TypeRef),
    /// Scalar the generator does not know; rendered with its raw name and format
    Custom { format: Option<String> },
}

/// A node of the type graph
#[derive(Debug)]
pub struct TypeNode {
    name: String,
    kind: TypeKind,
}

impl TypeNode {
    /// Qualified name for objects, display name otherwise
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, TypeKind::Object(_))
    }
}

/// Arena of type descriptors
#[derive(Debug, Default)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    objects: HashMap<String, TypeRef>,
    primitives: HashMap<PrimitiveType, TypeRef>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: String, kind: TypeKind) -> TypeRef {
        let type_ref = TypeRef(self.nodes.len());
        self.nodes.push(TypeNode { name, kind });
        type_ref
    }

    /// Get the primitive node, creating it on first use
    pub fn primitive(&mut self, primitive: PrimitiveType) -> TypeRef {
        if let Some(existing) = self.primitives.get(&primitive) {
            return *existing;
        }
        let type_ref = self.push(primitive.name().to_string(), TypeKind::Primitive(primitive));
        self.primitives.insert(primitive, type_ref);
        type_ref
    }

    pub fn string(&mut self) -> TypeRef {
        self.primitive(PrimitiveType::String)
    }

    /// Add a custom scalar type
    pub fn custom(&mut self, name: impl Into<String>, format: Option<&str>) -> TypeRef {
        self.push(
            name.into(),
            TypeKind::Custom {
                format: format.map(str::to_string),
            },
        )
    }

    pub fn list_of(&mut self, element: TypeRef) -> TypeRef {
        self.push("List".to_string(), TypeKind::List(element))
    }

    pub fn map_of(&mut self, value: TypeRef) -> TypeRef {
        self.push("Map".to_string(), TypeKind::Map(value))
    }

    fn insert_object(
        &mut self,
        qualified_name: String,
        realizer: Option<Box<dyn FieldRealizer>>,
    ) -> Result<TypeRef> {
        if self.objects.contains_key(&qualified_name) {
            return Err(Error::DuplicateType(qualified_name));
        }
        debug!("Declaring object type: {}", qualified_name);
        let object = ObjectType {
            fields: OnceCell::new(),
            realizer,
            realizing: Cell::new(false),
        };
        let type_ref = self.push(qualified_name.clone(), TypeKind::Object(object));
        self.objects.insert(qualified_name, type_ref);
        Ok(type_ref)
    }

    /// Declare an object type whose fields are set later with [`TypeGraph::set_fields`]
    pub fn declare_object(&mut self, qualified_name: impl Into<String>) -> Result<TypeRef> {
        self.insert_object(qualified_name.into(), None)
    }

    /// Declare an object type with its fields
    pub fn object_with_fields(
        &mut self,
        qualified_name: impl Into<String>,
        fields: Vec<Field>,
    ) -> Result<TypeRef> {
        let type_ref = self.declare_object(qualified_name)?;
        self.set_fields(type_ref, fields)?;
        Ok(type_ref)
    }

    /// Declare an object type whose fields come from `realizer` on first use
    pub fn lazy_object(
        &mut self,
        qualified_name: impl Into<String>,
        realizer: impl FieldRealizer + 'static,
    ) -> Result<TypeRef> {
        self.insert_object(qualified_name.into(), Some(Box::new(realizer)))
    }

    /// Define the fields of a declared object type. Fields can be defined once.
    pub fn set_fields(&self, object: TypeRef, fields: Vec<Field>) -> Result<()> {
        let (name, object_type) = self.object(object)?;
        for field in &fields {
            self.node(field.ty)?;
        }
        object_type
            .fields
            .set(fields)
            .map_err(|_| Error::FieldsAlreadyDefined(name.to_string()))
    }

    /// Look up an object type by qualified name
    pub fn lookup_object(&self, qualified_name: &str) -> Option<TypeRef> {
        self.objects.get(qualified_name).copied()
    }

    pub fn node(&self, type_ref: TypeRef) -> Result<&TypeNode> {
        self.nodes.get(type_ref.0).ok_or(Error::UnknownType(type_ref))
    }

    fn object(&self, type_ref: TypeRef) -> Result<(&str, &ObjectType)> {
        let node = self.node(type_ref)?;
        match &node.kind {
            TypeKind::Object(object) => Ok((&node.name, object)),
            _ => Err(Error::NotAnObject(node.name.clone())),
        }
    }

    /// Return the fields of an object type, running its realizer the first time.
    ///
    /// An object without a realizer and without explicitly set fields realizes
    /// to an empty field list.
    pub fn ensure_realized(&self, object: TypeRef) -> Result<&[Field]> {
        let (name, object_type) = self.object(object)?;
        if let Some(fields) = object_type.fields.get() {
            return Ok(fields.as_slice());
        }

        let fields = match &object_type.realizer {
            Some(realizer) => {
                if object_type.realizing.replace(true) {
                    return Err(Error::realization(
                        name,
                        "realizer re-entered its own type; reference it with lookup_object",
                    ));
                }
                debug!("Realizing fields of {}", name);
                let realized = realizer.realize(self);
                object_type.realizing.set(false);
                realized?
            }
            None => Vec::new(),
        };
        for field in &fields {
            self.node(field.ty).map_err(|_| {
                Error::realization(name, format!("field '{}' has a dangling type", field.name))
            })?;
        }

        Ok(object_type.fields.get_or_init(|| fields).as_slice())
    }

    /// Number of nodes in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
