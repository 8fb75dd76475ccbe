//! Expansion of referenced object types into full component definitions.
//!
//! Path generation only ever emits references. This module computes the
//! transitive closure of object types reachable from those references and
//! generates exactly one definition per qualified name. An object is inserted
//! into the closure before its fields are visited, which is what terminates
//! traversal of cyclic graphs.

use crate::error::Result;
use crate::schema_generator::{Schema, SchemaGenerator, SchemaMode, UsedTypes};
use crate::type_graph::{TypeGraph, TypeKind, TypeRef};
use log::debug;
use std::collections::BTreeMap;

/// Component schema definitions keyed by qualified name
pub type DefinitionSet = BTreeMap<String, Schema>;

struct TypeDecomposer<'g> {
    graph: &'g TypeGraph,
    decomposed: UsedTypes,
}

impl<'g> TypeDecomposer<'g> {
    fn visit(&mut self, ty: TypeRef) -> Result<()> {
        let graph = self.graph;
        let node = graph.node(ty)?;
        match node.kind() {
            TypeKind::Object(_) => self.visit_object(ty, node.name()),
            TypeKind::List(element) => self.visit(*element),
            // Maps have no schema support, so nothing behind them is defined
            TypeKind::Map(_) => Ok(()),
            TypeKind::Primitive(_) | TypeKind::Custom { .. } => Ok(()),
        }
    }

    fn visit_object(&mut self, ty: TypeRef, qualified_name: &str) -> Result<()> {
        if self.decomposed.contains_key(qualified_name) {
            return Ok(());
        }
        debug!("Decomposing object type: {}", qualified_name);
        self.decomposed.insert(qualified_name.to_string(), ty);

        let graph = self.graph;
        for field in graph.ensure_realized(ty)? {
            self.visit(field.ty)?;
        }
        Ok(())
    }
}

/// Compute every object type reachable from `used`, each exactly once
pub fn decompose_types(graph: &TypeGraph, used: &UsedTypes) -> Result<UsedTypes> {
    let mut decomposer = TypeDecomposer {
        graph,
        decomposed: UsedTypes::new(),
    };
    for ty in used.values() {
        decomposer.visit(*ty)?;
    }
    debug!(
        "Decomposed {} referenced types into {} definitions",
        used.len(),
        decomposer.decomposed.len()
    );
    Ok(decomposer.decomposed)
}

/// Generate the inline definition of every type in `closure`.
///
/// Nested objects inside a definition are emitted as references; the closure
/// already holds a definition for each of them.
pub fn generate_definitions(graph: &TypeGraph, closure: &UsedTypes) -> Result<DefinitionSet> {
    let mut definitions = DefinitionSet::new();
    for (qualified_name, ty) in closure {
        let mut generator = SchemaGenerator::new(graph);
        let schema = generator.generate_schema(*ty, SchemaMode::Inline)?;
        definitions.insert(qualified_name.clone(), schema);
    }
    Ok(definitions)
}

/// Decompose `used` and generate a definition for every type in the closure
pub fn expand_closure(graph: &TypeGraph, used: &UsedTypes) -> Result<DefinitionSet> {
    let closure = decompose_types(graph, used)?;
    generate_definitions(graph, &closure)
}
