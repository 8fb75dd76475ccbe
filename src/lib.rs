//! Generation of OpenAPI 3.0 documents from endpoint descriptors and a type graph.
//!
//! Endpoints describe their parameters, bodies, responses and security
//! requirements in terms of a [`type_graph::TypeGraph`]. Object types in the
//! graph may refer to each other in cycles and may have their fields populated
//! lazily on first use.
//!
//! # Architecture
//!
//! 1. [`type_graph`] - Arena of primitive, object, list, map and custom scalar types
//! 2. [`endpoint`] - Endpoint descriptors as supplied by a routing layer
//! 3. [`schema_generator`] - Converts graph types to schemas, as references or inline
//! 4. [`path_builder`] - Builds path items and operations, collecting referenced types and schemes
//! 5. [`decomposer`] - Expands referenced types into the closure of component definitions
//! 6. [`security`] - Maps configured security schemes into the document
//! 7. [`generator`] - Runs the passes above and assembles the [`document::OpenApiDocument`]
//! 8. [`serializer`] - Serializes the document to YAML or JSON
//!
//! [`manifest`] and [`cli`] provide the command-line front end.
//!
//! # Example Usage
//!
//! ```
//! use oas3_docgen::endpoint::{EndpointInfo, ParamInfo};
//! use oas3_docgen::generator::{generate_document, DocumentInfo};
//! use oas3_docgen::serializer::serialize_yaml;
//! use oas3_docgen::type_graph::{Field, PrimitiveType, TypeGraph};
//!
//! let mut graph = TypeGraph::new();
//! let id = graph.primitive(PrimitiveType::I64);
//! let name = graph.string();
//! let pet = graph
//!     .object_with_fields("Pet", vec![Field::new("id", id), Field::new("name", name)])
//!     .unwrap();
//!
//! let mut endpoint = EndpointInfo::new("GET", "/pets/:id", "getPet");
//! endpoint.path_params.push(ParamInfo::new("id", id));
//! endpoint.add_response(200, "the pet", "application/json", pet);
//!
//! let doc = generate_document(&DocumentInfo::new("Pets", "1.0.0"), &graph, &[endpoint]).unwrap();
//! assert!(doc.schemas().unwrap().contains_key("Pet"));
//!
//! let yaml = serialize_yaml(&doc).unwrap();
//! println!("{}", yaml);
//! ```

pub mod cli;
pub mod decomposer;
pub mod document;
pub mod endpoint;
pub mod error;
pub mod generator;
pub mod manifest;
pub mod path_builder;
pub mod schema_generator;
pub mod security;
pub mod serializer;
pub mod type_graph;
