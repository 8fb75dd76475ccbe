use oas3_docgen::{
    endpoint::{BodyInfo, EndpointInfo},
    error::Result,
    generator::{generate_document, DocumentInfo},
    type_graph::{Field, PrimitiveType, TypeGraph},
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

/// Employee and Department refer to each other; Department is realized lazily
/// by looking Employee up by name.
fn company_graph(realizations: Rc<Cell<usize>>) -> (TypeGraph, EndpointInfo) {
    let mut graph = TypeGraph::new();
    let text = graph.string();
    let employee = graph.declare_object("Employee").unwrap();
    let department = graph
        .lazy_object("Department", move |graph: &TypeGraph| -> Result<Vec<Field>> {
            realizations.set(realizations.get() + 1);
            let employee = graph.lookup_object("Employee").unwrap();
            Ok(vec![Field::new("title", text), Field::new("head", employee)])
        })
        .unwrap();
    let colleagues = graph.list_of(employee);
    graph
        .set_fields(
            employee,
            vec![
                Field::new("name", text),
                Field::new("department", department),
                Field::new("colleagues", colleagues),
            ],
        )
        .unwrap();

    let mut endpoint = EndpointInfo::new("POST", "/employees", "hire");
    endpoint.body = Some(BodyInfo {
        name: "employee".to_string(),
        ty: employee,
        content_type: None,
    });
    let id = graph.primitive(PrimitiveType::I64);
    endpoint.add_response(201, "hired", "text/plain", id);
    (graph, endpoint)
}

#[test]
fn test_mutually_recursive_types_are_defined_once() {
    let realizations = Rc::new(Cell::new(0));
    let (graph, endpoint) = company_graph(Rc::clone(&realizations));

    let doc_info = DocumentInfo::new("Company", "1.0.0");
    let doc = generate_document(&doc_info, &graph, &[endpoint]).unwrap();
    let json = serde_json::to_value(&doc).unwrap();

    assert_eq!(
        json["components"],
        json!({
            "schemas": {
                "Department": {
                    "type": "object",
                    "properties": {
                        "head": {"$ref": "#/components/schemas/Employee"},
                        "title": {"type": "string"}
                    }
                },
                "Employee": {
                    "type": "object",
                    "properties": {
                        "colleagues": {
                            "type": "array",
                            "items": {"$ref": "#/components/schemas/Employee"}
                        },
                        "department": {"$ref": "#/components/schemas/Department"},
                        "name": {"type": "string"}
                    }
                }
            }
        })
    );
    assert_eq!(realizations.get(), 1);
}

#[test]
fn test_operation_sees_only_references() {
    let (graph, endpoint) = company_graph(Rc::new(Cell::new(0)));

    let doc = generate_document(&DocumentInfo::default(), &graph, &[endpoint]).unwrap();
    let json = serde_json::to_value(&doc).unwrap();

    assert_eq!(
        json["paths"]["/employees"]["post"]["requestBody"],
        json!({
            "description": "request body",
            "content": {
                "application/json": {
                    "schema": {"$ref": "#/components/schemas/Employee"}
                }
            }
        })
    );
    assert_eq!(
        json["paths"]["/employees"]["post"]["responses"]["201"]["content"]["text/plain"]["schema"],
        json!({"type": "integer", "format": "int64"})
    );
}

#[test]
fn test_repeated_generation_realizes_once() {
    let realizations = Rc::new(Cell::new(0));
    let (graph, endpoint) = company_graph(Rc::clone(&realizations));
    let endpoints = vec![endpoint];

    let first = generate_document(&DocumentInfo::default(), &graph, &endpoints).unwrap();
    let second = generate_document(&DocumentInfo::default(), &graph, &endpoints).unwrap();

    assert_eq!(first, second);
    assert_eq!(realizations.get(), 1);
}
