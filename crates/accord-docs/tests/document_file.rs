//! Writing generated documents to disk.

use std::sync::Arc;

use accord_contract::{Contract, Schema};
use accord_docs::{DocsRegistry, OpenApi, OpenApiGenerator};
use http::Method;

#[test]
fn test_document_round_trips_through_file() {
    let registry = DocsRegistry::new();
    let contract = Contract::builder()
        .query(Schema::object([("q", Schema::string().min_length(3))]))
        .response(Schema::array(Schema::object([("id", Schema::integer())])))
        .build()
        .unwrap();
    registry.register_path("/search", Method::GET, Arc::new(contract), vec!["Search".into()]);

    let generator = OpenApiGenerator::new()
        .title("Search API")
        .description("Full text search")
        .server("v1", None);
    let doc = registry.generate_with(&generator).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("openapi.json");
    doc.write_to(&path).unwrap();

    let written: OpenApi = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, doc);
    assert_eq!(written.info.description.as_deref(), Some("Full text search"));
    assert_eq!(written.servers[0].url, "v1");

    let op = written.operation("/search", &Method::GET).unwrap();
    assert_eq!(op.parameters[0].name, "q");
    assert_eq!(op.parameters[0].schema.as_ref().unwrap()["minLength"], 3);
}
