//! Human-readable hints for replies that break their contract.

use accord_contract::{infer_shape, Issues};
use http::Method;
use serde_json::Value;

/// Describes a contract-violating reply and suggests a schema that would
/// accept it.
///
/// The text lists the route, the issues, the received payload and its
/// inferred shape, followed by a union combining the declared schema with
/// the inferred one. It is meant for server logs only.
pub fn response_diagnostic(method: &Method, path: &str, payload: &Value, issues: &Issues) -> String {
    let pretty = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    let shape = infer_shape(payload);

    let issue_lines: Vec<String> = issues.iter().map(|issue| format!("  - {issue}")).collect();

    format!(
        "Response validation failed for {method} {path}\n\
         \n\
         Issues:\n\
         {issues}\n\
         \n\
         Received payload:\n\
         {pretty}\n\
         \n\
         Inferred shape:\n\
         {shape}\n\
         \n\
         If this payload is legitimate, widen the declared response schema:\n\
         \n\
         {suggestion}",
        issues = issue_lines.join("\n"),
        suggestion = union_suggestion(&shape),
    )
}

fn union_suggestion(shape: &str) -> String {
    let indented: Vec<String> = shape.lines().map(|line| format!("    {line}")).collect();
    format!(
        "Schema::union([\n    <declared response schema>,\n{},\n])",
        indented.join("\n")
    )
}
