//! JSON Schema validation of assembled runner documents.

use jsonschema::JSONSchema;
use serde_json::{json, Value};

/// Draft-07 schema for the runner document shape.
pub fn form_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "startPage": {"type": "string"},
            "sections": {"type": "array"},
            "pages": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "path": {"type": "string"},
                        "title": {"type": "string"},
                        "options": {"type": "object"},
                        "section": {"type": "string"},
                        "components": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "options": {
                                        "type": "object",
                                        "properties": {
                                            "hideTitle": {"type": "boolean"},
                                            "classes": {"type": "string"}
                                        }
                                    },
                                    "type": {"type": "string"},
                                    "title": {"type": ["string", "null"]},
                                    "content": {"type": ["string", "null"]},
                                    "hint": {"type": "string"},
                                    "schema": {"type": "object"},
                                    "name": {"type": "string"},
                                    "metadata": {"type": "object"},
                                    "children": {"type": "array"}
                                }
                            }
                        }
                    },
                    "required": ["path", "title", "components"]
                }
            },
            "lists": {"type": "array"},
            "conditions": {"type": "array"},
            "outputs": {"type": "array"},
            "skipSummary": {"type": "boolean"}
        },
        "required": [
            "startPage",
            "name",
            "pages",
            "lists",
            "conditions",
            "outputs",
            "skipSummary",
            "sections"
        ]
    })
}

/// Validate a document against [`form_schema`]. Failures are logged and
/// reported as `false` rather than errors, so export can skip the document
/// and carry on.
pub fn validate_document(document: &Value) -> bool {
    let schema = form_schema();
    let compiled = match JSONSchema::compile(&schema) {
        Ok(compiled) => compiled,
        Err(err) => {
            log::error!("Form document schema failed to compile: {}", err);
            return false;
        }
    };

    // The error iterator borrows `compiled`, so it must be consumed before
    // the function returns.
    if let Err(errors) = compiled.validate(document) {
        for error in errors {
            log::error!("Form document is invalid: {}", error);
        }
        return false;
    }

    log::debug!("Form document is valid");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document_passes() {
        let document = json!({
            "startPage": "/intro-test",
            "name": "Access Funding",
            "pages": [],
            "lists": [],
            "conditions": [],
            "outputs": [],
            "skipSummary": false,
            "sections": [],
        });
        assert!(validate_document(&document));
    }

    #[test]
    fn missing_start_page_fails() {
        let document = json!({
            "name": "Access Funding",
            "pages": [],
            "lists": [],
            "conditions": [],
            "outputs": [],
            "skipSummary": false,
            "sections": [],
        });
        assert!(!validate_document(&document));
    }

    #[test]
    fn page_without_title_fails() {
        let document = json!({
            "startPage": "/intro-test",
            "name": "Access Funding",
            "pages": [{"path": "/about", "components": []}],
            "lists": [],
            "conditions": [],
            "outputs": [],
            "skipSummary": false,
            "sections": [],
        });
        assert!(!validate_document(&document));
    }
}
