//! Form-runner document handling: the document model, the assembler that
//! turns stored application config into runner JSON, schema validation of
//! the output, and the importer that loads a runner document back into
//! relational rows as a template.

pub mod build;
pub mod document;
pub mod import;
pub mod schema;

pub use build::build_form_json;
pub use document::FormDocument;
