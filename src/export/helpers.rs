//! Naming and file-writing helpers for the export pipeline.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

pub fn human_to_kebab_case(word: &str) -> String {
    word.replace(' ', "-").trim().to_lowercase()
}

pub fn human_to_snake_case(word: &str) -> String {
    word.replace(' ', "_").trim().to_lowercase()
}

/// Render a JSON value as a Python literal, the way the downstream loader
/// scripts expect (`None`/`True`/`False`, single-quoted strings).
pub fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => python_string(s),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Object(map) => {
            let rendered: Vec<String> = map
                .iter()
                .map(|(key, val)| format!("{}: {}", python_string(key), python_literal(val)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
    }
}

fn python_string(s: &str) -> String {
    // Match repr(): single quotes unless the string contains one and no
    // double quote.
    let (quote, escape_single) = if s.contains('\'') && !s.contains('"') {
        ('"', false)
    } else {
        ('\'', true)
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\'' if escape_single => out.push_str("\\'"),
            other => out.push(other),
        }
    }
    out.push(quote);
    out
}

/// Write `content` to `dir/filename`, creating the directory if needed.
pub fn write_export_file(dir: &Path, filename: &str, content: &str) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {:?}", dir))?;
    let path = dir.join(filename);
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write export file: {:?}", path))?;
    log::debug!("Wrote export file: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kebab_and_snake_casing() {
        assert_eq!(human_to_kebab_case("About Your Organisation"), "about-your-organisation");
        assert_eq!(human_to_snake_case("Community Ownership Fund"), "community_ownership_fund");
    }

    #[test]
    fn python_literal_rendering() {
        let value = json!({
            "name": "Test Fund",
            "welsh_available": false,
            "config": null,
            "base_path": 3,
            "sections": [{"weight": 0.5}],
        });
        assert_eq!(
            python_literal(&value),
            "{'name': 'Test Fund', 'welsh_available': False, 'config': None, \
             'base_path': 3, 'sections': [{'weight': 0.5}]}"
        );
    }

    #[test]
    fn python_strings_quote_like_repr() {
        assert_eq!(python_literal(&json!("it's here")), "\"it's here\"");
        assert_eq!(python_literal(&json!("plain")), "'plain'");
        assert_eq!(python_literal(&json!("line\nbreak")), "'line\\nbreak'");
    }
}
