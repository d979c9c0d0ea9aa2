//! Deterministic YAML rendering of the example manifest grammar
//!
//! One YAML document per recipe, introduced by `---`. Examples are
//! stable-sorted by description and sources carry only their populated
//! fields, so identical accumulator contents always render to identical
//! text regardless of scan order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::ManifestError;
use crate::types::{RecipeExample, EXAMPLE_TYPE, LICENSE_YEAR, YEAR_TOKEN};

/// One serialized manifest document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDoc {
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(rename = "recipeName")]
    pub recipe_name: String,
    pub examples: Vec<RecipeExample>,
}

/// Build a manifest document from accumulated examples.
///
/// Sources are normalized (empty dropped, duplicates collapsed, paths to
/// forward slashes) and examples stable-sorted by description.
pub fn doc_from_examples(recipe_name: &str, examples: &[RecipeExample]) -> ManifestDoc {
    let mut examples: Vec<RecipeExample> = examples.to_vec();
    for example in &mut examples {
        example.normalize_sources();
        for source in &mut example.sources {
            if let Some(path) = &source.path {
                if path.contains('\\') {
                    source.path = Some(path.replace('\\', "/"));
                }
            }
            // Only populated fields are emitted; empty strings count as absent
            for field in [
                &mut source.before,
                &mut source.after,
                &mut source.path,
                &mut source.language,
            ] {
                if field.as_deref() == Some("") {
                    *field = None;
                }
            }
        }
    }
    examples.sort_by(|a, b| a.description.cmp(&b.description));

    ManifestDoc {
        doc_type: EXAMPLE_TYPE.to_string(),
        recipe_name: recipe_name.to_string(),
        examples,
    }
}

/// Render a full manifest: optional license preamble followed by every
/// document in the map's (sorted) iteration order
pub fn render_docs(
    license: Option<&str>,
    docs: &BTreeMap<String, ManifestDoc>,
) -> Result<String, ManifestError> {
    let mut out = String::new();
    if let Some(license) = license {
        out.push_str(&render_license_preamble(license));
    }
    for doc in docs.values() {
        out.push_str("---\n");
        out.push_str(&serde_yaml::to_string(doc)?);
    }
    Ok(out)
}

/// Parse a manifest file into its documents
pub fn parse_docs(content: &str) -> Result<Vec<ManifestDoc>, ManifestError> {
    let mut docs = Vec::new();
    for de in serde_yaml::Deserializer::from_str(content) {
        docs.push(ManifestDoc::deserialize(de)?);
    }
    Ok(docs)
}

/// Re-parse freshly rendered text, returning the document count.
///
/// Used as the validity gate before any file replacement.
pub fn validate(content: &str) -> Result<usize, ManifestError> {
    let docs = parse_docs(content)?;
    for doc in &docs {
        if doc.recipe_name.is_empty() {
            return Err(ManifestError::InvalidDocument(
                "document without a recipe name".to_string(),
            ));
        }
    }
    Ok(docs.len())
}

/// Render the license header as a YAML comment preamble.
///
/// A single-line header becomes one comment line followed by a blank line; a
/// multi-line header gets a per-line comment prefix and no extra trailing
/// blank. The year template token is pinned to a fixed value.
pub fn render_license_preamble(text: &str) -> String {
    let text = text.replace(YEAR_TOKEN, LICENSE_YEAR);
    let lines: Vec<&str> = text.lines().collect();
    match lines.as_slice() {
        [] => String::new(),
        [line] => format!("# {}\n\n", line.trim_end()),
        lines => {
            let mut out = String::new();
            for line in lines {
                if line.trim_end().is_empty() {
                    out.push_str("#\n");
                } else {
                    out.push_str("# ");
                    out.push_str(line.trim_end());
                    out.push('\n');
                }
            }
            out
        }
    }
}
