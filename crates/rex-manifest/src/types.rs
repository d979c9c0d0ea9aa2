//! Core types for the example manifest grammar
//!
//! A manifest is a sequence of YAML documents, one per recipe. Each document
//! carries a fixed type discriminator, the qualified recipe name, and the
//! examples mined for it. Field order in the serialized output follows the
//! declaration order here.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Type discriminator emitted at the top of every recipe document
pub const EXAMPLE_TYPE: &str = "specs.openrewrite.org/v1beta/example";

/// File name shared by every example manifest
pub const EXAMPLES_FILE_NAME: &str = "examples.yml";

/// Manifest location relative to a project root
pub const EXAMPLES_RELATIVE_PATH: &str = "src/main/resources/META-INF/rewrite/examples.yml";

/// Fixed file name of the license header asset discovered during the scan
pub const LICENSE_HEADER_FILE_NAME: &str = "licenseHeader.txt";

/// Template token substituted in license headers
pub const YEAR_TOKEN: &str = "${year}";

/// Fixed substitution for [`YEAR_TOKEN`]. Pinned so that regenerating the
/// manifests never churns on the wall clock.
pub const LICENSE_YEAR: &str = "2025";

/// Identity of the recipe a test exercises: qualified name plus the literal
/// texts of its constructor arguments. Computed once by the context resolver
/// and used as a grouping key from then on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleIdentity {
    pub name: String,
    pub parameters: SmallVec<[String; 4]>,
}

impl RuleIdentity {
    /// Identity recognized by qualified name only, without captured parameters
    pub fn named(name: impl Into<String>) -> Self {
        RuleIdentity {
            name: name.into(),
            parameters: SmallVec::new(),
        }
    }

    /// A resolvable identity has at least a non-empty recipe name
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }
}

/// One before/after snippet pair with its metadata. Only populated fields are
/// serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ExampleSource {
    /// A source is worth recording only if it shows some code
    pub fn has_content(&self) -> bool {
        self.before.as_deref().is_some_and(|s| !s.is_empty())
            || self.after.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Ordering key used for dedup and deterministic output
    pub fn sort_key(&self) -> (&str, &str) {
        (
            self.language.as_deref().unwrap_or(""),
            self.before.as_deref().unwrap_or(""),
        )
    }
}

/// One documented example: description, the recipe's constructor parameter
/// texts, and the ordered sources it transforms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeExample {
    pub description: String,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub parameters: SmallVec<[String; 4]>,
    pub sources: Vec<ExampleSource>,
}

impl RecipeExample {
    /// Drop empty and duplicate sources, then fix the serialization order.
    ///
    /// Duplicates are collapsed by `(language, before)`; author-declared
    /// ordering is traded for deterministic output.
    pub fn normalize_sources(&mut self) {
        self.sources.retain(ExampleSource::has_content);
        self.sources.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        self.sources.dedup_by(|a, b| a.sort_key() == b.sort_key());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(language: &str, before: &str) -> ExampleSource {
        ExampleSource {
            before: Some(before.to_string()),
            language: Some(language.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_source_has_no_content() {
        assert!(!ExampleSource::default().has_content());

        let empty_texts = ExampleSource {
            before: Some(String::new()),
            after: Some(String::new()),
            ..Default::default()
        };
        assert!(!empty_texts.has_content());
    }

    #[test]
    fn test_after_only_source_has_content() {
        let generated = ExampleSource {
            after: Some("class B {}".to_string()),
            ..Default::default()
        };
        assert!(generated.has_content());
    }

    #[test]
    fn test_normalize_drops_empty_and_duplicate_sources() {
        let mut example = RecipeExample {
            description: "test".to_string(),
            parameters: SmallVec::new(),
            sources: vec![
                source("java", "class B {}"),
                ExampleSource::default(),
                source("java", "class A {}"),
                source("java", "class B {}"),
            ],
        };

        example.normalize_sources();

        assert_eq!(example.sources.len(), 2);
        assert_eq!(example.sources[0].before.as_deref(), Some("class A {}"));
        assert_eq!(example.sources[1].before.as_deref(), Some("class B {}"));
    }

    #[test]
    fn test_sources_ordered_by_language_then_before() {
        let mut example = RecipeExample {
            sources: vec![source("xml", "<a/>"), source("java", "class A {}")],
            ..Default::default()
        };

        example.normalize_sources();

        assert_eq!(example.sources[0].language.as_deref(), Some("java"));
        assert_eq!(example.sources[1].language.as_deref(), Some("xml"));
    }

    #[test]
    fn test_rule_identity_validity() {
        assert!(!RuleIdentity::default().is_valid());
        assert!(RuleIdentity::named("org.openrewrite.java.RemoveUnusedImports").is_valid());
    }
}
