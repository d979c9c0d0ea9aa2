//! Corpus walker and per-file scan driver
//!
//! The scan phase walks the corpus once, in a deterministic order, and
//! routes every file it understands: recipe test sources are mined for
//! examples, manifest-shaped files are tracked as already on disk, and the
//! license header asset is captured the first time it is visited.
//!
//! Per-file traversal is sequential; independent files may be scanned in
//! parallel because accumulator appends commute.

use anyhow::Result;
use ast_grep_core::AstGrep;
use ast_grep_language::Java;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use rex_manifest::{Accumulator, RecipeExample, LICENSE_HEADER_FILE_NAME};

use crate::collector::{collect_example, RUN_EXAMPLE_CALL};
use crate::context::{find_rule, is_defaults_method, ImportMap, RuleScope};
use crate::expr::{invocation_name, named_children, string_literal_value, subtree, JavaNode};
use crate::paths;

/// One mined fact: an example attributed to a recipe and routed to its
/// output manifest
#[derive(Debug, Clone)]
pub struct ExampleFact {
    pub target_path: PathBuf,
    pub rule_name: String,
    pub example: RecipeExample,
}

/// Counters reported after a scan
#[derive(Debug, Default)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub examples_recorded: usize,
    pub manifests_seen: usize,
    pub license_found: bool,
}

/// Walks a corpus root and fills the accumulator
pub struct TestSourceScanner {
    corpus_root: PathBuf,
    license_file_name: String,
    parallel: bool,
}

impl TestSourceScanner {
    pub fn new(corpus_root: PathBuf) -> Self {
        debug!("Initializing test source scanner for: {:?}", corpus_root);
        TestSourceScanner {
            corpus_root,
            license_file_name: LICENSE_HEADER_FILE_NAME.to_string(),
            parallel: true,
        }
    }

    pub fn with_license_file_name(mut self, name: impl Into<String>) -> Self {
        self.license_file_name = name.into();
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Scan the corpus, recording every mined fact into the accumulator
    pub fn scan(&self, acc: &Accumulator) -> Result<ScanStats> {
        let mut stats = ScanStats::default();
        let mut test_files = Vec::new();

        // The walk itself stays sequential and sorted so that routing and
        // license discovery are deterministic
        for entry in WalkDir::new(&self.corpus_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            if path.file_name().and_then(|n| n.to_str()) == Some(self.license_file_name.as_str()) {
                // First-seen wins; later candidates are not even read
                if !acc.has_license_header() {
                    match fs::read_to_string(path) {
                        Ok(text) => {
                            if acc.record_license_header(&text) {
                                debug!("License header discovered at: {:?}", path);
                                stats.license_found = true;
                            }
                        }
                        Err(e) => debug!("Error reading license asset {:?}: {}", path, e),
                    }
                }
            } else if paths::is_manifest_path(path) {
                acc.record_existing_manifest(path);
                stats.manifests_seen += 1;
            } else if path.extension().and_then(|s| s.to_str()) == Some("java")
                && paths::derive_target_path(path).is_some()
            {
                test_files.push(path.to_path_buf());
            }
        }

        stats.files_scanned = test_files.len();
        stats.examples_recorded = if self.parallel {
            test_files
                .par_iter()
                .map(|path| Self::scan_file(path, acc))
                .sum()
        } else {
            test_files
                .iter()
                .map(|path| Self::scan_file(path, acc))
                .sum()
        };

        info!(
            "Scanned {} test files, recorded {} examples",
            stats.files_scanned, stats.examples_recorded
        );
        Ok(stats)
    }

    fn scan_file(path: &Path, acc: &Accumulator) -> usize {
        debug!("Scanning test file: {:?}", path);
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("Error reading file {:?}: {}", path, e);
                return 0;
            }
        };

        let facts = scan_source(&content, path);
        let count = facts.len();
        for fact in facts {
            acc.record(&fact.target_path, &fact.rule_name, fact.example);
        }
        count
    }
}

/// Mine one test source. Pure: parses the content and returns the facts it
/// would record, attributed to the target derived from `file_path`.
pub fn scan_source(content: &str, file_path: &Path) -> Vec<ExampleFact> {
    let Some(target_path) = paths::derive_target_path(file_path) else {
        return Vec::new();
    };

    let sg = AstGrep::new(content, Java);
    let root = sg.root();
    let imports = ImportMap::from_root(&root);
    let scope = RuleScope::root();

    let mut facts = Vec::new();
    for node in named_children(&root) {
        if node.kind() == "class_declaration" {
            scan_class(&node, &scope, &imports, &target_path, &mut facts);
        }
    }
    facts
}

fn scan_class(
    class_node: &JavaNode,
    parent: &RuleScope,
    imports: &ImportMap,
    target_path: &Path,
    facts: &mut Vec<ExampleFact>,
) {
    let Some(body) = class_node.field("body") else {
        return;
    };
    let class_name = class_node
        .field("name")
        .map(|n| n.text().to_string())
        .unwrap_or_default();

    let members = named_children(&body);

    // Class-wide default recipe from the defaults declaration, if any
    let class_default = members
        .iter()
        .filter(|m| m.kind() == "method_declaration")
        .find(|m| is_defaults_method(m))
        .and_then(|m| find_rule(m, imports));
    let scope = parent.child(class_default);

    for member in &members {
        match &*member.kind() {
            "method_declaration" if !is_defaults_method(member) => {
                let Some(annotation) = doc_example_annotation(member) else {
                    continue;
                };
                let method_name = member
                    .field("name")
                    .map(|n| n.text().to_string())
                    .unwrap_or_default();
                let description =
                    annotation.unwrap_or_else(|| format!("{class_name}#{method_name}"));

                for node in subtree(member) {
                    if invocation_name(&node).as_deref() != Some(RUN_EXAMPLE_CALL) {
                        continue;
                    }
                    if let Some(collected) =
                        collect_example(&node, &scope, imports, &description)
                    {
                        facts.push(ExampleFact {
                            target_path: target_path.to_path_buf(),
                            rule_name: collected.rule.name,
                            example: collected.example,
                        });
                    }
                }
            }
            "class_declaration" => {
                scan_class(member, &scope, imports, target_path, facts);
            }
            _ => {}
        }
    }
}

/// Documentation marker on a test method.
///
/// `None` means the method is not tagged and contributes nothing;
/// `Some(None)` is the bare marker; `Some(Some(text))` carries an explicit
/// description.
fn doc_example_annotation(method: &JavaNode) -> Option<Option<String>> {
    for child in named_children(method) {
        if child.kind() != "modifiers" {
            continue;
        }
        for annotation in named_children(&child) {
            if !matches!(&*annotation.kind(), "marker_annotation" | "annotation") {
                continue;
            }
            let Some(name_node) = annotation.field("name") else {
                continue;
            };
            let name = name_node.text();
            if name != "DocumentExample" && !name.ends_with(".DocumentExample") {
                continue;
            }
            if annotation.kind() == "marker_annotation" {
                return Some(None);
            }
            let value = annotation.field("arguments").and_then(|args| {
                named_children(&args).iter().find_map(|arg| {
                    if arg.kind() == "element_value_pair" {
                        let is_value_key = arg.field("key").is_some_and(|k| k.text() == "value");
                        if is_value_key {
                            arg.field("value").and_then(|v| string_literal_value(&v))
                        } else {
                            None
                        }
                    } else {
                        string_literal_value(arg)
                    }
                })
            });
            return Some(value);
        }
    }
    None
}
