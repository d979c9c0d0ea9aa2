//! Synthesize/merge engine for example manifests
//!
//! Planning is a pure read of the scan result: every accumulated target is
//! rendered to its intended full text and compared against what is on disk.
//! Applying then performs the writes. New-document creation and
//! existing-document merge are mutually exclusive by construction, one
//! branch per target path.
//!
//! All failures are local to one target: a render, parse, or IO problem
//! yields a diagnostic and leaves that file untouched, never aborting the
//! run.

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::accumulator::{ExampleSet, TargetExamples};
use crate::errors::ManifestError;
use crate::render;

/// A single pending manifest write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteAction {
    /// Brand-new manifest at a path with no document on disk
    Create { path: PathBuf, content: String },
    /// Replacement of an existing manifest whose text would change
    Update { path: PathBuf, content: String },
}

impl WriteAction {
    pub fn path(&self) -> &Path {
        match self {
            WriteAction::Create { path, .. } | WriteAction::Update { path, .. } => path,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            WriteAction::Create { content, .. } | WriteAction::Update { content, .. } => content,
        }
    }
}

/// A per-target failure that left the original document unmodified
#[derive(Debug, Clone)]
pub struct SyncDiagnostic {
    pub path: PathBuf,
    pub message: String,
}

/// Result of the planning pass
#[derive(Debug, Default)]
pub struct SyncPlan {
    pub actions: Vec<WriteAction>,
    pub unchanged: usize,
    pub diagnostics: Vec<SyncDiagnostic>,
}

impl SyncPlan {
    /// Whether applying this plan would touch any file
    pub fn has_changes(&self) -> bool {
        !self.actions.is_empty()
    }
}

/// Result of a full synchronize pass
#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub created: Vec<PathBuf>,
    pub updated: Vec<PathBuf>,
    pub unchanged: usize,
    pub diagnostics: Vec<SyncDiagnostic>,
}

enum TargetDecision {
    Write(WriteAction),
    Unchanged,
    Failed(SyncDiagnostic),
    Skip,
}

/// Plan the writes for a finished scan.
///
/// Targets are independent, so planning runs them in parallel; the resulting
/// action list keeps the accumulator's first-seen target order.
pub fn plan(examples: &ExampleSet) -> SyncPlan {
    let decisions: Vec<TargetDecision> = examples
        .targets()
        .par_iter()
        .map(|target| plan_target(examples, target))
        .collect();

    let mut plan = SyncPlan::default();
    for decision in decisions {
        match decision {
            TargetDecision::Write(action) => plan.actions.push(action),
            TargetDecision::Unchanged => plan.unchanged += 1,
            TargetDecision::Failed(diagnostic) => plan.diagnostics.push(diagnostic),
            TargetDecision::Skip => {}
        }
    }
    plan
}

fn plan_target(examples: &ExampleSet, target: &TargetExamples) -> TargetDecision {
    if target.recipes.is_empty() {
        return TargetDecision::Skip;
    }

    let mut docs: BTreeMap<String, render::ManifestDoc> = BTreeMap::new();

    if examples.is_existing_manifest(&target.path) {
        // Merge: start from what the document already holds so that blocks
        // for recipes outside the scanned corpus survive the rewrite.
        let current = match fs::read_to_string(&target.path) {
            Ok(current) => current,
            Err(e) => {
                return TargetDecision::Failed(SyncDiagnostic {
                    path: target.path.clone(),
                    message: format!("failed to read existing manifest: {e}"),
                });
            }
        };
        match render::parse_docs(&current) {
            Ok(existing_docs) => {
                for doc in existing_docs {
                    docs.insert(doc.recipe_name.clone(), doc);
                }
            }
            Err(e) => {
                return TargetDecision::Failed(SyncDiagnostic {
                    path: target.path.clone(),
                    message: format!("existing manifest is not parseable, leaving as-is: {e}"),
                });
            }
        }
        for (recipe, recipe_examples) in &target.recipes {
            docs.insert(
                recipe.clone(),
                render::doc_from_examples(recipe, recipe_examples),
            );
        }
        match render_and_check(examples.license_header(), &docs, &target.path) {
            Ok(content) => {
                if content == current {
                    debug!("Manifest unchanged: {:?}", target.path);
                    TargetDecision::Unchanged
                } else {
                    TargetDecision::Write(WriteAction::Update {
                        path: target.path.clone(),
                        content,
                    })
                }
            }
            Err(diagnostic) => TargetDecision::Failed(diagnostic),
        }
    } else {
        for (recipe, recipe_examples) in &target.recipes {
            docs.insert(
                recipe.clone(),
                render::doc_from_examples(recipe, recipe_examples),
            );
        }
        match render_and_check(examples.license_header(), &docs, &target.path) {
            Ok(content) => TargetDecision::Write(WriteAction::Create {
                path: target.path.clone(),
                content,
            }),
            Err(diagnostic) => TargetDecision::Failed(diagnostic),
        }
    }
}

/// Render the intended content and gate it through a re-parse. A manifest
/// that does not survive its own parse is never written.
fn render_and_check(
    license: Option<&str>,
    docs: &BTreeMap<String, render::ManifestDoc>,
    path: &Path,
) -> Result<String, SyncDiagnostic> {
    let content = render::render_docs(license, docs).map_err(|e| SyncDiagnostic {
        path: path.to_path_buf(),
        message: format!("failed to render manifest: {e}"),
    })?;
    render::validate(&content).map_err(|e| SyncDiagnostic {
        path: path.to_path_buf(),
        message: format!("rendered manifest failed re-parse, leaving original: {e}"),
    })?;
    Ok(content)
}

/// Apply a plan, writing each manifest atomically.
///
/// A write failure degrades to a diagnostic for that one target.
pub fn apply(plan: SyncPlan) -> SyncOutcome {
    let mut outcome = SyncOutcome {
        unchanged: plan.unchanged,
        diagnostics: plan.diagnostics,
        ..Default::default()
    };

    for action in plan.actions {
        match write_atomic(action.path(), action.content()) {
            Ok(()) => match action {
                WriteAction::Create { path, .. } => {
                    info!("Created manifest: {:?}", path);
                    outcome.created.push(path);
                }
                WriteAction::Update { path, .. } => {
                    info!("Updated manifest: {:?}", path);
                    outcome.updated.push(path);
                }
            },
            Err(e) => outcome.diagnostics.push(SyncDiagnostic {
                path: action.path().to_path_buf(),
                message: format!("failed to write manifest: {e}"),
            }),
        }
    }

    outcome
}

/// Plan and apply in one pass
pub fn synchronize(examples: &ExampleSet) -> SyncOutcome {
    apply(plan(examples))
}

/// Atomic write: temp file in the target directory, then rename
fn write_atomic(path: &Path, content: &str) -> Result<(), ManifestError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("yml.tmp");
    {
        let file = fs::File::create(&temp_path)?;
        let mut writer = std::io::BufWriter::with_capacity(64 * 1024, file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}
