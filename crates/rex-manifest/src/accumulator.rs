//! Run-scoped accumulator filled during the scan phase
//!
//! The accumulator is the only shared mutable state of a run. Independent
//! files may be scanned in parallel; appends serialize through the interior
//! lock. Once the scan finishes the accumulator is consumed into a read-only
//! [`ExampleSet`], so the synthesize/merge phase can never interleave reads
//! with writes of the same document set.

use ahash::{AHashMap, AHashSet};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::types::RecipeExample;

/// Examples accumulated for a single output manifest path.
///
/// Recipes are kept in a `BTreeMap` so that new-document synthesis iterates
/// them in sorted order.
#[derive(Debug, Clone, Default)]
pub struct TargetExamples {
    pub path: PathBuf,
    pub recipes: BTreeMap<String, Vec<RecipeExample>>,
}

#[derive(Debug, Default)]
struct AccumulatorState {
    /// Targets in first-seen order
    targets: Vec<TargetExamples>,
    /// Runtime index for O(1) target lookup
    target_index: AHashMap<PathBuf, usize>,
    /// Manifest-shaped files observed on disk
    existing_manifests: AHashSet<PathBuf>,
    /// License header text, first-seen wins
    license_header: Option<String>,
}

/// Shared write-side store for the scan phase
#[derive(Debug, Default)]
pub struct Accumulator {
    inner: RwLock<AccumulatorState>,
}

impl Accumulator {
    pub fn new() -> Self {
        Accumulator::default()
    }

    /// Append an example under `(path, recipe)`, creating intermediate
    /// entries on first use
    pub fn record(&self, path: &Path, recipe: &str, example: RecipeExample) {
        let mut state = self.inner.write();
        let idx = match state.target_index.get(path) {
            Some(&idx) => idx,
            None => {
                let idx = state.targets.len();
                state.targets.push(TargetExamples {
                    path: path.to_path_buf(),
                    recipes: BTreeMap::new(),
                });
                state.target_index.insert(path.to_path_buf(), idx);
                idx
            }
        };
        state.targets[idx]
            .recipes
            .entry(recipe.to_string())
            .or_default()
            .push(example);
    }

    /// Track a manifest file already present on disk
    pub fn record_existing_manifest(&self, path: &Path) {
        let mut state = self.inner.write();
        state.existing_manifests.insert(path.to_path_buf());
    }

    /// Record the license header text. The first one discovered wins; later
    /// candidates are ignored. Returns whether the text was kept.
    pub fn record_license_header(&self, text: &str) -> bool {
        let mut state = self.inner.write();
        if state.license_header.is_some() {
            debug!("Ignoring additional license header candidate");
            return false;
        }
        state.license_header = Some(text.to_string());
        true
    }

    /// Whether a license header has already been captured
    pub fn has_license_header(&self) -> bool {
        self.inner.read().license_header.is_some()
    }

    /// Number of examples recorded so far, across all targets
    pub fn example_count(&self) -> usize {
        let state = self.inner.read();
        state
            .targets
            .iter()
            .flat_map(|t| t.recipes.values())
            .map(Vec::len)
            .sum()
    }

    /// Finish the scan phase, consuming the accumulator into its read-only
    /// counterpart
    pub fn into_examples(self) -> ExampleSet {
        let state = self.inner.into_inner();
        ExampleSet {
            targets: state.targets,
            existing_manifests: state.existing_manifests,
            license_header: state.license_header,
        }
    }
}

/// Read-only scan result consumed by the synthesize/merge phase
#[derive(Debug, Default)]
pub struct ExampleSet {
    targets: Vec<TargetExamples>,
    existing_manifests: AHashSet<PathBuf>,
    license_header: Option<String>,
}

impl ExampleSet {
    /// Accumulated targets in first-seen order
    pub fn targets(&self) -> &[TargetExamples] {
        &self.targets
    }

    /// Whether a manifest already existed on disk at this path when scanned
    pub fn is_existing_manifest(&self, path: &Path) -> bool {
        self.existing_manifests.contains(path)
    }

    pub fn license_header(&self) -> Option<&str> {
        self.license_header.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExampleSource;

    fn example(description: &str) -> RecipeExample {
        RecipeExample {
            description: description.to_string(),
            sources: vec![ExampleSource {
                before: Some("class A {}".to_string()),
                language: Some("java".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_record_creates_intermediate_entries() {
        let acc = Accumulator::new();
        acc.record(
            Path::new("/repo/module/examples.yml"),
            "org.example.First",
            example("one"),
        );
        acc.record(
            Path::new("/repo/module/examples.yml"),
            "org.example.First",
            example("two"),
        );

        let set = acc.into_examples();
        assert_eq!(set.targets().len(), 1);
        let recipes = &set.targets()[0].recipes;
        assert_eq!(recipes["org.example.First"].len(), 2);
    }

    #[test]
    fn test_targets_keep_first_seen_order() {
        let acc = Accumulator::new();
        acc.record(Path::new("/b/examples.yml"), "org.example.B", example("b"));
        acc.record(Path::new("/a/examples.yml"), "org.example.A", example("a"));
        acc.record(Path::new("/b/examples.yml"), "org.example.C", example("c"));

        let set = acc.into_examples();
        let paths: Vec<_> = set.targets().iter().map(|t| t.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/b/examples.yml"),
                PathBuf::from("/a/examples.yml")
            ]
        );
    }

    #[test]
    fn test_recipes_iterate_sorted() {
        let acc = Accumulator::new();
        let path = Path::new("/repo/examples.yml");
        acc.record(path, "org.example.Zeta", example("z"));
        acc.record(path, "org.example.Alpha", example("a"));

        let set = acc.into_examples();
        let names: Vec<_> = set.targets()[0].recipes.keys().cloned().collect();
        assert_eq!(names, vec!["org.example.Alpha", "org.example.Zeta"]);
    }

    #[test]
    fn test_license_header_first_seen_wins() {
        let acc = Accumulator::new();
        assert!(acc.record_license_header("Copyright ${year} First"));
        assert!(!acc.record_license_header("Copyright ${year} Second"));

        let set = acc.into_examples();
        assert_eq!(set.license_header(), Some("Copyright ${year} First"));
    }

    #[test]
    fn test_existing_manifest_tracking() {
        let acc = Accumulator::new();
        acc.record_existing_manifest(Path::new("/repo/examples.yml"));

        let set = acc.into_examples();
        assert!(set.is_existing_manifest(Path::new("/repo/examples.yml")));
        assert!(!set.is_existing_manifest(Path::new("/other/examples.yml")));
    }
}
