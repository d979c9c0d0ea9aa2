//! Rex Example Manifest Management
//!
//! This crate holds the data model and the mutate phase of the examples
//! extractor: the run-scoped accumulator filled during the scan, the
//! deterministic YAML renderer, and the synthesize/merge engine that creates
//! new `examples.yml` manifests or rewrites existing ones in place.
//!
//! Manifests are multi-document YAML files, one document per recipe, mapping
//! the recipe to the documentation examples mined from its tests.

pub mod accumulator;
pub mod errors;
pub mod render;
pub mod sync;
pub mod types;

pub use accumulator::{Accumulator, ExampleSet, TargetExamples};
pub use errors::ManifestError;
pub use render::{
    doc_from_examples, parse_docs, render_docs, render_license_preamble, validate, ManifestDoc,
};
pub use sync::{
    apply, plan, synchronize, SyncDiagnostic, SyncOutcome, SyncPlan, WriteAction,
};
pub use types::{
    ExampleSource, RecipeExample, RuleIdentity, EXAMPLES_FILE_NAME, EXAMPLES_RELATIVE_PATH,
    EXAMPLE_TYPE, LICENSE_HEADER_FILE_NAME, LICENSE_YEAR, YEAR_TOKEN,
};
