//! AST-based example extraction using ast-grep
//!
//! This crate implements the scan phase of the examples extractor:
//! 1. Parsing recipe test sources with ast-grep's Java grammar
//! 2. Resolving the recipe configuration in scope at each run call
//!    (class-wide defaults, per-call inline overrides)
//! 3. Collecting before/after source pairs from recognized assertion
//!    factories
//! 4. Routing every mined example to its deterministic manifest path
//!
//! Extraction is best-effort throughout: unrecognized call shapes and
//! unresolvable contexts are skipped, never raised as errors.

pub mod collector;
pub mod context;
mod expr;
pub mod paths;
pub mod scanner;

pub use collector::{collect_example, CollectedExample, RUN_EXAMPLE_CALL};
pub use context::{find_rule, ImportMap, RuleScope};
pub use paths::{derive_target_path, is_manifest_path};
pub use scanner::{scan_source, ExampleFact, ScanStats, TestSourceScanner};
