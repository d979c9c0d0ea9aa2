//! Example collection from run-example calls
//!
//! A `rewriteRun(..)` call comes in two overload shapes: with or without a
//! leading configuration lambda. Trailing arguments are examined only when
//! they are calls to a recognized source-assertion factory; everything else
//! is skipped, best-effort.

use tracing::debug;

use rex_manifest::{ExampleSource, RecipeExample, RuleIdentity};

use crate::context::{find_rule, ImportMap, RuleScope};
use crate::expr::{
    argument_nodes, invocation_name, is_lambda, lambda_param_count, string_literal_value, subtree,
    JavaNode,
};

/// The run-example call every extraction anchors on
pub const RUN_EXAMPLE_CALL: &str = "rewriteRun";

/// Per-language source-assertion factories; the factory name doubles as the
/// language tag
const SOURCE_FACTORIES: &[&str] = &[
    "java", "kotlin", "groovy", "text", "xml", "yaml", "json", "properties", "hcl", "proto",
    "python", "sql", "toml", "csharp", "javascript", "typescript",
];

/// One extracted example together with the recipe identity it belongs to
#[derive(Debug, Clone)]
pub struct CollectedExample {
    pub rule: RuleIdentity,
    pub example: RecipeExample,
}

/// Extract an example from one `rewriteRun(..)` invocation.
///
/// Returns `None` when no recipe context resolves (expected for parser-only
/// tests) or when every source is empty after filtering.
pub fn collect_example(
    call: &JavaNode,
    scope: &RuleScope,
    imports: &ImportMap,
    description: &str,
) -> Option<CollectedExample> {
    let args = argument_nodes(call);
    if args.is_empty() {
        return None;
    }

    // Overload with a leading configuration lambda: resolve the inline
    // recipe and start source extraction at the next argument
    let (inline, source_start) = if is_lambda(&args[0]) {
        (find_rule(&args[0], imports), 1)
    } else {
        (None, 0)
    };

    let rule = scope.resolve_with(inline)?;
    if !rule.is_valid() {
        return None;
    }

    let sources: Vec<ExampleSource> = args[source_start..]
        .iter()
        .filter_map(extract_source)
        .collect();

    let mut example = RecipeExample {
        description: description.to_string(),
        parameters: rule.parameters.clone(),
        sources,
    };
    example.normalize_sources();
    if example.sources.is_empty() {
        debug!("Dropping example without any non-empty source");
        return None;
    }

    Some(CollectedExample { rule, example })
}

/// Extract one before/after source from a factory-call argument.
///
/// Argument 0 is before (string literal only), argument 1 is after when it
/// is a string literal, and a later single-parameter lambda may override the
/// output path.
fn extract_source(arg: &JavaNode) -> Option<ExampleSource> {
    let name = invocation_name(arg)?;

    let (language, fixed_path) = match name.as_str() {
        "buildGradle" => ("groovy".to_string(), Some("build.gradle".to_string())),
        "pomXml" => ("xml".to_string(), Some("pom.xml".to_string())),
        factory if SOURCE_FACTORIES.contains(&factory) => (name.clone(), None),
        _ => return None,
    };

    let factory_args = argument_nodes(arg);
    let before = factory_args.first().and_then(string_literal_value);
    let after = factory_args.get(1).and_then(string_literal_value);
    let path = fixed_path.or_else(|| find_path_override(&factory_args));

    let source = ExampleSource {
        before,
        after,
        path,
        language: Some(language),
    };
    if source.has_content() {
        Some(source)
    } else {
        None
    }
}

/// A trailing single-parameter lambda may carry one recognized
/// `path("...")` call overriding the output path for this source
fn find_path_override(factory_args: &[JavaNode]) -> Option<String> {
    for arg in factory_args {
        if !is_lambda(arg) || lambda_param_count(arg) != 1 {
            continue;
        }
        for node in subtree(arg) {
            if invocation_name(&node).as_deref() != Some("path") {
                continue;
            }
            if let Some(path) = argument_nodes(&node).first().and_then(string_literal_value) {
                return Some(path);
            }
        }
    }
    None
}
