//! Scoped recipe-configuration resolution
//!
//! A test class may set a class-wide default recipe in its `defaults`
//! declaration; any run call may override it with an inline configuration
//! lambda. Scope is modeled as an explicit frame chain passed down the class
//! recursion, never as ambient mutable state, so nested classes inherit the
//! enclosing default and an inner `defaults` shadows it for its own subtree.

use std::collections::HashMap;
use tracing::debug;

use rex_manifest::RuleIdentity;

use crate::expr::{
    argument_nodes, invocation_name, named_children, string_literal_value, subtree, Expr, JavaNode,
};

/// Single-type imports of one source file, used to qualify simple recipe
/// type names
#[derive(Debug, Default)]
pub struct ImportMap {
    types: HashMap<String, String>,
    wildcards: Vec<String>,
}

impl ImportMap {
    /// Collect `import` declarations from a parsed file
    pub fn from_root(root: &JavaNode) -> Self {
        let mut map = ImportMap::default();
        for node in subtree(root) {
            if node.kind() != "import_declaration" {
                continue;
            }
            let text = node.text();
            let spec = text
                .trim_start_matches("import")
                .trim_start()
                .trim_start_matches("static")
                .trim()
                .trim_end_matches(';')
                .trim();
            if let Some(package) = spec.strip_suffix(".*") {
                map.wildcards.push(package.to_string());
            } else if let Some((_, simple)) = spec.rsplit_once('.') {
                map.types.insert(simple.to_string(), spec.to_string());
            }
        }
        map
    }

    /// Resolve a simple type name to its qualified form, best-effort.
    ///
    /// Already-qualified names pass through; a simple name with no matching
    /// import resolves through a sole wildcard import, or stays as-is.
    pub fn qualify(&self, name: &str) -> String {
        if name.contains('.') {
            return name.to_string();
        }
        if let Some(qualified) = self.types.get(name) {
            return qualified.clone();
        }
        if let [package] = self.wildcards.as_slice() {
            return format!("{package}.{name}");
        }
        debug!("Unresolvable simple type name: {}", name);
        name.to_string()
    }
}

/// One frame of resolved recipe configuration, linked to its enclosing frame
#[derive(Debug, Default)]
pub struct RuleScope<'p> {
    default: Option<RuleIdentity>,
    parent: Option<&'p RuleScope<'p>>,
}

impl<'p> RuleScope<'p> {
    pub fn root() -> Self {
        RuleScope::default()
    }

    /// Child frame carrying a class-wide default (or none, inheriting)
    pub fn child(&'p self, default: Option<RuleIdentity>) -> RuleScope<'p> {
        RuleScope {
            default,
            parent: Some(self),
        }
    }

    /// Nearest configured recipe identity, walking outward through enclosing
    /// frames
    pub fn resolve(&self) -> Option<&RuleIdentity> {
        match &self.default {
            Some(identity) => Some(identity),
            None => self.parent.and_then(RuleScope::resolve),
        }
    }

    /// Apply a per-call inline override on top of this scope
    pub fn resolve_with(&self, inline: Option<RuleIdentity>) -> Option<RuleIdentity> {
        inline.or_else(|| self.resolve().cloned())
    }
}

/// Recognized "activate recipe by name" APIs: the trailing string-literal
/// argument is the qualified recipe name
const ACTIVATE_BY_NAME: &[&str] = &["activateRecipes", "recipeFromResource", "recipeFromResources"];

/// Resolve the recipe identity configured in a subtree (a `defaults` method
/// body or an inline configuration lambda).
///
/// Two shapes are recognized: a constructor for the recipe under test inside
/// a `recipe(..)` call, capturing the qualified type name and its argument
/// texts; or an activate-by-name call, capturing the name only. Returns
/// `None` when the subtree configures nothing recognizable, which is not an
/// error (parser-only tests do this).
pub fn find_rule(node: &JavaNode, imports: &ImportMap) -> Option<RuleIdentity> {
    for candidate in subtree(node) {
        let Some(name) = invocation_name(&candidate) else {
            continue;
        };
        if name == "recipe" {
            if let Some(identity) = rule_from_recipe_call(&candidate, imports) {
                return Some(identity);
            }
        } else if ACTIVATE_BY_NAME.contains(&name.as_str()) {
            if let Some(identity) = rule_from_trailing_name(&candidate) {
                return Some(identity);
            }
        }
    }
    None
}

/// Constructor shape inside `recipe(..)`: the first constructor expression
/// in argument position names the recipe type
fn rule_from_recipe_call(call: &JavaNode, imports: &ImportMap) -> Option<RuleIdentity> {
    for arg in argument_nodes(call) {
        for node in subtree(&arg) {
            if node.kind() != "object_creation_expression" {
                continue;
            }
            let Some(type_name) = constructor_type_name(&node) else {
                continue;
            };
            let parameters = argument_nodes(&node)
                .iter()
                .map(|a| Expr::from_node(a).render())
                .collect();
            return Some(RuleIdentity {
                name: imports.qualify(&type_name),
                parameters,
            });
        }
    }
    None
}

fn constructor_type_name(node: &JavaNode) -> Option<String> {
    let type_node = node.field("type")?;
    let text = type_node.text();
    // Generic constructions like `new ChangeType<>(..)` keep the raw type
    let name = text.split('<').next().unwrap_or(&text).trim().to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Activate-by-name shape: the trailing string literal is the recipe name,
/// with no captured parameters
fn rule_from_trailing_name(call: &JavaNode) -> Option<RuleIdentity> {
    let args = argument_nodes(call);
    let name = args.iter().rev().find_map(string_literal_value)?;
    if name.is_empty() {
        return None;
    }
    Some(RuleIdentity::named(name))
}

/// Whether a method declaration is the class-wide `defaults` configuration
pub fn is_defaults_method(method: &JavaNode) -> bool {
    let name_matches = method
        .field("name")
        .is_some_and(|n| n.text() == "defaults");
    if !name_matches {
        return false;
    }
    method.field("parameters").is_some_and(|params| {
        named_children(&params)
            .iter()
            .any(|p| p.text().contains("RecipeSpec"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast_grep_core::AstGrep;
    use ast_grep_language::Java;

    fn parse(source: &str) -> AstGrep<ast_grep_core::source::StrDoc<Java>> {
        AstGrep::new(source, Java)
    }

    #[test]
    fn test_import_map_qualifies_simple_names() {
        let sg = parse(
            "import org.openrewrite.java.RemoveUnusedImports;\nimport org.openrewrite.test.RewriteTest;\nclass T {}",
        );
        let root = sg.root();
        let imports = ImportMap::from_root(&root);

        assert_eq!(
            imports.qualify("RemoveUnusedImports"),
            "org.openrewrite.java.RemoveUnusedImports"
        );
        assert_eq!(imports.qualify("Unknown"), "Unknown");
        assert_eq!(imports.qualify("com.acme.Explicit"), "com.acme.Explicit");
    }

    #[test]
    fn test_import_map_single_wildcard_fallback() {
        let sg = parse("import org.openrewrite.staticanalysis.*;\nclass T {}");
        let root = sg.root();
        let imports = ImportMap::from_root(&root);

        assert_eq!(
            imports.qualify("RemoveUnusedLocalVariables"),
            "org.openrewrite.staticanalysis.RemoveUnusedLocalVariables"
        );
    }

    #[test]
    fn test_find_rule_from_constructor() {
        let source = r#"
import org.openrewrite.java.OrderImports;
class T {
    void defaults(RecipeSpec spec) {
        spec.recipe(new OrderImports(false));
    }
}
"#;
        let sg = parse(source);
        let root = sg.root();
        let imports = ImportMap::from_root(&root);
        let rule = find_rule(&root, &imports).unwrap();

        assert_eq!(rule.name, "org.openrewrite.java.OrderImports");
        assert_eq!(rule.parameters.as_slice(), ["false"]);
    }

    #[test]
    fn test_find_rule_null_and_string_parameters() {
        let source = r#"
import com.acme.ChangeField;
class T {
    void defaults(RecipeSpec spec) {
        spec.recipe(new ChangeField("oldName", null));
    }
}
"#;
        let sg = parse(source);
        let root = sg.root();
        let imports = ImportMap::from_root(&root);
        let rule = find_rule(&root, &imports).unwrap();

        assert_eq!(rule.parameters.as_slice(), ["oldName", "null"]);
    }

    #[test]
    fn test_find_rule_by_activation_name() {
        let source = r#"
class T {
    void defaults(RecipeSpec spec) {
        spec.recipe(Environment.builder()
            .scanRuntimeClasspath()
            .build()
            .activateRecipes("org.openrewrite.java.format.AutoFormat"));
    }
}
"#;
        let sg = parse(source);
        let root = sg.root();
        let imports = ImportMap::from_root(&root);
        let rule = find_rule(&root, &imports).unwrap();

        assert_eq!(rule.name, "org.openrewrite.java.format.AutoFormat");
        assert!(rule.parameters.is_empty());
    }

    #[test]
    fn test_find_rule_from_resource() {
        let source = r#"
class T {
    void defaults(RecipeSpec spec) {
        spec.recipeFromResource("/META-INF/rewrite/static-analysis.yml", "org.openrewrite.staticanalysis.CodeCleanup");
    }
}
"#;
        let sg = parse(source);
        let root = sg.root();
        let imports = ImportMap::from_root(&root);
        let rule = find_rule(&root, &imports).unwrap();

        assert_eq!(rule.name, "org.openrewrite.staticanalysis.CodeCleanup");
    }

    #[test]
    fn test_no_recognizable_configuration_is_none() {
        let source = "class T { void defaults(RecipeSpec spec) { spec.parser(JavaParser.fromJavaVersion()); } }";
        let sg = parse(source);
        let root = sg.root();
        let imports = ImportMap::from_root(&root);
        assert!(find_rule(&root, &imports).is_none());
    }

    #[test]
    fn test_scope_inline_overrides_class_default() {
        let root_scope = RuleScope::root();
        let class_scope = root_scope.child(Some(RuleIdentity::named("org.example.ClassDefault")));

        let resolved = class_scope.resolve_with(Some(RuleIdentity::named("org.example.Inline")));
        assert_eq!(resolved.unwrap().name, "org.example.Inline");

        let fallback = class_scope.resolve_with(None);
        assert_eq!(fallback.unwrap().name, "org.example.ClassDefault");
    }

    #[test]
    fn test_nested_scope_inherits_and_shadows() {
        let root_scope = RuleScope::root();
        let outer = root_scope.child(Some(RuleIdentity::named("org.example.Outer")));
        let inherits = outer.child(None);
        assert_eq!(inherits.resolve().unwrap().name, "org.example.Outer");

        let shadows = outer.child(Some(RuleIdentity::named("org.example.Inner")));
        assert_eq!(shadows.resolve().unwrap().name, "org.example.Inner");
    }
}
