//! Deterministic output-path derivation
//!
//! A test file's manifest target is fixed by its position in the source
//! tree: the last `src/test/<lang>` marker splits off the project root, and
//! the manifest lives at a fixed relative path below that root.

use std::path::{Component, Path, PathBuf};

use rex_manifest::EXAMPLES_RELATIVE_PATH;

/// Test-source-root segments recognized under `src/test`
const TEST_SOURCE_ROOTS: &[&str] = &["java", "kotlin", "groovy"];

fn is_segment(component: Component, expected: &str) -> bool {
    matches!(component, Component::Normal(os) if os.to_str() == Some(expected))
}

fn is_source_root(component: Component) -> bool {
    TEST_SOURCE_ROOTS
        .iter()
        .any(|root| is_segment(component, root))
}

/// Derive the manifest path for a test file, or `None` when the file is not
/// under a recognized test source root.
///
/// The last occurrence of the marker wins, so corpora nested inside test
/// fixtures resolve to the innermost project.
pub fn derive_target_path(test_file: &Path) -> Option<PathBuf> {
    let components: Vec<Component> = test_file.components().collect();

    let mut marker = None;
    for i in 0..components.len().saturating_sub(3) {
        if is_segment(components[i], "src")
            && is_segment(components[i + 1], "test")
            && is_source_root(components[i + 2])
        {
            marker = Some(i);
        }
    }

    let root: PathBuf = components[..marker?].iter().collect();
    Some(root.join(EXAMPLES_RELATIVE_PATH))
}

/// Whether a path is manifest-shaped, i.e. ends with the fixed relative
/// manifest location
pub fn is_manifest_path(path: &Path) -> bool {
    path.ends_with(EXAMPLES_RELATIVE_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_module_layout() {
        let derived = derive_target_path(Path::new(
            "/repo/my-module/src/test/java/com/acme/RemoveUnusedImportsTest.java",
        ));
        assert_eq!(
            derived,
            Some(PathBuf::from(
                "/repo/my-module/src/main/resources/META-INF/rewrite/examples.yml"
            ))
        );
    }

    #[test]
    fn test_kotlin_source_root() {
        let derived =
            derive_target_path(Path::new("/repo/mod/src/test/kotlin/com/acme/ATest.kt"));
        assert_eq!(
            derived,
            Some(PathBuf::from(
                "/repo/mod/src/main/resources/META-INF/rewrite/examples.yml"
            ))
        );
    }

    #[test]
    fn test_last_marker_occurrence_wins() {
        let derived = derive_target_path(Path::new(
            "/repo/src/test/java/fixtures/src/test/java/ATest.java",
        ));
        assert_eq!(
            derived,
            Some(PathBuf::from(
                "/repo/src/test/java/fixtures/src/main/resources/META-INF/rewrite/examples.yml"
            ))
        );
    }

    #[test]
    fn test_non_test_path_has_no_target() {
        assert_eq!(
            derive_target_path(Path::new("/repo/mod/src/main/java/A.java")),
            None
        );
        assert_eq!(derive_target_path(Path::new("/repo/src/test/java")), None);
    }

    #[test]
    fn test_relative_paths_supported() {
        let derived = derive_target_path(Path::new("mod/src/test/java/ATest.java"));
        assert_eq!(
            derived,
            Some(PathBuf::from(
                "mod/src/main/resources/META-INF/rewrite/examples.yml"
            ))
        );
    }

    #[test]
    fn test_manifest_path_detection() {
        assert!(is_manifest_path(Path::new(
            "/repo/mod/src/main/resources/META-INF/rewrite/examples.yml"
        )));
        assert!(!is_manifest_path(Path::new(
            "/repo/mod/src/main/resources/other.yml"
        )));
    }
}
