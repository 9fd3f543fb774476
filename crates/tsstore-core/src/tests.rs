use std::cmp::Ordering;

use anyhow::{anyhow, Context};

use super::*;

#[test]
fn manifest_pins_compiler_dependency() {
    let manifest = DependencyManifest::for_compiler("5.4.2");
    assert_eq!(manifest.version, "5.4.2");
    assert!(manifest.private);
    assert_eq!(
        manifest.dependencies.get(COMPILER_PACKAGE_NAME).map(String::as_str),
        Some("5.4.2")
    );
}

#[test]
fn manifest_json_keeps_package_json_key_order() {
    let json = DependencyManifest::for_compiler("5.4.2")
        .to_json_pretty()
        .expect("must serialize");

    let positions = [
        "\"name\"",
        "\"version\"",
        "\"description\"",
        "\"private\"",
        "\"license\"",
        "\"dependencies\"",
    ]
    .map(|key| json.find(key).expect("key must be present"));
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(json.contains("\n  \"private\": true,"));
    assert!(json.contains("\"typescript\": \"5.4.2\""));
}

#[test]
fn manifest_json_parses_back_as_plain_json() {
    let json = DependencyManifest::for_compiler("5.6.0-beta")
        .to_json_pretty()
        .expect("must serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("must be valid json");
    assert_eq!(value["dependencies"]["typescript"], "5.6.0-beta");
    assert_eq!(value["name"], "tsstore-typescript");
}

#[test]
fn diagnostic_from_error_lists_cause_chain() {
    let error = Err::<(), _>(anyhow!("process exited with code 1"))
        .context("failed to run package manager")
        .expect_err("must fail");

    let diagnostic = Diagnostic::from_error("Failed to install 'typescript@5.4.2'.", &error);
    assert_eq!(diagnostic.category, DiagnosticCategory::Error);
    assert_eq!(
        diagnostic.text,
        vec![
            "Failed to install 'typescript@5.4.2'.",
            "failed to run package manager",
            "process exited with code 1",
        ]
    );
    assert_eq!(diagnostic.summary(), "Failed to install 'typescript@5.4.2'.");
}

#[test]
fn diagnostic_display_includes_category() {
    let diagnostic = Diagnostic::warning(["lock cleared", "it was stale"]);
    assert_eq!(diagnostic.to_string(), "warning: lock cleared it was stale");
}

#[test]
fn validate_version_tag_accepts_release_and_prerelease_tags() {
    for tag in ["5.4.2", "5.6.0-beta", "5.7.0-dev.20241010", "next"] {
        validate_version_tag(tag).expect("tag must be accepted");
    }
}

#[test]
fn validate_version_tag_rejects_path_like_tags() {
    for tag in ["", " 5.4.2", ".", "..", "../5.4.2", "5.4/2", "5.4\\2"] {
        assert!(
            validate_version_tag(tag).is_err(),
            "tag '{tag}' must be rejected"
        );
    }
}

#[test]
fn compare_version_tags_uses_semver_order() {
    assert_eq!(compare_version_tags("5.10.0", "5.9.3"), Ordering::Greater);
    assert_eq!(compare_version_tags("5.4.0-beta", "5.4.0"), Ordering::Less);
    assert_eq!(compare_version_tags("5.4.2", "next"), Ordering::Less);
    assert_eq!(compare_version_tags("latest", "next"), Ordering::Less);
}
