use std::cmp::Ordering;

use anyhow::anyhow;
use semver::Version;

/// Version tags become directory names under the store root, so anything
/// that could escape the root is rejected.
pub fn validate_version_tag(tag: &str) -> anyhow::Result<()> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("version tag must not be empty"));
    }
    if trimmed != tag {
        return Err(anyhow!(
            "version tag must not have surrounding whitespace: '{tag}'"
        ));
    }
    if tag == "." || tag == ".." {
        return Err(anyhow!("version tag must not be a relative path: '{tag}'"));
    }
    if tag.chars().any(|ch| ch == '/' || ch == '\\' || ch.is_control()) {
        return Err(anyhow!(
            "version tag contains invalid character(s): '{tag}'"
        ));
    }
    Ok(())
}

/// Semver order when both tags parse; otherwise parsed versions sort first and
/// the rest fall back to lexical order.
pub fn compare_version_tags(left: &str, right: &str) -> Ordering {
    match (Version::parse(left), Version::parse(right)) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}
