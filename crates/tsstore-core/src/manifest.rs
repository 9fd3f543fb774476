use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const COMPILER_PACKAGE_NAME: &str = "typescript";

const MANIFEST_PACKAGE_NAME: &str = "tsstore-typescript";
const MANIFEST_DESCRIPTION: &str = "Do not change. This package was generated by tsstore";

/// The `package.json` written into an installation directory before the
/// package manager runs. Field order is the serialized key order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub private: bool,
    pub license: String,
    pub dependencies: BTreeMap<String, String>,
}

impl DependencyManifest {
    pub fn for_compiler(version_tag: &str) -> Self {
        Self {
            name: MANIFEST_PACKAGE_NAME.to_string(),
            version: version_tag.to_string(),
            description: MANIFEST_DESCRIPTION.to_string(),
            private: true,
            license: "MIT".to_string(),
            dependencies: BTreeMap::from([(
                COMPILER_PACKAGE_NAME.to_string(),
                version_tag.to_string(),
            )]),
        }
    }

    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize dependency manifest")
    }
}
