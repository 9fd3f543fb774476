mod diagnostic;
mod manifest;
mod version;

pub use diagnostic::{Diagnostic, DiagnosticCategory};
pub use manifest::{DependencyManifest, COMPILER_PACKAGE_NAME};
pub use version::{compare_version_tags, validate_version_tag};

#[cfg(test)]
mod tests;
