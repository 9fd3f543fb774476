use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Error,
    Warning,
}

impl DiagnosticCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A user-facing report: a severity plus one or more message lines. The
/// first line is the summary, the rest explain the cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub text: Vec<String>,
}

impl Diagnostic {
    pub fn error<I, S>(text: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category: DiagnosticCategory::Error,
            text: text.into_iter().map(Into::into).collect(),
        }
    }

    pub fn warning<I, S>(text: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category: DiagnosticCategory::Warning,
            text: text.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds an error diagnostic from `message` followed by every cause in
    /// the error chain, outermost first.
    pub fn from_error(message: impl Into<String>, error: &anyhow::Error) -> Self {
        let mut text = vec![message.into()];
        text.extend(error.chain().map(|cause| cause.to_string()));
        Self {
            category: DiagnosticCategory::Error,
            text,
        }
    }

    pub fn summary(&self) -> &str {
        self.text.first().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category.as_str(), self.text.join(" "))
    }
}
