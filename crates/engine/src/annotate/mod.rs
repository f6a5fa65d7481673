//! Annotator trait definition and shared error types.
//!
//! An annotator turns a detected issue into a human-readable explanation.
//! Annotation is optional enrichment: the report builder falls back to
//! [`fallback_explanation`] whenever an annotator fails or times out.

pub mod llm;
pub mod templating;

pub use llm::LlmAnnotator;
pub use templating::fallback_explanation;

use std::time::Duration;

use guardian_core::Issue;

/// Errors that can occur while producing an explanation.
#[derive(Debug, thiserror::Error)]
pub enum AnnotateError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("annotator not configured: {0}")]
    NotConfigured(String),

    #[error("no explanation within {0:?}")]
    Timeout(Duration),
}

/// Trait for issue explanation backends.
#[async_trait::async_trait]
pub trait Annotator: Send + Sync {
    /// Explain a single issue. May fail; callers recover locally.
    async fn explain(&self, issue: &Issue) -> Result<String, AnnotateError>;

    /// Short name recorded as the explanation source (e.g. "template", "llm").
    fn name(&self) -> &str;
}

/// Default annotator: the templated explanation derived from kind and evidence.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateAnnotator;

#[async_trait::async_trait]
impl Annotator for TemplateAnnotator {
    async fn explain(&self, issue: &Issue) -> Result<String, AnnotateError> {
        Ok(fallback_explanation(issue))
    }

    fn name(&self) -> &str {
        "template"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_core::{Evidence, IssueKind, Severity};

    #[tokio::test]
    async fn template_annotator_never_fails() {
        let issue = Issue::new(
            "m",
            "Orders",
            IssueKind::NullOrZero,
            Severity::Major,
            "Orders latest value is missing",
            Evidence::at(3, None),
        );
        let text = TemplateAnnotator.explain(&issue).await.unwrap();
        assert!(text.starts_with("Orders"));
        assert_eq!(TemplateAnnotator.name(), "template");
    }
}
