//! Content generation port
//!
//! Defines the ContentGenerator trait that text providers implement.

use async_trait::async_trait;

use crate::analyzer::InsightRequest;
use crate::error::{Error, Result};
use crate::persona::Persona;
use crate::types::ContentPiece;

/// Text returned by a generator for one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContent {
    /// Blog title or newsletter subject line
    pub title: String,

    /// Markdown body
    pub body: String,
}

impl GeneratedContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Port for producing campaign text
///
/// Every failure is reported as a generation error; the orchestrator decides
/// whether to retry. The trait is object-safe for dynamic dispatch.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Generate the general blog post for a topic
    async fn generate_blog(&self, topic: &str) -> Result<GeneratedContent>;

    /// Generate a newsletter for one persona
    async fn generate_newsletter(&self, topic: &str, persona: &Persona) -> Result<GeneratedContent>;

    /// Generate an improved version of existing content using feedback
    async fn generate_variation(
        &self,
        original: &ContentPiece,
        feedback: &str,
    ) -> Result<GeneratedContent>;

    /// Write a qualitative insight from structured analyzer inputs
    async fn write_insight(&self, _request: &InsightRequest) -> Result<String> {
        Err(Error::generation(format!(
            "{} does not write insights",
            self.name()
        )))
    }
}
