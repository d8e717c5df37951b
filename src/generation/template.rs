//! Offline template generator
//!
//! Produces deterministic campaign text without any network access. Used when
//! no API key is configured, and in tests through its failure knobs.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::analyzer::InsightRequest;
use crate::error::{Error, Result};
use crate::persona::Persona;
use crate::types::ContentPiece;

use super::{ContentGenerator, GeneratedContent};

// ─────────────────────────────────────────────────────────────────
// Template Generator Configuration
// ─────────────────────────────────────────────────────────────────

/// Failure injection and fixed responses
#[derive(Debug, Clone, Default)]
pub struct TemplateConfig {
    /// Fail blog requests
    pub fail_blog: bool,

    /// Persona ids whose newsletter requests fail
    pub fail_personas: Vec<String>,

    /// Fail variation requests
    pub fail_variation: bool,

    /// Number of failures before a failing slot succeeds (None = fail forever)
    pub failures_before_success: Option<u32>,

    /// Insight text to return; `None` leaves insights to the analyzer fallback
    pub fixed_insight: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Template Generator
// ─────────────────────────────────────────────────────────────────

/// Deterministic offline implementation of ContentGenerator
pub struct TemplateGenerator {
    config: TemplateConfig,
    call_counts: RwLock<HashMap<&'static str, u32>>,
    failures: RwLock<HashMap<String, u32>>,
}

impl TemplateGenerator {
    pub fn new() -> Self {
        Self::with_config(TemplateConfig::default())
    }

    pub fn with_config(config: TemplateConfig) -> Self {
        Self {
            config,
            call_counts: RwLock::new(HashMap::new()),
            failures: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of times a method was called
    #[cfg(test)]
    pub fn call_count(&self, method: &str) -> u32 {
        self.call_counts.read().get(method).copied().unwrap_or(0)
    }

    fn record_call(&self, method: &'static str) {
        let mut counts = self.call_counts.write();
        let calls = counts.entry(method).or_insert(0);
        *calls += 1;
        debug!(method, calls = *calls, "Template generator call");
    }

    /// Fail the slot if configured to, counting failures per slot key
    fn maybe_fail(&self, enabled: bool, slot: &str) -> Result<()> {
        if !enabled {
            return Ok(());
        }
        let mut failures = self.failures.write();
        let count = failures.entry(slot.to_string()).or_insert(0);
        match self.config.failures_before_success {
            Some(limit) if *count >= limit => Ok(()),
            _ => {
                *count += 1;
                debug!(slot, failures = *count, "Injected generation failure");
                Err(Error::generation(format!("template generator failure for {}", slot)))
            }
        }
    }
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGenerator for TemplateGenerator {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn generate_blog(&self, topic: &str) -> Result<GeneratedContent> {
        self.record_call("generate_blog");
        self.maybe_fail(self.config.fail_blog, "blog")?;
        Ok(blog_template(topic))
    }

    async fn generate_newsletter(&self, topic: &str, persona: &Persona) -> Result<GeneratedContent> {
        self.record_call("generate_newsletter");
        let failing = self.config.fail_personas.iter().any(|p| p == &persona.id);
        self.maybe_fail(failing, &format!("newsletter:{}", persona.id))?;
        Ok(newsletter_template(topic, persona))
    }

    async fn generate_variation(
        &self,
        original: &ContentPiece,
        feedback: &str,
    ) -> Result<GeneratedContent> {
        self.record_call("generate_variation");
        self.maybe_fail(self.config.fail_variation, &format!("variation:{}", original.id))?;
        Ok(variation_template(original, feedback))
    }

    async fn write_insight(&self, _request: &InsightRequest) -> Result<String> {
        self.record_call("write_insight");
        self.config
            .fixed_insight
            .clone()
            .ok_or_else(|| Error::generation("template generator does not write insights"))
    }
}

// ─────────────────────────────────────────────────────────────────
// Templates
// ─────────────────────────────────────────────────────────────────

fn blog_template(topic: &str) -> GeneratedContent {
    let title = format!("How {} is Transforming Creative Workflows", topic);
    let body = format!(
        "# {title}\n\n\
Small creative agencies juggle briefs, feedback rounds, asset handoffs and invoices every single day. \
Most of that work is repetitive, and repetitive work is exactly where {topic} shines. \
In this post we look at what changes when a studio stops copying data between tools and lets automation carry the routine load.\n\n\
## Why the old way breaks down\n\n\
A typical project touches a project board, a shared drive, a chat tool and an invoicing app. \
Each handoff between them is a chance for a detail to slip. \
Designers wait for approvals that are buried in threads, producers rebuild the same status report every Friday, \
and account leads chase numbers that already exist somewhere else. \
None of this is creative work, yet it eats hours that clients never see.\n\n\
## What {topic} changes\n\n\
With {topic}, the routine steps run on their own. \
A signed brief can open a project, create the folder structure, assign the first tasks and notify the team in one move. \
Feedback collected from clients can be summarized and attached to the right deliverable. \
Status reports can be drafted from the work that actually happened instead of from memory. \
The team keeps full control: automation prepares, people decide.\n\n\
The result is not only speed. \
Fewer manual handoffs means fewer mistakes, clearer ownership and a calmer studio. \
Agencies that adopt this approach report more predictable timelines and more room for the ideas that win pitches.\n\n\
## Getting started without disruption\n\n\
Start with one workflow that everyone complains about, such as onboarding a new client or preparing weekly reports. \
Map the steps, mark the ones that require judgment, and automate the rest. \
Measure the time saved for a month before moving to the next workflow. \
Small, visible wins build trust and make the next change easier to adopt.\n\n\
Connect the tools you already use rather than replacing them. \
Notion-style workspaces, task boards and chat apps all expose integrations, \
and an assistant that understands your templates can fill the gaps between them. \
Keep a human review step for anything client-facing until the team is comfortable with the output.\n\n\
## Conclusion\n\n\
{topic} is not about replacing creative people. \
It is about removing the busywork that keeps them from doing their best work. \
Agencies that automate the routine free their teams to focus on strategy, craft and client relationships, \
which is where the real value has always been.\n\n\
Ready to see what your studio could do with a few extra hours every week? \
Try NovaMind and automate your first workflow today.\n",
        title = title,
        topic = topic,
    );
    GeneratedContent::new(title, body)
}

fn newsletter_template(topic: &str, persona: &Persona) -> GeneratedContent {
    let title = format!("New: {} for {}", topic, persona.name);
    let focus = if persona.focus.is_empty() {
        "the work that matters to you".to_string()
    } else {
        persona.focus_list()
    };
    let body = format!(
        "Hi there,\n\n\
We've just published a new article on {topic}, written with {name} in mind. \
If {focus} are on your agenda this quarter, this one is worth ten minutes of your time.\n\n\
Here is what you will find inside:\n\n\
- Where routine handoffs quietly cost your team hours every week\n\
- How {topic} takes over the repetitive steps while people keep the decisions\n\
- A simple way to start with one workflow and measure the result\n\n\
Teams that tried this approach saw clearer ownership, fewer dropped details and more time for the work clients actually pay for. \
The article walks through a practical rollout plan that does not require replacing the tools you already use. \
Each section ends with a short checklist you can share with your team, so the ideas turn into action instead of another unread bookmark.\n\n\
We kept the advice {tone}, so you can act on it right away.\n\n\
Read the full post and tell us which workflow you would automate first.\n\n\
The NovaMind Team\n",
        topic = topic,
        name = persona.name,
        focus = focus,
        tone = if persona.tone.is_empty() { "practical" } else { persona.tone.as_str() },
    );
    GeneratedContent::new(title, body)
}

fn variation_template(original: &ContentPiece, feedback: &str) -> GeneratedContent {
    let title = format!("{} (Revised)", original.title);
    let body = format!(
        "What our readers told us: {feedback}\n\n\
We reworked this piece around the angle that resonated most, with a sharper opening and a clearer call to action.\n\n\
{original}\n\n\
One more thing: reply to this message with the workflow you want automated next, and we will cover it in a future issue.\n",
        feedback = feedback,
        original = original.body.trim_end(),
    );
    GeneratedContent::new(title, body)
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
