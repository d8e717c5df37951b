//! Per-run bookkeeping
//!
//! Tracks which artifacts of the in-flight campaign have already been written
//! and describes the generation slots the orchestrator fills.

use std::collections::HashSet;
use std::fmt;

use crate::persona::Persona;
use crate::types::{CampaignRecord, ContentKind, ContentPiece};

/// Generation attempts per slot: the first call plus one retry
pub const MAX_GENERATION_ATTEMPTS: u32 = 2;

// ─────────────────────────────────────────────────────────────────
// Generation Slots
// ─────────────────────────────────────────────────────────────────

/// One piece of content the orchestrator asks the generator for
#[derive(Debug, Clone, Copy)]
pub enum Slot<'a> {
    Blog,
    Newsletter(&'a Persona),
    Variation { source: &'a ContentPiece, feedback: &'a str },
}

impl Slot<'_> {
    pub fn kind(&self) -> ContentKind {
        match self {
            Slot::Blog => ContentKind::Blog,
            Slot::Newsletter(_) => ContentKind::Newsletter,
            Slot::Variation { source, .. } => source.kind,
        }
    }

    pub fn persona_id(&self) -> Option<String> {
        match self {
            Slot::Blog => None,
            Slot::Newsletter(persona) => Some(persona.id.clone()),
            Slot::Variation { source, .. } => source.persona_id.clone(),
        }
    }

    pub fn parent_content_id(&self) -> Option<String> {
        match self {
            Slot::Variation { source, .. } => Some(source.id.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Slot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Blog => write!(f, "blog"),
            Slot::Newsletter(persona) => write!(f, "newsletter:{}", persona.id),
            Slot::Variation { source, .. } => write!(f, "variation:{}", source.id),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Persistence Tracking
// ─────────────────────────────────────────────────────────────────

/// Artifacts of the current run that are already on disk
#[derive(Debug, Default)]
pub struct Persisted {
    content: HashSet<String>,
    outcomes: HashSet<String>,
    passes: HashSet<u32>,
    improvements: usize,
}

impl Persisted {
    /// Pieces not written yet, in record order
    pub fn pending_content<'a>(&self, record: &'a CampaignRecord) -> Vec<&'a ContentPiece> {
        record
            .content
            .iter()
            .filter(|p| !self.content.contains(&p.id))
            .collect()
    }

    pub fn mark_content(&mut self, id: &str) {
        self.content.insert(id.to_string());
    }

    pub fn has_outcome(&self, id: &str) -> bool {
        self.outcomes.contains(id)
    }

    pub fn mark_outcome(&mut self, id: &str) {
        self.outcomes.insert(id.to_string());
    }

    pub fn has_pass(&self, pass: u32) -> bool {
        self.passes.contains(&pass)
    }

    pub fn mark_pass(&mut self, pass: u32) {
        self.passes.insert(pass);
    }

    /// Whether the record holds improvements that were not written yet
    pub fn improvements_pending(&self, record: &CampaignRecord) -> bool {
        record.improvements.len() > self.improvements
    }

    pub fn mark_improvements(&mut self, count: usize) {
        self.improvements = count;
    }

    /// Number of pieces written so far
    pub fn content_count(&self) -> usize {
        self.content.len()
    }
}
