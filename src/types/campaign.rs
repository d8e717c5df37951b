//! Campaign record and lifecycle
//!
//! The record is the single source of truth for one campaign run. It owns the
//! ordered content list, every engagement outcome, each performance pass,
//! skipped slots and improvement entries. Lists are append-only.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::{ContentKind, ContentPiece};
use super::outcome::{DistributionMode, EngagementOutcome};
use super::performance::PerformanceSummary;
use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────
// Status
// ─────────────────────────────────────────────────────────────────

/// Campaign lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CampaignStatus {
    Created,
    Generating,
    Distributing,
    Analyzing,
    VariationRegenerating,
    Completed,
    Failed,
}

impl CampaignStatus {
    /// Completed and failed are never left
    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Completed | CampaignStatus::Failed)
    }

    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: CampaignStatus) -> bool {
        use CampaignStatus::*;

        if self.is_terminal() {
            return false;
        }
        if next == Failed {
            return true;
        }
        matches!(
            (self, next),
            (Created, Generating)
                | (Generating, Distributing)
                | (Distributing, Analyzing)
                | (Analyzing, VariationRegenerating)
                | (Analyzing, Completed)
                | (VariationRegenerating, Completed)
        )
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CampaignStatus::Created => "created",
            CampaignStatus::Generating => "generating",
            CampaignStatus::Distributing => "distributing",
            CampaignStatus::Analyzing => "analyzing",
            CampaignStatus::VariationRegenerating => "variation-regenerating",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

// ─────────────────────────────────────────────────────────────────
// Skipped slots and improvements
// ─────────────────────────────────────────────────────────────────

/// Why a slot produced no piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    GenerationFailed,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::GenerationFailed => write!(f, "generation_failed"),
        }
    }
}

/// A generation slot that was given up on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotFailure {
    pub kind: ContentKind,

    /// Persona of the slot, `None` for the general blog
    pub persona_id: Option<String>,

    /// Source piece when the slot was a variation request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_content_id: Option<String>,

    pub reason: FailureReason,
    pub attempts: u32,

    /// Last error message
    pub error: String,
}

/// Link between a top piece and the variation generated from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Improvement {
    pub campaign_id: String,
    pub source_content_id: String,
    pub new_content_id: String,
    pub feedback_used: String,
}

// ─────────────────────────────────────────────────────────────────
// Campaign Record
// ─────────────────────────────────────────────────────────────────

/// One campaign run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub campaign_id: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Requested personas, duplicates removed, in request order
    pub persona_ids: Vec<String>,

    /// Effective distribution mode (may switch from live to mock)
    pub distribution_mode: DistributionMode,

    pub status: CampaignStatus,

    /// Content pieces in creation order
    pub content: Vec<ContentPiece>,

    /// Outcomes in recording order
    pub outcomes: Vec<EngagementOutcome>,

    /// Analysis passes in order
    pub performance: Vec<PerformanceSummary>,

    pub skipped: Vec<SlotFailure>,
    pub improvements: Vec<Improvement>,

    /// Error message when the run failed
    pub error: Option<String>,
}

impl CampaignRecord {
    /// Allocate a new record with a fresh unique id
    pub fn new(topic: impl Into<String>, persona_ids: Vec<String>) -> Self {
        let now = Utc::now();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self {
            campaign_id: format!("campaign_{}_{}", now.format("%Y%m%d_%H%M%S"), &suffix[..8]),
            topic: topic.into(),
            created_at: now,
            updated_at: now,
            persona_ids,
            distribution_mode: DistributionMode::default(),
            status: CampaignStatus::Created,
            content: Vec::new(),
            outcomes: Vec::new(),
            performance: Vec::new(),
            skipped: Vec::new(),
            improvements: Vec::new(),
            error: None,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────

    /// Move to the next lifecycle state
    pub fn advance(&mut self, next: CampaignStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::Internal(format!(
                "Illegal campaign transition {} -> {}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Mark the run failed, keeping everything recorded so far
    pub fn fail(&mut self, error: &Error) {
        if self.status.is_terminal() {
            return;
        }
        self.status = CampaignStatus::Failed;
        self.error = Some(error.format_for_log());
        self.updated_at = Utc::now();
    }

    // ─────────────────────────────────────────────────────────────
    // Appends
    // ─────────────────────────────────────────────────────────────

    /// Append a piece owned by this campaign
    pub fn add_content(&mut self, piece: ContentPiece) -> Result<()> {
        if piece.campaign_id != self.campaign_id {
            return Err(Error::Internal(format!(
                "Content {} belongs to campaign {}, not {}",
                piece.id, piece.campaign_id, self.campaign_id
            )));
        }
        self.content.push(piece);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Append an outcome for a piece already in the record
    pub fn add_outcome(&mut self, outcome: EngagementOutcome) -> Result<()> {
        if self.piece(&outcome.content_id).is_none() {
            return Err(Error::Internal(format!(
                "Outcome {} references unknown content {}",
                outcome.id, outcome.content_id
            )));
        }
        self.outcomes.push(outcome);
        self.updated_at = Utc::now();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────

    /// Sequence number for the next created piece
    pub fn next_sequence(&self) -> u32 {
        self.content.len() as u32
    }

    pub fn piece(&self, content_id: &str) -> Option<&ContentPiece> {
        self.content.iter().find(|p| p.id == content_id)
    }

    /// All outcomes recorded for one piece
    pub fn outcomes_for<'a>(&'a self, content_id: &'a str) -> impl Iterator<Item = &'a EngagementOutcome> + 'a {
        self.outcomes.iter().filter(move |o| o.content_id == content_id)
    }

    pub fn content_ids(&self) -> Vec<String> {
        self.content.iter().map(|p| p.id.clone()).collect()
    }

    pub fn outcome_ids(&self) -> Vec<String> {
        self.outcomes.iter().map(|o| o.id.clone()).collect()
    }

    pub fn latest_summary(&self) -> Option<&PerformanceSummary> {
        self.performance.last()
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
