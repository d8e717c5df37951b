//! Distribution port
//!
//! Defines the Distributor trait that CRM integrations implement.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ContentPiece, DistributionMode, EngagementOutcome, GENERAL_AUDIENCE};

/// Contact segment(s) a piece is sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audience {
    /// Persona id, or "general" for the union of segments
    pub key: String,

    /// Persona segments included in the audience
    pub persona_ids: Vec<String>,
}

impl Audience {
    /// A single persona segment
    pub fn persona(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            key: id.clone(),
            persona_ids: vec![id],
        }
    }

    /// The union of the given persona segments
    pub fn general(persona_ids: &[String]) -> Self {
        Self {
            key: GENERAL_AUDIENCE.to_string(),
            persona_ids: persona_ids.to_vec(),
        }
    }

    /// Audience for a piece: its persona, or every requested persona for blog content
    pub fn for_piece(piece: &ContentPiece, requested: &[String]) -> Self {
        match piece.persona_id.as_deref() {
            Some(id) => Self::persona(id),
            None => Self::general(requested),
        }
    }
}

/// Port for delivering content and reporting engagement
#[async_trait]
pub trait Distributor: Send + Sync {
    /// Mode recorded on outcomes produced by this distributor
    fn mode(&self) -> DistributionMode;

    /// Send a piece to an audience and report its engagement
    async fn distribute(&self, piece: &ContentPiece, audience: &Audience) -> Result<EngagementOutcome>;
}
