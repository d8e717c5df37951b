//! Campaign artifact storage
//!
//! Every campaign gets its own directory under `<data_dir>/campaigns/<id>/`
//! holding one JSON document per artifact.

mod artifacts;
mod file;

pub use artifacts::CampaignLog;
pub use file::FileStore;

use crate::error::Result;
use crate::types::{CampaignRecord, ContentPiece, EngagementOutcome, Improvement, PerformanceSummary};

/// Durable storage for campaign artifacts
pub trait ArtifactStore: Send + Sync {
    /// Write the campaign log view of the record
    fn save_campaign(&self, record: &CampaignRecord) -> Result<()>;

    /// Write one content piece
    fn save_content(&self, piece: &ContentPiece) -> Result<()>;

    /// Write one engagement outcome under its campaign
    fn save_outcome(&self, campaign_id: &str, outcome: &EngagementOutcome) -> Result<()>;

    /// Write the per-content rates and ranking of one analysis pass
    fn save_performance(&self, summary: &PerformanceSummary) -> Result<()>;

    /// Write the insight text of one analysis pass
    fn save_summary(&self, summary: &PerformanceSummary) -> Result<()>;

    /// Write the improvement entries of a campaign
    fn save_improvements(&self, campaign_id: &str, improvements: &[Improvement]) -> Result<()>;

    /// Read the campaign log
    fn load_campaign(&self, campaign_id: &str) -> Result<CampaignLog>;

    /// Read every analysis pass of a campaign, ordered by pass
    fn load_performance(&self, campaign_id: &str) -> Result<Vec<PerformanceSummary>>;

    /// Ids of all stored campaigns, oldest first
    fn list_campaigns(&self) -> Result<Vec<String>>;
}
