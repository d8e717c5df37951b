//! JSON file store

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{CampaignRecord, ContentPiece, EngagementOutcome, Improvement, PerformanceSummary};

use super::artifacts::{summary_from_artifacts, CampaignLog, PerformanceArtifact, SummaryArtifact};
use super::ArtifactStore;

const CAMPAIGNS_DIR: &str = "campaigns";
const CAMPAIGN_FILE: &str = "campaign.json";
const IMPROVEMENTS_FILE: &str = "improvements.json";

/// Store writing pretty-printed JSON documents below a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { root: data_dir.into() }
    }

    /// Directory holding every artifact of one campaign
    pub fn campaign_dir(&self, campaign_id: &str) -> PathBuf {
        self.root.join(CAMPAIGNS_DIR).join(campaign_id)
    }

    fn performance_path(&self, campaign_id: &str, pass: u32) -> PathBuf {
        self.campaign_dir(campaign_id).join(format!("performance-{}.json", pass))
    }

    fn summary_path(&self, campaign_id: &str, pass: u32) -> PathBuf {
        self.campaign_dir(campaign_id).join(format!("summary-{}.json", pass))
    }

    /// Write a document through a temporary sibling so readers never see half a file
    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let io_err = |source| Error::IoWrite {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;

        debug!(path = %path.display(), "Wrote artifact");
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path).map_err(|source| Error::IoRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Analysis passes found on disk for a campaign
    fn stored_passes(&self, campaign_id: &str) -> Result<Vec<u32>> {
        let dir = self.campaign_dir(campaign_id);
        let entries = fs::read_dir(&dir).map_err(|source| Error::IoRead { path: dir.clone(), source })?;

        let mut passes: Vec<u32> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                name.strip_prefix("performance-")?
                    .strip_suffix(".json")?
                    .parse()
                    .ok()
            })
            .collect();
        passes.sort_unstable();
        Ok(passes)
    }
}

impl ArtifactStore for FileStore {
    fn save_campaign(&self, record: &CampaignRecord) -> Result<()> {
        let path = self.campaign_dir(&record.campaign_id).join(CAMPAIGN_FILE);
        self.write_json(&path, &CampaignLog::from(record))
    }

    fn save_content(&self, piece: &ContentPiece) -> Result<()> {
        let path = self
            .campaign_dir(&piece.campaign_id)
            .join("content")
            .join(format!("{}.json", piece.id));
        self.write_json(&path, piece)
    }

    fn save_outcome(&self, campaign_id: &str, outcome: &EngagementOutcome) -> Result<()> {
        let path = self
            .campaign_dir(campaign_id)
            .join("outcomes")
            .join(format!("{}.json", outcome.id));
        self.write_json(&path, outcome)
    }

    fn save_performance(&self, summary: &PerformanceSummary) -> Result<()> {
        let path = self.performance_path(&summary.campaign_id, summary.pass);
        self.write_json(&path, &PerformanceArtifact::from(summary))
    }

    fn save_summary(&self, summary: &PerformanceSummary) -> Result<()> {
        let path = self.summary_path(&summary.campaign_id, summary.pass);
        self.write_json(&path, &SummaryArtifact::from(summary))
    }

    fn save_improvements(&self, campaign_id: &str, improvements: &[Improvement]) -> Result<()> {
        let path = self.campaign_dir(campaign_id).join(IMPROVEMENTS_FILE);
        self.write_json(&path, &improvements)
    }

    fn load_campaign(&self, campaign_id: &str) -> Result<CampaignLog> {
        self.read_json(&self.campaign_dir(campaign_id).join(CAMPAIGN_FILE))
    }

    fn load_performance(&self, campaign_id: &str) -> Result<Vec<PerformanceSummary>> {
        let mut summaries = Vec::new();
        for pass in self.stored_passes(campaign_id)? {
            let performance: PerformanceArtifact =
                self.read_json(&self.performance_path(campaign_id, pass))?;

            let summary_path = self.summary_path(campaign_id, pass);
            let summary: Option<SummaryArtifact> = if summary_path.exists() {
                Some(self.read_json(&summary_path)?)
            } else {
                None
            };

            summaries.push(summary_from_artifacts(performance, summary));
        }
        Ok(summaries)
    }

    fn list_campaigns(&self) -> Result<Vec<String>> {
        let dir = self.root.join(CAMPAIGNS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|source| Error::IoRead { path: dir.clone(), source })?;
        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().join(CAMPAIGN_FILE).is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();

        // Ids start with their creation timestamp
        ids.sort();
        Ok(ids)
    }
}
