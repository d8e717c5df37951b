//! On-disk artifact documents
//!
//! These are the JSON shapes written under a campaign directory. They are
//! views of the in-memory record, not the record itself.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    CampaignRecord, CampaignStatus, ContentKind, ContentMetrics, DistributionMode,
    EngagementCounts, InsightSource, PerformanceSummary, Rate, SlotFailure,
};

/// `campaign.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignLog {
    pub campaign_id: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub persona_ids: Vec<String>,
    pub mode: DistributionMode,
    pub content_ids: Vec<String>,
    pub outcome_ids: Vec<String>,
    pub performance_passes: Vec<u32>,
    pub skipped: Vec<SlotFailure>,
    pub status: CampaignStatus,
    pub error: Option<String>,
}

impl From<&CampaignRecord> for CampaignLog {
    fn from(record: &CampaignRecord) -> Self {
        Self {
            campaign_id: record.campaign_id.clone(),
            topic: record.topic.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            persona_ids: record.persona_ids.clone(),
            mode: record.distribution_mode,
            content_ids: record.content_ids(),
            outcome_ids: record.outcome_ids(),
            performance_passes: record.performance.iter().map(|p| p.pass).collect(),
            skipped: record.skipped.clone(),
            status: record.status,
            error: record.error.clone(),
        }
    }
}

/// One entry of `per_content_rates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRates {
    pub persona_id: Option<String>,
    pub kind: ContentKind,
    #[serde(flatten)]
    pub counts: EngagementCounts,
    pub open_rate: Rate,
    pub click_rate: Rate,
    pub unsubscribe_rate: Rate,
    pub bounce_rate: Rate,
}

/// `performance-<pass>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceArtifact {
    pub campaign_id: String,
    pub pass: u32,
    pub per_content_rates: BTreeMap<String, ContentRates>,
    pub ranking: Vec<String>,
    pub unranked: Vec<String>,
}

impl From<&PerformanceSummary> for PerformanceArtifact {
    fn from(summary: &PerformanceSummary) -> Self {
        let per_content_rates = summary
            .metrics
            .iter()
            .map(|m| {
                (
                    m.content_id.clone(),
                    ContentRates {
                        persona_id: m.persona_id.clone(),
                        kind: m.kind,
                        counts: m.counts,
                        open_rate: m.open_rate,
                        click_rate: m.click_rate,
                        unsubscribe_rate: m.unsubscribe_rate,
                        bounce_rate: m.bounce_rate,
                    },
                )
            })
            .collect();

        Self {
            campaign_id: summary.campaign_id.clone(),
            pass: summary.pass,
            per_content_rates,
            ranking: summary.ranking.clone(),
            unranked: summary.unranked.clone(),
        }
    }
}

/// `summary-<pass>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryArtifact {
    pub campaign_id: String,
    pub pass: u32,
    pub insight_text: String,
    pub insight_source: InsightSource,
}

impl From<&PerformanceSummary> for SummaryArtifact {
    fn from(summary: &PerformanceSummary) -> Self {
        Self {
            campaign_id: summary.campaign_id.clone(),
            pass: summary.pass,
            insight_text: summary.insight.clone(),
            insight_source: summary.insight_source,
        }
    }
}

/// Rebuild a summary from its stored documents
pub fn summary_from_artifacts(
    performance: PerformanceArtifact,
    summary: Option<SummaryArtifact>,
) -> PerformanceSummary {
    let metrics = performance
        .per_content_rates
        .into_iter()
        .map(|(content_id, r)| ContentMetrics {
            content_id,
            persona_id: r.persona_id,
            kind: r.kind,
            counts: r.counts,
            open_rate: r.open_rate,
            click_rate: r.click_rate,
            unsubscribe_rate: r.unsubscribe_rate,
            bounce_rate: r.bounce_rate,
        })
        .collect();

    let (insight, insight_source) = match summary {
        Some(s) => (s.insight_text, s.insight_source),
        None => (String::new(), InsightSource::Fallback),
    };

    PerformanceSummary {
        campaign_id: performance.campaign_id,
        pass: performance.pass,
        metrics,
        ranking: performance.ranking,
        unranked: performance.unranked,
        insight,
        insight_source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::types::{ContentPiece, EngagementOutcome};

    #[test]
    fn test_performance_artifact_shape() {
        let piece = ContentPiece::new("c1", None, ContentKind::Blog, "T", "b", 0);
        let idle = ContentPiece::new("c1", Some("founders".into()), ContentKind::Newsletter, "T", "b", 1);
        let outcome = EngagementOutcome::new(
            &piece.id,
            EngagementCounts { delivered: 100, opened: 30, clicked: 6, unsubscribed: 1, bounced: 2 },
            DistributionMode::Mock,
        );
        let summary = analyze("c1", 1, &[piece.clone(), idle.clone()], &[outcome]);

        let json = serde_json::to_value(PerformanceArtifact::from(&summary)).unwrap();
        let rates = &json["per_content_rates"][&piece.id];
        assert_eq!(rates["open_rate"], 0.3);
        assert_eq!(rates["kind"], "blog");
        assert!(rates["persona_id"].is_null());
        assert!(json["per_content_rates"][&idle.id]["open_rate"].is_null());
        assert_eq!(json["unranked"][0], idle.id.as_str());
    }

    #[test]
    fn test_campaign_log_lists_ids() {
        let mut record = CampaignRecord::new("AI", vec!["founders".into()]);
        let piece = ContentPiece::new(record.campaign_id.clone(), None, ContentKind::Blog, "T", "b", 0);
        let id = piece.id.clone();
        record.add_content(piece).unwrap();

        let log = CampaignLog::from(&record);
        assert_eq!(log.content_ids, vec![id]);
        assert_eq!(log.status, CampaignStatus::Created);
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["mode"], "mock");
    }
}
