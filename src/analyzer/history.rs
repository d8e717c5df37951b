//! Cross-campaign comparison and persona trends

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{ContentKind, EngagementCounts, PerformanceSummary, Rate, GENERAL_AUDIENCE};

/// One analyzed piece of one stored campaign
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub campaign_id: String,
    pub pass: u32,
    pub audience: String,
    pub kind: ContentKind,
    pub content_id: String,
    pub counts: EngagementCounts,
    pub open_rate: Rate,
    pub click_rate: Rate,
}

/// Engagement of one audience summed over several campaigns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaTrend {
    pub audience: String,
    pub campaigns: usize,
    pub pieces: usize,
    pub totals: EngagementCounts,
    pub open_rate: Rate,
    pub click_rate: Rate,
    pub unsubscribe_rate: Rate,
}

/// Flatten stored summaries into one row per analyzed piece
pub fn compare_campaigns(summaries: &[PerformanceSummary]) -> Vec<ComparisonRow> {
    summaries
        .iter()
        .flat_map(|summary| {
            summary.metrics.iter().map(move |m| ComparisonRow {
                campaign_id: summary.campaign_id.clone(),
                pass: summary.pass,
                audience: m.persona_id.clone().unwrap_or_else(|| GENERAL_AUDIENCE.to_string()),
                kind: m.kind,
                content_id: m.content_id.clone(),
                counts: m.counts,
                open_rate: m.open_rate,
                click_rate: m.click_rate,
            })
        })
        .collect()
}

/// Sum rows per audience and recompute rates from the totals.
///
/// Sorted by total clicks desc, then audience name.
pub fn persona_trends(rows: &[ComparisonRow]) -> Vec<PersonaTrend> {
    let mut grouped: BTreeMap<&str, (EngagementCounts, Vec<&str>, usize)> = BTreeMap::new();
    for row in rows {
        let entry = grouped.entry(row.audience.as_str()).or_default();
        entry.0 += row.counts;
        if !entry.1.contains(&row.campaign_id.as_str()) {
            entry.1.push(row.campaign_id.as_str());
        }
        entry.2 += 1;
    }

    let mut trends: Vec<PersonaTrend> = grouped
        .into_iter()
        .map(|(audience, (totals, campaigns, pieces))| PersonaTrend {
            audience: audience.to_string(),
            campaigns: campaigns.len(),
            pieces,
            open_rate: Rate::ratio(totals.opened, totals.delivered),
            click_rate: Rate::ratio(totals.clicked, totals.opened),
            unsubscribe_rate: Rate::ratio(totals.unsubscribed, totals.delivered),
            totals,
        })
        .collect();

    trends.sort_by(|a, b| {
        b.totals
            .clicked
            .cmp(&a.totals.clicked)
            .then_with(|| a.audience.cmp(&b.audience))
    });
    trends
}
