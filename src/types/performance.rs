//! Performance summaries produced by the analyzer

use std::fmt;

use serde::{Deserialize, Serialize};

use super::content::ContentKind;
use super::outcome::EngagementCounts;

// ─────────────────────────────────────────────────────────────────
// Rate
// ─────────────────────────────────────────────────────────────────

/// A normalized rate in [0, 1], undefined when its denominator is zero.
///
/// Serialized as a number or `null`; never NaN.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(Option<f64>);

impl Rate {
    /// The undefined rate
    pub const UNDEFINED: Rate = Rate(None);

    /// `numerator / denominator`, undefined when the denominator is zero
    pub fn ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            Rate::UNDEFINED
        } else {
            Rate(Some(numerator as f64 / denominator as f64))
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    #[cfg(test)]
    pub fn is_defined(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:.1}%", v * 100.0),
            None => write!(f, "n/a"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Per-content metrics
// ─────────────────────────────────────────────────────────────────

/// Aggregated counts and rates for one content piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetrics {
    pub content_id: String,
    pub persona_id: Option<String>,
    pub kind: ContentKind,
    pub counts: EngagementCounts,
    pub open_rate: Rate,
    pub click_rate: Rate,
    pub unsubscribe_rate: Rate,
    pub bounce_rate: Rate,
}

impl ContentMetrics {
    /// Build metrics from summed counts
    pub fn from_counts(
        content_id: impl Into<String>,
        persona_id: Option<String>,
        kind: ContentKind,
        counts: EngagementCounts,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            persona_id,
            kind,
            open_rate: Rate::ratio(counts.opened, counts.delivered),
            click_rate: Rate::ratio(counts.clicked, counts.opened),
            unsubscribe_rate: Rate::ratio(counts.unsubscribed, counts.delivered),
            bounce_rate: Rate::ratio(counts.bounced, counts.delivered),
            counts,
        }
    }

    /// Pieces never delivered cannot be ranked
    pub fn is_rankable(&self) -> bool {
        self.counts.delivered > 0
    }
}

// ─────────────────────────────────────────────────────────────────
// Summary
// ─────────────────────────────────────────────────────────────────

/// Where the insight text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    /// Written by the content generator
    Generated,
    /// Deterministic text from the analyzer
    Fallback,
}

impl fmt::Display for InsightSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightSource::Generated => write!(f, "generated"),
            InsightSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Result of one analysis pass over a campaign's pieces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub campaign_id: String,

    /// 1 for the initial pass, 2 for the variation pass
    pub pass: u32,

    /// Metrics per analyzed piece, in content order
    pub metrics: Vec<ContentMetrics>,

    /// Ranked content ids, best first
    pub ranking: Vec<String>,

    /// Ids of pieces with zero deliveries
    pub unranked: Vec<String>,

    /// Qualitative insight text
    pub insight: String,

    pub insight_source: InsightSource,
}

impl PerformanceSummary {
    /// Metrics for one piece
    pub fn metrics_for(&self, content_id: &str) -> Option<&ContentMetrics> {
        self.metrics.iter().find(|m| m.content_id == content_id)
    }

    /// Top ranked piece, if any piece was delivered
    pub fn top(&self) -> Option<&str> {
        self.ranking.first().map(String::as_str)
    }

    /// Lowest ranked piece
    pub fn bottom(&self) -> Option<&str> {
        self.ranking.last().map(String::as_str)
    }
}
