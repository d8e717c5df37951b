//! Engagement outcomes reported by a distributor

use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Distribution Mode
// ─────────────────────────────────────────────────────────────────

/// How content is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionMode {
    /// Real CRM delivery
    Live,
    /// Simulated delivery with the deterministic engagement policy
    #[default]
    Mock,
}

impl fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionMode::Live => write!(f, "live"),
            DistributionMode::Mock => write!(f, "mock"),
        }
    }
}

impl FromStr for DistributionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" => Ok(DistributionMode::Live),
            "mock" => Ok(DistributionMode::Mock),
            _ => Err(format!("Unknown distribution mode '{}'. Valid: live, mock", s)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Counts
// ─────────────────────────────────────────────────────────────────

/// Raw engagement counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngagementCounts {
    pub delivered: u64,
    pub opened: u64,
    pub clicked: u64,
    pub unsubscribed: u64,
    pub bounced: u64,
}

impl EngagementCounts {
    /// Clamp so that clicked <= opened <= delivered
    pub fn clamped(mut self) -> Self {
        self.opened = self.opened.min(self.delivered);
        self.clicked = self.clicked.min(self.opened);
        self.unsubscribed = self.unsubscribed.min(self.delivered);
        self.bounced = self.bounced.min(self.delivered);
        self
    }
}

impl AddAssign for EngagementCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.delivered += rhs.delivered;
        self.opened += rhs.opened;
        self.clicked += rhs.clicked;
        self.unsubscribed += rhs.unsubscribed;
        self.bounced += rhs.bounced;
    }
}

// ─────────────────────────────────────────────────────────────────
// Outcome
// ─────────────────────────────────────────────────────────────────

/// One distribution attempt of one content piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementOutcome {
    /// Unique outcome id
    pub id: String,

    /// Content piece this outcome belongs to
    pub content_id: String,

    /// Engagement counters
    #[serde(flatten)]
    pub counts: EngagementCounts,

    /// Mode that actually produced the counts
    pub mode: DistributionMode,

    /// When the outcome was recorded
    pub recorded_at: DateTime<Utc>,
}

impl EngagementOutcome {
    pub fn new(content_id: impl Into<String>, counts: EngagementCounts, mode: DistributionMode) -> Self {
        Self {
            id: format!("outcome-{}", uuid::Uuid::new_v4()),
            content_id: content_id.into(),
            counts,
            mode,
            recorded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_orders_counts() {
        let counts = EngagementCounts {
            delivered: 10,
            opened: 12,
            clicked: 20,
            unsubscribed: 1,
            bounced: 0,
        }
        .clamped();

        assert_eq!(counts.opened, 10);
        assert_eq!(counts.clicked, 10);
    }

    #[test]
    fn test_counts_add_assign() {
        let mut total = EngagementCounts::default();
        total += EngagementCounts { delivered: 5, opened: 2, clicked: 1, unsubscribed: 0, bounced: 1 };
        total += EngagementCounts { delivered: 3, opened: 3, clicked: 2, unsubscribed: 1, bounced: 0 };

        assert_eq!(total.delivered, 8);
        assert_eq!(total.opened, 5);
        assert_eq!(total.clicked, 3);
        assert_eq!(total.unsubscribed, 1);
        assert_eq!(total.bounced, 1);
    }

    #[test]
    fn test_outcome_serializes_flat_counts() {
        let outcome = EngagementOutcome::new(
            "content-1",
            EngagementCounts { delivered: 90, opened: 27, clicked: 5, unsubscribed: 0, bounced: 2 },
            DistributionMode::Mock,
        );
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["delivered"], 90);
        assert_eq!(json["mode"], "mock");
        assert_eq!(json["content_id"], "content-1");
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("LIVE".parse::<DistributionMode>().unwrap(), DistributionMode::Live);
        assert!("carrier-pigeon".parse::<DistributionMode>().is_err());
        assert_eq!(DistributionMode::default(), DistributionMode::Mock);
    }
}
