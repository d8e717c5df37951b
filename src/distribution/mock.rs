//! Mock distributor
//!
//! Simulates delivery with a deterministic engagement policy: the same
//! persona, content kind and word count always produce the same counts.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::{MockSettings, SegmentProfile};
use crate::error::Result;
use crate::types::{ContentKind, ContentPiece, DistributionMode, EngagementCounts, EngagementOutcome};

use super::{Audience, Distributor};

// ─────────────────────────────────────────────────────────────────
// Engagement Policy
// ─────────────────────────────────────────────────────────────────

/// Built-in profile for the bundled personas
fn builtin_profile(persona_id: &str) -> Option<SegmentProfile> {
    let (segment_size, open_fraction, click_fraction) = match persona_id {
        "founders" => (90, 0.30, 0.18),
        "creatives" => (85, 0.33, 0.27),
        "operations" => (95, 0.26, 0.22),
        _ => return None,
    };
    Some(SegmentProfile {
        segment_size,
        open_fraction,
        click_fraction,
    })
}

/// Profile derived from the SHA-256 of an unknown persona id.
///
/// Segment 80-99, open 0.18-0.35, click 0.10-0.30.
fn derived_profile(persona_id: &str) -> SegmentProfile {
    let mut hasher = Sha256::new();
    hasher.update(persona_id.as_bytes());
    let hash = hasher.finalize();

    SegmentProfile {
        segment_size: 80 + (hash[0] % 20) as u64,
        open_fraction: (0.18 + (hash[1] as f64 / 255.0) * 0.17).min(0.35),
        click_fraction: (0.10 + (hash[2] as f64 / 255.0) * 0.20).min(0.30),
    }
}

/// Pure engagement policy
#[derive(Debug, Clone, Default)]
pub struct EngagementPolicy {
    settings: MockSettings,
}

impl EngagementPolicy {
    pub fn new(settings: MockSettings) -> Self {
        Self { settings }
    }

    /// Profile for a persona: configured override, built-in, then derived
    pub fn profile(&self, persona_id: &str) -> SegmentProfile {
        self.settings
            .profiles
            .get(persona_id)
            .copied()
            .or_else(|| builtin_profile(persona_id))
            .unwrap_or_else(|| derived_profile(persona_id))
    }

    fn kind_factor(&self, kind: ContentKind) -> f64 {
        match kind {
            ContentKind::Blog => self.settings.blog_kind_factor,
            ContentKind::Newsletter => self.settings.newsletter_kind_factor,
        }
    }

    /// Counts for one persona segment
    pub fn segment_engagement(&self, persona_id: &str, kind: ContentKind, words: usize) -> EngagementCounts {
        let profile = self.profile(persona_id);
        let cap = self.settings.length_cap_words.max(1) as f64;
        let length_multiplier = 1.0 + (words as f64).min(cap) / cap * self.settings.length_bonus;

        let delivered = profile.segment_size;
        let opened = (delivered as f64 * profile.open_fraction).round() as u64;
        let clicked = (opened as f64 * profile.click_fraction * self.kind_factor(kind) * length_multiplier)
            .round() as u64;

        EngagementCounts {
            delivered,
            opened,
            clicked,
            unsubscribed: (delivered as f64 * self.settings.unsubscribe_fraction).round() as u64,
            bounced: (delivered as f64 * self.settings.bounce_fraction).round() as u64,
        }
        .clamped()
    }

    /// Counts for an audience: the sum over its persona segments
    pub fn engagement(&self, audience: &Audience, kind: ContentKind, words: usize) -> EngagementCounts {
        let mut total = EngagementCounts::default();
        for persona_id in &audience.persona_ids {
            total += self.segment_engagement(persona_id, kind, words);
        }
        total
    }
}

// ─────────────────────────────────────────────────────────────────
// Mock Distributor
// ─────────────────────────────────────────────────────────────────

/// Distributor that never leaves the process
#[derive(Debug, Clone, Default)]
pub struct MockDistributor {
    policy: EngagementPolicy,
}

impl MockDistributor {
    pub fn new(settings: MockSettings) -> Self {
        Self {
            policy: EngagementPolicy::new(settings),
        }
    }
}

#[async_trait]
impl Distributor for MockDistributor {
    fn mode(&self) -> DistributionMode {
        DistributionMode::Mock
    }

    async fn distribute(&self, piece: &ContentPiece, audience: &Audience) -> Result<EngagementOutcome> {
        let counts = self.policy.engagement(audience, piece.kind, piece.word_count);

        debug!(
            content_id = %piece.id,
            persona = %audience.key,
            delivered = counts.delivered,
            opened = counts.opened,
            clicked = counts.clicked,
            "Simulated distribution"
        );

        Ok(EngagementOutcome::new(&piece.id, counts, DistributionMode::Mock))
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
