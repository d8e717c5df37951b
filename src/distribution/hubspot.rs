//! HubSpot distributor
//!
//! Creates a marketing email per piece through the HubSpot marketing API and
//! reports whatever engagement counters the API returns for it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::HubSpotSettings;
use crate::error::{Error, Result};
use crate::types::{ContentPiece, DistributionMode, EngagementCounts, EngagementOutcome};

use super::{Audience, Distributor};

/// Placeholder value shipped in sample environment files
const PLACEHOLDER_KEY: &str = "your_hubspot_key_here";

/// Shortest key HubSpot issues
const MIN_KEY_LEN: usize = 20;

// ─────────────────────────────────────────────────────────────────
// API types
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarketingEmailRequest {
    name: String,
    subject: String,
    email_body: String,
    campaign_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct MarketingEmailResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    stats: Option<EmailStats>,
}

#[derive(Debug, Default, Deserialize)]
struct EmailStats {
    #[serde(default)]
    counters: EmailCounters,
}

#[derive(Debug, Default, Deserialize)]
struct EmailCounters {
    #[serde(default)]
    delivered: u64,
    #[serde(default)]
    open: u64,
    #[serde(default)]
    click: u64,
    #[serde(default)]
    unsubscribed: u64,
    #[serde(default)]
    bounce: u64,
}

impl From<EmailCounters> for EngagementCounts {
    fn from(c: EmailCounters) -> Self {
        EngagementCounts {
            delivered: c.delivered,
            opened: c.open,
            clicked: c.click,
            unsubscribed: c.unsubscribed,
            bounced: c.bounce,
        }
        .clamped()
    }
}

// ─────────────────────────────────────────────────────────────────
// HubSpot Distributor
// ─────────────────────────────────────────────────────────────────

/// Live distributor backed by the HubSpot marketing email API
pub struct HubSpotDistributor {
    settings: HubSpotSettings,
    client: Client,
}

impl HubSpotDistributor {
    /// Create a distributor, rejecting missing or placeholder keys
    pub fn new(settings: &HubSpotSettings) -> Result<Self> {
        validate_key(&settings.api_key)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::distribution(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %settings.base_url, "HubSpot distributor created");

        Ok(Self {
            settings: settings.clone(),
            client,
        })
    }

    fn emails_url(&self) -> String {
        format!("{}/marketing/v3/emails", self.settings.base_url.trim_end_matches('/'))
    }
}

/// Check that a key could be a real HubSpot token
pub fn validate_key(api_key: &str) -> Result<()> {
    let key = api_key.trim();
    if key.is_empty() {
        return Err(Error::distribution("HubSpot API key is not configured"));
    }
    if key == PLACEHOLDER_KEY {
        return Err(Error::distribution("HubSpot API key is still the placeholder value"));
    }
    if key.len() < MIN_KEY_LEN {
        return Err(Error::distribution(format!(
            "HubSpot API key is too short ({} characters)",
            key.len()
        )));
    }
    Ok(())
}

#[async_trait]
impl Distributor for HubSpotDistributor {
    fn mode(&self) -> DistributionMode {
        DistributionMode::Live
    }

    async fn distribute(&self, piece: &ContentPiece, audience: &Audience) -> Result<EngagementOutcome> {
        let payload = MarketingEmailRequest {
            name: format!("{} - {}", piece.title, audience.key),
            subject: piece.title.clone(),
            email_body: piece.body.clone(),
            campaign_name: piece.campaign_id.clone(),
        };

        let response = self
            .client
            .post(self.emails_url())
            .bearer_auth(self.settings.api_key.trim())
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::distribution(format!("HubSpot request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::DistributionUnauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::distribution(format!("HubSpot API error {}: {}", status, body)));
        }

        let parsed: MarketingEmailResponse = response
            .json()
            .await
            .map_err(|e| Error::distribution(format!("Unreadable HubSpot response: {}", e)))?;

        let counts: EngagementCounts = parsed
            .stats
            .map(|s| s.counters.into())
            .unwrap_or_default();

        debug!(
            content_id = %piece.id,
            persona = %audience.key,
            email_id = ?parsed.id,
            delivered = counts.delivered,
            "Sent marketing email"
        );

        Ok(EngagementOutcome::new(&piece.id, counts, DistributionMode::Live))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(key: &str) -> HubSpotSettings {
        HubSpotSettings {
            api_key: key.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_unusable_keys() {
        for key in ["", "   ", PLACEHOLDER_KEY, "pat-short"] {
            let err = HubSpotDistributor::new(&settings(key)).err().unwrap();
            assert!(err.is_distribution(), "key {:?}", key);
        }
    }

    #[test]
    fn test_accepts_plausible_key() {
        let distributor = HubSpotDistributor::new(&settings("pat-na1-00000000-0000-0000")).unwrap();
        assert_eq!(distributor.mode(), DistributionMode::Live);
        assert_eq!(distributor.emails_url(), "https://api.hubapi.com/marketing/v3/emails");
    }

    #[test]
    fn test_counters_conversion() {
        let json = r#"{"id": "123", "stats": {"counters": {"delivered": 80, "open": 90, "click": 12, "bounce": 3}}}"#;
        let parsed: MarketingEmailResponse = serde_json::from_str(json).unwrap();
        let counts: EngagementCounts = parsed.stats.unwrap().counters.into();

        assert_eq!(counts.delivered, 80);
        // Clamped to delivered
        assert_eq!(counts.opened, 80);
        assert_eq!(counts.clicked, 12);
        assert_eq!(counts.bounced, 3);
        assert_eq!(counts.unsubscribed, 0);
    }

    #[test]
    fn test_response_without_stats() {
        let parsed: MarketingEmailResponse = serde_json::from_str(r#"{"id": "123"}"#).unwrap();
        assert!(parsed.stats.is_none());
    }

    #[test]
    fn test_payload_is_camel_case() {
        let payload = MarketingEmailRequest {
            name: "n".into(),
            subject: "s".into(),
            email_body: "b".into(),
            campaign_name: "c".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["emailBody"], "b");
        assert_eq!(json["campaignName"], "c");
    }
}
