//! Performance analyzer
//!
//! Turns engagement outcomes into per-piece rates, a total ranking, the
//! structured inputs for a qualitative insight, and cross-campaign trends.

mod aggregate;
mod history;
mod insight;

pub use aggregate::analyze;
pub use history::{compare_campaigns, persona_trends};
pub use insight::{fallback_insight, insight_request, InsightRequest};
