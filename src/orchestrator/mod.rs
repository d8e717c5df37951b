//! Campaign orchestration
//!
//! Sequences the campaign lifecycle:
//! - Generating a blog and per-persona newsletters
//! - Distributing every piece and collecting outcomes
//! - Analyzing performance and writing the insight
//! - Optionally regenerating the top piece as a variation

mod runner;
mod state;

pub use runner::CampaignOrchestrator;
