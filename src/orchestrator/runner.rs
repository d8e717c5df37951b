//! Campaign runner
//!
//! Drives one campaign through generation, distribution, analysis and the
//! optional variation pass, persisting the record after every transition.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::analyzer::{analyze, fallback_insight, insight_request};
use crate::config::PipelineConfig;
use crate::distribution::{Audience, Distributor, MockDistributor};
use crate::error::{Error, Result};
use crate::generation::{ContentGenerator, GeneratedContent};
use crate::persona::{Persona, PersonaCatalog};
use crate::store::ArtifactStore;
use crate::types::{
    CampaignRecord, CampaignStatus, ContentPiece, DistributionMode, EngagementOutcome, FailureReason,
    Improvement, InsightSource, PerformanceSummary, SlotFailure,
};

use super::state::{Persisted, Slot, MAX_GENERATION_ATTEMPTS};

/// Pass number of the initial analysis
const FIRST_PASS: u32 = 1;

// ─────────────────────────────────────────────────────────────────
// Campaign Orchestrator
// ─────────────────────────────────────────────────────────────────

/// Runs campaigns against the configured ports
pub struct CampaignOrchestrator {
    catalog: PersonaCatalog,
    generator: Arc<dyn ContentGenerator>,
    mock: Arc<dyn Distributor>,
    live: Option<Arc<dyn Distributor>>,
    store: Arc<dyn ArtifactStore>,
}

impl CampaignOrchestrator {
    /// Create an orchestrator with mock distribution only
    pub fn new(
        config: &PipelineConfig,
        catalog: PersonaCatalog,
        generator: Arc<dyn ContentGenerator>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            catalog,
            generator,
            mock: Arc::new(MockDistributor::new(config.mock.clone())),
            live: None,
            store,
        }
    }

    /// Attach the distributor used when live mode is requested
    pub fn with_live_distributor(mut self, distributor: Arc<dyn Distributor>) -> Self {
        self.live = Some(distributor);
        self
    }

    /// Run one campaign end to end.
    ///
    /// Input errors are returned before any record exists. Once the record
    /// exists, a terminal error marks it failed and is returned as
    /// [`Error::CampaignFailed`] carrying the partial record.
    pub async fn run_campaign(
        &self,
        topic: &str,
        persona_ids: Option<Vec<String>>,
        mode: DistributionMode,
        generate_variations: bool,
    ) -> Result<CampaignRecord> {
        let (topic, persona_ids) = self.validate(topic, persona_ids)?;

        let mut record = CampaignRecord::new(topic, persona_ids);
        record.distribution_mode = mode;
        let mut persisted = Persisted::default();

        info!(
            campaign_id = %record.campaign_id,
            topic = %record.topic,
            personas = ?record.persona_ids,
            mode = %mode,
            variations = generate_variations,
            "Starting campaign"
        );

        match self.execute(&mut record, &mut persisted, generate_variations).await {
            Ok(()) => {
                info!(
                    campaign_id = %record.campaign_id,
                    status = %record.status,
                    pieces = record.content.len(),
                    outcomes = record.outcomes.len(),
                    skipped = record.skipped.len(),
                    "Campaign completed"
                );
                Ok(record)
            }
            Err(e) => {
                record.fail(&e);
                error!(
                    campaign_id = %record.campaign_id,
                    status = %record.status,
                    error = %e.format_for_log(),
                    "Campaign failed"
                );
                if let Err(persist_err) = self.persist(&record, &mut persisted) {
                    if e.is_persistence() {
                        debug!(
                            campaign_id = %record.campaign_id,
                            error = %persist_err.format_for_log(),
                            "Artifact store still unavailable"
                        );
                    } else {
                        warn!(
                            campaign_id = %record.campaign_id,
                            error = %persist_err.format_for_log(),
                            "Could not persist failed status"
                        );
                    }
                }
                Err(Error::campaign_failed(record, e))
            }
        }
    }

    /// Check the topic and resolve the persona list
    fn validate(&self, topic: &str, persona_ids: Option<Vec<String>>) -> Result<(String, Vec<String>)> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(Error::validation("topic must not be empty"));
        }

        let requested = persona_ids.unwrap_or_else(|| self.catalog.ids());
        if requested.is_empty() {
            return Err(Error::validation("at least one persona is required"));
        }

        let mut resolved: Vec<String> = Vec::with_capacity(requested.len());
        for id in requested {
            let id = id.trim();
            if !self.catalog.contains(id) {
                return Err(Error::PersonaNotFound {
                    persona_id: id.to_string(),
                });
            }
            if !resolved.iter().any(|r| r == id) {
                resolved.push(id.to_string());
            }
        }

        Ok((topic.to_string(), resolved))
    }

    // ─────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────

    async fn execute(
        &self,
        record: &mut CampaignRecord,
        persisted: &mut Persisted,
        generate_variations: bool,
    ) -> Result<()> {
        self.persist(record, persisted)?;

        self.transition(record, persisted, CampaignStatus::Generating)?;
        self.generate_initial(record).await?;
        if record.content.is_empty() {
            return Err(Error::generation(format!(
                "no content could be generated ({} slots failed)",
                record.skipped.len()
            )));
        }

        self.transition(record, persisted, CampaignStatus::Distributing)?;
        let mut distributor = self.select_distributor(record);
        for content_id in record.content_ids() {
            self.distribute_piece(record, &mut distributor, &content_id).await?;
        }

        self.transition(record, persisted, CampaignStatus::Analyzing)?;
        let summary = self
            .analysis_pass(record, FIRST_PASS, &record.content, &record.outcomes)
            .await;
        record.performance.push(summary);
        self.persist(record, persisted)?;

        if generate_variations {
            self.transition(record, persisted, CampaignStatus::VariationRegenerating)?;
            self.variation_pass(record, &mut distributor).await?;
            self.persist(record, persisted)?;
        }

        self.transition(record, persisted, CampaignStatus::Completed)
    }

    /// Advance the record and persist it
    fn transition(
        &self,
        record: &mut CampaignRecord,
        persisted: &mut Persisted,
        next: CampaignStatus,
    ) -> Result<()> {
        record.advance(next)?;
        info!(campaign_id = %record.campaign_id, status = %next, "Campaign status changed");
        self.persist(record, persisted)
    }

    // ─────────────────────────────────────────────────────────────
    // Generation
    // ─────────────────────────────────────────────────────────────

    /// One blog for the topic, then one newsletter per requested persona
    async fn generate_initial(&self, record: &mut CampaignRecord) -> Result<()> {
        let personas: Vec<Persona> = record
            .persona_ids
            .iter()
            .map(|id| self.catalog.get(id).cloned())
            .collect::<Result<_>>()?;

        let topic = record.topic.clone();
        let mut slots = vec![Slot::Blog];
        slots.extend(personas.iter().map(Slot::Newsletter));

        for slot in slots {
            match self.generate_slot(&topic, &slot, &record.campaign_id).await {
                Ok(generated) => {
                    let piece = ContentPiece::new(
                        record.campaign_id.clone(),
                        slot.persona_id(),
                        slot.kind(),
                        generated.title,
                        generated.body,
                        record.next_sequence(),
                    );
                    log_generated(&piece);
                    record.add_content(piece)?;
                }
                Err((e, attempts)) => record.skipped.push(skip_entry(&slot, e, attempts)),
            }
        }

        Ok(())
    }

    /// Ask the generator for a slot, retrying retryable failures once
    async fn generate_slot(
        &self,
        topic: &str,
        slot: &Slot<'_>,
        campaign_id: &str,
    ) -> std::result::Result<GeneratedContent, (Error, u32)> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = match slot {
                Slot::Blog => self.generator.generate_blog(topic).await,
                Slot::Newsletter(persona) => self.generator.generate_newsletter(topic, persona).await,
                Slot::Variation { source, feedback } => {
                    self.generator.generate_variation(source, feedback).await
                }
            };

            match result {
                Ok(generated) => return Ok(generated),
                Err(e) if e.is_retryable() && attempt < MAX_GENERATION_ATTEMPTS => {
                    warn!(
                        campaign_id,
                        slot = %slot,
                        attempt,
                        error = %e,
                        "Generation failed, retrying"
                    );
                }
                Err(e) => {
                    warn!(
                        campaign_id,
                        slot = %slot,
                        attempts = attempt,
                        error = %e,
                        "Generation failed, skipping slot"
                    );
                    return Err((e, attempt));
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Distribution
    // ─────────────────────────────────────────────────────────────

    /// Distributor for this run, recording the effective mode
    fn select_distributor(&self, record: &mut CampaignRecord) -> Arc<dyn Distributor> {
        match (record.distribution_mode, &self.live) {
            (DistributionMode::Live, Some(live)) => live.clone(),
            (DistributionMode::Live, None) => {
                warn!(
                    campaign_id = %record.campaign_id,
                    "No live distributor configured, falling back to mock"
                );
                record.distribution_mode = DistributionMode::Mock;
                self.mock.clone()
            }
            (DistributionMode::Mock, _) => self.mock.clone(),
        }
    }

    /// Deliver one piece and record its outcome.
    ///
    /// A distribution error from the live distributor switches the rest of
    /// the run to mock.
    async fn distribute_piece(
        &self,
        record: &mut CampaignRecord,
        distributor: &mut Arc<dyn Distributor>,
        content_id: &str,
    ) -> Result<()> {
        let piece = record
            .piece(content_id)
            .cloned()
            .ok_or_else(|| Error::Internal(format!("Unknown content {}", content_id)))?;
        let audience = Audience::for_piece(&piece, &record.persona_ids);

        let outcome = match distributor.distribute(&piece, &audience).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_distribution() && distributor.mode() == DistributionMode::Live => {
                warn!(
                    campaign_id = %record.campaign_id,
                    content_id = %piece.id,
                    persona = %audience.key,
                    error = %e,
                    "Live distribution failed, falling back to mock"
                );
                *distributor = self.mock.clone();
                record.distribution_mode = DistributionMode::Mock;
                distributor.distribute(&piece, &audience).await?
            }
            Err(e) => return Err(e),
        };

        info!(
            campaign_id = %record.campaign_id,
            content_id = %piece.id,
            persona = %audience.key,
            mode = %outcome.mode,
            delivered = outcome.counts.delivered,
            opened = outcome.counts.opened,
            clicked = outcome.counts.clicked,
            "Content distributed"
        );
        record.add_outcome(outcome)
    }

    // ─────────────────────────────────────────────────────────────
    // Analysis
    // ─────────────────────────────────────────────────────────────

    /// Analyze a set of pieces and fill in the insight text
    async fn analysis_pass(
        &self,
        record: &CampaignRecord,
        pass: u32,
        pieces: &[ContentPiece],
        outcomes: &[EngagementOutcome],
    ) -> PerformanceSummary {
        let mut summary = analyze(&record.campaign_id, pass, pieces, outcomes);
        let request = insight_request(&record.topic, &summary, pieces, &self.catalog);

        match self.generator.write_insight(&request).await {
            Ok(text) if !text.trim().is_empty() => {
                summary.insight = text.trim().to_string();
                summary.insight_source = InsightSource::Generated;
            }
            Ok(_) => {
                summary.insight = fallback_insight(&request);
                summary.insight_source = InsightSource::Fallback;
            }
            Err(e) => {
                debug!(campaign_id = %record.campaign_id, pass, error = %e, "Using fallback insight");
                summary.insight = fallback_insight(&request);
                summary.insight_source = InsightSource::Fallback;
            }
        }

        info!(
            campaign_id = %record.campaign_id,
            pass,
            top = ?summary.top(),
            ranked = summary.ranking.len(),
            unranked = summary.unranked.len(),
            insight_source = ?summary.insight_source,
            "Performance analyzed"
        );
        summary
    }

    /// Regenerate the top piece with the latest insight, then distribute and
    /// analyze the variant on its own
    async fn variation_pass(
        &self,
        record: &mut CampaignRecord,
        distributor: &mut Arc<dyn Distributor>,
    ) -> Result<()> {
        let Some(summary) = record.latest_summary() else {
            return Err(Error::Internal("variation requested before analysis".into()));
        };
        let Some(top_id) = summary.top().map(str::to_string) else {
            warn!(
                campaign_id = %record.campaign_id,
                "No ranked content to improve, skipping variation"
            );
            return Ok(());
        };
        let feedback = summary.insight.clone();
        let source = record
            .piece(&top_id)
            .cloned()
            .ok_or_else(|| Error::Internal(format!("Ranked content {} is not in the record", top_id)))?;

        let slot = Slot::Variation {
            source: &source,
            feedback: &feedback,
        };
        let topic = record.topic.clone();
        let generated = match self.generate_slot(&topic, &slot, &record.campaign_id).await {
            Ok(generated) => generated,
            Err((e, attempts)) => {
                record.skipped.push(skip_entry(&slot, e, attempts));
                return Ok(());
            }
        };

        let variant = source.variation(generated.title, generated.body, record.next_sequence());
        let variant_id = variant.id.clone();
        log_generated(&variant);
        record.add_content(variant.clone())?;

        self.distribute_piece(record, distributor, &variant_id).await?;

        let outcomes: Vec<_> = record.outcomes_for(&variant_id).cloned().collect();
        let pass = record.performance.len() as u32 + 1;
        let summary = self
            .analysis_pass(record, pass, std::slice::from_ref(&variant), &outcomes)
            .await;
        record.performance.push(summary);

        record.improvements.push(Improvement {
            campaign_id: record.campaign_id.clone(),
            source_content_id: source.id.clone(),
            new_content_id: variant_id.clone(),
            feedback_used: feedback,
        });
        info!(
            campaign_id = %record.campaign_id,
            content_id = %variant_id,
            source = %source.id,
            "Variation recorded"
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────

    /// Write every artifact not yet on disk, then the campaign log
    fn persist(&self, record: &CampaignRecord, persisted: &mut Persisted) -> Result<()> {
        for piece in persisted.pending_content(record) {
            self.store.save_content(piece)?;
            persisted.mark_content(&piece.id);
        }

        for outcome in &record.outcomes {
            if !persisted.has_outcome(&outcome.id) {
                self.store.save_outcome(&record.campaign_id, outcome)?;
                persisted.mark_outcome(&outcome.id);
            }
        }

        for summary in &record.performance {
            if !persisted.has_pass(summary.pass) {
                self.store.save_performance(summary)?;
                self.store.save_summary(summary)?;
                persisted.mark_pass(summary.pass);
            }
        }

        if persisted.improvements_pending(record) {
            self.store.save_improvements(&record.campaign_id, &record.improvements)?;
            persisted.mark_improvements(record.improvements.len());
        }

        self.store.save_campaign(record)?;
        debug!(
            campaign_id = %record.campaign_id,
            status = %record.status,
            pieces = persisted.content_count(),
            "Campaign persisted"
        );
        Ok(())
    }
}

fn skip_entry(slot: &Slot<'_>, error: Error, attempts: u32) -> SlotFailure {
    SlotFailure {
        kind: slot.kind(),
        persona_id: slot.persona_id(),
        parent_content_id: slot.parent_content_id(),
        reason: FailureReason::GenerationFailed,
        attempts,
        error: error.format_for_log(),
    }
}

fn log_generated(piece: &ContentPiece) {
    let (min, max) = piece.kind.word_range();
    if piece.word_count < min || piece.word_count > max {
        debug!(
            content_id = %piece.id,
            words = piece.word_count,
            min,
            max,
            "Generated length outside nominal range"
        );
    }
    info!(
        campaign_id = %piece.campaign_id,
        content_id = %piece.id,
        persona = %piece.audience(),
        kind = %piece.kind,
        words = piece.word_count,
        "Content generated"
    );
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
