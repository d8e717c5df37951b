//! NovaMind - AI marketing content pipeline
//!
//! Entry point for the `novamind` binary. Runs a campaign for a topic, lists
//! personas, compares stored campaigns and manages configuration.

mod analyzer;
mod cli;
mod config;
mod distribution;
mod error;
mod generation;
mod logging;
mod orchestrator;
mod persona;
mod store;
mod types;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use crate::analyzer::{compare_campaigns, persona_trends};
use crate::cli::{Cli, Commands, ConfigSubcommand, RunArgs};
use crate::config::PipelineConfig;
use crate::distribution::{validate_key, HubSpotDistributor};
use crate::error::{Error, Result};
use crate::orchestrator::CampaignOrchestrator;
use crate::persona::PersonaCatalog;
use crate::store::{ArtifactStore, FileStore};
use crate::types::{CampaignRecord, DistributionMode};

const REDACTED: &str = "********";

fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        if let Some(record) = e.campaign_record() {
            eprintln!(
                "Partial campaign record kept: {} (status {})",
                record.campaign_id, record.status
            );
        }
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    // `config init` must work without a loadable configuration
    if let Some(Commands::Config {
        subcommand: ConfigSubcommand::Init { path, force },
    }) = &cli.command
    {
        let created = config::init_config(path.as_deref(), *force)?;
        println!("Created configuration file: {}", created.display());
        return Ok(());
    }

    let config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Config { subcommand }) => handle_config_command(subcommand, &config),
        Some(Commands::Personas) => {
            let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;
            list_personas(&config)
        }
        Some(Commands::History { campaign_ids }) => {
            let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;
            show_history(&config, campaign_ids)
        }
        None => {
            let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;
            run_campaign(&config, cli.run)
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Campaign
// ─────────────────────────────────────────────────────────────────

fn run_campaign(config: &PipelineConfig, args: RunArgs) -> Result<()> {
    let (topic, variations) = match args.topic.clone() {
        Some(topic) => (topic, args.variations),
        None => prompt_campaign(args.variations)
            .map_err(|e| Error::Internal(format!("Interactive input failed: {:#}", e)))?,
    };

    let mode = args.mode.unwrap_or(config.campaign.default_mode);
    let catalog = PersonaCatalog::from_config(&config.personas)?;
    let generator = generation::from_settings(&config.openai)?;
    let store = Arc::new(FileStore::new(config.data_dir()));

    let mut orchestrator = CampaignOrchestrator::new(config, catalog, generator, store.clone());
    if mode == DistributionMode::Live {
        match HubSpotDistributor::new(&config.hubspot) {
            Ok(live) => orchestrator = orchestrator.with_live_distributor(Arc::new(live)),
            Err(e) => warn!(error = %e, "Live distribution unavailable"),
        }
    }

    info!(data_dir = %config.data_dir().display(), mode = %mode, "Running campaign");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    let record = runtime.block_on(orchestrator.run_campaign(
        &topic,
        args.persona_ids(),
        mode,
        variations,
    ))?;

    print_campaign(&record, &store);
    Ok(())
}

/// Ask for the topic and the variation choice on stdin
fn prompt_campaign(variations_flag: bool) -> anyhow::Result<(String, bool)> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout();

    print!("Campaign topic: ");
    stdout.flush().context("Failed to write prompt")?;
    let topic = lines
        .next()
        .transpose()
        .context("Failed to read topic")?
        .unwrap_or_default();

    if variations_flag || topic.trim().is_empty() {
        return Ok((topic, variations_flag));
    }

    print!("Generate an improved variation of the best piece? [y/N]: ");
    stdout.flush().context("Failed to write prompt")?;
    let answer = lines
        .next()
        .transpose()
        .context("Failed to read answer")?
        .unwrap_or_default();

    let variations = matches!(answer.trim().to_lowercase().as_str(), "y" | "yes");
    Ok((topic, variations))
}

fn print_campaign(record: &CampaignRecord, store: &FileStore) {
    println!("Campaign {} {}", record.campaign_id, record.status);
    println!("  Topic:    {}", record.topic);
    println!("  Personas: {}", record.persona_ids.join(", "));
    println!("  Mode:     {}", record.distribution_mode);

    println!();
    println!("Content:");
    for piece in &record.content {
        let parent = match piece.parent_variant_id.as_deref() {
            Some(source) if piece.is_variation() => format!("  (variation of {})", source),
            _ => String::new(),
        };
        println!(
            "  {}  {:<10} {:<11} {:>4} words  {}{}",
            piece.id,
            piece.kind.to_string(),
            piece.audience(),
            piece.word_count,
            piece.title,
            parent
        );
    }

    for summary in &record.performance {
        println!();
        println!("Performance (pass {}):", summary.pass);
        for (rank, content_id) in summary.ranking.iter().enumerate() {
            if let Some(m) = summary.metrics_for(content_id) {
                println!(
                    "  #{} {}  {:<11} delivered {:>4}  opened {:>4}  clicked {:>4}  open {:>6}  click {:>6}",
                    rank + 1,
                    m.content_id,
                    m.persona_id.as_deref().unwrap_or(types::GENERAL_AUDIENCE),
                    m.counts.delivered,
                    m.counts.opened,
                    m.counts.clicked,
                    m.open_rate.to_string(),
                    m.click_rate.to_string(),
                );
            }
        }
        for content_id in &summary.unranked {
            println!("  -- {}  no deliveries", content_id);
        }
        println!("  Insight ({}): {}", summary.insight_source, summary.insight);
    }

    if !record.skipped.is_empty() {
        println!();
        println!("Skipped:");
        for slot in &record.skipped {
            println!(
                "  {} {} ({} after {} attempts)",
                slot.kind,
                slot.persona_id.as_deref().unwrap_or(types::GENERAL_AUDIENCE),
                slot.reason,
                slot.attempts
            );
        }
    }

    for improvement in &record.improvements {
        println!();
        println!(
            "Improvement: {} -> {}",
            improvement.source_content_id, improvement.new_content_id
        );
    }

    println!();
    println!("Artifacts: {}", store.campaign_dir(&record.campaign_id).display());
}

// ─────────────────────────────────────────────────────────────────
// Personas & History
// ─────────────────────────────────────────────────────────────────

fn list_personas(config: &PipelineConfig) -> Result<()> {
    let catalog = PersonaCatalog::from_config(&config.personas)?;
    println!("Personas ({}):", catalog.len());
    for persona in catalog.all() {
        println!("{}", persona);
        println!("    focus: {}", persona.focus_list());
        println!("    tone:  {}", persona.tone);
    }
    Ok(())
}

fn show_history(config: &PipelineConfig, campaign_ids: Vec<String>) -> Result<()> {
    let store = FileStore::new(config.data_dir());
    let ids = if campaign_ids.is_empty() {
        store.list_campaigns()?
    } else {
        campaign_ids
    };

    if ids.is_empty() {
        println!("No stored campaigns in {}", config.data_dir().display());
        return Ok(());
    }

    let mut summaries = Vec::new();
    println!("Campaigns:");
    for id in &ids {
        let log = store.load_campaign(id)?;
        let passes = store.load_performance(id)?;
        println!(
            "  {}  {:<12} {:<5} passes {}  {}",
            log.campaign_id,
            log.status.to_string(),
            log.mode.to_string(),
            passes.len(),
            log.topic
        );
        summaries.extend(passes);
    }

    let rows = compare_campaigns(&summaries);
    let trends = persona_trends(&rows);

    println!();
    println!("Persona trends:");
    println!(
        "  {:<12} {:>9} {:>6} {:>9} {:>7} {:>7} {:>7} {:>7} {:>7}",
        "audience", "campaigns", "pieces", "delivered", "opened", "clicked", "open", "click", "unsub"
    );
    for trend in &trends {
        println!(
            "  {:<12} {:>9} {:>6} {:>9} {:>7} {:>7} {:>7} {:>7} {:>7}",
            trend.audience,
            trend.campaigns,
            trend.pieces,
            trend.totals.delivered,
            trend.totals.opened,
            trend.totals.clicked,
            trend.open_rate.to_string(),
            trend.click_rate.to_string(),
            trend.unsubscribe_rate.to_string(),
        );
    }

    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────

fn handle_config_command(subcommand: ConfigSubcommand, config: &PipelineConfig) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let mut shown = config.clone();
            redact(&mut shown.openai.api_key);
            redact(&mut shown.hubspot.api_key);
            println!("{}", toml::to_string_pretty(&shown)?);
        }
        ConfigSubcommand::Validate => {
            println!("Configuration is valid.");
            if config.openai.api_key.trim().is_empty() {
                println!("  Text generation:   offline templates (no OpenAI API key)");
            } else {
                println!("  Text generation:   {} via {}", config.openai.model, config.openai.base_url);
            }
            match validate_key(&config.hubspot.api_key) {
                Ok(()) => println!("  Live distribution: HubSpot key present"),
                Err(e) => println!("  Live distribution: unavailable, falls back to mock ({})", e),
            }
            println!("  Data directory:    {}", config.data_dir().display());
        }
        ConfigSubcommand::Init { .. } => {
            return Err(Error::Internal("config init is handled before loading".into()));
        }
    }

    Ok(())
}

fn redact(value: &mut String) {
    if !value.is_empty() {
        *value = REDACTED.to_string();
    }
}
