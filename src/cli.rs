//! CLI argument parsing using clap v4
//!
//! Without a subcommand the binary runs a campaign for the given topic.

use clap::{Args, Parser, Subcommand};

use crate::types::DistributionMode;

/// NovaMind - AI marketing content pipeline
///
/// Generates a blog post and persona newsletters for a topic, distributes
/// them, analyzes engagement and optionally regenerates the best piece.
#[derive(Parser, Debug)]
#[command(name = "novamind")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, env = "NOVAMIND_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Arguments of a campaign run
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Campaign topic; prompts interactively when omitted
    pub topic: Option<String>,

    /// Regenerate the top-performing piece after analysis
    #[arg(long)]
    pub variations: bool,

    /// Persona id to target (repeatable, defaults to all personas)
    #[arg(short, long = "persona", value_name = "ID", value_delimiter = ',')]
    pub personas: Vec<String>,

    /// Distribution mode: live or mock (defaults to [campaign].default_mode)
    #[arg(short, long)]
    pub mode: Option<DistributionMode>,
}

impl RunArgs {
    /// Requested personas, `None` meaning all of them
    pub fn persona_ids(&self) -> Option<Vec<String>> {
        if self.personas.is_empty() {
            None
        } else {
            Some(self.personas.clone())
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the configured personas
    Personas,

    /// Compare stored campaign performance per persona
    History {
        /// Campaign ids to compare (all stored campaigns when omitted)
        campaign_ids: Vec<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_topic_run() {
        let cli = Cli::parse_from(["novamind", "AI workflow automation", "--variations"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.run.topic.as_deref(), Some("AI workflow automation"));
        assert!(cli.run.variations);
        assert!(cli.run.persona_ids().is_none());
        assert!(cli.run.mode.is_none());
    }

    #[test]
    fn test_no_arguments_is_interactive_run() {
        let cli = Cli::parse_from(["novamind"]);
        assert!(cli.command.is_none());
        assert!(cli.run.topic.is_none());
        assert!(!cli.run.variations);
    }

    #[test]
    fn test_personas_and_mode() {
        let cli = Cli::parse_from([
            "novamind",
            "AI",
            "--persona",
            "founders",
            "-p",
            "creatives,operations",
            "--mode",
            "live",
        ]);
        assert_eq!(
            cli.run.persona_ids(),
            Some(vec![
                "founders".to_string(),
                "creatives".to_string(),
                "operations".to_string()
            ])
        );
        assert_eq!(cli.run.mode, Some(DistributionMode::Live));
    }

    #[test]
    fn test_invalid_mode_rejected() {
        assert!(Cli::try_parse_from(["novamind", "AI", "--mode", "carrier-pigeon"]).is_err());
    }

    #[test]
    fn test_personas_command() {
        let cli = Cli::parse_from(["novamind", "personas"]);
        assert!(matches!(cli.command, Some(Commands::Personas)));
    }

    #[test]
    fn test_history_command() {
        let cli = Cli::parse_from(["novamind", "history", "campaign_a", "campaign_b"]);
        match cli.command {
            Some(Commands::History { campaign_ids }) => {
                assert_eq!(campaign_ids, vec!["campaign_a", "campaign_b"]);
            }
            _ => panic!("Expected History command"),
        }
    }

    #[test]
    fn test_verbose_and_quiet_flags() {
        let cli = Cli::parse_from(["novamind", "-vv", "personas"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);

        let cli = Cli::parse_from(["novamind", "personas", "--quiet"]);
        assert!(cli.quiet);
    }

    #[test]
    fn test_global_config() {
        let cli = Cli::parse_from(["novamind", "config", "show", "--config", "/tmp/novamind.toml"]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/novamind.toml"));
        assert!(matches!(
            cli.command,
            Some(Commands::Config { subcommand: ConfigSubcommand::Show })
        ));
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["novamind", "config", "init", "--force"]);
        match cli.command {
            Some(Commands::Config { subcommand: ConfigSubcommand::Init { path, force } }) => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
