use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::slip::RiskProfile;

/// Correlation-aware player-prop parlay builder
#[derive(Parser, Debug, Clone)]
#[command(name = "prop-parlay", version, about)]
pub struct Config {
    /// Bankroll used to size stakes (USD)
    #[arg(long, env = "BANKROLL", default_value = "100.0", global = true)]
    pub bankroll: f64,

    /// Fractional Kelly multiplier (0.0–1.0)
    #[arg(long, env = "KELLY_MULTIPLIER", default_value = "0.25", global = true)]
    pub kelly_multiplier: f64,

    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "slips.db", global = true)]
    pub database_path: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build slips from a prop snapshot and print them as JSON
    Build {
        /// JSON file holding the prop snapshot
        #[arg(long, conflicts_with = "feed_url")]
        props: Option<PathBuf>,

        /// HTTP endpoint serving the prop snapshot
        #[arg(long, env = "PROPS_FEED_URL")]
        feed_url: Option<String>,

        /// Build for a single risk profile instead of all three
        #[arg(long)]
        profile: Option<String>,

        /// Persist generated slips to the database
        #[arg(long)]
        save: bool,
    },

    /// Report correlations among props and price them as one manual slip
    Analyze {
        /// JSON file holding the props
        #[arg(long)]
        props: PathBuf,
    },

    /// Serve the JSON API
    Serve {
        /// Listen address
        #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080")]
        addr: String,
    },
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.bankroll.is_finite() || self.bankroll <= 0.0 {
            anyhow::bail!("bankroll must be positive");
        }
        if !(0.0..=1.0).contains(&self.kelly_multiplier) {
            anyhow::bail!("kelly_multiplier must be between 0.0 and 1.0");
        }
        if let Command::Build {
            props,
            feed_url,
            profile,
            ..
        } = &self.command
        {
            if props.is_none() && feed_url.is_none() {
                anyhow::bail!("build needs --props <file> or --feed-url <url>");
            }
            if let Some(name) = profile {
                RiskProfile::by_name(name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("prop-parlay").chain(args.iter().copied()))
            .expect("args should parse")
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["serve"]);
        assert_eq!(config.bankroll, 100.0);
        assert_eq!(config.kelly_multiplier, 0.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_requires_a_source() {
        let config = parse(&["build"]);
        assert!(config.validate().is_err());
        let config = parse(&["build", "--props", "props.json", "--profile", "balanced"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_profile() {
        let config = parse(&["build", "--props", "props.json", "--profile", "yolo"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let config = parse(&["--bankroll", "0", "serve"]);
        assert!(config.validate().is_err());
        let config = parse(&["serve", "--kelly-multiplier", "1.5"]);
        assert!(config.validate().is_err());
    }
}
