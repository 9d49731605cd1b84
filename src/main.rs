use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use tracing::{info, warn};

use prop_parlay::config::{Command, Config};
use prop_parlay::dashboard::{self, AppState};
use prop_parlay::db::Database;
use prop_parlay::feed::{HttpPropSource, JsonFilePropSource, PropSource};
use prop_parlay::models::Prop;
use prop_parlay::slip::{
    analyze_slip, build_all_slips, build_slip, detect_correlations, RiskProfile,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    match &config.command {
        Command::Build {
            props,
            feed_url,
            profile,
            save,
        } => {
            let source: Box<dyn PropSource> = match (props, feed_url) {
                (Some(path), _) => Box::new(JsonFilePropSource::new(path)),
                (None, Some(url)) => Box::new(HttpPropSource::new(url)?),
                (None, None) => anyhow::bail!("no prop source configured"),
            };
            let props = source
                .fetch_props()
                .await
                .with_context(|| format!("Failed to load props from {}", source.name()))?;
            info!("Loaded {} props from {}", props.len(), source.name());

            let slips = match profile {
                Some(name) => {
                    let profile = RiskProfile::by_name(name)?;
                    build_slip(&props, profile, config.bankroll, config.kelly_multiplier)?
                        .into_iter()
                        .collect()
                }
                None => build_all_slips(&props, config.bankroll, config.kelly_multiplier)?,
            };
            if slips.is_empty() {
                warn!("No eligible slip for the given props");
            }

            if *save {
                let db = Database::open(&config.database_path)?;
                for slip in &slips {
                    let id = db.insert_slip(slip, config.bankroll)?;
                    info!("Saved slip #{} ({})", id, slip.title);
                }
            }
            println!("{}", serde_json::to_string_pretty(&slips)?);
        }

        Command::Analyze { props } => {
            let props = load_props(props).await?;
            let active: Vec<Prop> = props.into_iter().filter(|p| p.is_active).collect();
            let warnings = detect_correlations(&active);
            for w in &warnings {
                warn!("[{:?}] {}", w.severity, w.description);
            }
            if active.is_empty() {
                warn!("No active props to price");
                println!("{}", serde_json::to_string_pretty(&warnings)?);
            } else {
                let analysis = analyze_slip(&active, config.bankroll, config.kelly_multiplier)?;
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            }
        }

        Command::Serve { addr } => {
            let db = Database::open(&config.database_path)?;
            info!("Database opened: {}", config.database_path);

            let app = dashboard::router(AppState {
                db,
                bankroll: config.bankroll,
                kelly_multiplier: config.kelly_multiplier,
            });
            let addr: SocketAddr = addr.parse()?;
            info!("Slip API listening on http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

async fn load_props(path: &Path) -> Result<Vec<Prop>> {
    let source = JsonFilePropSource::new(path);
    let props = source.fetch_props().await?;
    info!("Loaded {} props from {}", props.len(), source.name());
    Ok(props)
}
