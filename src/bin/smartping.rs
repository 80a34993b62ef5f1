use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use smartping_rs::series::generate_series;
use smartping_rs::workflows::{
    enrich_ratings, fetch_player_rating, fetch_teams_with_pools, sync_club_roster, CachedRating,
    TeamKind,
};
use smartping_rs::{Config, Endpoint, SmartPingClient, SmartPingRateLimiter, DEFAULT_RATING};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "smartping")]
#[command(about = "FFTT SmartPing API client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a series and register it with the federation
    Init {
        /// Register this series instead of generating one
        #[arg(long)]
        series: Option<String>,
    },
    /// Issue one signed call and print the raw XML
    Call {
        /// Resource name, e.g. xml_club_detail
        endpoint: String,
        /// Parameters as key=value
        params: Vec<String>,
    },
    /// Club teams with their pool standings and fixtures
    Teams {
        /// Club number, e.g. 08830065
        club: String,
        /// M or F
        #[arg(short, long)]
        kind: Option<TeamKind>,
    },
    /// Rating of a single player
    Player {
        licence: String,
    },
    /// Refresh the ratings of a club's whole roster in batches
    Roster {
        club: String,
    },
    /// Compare cached ratings (JSON file) with live ones for the top players
    Progress {
        /// JSON array of cached ratings
        file: PathBuf,
        /// Number of players to look up (defaults to throttle.rating_top_n)
        #[arg(short, long)]
        top: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::new()?;
    let client = SmartPingClient::new(&config.smartping)?;
    let limiter = SmartPingRateLimiter::new(&config.throttle);

    match cli.command {
        Commands::Init { series } => {
            let candidate = series.unwrap_or_else(generate_series);
            info!("Registering series {}", candidate);
            if client.initialize(&candidate).await? {
                println!("Series accepted. Persist it as SMARTPING_SERIE={candidate}");
            } else {
                warn!("Series rejected; run init again to try a new one");
                std::process::exit(1);
            }
        }
        Commands::Call { endpoint, params } => {
            let pairs = parse_params(&params)?;
            let borrowed: Vec<(&str, &str)> = pairs
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            let xml = client.call(&Endpoint::custom(&endpoint), &borrowed).await?;
            println!("{xml}");
        }
        Commands::Teams { club, kind } => {
            let report = fetch_teams_with_pools(&client, &limiter, &club, kind).await;
            print_json(&report)?;
        }
        Commands::Player { licence } => {
            let rating = fetch_player_rating(&client, &licence, DEFAULT_RATING).await?;
            print_json(&rating)?;
        }
        Commands::Roster { club } => {
            let report =
                sync_club_roster(&client, &limiter, &club, config.throttle.batch_size).await?;
            print_json(&report)?;
        }
        Commands::Progress { file, top } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let cached: Vec<CachedRating> = serde_json::from_str(&raw)?;
            let top_n = top.unwrap_or(config.throttle.rating_top_n);
            let progress = enrich_ratings(&client, &limiter, &cached, top_n).await;
            print_json(&progress)?;
        }
    }

    Ok(())
}

fn parse_params(params: &[String]) -> Result<Vec<(String, String)>> {
    params
        .iter()
        .map(|param| {
            param
                .split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .with_context(|| format!("parameter '{param}' is not key=value"))
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
