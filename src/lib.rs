//! # smartping-rs
//!
//! A Rust client for the FFTT SmartPing XML API: signed requests, series
//! registration, tolerant XML extraction and the club-level aggregations a
//! club website needs (teams, pool standings, fixtures, player ratings).
//!
//! ## Quick Start
//!
//! ```no_run
//! use smartping_rs::{Config, SmartPingClient, SmartPingRateLimiter};
//! use smartping_rs::workflows::fetch_teams_with_pools;
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Load configuration from config.toml and the environment
//! let config = Config::new()?;
//!
//! // One client per process, passed to whatever needs it
//! let client = SmartPingClient::new(&config.smartping)?;
//! let limiter = SmartPingRateLimiter::new(&config.throttle);
//!
//! let report = fetch_teams_with_pools(&client, &limiter, "08830065", None).await;
//! for team in &report.teams {
//!     println!("{}: {} standings lines", team.team.label, team.standings.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Signed Requests**: `tm`/`tmc` signing (HMAC-SHA1 keyed by the MD5 of the secret)
//! - **Series Bootstrap**: generate and register a series with the federation
//! - **XML Extraction**: pattern-based field and record extraction that never fails
//! - **Aggregation**: team → pool → standings/fixtures, rating progression, batch sync
//! - **Rate Limiting**: named throttles between teams, players and batches
//!
//! ## Configuration
//!
//! Create a `config.toml` file with your SmartPing credentials:
//!
//! ```toml
//! [smartping]
//! application_id = "SX044"
//! shared_secret = "your_password"
//! series = "ABCDEFGHIJKLMNO"
//! ```
//!
//! `SMARTPING_APP_ID`, `SMARTPING_PASSWORD` and `SMARTPING_SERIE` override the
//! file, and a `.env` file is honoured.
//!
//! ## Series Registration
//!
//! ```no_run
//! use smartping_rs::{series::generate_series, Config, SmartPingClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::new()?;
//! let client = SmartPingClient::new(&config.smartping)?;
//!
//! let candidate = generate_series();
//! if client.initialize(&candidate).await? {
//!     println!("Add series = \"{candidate}\" to config.toml");
//! }
//! # Ok(())
//! # }
//! ```

pub mod api_client;
pub mod config;
pub mod dto;
pub mod error;
pub mod rate_limiter;
pub mod series;
pub mod signature;
pub mod workflows;
pub mod xml;

// Re-export commonly used types at the crate root
pub use api_client::{Endpoint, SmartPingApi, SmartPingClient};
pub use config::Config;
pub use dto::*;
pub use error::{Result, SmartPingError};
pub use rate_limiter::SmartPingRateLimiter;
pub use signature::{Credentials, SignedRequest};
