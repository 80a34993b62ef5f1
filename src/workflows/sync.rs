use super::ratings::{fetch_club_players, fetch_player_rating};
use super::teams::{load_team_pool, TeamPool};
use crate::api_client::SmartPingApi;
use crate::dto::{PlayerRating, Team, DEFAULT_RATING};
use crate::error::Result;
use crate::rate_limiter::SmartPingRateLimiter;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, info, warn};

/// Result for one record of a batch run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome<T> {
    pub key: String,
    /// Zero-based index of the batch the record was processed in
    pub batch: usize,
    pub value: Option<T>,
    pub error: Option<String>,
}

impl<T> SyncOutcome<T> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport<T> {
    pub batches: usize,
    pub outcomes: Vec<SyncOutcome<T>>,
}

impl<T> SyncReport<T> {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncOutcome<T>> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.outcomes.iter().filter_map(|o| o.value.as_ref())
    }
}

/// Run `op` over `items` in batches of `batch_size`, pausing on the batch
/// throttle after each batch. Every item gets an outcome; errors never stop
/// the run.
pub async fn sync_in_batches<'a, I, T, K, F, Fut>(
    items: &'a [I],
    batch_size: usize,
    limiter: &SmartPingRateLimiter,
    key: K,
    op: F,
) -> SyncReport<T>
where
    K: Fn(&I) -> String,
    F: Fn(&'a I) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let batch_size = batch_size.max(1);
    let mut outcomes = Vec::with_capacity(items.len());
    let mut batches = 0;

    for (batch, chunk) in items.chunks(batch_size).enumerate() {
        let results = limiter
            .throttle_batch(async {
                debug!("Sync batch {} ({} records)", batch + 1, chunk.len());
                let mut results = Vec::with_capacity(chunk.len());
                for item in chunk {
                    results.push((key(item), op(item).await));
                }
                results
            })
            .await;
        batches += 1;

        for (key, result) in results {
            match result {
                Ok(value) => outcomes.push(SyncOutcome {
                    key,
                    batch,
                    value: Some(value),
                    error: None,
                }),
                Err(err) => {
                    warn!("Sync of {} failed: {}", key, err);
                    outcomes.push(SyncOutcome {
                        key,
                        batch,
                        value: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }
    }

    let report = SyncReport { batches, outcomes };
    info!(
        "Sync finished: {} batches, {} ok, {} failed",
        report.batches,
        report.succeeded(),
        report.failed()
    );
    report
}

pub async fn sync_player_ratings<A: SmartPingApi>(
    api: &A,
    limiter: &SmartPingRateLimiter,
    licences: &[String],
    batch_size: usize,
) -> SyncReport<PlayerRating> {
    sync_in_batches(
        licences,
        batch_size,
        limiter,
        |licence| licence.clone(),
        |licence| fetch_player_rating(api, licence, DEFAULT_RATING),
    )
    .await
}

/// Fetch a club's roster and refresh every player's rating. Fails only when
/// the roster itself cannot be fetched.
pub async fn sync_club_roster<A: SmartPingApi>(
    api: &A,
    limiter: &SmartPingRateLimiter,
    club_number: &str,
    batch_size: usize,
) -> Result<SyncReport<PlayerRating>> {
    let roster = fetch_club_players(api, club_number).await?;
    info!("Club {}: syncing {} players", club_number, roster.len());

    let licences: Vec<String> = roster
        .into_iter()
        .map(|player| player.licence_number)
        .collect();
    Ok(sync_player_ratings(api, limiter, &licences, batch_size).await)
}

pub async fn sync_team_pools<A: SmartPingApi>(
    api: &A,
    limiter: &SmartPingRateLimiter,
    teams: &[Team],
    batch_size: usize,
) -> SyncReport<TeamPool> {
    sync_in_batches(
        teams,
        batch_size,
        limiter,
        |team| team.label.clone(),
        |team| load_team_pool(api, team),
    )
    .await
}
