use crate::api_client::{Endpoint, SmartPingApi};
use crate::dto::{parse_club_players, parse_player_rating, ClubPlayer, PlayerRating, DEFAULT_RATING};
use crate::error::Result;
use crate::rate_limiter::SmartPingRateLimiter;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{info, warn};

/// Points the application already holds for a player
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CachedRating {
    pub licence_number: String,
    pub first_name: String,
    pub last_name: String,
    pub current_points: f64,
    pub previous_points: f64,
    pub season_initial_points: f64,
}

impl CachedRating {
    /// Roster entries only carry current points; they seed all three values.
    pub fn from_club_player(player: &ClubPlayer) -> Self {
        Self {
            licence_number: player.licence_number.clone(),
            first_name: player.first_name.clone(),
            last_name: player.last_name.clone(),
            current_points: player.points,
            previous_points: player.points,
            season_initial_points: player.points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RatingSource {
    Remote,
    Cached,
}

/// Rating of one player after enrichment, with its progression
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingProgress {
    pub licence_number: String,
    pub first_name: String,
    pub last_name: String,
    pub current_points: f64,
    pub previous_points: f64,
    pub season_initial_points: f64,
    pub month_delta: f64,
    pub season_delta: f64,
    /// Fetched points differ from the cached ones
    pub changed: bool,
    pub source: RatingSource,
    pub error: Option<String>,
}

impl RatingProgress {
    fn from_cache(cached: &CachedRating, error: Option<String>) -> Self {
        Self {
            licence_number: cached.licence_number.clone(),
            first_name: cached.first_name.clone(),
            last_name: cached.last_name.clone(),
            current_points: cached.current_points,
            previous_points: cached.previous_points,
            season_initial_points: cached.season_initial_points,
            month_delta: cached.current_points - cached.previous_points,
            season_delta: cached.current_points - cached.season_initial_points,
            changed: false,
            source: RatingSource::Cached,
            error,
        }
    }

    fn from_remote(cached: &CachedRating, rating: PlayerRating) -> Self {
        let changed = rating.current_points != cached.current_points
            || rating.previous_points != cached.previous_points
            || rating.season_initial_points != cached.season_initial_points;
        let month_delta = rating.month_delta();
        let season_delta = rating.season_delta();
        Self {
            licence_number: cached.licence_number.clone(),
            first_name: non_empty_or(rating.first_name, &cached.first_name),
            last_name: non_empty_or(rating.last_name, &cached.last_name),
            current_points: rating.current_points,
            previous_points: rating.previous_points,
            season_initial_points: rating.season_initial_points,
            month_delta,
            season_delta,
            changed,
            source: RatingSource::Remote,
            error: None,
        }
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

pub async fn fetch_player_rating<A: SmartPingApi>(
    api: &A,
    licence_number: &str,
    default_points: f64,
) -> Result<PlayerRating> {
    let xml = api
        .call(&Endpoint::Player, &[("licence", licence_number)])
        .await?;
    parse_player_rating(&xml, default_points)
}

pub async fn fetch_club_players<A: SmartPingApi>(api: &A, club_number: &str) -> Result<Vec<ClubPlayer>> {
    let xml = api
        .call(&Endpoint::ClubPlayers, &[("club", club_number)])
        .await?;
    parse_club_players(&xml, DEFAULT_RATING)
}

/// The `top_n` best-rated players by cached points, in descending order.
pub fn select_top_players(players: &[CachedRating], top_n: usize) -> Vec<&CachedRating> {
    let mut ranked: Vec<&CachedRating> = players.iter().collect();
    ranked.sort_by(|a, b| {
        b.current_points
            .partial_cmp(&a.current_points)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(top_n);
    ranked
}

/// Refresh the ratings of the best `top_n` cached players. A failed lookup
/// keeps the cached values and records the error.
pub async fn enrich_ratings<A: SmartPingApi>(
    api: &A,
    limiter: &SmartPingRateLimiter,
    players: &[CachedRating],
    top_n: usize,
) -> Vec<RatingProgress> {
    let selected = select_top_players(players, top_n);
    info!(
        "Enriching ratings for {} of {} players",
        selected.len(),
        players.len()
    );

    let mut progress = Vec::with_capacity(selected.len());
    for cached in selected {
        // Missing point fields fall back to what is already known
        let lookup = fetch_player_rating(api, &cached.licence_number, cached.current_points);
        match limiter.throttle_player(lookup).await {
            Ok(rating) => progress.push(RatingProgress::from_remote(cached, rating)),
            Err(err) => {
                warn!(
                    "Rating lookup for {} failed, keeping cached values: {}",
                    cached.licence_number, err
                );
                progress.push(RatingProgress::from_cache(cached, Some(err.to_string())));
            }
        }
    }
    progress
}
