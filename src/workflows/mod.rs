//! Multi-call aggregations built on [`SmartPingApi`](crate::api_client::SmartPingApi).
//!
//! Calls inside a workflow are awaited one after another and paced by a
//! [`SmartPingRateLimiter`](crate::rate_limiter::SmartPingRateLimiter).
//! Failures are recorded per item; a workflow never gives up on the remaining
//! items because one of them failed.

pub mod ratings;
pub mod sync;
pub mod teams;

pub use ratings::{
    enrich_ratings, fetch_club_players, fetch_player_rating, select_top_players, CachedRating,
    RatingProgress, RatingSource,
};
pub use sync::{
    sync_club_roster, sync_in_batches, sync_player_ratings, sync_team_pools, SyncOutcome,
    SyncReport,
};
pub use teams::{
    fetch_club_teams, fetch_pool_fixtures, fetch_pool_standings, fetch_team_pool,
    fetch_teams_with_pools, load_team_pool, ClubTeamsReport, TeamKind, TeamPool, TeamPoolReport,
};
