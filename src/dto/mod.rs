pub mod club;
pub mod player;
pub mod pool;
pub mod team;

use crate::api_client::Endpoint;
use crate::error::{Result, SmartPingError};
use crate::xml::remote_error;

// Re-export commonly used types for convenience
pub use club::{parse_club_players, ClubPlayer};
pub use player::{parse_player_rating, PlayerRating};
pub use pool::{parse_fixtures, parse_standings, Fixture, PoolStanding};
pub use team::{parse_teams, DivisionLink, Team};

/// Rating used when the remote service has no points for a player
pub const DEFAULT_RATING: f64 = 500.0;

/// Reject a response carrying the endpoint's error marker.
pub fn check_response(endpoint: &Endpoint, xml: &str) -> Result<()> {
    match remote_error(xml, endpoint.error_marker()) {
        Some(message) => Err(SmartPingError::remote(endpoint.resource(), message)),
        None => Ok(()),
    }
}
