use super::check_response;
use crate::api_client::Endpoint;
use crate::error::{Result, SmartPingError};
use crate::xml::{extract_records, field_f64, field_string};
use serde::{Deserialize, Serialize};

/// A player's federation rating as returned by `xml_joueur.php`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRating {
    pub licence_number: String,
    pub first_name: String,
    pub last_name: String,
    /// `point`: current monthly points
    pub current_points: f64,
    /// `apoint`: points of the previous month
    pub previous_points: f64,
    /// `valinit`: points at the start of the season
    pub season_initial_points: f64,
    pub category: String,
}

impl PlayerRating {
    /// Missing point fields take `default_points`.
    pub fn from_xml(fragment: &str, default_points: f64) -> Self {
        Self {
            licence_number: field_string(fragment, "licence"),
            first_name: field_string(fragment, "prenom"),
            last_name: field_string(fragment, "nom"),
            current_points: field_f64(fragment, "point", default_points),
            previous_points: field_f64(fragment, "apoint", default_points),
            season_initial_points: field_f64(fragment, "valinit", default_points),
            category: field_string(fragment, "cat"),
        }
    }

    pub fn month_delta(&self) -> f64 {
        self.current_points - self.previous_points
    }

    pub fn season_delta(&self) -> f64 {
        self.current_points - self.season_initial_points
    }
}

/// Parse a single-player lookup. A response without a `<joueur>` block is
/// treated as a logical error.
pub fn parse_player_rating(xml: &str, default_points: f64) -> Result<PlayerRating> {
    let endpoint = Endpoint::Player;
    check_response(&endpoint, xml)?;
    extract_records(xml, "joueur")
        .into_iter()
        .next()
        .map(|fragment| PlayerRating::from_xml(fragment, default_points))
        .ok_or_else(|| SmartPingError::missing_field(endpoint.resource(), "joueur"))
}
