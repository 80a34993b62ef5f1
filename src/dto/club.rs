use super::check_response;
use crate::api_client::Endpoint;
use crate::error::Result;
use crate::xml::{extract_records, field_f64, field_string};
use serde::{Deserialize, Serialize};

/// Roster entry from `xml_liste_joueur.php`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClubPlayer {
    pub licence_number: String,
    pub first_name: String,
    pub last_name: String,
    pub club_number: String,
    pub category: String,
    pub points: f64,
}

impl ClubPlayer {
    pub fn from_xml(fragment: &str, default_points: f64) -> Self {
        Self {
            licence_number: field_string(fragment, "licence"),
            first_name: field_string(fragment, "prenom"),
            last_name: field_string(fragment, "nom"),
            club_number: field_string(fragment, "club"),
            category: field_string(fragment, "cat"),
            points: field_f64(fragment, "points", default_points),
        }
    }
}

/// Parse a club roster. Entries without a licence number are dropped.
pub fn parse_club_players(xml: &str, default_points: f64) -> Result<Vec<ClubPlayer>> {
    check_response(&Endpoint::ClubPlayers, xml)?;
    Ok(extract_records(xml, "joueur")
        .into_iter()
        .map(|fragment| ClubPlayer::from_xml(fragment, default_points))
        .filter(|player| !player.licence_number.is_empty())
        .collect())
}
