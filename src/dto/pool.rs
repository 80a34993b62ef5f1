use super::check_response;
use crate::api_client::Endpoint;
use crate::error::Result;
use crate::xml::{extract_field, extract_records, field_i32, field_string, parse_query_params};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%d/%m/%Y";

/// One line of a pool's standings table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolStanding {
    pub rank: i32,
    pub team_label: String,
    pub games_played: i32,
    pub points: i32,
    pub club_number: String,
    pub wins: i32,
    pub losses: i32,
    pub draws: i32,
}

impl PoolStanding {
    pub fn from_xml(fragment: &str) -> Self {
        Self {
            rank: field_i32(fragment, "clt", 0),
            team_label: field_string(fragment, "equipe"),
            games_played: field_i32(fragment, "joue", 0),
            points: field_i32(fragment, "pts", 0),
            club_number: field_string(fragment, "numero"),
            wins: field_i32(fragment, "vic", 0),
            losses: field_i32(fragment, "def", 0),
            draws: field_i32(fragment, "nul", 0),
        }
    }
}

/// A scheduled or played encounter within a pool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub label: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: i32,
    pub away_score: i32,
    pub scheduled_date: String,
    pub actual_date: String,
    pub detail_link: String,
    /// Both scores were present in the feed
    pub played: bool,
}

impl Fixture {
    pub fn from_xml(fragment: &str) -> Self {
        let played = has_score(fragment, "scorea") && has_score(fragment, "scoreb");
        Self {
            label: field_string(fragment, "libelle"),
            home_team: field_string(fragment, "equa"),
            away_team: field_string(fragment, "equb"),
            home_score: field_i32(fragment, "scorea", 0),
            away_score: field_i32(fragment, "scoreb", 0),
            scheduled_date: field_string(fragment, "dateprevue"),
            actual_date: field_string(fragment, "datereelle"),
            detail_link: field_string(fragment, "lien"),
            played,
        }
    }

    pub fn is_played(&self) -> bool {
        self.played
    }

    pub fn scheduled_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.scheduled_date, DATE_FORMAT).ok()
    }

    /// Date the encounter took place, falling back to the scheduled one.
    pub fn played_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.actual_date, DATE_FORMAT)
            .ok()
            .or_else(|| self.scheduled_on())
    }

    /// Parameters of the encounter detail link (`renc_id`, `is_retour`, ...).
    pub fn detail_params(&self) -> Vec<(String, String)> {
        parse_query_params(&self.detail_link)
    }

    pub fn involves(&self, team_label: &str) -> bool {
        self.home_team == team_label || self.away_team == team_label
    }
}

fn has_score(fragment: &str, tag: &str) -> bool {
    extract_field(fragment, tag)
        .map(|raw| raw.trim().parse::<i32>().is_ok())
        .unwrap_or(false)
}

/// Parse an `xml_result_equ.php?action=classement` response.
pub fn parse_standings(xml: &str) -> Result<Vec<PoolStanding>> {
    check_response(&Endpoint::PoolResults, xml)?;
    Ok(extract_records(xml, "classement")
        .into_iter()
        .map(PoolStanding::from_xml)
        .collect())
}

/// Parse an `xml_result_equ.php` fixtures response.
pub fn parse_fixtures(xml: &str) -> Result<Vec<Fixture>> {
    check_response(&Endpoint::PoolResults, xml)?;
    Ok(extract_records(xml, "tour")
        .into_iter()
        .map(Fixture::from_xml)
        .collect())
}
