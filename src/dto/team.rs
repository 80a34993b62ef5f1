use super::check_response;
use crate::api_client::Endpoint;
use crate::error::Result;
use crate::xml::{extract_records, field_string, param, parse_query_params};
use serde::{Deserialize, Serialize};

/// A club team entered in a team championship
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub label: String,
    pub division_label: String,
    /// Raw `liendivision` value, a query string naming the pool
    pub division_link_params: String,
    pub event_id: String,
    pub event_label: String,
}

impl Team {
    pub fn from_xml(fragment: &str) -> Self {
        Self {
            label: field_string(fragment, "libequipe"),
            division_label: field_string(fragment, "libdivision"),
            division_link_params: field_string(fragment, "liendivision"),
            event_id: field_string(fragment, "idepr"),
            event_label: field_string(fragment, "libepr"),
        }
    }

    pub fn division_link(&self) -> Option<DivisionLink> {
        DivisionLink::parse(&self.division_link_params)
    }
}

/// Pool identifiers embedded in a team's division link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DivisionLink {
    /// `D1`
    pub division_id: String,
    /// `cx_poule`; single-pool divisions omit it
    pub pool_id: Option<String>,
    /// `organisme_pere`
    pub organisation_id: Option<String>,
}

impl DivisionLink {
    /// Returns `None` when the link carries no division id.
    pub fn parse(raw: &str) -> Option<Self> {
        let params = parse_query_params(raw);
        let division_id = param(&params, "D1")?.to_string();
        Some(Self {
            division_id,
            pool_id: param(&params, "cx_poule").map(str::to_string),
            organisation_id: param(&params, "organisme_pere").map(str::to_string),
        })
    }

    /// Parameters identifying the pool on `xml_result_equ.php`.
    pub fn query(&self) -> Vec<(&'static str, &str)> {
        let mut query = vec![("D1", self.division_id.as_str())];
        if let Some(pool_id) = &self.pool_id {
            query.push(("cx_poule", pool_id.as_str()));
        }
        query
    }
}

/// Parse an `xml_equipe.php` response.
pub fn parse_teams(xml: &str) -> Result<Vec<Team>> {
    check_response(&Endpoint::ClubTeams, xml)?;
    Ok(extract_records(xml, "equipe")
        .into_iter()
        .map(Team::from_xml)
        .collect())
}
