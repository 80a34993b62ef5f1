use crate::api_client::{Endpoint, SmartPingApi};
use crate::dto::{parse_fixtures, parse_standings, parse_teams, DivisionLink, Fixture, PoolStanding, Team};
use crate::error::{Result, SmartPingError};
use crate::rate_limiter::SmartPingRateLimiter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Championship filter for the team listing (`type` parameter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamKind {
    Men,
    Women,
}

impl TeamKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Men => "M",
            Self::Women => "F",
        }
    }
}

impl FromStr for TeamKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M" | "MEN" => Ok(Self::Men),
            "F" | "WOMEN" => Ok(Self::Women),
            other => Err(format!("unknown team kind '{other}', expected M or F")),
        }
    }
}

impl fmt::Display for TeamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Standings and fixtures of the pool a team plays in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamPool {
    pub division: DivisionLink,
    pub standings: Vec<PoolStanding>,
    pub fixtures: Vec<Fixture>,
}

/// Best-effort result for one team. `error` is set when any step failed;
/// whatever was fetched before or after the failure is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamPoolReport {
    pub team: Team,
    pub division: Option<DivisionLink>,
    pub standings: Vec<PoolStanding>,
    pub fixtures: Vec<Fixture>,
    pub error: Option<String>,
}

impl TeamPoolReport {
    fn failed(team: Team, division: Option<DivisionLink>, error: String) -> Self {
        Self {
            team,
            division,
            standings: Vec::new(),
            fixtures: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The pool line belonging to the given club
    pub fn club_standing(&self, club_number: &str) -> Option<&PoolStanding> {
        self.standings
            .iter()
            .find(|standing| standing.club_number == club_number)
    }

    pub fn played_fixtures(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter().filter(|fixture| fixture.is_played())
    }

    pub fn upcoming_fixtures(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter().filter(|fixture| !fixture.is_played())
    }
}

/// Outcome of the team + pool aggregation for a club
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClubTeamsReport {
    pub club_number: String,
    pub teams: Vec<TeamPoolReport>,
    /// Set when the team listing itself could not be fetched
    pub error: Option<String>,
}

impl ClubTeamsReport {
    pub fn succeeded(&self) -> usize {
        self.teams.iter().filter(|team| team.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.teams.len() - self.succeeded()
    }
}

pub async fn fetch_club_teams<A: SmartPingApi>(
    api: &A,
    club_number: &str,
    kind: Option<TeamKind>,
) -> Result<Vec<Team>> {
    let mut params = vec![("numclu", club_number)];
    if let Some(kind) = kind {
        params.push(("type", kind.code()));
    }
    let xml = api.call(&Endpoint::ClubTeams, &params).await?;
    parse_teams(&xml)
}

pub async fn fetch_pool_standings<A: SmartPingApi>(
    api: &A,
    division: &DivisionLink,
) -> Result<Vec<PoolStanding>> {
    let mut params = division.query();
    params.push(("action", "classement"));
    params.push(("auto", "1"));
    let xml = api.call(&Endpoint::PoolResults, &params).await?;
    parse_standings(&xml)
}

pub async fn fetch_pool_fixtures<A: SmartPingApi>(
    api: &A,
    division: &DivisionLink,
) -> Result<Vec<Fixture>> {
    let mut params = division.query();
    params.push(("auto", "1"));
    let xml = api.call(&Endpoint::PoolResults, &params).await?;
    parse_fixtures(&xml)
}

fn division_of(team: &Team) -> Result<DivisionLink> {
    team.division_link().ok_or_else(|| {
        SmartPingError::missing_field(Endpoint::ClubTeams.resource(), "liendivision D1")
    })
}

/// Fetch a team's pool, failing on the first error.
pub async fn load_team_pool<A: SmartPingApi>(api: &A, team: &Team) -> Result<TeamPool> {
    let division = division_of(team)?;
    let standings = fetch_pool_standings(api, &division).await?;
    let fixtures = fetch_pool_fixtures(api, &division).await?;
    Ok(TeamPool {
        division,
        standings,
        fixtures,
    })
}

/// Fetch a team's pool, keeping partial data. Standings and fixtures are two
/// separate calls, each signed on its own.
pub async fn fetch_team_pool<A: SmartPingApi>(api: &A, team: &Team) -> TeamPoolReport {
    let division = match division_of(team) {
        Ok(division) => division,
        Err(err) => return TeamPoolReport::failed(team.clone(), None, err.to_string()),
    };

    let mut errors = Vec::new();

    let standings = fetch_pool_standings(api, &division)
        .await
        .unwrap_or_else(|err| {
            errors.push(format!("standings: {err}"));
            Vec::new()
        });
    let fixtures = fetch_pool_fixtures(api, &division)
        .await
        .unwrap_or_else(|err| {
            errors.push(format!("fixtures: {err}"));
            Vec::new()
        });

    TeamPoolReport {
        team: team.clone(),
        division: Some(division),
        standings,
        fixtures,
        error: (!errors.is_empty()).then(|| errors.join("; ")),
    }
}

/// Team listing, then standings and fixtures for every team, one team at a
/// time with the team throttle in between.
pub async fn fetch_teams_with_pools<A: SmartPingApi>(
    api: &A,
    limiter: &SmartPingRateLimiter,
    club_number: &str,
    kind: Option<TeamKind>,
) -> ClubTeamsReport {
    let teams = match fetch_club_teams(api, club_number, kind).await {
        Ok(teams) => teams,
        Err(err) => {
            warn!("Team listing for club {} failed: {}", club_number, err);
            return ClubTeamsReport {
                club_number: club_number.to_string(),
                teams: Vec::new(),
                error: Some(err.to_string()),
            };
        }
    };

    info!("Club {}: fetching pools for {} teams", club_number, teams.len());

    let mut reports = Vec::with_capacity(teams.len());
    for team in &teams {
        let report = limiter.throttle_team(fetch_team_pool(api, team)).await;
        if let Some(error) = &report.error {
            warn!("Team {} failed: {}", team.label, error);
        }
        reports.push(report);
    }

    let report = ClubTeamsReport {
        club_number: club_number.to_string(),
        teams: reports,
        error: None,
    };
    info!(
        "Club {}: {} teams fetched, {} failed",
        club_number,
        report.succeeded(),
        report.failed()
    );
    report
}
