mod common;

use common::*;
use pretty_assertions::assert_eq;
use smartping_rs::config::ThrottleConfig;
use smartping_rs::workflows::{
    enrich_ratings, fetch_teams_with_pools, sync_club_roster, sync_player_ratings,
    sync_team_pools, CachedRating, RatingSource, TeamKind,
};
use smartping_rs::{Endpoint, SmartPingRateLimiter, Team};
use std::time::{Duration, Instant};

const CLUB: &str = "08830065";

/// Four teams; the second one's standings call fails at the transport level.
fn four_team_club() -> MockApi {
    let teams: Vec<String> = (1..=4)
        .map(|i| team_xml(&format!("TLSTT {i}"), &format!("D{i}"), &format!("P{i}")))
        .collect();

    let mut api = MockApi::new().respond(Endpoint::ClubTeams, &[("numclu", CLUB)], teams_xml(&teams));
    for i in 1..=4 {
        let division = format!("D{i}");
        let pool = format!("P{i}");
        let label = format!("TLSTT {i}");
        api = if i == 2 {
            api.fail(Endpoint::PoolResults, &standings_params(&division, &pool), 503)
        } else {
            api.respond(
                Endpoint::PoolResults,
                &standings_params(&division, &pool),
                standings_xml(CLUB, &label),
            )
        };
        api = api.respond(
            Endpoint::PoolResults,
            &fixtures_params(&division, &pool),
            fixtures_xml(&label),
        );
    }
    api
}

#[tokio::test]
async fn test_failing_team_does_not_sink_the_others() {
    let api = four_team_club();
    let limiter = SmartPingRateLimiter::unthrottled();

    let report = fetch_teams_with_pools(&api, &limiter, CLUB, None).await;

    assert!(report.error.is_none());
    assert_eq!(report.teams.len(), 4);
    assert_eq!(report.succeeded(), 3);
    assert_eq!(report.failed(), 1);

    for (i, team) in report.teams.iter().enumerate() {
        assert_eq!(team.team.label, format!("TLSTT {}", i + 1));
        if i == 1 {
            let error = team.error.as_deref().unwrap();
            assert!(error.contains("503"), "unexpected error: {error}");
            assert!(team.standings.is_empty());
            // Fixtures were still fetched for the failing team
            assert_eq!(team.fixtures.len(), 2);
        } else {
            assert!(team.is_ok());
            assert_eq!(team.standings.len(), 2);
            assert_eq!(team.club_standing(CLUB).map(|s| s.points), Some(9));
            assert_eq!(team.played_fixtures().count(), 1);
            assert_eq!(team.upcoming_fixtures().count(), 1);
        }
    }
}

#[tokio::test]
async fn test_standings_and_fixtures_are_separate_calls() {
    let api = four_team_club();
    let limiter = SmartPingRateLimiter::unthrottled();

    fetch_teams_with_pools(&api, &limiter, CLUB, None).await;

    let calls = api.calls();
    // One listing, then a standings and a fixtures call per team
    assert_eq!(calls.len(), 9);
    assert_eq!(calls[0], "xml_equipe.php?numclu=08830065");
    assert_eq!(calls[1], "xml_result_equ.php?D1=D1&cx_poule=P1&action=classement&auto=1");
    assert_eq!(calls[2], "xml_result_equ.php?D1=D1&cx_poule=P1&auto=1");
    assert_eq!(calls[8], "xml_result_equ.php?D1=D4&cx_poule=P4&auto=1");
}

#[tokio::test]
async fn test_team_listing_failure_yields_empty_report() {
    let api = MockApi::new().fail(Endpoint::ClubTeams, &[("numclu", CLUB)], 500);
    let limiter = SmartPingRateLimiter::unthrottled();

    let report = fetch_teams_with_pools(&api, &limiter, CLUB, None).await;

    assert!(report.teams.is_empty());
    assert!(report.error.is_some());
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn test_team_listing_remote_error() {
    let api = MockApi::new().respond(
        Endpoint::ClubTeams,
        &[("numclu", CLUB), ("type", "F")],
        "<liste><erreur>Club inconnu</erreur></liste>",
    );
    let limiter = SmartPingRateLimiter::unthrottled();

    let report = fetch_teams_with_pools(&api, &limiter, CLUB, Some(TeamKind::Women)).await;

    assert!(report.teams.is_empty());
    assert!(report.error.unwrap().contains("Club inconnu"));
}

#[tokio::test]
async fn test_team_without_division_link_is_recorded() {
    let broken = "<equipe><libequipe>TLSTT 9</libequipe><liendivision></liendivision></equipe>".to_string();
    let api = MockApi::new()
        .respond(
            Endpoint::ClubTeams,
            &[("numclu", CLUB)],
            teams_xml(&[broken, team_xml("TLSTT 1", "D1", "P1")]),
        )
        .respond(Endpoint::PoolResults, &standings_params("D1", "P1"), standings_xml(CLUB, "TLSTT 1"))
        .respond(Endpoint::PoolResults, &fixtures_params("D1", "P1"), fixtures_xml("TLSTT 1"));
    let limiter = SmartPingRateLimiter::unthrottled();

    let report = fetch_teams_with_pools(&api, &limiter, CLUB, None).await;

    assert_eq!(report.teams.len(), 2);
    assert!(report.teams[0].error.as_deref().unwrap().contains("liendivision"));
    assert!(report.teams[1].is_ok());
    // No pool calls for the team without identifiers
    assert_eq!(api.call_count(), 3);
}

#[tokio::test]
async fn test_teams_are_throttled() {
    let api = four_team_club();
    let limiter = SmartPingRateLimiter::new(&ThrottleConfig {
        team_interval_ms: 100,
        ..ThrottleConfig::unthrottled()
    });

    let start = Instant::now();
    fetch_teams_with_pools(&api, &limiter, CLUB, None).await;

    // Four teams, three gaps
    assert!(start.elapsed() >= Duration::from_millis(290));
    assert_eq!(limiter.team_limiter().acquisitions().await, 4);
}

#[tokio::test]
async fn test_team_pause_follows_slow_calls() {
    // Each team makes two 80ms calls
    let api = four_team_club().with_latency(Duration::from_millis(80));
    let limiter = SmartPingRateLimiter::new(&ThrottleConfig {
        team_interval_ms: 200,
        ..ThrottleConfig::unthrottled()
    });

    fetch_teams_with_pools(&api, &limiter, CLUB, None).await;

    let spans = api.timeline();
    assert_eq!(spans.len(), 9);
    // Call 0 is the listing; team k uses calls 2k-1 and 2k
    for next_team in 2..=4 {
        let last_of_previous = 2 * (next_team - 1);
        let gap = idle_gap(&spans, last_of_previous, last_of_previous + 1);
        assert!(
            gap >= Duration::from_millis(190),
            "team {next_team} started {gap:?} after the previous team finished"
        );
    }
    // No pause between the two calls of one team
    assert!(idle_gap(&spans, 1, 2) < Duration::from_millis(100));
}

#[tokio::test]
async fn test_batch_pause_follows_slow_calls() {
    let licences: Vec<String> = (1..=20).map(|i| format!("83{i:05}")).collect();
    let mut api = MockApi::new().with_latency(Duration::from_millis(40));
    for licence in &licences {
        api = api.respond(Endpoint::Player, &[("licence", licence)], player_xml(licence, 700.0, 690.0, 650.0));
    }
    let limiter = SmartPingRateLimiter::new(&ThrottleConfig {
        batch_interval_ms: 300,
        ..ThrottleConfig::unthrottled()
    });

    // A batch of ten 40ms calls outlasts the 300ms interval
    let report = sync_player_ratings(&api, &limiter, &licences, 10).await;
    assert_eq!(report.batches, 2);
    assert_eq!(report.succeeded(), 20);

    let spans = api.timeline();
    let gap = idle_gap(&spans, 9, 10);
    assert!(gap >= Duration::from_millis(290), "second batch started {gap:?} after the first");
    assert!(idle_gap(&spans, 4, 5) < Duration::from_millis(100));
}

#[tokio::test]
async fn test_player_pause_follows_slow_lookup() {
    let players = vec![cached("100", 900.0), cached("200", 1500.0)];
    let api = MockApi::new()
        .with_latency(Duration::from_millis(200))
        .respond(Endpoint::Player, &[("licence", "200")], player_xml("200", 1500.0, 1500.0, 1400.0))
        .respond(Endpoint::Player, &[("licence", "100")], player_xml("100", 900.0, 900.0, 800.0));
    let limiter = SmartPingRateLimiter::new(&ThrottleConfig {
        player_interval_ms: 150,
        ..ThrottleConfig::unthrottled()
    });

    enrich_ratings(&api, &limiter, &players, 2).await;

    let spans = api.timeline();
    assert!(idle_gap(&spans, 0, 1) >= Duration::from_millis(140));
}

fn cached(licence: &str, points: f64) -> CachedRating {
    CachedRating {
        licence_number: licence.to_string(),
        first_name: "Prenom".to_string(),
        last_name: format!("NOM{licence}"),
        current_points: points,
        previous_points: points,
        season_initial_points: points - 100.0,
    }
}

#[tokio::test]
async fn test_enrich_ratings_top_n_with_fallback() {
    let players = vec![
        cached("100", 900.0),
        cached("200", 1500.0),
        cached("300", 1200.0),
        cached("400", 600.0),
    ];
    let api = MockApi::new()
        .respond(Endpoint::Player, &[("licence", "200")], player_xml("200", 1540.0, 1500.0, 1400.0))
        .fail(Endpoint::Player, &[("licence", "300")], 502)
        .respond(Endpoint::Player, &[("licence", "100")], player_xml("100", 900.0, 900.0, 800.0));
    let limiter = SmartPingRateLimiter::unthrottled();

    let progress = enrich_ratings(&api, &limiter, &players, 3).await;

    // Player 400 is outside the top three and never looked up
    assert_eq!(api.call_count(), 3);
    assert_eq!(progress.len(), 3);

    assert_eq!(progress[0].licence_number, "200");
    assert_eq!(progress[0].source, RatingSource::Remote);
    assert_eq!(progress[0].month_delta, 40.0);
    assert_eq!(progress[0].season_delta, 140.0);
    assert!(progress[0].changed);

    assert_eq!(progress[1].licence_number, "300");
    assert_eq!(progress[1].source, RatingSource::Cached);
    assert_eq!(progress[1].current_points, 1200.0);
    assert_eq!(progress[1].season_delta, 100.0);
    assert!(progress[1].error.is_some());

    assert_eq!(progress[2].licence_number, "100");
    assert_eq!(progress[2].source, RatingSource::Remote);
    assert!(!progress[2].changed);
}

#[tokio::test]
async fn test_enrich_ratings_remote_unreachable() {
    let players = vec![cached("100", 900.0), cached("200", 1500.0)];
    let api = MockApi::new();
    let limiter = SmartPingRateLimiter::unthrottled();

    let progress = enrich_ratings(&api, &limiter, &players, 10).await;

    assert_eq!(progress.len(), 2);
    assert!(progress.iter().all(|p| p.source == RatingSource::Cached));
    assert_eq!(progress[0].current_points, 1500.0);
    assert_eq!(progress[1].current_points, 900.0);
}

#[tokio::test]
async fn test_sync_club_roster_in_batches() {
    let licences: Vec<String> = (1..=25).map(|i| format!("83{i:05}")).collect();
    let roster: String = licences
        .iter()
        .map(|l| format!("<joueur><licence>{l}</licence><nom>N</nom><prenom>P</prenom><club>{CLUB}</club></joueur>"))
        .collect();

    let mut api = MockApi::new().respond(Endpoint::ClubPlayers, &[("club", CLUB)], format!("<liste>{roster}</liste>"));
    for (i, licence) in licences.iter().enumerate() {
        api = if i == 12 {
            api.fail(Endpoint::Player, &[("licence", licence)], 504)
        } else {
            api.respond(Endpoint::Player, &[("licence", licence)], player_xml(licence, 700.0, 690.0, 650.0))
        };
    }
    let limiter = SmartPingRateLimiter::new(&ThrottleConfig {
        batch_interval_ms: 50,
        ..ThrottleConfig::unthrottled()
    });

    let start = Instant::now();
    let report = sync_club_roster(&api, &limiter, CLUB, 10).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(90));
    assert_eq!(report.batches, 3);
    assert_eq!(report.outcomes.len(), 25);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures().next().unwrap().key, licences[12]);
    assert_eq!(report.outcomes[12].batch, 1);
    assert_eq!(report.values().count(), 24);
    assert_eq!(api.call_count(), 26);
}

#[tokio::test]
async fn test_sync_club_roster_without_roster() {
    let api = MockApi::new().fail(Endpoint::ClubPlayers, &[("club", CLUB)], 500);
    let limiter = SmartPingRateLimiter::unthrottled();

    assert!(sync_club_roster(&api, &limiter, CLUB, 10).await.is_err());
}

#[tokio::test]
async fn test_sync_team_pools_records_failures() {
    let api = four_team_club();
    let limiter = SmartPingRateLimiter::unthrottled();
    let teams: Vec<Team> = (1..=4)
        .map(|i| Team {
            label: format!("TLSTT {i}"),
            division_label: String::new(),
            division_link_params: format!("cx_poule=P{i}&D1=D{i}"),
            event_id: String::new(),
            event_label: String::new(),
        })
        .collect();

    let report = sync_team_pools(&api, &limiter, &teams, 2).await;

    assert_eq!(report.batches, 2);
    assert_eq!(report.succeeded(), 3);
    assert_eq!(report.failures().next().unwrap().key, "TLSTT 2");
}
