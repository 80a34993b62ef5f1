#![allow(dead_code)]

use smartping_rs::{Endpoint, SmartPingApi, SmartPingError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Scripted remote: responses are looked up by `resource?k=v&k=v`.
#[derive(Default)]
pub struct MockApi {
    responses: HashMap<String, Result<String, u16>>,
    calls: Mutex<Vec<String>>,
    latency: Duration,
    timeline: Mutex<Vec<CallSpan>>,
}

/// When a scripted call started and returned
#[derive(Debug, Clone, Copy)]
pub struct CallSpan {
    pub started: Instant,
    pub finished: Instant,
}

/// Idle time between the end of call `before` and the start of call `after`.
pub fn idle_gap(spans: &[CallSpan], before: usize, after: usize) -> Duration {
    spans[after].started.duration_since(spans[before].finished)
}

pub fn request_key(endpoint: &Endpoint, params: &[(&str, &str)]) -> String {
    let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{}?{}", endpoint.resource(), query.join("&"))
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, endpoint: Endpoint, params: &[(&str, &str)], xml: impl Into<String>) -> Self {
        self.responses
            .insert(request_key(&endpoint, params), Ok(xml.into()));
        self
    }

    pub fn fail(mut self, endpoint: Endpoint, params: &[(&str, &str)], status: u16) -> Self {
        self.responses
            .insert(request_key(&endpoint, params), Err(status));
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn timeline(&self) -> Vec<CallSpan> {
        self.timeline.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl SmartPingApi for MockApi {
    async fn call(&self, endpoint: &Endpoint, params: &[(&str, &str)]) -> Result<String, SmartPingError> {
        let key = request_key(endpoint, params);
        self.calls.lock().unwrap().push(key.clone());
        let started = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.timeline.lock().unwrap().push(CallSpan {
            started,
            finished: Instant::now(),
        });
        match self.responses.get(&key) {
            Some(Ok(xml)) => Ok(xml.clone()),
            Some(Err(status)) => Err(SmartPingError::HttpStatus {
                endpoint: endpoint.resource().to_string(),
                status: *status,
            }),
            None => Err(SmartPingError::remote(
                endpoint.resource(),
                format!("no scripted response for {key}"),
            )),
        }
    }
}

pub fn team_xml(label: &str, division: &str, pool: &str) -> String {
    format!(
        "<equipe><libequipe>{label}</libequipe><libdivision>Division {division}</libdivision>\
         <liendivision>cx_poule={pool}&amp;D1={division}&amp;organisme_pere=1</liendivision>\
         <idepr>1049</idepr><libepr>Championnat par Equipes</libepr></equipe>"
    )
}

pub fn teams_xml(teams: &[String]) -> String {
    format!("<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><liste>{}</liste>", teams.concat())
}

pub fn standings_xml(club_number: &str, team: &str) -> String {
    format!(
        "<liste><classement><clt>1</clt><equipe>{team}</equipe><joue>3</joue><pts>9</pts>\
         <numero>{club_number}</numero><vic>3</vic><def>0</def><nul>0</nul></classement>\
         <classement><clt>2</clt><equipe>Rival</equipe><joue>3</joue><pts>7</pts>\
         <numero>08310001</numero><vic>2</vic><def>1</def><nul>0</nul></classement></liste>"
    )
}

pub fn fixtures_xml(team: &str) -> String {
    format!(
        "<liste><tour><libelle>tour 1</libelle><equa>{team}</equa><equb>Rival</equb>\
         <scorea>18</scorea><scoreb>10</scoreb><dateprevue>27/09/2025</dateprevue>\
         <datereelle>27/09/2025</datereelle><lien>renc_id=1</lien></tour>\
         <tour><libelle>tour 2</libelle><equa>Rival</equa><equb>{team}</equb>\
         <scorea></scorea><scoreb></scoreb><dateprevue>11/10/2025</dateprevue>\
         <datereelle></datereelle><lien></lien></tour></liste>"
    )
}

pub fn player_xml(licence: &str, current: f64, previous: f64, initial: f64) -> String {
    format!(
        "<liste><joueur><licence>{licence}</licence><nom>NOM{licence}</nom><prenom>Prenom</prenom>\
         <point>{current}</point><apoint>{previous}</apoint><valinit>{initial}</valinit>\
         <cat>S</cat></joueur></liste>"
    )
}

pub fn standings_params<'a>(division: &'a str, pool: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![("D1", division), ("cx_poule", pool), ("action", "classement"), ("auto", "1")]
}

pub fn fixtures_params<'a>(division: &'a str, pool: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![("D1", division), ("cx_poule", pool), ("auto", "1")]
}
