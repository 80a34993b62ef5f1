use crate::config::SmartPingConfig;
use crate::error::{Result, SmartPingError};
use crate::series::is_series_accepted;
use crate::signature::{Credentials, SignedRequest};
use crate::xml::ErrorMarker;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Remote resources of the SmartPing XML API
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Series registration handshake
    Initialization,
    /// Teams of a club (`numclu`, optional `type`)
    ClubTeams,
    /// Standings and fixtures of a pool (`D1`, `cx_poule`, `action`)
    PoolResults,
    /// Rating of one player (`licence`)
    Player,
    /// Licensed players of a club (`club`)
    ClubPlayers,
    /// Any other resource, e.g. `xml_club_detail.php`
    Custom(String),
}

impl Endpoint {
    /// `name` may omit the `.php` suffix.
    pub fn custom(name: &str) -> Self {
        let name = name.trim().trim_start_matches('/');
        if name.ends_with(".php") {
            Self::Custom(name.to_string())
        } else {
            Self::Custom(format!("{name}.php"))
        }
    }

    pub fn resource(&self) -> &str {
        match self {
            Self::Initialization => "xml_initialisation.php",
            Self::ClubTeams => "xml_equipe.php",
            Self::PoolResults => "xml_result_equ.php",
            Self::Player => "xml_joueur.php",
            Self::ClubPlayers => "xml_liste_joueur.php",
            Self::Custom(name) => name,
        }
    }

    /// The results endpoint reports some failures as bare text instead of an
    /// `<erreur>` element.
    pub fn error_marker(&self) -> ErrorMarker {
        match self {
            Self::PoolResults => ErrorMarker::Text,
            _ => ErrorMarker::Tag,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource())
    }
}

/// One signed call returning the raw XML body. Workflows depend on this
/// rather than on the HTTP client.
pub trait SmartPingApi {
    fn call(
        &self,
        endpoint: &Endpoint,
        params: &[(&str, &str)],
    ) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP client for the federation API.
///
/// Holds read-only credentials; every call is signed with a fresh timestamp
/// and sent with caching disabled.
#[derive(Debug, Clone)]
pub struct SmartPingClient {
    client: Client,
    credentials: Arc<Credentials>,
    base_url: String,
}

impl SmartPingClient {
    pub fn new(config: &SmartPingConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            credentials: Arc::new(config.credentials()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn endpoint_url(&self, endpoint: &Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.resource())
    }

    /// Issue one signed data call and return the body verbatim.
    pub async fn call(&self, endpoint: &Endpoint, params: &[(&str, &str)]) -> Result<String> {
        self.credentials.validate()?;
        self.dispatch(&self.credentials.series, endpoint, params)
            .await
    }

    /// Register a candidate series. Returns whether the service accepted it;
    /// persisting an accepted series is up to the operator.
    pub async fn initialize(&self, candidate_series: &str) -> Result<bool> {
        self.credentials.validate_for_initialization()?;
        if candidate_series.trim().is_empty() {
            return Err(SmartPingError::MissingCredential("series"));
        }

        let body = self
            .dispatch(candidate_series.trim(), &Endpoint::Initialization, &[])
            .await?;
        let accepted = is_series_accepted(&body);
        if accepted {
            info!("Series {} accepted by SmartPing", candidate_series);
        } else {
            warn!("Series {} rejected by SmartPing", candidate_series);
        }
        Ok(accepted)
    }

    async fn dispatch(
        &self,
        series: &str,
        endpoint: &Endpoint,
        params: &[(&str, &str)],
    ) -> Result<String> {
        let request = SignedRequest::new(&self.credentials.shared_secret, endpoint.resource(), params);
        let url = self.endpoint_url(endpoint);

        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        debug!(
            "SmartPing request: {} tm={} params={:?}",
            request.endpoint, request.timestamp, request.parameters
        );

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .query(&request.query(&self.credentials.application_id, series))
            .send()
            .await?;

        let status = response.status();
        debug!("SmartPing response status: {}", status);

        if !status.is_success() {
            return Err(SmartPingError::HttpStatus {
                endpoint: endpoint.resource().to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!("SmartPing response: {} bytes from {}", body.len(), endpoint);
        Ok(body)
    }
}

impl SmartPingApi for SmartPingClient {
    async fn call(&self, endpoint: &Endpoint, params: &[(&str, &str)]) -> Result<String> {
        SmartPingClient::call(self, endpoint, params).await
    }
}
