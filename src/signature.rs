//! Request signing for the SmartPing API.
//!
//! Every call carries a `tm` timestamp and a `tmc` signature. The signature is
//! an HMAC-SHA1 of the timestamp keyed with the hex MD5 digest of the shared
//! secret (not the secret itself).

use crate::error::{Result, SmartPingError};
use chrono::{DateTime, Local, TimeZone};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;
use std::fmt;

type HmacSha1 = Hmac<Sha1>;

/// Width of a `YYYYMMDDHHMMSSmmm` timestamp
pub const TIMESTAMP_LEN: usize = 17;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";

/// The credential triple issued by the federation
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub application_id: String,
    pub shared_secret: String,
    pub series: String,
}

impl Credentials {
    pub fn new(
        application_id: impl Into<String>,
        shared_secret: impl Into<String>,
        series: impl Into<String>,
    ) -> Self {
        Self {
            application_id: application_id.into(),
            shared_secret: shared_secret.into(),
            series: series.into(),
        }
    }

    /// Check the credentials needed by any data call.
    pub fn validate(&self) -> Result<()> {
        self.validate_for_initialization()?;
        if self.series.trim().is_empty() {
            return Err(SmartPingError::MissingCredential("series"));
        }
        Ok(())
    }

    /// Initialization brings its own candidate series, so only the
    /// application id and secret are required.
    pub fn validate_for_initialization(&self) -> Result<()> {
        if self.application_id.trim().is_empty() {
            return Err(SmartPingError::MissingCredential("application id"));
        }
        if self.shared_secret.is_empty() {
            return Err(SmartPingError::MissingCredential("shared secret"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("application_id", &self.application_id)
            .field("shared_secret", &"<redacted>")
            .field("series", &self.series)
            .finish()
    }
}

/// Format an instant as `YYYYMMDDHHMMSSmmm` in the instant's own timezone.
pub fn timestamp_at<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Timestamp for the current local wall-clock time.
pub fn generate_timestamp() -> String {
    timestamp_at(&Local::now())
}

/// Hex MD5 of the shared secret, used as the HMAC key.
pub fn signing_key(shared_secret: &str) -> String {
    hex::encode(Md5::digest(shared_secret.as_bytes()))
}

/// Compute the `tmc` value for a timestamp.
pub fn sign(shared_secret: &str, timestamp: &str) -> String {
    let key = signing_key(shared_secret);
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(timestamp.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// One outbound call, signed with its own timestamp
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub timestamp: String,
    pub signature: String,
    pub endpoint: String,
    pub parameters: Vec<(String, String)>,
}

impl SignedRequest {
    pub fn new(shared_secret: &str, endpoint: &str, parameters: &[(&str, &str)]) -> Self {
        Self::with_timestamp(shared_secret, endpoint, parameters, generate_timestamp())
    }

    pub fn with_timestamp(
        shared_secret: &str,
        endpoint: &str,
        parameters: &[(&str, &str)],
        timestamp: String,
    ) -> Self {
        let signature = sign(shared_secret, &timestamp);
        Self {
            timestamp,
            signature,
            endpoint: endpoint.to_string(),
            parameters: parameters
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Query pairs in wire order: `serie`, `tm`, `tmc`, `id`, then the
    /// endpoint's own parameters.
    pub fn query<'a>(&'a self, application_id: &'a str, series: &'a str) -> Vec<(&'a str, &'a str)> {
        let mut query = Vec::with_capacity(4 + self.parameters.len());
        query.push(("serie", series));
        query.push(("tm", self.timestamp.as_str()));
        query.push(("tmc", self.signature.as_str()));
        query.push(("id", application_id));
        query.extend(
            self.parameters
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
        query
    }
}
