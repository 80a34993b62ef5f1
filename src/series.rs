//! Series bootstrap helpers.
//!
//! A series is registered once with `xml_initialisation.php` and then kept in
//! configuration. Nothing here runs on the request path.

use crate::xml::extract_field;
use rand::Rng;

pub const SERIES_LEN: usize = 15;

const SERIES_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Tag carrying the acceptance flag in the initialization response
pub const INIT_MARKER: &str = "appli";

/// Random candidate series, to be registered with the remote service.
pub fn generate_series() -> String {
    let mut rng = rand::rng();
    (0..SERIES_LEN)
        .map(|_| SERIES_CHARSET[rng.random_range(0..SERIES_CHARSET.len())] as char)
        .collect()
}

/// Whether an initialization response accepted the series.
pub fn is_series_accepted(xml: &str) -> bool {
    match extract_field(xml, INIT_MARKER).map(str::trim) {
        Some(value) => !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false"),
        None => false,
    }
}
