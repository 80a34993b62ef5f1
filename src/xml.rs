//! Pattern-based extraction from SmartPing XML payloads.
//!
//! The federation's XML is loosely specified and sometimes malformed, so it is
//! scraped with regular expressions rather than parsed. Everything that touches
//! raw markup goes through [`extract_field`] and [`extract_records`]; swapping
//! in a real XML parser only needs to happen here.
//!
//! None of these functions fail. Missing or truncated markup yields `None`,
//! fewer records, or the caller's fallback value.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

/// Error element used by most endpoints
pub const ERROR_TAG: &str = "erreur";

const ERROR_SNIPPET_LEN: usize = 200;

static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("valid entity pattern"));

/// How an endpoint signals a logical error inside an HTTP 200 response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMarker {
    /// An `<erreur>` element is present
    Tag,
    /// The body mentions "erreur" or "error" anywhere, case-insensitively
    Text,
}

/// Compiled `<tag>...</tag>` patterns, keyed by tag
static ELEMENT_PATTERNS: LazyLock<Mutex<HashMap<String, Regex>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn element_pattern(tag: &str) -> Option<Regex> {
    let mut patterns = ELEMENT_PATTERNS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(pattern) = patterns.get(tag) {
        return Some(pattern.clone());
    }

    let escaped = regex::escape(tag);
    let pattern = Regex::new(&format!(r"(?s)<{escaped}(?:\s[^>]*)?>(.*?)</{escaped}\s*>")).ok()?;
    patterns.insert(tag.to_string(), pattern.clone());
    Some(pattern)
}

/// Inner text of the first `<tag>...</tag>` element.
pub fn extract_field<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let pattern = element_pattern(tag)?;
    pattern
        .captures(xml)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Inner content of every non-overlapping `<tag>...</tag>` block, in
/// document order.
pub fn extract_records<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    let Some(pattern) = element_pattern(tag) else {
        return Vec::new();
    };
    pattern
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Trimmed, entity-decoded field value, or `None` when absent or blank.
pub fn field_opt(xml: &str, tag: &str) -> Option<String> {
    extract_field(xml, tag)
        .map(|raw| decode_entities(raw.trim()))
        .filter(|value| !value.is_empty())
}

pub fn field_string(xml: &str, tag: &str) -> String {
    field_opt(xml, tag).unwrap_or_default()
}

/// Integer field; decimal values are truncated, anything else falls back.
pub fn field_i32(xml: &str, tag: &str, default: i32) -> i32 {
    let Some(raw) = extract_field(xml, tag).map(str::trim) else {
        return default;
    };
    raw.parse::<i32>()
        .ok()
        .or_else(|| parse_decimal(raw).map(|v| v as i32))
        .unwrap_or(default)
}

pub fn field_f64(xml: &str, tag: &str, default: f64) -> f64 {
    extract_field(xml, tag)
        .and_then(|raw| parse_decimal(raw.trim()))
        .unwrap_or(default)
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Check a response for the endpoint's error convention and return the
/// remote message if one is found.
pub fn remote_error(xml: &str, marker: ErrorMarker) -> Option<String> {
    if let Some(message) = extract_field(xml, ERROR_TAG) {
        let message = decode_entities(message.trim());
        return Some(if message.is_empty() {
            "unspecified error".to_string()
        } else {
            message
        });
    }

    match marker {
        ErrorMarker::Tag => None,
        ErrorMarker::Text => {
            let lowered = xml.to_lowercase();
            if lowered.contains("erreur") || lowered.contains("error") {
                Some(xml.trim().chars().take(ERROR_SNIPPET_LEN).collect())
            } else {
                None
            }
        }
    }
}

/// Decode the XML predefined entities and numeric character references.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let numeric = NUMERIC_ENTITY.replace_all(raw, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    numeric
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Split a query-string shaped value (`a=1&b=2`, optionally prefixed by a
/// path and `?`) into ordered key/value pairs.
pub fn parse_query_params(raw: &str) -> Vec<(String, String)> {
    let decoded = decode_entities(raw.trim());
    let query = match decoded.split_once('?') {
        Some((_, query)) => query,
        None => decoded.as_str(),
    };
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
            None => (pair.trim().to_string(), String::new()),
        })
        .collect()
}

/// First value for `key` in a parsed parameter list.
pub fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}
