//! Flag detection over captured probe responses.
//!
//! Scans a response for a CTF-style flag token, body first, then headers in
//! the order the transport returned them. At most one match is reported per
//! response.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::probe::ProbeResponse;

/// Flag token signature: the literal `CTF{` prefix followed by the shortest
/// run of characters terminated by `}`.
static FLAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"CTF\{.*?\}").expect("invalid flag token regex"));

/// Where a flag was located within a probe response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchLocation {
    Body,
    Header(String),
}

impl fmt::Display for MatchLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchLocation::Body => write!(f, "body"),
            MatchLocation::Header(name) => write!(f, "header:{name}"),
        }
    }
}

/// A flag discovery: the location it was found at and the matched text
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagMatch {
    pub location: MatchLocation,
    pub text: String,
}

/// Search a captured response for a flag token.
///
/// The body is checked first; otherwise headers are walked in iteration
/// order and the first value containing a match wins. Header values that are
/// not readable as text are skipped.
pub fn scan_for_flag(response: &ProbeResponse) -> Option<FlagMatch> {
    if let Some(found) = FLAG_RE.find(&response.body) {
        return Some(FlagMatch {
            location: MatchLocation::Body,
            text: found.as_str().to_string(),
        });
    }

    for (name, value) in response.headers.iter() {
        let Ok(text) = value.to_str() else { continue };
        if let Some(found) = FLAG_RE.find(text) {
            return Some(FlagMatch {
                location: MatchLocation::Header(name.as_str().to_string()),
                text: found.as_str().to_string(),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue, Method};

    fn response(body: &str, headers: HeaderMap) -> ProbeResponse {
        ProbeResponse::new(Method::GET, 200, headers, body.to_string())
    }

    #[test]
    fn finds_flag_in_body() {
        let found = scan_for_flag(&response("Welcome CTF{abc123} enjoy", HeaderMap::new()))
            .expect("should match");

        assert_eq!(found.location, MatchLocation::Body);
        assert_eq!(found.text, "CTF{abc123}");
    }

    #[test]
    fn match_is_non_greedy() {
        let found =
            scan_for_flag(&response("CTF{first}tail}", HeaderMap::new())).expect("should match");
        assert_eq!(found.text, "CTF{first}");

        let found = scan_for_flag(&response("CTF{}", HeaderMap::new())).expect("should match");
        assert_eq!(found.text, "CTF{}");
    }

    #[test]
    fn body_wins_over_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-flag", "CTF{header}".parse().unwrap());

        let found =
            scan_for_flag(&response("CTF{body}", headers)).expect("should match");

        assert_eq!(found.location, MatchLocation::Body);
        assert_eq!(found.text, "CTF{body}");
    }

    #[test]
    fn first_matching_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("server", "nginx".parse().unwrap());
        headers.insert("x-secret", "CTF{early}".parse().unwrap());
        headers.insert("x-other", "CTF{late}".parse().unwrap());

        let found = scan_for_flag(&response("nothing here", headers)).expect("should match");

        assert_eq!(found.location, MatchLocation::Header("x-secret".to_string()));
        assert_eq!(found.text, "CTF{early}");
    }

    #[test]
    fn skips_unreadable_header_values() {
        let mut headers = HeaderMap::new();
        headers.insert("x-binary", HeaderValue::from_bytes(b"\xfe\xff").unwrap());
        headers.insert("x-flag", "CTF{clean}".parse().unwrap());

        let found = scan_for_flag(&response("", headers)).expect("should match");

        assert_eq!(found.location, MatchLocation::Header("x-flag".to_string()));
    }

    #[test]
    fn no_match_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert("server", "nginx".parse().unwrap());

        assert!(scan_for_flag(&response("CTF{unterminated", headers)).is_none());
    }

    #[test]
    fn location_renders_like_the_report() {
        assert_eq!(MatchLocation::Body.to_string(), "body");
        assert_eq!(
            MatchLocation::Header("x-secret".into()).to_string(),
            "header:x-secret"
        );
    }
}
