//! Content negotiation: maps an `Accept` header to one of the two supported
//! representations with strict, table-driven precedence — exact-token
//! matching only, no quality-weight parsing.

use crate::error::ApiError;

/// The two wire representations the Simple API supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Json,
    Html,
}

impl Representation {
    pub fn content_type(self) -> &'static str {
        match self {
            Representation::Json => "application/vnd.pypi.simple.v1+json",
            Representation::Html => "application/vnd.pypi.simple.v1+html",
        }
    }
}

const JSON_TOKENS: &[&str] = &[
    "application/vnd.pypi.simple.v1+json",
    "application/vnd.pypi.simple.latest+json",
];

const HTML_TOKENS: &[&str] = &[
    "application/vnd.pypi.simple.v1+html",
    "application/vnd.pypi.simple.latest+html",
    "text/html",
    "*/*",
];

/// Select a representation for a raw `Accept` header value. A missing header
/// is treated as `*/*`, which falls back to HTML.
pub fn negotiate(accept: Option<&str>) -> Result<Representation, ApiError> {
    let accept = accept.unwrap_or("*/*");
    let tokens: Vec<&str> = accept
        .split(',')
        .map(|t| t.split(';').next().unwrap_or(t).trim())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.iter().any(|t| JSON_TOKENS.contains(t)) {
        return Ok(Representation::Json);
    }
    if tokens.iter().any(|t| HTML_TOKENS.contains(t)) {
        return Ok(Representation::Html);
    }
    Err(ApiError::NotAcceptable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_token_wins_when_present() {
        assert_eq!(
            negotiate(Some("application/vnd.pypi.simple.latest+json")).unwrap(),
            Representation::Json
        );
    }

    #[test]
    fn html_is_the_fallback() {
        assert_eq!(negotiate(Some("text/html")).unwrap(), Representation::Html);
        assert_eq!(negotiate(Some("*/*")).unwrap(), Representation::Html);
        assert_eq!(negotiate(None).unwrap(), Representation::Html);
    }

    #[test]
    fn json_beats_html_when_both_present() {
        assert_eq!(
            negotiate(Some("text/html, application/vnd.pypi.simple.v1+json")).unwrap(),
            Representation::Json
        );
    }

    #[test]
    fn unmatched_accept_is_not_acceptable() {
        assert!(negotiate(Some("application/xml")).is_err());
    }
}
