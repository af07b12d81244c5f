//! ETag / conditional-request layer. The weak ETag is derived purely from
//! the store's revision token; this module never talks to the store itself,
//! it only renders and evaluates the token it's given.

use axum::http::HeaderMap;

/// `W/"<md5(revision)>"` — md5 is used only as a short, stable digest here,
/// not for any cryptographic property.
pub fn render(revision: i64) -> String {
    let digest = md5::compute(revision.to_string().as_bytes());
    format!("W/\"{digest:x}\"")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    Proceed,
    NotModified,
    PreconditionFailed,
}

/// `If-None-Match` takes precedence over `If-Match` when both are sent.
pub fn evaluate(headers: &HeaderMap, etag: &str) -> Precondition {
    if let Some(value) = headers.get("if-none-match").and_then(|v| v.to_str().ok()) {
        if matches_any(value, etag) {
            return Precondition::NotModified;
        }
        return Precondition::Proceed;
    }
    if let Some(value) = headers.get("if-match").and_then(|v| v.to_str().ok()) {
        if !matches_any(value, etag) {
            return Precondition::PreconditionFailed;
        }
    }
    Precondition::Proceed
}

fn matches_any(header_value: &str, etag: &str) -> bool {
    header_value.split(',').map(str::trim).any(|candidate| candidate == etag || candidate == "*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn etag_is_stable_for_same_revision() {
        assert_eq!(render(3), render(3));
        assert_ne!(render(3), render(4));
    }

    #[test]
    fn if_none_match_hit_is_not_modified() {
        let etag = render(1);
        let mut headers = HeaderMap::new();
        headers.insert("if-none-match", HeaderValue::from_str(&etag).unwrap());
        assert_eq!(evaluate(&headers, &etag), Precondition::NotModified);
    }

    #[test]
    fn if_match_miss_is_precondition_failed() {
        let etag = render(1);
        let mut headers = HeaderMap::new();
        headers.insert("if-match", HeaderValue::from_static("\"XXX\""));
        assert_eq!(evaluate(&headers, &etag), Precondition::PreconditionFailed);
    }

    #[test]
    fn if_none_match_takes_precedence_over_if_match() {
        let etag = render(1);
        let mut headers = HeaderMap::new();
        headers.insert("if-none-match", HeaderValue::from_str(&etag).unwrap());
        headers.insert("if-match", HeaderValue::from_static("\"XXX\""));
        assert_eq!(evaluate(&headers, &etag), Precondition::NotModified);
    }
}
