// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Search-engine query emission.
//!
//! A matched fingerprint is worth more than one host: pasted into an
//! internet-wide asset search engine it finds every other host serving the
//! same icon. Each service has its own literal query syntax with a single
//! substitution point for the signed decimal fingerprint.

use std::fmt;

use crate::matcher::MatchResult;

/// Asset-search services with a favicon-hash query syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchService {
    Shodan,
    Fofa,
    ZoomEye,
}

impl SearchService {
    pub const ALL: &'static [SearchService] = &[
        SearchService::Shodan,
        SearchService::Fofa,
        SearchService::ZoomEye,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchService::Shodan => "shodan",
            SearchService::Fofa => "fofa",
            SearchService::ZoomEye => "zoomeye",
        }
    }
}

impl fmt::Display for SearchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Render the follow-up query for a matched result.
///
/// Unmatched results (including fetch failures) have no query to issue; the
/// empty string is the expected non-exceptional outcome there, not a fault.
pub fn emit(result: &MatchResult, service: SearchService) -> String {
    if !result.matched {
        return String::new();
    }
    let Some(fp) = result.fingerprint else {
        return String::new();
    };

    match service {
        SearchService::Shodan => format!("http.favicon.hash:{fp}"),
        SearchService::Fofa => format!("icon_hash=\"{fp}\""),
        SearchService::ZoomEye => format!("iconhash:\"{fp}\""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched_result(fp: i32) -> MatchResult {
        MatchResult {
            target: "https://a.example".to_string(),
            fingerprint: Some(fp),
            matched: true,
            labels: vec!["Acme Panel".to_string()],
            fetch_error: None,
            checked_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_emit_unmatched_is_empty() {
        let mut result = matched_result(-1588080585);
        result.matched = false;
        result.labels.clear();
        for service in SearchService::ALL {
            assert_eq!(emit(&result, *service), "");
        }
    }

    #[test]
    fn test_emit_fetch_failure_is_empty() {
        let mut result = matched_result(0);
        result.matched = false;
        result.fingerprint = None;
        result.fetch_error = Some(crate::errors::FetchErrorKind::Timeout);
        assert_eq!(emit(&result, SearchService::Shodan), "");
    }

    #[test]
    fn test_emit_templates() {
        let result = matched_result(-1588080585);
        assert_eq!(
            emit(&result, SearchService::Shodan),
            "http.favicon.hash:-1588080585"
        );
        assert_eq!(emit(&result, SearchService::Fofa), "icon_hash=\"-1588080585\"");
        assert_eq!(
            emit(&result, SearchService::ZoomEye),
            "iconhash:\"-1588080585\""
        );
    }

    #[test]
    fn test_emit_substitutes_exactly_once_with_sign() {
        for fp in [-1588080585i32, 116323821] {
            let result = matched_result(fp);
            for service in SearchService::ALL {
                let query = emit(&result, *service);
                assert_eq!(query.matches(&fp.to_string()).count(), 1, "{service}: {query}");
            }
        }
    }

    #[test]
    fn test_service_names() {
        assert_eq!(SearchService::Shodan.to_string(), "shodan");
        assert_eq!(SearchService::Fofa.as_str(), "fofa");
        assert_eq!(SearchService::ZoomEye.as_str(), "zoomeye");
    }
}
