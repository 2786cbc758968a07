// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Result rendering for the CLI. The match engine itself never prints;
//! everything here is pure string construction over finished results.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::emitter::{emit, SearchService};
use crate::fingerprint::Fingerprint;
use crate::matcher::MatchResult;

/// One result as a grep-friendly line.
///
/// `url [fingerprint] [labels]`, with `[unknown]` for fingerprints the table
/// has no entry for, and the error kind when the target could not be checked.
pub fn render_result_line(result: &MatchResult) -> String {
    match (result.fingerprint, result.fetch_error) {
        (Some(fp), _) => {
            let label = if result.labels.is_empty() {
                "unknown".to_string()
            } else {
                result.labels.join(", ")
            };
            format!("{} [{}] [{}]", result.target, fp, label)
        }
        (None, Some(kind)) => format!("{} [fetch failed: {}]", result.target, kind),
        (None, None) => format!("{} [no result]", result.target),
    }
}

/// Group targets by fingerprint, FavFreak style: one block per fingerprint
/// with its labels, queries and every host that served it.
pub fn render_summary(results: &[MatchResult], services: &[SearchService]) -> String {
    let mut by_fingerprint: BTreeMap<Fingerprint, Vec<&MatchResult>> = BTreeMap::new();
    for result in results {
        if let Some(fp) = result.fingerprint {
            by_fingerprint.entry(fp).or_default().push(result);
        }
    }

    let failed = results.iter().filter(|r| r.fetch_error.is_some()).count();
    let matched = results.iter().filter(|r| r.matched).count();

    let mut out = String::new();
    let _ = writeln!(out, "Fingerprint summary:");
    for (fp, group) in &by_fingerprint {
        // Every result in the group shares the fingerprint, hence the labels.
        let labels = if group[0].labels.is_empty() {
            "unknown".to_string()
        } else {
            group[0].labels.join(", ")
        };
        let _ = writeln!(out, "  {} [{}] - {} host(s)", fp, labels, group.len());
        for result in group {
            let _ = writeln!(out, "    {}", result.target);
        }
        if !group[0].labels.is_empty() {
            for service in services {
                let query = emit(group[0], *service);
                if !query.is_empty() {
                    let _ = writeln!(out, "    {}: {}", service, query);
                }
            }
        }
    }
    let _ = writeln!(
        out,
        "  {} target(s), {} matched, {} failed",
        results.len(),
        matched,
        failed
    );
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    results: &'a [MatchResult],
    targets: usize,
    matched: usize,
    failed: usize,
}

/// The whole batch as one JSON document.
pub fn render_json(results: &[MatchResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        results,
        targets: results.len(),
        matched: results.iter().filter(|r| r.matched).count(),
        failed: results.iter().filter(|r| r.fetch_error.is_some()).count(),
    })
}

/// One JSON object per line, for piping into other tooling.
pub fn render_jsonl(results: &[MatchResult]) -> serde_json::Result<String> {
    let mut out = String::new();
    for result in results {
        out.push_str(&serde_json::to_string(result)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchErrorKind;

    fn result(target: &str, fp: Option<i32>, labels: &[&str], err: Option<FetchErrorKind>) -> MatchResult {
        MatchResult {
            target: target.to_string(),
            fingerprint: fp,
            matched: !labels.is_empty(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            fetch_error: err,
            checked_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_render_result_line_matched() {
        let line = render_result_line(&result(
            "https://a.example",
            Some(-1588080585),
            &["phpMyAdmin"],
            None,
        ));
        assert_eq!(line, "https://a.example [-1588080585] [phpMyAdmin]");
    }

    #[test]
    fn test_render_result_line_unknown() {
        let line = render_result_line(&result("https://b.example", Some(42), &[], None));
        assert_eq!(line, "https://b.example [42] [unknown]");
    }

    #[test]
    fn test_render_result_line_fetch_failure() {
        let line = render_result_line(&result(
            "https://down.example",
            None,
            &[],
            Some(FetchErrorKind::Timeout),
        ));
        assert_eq!(line, "https://down.example [fetch failed: TIMEOUT]");
    }

    #[test]
    fn test_render_summary_groups_by_fingerprint() {
        let results = vec![
            result("https://a.example", Some(7), &["Acme Panel"], None),
            result("https://b.example", Some(7), &["Acme Panel"], None),
            result("https://c.example", None, &[], Some(FetchErrorKind::ConnectionError)),
        ];
        let summary = render_summary(&results, &[SearchService::Shodan]);
        assert!(summary.contains("7 [Acme Panel] - 2 host(s)"));
        assert!(summary.contains("https://a.example"));
        assert!(summary.contains("https://b.example"));
        assert!(summary.contains("shodan: http.favicon.hash:7"));
        assert!(summary.contains("3 target(s), 2 matched, 1 failed"));
    }

    #[test]
    fn test_render_jsonl_one_object_per_line() {
        let results = vec![
            result("https://a.example", Some(7), &["Acme Panel"], None),
            result("https://b.example", Some(9), &[], None),
        ];
        let jsonl = render_jsonl(&results).unwrap();
        assert_eq!(jsonl.lines().count(), 2);
        for line in jsonl.lines() {
            assert!(serde_json::from_str::<serde_json::Value>(line).is_ok());
        }
    }

    #[test]
    fn test_render_json_counts() {
        let results = vec![
            result("https://a.example", Some(7), &["Acme Panel"], None),
            result("https://down.example", None, &[], Some(FetchErrorKind::Timeout)),
        ];
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&results).unwrap()).unwrap();
        assert_eq!(json["targets"], 2);
        assert_eq!(json["matched"], 1);
        assert_eq!(json["failed"], 1);
    }
}
