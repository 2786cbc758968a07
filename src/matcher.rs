// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Favicon Match Engine
 * Orchestrates fetch -> canonicalize -> hash -> lookup per target
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::FetchErrorKind;
use crate::fetcher::FaviconFetcher;
use crate::fingerprint::{hash_favicon, Fingerprint};
use crate::signatures::SignatureTable;

/// Outcome of checking one target.
///
/// "Checked, nothing known" (`fingerprint` set, `matched` false) and "could
/// not be checked" (`fetch_error` set, no fingerprint) are distinct outcomes
/// and both are reported; a batch always yields one record per target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,
    pub matched: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<FetchErrorKind>,
    pub checked_at: String,
}

pub struct MatchEngine {
    table: Arc<SignatureTable>,
    fetcher: Arc<dyn FaviconFetcher>,
    concurrency: usize,
}

impl MatchEngine {
    pub fn new(
        table: Arc<SignatureTable>,
        fetcher: Arc<dyn FaviconFetcher>,
        concurrency: usize,
    ) -> Self {
        Self {
            table,
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Check a single target. Never fails: fetch errors become data on the
    /// result record.
    pub async fn match_one(&self, target: &str) -> MatchResult {
        match self.fetcher.fetch(target).await {
            Ok(bytes) => {
                let fp = hash_favicon(&bytes);
                let labels = self.table.lookup(fp).to_vec();
                debug!(
                    "Fingerprinted {} as {} ({} label(s))",
                    target,
                    fp,
                    labels.len()
                );
                MatchResult {
                    target: target.to_string(),
                    fingerprint: Some(fp),
                    matched: !labels.is_empty(),
                    labels,
                    fetch_error: None,
                    checked_at: Utc::now().to_rfc3339(),
                }
            }
            Err(err) => {
                debug!("Favicon fetch failed for {}: {}", target, err);
                MatchResult {
                    target: target.to_string(),
                    fingerprint: None,
                    matched: false,
                    labels: Vec::new(),
                    fetch_error: Some(err.kind),
                    checked_at: Utc::now().to_rfc3339(),
                }
            }
        }
    }

    /// Check a batch of targets with bounded concurrency.
    ///
    /// Output order follows input order regardless of completion order.
    /// Cancelling the token stops new fetches from being dispatched and
    /// aborts in-flight ones; results for targets that already completed are
    /// still returned.
    pub async fn match_all(
        &self,
        targets: &[String],
        cancel: &CancellationToken,
    ) -> Vec<MatchResult> {
        let mut indexed: Vec<(usize, MatchResult)> = stream::iter(targets.iter().enumerate())
            .map(|(idx, target)| {
                let cancel = cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    // Biased: a target that finishes in the same instant the
                    // batch is cancelled still counts as completed.
                    tokio::select! {
                        biased;
                        result = self.match_one(target) => Some((idx, result)),
                        _ = cancel.cancelled() => None,
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|entry| async move { entry })
            .collect()
            .await;

        indexed.sort_by_key(|(idx, _)| *idx);

        let results: Vec<MatchResult> = indexed.into_iter().map(|(_, r)| r).collect();
        let matched = results.iter().filter(|r| r.matched).count();
        let failed = results.iter().filter(|r| r.fetch_error.is_some()).count();
        info!(
            "Batch finished: {}/{} completed, {} matched, {} failed",
            results.len(),
            targets.len(),
            matched,
            failed
        );
        results
    }
}
