// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Error Types
 * Production-ready error handling with thiserror
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main scanner error type
#[derive(Error, Debug)]
pub enum ScannerError {
    /// Configuration errors - always fatal at startup
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Signature table errors - always fatal at startup
    #[error("Signature table error: {0}")]
    Signature(#[from] SignatureError),

    /// Fetch errors that escaped the per-target boundary
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// General errors
    #[error("Scanner error: {0}")]
    General(String),
}

/// Signature table load failures. A partially loaded table silently corrupts
/// every lookup, so the whole load is rejected on the first bad record.
#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("cannot read signature source {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("malformed record on line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Classification of a per-target fetch failure.
///
/// These are data on the match result, never control flow: one target
/// failing must not abort the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchErrorKind {
    Timeout,
    NotFound,
    ConnectionError,
    Other,
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchErrorKind::Timeout => write!(f, "TIMEOUT"),
            FetchErrorKind::NotFound => write!(f, "NOT_FOUND"),
            FetchErrorKind::ConnectionError => write!(f, "CONNECTION_ERROR"),
            FetchErrorKind::Other => write!(f, "OTHER"),
        }
    }
}

impl FetchErrorKind {
    /// Transport-level faults are worth another attempt; a missing icon or a
    /// bad URL is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchErrorKind::Timeout => true,
            FetchErrorKind::ConnectionError => true,
            FetchErrorKind::NotFound => false,
            FetchErrorKind::Other => false,
        }
    }
}

/// A classified fetch failure for one target.
#[derive(Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Timeout, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::NotFound, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Convert reqwest errors to classified fetch errors
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FetchErrorKind::Timeout
        } else if err.is_connect() {
            FetchErrorKind::ConnectionError
        } else if err.is_status() {
            match err.status() {
                Some(status) if status == reqwest::StatusCode::NOT_FOUND => {
                    FetchErrorKind::NotFound
                }
                _ => FetchErrorKind::Other,
            }
        } else {
            FetchErrorKind::Other
        };

        FetchError::new(kind, err.to_string())
    }
}

/// Result type for scanner operations
pub type ScannerResult<T> = Result<T, ScannerError>;
