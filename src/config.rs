// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::ScannerError;

/// Scan configuration shared by the CLI and embedding callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfig {
    /// Maximum concurrent targets in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-target time budget in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Transport-level retry attempts per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// Signature table file; the built-in table is used when unset
    #[serde(default)]
    pub signature_file: Option<PathBuf>,

    /// Accept invalid TLS certificates (self-signed appliances)
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_concurrency() -> usize {
    50
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            user_agent: None,
            signature_file: None,
            accept_invalid_certs: false,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ScannerError> {
        if self.concurrency == 0 {
            return Err(ScannerError::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ScannerError::Configuration(
                "timeout must be at least 1 second".to_string(),
            ));
        }
        if let Some(ua) = &self.user_agent {
            if ua.trim().is_empty() {
                return Err(ScannerError::Configuration(
                    "user agent must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = ScanConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ScannerError::Configuration(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ScanConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let config: ScanConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.concurrency, 50);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.max_retries, 2);
        assert!(!config.accept_invalid_certs);
    }
}
