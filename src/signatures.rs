// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Favicon signature table.
//!
//! Maps fingerprints to the technology labels known to use them. The table
//! is loaded once at startup and never mutated afterwards; workers share it
//! read-only behind an `Arc` with no locking.
//!
//! Source format is tabular text, one record per line:
//!
//! ```text
//! fingerprint,label
//! ```
//!
//! The fingerprint is a signed decimal 32-bit integer. The first comma on
//! the line is the delimiter; the label is the verbatim remainder, so labels
//! may themselves contain commas. Blank lines and lines starting with `#`
//! are skipped. Duplicate fingerprints are legitimate (a product family can
//! ship the same icon under several names) and accumulate labels in source
//! order.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::errors::SignatureError;
use crate::fingerprint::Fingerprint;

/// Built-in signature table, adapted from publicly documented default
/// favicons for common servers, panels and appliances.
const DEFAULT_SIGNATURES: &str = include_str!("../data/signatures.csv");

#[derive(Debug, Default)]
pub struct SignatureTable {
    entries: HashMap<Fingerprint, Vec<String>>,
    records: usize,
}

impl SignatureTable {
    /// The table compiled into the binary.
    pub fn builtin() -> Self {
        // The embedded source is compile-time data; a parse failure here is
        // a build defect caught by the unit tests, not a runtime condition.
        Self::parse(DEFAULT_SIGNATURES).expect("embedded signature table is well-formed")
    }

    /// Load a signature table from a file, rejecting the whole load on the
    /// first unreadable or malformed record.
    pub fn load(path: &Path) -> Result<Self, SignatureError> {
        let raw = fs::read_to_string(path).map_err(|e| SignatureError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let table = Self::parse(&raw)?;
        info!(
            "Loaded signature table from {}: {} fingerprints, {} records",
            path.display(),
            table.entries.len(),
            table.records
        );
        Ok(table)
    }

    pub fn parse(source: &str) -> Result<Self, SignatureError> {
        let mut entries: HashMap<Fingerprint, Vec<String>> = HashMap::new();
        let mut records = 0;

        for (idx, line) in source.lines().enumerate() {
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }

            let (fp_field, label) =
                line.split_once(',')
                    .ok_or_else(|| SignatureError::Malformed {
                        line: idx + 1,
                        reason: "missing ',' delimiter".to_string(),
                    })?;

            let fp: Fingerprint =
                fp_field
                    .trim()
                    .parse()
                    .map_err(|_| SignatureError::Malformed {
                        line: idx + 1,
                        reason: format!("fingerprint '{}' is not a 32-bit integer", fp_field.trim()),
                    })?;

            entries.entry(fp).or_default().push(label.to_string());
            records += 1;
        }

        Ok(Self { entries, records })
    }

    /// Look up all labels for a fingerprint.
    ///
    /// Total: an unknown fingerprint returns the empty slice. That is the
    /// expected outcome for most of the internet, not an error.
    pub fn lookup(&self, fp: Fingerprint) -> &[String] {
        self.entries.get(&fp).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct fingerprints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records in the source, duplicates included.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Write the built-in table to a file so users can extend it and pass it
    /// back with the fingerprint-file option.
    pub fn dump_default_to_file(path: &Path) -> std::io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_SIGNATURES.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_parses() {
        let table = SignatureTable::builtin();
        assert!(!table.is_empty());
        assert!(table.records() > table.len()); // at least one shared fingerprint
    }

    #[test]
    fn test_builtin_contains_major_technologies() {
        let table = SignatureTable::builtin();
        assert_eq!(table.lookup(-1588080585), ["phpMyAdmin"]);
        assert_eq!(table.lookup(999357577), ["Grafana"]);
        // Spring Boot and Jenkins genuinely ship the same default icon
        assert_eq!(table.lookup(81586312), ["Spring Boot", "Jenkins"]);
    }

    #[test]
    fn test_lookup_unknown_fingerprint_is_empty() {
        let table = SignatureTable::builtin();
        assert!(table.lookup(1).is_empty());
        assert!(table.lookup(i32::MIN).is_empty());
    }

    #[test]
    fn test_duplicate_fingerprints_accumulate_in_source_order() {
        let table =
            SignatureTable::parse("-123456,Acme Panel\n-123456,Acme Panel v2\n").unwrap();
        assert_eq!(table.lookup(-123456), ["Acme Panel", "Acme Panel v2"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records(), 2);
    }

    #[test]
    fn test_label_is_verbatim_remainder_after_first_comma() {
        let table = SignatureTable::parse("42,Acme, Inc. Panel\n").unwrap();
        assert_eq!(table.lookup(42), ["Acme, Inc. Panel"]);
    }

    #[test]
    fn test_negative_fingerprints() {
        let table = SignatureTable::parse("-2057558656,Microsoft IIS\n").unwrap();
        assert_eq!(table.lookup(-2057558656), ["Microsoft IIS"]);
    }

    #[test]
    fn test_blank_lines_and_comments_skipped() {
        let table = SignatureTable::parse("# comment\n\n42,Thing\n   \n").unwrap();
        assert_eq!(table.records(), 1);
    }

    #[test]
    fn test_missing_delimiter_is_fatal() {
        let err = SignatureTable::parse("42,Thing\nbogus line\n").unwrap_err();
        match err {
            SignatureError::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_integer_fingerprint_is_fatal() {
        let err = SignatureTable::parse("not-a-number,Thing\n").unwrap_err();
        assert!(matches!(err, SignatureError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_out_of_range_fingerprint_is_fatal() {
        // One past i32::MAX
        let err = SignatureTable::parse("2147483648,Thing\n").unwrap_err();
        assert!(matches!(err, SignatureError::Malformed { .. }));
    }

    #[test]
    fn test_load_missing_file_is_unreadable() {
        let err = SignatureTable::load(Path::new("/nonexistent/signatures.csv")).unwrap_err();
        assert!(matches!(err, SignatureError::Unreadable { .. }));
    }
}
