// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Favicon content canonicalization.
//!
//! The public favicon-hash ecosystem (Shodan's `http.favicon.hash`, FOFA's
//! `icon_hash`, and the signature tables built against them) does not hash
//! the raw icon bytes. It hashes the base64 encoding of those bytes,
//! re-wrapped into 76-character lines joined by `\n` with a trailing `\n` -
//! the serialization produced by the line-wrapping text encoders the original
//! tooling was built on. Reproducing that form byte-for-byte is what makes
//! our fingerprints comparable with everyone else's: a one-character
//! whitespace difference changes the hash.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Width of one line of encoded output.
const WRAP_WIDTH: usize = 76;

/// Encode raw favicon bytes into the canonical block the hash consumes.
///
/// Total and deterministic for any byte sequence. Empty input yields a
/// single empty line (`"\n"`), not an empty string - the final chunk is
/// always emitted, even when zero-length.
pub fn canonicalize(bytes: &[u8]) -> String {
    let encoded = BASE64.encode(bytes);

    let mut block = String::with_capacity(encoded.len() + encoded.len() / WRAP_WIDTH + 1);
    let mut rest = encoded.as_str();
    while rest.len() > WRAP_WIDTH {
        // base64 output is pure ASCII, so the split is always on a char boundary
        let (line, tail) = rest.split_at(WRAP_WIDTH);
        block.push_str(line);
        block.push('\n');
        rest = tail;
    }
    block.push_str(rest);
    block.push('\n');
    block
}
