//! Content fingerprinting
//!
//! A fingerprint is the SHA-256 digest of the raw fetched content, hex encoded.
//! Text is hashed as its UTF-8 bytes, so the same document yields the same
//! fingerprint on every platform and across restarts.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex-encoded SHA-256 digest of a document's raw content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    /// Wraps a digest read back from storage
    ///
    /// No validation is done: a ledger written by an older tool may carry a
    /// digest of another length, which simply never matches a fresh one.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first `n` characters, for log lines
    pub fn short(&self, n: usize) -> &str {
        let end = self.0.len().min(n);
        self.0.get(..end).unwrap_or(&self.0)
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the fingerprint of raw content
///
/// # Examples
///
/// ```
/// use tidemark::fingerprint::fingerprint;
///
/// let a = fingerprint("<html>same</html>");
/// let b = fingerprint(b"<html>same</html>".as_slice());
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 64);
/// ```
pub fn fingerprint(content: impl AsRef<[u8]>) -> ContentFingerprint {
    let mut hasher = Sha256::new();
    hasher.update(content.as_ref());
    ContentFingerprint(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let content = "<html><body>Article body</body></html>";
        assert_eq!(fingerprint(content), fingerprint(content));
    }

    #[test]
    fn test_known_digest() {
        // SHA-256 of the empty string
        assert_eq!(
            fingerprint("").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_distinct_inputs_differ() {
        let inputs = [
            "",
            " ",
            "a",
            "A",
            "<p>hello</p>",
            "<p>hello</p>\n",
            "<p>hellö</p>",
            "<p>hello</p><!-- build 2 -->",
        ];

        for (i, a) in inputs.iter().enumerate() {
            for b in inputs.iter().skip(i + 1) {
                assert_ne!(fingerprint(a), fingerprint(b), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_text_and_bytes_agree() {
        let text = "naïve café";
        assert_eq!(fingerprint(text), fingerprint(text.as_bytes()));
    }

    #[test]
    fn test_short_prefix() {
        let fp = fingerprint("x");
        assert_eq!(fp.short(8).len(), 8);
        assert_eq!(ContentFingerprint::from_hex("abc").short(8), "abc");
    }
}
