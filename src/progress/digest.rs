//! Short labels for content digests.
//!
//! Digests are expected as `<algorithm>:<hex>`, e.g. `sha256:6ae2...`. The
//! label is the leading part of the hex portion. Anything else is labeled
//! from its own leading characters instead of being sliced at a fixed offset.

/// Hex characters kept in a label by default
pub const DEFAULT_LABEL_LENGTH: usize = 16;

const ELLIPSIS: &str = "...";

/// Rule for deriving a display label from a digest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestLabel {
    length: usize,
}

impl Default for DigestLabel {
    fn default() -> Self {
        Self {
            length: DEFAULT_LABEL_LENGTH,
        }
    }
}

impl DigestLabel {
    /// A zero length falls back to the default.
    pub fn new(length: usize) -> Self {
        if length == 0 {
            return Self::default();
        }
        Self { length }
    }

    pub fn label(&self, digest: &str) -> String {
        match split_digest(digest) {
            Some((_, hex)) => truncate(hex, self.length),
            None => {
                log::warn!("Unexpected digest format: {}", digest);
                truncate(digest, self.length)
            }
        }
    }
}

/// Split `<algorithm>:<hex>` into its parts, if the digest has that shape.
pub fn split_digest(digest: &str) -> Option<(&str, &str)> {
    let (algorithm, encoded) = digest.split_once(':')?;

    if algorithm.is_empty() || !algorithm.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    // Rejects non-hex characters and odd lengths alike
    if encoded.is_empty() || hex::decode(encoded).is_err() {
        return None;
    }

    Some((algorithm, encoded))
}

fn truncate(text: &str, length: usize) -> String {
    match text.char_indices().nth(length) {
        Some((end, _)) => format!("{}{}", &text[..end], ELLIPSIS),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "sha256:6ae28029995007a3ee8d0b8556d50f3b59b831074cf19c84de87acf51fb54054";

    #[test]
    fn test_label_sha256() {
        let label = DigestLabel::default().label(DIGEST);
        assert_eq!(label, "6ae28029995007a3...");
    }

    #[test]
    fn test_label_custom_length() {
        let label = DigestLabel::new(8).label(DIGEST);
        assert_eq!(label, "6ae28029...");
    }

    #[test]
    fn test_zero_length_uses_default() {
        assert_eq!(DigestLabel::new(0).length, DEFAULT_LABEL_LENGTH);
    }

    #[test]
    fn test_short_hex_not_truncated() {
        let label = DigestLabel::default().label("sha256:abcd");
        assert_eq!(label, "abcd");
    }

    #[test]
    fn test_other_algorithm() {
        let label = DigestLabel::new(4).label("blake3:0011223344");
        assert_eq!(label, "0011...");
    }

    #[test]
    fn test_unexpected_format_does_not_panic() {
        assert_eq!(DigestLabel::new(4).label("abc"), "abc");
        assert_eq!(DigestLabel::new(4).label("layer-without-prefix"), "laye...");
        assert_eq!(DigestLabel::new(2).label("äöüß"), "äö...");
    }

    #[test]
    fn test_split_digest() {
        assert_eq!(split_digest("sha256:abcd"), Some(("sha256", "abcd")));
        assert_eq!(split_digest("sha256:"), None);
        assert_eq!(split_digest(":abcd"), None);
        assert_eq!(split_digest("sha256:xyz0"), None);
        assert_eq!(split_digest("sha256:abc"), None);
        assert_eq!(split_digest("no-colon"), None);
    }
}
