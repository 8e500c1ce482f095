//! Identity labels
//!
//! A page created by a run carries a label that encodes the relative path of
//! the document it came from, so the page can be found again after its title
//! or position changes. The wire format is the namespace followed by the
//! lowercase hex of the path's UTF-8 bytes.

use wikisync_fs::NormalizedPath;

/// Prefix shared by every identity label
pub const LABEL_NAMESPACE: &str = "wikisync-";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityLabel(String);

impl IdentityLabel {
    pub fn for_path(path: &NormalizedPath) -> Self {
        Self(format!("{LABEL_NAMESPACE}{}", hex::encode(path.as_str().as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the label fits a store's length limit.
    pub fn fits(&self, max_len: usize) -> bool {
        self.0.len() <= max_len
    }

    /// Decode a label back into the path it names.
    ///
    /// Labels outside the namespace, with invalid hex or with non-UTF-8
    /// content yield `None`. A bare namespace names the empty path.
    pub fn decode(label: &str) -> Option<NormalizedPath> {
        let encoded = label.strip_prefix(LABEL_NAMESPACE)?;
        let bytes = hex::decode(encoded).ok()?;
        let path = String::from_utf8(bytes).ok()?;
        Some(NormalizedPath::new(path))
    }
}

impl std::fmt::Display for IdentityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_lowercase_hex() {
        let label = IdentityLabel::for_path(&NormalizedPath::new("a/B.md"));
        assert_eq!(label.as_str(), "wikisync-612f422e6d64");
    }

    #[test]
    fn decode_rejects_foreign_labels() {
        assert_eq!(IdentityLabel::decode("team-docs"), None);
        assert_eq!(IdentityLabel::decode("wikisync-zz"), None);
        assert_eq!(IdentityLabel::decode("wikisync-ff"), None);
    }

    #[test]
    fn empty_path_round_trips() {
        let label = IdentityLabel::for_path(&NormalizedPath::new("./"));
        assert_eq!(label.as_str(), "wikisync-");
        assert_eq!(IdentityLabel::decode(label.as_str()), Some(NormalizedPath::root()));
    }

    #[test]
    fn length_limit() {
        let label = IdentityLabel::for_path(&NormalizedPath::new("abc"));
        assert_eq!(label.len(), LABEL_NAMESPACE.len() + 6);
        assert!(label.fits(15));
        assert!(!label.fits(14));
    }
}
