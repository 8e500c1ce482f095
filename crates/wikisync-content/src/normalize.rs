//! Content normalization helpers
//!
//! Remote stores reformat storage markup on save (indentation, line breaks
//! between tags), so bodies are compared in a whitespace-insensitive form.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_BETWEEN_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+<").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Strip a leading UTF-8 byte-order mark.
pub fn strip_bom(source: &str) -> &str {
    source.strip_prefix(BYTE_ORDER_MARK).unwrap_or(source)
}

/// Split off a leading YAML front matter block, returning the body.
///
/// Front matter must open on the first line with `---` and close with a
/// line containing only `---`. Anything else is returned unchanged.
pub fn split_front_matter(source: &str) -> &str {
    let Some(rest) = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))
    else {
        return source;
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        if line.trim_end() == "---" {
            return rest[offset..].trim_start_matches(['\r', '\n']);
        }
    }
    source
}

/// Normalize storage-format markup for comparison.
///
/// Whitespace between tags is removed and every other whitespace run
/// collapses to a single space.
pub fn normalize_storage(content: &str) -> String {
    let trimmed = content.trim();
    let tight = WHITESPACE_BETWEEN_TAGS.replace_all(trimmed, "><");
    WHITESPACE_RUN.replace_all(&tight, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strip_bom_removes_only_leading_mark() {
        assert_eq!(strip_bom("\u{feff}# Title"), "# Title");
        assert_eq!(strip_bom("# Title\u{feff}"), "# Title\u{feff}");
    }

    #[test]
    fn normalize_ignores_layout_whitespace() {
        let local = "<h1>Intro</h1>\n<p>Hello   world</p>\n";
        let remote = "<h1>Intro</h1>\n  <p>Hello\nworld</p>";
        assert_eq!(normalize_storage(local), normalize_storage(remote));
    }

    #[test]
    fn normalize_keeps_text_differences() {
        assert_ne!(
            normalize_storage("<p>Hello world</p>"),
            normalize_storage("<p>Hello there</p>")
        );
    }

    #[test]
    fn front_matter_is_split_off() {
        let source = "---\ntitle: Ignored\n---\n\n# Heading\n";
        assert_eq!(split_front_matter(source), "# Heading\n");
    }

    #[test]
    fn unterminated_front_matter_is_kept() {
        let source = "---\ntitle: Ignored\n# Heading\n";
        assert_eq!(split_front_matter(source), source);
    }
}
