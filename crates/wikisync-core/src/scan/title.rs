//! Title derivation for files and directories

/// Title of a file without a level-1 heading: the stem with `-` and `_`
/// turned into spaces.
pub fn filename_title(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    };
    let spaced: String = stem
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();
    let title = collapse_whitespace(&spaced);
    if title.is_empty() {
        stem.to_string()
    } else {
        title
    }
}

/// Title of a directory page: letters and spaces only.
///
/// Separators become spaces, digits and punctuation are removed and
/// whitespace is collapsed. A name with nothing left keeps its raw form.
pub fn directory_title(dir_name: &str) -> String {
    let kept: String = dir_name
        .chars()
        .filter_map(|c| match c {
            '-' | '_' | '.' => Some(' '),
            c if c.is_alphabetic() || c.is_whitespace() => Some(c),
            _ => None,
        })
        .collect();
    let title = collapse_whitespace(&kept);
    if title.is_empty() {
        dir_name.to_string()
    } else {
        title
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("setup.md", "setup")]
    #[case("getting-started_guide.md", "getting started guide")]
    #[case("notes.v2.markdown", "notes.v2")]
    #[case("__.md", "__")]
    fn file_titles(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(filename_title(name), expected);
    }

    #[rstest]
    #[case("guide", "guide")]
    #[case("01-getting_started", "getting started")]
    #[case("API (v2)", "API v")]
    #[case("2024", "2024")]
    #[case("  spaced   out ", "spaced out")]
    fn directory_titles(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(directory_title(name), expected);
    }
}
