//! Source text to storage-format conversion

use std::ops::Range;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use crate::normalize::split_front_matter;

/// Converts document sources into the remote store's storage format.
///
/// Implementations must be pure: the same input always yields the same
/// output, otherwise every run would plan spurious content updates.
pub trait ContentTranscoder {
    /// Convert source text into storage-format markup.
    ///
    /// The heading [`ContentTranscoder::extract_title`] takes the title from
    /// is left out, since the store shows the title separately.
    fn to_storage_format(&self, source: &str) -> String;

    /// Extract the document title from its first level-1 heading.
    fn extract_title(&self, source: &str) -> Option<String>;
}

/// CommonMark transcoder producing XHTML storage markup.
#[derive(Debug, Clone)]
pub struct MarkdownTranscoder {
    options: Options,
}

impl Default for MarkdownTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownTranscoder {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }
}

impl ContentTranscoder for MarkdownTranscoder {
    fn to_storage_format(&self, source: &str) -> String {
        let body = split_front_matter(source);
        let mut events: Vec<Event<'_>> = Parser::new_ext(body, self.options).collect();
        if let Some((span, _)) = title_heading(&events) {
            events.drain(span);
        }

        let mut output = String::with_capacity(body.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        output
    }

    fn extract_title(&self, source: &str) -> Option<String> {
        let body = split_front_matter(source);
        let events: Vec<Event<'_>> = Parser::new_ext(body, self.options).collect();
        title_heading(&events).map(|(_, title)| title)
    }
}

/// Event span and text of the first level-1 heading with visible text.
fn title_heading(events: &[Event<'_>]) -> Option<(Range<usize>, String)> {
    let mut start = None;
    let mut text = String::new();

    for (idx, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => {
                start = Some(idx);
                text.clear();
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                if let Some(from) = start.take() {
                    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
                    if !collapsed.is_empty() {
                        return Some((from..idx + 1, collapsed));
                    }
                }
            }
            Event::Text(chunk) | Event::Code(chunk) if start.is_some() => text.push_str(chunk),
            Event::SoftBreak | Event::HardBreak if start.is_some() => text.push(' '),
            _ => {}
        }
    }

    None
}
