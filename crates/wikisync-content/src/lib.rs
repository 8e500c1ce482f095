//! Markdown transcoding and content normalization for wikisync
//!
//! The sync engine only talks to [`ContentTranscoder`]; [`MarkdownTranscoder`]
//! is the implementation the command-line tool ships with.

pub mod normalize;
pub mod transcoder;

pub use normalize::{normalize_storage, split_front_matter, strip_bom};
pub use transcoder::{ContentTranscoder, MarkdownTranscoder};
