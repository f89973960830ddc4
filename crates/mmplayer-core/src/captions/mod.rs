//! Caption model and parsers
//!
//! Captions come from two kinds of markup:
//! - Inline HTML fragments, where caption elements carry a marker class and
//!   `data-begin`/`data-end`/`data-dur` attributes or a relaxed-JSON `data`
//!   attribute ([`InlineParser`])
//! - TTML-like documents, where any element with a `begin` attribute is a
//!   caption ([`TtmlParser`])
//!
//! # Example
//!
//! ```rust
//! use mmplayer_core::captions::InlineParser;
//!
//! let html = r#"<div>
//!   <p class="wb-tmtxt" data-begin="0:00:01" data-dur="2s">Hello</p>
//!   <p class="wb-tmtxt" data-begin="0:00:05" data-end="0:00:07">World</p>
//! </div>"#;
//!
//! let captions = InlineParser::default().parse(html);
//! assert_eq!(captions.len(), 2);
//! assert_eq!(captions[0].end(), 3.0);
//! ```

mod dom;
mod inline;
mod ttml;

pub(crate) use dom::strip_embedded_media;
pub use inline::{InlineParser, DEFAULT_CAPTION_CLASS};
pub use ttml::TtmlParser;

use serde::Serialize;
use std::sync::Arc;

/// A timed text cue, visible while `begin <= position <= end`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Caption {
    text: String,
    begin: f64,
    end: f64,
}

impl Caption {
    /// Create a caption. Returns `None` unless both times are finite,
    /// non-negative and `begin <= end`.
    pub fn new(text: impl Into<String>, begin: f64, end: f64) -> Option<Self> {
        let valid = begin.is_finite() && end.is_finite() && begin >= 0.0 && begin <= end;
        valid.then(|| Self {
            text: text.into(),
            begin,
            end,
        })
    }

    /// Caption markup
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Start of the visibility interval in seconds
    pub fn begin(&self) -> f64 {
        self.begin
    }

    /// End of the visibility interval in seconds
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Returns true if the caption is visible at `position` (inclusive bounds)
    pub fn is_active_at(&self, position: f64) -> bool {
        position >= self.begin && position <= self.end
    }
}

/// An immutable, document-ordered caption sequence.
///
/// Cloning is cheap; a reload replaces the whole track.
pub type CaptionTrack = Arc<[Caption]>;

/// Resolve the end of a caption from an explicit end or a duration
pub(crate) fn resolve_end(begin: f64, end: Option<&str>, dur: Option<&str>) -> f64 {
    use crate::timecode::parse_time;

    match end {
        Some(end) => parse_time(Some(end)),
        None => parse_time(dur) + begin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_invariant() {
        assert!(Caption::new("ok", 1.0, 3.0).is_some());
        assert!(Caption::new("instant", 2.0, 2.0).is_some());
        assert!(Caption::new("reversed", 3.0, 1.0).is_none());
        assert!(Caption::new("nan", f64::NAN, 1.0).is_none());
        assert!(Caption::new("sentinel", -1.0, 1.0).is_none());
    }

    #[test]
    fn test_active_bounds_inclusive() {
        let caption = Caption::new("x", 1.0, 3.0).unwrap();
        assert!(caption.is_active_at(1.0));
        assert!(caption.is_active_at(3.0));
        assert!(!caption.is_active_at(3.01));
    }

    #[test]
    fn test_resolve_end() {
        assert_eq!(resolve_end(1.0, Some("0:00:04"), Some("9s")), 4.0);
        assert_eq!(resolve_end(1.0, None, Some("2s")), 3.0);
        // No end and no duration: sentinel arithmetic leaves end before begin
        assert_eq!(resolve_end(1.0, None, None), 0.0);
    }
}
