//! Inline HTML caption parser
//!
//! Caption elements carry a marker class and their timing either as
//! attributes:
//!
//! ```html
//! <p class="wb-tmtxt" data-begin="0:00:01" data-dur="2s">Hello</p>
//! <p class="wb-tmtxt" data-begin="0:00:05" data-end="0:00:07">World</p>
//! ```
//!
//! or packed in a single relaxed-JSON `data` attribute:
//!
//! ```html
//! <p class="wb-tmtxt" data="{begin: '0:00:01', dur: '2s'}">Hello</p>
//! ```

use super::{dom, resolve_end, Caption};
use crate::timecode::{parse_time, NO_TIMECODE};
use crate::Result;
use markup5ever_rcdom::Handle;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Class that marks caption elements in HTML
pub const DEFAULT_CAPTION_CLASS: &str = "wb-tmtxt";

/// Parser for captions embedded in HTML
#[derive(Debug, Clone)]
pub struct InlineParser {
    caption_class: String,
}

impl Default for InlineParser {
    fn default() -> Self {
        Self::new(DEFAULT_CAPTION_CLASS)
    }
}

impl InlineParser {
    /// Create a parser matching elements with the given class
    pub fn new(caption_class: impl Into<String>) -> Self {
        Self {
            caption_class: caption_class.into(),
        }
    }

    /// Parse markup and extract captions in document order
    pub fn parse(&self, markup: &str) -> Vec<Caption> {
        let dom = dom::parse(markup);
        self.parse_node(&dom.document)
    }

    /// Parse markup and extract the captions inside the element with the
    /// given id. A missing element yields no captions.
    pub fn parse_within(&self, markup: &str, id: &str) -> Vec<Caption> {
        let dom = dom::parse(markup);
        let container = dom::find_outermost(&dom.document, &|n: &Handle| {
            dom::attr(n, "id").as_deref() == Some(id)
        });

        match container.first() {
            Some(container) => self.parse_node(container),
            None => {
                debug!(id, "Caption container not found");
                Vec::new()
            }
        }
    }

    /// Extract captions below an already parsed node
    pub(crate) fn parse_node(&self, root: &Handle) -> Vec<Caption> {
        let is_caption = |n: &Handle| dom::has_class(n, &self.caption_class);
        let elements = dom::find_outermost(root, &is_caption);

        let mut captions = Vec::with_capacity(elements.len());
        for element in &elements {
            let (begin, end) = Self::timing(element);

            dom::detach_matching(element, &is_caption);
            let text = dom::inner_html(element);

            match Caption::new(text, begin, end) {
                Some(caption) => captions.push(caption),
                None => warn!(begin, end, "Skipping caption with invalid timing"),
            }
        }

        debug!(count = captions.len(), "Parsed inline captions");
        captions
    }

    fn timing(element: &Handle) -> (f64, f64) {
        if let Some(begin_attr) = dom::attr(element, "data-begin") {
            let begin = parse_time(Some(&begin_attr));
            let end = resolve_end(
                begin,
                dom::attr(element, "data-end").as_deref(),
                dom::attr(element, "data-dur").as_deref(),
            );
            return (begin, end);
        }

        if let Some(data) = dom::attr(element, "data") {
            return match RelaxedTiming::decode(&data) {
                Ok(timing) => timing.resolve(),
                Err(e) => {
                    warn!(data = %data, error = %e, "Malformed caption data attribute");
                    (NO_TIMECODE, NO_TIMECODE)
                }
            };
        }

        (NO_TIMECODE, NO_TIMECODE)
    }
}

/// Timing packed in a relaxed-JSON `data` attribute
#[derive(Debug, Default, Deserialize)]
struct RelaxedTiming {
    #[serde(default)]
    begin: Option<TimeValue>,
    #[serde(default)]
    end: Option<TimeValue>,
    #[serde(default)]
    dur: Option<TimeValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TimeValue {
    Text(String),
    Seconds(f64),
}

impl TimeValue {
    fn as_text(&self) -> String {
        match self {
            TimeValue::Text(text) => text.clone(),
            TimeValue::Seconds(seconds) => seconds.to_string(),
        }
    }
}

impl RelaxedTiming {
    /// Quote the bare `begin`/`dur`/`end` keys and swap single quotes for
    /// double quotes, then decode as strict JSON.
    ///
    /// The key rewrite is textual: a value that itself contains one of the
    /// key names is corrupted and fails to decode.
    fn decode(data: &str) -> Result<Self> {
        static KEYS: OnceLock<Regex> = OnceLock::new();
        let keys = KEYS.get_or_init(|| Regex::new("(begin|dur|end)").expect("key pattern is valid"));

        let json = keys.replace_all(data, "\"$1\"").replace('\'', "\"");
        Ok(serde_json::from_str(&json)?)
    }

    fn resolve(&self) -> (f64, f64) {
        let begin = parse_time(self.begin.as_ref().map(TimeValue::as_text).as_deref());
        let end = match &self.end {
            Some(end) => parse_time(Some(&end.as_text())),
            None => parse_time(self.dur.as_ref().map(TimeValue::as_text).as_deref()) + begin,
        };
        (begin, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_timing() {
        let html = r#"<section>
            <p class="wb-tmtxt" data-begin="0:00:01" data-dur="2s">First</p>
            <p class="wb-tmtxt" data-begin="0:00:05" data-end="0:00:07">Second</p>
        </section>"#;

        let captions = InlineParser::default().parse(html);
        assert_eq!(captions.len(), 2);
        assert_eq!((captions[0].begin(), captions[0].end()), (1.0, 3.0));
        assert_eq!((captions[1].begin(), captions[1].end()), (5.0, 7.0));
        assert_eq!(captions[0].text(), "First");
    }

    #[test]
    fn test_relaxed_json_timing() {
        let html = r#"<div class="wb-tmtxt" data="{begin: '0:00:10', dur: '4s'}">Packed</div>
            <div class="wb-tmtxt" data="{begin: '12.5s', end: '0:00:20'}">Explicit</div>"#;

        let captions = InlineParser::default().parse(html);
        assert_eq!(captions.len(), 2);
        assert_eq!((captions[0].begin(), captions[0].end()), (10.0, 14.0));
        assert_eq!((captions[1].begin(), captions[1].end()), (12.5, 20.0));
    }

    #[test]
    fn test_relaxed_json_key_collision_is_dropped() {
        // "end" inside the value gets quoted too and breaks the JSON
        let html = r#"<p class="wb-tmtxt" data="{begin: '1s', dur: 'weekend'}">Oops</p>"#;
        assert!(InlineParser::default().parse(html).is_empty());
    }

    #[test]
    fn test_nested_captions_detached() {
        let html = r#"<div class="wb-tmtxt" data-begin="1s" data-end="5s">Outer <span class="wb-tmtxt" data-begin="2s" data-end="3s">Inner</span></div>"#;

        let captions = InlineParser::default().parse(html);
        assert_eq!(captions.len(), 1);
        assert_eq!(captions[0].text(), "Outer ");
    }

    #[test]
    fn test_document_order_not_sorted() {
        let html = r#"<p class="wb-tmtxt" data-begin="9s" data-dur="1s">late</p>
            <p class="wb-tmtxt" data-begin="1s" data-dur="1s">early</p>"#;

        let captions = InlineParser::default().parse(html);
        assert_eq!(captions[0].text(), "late");
        assert_eq!(captions[1].text(), "early");
    }

    #[test]
    fn test_unmarked_and_untimed_elements() {
        let html = r#"<p data-begin="1s" data-dur="1s">no class</p>
            <p class="wb-tmtxt">no timing</p>
            <p class="other wb-tmtxt" data-begin="1s" data-dur="1s">kept</p>"#;

        let captions = InlineParser::default().parse(html);
        assert_eq!(captions.len(), 1);
        assert_eq!(captions[0].text(), "kept");
    }

    #[test]
    fn test_custom_class() {
        let html = r#"<p class="cue" data-begin="1s" data-dur="1s">custom</p>"#;
        assert_eq!(InlineParser::new("cue").parse(html).len(), 1);
        assert!(InlineParser::default().parse(html).is_empty());
    }
}
