//! TTML-like caption parser
//!
//! Every element with a `begin` attribute is a caption; its end comes from
//! `end` or `begin + dur`. Timing on the `tt`, `body` and `div` containers
//! scopes their children and never makes a caption of its own.
//!
//! Documents are read as XML, so TTML head blocks (`<styling>`, `<layout>`)
//! and self-closing elements parse as written.

use super::{dom, resolve_end, Caption};
use crate::timecode::parse_time;
use markup5ever_rcdom::Handle;
use tracing::{debug, warn};

/// Elements whose timing applies to their children
const TIMING_CONTAINERS: &[&str] = &["tt", "body", "div"];

fn is_caption(node: &Handle) -> bool {
    dom::attr(node, "begin").is_some()
        && !dom::local_name(node).is_some_and(|name| TIMING_CONTAINERS.contains(&name))
}

/// Parser for timed-text documents
#[derive(Debug, Clone, Copy, Default)]
pub struct TtmlParser;

impl TtmlParser {
    /// Parse a timed-text document and extract captions in document order
    pub fn parse(&self, markup: &str) -> Vec<Caption> {
        let dom = dom::parse_xml(markup);
        self.parse_node(&dom.document)
    }

    pub(crate) fn parse_node(&self, root: &Handle) -> Vec<Caption> {
        let elements = dom::find_outermost(root, &is_caption);

        let mut captions = Vec::with_capacity(elements.len());
        for element in &elements {
            let begin = parse_time(dom::attr(element, "begin").as_deref());
            let end = resolve_end(
                begin,
                dom::attr(element, "end").as_deref(),
                dom::attr(element, "dur").as_deref(),
            );

            dom::detach_matching(element, &is_caption);

            match Caption::new(dom::inner_html(element), begin, end) {
                Some(caption) => captions.push(caption),
                None => warn!(begin, end, "Skipping caption with invalid timing"),
            }
        }

        debug!(count = captions.len(), "Parsed timed-text captions");
        captions
    }
}
