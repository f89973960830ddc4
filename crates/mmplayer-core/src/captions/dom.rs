//! Markup helpers over the html5ever/xml5ever RcDom

use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use xml5ever::driver::XmlParseOpts;

/// Parse markup into a DOM. html5ever recovers from any input, so this
/// never fails; fragments are wrapped in an implied document.
pub(crate) fn parse(markup: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(markup)
}

/// Parse an XML document into the same DOM shape. Self-closing elements
/// and namespaced attributes are kept as written.
pub(crate) fn parse_xml(markup: &str) -> RcDom {
    xml5ever::driver::parse_document(RcDom::default(), XmlParseOpts::default()).one(markup)
}

/// Attribute value by local name
pub(crate) fn attr(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Element name without its namespace prefix
pub(crate) fn local_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

/// Returns true if the element's class list contains `class`
pub(crate) fn has_class(node: &Handle, class: &str) -> bool {
    attr(node, "class")
        .map(|list| list.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// Collect the outermost elements matching `is_match`, in document order.
///
/// Matches nested inside another match are not collected separately.
pub(crate) fn find_outermost<F>(root: &Handle, is_match: &F) -> Vec<Handle>
where
    F: Fn(&Handle) -> bool,
{
    let mut found = Vec::new();
    collect(root, is_match, &mut found);
    found
}

fn collect<F>(node: &Handle, is_match: &F, found: &mut Vec<Handle>)
where
    F: Fn(&Handle) -> bool,
{
    for child in node.children.borrow().iter() {
        if is_element(child) && is_match(child) {
            found.push(child.clone());
        } else {
            collect(child, is_match, found);
        }
    }
}

/// Remove every descendant matching `is_match` from the subtree
pub(crate) fn detach_matching<F>(node: &Handle, is_match: &F)
where
    F: Fn(&Handle) -> bool,
{
    node.children
        .borrow_mut()
        .retain(|child| !(is_element(child) && is_match(child)));

    for child in node.children.borrow().iter() {
        detach_matching(child, is_match);
    }
}

/// Serialize the children of `node` back to markup
pub(crate) fn inner_html(node: &Handle) -> String {
    let mut out = Vec::new();
    let handle = SerializableHandle::from(node.clone());
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };

    if let Err(e) = serialize(&mut out, &handle, opts) {
        tracing::warn!(error = %e, "Failed to serialize caption markup");
        return String::new();
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Strip `img`, `object` and `embed` tags so a fetched document never
/// references external media
pub(crate) fn strip_embedded_media(markup: &str) -> String {
    use regex::Regex;
    use std::sync::OnceLock;

    static EMBEDDED: OnceLock<Regex> = OnceLock::new();
    let re = EMBEDDED.get_or_init(|| {
        Regex::new(r"(?i)</?(img|object|embed)\b[^>]*>").expect("embedded media pattern is valid")
    });

    re.replace_all(markup, "").into_owned()
}

fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}
