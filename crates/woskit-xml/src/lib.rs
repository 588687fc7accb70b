//! Owned-tree XML parsing for individual record fragments.
//!
//! Record extraction needs random access into one record's markup (look up
//! `static_data/summary/names`, then read attributes off each child), which
//! a single SAX pass does not give. This crate assembles quick-xml's event
//! stream into a small owned tree and exposes the narrow query surface the
//! extractor needs: find-first / find-all by slash-separated child path,
//! concatenated text content, and attribute reads.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),
    #[error("unclosed element <{0}> at end of input")]
    Unclosed(String),
    #[error("closing tag </{0}> without matching open tag")]
    UnexpectedClose(String),
    #[error("document has no root element")]
    NoRoot,
    #[error("content after the root element: <{0}>")]
    TrailingContent(String),
}

/// A parsed XML fragment with a single root element.
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
}

/// One element: name, attributes, and interleaved text/child content.
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    nodes: Vec<Node>,
}

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Element(Element),
}

impl Document {
    /// Parse one well-formed XML fragment into an element tree.
    ///
    /// The fragment must contain exactly one root element. Prolog,
    /// comments, and processing instructions are skipped.
    pub fn parse(xml: &str) -> Result<Document, XmlError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    if root.is_some() && stack.is_empty() {
                        return Err(XmlError::TrailingContent(name_of(e)));
                    }
                    stack.push(element_from(e));
                }
                Event::Empty(ref e) => {
                    if root.is_some() && stack.is_empty() {
                        return Err(XmlError::TrailingContent(name_of(e)));
                    }
                    close(element_from(e), &mut stack, &mut root);
                }
                Event::Text(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = e.unescape()?;
                        parent.nodes.push(Node::Text(text.into_owned()));
                    }
                    // Text outside the root (typically whitespace) is dropped.
                }
                Event::CData(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                        parent.nodes.push(Node::Text(text));
                    }
                }
                Event::End(ref e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let element = stack.pop().ok_or(XmlError::UnexpectedClose(name))?;
                    close(element, &mut stack, &mut root);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Unclosed(open.name));
        }
        match root {
            Some(root) => Ok(Document { root }),
            None => Err(XmlError::NoRoot),
        }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn name_of(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn element_from(start: &BytesStart<'_>) -> Element {
    let mut attrs = Vec::new();
    for attr in start.attributes().flatten() {
        attrs.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            String::from_utf8_lossy(&attr.value).into_owned(),
        ));
    }
    Element {
        name: name_of(start),
        attrs,
        nodes: Vec::new(),
    }
}

/// Attach a finished element to its parent, or install it as the root.
fn close(element: Element, stack: &mut Vec<Element>, root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.nodes.push(Node::Element(element)),
        None => *root = Some(element),
    }
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct child elements, in document order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First descendant reached by the `/`-separated child-name path,
    /// in document order. A leading `./` is tolerated.
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_path(&segments(path))
    }

    /// All descendants reached by the path, in document order.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.find_path_all(&segments(path), &mut out);
        out
    }

    /// All text content inside this element, concatenated in document
    /// order. Text inside nested inline markup contributes as well, so
    /// `On the <i>k</i>-SAT Problem` reads back intact.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn find_path(&self, segs: &[&str]) -> Option<&Element> {
        let Some((first, rest)) = segs.split_first() else {
            return Some(self);
        };
        self.children()
            .filter(|child| child.name == *first)
            .find_map(|child| child.find_path(rest))
    }

    fn find_path_all<'a>(&'a self, segs: &[&str], out: &mut Vec<&'a Element>) {
        let Some((first, rest)) = segs.split_first() else {
            out.push(self);
            return;
        };
        for child in self.children().filter(|child| child.name == *first) {
            child.find_path_all(rest, out);
        }
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.nodes {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_find() {
        let doc = Document::parse(
            r#"<rec id="1">
  <head>
    <title kind="main">First</title>
    <title kind="alt">Second</title>
  </head>
</rec>"#,
        )
        .unwrap();

        let root = doc.root();
        assert_eq!(root.name(), "rec");
        assert_eq!(root.attr("id"), Some("1"));

        let title = root.find("head/title").unwrap();
        assert_eq!(title.text(), "First");
        assert_eq!(title.attr("kind"), Some("main"));

        let all = root.find_all("head/title");
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].text(), "Second");
    }

    #[test]
    fn test_find_missing_path() {
        let doc = Document::parse("<rec><a><b>x</b></a></rec>").unwrap();
        assert!(doc.root().find("a/c").is_none());
        assert!(doc.root().find_all("c/b").is_empty());
        assert_eq!(doc.root().attr("nope"), None);
    }

    #[test]
    fn test_leading_dot_slash() {
        let doc = Document::parse("<rec><a><b>x</b></a></rec>").unwrap();
        assert_eq!(doc.root().find("./a/b").unwrap().text(), "x");
    }

    #[test]
    fn test_path_matches_children_not_descendants() {
        // A path segment only descends one level, so "rec/b" must not
        // reach a <b> nested under <a>.
        let doc = Document::parse("<rec><a><b>deep</b></a><b>shallow</b></rec>").unwrap();
        let found = doc.root().find("b").unwrap();
        assert_eq!(found.text(), "shallow");
    }

    #[test]
    fn test_text_spans_inline_markup() {
        let doc =
            Document::parse("<title>On the <i>k</i>-SAT Problem</title>").unwrap();
        assert_eq!(doc.root().text(), "On the k-SAT Problem");
    }

    #[test]
    fn test_text_unescapes_entities() {
        let doc = Document::parse("<h>Science &amp; Technology</h>").unwrap();
        assert_eq!(doc.root().text(), "Science & Technology");
    }

    #[test]
    fn test_cdata_text() {
        let doc = Document::parse("<p><![CDATA[a < b]]></p>").unwrap();
        assert_eq!(doc.root().text(), "a < b");
    }

    #[test]
    fn test_empty_element() {
        let doc = Document::parse(r#"<ids><id type="doi" value="10.1/x"/></ids>"#).unwrap();
        let id = doc.root().find("id").unwrap();
        assert_eq!(id.attr("type"), Some("doi"));
        assert_eq!(id.attr("value"), Some("10.1/x"));
        assert_eq!(id.text(), "");
    }

    #[test]
    fn test_children_iterates_elements_only() {
        let doc = Document::parse("<set>\n  <k>a</k>\n  <k>b</k>\n</set>").unwrap();
        let names: Vec<String> = doc
            .root()
            .children()
            .map(|c| c.text())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_mismatched_close_is_error() {
        assert!(Document::parse("<a><b></a></b>").is_err());
    }

    #[test]
    fn test_unclosed_root_is_error() {
        assert!(Document::parse("<a><b>x</b>").is_err());
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(matches!(Document::parse(""), Err(XmlError::NoRoot)));
        assert!(matches!(Document::parse("   \n"), Err(XmlError::NoRoot)));
    }

    #[test]
    fn test_second_root_is_error() {
        assert!(matches!(
            Document::parse("<a>x</a><b>y</b>"),
            Err(XmlError::TrailingContent(_))
        ));
    }

    #[test]
    fn test_prolog_and_comments_skipped() {
        let doc = Document::parse(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- c -->\n<rec><v>1</v></rec>",
        )
        .unwrap();
        assert_eq!(doc.root().find("v").unwrap().text(), "1");
    }
}
