//! RSS 2.0 / Atom parsing into [`NewsItem`]s.
//!
//! The document is read into a small element tree first so entry fields can be
//! looked up by descendant name, the way a DOM query would. Any structural
//! problem rejects the whole document; there is no partial recovery.

use crate::feed::types::{NewsItem, SUMMARY_MAX_CHARS, TITLE_PLACEHOLDER};
use anyhow::{bail, Context};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use scraper::Html;

const ENTRY_TAGS: [&str; 2] = ["item", "entry"];
const SUMMARY_TAGS: [&str; 4] = ["description", "summary", "content", "encoded"];

#[derive(Debug, Clone, Default)]
struct Element {
    /// Local name, prefix stripped (`content:encoded` -> `encoded`).
    name: String,
    /// Qualified attribute names with unescaped values.
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

#[derive(Debug, Clone)]
enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> anyhow::Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.context("invalid attribute")?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .context("invalid attribute value")?
                .into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// First descendant (document order, excluding `self`) with the given local name.
    fn find(&self, name: &str) -> Option<&Element> {
        for child in &self.children {
            if let Node::Element(e) = child {
                if e.name == name {
                    return Some(e);
                }
                if let Some(found) = e.find(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// `self` and all descendants whose local name is in `names`, in document order.
    fn collect_named<'a>(&'a self, names: &[&str], out: &mut Vec<&'a Element>) {
        if names.contains(&self.name.as_str()) {
            out.push(self);
        }
        for child in &self.children {
            if let Node::Element(e) = child {
                e.collect_named(names, out);
            }
        }
    }
}

fn parse_document(xml: &str) -> anyhow::Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("XML error at byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(e) => {
                if stack.is_empty() && root.is_some() {
                    bail!("multiple root elements");
                }
                stack.push(Element::from_start(&e)?);
            }
            Event::Empty(e) => {
                let element = Element::from_start(&e)?;
                close(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                // End names are already checked against the start tag by the reader.
                let element = stack.pop().context("unexpected closing tag")?;
                close(element, &mut stack, &mut root)?;
            }
            Event::Text(e) => {
                let text = e.unescape().context("invalid character data")?;
                push_text(&text, &mut stack)?;
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                push_text(&text, &mut stack)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        bail!("unexpected end of document inside <{}>", open.name);
    }
    root.context("document has no root element")
}

fn close(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> anyhow::Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => {
            if root.is_some() {
                bail!("multiple root elements");
            }
            *root = Some(element);
        }
    }
    Ok(())
}

fn push_text(text: &str, stack: &mut [Element]) -> anyhow::Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Text(text.to_string())),
        None if text.trim().is_empty() => {}
        None => bail!("text content outside the root element"),
    }
    Ok(())
}

/// Parses a feed body and returns at most `max_items` entries in document order.
///
/// An empty vec means the document was well-formed but had no `item`/`entry`.
pub fn parse_feed(xml: &str, max_items: usize) -> anyhow::Result<Vec<NewsItem>> {
    let root = parse_document(xml)?;

    let mut entries = Vec::new();
    root.collect_named(&ENTRY_TAGS, &mut entries);

    Ok(entries
        .into_iter()
        .take(max_items)
        .map(news_item)
        .collect())
}

fn news_item(entry: &Element) -> NewsItem {
    let title = entry
        .find("title")
        .map(|t| t.text_content().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| TITLE_PLACEHOLDER.to_string());

    let raw_summary = SUMMARY_TAGS
        .iter()
        .filter_map(|tag| entry.find(tag))
        .map(Element::text_content)
        .find(|text| !text.trim().is_empty())
        .unwrap_or_default();

    NewsItem {
        title,
        summary: plain_summary(&raw_summary),
        link: entry_link(entry),
    }
}

fn entry_link(entry: &Element) -> String {
    let link = entry
        .find("link")
        .map(|l| match l.attr("href").filter(|h| !h.trim().is_empty()) {
            Some(href) => href.trim().to_string(),
            None => l.text_content().trim().to_string(),
        })
        .unwrap_or_default();
    if !link.is_empty() {
        return link;
    }

    match entry.find("guid") {
        Some(guid)
            if guid
                .attr("isPermaLink")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")) =>
        {
            guid.text_content().trim().to_string()
        }
        _ => String::new(),
    }
}

/// Markup-free, whitespace-collapsed, and at most [`SUMMARY_MAX_CHARS`] characters.
pub fn plain_summary(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(SUMMARY_MAX_CHARS).collect()
}
