//! Owned XML tree for SVG artwork.
//!
//! A [`Document`] stores every node of the input in an arena: elements with
//! their attributes in source order, plus text, comments, processing
//! instructions, the XML declaration and the doctype as opaque events that are
//! written back verbatim. Untouched attribute values keep their original
//! escaping.
//!
//! Nodes are addressed by [`NodeId`], which is only meaningful for the
//! document that produced it. Detached nodes stay in the arena; they are
//! simply no longer reachable from the root and no longer indexed by id.
//!
//! Every mutation bumps the document revision, which is how
//! [`Resolver`](crate::resolve::Resolver) knows its cache is stale.

use std::{
    borrow::Cow,
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use log::debug;
use quick_xml::{
    Reader, Writer,
    errors::IllFormedError,
    escape::{escape, unescape},
    events::{BytesEnd, BytesStart, Event, attributes::Attribute as XmlAttribute},
    name::QName,
};

use deckstyle_core::identifier::Id;

use crate::error::DeckstyleError;

const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(0);

/// Handle of a node inside one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// The element kinds the engine understands, keyed by local name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `path`
    Path,
    /// `rect`
    Rect,
    /// `g`
    Group,
    /// `use`
    Reference,
    Other,
}

impl ElementKind {
    /// Classifies an element by its qualified name.
    pub fn from_name(name: &str) -> Self {
        match split_name(name).1 {
            "path" => ElementKind::Path,
            "rect" => ElementKind::Rect,
            "g" => ElementKind::Group,
            "use" => ElementKind::Reference,
            _ => ElementKind::Other,
        }
    }
}

/// Splits a qualified name `prefix:local` into its parts.
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

#[derive(Debug, Clone)]
struct Attribute {
    name: String,
    value: String,
    /// The escaped source text, dropped once the value is modified.
    raw: Option<String>,
}

/// An element with its qualified name and attributes.
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
    self_closing: bool,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            self_closing: true,
        }
    }

    fn from_start(start: &BytesStart<'_>, self_closing: bool) -> Result<Self, quick_xml::Error> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()));
        element.self_closing = self_closing;

        for attribute in start.attributes() {
            let attribute = attribute?;
            let raw = String::from_utf8_lossy(&attribute.value).into_owned();
            let value = unescape(&raw)?.into_owned();
            element.attributes.push(Attribute {
                name: String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
                value,
                raw: Some(raw),
            });
        }
        Ok(element)
    }

    /// Returns the qualified name, e.g. `path` or `svg:path`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ElementKind {
        ElementKind::from_name(&self.name)
    }

    /// Returns the unescaped value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }

    /// Iterates attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|attribute| (attribute.name.as_str(), attribute.value.as_str()))
    }

    pub fn id(&self) -> Option<Id> {
        self.attribute("id").map(Id::new)
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|attribute| attribute.name == name) {
            Some(attribute) => {
                if attribute.value != value {
                    attribute.value = value.to_string();
                    attribute.raw = None;
                }
            }
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
                raw: None,
            }),
        }
    }

    fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|attribute| attribute.name != name);
    }

    fn to_start(&self) -> BytesStart<'_> {
        let mut start = BytesStart::new(self.name.as_str());
        for attribute in &self.attributes {
            let value = match &attribute.raw {
                Some(raw) if !raw.contains('"') => Cow::Borrowed(raw.as_str()),
                _ => escape(attribute.value.as_str()),
            };
            let value = match value {
                Cow::Borrowed(text) => Cow::Borrowed(text.as_bytes()),
                Cow::Owned(text) => Cow::Owned(text.into_bytes()),
            };
            start.push_attribute(XmlAttribute {
                key: QName(attribute.name.as_bytes()),
                value,
            });
        }
        start
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Element(Element),
    Other(Event<'static>),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An SVG document held as an editable tree.
///
/// # Examples
///
/// ```
/// # use deckstyle::document::Document;
/// # use deckstyle_core::identifier::Id;
/// let mut doc = Document::parse(r#"<svg><g id="card"><rect id="pip"/></g></svg>"#).unwrap();
///
/// let pip = doc.lookup(Id::new("pip")).unwrap();
/// doc.set_attribute(pip, "transform", "translate(1,2)");
///
/// assert_eq!(
///     doc.to_xml().unwrap(),
///     r#"<svg><g id="card"><rect id="pip" transform="translate(1,2)"/></g></svg>"#
/// );
/// ```
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    index: HashMap<Id, NodeId>,
    xlink_prefix: Option<String>,
    instance: u64,
    revision: u64,
}

impl Document {
    const ROOT: NodeId = NodeId(0);

    fn empty() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
            index: HashMap::new(),
            xlink_prefix: None,
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            revision: 0,
        }
    }

    /// Parses a document from XML text.
    ///
    /// # Errors
    ///
    /// Returns [`DeckstyleError::Xml`] for ill-formed input.
    pub fn parse(text: &str) -> Result<Self, DeckstyleError> {
        let mut reader = Reader::from_str(text);
        let mut document = Self::empty();
        let mut open = vec![Self::ROOT];

        loop {
            let parent = open.last().copied().unwrap_or(Self::ROOT);
            match reader.read_event()? {
                Event::Start(start) => {
                    let element = Element::from_start(&start, false)?;
                    let node = document.push(NodeKind::Element(element), Some(parent));
                    open.push(node);
                }
                Event::Empty(start) => {
                    let element = Element::from_start(&start, true)?;
                    document.push(NodeKind::Element(element), Some(parent));
                }
                Event::End(_) => {
                    if open.len() > 1 {
                        open.pop();
                    }
                }
                Event::Eof => break,
                other => {
                    document.push(NodeKind::Other(other.into_owned()), Some(parent));
                }
            }
        }

        if let Some(&unclosed) = open.get(1) {
            let name = document
                .element(unclosed)
                .map(|element| element.name.clone())
                .unwrap_or_default();
            return Err(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(name)).into());
        }

        document.xlink_prefix = document.find_xlink_prefix();
        document.reindex();
        debug!(
            nodes = document.nodes.len(),
            ids = document.index.len(),
            xlink_prefix:? = document.xlink_prefix;
            "Document parsed"
        );
        Ok(document)
    }

    /// Serializes the document back to XML text.
    pub fn to_xml(&self) -> Result<String, DeckstyleError> {
        let mut writer = Writer::new(Vec::new());
        for &child in &self.node(Self::ROOT).children {
            self.write_node(&mut writer, child)?;
        }
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, node: NodeId) -> Result<(), DeckstyleError> {
        let data = self.node(node);
        match &data.kind {
            NodeKind::Root => {}
            NodeKind::Other(event) => writer.write_event(event.borrow())?,
            NodeKind::Element(element) => {
                let start = element.to_start();
                if data.children.is_empty() && element.self_closing {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for &child in &data.children {
                        self.write_node(writer, child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
                }
            }
        }
        Ok(())
    }

    /// Identifies this document for caches keyed by node.
    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// Counter bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the outermost element.
    pub fn root_element(&self) -> Option<NodeId> {
        self.child_elements(Self::ROOT).next()
    }

    /// Finds the attached element with the given id.
    ///
    /// When several elements share an id, the first in document order wins.
    pub fn lookup(&self, id: Id) -> Option<NodeId> {
        self.index.get(&id).copied()
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.node(node).kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn kind(&self, node: NodeId) -> ElementKind {
        self.element(node)
            .map_or(ElementKind::Other, Element::kind)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|element| element.attribute(name))
    }

    pub fn element_id(&self, node: NodeId) -> Option<Id> {
        self.element(node).and_then(Element::id)
    }

    /// A name for `node` in messages: its id, or its tag in angle brackets.
    pub fn label(&self, node: NodeId) -> String {
        match self.element(node) {
            Some(element) => match element.attribute("id") {
                Some(id) => id.to_string(),
                None => format!("<{}>", element.name),
            },
            None => "<document>".to_string(),
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// Iterates the direct child elements of `node`.
    pub fn child_elements(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(node)
            .children
            .iter()
            .copied()
            .filter(|&child| self.element(child).is_some())
    }

    /// Returns every element below `node` in pre-order, excluding `node`.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.node(node).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if self.element(next).is_some() {
                result.push(next);
                stack.extend(self.node(next).children.iter().rev().copied());
            }
        }
        result
    }

    /// Whether `node` is reachable from the document root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.is_ancestor(Self::ROOT, node)
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.node(node).parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.node(parent).parent;
        }
        false
    }

    /// The prefix bound to the XLink namespace, if the document declares one.
    pub fn xlink_prefix(&self) -> Option<&str> {
        self.xlink_prefix.as_deref()
    }

    /// The attribute name new references should use for their target.
    pub fn href_name(&self) -> String {
        match &self.xlink_prefix {
            Some(prefix) => format!("{prefix}:href"),
            None => "href".to_string(),
        }
    }

    /// Returns the `href` of a reference, plain or XLink-qualified.
    pub fn href(&self, node: NodeId) -> Option<&str> {
        let element = self.element(node)?;
        element
            .attributes
            .iter()
            .find(|attribute| match split_name(&attribute.name) {
                (None, "href") => true,
                (Some(prefix), "href") => self.xlink_prefix.as_deref() == Some(prefix),
                _ => false,
            })
            .map(|attribute| attribute.value.as_str())
    }

    /// Sets an attribute, adding it after the existing ones when absent.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let NodeKind::Element(element) = &mut self.node_mut(node).kind {
            element.set_attribute(name, value);
            self.touch();
            if name == "id" && self.is_attached(node) {
                self.reindex();
            }
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let NodeKind::Element(element) = &mut self.node_mut(node).kind {
            element.remove_attribute(name);
            self.touch();
            if name == "id" && self.is_attached(node) {
                self.reindex();
            }
        }
    }

    /// Creates a detached element.
    pub fn create_element<'a>(
        &mut self,
        name: &str,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> NodeId {
        let mut element = Element::new(name);
        for (attribute, value) in attributes {
            element.set_attribute(attribute, value);
        }
        self.push(NodeKind::Element(element), None)
    }

    /// Copies `node` and its subtree into new detached nodes.
    pub fn deep_clone(&mut self, node: NodeId) -> NodeId {
        let kind = self.node(node).kind.clone();
        let copy = self.push(kind, None);
        let children = self.node(node).children.clone();
        for child in children {
            let child_copy = self.deep_clone(child);
            self.node_mut(child_copy).parent = Some(copy);
            self.node_mut(copy).children.push(child_copy);
        }
        copy
    }

    /// Removes `node` and its subtree from the tree.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.node_mut(node).parent.take() else {
            return;
        };
        self.node_mut(parent).children.retain(|&child| child != node);
        self.touch();
        self.reindex();
    }

    /// Inserts the detached `node` right after `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) {
        let Some(parent) = self.node(anchor).parent else {
            return;
        };
        let siblings = &mut self.node_mut(parent).children;
        let position = siblings
            .iter()
            .position(|&child| child == anchor)
            .map_or(siblings.len(), |i| i + 1);
        siblings.insert(position, node);
        self.node_mut(node).parent = Some(parent);
        self.touch();
        self.reindex();
    }

    /// Puts the detached `replacement` where `node` is and detaches `node`.
    pub fn replace(&mut self, node: NodeId, replacement: NodeId) {
        let Some(parent) = self.node_mut(node).parent.take() else {
            return;
        };
        for child in &mut self.node_mut(parent).children {
            if *child == node {
                *child = replacement;
            }
        }
        self.node_mut(replacement).parent = Some(parent);
        self.touch();
        self.reindex();
    }

    fn node(&self, node: NodeId) -> &Node {
        &self.nodes[node.0]
    }

    fn node_mut(&mut self, node: NodeId) -> &mut Node {
        &mut self.nodes[node.0]
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let node = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.node_mut(parent).children.push(node);
        }
        node
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn reindex(&mut self) {
        let mut index = HashMap::new();
        for node in self.descendants(Self::ROOT) {
            if let Some(id) = self.element_id(node) {
                index.entry(id).or_insert(node);
            }
        }
        self.index = index;
    }

    fn find_xlink_prefix(&self) -> Option<String> {
        self.descendants(Self::ROOT).into_iter().find_map(|node| {
            self.element(node)?.attributes().find_map(|(name, value)| {
                let prefix = name.strip_prefix("xmlns:")?;
                (value == XLINK_NAMESPACE).then(|| prefix.to_string())
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!-- card sheet -->
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="100">
  <g id="ace">
    <path id="pip" d="M0,0 L10,10" style="fill:#000"/>
    <use id="copy" xlink:href="#pip" x="5"/>
    <text>A &amp; B</text>
  </g>
  <rect id="back" width="10" height="20"></rect>
</svg>
"##;

    fn id(doc: &Document, name: &str) -> NodeId {
        doc.lookup(Id::new(name)).unwrap()
    }

    #[test]
    fn test_round_trip_without_edits() {
        let doc = Document::parse(SHEET).unwrap();
        assert_eq!(doc.to_xml().unwrap(), SHEET);
    }

    #[test]
    fn test_single_quoted_attributes_are_requoted() {
        let doc = Document::parse("<svg><g id='a' title='say \"hi\"'/></svg>").unwrap();
        assert_eq!(
            doc.to_xml().unwrap(),
            r#"<svg><g id="a" title="say &quot;hi&quot;"/></svg>"#
        );
    }

    #[test]
    fn test_element_kinds() {
        let doc = Document::parse(SHEET).unwrap();
        assert_eq!(doc.kind(id(&doc, "ace")), ElementKind::Group);
        assert_eq!(doc.kind(id(&doc, "pip")), ElementKind::Path);
        assert_eq!(doc.kind(id(&doc, "copy")), ElementKind::Reference);
        assert_eq!(doc.kind(id(&doc, "back")), ElementKind::Rect);
        assert_eq!(ElementKind::from_name("svg:use"), ElementKind::Reference);
        assert_eq!(ElementKind::from_name("text"), ElementKind::Other);
    }

    #[test]
    fn test_xlink_href() {
        let doc = Document::parse(SHEET).unwrap();
        assert_eq!(doc.xlink_prefix(), Some("xlink"));
        assert_eq!(doc.href_name(), "xlink:href");
        assert_eq!(doc.href(id(&doc, "copy")), Some("#pip"));

        let plain = Document::parse(r##"<svg><use id="u" href="#a"/></svg>"##).unwrap();
        assert_eq!(plain.href_name(), "href");
        assert_eq!(plain.href(id(&plain, "u")), Some("#a"));
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let doc = Document::parse(SHEET).unwrap();
        let labels: Vec<String> = doc
            .descendants(doc.root_element().unwrap())
            .into_iter()
            .map(|node| doc.label(node))
            .collect();
        assert_eq!(labels, ["ace", "pip", "copy", "<text>", "back"]);
    }

    #[test]
    fn test_attribute_values_are_unescaped() {
        let doc = Document::parse(r#"<svg><g id="a" data-x="1 &lt; 2"/></svg>"#).unwrap();
        assert_eq!(doc.attribute(id(&doc, "a"), "data-x"), Some("1 < 2"));
    }

    #[test]
    fn test_set_attribute_escapes_and_bumps_revision() {
        let mut doc = Document::parse(r#"<svg><g id="a"/></svg>"#).unwrap();
        let revision = doc.revision();
        doc.set_attribute(id(&doc, "a"), "data-x", "a<b");
        assert!(doc.revision() > revision);
        assert_eq!(doc.to_xml().unwrap(), r#"<svg><g id="a" data-x="a&lt;b"/></svg>"#);
    }

    #[test]
    fn test_detach_removes_subtree_from_index() {
        let mut doc = Document::parse(SHEET).unwrap();
        let ace = id(&doc, "ace");
        let pip = id(&doc, "pip");
        doc.detach(ace);
        assert!(doc.lookup(Id::new("ace")).is_none());
        assert!(doc.lookup(Id::new("pip")).is_none());
        assert!(!doc.is_attached(pip));
        assert!(!doc.to_xml().unwrap().contains("ace"));
    }

    #[test]
    fn test_insert_after() {
        let mut doc = Document::parse(r#"<svg><g id="a"/><g id="c"/></svg>"#).unwrap();
        let node = doc.create_element("g", [("id", "b")]);
        doc.insert_after(id(&doc, "a"), node);
        assert_eq!(doc.lookup(Id::new("b")), Some(node));
        assert_eq!(
            doc.to_xml().unwrap(),
            r#"<svg><g id="a"/><g id="b"/><g id="c"/></svg>"#
        );
    }

    #[test]
    fn test_deep_clone_and_replace() {
        let mut doc =
            Document::parse(r##"<svg><g id="src"><path id="p"/></g><use id="u" href="#src"/></svg>"##)
                .unwrap();
        let clone = doc.deep_clone(id(&doc, "src"));
        assert!(!doc.is_attached(clone));

        doc.set_attribute(clone, "id", "u");
        doc.replace(id(&doc, "u"), clone);
        assert_eq!(doc.lookup(Id::new("u")), Some(clone));
        assert_eq!(
            doc.to_xml().unwrap(),
            r#"<svg><g id="src"><path id="p"/></g><g id="u"><path id="p"/></g></svg>"#
        );
        // The original keeps the duplicated descendant id.
        assert_eq!(doc.lookup(Id::new("p")), doc.child_elements(id(&doc, "src")).next());
    }

    #[test]
    fn test_first_duplicate_id_wins() {
        let doc = Document::parse(r#"<svg><g id="x" class="first"/><g id="x"/></svg>"#).unwrap();
        assert_eq!(doc.attribute(id(&doc, "x"), "class"), Some("first"));
    }

    #[test]
    fn test_ill_formed_input() {
        assert!(matches!(
            Document::parse("<svg><g></svg>"),
            Err(DeckstyleError::Xml(_))
        ));
        assert!(matches!(
            Document::parse("<svg><g>"),
            Err(DeckstyleError::Xml(_))
        ));
    }

    #[test]
    fn test_documents_have_distinct_instances() {
        let a = Document::parse("<svg/>").unwrap();
        let b = Document::parse("<svg/>").unwrap();
        assert_ne!(a.instance(), b.instance());
    }
}
