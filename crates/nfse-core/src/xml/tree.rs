//! Minimal read-only element tree built with quick-xml.
//!
//! Element names are resolved against their namespace declarations and kept
//! as [`QName`]s, so `<ns:Numero xmlns:ns="urn:x">` becomes `{urn:x}Numero`
//! (Clark notation) while a bare `<Numero>` stays unqualified.

use std::fmt;

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use tracing::trace;

use crate::error::XmlError;

/// Result type for XML tree operations.
pub type Result<T> = std::result::Result<T, XmlError>;

/// An element name, optionally qualified by a namespace URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    namespace: Option<String>,
    local: String,
}

impl QName {
    /// Unqualified name.
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: name.into(),
        }
    }

    /// Name qualified by `namespace`.
    pub fn qualified(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: name.into(),
        }
    }

    pub fn new(namespace: Option<&str>, name: &str) -> Self {
        match namespace {
            Some(ns) => Self::qualified(ns, name),
            None => Self::local(name),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// An XML element with its direct text and child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: QName,
    text: String,
    declared_namespaces: Vec<String>,
    children: Vec<Element>,
}

impl Element {
    /// Parse XML bytes into the root element.
    pub fn parse(xml: &[u8]) -> Result<Element> {
        let mut reader = NsReader::from_reader(xml);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (ns, event) = match reader.read_resolved_event_into(&mut buf) {
                Ok(resolved) => resolved,
                Err(e) => return Err(XmlError::Malformed(e.to_string())),
            };

            match event {
                Event::Start(start) => {
                    let name = resolve(ns, &start)?;
                    stack.push(Element::open(name, &start, reader.decoder())?);
                }
                Event::Empty(start) => {
                    let name = resolve(ns, &start)?;
                    let element = Element::open(name, &start, reader.decoder())?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| XmlError::Malformed("unmatched closing tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut().filter(|el| el.children.is_empty()) {
                        let text = text
                            .unescape()
                            .map_err(|e| XmlError::Malformed(e.to_string()))?;
                        current.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut().filter(|el| el.children.is_empty()) {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }

            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::UnexpectedEof(open.tag()));
        }

        let root = root.ok_or(XmlError::NoRoot)?;
        trace!("Parsed XML tree rooted at {}", root.name);
        Ok(root)
    }

    fn open(name: QName, start: &BytesStart<'_>, decoder: Decoder) -> Result<Element> {
        Ok(Element {
            name,
            text: String::new(),
            declared_namespaces: namespace_declarations(start, decoder)?,
            children: Vec::new(),
        })
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Qualified tag name in Clark notation (`{uri}local`, or `local`).
    pub fn tag(&self) -> String {
        self.name.to_string()
    }

    /// Text directly inside this element, up to its first child element.
    ///
    /// Text and CDATA sections before the first child are concatenated;
    /// anything after a child (mixed content tails) is not kept.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the element carries any non-whitespace text.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Namespace URIs declared with `xmlns` attributes on this element.
    pub fn declared_namespaces(&self) -> &[String] {
        &self.declared_namespaces
    }

    /// This element followed by all of its descendants, in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// First element named `name` among this element and its descendants.
    pub fn find(&self, name: &QName) -> Option<&Element> {
        self.descendants().find(|el| el.name == *name)
    }

    /// First immediate child named `name`.
    pub fn find_child(&self, name: &QName) -> Option<&Element> {
        self.children.iter().find(|el| el.name == *name)
    }

    /// First element reached by following `path` child by child from here.
    ///
    /// Every branch is explored: `a/b` matches `b` under the second `a` if
    /// the first `a` has none.
    pub fn find_path(&self, path: &[QName]) -> Option<&Element> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self
                .children
                .iter()
                .filter(|child| child.name == *head)
                .find_map(|child| child.find_path(rest)),
        }
    }
}

/// Pre-order iterator over an element and its descendants.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

fn resolve(ns: ResolveResult<'_>, start: &BytesStart<'_>) -> Result<QName> {
    let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    match ns {
        ResolveResult::Bound(Namespace(uri)) => {
            Ok(QName::qualified(String::from_utf8_lossy(uri), local))
        }
        ResolveResult::Unbound => Ok(QName::local(local)),
        ResolveResult::Unknown(prefix) => Err(XmlError::UnboundPrefix(
            String::from_utf8_lossy(&prefix).into_owned(),
        )),
    }
}

fn namespace_declarations(start: &BytesStart<'_>, decoder: Decoder) -> Result<Vec<String>> {
    let mut uris = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Malformed(e.to_string()))?;
        if attr.key.as_namespace_binding().is_none() {
            continue;
        }
        let uri = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| XmlError::Malformed(e.to_string()))?;
        if !uri.is_empty() {
            uris.push(uri.into_owned());
        }
    }

    Ok(uris)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }

    if root.is_some() {
        return Err(XmlError::MultipleRoots(element.tag()));
    }

    *root = Some(element);
    Ok(())
}
