//! Arena-backed XML tree
//!
//! Elements live in a flat `Vec` and refer to each other by [`NodeId`]. The
//! tree is built from text with `roxmltree` and serialized with `quick-xml`.
//! Namespace declarations are kept at document level and emitted on the root
//! element.

use crate::error::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Element or attribute name with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
}

impl QName {
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: name.into(),
            namespace: None,
        }
    }

    pub fn prefixed(
        prefix: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: QName,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: QName,
    pub attributes: Vec<XmlAttribute>,
    /// Direct text content; whitespace-only text is dropped
    pub text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl XmlElement {
    fn new(name: QName, parent: Option<NodeId>) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            parent,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local == local)
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// `None` for the default namespace
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlDocument {
    nodes: Vec<XmlElement>,
    root: Option<NodeId>,
    namespaces: Vec<NamespaceDecl>,
}

impl XmlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse XML text into an arena tree.
    pub fn parse(input: &str) -> Result<Self> {
        let parsed = roxmltree::Document::parse(input)?;
        let mut doc = Self::new();

        for node in parsed.descendants().filter(|n| n.is_element()) {
            for ns in node.namespaces() {
                if ns.name() == Some("xml") {
                    continue;
                }
                doc.declare_namespace(ns.name(), ns.uri());
            }
        }

        let root = doc.build(parsed.root_element(), None);
        doc.root = Some(root);
        Ok(doc)
    }

    fn build(&mut self, node: roxmltree::Node<'_, '_>, parent: Option<NodeId>) -> NodeId {
        let tag = node.tag_name();
        let name = QName {
            prefix: tag
                .namespace()
                .and_then(|uri| node.lookup_prefix(uri))
                .map(str::to_string),
            local: tag.name().to_string(),
            namespace: tag.namespace().map(str::to_string),
        };

        let mut element = XmlElement::new(name, parent);
        element.attributes = node
            .attributes()
            .map(|a| XmlAttribute {
                name: QName {
                    prefix: a
                        .namespace()
                        .and_then(|uri| node.lookup_prefix(uri))
                        .map(str::to_string),
                    local: a.name().to_string(),
                    namespace: a.namespace().map(str::to_string),
                },
                value: a.value().to_string(),
            })
            .collect();

        let text: String = node
            .children()
            .filter(|c| c.is_text())
            .filter_map(|c| c.text())
            .collect();
        if !text.trim().is_empty() {
            element.text = Some(text);
        }

        let id = self.push(element);
        for child in node.children().filter(|c| c.is_element()) {
            let child_id = self.build(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    fn push(&mut self, element: XmlElement) -> NodeId {
        self.nodes.push(element);
        NodeId(self.nodes.len() - 1)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Create the root element. Replaces any existing tree.
    pub fn set_root(&mut self, name: QName) -> NodeId {
        self.nodes.clear();
        let id = self.push(XmlElement::new(name, None));
        self.root = Some(id);
        id
    }

    pub fn element(&self, id: NodeId) -> &XmlElement {
        &self.nodes[id.0]
    }

    pub fn element_mut(&mut self, id: NodeId) -> &mut XmlElement {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.0].children.iter().copied()
    }

    pub fn append_child(&mut self, parent: NodeId, name: QName) -> NodeId {
        let id = self.push(XmlElement::new(name, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Set or replace an attribute, matching on local name and namespace.
    pub fn set_attribute(&mut self, id: NodeId, name: QName, value: String) {
        let element = &mut self.nodes[id.0];
        match element
            .attributes
            .iter_mut()
            .find(|a| a.name.local == name.local && a.name.namespace == name.namespace)
        {
            Some(existing) => existing.value = value,
            None => element.attributes.push(XmlAttribute { name, value }),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn namespaces(&self) -> &[NamespaceDecl] {
        &self.namespaces
    }

    pub fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|ns| ns.prefix.as_deref() == Some(prefix))
            .map(|ns| ns.uri.as_str())
    }

    /// Declare a namespace on the root. Returns `false` when the prefix is
    /// already declared.
    pub fn declare_namespace(&mut self, prefix: Option<&str>, uri: &str) -> bool {
        if self
            .namespaces
            .iter()
            .any(|ns| ns.prefix.as_deref() == prefix)
        {
            return false;
        }
        self.namespaces.push(NamespaceDecl {
            prefix: prefix.map(str::to_string),
            uri: uri.to_string(),
        });
        true
    }

    /// Serialize with two-space indentation and an XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        if let Some(root) = self.root {
            self.write_element(&mut writer, root, true)?;
        }
        let bytes = writer.into_inner().into_inner();
        Ok(String::from_utf8(bytes)?)
    }

    fn write_element(
        &self,
        writer: &mut Writer<Cursor<Vec<u8>>>,
        id: NodeId,
        declare_namespaces: bool,
    ) -> Result<()> {
        let element = &self.nodes[id.0];
        let name = element.name.qualified();
        let mut start = BytesStart::new(name.as_str());

        if declare_namespaces {
            for ns in &self.namespaces {
                let attr = match &ns.prefix {
                    Some(prefix) => format!("xmlns:{}", prefix),
                    None => "xmlns".to_string(),
                };
                start.push_attribute((attr.as_str(), ns.uri.as_str()));
            }
        }
        for attr in &element.attributes {
            start.push_attribute((attr.name.qualified().as_str(), attr.value.as_str()));
        }

        if element.children.is_empty() && element.text.is_none() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = &element.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &element.children {
            self.write_element(writer, *child, false)?;
        }
        writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builds_arena() {
        let doc = XmlDocument::parse(
            r#"<orders xmlns:p="urn:p"><order id="1"><p:sku>A</p:sku></order><order id="2"/></orders>"#,
        )
        .unwrap();

        let root = doc.root().unwrap();
        assert_eq!(doc.element(root).name.local, "orders");
        let orders: Vec<_> = doc.children(root).collect();
        assert_eq!(orders.len(), 2);
        assert_eq!(doc.element(orders[1]).attribute("id"), Some("2"));
        assert_eq!(doc.element(orders[0]).parent(), Some(root));

        let sku = doc.children(orders[0]).next().unwrap();
        let name = &doc.element(sku).name;
        assert_eq!(name.prefix.as_deref(), Some("p"));
        assert_eq!(name.namespace.as_deref(), Some("urn:p"));
        assert_eq!(doc.element(sku).text.as_deref(), Some("A"));
        assert_eq!(doc.namespace_uri("p"), Some("urn:p"));
    }

    #[test]
    fn test_whitespace_only_text_is_dropped() {
        let doc = XmlDocument::parse("<a>\n   <b> x </b>\n</a>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.element(root).text, None);
        let b = doc.children(root).next().unwrap();
        assert_eq!(doc.element(b).text.as_deref(), Some(" x "));
    }

    #[test]
    fn test_serialize_declares_namespaces_on_root() {
        let mut doc = XmlDocument::new();
        doc.declare_namespace(Some("p"), "urn:p");
        let root = doc.set_root(QName::prefixed("p", "order", "urn:p"));
        let item = doc.append_child(root, QName::local("item"));
        doc.element_mut(item).text = Some("a & b".into());
        doc.append_child(root, QName::local("empty"));
        doc.set_attribute(root, QName::local("id"), "7".into());
        doc.set_attribute(root, QName::local("id"), "8".into());

        let xml = doc.to_xml_string().unwrap();
        assert!(xml.contains(r#"<p:order xmlns:p="urn:p" id="8">"#));
        assert!(xml.contains("<item>a &amp; b</item>"));
        assert!(xml.contains("<empty/>"));
        assert!(xml.contains("</p:order>"));

        let back = XmlDocument::parse(&xml).unwrap();
        assert_eq!(back.len(), 3);
    }

    #[test]
    fn test_declare_namespace_once() {
        let mut doc = XmlDocument::new();
        assert!(doc.declare_namespace(Some("p"), "urn:p"));
        assert!(!doc.declare_namespace(Some("p"), "urn:other"));
        assert_eq!(doc.namespace_uri("p"), Some("urn:p"));
    }
}
