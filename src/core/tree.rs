use indexmap::IndexMap;
use roxmltree::{Document, Node, ParsingOptions};
use serde::{Deserialize, Serialize};

use crate::error::MalformedXmlError;

const XML_PREFIX: &str = "xml";

/// Generic element node. `content` is `Some` exactly when `children` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    pub fn leaf(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            content: Some(content.into()),
            children: Vec::new(),
        }
    }

    /// An empty `children` list yields a leaf with empty content, keeping the
    /// leaf/internal invariant.
    pub fn branch(name: impl Into<String>, children: Vec<ElementNode>) -> Self {
        let content = if children.is_empty() { Some(String::new()) } else { None };
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            content,
            children,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaf text, or `""` for internal nodes.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    pub fn child(&self, name: &str) -> Option<&ElementNode> {
        self.children.iter().find(|c| c.name == name)
    }

    fn write_outline(&self, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push_str(&format!(" [{}={}]", key, value));
        }
        if let Some(content) = &self.content {
            if !content.is_empty() {
                out.push_str(" : ");
                out.push_str(content);
            }
        }
        out.push('\n');
        for child in &self.children {
            child.write_outline(depth + 1, out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingInstruction {
    pub target: String,
    #[serde(default)]
    pub data: String,
}

/// Parsed document: the root element plus the processing instructions found
/// next to it. Instructions nested inside elements are not tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTree {
    pub root: ElementNode,
    #[serde(default)]
    pub processing_instructions: Vec<ProcessingInstruction>,
}

impl DocumentTree {
    pub fn new(root: ElementNode) -> Self {
        Self { root, processing_instructions: Vec::new() }
    }

    /// Indented text rendering, the fallback view when no record can be shown.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for pi in &self.processing_instructions {
            out.push_str(&format!("<?{} {}?>\n", pi.target, pi.data));
        }
        self.root.write_outline(0, &mut out);
        out
    }
}

pub trait Parser {
    /// Parse raw document text into a `DocumentTree`.
    fn parse(&self, text: &str) -> Result<DocumentTree, MalformedXmlError>;
}

/// Tree builder backed by roxmltree.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlTreeParser;

impl Parser for XmlTreeParser {
    fn parse(&self, text: &str) -> Result<DocumentTree, MalformedXmlError> {
        let options = ParsingOptions { allow_dtd: true, ..ParsingOptions::default() };
        let doc = Document::parse_with_options(text, options)?;

        let processing_instructions = doc
            .root()
            .children()
            .filter_map(|n| n.pi())
            .map(|pi| ProcessingInstruction {
                target: pi.target.to_string(),
                data: pi.value.unwrap_or("").to_string(),
            })
            .collect();

        Ok(DocumentTree {
            root: build_element(doc.root_element()),
            processing_instructions,
        })
    }
}

fn build_element(node: Node) -> ElementNode {
    let mut attributes = IndexMap::new();

    // Declarations are kept as attributes so a re-serialized tree still binds
    // its prefixes. Only those introduced on this element are recorded.
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    for ns in node.namespaces() {
        if ns.name() == Some(XML_PREFIX) || inherited.contains(&(ns.name(), ns.uri())) {
            continue;
        }
        let key = match ns.name() {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        attributes.insert(key, ns.uri().to_string());
    }

    for attr in node.attributes() {
        let key = qualified_name(node, attr.namespace(), attr.name());
        attributes.insert(key, attr.value().to_string());
    }

    let name = qualified_name(node, node.tag_name().namespace(), node.tag_name().name());
    let element_children: Vec<ElementNode> = node
        .children()
        .filter(|c| c.is_element())
        .map(build_element)
        .collect();

    if element_children.is_empty() {
        let text: String = node
            .children()
            .filter(|c| c.is_text())
            .filter_map(|c| c.text())
            .collect();
        ElementNode {
            name,
            attributes,
            content: Some(text.trim().to_string()),
            children: Vec::new(),
        }
    } else {
        ElementNode { name, attributes, content: None, children: element_children }
    }
}

fn qualified_name(node: Node, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local),
        _ => local.to_string(),
    }
}
