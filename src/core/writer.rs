use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::core::tree::{DocumentTree, ElementNode};
use crate::error::SerializeError;

/// Serialize a tree back to XML text.
///
/// Reparsing the output with `XmlTreeParser` yields the same tree: names,
/// attributes, leaf content and top-level processing instructions survive.
/// Text that sat between child elements was already dropped by the parser.
pub fn to_xml(tree: &DocumentTree) -> Result<String, SerializeError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    for pi in &tree.processing_instructions {
        let body = if pi.data.is_empty() {
            pi.target.clone()
        } else {
            format!("{} {}", pi.target, pi.data)
        };
        writer.write_event(Event::PI(BytesText::from_escaped(body)))?;
    }

    write_element(&mut writer, &tree.root)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_element(writer: &mut Writer<Vec<u8>>, node: &ElementNode) -> Result<(), SerializeError> {
    let mut start = BytesStart::new(node.name.as_str());
    for (key, value) in &node.attributes {
        let value = escape_attribute(value);
        start.push_attribute((key.as_bytes(), value.as_bytes()));
    }
    writer.write_event(Event::Start(start))?;

    if node.is_leaf() {
        let text = node.text();
        if !text.is_empty() {
            writer.write_event(Event::Text(BytesText::from_escaped(escape_text(text))))?;
        }
    } else {
        for child in &node.children {
            write_element(writer, child)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new(node.name.as_str())))?;
    Ok(())
}

/// Markup escapes plus character references for whitespace that attribute
/// value normalization would otherwise fold into spaces.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }
    Cow::Owned(
        escaped
            .replace('\n', "&#10;")
            .replace('\r', "&#13;")
            .replace('\t', "&#9;"),
    )
}

/// Line-end normalization turns a literal `\r` into `\n` on reparse.
fn escape_text(text: &str) -> Cow<'_, str> {
    let escaped = escape(text);
    if escaped.contains('\r') {
        Cow::Owned(escaped.replace('\r', "&#13;"))
    } else {
        escaped
    }
}
