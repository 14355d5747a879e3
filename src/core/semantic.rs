use indexmap::IndexMap;
use log::{debug, trace};

use crate::core::flattener::build_section;
use crate::core::list_detector::detect_list_tag;
use crate::core::synonyms::CompiledSynonyms;
use crate::core::tree::ElementNode;
use crate::{Section, WellKnownFields};

/// Everything one pass over a tree captures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticCapture {
    pub fields: WellKnownFields,
    pub office_info: IndexMap<String, String>,
    pub headers: IndexMap<String, String>,
    pub sections: Vec<Section>,
}

/// Depth-first, pre-order walk that fills the well-known fields, the
/// residual header map and the table sections in a single descent.
pub struct SemanticWalker<'a> {
    synonyms: &'a CompiledSynonyms,
    capture: SemanticCapture,
}

impl<'a> SemanticWalker<'a> {
    pub fn new(synonyms: &'a CompiledSynonyms) -> Self {
        Self { synonyms, capture: SemanticCapture::default() }
    }

    pub fn run(mut self, root: &ElementNode) -> SemanticCapture {
        self.walk(root, "");
        self.capture
    }

    fn walk(&mut self, node: &ElementNode, path: &str) {
        self.match_fields(node);

        if node.is_leaf() {
            let content = node.text();
            if !content.is_empty() {
                self.capture
                    .headers
                    .insert(format!("{}{}", path, node.name), content.to_string());
            }
            return;
        }

        let child_path = format!("{}{}_", path, node.name);
        match detect_list_tag(&node.children) {
            Some(tag) => {
                debug!("list <{}> under <{}> becomes a table section", tag, node.name);
                let section = build_section(&node.name, node.children.iter().filter(|c| c.name == tag));
                self.capture.sections.push(section);
                for child in node.children.iter().filter(|c| c.name != tag) {
                    self.walk(child, &child_path);
                }
            }
            None => {
                for child in &node.children {
                    self.walk(child, &child_path);
                }
            }
        }
    }

    /// Later matches overwrite earlier ones: in notices that restate a field
    /// under another vocabulary the later occurrence is authoritative.
    fn match_fields(&mut self, node: &ElementNode) {
        let value = match node.content.as_deref() {
            Some(v) if !v.is_empty() => v,
            _ => return,
        };

        let synonyms = self.synonyms;
        for field in synonyms.matching_fields(&node.name) {
            trace!("<{}> captured as {:?}", node.name, field);
            self.capture.fields.set(field, value);
        }

        if synonyms.office_identifier.matches(&node.name) {
            self.capture.office_info.insert(node.name.clone(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::{Parser, XmlTreeParser};

    fn capture(xml: &str) -> SemanticCapture {
        let tree = XmlTreeParser.parse(xml).unwrap();
        SemanticWalker::new(CompiledSynonyms::builtin()).run(&tree.root)
    }

    #[test]
    fn last_address_wins() {
        let c = capture("<R><住所>A</住所><G><所在地>B</所在地></G></R>");
        assert_eq!(c.fields.address.as_deref(), Some("B"));
    }

    #[test]
    fn headers_use_underscore_paths_and_skip_empty_leaves() {
        let c = capture("<R><A>1</A><B><C>2</C><D/></B></R>");
        let keys: Vec<&str> = c.headers.keys().map(String::as_str).collect();
        assert_eq!(keys, ["R_A", "R_B_C"]);
    }

    #[test]
    fn office_identifiers_keep_their_tag_names() {
        let c = capture("<R><事業所整理記号>12-アイウ</事業所整理記号><事業所番号>00123</事業所番号></R>");
        assert_eq!(c.office_info.get("事業所整理記号").map(String::as_str), Some("12-アイウ"));
        assert_eq!(c.office_info.get("事業所番号").map(String::as_str), Some("00123"));
    }

    #[test]
    fn list_items_are_not_walked_for_headers_or_fields() {
        let c = capture(
            "<R><List><Item><住所>in-row</住所></Item><Item><住所>x</住所></Item></List><Other>o</Other></R>",
        );
        assert_eq!(c.fields.address, None);
        assert_eq!(c.sections.len(), 1);
        assert_eq!(c.sections[0].name, "List");
        assert_eq!(c.headers.keys().map(String::as_str).collect::<Vec<_>>(), ["R_Other"]);
    }

    #[test]
    fn non_list_siblings_of_a_list_are_still_walked() {
        let c = capture("<R><P><Row>1</Row><Row>2</Row><Sum>3</Sum></P></R>");
        assert_eq!(c.sections[0].rows.len(), 2);
        assert_eq!(c.headers.get("R_P_Sum").map(String::as_str), Some("3"));
    }

    #[test]
    fn only_the_first_repeated_tag_becomes_a_section() {
        let c = capture("<R><G><A>1</A><B>x</B><A>2</A><B>y</B></G></R>");
        assert_eq!(c.sections.len(), 1);
        assert_eq!(c.sections[0].headers, ["A"]);
        // the other repeat is handled element by element; the last one wins
        assert_eq!(c.headers.get("R_G_B").map(String::as_str), Some("y"));
    }

    #[test]
    fn nothing_recognisable_still_yields_headers() {
        let c = capture("<Unknown><Q>v</Q></Unknown>");
        assert_eq!(c.fields, WellKnownFields::default());
        assert!(c.sections.is_empty());
        assert_eq!(c.headers.len(), 1);
    }
}
