use indexmap::IndexSet;

use crate::core::tree::ElementNode;
use crate::{Row, Section};

/// Flatten one list item into a row.
///
/// Leaf descendants become cells keyed by the underscore-joined names of
/// their ancestors below the item, so the item's own name never appears in a
/// key: `<Item><X>1</X><Y><Z>2</Z></Y></Item>` gives `{X: 1, Y_Z: 2}`. An
/// item that is itself a leaf yields a single cell under its own name.
pub fn flatten_item(item: &ElementNode) -> Row {
    let mut row = Row::new();
    if item.is_leaf() {
        bind(&mut row, "", item);
    } else {
        for child in &item.children {
            flatten_into(&mut row, "", child);
        }
    }
    row
}

fn flatten_into(row: &mut Row, prefix: &str, node: &ElementNode) {
    if node.is_leaf() {
        bind(row, prefix, node);
        return;
    }
    let nested = format!("{}{}_", prefix, node.name);
    for child in &node.children {
        flatten_into(row, &nested, child);
    }
}

fn bind(row: &mut Row, prefix: &str, leaf: &ElementNode) {
    row.insert(format!("{}{}", prefix, leaf.name), leaf.text().to_string());
}

/// Accumulates rows for one table section, tracking the union of column keys
/// in first-seen order. Rows are kept as flattened, never padded.
#[derive(Debug)]
pub struct SectionBuilder {
    name: String,
    headers: IndexSet<String>,
    rows: Vec<Row>,
}

impl SectionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), headers: IndexSet::new(), rows: Vec::new() }
    }

    pub fn push_item(&mut self, item: &ElementNode) {
        let row = flatten_item(item);
        for key in row.keys() {
            if !self.headers.contains(key) {
                self.headers.insert(key.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn finish(self) -> Section {
        Section {
            name: self.name,
            is_table: true,
            headers: self.headers.into_iter().collect(),
            rows: self.rows,
        }
    }
}

/// Build a table section called `name`, one row per item.
pub fn build_section<'a>(
    name: &str,
    items: impl IntoIterator<Item = &'a ElementNode>,
) -> Section {
    let mut builder = SectionBuilder::new(name);
    for item in items {
        builder.push_item(item);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_name_never_prefixes_keys() {
        let item = ElementNode::branch(
            "Item",
            vec![
                ElementNode::leaf("X", "1"),
                ElementNode::branch("Y", vec![ElementNode::leaf("Z", "2")]),
            ],
        );
        let row = flatten_item(&item);
        let cells: Vec<(&str, &str)> = row.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(cells, [("X", "1"), ("Y_Z", "2")]);
    }

    #[test]
    fn prefixes_accumulate_with_depth() {
        let item = ElementNode::branch(
            "Item",
            vec![ElementNode::branch(
                "A",
                vec![ElementNode::branch("B", vec![ElementNode::leaf("C", "deep")])],
            )],
        );
        assert_eq!(flatten_item(&item).get("A_B_C").map(String::as_str), Some("deep"));
    }

    #[test]
    fn empty_leaf_is_a_present_cell() {
        let item = ElementNode::branch("Item", vec![ElementNode::leaf("Note", "")]);
        assert_eq!(flatten_item(&item).get("Note").map(String::as_str), Some(""));
    }

    #[test]
    fn leaf_item_binds_its_own_name() {
        let row = flatten_item(&ElementNode::leaf("Code", "A1"));
        assert_eq!(row.get("Code").map(String::as_str), Some("A1"));
    }

    #[test]
    fn headers_are_the_union_in_first_seen_order() {
        let first = ElementNode::branch(
            "Item",
            vec![ElementNode::leaf("Name", "a"), ElementNode::leaf("Health", "1")],
        );
        let second = ElementNode::branch(
            "Item",
            vec![ElementNode::leaf("Name", "b"), ElementNode::leaf("Pension", "2")],
        );
        let section = build_section("Items", [&first, &second]);
        assert_eq!(section.headers, ["Name", "Health", "Pension"]);
        assert!(section.is_table);
        assert_eq!(section.cell(0, "Pension"), None);
        assert_eq!(section.cell(1, "Health"), None);
        assert_eq!(section.cell(1, "Pension"), Some("2"));
    }
}
