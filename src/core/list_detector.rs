use indexmap::IndexMap;

use crate::core::tree::ElementNode;

/// Returns the tag that repeats among `children`, if any.
///
/// Tags are considered in first-seen order and the first one occurring at
/// least twice wins. Only one tag is ever promoted per parent: when several
/// tags repeat, the others are left to the caller to handle one by one.
pub fn detect_list_tag(children: &[ElementNode]) -> Option<&str> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for child in children {
        *counts.entry(child.name.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .find(|(_, count)| *count >= 2)
        .map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(names: &[&str]) -> Vec<ElementNode> {
        names.iter().map(|n| ElementNode::leaf(*n, "")).collect()
    }

    #[test]
    fn first_seen_repeated_tag_wins() {
        assert_eq!(detect_list_tag(&nodes(&["A", "B", "A", "C", "B"])), Some("A"));
        assert_eq!(detect_list_tag(&nodes(&["B", "A", "A", "B"])), Some("B"));
    }

    #[test]
    fn distinct_children_are_not_a_list() {
        assert_eq!(detect_list_tag(&nodes(&["A", "B", "C"])), None);
        assert_eq!(detect_list_tag(&nodes(&["A"])), None);
        assert_eq!(detect_list_tag(&[]), None);
    }
}
