use super::value_objects::CategoryNode;

/// Keep root categories whose name or description contains `term`,
/// ignoring case. Matching roots keep their whole subtree.
pub fn filter_roots(forest: &[CategoryNode], term: &str) -> Vec<CategoryNode> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return forest.to_vec();
    }

    forest
        .iter()
        .filter(|node| {
            node.category_name.to_lowercase().contains(&term)
                || node.description.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}
