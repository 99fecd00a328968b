use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::value_objects::{CategoryNode, FlatCategory};

// ============================================================================
// Category Tree Flattening
// ============================================================================
//
// Depth-first pre-order: a node, then its whole subtree, then its next
// sibling. Each row names its parent explicitly so a tree grid can rebuild
// the hierarchy from a flat list.
//
// ============================================================================

pub fn flatten(nodes: &[CategoryNode], parent_id: Option<Uuid>) -> Vec<FlatCategory> {
    let mut rows = Vec::with_capacity(count_nodes(nodes));
    flatten_into(nodes, parent_id, &mut rows);
    rows
}

fn flatten_into(nodes: &[CategoryNode], parent_id: Option<Uuid>, rows: &mut Vec<FlatCategory>) {
    for node in nodes {
        rows.push(FlatCategory {
            id: node.id,
            category_name: node.category_name.clone(),
            description: node.description.clone(),
            parent_id,
            active: node.active,
        });
        flatten_into(&node.children, Some(node.id), rows);
    }
}

/// Total number of nodes in the forest
pub fn count_nodes(nodes: &[CategoryNode]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + count_nodes(&node.children))
        .sum()
}

/// Rebuild the nested form from flat rows.
///
/// Sibling order follows row order. Rows whose parent is not in the list
/// become roots; rows that cannot be reached from a root are dropped.
pub fn build_forest(rows: &[FlatCategory]) -> Vec<CategoryNode> {
    let known: HashSet<Uuid> = rows.iter().map(|row| row.id).collect();

    let mut children_of: HashMap<Option<Uuid>, Vec<&FlatCategory>> = HashMap::new();
    for row in rows {
        let parent = row.parent_id.filter(|id| known.contains(id));
        children_of.entry(parent).or_default().push(row);
    }

    let mut placed = HashSet::with_capacity(rows.len());
    attach(None, &children_of, &mut placed)
}

fn attach(
    parent: Option<Uuid>,
    children_of: &HashMap<Option<Uuid>, Vec<&FlatCategory>>,
    placed: &mut HashSet<Uuid>,
) -> Vec<CategoryNode> {
    let Some(rows) = children_of.get(&parent) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(rows.len());
    for row in rows {
        // duplicate ids would otherwise recurse forever
        if !placed.insert(row.id) {
            continue;
        }
        nodes.push(CategoryNode {
            id: row.id,
            category_name: row.category_name.clone(),
            description: row.description.clone(),
            parent_id: row.parent_id,
            active: row.active,
            children: attach(Some(row.id), children_of, placed),
        });
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, parent_id: Option<Uuid>, children: Vec<CategoryNode>) -> CategoryNode {
        CategoryNode {
            id: Uuid::new_v4(),
            category_name: name.to_string(),
            description: format!("{name} description"),
            parent_id,
            active: true,
            children,
        }
    }

    /// A[B, C[D]] with consistent parent ids
    fn sample_forest() -> Vec<CategoryNode> {
        let mut a = node("A", None, vec![]);
        let mut c = node("C", Some(a.id), vec![]);
        let d = node("D", Some(c.id), vec![]);
        c.children.push(d);
        let b = node("B", Some(a.id), vec![]);
        a.children = vec![b, c];
        vec![a]
    }

    #[test]
    fn test_empty_forest() {
        assert!(flatten(&[], None).is_empty());
        assert!(build_forest(&[]).is_empty());
        assert_eq!(count_nodes(&[]), 0);
    }

    #[test]
    fn test_pre_order_with_parent_ids() {
        let forest = sample_forest();
        let rows = flatten(&forest, None);

        let names: Vec<_> = rows.iter().map(|r| r.category_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);

        let a = rows[0].id;
        let c = rows[2].id;
        let parents: Vec<_> = rows.iter().map(|r| r.parent_id).collect();
        assert_eq!(parents, vec![None, Some(a), Some(a), Some(c)]);
    }

    #[test]
    fn test_subtree_precedes_next_sibling() {
        let mut first = node("First", None, vec![]);
        first.children.push(node("Nested", Some(first.id), vec![]));
        let second = node("Second", None, vec![]);

        let rows = flatten(&[first, second], None);
        let names: Vec<_> = rows.iter().map(|r| r.category_name.as_str()).collect();
        assert_eq!(names, vec!["First", "Nested", "Second"]);
        assert_eq!(rows[2].parent_id, None);
    }

    #[test]
    fn test_parent_param_overrides_stored_parent() {
        let stray = node("Stray", Some(Uuid::new_v4()), vec![]);
        let anchor = Uuid::new_v4();

        let rows = flatten(std::slice::from_ref(&stray), Some(anchor));
        assert_eq!(rows[0].parent_id, Some(anchor));
        assert_eq!(rows[0].category_name, stray.category_name);
    }

    #[test]
    fn test_length_matches_node_count() {
        let mut forest = sample_forest();
        forest.push(node("E", None, vec![]));

        assert_eq!(count_nodes(&forest), 5);
        assert_eq!(flatten(&forest, None).len(), 5);
    }

    #[test]
    fn test_input_untouched() {
        let forest = sample_forest();
        let before = forest.clone();
        let _ = flatten(&forest, None);
        assert_eq!(forest, before);
    }

    #[test]
    fn test_round_trip_rebuilds_same_forest() {
        let mut forest = sample_forest();
        let mut second = node("Second root", None, vec![]);
        let leaf = node("Leaf", Some(second.id), vec![]);
        second.children.push(leaf);
        forest.push(second);

        let rebuilt = build_forest(&flatten(&forest, None));
        assert_eq!(rebuilt, forest);
    }

    #[test]
    fn test_orphans_become_roots() {
        let rows = vec![FlatCategory {
            id: Uuid::new_v4(),
            category_name: "Orphan".to_string(),
            description: String::new(),
            parent_id: Some(Uuid::new_v4()),
            active: false,
        }];

        let forest = build_forest(&rows);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category_name, "Orphan");
    }

    #[test]
    fn test_duplicate_ids_do_not_loop() {
        let id = Uuid::new_v4();
        let row = |parent_id| FlatCategory {
            id,
            category_name: "Dup".to_string(),
            description: String::new(),
            parent_id,
            active: true,
        };

        let forest = build_forest(&[row(None), row(Some(id))]);
        assert_eq!(count_nodes(&forest), 1);
    }
}
