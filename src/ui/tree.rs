/// Benchmark Tree View
///
/// Flattens the aggregator's `BenchmarkTree` into display nodes sorted by
/// label, and renders them with collapsing headers (groups) and selectable
/// labels (cases).

use crate::models::{BenchmarkTree, CaseId};
use eframe::egui;

/// One row of the tree view
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    pub label: String,
    /// Labels from the root down to and including this node
    pub path: Vec<String>,
    /// Set on leaf cases only
    pub case_id: Option<CaseId>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_case(&self) -> bool {
        self.case_id.is_some()
    }
}

/// A click on a tree row
#[derive(Clone, Debug, PartialEq)]
pub struct TreeSelection {
    pub path: Vec<String>,
    pub case_id: Option<CaseId>,
}

impl TreeSelection {
    pub fn is_case(&self) -> bool {
        self.case_id.is_some()
    }

    /// Whether this selection points at `node` (same path and same kind)
    pub fn matches(&self, node: &TreeNode) -> bool {
        self.path == node.path && self.is_case() == node.is_case()
    }
}

/// Build display nodes for `tree`, ascending by label at every level.
/// A group and a case sharing a label keep the group first.
pub fn build_tree_nodes(tree: &BenchmarkTree) -> Vec<TreeNode> {
    build_level(tree, &[])
}

fn build_level(tree: &BenchmarkTree, parent: &[String]) -> Vec<TreeNode> {
    let mut nodes: Vec<TreeNode> = Vec::with_capacity(tree.groups.len() + tree.cases.len());

    for (name, group) in &tree.groups {
        let path = child_path(parent, name);
        let children = build_level(group, &path);
        nodes.push(TreeNode {
            label: name.clone(),
            path,
            case_id: None,
            children,
        });
    }

    for (name, id) in &tree.cases {
        nodes.push(TreeNode {
            label: name.clone(),
            path: child_path(parent, name),
            case_id: Some(*id),
            children: Vec::new(),
        });
    }

    // Stable: groups were pushed first
    nodes.sort_by(|a, b| a.label.cmp(&b.label));
    nodes
}

fn child_path(parent: &[String], name: &str) -> Vec<String> {
    let mut path = parent.to_vec();
    path.push(name.to_string());
    path
}

/// Find the node at `path`
pub fn find_node<'a>(nodes: &'a [TreeNode], path: &[String]) -> Option<&'a TreeNode> {
    let (first, rest) = path.split_first()?;
    // A case may share its label with a sibling group; prefer the one that
    // can satisfy the remaining path.
    let mut candidates = nodes.iter().filter(|n| &n.label == first);
    if rest.is_empty() {
        let matches: Vec<&TreeNode> = candidates.collect();
        return matches
            .iter()
            .find(|n| n.is_case())
            .or_else(|| matches.first())
            .copied();
    }
    candidates.find_map(|n| find_node(&n.children, rest))
}

/// Find the node at `path` that is a case (`is_case`) or a group. Needed
/// when a case and a sibling group share a label.
pub fn find_node_of_kind<'a>(
    nodes: &'a [TreeNode],
    path: &[String],
    is_case: bool,
) -> Option<&'a TreeNode> {
    let (first, rest) = path.split_first()?;
    nodes.iter().filter(|n| &n.label == first).find_map(|n| {
        if rest.is_empty() {
            (n.is_case() == is_case).then_some(n)
        } else {
            find_node_of_kind(&n.children, rest, is_case)
        }
    })
}

/// Number of nodes (groups and cases) in the forest
pub fn node_count(nodes: &[TreeNode]) -> usize {
    nodes.iter().map(|n| 1 + node_count(&n.children)).sum()
}

/// Render the forest; returns the row clicked this frame, if any.
pub fn show_tree(
    ui: &mut egui::Ui,
    nodes: &[TreeNode],
    selected: Option<&TreeSelection>,
) -> Option<TreeSelection> {
    let mut clicked = None;
    for node in nodes {
        if let Some(sel) = show_node(ui, node, selected) {
            clicked = Some(sel);
        }
    }
    clicked
}

fn show_node(ui: &mut egui::Ui, node: &TreeNode, selected: Option<&TreeSelection>) -> Option<TreeSelection> {
    let is_selected = selected.map_or(false, |s| s.matches(node));

    if node.is_case() {
        if ui.selectable_label(is_selected, &node.label).clicked() {
            return Some(TreeSelection {
                path: node.path.clone(),
                case_id: node.case_id,
            });
        }
        return None;
    }

    let id = ui.make_persistent_id(("bench_tree", &node.path));
    let mut clicked = None;
    egui::collapsing_header::CollapsingState::load_with_default_open(ui.ctx(), id, true)
        .show_header(ui, |ui| {
            if ui.selectable_label(is_selected, &node.label).clicked() {
                clicked = Some(TreeSelection {
                    path: node.path.clone(),
                    case_id: None,
                });
            }
        })
        .body(|ui| {
            for child in &node.children {
                if let Some(sel) = show_node(ui, child, selected) {
                    clicked = Some(sel);
                }
            }
        });
    clicked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> BenchmarkTree {
        let mut tree = BenchmarkTree::new();
        tree.insert("storage/cache", "lookup", CaseId::new(0));
        tree.insert("storage", "flush", CaseId::new(1));
        tree.insert("", "alpha", CaseId::new(2));
        tree.insert("math", "dot", CaseId::new(3));
        tree
    }

    #[test]
    fn test_nodes_sorted_ascending() {
        let nodes = build_tree_nodes(&sample_tree());
        let labels: Vec<&str> = nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["alpha", "math", "storage"]);

        let storage = &nodes[2];
        let child_labels: Vec<&str> = storage.children.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(child_labels, vec!["cache", "flush"]);
    }

    #[test]
    fn test_leaves_carry_ids_and_paths() {
        let nodes = build_tree_nodes(&sample_tree());
        let path = vec!["storage".to_string(), "cache".to_string(), "lookup".to_string()];
        let node = find_node(&nodes, &path).unwrap();
        assert_eq!(node.case_id, Some(CaseId::new(0)));
        assert_eq!(node.path, path);

        let group = find_node(&nodes, &["storage".to_string()]).unwrap();
        assert!(!group.is_case());
    }

    #[test]
    fn test_node_count() {
        let nodes = build_tree_nodes(&sample_tree());
        // alpha, math, dot, storage, cache, lookup, flush
        assert_eq!(node_count(&nodes), 7);
    }

    #[test]
    fn test_find_missing_path() {
        let nodes = build_tree_nodes(&sample_tree());
        assert!(find_node(&nodes, &["nope".to_string()]).is_none());
        assert!(find_node(&nodes, &[]).is_none());
    }

    #[test]
    fn test_case_and_group_with_same_label() {
        let mut tree = BenchmarkTree::new();
        tree.insert("", "io", CaseId::new(0));
        tree.insert("io", "read", CaseId::new(1));
        let nodes = build_tree_nodes(&tree);
        assert_eq!(nodes.len(), 2);
        assert!(!nodes[0].is_case());
        assert!(nodes[1].is_case());

        let leaf = find_node(&nodes, &["io".to_string()]).unwrap();
        assert_eq!(leaf.case_id, Some(CaseId::new(0)));
        let nested = find_node(&nodes, &["io".to_string(), "read".to_string()]).unwrap();
        assert_eq!(nested.case_id, Some(CaseId::new(1)));
    }

    #[test]
    fn test_find_node_of_kind_separates_group_and_case() {
        let mut tree = BenchmarkTree::new();
        tree.insert("", "io", CaseId::new(0));
        tree.insert("io", "read", CaseId::new(1));
        let nodes = build_tree_nodes(&tree);
        let io = vec!["io".to_string()];

        let group = find_node_of_kind(&nodes, &io, false).unwrap();
        assert!(!group.is_case());
        assert_eq!(group.children.len(), 1);
        let case = find_node_of_kind(&nodes, &io, true).unwrap();
        assert_eq!(case.case_id, Some(CaseId::new(0)));

        let group_selection = TreeSelection {
            path: io.clone(),
            case_id: None,
        };
        assert!(group_selection.matches(&nodes[0]));
        assert!(!group_selection.matches(&nodes[1]));
    }
}
