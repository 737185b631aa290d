//! Collapse resolution.

use p6gantt_core::{CollapseSet, TaskTree};

/// Whether a row is on screen
///
/// A row is hidden when any of its ancestors is collapsed; a collapsed row
/// itself stays visible. Out-of-range indices are not visible.
pub fn is_visible(tree: &TaskTree, collapsed: &CollapseSet, index: usize) -> bool {
    if index >= tree.len() {
        return false;
    }
    !tree
        .ancestors(index)
        .any(|ancestor| collapsed.is_collapsed(ancestor))
}

/// Indices of the rows on screen, in order
pub fn visible_indices(tree: &TaskTree, collapsed: &CollapseSet) -> Vec<usize> {
    (0..tree.len())
        .filter(|&index| is_visible(tree, collapsed, index))
        .collect()
}

/// Number of rows hidden by collapsed ancestors
pub fn hidden_count(tree: &TaskTree, collapsed: &CollapseSet) -> usize {
    tree.len() - visible_indices(tree, collapsed).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use p6gantt_core::{Task, TaskKind};
    use pretty_assertions::assert_eq;

    fn outline(levels: &[usize]) -> TaskTree {
        TaskTree::from_tasks(
            levels
                .iter()
                .enumerate()
                .map(|(i, &level)| Task::new(format!("t{i}"), TaskKind::group_for_level(level)).level(level))
                .collect(),
        )
    }

    /// Backward scan over levels, the way the chart's script resolves rows
    fn scan_hidden(tree: &TaskTree, collapsed: &CollapseSet, index: usize) -> bool {
        let mut level = tree.tasks[index].level;
        for i in (0..index).rev() {
            let lvl = tree.tasks[i].level;
            if lvl < level {
                if collapsed.is_collapsed(i) {
                    return true;
                }
                level = lvl;
            }
        }
        false
    }

    #[test]
    fn collapsed_grandparent_hides_grandchild() {
        let tree = outline(&[0, 1, 2]);
        let collapsed = CollapseSet::from_iter([0]);
        assert!(is_visible(&tree, &collapsed, 0));
        assert!(!is_visible(&tree, &collapsed, 1));
        assert!(!is_visible(&tree, &collapsed, 2));
    }

    #[test]
    fn siblings_after_collapsed_subtree_stay_visible() {
        let tree = outline(&[0, 1, 2, 1, 0]);
        let collapsed = CollapseSet::from_iter([1]);
        assert_eq!(visible_indices(&tree, &collapsed), vec![0, 1, 3, 4]);
        assert_eq!(hidden_count(&tree, &collapsed), 1);
    }

    #[test]
    fn out_of_range_is_not_visible() {
        let tree = outline(&[0]);
        assert!(!is_visible(&tree, &CollapseSet::new(), 1));
    }

    #[test]
    fn empty_set_shows_everything() {
        let tree = outline(&[0, 1, 1, 2, 0]);
        assert_eq!(hidden_count(&tree, &CollapseSet::new()), 0);
    }

    #[test]
    fn ancestor_walk_matches_backward_scan() {
        let tree = outline(&[1, 0, 3, 1, 2, 2, 0, 0, 4, 1, 3, 2, 5, 0]);
        let sets = [
            CollapseSet::from_iter([1]),
            CollapseSet::from_iter([3, 9]),
            CollapseSet::from_iter([0, 6, 8]),
            CollapseSet::from_iter([2, 4, 11, 12]),
        ];
        for collapsed in &sets {
            for index in 0..tree.len() {
                assert_eq!(
                    is_visible(&tree, collapsed, index),
                    !scan_hidden(&tree, collapsed, index),
                    "index {index} with {collapsed:?}"
                );
            }
        }
    }
}
