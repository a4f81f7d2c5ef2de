//! Tests for a selection model attached to a tree model.

use std::sync::Arc;

use parking_lot::Mutex;

use horizon_treeselect::SelectionError;
use horizon_treeselect::model::{IndexPath, SelectionModel, TreeItem, TreeModel};

type SharedSelection = Arc<Mutex<SelectionModel<TreeItem<String>>>>;

fn p<const N: usize>(indices: [usize; N]) -> IndexPath {
    IndexPath::from(indices)
}

fn attached(single_select: bool) -> (TreeModel<String>, SharedSelection) {
    let tree = TreeModel::new();
    for name in ["Documents", "Music", "Pictures"] {
        let root = tree.append_root(name.to_string());
        for j in 0..3 {
            tree.append_child(&root, format!("{name}/{j}"));
        }
    }
    let selection = Arc::new(Mutex::new(
        SelectionModel::builder()
            .single_select(single_select)
            .source(tree.root_view())
            .children(tree.children_accessor())
            .build(),
    ));
    tree.attach_selection(selection.clone()).unwrap();
    (tree, selection)
}

fn selected_names(selection: &SharedSelection) -> Vec<String> {
    selection
        .lock()
        .selected_items()
        .iter()
        .map(|item| item.data())
        .collect()
}

#[test]
fn test_insert_before_selection() {
    let (tree, selection) = attached(true);
    selection.lock().select(&p([1, 2]));

    tree.insert(&IndexPath::unset(), 1, "Desktop".to_string());
    tree.insert(&p([2]), 0, "Music/new".to_string());

    let selection_guard = selection.lock();
    assert_eq!(selection_guard.selected_index(), p([2, 3]));
    assert_eq!(selection_guard.anchor_index(), p([2, 3]));
    drop(selection_guard);
    assert_eq!(selected_names(&selection), vec!["Music/2"]);
}

#[test]
fn test_insert_after_selection_keeps_paths() {
    let (tree, selection) = attached(false);
    selection.lock().select(&p([0, 1]));

    tree.append_child(&p([0]), "Documents/3".to_string());
    tree.insert(&p([0]), 2, "Documents/x".to_string());

    assert_eq!(selection.lock().selected_indexes(), vec![p([0, 1])]);
}

#[test]
fn test_remove_selected_item() {
    let (tree, selection) = attached(false);
    let deselected = Arc::new(Mutex::new(Vec::new()));
    let deselected_clone = deselected.clone();
    selection
        .lock()
        .signals()
        .selection_changed
        .connect(move |args| {
            let names: Vec<String> = args.deselected_items.iter().map(|item| item.data()).collect();
            deselected_clone.lock().extend(names);
        });

    selection.lock().select(&p([1, 1]));
    selection.lock().select(&p([2, 0]));
    tree.remove(&p([1, 1]));

    assert_eq!(*deselected.lock(), vec!["Music/1"]);
    // The primary item is gone; the primary path is unset, not moved.
    assert!(selection.lock().selected_index().is_unset());
    assert_eq!(selected_names(&selection), vec!["Pictures/0"]);
}

#[test]
fn test_remove_parent_of_selection() {
    let (tree, selection) = attached(false);
    selection.lock().select(&p([0, 0]));
    selection.lock().select(&p([0, 2]));
    selection.lock().select(&p([2, 1]));

    tree.remove(&p([0]));

    assert_eq!(selection.lock().selected_indexes(), vec![p([1, 1])]);
    assert_eq!(selected_names(&selection), vec!["Pictures/1"]);
}

#[test]
fn test_clear_resets_selection() {
    let (tree, selection) = attached(false);
    selection.lock().select(&p([0]));
    selection.lock().select(&p([1, 2]));
    let resets = Arc::new(Mutex::new(0));
    let resets_clone = resets.clone();
    selection.lock().signals().source_reset.connect(move |parent| {
        assert!(parent.is_unset());
        *resets_clone.lock() += 1;
    });

    tree.clear();

    let selection = selection.lock();
    assert_eq!(selection.count(), 0);
    assert!(selection.selected_index().is_unset());
    assert_eq!(*resets.lock(), 1);
}

#[test]
fn test_detached_selection_ignores_edits() {
    let (tree, selection) = attached(false);
    selection.lock().select(&p([1]));

    assert!(tree.detach_selection());
    tree.insert(&IndexPath::unset(), 0, "Desktop".to_string());

    assert_eq!(selection.lock().selected_indexes(), vec![p([1])]);
    assert_eq!(selected_names(&selection), vec!["Documents"]);
}

#[test]
fn test_second_attach_rejected() {
    let (tree, selection) = attached(false);
    let other: SharedSelection = Arc::new(Mutex::new(SelectionModel::new()));

    let error = tree.attach_selection(other).unwrap_err();
    assert_eq!(error, SelectionError::AlreadyAttached);
    assert!(error.is_invalid_usage());

    selection.lock().select(&p([0]));
    tree.insert(&IndexPath::unset(), 0, "Desktop".to_string());
    assert_eq!(selection.lock().selected_indexes(), vec![p([1])]);
}
