//! Tests for undo/redo over the snapshot history tree

use tree_engine::{NodeOptions, NodeSource, TreeState};
use uuid::Uuid;

fn new_root(state: &mut TreeState, text: &str) -> Uuid {
    state.create_child_node(None, text, NodeSource::Human, NodeOptions::default())
}

fn child(state: &mut TreeState, parent: Uuid, text: &str) -> Uuid {
    state.create_child_node(Some(parent), text, NodeSource::Human, NodeOptions::default())
}

#[test]
fn undo_restores_the_exact_prior_map_and_redo_reapplies() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");
    let before = state.nodes().clone();

    let kid_id = child(&mut state, root_id, "kid");
    let after = state.nodes().clone();
    assert_ne!(before, after);

    assert!(state.undo());
    assert_eq!(state.nodes(), &before);
    assert!(state.node(kid_id).is_none());

    assert!(state.redo());
    assert_eq!(state.nodes(), &after);
    assert!(state.node(kid_id).is_some());
}

#[test]
fn undo_past_the_first_entry_is_refused() {
    let mut state = TreeState::new();
    new_root(&mut state, "root");

    assert!(!state.can_undo());
    assert!(!state.undo());
    assert_eq!(state.nodes().len(), 1);
}

#[test]
fn redo_with_no_future_is_refused() {
    let mut state = TreeState::new();
    new_root(&mut state, "root");

    assert!(!state.can_redo());
    assert!(!state.redo());
}

#[test]
fn undo_of_a_delete_brings_the_subtree_back() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");
    let a_id = child(&mut state, root_id, "a");
    let c_id = child(&mut state, a_id, "c");

    let before_delete = state.nodes().clone();
    state.delete_node(a_id);
    assert!(state.node(a_id).is_none());

    assert!(state.undo());
    assert_eq!(state.nodes(), &before_delete);
    assert!(state.node(a_id).is_some());
    assert!(state.node(c_id).is_some());
}

#[test]
fn root_id_is_recomputed_from_the_restored_snapshot() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");
    child(&mut state, root_id, "kid");

    state.undo();
    assert_eq!(state.root_id(), Some(root_id));

    state.redo();
    assert_eq!(state.root_id(), Some(root_id));
}

#[test]
fn dangling_selection_falls_back_to_root_on_undo() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");
    let kid_id = child(&mut state, root_id, "kid");
    assert_eq!(state.selected_node_id(), Some(kid_id));

    // The restored snapshot predates the kid.
    state.undo();
    assert_eq!(state.selected_node_id(), Some(root_id));
}

#[test]
fn mutating_after_undo_branches_history_instead_of_truncating() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");

    let first_id = child(&mut state, root_id, "first");
    state.undo();
    let second_id = child(&mut state, root_id, "second");

    // The old future still exists as entries, just on a sibling branch.
    let entries = state.history().entries();
    assert_eq!(entries.len(), 3);

    // Redo from here has no future (we are at the tip of the new branch).
    assert!(!state.can_redo());
    assert!(state.node(second_id).is_some());
    assert!(state.node(first_id).is_none());

    // Undo and redo follow the newest branch deterministically.
    state.undo();
    assert!(state.can_redo());
    state.redo();
    assert!(state.node(second_id).is_some());
    assert!(state.node(first_id).is_none());
}

#[test]
fn can_undo_and_can_redo_track_the_cursor() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");
    child(&mut state, root_id, "kid");

    assert!(state.can_undo());
    assert!(!state.can_redo());

    state.undo();
    assert!(!state.can_undo());
    assert!(state.can_redo());

    state.redo();
    assert!(state.can_undo());
    assert!(!state.can_redo());
}

#[test]
fn restored_history_resumes_at_the_newest_entry() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");
    child(&mut state, root_id, "kid");
    let entries = state.history().entries().to_vec();
    let map = state.nodes().clone();

    let mut resumed = TreeState::from_loaded(map).unwrap();
    resumed.restore_history(entries);

    assert!(resumed.can_undo());
    assert!(resumed.undo());
    assert_eq!(resumed.nodes().len(), 1);
}
