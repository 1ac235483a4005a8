//! Tests for the structural mutation engine

use std::collections::HashMap;
use tree_engine::{
    LoadError, NodeMetadata, NodeOptions, NodeSource, SiblingSpec, TreeAction, TreeNode, TreeState,
};
use uuid::Uuid;

fn new_root(state: &mut TreeState, text: &str) -> Uuid {
    state.create_child_node(None, text, NodeSource::Human, NodeOptions::default())
}

fn child(state: &mut TreeState, parent: Uuid, text: &str) -> Uuid {
    state.create_child_node(Some(parent), text, NodeSource::Human, NodeOptions::default())
}

#[test]
fn first_null_parent_node_becomes_root_and_is_selected() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root text");

    assert_eq!(state.nodes().len(), 1);
    assert_eq!(state.root_id(), Some(root_id));
    assert_eq!(state.selected_node_id(), Some(root_id));
    assert!(!state.has_children(root_id));
    assert_eq!(state.node(root_id).unwrap().text, "root text");
}

#[test]
fn leaf_edit_mutates_in_place_and_records_old_text() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "r");
    let leaf_id = child(&mut state, root_id, "hello");

    let before = state.node(leaf_id).unwrap().updated_at;
    let result = state.update_node_text(leaf_id, "world");

    assert_eq!(result, Some(leaf_id));
    let leaf = state.node(leaf_id).unwrap();
    assert_eq!(leaf.text, "world");
    assert!(leaf.updated_at >= before);

    let action = &state.history().current_entry().unwrap().action;
    match action {
        TreeAction::EditNode { node_id, old_text } => {
            assert_eq!(*node_id, leaf_id);
            assert_eq!(old_text, "hello");
        }
        other => panic!("expected EditNode, got {other:?}"),
    }
}

#[test]
fn editing_a_branch_point_forks_instead() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "r");
    let branch_id = child(&mut state, root_id, "committed");
    let _grandchild = child(&mut state, branch_id, "continuation");

    let fork_id = state.update_node_text(branch_id, "revised").unwrap();

    // Original text is untouched, fork holds the new text.
    assert_ne!(fork_id, branch_id);
    assert_eq!(state.node(branch_id).unwrap().text, "committed");

    let fork = state.node(fork_id).unwrap();
    assert_eq!(fork.text, "revised");
    assert_eq!(fork.parent_id, Some(root_id));
    assert_eq!(fork.forked_from, Some(branch_id));
    assert_eq!(fork.source, NodeSource::Human);
    assert_eq!(state.selected_node_id(), Some(fork_id));

    match &state.history().current_entry().unwrap().action {
        TreeAction::ForkNode { original_id, new_id } => {
            assert_eq!(*original_id, branch_id);
            assert_eq!(*new_id, fork_id);
        }
        other => panic!("expected ForkNode, got {other:?}"),
    }
}

#[test]
fn update_on_unknown_node_is_a_silent_no_op() {
    let mut state = TreeState::new();
    new_root(&mut state, "r");
    let entries_before = state.history().entries().len();

    assert!(state.update_node_text(Uuid::new_v4(), "x").is_none());
    assert_eq!(state.history().entries().len(), entries_before);
}

#[test]
fn delete_removes_the_whole_subtree_and_nothing_else() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");
    let a_id = child(&mut state, root_id, "A");
    let b_id = child(&mut state, root_id, "B");
    let c_id = child(&mut state, a_id, "C");

    state.select_node(Some(c_id));
    assert!(state.delete_node(a_id));

    assert!(state.node(a_id).is_none());
    assert!(state.node(c_id).is_none());
    assert!(state.node(root_id).is_some());
    assert!(state.node(b_id).is_some());

    let remaining: Vec<Uuid> = state.children(root_id).iter().map(|n| n.id).collect();
    assert_eq!(remaining, vec![b_id]);

    // Selection pointed into the deleted subtree, so it falls back to A's parent.
    assert_eq!(state.selected_node_id(), Some(root_id));

    match &state.history().current_entry().unwrap().action {
        TreeAction::DeleteNode { node_id, deleted_nodes } => {
            assert_eq!(*node_id, a_id);
            let mut deleted: Vec<Uuid> = deleted_nodes.iter().map(|n| n.id).collect();
            deleted.sort();
            let mut expected = vec![a_id, c_id];
            expected.sort();
            assert_eq!(deleted, expected);
        }
        other => panic!("expected DeleteNode, got {other:?}"),
    }
}

#[test]
fn root_is_never_deletable() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");
    let entries_before = state.history().entries().len();

    assert!(!state.delete_node(root_id));
    assert!(state.node(root_id).is_some());
    assert_eq!(state.history().entries().len(), entries_before);
}

#[test]
fn clone_node_copies_content_but_not_children() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");
    let original_id = state.create_child_node(
        Some(root_id),
        "cloneme",
        NodeSource::Ai,
        NodeOptions {
            metadata: Some(NodeMetadata {
                model: Some("test-model".into()),
                ..NodeMetadata::default()
            }),
            ..NodeOptions::default()
        },
    );
    let _grandchild = child(&mut state, original_id, "kid");

    let clone_id = state.clone_node(original_id).unwrap();
    let clone = state.node(clone_id).unwrap();

    assert_ne!(clone_id, original_id);
    assert_eq!(clone.text, "cloneme");
    assert_eq!(clone.source, NodeSource::Ai);
    assert_eq!(clone.parent_id, Some(root_id));
    assert_eq!(clone.metadata.model.as_deref(), Some("test-model"));
    assert!(!state.has_children(clone_id));
    assert_eq!(state.selected_node_id(), Some(clone_id));
}

#[test]
fn clone_branch_is_isomorphic_with_fresh_ids() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");
    let a_id = child(&mut state, root_id, "a");
    let b_id = child(&mut state, a_id, "b");
    let c_id = child(&mut state, a_id, "c");
    let d_id = child(&mut state, b_id, "d");

    let ids_before: Vec<Uuid> = state.nodes().keys().copied().collect();
    let clone_root_id = state.clone_branch(a_id).unwrap();

    // Cloned root is a sibling of the original and selected.
    let clone_root = state.node(clone_root_id).unwrap();
    assert_eq!(clone_root.parent_id, Some(root_id));
    assert_eq!(state.selected_node_id(), Some(clone_root_id));

    // No cloned id aliases any pre-existing id.
    let clone_ids: Vec<Uuid> = std::iter::once(clone_root_id)
        .chain(state.descendants(clone_root_id).iter().map(|n| n.id))
        .collect();
    for id in &clone_ids {
        assert!(!ids_before.contains(id));
    }
    assert_eq!(clone_ids.len(), 4);

    // Same shape and same per-node content (sibling order inside the
    // clone is unspecified, so compare as sets).
    assert_eq!(state.node(clone_root_id).unwrap().text, "a");
    let kids = state.children(clone_root_id);
    let mut kid_texts: Vec<&str> = kids.iter().map(|n| n.text.as_str()).collect();
    kid_texts.sort();
    assert_eq!(kid_texts, vec!["b", "c"]);

    let cloned_b = kids.iter().find(|n| n.text == "b").unwrap().id;
    let b_kids: Vec<String> = state
        .children(cloned_b)
        .iter()
        .map(|n| n.text.clone())
        .collect();
    assert_eq!(b_kids, vec!["d".to_string()]);

    // Originals untouched.
    for id in [a_id, b_id, c_id, d_id] {
        assert!(state.node(id).is_some());
    }
}

#[test]
fn batch_creation_records_one_generate_entry() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");
    let entries_before = state.history().entries().len();

    let ids = state.create_sibling_nodes(
        Some(root_id),
        vec![
            SiblingSpec {
                text: "one".into(),
                source: NodeSource::Ai,
                metadata: None,
            },
            SiblingSpec {
                text: "two".into(),
                source: NodeSource::Ai,
                metadata: None,
            },
            SiblingSpec {
                text: "three".into(),
                source: NodeSource::Ai,
                metadata: None,
            },
        ],
    );

    assert_eq!(ids.len(), 3);
    assert_eq!(state.history().entries().len(), entries_before + 1);
    assert_eq!(state.selected_node_id(), Some(ids[0]));

    match &state.history().current_entry().unwrap().action {
        TreeAction::Generate { node_ids } => assert_eq!(node_ids, &ids),
        other => panic!("expected Generate, got {other:?}"),
    }
}

#[test]
fn empty_batch_records_nothing() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");
    let entries_before = state.history().entries().len();

    let ids = state.create_sibling_nodes(Some(root_id), Vec::new());
    assert!(ids.is_empty());
    assert_eq!(state.history().entries().len(), entries_before);
}

#[test]
fn add_empty_child_is_a_human_empty_node() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");

    let id = state.add_empty_child(root_id);
    let node = state.node(id).unwrap();
    assert_eq!(node.text, "");
    assert_eq!(node.source, NodeSource::Human);
    assert_eq!(node.parent_id, Some(root_id));
}

#[test]
fn clear_tree_resets_nodes_and_history() {
    let mut state = TreeState::new();
    let root_id = new_root(&mut state, "root");
    child(&mut state, root_id, "kid");

    let new_root_id = state.clear_tree();

    assert_eq!(state.nodes().len(), 1);
    assert_eq!(state.root_id(), Some(new_root_id));
    assert_eq!(state.selected_node_id(), Some(new_root_id));
    assert_eq!(state.node(new_root_id).unwrap().text, "");

    let entries = state.history().entries();
    assert_eq!(entries.len(), 1);
    assert!(matches!(entries[0].action, TreeAction::Initial { .. }));
    assert!(!state.can_undo());
}

#[test]
fn from_loaded_rejects_invalid_maps() {
    // No root at all.
    let dangling = TreeNode::new(Some(Uuid::new_v4()), "x", NodeSource::Human, NodeOptions::default());
    let mut map = HashMap::new();
    map.insert(dangling.id, dangling);
    assert!(matches!(
        TreeState::from_loaded(map),
        Err(LoadError::MissingRoot)
    ));

    // Two roots.
    let r1 = TreeNode::new(None, "r1", NodeSource::Human, NodeOptions::default());
    let r2 = TreeNode::new(None, "r2", NodeSource::Human, NodeOptions::default());
    let mut map = HashMap::new();
    map.insert(r1.id, r1);
    map.insert(r2.id, r2);
    assert!(matches!(
        TreeState::from_loaded(map),
        Err(LoadError::MultipleRoots(2))
    ));

    // Root plus a child pointing at a parent that does not exist.
    let root = TreeNode::new(None, "root", NodeSource::Human, NodeOptions::default());
    let stray = TreeNode::new(Some(Uuid::new_v4()), "stray", NodeSource::Human, NodeOptions::default());
    let stray_id = stray.id;
    let mut map = HashMap::new();
    map.insert(root.id, root);
    map.insert(stray_id, stray);
    assert!(matches!(
        TreeState::from_loaded(map),
        Err(LoadError::DanglingParent { node_id, .. }) if node_id == stray_id
    ));
}

#[test]
fn from_loaded_accepts_a_well_formed_map() {
    let root = TreeNode::new(None, "root", NodeSource::Human, NodeOptions::default());
    let kid = TreeNode::new(Some(root.id), "kid", NodeSource::Ai, NodeOptions::default());
    let root_id = root.id;
    let mut map = HashMap::new();
    map.insert(root.id, root);
    map.insert(kid.id, kid);

    let state = TreeState::from_loaded(map).unwrap();
    assert_eq!(state.root_id(), Some(root_id));
    assert_eq!(state.selected_node_id(), Some(root_id));
    assert_eq!(state.nodes().len(), 2);
}
