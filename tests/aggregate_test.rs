//! Tests for bottom-up text aggregation

use rstest::rstest;
use serde_json::json;

use versetree::domain::aggregate::{leaf_texts, FRAGMENT_SEPARATOR};
use versetree::domain::{aggregate, aggregate_all, parent_excerpts, parse_document, reset_derived, Node};
use versetree::util::testing::{chapter, init_test_setup};

fn leaf(id: &str, text: &str) -> Node {
    Node::new("verse", id, "").with_text(text)
}

#[test]
fn given_two_leaves_when_aggregating_then_parent_joins_with_blank_line() {
    // Arrange
    let mut ch = Node::new("chapter", "1", "c").with_children(vec![leaf("1.1", "A"), leaf("1.2", "B")]);

    // Act
    let has_text = aggregate(&mut ch);

    // Assert
    assert!(has_text);
    assert_eq!(ch.text.as_deref(), Some("A\n\nB"));
    assert_eq!(ch.children[0].text.as_deref(), Some("A"));
}

#[rstest]
#[case("   ")]
#[case("")]
#[case("\n\t")]
fn given_blank_leaf_when_aggregating_then_it_contributes_nothing(#[case] blank: &str) {
    let mut ch = Node::new("chapter", "1", "c")
        .with_children(vec![leaf("1.1", blank), leaf("1.2", "  B  ")]);

    aggregate(&mut ch);

    assert_eq!(ch.text.as_deref(), Some("B"));
}

#[test]
fn given_subtree_without_text_when_aggregating_then_internal_text_is_cleared() {
    let mut ch = Node::new("chapter", "1", "c")
        .with_text("stale")
        .with_children(vec![Node::new("section", "1.1", "s").with_children(vec![Node::new("verse", "1.1.1", "")])]);

    let has_text = aggregate(&mut ch);

    assert!(!has_text);
    assert_eq!(ch.text, None);
    assert_eq!(ch.children[0].text, None);
}

#[test]
fn given_aggregated_tree_when_reset_and_reaggregated_then_text_is_identical() {
    // Arrange
    init_test_setup();
    let mut units = parse_document(&json!([chapter(1, 4), chapter(2, 6)])).unwrap();
    aggregate_all(&mut units, false);
    let first = units.clone();

    // Act
    for unit in units.iter_mut() {
        reset_derived(unit);
    }
    aggregate_all(&mut units, false);

    // Assert
    assert_eq!(units, first);
}

#[test]
fn given_aggregated_node_when_splitting_text_then_yields_leaf_texts_in_order() {
    let mut units = parse_document(&chapter(3, 8)).unwrap();
    aggregate_all(&mut units, false);

    let unit = &units[0];
    let parts: Vec<&str> = unit
        .text
        .as_deref()
        .unwrap()
        .split(FRAGMENT_SEPARATOR)
        .collect();

    assert_eq!(parts, leaf_texts(unit));
    assert_eq!(parts, vec!["3.1.1 text", "3.2.1 text"]);
}

#[test]
fn given_same_units_when_aggregating_in_parallel_then_matches_sequential() {
    let raw = json!([chapter(1, 4), chapter(2, 6), chapter(3, 2)]);
    let mut sequential = parse_document(&raw).unwrap();
    let mut parallel = sequential.clone();

    aggregate_all(&mut sequential, false);
    aggregate_all(&mut parallel, true);

    assert_eq!(sequential, parallel);
}

#[test]
fn given_aggregated_units_when_exporting_parents_then_lists_internal_nodes_pre_order() {
    let mut units = parse_document(&chapter(1, 4)).unwrap();
    aggregate_all(&mut units, false);

    let excerpts = parent_excerpts(&units);

    let ids: Vec<&str> = excerpts.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "1.1", "1.2"]);
    assert_eq!(excerpts[0].text, "1.1.1 text\n\n1.2.1 text");
    assert_eq!(excerpts[1].span.as_deref(), Some("1-2"));
}
