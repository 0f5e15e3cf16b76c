//! Tests for the outline tree model: parsing, keys and serialization

use serde_json::json;

use versetree::domain::{parse_document, Level, Node, NodeKey, Order, Span, SpanValue};
use versetree::infrastructure::json::to_pretty_string;

#[test]
fn given_list_document_when_parsing_then_returns_units_in_order() {
    // Arrange
    let raw = json!([
        {"level": "chapter", "id": "1", "title": "One", "span": "1-3"},
        {"level": "chapter", "id": "2", "title": "Two", "span": "1-2"}
    ]);

    // Act
    let units = parse_document(&raw).unwrap();

    // Assert
    let ids: Vec<&str> = units.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(units[1].span, Some(SpanValue::Valid(Span::Range { start: 1, end: 2 })));
}

#[test]
fn given_dotted_id_when_building_key_then_uses_level_and_dashes() {
    let node = Node::new("section", "1.2.3", "S");
    assert_eq!(node.key(), NodeKey::from("section-1-2-3"));
    assert_eq!(NodeKey::new(&Level::from("chapter"), "4").as_str(), "chapter-4");
}

#[test]
fn given_legacy_names_when_round_tripping_then_emits_canonical_names_in_fixed_order() {
    // Arrange
    let raw = json!({
        "number": "1",
        "title": "Ch",
        "level": "chapter",
        "custom": true,
        "verses_span": "1-4",
        "children": [
            {"level": "verse", "number": "1.1", "title": "", "verse_text_excerpt": "A"}
        ]
    });

    // Act
    let units = parse_document(&raw).unwrap();
    let rendered = to_pretty_string(&units[0], 2).unwrap();

    // Assert
    let expected = r#"{
  "level": "chapter",
  "id": "1",
  "title": "Ch",
  "span": "1-4",
  "custom": true,
  "children": [
    {
      "level": "verse",
      "id": "1.1",
      "title": "",
      "text": "A"
    }
  ]
}
"#;
    assert_eq!(rendered, expected);
}

#[test]
fn given_tree_when_walking_pre_and_post_order_then_visits_parents_first_or_last() {
    // Arrange
    let tree = Node::new("chapter", "1", "c").with_children(vec![
        Node::new("section", "1.1", "a"),
        Node::new("section", "1.2", "b"),
    ]);
    let mut pre = Vec::new();
    let mut post = Vec::new();

    // Act
    tree.walk(Order::Pre, &mut |n, depth| pre.push((n.id.clone(), depth)));
    tree.walk(Order::Post, &mut |n, _| post.push(n.id.clone()));

    // Assert
    assert_eq!(
        pre,
        vec![("1".to_string(), 0), ("1.1".to_string(), 1), ("1.2".to_string(), 1)]
    );
    assert_eq!(post, vec!["1.1", "1.2", "1"]);
    assert_eq!(tree.count(), 3);
}

#[test]
fn given_scalar_document_when_parsing_then_fails_with_format_error() {
    let err = parse_document(&json!("nope")).unwrap_err();
    assert!(err.to_string().contains("root"));
}

#[test]
fn given_legacy_summary_with_loose_shape_when_round_tripping_then_payload_is_unchanged() {
    // Arrange
    let payload = json!({"key_concepts": "a, b", "content_summary": "x", "inter_node_relationships": {}});
    let raw = json!({"level": "chapter", "id": "1", "title": "One", "summary": payload});

    // Act
    let node = Node::parse(&raw).unwrap();
    let written = serde_json::to_value(&node).unwrap();

    // Assert
    assert_eq!(node.annotation.as_ref().map(|a| a.payload()), Some(&payload));
    assert_eq!(written["annotation"], payload);
    assert!(written.get("summary").is_none());
}
