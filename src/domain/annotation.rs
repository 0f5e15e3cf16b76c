//! Externally produced per-node annotation payloads.
//!
//! The payload is produced by an external generator and is treated as
//! pre-validated: it is carried and written back verbatim, without being
//! interpreted. [`AnnotationView`] offers a best-effort typed reading of the
//! generator's usual fields for display.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured summary attached to a node, kept exactly as the generator wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotation(Value);

impl Annotation {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }

    pub fn into_payload(self) -> Value {
        self.0
    }

    /// Top-level field of an object payload.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Typed reading of the payload; `None` when it does not fit the usual shape.
    pub fn view(&self) -> Option<AnnotationView> {
        serde_json::from_value(self.0.clone()).ok()
    }
}

impl From<Value> for Annotation {
    fn from(payload: Value) -> Self {
        Self(payload)
    }
}

/// Connection from one node to another, as described by the generator.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Relationship {
    #[serde(rename = "related_node_id", alias = "related_id")]
    pub related_id: String,
    #[serde(rename = "relationship_type", alias = "relation_type")]
    pub relation_type: String,
    #[serde(rename = "conceptual_bridge", alias = "bridge")]
    pub bridge: String,
}

/// The generator's usual annotation fields, read for display only.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnnotationView {
    pub content_summary: String,
    pub key_concepts: Vec<String>,
    pub transformative_goal: String,
    #[serde(rename = "function_in_hierarchy", alias = "role_in_hierarchy")]
    pub role_in_hierarchy: String,
    #[serde(rename = "inter_node_relationships", alias = "relationships")]
    pub relationships: Vec<Relationship>,
    pub implicit_concepts: Vec<String>,
    pub pedagogical_strategy: String,
    #[serde(rename = "intended_impact_on_reader", alias = "reader_impact")]
    pub reader_impact: String,
    pub audience_assumptions: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One artifact file of the annotation store: the node key plus its payload.
///
/// The generator writes the key under `level` and the payload under `summary`.
/// A missing or null payload leaves `annotation` empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationArtifact {
    #[serde(alias = "level", default)]
    pub key: String,
    #[serde(alias = "summary", default)]
    pub annotation: Option<Annotation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_generator_artifact_when_viewing_then_maps_wire_names() {
        let raw = r#"{
            "level": "1.1",
            "summary": {
                "content_summary": "ཚིག་གི་དོན།",
                "key_concepts": ["bodhicitta"],
                "function_in_hierarchy": "opening",
                "inter_node_relationships": [
                    {"related_node_id": "section-1.2", "relationship_type": "sibling", "conceptual_bridge": "leads into"}
                ],
                "intended_impact_on_reader": "inspire",
                "novelty": 3
            }
        }"#;

        let artifact: AnnotationArtifact = serde_json::from_str(raw).unwrap();

        assert_eq!(artifact.key, "1.1");
        let view = artifact.annotation.unwrap().view().unwrap();
        assert_eq!(view.content_summary, "ཚིག་གི་དོན།");
        assert_eq!(view.role_in_hierarchy, "opening");
        assert_eq!(view.relationships[0].related_id, "section-1.2");
        assert_eq!(view.relationships[0].bridge, "leads into");
        assert_eq!(view.reader_impact, "inspire");
        assert_eq!(view.audience_assumptions, None);
        assert_eq!(view.extra.get("novelty"), Some(&Value::from(3)));
    }

    #[test]
    fn given_sparse_payload_when_serializing_then_writes_it_unchanged() {
        let payload = json!({"content_summary": "x"});

        let written = serde_json::to_value(Annotation::new(payload.clone())).unwrap();

        assert_eq!(written, payload);
    }

    #[test]
    fn given_off_schema_payload_when_viewing_then_none_but_payload_kept() {
        let payload = json!({"content_summary": "x", "key_concepts": "a, b"});
        let annotation = Annotation::from(payload.clone());

        assert!(annotation.view().is_none());
        assert_eq!(annotation.get("key_concepts"), Some(&Value::from("a, b")));
        assert_eq!(annotation.into_payload(), payload);
    }

    #[test]
    fn given_artifact_with_null_summary_when_deserializing_then_annotation_is_none() {
        let artifact: AnnotationArtifact =
            serde_json::from_str(r#"{"level": "chapter-1", "summary": null}"#).unwrap();

        assert_eq!(artifact.annotation, None);
    }
}
