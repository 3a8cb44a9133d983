//! Node-execution records
//!
//! The backend reports a workflow run as an ordered list of node executions.
//! Only a handful of fields matter here; everything else is ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use tracing::warn;

use crate::error::{Result, TraceError};

/// Workflow node category, read from `node_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeCategory {
    /// Entry node carrying the user inputs
    Start,
    /// LLM call
    Llm,
    /// Knowledge-base retrieval
    KnowledgeRetrieval,
    /// Anything else (code, answer, if-else, ...)
    #[default]
    #[serde(other)]
    Other,
}

/// One executed workflow node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionNode {
    #[serde(default, deserialize_with = "lenient_category")]
    pub node_type: NodeCategory,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Elapsed seconds, kept in the backend's numeric form
    #[serde(default = "zero", deserialize_with = "lenient_number")]
    pub elapsed_time: Number,

    #[serde(default, deserialize_with = "null_as_default")]
    pub inputs: Map<String, Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub outputs: Map<String, Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub process_data: Map<String, Value>,
}

impl ExecutionNode {
    pub fn new(node_type: NodeCategory, title: impl Into<String>) -> Self {
        Self {
            node_type,
            title: title.into(),
            elapsed_time: zero(),
            inputs: Map::new(),
            outputs: Map::new(),
            process_data: Map::new(),
        }
    }

    /// Model name reported in `process_data`, for LLM nodes
    pub fn model_name(&self) -> Option<&str> {
        self.process_data.get("model_name").and_then(Value::as_str)
    }
}

fn zero() -> Number {
    Number::from(0)
}

/// Numbers as-is, numeric strings parsed, anything else zero
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Number, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number,
        None | Some(Value::Null) => zero(),
        Some(Value::String(text)) => match serde_json::from_str::<Number>(text.trim()) {
            Ok(number) => number,
            Err(_) => {
                warn!(elapsed_time = %text, "Non-numeric elapsed_time; using 0");
                zero()
            }
        },
        Some(other) => {
            warn!(elapsed_time = %other, "Non-numeric elapsed_time; using 0");
            zero()
        }
    };
    Ok(number)
}

/// Known category strings map to their variant; null, unknown strings and
/// non-string values are `Other`
fn lenient_category<'de, D>(deserializer: D) -> std::result::Result<NodeCategory, D::Error>
where
    D: Deserializer<'de>,
{
    let category = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(name)) => {
            NodeCategory::deserialize(Value::String(name)).unwrap_or_default()
        }
        _ => NodeCategory::Other,
    };
    Ok(category)
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read node executions from a backend response.
///
/// Accepts the `{"data": [...]}` wrapper returned by the node-executions
/// endpoint or a bare array.
pub fn parse_nodes(document: &Value) -> Result<Vec<ExecutionNode>> {
    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(TraceError::invalid_input(
                    "expected a node array or an object with a \"data\" array",
                ))
            }
        },
        other => {
            return Err(TraceError::invalid_input(format!(
                "expected a node array, found {}",
                json_kind(other)
            )))
        }
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            ExecutionNode::deserialize(entry).map_err(|e| TraceError::InvalidNode {
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_categories() {
        let nodes = parse_nodes(&json!([
            { "node_type": "start" },
            { "node_type": "llm" },
            { "node_type": "knowledge-retrieval" },
            { "node_type": "code" },
            {},
        ]))
        .unwrap();

        let categories: Vec<NodeCategory> = nodes.iter().map(|n| n.node_type).collect();
        assert_eq!(
            categories,
            vec![
                NodeCategory::Start,
                NodeCategory::Llm,
                NodeCategory::KnowledgeRetrieval,
                NodeCategory::Other,
                NodeCategory::Other,
            ]
        );
    }

    #[test]
    fn test_null_fields_are_empty() {
        let nodes = parse_nodes(&json!([{
            "node_type": "llm",
            "title": null,
            "elapsed_time": null,
            "inputs": null,
            "outputs": null,
            "process_data": null,
        }]))
        .unwrap();

        let node = &nodes[0];
        assert_eq!(node.title, "");
        assert_eq!(node.elapsed_time, Number::from(0));
        assert!(node.inputs.is_empty());
        assert!(node.outputs.is_empty());
        assert_eq!(node.model_name(), None);
    }

    #[test]
    fn test_elapsed_time_keeps_numeric_form() {
        let nodes = parse_nodes(&json!([
            { "node_type": "llm", "elapsed_time": 2.0 },
            { "node_type": "llm", "elapsed_time": 3 },
        ]))
        .unwrap();

        assert_eq!(nodes[0].elapsed_time.to_string(), "2.0");
        assert_eq!(nodes[1].elapsed_time.to_string(), "3");
    }

    #[test]
    fn test_odd_node_type_is_other() {
        let nodes = parse_nodes(&json!([
            { "node_type": null },
            { "node_type": 7, "title": "numeric" },
            { "node_type": { "kind": "llm" } },
            { "node_type": "start", "inputs": { "sys.query": "Q" } },
        ]))
        .unwrap();

        let categories: Vec<NodeCategory> = nodes.iter().map(|n| n.node_type).collect();
        assert_eq!(
            categories,
            vec![
                NodeCategory::Other,
                NodeCategory::Other,
                NodeCategory::Other,
                NodeCategory::Start,
            ]
        );
        assert_eq!(nodes[1].title, "numeric");
    }

    #[test]
    fn test_elapsed_time_tolerates_strings() {
        let nodes = parse_nodes(&json!([
            { "node_type": "llm", "elapsed_time": "1.5" },
            { "node_type": "llm", "elapsed_time": "slow" },
            { "node_type": "llm", "elapsed_time": [1] },
        ]))
        .unwrap();

        assert_eq!(nodes[0].elapsed_time.to_string(), "1.5");
        assert_eq!(nodes[1].elapsed_time, Number::from(0));
        assert_eq!(nodes[2].elapsed_time, Number::from(0));
    }

    #[test]
    fn test_parse_data_wrapper() {
        let nodes = parse_nodes(&json!({
            "data": [{ "node_type": "llm", "title": "A", "process_data": { "model_name": "m" } }]
        }))
        .unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].model_name(), Some("m"));
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        assert!(matches!(
            parse_nodes(&json!("nodes")),
            Err(TraceError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_nodes(&json!({ "items": [] })),
            Err(TraceError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_nodes(&json!([{ "node_type": "llm" }, 42])),
            Err(TraceError::InvalidNode { index: 1, .. })
        ));
    }
}
