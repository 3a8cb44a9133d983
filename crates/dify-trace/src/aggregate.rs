//! Trace aggregation
//!
//! A single pass over the node executions of a run:
//!
//! - `llm` nodes are keyed by `"{title}-{model_name}"` and keep their elapsed
//!   time plus `outputs.text` when present.
//! - `knowledge-retrieval` nodes are keyed by title and keep their elapsed
//!   time plus `{content, title, score}` for each retrieved chunk.
//! - the `sys.query` input of `start` nodes becomes the query.
//!
//! Every collision is last-write-wins: a repeated key replaces the earlier
//! value but keeps the position where the key first appeared, and a later
//! start node replaces an earlier query.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::{debug, warn};

use crate::node::{ExecutionNode, NodeCategory};

/// Map that iterates in first-insertion order and overwrites in place
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedBucket<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Default for OrderedBucket<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> OrderedBucket<T> {
    /// Insert or replace; returns the replaced value
    pub fn insert(&mut self, key: String, value: T) -> Option<T> {
        match self.index.get(&key) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Aggregated LLM node
#[derive(Debug, Clone, PartialEq)]
pub struct LlmEntry {
    pub time: Number,
    /// `outputs.text`; `None` when the node produced no text field
    pub output: Option<String>,
}

/// One retrieved chunk. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub content: Value,
    pub title: Value,
    pub score: Value,
}

impl RetrievalHit {
    fn from_result(result: &Value) -> Self {
        let field = |name: &str| result.get(name).cloned().unwrap_or(Value::Null);
        Self {
            content: field("content"),
            title: field("title"),
            score: result
                .pointer("/metadata/score")
                .cloned()
                .unwrap_or(Value::Null),
        }
    }
}

/// Aggregated knowledge-retrieval node
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalEntry {
    pub time: Number,
    /// Retrieved chunks; `None` when the node produced no `result` list
    pub output: Option<Vec<RetrievalHit>>,
}

/// LLM outputs, retrieval outputs and the user query of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceAggregate {
    pub llm: OrderedBucket<LlmEntry>,
    pub retrieval: OrderedBucket<RetrievalEntry>,
    pub query: Option<String>,
}

impl TraceAggregate {
    /// Aggregate nodes in execution order
    pub fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a ExecutionNode>) -> Self {
        let mut aggregate = Self::default();
        for node in nodes {
            aggregate.push(node);
        }

        debug!(
            llm_entries = aggregate.llm.len(),
            retrieval_entries = aggregate.retrieval.len(),
            has_query = aggregate.query.is_some(),
            "Aggregated trace"
        );
        aggregate
    }

    /// Fold one node into the aggregate
    pub fn push(&mut self, node: &ExecutionNode) {
        match node.node_type {
            NodeCategory::Llm => self.push_llm(node),
            NodeCategory::KnowledgeRetrieval => self.push_retrieval(node),
            NodeCategory::Start => {
                if let Some(query) = node.inputs.get("sys.query").filter(|q| !q.is_null()) {
                    self.query = Some(text_of(query));
                }
            }
            NodeCategory::Other => {}
        }
    }

    fn push_llm(&mut self, node: &ExecutionNode) {
        let model = node.model_name().unwrap_or_else(|| {
            warn!(title = %node.title, "LLM node without process_data.model_name");
            ""
        });
        let key = format!("{}-{}", node.title, model);

        let entry = LlmEntry {
            time: node.elapsed_time.clone(),
            output: node
                .outputs
                .get("text")
                .filter(|text| !text.is_null())
                .map(text_of),
        };

        if self.llm.insert(key.clone(), entry).is_some() {
            debug!(key = %key, "LLM entry overwritten");
        }
    }

    fn push_retrieval(&mut self, node: &ExecutionNode) {
        let output = match node.outputs.get("result") {
            Some(Value::Array(results)) => {
                Some(results.iter().map(RetrievalHit::from_result).collect())
            }
            Some(other) if !other.is_null() => {
                warn!(title = %node.title, "Retrieval result is not a list");
                None
            }
            _ => None,
        };

        let entry = RetrievalEntry {
            time: node.elapsed_time.clone(),
            output,
        };

        if self.retrieval.insert(node.title.clone(), entry).is_some() {
            debug!(key = %node.title, "Retrieval entry overwritten");
        }
    }
}

/// Strings as-is, anything else as JSON text
fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
