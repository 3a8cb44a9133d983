//! Review task document
//!
//! The labeling tool consumes `{task, prompt, items: [{title, body, id}]}`,
//! JSON-encoded into the `data` field of a task envelope. Item ids are the
//! MD5 hex digest of the item title, so re-running the same workflow run
//! produces the same ids.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::debug;

use crate::aggregate::TraceAggregate;
use crate::error::Result;
use crate::node::parse_nodes;

/// Instruction shown to labelers
pub const TASK_DESCRIPTION: &str = "Drag and rank the given AI model responses based on their relevance to the prompt and the level of perceived bias.";

/// Suffix of the per-LLM timing item title
pub const TIME_SUFFIX: &str = " - TIME";

/// Item body: text, or a bare elapsed time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemBody {
    Text(String),
    Time(Number),
}

/// One rankable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub title: String,
    pub body: ItemBody,
    pub id: String,
}

impl ReviewItem {
    /// Build an item whose id is derived from its title
    pub fn new(title: impl Into<String>, body: ItemBody) -> Self {
        let title = title.into();
        let id = item_id(&title);
        Self { title, body, id }
    }
}

/// Comparison task for one workflow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewTask {
    pub task: String,
    pub prompt: String,
    pub items: Vec<ReviewItem>,
}

/// Envelope handed to the labeling tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    /// JSON-encoded [`ReviewTask`]
    pub data: String,
}

impl ReviewTask {
    /// Build the task from an aggregate.
    ///
    /// Each LLM entry yields a text item and a `" - TIME"` item; each
    /// retrieval entry yields one item with the pretty-printed chunk list.
    pub fn from_aggregate(aggregate: &TraceAggregate) -> Result<Self> {
        let mut items = Vec::with_capacity(aggregate.llm.len() * 2 + aggregate.retrieval.len());

        for (key, entry) in aggregate.llm.iter() {
            let body = match &entry.output {
                Some(text) => format!("{} Time: {}", text, entry.time),
                None => format!("Time: {}", entry.time),
            };
            items.push(ReviewItem::new(key, ItemBody::Text(body)));
            items.push(ReviewItem::new(
                format!("{}{}", key, TIME_SUFFIX),
                ItemBody::Time(entry.time.clone()),
            ));
        }

        for (key, entry) in aggregate.retrieval.iter() {
            let hits = serde_json::to_string_pretty(&entry.output)?;
            let body = format!("Time: {}\n{}", entry.time, hits);
            items.push(ReviewItem::new(key, ItemBody::Text(body)));
        }

        debug!(items = items.len(), "Built review task");

        Ok(Self {
            task: TASK_DESCRIPTION.to_string(),
            prompt: aggregate.query.clone().unwrap_or_default(),
            items,
        })
    }

    /// Parse, aggregate and build in one step
    pub fn from_document(document: &Value) -> Result<Self> {
        let nodes = parse_nodes(document)?;
        Self::from_aggregate(&TraceAggregate::from_nodes(&nodes))
    }

    /// The task as a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The task wrapped for the labeling tool
    pub fn envelope(&self) -> Result<TaskEnvelope> {
        Ok(TaskEnvelope {
            data: self.to_json()?,
        })
    }
}

/// Deterministic item id: MD5 hex digest of the title
pub fn item_id(title: &str) -> String {
    format!("{:x}", md5::compute(title.as_bytes()))
}
