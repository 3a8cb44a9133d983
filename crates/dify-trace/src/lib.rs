//! Dify Trace
//!
//! Turns the node executions of one Dify workflow run into a Label Studio
//! comparison task.
//!
//! # Pipeline
//!
//! 1. **Nodes** (`node`): typed view of the backend's node-execution records.
//! 2. **Aggregation** (`aggregate`): one pass that groups LLM and
//!    knowledge-retrieval nodes by key and picks up the user query from the
//!    start node. Key collisions are last-write-wins.
//! 3. **Review task** (`review`): the fixed-schema document handed to the
//!    labeling tool, with title-derived item ids.
//!
//! # Example
//!
//! ```rust
//! use dify_trace::ReviewTask;
//! use serde_json::json;
//!
//! let nodes = json!([
//!     { "node_type": "start", "inputs": { "sys.query": "Q" } },
//!     {
//!         "node_type": "llm",
//!         "title": "A",
//!         "elapsed_time": 1.5,
//!         "process_data": { "model_name": "m" },
//!         "outputs": { "text": "hi" }
//!     }
//! ]);
//!
//! let task = ReviewTask::from_document(&nodes).unwrap();
//! assert_eq!(task.prompt, "Q");
//! assert_eq!(task.items[0].title, "A-m");
//! ```

pub mod aggregate;
pub mod error;
pub mod node;
pub mod review;

pub use aggregate::{LlmEntry, OrderedBucket, RetrievalEntry, RetrievalHit, TraceAggregate};
pub use error::{Result, TraceError};
pub use node::{parse_nodes, ExecutionNode, NodeCategory};
pub use review::{item_id, ItemBody, ReviewItem, ReviewTask, TaskEnvelope, TASK_DESCRIPTION};
