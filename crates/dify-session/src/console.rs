//! Console API routes used by the review workflow

use serde_json::Value;

use crate::client::DifyClient;
use crate::error::Result;

impl DifyClient {
    /// Node executions of one workflow run, in execution order
    pub async fn node_executions(&self, app_id: &str, workflow_run_id: &str) -> Result<Value> {
        let endpoint = format!(
            "/console/api/apps/{}/workflow-runs/{}/node-executions",
            app_id, workflow_run_id
        );
        self.get(&endpoint, &[]).await
    }

    /// One page of apps, optionally filtered by name
    pub async fn list_apps(&self, page: u32, limit: u32, name: &str) -> Result<Value> {
        let page = page.to_string();
        let limit = limit.to_string();
        self.get(
            "/console/api/apps",
            &[("page", page.as_str()), ("limit", limit.as_str()), ("name", name)],
        )
        .await
    }

    /// One page of an app's chat conversations
    pub async fn chat_conversations(&self, app_id: &str, page: u32, limit: u32) -> Result<Value> {
        let endpoint = format!("/console/api/apps/{}/chat-conversations", app_id);
        let page = page.to_string();
        let limit = limit.to_string();
        self.get(&endpoint, &[("page", page.as_str()), ("limit", limit.as_str())])
            .await
    }

    /// Messages of one chat conversation
    pub async fn chat_messages(&self, app_id: &str, conversation_id: &str) -> Result<Value> {
        let endpoint = format!("/console/api/apps/{}/chat-messages", app_id);
        self.get(&endpoint, &[("conversation_id", conversation_id)])
            .await
    }
}
