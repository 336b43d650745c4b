// Forward-message batches and delivery to a OneBot-compatible HTTP API.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};

use crate::error::{LookupError, Result};

/// Nickname shown on every forward node.
pub const NODE_NICKNAME: &str = "忍者情报官";

/// One piece of node content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Image(PathBuf),
}

impl Segment {
    fn to_onebot(&self) -> Value {
        match self {
            Segment::Text(text) => json!({"type": "text", "data": {"text": text}}),
            Segment::Image(path) => {
                json!({"type": "image", "data": {"file": format!("file://{}", path.display())}})
            }
        }
    }
}

/// A single message inside a forward batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardNode {
    pub uin: String,
    pub name: String,
    pub content: Vec<Segment>,
}

impl ForwardNode {
    pub fn new(uin: &str, content: Vec<Segment>) -> Self {
        Self {
            uin: uin.to_string(),
            name: NODE_NICKNAME.to_string(),
            content,
        }
    }

    pub fn to_onebot(&self) -> Value {
        json!({
            "type": "node",
            "data": {
                "user_id": self.uin,
                "nickname": self.name,
                "content": self.content.iter().map(Segment::to_onebot).collect::<Vec<_>>(),
            }
        })
    }
}

/// Rendered output for one matched ninja.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub display_name: String,
    /// Formatted detail text, absent when the detail fetch failed.
    pub text: Option<String>,
    /// Cached avatar image, if one could be obtained.
    pub avatar: Option<PathBuf>,
}

impl LookupResult {
    /// Node content: avatar, then the display name, then the trimmed text.
    pub fn to_node(&self, self_id: &str) -> ForwardNode {
        let mut content = Vec::new();
        if let Some(path) = &self.avatar {
            content.push(Segment::Image(path.clone()));
        }
        content.push(Segment::Text(self.display_name.clone()));
        if let Some(text) = &self.text {
            content.push(Segment::Text(text.trim().to_string()));
        }
        ForwardNode::new(self_id, content)
    }
}

/// Number of batches needed for `total` results.
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    total.div_ceil(batch_size.max(1))
}

pub fn batch_tip(
    total: usize,
    batch_index: usize,
    batch_count: usize,
    batch_size: usize,
) -> String {
    format!(
        "共{total}个匹配，正在展示第{}/{batch_count}批（每批{batch_size}个）",
        batch_index + 1
    )
}

/// Nodes for one batch. A tip node leads when there is more than one batch.
pub fn build_batch(
    self_id: &str,
    results: &[LookupResult],
    batch_index: usize,
    total: usize,
    batch_size: usize,
) -> Vec<ForwardNode> {
    let count = batch_count(total, batch_size);
    let mut nodes = Vec::with_capacity(results.len() + 1);
    if count > 1 {
        let tip = batch_tip(total, batch_index, count, batch_size);
        nodes.push(ForwardNode::new(self_id, vec![Segment::Text(tip)]));
    }
    nodes.extend(results.iter().map(|r| r.to_node(self_id)));
    nodes
}

/// Delivers forward batches through `send_group_forward_msg`.
#[derive(Debug, Clone)]
pub struct ForwardClient {
    api_url: String,
    client: Client,
}

impl ForwardClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub async fn send_group_forward(&self, group_id: i64, nodes: &[ForwardNode]) -> Result<Value> {
        let url = format!("{}/send_group_forward_msg", self.api_url);
        let body = json!({
            "group_id": group_id,
            "messages": nodes.iter().map(ForwardNode::to_onebot).collect::<Vec<_>>(),
        });
        tracing::info!("Sending forward batch of {} node(s) to group {group_id}", nodes.len());

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let reply: Value = response.json().await?;
        tracing::info!("Forward API response: {reply}");
        Ok(reply)
    }
}
