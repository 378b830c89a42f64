use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChatError;

/// Longest slice of an error body kept for the log
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

/// Client for the remote chat endpoint.
///
/// No timeout and no retry: a call waits until the connection settles and a
/// failure is reported once.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `{"message": ...}` and return the `response` field of the reply
    pub async fn send(&self, message: &str) -> Result<String, ChatError> {
        debug!(endpoint = %self.endpoint, chars = message.chars().count(), "sending chat message");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body: String = String::from_utf8_lossy(&bytes)
                .chars()
                .take(BODY_EXCERPT_CHARS)
                .collect();
            return Err(ChatError::Status { status, body });
        }

        let reply: ChatResponse = serde_json::from_slice(&bytes)?;
        debug!(chars = reply.response.chars().count(), "received chat reply");
        Ok(reply.response)
    }
}
