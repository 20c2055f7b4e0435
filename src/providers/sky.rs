//! Sky chat endpoint. No key required.

use super::{build_err, WireAdapter};
use crate::errors::Result;
use crate::types::{common_sse_delta, Message, Params};
use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::Serialize;

const URL: &str = "https://api.sky.foresko.com/v1/create-chat-completion";

#[derive(Serialize)]
struct RequestBody {
    messages: Vec<Message>,
}

pub struct Sky;

impl Sky {
    pub fn new() -> Self {
        Sky
    }
}

#[async_trait]
impl WireAdapter for Sky {
    fn name(&self) -> &'static str {
        "sky"
    }

    async fn build_request(
        &mut self,
        client: &Client,
        params: &Params,
        input: &str,
    ) -> Result<Request> {
        // The system turn is skipped entirely when there is no prompt,
        // the endpoint rejects empty-content messages.
        let mut messages = Vec::with_capacity(params.prev_messages.len() + 2);
        if !params.system_prompt.is_empty() {
            messages.push(Message::system(params.system_prompt.clone()));
        }
        messages.extend(params.prev_messages.iter().cloned());
        messages.push(Message::user(input));

        client
            .post(URL)
            .header("accept-charset", "UTF-8")
            .header("connection", "Keep-Alive")
            .header("user-agent", "ktor-client")
            .json(&RequestBody { messages })
            .build()
            .map_err(|e| build_err("sky", e))
    }

    fn extract_delta(&self, line: &str) -> String {
        common_sse_delta(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_system_prompt_is_omitted() {
        let client = Client::new();
        let mut adapter = Sky::new();
        let req = adapter
            .build_request(&client, &Params::default(), "hi")
            .await
            .unwrap();
        let body = std::str::from_utf8(req.body().unwrap().as_bytes().unwrap()).unwrap();
        assert!(!body.contains("\"role\":\"system\""));
        assert!(body.contains("\"role\":\"user\""));
    }
}
