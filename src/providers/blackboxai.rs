//! Blackbox AI. Streams plain text lines, not SSE.

use super::{build_err, WireAdapter};
use crate::errors::Result;
use crate::types::{Message, Params};
use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::Serialize;

const URL: &str = "https://api.blackbox.ai/api/chat";
const MODEL: &str = "deepseek-ai/DeepSeek-R1";

#[derive(Serialize)]
struct RequestBody {
    messages: Vec<Message>,
    model: &'static str,
    // the endpoint wants this as a string
    max_tokens: &'static str,
}

pub struct BlackboxAi;

impl BlackboxAi {
    pub fn new() -> Self {
        BlackboxAi
    }
}

#[async_trait]
impl WireAdapter for BlackboxAi {
    fn name(&self) -> &'static str {
        "blackboxai"
    }

    async fn build_request(
        &mut self,
        client: &Client,
        params: &Params,
        input: &str,
    ) -> Result<Request> {
        let body = RequestBody {
            messages: super::chat_messages(params, input),
            model: MODEL,
            max_tokens: "10000",
        };

        client
            .post(URL)
            .header("Accept", "*/*")
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("Referer", "https://www.blackbox.ai/")
            .header("Origin", "https://www.blackbox.ai")
            .header("Alt-Used", "www.blackbox.ai")
            .json(&body)
            .build()
            .map_err(|e| build_err("blackboxai", e))
    }

    // Raw passthrough: every body line is prose, and the line splitter
    // ate its newline, so it is restored here.
    fn extract_delta(&self, line: &str) -> String {
        let mut delta = String::with_capacity(line.len() + 1);
        delta.push_str(line);
        delta.push('\n');
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_restores_newline() {
        let adapter = BlackboxAi::new();
        assert_eq!(adapter.extract_delta("plain prose"), "plain prose\n");
        assert_eq!(adapter.extract_delta(""), "\n");
    }
}
