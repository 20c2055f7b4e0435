//! Local Ollama server through its openai-compatible endpoint

use super::openai::ChatBody;
use super::{build_err, WireAdapter};
use crate::errors::Result;
use crate::types::{common_sse_delta, Params};
use async_trait::async_trait;
use reqwest::{Client, Request};

const DEFAULT_URL: &str = "http://localhost:11434/v1/chat/completions";
const DEFAULT_MODEL: &str = "mistral";

pub struct Ollama;

impl Ollama {
    pub fn new() -> Self {
        Ollama
    }
}

#[async_trait]
impl WireAdapter for Ollama {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn build_request(
        &mut self,
        client: &Client,
        params: &Params,
        input: &str,
    ) -> Result<Request> {
        let model = if params.api_model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            params.api_model.clone()
        };

        let url = if params.url.is_empty() { DEFAULT_URL } else { &params.url };

        let body = ChatBody {
            model,
            stream: true,
            messages: super::chat_messages(params, input),
        };

        let mut builder = client.post(url).json(&body);
        if !params.api_key.is_empty() {
            builder = builder.bearer_auth(&params.api_key);
        }
        builder.build().map_err(|e| build_err("ollama", e))
    }

    fn extract_delta(&self, line: &str) -> String {
        common_sse_delta(line)
    }
}
