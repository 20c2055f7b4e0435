//! DeepSeek official API. Needs DEEPSEEK_API_KEY or --key.

use super::openai::ChatBody;
use super::{build_err, WireAdapter};
use crate::errors::Result;
use crate::types::{common_sse_delta, Params};
use async_trait::async_trait;
use reqwest::{Client, Request};

const URL: &str = "https://api.deepseek.com/chat/completions";
const DEFAULT_MODEL: &str = "deepseek-reasoner";

pub struct DeepSeek;

impl DeepSeek {
    pub fn new() -> Self {
        DeepSeek
    }
}

#[async_trait]
impl WireAdapter for DeepSeek {
    fn name(&self) -> &'static str {
        "deepseek"
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

        let api_key = if params.api_key.is_empty() {
            std::env::var("DEEPSEEK_API_KEY").unwrap_or_default()
        } else {
            params.api_key.clone()
        };

        let body = ChatBody {
            model,
            stream: true,
            messages: super::chat_messages(params, input),
        };

        let mut builder = client.post(URL).json(&body);
        if !api_key.is_empty() {
            builder = builder.bearer_auth(&api_key);
        }
        builder.build().map_err(|e| build_err("deepseek", e))
    }

    fn extract_delta(&self, line: &str) -> String {
        common_sse_delta(line)
    }
}
