//! OpenAI-compatible endpoints (also serves Cerebras through its env vars)

use super::{build_err, WireAdapter};
use crate::errors::Result;
use crate::types::{common_sse_delta, Message, Params};
use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::Serialize;

const DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4.1";

#[derive(Serialize)]
pub(super) struct ChatBody {
    pub model: String,
    pub stream: bool,
    pub messages: Vec<Message>,
}

fn env_or(vars: &[&str], fallback: &str) -> String {
    for var in vars {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                return value;
            }
        }
    }
    fallback.to_string()
}

pub struct OpenAi;

impl OpenAi {
    pub fn new() -> Self {
        OpenAi
    }
}

#[async_trait]
impl WireAdapter for OpenAi {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn build_request(
        &mut self,
        client: &Client,
        params: &Params,
        input: &str,
    ) -> Result<Request> {
        let model = if params.api_model.is_empty() {
            env_or(&["CEREBRAS_MODEL", "OPENAI_MODEL"], DEFAULT_MODEL)
        } else {
            params.api_model.clone()
        };

        let api_key = if params.api_key.is_empty() {
            env_or(&["CEREBRAS_API_KEY", "OPENAI_API_KEY", "AI_API_KEY"], "")
        } else {
            params.api_key.clone()
        };

        let url = if params.url.is_empty() {
            match std::env::var("CEREBRAS_BASE_URL") {
                Ok(base) if !base.is_empty() => format!("{base}/chat/completions"),
                _ => env_or(&["OPENAI_URL"], DEFAULT_URL),
            }
        } else {
            params.url.clone()
        };

        let body = ChatBody {
            model,
            stream: true,
            messages: super::chat_messages(params, input),
        };

        let mut builder = client.post(&url).json(&body);
        if !api_key.is_empty() {
            builder = builder.bearer_auth(&api_key);
        }
        builder.build().map_err(|e| build_err("openai", e))
    }

    fn extract_delta(&self, line: &str) -> String {
        common_sse_delta(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_explicit_params_win_over_defaults() {
        let client = Client::new();
        let mut adapter = OpenAi::new();
        let params = Params {
            api_model: "gpt-4o-mini".into(),
            api_key: "sk-test".into(),
            url: "https://example.test/v1/chat/completions".into(),
            ..Params::default()
        };

        let req = adapter.build_request(&client, &params, "hi").await.unwrap();
        assert_eq!(req.url().as_str(), "https://example.test/v1/chat/completions");
        assert_eq!(req.headers().get("authorization").unwrap(), "Bearer sk-test");

        let body = std::str::from_utf8(req.body().unwrap().as_bytes().unwrap()).unwrap();
        assert!(body.contains("\"model\":\"gpt-4o-mini\""));
        assert!(body.contains("\"stream\":true"));
    }
}
