//! Pollinations free text endpoint. No key required.

use super::{build_err, WireAdapter};
use crate::errors::Result;
use crate::types::{common_sse_delta, Message, Params};
use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::Serialize;

const URL: &str = "https://text.pollinations.ai/openai";

// The service keys its free tier on the referrer field.
const REFERRER: &str = "tgpt";

#[derive(Serialize)]
struct RequestBody {
    model: String,
    referrer: &'static str,
    stream: bool,
    messages: Vec<Message>,
    // sent as strings, the endpoint accepts both
    temperature: String,
    top_p: String,
}

pub struct Pollinations;

impl Pollinations {
    pub fn new() -> Self {
        Pollinations
    }
}

#[async_trait]
impl WireAdapter for Pollinations {
    fn name(&self) -> &'static str {
        "pollinations"
    }

    async fn build_request(
        &mut self,
        client: &Client,
        params: &Params,
        input: &str,
    ) -> Result<Request> {
        let model = if params.api_model.is_empty() {
            "openai".to_string()
        } else {
            params.api_model.clone()
        };

        let temperature = if params.temperature.is_empty() {
            "1".to_string()
        } else {
            params.temperature.clone()
        };

        let top_p = if params.top_p.is_empty() {
            "1".to_string()
        } else {
            params.top_p.clone()
        };

        let body = RequestBody {
            model,
            referrer: REFERRER,
            stream: true,
            messages: super::chat_messages(params, input),
            temperature,
            top_p,
        };

        let mut builder = client.post(URL).json(&body);
        if !params.api_key.is_empty() {
            builder = builder.bearer_auth(&params.api_key);
        }
        builder.build().map_err(|e| build_err("pollinations", e))
    }

    fn extract_delta(&self, line: &str) -> String {
        common_sse_delta(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_param_overrides() {
        let client = Client::new();
        let mut adapter = Pollinations::new();
        let params = Params { temperature: "0.2".into(), ..Params::default() };

        let req = adapter.build_request(&client, &params, "hi").await.unwrap();
        let body = std::str::from_utf8(req.body().unwrap().as_bytes().unwrap()).unwrap();
        assert!(body.contains("\"temperature\":\"0.2\""));
        assert!(body.contains("\"top_p\":\"1\""));
        assert!(body.contains("\"referrer\":\"tgpt\""));
    }
}
