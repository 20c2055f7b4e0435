//! KoboldAI horde demo space. No key, no history.

use super::{build_err, WireAdapter};
use crate::errors::Result;
use crate::types::Params;
use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::Deserialize;
use serde_json::json;

const URL: &str =
    "https://koboldai-koboldcpp-tiefighter.hf.space/api/extra/generate/stream";

#[derive(Deserialize)]
struct TokenLine {
    #[serde(default)]
    token: String,
}

fn numeric_or(value: &str, fallback: f64) -> f64 {
    value.parse().unwrap_or(fallback)
}

pub struct KoboldAi;

impl KoboldAi {
    pub fn new() -> Self {
        KoboldAi
    }
}

#[async_trait]
impl WireAdapter for KoboldAi {
    fn name(&self) -> &'static str {
        "koboldai"
    }

    async fn build_request(
        &mut self,
        client: &Client,
        params: &Params,
        input: &str,
    ) -> Result<Request> {
        let max_length = if params.max_length.is_empty() {
            300
        } else {
            params.max_length.parse().unwrap_or(300u32)
        };

        let body = json!({
            "prompt": input,
            "temperature": numeric_or(&params.temperature, 0.5),
            "top_p": numeric_or(&params.top_p, 0.5),
            "max_length": max_length,
        });

        client
            .post(URL)
            .header("Accept", "application/json")
            .json(&body)
            .build()
            .map_err(|e| build_err("koboldai", e))
    }

    // Token frames, not the common choices shape. Lines without the
    // data: marker (kobold interleaves event: lines) never reach json.
    fn extract_delta(&self, line: &str) -> String {
        let obj = match line.split_once("data: ") {
            Some((_, rest)) => rest,
            None => return String::new(),
        };

        match serde_json::from_str::<TokenLine>(obj) {
            Ok(parsed) => parsed.token,
            Err(_) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_extraction() {
        let adapter = KoboldAi::new();
        assert_eq!(adapter.extract_delta(r#"data: {"token": "Hel"}"#), "Hel");
        assert_eq!(adapter.extract_delta("event: message"), "");
        assert_eq!(adapter.extract_delta(r#"data: {"finish_reason":"stop"}"#), "");
    }

    #[tokio::test]
    async fn test_sampler_defaults() {
        let client = Client::new();
        let mut adapter = KoboldAi::new();
        let req = adapter
            .build_request(&client, &Params::default(), "Once upon")
            .await
            .unwrap();
        let body = std::str::from_utf8(req.body().unwrap().as_bytes().unwrap()).unwrap();
        assert!(body.contains("\"temperature\":0.5"));
        assert!(body.contains("\"max_length\":300"));
    }
}
