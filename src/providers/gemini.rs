//! Google Gemini. Needs an API key. Deltas arrive column-formatted with
//! server-side line breaks, so wrap injection stays off.

use super::{build_err, WireAdapter};
use crate::errors::Result;
use crate::types::Params;
use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Deserialize)]
struct StreamFrame {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

pub struct Gemini;

impl Gemini {
    pub fn new() -> Self {
        Gemini
    }
}

#[async_trait]
impl WireAdapter for Gemini {
    fn name(&self) -> &'static str {
        "gemini"
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

        let base = if params.url.is_empty() { DEFAULT_URL } else { &params.url };
        let url = format!(
            "{}/{}:streamGenerateContent?alt=sse&key={}",
            base, model, params.api_key
        );

        // Prior turns use gemini's parts/role shape, assistant maps to model
        let mut contents: Vec<serde_json::Value> = params
            .prev_messages
            .iter()
            .map(|m| {
                let role = if m.role == "assistant" { "model" } else { "user" };
                json!({ "role": role, "parts": [{ "text": m.content }] })
            })
            .collect();
        contents.push(json!({ "role": "user", "parts": [{ "text": input }] }));

        let body = json!({
            "systemInstruction": { "parts": [{ "text": params.system_prompt }] },
            "contents": contents,
        });

        client
            .post(&url)
            .json(&body)
            .build()
            .map_err(|e| build_err("gemini", e))
    }

    fn extract_delta(&self, line: &str) -> String {
        let obj = match line.split_once("data: ") {
            Some((_, rest)) => rest,
            None => return String::new(),
        };

        match serde_json::from_str::<StreamFrame>(obj) {
            Ok(frame) => frame
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content.parts.into_iter().next())
                .map(|p| p.text)
                .unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    fn wrap_exempt(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn test_candidate_text_extraction() {
        let adapter = Gemini::new();
        let line = r#"data: {"candidates":[{"content":{"parts":[{"text":"Hello"}]}}]}"#;
        assert_eq!(adapter.extract_delta(line), "Hello");
        assert_eq!(adapter.extract_delta(r#"data: {"candidates":[]}"#), "");
        assert_eq!(adapter.extract_delta(r#"data: {"candidates":[{"content":{}}]}"#), "");
    }

    #[tokio::test]
    async fn test_history_maps_assistant_to_model_role() {
        let client = Client::new();
        let mut adapter = Gemini::new();
        let params = Params {
            api_key: "k".into(),
            prev_messages: vec![Message::user("hi"), Message::assistant("hello")],
            ..Params::default()
        };

        let req = adapter.build_request(&client, &params, "more").await.unwrap();
        assert!(req.url().as_str().contains("gemini-2.0-flash:streamGenerateContent"));
        let body = std::str::from_utf8(req.body().unwrap().as_bytes().unwrap()).unwrap();
        assert!(body.contains("\"role\":\"model\""));
        assert!(!body.contains("\"role\":\"assistant\""));
    }
}
