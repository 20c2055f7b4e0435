//! isou.chat search-augmented chat. Frames are double-nested: the SSE
//! payload is a json object whose `data` field is itself a json document.

use super::{build_err, WireAdapter, USER_AGENT};
use crate::errors::Result;
use crate::types::Params;
use async_trait::async_trait;
use colored::Colorize;
use reqwest::{Client, Request, Url};
use serde::Deserialize;
use serde_json::json;

const SEARCH_URL: &str = "https://isou.chat/api/search";
const DEFAULT_MODEL: &str = "deepseek-ai/DeepSeek-R1-Distill-Qwen-32B";

#[derive(Deserialize)]
struct Outer {
    #[serde(default)]
    data: String,
}

#[derive(Deserialize)]
struct Inner {
    #[serde(default)]
    content: String,
    #[serde(default, rename = "reasoningContent")]
    reasoning_content: String,
    context: Option<Context>,
}

#[derive(Deserialize)]
struct Context {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "url")]
    source: String,
    #[serde(default)]
    id: i64,
}

pub struct Isou;

impl Isou {
    pub fn new() -> Self {
        Isou
    }
}

#[async_trait]
impl WireAdapter for Isou {
    fn name(&self) -> &'static str {
        "isou"
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

        let body = json!({
            "stream": true,
            "model": model,
            "provider": "siliconflow",
            "mode": "deep",
            "language": "all",
            "categories": ["science"],
            "engine": "SEARXNG",
            "locally": false,
            "reload": false,
        });

        let url = Url::parse_with_params(SEARCH_URL, &[("q", input)])
            .map_err(|e| crate::errors::ChatError::RequestBuild {
                provider: "isou",
                reason: e.to_string(),
            })?;

        client
            .post(url)
            .header("Accept", "*/*")
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("Referer", "https://isou.chat/search")
            .header("Origin", "https://isou.chat")
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .build()
            .map_err(|e| build_err("isou", e))
    }

    // Three frame kinds: numbered source citations (yellow), chain of
    // thought (italic), and answer prose (plain).
    fn extract_delta(&self, line: &str) -> String {
        let obj = match line.split_once("data:") {
            Some((_, rest)) => rest,
            None => return String::new(),
        };

        let outer: Outer = match serde_json::from_str(obj) {
            Ok(outer) => outer,
            Err(_) => return String::new(),
        };

        let inner: Inner = match serde_json::from_str(&outer.data) {
            Ok(inner) => inner,
            Err(_) => return String::new(),
        };

        if let Some(context) = inner.context {
            return format!(
                "{}. Name: {}, Source: {}\n",
                context.id, context.name, context.source
            )
            .bright_yellow()
            .to_string();
        }

        if !inner.reasoning_content.is_empty() {
            return inner.reasoning_content.italic().to_string();
        }

        inner.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(inner: &str) -> String {
        format!("data:{}", json!({ "data": inner }))
    }

    #[test]
    fn test_answer_content_passes_plain() {
        let adapter = Isou::new();
        let line = frame(r#"{"content":"the answer"}"#);
        assert_eq!(adapter.extract_delta(&line), "the answer");
    }

    #[test]
    fn test_source_context_becomes_citation_line() {
        colored::control::set_override(false);
        let adapter = Isou::new();
        let line = frame(r#"{"context":{"name":"Wiki","url":"https://w.test","id":1}}"#);
        assert_eq!(
            adapter.extract_delta(&line),
            "1. Name: Wiki, Source: https://w.test\n"
        );
    }

    #[test]
    fn test_broken_inner_json_is_silent() {
        let adapter = Isou::new();
        let line = r#"data:{"data":"{not json"}"#;
        assert_eq!(adapter.extract_delta(line), "");
        assert_eq!(adapter.extract_delta("data:"), "");
    }
}
