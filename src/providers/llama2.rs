//! llama2.ai demo endpoint. Single prompt string with [INST] turn markers,
//! plain text lines back.

use super::{build_err, WireAdapter};
use crate::errors::Result;
use crate::types::Params;
use async_trait::async_trait;
use reqwest::{Client, Request};
use serde_json::json;

const URL: &str = "https://www.llama2.ai/api";
const DEFAULT_MODEL: &str = "meta/llama-2-70b-chat";

/// Fold prior turns into the instruct-format prompt prefix, pairing each
/// user turn with the assistant turn that answered it
fn inst_prompt(params: &Params, input: &str) -> String {
    let mut prompt = String::new();
    let mut pending_user: Option<&str> = None;

    for message in &params.prev_messages {
        match message.role.as_str() {
            "user" => pending_user = Some(&message.content),
            "assistant" => {
                if let Some(user) = pending_user.take() {
                    prompt.push_str(&format!("<s>[INST] {} [/INST] {} </s>", user, message.content));
                }
            }
            _ => {}
        }
    }

    prompt.push_str(&format!("<s>[INST] {} [/INST]", input));
    prompt
}

fn numeric_or(value: &str, fallback: f64) -> f64 {
    value.parse().unwrap_or(fallback)
}

pub struct Llama2;

impl Llama2 {
    pub fn new() -> Self {
        Llama2
    }
}

#[async_trait]
impl WireAdapter for Llama2 {
    fn name(&self) -> &'static str {
        "llama2"
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

        let max_tokens = if params.max_length.is_empty() {
            800
        } else {
            params.max_length.parse().unwrap_or(800u32)
        };

        let body = json!({
            "prompt": inst_prompt(params, input),
            "model": model,
            "systemPrompt": "You are a helpful assistant.",
            "temperature": numeric_or(&params.temperature, 0.75),
            "topP": numeric_or(&params.top_p, 0.9),
            "maxTokens": max_tokens,
            "image": null,
            "audio": null,
        });

        client
            .post(URL)
            .header("Content-Type", "text/plain;charset=UTF-8")
            .header("Referer", "https://www.llama2.ai/")
            .header("Origin", "https://www.llama2.ai")
            .body(body.to_string())
            .build()
            .map_err(|e| build_err("llama2", e))
    }

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
    use crate::types::Message;

    #[test]
    fn test_inst_prompt_pairs_turns() {
        let params = Params {
            prev_messages: vec![
                Message::user("2+2?"),
                Message::assistant("4"),
            ],
            ..Params::default()
        };
        assert_eq!(
            inst_prompt(&params, "and 2+3?"),
            "<s>[INST] 2+2? [/INST] 4 </s><s>[INST] and 2+3? [/INST]"
        );
    }

    #[test]
    fn test_inst_prompt_no_history() {
        assert_eq!(inst_prompt(&Params::default(), "hi"), "<s>[INST] hi [/INST]");
    }
}
