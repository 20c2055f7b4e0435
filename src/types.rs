//! Shared request/response types
//!
//! `Params` is the immutable per-call provider request: the user input, the
//! resolved parameter bag and the ordered prior turns. Adapters read it,
//! never mutate it.

use serde::{Deserialize, Serialize};

/// One conversation turn, in the role/content shape most backends speak
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message { role: "assistant".to_string(), content: content.into() }
    }
}

/// Provider request: input text, prior turns and the parameter bag
#[derive(Debug, Clone, Default)]
pub struct Params {
    pub provider: String,
    pub api_model: String,
    pub api_key: String,
    pub url: String,
    pub temperature: String,
    pub top_p: String,
    pub max_length: String,
    pub system_prompt: String,
    pub prev_messages: Vec<Message>,
}

/// The `choices[0].delta.content` response shape shared by the
/// openai-compatible SSE family
#[derive(Debug, Deserialize)]
pub struct CommonResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: String,
}

/// Pull `choices[0].delta.content` out of one `data: `-prefixed SSE line.
///
/// Marker-free or malformed lines yield an empty string, never an error;
/// a single bad transport line must not kill the stream.
pub fn common_sse_delta(line: &str) -> String {
    let obj = match line.split_once("data: ") {
        Some((_, rest)) => rest,
        None => return String::new(),
    };

    match serde_json::from_str::<CommonResponse>(obj) {
        Ok(d) => d.choices.into_iter().next().map(|c| c.delta.content).unwrap_or_default(),
        Err(_) => String::new(),
    }
}
