//! Phind, the default provider. No key required.

use super::{build_err, WireAdapter};
use crate::errors::Result;
use crate::types::{common_sse_delta, Params};
use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::Serialize;

const URL: &str = "https://https.extension.phind.com/agent/";
const DEFAULT_MODEL: &str = "Phind-70B";

#[derive(Serialize)]
struct RequestBody {
    additional_extension_context: String,
    allow_magic_buttons: bool,
    is_vscode_extension: bool,
    message_history: Vec<crate::types::Message>,
    requested_model: String,
    user_input: String,
}

pub struct Phind;

impl Phind {
    pub fn new() -> Self {
        Phind
    }
}

#[async_trait]
impl WireAdapter for Phind {
    fn name(&self) -> &'static str {
        "phind"
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

        let body = RequestBody {
            additional_extension_context: String::new(),
            allow_magic_buttons: true,
            is_vscode_extension: true,
            message_history: super::chat_messages(params, input),
            requested_model: model,
            user_input: input.to_string(),
        };

        client
            .post(URL)
            .header("User-Agent", "")
            .header("Accept", "*/*")
            .header("Accept-Encoding", "Identity")
            .json(&body)
            .build()
            .map_err(|e| build_err("phind", e))
    }

    fn extract_delta(&self, line: &str) -> String {
        common_sse_delta(line)
    }
}
