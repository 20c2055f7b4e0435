//! Image generation. Unlike the chat providers this is a submit-then-poll
//! job API with a synchronous result, so it lives outside the delta-stream
//! pipeline entirely.

pub mod arta;

use crate::errors::Result;
use reqwest::Client;

/// Parameter bag for one generation job
#[derive(Debug, Clone)]
pub struct ImageParams {
    pub model: String,
    pub count: u32,
    pub negative_prompt: String,
    pub ratio: String,
}

pub async fn generate(
    client: &Client,
    prompt: &str,
    params: &ImageParams,
    quiet: bool,
) -> Result<()> {
    arta::generate(client, prompt, params, quiet).await
}
