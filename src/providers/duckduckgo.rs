//! Duck.ai. Handshake-then-stream: a status probe hands out the vqd session
//! token and a hash challenge; the challenge answer is a fingerprint blob
//! rebuilt from the server hashes plus sha256-of-client-strings, base64
//! wrapped. The probe runs once per adapter, later requests refresh the vqd
//! from response headers.

use super::{build_err, WireAdapter};
use crate::errors::Result;
use crate::types::Params;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regex::Regex;
use reqwest::{Client, Request, RequestBuilder, Response};
use serde::Serialize;
use sha2::{Digest, Sha256};

const STATUS_URL: &str = "https://duckduckgo.com/duckchat/v1/status";
const CHAT_URL: &str = "https://duckduckgo.com/duckchat/v1/chat";
const DEFAULT_MODEL: &str = "o3-mini";

// Header UA and the hashed UA differ by chrome version, both taken from a
// real browser session.
const HEADER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36\"Chromium\";v=\"134\", \"Not:A-Brand\";v=\"24\", \"Brave\";v=\"134\"";
const HASHED_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36\"Chromium\";v=\"134\", \"Not:A-Brand\";v=\"24\", \"Brave\";v=\"134\"";
const CLIENT_SALT: &str = "6823";

#[derive(Serialize)]
struct RequestBody {
    messages: Vec<crate::types::Message>,
    model: String,
}

pub struct DuckDuckGo {
    probed: bool,
    vqd: String,
    vqd_hash: String,
}

impl DuckDuckGo {
    pub fn new() -> Self {
        DuckDuckGo { probed: false, vqd: String::new(), vqd_hash: String::new() }
    }

    fn common_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("User-Agent", HEADER_UA)
            .header("Accept", "text/event-stream")
            .header("Accept-Language", "en-US;q=0.7,en;q=0.3")
            .header("Referer", "https://duckduckgo.com/")
            .header("Origin", "https://duckduckgo.com")
            .header("Connection", "keep-alive")
            .header("Cookie", "dcm=1")
            .header("Sec-Fetch-Dest", "empty")
            .header("Sec-Fetch-Mode", "cors")
            .header("Sec-Fetch-Site", "same-origin")
            .header("Pragma", "no-cache")
            .header("TE", "trailers")
            .header("Cache-Control", "no-store")
    }

    /// Record the probe result and answer the hash challenge. Failures
    /// degrade to empty tokens, the chat request is attempted anyway.
    fn apply_status(&mut self, vqd: Option<&str>, hash_header: Option<&str>) {
        self.vqd = vqd.unwrap_or_default().to_string();

        let decoded = hash_header
            .and_then(|h| BASE64.decode(h).ok())
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();

        let server_hashes = extract_server_hashes(&decoded).unwrap_or_else(|| "[]".to_string());
        let client_hashes = hash_client_strings(&[HASHED_UA, CLIENT_SALT]);

        let hash_txt = format!(
            "{{\"server_hashes\":{},\"client_hashes\":{},\"signals\":{{}}}}",
            server_hashes, client_hashes,
        );
        self.vqd_hash = BASE64.encode(hash_txt.as_bytes());
        self.probed = true;
    }

    async fn probe(&mut self, client: &Client) -> Result<()> {
        if self.probed {
            return Ok(());
        }

        let request = self
            .common_headers(client.get(STATUS_URL))
            .header("x-vqd-accept", "1")
            .build()
            .map_err(|e| build_err("duckduckgo", e))?;

        let response = client.execute(request).await?;
        let vqd = header_str(&response, "x-vqd-4");
        let hash = header_str(&response, "x-vqd-hash-1");
        self.apply_status(vqd.as_deref(), hash.as_deref());
        Ok(())
    }
}

fn header_str(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// The decoded challenge is javascript, not json; the server_hashes array
/// is lifted out textually
fn extract_server_hashes(decoded: &str) -> Option<String> {
    let re = Regex::new(r"server_hashes:\s*(\[[^\]]+\])").ok()?;
    re.captures(decoded).map(|c| c[1].to_string())
}

/// sha256 each string, base64 the raw digest bytes, return as a json array
fn hash_client_strings(inputs: &[&str]) -> String {
    let hashes: Vec<String> = inputs
        .iter()
        .map(|s| BASE64.encode(Sha256::digest(s.as_bytes())))
        .collect();
    serde_json::to_string(&hashes).unwrap_or_else(|_| "[]".to_string())
}

#[async_trait]
impl WireAdapter for DuckDuckGo {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn build_request(
        &mut self,
        client: &Client,
        params: &Params,
        input: &str,
    ) -> Result<Request> {
        self.probe(client).await?;

        let model = if params.api_model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            params.api_model.clone()
        };

        let body = RequestBody { messages: super::chat_messages(params, input), model };

        let mut builder = self
            .common_headers(client.post(CHAT_URL))
            .header("x-vqd-hash-1", &self.vqd_hash)
            .json(&body);
        if !self.vqd.is_empty() {
            builder = builder.header("x-vqd-4", &self.vqd);
        }
        builder.build().map_err(|e| build_err("duckduckgo", e))
    }

    // Lines look like `data: {...}`; the byte-6 brace guard also skips the
    // `data: [DONE]` terminator. Escaped newlines arrive double-escaped.
    fn extract_delta(&self, line: &str) -> String {
        if line.as_bytes().get(6) != Some(&b'{') {
            return String::new();
        }
        let obj = match line.get(6..) {
            Some(rest) => rest,
            None => return String::new(),
        };

        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(obj) {
            if let Some(message) = parsed.get("message").and_then(|m| m.as_str()) {
                return message.replace("\\n", "\n");
            }
        }
        String::new()
    }

    fn observe_response(&mut self, response: &Response) {
        if let Some(vqd) = header_str(response, "x-vqd-4") {
            self.vqd = vqd;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_extraction_and_unescape() {
        let adapter = DuckDuckGo::new();
        let line = r#"data: {"message":"hi\\nthere"}"#;
        assert_eq!(adapter.extract_delta(line), "hi\nthere");
    }

    #[test]
    fn test_non_message_frames_skipped() {
        let adapter = DuckDuckGo::new();
        assert_eq!(adapter.extract_delta("data: [DONE]"), "");
        assert_eq!(adapter.extract_delta(r#"data: {"action":"success"}"#), "");
        assert_eq!(adapter.extract_delta("short"), "");
        // multibyte before the guard byte must not slice mid-codepoint
        assert_eq!(adapter.extract_delta("héllo: {\"message\":\"x\"}"), "");
    }

    #[test]
    fn test_server_hashes_lifted_textually() {
        let decoded = r#"{stuff, server_hashes: ["abc","def"], more}"#;
        assert_eq!(extract_server_hashes(decoded).unwrap(), r#"["abc","def"]"#);
        assert_eq!(extract_server_hashes("no hashes here"), None);
    }

    #[test]
    fn test_challenge_answer_shape() {
        let mut adapter = DuckDuckGo::new();
        let challenge = BASE64.encode(r#"x = {server_hashes: ["s1","s2"]}"#);
        adapter.apply_status(Some("vqd-token"), Some(&challenge));

        assert!(adapter.probed);
        assert_eq!(adapter.vqd, "vqd-token");

        let answer = BASE64.decode(&adapter.vqd_hash).unwrap();
        let answer = String::from_utf8(answer).unwrap();
        assert!(answer.starts_with(r#"{"server_hashes":["s1","s2"],"client_hashes":["#));
        assert!(answer.ends_with(r#""signals":{}}"#));
        // two client strings in, two base64 sha256 digests out
        let parsed: serde_json::Value = serde_json::from_str(&answer).unwrap();
        assert_eq!(parsed["client_hashes"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_probe_runs_once() {
        let client = Client::new();
        let mut adapter = DuckDuckGo::new();
        adapter.apply_status(Some("cached-vqd"), None);

        // probed state short-circuits the status request entirely, so
        // building twice needs no network
        for _ in 0..2 {
            let req = adapter
                .build_request(&client, &Params::default(), "hi")
                .await
                .unwrap();
            assert_eq!(req.url().as_str(), CHAT_URL);
            assert_eq!(req.headers().get("x-vqd-4").unwrap(), "cached-vqd");
            assert!(req.headers().get("x-vqd-accept").is_none());
        }
    }
}
