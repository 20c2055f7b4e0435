//! Kimi web backend. Handshake-then-stream: an anonymous device register
//! yields an access token, then a chat creation yields the chat id the
//! completion stream is posted to. Both are cached per adapter; history
//! lives server-side under the chat id.

use super::{build_err, WireAdapter};
use crate::errors::Result;
use crate::types::{Message, Params};
use crate::utils::random_number;
use async_trait::async_trait;
use reqwest::{Client, Request, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;

const ORIGIN: &str = "https://www.kimi.com";
const UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/133.0";
// Available: k2, k1.5
const DEFAULT_MODEL: &str = "k2";

#[derive(Serialize)]
struct Extend {
    sidebar: bool,
}

#[derive(Serialize)]
struct ChatRequestBody {
    kimiplus_id: &'static str,
    extend: Extend,
    model: String,
    use_search: bool,
    messages: Vec<Message>,
    refs: Vec<serde_json::Value>,
    history: Vec<serde_json::Value>,
    scene_labels: Vec<serde_json::Value>,
    use_semantic_memory: bool,
    use_deep_research: bool,
}

#[derive(Deserialize)]
struct RegisterResponse {
    #[serde(default)]
    access_token: String,
}

#[derive(Deserialize)]
struct ChatIdResponse {
    #[serde(default)]
    id: String,
}

#[derive(Deserialize)]
struct StreamFrame {
    #[serde(default)]
    event: String,
    #[serde(default)]
    text: String,
}

pub struct Kimi {
    device_id: String,
    traffic_id: String,
    access_token: String,
    chat_id: String,
}

impl Kimi {
    pub fn new() -> Self {
        Kimi {
            device_id: random_number(19),
            traffic_id: random_number(19),
            access_token: String::new(),
            chat_id: String::new(),
        }
    }

    fn browser_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("accept", "application/json, text/plain, */*")
            .header("accept-language", "en-US,en;q=0.8")
            .header("origin", ORIGIN)
            .header("priority", "u=1, i")
            .header("user-agent", UA)
            .header("x-language", "en-US")
            .header("x-msh-device-id", &self.device_id)
            .header("x-msh-platform", "web")
            .header("x-traffic-id", &self.traffic_id)
    }

    async fn register_device(&mut self, client: &Client) -> Result<()> {
        let response = self
            .browser_headers(client.post(format!("{ORIGIN}/api/device/register")))
            .header("referer", format!("{ORIGIN}/"))
            .json(&json!({}))
            .send()
            .await?;

        let parsed: RegisterResponse = response.json().await.unwrap_or(RegisterResponse {
            access_token: String::new(),
        });
        self.access_token = parsed.access_token;
        Ok(())
    }

    async fn create_chat(&mut self, client: &Client) -> Result<()> {
        let body = json!({
            "name": "Unnamed Chat",
            "born_from": "home",
            "kimiplus_id": "kimi",
            "is_example": false,
            "source": "web",
            "tags": [],
        });

        let response = self
            .browser_headers(client.post(format!("{ORIGIN}/api/chat")))
            .header("referer", format!("{ORIGIN}/"))
            .header("Cookie", format!("kimi-auth={}", self.access_token))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let parsed: ChatIdResponse =
            response.json().await.unwrap_or(ChatIdResponse { id: String::new() });
        self.chat_id = parsed.id;
        Ok(())
    }

    async fn ensure_session(&mut self, client: &Client) -> Result<()> {
        if !self.chat_id.is_empty() {
            return Ok(());
        }
        self.register_device(client).await?;
        self.create_chat(client).await
    }
}

#[async_trait]
impl WireAdapter for Kimi {
    fn name(&self) -> &'static str {
        "kimi"
    }

    async fn build_request(
        &mut self,
        client: &Client,
        params: &Params,
        input: &str,
    ) -> Result<Request> {
        self.ensure_session(client).await?;

        let model = if params.api_model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            params.api_model.clone()
        };

        let body = ChatRequestBody {
            kimiplus_id: "kimi",
            extend: Extend { sidebar: true },
            model,
            use_search: true,
            messages: vec![Message::user(input)],
            refs: Vec::new(),
            history: Vec::new(),
            scene_labels: Vec::new(),
            use_semantic_memory: false,
            use_deep_research: false,
        };

        let url = format!("{ORIGIN}/api/chat/{}/completion/stream", self.chat_id);

        self.browser_headers(client.post(url))
            .header("referer", format!("{ORIGIN}/chat/{}", self.chat_id))
            .header("Cookie", format!("kimi-auth={}", self.access_token))
            .bearer_auth(&self.access_token)
            .json(&body)
            .build()
            .map_err(|e| build_err("kimi", e))
    }

    // Only cmpl frames carry prose; search/ping/ref events are dropped.
    fn extract_delta(&self, line: &str) -> String {
        let obj = match line.split_once("data: ") {
            Some((_, rest)) => rest,
            None => return String::new(),
        };

        match serde_json::from_str::<StreamFrame>(obj) {
            Ok(frame) if frame.event == "cmpl" => frame.text,
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_cmpl_frames_pass() {
        let adapter = Kimi::new();
        assert_eq!(adapter.extract_delta(r#"data: {"event":"cmpl","text":"Hi"}"#), "Hi");
        assert_eq!(adapter.extract_delta(r#"data: {"event":"search_plus","text":"x"}"#), "");
        assert_eq!(adapter.extract_delta(r#"data: {"event":"done"}"#), "");
        assert_eq!(adapter.extract_delta("no marker"), "");
    }

    #[tokio::test]
    async fn test_cached_session_skips_handshake() {
        let client = Client::new();
        let mut adapter = Kimi::new();
        adapter.access_token = "tok".into();
        adapter.chat_id = "chat-1".into();

        let req = adapter
            .build_request(&client, &Params::default(), "hello")
            .await
            .unwrap();
        assert_eq!(
            req.url().as_str(),
            "https://www.kimi.com/api/chat/chat-1/completion/stream"
        );
        assert_eq!(req.headers().get("authorization").unwrap(), "Bearer tok");
    }

    #[test]
    fn test_device_ids_are_19_digits() {
        let adapter = Kimi::new();
        assert_eq!(adapter.device_id.len(), 19);
        assert!(adapter.traffic_id.chars().all(|c| c.is_ascii_digit()));
    }
}
