//! Provider dispatch and the wire-adapter contract
//!
//! Every backend hides behind the same capability pair: build one outbound
//! request, extract one text delta from one raw transport line. The rest of
//! the system never touches a concrete variant.

pub mod blackboxai;
pub mod deepseek;
pub mod duckduckgo;
pub mod gemini;
pub mod groq;
pub mod isou;
pub mod kimi;
pub mod koboldai;
pub mod llama2;
pub mod ollama;
pub mod openai;
pub mod phind;
pub mod pollinations;
pub mod sky;

use crate::errors::{ChatError, Result};
use crate::types::Params;
use async_trait::async_trait;
use reqwest::{Client, Request, Response};

/// Browser user agent sent by the providers that expect one
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0";

/// The fixed allow-list. Order matters only for help text; the empty name
/// resolves to the default provider (phind) by contract. This same slice
/// drives `select`, validation and the CLI help so they cannot drift.
pub const PROVIDERS: &[&str] = &[
    "",
    "blackboxai",
    "deepseek",
    "duckduckgo",
    "gemini",
    "groq",
    "isou",
    "kimi",
    "koboldai",
    "llama2",
    "ollama",
    "openai",
    "phind",
    "pollinations",
    "sky",
];

/// Per-provider translation between outbound request construction and
/// inbound line-to-delta extraction.
#[async_trait]
pub trait WireAdapter: Send {
    /// Name as registered in [`PROVIDERS`]
    fn name(&self) -> &'static str;

    /// Build the outbound request for one turn. Stateful variants perform
    /// their one-time handshake here; build failures are fatal and carry
    /// the provider name.
    async fn build_request(
        &mut self,
        client: &Client,
        params: &Params,
        input: &str,
    ) -> Result<Request>;

    /// Extract the text delta from one raw transport line.
    ///
    /// Never fails: malformed or marker-free lines yield an empty string
    /// and the stream continues.
    fn extract_delta(&self, line: &str) -> String;

    /// Providers whose deltas already carry server-side line breaks opt
    /// out of wrap injection.
    fn wrap_exempt(&self) -> bool {
        false
    }

    /// Observe the response to a built request (session token refreshes).
    fn observe_response(&mut self, _response: &Response) {}
}

/// Select a wire adapter by configured provider name.
///
/// An unknown name is a fatal configuration error; nothing is guessed and
/// no network call happens. The empty name is the default adapter.
pub fn select(name: &str) -> Result<Box<dyn WireAdapter>> {
    match name {
        "" | "phind" => Ok(Box::new(phind::Phind::new())),
        "blackboxai" => Ok(Box::new(blackboxai::BlackboxAi::new())),
        "deepseek" => Ok(Box::new(deepseek::DeepSeek::new())),
        "duckduckgo" => Ok(Box::new(duckduckgo::DuckDuckGo::new())),
        "gemini" => Ok(Box::new(gemini::Gemini::new())),
        "groq" => Ok(Box::new(groq::Groq::new())),
        "isou" => Ok(Box::new(isou::Isou::new())),
        "kimi" => Ok(Box::new(kimi::Kimi::new())),
        "koboldai" => Ok(Box::new(koboldai::KoboldAi::new())),
        "llama2" => Ok(Box::new(llama2::Llama2::new())),
        "ollama" => Ok(Box::new(ollama::Ollama::new())),
        "openai" => Ok(Box::new(openai::OpenAi::new())),
        "pollinations" => Ok(Box::new(pollinations::Pollinations::new())),
        "sky" => Ok(Box::new(sky::Sky::new())),
        other => Err(ChatError::UnknownProvider(other.to_string())),
    }
}

/// Map a reqwest build failure to the fatal typed error for `provider`
pub(crate) fn build_err(provider: &'static str, err: reqwest::Error) -> ChatError {
    ChatError::RequestBuild { provider, reason: err.to_string() }
}

/// System prompt, prior turns, then the new user turn, in the role/content
/// shape the openai-compatible family shares
pub(crate) fn chat_messages(params: &Params, input: &str) -> Vec<crate::types::Message> {
    use crate::types::Message;

    let mut messages = Vec::with_capacity(params.prev_messages.len() + 2);
    messages.push(Message::system(params.system_prompt.clone()));
    messages.extend(params.prev_messages.iter().cloned());
    messages.push(Message::user(input));
    messages
}

#[cfg(test)]
impl std::fmt::Debug for dyn WireAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireAdapter").field("name", &self.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_provider_selects() {
        for name in PROVIDERS {
            let adapter = select(name);
            assert!(adapter.is_ok(), "provider {:?} failed to select", name);
        }
    }

    #[test]
    fn test_empty_name_is_default_phind() {
        let adapter = select("").unwrap();
        assert_eq!(adapter.name(), "phind");
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let err = select("gpt9").unwrap_err();
        assert!(matches!(err, ChatError::UnknownProvider(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_only_gemini_is_wrap_exempt() {
        for name in PROVIDERS {
            let adapter = select(name).unwrap();
            assert_eq!(adapter.wrap_exempt(), adapter.name() == "gemini");
        }
    }

    #[test]
    fn test_extractors_never_panic_on_garbage() {
        let lines = [
            "",
            "data: ",
            "data: {",
            "data: not json",
            "random noise without marker",
            "data: {\"choices\": 3}",
            "\u{7f}\u{1b}[31mbinary-ish\u{0}",
            "data: {\"data\": \"{broken inner\"}",
        ];
        for name in PROVIDERS {
            let adapter = select(name).unwrap();
            for line in &lines {
                // empty delta, never a panic
                let _ = adapter.extract_delta(line);
            }
        }
    }
}
