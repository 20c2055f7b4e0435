//! Error types for termchat
//!
//! One enum covers the whole taxonomy: configuration errors and request-build
//! failures are fatal before any byte is rendered, transport errors are fatal
//! for the current invocation, and command failures carry the child's exit
//! status so the process can mirror it.

use thiserror::Error;

/// Main error type for the chat client
#[derive(Error, Debug)]
pub enum ChatError {
    /// Provider name is not in the allow-list
    #[error("Unknown provider: {0:?}")]
    UnknownProvider(String),

    /// Building the outbound request failed (bad url, missing credential)
    #[error("Failed to build request for provider {provider}: {reason}")]
    RequestBuild { provider: &'static str, reason: String },

    /// Connection/timeout level failures
    #[error("Check your internet connection.\nError: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with an error status
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Executed shell command exited non-zero
    #[error("Command exited with status {code}")]
    CommandFailed { code: i32 },

    /// Image generation job reported a failure
    #[error("Image generation failed: {0}")]
    ImageGen(String),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for chat operations
pub type Result<T> = std::result::Result<T, ChatError>;

impl ChatError {
    /// Process exit code this error maps to.
    ///
    /// Failed shell commands mirror the child's status; everything else
    /// fatal exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ChatError::CommandFailed { code } => *code,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_display() {
        let err = ChatError::UnknownProvider("gpt9".to_string());
        assert!(err.to_string().contains("gpt9"));
    }

    #[test]
    fn test_request_build_display() {
        let err = ChatError::RequestBuild {
            provider: "openai",
            reason: "invalid url".to_string(),
        };
        assert!(err.to_string().contains("openai"));
        assert!(err.to_string().contains("invalid url"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ChatError::UnknownProvider(String::new()).exit_code(), 1);
        assert_eq!(ChatError::CommandFailed { code: 127 }.exit_code(), 127);
    }
}
