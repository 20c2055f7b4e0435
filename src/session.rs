//! Multi-turn conversation state

use crate::types::Message;
use crate::utils::log_to_file;
use std::path::PathBuf;

/// Accumulates prior turns for the interactive modes and mirrors them to
/// the optional conversation log
pub struct Session {
    messages: Vec<Message>,
    log_path: Option<PathBuf>,
}

impl Session {
    pub fn new(log_path: Option<PathBuf>) -> Self {
        Session { messages: Vec::new(), log_path }
    }

    /// Record one completed exchange
    pub fn record(&mut self, input: &str, response: &str) {
        self.messages.push(Message::user(input));
        self.messages.push(Message::assistant(response));

        if let Some(path) = &self.log_path {
            log_to_file(input, "USER", path);
            log_to_file(response, "BOT", path);
        }
    }

    /// Prior turns in order, for the next request's history
    pub fn history(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_keeps_turn_order() {
        let mut session = Session::new(None);
        session.record("q1", "a1");
        session.record("q2", "a2");

        let history = session.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0], Message::user("q1"));
        assert_eq!(history[1], Message::assistant("a1"));
        assert_eq!(history[3], Message::assistant("a2"));
    }

    #[test]
    fn test_log_mirrors_turns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        let mut session = Session::new(Some(path.clone()));
        session.record("hello", "hi");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("USER: hello"));
        assert!(contents.contains("BOT: hi"));
    }
}
