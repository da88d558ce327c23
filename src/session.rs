//! Conversation sessions.
//!
//! Sessions are ephemeral: a bounded, ordered log of turns keyed by session
//! id, kept in process memory behind a single synchronized accessor. When a
//! session exceeds the configured bound the oldest turns are evicted first.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use uuid::Uuid;

use crate::models::{Message, Role};

pub struct SessionStore {
    /// Maximum messages kept per session (two per exchange).
    max_messages: usize,
    sessions: RwLock<HashMap<String, VecDeque<Message>>>,
}

impl SessionStore {
    /// `max_history` is the number of question/answer exchanges remembered.
    pub fn new(max_history: usize) -> Self {
        Self {
            max_messages: max_history * 2,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn create_session(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .expect("session lock poisoned")
            .insert(session_id.clone(), VecDeque::new());
        session_id
    }

    /// Append a question/answer exchange, evicting the oldest turns when the
    /// bound is exceeded. Unknown session ids are created on first use.
    pub fn add_exchange(&self, session_id: &str, question: &str, answer: &str) {
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        let messages = sessions.entry(session_id.to_string()).or_default();

        messages.push_back(Message {
            role: Role::User,
            content: question.to_string(),
        });
        messages.push_back(Message {
            role: Role::Assistant,
            content: answer.to_string(),
        });

        while messages.len() > self.max_messages {
            messages.pop_front();
        }
    }

    /// Formatted history for prompt assembly, oldest turn first. Returns
    /// `None` for unknown or empty sessions.
    pub fn history(&self, session_id: &str) -> Option<String> {
        let sessions = self.sessions.read().expect("session lock poisoned");
        let messages = sessions.get(session_id)?;
        if messages.is_empty() {
            return None;
        }

        let formatted: Vec<String> = messages
            .iter()
            .map(|msg| format!("{}: {}", msg.role.as_str(), msg.content))
            .collect();
        Some(formatted.join("\n"))
    }

    /// Remove all turns from a session. Returns whether the session existed.
    pub fn clear(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        match sessions.get_mut(session_id) {
            Some(messages) => {
                messages.clear();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_formatted_in_order() {
        let store = SessionStore::new(5);
        let id = store.create_session();

        assert!(store.history(&id).is_none());

        store.add_exchange(&id, "What is RAG?", "Retrieval-augmented generation.");
        store.add_exchange(&id, "Why use it?", "It grounds answers in sources.");

        let history = store.history(&id).unwrap();
        assert_eq!(
            history,
            "User: What is RAG?\n\
             Assistant: Retrieval-augmented generation.\n\
             User: Why use it?\n\
             Assistant: It grounds answers in sources."
        );
    }

    #[test]
    fn oldest_turns_are_evicted_first() {
        let store = SessionStore::new(2);
        let id = store.create_session();

        for i in 0..5 {
            store.add_exchange(&id, &format!("q{}", i), &format!("a{}", i));
        }

        let history = store.history(&id).unwrap();
        // Bounded to the last two exchanges (four messages)
        assert_eq!(history.lines().count(), 4);
        assert!(!history.contains("q2"));
        assert!(history.contains("q3"));
        assert!(history.contains("a4"));
        // Oldest surviving turn comes first
        assert!(history.starts_with("User: q3"));
    }

    #[test]
    fn unknown_session_is_created_on_first_exchange() {
        let store = SessionStore::new(2);
        store.add_exchange("external-id", "q", "a");
        assert!(store.history("external-id").is_some());
    }

    #[test]
    fn clear_empties_but_keeps_session() {
        let store = SessionStore::new(2);
        let id = store.create_session();
        store.add_exchange(&id, "q", "a");

        assert!(store.clear(&id));
        assert!(store.history(&id).is_none());
        assert!(!store.clear("missing"));
    }
}
