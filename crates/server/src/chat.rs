//! In-memory assistant conversations, keyed by username

use health_core::ChatLine;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Oldest lines are dropped once a conversation grows past this size
const MAX_STORED_LINES: usize = 500;

#[derive(Debug, Default)]
struct Conversation {
    lines: Vec<ChatLine>,
    waiting_for_bot: bool,
}

impl Conversation {
    fn push(&mut self, line: ChatLine) {
        self.lines.push(line);
        if self.lines.len() > MAX_STORED_LINES {
            let excess = self.lines.len() - MAX_STORED_LINES;
            self.lines.drain(..excess);
        }
    }
}

/// Returned when a user sends a message before the previous one was answered
#[derive(Debug, PartialEq, Eq)]
pub struct ConversationBusy;

/// Shared conversation store
#[derive(Clone, Default)]
pub struct ChatStore {
    inner: Arc<Mutex<HashMap<String, Conversation>>>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Conversation>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start an empty conversation, discarding any previous one
    pub fn reset(&self, username: &str) {
        self.lock()
            .insert(username.to_string(), Conversation::default());
    }

    /// Make sure a conversation exists and is ready for a new message
    pub fn open(&self, username: &str) {
        let mut conversations = self.lock();
        let conversation = conversations.entry(username.to_string()).or_default();
        conversation.waiting_for_bot = false;
    }

    pub fn history(&self, username: &str) -> Vec<ChatLine> {
        self.lock()
            .get(username)
            .map(|c| c.lines.clone())
            .unwrap_or_default()
    }

    pub fn is_waiting(&self, username: &str) -> bool {
        self.lock()
            .get(username)
            .is_some_and(|c| c.waiting_for_bot)
    }

    pub fn append(&self, username: &str, line: ChatLine) {
        self.lock()
            .entry(username.to_string())
            .or_default()
            .push(line);
    }

    /// Record the user's message and mark the conversation as waiting for the bot.
    ///
    /// The returned turn clears the waiting flag when dropped, so a failed
    /// request never leaves the user locked out of the chat.
    pub fn begin_turn(&self, username: &str, message: &str) -> Result<PendingTurn, ConversationBusy> {
        let mut conversations = self.lock();
        let conversation = conversations.entry(username.to_string()).or_default();
        if conversation.waiting_for_bot {
            return Err(ConversationBusy);
        }

        conversation.push(ChatLine::user(message));
        conversation.waiting_for_bot = true;

        Ok(PendingTurn {
            store: self.clone(),
            username: username.to_string(),
            history: conversation.lines.clone(),
        })
    }
}

/// A chat turn awaiting the bot's reply
pub struct PendingTurn {
    store: ChatStore,
    username: String,
    history: Vec<ChatLine>,
}

impl PendingTurn {
    /// Conversation up to and including the message being answered
    pub fn history(&self) -> &[ChatLine] {
        &self.history
    }

    /// Store the bot's reply and release the conversation
    pub fn finish(self, reply: &str) {
        self.store.append(&self.username, ChatLine::bot(reply));
    }
}

impl Drop for PendingTurn {
    fn drop(&mut self) {
        if let Some(conversation) = self.store.lock().get_mut(&self.username) {
            conversation.waiting_for_bot = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_core::Speaker;

    #[test]
    fn second_message_is_rejected_while_waiting() {
        let store = ChatStore::new();
        let turn = store.begin_turn("ali", "merhaba").unwrap();
        assert!(store.is_waiting("ali"));
        assert!(matches!(store.begin_turn("ali", "tekrar"), Err(ConversationBusy)));

        turn.finish("Merhaba! Size nasıl yardımcı olabilirim?");
        assert!(!store.is_waiting("ali"));

        let history = store.history("ali");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, Speaker::User);
        assert_eq!(history[1].sender, Speaker::Bot);
    }

    #[test]
    fn dropping_an_unfinished_turn_releases_the_conversation() {
        let store = ChatStore::new();
        {
            let _turn = store.begin_turn("ayse", "soru").unwrap();
        }
        assert!(!store.is_waiting("ayse"));
        assert_eq!(store.history("ayse").len(), 1);
    }

    #[test]
    fn turn_history_includes_current_message() {
        let store = ChatStore::new();
        store.append("can", ChatLine::bot("önceki"));
        let turn = store.begin_turn("can", "yeni").unwrap();
        let texts: Vec<&str> = turn.history().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["önceki", "yeni"]);
    }

    #[test]
    fn reset_clears_history_and_open_keeps_it() {
        let store = ChatStore::new();
        store.append("deniz", ChatLine::user("a"));
        store.open("deniz");
        assert_eq!(store.history("deniz").len(), 1);
        store.reset("deniz");
        assert!(store.history("deniz").is_empty());
    }

    #[test]
    fn conversations_are_capped() {
        let store = ChatStore::new();
        for i in 0..(MAX_STORED_LINES + 5) {
            store.append("ece", ChatLine::user(i.to_string()));
        }
        let history = store.history("ece");
        assert_eq!(history.len(), MAX_STORED_LINES);
        assert_eq!(history[0].text, "5");
    }
}
