//! Ordered, append-only conversation log.
//!
//! ```rust
//! use cprovider::{ConversationHistory, Message};
//!
//! let mut history = ConversationHistory::new();
//! history.push(Message::user("hi"));
//! history.push(Message::assistant("hello"));
//!
//! assert_eq!(history.len(), 2);
//! assert_eq!(history.last_user_text(), Some("hi"));
//! ```

use crate::{Message, Role};

#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        Self {
            messages: messages.into_iter().collect(),
        }
    }

    pub fn push(&mut self, message: impl Into<Message>) {
        self.messages.push(message.into());
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn last_user_text(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|message| match message {
            Message::Text(text) if text.role == Role::User => Some(text.text.as_str()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drops every message. Only meant for starting a conversation over.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl FromIterator<Message> for ConversationHistory {
    fn from_iter<T: IntoIterator<Item = Message>>(iter: T) -> Self {
        Self::from_messages(iter)
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_keep_insertion_order() {
        let history: ConversationHistory = [
            Message::system("be brief"),
            Message::user("one"),
            Message::assistant("two"),
            Message::user("three"),
        ]
        .into_iter()
        .collect();

        let texts = history.iter().filter_map(Message::text).collect::<Vec<_>>();
        assert_eq!(texts, vec!["be brief", "one", "two", "three"]);
        assert_eq!(history.last_user_text(), Some("three"));
    }

    #[test]
    fn empty_history_has_no_user_text() {
        let mut history = ConversationHistory::new();
        assert_eq!(history.last_user_text(), None);

        history.push(Message::assistant("unprompted"));
        assert_eq!(history.last_user_text(), None);

        history.clear();
        assert!(history.is_empty());
    }
}
