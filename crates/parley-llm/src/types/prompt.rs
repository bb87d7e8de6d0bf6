use super::message::Message;

/// Ordered conversation sent in one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    messages: Vec<Message>,
}

impl Prompt {
    pub const fn new() -> Self {
        Self { messages: Vec::new() }
    }

    #[must_use]
    pub fn system(self, text: impl Into<String>) -> Self {
        self.message(Message::system(text))
    }

    #[must_use]
    pub fn user(self, text: impl Into<String>) -> Self {
        self.message(Message::user(text))
    }

    #[must_use]
    pub fn assistant(self, text: impl Into<String>) -> Self {
        self.message(Message::assistant(text))
    }

    #[must_use]
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// System message text joined by blank lines, `None` without system messages
    pub fn instructions(&self) -> Option<String> {
        let parts: Vec<String> = self
            .messages
            .iter()
            .filter(|message| message.is_system())
            .map(Message::text)
            .collect();

        (!parts.is_empty()).then(|| parts.join("\n\n"))
    }

    /// Messages in order with system messages removed
    pub fn conversation(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|message| !message.is_system())
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Self::new().user(text)
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Self::new().user(text)
    }
}

impl From<Vec<Message>> for Prompt {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl FromIterator<Message> for Prompt {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl Extend<Message> for Prompt {
    fn extend<I: IntoIterator<Item = Message>>(&mut self, iter: I) {
        self.messages.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_join_system_messages_in_order() {
        let prompt = Prompt::new()
            .system("You are a helpful assistant.")
            .user("Hi")
            .system("Answer in French.");
        assert_eq!(
            prompt.instructions().as_deref(),
            Some("You are a helpful assistant.\n\nAnswer in French.")
        );
        assert_eq!(prompt.conversation().count(), 1);
    }

    #[test]
    fn no_system_messages_means_no_instructions() {
        assert_eq!(Prompt::from("Tell me a joke!").instructions(), None);
        assert_eq!(Prompt::new().instructions(), None);
    }
}
