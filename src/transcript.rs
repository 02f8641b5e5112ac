//! # Transcript Module
//!
//! The ordered, append-only message history both agents read from.
//! Only the conversation loop appends; participants get a shared borrow.

use serde::Serialize;
use std::fmt;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    /// The person submitting the idea. Only authors the seed message.
    User,
    Researcher,
    Advisor,
}

impl Author {
    pub fn as_str(&self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Researcher => "researcher",
            Author::Advisor => "advisor",
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One authored entry in the transcript.
///
/// Fields are private so a message cannot change after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    author: Author,
    content: String,
}

impl Message {
    pub fn new(author: Author, content: impl Into<String>) -> Self {
        Self {
            author,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Author::User, content)
    }

    pub fn researcher(content: impl Into<String>) -> Self {
        Self::new(Author::Researcher, content)
    }

    pub fn advisor(content: impl Into<String>) -> Self {
        Self::new(Author::Advisor, content)
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

/// Shared conversation history for one evaluation.
///
/// Always starts with exactly one `User` message holding the idea.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Start a transcript seeded with the idea under evaluation.
    pub fn seeded(idea: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(idea)],
        }
    }

    /// Append a message. Only the conversation loop calls this.
    pub(crate) fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true: a transcript always holds its seed message.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message. The seed guarantees there is one.
    pub fn last(&self) -> &Message {
        &self.messages[self.messages.len() - 1]
    }

    /// The idea from the seed message.
    pub fn idea(&self) -> &str {
        self.messages
            .first()
            .map(Message::content)
            .unwrap_or_default()
    }

    /// Render the transcript as plain text for an LLM prompt.
    ///
    /// The seed message becomes the idea header; every later message is a
    /// section labelled with its author.
    pub fn render(&self) -> String {
        let mut out = format!("## Startup idea\n\n{}\n", self.idea());

        if self.messages.len() < 2 {
            return out;
        }

        out.push_str("\n## Conversation so far\n");
        for message in self.messages.iter().skip(1) {
            out.push_str(&format!(
                "\n### {}\n\n{}\n",
                message.author(),
                message.content()
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_transcript_holds_only_the_idea() {
        let transcript = Transcript::seeded("A subscription box for artisanal coffee");

        assert_eq!(transcript.len(), 1);
        assert!(!transcript.is_empty());
        assert_eq!(transcript.messages()[0].author(), Author::User);
        assert_eq!(transcript.idea(), "A subscription box for artisanal coffee");
    }

    #[test]
    fn test_append_preserves_order() {
        let mut transcript = Transcript::seeded("idea");
        transcript.append(Message::researcher("market notes"));
        transcript.append(Message::advisor("needs more data"));

        let authors: Vec<Author> = transcript.messages().iter().map(Message::author).collect();
        assert_eq!(authors, vec![Author::User, Author::Researcher, Author::Advisor]);
        assert_eq!(transcript.last().content(), "needs more data");
    }

    #[test]
    fn test_render_labels_each_reply() {
        let mut transcript = Transcript::seeded("Drone delivery for pharmacies");
        assert!(!transcript.render().contains("Conversation so far"));

        transcript.append(Message::researcher("Regulation is strict."));
        let rendered = transcript.render();

        assert!(rendered.starts_with("## Startup idea\n\nDrone delivery for pharmacies"));
        assert!(rendered.contains("### researcher\n\nRegulation is strict."));
    }

    #[test]
    fn test_author_serializes_lowercase() {
        let json = serde_json::to_string(&Message::advisor("ok")).unwrap();
        assert_eq!(json, r#"{"author":"advisor","content":"ok"}"#);
    }
}
