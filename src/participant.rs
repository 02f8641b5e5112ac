//! # Participant Module
//!
//! The seam between the conversation loop and whatever produces replies.
//! The Rig-backed agents in `agent.rs` implement it, and so do the
//! scripted participants the tests use.

use async_trait::async_trait;

use crate::error::EvaluatorError;
use crate::router::contains_verdict;
use crate::transcript::{Author, Message, Transcript};

/// One participant reply plus the control signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// The conversation goes on.
    Continue(Message),
    /// This message is the evaluation's verdict.
    Final(Message),
}

impl Turn {
    /// Classify free text from a model: a reply carrying the verdict
    /// sentinel is final.
    pub fn classify(message: Message) -> Self {
        if contains_verdict(message.content()) {
            Turn::Final(message)
        } else {
            Turn::Continue(message)
        }
    }

    pub fn message(&self) -> &Message {
        match self {
            Turn::Continue(m) | Turn::Final(m) => m,
        }
    }

    pub fn into_message(self) -> Message {
        match self {
            Turn::Continue(m) | Turn::Final(m) => m,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Turn::Final(_))
    }
}

/// Something that reads the transcript and answers with one message.
///
/// # Rust Concept: async-trait
///
/// The loop holds participants as `&dyn Participant`, and native async
/// trait methods are not object-safe, so we use `#[async_trait]` here.
#[async_trait]
pub trait Participant: Send + Sync {
    /// The author every reply from this participant must carry.
    fn author(&self) -> Author;

    /// Produce exactly one reply. Errors propagate to the loop unchanged.
    async fn respond(&self, transcript: &Transcript) -> Result<Turn, EvaluatorError>;
}
