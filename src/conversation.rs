//! # Conversation Module
//!
//! The loop driver: a three-state machine that alternates the research and
//! advisor participants over a shared transcript until one of them delivers
//! the verdict.
//!
//! ```text
//!   ┌──────────┐  Continue   ┌──────────┐
//!   │ RESEARCH │ ──────────▶ │  ADVISE  │
//!   │          │ ◀────────── │          │
//!   └────┬─────┘  Continue   └────┬─────┘
//!        │ Final                  │ Final
//!        └──────────┬─────────────┘
//!                   ▼
//!              ┌─────────┐
//!              │  DONE   │
//!              └─────────┘
//! ```
//!
//! Exactly one participant call is outstanding at a time; the transcript has
//! a single writer (this module).

use tracing::{debug, info, warn};

use crate::error::EvaluatorError;
use crate::participant::Participant;
use crate::router::{self, Node, Route};
use crate::transcript::{Author, Message, Transcript};

/// Loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Research,
    Advise,
    Done,
}

impl From<Route> for State {
    fn from(route: Route) -> Self {
        match route {
            Route::Goto(Node::Research) => State::Research,
            Route::Goto(Node::Advise) => State::Advise,
            Route::Terminate => State::Done,
        }
    }
}

/// Drives one evaluation between a research and an advisor participant.
///
/// # Rust Concept: Trait Objects
///
/// `&dyn Participant` lets the same loop run Rig-backed agents in
/// production and scripted participants in tests.
pub struct Conversation<'a> {
    research: &'a dyn Participant,
    advisor: &'a dyn Participant,
    max_turns: Option<usize>,
}

impl<'a> Conversation<'a> {
    /// A conversation with no turn cap.
    pub fn new(research: &'a dyn Participant, advisor: &'a dyn Participant) -> Self {
        Self {
            research,
            advisor,
            max_turns: None,
        }
    }

    /// Stop with `TurnLimitExceeded` after `max_turns` replies without a
    /// verdict. `None` runs until a verdict arrives.
    pub fn with_max_turns(mut self, max_turns: Option<usize>) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Run from `RESEARCH` until `DONE` and return the verdict message.
    ///
    /// The caller owns the transcript, so after an error it still holds
    /// every message appended before the failing turn.
    pub async fn run(&self, transcript: &mut Transcript) -> Result<Message, EvaluatorError> {
        let mut state = State::Research;
        let mut turns = 0;

        while state != State::Done {
            if let Some(max) = self.max_turns {
                if turns >= max {
                    warn!(turns, "Turn limit reached without a final answer");
                    return Err(EvaluatorError::TurnLimitExceeded { turns });
                }
            }

            state = self.step(state, transcript).await?;
            turns += 1;
        }

        info!(turns, author = %transcript.last().author(), "Conversation reached a verdict");
        Ok(transcript.last().clone())
    }

    /// Execute a single transition.
    ///
    /// Invokes the participant for `state`, appends its reply and routes.
    /// The participant's declared author must match the slot, and its reply
    /// must carry that author. Nothing is appended when the participant
    /// fails. `Done` is returned unchanged.
    pub async fn step(
        &self,
        state: State,
        transcript: &mut Transcript,
    ) -> Result<State, EvaluatorError> {
        let (participant, slot, default_next) = match state {
            State::Research => (self.research, Author::Researcher, Node::Advise),
            State::Advise => (self.advisor, Author::Advisor, Node::Research),
            State::Done => return Ok(State::Done),
        };

        // A participant wired into the wrong slot is never invoked.
        let expected = participant.author();
        if expected != slot {
            return Err(EvaluatorError::UnexpectedAuthor {
                expected: slot,
                actual: expected,
            });
        }

        debug!(?state, transcript_len = transcript.len(), "Invoking participant");
        let turn = participant.respond(transcript).await?;

        let actual = turn.message().author();
        if actual != expected {
            return Err(EvaluatorError::UnexpectedAuthor { expected, actual });
        }

        let next = State::from(router::route(&turn, default_next));
        transcript.append(turn.into_message());

        info!(
            turn = transcript.len() - 1,
            author = %actual,
            next = ?next,
            "Turn completed"
        );
        Ok(next)
    }
}
