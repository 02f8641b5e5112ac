//! # Startup Evaluator
//!
//! Evaluates a startup idea with two LLM agents built on the Rig framework:
//! a research agent that searches the web (Tavily) and an advisor agent that
//! judges whether the idea is worth pursuing. They take turns on a shared
//! transcript until one of them writes `FINAL ANSWER`.
//!
//! ```ignore
//! use startup_evaluator::{evaluate, Config, Credentials, EvaluationRequest};
//!
//! let request = EvaluationRequest::new(
//!     "A subscription box for artisanal coffee",
//!     Credentials::from_env(),
//! );
//! let evaluation = evaluate(&request, &Config::from_env()?).await?;
//! println!("{}", evaluation.verdict.content());
//! ```

/// Rig-backed research and advisor agents
pub mod agent;

/// Settings and API keys
pub mod config;

/// The research/advisor loop driver
pub mod conversation;

pub mod error;

/// Host-facing entry point
pub mod evaluator;

pub mod participant;

/// Routing decisions and the verdict sentinel
pub mod router;

/// Tavily web search tool
pub mod tools;

pub mod transcript;

pub use config::{Config, Credentials};
pub use conversation::{Conversation, State};
pub use error::EvaluatorError;
pub use evaluator::{evaluate, evaluate_with, Evaluation, EvaluationRequest};
pub use participant::{Participant, Turn};
pub use router::{decide, Node, Route, VERDICT_SENTINEL};
pub use transcript::{Author, Message, Transcript};
