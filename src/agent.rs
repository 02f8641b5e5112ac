//! # Agent Module
//!
//! The two conversation participants, built on the Rig framework.
//! It demonstrates:
//! - Rig's agent builder pattern
//! - Tool integration for the research agent
//! - Adapting free-text model output to a structured `Turn`

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::EvaluatorError;
use crate::participant::{Participant, Turn};
use crate::router::VERDICT_SENTINEL;
use crate::tools::TavilySearchTool;
use crate::transcript::{Author, Message, Transcript};

// =============================================================================
// SYSTEM PROMPTS
// =============================================================================
/// Instructions for the research agent. It gathers facts and never judges.
const RESEARCH_SYSTEM_PROMPT: &str = r#"
You are a startup market researcher working with a startup advisor.

Your job is to gather the facts the advisor needs to judge a business idea:
- Market size and growth
- Existing competitors and how they differentiate
- Target customers and their willingness to pay
- Regulatory, operational or technical risks

Use the tavily_search tool to find current information. Cite the URLs you used.
If the advisor asked follow-up questions, answer those first.

Do NOT recommend whether the idea should be pursued. That decision belongs to the advisor.
"#;

/// Instructions for the advisor agent. It judges from the research alone.
const ADVISOR_SYSTEM_PROMPT: &str = r#"
You are an experienced, objective startup advisor working with a market researcher.

Read the idea and the research gathered so far, then judge whether the idea should be pursued.
Weigh market size, competition, differentiation and risk. Be direct.

If the research is not sufficient, explain exactly what is missing so the researcher can look it up.
When you are ready to give your final judgment, begin your reply with "FINAL ANSWER:" followed by
"Pursue" or "Do not pursue" and a short justification.
"#;

fn backend_error(author: Author, e: impl std::fmt::Display) -> EvaluatorError {
    EvaluatorError::backend(author, format!("Agent execution failed: {}", e))
}

/// Chat completions client for `config.openai_base_url`.
fn completions_client(
    config: &Config,
    openai_api_key: &str,
) -> Result<openai::CompletionsClient, EvaluatorError> {
    openai::CompletionsClient::builder()
        .api_key(openai_api_key)
        .base_url(&config.openai_base_url)
        .build()
        .map_err(|e| EvaluatorError::Config(format!("Failed to build OpenAI client: {}", e)))
}

// =============================================================================
// RESEARCH AGENT
// =============================================================================
/// Researches the idea with web search. Never gives a verdict on purpose,
/// though a reply that carries the sentinel still ends the conversation.
pub struct ResearchAgent {
    client: openai::CompletionsClient,
    model: String,
    temperature: f64,
    max_tool_turns: usize,
    search_tool: TavilySearchTool,
}

impl ResearchAgent {
    /// Create the agent from explicit credentials.
    ///
    /// The OpenAI key goes straight into the client; the Tavily key is
    /// already inside `search_tool`. The process environment is not read.
    pub fn new(
        config: &Config,
        openai_api_key: &str,
        search_tool: TavilySearchTool,
    ) -> Result<Self, EvaluatorError> {
        Ok(Self {
            client: completions_client(config, openai_api_key)?,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tool_turns: config.max_tool_turns,
            search_tool,
        })
    }

    fn prompt_for(transcript: &Transcript) -> String {
        format!(
            "{}\n\nContinue the research on this idea. Search for what is still unknown, \
             then report your findings with sources.",
            transcript.render()
        )
    }
}

#[async_trait]
impl Participant for ResearchAgent {
    fn author(&self) -> Author {
        Author::Researcher
    }

    async fn respond(&self, transcript: &Transcript) -> Result<Turn, EvaluatorError> {
        info!(model = %self.model, "Research agent thinking");

        let search = self.search_tool.for_turn();
        let agent = self
            .client
            .agent(&self.model)
            .preamble(RESEARCH_SYSTEM_PROMPT)
            .temperature(self.temperature)
            .tool(search.clone())
            .build();

        let prompt = Self::prompt_for(transcript);
        debug!(prompt_len = prompt.len(), "Research prompt rendered");

        let result = agent
            .prompt(prompt.as_str())
            .multi_turn(self.max_tool_turns)
            .await;

        // A failed search fails the turn even if the model carried on.
        if let Some(failure) = search.take_failure() {
            warn!(error = %failure, "Research turn failed on web search");
            return Err(EvaluatorError::backend(
                Author::Researcher,
                format!("Web search failed: {}", failure),
            ));
        }

        let response = result.map_err(|e| backend_error(Author::Researcher, e))?;
        Ok(Turn::classify(Message::researcher(response)))
    }
}

// =============================================================================
// ADVISOR AGENT
// =============================================================================
/// Judges the idea from the transcript. Has no tools.
pub struct AdvisorAgent {
    client: openai::CompletionsClient,
    model: String,
    temperature: f64,
}

impl AdvisorAgent {
    pub fn new(config: &Config, openai_api_key: &str) -> Result<Self, EvaluatorError> {
        Ok(Self {
            client: completions_client(config, openai_api_key)?,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn prompt_for(transcript: &Transcript) -> String {
        format!(
            "{}\n\nGive your assessment. Start with \"{}:\" only if this is your final judgment.",
            transcript.render(),
            VERDICT_SENTINEL
        )
    }
}

#[async_trait]
impl Participant for AdvisorAgent {
    fn author(&self) -> Author {
        Author::Advisor
    }

    async fn respond(&self, transcript: &Transcript) -> Result<Turn, EvaluatorError> {
        info!(model = %self.model, "Advisor agent thinking");

        let agent = self
            .client
            .agent(&self.model)
            .preamble(ADVISOR_SYSTEM_PROMPT)
            .temperature(self.temperature)
            .build();

        let response = agent
            .prompt(Self::prompt_for(transcript).as_str())
            .await
            .map_err(|e| backend_error(Author::Advisor, e))?;

        Ok(Turn::classify(Message::advisor(response)))
    }
}
