//! # Evaluator Module
//!
//! Entry point the host calls: validate the request, build the two
//! participants from the supplied keys and run the conversation.

use tracing::{info, warn};

use crate::agent::{AdvisorAgent, ResearchAgent};
use crate::config::{ApiKeys, Config, Credentials};
use crate::conversation::Conversation;
use crate::error::EvaluatorError;
use crate::participant::Participant;
use crate::tools::TavilySearchTool;
use crate::transcript::{Message, Transcript};

/// What the host hands over: one idea and two secrets.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub idea: String,
    pub credentials: Credentials,
}

impl EvaluationRequest {
    pub fn new(idea: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            idea: idea.into(),
            credentials,
        }
    }

    /// Check the request before anything runs.
    ///
    /// Credentials are checked first so a user with no keys always sees
    /// the credential warning.
    pub fn validate(&self) -> Result<ApiKeys, EvaluatorError> {
        let keys = self.credentials.require()?;
        if self.idea.trim().is_empty() {
            return Err(EvaluatorError::EmptyIdea);
        }
        Ok(keys)
    }
}

/// A finished evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// The message that ended the conversation.
    pub verdict: Message,
    /// Full history, seed message included.
    pub transcript: Transcript,
}

impl Evaluation {
    /// Number of participant replies.
    pub fn turns(&self) -> usize {
        self.transcript.len() - 1
    }
}

/// Validate `request`, then build participants with `build` and run them.
///
/// `build` is only called once both keys are present, so a rejected
/// request never constructs or invokes a participant. An error from
/// `build` is returned before the conversation starts.
pub async fn evaluate_with<R, A, F>(
    request: &EvaluationRequest,
    max_turns: Option<usize>,
    build: F,
) -> Result<Evaluation, EvaluatorError>
where
    R: Participant,
    A: Participant,
    F: FnOnce(&ApiKeys) -> Result<(R, A), EvaluatorError>,
{
    let keys = match request.validate() {
        Ok(keys) => keys,
        Err(e) => {
            warn!(error = %e, "Evaluation not started");
            return Err(e);
        }
    };

    let (research, advisor) = build(&keys)?;

    let idea = request.idea.trim();
    info!(idea = %idea, ?max_turns, "Starting evaluation");

    let mut transcript = Transcript::seeded(idea);
    let verdict = Conversation::new(&research, &advisor)
        .with_max_turns(max_turns)
        .run(&mut transcript)
        .await?;

    Ok(Evaluation {
        verdict,
        transcript,
    })
}

/// Evaluate with the Rig-backed OpenAI agents and Tavily search.
///
/// Missing keys are reported before anything in `config` is checked.
pub async fn evaluate(
    request: &EvaluationRequest,
    config: &Config,
) -> Result<Evaluation, EvaluatorError> {
    evaluate_with(request, config.max_turns, |keys| {
        config.validate()?;

        let search = TavilySearchTool::new(keys.tavily.as_str())
            .with_base_url(config.tavily_base_url.as_str())
            .with_max_results(config.max_search_results);

        Ok((
            ResearchAgent::new(config, &keys.openai, search)?,
            AdvisorAgent::new(config, &keys.openai)?,
        ))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reports_credentials_before_idea() {
        let request = EvaluationRequest::new("", Credentials::default());
        assert!(matches!(
            request.validate(),
            Err(EvaluatorError::MissingCredential(_))
        ));
    }

    #[test]
    fn test_validate_rejects_blank_idea() {
        let creds = Credentials::new(Some("sk".to_string()), Some("tvly".to_string()));
        let request = EvaluationRequest::new("   ", creds);

        assert!(matches!(request.validate(), Err(EvaluatorError::EmptyIdea)));
    }

    fn invalid_config() -> Config {
        let mut config = Config::default();
        config.max_tool_turns = 0;
        config
    }

    #[tokio::test]
    async fn test_evaluate_reports_missing_keys_before_invalid_config() {
        let request = EvaluationRequest::new("idea", Credentials::default());

        let err = evaluate(&request, &invalid_config()).await.unwrap_err();
        assert!(err.is_missing_credential());
    }

    #[tokio::test]
    async fn test_evaluate_rejects_invalid_config_once_keys_are_present() {
        let creds = Credentials::new(Some("sk".to_string()), Some("tvly".to_string()));
        let request = EvaluationRequest::new("idea", creds);

        let err = evaluate(&request, &invalid_config()).await.unwrap_err();
        assert!(matches!(err, EvaluatorError::Config(_)));
    }

    #[tokio::test]
    async fn test_evaluate_without_keys_never_reaches_backends() {
        let request = EvaluationRequest::new("A subscription box for artisanal coffee", Credentials::default());

        let err = evaluate(&request, &Config::default()).await.unwrap_err();
        assert!(err.is_missing_credential());
    }
}
