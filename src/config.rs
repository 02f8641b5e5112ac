//! # Configuration Module
//!
//! Loads settings and API keys from environment variables (and `.env`).
//! It demonstrates several important Rust patterns:
//! - The Default trait for sensible defaults
//! - Error handling with Result types
//! - Keeping secrets out of `Debug` output

use std::env;
use std::fmt;

use crate::error::EvaluatorError;
use crate::tools::{DEFAULT_MAX_RESULTS, DEFAULT_TAVILY_BASE_URL};

/// Environment variable holding the OpenAI key.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment variable holding the Tavily key.
pub const TAVILY_API_KEY_VAR: &str = "TAVILY_API_KEY";

/// Public OpenAI endpoint.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// The agent-graph default recursion limit the loop cap mirrors.
pub const DEFAULT_MAX_TURNS: usize = 25;

// =============================================================================
// CONFIGURATION STRUCT
// =============================================================================
/// Settings for one evaluator process.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI model both agents use (e.g., "gpt-4o-mini")
    pub model: String,

    /// Temperature for LLM responses (0.0 = deterministic)
    pub temperature: f64,

    /// Maximum number of search results per query
    pub max_search_results: usize,

    /// Cap on research/advisor replies before giving up.
    /// `None` means no cap.
    pub max_turns: Option<usize>,

    /// Maximum tool-call rounds inside one research reply
    pub max_tool_turns: usize,

    /// OpenAI-compatible chat completions base URL
    pub openai_base_url: String,

    /// Tavily API base URL
    pub tavily_base_url: String,

    /// Log filter (RUST_LOG syntax)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_search_results: DEFAULT_MAX_RESULTS,
            max_turns: Some(DEFAULT_MAX_TURNS),
            max_tool_turns: 5,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            tavily_base_url: DEFAULT_TAVILY_BASE_URL.to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// `0` disables the cap.
pub fn turn_cap(value: usize) -> Option<usize> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str, hint: &str) -> Result<T, EvaluatorError> {
    value
        .trim()
        .parse()
        .map_err(|_| EvaluatorError::Config(format!("{} must be {}, got: {}", name, hint, value)))
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================
impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Rust Concept: The ? Operator
    ///
    /// Each parse returns a Result; `?` hands the first failure back to
    /// the caller.
    pub fn from_env() -> Result<Self, EvaluatorError> {
        // Load .env file if it exists (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let mut config = Config::default();

        if let Ok(val) = env::var("OPENAI_MODEL") {
            config.model = val;
        }

        if let Ok(val) = env::var("TEMPERATURE") {
            config.temperature = parse_var("TEMPERATURE", &val, "a floating-point number (e.g., 0.2)")?;
        }

        if let Ok(val) = env::var("MAX_SEARCH_RESULTS") {
            config.max_search_results = parse_var("MAX_SEARCH_RESULTS", &val, "a positive integer")?;
        }

        if let Ok(val) = env::var("MAX_TURNS") {
            config.max_turns = turn_cap(parse_var("MAX_TURNS", &val, "a non-negative integer")?);
        }

        if let Ok(val) = env::var("MAX_TOOL_TURNS") {
            config.max_tool_turns = parse_var("MAX_TOOL_TURNS", &val, "a positive integer")?;
        }

        if let Ok(val) = env::var("OPENAI_BASE_URL") {
            config.openai_base_url = val;
        }

        if let Ok(val) = env::var("TAVILY_BASE_URL") {
            config.tavily_base_url = val;
        }

        if let Ok(val) = env::var("RUST_LOG") {
            config.log_level = val;
        }

        Ok(config)
    }

    /// Validate the configuration before any agent is built.
    pub fn validate(&self) -> Result<(), EvaluatorError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(EvaluatorError::Config(format!(
                "Temperature must be between 0.0 and 2.0, got: {}",
                self.temperature
            )));
        }

        if self.max_search_results == 0 {
            return Err(EvaluatorError::Config(
                "MAX_SEARCH_RESULTS must be at least 1".to_string(),
            ));
        }

        if self.max_tool_turns == 0 {
            return Err(EvaluatorError::Config(
                "MAX_TOOL_TURNS must be at least 1".to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(EvaluatorError::Config("OPENAI_MODEL cannot be empty".to_string()));
        }

        if self.openai_base_url.trim().is_empty() {
            return Err(EvaluatorError::Config("OPENAI_BASE_URL cannot be empty".to_string()));
        }

        Ok(())
    }
}

// =============================================================================
// CREDENTIALS
// =============================================================================
/// The two API keys as supplied by the user. Either may be missing.
#[derive(Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
}

/// Both keys, present and non-blank.
#[derive(Clone)]
pub struct ApiKeys {
    pub openai: String,
    pub tavily: String,
}

impl Credentials {
    pub fn new(openai_api_key: Option<String>, tavily_api_key: Option<String>) -> Self {
        Self {
            openai_api_key,
            tavily_api_key,
        }
    }

    /// Read both keys once from the environment (after loading `.env`).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::new(
            env::var(OPENAI_API_KEY_VAR).ok(),
            env::var(TAVILY_API_KEY_VAR).ok(),
        )
    }

    /// Names of the keys that are absent or blank.
    pub fn missing(&self) -> Vec<&'static str> {
        let blank = |key: &Option<String>| key.as_deref().map_or(true, |k| k.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.openai_api_key) {
            missing.push(OPENAI_API_KEY_VAR);
        }
        if blank(&self.tavily_api_key) {
            missing.push(TAVILY_API_KEY_VAR);
        }
        missing
    }

    /// Both keys, or `MissingCredential` naming what is absent.
    pub fn require(&self) -> Result<ApiKeys, EvaluatorError> {
        match (&self.openai_api_key, &self.tavily_api_key) {
            (Some(openai), Some(tavily)) if self.missing().is_empty() => Ok(ApiKeys {
                openai: openai.trim().to_string(),
                tavily: tavily.trim().to_string(),
            }),
            _ => Err(EvaluatorError::MissingCredential(self.missing())),
        }
    }
}

fn redact(key: &Option<String>) -> &'static str {
    match key {
        Some(k) if !k.trim().is_empty() => "<set>",
        _ => "<missing>",
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("tavily_api_key", &redact(&self.tavily_api_key))
            .finish()
    }
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKeys { .. }")
    }
}
