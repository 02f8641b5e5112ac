//! # Startup Evaluator CLI
//!
//! Command-line front end for the research/advisor evaluation.
//!
//! ## Quick Start
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! export TAVILY_API_KEY=tvly-...
//! cargo run -- "A subscription box for artisanal coffee"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use startup_evaluator::config::turn_cap;
use startup_evaluator::{evaluate, Config, Credentials, EvaluationRequest, EvaluatorError};

/// Shown when a key is missing; nothing else runs.
const MISSING_KEYS_WARNING: &str = "Please enter your API keys to continue.";

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
/// # Rust Concept: Derive Macros with Clap
///
/// `env = "..."` lets each key come from a flag or an environment variable.
/// `hide_env_values` keeps the secrets out of `--help`.
#[derive(Parser, Debug)]
#[command(
    name = "startup-evaluator",
    version,
    about = "Enter your startup/business idea to view insights",
    long_about = r#"
Startup Evaluator - research and advice on a business idea.

A research agent searches the web for market data and competitors, then an
advisor agent decides whether the idea is worth pursuing. They take turns
until the advisor gives a FINAL ANSWER.

Both an OpenAI key and a Tavily key are required.

EXAMPLES:
  startup-evaluator "A subscription box for artisanal coffee"

  # Show the whole research/advisor exchange
  startup-evaluator --show-transcript "Drone delivery for rural pharmacies"

  # Remove the turn cap (the conversation may then run forever)
  startup-evaluator --max-turns 0 "Peer-to-peer tool rental"
"#
)]
struct Args {
    /// Your business or startup idea
    #[arg(value_name = "IDEA")]
    idea: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, help = "OpenAI API key")]
    openai_api_key: Option<String>,

    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true, help = "Tavily API key")]
    tavily_api_key: Option<String>,

    /// Overrides OPENAI_MODEL
    #[arg(short = 'm', long = "model", help = "OpenAI model to use")]
    model: Option<String>,

    /// Overrides MAX_TURNS; 0 removes the cap
    #[arg(long = "max-turns", help = "Maximum agent replies before giving up (0 = unlimited)")]
    max_turns: Option<usize>,

    #[arg(long = "show-transcript", help = "Print every agent reply, not just the verdict")]
    show_transcript: bool,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose/debug logging")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;

    init_logging(args.verbose, &config.log_level)?;
    info!("Startup evaluator starting up...");

    if let Some(model) = args.model {
        info!(model = %model, "Using model from command line");
        config.model = model;
    }
    if let Some(max_turns) = args.max_turns {
        config.max_turns = turn_cap(max_turns);
    }

    // Validated inside `evaluate`, after the credential check.
    info!(
        model = %config.model,
        max_turns = ?config.max_turns,
        "Configuration loaded"
    );

    // Flags and env come through clap; fall back to .env for anything unset.
    let from_env = Credentials::from_env();
    let credentials = Credentials::new(
        args.openai_api_key.or(from_env.openai_api_key),
        args.tavily_api_key.or(from_env.tavily_api_key),
    );

    let request = EvaluationRequest::new(args.idea, credentials);

    match evaluate(&request, &config).await {
        Ok(evaluation) => {
            if args.show_transcript {
                for message in evaluation.transcript.messages().iter().skip(1) {
                    println!("\n--- {} ---\n{}", message.author(), message.content());
                }
            }

            println!("\n{}", "=".repeat(60));
            println!("VERDICT ({} turns)", evaluation.turns());
            println!("{}\n", "=".repeat(60));
            println!("{}", evaluation.verdict.content());
            println!("\n{}", "=".repeat(60));
        }
        Err(EvaluatorError::MissingCredential(missing)) => {
            eprintln!("\n⚠️  {}", MISSING_KEYS_WARNING);
            eprintln!("   Missing: {}", missing.join(", "));
            eprintln!("   Pass --openai-api-key / --tavily-api-key or set them in .env");
            std::process::exit(2);
        }
        Err(e) => {
            error!(error = %e, "Evaluation failed");
            eprintln!("\n❌ Evaluation failed: {}", e);

            if let EvaluatorError::TurnLimitExceeded { .. } = e {
                eprintln!("\n💡 Tip: raise --max-turns, or pass 0 to remove the cap");
            }

            return Err(e.into());
        }
    }

    info!("Evaluation completed successfully");
    Ok(())
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// `--verbose` forces DEBUG; otherwise RUST_LOG (default "info") decides.
fn init_logging(verbose: bool, log_level: &str) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["test", "A subscription box for artisanal coffee"]);

        assert_eq!(args.idea, "A subscription box for artisanal coffee");
        assert!(!args.show_transcript);
        assert!(!args.verbose);
        assert_eq!(args.max_turns, None);
    }

    #[test]
    fn test_args_with_flags() {
        let args = Args::parse_from([
            "test",
            "--openai-api-key", "sk-test",
            "--tavily-api-key", "tvly-test",
            "--model", "gpt-4o",
            "--max-turns", "0",
            "--show-transcript",
            "Test idea",
        ]);

        assert_eq!(args.idea, "Test idea");
        assert_eq!(args.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(args.tavily_api_key.as_deref(), Some("tvly-test"));
        assert_eq!(args.model.as_deref(), Some("gpt-4o"));
        assert_eq!(args.max_turns.map(turn_cap), Some(None));
        assert!(args.show_transcript);
    }
}
