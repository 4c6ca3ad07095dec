//! `summeval` - grade document summaries with a judge model.
//!
//! ## Commands
//!
//! - `run`: evaluate every example of a JSONL dataset with the summary evaluators
//! - `prompt`: print the grading prompt one example would produce (no network)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use summeval::core::ChatModel;
use summeval::eval::{
    evaluators_for, run_experiment, summary_evaluators, Dataset, ExperimentConfig, JudgeInvoker,
    Rubric, SummaryEvaluator, DEFAULT_JUDGE_TEMPERATURE,
};
use summeval::models::{HttpBackend, RetryChatModel, RetryPolicy, ScriptedChatModel};
use summeval::openai::{OpenAiChatModel, OpenAiConfig, DEFAULT_BASE_URL};
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "summeval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Score document summaries with an LLM judge", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a dataset and print a per-evaluator summary
    Run {
        /// JSONL dataset, one example per line
        #[arg(short, long, env = "SUMMEVAL_DATASET")]
        dataset: PathBuf,

        /// Prefix of the generated experiment name
        #[arg(long, default_value = "Document Summarization Evaluation")]
        experiment_prefix: String,

        /// Rubrics to apply (default: all)
        #[arg(short, long, value_delimiter = ',')]
        rubric: Vec<Rubric>,

        /// Judge model name
        #[arg(long, env = "SUMMEVAL_JUDGE_MODEL", default_value = "gpt-4o-mini")]
        model: String,

        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: String,

        #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Judge sampling temperature
        #[arg(long, default_value_t = DEFAULT_JUDGE_TEMPERATURE)]
        temperature: f64,

        /// Ask the API for JSON-object replies
        #[arg(long)]
        json_mode: bool,

        /// Maximum evaluations in flight
        #[arg(long, default_value_t = 8)]
        max_concurrency: usize,

        /// Attempts per judge call on rate limits and timeouts (1 disables retries)
        #[arg(long, default_value_t = 1)]
        max_attempts: usize,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Write one JSON line per example here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the grading prompt for one example
    Prompt {
        #[arg(short, long, env = "SUMMEVAL_DATASET")]
        dataset: PathBuf,

        /// Zero-based example index
        #[arg(short, long, default_value_t = 0)]
        index: usize,

        #[arg(short, long, default_value = "content")]
        rubric: Rubric,
    },
}

fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
            .ok();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            dataset,
            experiment_prefix,
            rubric,
            model,
            api_key,
            base_url,
            temperature,
            json_mode,
            max_concurrency,
            max_attempts,
            timeout_secs,
            output,
        } => {
            let backend = match timeout_secs {
                Some(secs) => HttpBackend::with_timeout(Duration::from_secs(secs))?,
                None => HttpBackend::new(),
            };
            let config = OpenAiConfig::new(api_key, model)
                .with_base_url(base_url)
                .with_json_mode(json_mode);
            let mut client: Arc<dyn ChatModel> =
                Arc::new(OpenAiChatModel::new(config, Arc::new(backend)));
            if max_attempts > 1 {
                client = Arc::new(RetryChatModel::new(
                    client,
                    RetryPolicy {
                        max_attempts,
                        ..RetryPolicy::default()
                    },
                ));
            }

            let judge = JudgeInvoker::new(client).with_temperature(temperature);
            let evaluators = if rubric.is_empty() {
                summary_evaluators(judge)
            } else {
                evaluators_for(&rubric, judge)
            };

            let data = Dataset::load(&dataset).await?;
            info!(examples = data.len(), "dataset loaded");

            let experiment = ExperimentConfig::new(data.name.clone(), experiment_prefix)
                .with_max_concurrency(max_concurrency);
            let report = run_experiment(&experiment, &data, &evaluators).await;

            if let Some(path) = output {
                let mut lines = String::new();
                for outcome in &report.outcomes {
                    lines.push_str(&serde_json::to_string(outcome)?);
                    lines.push('\n');
                }
                tokio::fs::write(&path, lines)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "results written");
            }

            println!("Experiment: {}", report.experiment_name);
            println!("Dataset:    {}", report.dataset);
            for summary in report.summary() {
                println!(
                    "  {:<28} mean={:.3} evaluated={} parse_failures={} errors={}",
                    summary.key,
                    summary.mean_score,
                    summary.evaluated,
                    summary.parse_failures,
                    summary.failed
                );
            }
        }

        Commands::Prompt {
            dataset,
            index,
            rubric,
        } => {
            let data = Dataset::load(&dataset).await?;
            let Some(example) = data.examples.get(index) else {
                bail!("example {index} out of range, dataset has {} examples", data.len());
            };
            // Rendering never reaches the judge, so any client will do.
            let offline: Arc<dyn ChatModel> = Arc::new(ScriptedChatModel::new(vec![]));
            let evaluator = SummaryEvaluator::new(rubric, JudgeInvoker::new(offline));
            println!("{}", evaluator.render_prompt(example)?);
        }
    }

    Ok(())
}
