//! @ai:module:intent CLI for the qualia-probe conversation runner
//! @ai:module:layer presentation

use anyhow::Result;
use clap::{Parser, Subcommand};
use qualia_probe::{
    build_plan, combine_shards, load_questions, shard_paths, write_records, AnthropicClient,
    BatchDispatcher, GeminiClient, MockProviderClient, OpenAiClient, OutcomeStatus, ProbeConfig,
    Provider, ProviderClient, ResultRecord,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "qualia-probe")]
#[command(about = "Batched conversation runner for LLM phenomenology research")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the question set against a provider
    Run {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to the TOML question set
        #[arg(short, long, default_value = "questions.toml")]
        questions: PathBuf,

        /// Output CSV file
        #[arg(short, long, default_value = "results.csv")]
        output: PathBuf,

        /// Provider endpoint (anthropic, openai, gemini)
        #[arg(short, long)]
        provider: Option<Provider>,

        /// Model identifier override
        #[arg(short, long)]
        model: Option<String>,

        /// How many times to repeat each question
        #[arg(short, long)]
        repetitions: Option<u32>,

        /// Concurrent conversations per batch
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Delay between batches in milliseconds
        #[arg(long)]
        batch_delay_ms: Option<u64>,

        /// Run without making API calls
        #[arg(long)]
        dry_run: bool,
    },

    /// Combine previously recorded shard files into one
    Combine {
        /// Explicit shard paths, combined in the given order
        #[arg(required_unless_present = "count")]
        shards: Vec<PathBuf>,

        /// Directory holding sequentially numbered shards
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Shard name prefix for sequential expansion
        #[arg(long, default_value = "claude_b")]
        prefix: String,

        /// Expand {prefix}1.csv..{prefix}N.csv instead of explicit paths
        #[arg(long)]
        count: Option<u32>,

        /// Output CSV file
        #[arg(short, long, default_value = "combined.csv")]
        output: PathBuf,
    },

    /// List the questions in a question set
    List {
        /// Path to the TOML question set
        #[arg(short, long, default_value = "questions.toml")]
        questions: PathBuf,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "probe.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qualia_probe=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            questions,
            output,
            provider,
            model,
            repetitions,
            batch_size,
            batch_delay_ms,
            dry_run,
        } => {
            run_probe(RunArgs {
                config,
                questions,
                output,
                provider,
                model,
                repetitions,
                batch_size,
                batch_delay_ms,
                dry_run,
            })
            .await
        }
        Commands::Combine {
            shards,
            dir,
            prefix,
            count,
            output,
        } => combine(shards, dir, prefix, count, output),
        Commands::List { questions } => list_questions(questions),
        Commands::Init { output } => init_config(output),
    }
}

struct RunArgs {
    config: Option<PathBuf>,
    questions: PathBuf,
    output: PathBuf,
    provider: Option<Provider>,
    model: Option<String>,
    repetitions: Option<u32>,
    batch_size: Option<usize>,
    batch_delay_ms: Option<u64>,
    dry_run: bool,
}

/// @ai:intent Run the full probe: plan, dispatch, record
/// @ai:effects network, fs:write
async fn run_probe(args: RunArgs) -> Result<()> {
    let mut config = load_or_default_config(args.config)?;

    if let Some(provider) = args.provider {
        config.api.provider = provider;
    }
    if let Some(model) = args.model {
        config.api.model = model;
    }
    if let Some(repetitions) = args.repetitions {
        config.run.repetitions = repetitions;
    }
    if let Some(batch_size) = args.batch_size {
        config.run.batch_size = batch_size;
    }
    if let Some(delay) = args.batch_delay_ms {
        config.run.batch_delay_ms = delay;
    }
    config.run.dry_run = config.run.dry_run || args.dry_run;

    let questions = load_questions(&args.questions)?;
    let plan = build_plan(&questions, config.run.repetitions)?;

    tracing::info!(
        "Starting {} conversations with {} ({})",
        plan.len(),
        config.api.provider,
        config.api.model()
    );
    tracing::info!(
        "Questions: {}, Repetitions: {}, Batch size: {}",
        questions.len(),
        config.run.repetitions,
        config.run.batch_size
    );

    let batch_delay = Duration::from_millis(config.run.batch_delay_ms);

    let records = if config.run.dry_run {
        tracing::info!("Running in dry-run mode, no API calls will be made");
        let client = Arc::new(MockProviderClient::new(
            "[DRY RUN] No actual API call made".to_string(),
        ));
        dispatch(client, &plan, config.run.batch_size, batch_delay).await?
    } else {
        match config.api.provider {
            Provider::Anthropic => {
                let client = Arc::new(AnthropicClient::new(config.api.clone())?);
                dispatch(client, &plan, config.run.batch_size, batch_delay).await?
            }
            Provider::OpenAi => {
                let client = Arc::new(OpenAiClient::new(config.api.clone())?);
                dispatch(client, &plan, config.run.batch_size, batch_delay).await?
            }
            Provider::Gemini => {
                let client = Arc::new(GeminiClient::new(config.api.clone())?);
                dispatch(client, &plan, config.run.batch_size, batch_delay).await?
            }
        }
    };

    write_records(&args.output, &records)?;
    tracing::info!("Results saved to {}", args.output.display());

    print_summary(&records);
    Ok(())
}

/// @ai:intent Dispatch the plan through one provider client
/// @ai:effects network
async fn dispatch<C: ProviderClient>(
    client: Arc<C>,
    plan: &[qualia_probe::ConversationUnit],
    batch_size: usize,
    batch_delay: Duration,
) -> Result<Vec<ResultRecord>> {
    let dispatcher = BatchDispatcher::new(client, batch_size, batch_delay)?;
    dispatcher.run(plan).await
}

/// @ai:intent Combine shard files into a single output file
/// @ai:effects fs:read, fs:write
fn combine(
    shards: Vec<PathBuf>,
    dir: PathBuf,
    prefix: String,
    count: Option<u32>,
    output: PathBuf,
) -> Result<()> {
    let paths = match count {
        Some(n) => shard_paths(&dir, &prefix, n),
        None => shards,
    };

    let combined = combine_shards(&paths)?;
    write_records(&output, &combined)?;

    println!("Combined file saved as: {}", output.display());
    println!("Total rows: {}", combined.len());
    Ok(())
}

/// @ai:intent List questions in a question set
/// @ai:effects fs:read
fn list_questions(path: PathBuf) -> Result<()> {
    let questions = load_questions(&path)?;

    println!("Questions in {} ({}):", path.display(), questions.len());
    println!();
    println!("{:<30} {:<18} Text", "ID", "Category");
    println!("{}", "-".repeat(70));

    for question in &questions {
        println!("{:<30} {:<18} {}", question.id, question.category, question.text);
    }

    Ok(())
}

/// @ai:intent Initialize default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    let config = ProbeConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Load configuration or use defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<ProbeConfig> {
    match path {
        Some(p) => ProbeConfig::load(&p),
        None => {
            let default_path = PathBuf::from("probe.toml");

            if default_path.exists() {
                ProbeConfig::load(&default_path)
            } else {
                Ok(ProbeConfig::default())
            }
        }
    }
}

/// @ai:intent Print per-status record counts and token totals
/// @ai:effects io
fn print_summary(records: &[ResultRecord]) {
    let count = |status: OutcomeStatus| records.iter().filter(|r| r.status == status).count();
    let tokens_sent: u64 = records.iter().map(|r| u64::from(r.tokens_sent)).sum();
    let tokens_received: u64 = records.iter().map(|r| u64::from(r.tokens_received)).sum();

    println!();
    println!("Run Summary");
    println!("===========");
    println!("{:<20} {:>8}", "Conversations:", records.len());
    println!("{:<20} {:>8}", "Success:", count(OutcomeStatus::Success));
    println!("{:<20} {:>8}", "Error:", count(OutcomeStatus::Error));
    println!("{:<20} {:>8}", "Blocked:", count(OutcomeStatus::Blocked));
    println!("{:<20} {:>8}", "Tokens sent:", tokens_sent);
    println!("{:<20} {:>8}", "Tokens received:", tokens_received);
}
