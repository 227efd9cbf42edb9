//! Trim a JSON chat history to a bounded tail without orphaning tool calls.
//!
//! Reads a JSON array of chat-completions messages, applies the truncation
//! reducer, and writes the retained messages back out as JSON.
//!
//! # Examples
//!
//! ```sh
//! # Keep the last 20 messages once the history passes 25
//! chat-trim --input history.json --target 20 --threshold 5
//!
//! # Pipe through, keeping the system prompt and reporting what happened
//! cat history.json | chat-trim --target 10 --pin-system --report > trimmed.json
//!
//! # Load the policy from a file, overriding the search direction
//! chat-trim --config reducer.json --search forward --input history.json
//!
//! # Print the config file schema
//! chat-trim --print-schema
//! ```

use chat_trim::history::ChatHistory;
use chat_trim::reducer::{CutSearch, ReducerConfig, TruncationReducer};
use chat_trim::{Message, json_schema_for};
use clap::Parser;
use std::process;
use tokio::io::AsyncReadExt;
use tracing::{Level, debug};

/// Trim a JSON chat history to a bounded tail without orphaning tool calls.
#[derive(Parser, Debug)]
#[command(name = "chat-trim")]
struct Cli {
    // ── Input / output ─────────────────────────────────────────
    /// JSON file with the message array (reads stdin when omitted)
    #[arg(long, short)]
    input: Option<String>,

    /// Write the retained messages here instead of stdout
    #[arg(long, short)]
    output: Option<String>,

    // ── Policy ─────────────────────────────────────────────────
    /// JSON reducer config file; flags below override its values
    #[arg(long)]
    config: Option<String>,

    /// Messages to keep after a cut
    #[arg(long)]
    target: Option<usize>,

    /// Extra messages tolerated before cutting
    #[arg(long)]
    threshold: Option<usize>,

    /// Direction to move a cut that would split a tool call (backward, forward)
    #[arg(long)]
    search: Option<CutSearch>,

    /// Prefer starting the retained tail on a user message
    #[arg(long)]
    prefer_user_boundary: bool,

    /// Keep leading system messages in front of the retained tail
    #[arg(long)]
    pin_system: bool,

    // ── Reporting ──────────────────────────────────────────────
    /// Print a one-line summary of the reduction to stderr
    #[arg(long)]
    report: bool,

    /// Print the reducer config JSON schema and exit
    #[arg(long)]
    print_schema: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ── Helpers ────────────────────────────────────────────────────────

/// Merge the optional config file with CLI overrides.
fn build_config(cli: &Cli, file: Option<ReducerConfig>) -> Result<ReducerConfig, String> {
    let mut config = match (file, cli.target) {
        (Some(config), _) => config,
        (None, Some(target)) => ReducerConfig::new(target, 0)?,
        (None, None) => return Err("provide --target or --config".to_string()),
    };

    if let Some(target) = cli.target {
        config.target_count = target;
    }
    if let Some(threshold) = cli.threshold {
        config.threshold_count = threshold;
    }
    if let Some(search) = cli.search {
        config.search = search;
    }
    if cli.prefer_user_boundary {
        config.prefer_user_boundary = true;
    }
    if cli.pin_system {
        config.pin_system_prefix = true;
    }

    config.validate()?;
    Ok(config)
}

async fn read_input(cli: &Cli) -> Result<String, String> {
    match &cli.input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("failed to read input '{path}': {e}")),
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            Ok(buf)
        }
    }
}

fn parse_messages(content: &str) -> Result<Vec<Message>, String> {
    serde_json::from_str(content).map_err(|e| format!("failed to parse message array: {e}"))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> Result<Option<String>, String> {
    if cli.print_schema {
        let schema = json_schema_for::<ReducerConfig>();
        return serde_json::to_string_pretty(&schema)
            .map(Some)
            .map_err(|e| format!("failed to format schema: {e}"));
    }

    let file_config = match &cli.config {
        Some(path) => Some(ReducerConfig::from_json_file(path)?),
        None => None,
    };
    let config = build_config(cli, file_config)?;
    debug!("Reducer config: {config:?}");

    let messages = parse_messages(&read_input(cli).await?)?;
    let mut reducer = TruncationReducer::with_history(config, ChatHistory::from(messages));
    let outcome = reducer.reduce();
    if cli.report {
        eprintln!("{outcome}");
    }

    let json = serde_json::to_string_pretty(reducer.history())
        .map_err(|e| format!("failed to serialize messages: {e}"))?;

    match &cli.output {
        Some(path) => {
            tokio::fs::write(path, format!("{json}\n"))
                .await
                .map_err(|e| format!("failed to write output '{path}': {e}"))?;
            Ok(None)
        }
        None => Ok(Some(json)),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(Some(output)) => println!("{output}"),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
