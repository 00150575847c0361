//! `toon-delta` CLI — measure TOON vs JSON token cost and prepare file
//! context for an LLM.
//!
//! ## Usage
//!
//! ```sh
//! # Compare referenced files and print the report plus the chosen payloads
//! toon-delta select data/users.json data/config.json notes.md
//!
//! # Same batch as JSON, forwarding re-encoded JSON when JSON wins
//! toon-delta select --json --reencode-baseline data/*.json
//!
//! # Token counts for a single value (stdin → stdout)
//! echo '{"a":[1,2,3]}' | toon-delta compare
//!
//! # Encode JSON to TOON with a pipe delimiter
//! toon-delta encode --delimiter pipe -i data.json -o data.toon
//!
//! # Count tokens of arbitrary text
//! toon-delta count -i prompt.txt
//! ```
//!
//! Logs go to stderr; `-v`/`-vv` or `RUST_LOG` control the level.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use toon_delta::{
    parse_input, resolve_all, BaselinePayload, Comparator, ContentSource, Delimiter,
    EncodeOptions, InputFilter, JsonEncoder, Reference, Selector, SelectorConfig, TokenCounter,
    TokenizerHandle, ToonEncoder,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "toon-delta",
    version,
    about = "Pick TOON or JSON per file by counting LLM tokens"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Args, Clone, Copy)]
struct LayoutArgs {
    /// Delimiter for inline arrays and tabular rows: comma, tab or pipe
    #[arg(long, default_value = "comma")]
    delimiter: Delimiter,
    /// Spaces per indentation level
    #[arg(long, default_value_t = 2)]
    indent: usize,
}

impl LayoutArgs {
    fn encoder(self) -> ToonEncoder {
        ToonEncoder::new(EncodeOptions {
            indent: self.indent,
            delimiter: self.delimiter,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compare files, report the delta per file and print what would be sent
    Select {
        /// Files to compare (`path` or `path:START-END`)
        #[arg(required = true)]
        files: Vec<String>,
        /// Accepted file extensions (repeatable)
        #[arg(long = "extension", default_value = "json")]
        extensions: Vec<String>,
        /// Forward re-encoded JSON instead of the file text when JSON wins
        #[arg(long)]
        reencode_baseline: bool,
        /// Print the batch outcome as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Show token counts for one JSON value in both formats
    Compare {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Encode JSON to TOON
    Encode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Count tokens of arbitrary text
    Count {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli.command);
    TokenizerHandle::shutdown();
    result
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(command: Commands) -> Result<()> {
    let tokenizer = TokenizerHandle::global();

    match command {
        Commands::Select {
            files,
            extensions,
            reencode_baseline,
            json,
            layout,
        } => {
            let config = SelectorConfig {
                filter: InputFilter::new(&extensions),
                baseline_payload: if reencode_baseline {
                    BaselinePayload::Reencoded
                } else {
                    BaselinePayload::Source
                },
            };
            let toon = layout.encoder();
            let comparator = Comparator::with_encoders(tokenizer, &toon, &JsonEncoder);
            let selector = Selector::with_comparator(comparator, config);

            let inputs = resolve_all(files.iter().map(|arg| Reference::parse(arg)));
            let outcome = selector.run(inputs);
            info!(
                processed = outcome.reports.len(),
                failed = outcome.failures(),
                "batch complete"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }
            if let Some(report) = outcome.render_report() {
                print!("{report}");
            }
            if let Some(summary) = outcome.render_payload_summary() {
                print!("{summary}");
                for message in outcome.messages() {
                    println!("{message}\n");
                }
            }
        }
        Commands::Compare {
            input,
            json,
            layout,
        } => {
            let text = read_input(input.as_deref())?;
            let value = parse_input(&text).context("Failed to parse input as JSON")?;
            let toon = layout.encoder();
            let result = Comparator::with_encoders(tokenizer, &toon, &JsonEncoder)
                .compare(&value)
                .context("Failed to compare token cost")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("JSON tokens: {}", result.baseline_tokens);
                println!("TOON tokens: {}", result.compact_tokens);
                println!("Delta:       {}", result.delta);
                println!("Format:      {}", result.chosen_label());
            }
        }
        Commands::Encode {
            input,
            output,
            layout,
        } => {
            let text = read_input(input.as_deref())?;
            let value = parse_input(&text).context("Failed to parse input as JSON")?;
            let toon = layout.encoder().encode_value(&value);
            write_output(output.as_deref(), &toon)?;
        }
        Commands::Count { input } => {
            let text = read_input(input.as_deref())?;
            let count = tokenizer
                .count(&text)
                .context("Failed to count tokens")?;
            println!("{count}");
        }
    }

    Ok(())
}

/// Read `-i FILE` the way `select` reads its inputs (lossy UTF-8, no BOM),
/// or all of stdin when no path is given.
fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            let source = ContentSource::File(PathBuf::from(path));
            let text = source
                .load()
                .with_context(|| format!("Failed to read input {path}"))?;
            Ok(text.into_owned())
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    let Some(path) = path else {
        print!("{content}");
        return Ok(());
    };
    std::fs::write(path, content).with_context(|| format!("Failed to write output {path}"))
}
