// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Leima - Favicon Fingerprint Scanner
 * Standalone CLI for favicon-based technology reconnaissance
 *
 * Features:
 * - Shodan-compatible mmh3 favicon fingerprinting
 * - Built-in and user-supplied signature tables
 * - Concurrent batch scanning with graceful Ctrl-C
 * - Search-engine query emission (Shodan, FOFA, ZoomEye)
 *
 * (c) 2026 Bountyy Oy
 */

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};

use leima_scanner::config::ScanConfig;
use leima_scanner::emitter::SearchService;
use leima_scanner::fetcher::HttpFaviconFetcher;
use leima_scanner::http_client::HttpClient;
use leima_scanner::matcher::MatchEngine;
use leima_scanner::output;
use leima_scanner::signatures::SignatureTable;

/// Leima - Favicon Fingerprint Scanner
#[derive(Parser)]
#[command(name = "leima")]
#[command(author = "Bountyy Oy <info@bountyy.fi>")]
#[command(version = "1.0.0")]
#[command(about = "Fingerprints web services by their favicon. Fast, table-driven, Rust.", long_about = None)]
struct Cli {
    /// Target URL(s) or host(s); stdin is read when none are given
    targets: Vec<String>,

    /// File with one target per line
    #[arg(short = 'l', long)]
    list: Option<PathBuf>,

    /// Signature table file (fingerprint,label per line); built-in table when unset
    #[arg(short = 'f', long, env = "LEIMA_FINGERPRINTS")]
    fingerprints: Option<PathBuf>,

    /// Maximum concurrent targets
    #[arg(long, default_value = "50")]
    concurrency: usize,

    /// Per-target timeout in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,

    /// Transport retry attempts per request
    #[arg(long, default_value = "2")]
    retries: u32,

    /// Custom User-Agent string
    #[arg(long)]
    user_agent: Option<String>,

    /// Accept invalid TLS certificates (self-signed appliances)
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Emit follow-up queries for these services (repeatable)
    #[arg(long, value_enum)]
    emit: Vec<ServiceArg>,

    /// Output file (stdout when unset)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the built-in signature table to this file and exit
    #[arg(long)]
    dump_signatures: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Suppress the banner and per-result lines, print only the summary/report
    #[arg(short, long)]
    silent: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Jsonl,
}

#[derive(Clone, Copy, ValueEnum)]
enum ServiceArg {
    Shodan,
    Fofa,
    Zoomeye,
}

impl From<ServiceArg> for SearchService {
    fn from(arg: ServiceArg) -> Self {
        match arg {
            ServiceArg::Shodan => SearchService::Shodan,
            ServiceArg::Fofa => SearchService::Fofa,
            ServiceArg::Zoomeye => SearchService::ZoomEye,
        }
    }
}

fn print_banner() {
    eprintln!(
        r#"
    __    ________________  ______
   / /   / ____/  _/  |/  //   |
  / /   / __/  / // /|_/ // /| |
 / /___/ /____/ // /  / // ___ |
/_____/_____/___/_/  /_//_/  |_|
      Favicon Fingerprint Scanner
      v1.0.0 - (c) 2026 Bountyy Oy
"#
    );
}

fn init_tracing(cli: &Cli) {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Targets come from positional args, a list file, and stdin, in that order.
fn collect_targets(cli: &Cli) -> Result<Vec<String>> {
    let mut targets = cli.targets.clone();

    if let Some(path) = &cli.list {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("cannot read target list {}", path.display()))?;
        targets.extend(
            raw.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(String::from),
        );
    }

    if targets.is_empty() && !std::io::stdin().is_terminal() {
        for line in std::io::stdin().lock().lines() {
            let line = line.context("failed reading targets from stdin")?;
            let line = line.trim();
            if !line.is_empty() {
                targets.push(line.to_string());
            }
        }
    }

    if targets.is_empty() {
        bail!("no targets given; pass URLs, --list <file>, or pipe targets on stdin");
    }

    Ok(targets)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli);

    if let Some(path) = &cli.dump_signatures {
        SignatureTable::dump_default_to_file(path)
            .with_context(|| format!("cannot write signature table to {}", path.display()))?;
        eprintln!("Wrote built-in signature table to {}", path.display());
        eprintln!("Edit it and pass it back with --fingerprints.");
        return Ok(());
    }

    if !cli.silent {
        print_banner();
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let config = ScanConfig {
        concurrency: cli.concurrency,
        timeout_secs: cli.timeout,
        max_retries: cli.retries,
        user_agent: cli.user_agent.clone(),
        signature_file: cli.fingerprints.clone(),
        accept_invalid_certs: cli.insecure,
    };
    config.validate()?;

    let table = match &config.signature_file {
        Some(path) => SignatureTable::load(path)?,
        None => SignatureTable::builtin(),
    };
    if table.is_empty() {
        warn!("Signature table has no entries; every fingerprint will be unknown");
    }
    info!(
        "Signature table ready: {} fingerprints, {} records",
        table.len(),
        table.records()
    );

    let targets = collect_targets(&cli)?;

    let client = HttpClient::new(
        config.timeout_secs,
        config.max_retries,
        config.user_agent.as_deref(),
        config.accept_invalid_certs,
    )?;
    let fetcher = HttpFaviconFetcher::new(client, Duration::from_secs(config.timeout_secs));
    let engine = MatchEngine::new(
        Arc::new(table),
        Arc::new(fetcher),
        config.concurrency,
    );

    // Ctrl-C cancels the batch; completed targets are still reported.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, finishing in-flight targets");
                cancel.cancel();
            }
        });
    }

    let started = Instant::now();
    info!("Starting favicon scan of {} target(s)", targets.len());

    let results = engine.match_all(&targets, &cancel).await;

    let services: Vec<SearchService> = cli.emit.iter().map(|s| SearchService::from(*s)).collect();

    let report = match cli.format {
        OutputFormat::Text => {
            let mut out = String::new();
            if !cli.silent {
                for result in &results {
                    out.push_str(&output::render_result_line(result));
                    out.push('\n');
                }
                out.push('\n');
            }
            out.push_str(&output::render_summary(&results, &services));
            out
        }
        OutputFormat::Json => output::render_json(&results)?,
        OutputFormat::Jsonl => output::render_jsonl(&results)?,
    };

    match &cli.output {
        Some(path) => fs::write(path, &report)
            .with_context(|| format!("cannot write report to {}", path.display()))?,
        None => print!("{report}"),
    }

    info!(
        "Scan finished: {} result(s) in {:.2}s",
        results.len(),
        started.elapsed().as_secs_f64()
    );

    if cancel.is_cancelled() && results.len() < targets.len() {
        warn!(
            "Batch was cancelled: {} of {} targets completed",
            results.len(),
            targets.len()
        );
    }

    Ok(())
}
