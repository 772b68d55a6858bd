//! layerconf
//!
//! Command-line front end for the layered configuration engine: compose
//! layers once, list a file's fingerprints, or recompose on a schedule.

use anyhow::{Context, Result};
use clap::Parser;
use layerconf::cli::compose::ComposeArgs;
use layerconf::cli::watch::WatchArgs;
use layerconf::cli::{Cli, Command, FingerprintsArgs, build_stack};
use layerconf::config::{Document, LiveConfig, Loader};
use layerconf::format::{OutputFormat, format_fingerprints};
use layerconf::logging::Logger;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)
                .with_context(|| format!("opening log file {filename}"))?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    let loader = Loader::with_logger(Logger::new().with_name("layerconf"));

    match cli.command {
        Command::Compose(args) => run_compose(&loader, args),
        Command::Fingerprints(args) => run_fingerprints(&loader, args),
        Command::Watch(args) => run_watch(&loader, args).await,
    }
}

fn run_compose(loader: &Loader, args: ComposeArgs) -> Result<()> {
    let stack = build_stack(&args.layers, loader);
    let document = stack.compose().context("composing layers")?;
    print_document(&document, args.format, args.get.as_deref())
}

fn run_fingerprints(loader: &Loader, args: FingerprintsArgs) -> Result<()> {
    let mut document = loader.open(&args.path)?;
    let fingerprints = loader.resolve_imports(&mut document, &args.path)?;
    print!("{}", format_fingerprints(&fingerprints));
    Ok(())
}

async fn run_watch(loader: &Loader, args: WatchArgs) -> Result<()> {
    let stack = build_stack(&args.layers, loader);
    let live = Arc::new(LiveConfig::new(stack).context("composing layers")?);
    print_document(&live.current(), args.format, None)?;

    let mut ticker = tokio::time::interval(args.interval());
    ticker.tick().await;
    info!(
        interval_ms = args.interval().as_millis() as u64,
        layers = args.layers.len(),
        "Polling config layers"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted, stopping");
                return Ok(());
            }
        }

        // Stat and parse calls block; keep them off the runtime threads.
        let polled = Arc::clone(&live);
        match tokio::task::spawn_blocking(move || polled.reload()).await? {
            Ok(true) => {
                if args.format == OutputFormat::Yaml {
                    println!("---");
                }
                print_document(&live.current(), args.format, None)?;
            }
            Ok(false) => {}
            // Keep serving the last good document until the file is fixed.
            Err(err) => warn!("Reload failed: {err}"),
        }
    }
}

fn print_document(document: &Document, format: OutputFormat, get: Option<&str>) -> Result<()> {
    let rendered = match get {
        Some(path) => {
            let value = document
                .lookup(path)
                .with_context(|| format!("no value at `{path}`"))?;
            format.render_value(value)?
        }
        None => format.render(document)?,
    };
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
