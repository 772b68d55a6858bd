//! CLI command definitions for layerconf
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod compose;
pub mod watch;

use crate::config::{Layer, LayerStack, Loader};
use clap::{Args, Parser, Subcommand};
use compose::ComposeArgs;
use std::path::PathBuf;
use std::str::FromStr;
use watch::WatchArgs;

/// Layered YAML configuration tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compose layers and print the merged document
    Compose(ComposeArgs),

    /// Resolve one file's imports and list every file it depends on
    Fingerprints(FingerprintsArgs),

    /// Recompose on a polling interval and print each new document
    Watch(WatchArgs),
}

/// Arguments for the fingerprints subcommand
#[derive(Args, Debug)]
pub struct FingerprintsArgs {
    /// Root config file
    #[arg(value_name = "FILE")]
    pub path: PathBuf,
}

/// A layer given on the command line as `NAME=PATH` or just `PATH`.
///
/// Without a name the file stem is used, so `base.yaml` becomes `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerArg {
    pub name: String,
    pub path: PathBuf,
}

impl FromStr for LayerArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("layer path must not be empty".to_string());
        }
        if let Some((name, path)) = s.split_once('=') {
            if name.is_empty() || path.is_empty() {
                return Err(format!("expected NAME=PATH, got `{s}`"));
            }
            return Ok(Self {
                name: name.to_string(),
                path: PathBuf::from(path),
            });
        }
        let path = PathBuf::from(s);
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| s.to_string());
        Ok(Self { name, path })
    }
}

/// Build a stack from command-line layers, in the order given.
pub fn build_stack(layers: &[LayerArg], loader: &Loader) -> LayerStack {
    let mut stack = LayerStack::new();
    for arg in layers {
        stack.push_layer(Layer::new(&arg.name, &arg.path).with_loader(loader.clone()));
    }
    stack
}
