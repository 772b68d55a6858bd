//! Compose subcommand for layerconf
//!
//! Loads each layer (with its imports), merges them in the order given and
//! prints the result.

use super::LayerArg;
use crate::format::OutputFormat;
use clap::Args;

/// Arguments for the compose subcommand
#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Layers, lowest precedence first: `NAME=PATH` or `PATH`
    #[arg(value_name = "LAYER", required = true)]
    pub layers: Vec<LayerArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t, env = "LAYERCONF_FORMAT")]
    pub format: OutputFormat,

    /// Print only the value at this dotted path (e.g. `server.port`)
    #[arg(long, value_name = "PATH")]
    pub get: Option<String>,
}
