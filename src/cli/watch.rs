//! Watch subcommand for layerconf
//!
//! Polls the layers' fingerprints on a fixed interval and prints the
//! composed document whenever it changes. This is stat polling; no
//! filesystem notifications are used.

use super::LayerArg;
use crate::format::OutputFormat;
use clap::Args;
use std::time::Duration;

/// Default polling interval in seconds.
pub const DEFAULT_INTERVAL_SECS: f64 = 2.0;

/// Arguments for the watch subcommand
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Layers, lowest precedence first: `NAME=PATH` or `PATH`
    #[arg(value_name = "LAYER", required = true)]
    pub layers: Vec<LayerArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t, env = "LAYERCONF_FORMAT")]
    pub format: OutputFormat,

    /// Seconds between staleness checks
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_SECS, env = "LAYERCONF_INTERVAL")]
    pub interval: f64,
}

impl WatchArgs {
    /// The polling interval, clamped to at least 10ms.
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval.max(0.01))
    }
}
