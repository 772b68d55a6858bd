//! Diagnostics for configuration loading.
//!
//! Non-fatal conditions (missing or empty files, detected changes) are
//! reported through a [`Logger`], which outputs to:
//! - tracing (stderr/file, whatever subscriber the binary installed) - always
//! - an optional caller-supplied sink that receives the message and severity

use std::fmt;
use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => write!(f, "debug"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Atomic level filter that can be adjusted while loggers are in use.
///
/// The level is stored as a u8: 0=Debug, 1=Info, 2=Warning, 3=Error
#[derive(Debug)]
pub struct LogLevelFilter(AtomicU8);

impl LogLevelFilter {
    /// Create a new filter with the given minimum level.
    pub fn new(level: Severity) -> Self {
        Self(AtomicU8::new(level_to_u8(level)))
    }

    /// Get the current minimum level.
    pub fn get(&self) -> Severity {
        u8_to_level(self.0.load(Ordering::Relaxed))
    }

    /// Set the minimum level.
    pub fn set(&self, level: Severity) {
        self.0.store(level_to_u8(level), Ordering::Relaxed);
    }

    /// Check if a message at the given level should be logged.
    pub fn should_log(&self, level: Severity) -> bool {
        level_to_u8(level) >= self.0.load(Ordering::Relaxed)
    }
}

impl Default for LogLevelFilter {
    fn default() -> Self {
        Self::new(Severity::Debug)
    }
}

fn level_to_u8(level: Severity) -> u8 {
    match level {
        Severity::Debug => 0,
        Severity::Info => 1,
        Severity::Warning => 2,
        Severity::Error => 3,
    }
}

fn u8_to_level(val: u8) -> Severity {
    match val {
        0 => Severity::Debug,
        1 => Severity::Info,
        2 => Severity::Warning,
        3 => Severity::Error,
        _ => Severity::Debug,
    }
}

/// Receives every message that passes the level filter.
pub type Sink = Arc<dyn Fn(Severity, &str) + Send + Sync>;

/// Logger shared by the loader, layers and stacks.
#[derive(Clone)]
pub struct Logger {
    /// Extra destination for messages (optional).
    sink: Option<Sink>,
    /// Minimum level to log.
    level_filter: Arc<LogLevelFilter>,
    /// Logger name/category.
    name: Option<String>,
}

impl Logger {
    /// Create a new logger with default settings.
    pub fn new() -> Self {
        Self {
            sink: None,
            level_filter: Arc::new(LogLevelFilter::default()),
            name: None,
        }
    }

    /// Forward messages to `sink` in addition to tracing.
    pub fn with_sink(mut self, sink: impl Fn(Severity, &str) + Send + Sync + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Set the level filter.
    pub fn with_level_filter(mut self, filter: Arc<LogLevelFilter>) -> Self {
        self.level_filter = filter;
        self
    }

    /// Set the logger name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Log a message to all configured endpoints.
    pub fn log(&self, level: Severity, message: &str) {
        if !self.level_filter.should_log(level) {
            return;
        }

        match level {
            Severity::Error => {
                if let Some(ref name) = self.name {
                    tracing::error!(logger = %name, "{}", message);
                } else {
                    tracing::error!("{}", message);
                }
            }
            Severity::Warning => {
                if let Some(ref name) = self.name {
                    tracing::warn!(logger = %name, "{}", message);
                } else {
                    tracing::warn!("{}", message);
                }
            }
            Severity::Info => {
                if let Some(ref name) = self.name {
                    tracing::info!(logger = %name, "{}", message);
                } else {
                    tracing::info!("{}", message);
                }
            }
            Severity::Debug => {
                if let Some(ref name) = self.name {
                    tracing::debug!(logger = %name, "{}", message);
                } else {
                    tracing::debug!("{}", message);
                }
            }
        }

        if let Some(ref sink) = self.sink {
            sink(level, message);
        }
    }

    pub fn debug(&self, msg: &str) {
        self.log(Severity::Debug, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(Severity::Info, msg);
    }

    pub fn warning(&self, msg: &str) {
        self.log(Severity::Warning, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(Severity::Error, msg);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level_filter.get())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
