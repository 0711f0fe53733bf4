//! Logging setup
//!
//! The library only emits `tracing` events; binaries and tests that want
//! to see them install a subscriber through these helpers.
//!
//! A [`LiveLogBuffer`] keeps the most recent formatted lines in memory so a
//! front end can show them without tailing a file. Attach it with
//! [`init_logging_with_buffer`] or add [`LiveLogBuffer::layer`] to a
//! subscriber of your own.

use std::collections::VecDeque;
use std::fmt::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Lines kept by [`LiveLogBuffer::default`]
pub const DEFAULT_BUFFER_LINES: usize = 400;

/// Install a formatted subscriber filtered by `RUST_LOG` (default `info`)
pub fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter, None)?;
    tracing::info!("Logging initialized");
    Ok(())
}

/// Install a formatted subscriber with an explicit filter directive
pub fn init_logging_with_level(level: &str) -> anyhow::Result<()> {
    install(parse_filter(level)?, None)?;
    tracing::info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Install a formatted subscriber that also mirrors every line into `buffer`
pub fn init_logging_with_buffer(level: &str, buffer: &LiveLogBuffer) -> anyhow::Result<()> {
    install(parse_filter(level)?, Some(buffer.layer()))?;
    tracing::info!("Logging initialized with level: {} (live buffer)", level);
    Ok(())
}

fn parse_filter(level: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(level).map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", level, e))
}

fn install(filter: EnvFilter, live: Option<LiveLogLayer>) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(live)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

/// Bounded, shareable buffer of the latest log lines.
///
/// Clones share the same storage. Once `max_lines` is reached the oldest
/// line is dropped for every new one.
#[derive(Debug, Clone)]
pub struct LiveLogBuffer {
    max_lines: usize,
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl Default for LiveLogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_LINES)
    }
}

impl LiveLogBuffer {
    /// Create an empty buffer holding at most `max_lines` lines
    pub fn new(max_lines: usize) -> Self {
        Self {
            max_lines,
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(max_lines))),
        }
    }

    /// Capacity in lines
    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Add one line, evicting the oldest when full
    pub fn append(&self, line: impl Into<String>) {
        let mut lines = self.lock();
        lines.push_back(line.into());
        while lines.len() > self.max_lines {
            lines.pop_front();
        }
    }

    /// Add several lines in order
    pub fn extend<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.append(line);
        }
    }

    /// Drop every line
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Copy of the buffered lines, oldest first
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    /// Buffered lines joined with newlines
    pub fn joined(&self) -> String {
        self.snapshot().join("\n")
    }

    /// Number of buffered lines
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the buffer holds no lines
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// A `tracing` layer that appends every event to this buffer
    pub fn layer(&self) -> LiveLogLayer {
        LiveLogLayer {
            buffer: self.clone(),
        }
    }

    // A panic while holding the lock cannot leave the deque inconsistent
    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Layer that formats events as `LEVEL target: message key=value ...`
/// and appends them to a [`LiveLogBuffer`]
#[derive(Debug, Clone)]
pub struct LiveLogLayer {
    buffer: LiveLogBuffer,
}

impl<S: Subscriber> Layer<S> for LiveLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let mut line = format!("{} {}: {}", meta.level(), meta.target(), visitor.message);
        line.push_str(&visitor.fields);
        self.buffer.append(line);
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            write!(self.fields, " {}={}", field.name(), value).ok();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            write!(self.message, "{:?}", value).ok();
        } else {
            write!(self.fields, " {}={:?}", field.name(), value).ok();
        }
    }
}
