//! Debug logging: a bounded in-memory ring fed by `tracing`.
//!
//! The engine only emits `tracing` events. Hosts that want to inspect them install
//! [`DebugLogLayer`] (usually via [`init`]) and read records back from the shared
//! [`DebugLog`] handle, e.g. to show them in a debug pane after the terminal is restored.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use crate::config::EnvConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.level, self.target, self.message)
    }
}

/// Fixed-capacity circular buffer of log records; drops the oldest on overflow.
///
/// Cloning shares the same buffer.
#[derive(Debug, Clone)]
pub struct DebugLog {
    inner: Arc<Mutex<Ring>>,
}

#[derive(Debug)]
struct Ring {
    capacity: usize,
    records: VecDeque<LogRecord>,
}

impl DebugLog {
    /// Capacity 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Ring {
                capacity,
                records: VecDeque::with_capacity(capacity),
            })),
        }
    }

    pub fn push(&self, record: LogRecord) {
        let mut ring = self.lock();
        if ring.records.len() == ring.capacity {
            ring.records.pop_front();
        }
        ring.records.push_back(record);
    }

    /// Oldest first.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().records.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    pub fn clear(&self) {
        self.lock().records.clear();
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    fn lock(&self) -> MutexGuard<'_, Ring> {
        // A panic while holding the lock leaves the ring structurally valid.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// `tracing_subscriber` layer that formats events into a [`DebugLog`].
#[derive(Debug, Clone)]
pub struct DebugLogLayer {
    log: DebugLog,
}

impl DebugLogLayer {
    pub fn new(log: DebugLog) -> Self {
        Self { log }
    }
}

struct MessageVisitor {
    message: String,
    fields: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }
}

impl<S> Layer<S> for DebugLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor {
            message: String::new(),
            fields: String::new(),
        };
        event.record(&mut visitor);
        visitor.message.push_str(&visitor.fields);

        let metadata = event.metadata();
        self.log.push(LogRecord {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.message,
        });
    }
}

/// Level captured for a given configuration.
pub fn level_filter(config: &EnvConfig) -> LevelFilter {
    if config.debug {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN
    }
}

/// Install a global subscriber feeding a new [`DebugLog`] and return the handle.
///
/// If a global subscriber is already installed the returned log stays empty.
pub fn init(config: &EnvConfig) -> DebugLog {
    let log = DebugLog::new(config.debug_log_capacity);
    let subscriber = tracing_subscriber::registry()
        .with(level_filter(config))
        .with(DebugLogLayer::new(log.clone()));
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!(target: "chatline::logging", "global subscriber already installed");
    }
    log
}
