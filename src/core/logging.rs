use log::kv::{self, Key, Source, Value, VisitSource};
use log::{Level, Record};
use parking_lot::Mutex;

pub const LOG_TARGET: &str = "rust_modhost";

/// Leveled logger with structured key-value context.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, message: &str, fields: &[(&str, String)]);

    fn info(&self, message: &str, fields: &[(&str, String)]) {
        self.log(Level::Info, message, fields)
    }

    fn warn(&self, message: &str, fields: &[(&str, String)]) {
        self.log(Level::Warn, message, fields)
    }

    fn error(&self, message: &str, fields: &[(&str, String)]) {
        self.log(Level::Error, message, fields)
    }
}

/// Forwards to whatever `log` implementation the host installed.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogFacade;

struct Fields<'a>(&'a [(&'a str, String)]);

impl Source for Fields<'_> {
    fn visit<'kvs>(&'kvs self, visitor: &mut dyn VisitSource<'kvs>) -> Result<(), kv::Error> {
        for (key, value) in self.0 {
            visitor.visit_pair(Key::from_str(key), Value::from(value.as_str()))?;
        }
        Ok(())
    }

    fn count(&self) -> usize {
        self.0.len()
    }
}

impl Logger for LogFacade {
    fn log(&self, level: Level, message: &str, fields: &[(&str, String)]) {
        if level > log::max_level() {
            return;
        }
        let fields = Fields(fields);
        log::logger().log(
            &Record::builder()
                .args(format_args!("{message}"))
                .level(level)
                .target(LOG_TARGET)
                .key_values(&fields)
                .build(),
        );
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Keeps every entry in memory. Used by hosts' tests to assert on startup output.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn entries_at(&self, level: Level) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: Level, message: &str, fields: &[(&str, String)]) {
        self.entries.lock().push(LogEntry {
            level,
            message: message.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });
    }
}
