use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Severity of a generation-log line. Each level gets its own file per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Lowercase name used as the log file prefix (`warn-2026-10-16.log`).
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Uppercase tag written into each line.
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for formatted generation-log lines.
///
/// `line` never contains a newline; implementations terminate it themselves
/// and must write it in one piece so concurrent writers never interleave
/// within a line.
pub trait LogSink: Send + Sync {
    /// Append one line for `level` on calendar day `day`.
    fn append(&self, level: LogLevel, day: NaiveDate, line: &str) -> io::Result<()>;

    /// Flush buffered output. Called on shutdown.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

struct DayStream {
    day: NaiveDate,
    writer: LineWriter<File>,
}

/// Append-only sink writing `<dir>/<level>-YYYY-MM-DD.log`.
///
/// Files are opened on first use. When a line arrives for a newer day the
/// previous stream for that level is flushed and replaced. All open streams
/// are flushed when the sink is dropped.
pub struct FileLogSink {
    dir: PathBuf,
    streams: Mutex<HashMap<LogLevel, DayStream>>,
}

impl FileLogSink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            streams: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `level` lines for `day`.
    pub fn file_for(&self, level: LogLevel, day: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}-{}.log", level.as_str(), day.format("%Y-%m-%d")))
    }

    fn open(&self, level: LogLevel, day: NaiveDate) -> io::Result<DayStream> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("failed to create log directory {}: {e}", self.dir.display()),
            )
        })?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_for(level, day))?;
        Ok(DayStream {
            day,
            writer: LineWriter::new(file),
        })
    }
}

impl LogSink for FileLogSink {
    fn append(&self, level: LogLevel, day: NaiveDate, line: &str) -> io::Result<()> {
        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        let stale = streams.get(&level).is_some_and(|s| s.day != day);
        if stale {
            if let Some(mut old) = streams.remove(&level) {
                old.writer.flush()?;
            }
        }
        if !streams.contains_key(&level) {
            let stream = self.open(level, day)?;
            streams.insert(level, stream);
        }
        match streams.get_mut(&level) {
            Some(stream) => {
                let mut buf = String::with_capacity(line.len() + 1);
                buf.push_str(line);
                buf.push('\n');
                stream.writer.write_all(buf.as_bytes())
            }
            None => Err(io::Error::other("log stream unavailable")),
        }
    }

    fn flush(&self) -> io::Result<()> {
        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        for stream in streams.values_mut() {
            stream.writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for FileLogSink {
    fn drop(&mut self) {
        if let Err(e) = LogSink::flush(self) {
            eprintln!("failed to flush generation log: {e}");
        }
    }
}

/// One captured line in a [`MemoryLogSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLine {
    pub level: LogLevel,
    pub day: NaiveDate,
    pub line: String,
}

/// Sink that keeps every line in memory. Used by tests.
#[derive(Default)]
pub struct MemoryLogSink {
    lines: Mutex<Vec<MemoryLine>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<MemoryLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Lines recorded at `level`, in append order.
    pub fn lines_at(&self, level: LogLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.level == level)
            .map(|l| l.line)
            .collect()
    }

    /// True if any line at `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.lines_at(level).iter().any(|l| l.contains(needle))
    }
}

impl LogSink for MemoryLogSink {
    fn append(&self, level: LogLevel, day: NaiveDate, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MemoryLine {
                level,
                day,
                line: line.to_string(),
            });
        Ok(())
    }
}

/// Handle used by the generator to record what it did.
///
/// Cheap to clone; all clones share the same sink.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
    pid: u32,
}

impl Logger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            pid: std::process::id(),
        }
    }

    /// Logger writing date-partitioned files under `dir`.
    pub fn to_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self::new(Arc::new(FileLogSink::new(dir)))
    }

    /// Logger backed by a fresh in-memory sink, returned alongside it.
    pub fn in_memory() -> (Self, Arc<MemoryLogSink>) {
        let sink = Arc::new(MemoryLogSink::new());
        let logger = Self::new(Arc::clone(&sink) as Arc<dyn LogSink>);
        (logger, sink)
    }

    pub fn info(&self, message: impl AsRef<str>, meta: Option<Value>) {
        self.log(LogLevel::Info, message.as_ref(), meta.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>, meta: Option<Value>) {
        self.log(LogLevel::Warn, message.as_ref(), meta.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>, meta: Option<Value>) {
        self.log(LogLevel::Error, message.as_ref(), meta.as_ref());
    }

    /// Format, mirror to `tracing` and append. Sink failures are reported on
    /// the diagnostics channel and otherwise ignored.
    pub fn log(&self, level: LogLevel, message: &str, meta: Option<&Value>) {
        let now = Utc::now();
        let day = now.with_timezone(&Local).date_naive();
        let line = format_line(now, self.pid, level, message, meta);

        match level {
            LogLevel::Info => tracing::info!(target: "adminpanel::generation", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "adminpanel::generation", "{message}"),
            LogLevel::Error => tracing::error!(target: "adminpanel::generation", "{message}"),
        }

        if let Err(e) = self.sink.append(level, day, &line) {
            tracing::warn!(error = %e, level = %level, "generation log write failed");
        }
    }

    pub fn flush(&self) {
        if let Err(e) = self.sink.flush() {
            tracing::warn!(error = %e, "generation log flush failed");
        }
    }
}

/// `<ISO-8601> | pid:<n> | <LEVEL> | <message>[ | <json>]`
///
/// Newlines in the message are escaped so every event stays on one physical line.
pub(crate) fn format_line(
    timestamp: DateTime<Utc>,
    pid: u32,
    level: LogLevel,
    message: &str,
    meta: Option<&Value>,
) -> String {
    let mut line = format!(
        "{} | pid:{} | {} | {}",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        pid,
        level.label(),
        message.replace('\r', "\\r").replace('\n', "\\n"),
    );
    match meta {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) => {
            line.push_str(" | ");
            line.push_str(&s.replace('\n', "\\n"));
        }
        Some(other) => {
            line.push_str(" | ");
            line.push_str(&other.to_string());
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_line_without_meta() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 16, 9, 14, 3).unwrap();
        let line = format_line(ts, 42, LogLevel::Info, "copied app/layout.js", None);
        assert_eq!(
            line,
            "2026-10-16T09:14:03.000Z | pid:42 | INFO | copied app/layout.js"
        );
    }

    #[test]
    fn test_format_line_with_json_meta() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let meta = json!({"model": "User"});
        let line = format_line(ts, 7, LogLevel::Warn, "skipped", Some(&meta));
        assert!(line.ends_with(r#"| WARN | skipped | {"model":"User"}"#));
    }

    #[test]
    fn test_format_line_escapes_newlines() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let line = format_line(ts, 7, LogLevel::Error, "bad\ntemplate", None);
        assert!(!line.contains('\n'));
        assert!(line.contains("bad\\ntemplate"));
    }

    #[test]
    fn test_file_sink_partitions_by_level_and_day() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileLogSink::new(dir.path().join("logs"));
        sink.append(LogLevel::Info, day(2026, 10, 16), "a").unwrap();
        sink.append(LogLevel::Warn, day(2026, 10, 16), "b").unwrap();
        sink.append(LogLevel::Info, day(2026, 10, 16), "c").unwrap();
        sink.append(LogLevel::Info, day(2026, 10, 17), "d").unwrap();
        LogSink::flush(&sink).unwrap();

        let logs = dir.path().join("logs");
        assert_eq!(
            fs::read_to_string(logs.join("info-2026-10-16.log")).unwrap(),
            "a\nc\n"
        );
        assert_eq!(
            fs::read_to_string(logs.join("warn-2026-10-16.log")).unwrap(),
            "b\n"
        );
        assert_eq!(
            fs::read_to_string(logs.join("info-2026-10-17.log")).unwrap(),
            "d\n"
        );
    }

    #[test]
    fn test_file_sink_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let sink = FileLogSink::new(dir.path());
            sink.append(LogLevel::Error, day(2026, 3, 1), "first").unwrap();
        }
        {
            let sink = FileLogSink::new(dir.path());
            sink.append(LogLevel::Error, day(2026, 3, 1), "second").unwrap();
        }
        let body = fs::read_to_string(dir.path().join("error-2026-03-01.log")).unwrap();
        assert_eq!(body, "first\nsecond\n");
    }

    #[test]
    fn test_logger_writes_through_memory_sink() {
        let (logger, sink) = Logger::in_memory();
        logger.info("started", None);
        logger.warn("template missing", Some(json!({"model": "Post"})));
        logger.error("copy failed", Some(json!("disk full")));

        assert_eq!(sink.lines().len(), 3);
        assert!(sink.contains(LogLevel::Warn, r#"{"model":"Post"}"#));
        assert!(sink.contains(LogLevel::Error, "| copy failed | disk full"));
        let pid = format!("pid:{}", std::process::id());
        assert!(sink.lines_at(LogLevel::Info)[0].contains(&pid));
    }
}
