//! # Logging Module
//!
//! Two separate concerns live here:
//!
//! - **Generation log** ([`Logger`] over a [`LogSink`]) - the append-only,
//!   date-partitioned record of what a generation run did. One line per event:
//!
//!   ```text
//!   2026-10-16T09:14:03.512Z | pid:4411 | WARN | template missing, skipping page | {"model":"User"}
//!   ```
//!
//!   [`FileLogSink`] keeps one file per (level, calendar day) under a log
//!   directory, e.g. `logs/warn-2026-10-16.log`. [`MemoryLogSink`] collects the
//!   same lines in memory for tests.
//!
//! - **Diagnostics** ([`init_logging`]) - the process-wide `tracing` subscriber
//!   that prints to stderr. Every generation-log line is mirrored as a
//!   `tracing` event, so `RUST_LOG=debug` shows the full run on the console.
//!
//! The logger is an explicit value constructed once by the caller and passed to
//! the generator. A sink failure is reported through `tracing` and never stops
//! generation.

mod init;
mod sink;

pub use init::{init_logging, LogConfig, LogFormat};
pub use sink::{FileLogSink, LogLevel, LogSink, Logger, MemoryLogSink};
