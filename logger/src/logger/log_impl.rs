// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::append::Append;
use crate::filter::Filter;
use crate::filter::FilterResult;
use crate::record::Level;
use crate::record::Metadata;
use crate::record::MetadataBuilder;
use crate::record::Record;

/// A logger that dispatches log records to one or more dispatches.
///
/// This struct implements [`log::Log`] to serve as the global logger for the
/// [`log`] crate. It can also be used directly through its level methods,
/// which stamp records with the logger's tag.
///
/// Cloning a `Logger` is cheap; clones share the same dispatches.
#[derive(Clone, Debug)]
pub struct Logger {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    tag: Option<String>,
    dispatches: Vec<Dispatch>,
}

impl Logger {
    pub(super) fn new(tag: Option<String>, dispatches: Vec<Dispatch>) -> Self {
        Self {
            inner: Arc::new(Inner { tag, dispatches }),
        }
    }

    /// The tag stamped on records logged through the level methods.
    pub fn tag(&self) -> Option<&str> {
        self.inner.tag.as_deref()
    }

    /// Whether a record with the given metadata would be processed.
    pub fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner
            .dispatches
            .iter()
            .any(|dispatch| dispatch.enabled(metadata))
    }

    /// Dispatches a log record.
    pub fn log(&self, record: &Record) {
        for dispatch in &self.inner.dispatches {
            if let Err(err) = dispatch.log(record) {
                handle_log_error(record, err);
            }
        }
    }

    /// Flushes all dispatches.
    pub fn flush(&self) {
        for dispatch in &self.inner.dispatches {
            dispatch.flush();
        }
    }

    /// Logs a message at the critical level.
    pub fn critical(&self, message: impl fmt::Display) {
        self.emit(Level::Critical, &message);
    }

    /// Logs a message at the error level.
    pub fn error(&self, message: impl fmt::Display) {
        self.emit(Level::Error, &message);
    }

    /// Logs a message at the warn level.
    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(Level::Warn, &message);
    }

    /// Logs a message at the info level.
    pub fn info(&self, message: impl fmt::Display) {
        self.emit(Level::Info, &message);
    }

    /// Logs a message at the debug level.
    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(Level::Debug, &message);
    }

    /// Logs a message at the trace level.
    pub fn trace(&self, message: impl fmt::Display) {
        self.emit(Level::Trace, &message);
    }

    fn emit(&self, level: Level, message: &dyn fmt::Display) {
        self.log(
            &Record::builder()
                .level(level)
                .target(self.inner.tag.as_deref().unwrap_or_default())
                .args(format_args!("{message}"))
                .build(),
        );
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        let metadata = MetadataBuilder::default()
            .target(metadata.target())
            .level(metadata.level().into())
            .build();

        Logger::enabled(self, &metadata)
    }

    fn log(&self, record: &log::Record) {
        Logger::log(self, &Record::from(record));
    }

    fn flush(&self) {
        Logger::flush(self);
    }
}

/// A grouped set of appenders and filters.
///
/// The [`Logger`] dispatches log records to one or more `Dispatch` instances.
///
/// `filters` are used to determine whether a log record should be passed to the appenders.
/// `appends` are used to write log records to a destination.
#[derive(Debug)]
pub(super) struct Dispatch {
    filters: Vec<Box<dyn Filter>>,
    appends: Vec<Box<dyn Append>>,
}

impl Dispatch {
    pub(super) fn new(filters: Vec<Box<dyn Filter>>, appends: Vec<Box<dyn Append>>) -> Self {
        debug_assert!(
            !appends.is_empty(),
            "a Dispatch must have at least one append"
        );

        Self { filters, appends }
    }

    fn enabled(&self, metadata: &Metadata) -> bool {
        for filter in &self.filters {
            match filter.enabled(metadata) {
                FilterResult::Reject => return false,
                FilterResult::Accept => return true,
                FilterResult::Neutral => {}
            }
        }

        true
    }

    fn log(&self, record: &Record) -> anyhow::Result<()> {
        for filter in &self.filters {
            match filter.enabled(record.metadata()) {
                FilterResult::Reject => return Ok(()),
                FilterResult::Accept => break,
                FilterResult::Neutral => {}
            }
        }

        for append in &self.appends {
            append.append(record)?;
        }
        Ok(())
    }

    fn flush(&self) {
        for append in &self.appends {
            append.flush();
        }
    }
}

fn handle_log_error(record: &Record, error: anyhow::Error) {
    let Err(fallback_error) = write!(
        std::io::stderr(),
        r###"
Error perform logging.
    Attempted to log: {args}
    Record: {record:?}
    Error: {error:?}
"###,
        args = record.args(),
        record = record,
        error = error,
    ) else {
        return;
    };

    panic!(
        r###"
Error performing stderr logging after error occurred during regular logging.
    Attempted to log: {args}
    Record: {record:?}
    Error: {error:?}
    Fallback error: {fallback_error}
"###,
        args = record.args(),
        record = record,
        error = error,
        fallback_error = fallback_error,
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::record::LevelFilter;

    #[derive(Debug, Default)]
    struct Counter {
        lines: Mutex<Vec<String>>,
    }

    impl Append for Counter {
        fn append(&self, record: &Record) -> anyhow::Result<()> {
            // render before locking so a logging append cannot deadlock
            let line = format!("{} {}", record.level(), record.args());
            self.lines.lock().unwrap().push(line);
            Ok(())
        }
    }

    #[test]
    fn test_dispatch_filters_gate_appends() {
        let counter = Arc::new(Counter::default());
        let dispatch = Dispatch::new(
            vec![LevelFilter::MoreSevereEqual(Level::Info).into()],
            vec![counter.clone().into()],
        );

        let accepted = Record::builder()
            .level(Level::Warn)
            .args(format_args!("kept"))
            .build();
        let rejected = Record::builder()
            .level(Level::Debug)
            .args(format_args!("dropped"))
            .build();

        dispatch.log(&accepted).unwrap();
        dispatch.log(&rejected).unwrap();

        let lines = counter.lines.lock().unwrap();
        assert_eq!(lines.as_slice(), ["WARN kept"]);
    }

    #[test]
    fn test_logger_level_methods_stamp_the_tag() {
        let counter = Arc::new(Counter::default());

        #[derive(Debug)]
        struct TagCapture(Arc<Mutex<Vec<String>>>);

        impl Append for TagCapture {
            fn append(&self, record: &Record) -> anyhow::Result<()> {
                let line = format!("{}: {}", record.target(), record.args());
                self.0.lock().unwrap().push(line);
                Ok(())
            }
        }

        let tags = Arc::new(Mutex::new(Vec::new()));
        let logger = Logger::new(
            Some("app/net".to_string()),
            vec![
                Dispatch::new(vec![], vec![counter.clone().into()]),
                Dispatch::new(vec![], vec![TagCapture(tags.clone()).into()]),
            ],
        );

        logger.info("connected");
        logger.critical("boom");

        let lines = counter.lines.lock().unwrap();
        assert_eq!(lines.as_slice(), ["INFO connected", "CRITICAL boom"]);
        let tags = tags.lock().unwrap();
        assert_eq!(tags.as_slice(), ["app/net: connected", "app/net: boom"]);
    }

    #[test]
    fn test_enabled_consults_every_dispatch() {
        let counter = Arc::new(Counter::default());
        let logger = Logger::new(
            None,
            vec![
                Dispatch::new(
                    vec![LevelFilter::MoreSevereEqual(Level::Error).into()],
                    vec![counter.clone().into()],
                ),
                Dispatch::new(
                    vec![LevelFilter::MoreSevereEqual(Level::Debug).into()],
                    vec![counter.clone().into()],
                ),
            ],
        );

        let debug = Metadata::builder().level(Level::Debug).target("").build();
        let trace = Metadata::builder().level(Level::Trace).target("").build();
        assert!(logger.enabled(&debug));
        assert!(!logger.enabled(&trace));
    }
}
