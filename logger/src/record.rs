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

//! Log record and metadata.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

// This struct is preferred over a plain &'a str because we need to remember
// whether the source string is 'static, so that the bridge from the `log`
// facade can preserve static module paths and file names.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
enum MaybeStaticStr<'a> {
    Str(&'a str),
    Static(&'static str),
}

impl<'a> MaybeStaticStr<'a> {
    fn get(&self) -> &'a str {
        match *self {
            MaybeStaticStr::Str(s) => s,
            MaybeStaticStr::Static(s) => s,
        }
    }

    fn get_static(&self) -> Option<&'static str> {
        match *self {
            MaybeStaticStr::Str(_) => None,
            MaybeStaticStr::Static(s) => Some(s),
        }
    }
}

/// The payload of a log message.
#[derive(Clone, Debug)]
pub struct Record<'a> {
    // the observed time
    now: SystemTime,

    // the metadata
    metadata: Metadata<'a>,
    module_path: Option<MaybeStaticStr<'a>>,
    file: Option<MaybeStaticStr<'a>>,
    line: Option<u32>,

    // the payload
    args: fmt::Arguments<'a>,
}

impl<'a> Record<'a> {
    /// The observed time.
    pub fn time(&self) -> SystemTime {
        self.now
    }

    /// Metadata about the log directive.
    pub fn metadata(&self) -> &Metadata<'a> {
        &self.metadata
    }

    /// The verbosity level of the message.
    pub fn level(&self) -> Level {
        self.metadata.level()
    }

    /// The name of the target of the directive.
    pub fn target(&self) -> &'a str {
        self.metadata.target()
    }

    /// The module path of the message.
    pub fn module_path(&self) -> Option<&'a str> {
        self.module_path.map(|s| s.get())
    }

    /// The module path of the message, if it is a `'static` str.
    pub fn module_path_static(&self) -> Option<&'static str> {
        self.module_path.and_then(|s| s.get_static())
    }

    /// The source file containing the message.
    pub fn file(&self) -> Option<&'a str> {
        self.file.map(|s| s.get())
    }

    /// The source file containing the message, if it is a `'static` str.
    pub fn file_static(&self) -> Option<&'static str> {
        self.file.and_then(|s| s.get_static())
    }

    /// The filename of the source file.
    // obtain filename only from record's full file path
    // reason: the module is already logged + full file path is noisy for some layouts
    pub fn filename(&self) -> Cow<'a, str> {
        self.file()
            .map(std::path::Path::new)
            .and_then(std::path::Path::file_name)
            .map(std::ffi::OsStr::to_string_lossy)
            .unwrap_or_default()
    }

    /// The line containing the message.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The message body.
    pub fn args(&self) -> &fmt::Arguments<'a> {
        &self.args
    }

    /// Returns a new builder.
    pub fn builder() -> RecordBuilder<'a> {
        RecordBuilder::default()
    }
}

impl<'a> From<&log::Record<'a>> for Record<'a> {
    fn from(record: &log::Record<'a>) -> Self {
        // basic fields
        let mut builder = RecordBuilder::default()
            .args(*record.args())
            .level(record.level().into())
            .target(record.target())
            .line(record.line());

        // optional static fields
        builder = if let Some(module_path) = record.module_path_static() {
            builder.module_path_static(module_path)
        } else {
            builder.module_path(record.module_path())
        };
        builder = if let Some(file) = record.file_static() {
            builder.file_static(file)
        } else {
            builder.file(record.file())
        };

        builder.build()
    }
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder<'a> {
    record: Record<'a>,
}

impl Default for RecordBuilder<'_> {
    fn default() -> Self {
        RecordBuilder {
            record: Record {
                now: SystemTime::now(),
                metadata: MetadataBuilder::default().build(),
                module_path: None,
                file: None,
                line: None,
                args: format_args!(""),
            },
        }
    }
}

impl<'a> RecordBuilder<'a> {
    /// Set [`time`](Record::time).
    pub fn time(mut self, now: SystemTime) -> Self {
        self.record.now = now;
        self
    }

    /// Set [`args`](Record::args).
    pub fn args(mut self, args: fmt::Arguments<'a>) -> Self {
        self.record.args = args;
        self
    }

    /// Set [`metadata`](Record::metadata).
    ///
    /// Construct a `Metadata` object with [`MetadataBuilder`].
    pub fn metadata(mut self, metadata: Metadata<'a>) -> Self {
        self.record.metadata = metadata;
        self
    }

    /// Set [`Metadata::level`].
    pub fn level(mut self, level: Level) -> Self {
        self.record.metadata.level = level;
        self
    }

    /// Set [`Metadata::target`].
    pub fn target(mut self, target: &'a str) -> Self {
        self.record.metadata.target = target;
        self
    }

    /// Set [`module_path`](Record::module_path).
    pub fn module_path(mut self, path: Option<&'a str>) -> Self {
        self.record.module_path = path.map(MaybeStaticStr::Str);
        self
    }

    /// Set [`module_path`](Record::module_path) to a `'static` string.
    pub fn module_path_static(mut self, path: &'static str) -> Self {
        self.record.module_path = Some(MaybeStaticStr::Static(path));
        self
    }

    /// Set [`file`](Record::file).
    pub fn file(mut self, file: Option<&'a str>) -> Self {
        self.record.file = file.map(MaybeStaticStr::Str);
        self
    }

    /// Set [`file`](Record::file) to a `'static` string.
    pub fn file_static(mut self, file: &'static str) -> Self {
        self.record.file = Some(MaybeStaticStr::Static(file));
        self
    }

    /// Set [`line`](Record::line).
    pub fn line(mut self, line: Option<u32>) -> Self {
        self.record.line = line;
        self
    }

    /// Invoke the builder and return a `Record`
    pub fn build(self) -> Record<'a> {
        self.record
    }
}

/// Metadata about a log message.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Metadata<'a> {
    level: Level,
    target: &'a str,
}

impl<'a> Metadata<'a> {
    /// Get the level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Get the target.
    pub fn target(&self) -> &'a str {
        self.target
    }

    /// Returns a new builder.
    pub fn builder() -> MetadataBuilder<'a> {
        MetadataBuilder::default()
    }
}

/// Builder for [`Metadata`].
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct MetadataBuilder<'a> {
    metadata: Metadata<'a>,
}

impl Default for MetadataBuilder<'_> {
    fn default() -> Self {
        MetadataBuilder {
            metadata: Metadata {
                level: Level::Info,
                target: Default::default(),
            },
        }
    }
}

impl<'a> MetadataBuilder<'a> {
    /// Setter for [`level`](Metadata::level).
    pub fn level(mut self, arg: Level) -> Self {
        self.metadata.level = arg;
        self
    }

    /// Setter for [`target`](Metadata::target).
    pub fn target(mut self, target: &'a str) -> Self {
        self.metadata.target = target;
        self
    }

    /// Invoke the builder and return a `Metadata`
    pub fn build(self) -> Metadata<'a> {
        self.metadata
    }
}

/// An enum representing the available verbosity levels of the logger.
///
/// Levels are ordered by severity: a level compares less than another if it is
/// more severe, so `Level::Critical < Level::Trace`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Designates unrecoverable errors.
    Critical,
    /// Designates very serious errors.
    Error,
    /// Designates hazardous situations.
    Warn,
    /// Designates useful information.
    Info,
    /// Designates lower priority information.
    Debug,
    /// Designates very low priority, often extremely verbose, information.
    Trace,
}

impl Level {
    /// Return the string representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Critical => "CRITICAL",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Level::Critical => "critical",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Trace => "trace",
        }
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

impl From<Level> for log::Level {
    fn from(level: Level) -> Self {
        match level {
            // the log facade has no sixth level; critical rides on error
            Level::Critical => Self::Error,
            Level::Error => Self::Error,
            Level::Warn => Self::Warn,
            Level::Info => Self::Info,
            Level::Debug => Self::Debug,
            Level::Trace => Self::Trace,
        }
    }
}

/// The error returned when a string does not name a [`Level`].
#[derive(Debug, thiserror::Error)]
#[error("malformed level: {0:?}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for (name, level) in [
            ("critical", Level::Critical),
            ("crit", Level::Critical),
            ("error", Level::Error),
            ("warn", Level::Warn),
            ("warning", Level::Warn),
            ("info", Level::Info),
            ("debug", Level::Debug),
            ("trace", Level::Trace),
        ] {
            if s.eq_ignore_ascii_case(name) {
                return Ok(level);
            }
        }

        Err(ParseLevelError(s.to_string()))
    }
}

impl serde::Serialize for Level {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct LevelVisitor;

        impl serde::de::Visitor<'_> for LevelVisitor {
            type Value = Level;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a level name")
            }

            fn visit_str<E>(self, value: &str) -> Result<Level, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(LevelVisitor)
    }
}

/// An enum representing the available verbosity level filters of the logger.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum LevelFilter {
    /// Disables all levels.
    Off,
    /// Enables if the target level is equal to the filter level.
    Equal(Level),
    /// Enables if the target level is not equal to the filter level.
    NotEqual(Level),
    /// Enables if the target level is more severe than the filter level.
    MoreSevere(Level),
    /// Enables if the target level is more severe than or equal to the filter
    /// level.
    MoreSevereEqual(Level),
    /// Enables if the target level is more verbose than the filter level.
    MoreVerbose(Level),
    /// Enables if the target level is more verbose than or equal to the filter
    /// level.
    MoreVerboseEqual(Level),
    /// Enables all levels.
    All,
}

impl LevelFilter {
    /// Checks the given level if satisfies the filter condition.
    ///
    /// # Examples
    ///
    /// ```
    /// use logger::Level;
    /// use logger::LevelFilter;
    ///
    /// let level_filter = LevelFilter::MoreSevere(Level::Info);
    ///
    /// assert_eq!(level_filter.test(Level::Trace), false);
    /// assert_eq!(level_filter.test(Level::Info), false);
    /// assert_eq!(level_filter.test(Level::Warn), true);
    /// assert_eq!(level_filter.test(Level::Error), true);
    /// ```
    pub fn test(&self, level: Level) -> bool {
        match self {
            LevelFilter::Off => false,
            LevelFilter::Equal(l) => level == *l,
            LevelFilter::NotEqual(l) => level != *l,
            LevelFilter::MoreSevere(l) => level < *l,
            LevelFilter::MoreSevereEqual(l) => level <= *l,
            LevelFilter::MoreVerbose(l) => level > *l,
            LevelFilter::MoreVerboseEqual(l) => level >= *l,
            LevelFilter::All => true,
        }
    }
}

impl From<log::LevelFilter> for LevelFilter {
    fn from(filter: log::LevelFilter) -> Self {
        match filter {
            log::LevelFilter::Off => LevelFilter::Off,
            log::LevelFilter::Error => LevelFilter::MoreSevereEqual(Level::Error),
            log::LevelFilter::Warn => LevelFilter::MoreSevereEqual(Level::Warn),
            log::LevelFilter::Info => LevelFilter::MoreSevereEqual(Level::Info),
            log::LevelFilter::Debug => LevelFilter::MoreSevereEqual(Level::Debug),
            log::LevelFilter::Trace => LevelFilter::MoreSevereEqual(Level::Trace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_severity_ordering() {
        assert!(Level::Critical < Level::Error);
        assert!(Level::Error < Level::Warn);
        assert!(Level::Warn < Level::Info);
        assert!(Level::Info < Level::Debug);
        assert!(Level::Debug < Level::Trace);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("critical".parse::<Level>().unwrap(), Level::Critical);
        assert_eq!("crit".parse::<Level>().unwrap(), Level::Critical);
        assert_eq!("CRITICAL".parse::<Level>().unwrap(), Level::Critical);
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("Warn".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("trace".parse::<Level>().unwrap(), Level::Trace);
        assert!("verbose".parse::<Level>().is_err());
        assert!("".parse::<Level>().is_err());
    }

    #[test]
    fn test_level_filter_test() {
        assert!(!LevelFilter::Off.test(Level::Critical));
        assert!(LevelFilter::All.test(Level::Trace));
        assert!(LevelFilter::Equal(Level::Info).test(Level::Info));
        assert!(!LevelFilter::Equal(Level::Info).test(Level::Warn));
        assert!(LevelFilter::NotEqual(Level::Info).test(Level::Warn));
        assert!(LevelFilter::MoreSevereEqual(Level::Info).test(Level::Info));
        assert!(LevelFilter::MoreSevereEqual(Level::Info).test(Level::Critical));
        assert!(!LevelFilter::MoreSevereEqual(Level::Info).test(Level::Debug));
        assert!(LevelFilter::MoreVerbose(Level::Warn).test(Level::Info));
        assert!(!LevelFilter::MoreVerbose(Level::Warn).test(Level::Warn));
    }

    #[test]
    fn test_level_display_padding() {
        assert_eq!(format!("{:>8}", Level::Info), "    INFO");
        assert_eq!(format!("{:^8}", Level::Warn), "  WARN  ");
        assert_eq!(format!("{}", Level::Critical), "CRITICAL");
    }

    #[test]
    fn test_level_serde() {
        let level: Level = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(level, Level::Warn);
        assert_eq!(serde_json::to_string(&Level::Critical).unwrap(), "\"critical\"");
        assert!(serde_json::from_str::<Level>("\"chatty\"").is_err());
    }

    #[test]
    fn test_record_builder() {
        let record = Record::builder()
            .level(Level::Debug)
            .target("app/net")
            .file_static("src/net/io.rs")
            .line(Some(42))
            .args(format_args!("listening"))
            .build();

        assert_eq!(record.level(), Level::Debug);
        assert_eq!(record.target(), "app/net");
        assert_eq!(record.file(), Some("src/net/io.rs"));
        assert_eq!(record.file_static(), Some("src/net/io.rs"));
        assert_eq!(record.filename(), "io.rs");
        assert_eq!(record.line(), Some(42));
        assert_eq!(record.args().to_string(), "listening");
    }

    #[test]
    fn test_facade_level_mapping() {
        assert_eq!(log::Level::from(Level::Critical), log::Level::Error);
        assert_eq!(log::Level::from(Level::Trace), log::Level::Trace);
        assert_eq!(Level::from(log::Level::Error), Level::Error);
        assert_eq!(Level::from(log::Level::Info), Level::Info);
    }
}
