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

//! Pattern-based formatting with per-level pattern tables.
//!
//! A pattern is a format string where `%`-directives expand to record fields
//! or timestamp components:
//!
//! ```text
//! %v  message                %Y  year (4 digits)
//! %n  logger name (target)   %m  month (01-12)
//! %l  level name             %d  day of month (01-31)
//! %L  level short name       %H  hour (00-23)
//! %t  thread id              %M  minute (00-59)
//! %P  process id             %S  second (00-59)
//! %s  source file basename   %e  milliseconds (3 digits)
//! %g  source file path       %f  microseconds (6 digits)
//! %#  source line            %F  nanoseconds (9 digits)
//! %%  literal percent sign
//! ```
//!
//! Additional time directives (`%y`, `%p`, `%z`, `%a`, `%A`, `%b`, `%B`, `%I`,
//! `%j`) are forwarded to [`jiff`]'s strftime. Record field directives accept
//! a padding prefix: `%8l` right-aligns the level in eight columns, `%-8l`
//! left-aligns it, and `%=8l` centers it.
//!
//! A [`LogPatterns`] table assigns patterns to levels sparsely. Formatting a
//! record picks the pattern set for the nearest level that is not more severe
//! than the record's; levels left unset fall back to built-in defaults, where
//! trace and debug records carry a thread id field and the rest do not.

use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::LazyLock;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::layout::Layout;
use crate::record::Level;
use crate::record::Record;

/// Built-in pattern for the verbose levels (trace and debug).
const DEFAULT_VERBOSE_PATTERN: &str = "[%Y-%m-%d %H:%M:%S.%F][th:%t][%=8l][%n]: %v";

/// Built-in pattern for info and above.
const DEFAULT_TERSE_PATTERN: &str = "[%Y-%m-%d %H:%M:%S.%F][%=8l][%n]: %v";

static DEFAULT_PATTERNS: LazyLock<LogPatterns> = LazyLock::new(|| {
    let mut patterns = LogPatterns::default();
    patterns.set(
        Level::Trace,
        DEFAULT_VERBOSE_PATTERN
            .parse()
            .expect("built-in pattern must parse"),
    );
    patterns.set(
        Level::Info,
        DEFAULT_TERSE_PATTERN
            .parse()
            .expect("built-in pattern must parse"),
    );
    patterns
});

// Severity ranks order levels from trace (0, most verbose) to critical (5,
// most severe), so "at or below a severity" is a prefix of the rank range.
const LEVELS_BY_RANK: [Level; 6] = [
    Level::Trace,
    Level::Debug,
    Level::Info,
    Level::Warn,
    Level::Error,
    Level::Critical,
];

fn severity_rank(level: Level) -> usize {
    5 - level as usize
}

/// The error returned when a pattern string is malformed.
#[derive(Debug, thiserror::Error)]
pub enum ParsePatternError {
    /// The pattern ends in the middle of a directive.
    #[error("truncated directive in pattern {pattern:?}")]
    Truncated { pattern: String },
    /// The character after `%` does not name a directive.
    #[error("unknown directive %{directive} in pattern {pattern:?}")]
    UnknownDirective { pattern: String, directive: char },
    /// A directive's width does not fit in `usize`.
    #[error("width too large in pattern {pattern:?}")]
    WidthOverflow { pattern: String },
    /// Padding applies to record field directives only.
    #[error("padding is not supported for time directive %{directive} in pattern {pattern:?}")]
    PaddedTime { pattern: String, directive: char },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Message,
    Name,
    Level,
    LevelShort,
    Thread,
    Process,
    SourceFile,
    SourcePath,
    SourceLine,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Chunk {
    Literal(String),
    // a single jiff strftime directive, e.g. "%Y" or "%3f"
    Time(String),
    Field {
        field: Field,
        width: usize,
        align: Align,
    },
}

/// A compiled pattern format string.
///
/// # Examples
///
/// ```
/// use logger::layout::Pattern;
///
/// let pattern: Pattern = "[%=8l] %v".parse().unwrap();
/// assert_eq!(pattern.as_str(), "[%=8l] %v");
///
/// assert!("%q".parse::<Pattern>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    chunks: Vec<Chunk>,
}

impl Pattern {
    /// The pattern string this pattern was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn render(&self, record: &Record, tz: &TimeZone) -> anyhow::Result<String> {
        let time = Timestamp::try_from(record.time())?.to_zoned(tz.clone());
        let mut out = String::with_capacity(self.source.len() + 48);

        for chunk in &self.chunks {
            match chunk {
                Chunk::Literal(text) => out.push_str(text),
                Chunk::Time(directive) => write!(out, "{}", time.strftime(directive))?,
                Chunk::Field {
                    field,
                    width,
                    align,
                } => {
                    let (width, align) = (*width, *align);
                    match field {
                        Field::Message => {
                            if width == 0 {
                                write!(out, "{}", record.args())?;
                            } else {
                                // fmt::Arguments ignores width flags; pad the
                                // rendered string instead
                                write_aligned(&mut out, record.args().to_string(), width, align)?;
                            }
                        }
                        Field::Name => write_aligned(&mut out, record.target(), width, align)?,
                        Field::Level => write_aligned(&mut out, record.level(), width, align)?,
                        Field::LevelShort => {
                            write_aligned(&mut out, short_level(record.level()), width, align)?
                        }
                        Field::Thread => {
                            THREAD_ID.with(|id| write_aligned(&mut out, id, width, align))?
                        }
                        Field::Process => {
                            write_aligned(&mut out, std::process::id(), width, align)?
                        }
                        Field::SourceFile => {
                            write_aligned(&mut out, record.filename(), width, align)?
                        }
                        Field::SourcePath => write_aligned(
                            &mut out,
                            record.file().unwrap_or_default(),
                            width,
                            align,
                        )?,
                        Field::SourceLine => write_aligned(
                            &mut out,
                            record.line().unwrap_or_default(),
                            width,
                            align,
                        )?,
                    }
                }
            }
        }

        Ok(out)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Pattern {
    type Err = ParsePatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Pattern {
            source: s.to_string(),
            chunks: parse_chunks(s)?,
        })
    }
}

impl serde::Serialize for Pattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> serde::Deserialize<'de> for Pattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct PatternVisitor;

        impl serde::de::Visitor<'_> for PatternVisitor {
            type Value = Pattern;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a pattern string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Pattern, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(PatternVisitor)
    }
}

// Time directives with identical meaning here and in strftime; they pass
// through untranslated. %e/%f/%F carry sub-second semantics instead and are
// translated in `parse_chunks`.
const TIME_PASSTHROUGH: [char; 15] = [
    'Y', 'y', 'm', 'd', 'H', 'I', 'M', 'S', 'p', 'z', 'a', 'A', 'b', 'B', 'j',
];

fn parse_chunks(source: &str) -> Result<Vec<Chunk>, ParsePatternError> {
    let truncated = || ParsePatternError::Truncated {
        pattern: source.to_string(),
    };
    let too_wide = || ParsePatternError::WidthOverflow {
        pattern: source.to_string(),
    };

    let mut chunks = Vec::new();
    let mut literal = String::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }

        let mut spec = *chars.peek().ok_or_else(truncated)?;
        if spec == '%' {
            chars.next();
            literal.push('%');
            continue;
        }

        let mut align = Align::Right;
        let mut width = 0usize;
        if spec == '-' || spec == '=' {
            align = if spec == '-' { Align::Left } else { Align::Center };
            chars.next();
            spec = *chars.peek().ok_or_else(truncated)?;
        }
        let padded = align != Align::Right || spec.is_ascii_digit();
        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            width = width
                .checked_mul(10)
                .and_then(|w| w.checked_add(digit as usize))
                .ok_or_else(too_wide)?;
            chars.next();
        }
        spec = *chars.peek().ok_or_else(truncated)?;
        chars.next();

        let chunk = match spec {
            'v' => field_chunk(Field::Message, width, align),
            'n' => field_chunk(Field::Name, width, align),
            'l' => field_chunk(Field::Level, width, align),
            'L' => field_chunk(Field::LevelShort, width, align),
            't' => field_chunk(Field::Thread, width, align),
            'P' => field_chunk(Field::Process, width, align),
            's' => field_chunk(Field::SourceFile, width, align),
            'g' => field_chunk(Field::SourcePath, width, align),
            '#' => field_chunk(Field::SourceLine, width, align),
            'e' => time_chunk(source, spec, padded, "%3f")?,
            'f' => time_chunk(source, spec, padded, "%6f")?,
            'F' => time_chunk(source, spec, padded, "%9f")?,
            c if TIME_PASSTHROUGH.contains(&c) => {
                time_chunk(source, spec, padded, &format!("%{c}"))?
            }
            other => {
                return Err(ParsePatternError::UnknownDirective {
                    pattern: source.to_string(),
                    directive: other,
                });
            }
        };

        if !literal.is_empty() {
            chunks.push(Chunk::Literal(std::mem::take(&mut literal)));
        }
        chunks.push(chunk);
    }

    if !literal.is_empty() {
        chunks.push(Chunk::Literal(literal));
    }
    Ok(chunks)
}

fn field_chunk(field: Field, width: usize, align: Align) -> Chunk {
    Chunk::Field {
        field,
        width,
        align,
    }
}

fn time_chunk(
    source: &str,
    spec: char,
    padded: bool,
    directive: &str,
) -> Result<Chunk, ParsePatternError> {
    if padded {
        return Err(ParsePatternError::PaddedTime {
            pattern: source.to_string(),
            directive: spec,
        });
    }
    Ok(Chunk::Time(directive.to_string()))
}

fn write_aligned(
    out: &mut String,
    value: impl fmt::Display,
    width: usize,
    align: Align,
) -> fmt::Result {
    match align {
        Align::Left => write!(out, "{value:<width$}"),
        Align::Right => write!(out, "{value:>width$}"),
        Align::Center => write!(out, "{value:^width$}"),
    }
}

fn short_level(level: Level) -> &'static str {
    match level {
        Level::Critical => "C",
        Level::Error => "E",
        Level::Warn => "W",
        Level::Info => "I",
        Level::Debug => "D",
        Level::Trace => "T",
    }
}

thread_local! {
    // ThreadId has no stable numeric accessor; keep the digits of its Debug form
    static THREAD_ID: String = {
        let id = format!("{:?}", std::thread::current().id());
        id.chars().filter(char::is_ascii_digit).collect()
    };
}

/// A sparse table assigning a [`Pattern`] to each level.
///
/// Levels can be left unset. Resolving a level walks from the requested level
/// towards trace and picks the first pattern found, so a pattern set for a
/// verbose level also covers the more severe levels above it until another
/// pattern takes over. Levels not covered by the table fall back to the
/// built-in defaults.
///
/// # Examples
///
/// ```
/// use logger::Level;
/// use logger::layout::LogPatterns;
///
/// let mut patterns = LogPatterns::default();
/// patterns.set(Level::Debug, "%l %v".parse().unwrap());
///
/// // debug and everything more severe resolve to the debug pattern
/// assert_eq!(patterns.resolve(Level::Error).as_str(), "%l %v");
/// // trace is more verbose than any set slot and uses the built-in default
/// assert_ne!(patterns.resolve(Level::Trace).as_str(), "%l %v");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogPatterns {
    patterns: [Option<Pattern>; 6],
}

impl LogPatterns {
    /// Set the pattern for `level`.
    pub fn set(&mut self, level: Level, pattern: Pattern) {
        self.patterns[severity_rank(level)] = Some(pattern);
    }

    /// The pattern explicitly set for `level`, if any.
    pub fn get(&self, level: Level) -> Option<&Pattern> {
        self.patterns[severity_rank(level)].as_ref()
    }

    /// The pattern a record at `level` is formatted with.
    pub fn resolve(&self, level: Level) -> &Pattern {
        let rank = severity_rank(level);
        self.lookup(rank)
            .or_else(|| DEFAULT_PATTERNS.lookup(rank))
            .expect("the built-in patterns cover every level")
    }

    fn lookup(&self, rank: usize) -> Option<&Pattern> {
        self.patterns[..=rank].iter().rev().find_map(Option::as_ref)
    }

    /// Fill levels this table leaves unset from `parent`.
    ///
    /// Levels already set keep their pattern.
    pub fn inherit(&mut self, parent: &LogPatterns) {
        for (slot, parent_slot) in self.patterns.iter_mut().zip(&parent.patterns) {
            if slot.is_none() {
                *slot = parent_slot.clone();
            }
        }
    }
}

impl serde::Serialize for LogPatterns {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let count = self.patterns.iter().filter(|slot| slot.is_some()).count();
        let mut map = serializer.serialize_map(Some(count))?;
        for (rank, slot) in self.patterns.iter().enumerate() {
            if let Some(pattern) = slot {
                map.serialize_entry(&LEVELS_BY_RANK[rank], pattern)?;
            }
        }
        map.end()
    }
}

impl<'de> serde::Deserialize<'de> for LogPatterns {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct PatternsVisitor;

        impl<'de> serde::de::Visitor<'de> for PatternsVisitor {
            type Value = LogPatterns;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from level names to pattern strings")
            }

            fn visit_map<A>(self, mut map: A) -> Result<LogPatterns, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut patterns = LogPatterns::default();
                while let Some((level, pattern)) = map.next_entry::<Level, Pattern>()? {
                    patterns.set(level, pattern);
                }
                Ok(patterns)
            }
        }

        deserializer.deserialize_map(PatternsVisitor)
    }
}

/// A layout that formats records according to per-level [`LogPatterns`].
///
/// # Examples
///
/// ```
/// use logger::layout::LogPatterns;
/// use logger::layout::PatternLayout;
///
/// let pattern_layout = PatternLayout::new(LogPatterns::default());
/// ```
#[derive(Clone, Debug, Default)]
pub struct PatternLayout {
    patterns: LogPatterns,
    tz: Option<TimeZone>,
}

impl PatternLayout {
    /// Creates a layout formatting with the given pattern table.
    pub fn new(patterns: LogPatterns) -> Self {
        Self { patterns, tz: None }
    }

    /// Sets the timezone for timestamps.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }
}

impl Layout for PatternLayout {
    fn format(&self, record: &Record) -> anyhow::Result<Vec<u8>> {
        let tz = self.tz.clone().unwrap_or_else(TimeZone::system);
        let pattern = self.patterns.resolve(record.level());
        Ok(pattern.render(record, &tz)?.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use std::time::SystemTime;

    use super::*;

    // 2024-01-02T03:04:05.123456789Z
    fn fixed_time() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::new(1_704_164_645, 123_456_789)
    }

    fn record(level: Level) -> Record<'static> {
        Record::builder()
            .time(fixed_time())
            .level(level)
            .target("app/net")
            .file_static("src/net/io.rs")
            .line(Some(42))
            .args(format_args!("connected"))
            .build()
    }

    fn render(pattern: &str, level: Level) -> String {
        let pattern: Pattern = pattern.parse().unwrap();
        pattern.render(&record(level), &TimeZone::UTC).unwrap()
    }

    #[test]
    fn test_parse_rejects_malformed_patterns() {
        assert!(matches!(
            "%q".parse::<Pattern>(),
            Err(ParsePatternError::UnknownDirective { directive: 'q', .. })
        ));
        assert!(matches!(
            "tail %".parse::<Pattern>(),
            Err(ParsePatternError::Truncated { .. })
        ));
        assert!(matches!(
            "%8".parse::<Pattern>(),
            Err(ParsePatternError::Truncated { .. })
        ));
        assert!(matches!(
            "%8Y".parse::<Pattern>(),
            Err(ParsePatternError::PaddedTime { directive: 'Y', .. })
        ));
        assert!(matches!(
            "%-f".parse::<Pattern>(),
            Err(ParsePatternError::PaddedTime { directive: 'f', .. })
        ));
        assert!(matches!(
            "%99999999999999999999v".parse::<Pattern>(),
            Err(ParsePatternError::WidthOverflow { .. })
        ));
    }

    #[test]
    fn test_percent_escape() {
        assert_eq!(render("100%% done", Level::Info), "100% done");
    }

    #[test]
    fn test_render_empty_pattern() {
        assert_eq!(render("", Level::Info), "");
    }

    #[test]
    fn test_render_default_pattern_shape() {
        assert_eq!(
            render(DEFAULT_TERSE_PATTERN, Level::Info),
            "[2024-01-02 03:04:05.123456789][  INFO  ][app/net]: connected"
        );
    }

    #[test]
    fn test_render_subsecond_precision() {
        assert_eq!(render("%e/%f/%F", Level::Info), "123/123456/123456789");
    }

    #[test]
    fn test_render_source_fields() {
        assert_eq!(
            render("%s %g %#", Level::Info),
            "io.rs src/net/io.rs 42"
        );
    }

    #[test]
    fn test_render_process_and_thread() {
        assert_eq!(render("%P", Level::Info), std::process::id().to_string());

        let thread = render("%t", Level::Info);
        assert!(!thread.is_empty());
        assert!(thread.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_render_level_names() {
        assert_eq!(render("%l", Level::Critical), "CRITICAL");
        assert_eq!(render("%L", Level::Critical), "C");
        assert_eq!(render("%L", Level::Trace), "T");
    }

    #[test]
    fn test_render_alignment() {
        assert_eq!(render("%7l|", Level::Info), "   INFO|");
        assert_eq!(render("%-7l|", Level::Info), "INFO   |");
        assert_eq!(render("%=8l|", Level::Info), "  INFO  |");
        // odd leftover space lands on the right
        assert_eq!(render("%=7l|", Level::Info), " INFO  |");
        assert_eq!(render("%11v|", Level::Info), "  connected|");
    }

    #[test]
    fn test_resolve_picks_nearest_pattern() {
        let mut patterns = LogPatterns::default();
        patterns.set(Level::Trace, "verbose %v".parse().unwrap());
        patterns.set(Level::Info, "terse %v".parse().unwrap());

        assert_eq!(patterns.resolve(Level::Trace).as_str(), "verbose %v");
        assert_eq!(patterns.resolve(Level::Debug).as_str(), "verbose %v");
        assert_eq!(patterns.resolve(Level::Info).as_str(), "terse %v");
        assert_eq!(patterns.resolve(Level::Critical).as_str(), "terse %v");
    }

    #[test]
    fn test_resolve_falls_back_to_builtin_defaults() {
        let patterns = LogPatterns::default();
        assert_eq!(
            patterns.resolve(Level::Debug).as_str(),
            DEFAULT_VERBOSE_PATTERN
        );
        assert_eq!(patterns.resolve(Level::Error).as_str(), DEFAULT_TERSE_PATTERN);

        let mut patterns = LogPatterns::default();
        patterns.set(Level::Warn, "%v".parse().unwrap());
        // debug is more verbose than the only set slot
        assert_eq!(
            patterns.resolve(Level::Debug).as_str(),
            DEFAULT_VERBOSE_PATTERN
        );
        assert_eq!(patterns.resolve(Level::Error).as_str(), "%v");
    }

    #[test]
    fn test_inherit_fills_unset_slots_only() {
        let mut child = LogPatterns::default();
        child.set(Level::Info, "child %v".parse().unwrap());

        let mut parent = LogPatterns::default();
        parent.set(Level::Info, "parent %v".parse().unwrap());
        parent.set(Level::Error, "parent errors %v".parse().unwrap());

        child.inherit(&parent);
        assert_eq!(child.get(Level::Info).unwrap().as_str(), "child %v");
        assert_eq!(
            child.get(Level::Error).unwrap().as_str(),
            "parent errors %v"
        );
        assert_eq!(child.get(Level::Trace), None);
    }

    #[test]
    fn test_patterns_serde() {
        let patterns: LogPatterns =
            serde_json::from_str(r#"{"info":"%v","trace":"[t] %v"}"#).unwrap();
        assert_eq!(patterns.get(Level::Info).unwrap().as_str(), "%v");
        assert_eq!(patterns.get(Level::Trace).unwrap().as_str(), "[t] %v");
        assert_eq!(patterns.get(Level::Error), None);

        let json = serde_json::to_string(&patterns).unwrap();
        assert_eq!(json, r#"{"trace":"[t] %v","info":"%v"}"#);

        assert!(serde_json::from_str::<LogPatterns>(r#"{"info":"%q"}"#).is_err());
        assert!(serde_json::from_str::<LogPatterns>(r#"{"loud":"%v"}"#).is_err());
    }

    #[test]
    fn test_pattern_layout_uses_level_patterns() {
        let mut patterns = LogPatterns::default();
        patterns.set(Level::Trace, "verbose %v".parse().unwrap());
        patterns.set(Level::Info, "%l %v".parse().unwrap());

        let layout = PatternLayout::new(patterns).timezone(TimeZone::UTC);
        let debug = layout.format(&record(Level::Debug)).unwrap();
        assert_eq!(debug, b"verbose connected");
        let warn = layout.format(&record(Level::Warn)).unwrap();
        assert_eq!(warn, b"WARN connected");
    }
}
