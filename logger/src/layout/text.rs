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

use colored::Color;
use colored::ColoredString;
use colored::Colorize;
use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::layout::Layout;
use crate::record::Level;
use crate::record::Record;

/// A layout that formats log record as text.
///
/// Output format:
///
/// ```text
/// 2024-08-11T22:44:57.172105+08:00    ERROR app/net: io.rs:51 Hello error!
/// 2024-08-11T22:44:57.172219+08:00     WARN app/net: io.rs:52 Hello warn!
/// 2024-08-11T22:44:57.172276+08:00     INFO app/net: io.rs:53 Hello info!
/// 2024-08-11T22:44:57.172329+08:00    DEBUG app/net: io.rs:54 Hello debug!
/// 2024-08-11T22:44:57.172382+08:00    TRACE app/net: io.rs:55 Hello trace!
/// ```
///
/// By default, log levels are colored. Call [`TextLayout::no_color`] to disable
/// this, or customize the color of each level with [`TextLayout::colors`].
///
/// The timestamp is rendered in the system timezone unless overridden with
/// [`TextLayout::timezone`].
#[derive(Default, Debug, Clone)]
pub struct TextLayout {
    colors: LevelColor,
    no_color: bool,
    tz: Option<TimeZone>,
}

impl TextLayout {
    /// Disables colored output.
    pub fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Customizes the color of each log level.
    pub fn colors(mut self, colors: LevelColor) -> Self {
        self.colors = colors;
        self
    }

    /// Sets the timezone for timestamps.
    ///
    /// # Examples
    ///
    /// ```
    /// use jiff::tz::TimeZone;
    /// use logger::layout::TextLayout;
    ///
    /// let text_layout = TextLayout::default().timezone(TimeZone::UTC);
    /// ```
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }
}

/// Colors for different log levels.
#[derive(Debug, Clone)]
pub struct LevelColor {
    /// Color for critical level logs.
    pub critical: Color,
    /// Color for error level logs.
    pub error: Color,
    /// Color for warning level logs.
    pub warn: Color,
    /// Color for info level logs.
    pub info: Color,
    /// Color for debug level logs.
    pub debug: Color,
    /// Color for trace level logs.
    pub trace: Color,
}

impl Default for LevelColor {
    fn default() -> Self {
        Self {
            critical: Color::BrightRed,
            error: Color::Red,
            warn: Color::Yellow,
            info: Color::Green,
            debug: Color::Blue,
            trace: Color::Magenta,
        }
    }
}

impl LevelColor {
    /// Colorize the log level.
    pub fn colorize_record_level(&self, no_color: bool, level: Level) -> ColoredString {
        if no_color {
            ColoredString::from(level.to_string())
        } else {
            let color = match level {
                Level::Critical => self.critical,
                Level::Error => self.error,
                Level::Warn => self.warn,
                Level::Info => self.info,
                Level::Debug => self.debug,
                Level::Trace => self.trace,
            };
            ColoredString::from(level.to_string()).color(color)
        }
    }
}

impl Layout for TextLayout {
    fn format(&self, record: &Record) -> anyhow::Result<Vec<u8>> {
        let time = Timestamp::try_from(record.time())?
            .to_zoned(self.tz.clone().unwrap_or_else(TimeZone::system));
        let time = time.strftime("%Y-%m-%dT%H:%M:%S.%6f%:z");
        let level = self
            .colors
            .colorize_record_level(self.no_color, record.level());
        let target = record.target();
        let file = record.filename();
        let line = record.line().unwrap_or_default();
        let message = record.args();

        Ok(format!("{time} {level:>8} {target}: {file}:{line} {message}").into_bytes())
    }
}
