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

use crate::layout::LogPatterns;
use crate::record::Level;

/// Configuration of a logger: a verbosity level and per-level format patterns.
///
/// Fields left out of a serialized configuration take their default values,
/// so `{}` deserializes to the default configuration.
///
/// # Examples
///
/// ```
/// use logger::Config;
/// use logger::Level;
///
/// let config: Config = serde_json::from_str(r#"{"level": "debug"}"#).unwrap();
/// assert_eq!(config.level, Level::Debug);
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// The most verbose level that is emitted.
    pub level: Level,
    /// Per-level format patterns.
    pub patterns: LogPatterns,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            level: Level::Info,
            patterns: LogPatterns::default(),
        }
    }
}
