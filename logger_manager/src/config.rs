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

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use logger::Append;
use logger::Config;
use logger::DropGuard;
use logger::Level;
use logger::append::File;
use logger::append::FileBuilder;
use logger::append::Stderr;
use logger::append::Stdout;
use logger::layout::LogPatterns;
use logger::layout::PatternLayout;

use crate::tree::LoggerManager;

/// Errors from building or growing a logger tree.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A tag is empty or contains the tag separator.
    #[error("invalid tag {tag:?} under {parent:?}: tags must be non-empty and must not contain '/'")]
    InvalidTag { parent: String, tag: String },
    /// An output could not be opened.
    #[error("failed to open log output")]
    Output(#[source] anyhow::Error),
}

/// A log output destination shared by every logger in a tree.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Output {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
    /// A file at the given path, written through a background thread.
    File(PathBuf),
}

// A realized output. Stdout and Stderr are stateless; File carries the handle
// to the shared writer thread so every node appends to the same file.
#[derive(Debug)]
enum Sink {
    Stdout,
    Stderr,
    File(File),
    Shared(Arc<dyn Append>),
}

/// The realized outputs shared by every node of a logger tree.
#[derive(Debug)]
pub(crate) struct OutputSet {
    sinks: Vec<Sink>,
}

impl OutputSet {
    pub(crate) fn stdout_only() -> Self {
        OutputSet {
            sinks: vec![Sink::Stdout],
        }
    }

    /// One appender per sink, formatting with the given pattern table.
    ///
    /// Shared appenders carry their own formatting and ignore the patterns.
    pub(crate) fn appends_for(&self, patterns: &LogPatterns) -> Vec<Box<dyn Append>> {
        self.sinks
            .iter()
            .map(|sink| -> Box<dyn Append> {
                match sink {
                    Sink::Stdout => Box::new(
                        Stdout::default().with_layout(PatternLayout::new(patterns.clone())),
                    ),
                    Sink::Stderr => Box::new(
                        Stderr::default().with_layout(PatternLayout::new(patterns.clone())),
                    ),
                    Sink::File(file) => {
                        Box::new(file.clone_with_layout(PatternLayout::new(patterns.clone())))
                    }
                    Sink::Shared(append) => Box::new(append.clone()),
                }
            })
            .collect()
    }
}

/// Declarative configuration of a logger tree node.
///
/// Fields left unset inherit from the parent node. The top-level value
/// describes the root logger; `children` maps tags to subtree configurations.
///
/// # Examples
///
/// ```
/// use logger_manager::Level;
/// use logger_manager::TreeConfig;
///
/// let tree = TreeConfig::from_json(
///     r#"{
///         "level": "info",
///         "children": {
///             "net": {"level": "debug"},
///             "db": {}
///         }
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(tree.level, Some(Level::Info));
/// assert_eq!(tree.children["net"].level, Some(Level::Debug));
/// assert_eq!(tree.children["db"].level, None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// The most verbose level emitted by this subtree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    /// Per-level format patterns for this subtree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<LogPatterns>,
    /// Configurations of the child loggers, keyed by tag.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, TreeConfig>,
}

impl TreeConfig {
    /// Parses a tree configuration from JSON.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}

/// Create a new empty [`ManagerBuilder`] for configuring a logger tree.
///
/// # Examples
///
/// ```
/// use logger_manager::Output;
///
/// let (manager, guards) = logger_manager::builder()
///     .output(Output::Stderr)
///     .build()
///     .unwrap();
/// manager.logger().info("manager ready");
/// drop(guards);
/// ```
pub fn builder() -> ManagerBuilder {
    ManagerBuilder::default()
}

/// A builder for a [`LoggerManager`] tree with its outputs.
#[must_use = "call `build` to construct the logger tree"]
#[derive(Debug, Default)]
pub struct ManagerBuilder {
    config: Config,
    outputs: Vec<Output>,
    appends: Vec<Arc<dyn Append>>,
    tree: Option<TreeConfig>,
}

impl ManagerBuilder {
    /// Set the configuration of the root logger.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the level of the root logger.
    pub fn level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    /// Add a declarative output destination.
    ///
    /// When no output is configured at all, the tree writes to stdout.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Add a ready-made appender as an output destination.
    ///
    /// The appender is shared by every logger in the tree and is responsible
    /// for its own formatting.
    pub fn append(mut self, append: impl Append) -> Self {
        self.appends.push(Arc::new(append));
        self
    }

    /// Declare the subtree of loggers to register, with per-node overrides.
    pub fn tree_config(mut self, tree: TreeConfig) -> Self {
        self.tree = Some(tree);
        self
    }

    /// Build the logger tree.
    ///
    /// Returns the root [`LoggerManager`] and the guards keeping background
    /// writers alive. Keep the guards around for the lifetime of the program.
    ///
    /// # Errors
    ///
    /// Returns an error if an output cannot be opened or the tree
    /// configuration contains an invalid tag.
    pub fn build(self) -> Result<(LoggerManager, Vec<DropGuard>), ConfigError> {
        let ManagerBuilder {
            mut config,
            outputs,
            appends,
            tree,
        } = self;

        let mut sinks = Vec::new();
        let mut guards = Vec::new();
        for output in outputs {
            match output {
                Output::Stdout => sinks.push(Sink::Stdout),
                Output::Stderr => sinks.push(Sink::Stderr),
                Output::File(path) => {
                    let (file, guard) =
                        FileBuilder::new(path).build().map_err(ConfigError::Output)?;
                    sinks.push(Sink::File(file));
                    guards.push(guard);
                }
            }
        }
        for append in appends {
            sinks.push(Sink::Shared(append));
        }
        if sinks.is_empty() {
            sinks.push(Sink::Stdout);
        }

        if let Some(tree) = &tree {
            if let Some(level) = tree.level {
                config.level = level;
            }
            if let Some(patterns) = &tree.patterns {
                let mut patterns = patterns.clone();
                patterns.inherit(&config.patterns);
                config.patterns = patterns;
            }
        }

        let manager = LoggerManager::with_outputs(config, Arc::new(OutputSet { sinks }));
        if let Some(tree) = &tree {
            register_subtree(&manager, &tree.children)?;
        }
        Ok((manager, guards))
    }
}

fn register_subtree(
    manager: &LoggerManager,
    children: &BTreeMap<String, TreeConfig>,
) -> Result<(), ConfigError> {
    for (tag, node) in children {
        let child = manager.try_register_child(tag, node.level, node.patterns.clone())?;
        register_subtree(&child, &node.children)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_serde() {
        let outputs: Vec<Output> =
            serde_json::from_str(r#"["stdout", "stderr", {"file": "/var/log/app.log"}]"#).unwrap();
        assert_eq!(
            outputs,
            [
                Output::Stdout,
                Output::Stderr,
                Output::File(PathBuf::from("/var/log/app.log")),
            ]
        );

        let json = serde_json::to_string(&outputs).unwrap();
        assert_eq!(json, r#"["stdout","stderr",{"file":"/var/log/app.log"}]"#);
    }

    #[test]
    fn test_tree_config_from_json() {
        let tree = TreeConfig::from_json(
            r#"{
                "level": "debug",
                "children": {
                    "net": {"level": "trace", "patterns": {"info": "%l %v"}},
                    "db": {}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(tree.level, Some(Level::Debug));
        assert_eq!(tree.patterns, None);
        assert_eq!(tree.children.len(), 2);

        let net = &tree.children["net"];
        assert_eq!(net.level, Some(Level::Trace));
        let patterns = net.patterns.as_ref().unwrap();
        assert_eq!(patterns.get(Level::Info).unwrap().as_str(), "%l %v");

        assert_eq!(tree.children["db"], TreeConfig::default());
    }

    #[test]
    fn test_tree_config_rejects_malformed_input() {
        assert!(TreeConfig::from_json(r#"{"level": "loud"}"#).is_err());
        assert!(TreeConfig::from_json(r#"{"patterns": {"info": "%q"}}"#).is_err());
        assert!(
            TreeConfig::from_json(r#"{"patterns": {"info": "%99999999999999999999v"}}"#).is_err()
        );
    }
}
