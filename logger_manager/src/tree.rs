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
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use logger::Config;
use logger::Level;
use logger::LevelFilter;
use logger::Logger;
use logger::layout::LogPatterns;

use crate::config::ConfigError;
use crate::config::OutputSet;

// the logger name of the unnamed root node
const ROOT_TAG: &str = "root";

/// A handle to a node of the logger tree.
///
/// Each node carries a configuration fixed at registration and lazily builds
/// its [`Logger`] from it. Handles are cheap to clone and share the
/// underlying node.
///
/// # Examples
///
/// ```
/// use logger_manager::Level;
/// use logger_manager::LoggerManager;
///
/// let manager = LoggerManager::new(Default::default());
/// let net = manager.register_child("net", Some(Level::Debug), None);
/// net.logger().debug("listening");
/// ```
#[derive(Clone, Debug)]
pub struct LoggerManager {
    node: Arc<Node>,
}

#[derive(Debug)]
struct Node {
    // empty for the root node
    tag: String,
    full_tag: String,
    config: Config,
    outputs: Arc<OutputSet>,
    state: Mutex<NodeState>,
}

#[derive(Debug, Default)]
struct NodeState {
    children: BTreeMap<String, LoggerManager>,
    logger: Option<Logger>,
}

impl LoggerManager {
    /// Creates a root manager writing to stdout.
    ///
    /// Use [`builder`](crate::builder) to configure outputs and a subtree.
    pub fn new(config: Config) -> Self {
        LoggerManager::with_outputs(config, Arc::new(OutputSet::stdout_only()))
    }

    pub(crate) fn with_outputs(config: Config, outputs: Arc<OutputSet>) -> Self {
        LoggerManager {
            node: Arc::new(Node {
                tag: String::new(),
                full_tag: String::new(),
                config,
                outputs,
                state: Mutex::default(),
            }),
        }
    }

    /// The node's own tag; empty for the root.
    pub fn tag(&self) -> &str {
        &self.node.tag
    }

    /// The full tag path from the root, segments joined with `/`.
    pub fn full_tag(&self) -> &str {
        &self.node.full_tag
    }

    /// The configuration fixed when this node was registered.
    pub fn config(&self) -> &Config {
        &self.node.config
    }

    /// Returns the child with the given tag, registering it with the parent's
    /// configuration if it does not exist yet.
    ///
    /// # Panics
    ///
    /// Panics if `tag` is empty or contains `/`.
    pub fn child(&self, tag: &str) -> LoggerManager {
        if let Err(err) = validate_tag(&self.node.full_tag, tag) {
            panic!("{err}");
        }
        let mut state = self.lock_state();
        if let Some(child) = state.children.get(tag) {
            return child.clone();
        }
        let child = self.make_child(tag, None, None);
        state.children.insert(tag.to_string(), child.clone());
        child
    }

    /// Registers a child, replacing any existing child with the same tag.
    ///
    /// `level` and `patterns` override the parent's configuration; pattern
    /// slots left unset are inherited from the parent.
    ///
    /// # Panics
    ///
    /// Panics if `tag` is empty or contains `/`.
    pub fn register_child(
        &self,
        tag: &str,
        level: Option<Level>,
        patterns: Option<LogPatterns>,
    ) -> LoggerManager {
        match self.try_register_child(tag, level, patterns) {
            Ok(child) => child,
            Err(err) => panic!("{err}"),
        }
    }

    /// Registers a child, replacing any existing child with the same tag.
    ///
    /// # Errors
    ///
    /// Returns an error if `tag` is empty or contains `/`.
    pub fn try_register_child(
        &self,
        tag: &str,
        level: Option<Level>,
        patterns: Option<LogPatterns>,
    ) -> Result<LoggerManager, ConfigError> {
        validate_tag(&self.node.full_tag, tag)?;
        let child = self.make_child(tag, level, patterns);
        let mut state = self.lock_state();
        state.children.insert(tag.to_string(), child.clone());
        Ok(child)
    }

    fn make_child(
        &self,
        tag: &str,
        level: Option<Level>,
        patterns: Option<LogPatterns>,
    ) -> LoggerManager {
        let mut config = Config {
            level: level.unwrap_or(self.node.config.level),
            patterns: patterns.unwrap_or_default(),
        };
        config.patterns.inherit(&self.node.config.patterns);

        let full_tag = if self.node.full_tag.is_empty() {
            tag.to_string()
        } else {
            format!("{}/{}", self.node.full_tag, tag)
        };
        LoggerManager {
            node: Arc::new(Node {
                tag: tag.to_string(),
                full_tag,
                config,
                outputs: self.node.outputs.clone(),
                state: Mutex::default(),
            }),
        }
    }

    /// The logger of this node, created on first use.
    pub fn logger(&self) -> Logger {
        let mut state = self.lock_state();
        if let Some(logger) = &state.logger {
            return logger.clone();
        }
        let logger = self.node.build_logger();
        state.logger = Some(logger.clone());
        logger
    }

    /// Returns the logger of the deepest registered node on the target's tag
    /// path.
    ///
    /// Unregistered trailing segments fall back to the nearest ancestor, so
    /// records keep flowing when only part of a path is registered.
    pub fn resolve(&self, target: &str) -> Logger {
        let mut current = self.clone();
        for segment in target.split('/') {
            if segment.is_empty() {
                break;
            }
            let child = {
                let state = current.lock_state();
                state.children.get(segment).cloned()
            };
            match child {
                Some(next) => current = next,
                None => break,
            }
        }
        current.logger()
    }

    /// Flushes every logger in this subtree that has been created.
    pub fn flush(&self) {
        let (logger, children) = {
            let state = self.lock_state();
            (
                state.logger.clone(),
                state.children.values().cloned().collect::<Vec<_>>(),
            )
        };
        if let Some(logger) = logger {
            logger.flush();
        }
        for child in children {
            child.flush();
        }
    }

    /// Install this tree as the global logger for the `log` facade.
    ///
    /// Records are routed to the deepest registered node matching their
    /// target, keeping their original target.
    ///
    /// # Errors
    ///
    /// Return an error if a global logger has already been set.
    pub fn try_apply(&self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(TreeLogger { root: self.clone() }))?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(())
    }

    /// Install this tree as the global logger for the `log` facade.
    ///
    /// # Panics
    ///
    /// Panic if the global logger has already been set.
    pub fn apply(&self) {
        self.try_apply()
            .expect("LoggerManager::apply must be called before the global logger initialized");
    }

    fn lock_state(&self) -> MutexGuard<'_, NodeState> {
        self.node.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Node {
    fn build_logger(&self) -> Logger {
        let name = if self.full_tag.is_empty() {
            ROOT_TAG
        } else {
            self.full_tag.as_str()
        };
        let appends = self.outputs.appends_for(&self.config.patterns);
        let level = self.config.level;
        logger::builder()
            .tag(name)
            .dispatch(move |d| {
                let d = d.filter(LevelFilter::MoreSevereEqual(level));
                let mut appends = appends.into_iter();
                let mut d = d.append(
                    appends
                        .next()
                        .expect("an output set always contains at least one sink"),
                );
                for append in appends {
                    d = d.append(append);
                }
                d
            })
            .build()
    }
}

fn validate_tag(parent: &str, tag: &str) -> Result<(), ConfigError> {
    if tag.is_empty() || tag.contains('/') {
        return Err(ConfigError::InvalidTag {
            parent: parent.to_string(),
            tag: tag.to_string(),
        });
    }
    Ok(())
}

// Routes facade records to the tree node matching their target.
#[derive(Debug)]
struct TreeLogger {
    root: LoggerManager,
}

impl log::Log for TreeLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        let logger = self.root.resolve(metadata.target());
        let metadata = logger::Metadata::builder()
            .level(metadata.level().into())
            .target(metadata.target())
            .build();
        logger.enabled(&metadata)
    }

    fn log(&self, record: &log::Record) {
        let logger = self.root.resolve(record.target());
        logger.log(&logger::Record::from(record));
    }

    fn flush(&self) {
        self.root.flush();
    }
}

#[cfg(test)]
mod tests {
    use logger::Append;
    use logger::Record;

    use super::*;
    use crate::builder;

    #[derive(Debug, Default)]
    struct Capture {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl Capture {
        fn lines(&self) -> Arc<Mutex<Vec<String>>> {
            self.lines.clone()
        }
    }

    impl Append for Capture {
        fn append(&self, record: &Record) -> anyhow::Result<()> {
            // render before locking so nested logging cannot deadlock
            let line = format!("{} {} {}", record.target(), record.level(), record.args());
            self.lines.lock().unwrap().push(line);
            Ok(())
        }
    }

    #[test]
    fn test_child_inherits_parent_config() {
        let mut patterns = LogPatterns::default();
        patterns.set(Level::Info, "%v".parse().unwrap());
        let manager = LoggerManager::new(Config {
            level: Level::Debug,
            patterns,
        });

        let net = manager.child("net");
        assert_eq!(net.tag(), "net");
        assert_eq!(net.full_tag(), "net");
        assert_eq!(net.config().level, Level::Debug);
        assert_eq!(
            net.config().patterns.get(Level::Info).unwrap().as_str(),
            "%v"
        );

        // a second lookup returns the registered child
        let again = manager.child("net");
        assert_eq!(again.full_tag(), "net");
        assert_eq!(again.config(), net.config());
    }

    #[test]
    fn test_register_child_overrides_and_inherits() {
        let mut parent_patterns = LogPatterns::default();
        parent_patterns.set(Level::Info, "parent %v".parse().unwrap());
        let manager = LoggerManager::new(Config {
            level: Level::Info,
            patterns: parent_patterns,
        });

        let mut child_patterns = LogPatterns::default();
        child_patterns.set(Level::Debug, "child %v".parse().unwrap());
        let net = manager.register_child("net", Some(Level::Trace), Some(child_patterns));

        assert_eq!(net.config().level, Level::Trace);
        assert_eq!(
            net.config().patterns.get(Level::Debug).unwrap().as_str(),
            "child %v"
        );
        assert_eq!(
            net.config().patterns.get(Level::Info).unwrap().as_str(),
            "parent %v"
        );

        // registering the same tag again replaces the node
        let replaced = manager.register_child("net", None, None);
        assert_eq!(replaced.config().level, Level::Info);
        assert_eq!(replaced.config().patterns.get(Level::Debug), None);
        assert_eq!(manager.resolve("net").tag(), Some("net"));
    }

    #[test]
    fn test_invalid_tags_are_rejected() {
        let manager = LoggerManager::new(Config::default());
        assert!(matches!(
            manager.try_register_child("a/b", None, None),
            Err(ConfigError::InvalidTag { .. })
        ));
        assert!(manager.try_register_child("", None, None).is_err());
    }

    #[test]
    fn test_resolve_picks_deepest_registered_node() {
        let manager = LoggerManager::new(Config::default());
        let net = manager.child("net");
        net.child("http");

        assert_eq!(manager.resolve("net/http").tag(), Some("net/http"));
        assert_eq!(manager.resolve("net/http/h2").tag(), Some("net/http"));
        assert_eq!(manager.resolve("net/tls").tag(), Some("net"));
        assert_eq!(manager.resolve("db").tag(), Some("root"));
        assert_eq!(manager.resolve("").tag(), Some("root"));
    }

    #[test]
    fn test_levels_gate_per_node() {
        let capture = Capture::default();
        let lines = capture.lines();
        let (manager, guards) = builder()
            .level(Level::Info)
            .append(capture)
            .build()
            .unwrap();
        let net = manager.register_child("net", Some(Level::Debug), None);

        manager.logger().debug("hidden");
        manager.logger().info("root shown");
        net.logger().debug("net detail");
        net.logger().trace("too verbose");
        manager.flush();
        drop(guards);

        let lines = lines.lock().unwrap();
        assert_eq!(
            lines.as_slice(),
            ["root INFO root shown", "net DEBUG net detail"]
        );
    }
}
