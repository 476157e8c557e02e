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

//! Hierarchical logger configuration and routing for the [`logger`] crate.
//!
//! # Overview
//!
//! A [`LoggerManager`] is a node in a tree of named loggers. Every node owns
//! a [`Config`] fixed at registration: a severity threshold and per-level
//! output patterns. Children inherit whatever parts of the configuration
//! they do not override, and all nodes write to the output sinks the tree
//! was built with.
//!
//! Once installed with [`LoggerManager::apply`], records logged through the
//! `log` facade are routed to the deepest registered node matching their
//! target, so a `net/http` record prefers a `net/http` node over `net` and
//! unknown targets fall back to the root.
//!
//! # Examples
//!
//! Build a tree from configuration and install it globally:
//!
//! ```
//! use logger_manager::Output;
//! use logger_manager::TreeConfig;
//!
//! let tree = TreeConfig::from_json(
//!     r#"{"level": "info", "children": {"net": {"level": "debug"}}}"#,
//! )
//! .unwrap();
//! let (manager, guards) = logger_manager::builder()
//!     .output(Output::Stderr)
//!     .tree_config(tree)
//!     .build()
//!     .unwrap();
//! manager.apply();
//!
//! log::debug!(target: "net/http", "handled by the net node");
//! log::info!("handled by the root node");
//! # drop(guards);
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod config;
mod tree;

pub use logger::Config;
pub use logger::Level;
pub use logger::Logger;
pub use logger::layout::LogPatterns;

pub use self::config::ConfigError;
pub use self::config::ManagerBuilder;
pub use self::config::Output;
pub use self::config::TreeConfig;
pub use self::config::builder;
pub use self::tree::LoggerManager;
