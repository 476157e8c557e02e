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

//! A leveled, pattern-formatted logging implementation, providing easy log
//! dispatching and configuration.
//!
//! # Overview
//!
//! This crate lets you set up multiple log dispatches with different filters
//! and appenders. Records carry six verbosity levels, from `Critical` down to
//! `Trace`, and can be rendered through plain text, JSON, or `%`-directive
//! pattern layouts with per-level pattern tables. It integrates seamlessly
//! with the `log` crate.
//!
//! # Examples
//!
//! Simple setup with default stdout appender:
//!
//! ```
//! logger::stdout().apply();
//!
//! log::info!("This is an info message.");
//! ```
//!
//! Advanced setup with custom filters and multiple appenders:
//!
//! ```
//! use logger::Level;
//! use logger::LevelFilter;
//! use logger::append;
//!
//! logger::builder()
//!     .dispatch(|d| {
//!         d.filter(LevelFilter::MoreSevereEqual(Level::Error))
//!             .append(append::Stderr::default())
//!     })
//!     .dispatch(|d| {
//!         d.filter(LevelFilter::MoreSevereEqual(Level::Info))
//!             .append(append::Stdout::default())
//!     })
//!     .apply();
//!
//! log::error!("Error message.");
//! log::info!("Info message.");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod filter;
pub mod layout;
pub mod non_blocking;

pub use append::Append;
pub use filter::Filter;
pub use layout::Layout;

mod config;
pub use config::Config;

mod record;
pub use record::Level;
pub use record::LevelFilter;
pub use record::Metadata;
pub use record::MetadataBuilder;
pub use record::ParseLevelError;
pub use record::Record;
pub use record::RecordBuilder;

mod logger;
pub use logger::*;

/// A handle that holds background resources alive until dropped.
///
/// Appenders that write through a background thread return a guard from their
/// builders. Keep the guard around for the lifetime of the program so buffered
/// records are drained on shutdown.
pub type DropGuard = Box<dyn std::any::Any + Send + Sync + 'static>;
