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

//! Filters for log records.

use std::fmt;

pub use self::env::EnvFilter;
pub use self::env::EnvFilterBuilder;
pub use self::tag::TagFilter;
use crate::record::Metadata;

mod env;
mod level;
mod tag;

/// The result of a filter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// The record will be processed without further filtering.
    Accept,
    /// The record should not be processed.
    Reject,
    /// No decision could be made, further filtering should occur.
    Neutral,
}

/// A filter that decides whether a log record is processed.
pub trait Filter: fmt::Debug + Send + Sync + 'static {
    /// Checks the record metadata against the filter condition.
    fn enabled(&self, metadata: &Metadata) -> FilterResult;
}

impl<T: Filter> From<T> for Box<dyn Filter> {
    fn from(filter: T) -> Self {
        Box::new(filter)
    }
}
