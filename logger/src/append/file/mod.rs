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

//! Appender for writing log records to a file.
//!
//! Records are handed to a dedicated writer thread, so appending never blocks
//! on disk IO. Keep the returned guard alive until the program exits; dropping
//! it flushes the remaining records.
//!
//! # Example
//!
//!```no_run
//! use logger::append::file::FileBuilder;
//! use logger::layout::JsonLayout;
//!
//! let (file_writer, _guard) = FileBuilder::new("/path/to/file.log")
//!     .layout(JsonLayout::default())
//!     .build()
//!     .unwrap();
//!
//! logger::builder()
//!     .dispatch(|d| d.append(file_writer))
//!     .apply();
//!
//! log::info!("This log will be written to a file.");
//! ```

pub use append::File;
pub use append::FileBuilder;

mod append;
mod writer;
