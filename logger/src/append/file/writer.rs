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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;

/// A writer for files.
#[derive(Debug)]
pub struct FileWriter {
    writer: File,
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let writer = &mut self.writer;

        writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// A builder for configuring [`FileWriter`].
#[derive(Debug)]
pub struct FileWriterBuilder {
    // required
    filepath: PathBuf,
}

impl FileWriterBuilder {
    /// Creates a new [`FileWriterBuilder`].
    #[must_use]
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }

    /// Builds the [`FileWriter`].
    pub fn build(self) -> anyhow::Result<FileWriter> {
        let dir = &self
            .filepath
            .parent()
            .context("failed to get log directory")?;
        fs::create_dir_all(dir).context("failed to create log directory")?;
        let writer = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.filepath)
            .context("failed to create log file")?;
        Ok(FileWriter { writer })
    }
}
