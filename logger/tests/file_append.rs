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

use logger::Level;
use logger::append::FileBuilder;
use logger::layout::LogPatterns;
use logger::layout::PatternLayout;

#[test]
fn test_file_append_drains_on_guard_drop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    let mut patterns = LogPatterns::default();
    patterns.set(Level::Trace, "%l %n %v".parse().unwrap());

    let (file, guard) = FileBuilder::new(&path)
        .layout(PatternLayout::new(patterns))
        .build()
        .unwrap();

    let logger = logger::builder()
        .tag("app/io")
        .dispatch(|d| d.append(file))
        .build();

    logger.info("first");
    logger.warn("second");
    drop(logger);
    drop(guard);

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "INFO app/io first\nWARN app/io second\n");
}

#[test]
fn test_file_clones_share_one_writer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.log");

    let mut plain = LogPatterns::default();
    plain.set(Level::Trace, "%v".parse().unwrap());
    let mut leveled = LogPatterns::default();
    leveled.set(Level::Trace, "%l %v".parse().unwrap());

    let (file, guard) = FileBuilder::new(&path)
        .layout(PatternLayout::new(plain))
        .build()
        .unwrap();
    let second = file.clone_with_layout(PatternLayout::new(leveled));

    let first = logger::builder().dispatch(|d| d.append(file)).build();
    let second = logger::builder().dispatch(|d| d.append(second)).build();

    first.info("one");
    second.info("two");
    drop((first, second));
    drop(guard);

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "one\nINFO two\n");
}
