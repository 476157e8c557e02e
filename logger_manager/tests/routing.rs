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

use std::sync::Arc;
use std::sync::Mutex;

use logger::Append;
use logger::Record;
use logger_manager::TreeConfig;

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

// The global logger can be installed only once per process, so a single test
// covers routing, inheritance, and per-node levels.
#[test]
fn test_tree_routes_facade_records() {
    let capture = Capture::default();
    let lines = capture.lines();

    let tree = TreeConfig::from_json(
        r#"{
            "level": "info",
            "children": {
                "net": {"level": "debug", "children": {"http": {}}},
                "db": {"level": "warn"}
            }
        }"#,
    )
    .unwrap();
    let (manager, guards) = logger_manager::builder()
        .append(capture)
        .tree_config(tree)
        .build()
        .unwrap();
    manager.apply();

    // net runs at debug; net/http inherits it and catches deeper targets
    log::debug!(target: "net", "connecting");
    log::debug!(target: "net/http/h2", "frame received");

    // db runs at warn
    log::info!(target: "db", "query planned");
    log::error!(target: "db", "query failed");

    // unknown targets fall back to the root at info
    log::debug!(target: "other", "not for the root");
    log::warn!(target: "other/deep", "rebalancing");

    log::logger().flush();
    drop(guards);

    let lines = lines.lock().unwrap();
    assert_eq!(
        lines.as_slice(),
        [
            "net DEBUG connecting",
            "net/http/h2 DEBUG frame received",
            "db ERROR query failed",
            "other/deep WARN rebalancing",
        ]
    );
}
