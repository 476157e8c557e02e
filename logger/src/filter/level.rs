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

use crate::filter::Filter;
use crate::filter::FilterResult;
use crate::record::LevelFilter;
use crate::record::Metadata;

impl Filter for LevelFilter {
    fn enabled(&self, metadata: &Metadata) -> FilterResult {
        if self.test(metadata.level()) {
            FilterResult::Neutral
        } else {
            FilterResult::Reject
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Level;

    #[test]
    fn test_level_filter_rejects_more_verbose_records() {
        let filter = LevelFilter::MoreSevereEqual(Level::Info);

        let info = Metadata::builder().level(Level::Info).target("app").build();
        let debug = Metadata::builder().level(Level::Debug).target("app").build();
        let critical = Metadata::builder()
            .level(Level::Critical)
            .target("app")
            .build();

        assert_eq!(filter.enabled(&info), FilterResult::Neutral);
        assert_eq!(filter.enabled(&critical), FilterResult::Neutral);
        assert_eq!(filter.enabled(&debug), FilterResult::Reject);
    }
}
