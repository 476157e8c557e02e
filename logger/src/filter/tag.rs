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

use std::borrow::Cow;

use crate::filter::Filter;
use crate::filter::FilterResult;
use crate::record::LevelFilter;
use crate::record::Metadata;

/// A filter that applies a level condition to records from a tag subtree.
///
/// A record belongs to the subtree when its tag starts with the configured
/// tag. Records outside the subtree are not judged by this filter.
#[derive(Debug, Clone)]
pub struct TagFilter {
    tag: Cow<'static, str>,
    level: LevelFilter,
    not: bool,
}

impl TagFilter {
    /// The filter will be applied only if the record's tag **has** a prefix
    /// that matches `tag`.
    pub fn level_for(tag: impl Into<Cow<'static, str>>, level: LevelFilter) -> Self {
        TagFilter {
            tag: tag.into(),
            level,
            not: false,
        }
    }

    /// The filter will be applied only if the record's tag **does not have** a
    /// prefix that matches `tag`.
    pub fn level_for_not(tag: impl Into<Cow<'static, str>>, level: LevelFilter) -> Self {
        TagFilter {
            tag: tag.into(),
            level,
            not: true,
        }
    }
}

impl Filter for TagFilter {
    fn enabled(&self, metadata: &Metadata) -> FilterResult {
        let matched = metadata.target().starts_with(self.tag.as_ref());
        if (matched && !self.not) || (!matched && self.not) {
            if self.level.test(metadata.level()) {
                FilterResult::Neutral
            } else {
                FilterResult::Reject
            }
        } else {
            FilterResult::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Level;

    fn metadata(level: Level, target: &str) -> Metadata<'_> {
        Metadata::builder().level(level).target(target).build()
    }

    #[test]
    fn test_tag_filter_scopes_level_to_subtree() {
        let filter = TagFilter::level_for("app/net", LevelFilter::MoreSevereEqual(Level::Warn));

        assert_eq!(
            filter.enabled(&metadata(Level::Warn, "app/net/io")),
            FilterResult::Neutral
        );
        assert_eq!(
            filter.enabled(&metadata(Level::Info, "app/net/io")),
            FilterResult::Reject
        );
        // other subtrees are not judged
        assert_eq!(
            filter.enabled(&metadata(Level::Trace, "app/db")),
            FilterResult::Neutral
        );
    }

    #[test]
    fn test_tag_filter_not_inverts_the_subtree() {
        let filter = TagFilter::level_for_not("app/net", LevelFilter::MoreSevereEqual(Level::Warn));

        assert_eq!(
            filter.enabled(&metadata(Level::Trace, "app/net/io")),
            FilterResult::Neutral
        );
        assert_eq!(
            filter.enabled(&metadata(Level::Info, "app/db")),
            FilterResult::Reject
        );
    }
}
