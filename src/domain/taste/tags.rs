//! Bounded, deduplicated tag sets (`avoids` / `influences`).

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default capacity of a tag set.
pub const DEFAULT_MAX_TAGS: usize = 32;

/// Normalizes a tag for storage and comparison.
///
/// Returns `None` for tags that are blank after trimming.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_lowercase())
    }
}

/// Insertion-ordered set of tags capped at a fixed length.
///
/// Oldest entries are evicted on overflow. Re-inserting a tag that is
/// already present moves it to the newest position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TagSetRecord", into = "TagSetRecord")]
pub struct TagSet {
    tags: VecDeque<String>,
    capacity: usize,
}

#[derive(Serialize, Deserialize)]
struct TagSetRecord {
    #[serde(default = "default_capacity")]
    capacity: usize,
    #[serde(default)]
    tags: Vec<String>,
}

fn default_capacity() -> usize {
    DEFAULT_MAX_TAGS
}

impl From<TagSetRecord> for TagSet {
    fn from(record: TagSetRecord) -> Self {
        let mut set = TagSet::new(record.capacity);
        set.extend(record.tags.iter().map(String::as_str));
        set
    }
}

impl From<TagSet> for TagSetRecord {
    fn from(set: TagSet) -> Self {
        TagSetRecord {
            capacity: set.capacity,
            tags: set.tags.into_iter().collect(),
        }
    }
}

impl TagSet {
    /// Creates an empty set. A zero capacity is raised to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            tags: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Inserts a tag. Returns true if the tag was not present before.
    pub fn insert(&mut self, tag: &str) -> bool {
        let Some(tag) = normalize_tag(tag) else {
            return false;
        };

        let newly_added = match self.tags.iter().position(|t| *t == tag) {
            Some(pos) => {
                self.tags.remove(pos);
                false
            }
            None => true,
        };
        self.tags.push_back(tag);

        while self.tags.len() > self.capacity {
            self.tags.pop_front();
        }
        newly_added
    }

    pub fn extend<'a>(&mut self, tags: impl IntoIterator<Item = &'a str>) {
        for tag in tags {
            self.insert(tag);
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        match normalize_tag(tag) {
            Some(tag) => self.tags.iter().any(|t| *t == tag),
            None => false,
        }
    }

    /// Iterates oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for TagSet {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TAGS)
    }
}
