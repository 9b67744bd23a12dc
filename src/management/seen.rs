use std::collections::HashSet;

use crate::types::PlaylistItem;

/// Ids of the tracks already in the managed playlist.
///
/// Rebuilt from a fresh playlist listing at the start of every cycle and
/// extended as the cycle appends tracks. Lives only in memory.
#[derive(Debug, Default, Clone)]
pub struct SeenTracks {
    ids: HashSet<String>,
}

impl SeenTracks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole set with the ids found in `items`.
    ///
    /// Entries without a track or without an id (local files) are ignored.
    pub fn reseed(&mut self, items: &[PlaylistItem]) -> &mut Self {
        self.ids = items
            .iter()
            .filter_map(|item| item.track.as_ref().and_then(|t| t.id.clone()))
            .collect();
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Marks `id` as seen. Returns `false` if it already was.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Forgets `id`, used to roll back an insert whose append failed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SeenTracks {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
