//! Playback history tracking
//!
//! Bounded record of the tracks that actually played, newest last. Backs the
//! `history` flavour of `previous()` under shuffle.

use std::collections::VecDeque;

/// Playback history with bounded size
///
/// Stores track ids only; the playlist stays the owner of track records.
#[derive(Debug, Clone)]
pub struct History {
    /// History buffer (most recent = back)
    ids: VecDeque<String>,

    /// Maximum history size
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Record a played track
    ///
    /// Oldest entry is discarded when full. Re-pushing the most recent id is
    /// ignored so repeat-one restarts don't flood the history.
    pub fn push(&mut self, id: impl Into<String>) {
        if self.max_size == 0 {
            return;
        }

        let id = id.into();
        if self.ids.back() == Some(&id) {
            return;
        }

        if self.ids.len() >= self.max_size {
            self.ids.pop_front();
        }
        self.ids.push_back(id);
    }

    /// Most recent id without removing it
    pub fn peek(&self) -> Option<&str> {
        self.ids.back().map(String::as_str)
    }

    /// Pop the most recent id
    pub fn pop(&mut self) -> Option<String> {
        self.ids.pop_back()
    }

    /// All ids, oldest first
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Maximum history size
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(50)
    }
}
