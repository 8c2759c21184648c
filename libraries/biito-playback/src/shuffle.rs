//! Shuffle policies for track selection
//!
//! Two strategies:
//! - Random draw: uniform pick over the playlist, never the current track
//! - Permutation: Fisher-Yates order walked front to back, one cycle at a time
//!
//! Both work on indices into the canonical playlist, which is never reordered.

use rand::seq::SliceRandom;
use rand::Rng;

/// Draw a uniformly random index in `[0, len)`, excluding `current` when `len > 1`
///
/// Returns `None` for an empty playlist.
pub fn draw_excluding<R: Rng + ?Sized>(rng: &mut R, len: usize, current: Option<usize>) -> Option<usize> {
    match (len, current) {
        (0, _) => None,
        (1, _) => Some(0),
        (_, Some(current)) if current < len => {
            // Pick among the other len - 1 slots, then skip over `current`
            let pick = rng.gen_range(0..len - 1);
            Some(if pick >= current { pick + 1 } else { pick })
        }
        _ => Some(rng.gen_range(0..len)),
    }
}

/// Shuffled permutation of playlist indices with a cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleOrder {
    order: Vec<usize>,
    cursor: usize,
}

impl ShuffleOrder {
    /// Build a new order over `len` tracks
    ///
    /// When `anchor` is given it is placed first and the cursor points at it,
    /// so the track already playing counts as the start of the cycle.
    pub fn new<R: Rng + ?Sized>(rng: &mut R, len: usize, anchor: Option<usize>) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(rng);

        if let Some(anchor) = anchor.filter(|a| *a < len) {
            if let Some(pos) = order.iter().position(|i| *i == anchor) {
                order.swap(0, pos);
            }
        }

        Self { order, cursor: 0 }
    }

    /// Number of indices in the order
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the order is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Playlist index under the cursor
    pub fn current(&self) -> Option<usize> {
        self.order.get(self.cursor).copied()
    }

    /// Whether the cycle has indices left after the cursor
    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.order.len()
    }

    /// Indices in play order
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Advance the cursor, starting a fresh cycle past the end
    ///
    /// A new cycle never starts with the index that ended the previous one.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }

        if self.has_next() {
            self.cursor += 1;
            return self.current();
        }

        let last = self.order[self.cursor];
        self.order.shuffle(rng);
        if self.order.len() > 1 && self.order[0] == last {
            let swap_with = rng.gen_range(1..self.order.len());
            self.order.swap(0, swap_with);
        }
        self.cursor = 0;
        self.current()
    }

    /// Step the cursor back, wrapping to the end of the cycle
    pub fn retreat(&mut self) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }

        self.cursor = if self.cursor == 0 {
            self.order.len() - 1
        } else {
            self.cursor - 1
        };
        self.current()
    }

    /// Move the cursor onto `index` (after a manual jump)
    pub fn seek_to(&mut self, index: usize) {
        if let Some(pos) = self.order.iter().position(|i| *i == index) {
            self.cursor = pos;
        }
    }
}
