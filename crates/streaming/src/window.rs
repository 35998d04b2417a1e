//! Fixed-size index windows around an active position.
//!
//! Indices are 1-based. Window `k` of size `W` covers `[k·W + 1, (k+1)·W]`,
//! clipped to the collection count when it is known.

use foundation::ids::RegionId;

pub const DEFAULT_WINDOW_SIZE: u64 = 100;

/// Closed index range `[start, end]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RangeKey {
    pub start: RegionId,
    pub end: RegionId,
}

impl RangeKey {
    pub fn new(start: RegionId, end: RegionId) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, id: RegionId) -> bool {
        self.start <= id && id <= self.end
    }

    pub fn len(&self) -> u64 {
        self.end + 1 - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl std::fmt::Display for RangeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// `floor((index - 1) / size)`; index 0 is treated as 1.
pub fn range_index(index: RegionId, size: u64) -> u64 {
    index.saturating_sub(1) / size.max(1)
}

/// The window with the given range index, clipped to `count`.
///
/// `None` if the window starts past the end of the collection.
pub fn range_for(range_index: u64, size: u64, count: u64) -> Option<RangeKey> {
    let size = size.max(1);
    let start = range_index.checked_mul(size)?.checked_add(1)?;
    if start > count {
        return None;
    }
    let end = (start + size - 1).min(count);
    Some(RangeKey::new(start, end))
}

/// Which neighbour of the active position a window is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WindowSlot {
    Current,
    Next,
    Previous,
}

/// The (up to) three windows kept around an active index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct WindowSet {
    pub previous: Option<RangeKey>,
    pub current: Option<RangeKey>,
    pub next: Option<RangeKey>,
}

impl WindowSet {
    pub fn around(index: RegionId, size: u64, count: u64) -> Self {
        let k = range_index(index, size);
        Self {
            previous: k.checked_sub(1).and_then(|p| range_for(p, size, count)),
            current: range_for(k, size, count),
            next: k.checked_add(1).and_then(|n| range_for(n, size, count)),
        }
    }

    /// Present windows in fetch priority order: current, next, previous.
    pub fn by_priority(&self) -> impl Iterator<Item = (WindowSlot, RangeKey)> {
        [
            (WindowSlot::Current, self.current),
            (WindowSlot::Next, self.next),
            (WindowSlot::Previous, self.previous),
        ]
        .into_iter()
        .filter_map(|(slot, key)| key.map(|k| (slot, k)))
    }

    pub fn contains(&self, key: &RangeKey) -> bool {
        self.by_priority().any(|(_, k)| k == *key)
    }

    pub fn is_empty(&self) -> bool {
        self.by_priority().next().is_none()
    }
}
