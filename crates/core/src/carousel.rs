//! Wrap-around index over a list of images.

use serde::Serialize;

/// Current position in an image carousel.
///
/// Navigation wraps in both directions. An empty carousel always sits at
/// index zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Carousel {
    index: usize,
    len: usize,
}

impl Carousel {
    /// A carousel of `len` images positioned at `index` (clamped into range).
    #[must_use]
    pub const fn new(len: usize, index: usize) -> Self {
        let index = if len == 0 {
            0
        } else if index >= len {
            len - 1
        } else {
            index
        };
        Self { index, len }
    }

    /// Start at the first entry equal to `current`, or at zero if absent.
    #[must_use]
    pub fn starting_at<T: PartialEq>(items: &[T], current: &T) -> Self {
        let index = items.iter().position(|item| item == current).unwrap_or(0);
        Self::new(items.len(), index)
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `(i + 1) % n`
    #[must_use]
    pub const fn next(self) -> Self {
        if self.len == 0 {
            return self;
        }
        Self {
            index: (self.index + 1) % self.len,
            len: self.len,
        }
    }

    /// `(i - 1 + n) % n`
    #[must_use]
    pub const fn prev(self) -> Self {
        if self.len == 0 {
            return self;
        }
        Self {
            index: (self.index + self.len - 1) % self.len,
            len: self.len,
        }
    }

    /// Index reached by `next()`, for building links.
    #[must_use]
    pub const fn next_index(&self) -> usize {
        self.next().index
    }

    /// Index reached by `prev()`, for building links.
    #[must_use]
    pub const fn prev_index(&self) -> usize {
        self.prev().index
    }

    /// 1-based position for "3 / 7" captions.
    #[must_use]
    pub const fn position(&self) -> usize {
        if self.len == 0 { 0 } else { self.index + 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_wraps_to_start() {
        let mut carousel = Carousel::new(3, 0);
        let mut seen = Vec::new();
        for _ in 0..4 {
            carousel = carousel.next();
            seen.push(carousel.index());
        }
        assert_eq!(seen, vec![1, 2, 0, 1]);
    }

    #[test]
    fn test_prev_wraps_to_end() {
        let carousel = Carousel::new(4, 0).prev();
        assert_eq!(carousel.index(), 3);
        assert_eq!(carousel.prev().index(), 2);
    }

    #[test]
    fn test_empty_carousel_stays_at_zero() {
        let carousel = Carousel::new(0, 5);
        assert_eq!(carousel.next().index(), 0);
        assert_eq!(carousel.prev().index(), 0);
        assert_eq!(carousel.position(), 0);
    }

    #[test]
    fn test_index_is_clamped() {
        assert_eq!(Carousel::new(3, 10).index(), 2);
    }

    #[test]
    fn test_starting_at_unknown_item_is_zero() {
        let urls = ["a.jpg", "b.jpg", "c.jpg"];
        assert_eq!(Carousel::starting_at(&urls, &"c.jpg").index(), 2);
        assert_eq!(Carousel::starting_at(&urls, &"z.jpg").index(), 0);
    }

    #[test]
    fn test_next_then_prev_is_identity() {
        for len in 1..6 {
            for index in 0..len {
                let carousel = Carousel::new(len, index);
                assert_eq!(carousel.next().prev(), carousel);
            }
        }
    }
}
