// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Step index state machine.

/// Direction of a navigation request, used to pick which callbacks fire.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// An explicit jump to an index.
    Jump,
    /// One step forward.
    Next,
    /// One step back.
    Prev,
}

/// A committed index change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    /// Index before the move.
    pub from: usize,
    /// Index after clamping.
    pub to: usize,
    /// What was requested.
    pub direction: Direction,
}

/// Current, previous, and last-resolvable step indices.
///
/// Indices are clamped into `[0, len - 1]` on every change, so out-of-range
/// requests are never errors. Moving past either end is a no-op that still
/// reports a [`Move`] with `from == to`.
///
/// With "wait for element" enabled, [`visible_index`](Self::visible_index)
/// stays on the last index whose target was confirmed to exist until the newly
/// requested step's target shows up (see [`settle`](Self::settle)).
///
/// ```rust
/// use understory_tour::Navigator;
///
/// let mut nav = Navigator::new(3, 0);
/// nav.next();
/// nav.next();
/// nav.next();
/// assert_eq!(nav.current(), 2);
/// nav.goto(usize::MAX);
/// assert_eq!(nav.current(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigator {
    len: usize,
    current: usize,
    previous: usize,
    last_resolvable: usize,
}

impl Navigator {
    /// Create a navigator over `len` steps starting at `start` (clamped).
    pub fn new(len: usize, start: usize) -> Self {
        let start = clamp_index(start, len);
        Self {
            len,
            current: start,
            previous: start,
            last_resolvable: start,
        }
    }

    /// Number of steps.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no steps.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The most recently requested index.
    pub const fn current(&self) -> usize {
        self.current
    }

    /// The index before the last move.
    pub const fn previous(&self) -> usize {
        self.previous
    }

    /// The most recent index whose target was confirmed to exist.
    pub const fn last_resolvable(&self) -> usize {
        self.last_resolvable
    }

    /// Clamp `index` into the valid range.
    pub const fn clamp(&self, index: usize) -> usize {
        clamp_index(index, self.len)
    }

    /// Jump to `index`.
    pub fn goto(&mut self, index: usize) -> Move {
        self.commit(self.clamp(index), Direction::Jump)
    }

    /// Step forward, stopping at the last index.
    pub fn next(&mut self) -> Move {
        self.commit(self.clamp(self.current.saturating_add(1)), Direction::Next)
    }

    /// Step back, stopping at index 0.
    pub fn prev(&mut self) -> Move {
        self.commit(self.current.saturating_sub(1), Direction::Prev)
    }

    /// Record whether the current step's target resolves.
    ///
    /// A resolvable current index becomes the new last-resolvable index.
    pub fn settle(&mut self, resolvable: bool) {
        if resolvable {
            self.last_resolvable = self.current;
        }
    }

    /// Index to report to the outside world.
    ///
    /// This is the current index, unless `wait_for_element` is set and the
    /// current target has not been confirmed yet.
    pub const fn visible_index(&self, wait_for_element: bool) -> usize {
        if wait_for_element {
            self.last_resolvable
        } else {
            self.current
        }
    }

    /// Change the number of steps, clamping every stored index.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.current = self.clamp(self.current);
        self.previous = self.clamp(self.previous);
        self.last_resolvable = self.clamp(self.last_resolvable);
    }

    fn commit(&mut self, to: usize, direction: Direction) -> Move {
        let from = self.current;
        self.previous = from;
        self.current = to;
        Move {
            from,
            to,
            direction,
        }
    }
}

const fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if index >= len {
        len - 1
    } else {
        index
    }
}
