// Rewind - Time-Travel Debugger Client
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Counts pause/resume transitions of the debuggee.
///
/// Clones share the counter, so an event loop can hold one and advance it
/// while a long computation checks its [`PauseContext`].
#[derive(Debug, Clone, Default)]
pub struct PauseTracker {
    generation: Arc<AtomicU64>,
}

impl PauseTracker {
    /// Creates a tracker at generation zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a transition and returns the context of the new state.
    pub fn advance(&self) -> PauseContext {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        PauseContext { generation, tracker: self.generation.clone() }
    }

    /// Context of the current state.
    pub fn current(&self) -> PauseContext {
        PauseContext {
            generation: self.generation.load(Ordering::SeqCst),
            tracker: self.generation.clone(),
        }
    }
}

/// A snapshot of the pause state a computation started in.
#[derive(Debug, Clone)]
pub struct PauseContext {
    generation: u64,
    tracker: Arc<AtomicU64>,
}

impl PauseContext {
    /// Whether the debuggee is still in the state this context was taken in.
    pub fn is_current(&self) -> bool {
        self.tracker.load(Ordering::SeqCst) == self.generation
    }

    /// Generation number of this context.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_goes_stale_on_advance() {
        let tracker = PauseTracker::new();
        let context = tracker.current();
        assert!(context.is_current());

        let shared = tracker.clone();
        let next = shared.advance();
        assert!(!context.is_current());
        assert!(next.is_current());
        assert_eq!(next.generation(), context.generation() + 1);
        assert!(tracker.current().is_current());
    }
}
