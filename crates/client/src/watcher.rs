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

//! Watch expressions.
//!
//! Each watch keeps the outcome of its last evaluation so a pause can report
//! which values changed since the previous one.

use serde::Serialize;

use crate::EvaluationOutcome;

#[derive(Debug, Clone, PartialEq)]
struct Watch {
    id: usize,
    expression: String,
    key: String,
    last: Option<EvaluationOutcome>,
}

/// Watch expressions of a session, re-evaluated on every pause.
///
/// Ids are handed out once and never reused, so removing a watch leaves the
/// ids of the others untouched. Expressions that only differ in whitespace are
/// the same watch.
#[derive(Debug, Clone, Default)]
pub struct Watcher {
    watches: Vec<Watch>,
    last_id: usize,
}

fn watch_key(expression: &str) -> String {
    expression.split_whitespace().collect()
}

impl Watcher {
    /// Adds an expression and returns its id, or `None` if it is already watched.
    pub fn add(&mut self, expression: impl Into<String>) -> Option<usize> {
        let expression = expression.into();
        let key = watch_key(&expression);
        if self.watches.iter().any(|watch| watch.key == key) {
            return None;
        }

        self.last_id += 1;
        self.watches.push(Watch { id: self.last_id, expression, key, last: None });
        Some(self.last_id)
    }

    /// Removes the watch with the given id.
    pub fn remove(&mut self, id: usize) -> Option<String> {
        let index = self.watches.iter().position(|watch| watch.id == id)?;
        Some(self.watches.remove(index).expression)
    }

    /// Whether an equivalent expression is watched.
    pub fn contains(&self, expression: &str) -> bool {
        let key = watch_key(expression);
        self.watches.iter().any(|watch| watch.key == key)
    }

    /// Watched expressions with their ids, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.watches.iter().map(|watch| (watch.id, watch.expression.as_str()))
    }

    /// Outcome of the last recorded evaluation of watch `id`.
    pub fn last_outcome(&self, id: usize) -> Option<&EvaluationOutcome> {
        self.watches.iter().find(|watch| watch.id == id)?.last.as_ref()
    }

    /// Stores fresh outcomes and reports each one against the previous.
    ///
    /// Outcomes for ids that are no longer watched are dropped.
    pub fn record(
        &mut self,
        outcomes: impl IntoIterator<Item = (usize, EvaluationOutcome)>,
    ) -> Vec<WatchResult> {
        outcomes
            .into_iter()
            .filter_map(|(id, outcome)| {
                let watch = self.watches.iter_mut().find(|watch| watch.id == id)?;
                let changed = watch.last.as_ref().is_some_and(|last| *last != outcome);
                watch.last = Some(outcome.clone());
                Some(WatchResult { id, expression: watch.expression.clone(), outcome, changed })
            })
            .collect()
    }

    /// Drops recorded outcomes, keeping the expressions.
    pub fn forget_outcomes(&mut self) {
        for watch in &mut self.watches {
            watch.last = None;
        }
    }

    /// Number of watched expressions.
    pub fn len(&self) -> usize {
        self.watches.len()
    }

    /// Whether nothing is watched.
    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Removes every watch. Ids are not reused afterwards.
    pub fn clear(&mut self) {
        self.watches.clear();
    }
}

/// Result of evaluating one watch expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchResult {
    /// Id of the watch.
    pub id: usize,
    /// The expression.
    pub expression: String,
    /// What the evaluation produced.
    pub outcome: EvaluationOutcome,
    /// Whether the outcome differs from the previous evaluation.
    pub changed: bool,
}
