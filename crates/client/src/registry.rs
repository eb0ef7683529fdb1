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

//! Breakpoint registry.
//!
//! The registry is the single source of truth for the breakpoints and location
//! log points of a session. It holds at most one [`BreakpointEntry`] per
//! [`LocationKey`] and mirrors every change to the oracle:
//!
//! ```text
//! Absent --set--> Active --set--> Active (replaced) --remove--> Absent
//! ```
//!
//! The local map is updated before remote calls are issued, and a failed
//! remote call does not roll the local entry back.

use std::{collections::HashMap, sync::Arc};

use itertools::Itertools;
use rewind_common::types::{BreakpointEntry, BreakpointOptions, Location, LocationKey, SourceTarget};
use tracing::debug;

use crate::{LogpointCoordinator, Oracle, OracleError, OracleResult};

/// Location → entry map kept in sync with the oracle.
#[derive(Debug)]
pub struct BreakpointRegistry<O> {
    oracle: Arc<O>,
    logpoints: LogpointCoordinator<O>,
    entries: HashMap<LocationKey, BreakpointEntry>,
}

impl<O: Oracle> BreakpointRegistry<O> {
    /// Creates an empty registry.
    pub fn new(oracle: Arc<O>) -> Self {
        Self { logpoints: LogpointCoordinator::new(oracle.clone()), oracle, entries: HashMap::new() }
    }

    /// Creates or replaces the entry at `location`.
    ///
    /// A caller-supplied `log_group_id` is discarded; a fresh group is allocated
    /// whenever the options carry a log expression and are enabled. Returns once
    /// every issued oracle call is acknowledged.
    pub async fn set_breakpoint(
        &mut self,
        location: Location,
        mut options: BreakpointOptions,
    ) -> OracleResult<()> {
        if location.target().is_none() {
            return Err(OracleError::UnresolvedLocation(location.key()));
        }

        let key = location.key();
        let previous = self.entries.get(&key).cloned();
        if let Some(previous) = &previous {
            self.logpoints.clear_location_log_group(previous).await?;
        }

        options.log_group_id = (options.log_value.is_some() && !options.disabled)
            .then(|| self.logpoints.create_location_log_group());

        let entry = BreakpointEntry { location, options };
        debug!("Setting breakpoint {}", entry);
        self.entries.insert(key, entry.clone());

        let BreakpointEntry { location, options } = entry;
        let oracle = &*self.oracle;
        let was_pausing = previous.is_some_and(|entry| entry.options.is_pausing());
        let condition = options.condition.as_deref();

        let pause = async {
            if options.is_pausing() {
                set_pause_breakpoint(oracle, &location, condition).await
            } else if was_pausing {
                remove_pause_breakpoint(oracle, &location).await
            } else {
                Ok(())
            }
        };

        let log = async {
            match (&options.log_group_id, &options.log_value) {
                (Some(group_id), Some(expression)) if options.is_logging() => {
                    oracle.set_logpoint(group_id, &location, expression, condition).await
                }
                _ => Ok(()),
            }
        };

        futures::try_join!(pause, log)?;
        Ok(())
    }

    /// Removes the entry at `location`, if any.
    pub async fn remove_breakpoint(&mut self, location: &Location) -> OracleResult<()> {
        let key = location.key();
        let Some(entry) = self.entries.get(&key).cloned() else {
            debug!("No breakpoint at {}, nothing to remove", location);
            return Ok(());
        };

        self.logpoints.clear_location_log_group(&entry).await?;
        self.entries.remove(&key);

        debug!("Removing breakpoint at {}", location);
        remove_pause_breakpoint(&*self.oracle, &entry.location).await
    }

    /// Removes the entry at `location` if present, otherwise sets it.
    ///
    /// Returns whether a breakpoint exists afterwards.
    pub async fn toggle_breakpoint(
        &mut self,
        location: Location,
        options: BreakpointOptions,
    ) -> OracleResult<bool> {
        if self.has_breakpoint(&location) {
            self.remove_breakpoint(&location).await?;
            Ok(false)
        } else {
            self.set_breakpoint(location, options).await?;
            Ok(true)
        }
    }

    /// Re-sets the entry at `location` with its `disabled` flag changed.
    ///
    /// Returns `false` when there is no entry at `location`.
    pub async fn set_breakpoint_disabled(
        &mut self,
        location: &Location,
        disabled: bool,
    ) -> OracleResult<bool> {
        let Some(entry) = self.entries.get(&location.key()).cloned() else {
            return Ok(false);
        };
        let options = BreakpointOptions { disabled, ..entry.options };
        self.set_breakpoint(entry.location, options).await?;
        Ok(true)
    }

    /// Whether an entry exists at `location`.
    pub fn has_breakpoint(&self, location: &Location) -> bool {
        self.entries.contains_key(&location.key())
    }

    /// The entry at `location`.
    pub fn get(&self, location: &Location) -> Option<&BreakpointEntry> {
        self.entries.get(&location.key())
    }

    /// All entries, ordered by source, then line and column.
    pub fn entries(&self) -> Vec<&BreakpointEntry> {
        self.entries
            .values()
            .sorted_by(|a, b| listing_order(&a.location).cmp(&listing_order(&b.location)))
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The log group coordinator.
    pub fn logpoints(&self) -> &LogpointCoordinator<O> {
        &self.logpoints
    }

    /// The log group coordinator, mutably.
    pub fn logpoints_mut(&mut self) -> &mut LogpointCoordinator<O> {
        &mut self.logpoints
    }

    /// Drops every entry and singleton log group without contacting the oracle.
    pub fn reset(&mut self) {
        debug!("Resetting breakpoint registry ({} entries)", self.entries.len());
        self.entries.clear();
        self.logpoints.reset();
    }
}

fn listing_order(location: &Location) -> (Option<&str>, Option<&str>, u32, Option<u32>) {
    (location.source_url.as_deref(), location.source_id.as_deref(), location.line, location.column)
}

async fn set_pause_breakpoint<O: Oracle>(
    oracle: &O,
    location: &Location,
    condition: Option<&str>,
) -> OracleResult<()> {
    match location.target() {
        Some(SourceTarget::SourceId(id)) => {
            oracle.set_breakpoint_by_source_id(id, location.line, location.column, condition).await
        }
        Some(SourceTarget::Url(url)) => {
            oracle.set_breakpoint_by_url(url, location.line, location.column, condition).await
        }
        None => Err(OracleError::UnresolvedLocation(location.key())),
    }
}

async fn remove_pause_breakpoint<O: Oracle>(oracle: &O, location: &Location) -> OracleResult<()> {
    match location.target() {
        Some(SourceTarget::SourceId(id)) => {
            oracle.remove_breakpoint_by_source_id(id, location.line, location.column).await
        }
        Some(SourceTarget::Url(url)) => {
            oracle.remove_breakpoint_by_url(url, location.line, location.column).await
        }
        None => Err(OracleError::UnresolvedLocation(location.key())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockOracle, OracleCall};

    #[tokio::test]
    async fn test_unresolved_location_is_rejected() {
        let oracle = Arc::new(MockOracle::new());
        let mut registry = BreakpointRegistry::new(oracle.clone());
        let location = Location { line: 3, ..Default::default() };

        let err = registry.set_breakpoint(location.clone(), BreakpointOptions::pause()).await;
        assert!(matches!(err, Err(OracleError::UnresolvedLocation(_))));
        assert!(!registry.has_breakpoint(&location));
        assert!(oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn test_source_id_wins_over_url() {
        let oracle = Arc::new(MockOracle::new());
        let mut registry = BreakpointRegistry::new(oracle.clone());
        let location = Location {
            source_id: Some("s1".to_string()),
            source_url: Some("app.js".to_string()),
            line: 4,
            column: Some(2),
        };

        registry.set_breakpoint(location.clone(), BreakpointOptions::pause()).await.unwrap();
        assert_eq!(
            oracle.calls(),
            vec![OracleCall::SetBreakpointBySourceId {
                source_id: "s1".to_string(),
                line: 4,
                column: Some(2),
                condition: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_entries_are_sorted_by_source_then_line() {
        let oracle = Arc::new(MockOracle::new());
        let mut registry = BreakpointRegistry::new(oracle);
        for line in [30, 9, 20] {
            let location = Location::by_url("b.js", line, None);
            registry.set_breakpoint(location, BreakpointOptions::pause()).await.unwrap();
        }
        let location = Location::by_url("a.js", 99, None);
        registry.set_breakpoint(location, BreakpointOptions::pause()).await.unwrap();

        let lines: Vec<_> = registry
            .entries()
            .iter()
            .map(|entry| (entry.location.source_url.clone().unwrap(), entry.location.line))
            .collect();
        assert_eq!(
            lines,
            vec![
                ("a.js".to_string(), 99),
                ("b.js".to_string(), 9),
                ("b.js".to_string(), 20),
                ("b.js".to_string(), 30),
            ]
        );
        assert_eq!(registry.len(), 4);
    }
}
