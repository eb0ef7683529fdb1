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

//! Log group lifecycle.
//!
//! Two log groups are singletons: the one recording event listener calls and the
//! one recording thrown exceptions. Each has at most one live id; enabling a
//! singleton always removes the previous id from the oracle first. Location log
//! points get a fresh group per breakpoint entry, owned by the registry.

use std::sync::Arc;

use rewind_common::types::{BreakpointEntry, LogGroup, LogGroupId, LogGroupScope};
use tracing::debug;

use crate::{Oracle, OracleResult};

/// Owns the singleton log groups and allocates location log group ids.
#[derive(Debug)]
pub struct LogpointCoordinator<O> {
    oracle: Arc<O>,
    event_group: Option<LogGroupId>,
    exception_group: Option<LogGroupId>,
    next_group: u64,
}

impl<O: Oracle> LogpointCoordinator<O> {
    /// Creates a coordinator with no live groups.
    pub fn new(oracle: Arc<O>) -> Self {
        Self { oracle, event_group: None, exception_group: None, next_group: 0 }
    }

    /// Replaces the event listener log group.
    ///
    /// The previous group is removed from the oracle before a new one is created
    /// for exactly `event_ids`; an empty list leaves no group behind.
    pub async fn set_event_breakpoints(&mut self, event_ids: &[String]) -> OracleResult<()> {
        if let Some(previous) = &self.event_group {
            debug!("Removing event log group {}", previous);
            self.oracle.remove_logpoint(previous).await?;
            self.event_group = None;
        }

        if !event_ids.is_empty() {
            let group_id = self.allocate_group_id("event");
            debug!("Creating event log group {} for {:?}", group_id, event_ids);
            self.oracle.set_event_logpoint(&group_id, event_ids).await?;
            self.event_group = Some(group_id);
        }

        self.oracle.set_active_event_breakpoints(event_ids).await
    }

    /// Turns logging of every thrown exception on or off.
    pub async fn set_exception_logging(&mut self, enabled: bool) -> OracleResult<()> {
        if let Some(previous) = &self.exception_group {
            debug!("Removing exception log group {}", previous);
            self.oracle.remove_logpoint(previous).await?;
            self.exception_group = None;
        }

        if enabled {
            let group_id = self.allocate_group_id("exception");
            debug!("Creating exception log group {}", group_id);
            self.oracle.set_exception_logpoint(&group_id).await?;
            self.exception_group = Some(group_id);
        }

        Ok(())
    }

    /// Allocates a fresh id for a location log point.
    pub fn create_location_log_group(&mut self) -> LogGroupId {
        self.allocate_group_id("location")
    }

    /// Removes the entry's log group from the oracle, if it has one.
    pub async fn clear_location_log_group(&self, entry: &BreakpointEntry) -> OracleResult<()> {
        if let Some(group_id) = &entry.options.log_group_id {
            debug!("Clearing log group {} at {}", group_id, entry.location);
            self.oracle.remove_logpoint(group_id).await?;
        }
        Ok(())
    }

    /// The live event listener group.
    pub fn event_group(&self) -> Option<LogGroup> {
        self.event_group
            .clone()
            .map(|id| LogGroup { id, scope: LogGroupScope::Event })
    }

    /// The live exception group.
    pub fn exception_group(&self) -> Option<LogGroup> {
        self.exception_group
            .clone()
            .map(|id| LogGroup { id, scope: LogGroupScope::Exception })
    }

    /// Forgets the singleton groups without talking to the oracle.
    pub fn reset(&mut self) {
        self.event_group = None;
        self.exception_group = None;
    }

    // Sequence number keeps ids unique in this session, the random part across sessions
    fn allocate_group_id(&mut self, prefix: &str) -> LogGroupId {
        self.next_group += 1;
        LogGroupId(format!("{prefix}-{}-{:08x}", self.next_group, rand::random::<u32>()))
    }
}
