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

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::types::Location;

/// Identifier of a log group registered with the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogGroupId(pub String);

impl LogGroupId {
    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LogGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a log group is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogGroupScope {
    /// A log point at a single source location.
    Location,
    /// The singleton group logging event listener invocations.
    Event,
    /// The singleton group logging thrown exceptions.
    Exception,
}

/// A log group known to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogGroup {
    /// Oracle-side id of the group.
    pub id: LogGroupId,
    /// What the group is attached to.
    pub scope: LogGroupScope,
}

/// User-facing options of a breakpoint or log point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointOptions {
    /// Optional condition expression that must evaluate to true for the breakpoint to trigger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Whether execution pauses when the location is reached.
    #[serde(default)]
    pub should_pause: bool,
    /// Whether the location logs `log_value` when reached.
    #[serde(default)]
    pub should_log: bool,
    /// Expression logged each time the location is reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_value: Option<String>,
    /// Log group allocated by the registry; never supplied by callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_group_id: Option<LogGroupId>,
    /// Disabled entries are remembered but have no remote counterpart.
    #[serde(default)]
    pub disabled: bool,
}

impl BreakpointOptions {
    /// Options of a plain pausing breakpoint.
    pub fn pause() -> Self {
        Self { should_pause: true, ..Default::default() }
    }

    /// Options of a log point that does not pause.
    pub fn log(expression: impl Into<String>) -> Self {
        Self { should_log: true, log_value: Some(expression.into()), ..Default::default() }
    }

    /// Adds a condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Whether this entry has a remote log point.
    pub fn is_logging(&self) -> bool {
        self.should_log && self.log_group_id.is_some() && self.log_value.is_some()
    }

    /// Whether this entry has a remote pause breakpoint.
    pub fn is_pausing(&self) -> bool {
        self.should_pause && !self.disabled
    }
}

/// The registry's record for one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointEntry {
    /// Where the breakpoint is set.
    pub location: Location,
    /// How it behaves.
    pub options: BreakpointOptions,
}

impl Display for BreakpointEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.location)?;
        if let Some(cond) = &self.options.condition {
            write!(f, " if {cond}")?;
        }
        if self.options.should_log {
            if let Some(value) = &self.options.log_value {
                write!(f, " log {value}")?;
            }
        }
        if self.options.disabled {
            write!(f, " (disabled)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_wire_format() {
        let options: BreakpointOptions =
            serde_json::from_str(r#"{"shouldPause":true,"condition":"x > 1"}"#).unwrap();
        assert_eq!(options, BreakpointOptions::pause().with_condition("x > 1"));
        assert!(!options.should_log);
        assert!(!options.disabled);
    }

    #[test]
    fn test_is_logging_requires_group() {
        let mut options = BreakpointOptions::log("x");
        assert!(!options.is_logging());
        options.log_group_id = Some(LogGroupId("g1".to_string()));
        assert!(options.is_logging());
        options.should_log = false;
        assert!(!options.is_logging());
    }

    #[test]
    fn test_entry_display() {
        let entry = BreakpointEntry {
            location: Location::by_url("app.js", 3, None),
            options: BreakpointOptions::log("count").with_condition("count > 2"),
        };
        assert_eq!(entry.to_string(), "@app.js:3 if count > 2 log count");

        let entry = BreakpointEntry {
            location: Location::by_source_id("s1", 9, Some(1)),
            options: BreakpointOptions { disabled: true, ..BreakpointOptions::pause() },
        };
        assert_eq!(entry.to_string(), "@#s1:9:1 (disabled)");
    }
}
