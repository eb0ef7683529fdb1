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

use crate::types::{Location, ValueHandle};

/// Oracle id of a stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub String);

impl Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stack frame of the paused debuggee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Frame id.
    pub id: FrameId,
    /// Name of the executing function, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// The frame's `this` value.
    #[serde(default, rename = "this", skip_serializing_if = "Option::is_none")]
    pub this_value: Option<ValueHandle>,
    /// Where the frame is executing.
    pub location: Location,
}

impl Frame {
    /// Creates a frame without `this`.
    pub fn new(id: impl Into<String>, location: Location) -> Self {
        Self { id: FrameId(id.into()), function_name: None, this_value: None, location }
    }
}

/// Completion value of a frame that was popped by the step that caused the pause.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameFinished {
    /// Returned value.
    #[serde(default, rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_value: Option<ValueHandle>,
    /// Thrown value. Falsy values still count as thrown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throw: Option<ValueHandle>,
}

/// Why the debuggee is paused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseReason {
    /// Free-form reason kind reported by the oracle, e.g. `breakpoint` or `resumeLimit`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Present when the pause follows a completed call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_finished: Option<FrameFinished>,
}

impl PauseReason {
    /// A pause that follows a return with `value`.
    pub fn returned(value: ValueHandle) -> Self {
        Self {
            kind: Some("resumeLimit".to_string()),
            frame_finished: Some(FrameFinished { return_value: Some(value), throw: None }),
        }
    }

    /// A pause that follows a throw of `value`.
    pub fn thrown(value: ValueHandle) -> Self {
        Self {
            kind: Some("resumeLimit".to_string()),
            frame_finished: Some(FrameFinished { return_value: None, throw: Some(value) }),
        }
    }
}
