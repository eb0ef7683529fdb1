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

//! Interfaces of the external collaborators.
//!
//! - [`Oracle`]: the remote replay service that owns the paused execution and
//!   fulfills breakpoint, logpoint, scope and evaluation requests
//! - [`SourceAnalyzer`]: the syntax service that supplies static scope and
//!   reference data for a source location
//!
//! [`crate::RpcClient`] implements both over JSON-RPC; [`crate::test_utils`]
//! provides recording doubles.

use std::future::Future;

use eyre::Result;
use rewind_common::types::{
    Frame, FrameId, Location, LogGroupId, ObjectRef, Property, RawScope, StaticScope, ValueHandle,
};
use serde::{Deserialize, Serialize};

use crate::OracleResult;

/// Raw response of an evaluation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluateResponse {
    /// Value of the expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ValueHandle>,
    /// Value thrown by the debuggee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<ValueHandle>,
    /// The evaluation itself could not be carried out.
    #[serde(default)]
    pub failed: bool,
}

/// Text of the placeholder exception used for failed evaluations.
pub const EVALUATION_FAILED: &str = "Evaluation failed";

/// Outcome of evaluating an expression in a paused frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EvaluationOutcome {
    /// The expression produced a value.
    Value(ValueHandle),
    /// The debuggee threw, or the evaluation failed (placeholder value).
    Exception(ValueHandle),
}

impl From<EvaluateResponse> for EvaluationOutcome {
    fn from(response: EvaluateResponse) -> Self {
        if response.failed {
            return Self::Exception(ValueHandle::string(EVALUATION_FAILED));
        }
        match (response.exception, response.result) {
            (Some(exception), _) => Self::Exception(exception),
            (None, Some(result)) => Self::Value(result),
            (None, None) => Self::Value(ValueHandle::undefined()),
        }
    }
}

/// The remote debugging/replay service.
///
/// Every method is a request/response exchange; callers suspend until the
/// acknowledgement arrives.
pub trait Oracle {
    /// Sets a pause breakpoint in the source with the given id.
    fn set_breakpoint_by_source_id(
        &self,
        source_id: &str,
        line: u32,
        column: Option<u32>,
        condition: Option<&str>,
    ) -> impl Future<Output = OracleResult<()>> + Send;

    /// Sets a pause breakpoint in every source loaded from `url`.
    fn set_breakpoint_by_url(
        &self,
        url: &str,
        line: u32,
        column: Option<u32>,
        condition: Option<&str>,
    ) -> impl Future<Output = OracleResult<()>> + Send;

    /// Removes a pause breakpoint set by source id.
    fn remove_breakpoint_by_source_id(
        &self,
        source_id: &str,
        line: u32,
        column: Option<u32>,
    ) -> impl Future<Output = OracleResult<()>> + Send;

    /// Removes a pause breakpoint set by URL.
    fn remove_breakpoint_by_url(
        &self,
        url: &str,
        line: u32,
        column: Option<u32>,
    ) -> impl Future<Output = OracleResult<()>> + Send;

    /// Registers a log point belonging to `group_id`.
    fn set_logpoint(
        &self,
        group_id: &LogGroupId,
        location: &Location,
        expression: &str,
        condition: Option<&str>,
    ) -> impl Future<Output = OracleResult<()>> + Send;

    /// Removes every log point of a group.
    fn remove_logpoint(&self, group_id: &LogGroupId)
        -> impl Future<Output = OracleResult<()>> + Send;

    /// Replaces the set of event ids execution pauses on.
    fn set_active_event_breakpoints(
        &self,
        event_ids: &[String],
    ) -> impl Future<Output = OracleResult<()>> + Send;

    /// Registers a log group recording invocations of the given event listeners.
    fn set_event_logpoint(
        &self,
        group_id: &LogGroupId,
        event_ids: &[String],
    ) -> impl Future<Output = OracleResult<()>> + Send;

    /// Registers a log group recording every thrown exception.
    fn set_exception_logpoint(
        &self,
        group_id: &LogGroupId,
    ) -> impl Future<Output = OracleResult<()>> + Send;

    /// Scopes of a frame, innermost first.
    fn get_frame_scopes(
        &self,
        frame: &FrameId,
    ) -> impl Future<Output = OracleResult<Vec<RawScope>>> + Send;

    /// Own properties of an object.
    fn load_object_properties(
        &self,
        object: &ObjectRef,
    ) -> impl Future<Output = OracleResult<Vec<Property>>> + Send;

    /// Evaluates an expression in a frame.
    fn evaluate(
        &self,
        expression: &str,
        frame: &Frame,
    ) -> impl Future<Output = OracleResult<EvaluateResponse>> + Send;
}

/// The syntax analysis service.
pub trait SourceAnalyzer {
    /// Static scopes enclosing `location`, innermost first.
    ///
    /// `Ok(None)` means the source is known but cannot be analyzed.
    fn scopes_at(
        &self,
        location: &Location,
    ) -> impl Future<Output = Result<Option<Vec<StaticScope>>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_common::types::Primitive;

    #[test]
    fn test_failed_evaluation_becomes_exception() {
        let response = EvaluateResponse {
            result: Some(ValueHandle::number(1.0)),
            exception: None,
            failed: true,
        };
        assert_eq!(
            EvaluationOutcome::from(response),
            EvaluationOutcome::Exception(ValueHandle::string(EVALUATION_FAILED))
        );
    }

    #[test]
    fn test_thrown_falsy_value_is_exception() {
        let thrown = ValueHandle::Primitive(Primitive::Boolean(false));
        let response = EvaluateResponse { exception: Some(thrown.clone()), ..Default::default() };
        assert_eq!(EvaluationOutcome::from(response), EvaluationOutcome::Exception(thrown));
    }

    #[test]
    fn test_result_becomes_value() {
        let response =
            EvaluateResponse { result: Some(ValueHandle::number(3.0)), ..Default::default() };
        assert_eq!(EvaluationOutcome::from(response), EvaluationOutcome::Value(ValueHandle::number(3.0)));
        assert_eq!(
            EvaluationOutcome::from(EvaluateResponse::default()),
            EvaluationOutcome::Value(ValueHandle::undefined())
        );
    }
}
