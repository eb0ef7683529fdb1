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

//! Recording doubles of the oracle and the analysis service.
//!
//! Every request made to a [`MockOracle`] is appended to its call log and
//! answered from canned data. Each request yields to the scheduler once
//! between its start and end markers, so tests can observe interleaving.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use eyre::{eyre, Result};
use parking_lot::Mutex;
use rewind_common::types::{
    Frame, FrameId, Location, LocationKey, LogGroupId, ObjectRef, Property, RawScope, StaticScope,
};
use tracing::trace;

use crate::{EvaluateResponse, Oracle, OracleError, OracleResult, SourceAnalyzer};

/// A request received by [`MockOracle`].
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum OracleCall {
    SetBreakpointBySourceId {
        source_id: String,
        line: u32,
        column: Option<u32>,
        condition: Option<String>,
    },
    SetBreakpointByUrl {
        url: String,
        line: u32,
        column: Option<u32>,
        condition: Option<String>,
    },
    RemoveBreakpointBySourceId {
        source_id: String,
        line: u32,
        column: Option<u32>,
    },
    RemoveBreakpointByUrl {
        url: String,
        line: u32,
        column: Option<u32>,
    },
    SetLogpoint {
        group_id: LogGroupId,
        location: Location,
        expression: String,
        condition: Option<String>,
    },
    RemoveLogpoint {
        group_id: LogGroupId,
    },
    SetActiveEventBreakpoints {
        event_ids: Vec<String>,
    },
    SetEventLogpoint {
        group_id: LogGroupId,
        event_ids: Vec<String>,
    },
    SetExceptionLogpoint {
        group_id: LogGroupId,
    },
    GetFrameScopes {
        frame: FrameId,
    },
    LoadObjectProperties {
        object_id: String,
    },
    Evaluate {
        expression: String,
        frame: FrameId,
    },
}

impl OracleCall {
    /// Protocol method name of the request, without domain prefix.
    pub fn method(&self) -> &'static str {
        match self {
            Self::SetBreakpointBySourceId { .. } => "setBreakpoint",
            Self::SetBreakpointByUrl { .. } => "setBreakpointByUrl",
            Self::RemoveBreakpointBySourceId { .. } => "removeBreakpoint",
            Self::RemoveBreakpointByUrl { .. } => "removeBreakpointByUrl",
            Self::SetLogpoint { .. } => "setLogpoint",
            Self::RemoveLogpoint { .. } => "removeLogpoint",
            Self::SetActiveEventBreakpoints { .. } => "setActiveEventBreakpoints",
            Self::SetEventLogpoint { .. } => "setEventLogpoint",
            Self::SetExceptionLogpoint { .. } => "setExceptionLogpoint",
            Self::GetFrameScopes { .. } => "getFrameScopes",
            Self::LoadObjectProperties { .. } => "getObjectProperties",
            Self::Evaluate { .. } => "evaluateInFrame",
        }
    }

    /// Whether the request changes remote breakpoint or log group state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::GetFrameScopes { .. } | Self::LoadObjectProperties { .. } | Self::Evaluate { .. }
        )
    }
}

/// In-memory oracle that records requests.
#[derive(Debug, Default)]
pub struct MockOracle {
    calls: Mutex<Vec<OracleCall>>,
    events: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    live_groups: Mutex<HashSet<LogGroupId>>,
    frame_scopes: Mutex<HashMap<FrameId, Vec<RawScope>>>,
    properties: Mutex<HashMap<String, Vec<Property>>>,
    evaluations: Mutex<HashMap<String, EvaluateResponse>>,
}

impl MockOracle {
    /// Creates an oracle with no canned data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `get_frame_scopes(frame)` with `scopes`.
    pub fn with_frame_scopes(self, frame: impl Into<String>, scopes: Vec<RawScope>) -> Self {
        self.frame_scopes.lock().insert(FrameId(frame.into()), scopes);
        self
    }

    /// Answers `load_object_properties` for `object_id` with `properties`.
    pub fn with_properties(self, object_id: impl Into<String>, properties: Vec<Property>) -> Self {
        self.properties.lock().insert(object_id.into(), properties);
        self
    }

    /// Answers `evaluate(expression, _)` with `response`.
    pub fn with_evaluation(self, expression: impl Into<String>, response: EvaluateResponse) -> Self {
        self.evaluations.lock().insert(expression.into(), response);
        self
    }

    /// Makes every request of `method` fail with [`OracleError::Rejected`].
    pub fn fail_on(&self, method: &str) {
        self.failing.lock().insert(method.to_string());
    }

    /// Stops failing requests.
    pub fn clear_failures(&self) {
        self.failing.lock().clear();
    }

    /// All requests received so far, in arrival order.
    pub fn calls(&self) -> Vec<OracleCall> {
        self.calls.lock().clone()
    }

    /// Requests that change remote state, in arrival order.
    pub fn mutations(&self) -> Vec<OracleCall> {
        self.calls.lock().iter().filter(|call| call.is_mutation()).cloned().collect()
    }

    /// Number of received requests of `method`.
    pub fn count(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|call| call.method() == method).count()
    }

    /// `start:<method>` and `end:<method>` markers in the order they happened.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Log groups registered and not yet removed.
    pub fn live_log_groups(&self) -> HashSet<LogGroupId> {
        self.live_groups.lock().clone()
    }

    /// Forgets recorded requests and events, keeping canned data.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
        self.events.lock().clear();
    }

    fn begin(&self, call: OracleCall) -> OracleResult<&'static str> {
        let method = call.method();
        trace!("Mock oracle received {:?}", call);
        self.events.lock().push(format!("start:{method}"));
        self.calls.lock().push(call);

        if self.failing.lock().contains(method) {
            self.events.lock().push(format!("end:{method}"));
            return Err(OracleError::Rejected {
                method: method.to_string(),
                message: "rejected by mock".to_string(),
            });
        }
        Ok(method)
    }

    async fn finish(&self, method: &'static str) {
        tokio::task::yield_now().await;
        self.events.lock().push(format!("end:{method}"));
    }

    async fn acknowledge(&self, call: OracleCall) -> OracleResult<()> {
        let method = self.begin(call)?;
        self.finish(method).await;
        Ok(())
    }
}

impl Oracle for MockOracle {
    async fn set_breakpoint_by_source_id(
        &self,
        source_id: &str,
        line: u32,
        column: Option<u32>,
        condition: Option<&str>,
    ) -> OracleResult<()> {
        self.acknowledge(OracleCall::SetBreakpointBySourceId {
            source_id: source_id.to_string(),
            line,
            column,
            condition: condition.map(str::to_string),
        })
        .await
    }

    async fn set_breakpoint_by_url(
        &self,
        url: &str,
        line: u32,
        column: Option<u32>,
        condition: Option<&str>,
    ) -> OracleResult<()> {
        self.acknowledge(OracleCall::SetBreakpointByUrl {
            url: url.to_string(),
            line,
            column,
            condition: condition.map(str::to_string),
        })
        .await
    }

    async fn remove_breakpoint_by_source_id(
        &self,
        source_id: &str,
        line: u32,
        column: Option<u32>,
    ) -> OracleResult<()> {
        self.acknowledge(OracleCall::RemoveBreakpointBySourceId {
            source_id: source_id.to_string(),
            line,
            column,
        })
        .await
    }

    async fn remove_breakpoint_by_url(
        &self,
        url: &str,
        line: u32,
        column: Option<u32>,
    ) -> OracleResult<()> {
        self.acknowledge(OracleCall::RemoveBreakpointByUrl { url: url.to_string(), line, column })
            .await
    }

    async fn set_logpoint(
        &self,
        group_id: &LogGroupId,
        location: &Location,
        expression: &str,
        condition: Option<&str>,
    ) -> OracleResult<()> {
        self.acknowledge(OracleCall::SetLogpoint {
            group_id: group_id.clone(),
            location: location.clone(),
            expression: expression.to_string(),
            condition: condition.map(str::to_string),
        })
        .await?;
        self.live_groups.lock().insert(group_id.clone());
        Ok(())
    }

    async fn remove_logpoint(&self, group_id: &LogGroupId) -> OracleResult<()> {
        self.acknowledge(OracleCall::RemoveLogpoint { group_id: group_id.clone() }).await?;
        self.live_groups.lock().remove(group_id);
        Ok(())
    }

    async fn set_active_event_breakpoints(&self, event_ids: &[String]) -> OracleResult<()> {
        self.acknowledge(OracleCall::SetActiveEventBreakpoints { event_ids: event_ids.to_vec() })
            .await
    }

    async fn set_event_logpoint(
        &self,
        group_id: &LogGroupId,
        event_ids: &[String],
    ) -> OracleResult<()> {
        self.acknowledge(OracleCall::SetEventLogpoint {
            group_id: group_id.clone(),
            event_ids: event_ids.to_vec(),
        })
        .await?;
        self.live_groups.lock().insert(group_id.clone());
        Ok(())
    }

    async fn set_exception_logpoint(&self, group_id: &LogGroupId) -> OracleResult<()> {
        self.acknowledge(OracleCall::SetExceptionLogpoint { group_id: group_id.clone() }).await?;
        self.live_groups.lock().insert(group_id.clone());
        Ok(())
    }

    async fn get_frame_scopes(&self, frame: &FrameId) -> OracleResult<Vec<RawScope>> {
        let method = self.begin(OracleCall::GetFrameScopes { frame: frame.clone() })?;
        self.finish(method).await;
        Ok(self.frame_scopes.lock().get(frame).cloned().unwrap_or_default())
    }

    async fn load_object_properties(&self, object: &ObjectRef) -> OracleResult<Vec<Property>> {
        let method = self.begin(OracleCall::LoadObjectProperties {
            object_id: object.object_id.clone(),
        })?;
        self.finish(method).await;
        Ok(self.properties.lock().get(&object.object_id).cloned().unwrap_or_default())
    }

    async fn evaluate(&self, expression: &str, frame: &Frame) -> OracleResult<EvaluateResponse> {
        let method = self.begin(OracleCall::Evaluate {
            expression: expression.to_string(),
            frame: frame.id.clone(),
        })?;
        self.finish(method).await;
        Ok(self.evaluations.lock().get(expression).cloned().unwrap_or_default())
    }
}

type AnalyzerHook = Box<dyn Fn(&Location) + Send + Sync>;

/// In-memory analysis service.
///
/// Locations without canned data are reported as unanalyzable (`Ok(None)`).
#[derive(Default)]
pub struct MockAnalyzer {
    scopes: Mutex<HashMap<LocationKey, Vec<StaticScope>>>,
    failing: Mutex<bool>,
    requests: AtomicUsize,
    on_request: Mutex<Option<Arc<AnalyzerHook>>>,
}

impl std::fmt::Debug for MockAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockAnalyzer")
            .field("scopes", &self.scopes)
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}

impl MockAnalyzer {
    /// Creates an analyzer with no canned data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `scopes_at(location)` with `scopes`.
    pub fn with_scopes(self, location: &Location, scopes: Vec<StaticScope>) -> Self {
        self.scopes.lock().insert(location.key(), scopes);
        self
    }

    /// Runs `hook` on every request before it is answered.
    pub fn on_request(self, hook: impl Fn(&Location) + Send + Sync + 'static) -> Self {
        let hook: AnalyzerHook = Box::new(hook);
        *self.on_request.lock() = Some(Arc::new(hook));
        self
    }

    /// Makes every request fail.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    /// Number of requests received.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl SourceAnalyzer for MockAnalyzer {
    async fn scopes_at(&self, location: &Location) -> Result<Option<Vec<StaticScope>>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let hook = self.on_request.lock().clone();
        if let Some(hook) = hook {
            hook(location);
        }
        tokio::task::yield_now().await;

        if *self.failing.lock() {
            return Err(eyre!("analysis unavailable for {location}"));
        }
        Ok(self.scopes.lock().get(&location.key()).cloned())
    }
}
