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

use std::time::Duration;

use eyre::Result;
use jsonrpsee::{
    core::client::ClientT,
    http_client::{HttpClient, HttpClientBuilder},
};
use rewind_common::types::{
    Frame, FrameId, Location, LogGroupId, ObjectRef, Property, RawScope, SourceTarget, StaticScope,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::{EvaluateResponse, Oracle, OracleError, OracleResult, SourceAnalyzer};

#[derive(Deserialize)]
struct ScopesResponse<T> {
    scopes: Option<T>,
}

#[derive(Deserialize)]
struct PropertiesResponse {
    #[serde(default)]
    properties: Vec<Property>,
}

/// JSON-RPC client for the replay service
#[derive(Clone)]
pub struct RpcClient {
    client: HttpClient,
    server_url: String,
}

impl RpcClient {
    /// Create a new RPC client
    pub fn new(server_url: &str, request_timeout: Duration) -> Result<Self> {
        let client =
            HttpClientBuilder::default().request_timeout(request_timeout).build(server_url)?;

        debug!("Created RPC client for: {}", server_url);
        Ok(Self { client, server_url: server_url.to_string() })
    }

    /// Get server URL
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> OracleResult<T> {
        debug!("Making RPC request: {} {}", method, params);

        let result = match self.client.request::<Value, _>(method, vec![params]).await {
            Ok(result) => {
                debug!("{} successful: {:?}", method, result);
                result
            }
            Err(e) => {
                error!("{} failed: {}", method, e);
                return Err(e.into());
            }
        };

        Ok(serde_json::from_value(result)?)
    }

    async fn call(&self, method: &str, params: Value) -> OracleResult<()> {
        self.request::<Value>(method, params).await.map(|_| ())
    }
}

impl Oracle for RpcClient {
    async fn set_breakpoint_by_source_id(
        &self,
        source_id: &str,
        line: u32,
        column: Option<u32>,
        condition: Option<&str>,
    ) -> OracleResult<()> {
        let params = json!({
            "location": { "sourceId": source_id, "line": line, "column": column },
            "condition": condition,
        });
        self.call("Debugger.setBreakpoint", params).await
    }

    async fn set_breakpoint_by_url(
        &self,
        url: &str,
        line: u32,
        column: Option<u32>,
        condition: Option<&str>,
    ) -> OracleResult<()> {
        let params = json!({ "url": url, "line": line, "column": column, "condition": condition });
        self.call("Debugger.setBreakpointByUrl", params).await
    }

    async fn remove_breakpoint_by_source_id(
        &self,
        source_id: &str,
        line: u32,
        column: Option<u32>,
    ) -> OracleResult<()> {
        let params = json!({
            "location": { "sourceId": source_id, "line": line, "column": column },
        });
        self.call("Debugger.removeBreakpoint", params).await
    }

    async fn remove_breakpoint_by_url(
        &self,
        url: &str,
        line: u32,
        column: Option<u32>,
    ) -> OracleResult<()> {
        let params = json!({ "url": url, "line": line, "column": column });
        self.call("Debugger.removeBreakpointByUrl", params).await
    }

    async fn set_logpoint(
        &self,
        group_id: &LogGroupId,
        location: &Location,
        expression: &str,
        condition: Option<&str>,
    ) -> OracleResult<()> {
        let (method, target) = match location.target() {
            Some(SourceTarget::SourceId(id)) => ("Debugger.setLogpoint", json!({ "sourceId": id })),
            Some(SourceTarget::Url(url)) => ("Debugger.setLogpointByUrl", json!({ "url": url })),
            None => return Err(OracleError::UnresolvedLocation(location.key())),
        };
        let params = json!({
            "logGroupId": group_id,
            "location": target,
            "line": location.line,
            "column": location.column,
            "text": expression,
            "condition": condition,
        });
        self.call(method, params).await
    }

    async fn remove_logpoint(&self, group_id: &LogGroupId) -> OracleResult<()> {
        self.call("Debugger.removeLogpoint", json!({ "logGroupId": group_id })).await
    }

    async fn set_active_event_breakpoints(&self, event_ids: &[String]) -> OracleResult<()> {
        self.call("Debugger.setActiveEventBreakpoints", json!({ "events": event_ids })).await
    }

    async fn set_event_logpoint(
        &self,
        group_id: &LogGroupId,
        event_ids: &[String],
    ) -> OracleResult<()> {
        let params = json!({ "logGroupId": group_id, "eventTypes": event_ids });
        self.call("Debugger.setEventLogpoint", params).await
    }

    async fn set_exception_logpoint(&self, group_id: &LogGroupId) -> OracleResult<()> {
        self.call("Debugger.setExceptionLogpoint", json!({ "logGroupId": group_id })).await
    }

    async fn get_frame_scopes(&self, frame: &FrameId) -> OracleResult<Vec<RawScope>> {
        let response: ScopesResponse<Vec<RawScope>> =
            self.request("Pause.getFrameScopes", json!({ "frameId": frame })).await?;
        Ok(response.scopes.unwrap_or_default())
    }

    async fn load_object_properties(&self, object: &ObjectRef) -> OracleResult<Vec<Property>> {
        let response: PropertiesResponse = self
            .request("Pause.getObjectProperties", json!({ "objectId": object.object_id }))
            .await?;
        Ok(response.properties)
    }

    async fn evaluate(&self, expression: &str, frame: &Frame) -> OracleResult<EvaluateResponse> {
        let params = json!({ "frameId": frame.id, "expression": expression });
        self.request("Pause.evaluateInFrame", params).await
    }
}

impl SourceAnalyzer for RpcClient {
    async fn scopes_at(&self, location: &Location) -> Result<Option<Vec<StaticScope>>> {
        let response: ScopesResponse<Vec<StaticScope>> =
            self.request("Analysis.getScopes", json!({ "location": location })).await?;
        Ok(response.scopes)
    }
}
