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

//! Rewind Client - debugger client core
//!
//! This crate keeps the client-side state of a time-travel debugging session in
//! sync with a remote replay service:
//!
//! - [`BreakpointRegistry`] and [`LogpointCoordinator`] own breakpoints, location
//!   log points and the singleton event/exception log groups
//! - [`scopes`] turns a paused frame's raw scopes into the rendered scope tree
//! - [`InlinePreviewGenerator`] annotates source lines with current values
//! - [`DebugSession`] ties all of the above to one connection

mod cache;
mod config;
mod error;
mod logpoint;
mod oracle;
mod pause;
mod preview;
mod registry;
mod rpc;
pub mod scopes;
mod session;
mod watcher;

pub mod test_utils;

pub use cache::FetchCache;
pub use config::{Config, OracleConfig, PreviewConfig};
pub use error::{OracleError, OracleResult};
pub use logpoint::LogpointCoordinator;
pub use oracle::{EvaluateResponse, EvaluationOutcome, Oracle, SourceAnalyzer, EVALUATION_FAILED};
pub use pause::{PauseContext, PauseTracker};
pub use preview::{binding_previews, local_scope_levels, InlinePreviewGenerator};
pub use registry::BreakpointRegistry;
pub use rpc::RpcClient;
pub use scopes::{
    build_chain, get_scopes, has_original_names, NodeType, Scope, ScopeContents, ScopeItem,
    ScopeKind, VariableItem,
};
pub use session::DebugSession;
pub use watcher::{WatchResult, Watcher};
