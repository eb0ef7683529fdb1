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

use rewind_common::types::LocationKey;
use thiserror::Error;

/// Errors surfaced by oracle interactions.
///
/// Every registry, coordinator and preview operation propagates these unchanged;
/// retry policy belongs to the transport.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The transport failed or the server answered with a JSON-RPC error.
    #[error("oracle request failed: {0}")]
    Rpc(#[from] jsonrpsee::core::client::Error),

    /// The response did not have the expected shape.
    #[error("failed to decode oracle response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The oracle refused the request.
    #[error("oracle rejected {method}: {message}")]
    Rejected {
        /// Method that was rejected
        method: String,
        /// Reason given by the oracle
        message: String,
    },

    /// The location has neither a source id nor a URL.
    #[error("location {0} has neither a source id nor a URL")]
    UnresolvedLocation(LocationKey),
}

/// Result alias for oracle interactions.
pub type OracleResult<T> = Result<T, OracleError>;
