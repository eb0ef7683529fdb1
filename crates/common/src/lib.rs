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

// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
// SPDX-License-Identifier: AGPL-3.0
//! Rewind Common - Shared types and utilities for Rewind components
//!
//! This crate provides the data model shared by the debugger client and its
//! tooling (locations, breakpoint options, runtime values, scopes, previews),
//! together with logging setup and environment variable names.

/// Common types used throughout the Rewind client including locations, values and scopes
pub mod types;

/// Environment variable names used for configuration
pub mod env;
/// Logging setup and utilities for consistent logging across Rewind components
pub mod logging;

pub use env::*;
