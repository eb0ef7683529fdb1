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

//! Environment variable name constants for Rewind configuration.
//!
//! This module provides constant string names for all environment variables used by Rewind.
//! These constants ensure consistency across the codebase and provide a single source of
//! truth for environment variable names.
//!
//! # Environment Variables
//!
//! - [`REWIND_ORACLE_URL`] - Overrides the oracle endpoint from the config file
//! - [`REWIND_CONFIG`] - Points at an alternate config file

/// Environment variable for overriding the oracle endpoint.
///
/// When set, this takes precedence over the `oracle.url` entry of the config file,
/// but not over the `--url` CLI argument.
///
/// # Examples
///
/// ```bash
/// REWIND_ORACLE_URL=http://localhost:4040 rewind scopes --frame 3
/// ```
pub const REWIND_ORACLE_URL: &str = "REWIND_ORACLE_URL";

/// Environment variable for specifying the config file location.
///
/// # Default
///
/// When not set, Rewind reads `~/.rewind.toml` and creates it with default
/// values if it does not exist.
///
/// # Examples
///
/// ```bash
/// REWIND_CONFIG=/tmp/rewind.toml rewind break app.js:10
/// ```
pub const REWIND_CONFIG: &str = "REWIND_CONFIG";
