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

/// Breakpoint options, entries and log groups
pub mod breakpoint;
/// Paused frames and pause reasons
pub mod frame;
/// Source locations and their canonical keys
pub mod location;
/// Inline value previews
pub mod preview;
/// Runtime and static scope records
pub mod scope;
/// Runtime value handles
pub mod value;

pub use breakpoint::*;
pub use frame::*;
pub use location::*;
pub use preview::*;
pub use scope::*;
pub use value::*;
