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

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::types::ValueHandle;

/// A value shown inline next to a reference above the paused line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    /// Line of the reference (0-based).
    pub line: u32,
    /// Column of the reference.
    pub column: u32,
    /// Expression shown, e.g. `obj.prop`.
    pub name: String,
    /// Its value at the pause.
    pub value: ValueHandle,
}

/// Previews grouped by line, each line's list ordered by column.
pub type PreviewMap = BTreeMap<u32, Vec<Preview>>;

/// Sorts previews by `(line, column)` and groups them by line.
///
/// The sort is stable, so previews at the same position keep their input order.
pub fn group_previews_by_line(previews: impl IntoIterator<Item = Preview>) -> PreviewMap {
    let mut grouped = PreviewMap::new();
    for preview in previews.into_iter().sorted_by_key(|p| (p.line, p.column)) {
        grouped.entry(preview.line).or_default().push(preview);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(line: u32, column: u32, name: &str) -> Preview {
        Preview { line, column, name: name.to_string(), value: ValueHandle::undefined() }
    }

    #[test]
    fn test_group_previews_by_line() {
        let grouped = group_previews_by_line(vec![
            preview(4, 10, "b"),
            preview(2, 0, "a"),
            preview(4, 2, "c"),
            preview(4, 2, "d"),
        ]);

        assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), [2, 4]);
        let names: Vec<_> = grouped[&4].iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["c", "d", "b"]);
    }
}
