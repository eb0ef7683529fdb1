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

use std::{fmt::Display, str::FromStr};

use eyre::{bail, eyre, Error, Result};
use serde::{Deserialize, Serialize};

/// A position in a source, identified either by the oracle's source id or by its URL.
///
/// Two locations are the same breakpoint location iff their [`LocationKey`]s are equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Oracle-assigned source identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// URL of the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Line number (1-based).
    pub line: u32,
    /// Column number, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

/// How a location is addressed when talking to the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTarget<'a> {
    /// Address the source by its oracle id.
    SourceId(&'a str),
    /// Address the source by URL.
    Url(&'a str),
}

impl Location {
    /// Creates a location addressed by source id.
    pub fn by_source_id(source_id: impl Into<String>, line: u32, column: Option<u32>) -> Self {
        Self { source_id: Some(source_id.into()), source_url: None, line, column }
    }

    /// Creates a location addressed by URL.
    pub fn by_url(url: impl Into<String>, line: u32, column: Option<u32>) -> Self {
        Self { source_id: None, source_url: Some(url.into()), line, column }
    }

    /// Canonical key of this location.
    pub fn key(&self) -> LocationKey {
        LocationKey::new(self)
    }

    /// Returns the oracle addressing mode: the source id wins over the URL.
    pub fn target(&self) -> Option<SourceTarget<'_>> {
        if let Some(id) = self.source_id.as_deref() {
            Some(SourceTarget::SourceId(id))
        } else {
            self.source_url.as_deref().map(SourceTarget::Url)
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.source_id, &self.source_url) {
            (Some(id), _) => write!(f, "#{id}:{}", self.line)?,
            (None, Some(url)) => write!(f, "{url}:{}", self.line)?,
            (None, None) => write!(f, "<unknown>:{}", self.line)?,
        }
        if let Some(column) = self.column {
            write!(f, ":{column}")?;
        }
        Ok(())
    }
}

impl FromStr for Location {
    type Err = Error;

    /// Parses a location from a string.
    /// Format: `<url>:<line>[:<column>]` or `#<source-id>:<line>[:<column>]`
    /// Examples:
    /// - `app.js:10` - Line 10 of `app.js`
    /// - `http://localhost:8080/app.js:10:4` - Line 10, column 4
    /// - `#source-12:7` - Line 7 of the source with id `source-12`
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (rest, last) = trimmed
            .rsplit_once(':')
            .ok_or_else(|| eyre!("Invalid location format. Expected <source>:<line>[:<column>]"))?;
        let last = last.parse::<u32>().map_err(|e| eyre!("Invalid line number: {e}"))?;

        // A second trailing number means the first one was the column
        let (source, line, column) = match rest.rsplit_once(':') {
            Some((source, line)) if !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()) => {
                let line = line.parse::<u32>().map_err(|e| eyre!("Invalid line number: {e}"))?;
                (source, line, Some(last))
            }
            _ => (rest, last, None),
        };

        if source.is_empty() {
            bail!("Location is missing its source: {s}");
        }

        match source.strip_prefix('#') {
            Some("") => bail!("Location is missing its source id: {s}"),
            Some(id) => Ok(Self::by_source_id(id, line, column)),
            None => Ok(Self::by_url(source, line, column)),
        }
    }
}

/// Canonical string identity of a [`Location`].
///
/// Rendered as `<url>:<source id>:<line>:<column>` with absent source fields left
/// empty. An absent column renders as the literal `undefined`, which keeps keys
/// produced by older clients stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationKey(String);

impl LocationKey {
    /// Computes the key of a location.
    pub fn new(location: &Location) -> Self {
        let column = match location.column {
            Some(column) => column.to_string(),
            None => "undefined".to_string(),
        };
        Self(format!(
            "{}:{}:{}:{}",
            location.source_url.as_deref().unwrap_or_default(),
            location.source_id.as_deref().unwrap_or_default(),
            location.line,
            column
        ))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LocationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Location> for LocationKey {
    fn from(location: &Location) -> Self {
        Self::new(location)
    }
}
