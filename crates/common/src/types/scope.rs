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

//! Scope records.
//!
//! Two kinds of scope data meet in the client:
//!
//! - [`RawScope`]s are reported by the oracle for a paused frame and carry the
//!   live values of each [`Binding`].
//! - [`StaticScope`]s come from source analysis and describe every textual
//!   [`Reference`] to a binding, without values.

use serde::{Deserialize, Serialize};

use crate::types::ValueHandle;

/// Kind of an environment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeType {
    /// A function body.
    Function,
    /// A lexical block.
    Block,
    /// An object environment, e.g. the global object.
    Object,
    /// The global lexical environment.
    Global,
    /// A module environment.
    Module,
    /// A `with` statement environment.
    With,
    /// Anything the client does not model.
    #[serde(other)]
    Other,
}

/// A runtime binding in a scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// Generated name.
    pub name: String,
    /// Name in the original source when the frame is source mapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    /// Current value.
    pub value: ValueHandle,
}

impl Binding {
    /// Creates a binding without an original name.
    pub fn new(name: impl Into<String>, value: ValueHandle) -> Self {
        Self { name: name.into(), original_name: None, value }
    }

    /// Sets the original name.
    pub fn with_original_name(mut self, original_name: impl Into<String>) -> Self {
        self.original_name = Some(original_name.into());
        self
    }

    /// Whether the binding carries a non-empty original name.
    pub fn has_original_name(&self) -> bool {
        self.original_name.as_deref().is_some_and(|name| !name.is_empty())
    }

    /// The name shown to the user: the original name when known.
    pub fn display_name(&self) -> &str {
        match self.original_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.name,
        }
    }
}

/// A scope as reported by the oracle for a paused frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScope {
    /// Oracle id of the scope.
    pub scope_id: String,
    /// Kind of the scope.
    #[serde(rename = "type")]
    pub kind: ScopeType,
    /// Whether this is the lexical part of a function's environment.
    #[serde(default)]
    pub function_lexical: bool,
    /// Backing object of an object scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<ValueHandle>,
    /// Name of the function owning the scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Title provided by source mapping, used verbatim when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Bindings, absent when the oracle could not enumerate them.
    ///
    /// A binding named `this` is the frame's `this` as remapped for the
    /// original source, not a variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings: Option<Vec<Binding>>,
}

impl RawScope {
    /// Creates an empty scope of the given kind.
    pub fn new(scope_id: impl Into<String>, kind: ScopeType) -> Self {
        Self {
            scope_id: scope_id.into(),
            kind,
            function_lexical: false,
            object: None,
            function_name: None,
            display_name: None,
            bindings: None,
        }
    }

    /// Sets the bindings.
    pub fn with_bindings(mut self, bindings: Vec<Binding>) -> Self {
        self.bindings = Some(bindings);
        self
    }
}

/// Line and column of a reference in the original source (line is 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    /// Line (1-based).
    pub line: u32,
    /// Column (0-based).
    pub column: u32,
}

/// A chain of property accesses following a reference, e.g. `.a.b` in `obj.a.b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefMeta {
    /// Accessed property name.
    pub property: String,
    /// The next access in the chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<RefMeta>>,
}

impl RefMeta {
    /// Builds a chain from property names in access order.
    pub fn chain<I, S>(properties: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: DoubleEndedIterator,
        S: Into<String>,
    {
        properties.into_iter().rev().fold(None, |parent, property| {
            Some(Self { property: property.into(), parent: parent.map(Box::new) })
        })
    }

    /// Iterates the property names in access order.
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        std::iter::successors(Some(self), |meta| meta.parent.as_deref())
            .map(|meta| meta.property.as_str())
    }
}

/// One textual occurrence of a binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Start of the occurrence.
    pub start: SourcePosition,
    /// Property accesses applied to the binding at this occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<RefMeta>,
}

/// Static description of a binding: all of its references, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticBinding {
    /// Binding name in the original source.
    pub name: String,
    /// References in source order.
    #[serde(default)]
    pub refs: Vec<Reference>,
}

/// One level of the static scope tree at a location, innermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticScope {
    /// Kind of the scope.
    #[serde(rename = "type")]
    pub kind: ScopeType,
    /// Bindings declared in this scope.
    #[serde(default)]
    pub bindings: Vec<StaticBinding>,
}

impl StaticScope {
    /// Looks up a binding by name.
    pub fn binding(&self, name: &str) -> Option<&StaticBinding> {
        self.bindings.iter().find(|binding| binding.name == name)
    }
}
