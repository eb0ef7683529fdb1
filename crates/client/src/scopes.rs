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

//! Scope chain of a paused frame.
//!
//! The oracle reports a frame's environment as a flat list of [`RawScope`]s,
//! innermost first. [`build_chain`] turns that list into an immutable linked
//! chain of [`Scope`]s, and [`get_scopes`] renders the chain into the
//! [`ScopeItem`] tree shown in the scopes panel:
//!
//! - function and block scopes become blocks of sorted variables
//! - the innermost scope also lists `<exception>`/`<return>` and `<this>`
//! - object scopes become a single expandable value
//! - a function-lexical scope is folded into the function scope enclosing it

use std::{
    cmp::Ordering,
    sync::{Arc, LazyLock},
};

use regex::Regex;
use rewind_common::types::{Binding, Frame, PauseReason, RawScope, ScopeType, ValueHandle};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Sub-kind of a converted scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    /// An ordinary scope.
    #[default]
    #[serde(rename = "")]
    Default,
    /// The lexical part of a function's environment.
    #[serde(rename = "function lexical")]
    FunctionLexical,
}

impl ScopeKind {
    /// Textual form of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "",
            Self::FunctionLexical => "function lexical",
        }
    }
}

/// A converted scope, linked to the scope enclosing it.
///
/// Chains are built once per pause and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    /// Oracle id of the scope.
    pub id: String,
    /// Kind reported by the oracle.
    pub kind: ScopeType,
    /// Sub-kind.
    pub scope_kind: ScopeKind,
    /// Backing object of an object scope.
    pub object: Option<ValueHandle>,
    /// Name of the function owning the scope.
    pub function_name: Option<String>,
    /// Title override.
    pub display_name: Option<String>,
    /// Bindings, empty when the oracle did not enumerate them.
    pub bindings: Vec<Binding>,
    /// The enclosing scope.
    pub parent: Option<Arc<Scope>>,
}

impl Scope {
    /// Iterates from this scope outwards.
    pub fn iter(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |scope| scope.parent.as_deref())
    }

    /// Bindings that are variables, i.e. everything but the `this` override.
    pub fn variables(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(|binding| binding.name != THIS_BINDING)
    }

    /// Value of the `this` binding, which overrides the frame's `this`.
    pub fn this_override(&self) -> Option<&ValueHandle> {
        self.bindings
            .iter()
            .find(|binding| binding.name == THIS_BINDING)
            .map(|binding| &binding.value)
    }
}

const THIS_BINDING: &str = "this";

/// Converts one raw scope, linking it to `parent`.
pub fn convert_scope(raw: RawScope, parent: Option<Arc<Scope>>) -> Scope {
    Scope {
        id: raw.scope_id,
        kind: raw.kind,
        scope_kind: if raw.function_lexical {
            ScopeKind::FunctionLexical
        } else {
            ScopeKind::Default
        },
        object: raw.object,
        function_name: raw.function_name,
        display_name: raw.display_name,
        bindings: raw.bindings.unwrap_or_default(),
        parent,
    }
}

/// Links raw scopes (innermost first) into a chain and returns its innermost scope.
pub fn build_chain(raws: Vec<RawScope>) -> Option<Arc<Scope>> {
    raws.into_iter()
        .rev()
        .fold(None, |parent, raw| Some(Arc::new(convert_scope(raw, parent))))
}

/// Whether any binding in the chain carries an original (source-mapped) name.
pub fn has_original_names(innermost: &Scope) -> bool {
    innermost.iter().any(|scope| scope.variables().any(Binding::has_original_name))
}

/// A variable listed in a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableItem {
    /// Name shown to the user.
    pub name: String,
    /// Tree path, `<scope path>/<name>`.
    pub path: String,
    /// Current value.
    pub value: ValueHandle,
}

impl VariableItem {
    fn new(scope_path: &str, name: impl Into<String>, value: ValueHandle) -> Self {
        let name = name.into();
        Self { path: format!("{scope_path}/{name}"), name, value }
    }
}

/// Node type of a [`ScopeItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// A block of variables.
    Block,
    /// A single expandable value.
    Value,
}

/// Contents of a rendered scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "contents", rename_all = "lowercase")]
pub enum ScopeContents {
    /// Variables, sorted by name.
    Block(Vec<VariableItem>),
    /// An object environment.
    Value(ValueHandle),
}

/// A rendered scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeItem {
    /// Title.
    pub name: String,
    /// Tree path, `<scope id>-<scope index>`.
    pub path: String,
    /// Variables or value.
    #[serde(flatten)]
    pub contents: ScopeContents,
}

impl ScopeItem {
    /// Node type of the item.
    pub fn node_type(&self) -> NodeType {
        match self.contents {
            ScopeContents::Block(_) => NodeType::Block,
            ScopeContents::Value(_) => NodeType::Value,
        }
    }

    /// Variables of a block item.
    pub fn variables(&self) -> &[VariableItem] {
        match &self.contents {
            ScopeContents::Block(vars) => vars,
            ScopeContents::Value(_) => &[],
        }
    }
}

fn compare_names(a: &VariableItem, b: &VariableItem) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase()).then_with(|| a.name.cmp(&b.name))
}

static OBJECT_PROPERTY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([\w\d$]+)$").unwrap());
static ARRAY_PROPERTY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(.*?)\]$").unwrap());
static FUNCTION_PROPERTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\w\d]+)[/.<]*?$").unwrap());
static ANONYMOUS_PROPERTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\w\d]+)\(\^\)$").unwrap());

/// Shortens an engine-inferred function name, e.g. `a.b.c/<` → `c`.
///
/// Names containing whitespace have already been mapped and are kept as is.
pub fn simplify_display_name(name: &str) -> String {
    if name.is_empty() || name.contains(char::is_whitespace) {
        return name.to_string();
    }

    [&OBJECT_PROPERTY, &ARRAY_PROPERTY, &FUNCTION_PROPERTY, &ANONYMOUS_PROPERTY]
        .into_iter()
        .find_map(|re| re.captures(name).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| name.to_string())
}

fn scope_title(scope: &Scope) -> String {
    if let Some(name) = &scope.display_name {
        return name.clone();
    }
    match scope.kind {
        ScopeType::Function => scope
            .function_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(simplify_display_name)
            .unwrap_or_else(|| "<anonymous>".to_string()),
        _ => "Block".to_string(),
    }
}

/// Renders one scope of the chain.
///
/// `scope_index` is the 1-based position of `scope` in the chain; together with
/// the scope id it forms the item's path.
pub fn resolve_scope(
    scope: &Scope,
    frame: &Frame,
    innermost: &Scope,
    pause_reason: Option<&PauseReason>,
    scope_index: usize,
) -> Option<ScopeItem> {
    let path = format!("{}-{}", scope.id, scope_index);

    match scope.kind {
        ScopeType::Function | ScopeType::Block => {
            let mut vars: Vec<_> = scope
                .variables()
                .map(|binding| {
                    VariableItem::new(&path, binding.display_name(), binding.value.clone())
                })
                .collect();

            if scope.id == innermost.id {
                let finished = pause_reason.and_then(|reason| reason.frame_finished.as_ref());
                if let Some(finished) = finished {
                    if let Some(thrown) = &finished.throw {
                        vars.push(VariableItem::new(&path, "<exception>", thrown.clone()));
                    } else if let Some(returned) =
                        finished.return_value.as_ref().filter(|value| !value.is_undefined())
                    {
                        vars.push(VariableItem::new(&path, "<return>", returned.clone()));
                    }
                }

                if let Some(this) = scope.this_override().or(frame.this_value.as_ref()) {
                    vars.push(VariableItem::new(&path, "<this>", this.clone()));
                }
            }

            if vars.is_empty() {
                return None;
            }
            vars.sort_by(compare_names);
            Some(ScopeItem { name: scope_title(scope), path, contents: ScopeContents::Block(vars) })
        }
        ScopeType::Object => {
            let object = scope.object.clone()?;
            let name = object.class_name().map(str::to_string).unwrap_or_else(|| object.to_string());
            Some(ScopeItem { name, path, contents: ScopeContents::Value(object) })
        }
        _ => None,
    }
}

/// Folds a function-lexical scope into the function scope enclosing it.
///
/// Returns the merged item when `scope` is function-lexical and `parent_scope`
/// is a function; the merged item takes the parent's name and path.
pub fn merge_if_applicable(
    scope: &Scope,
    parent_scope: &Scope,
    item: &ScopeItem,
    parent_item: &ScopeItem,
) -> Option<ScopeItem> {
    if scope.scope_kind != ScopeKind::FunctionLexical || parent_scope.kind != ScopeType::Function {
        return None;
    }

    let (ScopeContents::Block(vars), ScopeContents::Block(parent_vars)) =
        (&item.contents, &parent_item.contents)
    else {
        return None;
    };

    let mut merged: Vec<_> = vars.iter().chain(parent_vars).cloned().collect();
    merged.sort_by(compare_names);
    Some(ScopeItem {
        name: parent_item.name.clone(),
        path: parent_item.path.clone(),
        contents: ScopeContents::Block(merged),
    })
}

/// Renders the whole chain starting at `innermost`.
///
/// Returns `None` when there is no selected frame or no chain.
pub fn get_scopes(
    pause_reason: Option<&PauseReason>,
    frame: Option<&Frame>,
    innermost: Option<&Arc<Scope>>,
) -> Option<Vec<ScopeItem>> {
    let (frame, innermost) = (frame?, innermost?);

    let mut items: Vec<ScopeItem> = Vec::new();
    let mut prev: Option<(&Scope, Option<ScopeItem>)> = None;

    for (index, scope) in innermost.iter().enumerate() {
        let item = resolve_scope(scope, frame, innermost, pause_reason, index + 1);

        if let Some(item) = &item {
            let merged = match &prev {
                Some((prev_scope, Some(prev_item))) => {
                    merge_if_applicable(prev_scope, scope, prev_item, item)
                }
                _ => None,
            };

            match merged {
                Some(merged) => {
                    trace!("Merged lexical scope {} into {}", merged.path, scope.id);
                    items.pop();
                    items.push(merged);
                }
                None => items.push(item.clone()),
            }
        }

        prev = Some((scope, item));
    }

    Some(items)
}
