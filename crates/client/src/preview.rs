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

//! Inline value previews.
//!
//! For a paused frame, every reference to a live binding that appears above the
//! paused line is annotated with the binding's current value. References of the
//! form `obj.a.b` are resolved through the object's properties, so the preview
//! shows `obj.a.b` and its value instead of `obj`.
//!
//! Only the innermost block scopes and the first non-block scope are visited,
//! and for each display name only the reference closest to the paused line is
//! kept.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use futures::future::try_join_all;
use rewind_common::types::{
    group_previews_by_line, Frame, FrameId, Location, LocationKey, Preview, PreviewMap, Property,
    Reference, ScopeType, StaticScope, ValueHandle,
};
use tracing::{debug, trace, warn};

use crate::{
    has_original_names, FetchCache, Oracle, OracleResult, PauseContext, Scope, SourceAnalyzer,
};

/// Number of leading block scopes in a static scope list.
pub fn local_scope_levels(static_scopes: &[StaticScope]) -> usize {
    static_scopes.iter().take_while(|scope| scope.kind == ScopeType::Block).count()
}

/// Computes and caches inline previews per frame and location.
#[derive(Debug)]
pub struct InlinePreviewGenerator<A> {
    analyzer: Arc<A>,
    static_scopes: FetchCache<LocationKey, Arc<Vec<StaticScope>>>,
    previews: HashMap<(FrameId, LocationKey), Arc<PreviewMap>>,
}

impl<A: SourceAnalyzer> InlinePreviewGenerator<A> {
    /// Creates a generator with empty caches.
    pub fn new(analyzer: Arc<A>) -> Self {
        Self { analyzer, static_scopes: FetchCache::new(), previews: HashMap::new() }
    }

    /// Previews for `frame` paused at `location`, grouped by zero-based line.
    ///
    /// `chain` is the frame's live scope chain. Returns `Ok(None)` when there is
    /// nothing to preview, when the source cannot be analyzed, or when the
    /// debuggee moved on (per `context`) while static data was being fetched.
    pub async fn generate<O: Oracle>(
        &mut self,
        oracle: &O,
        frame: &Frame,
        location: &Location,
        chain: Option<&Arc<Scope>>,
        context: PauseContext,
    ) -> OracleResult<Option<Arc<PreviewMap>>> {
        let cache_key = (frame.id.clone(), location.key());
        if let Some(cached) = self.previews.get(&cache_key) {
            trace!("Using cached previews for frame {} at {}", frame.id, location);
            return Ok(Some(cached.clone()));
        }

        let Some(innermost) = chain else {
            return Ok(None);
        };
        if innermost.variables().next().is_none() {
            return Ok(None);
        }

        let Some(static_scopes) = self.static_scopes_at(location).await else {
            return Ok(None);
        };

        if !context.is_current() {
            debug!("Pause state changed while analyzing {}, dropping previews", location);
            return Ok(None);
        }

        let levels = local_scope_levels(&static_scopes);
        let original_only = has_original_names(innermost);
        let mut previews = Vec::new();

        // Levels without bindings still count, so level `n` pairs with static scope `n`
        for (level, scope) in innermost.iter().enumerate().take(levels + 1) {
            let bindings: Vec<_> = scope
                .variables()
                .filter(|binding| !original_only || binding.has_original_name())
                .collect();

            let fetches = bindings.iter().map(|binding| async move {
                match &binding.value {
                    ValueHandle::Object(object) if object.class_name == "Object" => {
                        oracle.load_object_properties(object).await.map(Some)
                    }
                    _ => Ok(None),
                }
            });
            let properties = try_join_all(fetches).await?;

            for (binding, properties) in bindings.iter().zip(properties) {
                previews.extend(binding_previews(
                    static_scopes.get(level),
                    location.line,
                    binding.display_name(),
                    &binding.value,
                    properties.as_deref(),
                ));
            }
        }

        debug!("Generated {} previews for frame {} at {}", previews.len(), frame.id, location);
        let grouped = Arc::new(group_previews_by_line(previews));
        self.previews.insert(cache_key, grouped.clone());
        Ok(Some(grouped))
    }

    /// Forgets computed previews. Static scope data is kept since sources do
    /// not change between pauses.
    pub fn clear_previews(&mut self) {
        self.previews.clear();
    }

    /// Forgets everything.
    pub fn reset(&mut self) {
        self.previews.clear();
        self.static_scopes.clear();
    }

    async fn static_scopes_at(&mut self, location: &Location) -> Option<Arc<Vec<StaticScope>>> {
        let key = location.key();
        if let Some(cached) = self.static_scopes.get_cached(&key) {
            return cached.cloned();
        }

        match self.analyzer.scopes_at(location).await {
            Ok(scopes) => {
                let scopes = scopes.map(Arc::new);
                self.static_scopes.record(key, scopes.clone());
                scopes
            }
            Err(err) => {
                warn!("Failed to analyze scopes at {}: {}", location, err);
                None
            }
        }
    }
}

/// Previews of one binding, closest reference first.
///
/// References on or below `paused_line` (1-based) are skipped. Each display
/// name, including the property path, is emitted at most once.
pub fn binding_previews(
    static_scope: Option<&StaticScope>,
    paused_line: u32,
    name: &str,
    value: &ValueHandle,
    properties: Option<&[Property]>,
) -> Vec<Preview> {
    let Some(binding) = static_scope.and_then(|scope| scope.binding(name)) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut previews = Vec::new();

    for reference in binding.refs.iter().rev() {
        let line = reference.start.line.saturating_sub(1);
        if line >= paused_line.saturating_sub(1) {
            continue;
        }

        let Some((display_name, display_value)) =
            resolve_expression(name, value, reference, properties)
        else {
            continue;
        };

        if !seen.insert(display_name.clone()) {
            continue;
        }

        previews.push(Preview {
            line,
            column: reference.start.column,
            name: display_name,
            value: display_value,
        });
    }

    previews
}

/// Resolves the property chain of a reference, e.g. `obj.a.b`.
///
/// The first hop is looked up in the loaded `properties`, later hops in object
/// previews. Returns `None` when a hop cannot be resolved.
fn resolve_expression(
    name: &str,
    value: &ValueHandle,
    reference: &Reference,
    properties: Option<&[Property]>,
) -> Option<(String, ValueHandle)> {
    let (Some(properties), Some(meta)) = (properties, &reference.meta) else {
        return Some((name.to_string(), value.clone()));
    };

    let mut display_name = name.to_string();
    let mut current: Option<&ValueHandle> = None;
    for property in meta.properties() {
        let next = match current {
            None => properties.iter().find(|prop| prop.name == property).map(|prop| &prop.value),
            Some(parent) => parent.preview_property(property),
        }?;
        display_name.push('.');
        display_name.push_str(property);
        current = Some(next);
    }

    current.map(|resolved| (display_name, resolved.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_common::types::{RefMeta, SourcePosition, StaticBinding};

    fn reference(line: u32, column: u32, meta: Option<RefMeta>) -> Reference {
        Reference { start: SourcePosition { line, column }, meta }
    }

    fn scope_with(name: &str, refs: Vec<Reference>) -> StaticScope {
        StaticScope {
            kind: ScopeType::Block,
            bindings: vec![StaticBinding { name: name.to_string(), refs }],
        }
    }

    #[test]
    fn test_local_scope_levels() {
        let scopes = vec![
            scope_with("a", vec![]),
            scope_with("b", vec![]),
            StaticScope { kind: ScopeType::Function, bindings: vec![] },
            scope_with("c", vec![]),
        ];
        assert_eq!(local_scope_levels(&scopes), 2);
        assert_eq!(local_scope_levels(&[]), 0);
    }

    #[test]
    fn test_closest_reference_wins() {
        let scope = scope_with("x", vec![reference(2, 4, None), reference(5, 0, None)]);
        let previews = binding_previews(Some(&scope), 10, "x", &ValueHandle::number(1.0), None);
        assert_eq!(previews.len(), 1);
        assert_eq!((previews[0].line, previews[0].column), (4, 0));
    }

    #[test]
    fn test_references_at_or_below_pause_are_skipped() {
        let scope = scope_with("x", vec![reference(9, 0, None), reference(10, 0, None)]);
        let previews = binding_previews(Some(&scope), 10, "x", &ValueHandle::number(1.0), None);
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].line, 8);

        let previews = binding_previews(Some(&scope), 9, "x", &ValueHandle::number(1.0), None);
        assert!(previews.is_empty());
    }

    #[test]
    fn test_unresolvable_property_drops_reference() {
        let meta = RefMeta::chain(["missing"]);
        let scope = scope_with("obj", vec![reference(1, 0, None), reference(3, 0, meta)]);
        let properties = vec![Property { name: "a".to_string(), value: ValueHandle::number(2.0) }];
        let obj = ValueHandle::object("o1", "Object");

        let previews = binding_previews(Some(&scope), 10, "obj", &obj, Some(&properties));
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].name, "obj");
        assert_eq!(previews[0].line, 0);
    }
}
