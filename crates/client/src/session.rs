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

//! Per-connection debugger state.
//!
//! A [`DebugSession`] owns everything the client knows about one connection to
//! the replay service: the breakpoint registry with its log groups, the scope
//! chains and inline previews of the current pause, and the watch expressions.
//! Navigating to another recording or reconnecting calls [`DebugSession::reset`].

use std::sync::Arc;

use futures::future::try_join_all;
use rewind_common::types::{
    BreakpointEntry, BreakpointOptions, Frame, FrameId, Location, PauseReason, PreviewMap,
};
use tracing::{debug, info};

use crate::{
    build_chain, get_scopes, BreakpointRegistry, EvaluationOutcome, FetchCache,
    InlinePreviewGenerator, Oracle, OracleError, OracleResult, PauseContext, PauseTracker, Scope,
    ScopeItem, SourceAnalyzer, WatchResult, Watcher,
};

/// State of one debugger connection.
#[derive(Debug)]
pub struct DebugSession<O, A> {
    oracle: Arc<O>,
    breakpoints: BreakpointRegistry<O>,
    previews: InlinePreviewGenerator<A>,
    pause: PauseTracker,
    paused: Option<PauseReason>,
    frame_scopes: FetchCache<FrameId, Arc<Scope>>,
    watcher: Watcher,
}

impl<O: Oracle, A: SourceAnalyzer> DebugSession<O, A> {
    /// Creates a session talking to `oracle` and `analyzer`.
    pub fn new(oracle: Arc<O>, analyzer: Arc<A>) -> Self {
        Self {
            breakpoints: BreakpointRegistry::new(oracle.clone()),
            previews: InlinePreviewGenerator::new(analyzer),
            oracle,
            pause: PauseTracker::new(),
            paused: None,
            frame_scopes: FetchCache::new(),
            watcher: Watcher::default(),
        }
    }

    /// Records that the debuggee paused.
    ///
    /// Data computed for the previous pause is discarded; the returned context
    /// goes stale on the next transition.
    pub fn on_paused(&mut self, reason: PauseReason) -> PauseContext {
        debug!("Paused: {:?}", reason.kind);
        self.paused = Some(reason);
        self.discard_pause_data();
        self.pause.advance()
    }

    /// Records that the debuggee resumed.
    pub fn on_resumed(&mut self) {
        debug!("Resumed");
        self.paused = None;
        self.discard_pause_data();
        self.pause.advance();
    }

    /// Whether the debuggee is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.is_some()
    }

    /// Why the debuggee is paused.
    pub fn pause_reason(&self) -> Option<&PauseReason> {
        self.paused.as_ref()
    }

    /// The shared pause generation counter.
    pub fn pause_tracker(&self) -> &PauseTracker {
        &self.pause
    }

    /// The breakpoint registry.
    pub fn breakpoints(&self) -> &BreakpointRegistry<O> {
        &self.breakpoints
    }

    /// See [`BreakpointRegistry::set_breakpoint`].
    pub async fn set_breakpoint(
        &mut self,
        location: Location,
        options: BreakpointOptions,
    ) -> OracleResult<()> {
        self.breakpoints.set_breakpoint(location, options).await
    }

    /// See [`BreakpointRegistry::remove_breakpoint`].
    pub async fn remove_breakpoint(&mut self, location: &Location) -> OracleResult<()> {
        self.breakpoints.remove_breakpoint(location).await
    }

    /// See [`BreakpointRegistry::toggle_breakpoint`].
    pub async fn toggle_breakpoint(
        &mut self,
        location: Location,
        options: BreakpointOptions,
    ) -> OracleResult<bool> {
        self.breakpoints.toggle_breakpoint(location, options).await
    }

    /// Whether a breakpoint exists at `location`.
    pub fn has_breakpoint(&self, location: &Location) -> bool {
        self.breakpoints.has_breakpoint(location)
    }

    /// Breakpoints ordered by location.
    pub fn list_breakpoints(&self) -> Vec<&BreakpointEntry> {
        self.breakpoints.entries()
    }

    /// Replaces the event listener breakpoints and their log group.
    pub async fn set_event_breakpoints(&mut self, event_ids: &[String]) -> OracleResult<()> {
        self.breakpoints.logpoints_mut().set_event_breakpoints(event_ids).await
    }

    /// Turns logging of every thrown exception on or off.
    pub async fn set_exception_logging(&mut self, enabled: bool) -> OracleResult<()> {
        self.breakpoints.logpoints_mut().set_exception_logging(enabled).await
    }

    /// Live scope chain of `frame`, fetched once per pause.
    pub async fn frame_scopes(&mut self, frame: &Frame) -> OracleResult<Option<Arc<Scope>>> {
        if let Some(cached) = self.frame_scopes.get_cached(&frame.id) {
            return Ok(cached.cloned());
        }

        let raws = self.oracle.get_frame_scopes(&frame.id).await?;
        debug!("Frame {} has {} scopes", frame.id, raws.len());
        let chain = build_chain(raws);
        self.frame_scopes.record(frame.id.clone(), chain.clone());
        Ok(chain)
    }

    /// Rendered scopes of `frame`.
    pub async fn scopes(&mut self, frame: &Frame) -> OracleResult<Option<Vec<ScopeItem>>> {
        let chain = self.frame_scopes(frame).await?;
        Ok(get_scopes(self.paused.as_ref(), Some(frame), chain.as_ref()))
    }

    /// Inline previews of `frame` paused at `location`.
    ///
    /// Returns `None` while the debuggee is running.
    pub async fn inline_previews(
        &mut self,
        frame: &Frame,
        location: &Location,
    ) -> OracleResult<Option<Arc<PreviewMap>>> {
        if !self.is_paused() {
            return Ok(None);
        }

        let context = self.pause.current();
        let chain = self.frame_scopes(frame).await?;
        self.previews.generate(&*self.oracle, frame, location, chain.as_ref(), context).await
    }

    /// Evaluates `expression` in `frame`.
    pub async fn evaluate(
        &self,
        expression: &str,
        frame: &Frame,
    ) -> OracleResult<EvaluationOutcome> {
        let response = self.oracle.evaluate(expression, frame).await?;
        Ok(response.into())
    }

    /// Watch expressions.
    pub fn watcher(&self) -> &Watcher {
        &self.watcher
    }

    /// Watch expressions, mutably.
    pub fn watcher_mut(&mut self) -> &mut Watcher {
        &mut self.watcher
    }

    /// Evaluates every watch expression in `frame` and records the outcomes.
    pub async fn evaluate_watches(&mut self, frame: &Frame) -> OracleResult<Vec<WatchResult>> {
        let session = &*self;
        let evaluations = session.watcher.iter().map(|(id, expression)| async move {
            let outcome = session.evaluate(expression, frame).await?;
            Ok::<_, OracleError>((id, outcome))
        });
        let outcomes = try_join_all(evaluations).await?;
        Ok(self.watcher.record(outcomes))
    }

    /// Forgets all session state without contacting the oracle.
    ///
    /// Watch expressions survive a reset, their recorded outcomes do not.
    pub fn reset(&mut self) {
        info!("Resetting debug session");
        self.breakpoints.reset();
        self.previews.reset();
        self.frame_scopes.clear();
        self.watcher.forget_outcomes();
        self.paused = None;
        self.pause.advance();
    }

    fn discard_pause_data(&mut self) {
        self.frame_scopes.clear();
        self.previews.clear_previews();
    }
}
