//! Command descriptors: the immutable registration unit the matcher and
//! dispatcher operate on.
//!
//! Per-command "does this state still trigger me" logic is expressed as
//! plain predicate function pointers rather than trait objects: every
//! descriptor carries `applies` (legal complete trigger) and an optional
//! `could_apply` (legal possibly-still-partial trigger, defaulting to
//! `applies`, which must never be stricter). The engine calls them
//! uniformly; no virtual dispatch, no per-type overrides.

use crate::host::{EditHost, HostError};
use core_config::Config;
use core_keys::KeyToken;
use core_state::{EditingState, ModeKind, ModeSet};
use core_text::{Position, Range};
use tracing::trace;

/// Pure predicate over the shared state and the keys pressed so far.
pub type ApplyPredicate = fn(&EditingState, &[KeyToken]) -> bool;

/// Command body. Receives the full context for one cursor; mutates state
/// through `ctx.state` and the buffer through `ctx.host` only.
pub type ExecFn = fn(&mut CommandCtx<'_>) -> Result<CommandOutcome, HostError>;

/// Everything a command sees while executing.
pub struct CommandCtx<'a> {
    /// Cursor this invocation runs for (primary cursor when the command
    /// runs once globally).
    pub position: Position,
    /// Keys that completed the match, last one most recent.
    pub keys: &'a [KeyToken],
    pub state: &'a mut EditingState,
    pub host: &'a mut dyn EditHost,
    pub config: &'a Config,
}

/// What the dispatcher should do after a command body returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// State mutation (if any) already happened; nothing further.
    Handled,
    /// The command resolved a span: apply the pending operator over it, or
    /// treat it as a motion when no operator is recorded.
    Motion(Range),
    /// Feed these tokens back through dispatch after the current key
    /// commits. Queued, never interleaved.
    Replay(Vec<KeyToken>),
}

pub fn always_applies(_state: &EditingState, _keys: &[KeyToken]) -> bool {
    true
}

/// Immutable command registration: mode set, alternative key sequences,
/// dispatch flags, predicates, body. Built once at startup.
pub struct CommandDescriptor {
    pub name: &'static str,
    pub modes: ModeSet,
    sequences: Vec<Vec<KeyToken>>,
    /// `false` marks the early-dispatch pattern: the body executes as soon
    /// as its sequence completes, but the logical operation continues
    /// (typically because the body switched modes and longer input is now
    /// expected there).
    pub is_complete_action: bool,
    /// Multi-cursor fan-out policy; `false` means run once regardless of
    /// cursor count (session state is global, not per-cursor).
    pub runs_for_every_cursor: bool,
    applies: ApplyPredicate,
    could_apply: Option<ApplyPredicate>,
    exec: ExecFn,
}

impl CommandDescriptor {
    pub fn new(
        name: &'static str,
        modes: ModeSet,
        sequences: Vec<Vec<KeyToken>>,
        exec: ExecFn,
    ) -> Self {
        debug_assert!(sequences.iter().all(|s| !s.is_empty()));
        Self {
            name,
            modes,
            sequences,
            is_complete_action: true,
            runs_for_every_cursor: true,
            applies: always_applies,
            could_apply: None,
            exec,
        }
    }

    /// Mark as an early-dispatch command (executes now, operation not done).
    pub fn incomplete(mut self) -> Self {
        self.is_complete_action = false;
        self
    }

    /// Run once per key regardless of cursor count.
    pub fn runs_once(mut self) -> Self {
        self.runs_for_every_cursor = false;
        self
    }

    pub fn applies_when(mut self, predicate: ApplyPredicate) -> Self {
        self.applies = predicate;
        self
    }

    /// Widen the partial-trigger predicate beyond `applies`. Rarely needed;
    /// the default (identical to `applies`) is correct for commands with no
    /// partial window.
    pub fn could_apply_when(mut self, predicate: ApplyPredicate) -> Self {
        self.could_apply = Some(predicate);
        self
    }

    pub fn sequences(&self) -> impl Iterator<Item = &[KeyToken]> {
        self.sequences.iter().map(Vec::as_slice)
    }

    fn matches_complete(&self, keys: &[KeyToken]) -> bool {
        self.sequences.iter().any(|seq| seq.as_slice() == keys)
    }

    /// Strict-prefix match; an empty buffer is trivially a prefix of every
    /// sequence.
    fn matches_prefix(&self, keys: &[KeyToken]) -> bool {
        self.sequences
            .iter()
            .any(|seq| keys.len() < seq.len() && seq.starts_with(keys))
    }

    /// This exact state is a legal complete trigger.
    pub fn does_action_apply(
        &self,
        mode: ModeKind,
        state: &EditingState,
        keys: &[KeyToken],
    ) -> bool {
        self.modes.contains_kind(mode)
            && self.matches_complete(keys)
            && (self.applies)(state, keys)
    }

    /// This exact state is a legal, possibly-still-partial trigger.
    pub fn could_action_apply(
        &self,
        mode: ModeKind,
        state: &EditingState,
        keys: &[KeyToken],
    ) -> bool {
        let predicate = self.could_apply.unwrap_or(self.applies);
        self.modes.contains_kind(mode) && self.matches_prefix(keys) && predicate(state, keys)
    }

    pub(crate) fn applies_fn(&self) -> ApplyPredicate {
        self.applies
    }

    pub(crate) fn execute(&self, ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
        trace!(target: "engine.dispatch", command = self.name, "exec");
        (self.exec)(ctx)
    }
}

impl std::fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("modes", &self.modes)
            .field("sequences", &self.sequences)
            .field("is_complete_action", &self.is_complete_action)
            .field("runs_for_every_cursor", &self.runs_for_every_cursor)
            .finish_non_exhaustive()
    }
}
