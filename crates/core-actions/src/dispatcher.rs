//! Dispatcher: feeds one key at a time through the matcher and runs the
//! resolved command against the editing state.
//!
//! Strict one-in-flight discipline: `on_key` takes `&mut self`, so a
//! re-entrant dispatch from inside a command body is unrepresentable.
//! Commands that need to inject keys (dot-repeat playback) return
//! `CommandOutcome::Replay`; those tokens are queued and fed only after
//! the current key has fully committed, never interleaved.
//!
//! Failed sequences are dropped silently: when the buffer matches nothing,
//! it is cleared and the keys are gone. There is no mechanism to "give
//! back" trailing keystrokes for a retry against another command; that is
//! the documented, intentional behavior of this engine.

use crate::descriptor::{CommandCtx, CommandOutcome};
use crate::host::{EditHost, HostError};
use crate::matcher::{self, KeyBuffer};
use crate::registry::{CommandRegistry, RegistryError};
use core_config::Config;
use core_keys::{KeyToken, render_sequence};
use core_state::{EditingState, ModeKind};
use core_text::Position;
use std::collections::VecDeque;
use thiserror::Error;

/// Per-key result surfaced to the host loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Exactly one command completed and ran.
    Executed { command: &'static str },
    /// Partial matches remain; the engine is waiting for more keys.
    Buffering,
    /// Nothing matched; the pending buffer was dropped. Not an error.
    SequenceFailed,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Registry/config defect observed at runtime: several commands
    /// completed on the same keys. Rejected deterministically instead of
    /// picking one.
    #[error("commands {commands:?} complete simultaneously on `{keys}`")]
    ConflictingCommands {
        keys: String,
        commands: Vec<&'static str>,
    },
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Owns the registry, the pending key buffer, and the editing state for one
/// session (one buffer/view). One instance per view; keys are processed to
/// completion in arrival order.
pub struct Dispatcher {
    registry: CommandRegistry,
    config: Config,
    state: EditingState,
    buffer: KeyBuffer,
    queued: VecDeque<KeyToken>,
}

impl Dispatcher {
    /// Validates the registry up front; a conflicting table never
    /// dispatches a single key.
    pub fn new(registry: CommandRegistry, config: Config) -> Result<Self, RegistryError> {
        registry.validate()?;
        Ok(Self {
            registry,
            config,
            state: EditingState::new(),
            buffer: KeyBuffer::new(),
            queued: VecDeque::new(),
        })
    }

    pub fn current_mode(&self) -> ModeKind {
        self.state.mode_kind()
    }

    /// Non-empty pending buffer, for host-side sequence feedback.
    pub fn is_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    pub fn pending_keys(&self) -> String {
        self.buffer.to_string()
    }

    pub fn state(&self) -> &EditingState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditingState {
        &mut self.state
    }

    /// Process one keystroke to completion, then drain any playback keys a
    /// command queued. The returned outcome describes the physical key;
    /// queued-key outcomes are logged, not returned.
    pub fn on_key(
        &mut self,
        host: &mut dyn EditHost,
        token: KeyToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        let outcome = match self.feed(host, token) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.buffer.clear();
                return Err(e);
            }
        };
        if !self.queued.is_empty() {
            self.state.recorded.replaying = true;
            let drained = self.drain_queue(host);
            self.state.recorded.replaying = false;
            drained?;
        }
        Ok(outcome)
    }

    fn drain_queue(&mut self, host: &mut dyn EditHost) -> Result<(), DispatchError> {
        while let Some(token) = self.queued.pop_front() {
            match self.feed(host, token) {
                Ok(outcome) => {
                    tracing::trace!(target: "engine.dispatch", ?outcome, "replay_key")
                }
                Err(e) => {
                    self.queued.clear();
                    self.buffer.clear();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn feed(
        &mut self,
        host: &mut dyn EditHost,
        token: KeyToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        let token = core_keys::normalize(token);
        self.state.key_history.push(token.clone());
        self.buffer.push(token);

        let mode = self.state.mode_kind();
        let keys: Vec<KeyToken> = self.buffer.as_slice().to_vec();
        let set = matcher::candidates(&self.registry, mode, &self.state, &keys);

        if set.complete.len() > 1 {
            let commands: Vec<&'static str> = set.complete.iter().map(|d| d.name).collect();
            return Err(DispatchError::ConflictingCommands {
                keys: render_sequence(&keys),
                commands,
            });
        }

        if let Some(desc) = set.complete.first() {
            let cursors: Vec<Position> = if desc.runs_for_every_cursor {
                self.state.cursors.clone()
            } else {
                vec![self.state.primary_cursor()]
            };
            for position in cursors {
                let mut ctx = CommandCtx {
                    position,
                    keys: &keys,
                    state: &mut self.state,
                    host: &mut *host,
                    config: &self.config,
                };
                match desc.execute(&mut ctx)? {
                    CommandOutcome::Handled => {}
                    CommandOutcome::Motion(range) => {
                        if let Some(op) = self.state.recorded.operator.take() {
                            host.apply_operator(op, range)?;
                        } else if let Some(primary) = self.state.cursors.first_mut() {
                            *primary = range.start;
                        }
                    }
                    CommandOutcome::Replay(tokens) => {
                        self.queued.extend(tokens);
                    }
                }
            }
            // The buffer always resets on an executed match; an incomplete
            // action keeps the logical operation open via whatever mode or
            // recorded state its body established.
            self.buffer.clear();
            tracing::debug!(
                target: "engine.dispatch",
                command = desc.name,
                complete_action = desc.is_complete_action,
                mode = ?self.state.mode_kind(),
                "command_executed"
            );
            return Ok(DispatchOutcome::Executed { command: desc.name });
        }

        if !set.partial.is_empty() {
            tracing::trace!(
                target: "engine.dispatch",
                pending = %self.buffer,
                candidates = set.partial.len(),
                "buffering"
            );
            return Ok(DispatchOutcome::Buffering);
        }

        tracing::debug!(target: "engine.dispatch", dropped = %self.buffer, "sequence_failed");
        self.buffer.clear();
        Ok(DispatchOutcome::SequenceFailed)
    }
}
