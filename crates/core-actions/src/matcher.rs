//! Key-sequence matching: pending buffer plus the complete/partial
//! candidate computation.
//!
//! Pure and deterministic: the candidate set depends only on the registry,
//! the current mode, the buffered keys, and the editing state the
//! predicates inspect. Logging only at TRACE for per-descriptor decisions.

use crate::descriptor::CommandDescriptor;
use crate::registry::CommandRegistry;
use core_keys::{KeyToken, render_sequence};
use core_state::{EditingState, ModeKind};
use smallvec::SmallVec;
use tracing::trace;

/// Trailing window of keys in the current pending-match attempt.
///
/// Invariant: between dispatches the content is a prefix of at least one
/// registered sequence for the current mode, or empty; the dispatcher
/// clears it on a complete match, a total mismatch, or cancel.
#[derive(Debug, Default, Clone)]
pub struct KeyBuffer {
    tokens: SmallVec<[KeyToken; 8]>,
}

impl KeyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: KeyToken) {
        self.tokens.push(token);
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    pub fn as_slice(&self) -> &[KeyToken] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}

impl std::fmt::Display for KeyBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", render_sequence(&self.tokens))
    }
}

/// Result of one matcher query: descriptors whose sequence the buffer
/// completes, and descriptors it strictly prefixes.
#[derive(Debug, Default)]
pub struct MatchSet<'a> {
    pub complete: Vec<&'a CommandDescriptor>,
    pub partial: Vec<&'a CommandDescriptor>,
}

impl MatchSet<'_> {
    pub fn is_empty(&self) -> bool {
        self.complete.is_empty() && self.partial.is_empty()
    }
}

/// Compute the candidate set for the buffered keys in `mode`.
pub fn candidates<'a>(
    registry: &'a CommandRegistry,
    mode: ModeKind,
    state: &EditingState,
    keys: &[KeyToken],
) -> MatchSet<'a> {
    let mut set = MatchSet::default();
    for desc in registry.iter() {
        if !desc.modes.contains_kind(mode) {
            continue;
        }
        if desc.does_action_apply(mode, state, keys) {
            trace!(target: "engine.match", command = desc.name, keys = %render_sequence(keys), "complete");
            set.complete.push(desc);
        } else if desc.could_action_apply(mode, state, keys) {
            trace!(target: "engine.match", command = desc.name, keys = %render_sequence(keys), "partial");
            set.partial.push(desc);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{CommandCtx, CommandDescriptor, CommandOutcome};
    use crate::host::HostError;
    use core_keys::char_tokens;
    use core_state::{ModeSet, OperatorKind};
    use pretty_assertions::assert_eq;

    fn noop(_ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
        Ok(CommandOutcome::Handled)
    }

    fn operator_pending(state: &EditingState, _keys: &[KeyToken]) -> bool {
        state.recorded.operator.is_some()
    }

    fn registry() -> CommandRegistry {
        let mut reg = CommandRegistry::new();
        reg.register(CommandDescriptor::new(
            "multi",
            ModeSet::NORMAL,
            vec![char_tokens("gu")],
            noop,
        ));
        reg.register(
            CommandDescriptor::new("gated", ModeSet::NORMAL, vec![char_tokens("r")], noop)
                .applies_when(operator_pending),
        );
        reg.register(CommandDescriptor::new(
            "insert-only",
            ModeSet::INSERT,
            vec![char_tokens("g")],
            noop,
        ));
        reg
    }

    fn names(descs: &[&CommandDescriptor]) -> Vec<&'static str> {
        descs.iter().map(|d| d.name).collect()
    }

    #[test]
    fn prefix_yields_partial_only() {
        let reg = registry();
        let state = EditingState::new();
        let set = candidates(&reg, ModeKind::Normal, &state, &char_tokens("g"));
        assert_eq!(names(&set.complete), Vec::<&str>::new());
        assert_eq!(names(&set.partial), vec!["multi"]);
    }

    #[test]
    fn full_sequence_yields_complete() {
        let reg = registry();
        let state = EditingState::new();
        let set = candidates(&reg, ModeKind::Normal, &state, &char_tokens("gu"));
        assert_eq!(names(&set.complete), vec!["multi"]);
        assert_eq!(names(&set.partial), Vec::<&str>::new());
    }

    #[test]
    fn mode_excludes_foreign_descriptors() {
        let reg = registry();
        let state = EditingState::new();
        // "g" is a complete insert-only sequence but we are in Normal.
        let set = candidates(&reg, ModeKind::Normal, &state, &char_tokens("g"));
        assert!(!names(&set.partial).contains(&"insert-only"));
        assert!(!names(&set.complete).contains(&"insert-only"));
    }

    #[test]
    fn predicate_gates_completion() {
        let reg = registry();
        let mut state = EditingState::new();
        let set = candidates(&reg, ModeKind::Normal, &state, &char_tokens("r"));
        assert!(set.is_empty());

        state.recorded.operator = Some(OperatorKind::Change);
        let set = candidates(&reg, ModeKind::Normal, &state, &char_tokens("r"));
        assert_eq!(names(&set.complete), vec!["gated"]);
    }

    #[test]
    fn empty_buffer_prefixes_everything_eligible() {
        let reg = registry();
        let mut state = EditingState::new();
        state.recorded.operator = Some(OperatorKind::Change);
        let set = candidates(&reg, ModeKind::Normal, &state, &[]);
        assert_eq!(names(&set.partial), vec!["multi", "gated"]);
    }

    #[test]
    fn key_buffer_render() {
        let mut buf = KeyBuffer::new();
        assert!(buf.is_empty());
        buf.push(KeyToken::ch('c'));
        buf.push(KeyToken::ch('r'));
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.to_string(), "cr");
        buf.clear();
        assert!(buf.is_empty());
    }
}
