//! Case-coercion command family: an operator-pending sub-mode entered from
//! a recorded `c` (change) operator with `r`, which collects a text-object
//! target and a destination case style, then rewrites the object in place.
//!
//! Lifecycle:
//! 1. `c` records the change operator, `r` opens a session (the operator is
//!    consumed into the session; leaving the sub-mode never leaves a stale
//!    pending operator behind).
//! 2. A target key (`( ) { } [ ] < > ' " ` t w W s p` plus the `b B r a`
//!    aliases) picks the text object.
//! 3. A style key picks the destination case; the object is resolved and
//!    rewritten, and the session ends.
//! `Esc` discards the session at any point. From a linewise visual
//! selection the target step is skipped and the whole line is the object.
//!
//! Entry also arms the dot-repeat log: the operator and trigger keys are
//! recorded together with the current history length, so `.` can re-feed
//! the whole session verbatim later. Arming is skipped during playback, so
//! a replayed session leaves the log alone.

use crate::descriptor::{CommandCtx, CommandDescriptor, CommandOutcome};
use crate::host::HostError;
use crate::registry::CommandRegistry;
use core_keys::KeyToken;
use core_state::{
    COERCE_TARGET_KEYS, CoerceSession, EditingState, ModeKind, ModeSet, ModeState, OperatorKind,
};
use core_text::{CaseStyle, Scope};
use tracing::debug;

/// Replacement keys accepted by `coerce_add_replacement`.
pub const STYLE_KEYS: [char; 10] = ['s', 'u', 'c', 'm', 'p', 'k', '-', '.', 't', ' '];

/// Destination case style for a replacement key.
pub fn style_for_key(key: char) -> Option<CaseStyle> {
    Some(match key {
        's' => CaseStyle::Snake,
        'u' => CaseStyle::ScreamingSnake,
        'c' => CaseStyle::Camel,
        'm' | 'p' => CaseStyle::Pascal,
        'k' | '-' => CaseStyle::Kebab,
        '.' => CaseStyle::Dot,
        't' => CaseStyle::Title,
        ' ' => CaseStyle::Space,
        _ => return None,
    })
}

// -------------------------------------------------------------------------------------------------
// Predicates
// -------------------------------------------------------------------------------------------------

fn change_pending(state: &EditingState, _keys: &[KeyToken]) -> bool {
    state.recorded.operator == Some(OperatorKind::Change)
}

/// `r` doubles as the repeat trigger: legal only when no operator is
/// pending and a prior session armed the replay log. Disjoint from
/// `change_pending`, so both descriptors can share the key.
fn repeat_ready(state: &EditingState, _keys: &[KeyToken]) -> bool {
    state.recorded.operator.is_none()
        && !state.recorded.replay.is_empty()
        && !state.recorded.replaying
}

fn session_awaiting_target(state: &EditingState, _keys: &[KeyToken]) -> bool {
    state.coerce().is_some_and(CoerceSession::awaiting_target)
}

fn session_awaiting_replacement(state: &EditingState, _keys: &[KeyToken]) -> bool {
    state
        .coerce()
        .is_some_and(CoerceSession::awaiting_replacement)
}

// -------------------------------------------------------------------------------------------------
// Command bodies
// -------------------------------------------------------------------------------------------------

fn start_session(ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
    if !ctx.config.coerce_enabled() {
        // Guard violation: the key matched but the gate is off. The pending
        // operator is left untouched.
        debug!(target: "engine.dispatch", "coerce_disabled");
        return Ok(CommandOutcome::Handled);
    }
    let Some(op) = ctx.state.recorded.operator.take() else {
        return Ok(CommandOutcome::Handled);
    };
    let mut session = CoerceSession::new(op);
    if ctx.state.mode_kind() == ModeKind::VisualLine {
        // Linewise visual entry already knows its object; skip the target
        // step entirely.
        session.visual_line = true;
        session.range = Some(ctx.host.line_object_range(ctx.position));
    }
    if !ctx.state.recorded.replaying
        && let Some(trigger) = ctx.keys.last()
    {
        let history_len = ctx.state.key_history.len();
        ctx.state.recorded.replay.begin_session(
            KeyToken::ch(op.key()),
            trigger.clone(),
            history_len,
        );
    }
    ctx.state.set_mode(ModeState::CoerceInput(session));
    Ok(CommandOutcome::Handled)
}

/// Repeat emulation: surface the cursor line's object span as a motion so
/// the dispatcher (or a pending operator) can act on it.
fn repeat_motion(ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
    Ok(CommandOutcome::Motion(
        ctx.host.line_object_range(ctx.position),
    ))
}

fn add_target(ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
    let key = ctx.keys.last().and_then(KeyToken::as_char);
    if let (Some(session), Some(key)) = (ctx.state.coerce_mut(), key) {
        session.set_target(key);
    }
    Ok(CommandOutcome::Handled)
}

fn add_replacement(ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
    let style = ctx
        .keys
        .last()
        .and_then(KeyToken::as_char)
        .and_then(style_for_key);
    let Some(style) = style else {
        return Ok(CommandOutcome::Handled);
    };
    let (target, preset) = match ctx.state.coerce() {
        Some(session) => (session.target, session.range),
        None => return Ok(CommandOutcome::Handled),
    };
    let range = match preset {
        Some(range) => Some(range),
        None => target
            .and_then(|token| ctx.host.resolve_text_object(token, ctx.position, Scope::Inner)),
    };
    let Some(range) = range else {
        // Object absent at the cursor: the session aborts without touching
        // the buffer.
        debug!(target: "engine.dispatch", ?target, "coerce_target_unresolved");
        ctx.state.leave_to_normal();
        return Ok(CommandOutcome::Handled);
    };
    if let Some(session) = ctx.state.coerce_mut() {
        session.replacement = Some(style);
        session.range = Some(range);
    }
    ctx.host.apply_transform(range, style)?;
    ctx.state.leave_to_normal();
    debug!(target: "engine.dispatch", style = style.tag(), "coerce_applied");
    Ok(CommandOutcome::Handled)
}

fn cancel(ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
    ctx.state.leave_to_normal();
    Ok(CommandOutcome::Handled)
}

// -------------------------------------------------------------------------------------------------
// Registration
// -------------------------------------------------------------------------------------------------

fn single_key_sequences(keys: &[char]) -> Vec<Vec<KeyToken>> {
    keys.iter().map(|&c| vec![KeyToken::ch(c)]).collect()
}

pub(crate) fn register(reg: &mut CommandRegistry) {
    reg.register(
        CommandDescriptor::new(
            "coerce_mode_start",
            ModeSet::NORMAL | ModeSet::VISUAL_CHAR | ModeSet::VISUAL_LINE,
            single_key_sequences(&['r']),
            start_session,
        )
        .incomplete()
        .runs_once()
        .applies_when(change_pending),
    );
    reg.register(
        CommandDescriptor::new(
            "coerce_mode_repeat",
            ModeSet::NORMAL,
            single_key_sequences(&['r']),
            repeat_motion,
        )
        .incomplete()
        .runs_once()
        .applies_when(repeat_ready),
    );
    reg.register(
        CommandDescriptor::new(
            "coerce_add_target",
            ModeSet::COERCE_INPUT,
            single_key_sequences(&COERCE_TARGET_KEYS),
            add_target,
        )
        .incomplete()
        .runs_once()
        .applies_when(session_awaiting_target),
    );
    reg.register(
        CommandDescriptor::new(
            "coerce_add_replacement",
            ModeSet::COERCE_INPUT,
            single_key_sequences(&STYLE_KEYS),
            add_replacement,
        )
        .runs_once()
        .applies_when(session_awaiting_replacement),
    );
    reg.register(
        CommandDescriptor::new(
            "coerce_cancel",
            ModeSet::COERCE_INPUT,
            vec![vec![KeyToken::esc()]],
            cancel,
        )
        .runs_once(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::EditHost;
    use core_config::Config;
    use core_text::{Position, Range};

    struct NullHost;

    impl EditHost for NullHost {
        fn resolve_text_object(
            &mut self,
            _token: char,
            _position: Position,
            _scope: Scope,
        ) -> Option<Range> {
            None
        }

        fn apply_transform(&mut self, _range: Range, _style: CaseStyle) -> Result<(), HostError> {
            Ok(())
        }

        fn apply_operator(&mut self, _op: OperatorKind, _range: Range) -> Result<(), HostError> {
            Ok(())
        }

        fn line_object_range(&mut self, position: Position) -> Range {
            Range::new(position, Position::new(position.line, position.byte + 4))
        }
    }

    fn ctx_keys() -> Vec<KeyToken> {
        vec![KeyToken::ch('r')]
    }

    #[test]
    fn style_key_map() {
        assert_eq!(style_for_key('s'), Some(CaseStyle::Snake));
        assert_eq!(style_for_key('u'), Some(CaseStyle::ScreamingSnake));
        assert_eq!(style_for_key('c'), Some(CaseStyle::Camel));
        assert_eq!(style_for_key('m'), Some(CaseStyle::Pascal));
        assert_eq!(style_for_key('p'), Some(CaseStyle::Pascal));
        assert_eq!(style_for_key('k'), Some(CaseStyle::Kebab));
        assert_eq!(style_for_key('-'), Some(CaseStyle::Kebab));
        assert_eq!(style_for_key('.'), Some(CaseStyle::Dot));
        assert_eq!(style_for_key('t'), Some(CaseStyle::Title));
        assert_eq!(style_for_key(' '), Some(CaseStyle::Space));
        assert_eq!(style_for_key('x'), None);
        for key in STYLE_KEYS {
            assert!(style_for_key(key).is_some());
        }
    }

    #[test]
    fn start_and_repeat_predicates_are_disjoint() {
        let keys = ctx_keys();
        let mut state = EditingState::new();
        assert!(!change_pending(&state, &keys));
        assert!(!repeat_ready(&state, &keys));

        state.recorded.operator = Some(OperatorKind::Change);
        assert!(change_pending(&state, &keys));
        assert!(!repeat_ready(&state, &keys));

        state.recorded.operator = None;
        state
            .recorded
            .replay
            .begin_session(KeyToken::ch('c'), KeyToken::ch('r'), 2);
        assert!(!change_pending(&state, &keys));
        assert!(repeat_ready(&state, &keys));

        state.recorded.replaying = true;
        assert!(!repeat_ready(&state, &keys));
    }

    #[test]
    fn delete_operator_does_not_open_session() {
        let mut state = EditingState::new();
        state.recorded.operator = Some(OperatorKind::Delete);
        assert!(!change_pending(&state, &ctx_keys()));
    }

    #[test]
    fn start_consumes_operator_and_arms_replay() {
        let mut state = EditingState::new();
        state.key_history = core_keys::char_tokens("cr");
        state.recorded.operator = Some(OperatorKind::Change);
        let mut host = NullHost;
        let config = Config::with_coerce(true);
        let keys = ctx_keys();
        let mut ctx = CommandCtx {
            position: Position::origin(),
            keys: &keys,
            state: &mut state,
            host: &mut host,
            config: &config,
        };
        start_session(&mut ctx).unwrap();
        assert_eq!(state.mode_kind(), ModeKind::CoerceInput);
        assert_eq!(state.recorded.operator, None);
        assert_eq!(state.recorded.replay.keys(), core_keys::char_tokens("cr"));
        assert_eq!(state.recorded.replay.start_index(), 2);
        assert!(state.coerce().unwrap().awaiting_target());
    }

    #[test]
    fn start_during_playback_leaves_log_untouched() {
        let mut state = EditingState::new();
        state.key_history = core_keys::char_tokens("cr");
        state.recorded.operator = Some(OperatorKind::Change);
        state.recorded.replaying = true;
        let mut host = NullHost;
        let config = Config::with_coerce(true);
        let keys = ctx_keys();
        let mut ctx = CommandCtx {
            position: Position::origin(),
            keys: &keys,
            state: &mut state,
            host: &mut host,
            config: &config,
        };
        start_session(&mut ctx).unwrap();
        assert_eq!(state.mode_kind(), ModeKind::CoerceInput);
        assert!(state.recorded.replay.is_empty());
    }

    #[test]
    fn start_with_gate_off_leaves_state_alone() {
        let mut state = EditingState::new();
        state.recorded.operator = Some(OperatorKind::Change);
        let mut host = NullHost;
        let config = Config::with_coerce(false);
        let keys = ctx_keys();
        let mut ctx = CommandCtx {
            position: Position::origin(),
            keys: &keys,
            state: &mut state,
            host: &mut host,
            config: &config,
        };
        start_session(&mut ctx).unwrap();
        assert_eq!(state.mode_kind(), ModeKind::Normal);
        assert_eq!(state.recorded.operator, Some(OperatorKind::Change));
        assert!(state.recorded.replay.is_empty());
    }

    #[test]
    fn visual_line_entry_presets_the_range() {
        let mut state = EditingState::new();
        state.set_mode(ModeState::VisualLine);
        state.recorded.operator = Some(OperatorKind::Change);
        let mut host = NullHost;
        let config = Config::with_coerce(true);
        let keys = ctx_keys();
        let mut ctx = CommandCtx {
            position: Position::origin(),
            keys: &keys,
            state: &mut state,
            host: &mut host,
            config: &config,
        };
        start_session(&mut ctx).unwrap();
        let session = state.coerce().unwrap();
        assert!(session.visual_line);
        assert!(session.range.is_some());
        assert!(!session.awaiting_target());
        assert!(session.awaiting_replacement());
    }

    #[test]
    fn unresolved_target_aborts_session() {
        let mut state = EditingState::new();
        let mut session = CoerceSession::new(OperatorKind::Change);
        session.set_target('w');
        state.set_mode(ModeState::CoerceInput(session));
        let mut host = NullHost;
        let config = Config::with_coerce(true);
        let keys = vec![KeyToken::ch('s')];
        let mut ctx = CommandCtx {
            position: Position::origin(),
            keys: &keys,
            state: &mut state,
            host: &mut host,
            config: &config,
        };
        add_replacement(&mut ctx).unwrap();
        assert_eq!(state.mode_kind(), ModeKind::Normal);
        assert!(state.coerce().is_none());
    }

    #[test]
    fn cancel_discards_session() {
        let mut state = EditingState::new();
        state.set_mode(ModeState::CoerceInput(CoerceSession::new(
            OperatorKind::Change,
        )));
        let mut host = NullHost;
        let config = Config::with_coerce(true);
        let keys = vec![KeyToken::esc()];
        let mut ctx = CommandCtx {
            position: Position::origin(),
            keys: &keys,
            state: &mut state,
            host: &mut host,
            config: &config,
        };
        cancel(&mut ctx).unwrap();
        assert_eq!(state.mode_kind(), ModeKind::Normal);
    }
}
