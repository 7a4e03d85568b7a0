//! Built-in command set: the operator starters, mode switches, and repeat
//! baseline the engine ships with, plus the coerce family in `coerce`.
//!
//! Every command here is a plain function registered through a
//! `CommandDescriptor`; nothing in this module is reachable except through
//! the registry.

mod coerce;

pub use coerce::{STYLE_KEYS, style_for_key};

use crate::descriptor::{CommandCtx, CommandDescriptor, CommandOutcome};
use crate::host::HostError;
use crate::registry::CommandRegistry;
use core_keys::KeyToken;
use core_state::{EditingState, ModeKind, ModeSet, ModeState, OperatorKind};

// -------------------------------------------------------------------------------------------------
// Predicates
// -------------------------------------------------------------------------------------------------

fn no_operator_pending(state: &EditingState, _keys: &[KeyToken]) -> bool {
    state.recorded.operator.is_none()
}

fn replay_ready(state: &EditingState, _keys: &[KeyToken]) -> bool {
    state.recorded.operator.is_none()
        && !state.recorded.replay.is_empty()
        && !state.recorded.replaying
}

// -------------------------------------------------------------------------------------------------
// Command bodies
// -------------------------------------------------------------------------------------------------

/// Shared body for `c`/`d`/`y`: record the operator and wait for a motion
/// or sub-mode to consume it.
fn record_operator(ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
    let op = match ctx.keys.last().and_then(KeyToken::as_char) {
        Some('c') => OperatorKind::Change,
        Some('d') => OperatorKind::Delete,
        Some('y') => OperatorKind::Yank,
        _ => return Ok(CommandOutcome::Handled),
    };
    ctx.state.recorded.operator = Some(op);
    Ok(CommandOutcome::Handled)
}

fn clear_pending(ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
    ctx.state.recorded.operator = None;
    Ok(CommandOutcome::Handled)
}

fn enter_insert(ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
    ctx.state.set_mode(ModeState::Insert);
    Ok(CommandOutcome::Handled)
}

fn leave_insert(ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
    ctx.state.set_mode(ModeState::Normal);
    Ok(CommandOutcome::Handled)
}

fn toggle_visual_char(ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
    let next = if ctx.state.mode_kind() == ModeKind::VisualChar {
        ModeState::Normal
    } else {
        ModeState::VisualChar
    };
    ctx.state.set_mode(next);
    Ok(CommandOutcome::Handled)
}

fn toggle_visual_line(ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
    let next = if ctx.state.mode_kind() == ModeKind::VisualLine {
        ModeState::Normal
    } else {
        ModeState::VisualLine
    };
    ctx.state.set_mode(next);
    Ok(CommandOutcome::Handled)
}

fn leave_visual(ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
    ctx.state.recorded.operator = None;
    ctx.state.set_mode(ModeState::Normal);
    Ok(CommandOutcome::Handled)
}

/// Dot-repeat: queue the replay log's playback for re-dispatch. The keys
/// run after the current dispatch commits, with the replaying flag set so
/// playback cannot trigger itself.
fn dot_repeat(ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome, HostError> {
    // The trigger key is already in the history; the since-arming tail
    // must not replay it.
    let end = ctx.state.key_history.len().saturating_sub(1);
    let keys = ctx
        .state
        .recorded
        .replay
        .playback(&ctx.state.key_history[..end]);
    Ok(CommandOutcome::Replay(keys))
}

// -------------------------------------------------------------------------------------------------
// Registration
// -------------------------------------------------------------------------------------------------

const VISUAL: ModeSet = ModeSet::VISUAL_CHAR
    .union(ModeSet::VISUAL_LINE)
    .union(ModeSet::VISUAL_BLOCK);

/// The full built-in registry: baseline modal commands plus the coerce
/// family. Callers hand this to `Dispatcher::new`, which validates it.
pub fn baseline_registry() -> CommandRegistry {
    let mut reg = CommandRegistry::new();

    reg.register(
        CommandDescriptor::new(
            "operator_start",
            ModeSet::NORMAL | ModeSet::VISUAL_CHAR | ModeSet::VISUAL_LINE,
            vec![
                vec![KeyToken::ch('c')],
                vec![KeyToken::ch('d')],
                vec![KeyToken::ch('y')],
            ],
            record_operator,
        )
        .incomplete()
        .runs_once(),
    );
    reg.register(
        CommandDescriptor::new(
            "normal_escape",
            ModeSet::NORMAL,
            vec![vec![KeyToken::esc()]],
            clear_pending,
        )
        .runs_once(),
    );
    reg.register(
        CommandDescriptor::new(
            "insert_enter",
            ModeSet::NORMAL,
            vec![vec![KeyToken::ch('i')]],
            enter_insert,
        )
        .runs_once()
        .applies_when(no_operator_pending),
    );
    reg.register(
        CommandDescriptor::new(
            "insert_escape",
            ModeSet::INSERT,
            vec![vec![KeyToken::esc()]],
            leave_insert,
        )
        .runs_once(),
    );
    reg.register(
        CommandDescriptor::new(
            "visual_char_toggle",
            ModeSet::NORMAL | VISUAL,
            vec![vec![KeyToken::ch('v')]],
            toggle_visual_char,
        )
        .runs_once()
        .applies_when(no_operator_pending),
    );
    reg.register(
        CommandDescriptor::new(
            "visual_line_toggle",
            ModeSet::NORMAL | VISUAL,
            vec![vec![KeyToken::ch('V')]],
            toggle_visual_line,
        )
        .runs_once()
        .applies_when(no_operator_pending),
    );
    reg.register(
        CommandDescriptor::new(
            "visual_escape",
            VISUAL,
            vec![vec![KeyToken::esc()]],
            leave_visual,
        )
        .runs_once(),
    );
    reg.register(
        CommandDescriptor::new(
            "dot_repeat",
            ModeSet::NORMAL,
            vec![vec![KeyToken::ch('.')]],
            dot_repeat,
        )
        .runs_once()
        .applies_when(replay_ready),
    );

    coerce::register(&mut reg);
    reg
}
