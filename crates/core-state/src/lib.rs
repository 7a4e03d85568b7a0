//! Editing state threaded through every command: mode machine, recorded
//! operator, dot-repeat replay log, cursors.
//!
//! Mode payloads live inside the mode value itself
//! (`ModeState::CoerceInput(CoerceSession)`), so a sub-mode session exists
//! exactly while its mode is active. There is no `active` flag to keep in
//! sync and no way to hold a resolved range in a dead session; leaving the
//! mode drops the payload.
//!
//! `EditingState` is exclusively owned by the dispatcher for the duration of
//! one key. Commands receive `&mut EditingState` and hand it back; no
//! aliasing, no locking.

use core_keys::KeyToken;
use core_text::{CaseStyle, Position, Range};
use tracing::debug;

// -------------------------------------------------------------------------------------------------
// Modes
// -------------------------------------------------------------------------------------------------

/// Discriminant-only mode identity, used wherever a mode must be compared
/// or stored in a descriptor's mode set without dragging payload along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Normal,
    Insert,
    VisualChar,
    VisualLine,
    VisualBlock,
    CoerceInput,
}

impl ModeKind {
    pub const ALL: [ModeKind; 6] = [
        ModeKind::Normal,
        ModeKind::Insert,
        ModeKind::VisualChar,
        ModeKind::VisualLine,
        ModeKind::VisualBlock,
        ModeKind::CoerceInput,
    ];

    fn bit(self) -> ModeSet {
        match self {
            ModeKind::Normal => ModeSet::NORMAL,
            ModeKind::Insert => ModeSet::INSERT,
            ModeKind::VisualChar => ModeSet::VISUAL_CHAR,
            ModeKind::VisualLine => ModeSet::VISUAL_LINE,
            ModeKind::VisualBlock => ModeSet::VISUAL_BLOCK,
            ModeKind::CoerceInput => ModeSet::COERCE_INPUT,
        }
    }
}

bitflags::bitflags! {
    /// Set of modes a command descriptor is eligible in.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ModeSet: u8 {
        const NORMAL       = 1;
        const INSERT       = 2;
        const VISUAL_CHAR  = 4;
        const VISUAL_LINE  = 8;
        const VISUAL_BLOCK = 16;
        const COERCE_INPUT = 32;
    }
}

impl ModeSet {
    pub fn contains_kind(&self, kind: ModeKind) -> bool {
        self.contains(kind.bit())
    }
}

impl From<ModeKind> for ModeSet {
    fn from(kind: ModeKind) -> Self {
        kind.bit()
    }
}

// -------------------------------------------------------------------------------------------------
// Operators
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Change,
    Delete,
    Yank,
}

impl OperatorKind {
    pub fn key(self) -> char {
        match self {
            OperatorKind::Change => 'c',
            OperatorKind::Delete => 'd',
            OperatorKind::Yank => 'y',
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Coerce session (sub-mode payload)
// -------------------------------------------------------------------------------------------------

/// Target keys accepted while a coerce session awaits its text object.
/// Includes the `b B r a` aliases canonicalized by `canonical_target`.
pub const COERCE_TARGET_KEYS: [char; 20] = [
    '(', ')', '{', '}', '[', ']', '<', '>', '\'', '"', '`', 't', 'w', 'W', 's', 'p', 'b', 'B',
    'r', 'a',
];

/// Map target aliases to the canonical delimiter the resolvers understand.
pub fn canonical_target(key: char) -> char {
    match key {
        'b' => ')',
        'B' => '}',
        'r' => ']',
        'a' => '>',
        other => other,
    }
}

/// Payload of the coerce operator-pending sub-mode. One instance per
/// session; exists only while `ModeState::CoerceInput` is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceSession {
    /// Outer operator that opened the session. Entry guards restrict this
    /// to `Change`; the field records it for replay diagnostics.
    pub operator: OperatorKind,
    /// Canonical target token, set at most once.
    pub target: Option<char>,
    /// Destination case style, set once the replacement key arrives.
    pub replacement: Option<CaseStyle>,
    /// Resolved text-object span, set once the target is located.
    pub range: Option<Range>,
    /// Entered from a linewise visual selection.
    pub visual_line: bool,
}

impl CoerceSession {
    pub fn new(operator: OperatorKind) -> Self {
        Self {
            operator,
            target: None,
            replacement: None,
            range: None,
            visual_line: false,
        }
    }

    /// A session accepts a target key only before a target or range exists.
    pub fn awaiting_target(&self) -> bool {
        self.target.is_none() && self.range.is_none()
    }

    /// A session accepts a replacement key once a target token or a
    /// pre-resolved span exists, before a style is chosen.
    pub fn awaiting_replacement(&self) -> bool {
        self.replacement.is_none() && (self.target.is_some() || self.range.is_some())
    }

    pub fn set_target(&mut self, key: char) {
        debug_assert!(self.awaiting_target(), "target set twice in one session");
        self.target = Some(canonical_target(key));
    }
}

// -------------------------------------------------------------------------------------------------
// Mode state (kind + payload)
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeState {
    Normal,
    Insert,
    VisualChar,
    VisualLine,
    VisualBlock,
    CoerceInput(CoerceSession),
}

impl ModeState {
    pub fn kind(&self) -> ModeKind {
        match self {
            ModeState::Normal => ModeKind::Normal,
            ModeState::Insert => ModeKind::Insert,
            ModeState::VisualChar => ModeKind::VisualChar,
            ModeState::VisualLine => ModeKind::VisualLine,
            ModeState::VisualBlock => ModeKind::VisualBlock,
            ModeState::CoerceInput(_) => ModeKind::CoerceInput,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Recorded state & replay log
// -------------------------------------------------------------------------------------------------

/// Dot-repeat key record. Populated only when a coerce session starts;
/// immutable until the next session begins. `start_index` points into the
/// global key history at the moment of arming so playback can pick up the
/// keys typed after the session opened.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayLog {
    keys: Vec<KeyToken>,
    start_index: usize,
}

impl ReplayLog {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[KeyToken] {
        &self.keys
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Record a session start: exactly two tokens (the operator key and the
    /// sub-mode trigger key) plus the history length at this moment.
    /// Earlier records are kept in place; a stale start index on nested
    /// repeats is a known limitation.
    pub fn begin_session(
        &mut self,
        operator_key: KeyToken,
        trigger_key: KeyToken,
        history_len: usize,
    ) {
        self.keys.push(operator_key);
        self.keys.push(trigger_key);
        self.start_index = history_len;
        debug!(
            target: "state.replay",
            recorded = self.keys.len(),
            start_index = self.start_index,
            "replay_session_begin"
        );
    }

    /// Keys to feed back for a verbatim re-execution: the recorded prefix
    /// followed by everything typed since the session was armed.
    pub fn playback(&self, history: &[KeyToken]) -> Vec<KeyToken> {
        let mut out = self.keys.clone();
        if self.start_index <= history.len() {
            out.extend_from_slice(&history[self.start_index..]);
        }
        out
    }
}

/// Operator currently pending plus the replay record, the "recorded state"
/// every command can inspect.
#[derive(Debug, Default, Clone)]
pub struct RecordedState {
    pub operator: Option<OperatorKind>,
    pub replay: ReplayLog,
    /// True while queued playback keys are being re-fed; gates the repeat
    /// command so playback cannot recurse.
    pub replaying: bool,
}

// -------------------------------------------------------------------------------------------------
// Editing state
// -------------------------------------------------------------------------------------------------

/// The single shared mutable context for one editing session (one buffer /
/// view). Handed by value through the dispatch chain; never aliased.
#[derive(Debug, Clone)]
pub struct EditingState {
    mode: ModeState,
    pub recorded: RecordedState,
    /// Append-only log of every token fed to the dispatcher.
    pub key_history: Vec<KeyToken>,
    /// Active cursors, primary first. Always non-empty.
    pub cursors: Vec<Position>,
}

impl Default for EditingState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditingState {
    pub fn new() -> Self {
        Self {
            mode: ModeState::Normal,
            recorded: RecordedState::default(),
            key_history: Vec::new(),
            cursors: vec![Position::origin()],
        }
    }

    pub fn mode(&self) -> &ModeState {
        &self.mode
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn set_mode(&mut self, mode: ModeState) {
        if self.mode.kind() != mode.kind() {
            debug!(target: "state.mode", from = ?self.mode.kind(), to = ?mode.kind(), "mode_change");
        }
        self.mode = mode;
    }

    /// Active coerce session, if the coerce sub-mode is current.
    pub fn coerce(&self) -> Option<&CoerceSession> {
        match &self.mode {
            ModeState::CoerceInput(session) => Some(session),
            _ => None,
        }
    }

    pub fn coerce_mut(&mut self) -> Option<&mut CoerceSession> {
        match &mut self.mode {
            ModeState::CoerceInput(session) => Some(session),
            _ => None,
        }
    }

    /// Leave any sub-mode, returning the dropped session so callers can log
    /// or inspect it. No buffer mutation happens here.
    pub fn leave_to_normal(&mut self) -> Option<CoerceSession> {
        match std::mem::replace(&mut self.mode, ModeState::Normal) {
            ModeState::CoerceInput(session) => {
                debug!(target: "state.mode", "coerce_session_dropped");
                Some(session)
            }
            _ => None,
        }
    }

    /// First cursor, or the origin if an embedding host emptied the set.
    pub fn primary_cursor(&self) -> Position {
        self.cursors
            .first()
            .copied()
            .unwrap_or_else(Position::origin)
    }
}
