//! Consumed collaborator interface: everything the engine needs from the
//! buffer/text layer, and nothing more. The engine never touches buffer
//! contents directly; all edits and geometry queries go through this trait
//! so the dispatch core stays testable with a stub host.

use core_state::OperatorKind;
use core_text::{CaseStyle, Position, Range, Scope};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("buffer edit failed: {0}")]
    BufferEdit(String),
}

/// Buffer-side services the dispatcher and commands call into. May suspend
/// internally (the host can be async under the hood); the engine awaits
/// completion of each call before the next matcher query, so one key is
/// always processed to completion before the next.
pub trait EditHost {
    /// Locate the text object identified by canonical `token` around
    /// `position`. `None` means the object does not exist at the cursor
    /// (no enclosing pair, no word, ...), which aborts the requesting
    /// session without mutating anything.
    fn resolve_text_object(
        &mut self,
        token: char,
        position: Position,
        scope: Scope,
    ) -> Option<Range>;

    /// Rewrite the text inside `range` into `style`.
    fn apply_transform(&mut self, range: Range, style: CaseStyle) -> Result<(), HostError>;

    /// Apply a pending operator over `range`; change/delete/yank edit
    /// semantics live host-side.
    fn apply_operator(&mut self, op: OperatorKind, range: Range) -> Result<(), HostError>;

    /// Linewise object span for the cursor's line: first non-blank through
    /// just past the end of the last word. Used by the coerce repeat
    /// emulation.
    fn line_object_range(&mut self, position: Position) -> Range;
}
