//! Shared fixtures for the engine integration tests: a recording stub host
//! and a pre-wired dispatcher.
#![allow(dead_code)]

use core_actions::{DispatchOutcome, Dispatcher, EditHost, HostError, commands};
use core_config::Config;
use core_keys::KeyToken;
use core_state::OperatorKind;
use core_text::{CaseStyle, Position, Range, Scope};
use std::collections::HashMap;

pub const LINE_END: usize = 24;

/// Stub buffer side: answers text-object queries from a fixed table and
/// records every edit request instead of performing it.
#[derive(Default)]
pub struct SpyHost {
    objects: HashMap<char, Range>,
    pub resolutions: Vec<(char, Scope)>,
    pub transforms: Vec<(Range, CaseStyle)>,
    pub operators: Vec<(OperatorKind, Range)>,
    /// Make `apply_transform` fail, for error-path tests.
    pub fail_transforms: bool,
}

impl SpyHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, token: char, range: Range) -> Self {
        self.objects.insert(token, range);
        self
    }
}

impl EditHost for SpyHost {
    fn resolve_text_object(
        &mut self,
        token: char,
        _position: Position,
        scope: Scope,
    ) -> Option<Range> {
        self.resolutions.push((token, scope));
        self.objects.get(&token).copied()
    }

    fn apply_transform(&mut self, range: Range, style: CaseStyle) -> Result<(), HostError> {
        if self.fail_transforms {
            return Err(HostError::BufferEdit("read-only buffer".into()));
        }
        self.transforms.push((range, style));
        Ok(())
    }

    fn apply_operator(&mut self, op: OperatorKind, range: Range) -> Result<(), HostError> {
        self.operators.push((op, range));
        Ok(())
    }

    fn line_object_range(&mut self, position: Position) -> Range {
        Range::new(
            Position::new(position.line, 0),
            Position::new(position.line, LINE_END),
        )
    }
}

/// Opt-in log output while debugging a test run, via `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Dispatcher over the built-in registry with the coerce gate set as given.
pub fn engine(coerce: bool) -> Dispatcher {
    init_tracing();
    Dispatcher::new(commands::baseline_registry(), Config::with_coerce(coerce))
        .expect("built-in registry validates")
}

/// Feed one character per keystroke, collecting per-key outcomes. Panics on
/// dispatch errors; tests that expect an error call `on_key` directly.
pub fn feed_str(
    dispatcher: &mut Dispatcher,
    host: &mut SpyHost,
    keys: &str,
) -> Vec<DispatchOutcome> {
    keys.chars()
        .map(|c| {
            dispatcher
                .on_key(host, KeyToken::ch(c))
                .unwrap_or_else(|e| panic!("dispatch failed on `{c}`: {e}"))
        })
        .collect()
}

pub fn feed_esc(dispatcher: &mut Dispatcher, host: &mut SpyHost) -> DispatchOutcome {
    dispatcher
        .on_key(host, KeyToken::esc())
        .expect("escape dispatch failed")
}

pub fn executed(command: &'static str) -> DispatchOutcome {
    DispatchOutcome::Executed { command }
}

pub fn word_range() -> Range {
    Range::new(Position::new(0, 4), Position::new(0, 14))
}
