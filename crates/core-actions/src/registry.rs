//! Process-wide command table. Registered once at startup, read-only
//! afterwards; registration order never affects matching (the matcher
//! returns every candidate and the dispatcher rejects ambiguity
//! deterministically).

use crate::descriptor::CommandDescriptor;
use core_keys::{KeyToken, render_sequence};
use core_state::ModeKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two descriptors share a mode, a key sequence, and the same applies
    /// predicate: they would always complete together and dispatch could
    /// never choose deterministically.
    #[error("commands `{first}` and `{second}` collide in {mode:?} on `{sequence}`")]
    Conflict {
        first: &'static str,
        second: &'static str,
        mode: ModeKind,
        sequence: String,
    },
}

#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: CommandDescriptor) {
        self.commands.push(descriptor);
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Startup self-check for configuration conflicts. Descriptors with an
    /// identical static signature but distinct predicates (the coerce
    /// start/repeat pair) are legal; they disambiguate on state, and the
    /// dispatcher still fails fast should both ever complete at once.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for (i, a) in self.commands.iter().enumerate() {
            for b in &self.commands[i + 1..] {
                let shared = a.modes & b.modes;
                if shared.is_empty() {
                    continue;
                }
                if !std::ptr::fn_addr_eq(a.applies_fn(), b.applies_fn()) {
                    continue;
                }
                if let Some(seq) = first_shared_sequence(a, b) {
                    let mode = ModeKind::ALL
                        .into_iter()
                        .find(|k| shared.contains_kind(*k))
                        .unwrap_or(ModeKind::Normal);
                    return Err(RegistryError::Conflict {
                        first: a.name,
                        second: b.name,
                        mode,
                        sequence: render_sequence(seq),
                    });
                }
            }
        }
        Ok(())
    }
}

fn first_shared_sequence<'a>(
    a: &'a CommandDescriptor,
    b: &CommandDescriptor,
) -> Option<&'a [KeyToken]> {
    a.sequences()
        .find(|sa| b.sequences().any(|sb| sb == *sa))
}
