//! Modal key-dispatch engine: command registry, key-sequence matcher, and
//! the dispatcher that turns a stream of key tokens into command execution
//! against a host buffer.
//!
//! The engine owns interpretation only. Text geometry and edits live behind
//! the [`EditHost`] trait; mode and session state live in
//! [`core_state::EditingState`]; the built-in command table comes from
//! [`commands::baseline_registry`]. A host embeds the engine as:
//!
//! ```no_run
//! use core_actions::{Dispatcher, commands};
//! use core_config::Config;
//!
//! let registry = commands::baseline_registry();
//! let dispatcher = Dispatcher::new(registry, Config::with_coerce(true));
//! # let _ = dispatcher;
//! ```
//!
//! and feeds `dispatcher.on_key(&mut host, token)` one token per keystroke.

pub mod commands;
mod descriptor;
mod dispatcher;
mod host;
mod matcher;
mod registry;

pub use descriptor::{
    ApplyPredicate, CommandCtx, CommandDescriptor, CommandOutcome, ExecFn, always_applies,
};
pub use dispatcher::{DispatchError, DispatchOutcome, Dispatcher};
pub use host::{EditHost, HostError};
pub use matcher::{KeyBuffer, MatchSet, candidates};
pub use registry::{CommandRegistry, RegistryError};
