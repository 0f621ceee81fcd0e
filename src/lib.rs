//! irori, your comfy IRC server.
//!
//! irori keeps a whole IRC network in one process: clients register behind a
//! shared password, then talk through named channels guarded by the classic
//! mode flags (invite-only, topic lock, key, user limit, per-user operator).
//!
//! The crate is a library so that the state can be driven directly in tests;
//! the `irori` binary wires it to a TCP listener.

pub mod channel;
pub mod client;
pub mod config;
mod lines;
pub mod net;
pub mod state;

pub use crate::config::{Config, StateConfig};
pub use crate::state::State;
