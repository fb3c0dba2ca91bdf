//! # Lullaby Library
//!
//! Internal library for the lullaby binary.
//!
//! This library exists to enable testing of the controller internals and to
//! keep CLI dispatch (main.rs) apart from application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Lullaby` struct runs the daemon with resource management
//! - **Core Logic**: `core` module holds the controller, its dial responders,
//!   the event serializer and the ticker; `core::period` classifies the day
//! - **Backends**: `backend` module with the player abstraction and the `mpc` client
//! - **Configuration**: `config` module for TOML-based settings with reload
//! - **Infrastructure**: dial device input, signal handling, the instance
//!   lock, logging and the time source

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod common;

// Public API modules
pub mod args;
pub mod backend;
pub mod config;
pub mod core;
pub mod io;
pub mod time;

mod lullaby;

// Re-export for binary
pub use core::period::Period;
pub use lullaby::Lullaby;
