//! Core domain and application logic for the whisperlink relay bot.
//!
//! This crate is framework-agnostic: link issuance, rotation and anonymous
//! forwarding live here, and the Telegram transport is reached only through
//! the [`outbound::SendPort`] trait. The `wl-telegram` crate supplies the
//! real implementation; tests substitute fakes.

pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod outbound;
pub mod registry;
pub mod relay;

pub use errors::{Error, Result};
