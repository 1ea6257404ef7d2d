#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Shared utilities for autoload.
//!
//! Pure helpers with no logging/tracing dependencies; logging is owned by
//! the CLI crate and the core's resolver.

pub mod fs;
pub mod walk;
