//! Shared test utilities
//!
//! - `assertions` - `assert_ok!`, `assert_err!` and `assert_same_ids!`
//! - `fixtures` - store seeding, tree builders and bearer tokens

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;

pub use fixtures::*;
