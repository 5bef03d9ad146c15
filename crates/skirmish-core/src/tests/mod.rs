//! Crate-level scenario tests.
//!
//! - `determinism.rs`: same seed and same inputs replay the same fight
//! - `integration.rs`: full fights through the combat manager
//! - `helpers.rs`: unit factories and a scripted player side

mod helpers;

pub use helpers::*;
