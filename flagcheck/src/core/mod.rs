//! Deterministic constraint logic.
//!
//! Core modules perform no I/O. Every side effect goes through the
//! capabilities carried by [`context::ConstraintContext`]: the flag store,
//! the platform description, the intrinsic table and the diagnostic sink.

pub mod compiler;
pub mod context;
pub mod diagnostics;
pub mod g1;
pub mod intrinsics;
pub mod names;
pub mod packed;
pub mod pass;
pub mod platform;
pub mod primitives;
pub mod registry;
pub mod store;
pub mod types;
