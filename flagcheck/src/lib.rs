//! Validation and auto-correction of JVM tuning flags.
//!
//! Each constrained flag has a function that accepts or rejects a proposed
//! value given the values of the flags it depends on. In auto-correct mode a
//! rejected value with a correction path is replaced by the nearest
//! acceptable one and the replacement is announced.
//!
//! - **[`core`]**: Pure constraint logic, the registry and the validation
//!   pass. All state lives behind injected capabilities.
//! - **[`io`]**: The `flagcheck.toml` configuration file.
//!
//! [`check`] ties the two together for the CLI.

pub mod check;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
