//! Stable exit codes for flagcheck CLI commands.

/// Command succeeded; for `check`, every constraint is satisfied.
pub const OK: i32 = 0;
/// Unreadable or ill-typed input: bad config, unknown flag, I/O failure.
pub const INVALID: i32 = 1;
/// `flagcheck check` finished with at least one violated constraint.
pub const VIOLATED: i32 = 2;
