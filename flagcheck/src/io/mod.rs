//! I/O helpers for flagcheck commands.

pub mod config;
