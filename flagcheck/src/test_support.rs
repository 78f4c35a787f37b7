//! Test-only helpers for building constraint contexts and config files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::context::ConstraintContext;
use crate::core::diagnostics::RecordingSink;
use crate::core::intrinsics::BuiltinIntrinsics;
use crate::core::platform::PlatformProfile;
use crate::core::store::{FlagStore, FlagTable};
use crate::core::types::{FlagValue, Mode};
use crate::io::config::{CONFIG_FILE, CheckConfig, write_config};

/// Owned capabilities for one or more constraint calls.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub store: FlagTable,
    pub platform: PlatformProfile,
    pub intrinsics: BuiltinIntrinsics,
    pub sink: RecordingSink,
}

impl Fixture {
    /// Runtime defaults for `platform`, nothing recorded yet.
    pub fn new(platform: PlatformProfile) -> Self {
        Self {
            store: FlagTable::runtime_defaults(&platform),
            platform,
            intrinsics: BuiltinIntrinsics,
            sink: RecordingSink::new(),
        }
    }

    /// Tiered x86_64 server build.
    pub fn server() -> Self {
        Self::new(PlatformProfile::default())
    }

    /// Replace a value, keeping it at default origin.
    pub fn with_flag(mut self, name: &str, value: FlagValue) -> Self {
        self.store.define(name, value);
        self
    }

    /// Set a value as if the user passed it explicitly.
    pub fn with_command_line(mut self, name: &str, value: FlagValue) -> Self {
        self.store.set_command_line(name, value);
        self
    }

    pub fn cx(&mut self, mode: Mode) -> ConstraintContext<'_> {
        ConstraintContext {
            mode,
            store: &mut self.store,
            platform: &self.platform,
            intrinsics: &self.intrinsics,
            sink: &mut self.sink,
        }
    }

    pub fn value(&self, name: &str) -> Option<FlagValue> {
        self.store.get(name)
    }
}

/// A temporary working directory holding a `flagcheck.toml`.
pub struct ConfigDir {
    dir: tempfile::TempDir,
}

impl ConfigDir {
    pub fn new(cfg: &CheckConfig) -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        write_config(&dir.path().join(CONFIG_FILE), cfg)?;
        Ok(Self { dir })
    }

    /// Write raw TOML, bypassing validation.
    pub fn with_contents(contents: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        std::fs::write(dir.path().join(CONFIG_FILE), contents).context("write config")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join(CONFIG_FILE)
    }
}
