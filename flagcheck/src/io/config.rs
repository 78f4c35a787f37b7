//! Check configuration stored in `flagcheck.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::core::platform::PlatformProfile;
use crate::core::store::FlagTable;
use crate::core::types::{FlagKind, FlagValue, Mode};

/// Default config file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "flagcheck.toml";

/// Check configuration (TOML).
///
/// Missing fields default to a strict check of a tiered server build with
/// no flag overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CheckConfig {
    pub mode: Mode,

    /// Report every violation, not just the outcome.
    pub verbose: bool,

    pub platform: PlatformProfile,

    /// Explicit flag settings, keyed by flag name.
    pub flags: BTreeMap<String, toml::Value>,
}

impl CheckConfig {
    pub fn validate(&self) -> Result<()> {
        let problems = self.platform.inconsistencies();
        if !problems.is_empty() {
            bail!("invalid platform:\n- {}", problems.join("\n- "));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `CheckConfig::default()`.
pub fn load_config(path: &Path) -> Result<CheckConfig> {
    if !path.exists() {
        let cfg = CheckConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CheckConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &CheckConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

/// Apply `[flags]` entries to `table` as explicit user settings.
///
/// Each value is decoded against the kind of the flag's runtime default.
/// Unknown flags are an error.
pub fn apply_flag_overrides(
    table: &mut FlagTable,
    flags: &BTreeMap<String, toml::Value>,
) -> Result<()> {
    for (name, raw) in flags {
        let kind = table
            .kind(name)
            .ok_or_else(|| anyhow!("unknown flag {name}"))?;
        let value = decode_flag(name, kind, raw)?;
        table.set_command_line(name, value);
    }
    Ok(())
}

fn decode_flag(name: &str, kind: FlagKind, raw: &toml::Value) -> Result<FlagValue> {
    let value = match (kind, raw) {
        (FlagKind::Int, toml::Value::Integer(value)) => FlagValue::Int(*value),
        (FlagKind::Uint, toml::Value::Integer(value)) => {
            let value = u64::try_from(*value)
                .map_err(|_| anyhow!("flag {name} must be non-negative, got {value}"))?;
            FlagValue::Uint(value)
        }
        (FlagKind::Bool, toml::Value::Boolean(value)) => FlagValue::Bool(*value),
        (FlagKind::List, toml::Value::String(value)) => FlagValue::List(value.clone()),
        (FlagKind::List, toml::Value::Array(items)) => {
            let tokens = items
                .iter()
                .map(|item| {
                    item.as_str()
                        .ok_or_else(|| anyhow!("flag {name} list entries must be strings"))
                })
                .collect::<Result<Vec<_>>>()?;
            FlagValue::List(tokens.join(","))
        }
        (kind, raw) => bail!(
            "flag {name} expects a {} value, got {}",
            kind.label(),
            raw.type_str()
        ),
    };
    Ok(value)
}
