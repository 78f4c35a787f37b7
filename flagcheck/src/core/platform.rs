//! Build and platform predicates consumed by constraint functions.
//!
//! Bounds that vary by target (word size, instruction address unit, loop
//! alignment minimum) and by which compiler tiers are built are queried
//! through [`Platform`], so one constraint source serves every target.

use serde::{Deserialize, Serialize};

/// Target architecture family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    X86_64,
    /// 32-bit x86.
    X86,
    Aarch64,
    Ppc64,
    S390,
    Riscv64,
}

impl Arch {
    pub fn is_x86_family(self) -> bool {
        matches!(self, Arch::X86_64 | Arch::X86)
    }

    pub fn is_lp64(self) -> bool {
        !matches!(self, Arch::X86)
    }

    pub fn word_size(self) -> i64 {
        if self.is_lp64() { 8 } else { 4 }
    }

    /// Granularity of code addresses (NOP size).
    pub fn addr_unit(self) -> i64 {
        match self {
            Arch::Aarch64 | Arch::Ppc64 => 4,
            Arch::S390 => 2,
            Arch::X86_64 | Arch::X86 | Arch::Riscv64 => 1,
        }
    }

    pub fn prefetch_instr_max(self) -> i64 {
        if self.is_x86_family() { 3 } else { i64::MAX }
    }

    pub fn min_loop_alignment(self) -> i64 {
        match self {
            Arch::X86 => 4,
            Arch::S390 => 2,
            _ => 16,
        }
    }

    pub fn default_code_entry_alignment(self) -> i64 {
        match self {
            Arch::X86 => 16,
            Arch::X86_64 => 32,
            Arch::Aarch64 | Arch::Ppc64 | Arch::S390 | Arch::Riscv64 => 64,
        }
    }

    pub fn default_opto_loop_alignment(self) -> i64 {
        match self {
            Arch::S390 => 2,
            _ => 16,
        }
    }
}

/// Capability queries about the build and target.
pub trait Platform {
    fn arch(&self) -> Arch;
    /// Client compiler (C1) is built.
    fn has_c1(&self) -> bool;
    /// Server compiler (C2) is built.
    fn has_c2(&self) -> bool;
    fn is_tiered(&self) -> bool;
    fn is_interpreter_only(&self) -> bool;
    /// Restricted transactional memory locking support is compiled in.
    fn has_rtm(&self) -> bool;

    fn has_compiler(&self) -> bool {
        self.has_c1() || self.has_c2()
    }

    fn word_size(&self) -> i64 {
        self.arch().word_size()
    }

    fn addr_unit(&self) -> i64 {
        self.arch().addr_unit()
    }

    fn min_loop_alignment(&self) -> i64 {
        self.arch().min_loop_alignment()
    }
}

/// Declarative platform description, loadable from the `[platform]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformProfile {
    pub arch: Arch,
    pub c1: bool,
    pub c2: bool,
    pub tiered: bool,
    pub interpreter_only: bool,
    pub rtm: bool,
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self::server(Arch::X86_64)
    }
}

impl PlatformProfile {
    /// Both compilers, tiered.
    pub fn server(arch: Arch) -> Self {
        Self {
            arch,
            c1: true,
            c2: true,
            tiered: true,
            interpreter_only: false,
            rtm: false,
        }
    }

    /// C1 only.
    pub fn client(arch: Arch) -> Self {
        Self {
            c2: false,
            tiered: false,
            ..Self::server(arch)
        }
    }

    /// Compilers built but disabled at runtime.
    pub fn interpreter_only(arch: Arch) -> Self {
        Self {
            tiered: false,
            interpreter_only: true,
            ..Self::server(arch)
        }
    }

    /// No compiler built at all.
    pub fn zero(arch: Arch) -> Self {
        Self {
            arch,
            c1: false,
            c2: false,
            tiered: false,
            interpreter_only: true,
            rtm: false,
        }
    }

    /// Human-readable inconsistencies in the profile (empty when coherent).
    pub fn inconsistencies(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.tiered && !(self.c1 && self.c2) {
            errors.push("platform.tiered requires both c1 and c2".to_string());
        }
        if self.tiered && self.interpreter_only {
            errors.push("platform.tiered conflicts with platform.interpreter_only".to_string());
        }
        if !self.c1 && !self.c2 && !self.interpreter_only {
            errors.push("platform without compilers must be interpreter_only".to_string());
        }
        errors
    }
}

impl Platform for PlatformProfile {
    fn arch(&self) -> Arch {
        self.arch
    }

    fn has_c1(&self) -> bool {
        self.c1
    }

    fn has_c2(&self) -> bool {
        self.c2
    }

    fn is_tiered(&self) -> bool {
        self.tiered
    }

    fn is_interpreter_only(&self) -> bool {
        self.interpreter_only
    }

    fn has_rtm(&self) -> bool {
        self.rtm
    }
}
