//! Flag storage capability and its in-memory implementation.
//!
//! Constraint functions never touch process globals; they read and write
//! flags through [`FlagStore`]. [`FlagTable`] is the in-memory store used by
//! the CLI and by tests.

use std::collections::BTreeMap;

use crate::core::names::{
    ALLOCATE_PREFETCH_DISTANCE, ALLOCATE_PREFETCH_INSTR, ALLOCATE_PREFETCH_STEP_SIZE,
    ALLOCATE_PREFETCH_STYLE, ARRAYCOPY_DST_PREFETCH_DISTANCE, ARRAYCOPY_SRC_PREFETCH_DISTANCE,
    AVX3_THRESHOLD, CI_COMPILER_COUNT, CODE_CACHE_SEGMENT_SIZE, CODE_ENTRY_ALIGNMENT,
    COMPILE_THRESHOLD, CONTROL_INTRINSIC, DISABLE_INTRINSIC, G1_HEAP_REGION_SIZE,
    G1_MAX_NEW_SIZE_PERCENT, G1_NEW_SIZE_PERCENT, G1_REM_SET_ARRAY_OF_CARDS_ENTRIES,
    G1_REM_SET_HOWL_MAX_NUM_BUCKETS, G1_REM_SET_HOWL_NUM_BUCKETS, GC_PAUSE_INTERVAL_MILLIS,
    INIT_ARRAY_SHORT_SIZE, INTERIOR_ENTRY_ALIGNMENT, INTERPRETER_PROFILE_PERCENTAGE,
    LOOP_STRIP_MINING_ITER, MAX_GC_PAUSE_MILLIS, MAX_NODE_LIMIT, NEW_SIZE,
    NODE_LIMIT_FUDGE_FACTOR, ON_STACK_REPLACE_PERCENTAGE, OPTO_LOOP_ALIGNMENT,
    PROFILE_INTERPRETER, RTM_TOTAL_COUNT_INCR_RATE, TYPE_PROFILE_LEVEL, USE_COUNTED_LOOP_SAFEPOINTS,
    USE_G1_GC, USE_RTM_LOCKING, VERIFY_ITERATIVE_GVN,
};
use crate::core::platform::Platform;
use crate::core::types::{FlagKind, FlagOrigin, FlagValue};

/// Typed get/set access to the live flag values.
pub trait FlagStore {
    fn get(&self, name: &str) -> Option<FlagValue>;

    fn origin(&self, name: &str) -> Option<FlagOrigin>;

    /// Overwrite the value, keeping the flag's origin.
    fn set(&mut self, name: &str, value: FlagValue);

    /// True unless the user explicitly set the flag.
    fn is_default(&self, name: &str) -> bool {
        self.origin(name).is_none_or(|origin| origin == FlagOrigin::Default)
    }

    fn is_command_line(&self, name: &str) -> bool {
        self.origin(name) == Some(FlagOrigin::CommandLine)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    value: FlagValue,
    origin: FlagOrigin,
}

/// Ordered in-memory flag table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagTable {
    slots: BTreeMap<String, Slot>,
}

impl FlagTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runtime defaults for every flag the builtin constraints read.
    pub fn runtime_defaults(platform: &dyn Platform) -> Self {
        let arch = platform.arch();
        let both_compilers = platform.has_c1() && platform.has_c2();
        let compiler_threads = if !platform.has_compiler() {
            0
        } else if platform.is_tiered() {
            4
        } else {
            2
        };

        let mut table = Self::new();
        table
            .define(CI_COMPILER_COUNT, FlagValue::Int(compiler_threads))
            .define(ALLOCATE_PREFETCH_DISTANCE, FlagValue::Int(192))
            .define(ALLOCATE_PREFETCH_STEP_SIZE, FlagValue::Int(16))
            .define(ALLOCATE_PREFETCH_STYLE, FlagValue::Int(1))
            .define(ALLOCATE_PREFETCH_INSTR, FlagValue::Int(0))
            .define(COMPILE_THRESHOLD, FlagValue::Int(10_000))
            .define(ON_STACK_REPLACE_PERCENTAGE, FlagValue::Int(140))
            .define(INTERPRETER_PROFILE_PERCENTAGE, FlagValue::Int(33))
            .define(PROFILE_INTERPRETER, FlagValue::Bool(platform.has_c2()))
            .define(
                CODE_CACHE_SEGMENT_SIZE,
                FlagValue::Uint(if both_compilers { 128 } else { 64 }),
            )
            .define(
                CODE_ENTRY_ALIGNMENT,
                FlagValue::Int(arch.default_code_entry_alignment()),
            )
            .define(
                OPTO_LOOP_ALIGNMENT,
                FlagValue::Int(arch.default_opto_loop_alignment()),
            )
            .define(
                INTERIOR_ENTRY_ALIGNMENT,
                FlagValue::Int(arch.min_loop_alignment()),
            )
            .define(ARRAYCOPY_SRC_PREFETCH_DISTANCE, FlagValue::Uint(0))
            .define(ARRAYCOPY_DST_PREFETCH_DISTANCE, FlagValue::Uint(0))
            .define(AVX3_THRESHOLD, FlagValue::Int(4096))
            .define(TYPE_PROFILE_LEVEL, FlagValue::Uint(111))
            .define(VERIFY_ITERATIVE_GVN, FlagValue::Uint(0))
            .define(INIT_ARRAY_SHORT_SIZE, FlagValue::Int(64))
            .define(MAX_NODE_LIMIT, FlagValue::Int(80_000))
            .define(NODE_LIMIT_FUDGE_FACTOR, FlagValue::Int(2_000))
            .define(USE_RTM_LOCKING, FlagValue::Bool(false))
            .define(RTM_TOTAL_COUNT_INCR_RATE, FlagValue::Int(64))
            .define(USE_COUNTED_LOOP_SAFEPOINTS, FlagValue::Bool(true))
            .define(LOOP_STRIP_MINING_ITER, FlagValue::Uint(1_000))
            .define(DISABLE_INTRINSIC, FlagValue::List(String::new()))
            .define(CONTROL_INTRINSIC, FlagValue::List(String::new()))
            .define(USE_G1_GC, FlagValue::Bool(true))
            .define(G1_REM_SET_ARRAY_OF_CARDS_ENTRIES, FlagValue::Uint(0))
            .define(G1_REM_SET_HOWL_NUM_BUCKETS, FlagValue::Uint(8))
            .define(G1_REM_SET_HOWL_MAX_NUM_BUCKETS, FlagValue::Uint(8))
            .define(G1_HEAP_REGION_SIZE, FlagValue::Uint(0))
            .define(G1_NEW_SIZE_PERCENT, FlagValue::Uint(5))
            .define(G1_MAX_NEW_SIZE_PERCENT, FlagValue::Uint(60))
            .define(MAX_GC_PAUSE_MILLIS, FlagValue::Uint(200))
            .define(GC_PAUSE_INTERVAL_MILLIS, FlagValue::Uint(0))
            .define(NEW_SIZE, FlagValue::Uint(1 << 20));
        table
    }

    /// Insert or replace a flag with origin [`FlagOrigin::Default`].
    pub fn define(&mut self, name: &str, value: FlagValue) -> &mut Self {
        self.insert(name, value, FlagOrigin::Default)
    }

    /// Record an explicit user setting.
    pub fn set_command_line(&mut self, name: &str, value: FlagValue) -> &mut Self {
        self.insert(name, value, FlagOrigin::CommandLine)
    }

    pub fn insert(&mut self, name: &str, value: FlagValue, origin: FlagOrigin) -> &mut Self {
        self.slots
            .insert(name.to_string(), Slot { value, origin });
        self
    }

    pub fn kind(&self, name: &str) -> Option<FlagKind> {
        self.slots.get(name).map(|slot| slot.value.kind())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Flags in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.slots
            .iter()
            .map(|(name, slot)| (name.as_str(), &slot.value))
    }
}

impl FlagStore for FlagTable {
    fn get(&self, name: &str) -> Option<FlagValue> {
        self.slots.get(name).map(|slot| slot.value.clone())
    }

    fn origin(&self, name: &str) -> Option<FlagOrigin> {
        self.slots.get(name).map(|slot| slot.origin)
    }

    fn set(&mut self, name: &str, value: FlagValue) {
        match self.slots.get_mut(name) {
            Some(slot) => slot.value = value,
            None => {
                self.define(name, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{Arch, PlatformProfile};

    #[test]
    fn set_keeps_command_line_origin() {
        let mut table = FlagTable::new();
        table.set_command_line(CI_COMPILER_COUNT, FlagValue::Int(1));
        table.set(CI_COMPILER_COUNT, FlagValue::Int(2));
        assert_eq!(table.get(CI_COMPILER_COUNT), Some(FlagValue::Int(2)));
        assert!(table.is_command_line(CI_COMPILER_COUNT));
        assert!(!table.is_default(CI_COMPILER_COUNT));
    }

    #[test]
    fn ergonomic_values_are_neither_default_nor_command_line() {
        let mut table = FlagTable::new();
        table.insert(NEW_SIZE, FlagValue::Uint(1 << 24), FlagOrigin::Ergonomic);
        assert!(!table.is_default(NEW_SIZE));
        assert!(!table.is_command_line(NEW_SIZE));
    }

    #[test]
    fn unknown_flags_count_as_default() {
        let table = FlagTable::new();
        assert!(table.is_default("Missing"));
        assert!(!table.is_command_line("Missing"));
        assert_eq!(table.get("Missing"), None);
    }

    #[test]
    fn defaults_follow_platform() {
        let server = FlagTable::runtime_defaults(&PlatformProfile::server(Arch::X86_64));
        assert_eq!(server.get(CI_COMPILER_COUNT), Some(FlagValue::Int(4)));
        assert_eq!(server.get(CODE_CACHE_SEGMENT_SIZE), Some(FlagValue::Uint(128)));
        assert_eq!(server.kind(LOOP_STRIP_MINING_ITER), Some(FlagKind::Uint));

        let zero = FlagTable::runtime_defaults(&PlatformProfile::zero(Arch::X86));
        assert_eq!(zero.get(CI_COMPILER_COUNT), Some(FlagValue::Int(0)));
        assert_eq!(zero.get(CODE_ENTRY_ALIGNMENT), Some(FlagValue::Int(16)));
        assert_eq!(zero.get(PROFILE_INTERPRETER), Some(FlagValue::Bool(false)));
    }
}
