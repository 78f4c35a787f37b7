//! Constraint functions for JIT compiler tuning flags.
//!
//! Each function validates one flag (or one flag of a tightly coupled pair).
//! In [`Mode::Strict`](crate::core::types::Mode::Strict) a violation is
//! reported and returned; in auto-correct mode a flag with a correction path
//! gets the nearest acceptable value written back and announced. Flags
//! without a correction path are violated in both modes.

use crate::core::context::ConstraintContext;
use crate::core::names::{
    ALLOCATE_PREFETCH_DISTANCE, ALLOCATE_PREFETCH_INSTR, ALLOCATE_PREFETCH_STEP_SIZE,
    ALLOCATE_PREFETCH_STYLE, ARRAYCOPY_DST_PREFETCH_DISTANCE, ARRAYCOPY_SRC_PREFETCH_DISTANCE,
    AVX3_THRESHOLD, CI_COMPILER_COUNT, CODE_CACHE_SEGMENT_SIZE, CODE_ENTRY_ALIGNMENT,
    COMPILE_THRESHOLD, INIT_ARRAY_SHORT_SIZE, INTERIOR_ENTRY_ALIGNMENT,
    INTERPRETER_PROFILE_PERCENTAGE, LOOP_STRIP_MINING_ITER, MAX_NODE_LIMIT,
    NODE_LIMIT_FUDGE_FACTOR, ON_STACK_REPLACE_PERCENTAGE, OPTO_LOOP_ALIGNMENT,
    PROFILE_INTERPRETER, RTM_TOTAL_COUNT_INCR_RATE, USE_COUNTED_LOOP_SAFEPOINTS,
    USE_RTM_LOCKING,
};
use crate::core::platform::Platform;
use crate::core::primitives::{
    clamp_to, in_range, is_multiple_of, is_power_of_two, round_down_to_multiple,
    round_down_to_power_of_two,
};
use crate::core::types::{ConstraintResult, FlagValue};

/// Low bits of the interpreter invocation counter reserved for state.
pub const INVOCATION_COUNT_SHIFT: u32 = 1;
/// Highest compile threshold the invocation counter can represent.
pub const MAX_COMPILE_THRESHOLD: i64 = (i32::MAX >> INVOCATION_COUNT_SHIFT) as i64;
pub const MAX_ALLOCATE_PREFETCH_DISTANCE: i64 = 512;
/// Array-copy prefetch distances must stay below this.
pub const ARRAYCOPY_PREFETCH_LIMIT: u64 = 4032;
pub const MIN_CODE_ENTRY_ALIGNMENT: i64 = 16;
/// Size of a double-precision constant in the code cache.
pub const DOUBLE_SIZE: u64 = 8;
/// Size of a Java long in bytes.
pub const BYTES_PER_LONG: i64 = 8;
/// Value `AllocatePrefetchStyle` takes for the stepped prefetch strategy.
pub const STEPPED_PREFETCH_STYLE: i64 = 3;
/// Replacement for an invalid transactional-locking increment rate.
pub const DEFAULT_RTM_TOTAL_COUNT_INCR_RATE: i64 = 64;

/// Minimum compiler threads for the configured tiers.
pub fn min_compiler_threads(platform: &dyn Platform) -> i64 {
    if platform.is_tiered() {
        2
    } else if !platform.is_interpreter_only() {
        1
    } else {
        0
    }
}

/// Shared clamp-or-reject for plain signed ranges.
fn enforce_range(
    cx: &mut ConstraintContext<'_>,
    verbose: bool,
    flag: &str,
    value: i64,
    (min, max): (i64, i64),
    describe: impl FnOnce() -> String,
) -> ConstraintResult {
    if in_range(value, min, max) {
        return Ok(());
    }
    if cx.corrects() {
        return cx.substitute(flag, FlagValue::Int(clamp_to(value, min, max)));
    }
    cx.reject(verbose, flag, FlagValue::Int(value), describe())
}

pub fn ci_compiler_count(
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if !cx.platform.has_compiler() {
        if value <= 0 {
            return Ok(());
        }
        if cx.corrects() {
            return cx.substitute(CI_COMPILER_COUNT, FlagValue::Int(-1));
        }
        return cx.reject(
            verbose,
            CI_COMPILER_COUNT,
            FlagValue::Int(value),
            format!(
                "CICompilerCount ({value}) cannot be greater than 0 because there are no compilers"
            ),
        );
    }

    let min = min_compiler_threads(cx.platform);
    if value >= min {
        return Ok(());
    }
    if cx.corrects() {
        return cx.substitute(CI_COMPILER_COUNT, FlagValue::Int(min));
    }
    cx.reject(
        verbose,
        CI_COMPILER_COUNT,
        FlagValue::Int(value),
        format!("CICompilerCount ({value}) must be at least {min}"),
    )
}

pub fn allocate_prefetch_distance(
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    enforce_range(
        cx,
        verbose,
        ALLOCATE_PREFETCH_DISTANCE,
        value,
        (0, MAX_ALLOCATE_PREFETCH_DISTANCE),
        || {
            format!(
                "AllocatePrefetchDistance ({value}) must be between 0 and {MAX_ALLOCATE_PREFETCH_DISTANCE}"
            )
        },
    )
}

/// Only the stepped prefetch style requires word-multiple steps.
pub fn allocate_prefetch_step_size(
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if cx.int(ALLOCATE_PREFETCH_STYLE)? != STEPPED_PREFETCH_STYLE {
        return Ok(());
    }
    let word = cx.platform.word_size();
    if is_multiple_of(value, word) {
        return Ok(());
    }
    if cx.corrects() {
        return cx.substitute(
            ALLOCATE_PREFETCH_STEP_SIZE,
            FlagValue::Int(round_down_to_multiple(value, word)),
        );
    }
    cx.reject(
        verbose,
        ALLOCATE_PREFETCH_STEP_SIZE,
        FlagValue::Int(value),
        format!("AllocatePrefetchStepSize ({value}) must be multiple of {word}"),
    )
}

pub fn allocate_prefetch_instr(
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    let max = cx.platform.arch().prefetch_instr_max();
    enforce_range(cx, verbose, ALLOCATE_PREFETCH_INSTR, value, (0, max), || {
        format!("AllocatePrefetchInstr ({value}) must be between 0 and {max}")
    })
}

pub fn compile_threshold(
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    enforce_range(
        cx,
        verbose,
        COMPILE_THRESHOLD,
        value,
        (0, MAX_COMPILE_THRESHOLD),
        || format!("CompileThreshold ({value}) must be between 0 and {MAX_COMPILE_THRESHOLD}"),
    )
}

/// Bounds derive from `CompileThreshold`, which is re-checked first.
///
/// With interpreter profiling the floor is `InterpreterProfilePercentage`
/// and the ceiling is lifted by the same amount; without it the floor is 0
/// and the counter range shrinks by the invocation count shift.
pub fn on_stack_replace_percentage(
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    let threshold = cx.int(COMPILE_THRESHOLD)?;
    if compile_threshold(threshold, false, cx).is_err() {
        return cx.reject(
            verbose,
            ON_STACK_REPLACE_PERCENTAGE,
            FlagValue::Int(value),
            "OnStackReplacePercentage cannot be validated because CompileThreshold value is invalid"
                .to_string(),
        );
    }
    // The prerequisite check may have corrected the threshold.
    let threshold = cx.int(COMPILE_THRESHOLD)?;
    let profiling = cx.boolean(PROFILE_INTERPRETER)?;

    let mut ceiling = i64::from(i32::MAX);
    if !profiling {
        ceiling >>= INVOCATION_COUNT_SHIFT;
    }
    ceiling = if threshold == 0 {
        ceiling * 100
    } else {
        ceiling * 100 / threshold
    };

    let floor = if profiling {
        cx.int(INTERPRETER_PROFILE_PERCENTAGE)?
    } else {
        0
    };
    if profiling {
        ceiling = ceiling.saturating_add(floor);
    }

    if value < floor {
        if cx.corrects() {
            return cx.substitute(ON_STACK_REPLACE_PERCENTAGE, FlagValue::Int(floor));
        }
        let reason = if profiling {
            format!(
                "OnStackReplacePercentage ({value}) must be larger than InterpreterProfilePercentage ({floor})"
            )
        } else {
            format!("OnStackReplacePercentage ({value}) must be non-negative")
        };
        return cx.reject(verbose, ON_STACK_REPLACE_PERCENTAGE, FlagValue::Int(value), reason);
    }

    if value > ceiling {
        if cx.corrects() {
            return cx.substitute(ON_STACK_REPLACE_PERCENTAGE, FlagValue::Int(ceiling));
        }
        return cx.reject(
            verbose,
            ON_STACK_REPLACE_PERCENTAGE,
            FlagValue::Int(value),
            format!("OnStackReplacePercentage ({value}) must be between 0 and {ceiling}"),
        );
    }

    Ok(())
}

/// No correction path: the segment size is a development flag.
pub fn code_cache_segment_size(
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    let entry = cx.int(CODE_ENTRY_ALIGNMENT)?;
    if i128::from(value) < i128::from(entry) {
        return cx.reject(
            verbose,
            CODE_CACHE_SEGMENT_SIZE,
            FlagValue::Uint(value),
            format!(
                "CodeCacheSegmentSize ({value}) must be larger than or equal to CodeEntryAlignment ({entry}) to align entry points"
            ),
        );
    }

    if value < DOUBLE_SIZE {
        return cx.reject(
            verbose,
            CODE_CACHE_SEGMENT_SIZE,
            FlagValue::Uint(value),
            format!("CodeCacheSegmentSize ({value}) must be at least {DOUBLE_SIZE} to align constants"),
        );
    }

    if cx.platform.has_c2() {
        let loop_alignment = cx.int(OPTO_LOOP_ALIGNMENT)?;
        if i128::from(value) < i128::from(loop_alignment) {
            return cx.reject(
                verbose,
                CODE_CACHE_SEGMENT_SIZE,
                FlagValue::Uint(value),
                format!(
                    "CodeCacheSegmentSize ({value}) must be larger than or equal to OptoLoopAlignment ({loop_alignment}) to align inner loops"
                ),
            );
        }
    }

    Ok(())
}

/// No correction path: the entry alignment is a development flag.
pub fn code_entry_alignment(
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if !is_power_of_two(value) {
        return cx.reject(
            verbose,
            CODE_ENTRY_ALIGNMENT,
            FlagValue::Int(value),
            format!("CodeEntryAlignment ({value}) must be a power of two"),
        );
    }

    if value < MIN_CODE_ENTRY_ALIGNMENT {
        return cx.reject(
            verbose,
            CODE_ENTRY_ALIGNMENT,
            FlagValue::Int(value),
            format!(
                "CodeEntryAlignment ({value}) must be greater than or equal to {MIN_CODE_ENTRY_ALIGNMENT}"
            ),
        );
    }

    let segment = cx.uint(CODE_CACHE_SEGMENT_SIZE)?;
    if i128::from(value) > i128::from(segment) {
        return cx.reject(
            verbose,
            CODE_ENTRY_ALIGNMENT,
            FlagValue::Int(value),
            format!(
                "CodeEntryAlignment ({value}) must be less than or equal to CodeCacheSegmentSize ({segment}) to align entry points"
            ),
        );
    }

    Ok(())
}

pub fn opto_loop_alignment(
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    loop_alignment(OPTO_LOOP_ALIGNMENT, value, verbose, cx)
}

pub fn interior_entry_alignment(
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    loop_alignment(INTERIOR_ENTRY_ALIGNMENT, value, verbose, cx)
}

/// Power of two, multiple of the NOP size, at most `CodeEntryAlignment`,
/// at least the platform minimum.
///
/// Under auto-correct every failed sub-check adjusts the running value and
/// the final value is stored once.
fn loop_alignment(
    flag: &'static str,
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    let entry = cx.int(CODE_ENTRY_ALIGNMENT)?;
    let unit = cx.platform.addr_unit();
    let minimum = cx.platform.min_loop_alignment();
    let corrects = cx.corrects();
    let mut candidate = value;

    if !is_power_of_two(candidate) {
        if !corrects {
            return cx.reject(
                verbose,
                flag,
                FlagValue::Int(value),
                format!("{flag} ({value}) must be a power of two"),
            );
        }
        candidate = round_down_to_power_of_two(candidate);
    }

    if !is_multiple_of(candidate, unit) {
        if !corrects {
            return cx.reject(
                verbose,
                flag,
                FlagValue::Int(value),
                format!("{flag} ({value}) must be multiple of NOP size ({unit})"),
            );
        }
        candidate = round_down_to_multiple(candidate, unit);
    }

    if candidate > entry {
        if !corrects {
            return cx.reject(
                verbose,
                flag,
                FlagValue::Int(value),
                format!("{flag} ({value}) must be less or equal to CodeEntryAlignment ({entry})"),
            );
        }
        candidate = entry;
    }

    if candidate < minimum {
        if !corrects {
            return cx.reject(
                verbose,
                flag,
                FlagValue::Int(value),
                format!("{flag} ({value}) must be greater than or equal to {minimum}"),
            );
        }
        candidate = minimum;
    }

    if candidate != value {
        return cx.substitute(flag, FlagValue::Int(candidate));
    }
    Ok(())
}

fn arraycopy_prefetch_distance(
    flag: &'static str,
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if value < ARRAYCOPY_PREFETCH_LIMIT {
        return Ok(());
    }
    cx.reject(
        verbose,
        flag,
        FlagValue::Uint(value),
        format!(
            "{flag} ({value}) must be between 0 and {}",
            ARRAYCOPY_PREFETCH_LIMIT - 1
        ),
    )
}

pub fn arraycopy_src_prefetch_distance(
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    arraycopy_prefetch_distance(ARRAYCOPY_SRC_PREFETCH_DISTANCE, value, verbose, cx)
}

pub fn arraycopy_dst_prefetch_distance(
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    arraycopy_prefetch_distance(ARRAYCOPY_DST_PREFETCH_DISTANCE, value, verbose, cx)
}

pub fn avx3_threshold(
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if value == 0 || is_power_of_two(value) {
        return Ok(());
    }
    cx.reject(
        verbose,
        AVX3_THRESHOLD,
        FlagValue::Int(value),
        format!("AVX3Threshold ({value}) must be 0 or a power of two value between 0 and MAX_INT"),
    )
}

pub fn init_array_short_size(
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if is_multiple_of(value, BYTES_PER_LONG) {
        return Ok(());
    }
    cx.reject(
        verbose,
        INIT_ARRAY_SHORT_SIZE,
        FlagValue::Int(value),
        format!("InitArrayShortSize ({value}) must be a multiple of {BYTES_PER_LONG}"),
    )
}

/// Must lie within 2%..40% of `MaxNodeLimit`, whatever its current value.
///
/// A negative node limit leaves only 0 in range.
pub fn node_limit_fudge_factor(
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    let max_nodes = cx.int(MAX_NODE_LIMIT)?;
    let bounds = (percent_of(max_nodes, 2), percent_of(max_nodes, 40));
    enforce_range(cx, verbose, NODE_LIMIT_FUDGE_FACTOR, value, bounds, || {
        format!("NodeLimitFudgeFactor must be between 2% and 40% of MaxNodeLimit ({max_nodes})")
    })
}

/// `percent`% of a non-negative `base`, computed without overflow.
fn percent_of(base: i64, percent: i64) -> i64 {
    let scaled = i128::from(base.max(0)) * i128::from(percent) / 100;
    i64::try_from(scaled).unwrap_or(i64::MAX)
}

/// Resets to the default in every mode; never violated.
pub fn rtm_total_count_incr_rate(
    value: i64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if !cx.platform.has_rtm() || !cx.boolean(USE_RTM_LOCKING)? {
        return Ok(());
    }
    if is_power_of_two(value) {
        return Ok(());
    }
    cx.notice(
        verbose,
        RTM_TOTAL_COUNT_INCR_RATE,
        format!(
            "RTMTotalCountIncrRate ({value}) must be a power of 2, resetting it to {DEFAULT_RTM_TOTAL_COUNT_INCR_RATE}"
        ),
    );
    cx.substitute(
        RTM_TOTAL_COUNT_INCR_RATE,
        FlagValue::Int(DEFAULT_RTM_TOTAL_COUNT_INCR_RATE),
    )
}

/// Keeps the iteration count consistent with `UseCountedLoopSafepoints`.
///
/// Corrects in every mode. The change is announced only when the user set
/// either flag explicitly.
pub fn loop_strip_mining_iter(
    value: u64,
    _verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    let safepoints = cx.boolean(USE_COUNTED_LOOP_SAFEPOINTS)?;
    let (target, message) = if safepoints && value == 0 {
        (
            1,
            "When counted loop safepoints are enabled, LoopStripMiningIter must be at least 1 (a safepoint every 1 iteration): setting it to 1",
        )
    } else if !safepoints && value > 0 {
        (
            0,
            "Disabling counted safepoints implies no loop strip mining: setting LoopStripMiningIter to 0",
        )
    } else {
        return Ok(());
    };

    let explicit = !cx.store.is_default(USE_COUNTED_LOOP_SAFEPOINTS)
        || !cx.store.is_default(LOOP_STRIP_MINING_ITER);
    if explicit {
        return cx.substitute_with(
            LOOP_STRIP_MINING_ITER,
            FlagValue::Uint(target),
            message.to_string(),
        );
    }
    cx.overwrite(LOOP_STRIP_MINING_ITER, FlagValue::Uint(target));
    Ok(())
}
