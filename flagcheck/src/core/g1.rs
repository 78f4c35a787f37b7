//! Constraint functions for G1 collector flags.
//!
//! Every function is satisfied without inspection when `UseG1GC` is off.
//! Several flags default to 0 meaning "pick ergonomically" and are only
//! checked once the user set them explicitly.

use crate::core::context::ConstraintContext;
use crate::core::names::{
    G1_HEAP_REGION_SIZE, G1_MAX_NEW_SIZE_PERCENT, G1_NEW_SIZE_PERCENT,
    G1_REM_SET_ARRAY_OF_CARDS_ENTRIES, G1_REM_SET_HOWL_MAX_NUM_BUCKETS,
    G1_REM_SET_HOWL_NUM_BUCKETS, GC_PAUSE_INTERVAL_MILLIS, MAX_GC_PAUSE_MILLIS, NEW_SIZE,
    USE_G1_GC,
};
use crate::core::primitives::round_down_to_power_of_two_u64;
use crate::core::types::{ConstraintResult, ConstraintViolation, FlagValue};

pub const MIB: u64 = 1 << 20;
/// Smallest heap region the collector can manage.
pub const MIN_REGION_SIZE: u64 = MIB;
/// Young-generation lengths are counted in regions with a 32-bit counter.
pub const MAX_NEW_SIZE: u64 = u32::MAX as u64 * MIB;

fn g1_enabled(cx: &ConstraintContext<'_>) -> Result<bool, ConstraintViolation> {
    cx.boolean(USE_G1_GC)
}

pub fn rem_set_array_of_cards_entries(
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if !g1_enabled(cx)? || !cx.store.is_command_line(G1_REM_SET_ARRAY_OF_CARDS_ENTRIES) {
        return Ok(());
    }
    if value >= 1 {
        return Ok(());
    }
    if cx.corrects() {
        return cx.substitute(G1_REM_SET_ARRAY_OF_CARDS_ENTRIES, FlagValue::Uint(1));
    }
    cx.reject(
        verbose,
        G1_REM_SET_ARRAY_OF_CARDS_ENTRIES,
        FlagValue::Uint(value),
        format!("G1RemSetArrayOfCardsEntries ({value}) must be greater than or equal to 1."),
    )
}

pub fn rem_set_howl_num_buckets(
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if !g1_enabled(cx)? || !cx.store.is_command_line(G1_REM_SET_HOWL_NUM_BUCKETS) {
        return Ok(());
    }
    if value.is_power_of_two() {
        return Ok(());
    }
    if cx.corrects() {
        let corrected = if value == 0 {
            1
        } else {
            round_down_to_power_of_two_u64(value)
        };
        return cx.substitute(G1_REM_SET_HOWL_NUM_BUCKETS, FlagValue::Uint(corrected));
    }
    cx.reject(
        verbose,
        G1_REM_SET_HOWL_NUM_BUCKETS,
        FlagValue::Uint(value),
        format!(
            "G1RemSetHowlNumBuckets ({value}) must be a power of two and greater than or equal to 1."
        ),
    )
}

pub fn rem_set_howl_max_num_buckets(
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if !g1_enabled(cx)? || !cx.store.is_command_line(G1_REM_SET_HOWL_MAX_NUM_BUCKETS) {
        return Ok(());
    }
    if value.is_power_of_two() {
        return Ok(());
    }
    if cx.corrects() {
        return cx.substitute(
            G1_REM_SET_HOWL_MAX_NUM_BUCKETS,
            FlagValue::Uint(round_down_to_power_of_two_u64(value)),
        );
    }
    cx.reject(
        verbose,
        G1_REM_SET_HOWL_MAX_NUM_BUCKETS,
        FlagValue::Uint(value),
        format!("G1RemSetHowlMaxNumBuckets ({value}) must be a power of two."),
    )
}

pub fn heap_region_size(
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if !g1_enabled(cx)? || !cx.store.is_command_line(G1_HEAP_REGION_SIZE) {
        return Ok(());
    }
    if value >= MIN_REGION_SIZE {
        return Ok(());
    }
    if cx.corrects() {
        return cx.substitute(G1_HEAP_REGION_SIZE, FlagValue::Uint(MIN_REGION_SIZE));
    }
    cx.reject(
        verbose,
        G1_HEAP_REGION_SIZE,
        FlagValue::Uint(value),
        format!(
            "G1HeapRegionSize ({value}) must be greater than or equal to ergonomic heap region minimum size"
        ),
    )
}

pub fn new_size_percent(
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if !g1_enabled(cx)? {
        return Ok(());
    }
    let max = cx.uint(G1_MAX_NEW_SIZE_PERCENT)?;
    if value <= max {
        return Ok(());
    }
    if cx.corrects() {
        return cx.substitute(G1_NEW_SIZE_PERCENT, FlagValue::Uint(max));
    }
    cx.reject(
        verbose,
        G1_NEW_SIZE_PERCENT,
        FlagValue::Uint(value),
        format!(
            "G1NewSizePercent ({value}) must be less than or equal to G1MaxNewSizePercent ({max})"
        ),
    )
}

pub fn max_new_size_percent(
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if !g1_enabled(cx)? {
        return Ok(());
    }
    let min = cx.uint(G1_NEW_SIZE_PERCENT)?;
    if value >= min {
        return Ok(());
    }
    if cx.corrects() {
        return cx.substitute(G1_MAX_NEW_SIZE_PERCENT, FlagValue::Uint(min));
    }
    cx.reject(
        verbose,
        G1_MAX_NEW_SIZE_PERCENT,
        FlagValue::Uint(value),
        format!(
            "G1MaxNewSizePercent ({value}) must be greater than or equal to G1NewSizePercent ({min})"
        ),
    )
}

/// The pause target must fit inside the pause interval.
///
/// Under auto-correct an interval of 0 or 1 is widened to 2 first, then the
/// target becomes one less than the interval.
pub fn max_gc_pause_millis(
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if !g1_enabled(cx)? || !cx.store.is_command_line(MAX_GC_PAUSE_MILLIS) {
        return Ok(());
    }
    let interval = cx.uint(GC_PAUSE_INTERVAL_MILLIS)?;
    if value < interval {
        return Ok(());
    }
    if cx.corrects() {
        let interval = if interval <= 1 {
            cx.substitute(GC_PAUSE_INTERVAL_MILLIS, FlagValue::Uint(2))?;
            2
        } else {
            interval
        };
        return cx.substitute(MAX_GC_PAUSE_MILLIS, FlagValue::Uint(interval - 1));
    }
    cx.reject(
        verbose,
        MAX_GC_PAUSE_MILLIS,
        FlagValue::Uint(value),
        format!(
            "MaxGCPauseMillis ({value}) must be less than GCPauseIntervalMillis ({interval})"
        ),
    )
}

pub fn gc_pause_interval_millis(
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    if !g1_enabled(cx)? || !cx.store.is_command_line(GC_PAUSE_INTERVAL_MILLIS) {
        return Ok(());
    }

    if value < 1 {
        if cx.corrects() {
            return cx.substitute(GC_PAUSE_INTERVAL_MILLIS, FlagValue::Uint(1));
        }
        return cx.reject(
            verbose,
            GC_PAUSE_INTERVAL_MILLIS,
            FlagValue::Uint(value),
            format!("GCPauseIntervalMillis ({value}) must be greater than or equal to 1"),
        );
    }

    if cx.store.is_default(MAX_GC_PAUSE_MILLIS) {
        if cx.corrects() {
            // Accepted as is; the pause target is derived later.
            cx.notice(
                true,
                GC_PAUSE_INTERVAL_MILLIS,
                "GCPauseIntervalMillis:MaxGCPauseMillis".to_string(),
            );
            return Ok(());
        }
        return cx.reject(
            verbose,
            GC_PAUSE_INTERVAL_MILLIS,
            FlagValue::Uint(value),
            "GCPauseIntervalMillis cannot be set without setting MaxGCPauseMillis".to_string(),
        );
    }

    let pause = cx.uint(MAX_GC_PAUSE_MILLIS)?;
    if value > pause {
        return Ok(());
    }
    if cx.corrects() {
        // Leave room for an interval strictly above the pause target.
        let pause = if pause >= u64::MAX - 1 {
            cx.substitute(MAX_GC_PAUSE_MILLIS, FlagValue::Uint(u64::MAX - 2))?;
            u64::MAX - 2
        } else {
            pause
        };
        return cx.substitute(GC_PAUSE_INTERVAL_MILLIS, FlagValue::Uint(pause + 1));
    }
    cx.reject(
        verbose,
        GC_PAUSE_INTERVAL_MILLIS,
        FlagValue::Uint(value),
        format!(
            "GCPauseIntervalMillis ({value}) must be greater than MaxGCPauseMillis ({pause})"
        ),
    )
}

/// Only bounded on 64-bit platforms.
pub fn new_size(value: u64, verbose: bool, cx: &mut ConstraintContext<'_>) -> ConstraintResult {
    if !cx.platform.arch().is_lp64() || !g1_enabled(cx)? {
        return Ok(());
    }
    if value <= MAX_NEW_SIZE {
        return Ok(());
    }
    if cx.corrects() {
        return cx.substitute(NEW_SIZE, FlagValue::Uint(MAX_NEW_SIZE));
    }
    cx.reject(
        verbose,
        NEW_SIZE,
        FlagValue::Uint(value),
        format!("NewSize ({value}) must be less than ergonomic maximum value"),
    )
}
