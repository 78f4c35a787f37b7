//! Behavioral properties of the built-in constraints, exercised through the
//! public registry and validation pass.

use flagcheck::core::names::{
    ALLOCATE_PREFETCH_DISTANCE, ALLOCATE_PREFETCH_INSTR, ALLOCATE_PREFETCH_STEP_SIZE,
    ALLOCATE_PREFETCH_STYLE, ARRAYCOPY_SRC_PREFETCH_DISTANCE, CI_COMPILER_COUNT,
    CODE_ENTRY_ALIGNMENT, COMPILE_THRESHOLD, CONTROL_INTRINSIC, G1_HEAP_REGION_SIZE,
    G1_MAX_NEW_SIZE_PERCENT, G1_NEW_SIZE_PERCENT, G1_REM_SET_ARRAY_OF_CARDS_ENTRIES,
    G1_REM_SET_HOWL_MAX_NUM_BUCKETS, G1_REM_SET_HOWL_NUM_BUCKETS, GC_PAUSE_INTERVAL_MILLIS,
    INTERIOR_ENTRY_ALIGNMENT, INTERPRETER_PROFILE_PERCENTAGE, LOOP_STRIP_MINING_ITER,
    MAX_GC_PAUSE_MILLIS, MAX_NODE_LIMIT, NEW_SIZE, NODE_LIMIT_FUDGE_FACTOR,
    ON_STACK_REPLACE_PERCENTAGE, OPTO_LOOP_ALIGNMENT, PROFILE_INTERPRETER,
    RTM_TOTAL_COUNT_INCR_RATE, TYPE_PROFILE_LEVEL, USE_COUNTED_LOOP_SAFEPOINTS,
    USE_RTM_LOCKING,
};
use flagcheck::core::pass::{propose, validate_all};
use flagcheck::core::platform::{Arch, PlatformProfile};
use flagcheck::core::registry::ConstraintRegistry;
use flagcheck::core::types::{FlagValue, Mode};
use flagcheck::test_support::Fixture;

fn registry() -> ConstraintRegistry {
    ConstraintRegistry::builtin().expect("builtin registry")
}

fn out_of_range_cases() -> Vec<(&'static str, Fixture)> {
    let int = |flag, value| Fixture::server().with_command_line(flag, FlagValue::Int(value));
    let uint = |flag, value| Fixture::server().with_command_line(flag, FlagValue::Uint(value));
    let rtm = PlatformProfile {
        rtm: true,
        ..PlatformProfile::server(Arch::X86_64)
    };

    vec![
        ("compiler count", int(CI_COMPILER_COUNT, 1)),
        ("negative prefetch distance", int(ALLOCATE_PREFETCH_DISTANCE, -3)),
        ("large prefetch distance", int(ALLOCATE_PREFETCH_DISTANCE, 900)),
        (
            "prefetch step",
            int(ALLOCATE_PREFETCH_STEP_SIZE, 13)
                .with_command_line(ALLOCATE_PREFETCH_STYLE, FlagValue::Int(3)),
        ),
        ("prefetch instr", int(ALLOCATE_PREFETCH_INSTR, 9)),
        ("compile threshold", int(COMPILE_THRESHOLD, -1)),
        ("osr percentage", int(ON_STACK_REPLACE_PERCENTAGE, -7)),
        ("opto loop alignment", int(OPTO_LOOP_ALIGNMENT, 100)),
        ("interior entry alignment", int(INTERIOR_ENTRY_ALIGNMENT, 7)),
        ("type profile level", uint(TYPE_PROFILE_LEVEL, 9_393)),
        ("fudge factor", int(NODE_LIMIT_FUDGE_FACTOR, 1)),
        ("largest node limit", int(MAX_NODE_LIMIT, i64::MAX)),
        ("negative node limit", int(MAX_NODE_LIMIT, -100)),
        (
            "rtm rate",
            Fixture::new(rtm)
                .with_command_line(USE_RTM_LOCKING, FlagValue::Bool(true))
                .with_command_line(RTM_TOTAL_COUNT_INCR_RATE, FlagValue::Int(100)),
        ),
        ("strip mining off", uint(LOOP_STRIP_MINING_ITER, 0)),
        (
            "strip mining without safepoints",
            uint(LOOP_STRIP_MINING_ITER, 1_000)
                .with_command_line(USE_COUNTED_LOOP_SAFEPOINTS, FlagValue::Bool(false)),
        ),
        ("cards entries", uint(G1_REM_SET_ARRAY_OF_CARDS_ENTRIES, 0)),
        ("howl buckets", uint(G1_REM_SET_HOWL_NUM_BUCKETS, 12)),
        ("howl max buckets", uint(G1_REM_SET_HOWL_MAX_NUM_BUCKETS, 100)),
        ("heap region size", uint(G1_HEAP_REGION_SIZE, 1_000)),
        ("new size percent", uint(G1_NEW_SIZE_PERCENT, 80)),
        ("max new size percent", uint(G1_MAX_NEW_SIZE_PERCENT, 2)),
        (
            "pause above interval",
            uint(MAX_GC_PAUSE_MILLIS, 500)
                .with_command_line(GC_PAUSE_INTERVAL_MILLIS, FlagValue::Uint(100)),
        ),
        (
            "largest pause",
            uint(MAX_GC_PAUSE_MILLIS, u64::MAX)
                .with_command_line(GC_PAUSE_INTERVAL_MILLIS, FlagValue::Uint(5)),
        ),
        (
            "zero interval",
            uint(GC_PAUSE_INTERVAL_MILLIS, 0)
                .with_command_line(MAX_GC_PAUSE_MILLIS, FlagValue::Uint(200)),
        ),
        ("new size", uint(NEW_SIZE, u64::MAX)),
    ]
}

/// A corrected store passes a strict check and needs no further correction.
#[test]
fn corrections_are_idempotent() {
    let registry = registry();
    for (case, mut fixture) in out_of_range_cases() {
        let first = validate_all(&registry, &mut fixture.cx(Mode::AutoCorrect), false);
        assert!(first.is_satisfied(), "{case}: {:?}", first.violations);
        assert!(!first.corrections.is_empty(), "{case}: nothing was corrected");

        let corrected = fixture.store.clone();
        let second = validate_all(&registry, &mut fixture.cx(Mode::Strict), true);
        assert!(second.is_satisfied(), "{case}: {:?}", second.violations);
        assert!(second.corrections.is_empty(), "{case}: {:?}", second.corrections);
        assert_eq!(fixture.store, corrected, "{case}: store changed on recheck");
    }
}

/// Proposing an out-of-range value stores a value its own check accepts.
#[test]
fn proposed_corrections_pass_their_own_check() {
    let registry = registry();
    let cases = [
        (OPTO_LOOP_ALIGNMENT, FlagValue::Int(100)),
        (TYPE_PROFILE_LEVEL, FlagValue::Uint(9_393)),
        (ON_STACK_REPLACE_PERCENTAGE, FlagValue::Int(-7)),
        (NODE_LIMIT_FUDGE_FACTOR, FlagValue::Int(1)),
    ];
    for (flag, value) in cases {
        let mut fixture = Fixture::server();
        let report = propose(&registry, flag, value, false, &mut fixture.cx(Mode::AutoCorrect));
        assert!(report.is_satisfied(), "{flag}: {:?}", report.violations);

        let corrected = fixture.value(flag).expect("stored");
        let mut cx = fixture.cx(Mode::Strict);
        assert!(
            registry.check(flag, &corrected, true, &mut cx).is_ok(),
            "{flag} corrected to {corrected} is still rejected"
        );
    }
}

#[test]
fn no_correction_path_leaves_value_in_either_mode() {
    let registry = registry();
    for mode in [Mode::Strict, Mode::AutoCorrect] {
        let mut fixture = Fixture::server()
            .with_flag(ARRAYCOPY_SRC_PREFETCH_DISTANCE, FlagValue::Uint(5_000))
            .with_flag(CONTROL_INTRINSIC, FlagValue::List("+_dsin,+_nope".to_string()));
        let report = validate_all(&registry, &mut fixture.cx(mode), false);
        assert_eq!(report.violations.len(), 2);
        assert_eq!(
            fixture.value(ARRAYCOPY_SRC_PREFETCH_DISTANCE),
            Some(FlagValue::Uint(5_000))
        );
    }
}

#[test]
fn packed_digits_strict_and_corrected() {
    let registry = registry();
    let mut fixture = Fixture::server().with_flag(TYPE_PROFILE_LEVEL, FlagValue::Uint(222));
    assert!(validate_all(&registry, &mut fixture.cx(Mode::Strict), true).is_satisfied());

    let mut fixture = Fixture::server().with_flag(TYPE_PROFILE_LEVEL, FlagValue::Uint(3));
    assert!(validate_all(&registry, &mut fixture.cx(Mode::AutoCorrect), true).is_satisfied());
    assert_eq!(fixture.value(TYPE_PROFILE_LEVEL), Some(FlagValue::Uint(2)));
}

#[test]
fn loop_alignment_follows_entry_alignment() {
    let mut fixture = Fixture::server()
        .with_flag(CODE_ENTRY_ALIGNMENT, FlagValue::Int(64))
        .with_flag(OPTO_LOOP_ALIGNMENT, FlagValue::Int(100));
    let report = validate_all(&registry(), &mut fixture.cx(Mode::AutoCorrect), false);
    assert!(report.is_satisfied());
    assert_eq!(fixture.value(OPTO_LOOP_ALIGNMENT), Some(FlagValue::Int(64)));
}

#[test]
fn osr_floor_follows_profile_percentage() {
    let base = Fixture::server()
        .with_flag(PROFILE_INTERPRETER, FlagValue::Bool(true))
        .with_flag(INTERPRETER_PROFILE_PERCENTAGE, FlagValue::Int(10))
        .with_flag(ON_STACK_REPLACE_PERCENTAGE, FlagValue::Int(5));

    let mut strict = base.clone();
    let report = validate_all(&registry(), &mut strict.cx(Mode::Strict), false);
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].flag, ON_STACK_REPLACE_PERCENTAGE);

    let mut corrected = base;
    validate_all(&registry(), &mut corrected.cx(Mode::AutoCorrect), false);
    assert_eq!(
        corrected.value(ON_STACK_REPLACE_PERCENTAGE),
        Some(FlagValue::Int(10))
    );
}

#[test]
fn strip_mining_follows_safepoints_in_both_modes() {
    for mode in [Mode::Strict, Mode::AutoCorrect] {
        let mut fixture = Fixture::server()
            .with_flag(USE_COUNTED_LOOP_SAFEPOINTS, FlagValue::Bool(false))
            .with_flag(LOOP_STRIP_MINING_ITER, FlagValue::Uint(5));
        let report = validate_all(&registry(), &mut fixture.cx(mode), false);
        assert!(report.is_satisfied());
        assert_eq!(fixture.value(LOOP_STRIP_MINING_ITER), Some(FlagValue::Uint(0)));
    }
}

/// Raising the node limit re-checks the fudge factor that reads it.
#[test]
fn proposal_revalidates_readers_of_unconstrained_flag() {
    let mut fixture = Fixture::server();
    let report = propose(
        &registry(),
        MAX_NODE_LIMIT,
        FlagValue::Int(1_000),
        true,
        &mut fixture.cx(Mode::Strict),
    );
    assert_eq!(report.checked, vec![NODE_LIMIT_FUDGE_FACTOR.to_string()]);
    assert_eq!(report.violations.len(), 1);
    assert_eq!(fixture.value(MAX_NODE_LIMIT), Some(FlagValue::Int(1_000)));
}
