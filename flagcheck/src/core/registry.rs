//! Constraint registry: which function guards which flag, and in what order.
//!
//! Each [`Constraint`] declares the flags it reads. The registry derives a
//! deterministic evaluation order from those declarations so a constraint
//! always runs after the constraints of the flags it depends on. Ties are
//! broken by registration order.
//!
//! Declared dependencies on flags that have no constraint of their own are
//! plain reads and add no ordering edge.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::core::compiler;
use crate::core::context::ConstraintContext;
use crate::core::g1;
use crate::core::intrinsics;
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
use crate::core::packed;
use crate::core::platform::Platform;
use crate::core::types::{ConstraintResult, FlagKind, FlagValue};

pub type IntCheck = fn(i64, bool, &mut ConstraintContext<'_>) -> ConstraintResult;
pub type UintCheck = fn(u64, bool, &mut ConstraintContext<'_>) -> ConstraintResult;
pub type ListCheck = fn(&str, bool, &mut ConstraintContext<'_>) -> ConstraintResult;

/// A typed constraint function.
#[derive(Clone, Copy)]
pub enum Check {
    Int(IntCheck),
    Uint(UintCheck),
    List(ListCheck),
}

impl Check {
    pub fn kind(&self) -> FlagKind {
        match self {
            Check::Int(_) => FlagKind::Int,
            Check::Uint(_) => FlagKind::Uint,
            Check::List(_) => FlagKind::List,
        }
    }

    /// Decode `value` to the function's argument type and run it.
    pub fn run(
        &self,
        flag: &str,
        value: &FlagValue,
        verbose: bool,
        cx: &mut ConstraintContext<'_>,
    ) -> ConstraintResult {
        match (self, value) {
            (Check::Int(check), FlagValue::Int(value)) => check(*value, verbose, cx),
            (Check::Uint(check), FlagValue::Uint(value)) => check(*value, verbose, cx),
            (Check::List(check), FlagValue::List(value)) => check(value, verbose, cx),
            _ => cx.reject(
                verbose,
                flag,
                value.clone(),
                format!(
                    "{flag} expects a {} value, got a {} value",
                    self.kind().label(),
                    value.kind().label()
                ),
            ),
        }
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Check::{:?}", self.kind())
    }
}

/// Build feature a constraint is compiled under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildFeature {
    Any,
    /// Only meaningful when the optimizing compiler is built.
    C2,
}

impl BuildFeature {
    pub fn is_available(self, platform: &dyn Platform) -> bool {
        match self {
            BuildFeature::Any => true,
            BuildFeature::C2 => platform.has_c2(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub flag: &'static str,
    /// Flags read by the check.
    pub depends_on: &'static [&'static str],
    /// Other flags the check may rewrite under correction.
    pub writes: &'static [&'static str],
    pub feature: BuildFeature,
    pub check: Check,
}

impl Constraint {
    pub fn new(flag: &'static str, check: Check) -> Self {
        Self {
            flag,
            depends_on: &[],
            writes: &[],
            feature: BuildFeature::Any,
            check,
        }
    }

    pub fn after(mut self, depends_on: &'static [&'static str]) -> Self {
        self.depends_on = depends_on;
        self
    }

    pub fn writes(mut self, writes: &'static [&'static str]) -> Self {
        self.writes = writes;
        self
    }

    pub fn c2_only(mut self) -> Self {
        self.feature = BuildFeature::C2;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("flag {0} already has a constraint")]
    Duplicate(String),
    #[error("constraint dependency cycle through {}", .0.join(", "))]
    Cycle(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct ConstraintRegistry {
    constraints: Vec<Constraint>,
    index: HashMap<&'static str, usize>,
    order: Vec<usize>,
}

impl ConstraintRegistry {
    pub fn new(constraints: Vec<Constraint>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for constraint in constraints {
            registry.register(constraint)?;
        }
        Ok(registry)
    }

    /// Every built-in constraint.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(builtin_constraints())
    }

    /// Add a constraint; the registry is unchanged on error.
    pub fn register(&mut self, constraint: Constraint) -> Result<(), RegistryError> {
        if self.index.contains_key(constraint.flag) {
            return Err(RegistryError::Duplicate(constraint.flag.to_string()));
        }
        self.index.insert(constraint.flag, self.constraints.len());
        self.constraints.push(constraint);

        match topological_order(&self.constraints, &self.index) {
            Ok(order) => {
                self.order = order;
                Ok(())
            }
            Err(err) => {
                if let Some(rejected) = self.constraints.pop() {
                    self.index.remove(rejected.flag);
                }
                Err(err)
            }
        }
    }

    pub fn get(&self, flag: &str) -> Option<&Constraint> {
        self.index.get(flag).map(|&at| &self.constraints[at])
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Constraints, dependencies first.
    pub fn evaluation_order(&self) -> impl Iterator<Item = &Constraint> {
        self.order.iter().map(|&at| &self.constraints[at])
    }

    /// Constraints that read `flag`, directly or through another
    /// constraint, in evaluation order.
    pub fn dependents_of(&self, flag: &str) -> Vec<&Constraint> {
        let mut reached: BTreeSet<&str> = BTreeSet::new();
        reached.insert(flag);
        let mut dependents = Vec::new();
        for constraint in self.evaluation_order() {
            if constraint.flag == flag {
                continue;
            }
            if constraint.depends_on.iter().any(|dep| reached.contains(dep)) {
                reached.insert(constraint.flag);
                dependents.push(constraint);
            }
        }
        dependents
    }

    /// Check one proposed value. Unconstrained flags and constraints for
    /// features the platform lacks are satisfied.
    pub fn check(
        &self,
        flag: &str,
        value: &FlagValue,
        verbose: bool,
        cx: &mut ConstraintContext<'_>,
    ) -> ConstraintResult {
        match self.get(flag) {
            Some(constraint) if constraint.feature.is_available(cx.platform) => {
                constraint.check.run(flag, value, verbose, cx)
            }
            _ => Ok(()),
        }
    }
}

/// Kahn's algorithm over registered flags; the lowest registration index
/// among ready constraints goes first.
fn topological_order(
    constraints: &[Constraint],
    index: &HashMap<&'static str, usize>,
) -> Result<Vec<usize>, RegistryError> {
    let mut in_degree = vec![0usize; constraints.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); constraints.len()];
    for (at, constraint) in constraints.iter().enumerate() {
        let mut seen = BTreeSet::new();
        for dep in constraint.depends_on {
            if let Some(&from) = index.get(dep) {
                if seen.insert(from) {
                    dependents[from].push(at);
                    in_degree[at] += 1;
                }
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..constraints.len())
        .filter(|&at| in_degree[at] == 0)
        .collect();
    let mut order = Vec::with_capacity(constraints.len());
    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() < constraints.len() {
        let stuck = (0..constraints.len())
            .filter(|&at| in_degree[at] > 0)
            .map(|at| constraints[at].flag.to_string())
            .collect();
        return Err(RegistryError::Cycle(stuck));
    }
    Ok(order)
}

fn builtin_constraints() -> Vec<Constraint> {
    vec![
        Constraint::new(CI_COMPILER_COUNT, Check::Int(compiler::ci_compiler_count)),
        Constraint::new(
            ALLOCATE_PREFETCH_DISTANCE,
            Check::Int(compiler::allocate_prefetch_distance),
        ),
        Constraint::new(
            ALLOCATE_PREFETCH_STEP_SIZE,
            Check::Int(compiler::allocate_prefetch_step_size),
        )
        .after(&[ALLOCATE_PREFETCH_STYLE]),
        Constraint::new(
            ALLOCATE_PREFETCH_INSTR,
            Check::Int(compiler::allocate_prefetch_instr),
        ),
        Constraint::new(COMPILE_THRESHOLD, Check::Int(compiler::compile_threshold)),
        Constraint::new(
            ON_STACK_REPLACE_PERCENTAGE,
            Check::Int(compiler::on_stack_replace_percentage),
        )
        .after(&[
            COMPILE_THRESHOLD,
            PROFILE_INTERPRETER,
            INTERPRETER_PROFILE_PERCENTAGE,
        ])
        .writes(&[COMPILE_THRESHOLD]),
        // CodeEntryAlignment also reads CodeCacheSegmentSize; only this
        // direction is ordered.
        Constraint::new(
            CODE_ENTRY_ALIGNMENT,
            Check::Int(compiler::code_entry_alignment),
        ),
        Constraint::new(
            OPTO_LOOP_ALIGNMENT,
            Check::Int(compiler::opto_loop_alignment),
        )
        .after(&[CODE_ENTRY_ALIGNMENT]),
        Constraint::new(
            CODE_CACHE_SEGMENT_SIZE,
            Check::Uint(compiler::code_cache_segment_size),
        )
        .after(&[CODE_ENTRY_ALIGNMENT, OPTO_LOOP_ALIGNMENT]),
        Constraint::new(
            INTERIOR_ENTRY_ALIGNMENT,
            Check::Int(compiler::interior_entry_alignment),
        )
        .after(&[CODE_ENTRY_ALIGNMENT])
        .c2_only(),
        Constraint::new(
            ARRAYCOPY_SRC_PREFETCH_DISTANCE,
            Check::Uint(compiler::arraycopy_src_prefetch_distance),
        ),
        Constraint::new(
            ARRAYCOPY_DST_PREFETCH_DISTANCE,
            Check::Uint(compiler::arraycopy_dst_prefetch_distance),
        ),
        Constraint::new(AVX3_THRESHOLD, Check::Int(compiler::avx3_threshold)),
        Constraint::new(TYPE_PROFILE_LEVEL, Check::Uint(packed::type_profile_level)),
        Constraint::new(
            VERIFY_ITERATIVE_GVN,
            Check::Uint(packed::verify_iterative_gvn),
        ),
        Constraint::new(
            INIT_ARRAY_SHORT_SIZE,
            Check::Int(compiler::init_array_short_size),
        ),
        Constraint::new(
            NODE_LIMIT_FUDGE_FACTOR,
            Check::Int(compiler::node_limit_fudge_factor),
        )
        .after(&[MAX_NODE_LIMIT])
        .c2_only(),
        Constraint::new(
            RTM_TOTAL_COUNT_INCR_RATE,
            Check::Int(compiler::rtm_total_count_incr_rate),
        )
        .after(&[USE_RTM_LOCKING]),
        Constraint::new(
            LOOP_STRIP_MINING_ITER,
            Check::Uint(compiler::loop_strip_mining_iter),
        )
        .after(&[USE_COUNTED_LOOP_SAFEPOINTS])
        .c2_only(),
        Constraint::new(
            DISABLE_INTRINSIC,
            Check::List(intrinsics::disable_intrinsic),
        ),
        Constraint::new(
            CONTROL_INTRINSIC,
            Check::List(intrinsics::control_intrinsic),
        ),
        Constraint::new(
            G1_REM_SET_ARRAY_OF_CARDS_ENTRIES,
            Check::Uint(g1::rem_set_array_of_cards_entries),
        )
        .after(&[USE_G1_GC]),
        Constraint::new(
            G1_REM_SET_HOWL_NUM_BUCKETS,
            Check::Uint(g1::rem_set_howl_num_buckets),
        )
        .after(&[USE_G1_GC]),
        Constraint::new(
            G1_REM_SET_HOWL_MAX_NUM_BUCKETS,
            Check::Uint(g1::rem_set_howl_max_num_buckets),
        )
        .after(&[USE_G1_GC]),
        Constraint::new(G1_HEAP_REGION_SIZE, Check::Uint(g1::heap_region_size))
            .after(&[USE_G1_GC]),
        // The percent pair and the pause pair check each other; the reverse
        // reads see values that may not have been validated yet.
        Constraint::new(G1_NEW_SIZE_PERCENT, Check::Uint(g1::new_size_percent))
            .after(&[USE_G1_GC]),
        Constraint::new(
            G1_MAX_NEW_SIZE_PERCENT,
            Check::Uint(g1::max_new_size_percent),
        )
        .after(&[USE_G1_GC, G1_NEW_SIZE_PERCENT]),
        Constraint::new(
            GC_PAUSE_INTERVAL_MILLIS,
            Check::Uint(g1::gc_pause_interval_millis),
        )
        .after(&[USE_G1_GC])
        .writes(&[MAX_GC_PAUSE_MILLIS]),
        Constraint::new(MAX_GC_PAUSE_MILLIS, Check::Uint(g1::max_gc_pause_millis))
            .after(&[USE_G1_GC, GC_PAUSE_INTERVAL_MILLIS])
            .writes(&[GC_PAUSE_INTERVAL_MILLIS]),
        Constraint::new(NEW_SIZE, Check::Uint(g1::new_size)).after(&[USE_G1_GC]),
    ]
}
