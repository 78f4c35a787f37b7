//! Canonical flag names shared by constraints, defaults, and the registry.

pub const CI_COMPILER_COUNT: &str = "CICompilerCount";
pub const ALLOCATE_PREFETCH_DISTANCE: &str = "AllocatePrefetchDistance";
pub const ALLOCATE_PREFETCH_STEP_SIZE: &str = "AllocatePrefetchStepSize";
pub const ALLOCATE_PREFETCH_STYLE: &str = "AllocatePrefetchStyle";
pub const ALLOCATE_PREFETCH_INSTR: &str = "AllocatePrefetchInstr";
pub const COMPILE_THRESHOLD: &str = "CompileThreshold";
pub const ON_STACK_REPLACE_PERCENTAGE: &str = "OnStackReplacePercentage";
pub const INTERPRETER_PROFILE_PERCENTAGE: &str = "InterpreterProfilePercentage";
pub const PROFILE_INTERPRETER: &str = "ProfileInterpreter";
pub const CODE_CACHE_SEGMENT_SIZE: &str = "CodeCacheSegmentSize";
pub const CODE_ENTRY_ALIGNMENT: &str = "CodeEntryAlignment";
pub const OPTO_LOOP_ALIGNMENT: &str = "OptoLoopAlignment";
pub const INTERIOR_ENTRY_ALIGNMENT: &str = "InteriorEntryAlignment";
pub const ARRAYCOPY_SRC_PREFETCH_DISTANCE: &str = "ArraycopySrcPrefetchDistance";
pub const ARRAYCOPY_DST_PREFETCH_DISTANCE: &str = "ArraycopyDstPrefetchDistance";
pub const AVX3_THRESHOLD: &str = "AVX3Threshold";
pub const TYPE_PROFILE_LEVEL: &str = "TypeProfileLevel";
pub const VERIFY_ITERATIVE_GVN: &str = "VerifyIterativeGVN";
pub const INIT_ARRAY_SHORT_SIZE: &str = "InitArrayShortSize";
pub const MAX_NODE_LIMIT: &str = "MaxNodeLimit";
pub const NODE_LIMIT_FUDGE_FACTOR: &str = "NodeLimitFudgeFactor";
pub const USE_RTM_LOCKING: &str = "UseRTMLocking";
pub const RTM_TOTAL_COUNT_INCR_RATE: &str = "RTMTotalCountIncrRate";
pub const USE_COUNTED_LOOP_SAFEPOINTS: &str = "UseCountedLoopSafepoints";
pub const LOOP_STRIP_MINING_ITER: &str = "LoopStripMiningIter";
pub const DISABLE_INTRINSIC: &str = "DisableIntrinsic";
pub const CONTROL_INTRINSIC: &str = "ControlIntrinsic";

// G1 collector
pub const USE_G1_GC: &str = "UseG1GC";
pub const G1_REM_SET_ARRAY_OF_CARDS_ENTRIES: &str = "G1RemSetArrayOfCardsEntries";
pub const G1_REM_SET_HOWL_NUM_BUCKETS: &str = "G1RemSetHowlNumBuckets";
pub const G1_REM_SET_HOWL_MAX_NUM_BUCKETS: &str = "G1RemSetHowlMaxNumBuckets";
pub const G1_HEAP_REGION_SIZE: &str = "G1HeapRegionSize";
pub const G1_NEW_SIZE_PERCENT: &str = "G1NewSizePercent";
pub const G1_MAX_NEW_SIZE_PERCENT: &str = "G1MaxNewSizePercent";
pub const MAX_GC_PAUSE_MILLIS: &str = "MaxGCPauseMillis";
pub const GC_PAUSE_INTERVAL_MILLIS: &str = "GCPauseIntervalMillis";
pub const NEW_SIZE: &str = "NewSize";
