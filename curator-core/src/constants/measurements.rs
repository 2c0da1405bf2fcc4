//! Measurement Keys

/// Variable key for a run type that applies to every variable.
pub const RUN_TYPE_DEFINES_VARIABLE: i64 = -1;
