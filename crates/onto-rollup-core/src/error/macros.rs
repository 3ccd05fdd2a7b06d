//! Error macros for onto-rollup

/// Macro for returning a malformed-record error
#[macro_export]
macro_rules! bail_malformed {
    ($source:expr, $line:expr, $reason:expr) => {
        return Err($crate::error::RollupError::malformed($source, $line, $reason))
    };
}

/// Macro for returning invalid configuration errors
#[macro_export]
macro_rules! bail_invalid_config {
    ($key:expr, $reason:expr) => {
        return Err($crate::error::RollupError::InvalidConfig {
            key: $key.to_string(),
            reason: $reason.to_string(),
        })
    };
}
