pub mod routing;
pub mod profiling;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message every 100 route frames when the perf_stats feature is enabled.
///
/// Compiles to an empty block without `perf_stats`; the arguments are not
/// even evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(frame, "{} jobs pending", scheduler.pending());
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($frame:expr, $($arg:tt)*) => {
        if $frame.0 % 100 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($frame:expr, $($arg:tt)*) => {};
}
