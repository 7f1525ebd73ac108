//! Performance profiling utilities
//!
//! Only active with the `perf_stats` feature. Zero overhead when disabled.

pub use routeforge_macros::profile;
