//! Resilience around model calls.
//!
//! One primary call, and at most one fallback call when the primary model
//! is rate limited or unavailable. There is no retry ladder.

mod fallback;

pub use fallback::{FallbackClient, FallbackOutcome, FallbackPolicy};
