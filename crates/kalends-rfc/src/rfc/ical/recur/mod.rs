//! Recurrence expansion (RFC 5545 §3.3.10, §3.8.5).
//!
//! - Frequency: period stepping by FREQ, INTERVAL and WKST
//! - BY rules: per-period expansion and limiting, then BYSETPOS
//! - Stream: the lazy iterator merging RRULE, RDATE and EXDATE
//! - Set: the builder callers hold on to

mod byrule;
mod frequency;
mod set;
mod stream;

pub use set::{CountPolicy, RecurrenceSet};
pub use stream::OccurrenceStream;
