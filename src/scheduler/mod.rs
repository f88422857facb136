//! Refresh scheduling.
//!
//! One long-lived loop starts a collection cycle every interval. Each cycle
//! spawns one task per discovered script and returns immediately; there is
//! no backpressure between cycles. The [`CycleHandle`] a cycle returns is its
//! only completion signal, and the loop ignores it.

mod cycle;
mod refresh;

pub use cycle::CycleHandle;
pub use refresh::Scheduler;
