//! Prioritized, staged execution of deferred actions.
//!
//! Actions are grouped into bands by priority. A band runs to completion before the next one
//! starts; within a band every action gets its own task and a semaphore bounds how many run at
//! once. When any action of a band fails, the scheduler still waits for the rest of the band,
//! reports every failure and stops.

mod item;
mod scheduler;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use item::*;
pub use scheduler::*;
