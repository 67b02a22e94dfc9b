//! Conflict-free port allocation.
//!
//! Ports handed to one sandbox must be pairwise distinct, absent from the host-wide registry
//! of installed sandboxes, and not bound by any other process. The allocator only checks; it
//! never reserves. Callers own a [`PortSet`] for the duration of a run and insert every block
//! they receive before asking for the next one.

mod allocator;
mod probe;
mod set;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use allocator::*;
pub use probe::*;
pub use set::*;
