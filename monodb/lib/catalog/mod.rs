//! Durable records of installed sandboxes.
//!
//! Every sandbox carries a description file in its own directory. The host-wide catalog maps
//! each sandbox destination to what was installed there, and its ports form the registry new
//! runs allocate against.

mod description;
mod store;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use description::*;
pub use store::*;
