//! Collaborators of the topology builder and management of installed sandboxes.

mod creator;
mod home;
mod runner;
mod sandbox;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use creator::*;
pub use home::*;
pub use runner::*;
pub use sandbox::*;
