//! Configuration types and helpers.

mod defaults;
mod definition;
mod monodb;
mod version;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use defaults::*;
pub use definition::*;
pub use monodb::*;
pub use version::*;
