//! Multi-node membership topologies.
//!
//! A [`TopologyBuilder`] turns one [`SandboxDefinition`](crate::config::SandboxDefinition) into a
//! running sandbox in a fixed sequence of steps:
//!
//! 1. validate the request
//! 2. allocate every port
//! 3. reserve the destination directory
//! 4. assign roles and compute the peer string
//! 5. construct each node through a [`NodeCreator`](crate::management::NodeCreator)
//! 6. render the control scripts
//! 7. run the collected node actions by priority
//! 8. bootstrap the group
//! 9. commit the description and catalog entry
//!
//! Any failure between steps 3 and 9 removes the destination again.

mod builder;
mod node;
mod plan;
mod roles;
mod scripts;
mod validate;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use builder::*;
pub use node::*;
pub use plan::*;
pub use roles::*;
pub use scripts::*;
pub use validate::*;
