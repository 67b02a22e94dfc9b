//! `monodb` provisions disposable multi-node database sandboxes on a single host.
//!
//! # Overview
//!
//! A sandbox is a directory holding one server instance per node, a set of control scripts and a
//! description of what was installed. monodb builds two membership topologies:
//!
//! - **Group replication**: three or more nodes started through SQL, in single-primary or
//!   multi-primary mode
//! - **Managed cluster**: the same nodes, formed into a cluster through the cluster shell
//!
//! Every installed sandbox is recorded in a host-wide catalog so later runs never reuse its
//! ports.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use monodb::{
//!     catalog::SandboxCatalog,
//!     config::{SandboxDefinition, TopologyKind},
//!     topology::TopologyBuilder,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let definition = SandboxDefinition::builder()
//!         .version("8.0.35")
//!         .basedir("/opt/mysql/8.0.35")
//!         .sandbox_dir("/home/me/sandboxes/group_msb_8_0_35")
//!         .topology(TopologyKind::GroupReplication)
//!         .single_primary(true)
//!         .build();
//!
//!     let builder = TopologyBuilder::builder()
//!         .catalog(SandboxCatalog::in_home("/home/me/.monodb"))
//!         .build();
//!
//!     let description = builder.provision(definition).await?;
//!     println!("ports: {:?}", description.port);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`catalog`] - The host-wide registry and per-sandbox descriptions
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Provisioning requests, host settings and version capabilities
//! - [`execution`] - Prioritized, bounded-concurrency execution of node actions
//! - [`management`] - Node construction, command running and sandbox removal
//! - [`ports`] - Conflict-free port allocation
//! - [`templates`] - Script and configuration templates
//! - [`topology`] - Provisioning of multi-node topologies
//! - [`utils`] - Common paths and helpers

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod catalog;
pub mod cli;
pub mod config;
pub mod execution;
pub mod management;
pub mod ports;
pub mod templates;
pub mod topology;
pub mod utils;

pub use error::*;
