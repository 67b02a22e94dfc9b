//! Port planning for multi-node sandboxes.

use std::{fmt, path::Path};

use semver::Version;

use crate::{
    config::{version_to_port, MonodbConfig, SandboxDefinition},
    ports::{find_free_block, PortProbe, PortSet},
    PortAllocationError,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// How far a derived base port is lowered when it exceeds the maximum allowed port.
pub const BASE_PORT_FOLD: u32 = 10_000;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The kinds of ports a node listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortClass {
    /// Client connections.
    Data,

    /// Group communication between members.
    Group,

    /// The X protocol.
    Mysqlx,

    /// The administrative connection interface.
    Admin,
}

/// What to allocate for one sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRequest {
    /// The data block is searched from `base + 1`.
    pub base: u16,

    /// The number of nodes, and the size of every block.
    pub nodes: usize,

    /// Minimum distance of the group block from the base.
    pub group_delta: u16,

    /// Minimum distance of the mysqlx block from the base, when one is wanted.
    pub mysqlx_delta: Option<u16>,

    /// Minimum distance of the admin block from the base, when one is wanted.
    pub admin_delta: Option<u16>,
}

/// A contiguous run of ports, one per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortBlock {
    /// The port of node 1.
    pub first: u16,

    /// The number of ports.
    pub count: usize,
}

/// Every port of a sandbox, by class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortPlan {
    /// One less than the first data port.
    pub base_port: u16,

    /// Client ports.
    pub data: PortBlock,

    /// Group communication ports.
    pub group: PortBlock,

    /// X protocol ports.
    pub mysqlx: Option<PortBlock>,

    /// Admin ports.
    pub admin: Option<PortBlock>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl PortBlock {
    /// The port of node `ordinal`, starting at 1.
    pub fn port(&self, ordinal: usize) -> u16 {
        self.first + (ordinal as u16 - 1)
    }

    /// The highest port of the block.
    pub fn last(&self) -> u16 {
        self.port(self.count)
    }

    /// Every port, in node order.
    pub fn ports(&self) -> impl Iterator<Item = u16> {
        let first = self.first;
        (0..self.count as u16).map(move |offset| first + offset)
    }
}

impl PortPlan {
    /// Every port of node `ordinal`, in class order.
    pub fn node_ports(&self, ordinal: usize) -> Vec<u16> {
        [
            Some(self.data.port(ordinal)),
            Some(self.group.port(ordinal)),
            self.mysqlx.map(|block| block.port(ordinal)),
            self.admin.map(|block| block.port(ordinal)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Every port of the sandbox, grouped by node.
    pub fn all_ports(&self) -> Vec<u16> {
        (1..=self.data.count)
            .flat_map(|ordinal| self.node_ports(ordinal))
            .collect()
    }
}

impl PortRequest {
    /// Builds the request of a definition.
    ///
    /// `with_mysqlx` and `with_admin` tell whether those blocks are wanted at all.
    pub fn new(
        base: u16,
        nodes: usize,
        config: &MonodbConfig,
        with_mysqlx: bool,
        with_admin: bool,
    ) -> Self {
        Self {
            base,
            nodes,
            group_delta: *config.get_group_port_delta(),
            mysqlx_delta: with_mysqlx.then_some(*config.get_mysqlx_port_delta()),
            admin_delta: with_admin.then_some(*config.get_admin_port_delta()),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Derives the base port of a sandbox.
///
/// An explicit base port wins. Otherwise the single-sandbox port (itself derived from the version
/// when unset) is offset by the group base of the mode and by a hundred per patch level, then
/// lowered in steps of 10000 while it exceeds the maximum allowed port.
pub fn derive_base_port(definition: &SandboxDefinition, version: &Version, config: &MonodbConfig) -> u16 {
    if let Some(base_port) = definition.base_port {
        return base_port;
    }

    let port = u32::from(definition.port.unwrap_or_else(|| version_to_port(version)));
    let offset = if definition.single_primary {
        *config.get_group_replication_sp_base_port()
    } else {
        *config.get_group_replication_base_port()
    };

    let patch = u32::try_from(version.patch).unwrap_or(u32::MAX);
    let mut base = (port + u32::from(offset)).saturating_add(patch.saturating_mul(100));
    let max_allowed = u32::from(*config.get_max_allowed_port());
    while base > max_allowed && base > BASE_PORT_FOLD {
        base -= BASE_PORT_FOLD;
    }

    u16::try_from(base).unwrap_or(u16::MAX)
}

/// Allocates every block of a sandbox.
///
/// Blocks are searched in class order, each one above the previous block and at least at its
/// delta from the base. Every port handed out is inserted into `reserved` before the next search.
pub fn allocate_ports(
    request: &PortRequest,
    reserved: &mut PortSet,
    probe: &dyn PortProbe,
    sandbox_dir: &Path,
) -> Result<PortPlan, PortAllocationError> {
    let nodes = request.nodes;
    let data = allocate_block(
        PortClass::Data,
        u32::from(request.base) + 1,
        nodes,
        reserved,
        probe,
        sandbox_dir,
    )?;

    // Later deltas are measured from the block actually found.
    let base_port = data.first - 1;
    let base = u32::from(base_port);

    let group_from = (base + u32::from(request.group_delta)).max(u32::from(data.last())) + 1;
    let group = allocate_block(PortClass::Group, group_from, nodes, reserved, probe, sandbox_dir)?;
    let mut highest = group.last();

    let mysqlx = match request.mysqlx_delta {
        Some(delta) => {
            let from = (base + u32::from(delta)).max(u32::from(highest)) + 1;
            let block = allocate_block(PortClass::Mysqlx, from, nodes, reserved, probe, sandbox_dir)?;
            highest = block.last();
            Some(block)
        }
        None => None,
    };

    let admin = match request.admin_delta {
        Some(delta) => {
            let from = (base + u32::from(delta)).max(u32::from(highest)) + 1;
            Some(allocate_block(PortClass::Admin, from, nodes, reserved, probe, sandbox_dir)?)
        }
        None => None,
    };

    Ok(PortPlan {
        base_port,
        data,
        group,
        mysqlx,
        admin,
    })
}

fn allocate_block(
    class: PortClass,
    from: u32,
    count: usize,
    reserved: &mut PortSet,
    probe: &dyn PortProbe,
    sandbox_dir: &Path,
) -> Result<PortBlock, PortAllocationError> {
    let first = find_free_block(from, reserved, count, probe).map_err(|e| e.for_class(class))?;
    let block = PortBlock { first, count };

    reserved.insert_block(first, count);
    tracing::debug!(
        "allocated {} ports {}-{} for {}",
        class,
        first,
        block.last(),
        sandbox_dir.display()
    );

    Ok(block)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for PortClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortClass::Data => write!(f, "data"),
            PortClass::Group => write!(f, "group replication"),
            PortClass::Mysqlx => write!(f, "mysqlx"),
            PortClass::Admin => write!(f, "admin"),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
