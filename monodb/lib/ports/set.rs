use std::collections::BTreeSet;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An owned set of reserved ports.
///
/// Each provisioning run starts from a snapshot of the installed ports and mutates its own copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSet {
    ports: BTreeSet<u16>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl PortSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `port` is reserved.
    pub fn contains(&self, port: u32) -> bool {
        u16::try_from(port).is_ok_and(|port| self.ports.contains(&port))
    }

    /// Reserves `count` contiguous ports starting at `first`.
    pub fn insert_block(&mut self, first: u16, count: usize) {
        self.ports
            .extend((u32::from(first)..u32::from(first) + count as u32).filter_map(|p| u16::try_from(p).ok()));
    }

    /// The number of reserved ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Returns `true` if no port is reserved.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Iterates over the reserved ports in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl FromIterator<u16> for PortSet {
    fn from_iter<T: IntoIterator<Item = u16>>(iter: T) -> Self {
        Self {
            ports: iter.into_iter().collect(),
        }
    }
}

impl Extend<u16> for PortSet {
    fn extend<T: IntoIterator<Item = u16>>(&mut self, iter: T) {
        self.ports.extend(iter);
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_block() {
        let mut set = PortSet::new();
        set.insert_block(20001, 3);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![20001, 20002, 20003]);
        assert!(set.contains(20002));
        assert!(!set.contains(20004));
        assert!(!set.contains(70000));
    }

    #[test]
    fn test_insert_block_clamps_at_port_range() {
        let mut set = PortSet::new();
        set.insert_block(65534, 4);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![65534, 65535]);
    }
}
