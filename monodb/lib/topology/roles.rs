//! Pure builders for node roles, peer strings and script names.

use std::fmt::Display;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The role of a node in a membership topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// The node accepts writes.
    Primary,

    /// The node only accepts reads.
    Secondary,
}

/// The node ordinals of each role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleLists {
    /// Ordinals of the primaries.
    pub masters: Vec<usize>,

    /// Ordinals of the secondaries.
    pub slaves: Vec<usize>,
}

/// The names of the role-filtered scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleScriptNames {
    /// `use_all_<masters>`.
    pub use_all_masters: String,

    /// `use_all_<slaves>`.
    pub use_all_slaves: String,

    /// `exec_all_<masters>`.
    pub exec_all_masters: String,

    /// `exec_all_<slaves>`.
    pub exec_all_slaves: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl RoleLists {
    /// Assigns roles to `nodes` nodes.
    ///
    /// In single-primary mode node 1 is the only primary. Otherwise every node is a primary and
    /// there are no secondaries.
    pub fn new(nodes: usize, single_primary: bool) -> Self {
        if single_primary {
            Self {
                masters: vec![1],
                slaves: (2..=nodes).collect(),
            }
        } else {
            Self {
                masters: (1..=nodes).collect(),
                slaves: Vec::new(),
            }
        }
    }

    /// The role of node `ordinal`.
    pub fn role_of(&self, ordinal: usize) -> NodeRole {
        if self.masters.contains(&ordinal) {
            NodeRole::Primary
        } else {
            NodeRole::Secondary
        }
    }

    /// Returns `true` if every ordinal in `1..=nodes` has exactly one role.
    pub fn is_partition_of(&self, nodes: usize) -> bool {
        let mut seen: Vec<usize> = self.masters.iter().chain(&self.slaves).copied().collect();
        seen.sort_unstable();
        seen == (1..=nodes).collect::<Vec<_>>()
    }

    /// The primaries as a space-separated list.
    pub fn master_list(&self) -> String {
        node_list(&self.masters)
    }

    /// The secondaries as a space-separated list.
    pub fn slave_list(&self) -> String {
        node_list(&self.slaves)
    }
}

impl RoleScriptNames {
    /// Builds the script names from the role labels.
    pub fn new(master_label: &str, slave_label: &str) -> Self {
        let masters = plural(master_label);
        let slaves = plural(slave_label);

        Self {
            use_all_masters: format!("use_all_{}", masters),
            use_all_slaves: format!("use_all_{}", slaves),
            exec_all_masters: format!("exec_all_{}", masters),
            exec_all_slaves: format!("exec_all_{}", slaves),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Joins ordinals with single spaces.
pub fn node_list(ordinals: &[usize]) -> String {
    join(ordinals, " ")
}

/// The ordinals `nodes..=1`, space-separated.
pub fn stop_node_list(nodes: usize) -> String {
    node_list(&(1..=nodes).rev().collect::<Vec<_>>())
}

/// The comma-joined `<host>:<group port>` list every node uses to find its peers.
pub fn connection_string(host: &str, group_ports: impl IntoIterator<Item = u16>) -> String {
    let addresses: Vec<String> = group_ports
        .into_iter()
        .map(|port| format!("{}:{}", host, port))
        .collect();

    addresses.join(",")
}

/// The directory name of node `ordinal`, e.g. `node2`.
pub fn node_dir_name(prefix: &str, ordinal: usize) -> String {
    format!("{}{}", prefix, ordinal)
}

/// The server id of node `ordinal`.
pub fn server_id(base_server_id: u32, ordinal: usize) -> u32 {
    (base_server_id + ordinal as u32) * 100
}

/// The English plural of a role label.
pub fn plural(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if ["s", "x", "z", "ch", "sh"].iter().any(|end| lower.ends_with(end)) {
        return format!("{}es", word);
    }

    let mut chars = lower.chars().rev();
    if let (Some('y'), Some(before)) = (chars.next(), chars.next()) {
        if !"aeiou".contains(before) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }

    format!("{}s", word)
}

fn join<T: Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_primary_roles() {
        let roles = RoleLists::new(5, true);
        assert_eq!(roles.master_list(), "1");
        assert_eq!(roles.slave_list(), "2 3 4 5");
        assert_eq!(roles.role_of(1), NodeRole::Primary);
        assert_eq!(roles.role_of(3), NodeRole::Secondary);
        assert!(roles.is_partition_of(5));
    }

    #[test]
    fn test_multi_primary_roles() {
        let roles = RoleLists::new(3, false);
        assert_eq!(roles.master_list(), "1 2 3");
        assert!(roles.slaves.is_empty());
        assert_eq!(roles.slave_list(), "");
        assert!(roles.is_partition_of(3));
        assert!(!roles.is_partition_of(4));
    }

    #[test]
    fn test_connection_string() {
        let peers = connection_string("127.0.0.1", [20126, 20127, 20128]);
        assert_eq!(peers, "127.0.0.1:20126,127.0.0.1:20127,127.0.0.1:20128");
        assert_eq!(peers.split(',').count(), 3);
    }

    #[test]
    fn test_stop_node_list() {
        assert_eq!(stop_node_list(3), "3 2 1");
        assert_eq!(stop_node_list(1), "1");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural("slave"), "slaves");
        assert_eq!(plural("master"), "masters");
        assert_eq!(plural("replica"), "replicas");
        assert_eq!(plural("box"), "boxes");
        assert_eq!(plural("proxy"), "proxies");
        assert_eq!(plural("key"), "keys");
    }

    #[test]
    fn test_role_script_names() {
        let names = RoleScriptNames::new("master", "slave");
        assert_eq!(names.use_all_masters, "use_all_masters");
        assert_eq!(names.use_all_slaves, "use_all_slaves");
        assert_eq!(names.exec_all_masters, "exec_all_masters");
        assert_eq!(names.exec_all_slaves, "exec_all_slaves");
    }

    #[test]
    fn test_node_naming() {
        assert_eq!(node_dir_name("node", 2), "node2");
        assert_eq!(server_id(0, 1), 100);
        assert_eq!(server_id(10, 3), 1300);
    }
}
