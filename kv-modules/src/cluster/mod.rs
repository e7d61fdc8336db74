use quorum_kv::{new_err, Cluster, ErrorKind, KvError};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;


/// Part a configured node plays in the deployment.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeRole {
    Replica,
    Client,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodeRole::Replica => write!(f, "replica"),
            NodeRole::Client => write!(f, "client"),
        }
    }
}

impl FromStr for NodeRole {
    type Err = KvError;

    fn from_str(role: &str) -> Result<Self, Self::Err> {
        match role {
            "replica" => Ok(NodeRole::Replica),
            "client" => Ok(NodeRole::Client),
            _ => new_err(
                ErrorKind::Configuration,
                format!("Unknown node role '{}'", role),
                String::new(),
            ),
        }
    }
}

/// One line of the cluster configuration file.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeEntry {
    pub node_id: String,
    pub host: String,
    pub port: u16,
    pub role: NodeRole,
}

impl NodeEntry {
    pub fn new(node_id: &str, host: &str, port: u16, role: NodeRole) -> NodeEntry {
        NodeEntry {
            node_id: node_id.to_string(),
            host: host.to_string(),
            port,
            role,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Static cluster configuration loaded from a `<node_id> <host> <port> [role]`
/// file. Keeps the configured order of the nodes.
#[derive(Clone, Debug)]
pub struct ClusterConfiguration {
    entries: Arc<Vec<NodeEntry>>,
}

impl Cluster for ClusterConfiguration {
    fn resolve(&self, node_id: &str) -> Option<String> {
        self.entry(node_id).map(NodeEntry::address)
    }

    fn replica_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.role == NodeRole::Replica)
            .map(|entry| entry.node_id.clone())
            .collect()
    }
}

impl ClusterConfiguration {
    /// Creates a configuration from the entry list. A repeated node id
    /// replaces the earlier entry in place.
    pub fn new(nodes: Vec<NodeEntry>) -> ClusterConfiguration {
        let mut entries: Vec<NodeEntry> = Vec::new();
        for node in nodes {
            match entries.iter_mut().find(|entry| entry.node_id == node.node_id) {
                Some(existing) => {
                    warn!(
                        "Cluster configuration - duplicate node {}, using {}",
                        node.node_id,
                        node.address()
                    );
                    *existing = node;
                }
                None => entries.push(node),
            }
        }

        ClusterConfiguration {
            entries: Arc::new(entries),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ClusterConfiguration, KvError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => ClusterConfiguration::parse(&text),
            Err(err) => new_err(
                ErrorKind::Configuration,
                format!("Cannot read cluster configuration {}", path.display()),
                err.to_string(),
            ),
        }
    }

    /// Parses configuration text. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<ClusterConfiguration, KvError> {
        let mut nodes = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            nodes.push(parse_entry(index + 1, line)?);
        }

        Ok(ClusterConfiguration::new(nodes))
    }

    pub fn entry(&self, node_id: &str) -> Option<&NodeEntry> {
        self.entries.iter().find(|entry| entry.node_id == node_id)
    }

    pub fn entries(&self) -> &[NodeEntry] {
        &self.entries
    }

    /// Looks up the own entry of `node_id`, whatever role it carries.
    pub fn lookup(&self, node_id: &str) -> Result<&NodeEntry, KvError> {
        match self.entry(node_id) {
            Some(entry) => Ok(entry),
            None => new_err(
                ErrorKind::Configuration,
                format!("Node {} is missing from the cluster configuration", node_id),
                String::new(),
            ),
        }
    }

    /// Looks up `node_id` and checks it is configured with `role`.
    pub fn require(&self, node_id: &str, role: NodeRole) -> Result<&NodeEntry, KvError> {
        let entry = self.lookup(node_id)?;
        if entry.role != role {
            return new_err(
                ErrorKind::Configuration,
                format!("Node {} is configured as {}, not {}", node_id, entry.role, role),
                String::new(),
            );
        }

        Ok(entry)
    }
}

fn parse_entry(line_number: usize, line: &str) -> Result<NodeEntry, KvError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 || fields.len() > 4 {
        return new_err(
            ErrorKind::Configuration,
            format!(
                "Line {}: expected '<node_id> <host> <port> [role]', got '{}'",
                line_number, line
            ),
            String::new(),
        );
    }

    let port = match fields[2].parse::<u16>() {
        Ok(port) => port,
        Err(err) => {
            return new_err(
                ErrorKind::Configuration,
                format!("Line {}: invalid port '{}'", line_number, fields[2]),
                err.to_string(),
            )
        }
    };

    let role = match fields.get(3) {
        Some(role) => role.parse::<NodeRole>()?,
        None => NodeRole::Replica,
    };

    Ok(NodeEntry::new(fields[0], fields[1], port, role))
}
