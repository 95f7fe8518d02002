//! Node graph data structures and operations

use std::collections::HashMap;

use super::node::{Node, NodeId};
use super::port::PortId;
use crate::error::{NodeError, Result};

/// Represents a connection between two ports on different nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub from_node: NodeId,
    pub from_port: PortId,
    pub to_node: NodeId,
    pub to_port: PortId,
}

impl Connection {
    pub fn new(from_node: NodeId, from_port: PortId, to_node: NodeId, to_port: PortId) -> Self {
        Self {
            from_node,
            from_port,
            to_node,
            to_port,
        }
    }
}

/// A graph containing nodes and their connections
#[derive(Debug, Clone, Default)]
pub struct NodeGraph {
    pub nodes: HashMap<NodeId, Node>,
    pub connections: Vec<Connection>,
    next_node_id: NodeId,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to the graph and returns its ID
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = self.next_node_id;
        node.id = id;
        self.nodes.insert(id, node);
        self.next_node_id += 1;
        id
    }

    /// Removes a node and all its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections
            .retain(|conn| conn.from_node != node_id && conn.to_node != node_id);
        self.nodes.remove(&node_id)
    }

    /// Adds a connection between two ports.
    ///
    /// Socket types are not compared here: shapes are only known after
    /// inference, which reports mismatches.
    pub fn add_connection(&mut self, connection: Connection) -> Result<()> {
        if connection.from_node == connection.to_node {
            return Err(NodeError::SelfConnection(connection.from_node));
        }

        let from = self
            .nodes
            .get(&connection.from_node)
            .ok_or(NodeError::NodeNotFound(connection.from_node))?;
        let to = self
            .nodes
            .get(&connection.to_node)
            .ok_or(NodeError::NodeNotFound(connection.to_node))?;

        if connection.from_port >= from.outputs.len() {
            return Err(NodeError::PortOutOfRange {
                node: connection.from_node,
                port: connection.from_port,
                direction: "output",
            });
        }
        if connection.to_port >= to.inputs.len() {
            return Err(NodeError::PortOutOfRange {
                node: connection.to_node,
                port: connection.to_port,
                direction: "input",
            });
        }

        // An input accepts a single link
        if self
            .connections
            .iter()
            .any(|c| c.to_node == connection.to_node && c.to_port == connection.to_port)
        {
            return Err(NodeError::InputAlreadyConnected {
                node: connection.to_node,
                port: connection.to_port,
            });
        }

        self.connections.push(connection);
        Ok(())
    }

    pub fn add_connection_by_ids(
        &mut self,
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
    ) -> Result<()> {
        self.add_connection(Connection::new(from_node, from_port, to_node, to_port))
    }

    /// Removes a connection by index
    pub fn remove_connection(&mut self, index: usize) -> Option<Connection> {
        if index < self.connections.len() {
            Some(self.connections.remove(index))
        } else {
            None
        }
    }

    /// Removes the link feeding an input, if any
    pub fn disconnect_input(&mut self, node_id: NodeId, port: PortId) -> Option<Connection> {
        let index = self
            .connections
            .iter()
            .position(|c| c.to_node == node_id && c.to_port == port)?;
        self.remove_connection(index)
    }

    /// Connections feeding into a node
    pub fn incoming(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.to_node == node_id)
    }

    /// Nodes fed directly by a node
    pub fn downstream_of(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut downstream: Vec<NodeId> = self
            .connections
            .iter()
            .filter(|c| c.from_node == node_id)
            .map(|c| c.to_node)
            .collect();
        downstream.sort_unstable();
        downstream.dedup();
        downstream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::defaults::NodeDefaults;
    use crate::nodes::factory::NodeRegistry;

    fn graph_with(types: &[&str]) -> (NodeGraph, Vec<NodeId>) {
        let registry = NodeRegistry::default();
        let mut graph = NodeGraph::new();
        let ids = types
            .iter()
            .map(|t| graph.add_node(registry.create_node(t, &NodeDefaults::default()).unwrap()))
            .collect();
        (graph, ids)
    }

    #[test]
    fn test_basic_graph_operations() {
        let (mut graph, ids) = graph_with(&["fn_SineNode", "fn_CosineNode"]);
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(graph.nodes[&1].id, 1);

        graph.add_connection_by_ids(0, 0, 1, 0).unwrap();
        assert_eq!(graph.connections.len(), 1);

        let removed = graph.remove_node(0);
        assert!(removed.is_some());
        assert!(graph.connections.is_empty());

        // ids are never reused
        let id = graph.add_node(removed.unwrap());
        assert_eq!(id, 2);
    }

    #[test]
    fn test_connection_validation() {
        let (mut graph, _) = graph_with(&["fn_SineNode", "fn_SubtractFloatsNode"]);

        assert_eq!(
            graph.add_connection_by_ids(0, 0, 0, 0),
            Err(NodeError::SelfConnection(0))
        );
        assert_eq!(
            graph.add_connection_by_ids(0, 0, 9, 0),
            Err(NodeError::NodeNotFound(9))
        );
        assert!(matches!(
            graph.add_connection_by_ids(0, 1, 1, 0),
            Err(NodeError::PortOutOfRange { direction: "output", .. })
        ));
        assert!(matches!(
            graph.add_connection_by_ids(0, 0, 1, 2),
            Err(NodeError::PortOutOfRange { direction: "input", .. })
        ));

        graph.add_connection_by_ids(0, 0, 1, 1).unwrap();
        assert_eq!(
            graph.add_connection_by_ids(0, 0, 1, 1),
            Err(NodeError::InputAlreadyConnected { node: 1, port: 1 })
        );
        assert_eq!(graph.incoming(1).count(), 1);
    }

    #[test]
    fn test_disconnect_input() {
        let (mut graph, _) = graph_with(&["fn_SineNode", "fn_CosineNode"]);
        graph.add_connection_by_ids(0, 0, 1, 0).unwrap();

        assert_eq!(graph.downstream_of(0), vec![1]);
        assert_eq!(graph.disconnect_input(1, 0), Some(Connection::new(0, 0, 1, 0)));
        assert_eq!(graph.disconnect_input(1, 0), None);
        assert!(graph.downstream_of(0).is_empty());
    }
}
