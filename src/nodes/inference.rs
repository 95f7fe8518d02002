//! Socket shape inference across a node graph
//!
//! This module keeps declarations consistent with the links of a graph:
//! - dirty state tracking and downstream propagation
//! - ordering via topological sort
//! - linked vectorized inputs adopt the shape of the socket feeding them
//! - re-declaration and link type checking
//!
//! Nodes are never evaluated; only their socket types are resolved.

use std::collections::{BTreeSet, HashMap, HashSet};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{NodeError, Result};
use crate::nodes::builder::{Declaration, SocketOrigin};
use crate::nodes::cache::{CacheStatistics, DeclarationCache};
use crate::nodes::factory::{NodeRegistry, SocketType};
use crate::nodes::graph::{Connection, NodeGraph};
use crate::nodes::node::{Node, NodeId};
use crate::nodes::port::PortId;

/// Resolution state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Clean,     // Declaration is up-to-date
    Dirty,     // Declaration needs re-resolution
    Computing, // Declaration is being resolved
    Error,     // Declaration or one of its links is invalid
}

/// When change events trigger resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceMode {
    /// Resolve immediately when links or properties change
    #[default]
    Auto,
    /// Only resolve on an explicit [`DeclarationEngine::resolve_dirty_nodes`]
    Manual,
}

/// Engine keeping node declarations in sync with a graph
pub struct DeclarationEngine {
    node_states: HashMap<NodeId, NodeState>,
    cache: DeclarationCache,
    dirty_nodes: HashSet<NodeId>,
    /// Execution order cache (invalidated when the graph changes)
    execution_order_cache: Option<Vec<NodeId>>,
    mode: InferenceMode,
}

impl DeclarationEngine {
    pub fn new(mode: InferenceMode) -> Self {
        Self {
            node_states: HashMap::new(),
            cache: DeclarationCache::new(),
            dirty_nodes: HashSet::new(),
            execution_order_cache: None,
            mode,
        }
    }

    /// Mark a node as dirty (needs re-resolution)
    pub fn mark_dirty(&mut self, node_id: NodeId, graph: &NodeGraph) {
        if self.node_states.get(&node_id) == Some(&NodeState::Dirty) {
            return;
        }

        self.node_states.insert(node_id, NodeState::Dirty);
        self.dirty_nodes.insert(node_id);
        self.cache.invalidate(node_id);

        self.propagate_dirty_downstream(node_id, graph);
        self.execution_order_cache = None;
    }

    fn propagate_dirty_downstream(&mut self, node_id: NodeId, graph: &NodeGraph) {
        for downstream_id in graph.downstream_of(node_id) {
            if self.node_states.get(&downstream_id) != Some(&NodeState::Dirty) {
                self.node_states.insert(downstream_id, NodeState::Dirty);
                self.dirty_nodes.insert(downstream_id);
                self.cache.invalidate(downstream_id);

                self.propagate_dirty_downstream(downstream_id, graph);
            }
        }
    }

    /// Mark all nodes as dirty (force full re-resolution)
    pub fn mark_all_dirty(&mut self, graph: &NodeGraph) {
        for &node_id in graph.nodes.keys() {
            self.node_states.insert(node_id, NodeState::Dirty);
            self.dirty_nodes.insert(node_id);
        }

        self.cache.clear();
        self.execution_order_cache = None;
    }

    /// Get the resolution order using topological sort.
    ///
    /// Nodes that become ready at the same time are ordered by id.
    pub fn get_execution_order(&mut self, graph: &NodeGraph) -> Result<Vec<NodeId>> {
        if let Some(ref order) = self.execution_order_cache {
            if order.len() == graph.nodes.len() {
                return Ok(order.clone());
            }
        }

        let mut in_degree: HashMap<NodeId, usize> = graph.nodes.keys().map(|&id| (id, 0)).collect();
        let mut adj_list: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        for connection in &graph.connections {
            if !in_degree.contains_key(&connection.from_node) {
                continue;
            }
            if let Some(degree) = in_degree.get_mut(&connection.to_node) {
                *degree += 1;
                adj_list
                    .entry(connection.from_node)
                    .or_default()
                    .push(connection.to_node);
            }
        }

        // Kahn's algorithm
        let mut ready: BTreeSet<NodeId> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut result = Vec::with_capacity(graph.nodes.len());

        while let Some(node_id) = ready.pop_first() {
            result.push(node_id);

            for neighbor in adj_list.get(&node_id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(neighbor) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*neighbor);
                    }
                }
            }
        }

        if result.len() != graph.nodes.len() {
            return Err(NodeError::CycleDetected);
        }

        self.execution_order_cache = Some(result.clone());
        Ok(result)
    }

    /// Resolve all dirty nodes in dependency order.
    /// This runs regardless of the inference mode.
    pub fn resolve_dirty_nodes(&mut self, graph: &mut NodeGraph, registry: &NodeRegistry) -> Result<()> {
        // Nodes this engine has never seen need an initial resolution
        let new_nodes: Vec<NodeId> = graph
            .nodes
            .keys()
            .filter(|id| !self.node_states.contains_key(id))
            .copied()
            .collect();
        for node_id in new_nodes {
            self.mark_dirty(node_id, graph);
        }

        if self.dirty_nodes.is_empty() {
            return Ok(());
        }

        let order = self.get_execution_order(graph)?;
        debug!("Resolving {} dirty nodes", self.dirty_nodes.len());

        for node_id in order {
            if self.dirty_nodes.contains(&node_id) {
                self.resolve_single_node(node_id, graph, registry)?;
            }
        }

        self.dirty_nodes.clear();
        Ok(())
    }

    fn resolve_single_node(&mut self, node_id: NodeId, graph: &mut NodeGraph, registry: &NodeRegistry) -> Result<()> {
        self.node_states.insert(node_id, NodeState::Computing);

        match infer_node(node_id, graph, registry) {
            Ok(declaration) => {
                self.cache.insert(node_id, declaration);
                self.node_states.insert(node_id, NodeState::Clean);
                self.dirty_nodes.remove(&node_id);
                Ok(())
            }
            Err(e) => {
                warn!("Resolution of node {} failed: {}", node_id, e);
                self.node_states.insert(node_id, NodeState::Error);
                Err(e)
            }
        }
    }

    pub fn get_node_state(&self, node_id: NodeId) -> NodeState {
        self.node_states.get(&node_id).copied().unwrap_or(NodeState::Clean)
    }

    /// Last resolved declaration of a node
    pub fn get_declaration(&mut self, node_id: NodeId) -> Option<&Declaration> {
        self.cache.get(node_id)
    }

    pub fn get_cache_statistics(&self) -> &CacheStatistics {
        self.cache.get_statistics()
    }

    /// Handle a new connection being created
    pub fn on_connection_added(
        &mut self,
        connection: &Connection,
        graph: &mut NodeGraph,
        registry: &NodeRegistry,
    ) -> Result<()> {
        info!(
            "Connection added {}:{} -> {}:{}",
            connection.from_node, connection.from_port, connection.to_node, connection.to_port
        );

        // Only the target sees a new input; upstream nodes are unchanged
        self.mark_dirty(connection.to_node, graph);
        self.execution_order_cache = None;
        self.resolve_if_auto(graph, registry)
    }

    /// Handle a connection being removed.
    ///
    /// The previously linked input keeps its inferred shape.
    pub fn on_connection_removed(
        &mut self,
        connection: &Connection,
        graph: &mut NodeGraph,
        registry: &NodeRegistry,
    ) -> Result<()> {
        info!(
            "Connection removed {}:{} -> {}:{}",
            connection.from_node, connection.from_port, connection.to_node, connection.to_port
        );

        self.mark_dirty(connection.to_node, graph);
        self.execution_order_cache = None;
        self.resolve_if_auto(graph, registry)
    }

    /// Handle a property change on a node
    pub fn on_property_changed(&mut self, node_id: NodeId, graph: &mut NodeGraph, registry: &NodeRegistry) -> Result<()> {
        debug!("Property changed on node {} in {:?} mode", node_id, self.mode);
        self.mark_dirty(node_id, graph);
        self.resolve_if_auto(graph, registry)
    }

    /// Remove a node from the graph, forgetting its state and dirtying its
    /// former downstream nodes
    pub fn on_node_removed(
        &mut self,
        node_id: NodeId,
        graph: &mut NodeGraph,
        registry: &NodeRegistry,
    ) -> Result<Option<Node>> {
        let affected = graph.downstream_of(node_id);
        let removed = graph.remove_node(node_id);

        self.node_states.remove(&node_id);
        self.dirty_nodes.remove(&node_id);
        self.cache.invalidate(node_id);
        self.execution_order_cache = None;

        for affected_id in affected {
            self.mark_dirty(affected_id, graph);
        }

        self.resolve_if_auto(graph, registry)?;
        Ok(removed)
    }

    fn resolve_if_auto(&mut self, graph: &mut NodeGraph, registry: &NodeRegistry) -> Result<()> {
        match self.mode {
            InferenceMode::Auto => self.resolve_dirty_nodes(graph, registry),
            InferenceMode::Manual => Ok(()),
        }
    }

    pub fn set_inference_mode(&mut self, mode: InferenceMode) {
        self.mode = mode;
    }

    pub fn get_inference_mode(&self) -> InferenceMode {
        self.mode
    }

    pub fn get_stats(&self) -> InferenceStats {
        let mut stats = InferenceStats {
            total_nodes: self.node_states.len(),
            cached_declarations: self.cache.get_statistics().total_entries,
            ..InferenceStats::default()
        };

        for state in self.node_states.values() {
            match state {
                NodeState::Clean => stats.clean_nodes += 1,
                NodeState::Dirty => stats.dirty_nodes += 1,
                NodeState::Computing => stats.computing_nodes += 1,
                NodeState::Error => stats.error_nodes += 1,
            }
        }

        stats
    }
}

impl Default for DeclarationEngine {
    fn default() -> Self {
        Self::new(InferenceMode::default())
    }
}

/// Statistics about the engine state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferenceStats {
    pub total_nodes: usize,
    pub clean_nodes: usize,
    pub dirty_nodes: usize,
    pub computing_nodes: usize,
    pub error_nodes: usize,
    pub cached_declarations: usize,
}

/// Adopt incoming shapes, re-declare and check every incoming link
fn infer_node(node_id: NodeId, graph: &mut NodeGraph, registry: &NodeRegistry) -> Result<Declaration> {
    // Upstream nodes are resolved first, so their ports are current
    let incoming: Vec<(PortId, SocketType)> = graph
        .incoming(node_id)
        .filter_map(|c| {
            graph
                .nodes
                .get(&c.from_node)
                .and_then(|from| from.outputs.get(c.from_port))
                .map(|port| (c.to_port, port.socket_type))
        })
        .collect();

    let node = graph
        .nodes
        .get_mut(&node_id)
        .ok_or(NodeError::NodeNotFound(node_id))?;

    for (port, source) in &incoming {
        let origin = match node.inputs.get(*port) {
            Some(input) => input.origin.clone(),
            None => continue,
        };
        let changed = match origin {
            SocketOrigin::Vectorized { property } => {
                node.properties.set_uses_list(&property, source.shape.is_list())?
            }
            SocketOrigin::VariadicSlot { property, index } => {
                node.properties.set_variadic_slot(&property, index, source.shape)?
            }
            SocketOrigin::Fixed => false,
        };
        if changed {
            debug!("Node {} input {} now takes {}", node_id, port, source);
        }
    }

    let declaration = registry.declare(node)?;
    node.apply_declaration(&declaration);

    for (port, source) in incoming {
        let target = node.inputs.get(port).ok_or(NodeError::PortOutOfRange {
            node: node_id,
            port,
            direction: "input",
        })?;
        if !source.can_connect_to(&target.socket_type) {
            return Err(NodeError::SocketTypeMismatch {
                node: node_id,
                from: source.name(),
                to: target.socket_type.name(),
            });
        }
    }

    Ok(declaration)
}
