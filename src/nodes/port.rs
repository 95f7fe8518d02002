//! Port types and functionality for node connections

use serde::Serialize;

use crate::nodes::builder::{SocketDecl, SocketOrigin};
use crate::nodes::factory::SocketType;

/// Unique identifier for a port (its index on the node)
pub type PortId = usize;

/// Type of port (input or output)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortType {
    Input,
    Output,
}

/// Represents a connection point on a node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Port {
    pub id: PortId,
    /// Stable identifier from the declaration, e.g. `a` or `inputs[1]`
    pub identifier: String,
    /// Label shown for the current shape
    pub name: String,
    pub port_type: PortType,
    pub socket_type: SocketType,
    pub origin: SocketOrigin,
}

impl Port {
    /// Creates a port from a socket declaration
    pub fn from_decl(id: PortId, decl: &SocketDecl, port_type: PortType) -> Self {
        Self {
            id,
            identifier: decl.identifier.clone(),
            name: decl.label.clone(),
            port_type,
            socket_type: decl.socket_type,
            origin: decl.origin.clone(),
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self.port_type, PortType::Input)
    }

    pub fn is_output(&self) -> bool {
        matches!(self.port_type, PortType::Output)
    }
}
