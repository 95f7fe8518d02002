//! Error type shared by the declaration, registry and graph layers

use thiserror::Error;

use crate::nodes::{NodeId, PortId};

/// Errors raised while declaring, registering, linking or inferring nodes
#[derive(Debug, Error, PartialEq)]
pub enum NodeError {
    #[error("unknown socket type '{0}'")]
    UnknownSocketType(String),

    #[error("node type '{0}' is already registered")]
    DuplicateNodeType(String),

    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),

    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("property '{0}' is not defined on this node")]
    MissingProperty(String),

    #[error("property '{name}' is not a {expected} property")]
    PropertyKind { name: String, expected: &'static str },

    #[error("variadic slot {index} out of range for property '{name}'")]
    SlotOutOfRange { name: String, index: usize },

    #[error("socket identifier '{0}' is declared twice")]
    DuplicateSocket(String),

    #[error("cannot connect node {0} to itself")]
    SelfConnection(NodeId),

    #[error("node {node} has no {direction} port {port}")]
    PortOutOfRange {
        node: NodeId,
        port: PortId,
        direction: &'static str,
    },

    #[error("input {port} of node {node} is already connected")]
    InputAlreadyConnected { node: NodeId, port: PortId },

    #[error("cycle detected in node graph")]
    CycleDetected,

    #[error("cannot link '{from}' into '{to}' on node {node}")]
    SocketTypeMismatch {
        node: NodeId,
        from: String,
        to: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config '{path}': {reason}")]
    ConfigIo { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, NodeError>;
