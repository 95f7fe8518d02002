//! Node system - declarations, registry, graph and shape inference

pub mod builder;
pub mod cache;
pub mod defaults;
pub mod factory;
pub mod function;
pub mod graph;
pub mod inference;
pub mod node;
pub mod port;
pub mod shape;

// Function node tables
pub mod math;

pub use graph::{Connection, NodeGraph};
pub use node::{Node, NodeId, NodeProperties, Property, VariadicProperty};
pub use port::{Port, PortId, PortType};

pub use builder::{Declaration, NodeBuilder, SocketDecl, SocketOrigin};
pub use defaults::NodeDefaults;
pub use factory::{
    builtin_registry, DataType, NodeCategory, NodeFactory, NodeMetadata, NodeRegistry, SocketType,
};
pub use function::{Arity, FunctionNodeDef};
pub use shape::{resolve_shape, resolve_variadic_shape, SocketShape};

pub use inference::{DeclarationEngine, InferenceMode, InferenceStats, NodeState};
