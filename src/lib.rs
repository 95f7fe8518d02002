//! fnodle - vectorized function-node declarations
//!
//! Function nodes declare sockets that are either scalar or list shaped.
//! A node's output becomes a list as soon as any of its inputs is one; the
//! inference engine spreads that shape along the links of a graph.

pub mod config;
pub mod constants;
pub mod error;
pub mod nodes;

pub use config::Config;
pub use error::{NodeError, Result};
pub use nodes::{
    builtin_registry, resolve_shape, resolve_variadic_shape, DataType, Declaration, DeclarationEngine,
    NodeDefaults, NodeGraph, NodeRegistry, SocketShape, SocketType,
};
