//! Node declaration builder
//!
//! A node declares its sockets through a [`NodeBuilder`]. Vectorized sockets
//! take their shape from the node's properties, so the same node type can
//! expose `Float` or `Float List` sockets depending on how it is used.

use serde::Serialize;

use crate::error::{NodeError, Result};
use crate::nodes::factory::{DataType, SocketType};
use crate::nodes::node::NodeProperties;
use crate::nodes::shape::{resolve_shape, SocketShape};

/// Which property, if any, controls the shape of an input socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SocketOrigin {
    Fixed,
    Vectorized { property: String },
    VariadicSlot { property: String, index: usize },
}

/// One declared socket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocketDecl {
    pub identifier: String,
    pub label: String,
    pub socket_type: SocketType,
    pub origin: SocketOrigin,
}

/// Complete socket layout of a node for one property state
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Declaration {
    pub inputs: Vec<SocketDecl>,
    pub outputs: Vec<SocketDecl>,
}

impl Declaration {
    pub fn input(&self, identifier: &str) -> Option<&SocketDecl> {
        self.inputs.iter().find(|decl| decl.identifier == identifier)
    }

    pub fn output(&self, identifier: &str) -> Option<&SocketDecl> {
        self.outputs.iter().find(|decl| decl.identifier == identifier)
    }
}

/// Collects socket declarations while reading a node's properties
pub struct NodeBuilder<'a> {
    properties: &'a NodeProperties,
    declaration: Declaration,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(properties: &'a NodeProperties) -> Self {
        Self {
            properties,
            declaration: Declaration::default(),
        }
    }

    pub fn properties(&self) -> &NodeProperties {
        self.properties
    }

    /// Input that is a list when the vectorized property `property` is set
    pub fn vectorized_input(
        &mut self,
        identifier: &str,
        property: &str,
        base_label: &str,
        list_label: &str,
        data_type: DataType,
    ) -> Result<&mut Self> {
        let shape = SocketShape::from_uses_list(self.properties.uses_list(property)?);
        let label = match shape {
            SocketShape::Scalar => base_label,
            SocketShape::List => list_label,
        };
        push_unique(
            &mut self.declaration.inputs,
            SocketDecl {
                identifier: identifier.to_string(),
                label: label.to_string(),
                socket_type: SocketType::new(data_type, shape),
                origin: SocketOrigin::Vectorized {
                    property: property.to_string(),
                },
            },
        )?;
        Ok(self)
    }

    /// Output that is a list when any of `properties` is set
    pub fn vectorized_output(
        &mut self,
        identifier: &str,
        properties: &[&str],
        base_label: &str,
        list_label: &str,
        data_type: DataType,
    ) -> Result<&mut Self> {
        let flags = properties
            .iter()
            .map(|property| self.properties.uses_list(property))
            .collect::<Result<Vec<bool>>>()?;
        let shape = resolve_shape(flags);
        let label = match shape {
            SocketShape::Scalar => base_label,
            SocketShape::List => list_label,
        };
        push_unique(
            &mut self.declaration.outputs,
            SocketDecl {
                identifier: identifier.to_string(),
                label: label.to_string(),
                socket_type: SocketType::new(data_type, shape),
                origin: SocketOrigin::Fixed,
            },
        )?;
        Ok(self)
    }

    /// One input per slot of the variadic property, each with its own shape
    pub fn base_list_variadic_input(
        &mut self,
        identifier: &str,
        property: &str,
        data_type: DataType,
    ) -> Result<&mut Self> {
        let variadic = self.properties.variadic(property)?;
        for (index, shape) in variadic.slots().iter().enumerate() {
            let socket_type = SocketType::new(data_type, *shape);
            push_unique(
                &mut self.declaration.inputs,
                SocketDecl {
                    identifier: format!("{}[{}]", identifier, index),
                    label: socket_type.name(),
                    socket_type,
                    origin: SocketOrigin::VariadicSlot {
                        property: property.to_string(),
                        index,
                    },
                },
            )?;
        }
        Ok(self)
    }

    pub fn fixed_input(&mut self, identifier: &str, label: &str, socket_type: SocketType) -> Result<&mut Self> {
        push_unique(&mut self.declaration.inputs, fixed(identifier, label, socket_type))?;
        Ok(self)
    }

    pub fn fixed_output(&mut self, identifier: &str, label: &str, socket_type: SocketType) -> Result<&mut Self> {
        push_unique(&mut self.declaration.outputs, fixed(identifier, label, socket_type))?;
        Ok(self)
    }

    pub fn build(self) -> Declaration {
        self.declaration
    }
}

fn fixed(identifier: &str, label: &str, socket_type: SocketType) -> SocketDecl {
    SocketDecl {
        identifier: identifier.to_string(),
        label: label.to_string(),
        socket_type,
        origin: SocketOrigin::Fixed,
    }
}

fn push_unique(sockets: &mut Vec<SocketDecl>, decl: SocketDecl) -> Result<()> {
    if sockets.iter().any(|existing| existing.identifier == decl.identifier) {
        return Err(NodeError::DuplicateSocket(decl.identifier));
    }
    sockets.push(decl);
    Ok(())
}
