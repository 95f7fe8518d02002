//! Node instances and their per-node properties

use std::collections::BTreeMap;

use serde::Serialize;

use super::builder::Declaration;
use super::port::{Port, PortType};
use super::shape::SocketShape;
use crate::error::{NodeError, Result};

/// Unique identifier for a node
pub type NodeId = usize;

/// Slot states of a base/list variadic input group
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VariadicProperty {
    slots: Vec<SocketShape>,
}

impl VariadicProperty {
    /// Variadic group with `count` scalar slots
    pub fn new(count: usize) -> Self {
        Self {
            slots: vec![SocketShape::Scalar; count],
        }
    }

    pub fn with_slots(slots: Vec<SocketShape>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[SocketShape] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn push(&mut self, shape: SocketShape) {
        self.slots.push(shape);
    }

    pub fn remove(&mut self, index: usize) -> Option<SocketShape> {
        if index < self.slots.len() {
            Some(self.slots.remove(index))
        } else {
            None
        }
    }

    /// Aggregate flag: true if any slot is a list
    pub fn has_list(&self) -> bool {
        self.slots.iter().any(|shape| shape.is_list())
    }
}

/// A single node property consulted by the declaration builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Property {
    /// "uses list" flag of one vectorized input
    Vectorized(bool),
    /// Slot states of a variadic input group
    Variadic(VariadicProperty),
}

/// Named properties owned by one node
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NodeProperties {
    values: BTreeMap<String, Property>,
}

impl NodeProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_vectorized(&mut self, name: impl Into<String>, uses_list: bool) -> &mut Self {
        self.values.insert(name.into(), Property::Vectorized(uses_list));
        self
    }

    pub fn insert_variadic(&mut self, name: impl Into<String>, property: VariadicProperty) -> &mut Self {
        self.values.insert(name.into(), Property::Variadic(property));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.values.iter().map(|(name, property)| (name.as_str(), property))
    }

    /// Read a vectorized "uses list" flag
    pub fn uses_list(&self, name: &str) -> Result<bool> {
        match self.values.get(name) {
            Some(Property::Vectorized(uses_list)) => Ok(*uses_list),
            Some(_) => Err(kind_error(name, "vectorized")),
            None => Err(NodeError::MissingProperty(name.to_string())),
        }
    }

    /// Set a vectorized flag, returning whether the value changed
    pub fn set_uses_list(&mut self, name: &str, uses_list: bool) -> Result<bool> {
        match self.values.get_mut(name) {
            Some(Property::Vectorized(current)) => {
                let changed = *current != uses_list;
                *current = uses_list;
                Ok(changed)
            }
            Some(_) => Err(kind_error(name, "vectorized")),
            None => Err(NodeError::MissingProperty(name.to_string())),
        }
    }

    pub fn variadic(&self, name: &str) -> Result<&VariadicProperty> {
        match self.values.get(name) {
            Some(Property::Variadic(property)) => Ok(property),
            Some(_) => Err(kind_error(name, "variadic")),
            None => Err(NodeError::MissingProperty(name.to_string())),
        }
    }

    pub fn variadic_mut(&mut self, name: &str) -> Result<&mut VariadicProperty> {
        match self.values.get_mut(name) {
            Some(Property::Variadic(property)) => Ok(property),
            Some(_) => Err(kind_error(name, "variadic")),
            None => Err(NodeError::MissingProperty(name.to_string())),
        }
    }

    /// Set the shape of one variadic slot, returning whether it changed
    pub fn set_variadic_slot(&mut self, name: &str, index: usize, shape: SocketShape) -> Result<bool> {
        let property = self.variadic_mut(name)?;
        let slot = property
            .slots
            .get_mut(index)
            .ok_or_else(|| NodeError::SlotOutOfRange {
                name: name.to_string(),
                index,
            })?;
        let changed = *slot != shape;
        *slot = shape;
        Ok(changed)
    }
}

fn kind_error(name: &str, expected: &'static str) -> NodeError {
    NodeError::PropertyKind {
        name: name.to_string(),
        expected,
    }
}

/// A function node placed in a graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Registered node type identifier, e.g. `fn_AddFloatsNode`
    pub type_id: String,
    pub title: String,
    pub properties: NodeProperties,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
}

impl Node {
    /// Creates a new node without ports
    pub fn new(id: NodeId, type_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            type_id: type_id.into(),
            title: title.into(),
            properties: NodeProperties::new(),
            inputs: vec![],
            outputs: vec![],
        }
    }

    /// Rebuild the ports from a declaration
    pub fn apply_declaration(&mut self, declaration: &Declaration) {
        self.inputs = declaration
            .inputs
            .iter()
            .enumerate()
            .map(|(i, decl)| Port::from_decl(i, decl, PortType::Input))
            .collect();
        self.outputs = declaration
            .outputs
            .iter()
            .enumerate()
            .map(|(i, decl)| Port::from_decl(i, decl, PortType::Output))
            .collect();
    }

    pub fn input_by_identifier(&self, identifier: &str) -> Option<&Port> {
        self.inputs.iter().find(|port| port.identifier == identifier)
    }

    pub fn output_by_identifier(&self, identifier: &str) -> Option<&Port> {
        self.outputs.iter().find(|port| port.identifier == identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variadic_property_has_list() {
        let mut variadic = VariadicProperty::new(3);
        assert_eq!(variadic.len(), 3);
        assert!(!variadic.has_list());

        variadic.push(SocketShape::List);
        assert!(variadic.has_list());

        assert_eq!(variadic.remove(3), Some(SocketShape::List));
        assert_eq!(variadic.remove(10), None);
        assert!(!variadic.has_list());
    }

    #[test]
    fn test_vectorized_flag_access() {
        let mut props = NodeProperties::new();
        props.insert_vectorized("use_list", false);

        assert_eq!(props.uses_list("use_list"), Ok(false));
        assert_eq!(props.set_uses_list("use_list", true), Ok(true));
        assert_eq!(props.set_uses_list("use_list", true), Ok(false));
        assert_eq!(props.uses_list("use_list"), Ok(true));
        assert_eq!(
            props.uses_list("missing"),
            Err(NodeError::MissingProperty("missing".to_string()))
        );
    }

    #[test]
    fn test_property_kind_mismatch() {
        let mut props = NodeProperties::new();
        props
            .insert_vectorized("flag", false)
            .insert_variadic("group", VariadicProperty::new(2));

        assert!(matches!(
            props.variadic("flag"),
            Err(NodeError::PropertyKind { expected: "variadic", .. })
        ));
        assert!(matches!(
            props.uses_list("group"),
            Err(NodeError::PropertyKind { expected: "vectorized", .. })
        ));
    }

    #[test]
    fn test_set_variadic_slot() {
        let mut props = NodeProperties::new();
        props.insert_variadic("group", VariadicProperty::new(2));

        assert_eq!(props.set_variadic_slot("group", 1, SocketShape::List), Ok(true));
        assert!(props.variadic("group").unwrap().has_list());
        assert_eq!(
            props.set_variadic_slot("group", 2, SocketShape::List),
            Err(NodeError::SlotOutOfRange {
                name: "group".to_string(),
                index: 2
            })
        );
    }
}
