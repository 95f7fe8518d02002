//! Generic function node built from a table entry
//!
//! Every function node is described by its data type, identifier, label and
//! arity kind. The arity kind selects one of three socket layouts.

use serde::Serialize;

use crate::error::Result;
use crate::nodes::builder::NodeBuilder;
use crate::nodes::defaults::NodeDefaults;
use crate::nodes::factory::{DataType, NodeCategory, NodeFactory, NodeMetadata, SocketType};
use crate::nodes::node::{NodeProperties, VariadicProperty};
use crate::nodes::shape::resolve_variadic_shape;

/// Property holding the variadic slot states
pub const VARIADIC_PROPERTY: &str = "variadic";
/// Vectorized properties of a binary node
pub const USE_LIST_A: &str = "use_list__a";
pub const USE_LIST_B: &str = "use_list__b";
/// Vectorized property of a unary node
pub const USE_LIST: &str = "use_list";

/// Input arity class of a function node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// Any number of inputs, each scalar or list
    Variadic,
    /// Two vectorized inputs
    Binary,
    /// One vectorized input
    Unary,
}

impl Arity {
    pub fn name(&self) -> &'static str {
        match self {
            Arity::Variadic => "variadic",
            Arity::Binary => "binary",
            Arity::Unary => "unary",
        }
    }
}

/// One row of a function node table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionNodeDef {
    pub data_type: DataType,
    pub node_type: &'static str,
    pub display_name: &'static str,
    pub arity: Arity,
}

impl FunctionNodeDef {
    pub const fn new(data_type: DataType, node_type: &'static str, display_name: &'static str, arity: Arity) -> Self {
        Self {
            data_type,
            node_type,
            display_name,
            arity,
        }
    }

    pub const fn variadic(data_type: DataType, node_type: &'static str, display_name: &'static str) -> Self {
        Self::new(data_type, node_type, display_name, Arity::Variadic)
    }

    pub const fn binary(data_type: DataType, node_type: &'static str, display_name: &'static str) -> Self {
        Self::new(data_type, node_type, display_name, Arity::Binary)
    }

    pub const fn unary(data_type: DataType, node_type: &'static str, display_name: &'static str) -> Self {
        Self::new(data_type, node_type, display_name, Arity::Unary)
    }
}

impl NodeFactory for FunctionNodeDef {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new(
            self.node_type,
            self.display_name,
            NodeCategory::float_math(),
            self.data_type,
            self.arity,
        )
        .with_tags(vec!["math", "function", self.arity.name()])
    }

    fn default_properties(&self, defaults: &NodeDefaults) -> NodeProperties {
        let mut props = NodeProperties::new();
        match self.arity {
            Arity::Variadic => {
                props.insert_variadic(VARIADIC_PROPERTY, VariadicProperty::new(defaults.variadic_slots));
            }
            Arity::Binary => {
                props.insert_vectorized(USE_LIST_A, false).insert_vectorized(USE_LIST_B, false);
            }
            Arity::Unary => {
                props.insert_vectorized(USE_LIST, false);
            }
        }
        props
    }

    fn declare(&self, builder: &mut NodeBuilder<'_>) -> Result<()> {
        let data_type = self.data_type;
        match self.arity {
            Arity::Variadic => {
                builder.base_list_variadic_input("inputs", VARIADIC_PROPERTY, data_type)?;

                let has_list = builder.properties().variadic(VARIADIC_PROPERTY)?.has_list();
                let shape = resolve_variadic_shape(has_list);
                builder.fixed_output("result", "Result", SocketType::new(data_type, shape))?;
            }
            Arity::Binary => {
                builder
                    .vectorized_input("a", USE_LIST_A, "A", "A", data_type)?
                    .vectorized_input("b", USE_LIST_B, "B", "B", data_type)?
                    .vectorized_output("result", &[USE_LIST_A, USE_LIST_B], "Result", "Result", data_type)?;
            }
            Arity::Unary => {
                builder
                    .vectorized_input("input", USE_LIST, "Value", "Values", data_type)?
                    .vectorized_output("output", &[USE_LIST], "Result", "Result", data_type)?;
            }
        }
        Ok(())
    }
}
