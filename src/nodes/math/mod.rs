//! Float math function nodes

use crate::nodes::factory::DataType;
use crate::nodes::function::FunctionNodeDef;

/// Built-in float math nodes, in registration order
pub const FLOAT_MATH_NODES: &[FunctionNodeDef] = &[
    FunctionNodeDef::variadic(DataType::Float, "fn_AddFloatsNode", "Add Floats"),
    FunctionNodeDef::variadic(DataType::Float, "fn_MultiplyFloatsNode", "Multiply Floats"),
    FunctionNodeDef::variadic(DataType::Float, "fn_MinimumFloatsNode", "Minimum Floats"),
    FunctionNodeDef::variadic(DataType::Float, "fn_MaximumFloatsNode", "Maximum Floats"),
    FunctionNodeDef::binary(DataType::Float, "fn_SubtractFloatsNode", "Subtract Floats"),
    FunctionNodeDef::binary(DataType::Float, "fn_DivideFloatsNode", "Divide Floats"),
    FunctionNodeDef::binary(DataType::Float, "fn_PowerFloatsNode", "Power Floats"),
    FunctionNodeDef::unary(DataType::Float, "fn_SqrtFloatNode", "Sqrt Float"),
    FunctionNodeDef::unary(DataType::Float, "fn_AbsoluteFloatNode", "Absolute Float"),
    FunctionNodeDef::unary(DataType::Float, "fn_SineNode", "Sine"),
    FunctionNodeDef::unary(DataType::Float, "fn_CosineNode", "Cosine"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::function::Arity;
    use std::collections::HashSet;

    #[test]
    fn test_identifiers_are_unique() {
        let ids: HashSet<&str> = FLOAT_MATH_NODES.iter().map(|def| def.node_type).collect();
        assert_eq!(ids.len(), FLOAT_MATH_NODES.len());
        assert!(ids.iter().all(|id| id.starts_with("fn_")));
    }

    #[test]
    fn test_arity_counts() {
        let count = |arity| FLOAT_MATH_NODES.iter().filter(|def| def.arity == arity).count();
        assert_eq!(count(Arity::Variadic), 4);
        assert_eq!(count(Arity::Binary), 3);
        assert_eq!(count(Arity::Unary), 4);
    }

    #[test]
    fn test_absolute_node_identifier() {
        let abs = FLOAT_MATH_NODES
            .iter()
            .find(|def| def.display_name == "Absolute Float")
            .unwrap();
        assert_eq!(abs.node_type, "fn_AbsoluteFloatNode");
        assert_eq!(abs.arity, Arity::Unary);
    }
}
