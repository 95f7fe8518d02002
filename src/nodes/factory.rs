//! Node factory system with registration and metadata

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, error, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::constants::socket::LIST_SUFFIX;
use crate::error::{NodeError, Result};
use crate::nodes::builder::{Declaration, NodeBuilder};
use crate::nodes::defaults::NodeDefaults;
use crate::nodes::function::Arity;
use crate::nodes::node::{Node, NodeProperties};
use crate::nodes::shape::SocketShape;

/// Data types that can flow through sockets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Floating point number
    Float,
    /// Signed integer
    Integer,
    /// Boolean value
    Boolean,
    /// 3D vector (x, y, z)
    Vector3,
    /// RGBA color value
    Color,
    /// Text string
    String,
}

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::Float,
        DataType::Integer,
        DataType::Boolean,
        DataType::Vector3,
        DataType::Color,
        DataType::String,
    ];

    /// Get a human-readable name for this data type
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Float => "Float",
            DataType::Integer => "Integer",
            DataType::Boolean => "Boolean",
            DataType::Vector3 => "Vector3",
            DataType::Color => "Color",
            DataType::String => "String",
        }
    }

    /// The scalar socket type carrying this data type
    pub fn scalar(self) -> SocketType {
        SocketType::new(self, SocketShape::Scalar)
    }

    /// The list socket type carrying this data type
    pub fn list(self) -> SocketType {
        SocketType::new(self, SocketShape::List)
    }
}

/// Concrete type of a socket: a data type and whether it is a list of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketType {
    pub data_type: DataType,
    pub shape: SocketShape,
}

impl SocketType {
    pub fn new(data_type: DataType, shape: SocketShape) -> Self {
        Self { data_type, shape }
    }

    /// Socket type name, e.g. `Float` or `Float List`
    pub fn name(&self) -> String {
        match self.shape {
            SocketShape::Scalar => self.data_type.name().to_string(),
            SocketShape::List => format!("{}{}", self.data_type.name(), LIST_SUFFIX),
        }
    }

    /// Check if a socket of this type can feed a socket of another type
    pub fn can_connect_to(&self, other: &SocketType) -> bool {
        self == other
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for SocketType {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self> {
        let (base, shape) = match s.strip_suffix(LIST_SUFFIX) {
            Some(base) => (base, SocketShape::List),
            None => (s, SocketShape::Scalar),
        };

        DataType::ALL
            .iter()
            .find(|data_type| data_type.name() == base)
            .map(|data_type| SocketType::new(*data_type, shape))
            .ok_or_else(|| NodeError::UnknownSocketType(s.to_string()))
    }
}

/// Hierarchical category system for organizing nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeCategory {
    path: Vec<String>,
}

impl NodeCategory {
    /// Create a new category from path components
    pub fn new(path: &[&str]) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Get the category name (last component)
    pub fn name(&self) -> &str {
        self.path.last().map(|s| s.as_str()).unwrap_or("")
    }

    pub fn parent(&self) -> Option<NodeCategory> {
        if self.path.len() > 1 {
            Some(NodeCategory {
                path: self.path[..self.path.len() - 1].to_vec(),
            })
        } else {
            None
        }
    }

    /// Check if this category is a child of another
    pub fn is_child_of(&self, other: &NodeCategory) -> bool {
        self.path.len() > other.path.len() && self.path[..other.path.len()] == other.path
    }

    pub fn display_string(&self) -> String {
        self.path.join(" > ")
    }

    /// Standard math category
    pub fn math() -> Self {
        Self::new(&["Math"])
    }

    /// Float math category
    pub fn float_math() -> Self {
        Self::new(&["Math", "Float"])
    }
}

/// Metadata describing a registered node type
#[derive(Debug, Clone)]
pub struct NodeMetadata {
    pub node_type: &'static str,
    pub display_name: &'static str,
    pub version: &'static str,
    pub category: NodeCategory,
    pub data_type: DataType,
    pub arity: Arity,
    pub tags: Vec<&'static str>,
}

impl NodeMetadata {
    pub fn new(
        node_type: &'static str,
        display_name: &'static str,
        category: NodeCategory,
        data_type: DataType,
        arity: Arity,
    ) -> Self {
        Self {
            node_type,
            display_name,
            version: "1.0",
            category,
            data_type,
            arity,
            tags: vec![],
        }
    }

    pub fn with_tags(mut self, tags: Vec<&'static str>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_version(mut self, version: &'static str) -> Self {
        self.version = version;
        self
    }
}

/// A node type that can be registered, instantiated and declared
pub trait NodeFactory: Send + Sync {
    /// Static description of the node type
    fn metadata(&self) -> NodeMetadata;

    /// Properties a freshly created node starts with
    fn default_properties(&self, defaults: &NodeDefaults) -> NodeProperties;

    /// Declare the node's sockets for its current property state
    fn declare(&self, builder: &mut NodeBuilder<'_>) -> Result<()>;

    /// Run [`NodeFactory::declare`] against a property set
    fn declaration(&self, properties: &NodeProperties) -> Result<Declaration> {
        let mut builder = NodeBuilder::new(properties);
        self.declare(&mut builder)?;
        Ok(builder.build())
    }

    /// Create a node instance with default properties and matching ports
    fn create(&self, defaults: &NodeDefaults) -> Result<Node> {
        let meta = self.metadata();
        let mut node = Node::new(0, meta.node_type, meta.display_name);
        node.properties = self.default_properties(defaults);

        let declaration = self.declaration(&node.properties)?;
        node.apply_declaration(&declaration);
        Ok(node)
    }
}

/// Registry of node factories keyed by their unique node type identifier
pub struct NodeRegistry {
    factories: BTreeMap<String, Arc<dyn NodeFactory>>,
    categories: HashMap<NodeCategory, Vec<String>>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
            categories: HashMap::new(),
        }
    }

    /// Register a node factory under its metadata identifier
    pub fn register<F: NodeFactory + 'static>(&mut self, factory: F) -> Result<()> {
        let metadata = factory.metadata();
        let node_type = metadata.node_type.to_string();

        if self.factories.contains_key(&node_type) {
            return Err(NodeError::DuplicateNodeType(node_type));
        }

        debug!("Registering node type {} ({})", node_type, metadata.display_name);
        self.factories.insert(node_type.clone(), Arc::new(factory));
        self.categories
            .entry(metadata.category)
            .or_default()
            .push(node_type);
        Ok(())
    }

    /// Register every factory of an iterator, stopping at the first failure
    pub fn register_all<F, I>(&mut self, factories: I) -> Result<()>
    where
        F: NodeFactory + 'static,
        I: IntoIterator<Item = F>,
    {
        for factory in factories {
            self.register(factory)?;
        }
        Ok(())
    }

    pub fn factory(&self, node_type: &str) -> Result<&dyn NodeFactory> {
        self.factories
            .get(node_type)
            .map(|factory| factory.as_ref())
            .ok_or_else(|| NodeError::UnknownNodeType(node_type.to_string()))
    }

    /// Create a node by type name
    pub fn create_node(&self, node_type: &str, defaults: &NodeDefaults) -> Result<Node> {
        self.factory(node_type)?.create(defaults)
    }

    /// Resolve the declaration of a node for its current properties
    pub fn declare(&self, node: &Node) -> Result<Declaration> {
        self.factory(&node.type_id)?.declaration(&node.properties)
    }

    pub fn get_metadata(&self, node_type: &str) -> Option<NodeMetadata> {
        self.factories.get(node_type).map(|factory| factory.metadata())
    }

    pub fn has_node_type(&self, node_type: &str) -> bool {
        self.factories.contains_key(node_type)
    }

    /// All registered node types, sorted
    pub fn node_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    pub fn nodes_in_category(&self, category: &NodeCategory) -> Vec<&str> {
        self.categories
            .get(category)
            .map(|nodes| nodes.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// All categories, sorted by path
    pub fn categories(&self) -> Vec<&NodeCategory> {
        let mut categories: Vec<&NodeCategory> = self.categories.keys().collect();
        categories.sort();
        categories
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        let mut registry = Self::new();

        if let Err(e) = registry.register_all(crate::nodes::math::FLOAT_MATH_NODES.iter().copied()) {
            error!("Failed to register built-in float math nodes: {}", e);
        }

        info!("Registered {} built-in node types", registry.len());
        registry
    }
}

static BUILTIN_REGISTRY: Lazy<NodeRegistry> = Lazy::new(NodeRegistry::default);

/// Shared registry holding the built-in node types
pub fn builtin_registry() -> &'static NodeRegistry {
    &BUILTIN_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::function::FunctionNodeDef;

    #[test]
    fn test_socket_type_names() {
        assert_eq!(DataType::Float.scalar().name(), "Float");
        assert_eq!(DataType::Float.list().name(), "Float List");
        assert_eq!(DataType::Vector3.list().to_string(), "Vector3 List");
    }

    #[test]
    fn test_socket_type_parse() {
        assert_eq!("Float".parse::<SocketType>(), Ok(DataType::Float.scalar()));
        assert_eq!("Integer List".parse::<SocketType>(), Ok(DataType::Integer.list()));
        assert_eq!(
            "Float Lists".parse::<SocketType>(),
            Err(NodeError::UnknownSocketType("Float Lists".to_string()))
        );
        assert!(" List".parse::<SocketType>().is_err());
    }

    #[test]
    fn test_socket_connectability() {
        assert!(DataType::Float.scalar().can_connect_to(&DataType::Float.scalar()));
        assert!(!DataType::Float.list().can_connect_to(&DataType::Float.scalar()));
        assert!(!DataType::Float.scalar().can_connect_to(&DataType::Integer.scalar()));
    }

    #[test]
    fn test_category_hierarchy() {
        let float_math = NodeCategory::float_math();
        assert_eq!(float_math.name(), "Float");
        assert_eq!(float_math.parent(), Some(NodeCategory::math()));
        assert!(float_math.is_child_of(&NodeCategory::math()));
        assert!(!NodeCategory::math().is_child_of(&float_math));
        assert_eq!(float_math.display_string(), "Math > Float");
    }

    #[test]
    fn test_default_registry_contents() {
        let registry = NodeRegistry::default();
        assert_eq!(registry.len(), 11);
        assert!(registry.has_node_type("fn_AddFloatsNode"));
        assert!(registry.has_node_type("fn_CosineNode"));

        let types = registry.node_types();
        let mut sorted = types.clone();
        sorted.sort();
        assert_eq!(types, sorted);

        assert_eq!(registry.nodes_in_category(&NodeCategory::float_math()).len(), 11);
        assert_eq!(registry.categories(), vec![&NodeCategory::float_math()]);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = NodeRegistry::new();
        let def = FunctionNodeDef::unary(DataType::Float, "fn_Test", "Test");
        assert!(registry.register(def).is_ok());
        assert_eq!(
            registry.register(def),
            Err(NodeError::DuplicateNodeType("fn_Test".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_node_type() {
        let registry = NodeRegistry::default();
        let result = registry.create_node("fn_Nope", &NodeDefaults::default());
        assert_eq!(result.err(), Some(NodeError::UnknownNodeType("fn_Nope".to_string())));
        assert!(registry.get_metadata("fn_Nope").is_none());
    }

    #[test]
    fn test_create_node_from_registry() {
        let registry = NodeRegistry::default();
        let node = registry
            .create_node("fn_PowerFloatsNode", &NodeDefaults::default())
            .unwrap();
        assert_eq!(node.type_id, "fn_PowerFloatsNode");
        assert_eq!(node.title, "Power Floats");
        assert_eq!(node.inputs.len(), 2);
        assert_eq!(node.outputs.len(), 1);
        assert_eq!(node.outputs[0].socket_type, DataType::Float.scalar());
    }

    #[test]
    fn test_builtin_registry_is_shared() {
        let first = builtin_registry() as *const NodeRegistry;
        let second = builtin_registry() as *const NodeRegistry;
        assert_eq!(first, second);
        assert_eq!(builtin_registry().len(), 11);
    }
}
