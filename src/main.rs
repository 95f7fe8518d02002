//! fnodle - inspect vectorized function-node declarations from the command line

use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use serde_json::json;

use fnodle::config::Config;
use fnodle::nodes::function::{USE_LIST, VARIADIC_PROPERTY};
use fnodle::nodes::{
    builtin_registry, Connection, DeclarationEngine, Node, NodeDefaults, NodeGraph, NodeId, NodeRegistry,
    SocketShape, VariadicProperty,
};
use fnodle::Declaration;

const USAGE: &str = "\
Usage: fnodle [--config <path>] [--json] <command>

Commands:
  list                                   List registered node types
  declare <type> [--list <prop,...>] [--variadic <base|list,...>]
                                         Print the declaration for a property state
  demo                                   Build a small graph and print inferred socket types";

#[derive(Debug, PartialEq)]
enum Command {
    List,
    Declare {
        node_type: String,
        list_props: Vec<String>,
        variadic: Option<Vec<SocketShape>>,
    },
    Demo,
}

#[derive(Debug)]
struct Cli {
    config: Option<PathBuf>,
    json: bool,
    command: Command,
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            process::exit(2);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::discover(cli.config.as_deref()).context("Failed to load configuration")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level)).init();
    debug!("Using {:?}", config);

    let registry = builtin_registry();
    match cli.command {
        Command::List => list_nodes(registry, cli.json),
        Command::Declare {
            node_type,
            list_props,
            variadic,
        } => declare_node(registry, &config, &node_type, &list_props, variadic, cli.json),
        Command::Demo => run_demo(registry, &config, cli.json),
    }
}

fn parse_args(args: &[String]) -> Result<Cli> {
    let mut config = None;
    let mut json = false;
    let mut positional = Vec::new();
    let mut list_props = Vec::new();
    let mut variadic = None;
    let mut declare_options = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or_else(|| anyhow!("--config needs a path"))?;
                config = Some(PathBuf::from(path));
            }
            "--json" => json = true,
            "--list" => {
                let props = iter.next().ok_or_else(|| anyhow!("--list needs property names"))?;
                list_props.extend(split_list(props).map(str::to_string));
                declare_options = true;
            }
            "--variadic" => {
                let slots = iter.next().ok_or_else(|| anyhow!("--variadic needs slot shapes"))?;
                variadic = Some(split_list(slots).map(parse_shape).collect::<Result<Vec<_>>>()?);
                declare_options = true;
            }
            "-h" | "--help" => bail!("help requested"),
            flag if flag.starts_with('-') => bail!("unknown option '{}'", flag),
            _ => positional.push(arg.clone()),
        }
    }

    let command = match positional.as_slice() {
        [cmd] if cmd == "list" => Command::List,
        [cmd] if cmd == "demo" => Command::Demo,
        [cmd, node_type] if cmd == "declare" => Command::Declare {
            node_type: node_type.clone(),
            list_props,
            variadic,
        },
        [cmd] if cmd == "declare" => bail!("declare needs a node type"),
        [] => bail!("missing command"),
        other => bail!("unexpected arguments: {}", other.join(" ")),
    };

    if declare_options && !matches!(command, Command::Declare { .. }) {
        bail!("--list and --variadic only apply to declare");
    }

    Ok(Cli { config, json, command })
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_shape(value: &str) -> Result<SocketShape> {
    match value {
        "base" | "scalar" => Ok(SocketShape::Scalar),
        "list" => Ok(SocketShape::List),
        other => bail!("unknown slot shape '{}', expected base or list", other),
    }
}

fn list_nodes(registry: &NodeRegistry, as_json: bool) -> Result<()> {
    let mut entries = Vec::new();
    for node_type in registry.node_types() {
        if let Some(meta) = registry.get_metadata(node_type) {
            entries.push(meta);
        }
    }

    if as_json {
        let value: Vec<_> = entries
            .iter()
            .map(|meta| {
                json!({
                    "node_type": meta.node_type,
                    "label": meta.display_name,
                    "category": meta.category.display_string(),
                    "data_type": meta.data_type.name(),
                    "arity": meta.arity.name(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for meta in &entries {
        println!(
            "{:<24} {:<20} {:<12} {}",
            meta.node_type,
            meta.display_name,
            meta.category.display_string(),
            meta.arity.name()
        );
    }
    Ok(())
}

fn declare_node(
    registry: &NodeRegistry,
    config: &Config,
    node_type: &str,
    list_props: &[String],
    variadic: Option<Vec<SocketShape>>,
    as_json: bool,
) -> Result<()> {
    let mut node = registry.create_node(node_type, &NodeDefaults::from(config))?;

    for prop in list_props {
        node.properties
            .set_uses_list(prop, true)
            .with_context(|| format!("Cannot set '{}' on {}", prop, node_type))?;
    }
    if let Some(slots) = variadic {
        let property = node
            .properties
            .variadic_mut(VARIADIC_PROPERTY)
            .with_context(|| format!("{} has no variadic input", node_type))?;
        *property = VariadicProperty::with_slots(slots);
    }

    let declaration = registry.declare(&node)?;
    info!("Declared {} with {} inputs", node_type, declaration.inputs.len());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&declaration)?);
    } else {
        print_declaration(&node.title, &declaration);
    }
    Ok(())
}

fn print_declaration(title: &str, declaration: &Declaration) {
    println!("{}", title);
    for socket in &declaration.inputs {
        println!("  in  {:<12} {:<12} {}", socket.identifier, socket.label, socket.socket_type);
    }
    for socket in &declaration.outputs {
        println!("  out {:<12} {:<12} {}", socket.identifier, socket.label, socket.socket_type);
    }
}

/// Sine (list) -> Subtract.a, Subtract -> Add[1], Cosine -> Add[0]
fn build_demo_graph(registry: &NodeRegistry, defaults: &NodeDefaults) -> Result<(NodeGraph, Vec<NodeId>)> {
    let mut graph = NodeGraph::new();

    let mut sine = registry.create_node("fn_SineNode", defaults)?;
    sine.properties.set_uses_list(USE_LIST, true)?;
    let sine = graph.add_node(sine);
    let cosine = graph.add_node(registry.create_node("fn_CosineNode", defaults)?);
    let subtract = graph.add_node(registry.create_node("fn_SubtractFloatsNode", defaults)?);
    let add = graph.add_node(registry.create_node("fn_AddFloatsNode", defaults)?);

    graph.add_connection(Connection::new(sine, 0, subtract, 0))?;
    graph.add_connection(Connection::new(subtract, 0, add, 1))?;
    graph.add_connection(Connection::new(cosine, 0, add, 0))?;

    Ok((graph, vec![sine, cosine, subtract, add]))
}

fn run_demo(registry: &NodeRegistry, config: &Config, as_json: bool) -> Result<()> {
    let (mut graph, ids) = build_demo_graph(registry, &NodeDefaults::from(config))?;

    let mut engine = DeclarationEngine::new(config.inference_mode);
    engine
        .resolve_dirty_nodes(&mut graph, registry)
        .context("Shape inference failed")?;

    let nodes: Vec<&Node> = ids.iter().filter_map(|id| graph.nodes.get(id)).collect();

    if as_json {
        let value: Vec<_> = nodes
            .iter()
            .map(|node| {
                json!({
                    "id": node.id,
                    "node_type": node.type_id,
                    "inputs": node.inputs,
                    "outputs": node.outputs,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for node in nodes {
        println!("[{}] {}", node.id, node.title);
        for port in &node.inputs {
            println!("  in  {:<12} {}", port.identifier, port.socket_type);
        }
        for port in &node.outputs {
            println!("  out {:<12} {}", port.identifier, port.socket_type);
        }
    }
    println!("{} connections", graph.connections.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_declare() {
        let cli = parse_args(&args(&[
            "--json",
            "declare",
            "fn_AddFloatsNode",
            "--variadic",
            "base,list,base",
        ]))
        .unwrap();

        assert!(cli.json);
        assert_eq!(
            cli.command,
            Command::Declare {
                node_type: "fn_AddFloatsNode".to_string(),
                list_props: vec![],
                variadic: Some(vec![SocketShape::Scalar, SocketShape::List, SocketShape::Scalar]),
            }
        );
    }

    #[test]
    fn test_parse_config_and_list_props() {
        let cli = parse_args(&args(&[
            "--config",
            "fnodle.json",
            "declare",
            "fn_PowerFloatsNode",
            "--list",
            "use_list__b",
        ]))
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("fnodle.json")));
        assert!(matches!(cli.command, Command::Declare { ref list_props, .. } if list_props == &["use_list__b"]));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["declare"])).is_err());
        assert!(parse_args(&args(&["list", "--list", "a"])).is_err());
        assert!(parse_args(&args(&["declare", "x", "--variadic", "many"])).is_err());
        assert!(parse_args(&args(&["--verbose", "list"])).is_err());
    }

    #[test]
    fn test_demo_graph_infers_lists() {
        let registry = builtin_registry();
        let (mut graph, ids) = build_demo_graph(registry, &NodeDefaults::default()).unwrap();

        let mut engine = DeclarationEngine::default();
        engine.resolve_dirty_nodes(&mut graph, registry).unwrap();

        let add = &graph.nodes[&ids[3]];
        assert_eq!(add.inputs[0].socket_type.name(), "Float");
        assert_eq!(add.inputs[1].socket_type.name(), "Float List");
        assert_eq!(add.outputs[0].socket_type.name(), "Float List");
    }
}
