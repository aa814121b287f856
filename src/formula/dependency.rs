//! Dependency ordering for element evaluation.
//!
//! Elements may reference each other's computed amounts, so evaluation must
//! follow a topological order of the dependency graph. Cycles are a
//! configuration error and are reported with the full cycle path.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{EngineError, EngineResult};

/// Produces an evaluation order for the given dependency graph.
///
/// `graph` maps each node to the nodes it depends on. Edges to nodes absent
/// from the graph are ignored; a missing dependency is resolved externally
/// (e.g., a base-salary input), not an error. Every node appears in the output
/// strictly after all of its listed dependencies that are also in the graph.
///
/// Nodes are visited in sorted order, so the result is deterministic for a
/// given graph.
///
/// # Errors
///
/// Fails with [`EngineError::CircularDependency`] carrying the full cycle path
/// (first node repeated at the end) when the graph contains a cycle.
///
/// # Example
///
/// ```
/// use payroll_engine::formula::dependency::topological_sort;
/// use std::collections::BTreeMap;
///
/// let mut graph = BTreeMap::new();
/// graph.insert("hra".to_string(), vec!["basic".to_string()]);
/// graph.insert("basic".to_string(), vec![]);
///
/// let order = topological_sort(&graph).unwrap();
/// assert_eq!(order, vec!["basic".to_string(), "hra".to_string()]);
/// ```
pub fn topological_sort(graph: &BTreeMap<String, Vec<String>>) -> EngineResult<Vec<String>> {
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut order: Vec<String> = Vec::with_capacity(graph.len());
    // Stack of the current DFS path, used to reconstruct cycle diagnostics.
    let mut path: Vec<&str> = Vec::new();
    let mut visiting: BTreeSet<&str> = BTreeSet::new();

    for node in graph.keys() {
        visit(node, graph, &mut visited, &mut visiting, &mut path, &mut order)?;
    }

    Ok(order)
}

fn visit<'a>(
    node: &'a str,
    graph: &'a BTreeMap<String, Vec<String>>,
    visited: &mut BTreeSet<&'a str>,
    visiting: &mut BTreeSet<&'a str>,
    path: &mut Vec<&'a str>,
    order: &mut Vec<String>,
) -> EngineResult<()> {
    if visited.contains(node) {
        return Ok(());
    }
    if visiting.contains(node) {
        let start = path.iter().position(|&n| n == node).unwrap_or(0);
        let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
        cycle.push(node.to_string());
        return Err(EngineError::CircularDependency { cycle });
    }

    // Dependencies outside the graph are external inputs, not graph nodes.
    let Some(deps) = graph.get(node) else {
        return Ok(());
    };

    visiting.insert(node);
    path.push(node);
    for dep in deps {
        visit(dep, graph, visited, visiting, path, order)?;
    }
    path.pop();
    visiting.remove(node);

    visited.insert(node);
    order.push(node.to_string());
    Ok(())
}
