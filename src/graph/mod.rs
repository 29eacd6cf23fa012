//! Dependency graph materialization
//!
//! Builds transient node/edge collections for one layout-and-render pass of
//! the dependency graph. Nodes wrap a service's display fields plus mutable
//! position and velocity used only during layout; edges index into the node
//! list and exist only when the dependency target is present in the current
//! node set (dangling references are dropped, not an error).

pub mod layout;

use serde::Serialize;
use std::collections::HashMap;

use crate::model::{Service, ServiceStatus};

/// A service placed on the layout canvas. Lives for one render pass.
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub status: ServiceStatus,
    pub dependency_count: usize,
    pub x: f64,
    pub y: f64,
    #[serde(skip)]
    pub vx: f64,
    #[serde(skip)]
    pub vy: f64,
}

/// A directed dependency edge, as indices into the node list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    /// Materialize nodes and edges from the current services, in input
    /// order. Dependencies naming services absent from `services` produce
    /// no edge.
    pub fn from_services(services: &[Service]) -> Self {
        let nodes: Vec<GraphNode> = services
            .iter()
            .map(|svc| GraphNode {
                id: svc.id.clone(),
                name: svc.name.clone(),
                status: svc.status,
                dependency_count: svc.dependencies.len(),
                x: 0.0,
                y: 0.0,
                vx: 0.0,
                vy: 0.0,
            })
            .collect();

        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let mut edges = Vec::new();
        for (source, svc) in services.iter().enumerate() {
            for dep in &svc.dependencies {
                if let Some(&target) = index.get(dep.as_str()) {
                    edges.push(GraphEdge { source, target });
                }
            }
        }

        Self { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(id: &str, deps: &[&str]) -> Service {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": id,
            "dependencies": deps,
        }))
        .unwrap()
    }

    #[test]
    fn edges_follow_dependency_lists() {
        let services = vec![
            service("gateway", &["db", "cache"]),
            service("db", &[]),
            service("cache", &["db"]),
        ];
        let graph = Graph::from_services(&services);
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges.len(), 3);
        assert!(graph.edges.contains(&GraphEdge { source: 0, target: 1 }));
        assert!(graph.edges.contains(&GraphEdge { source: 2, target: 1 }));
    }

    #[test]
    fn dangling_dependencies_produce_no_edges() {
        let services = vec![service("web", &["ghost", "db"]), service("db", &[])];
        let graph = Graph::from_services(&services);
        assert_eq!(graph.edges, vec![GraphEdge { source: 0, target: 1 }]);
    }

    #[test]
    fn empty_input_is_an_empty_graph() {
        let graph = Graph::from_services(&[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }
}
