//! Force-directed layout simulation
//!
//! Positions the dependency graph by running a fixed number of iterations of
//! three additive forces per node (pairwise inverse-square repulsion, Hooke
//! springs along edges, linear center gravity), then integrating velocity
//! with damping and clamping positions to the visible canvas. No randomness:
//! nodes are seeded on a circle at equal angular spacing in input order, so
//! identical inputs and parameters produce identical coordinates.
//!
//! The repulsion step is O(iterations * nodes^2); fine for a homelab's worth
//! of services, a known scaling limit for large graphs.

use crate::config::{CANVAS_HEIGHT, CANVAS_MARGIN, CANVAS_WIDTH, LAYOUT_ITERATIONS, NODE_RADIUS};
use crate::graph::Graph;

#[derive(Debug, Clone)]
pub struct LayoutParams {
    pub width: f64,
    pub height: f64,
    pub node_radius: f64,
    pub margin: f64,
    pub iterations: usize,
    /// Inverse-square repulsion strength between every node pair.
    pub repulsion: f64,
    /// Hooke constant for edge springs.
    pub spring: f64,
    /// Rest length of edge springs.
    pub ideal_length: f64,
    /// Linear pull toward the canvas center.
    pub gravity: f64,
    /// Velocity multiplier applied after each integration step; < 1.
    pub damping: f64,
    /// Early exit once total speed drops below this. The reference behavior
    /// always runs the full iteration count; set to 0.0 to match it exactly.
    pub settle_epsilon: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            node_radius: NODE_RADIUS,
            margin: CANVAS_MARGIN,
            iterations: LAYOUT_ITERATIONS,
            repulsion: 1200.0,
            spring: 0.05,
            ideal_length: 150.0,
            gravity: 0.0005,
            damping: 0.85,
            settle_epsilon: 1e-4,
        }
    }
}

impl LayoutParams {
    fn min_x(&self) -> f64 {
        self.node_radius + self.margin
    }

    fn max_x(&self) -> f64 {
        self.width - self.node_radius - self.margin
    }

    fn min_y(&self) -> f64 {
        self.node_radius + self.margin
    }

    fn max_y(&self) -> f64 {
        self.height - self.node_radius - self.margin
    }
}

/// Seed node positions on a circle at equal angular spacing, index order =
/// input order. Guarantees no two nodes share a starting position, so the
/// first repulsion pass never divides by zero.
pub fn seed_positions(graph: &mut Graph, params: &LayoutParams) {
    let cx = params.width / 2.0;
    let cy = params.height / 2.0;
    let radius = params.width.min(params.height) / 2.0 - params.node_radius - params.margin;
    let count = graph.nodes.len();

    for (i, node) in graph.nodes.iter_mut().enumerate() {
        let angle = (i as f64 / count as f64) * std::f64::consts::TAU - std::f64::consts::FRAC_PI_2;
        node.x = cx + radius * angle.cos();
        node.y = cy + radius * angle.sin();
        node.vx = 0.0;
        node.vy = 0.0;
    }
}

/// Run the simulation to completion, mutating node positions in place.
/// Returns the number of iterations actually executed.
pub fn run(graph: &mut Graph, params: &LayoutParams) -> usize {
    if graph.nodes.is_empty() {
        return 0;
    }
    seed_positions(graph, params);

    for iteration in 0..params.iterations {
        let total_speed = step(graph, params);
        if params.settle_epsilon > 0.0 && total_speed < params.settle_epsilon {
            return iteration + 1;
        }
    }
    params.iterations
}

/// One simulation iteration. Returns the summed node speed after damping,
/// used by [`run`] for the optional settle early-exit.
fn step(graph: &mut Graph, params: &LayoutParams) -> f64 {
    let cx = params.width / 2.0;
    let cy = params.height / 2.0;
    let nodes = &mut graph.nodes;

    // Pairwise repulsion, applied symmetrically.
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let dx = nodes[j].x - nodes[i].x;
            let dy = nodes[j].y - nodes[i].y;
            let dist = guard_zero((dx * dx + dy * dy).sqrt());
            let force = params.repulsion / (dist * dist);
            let fx = dx / dist * force;
            let fy = dy / dist * force;
            nodes[i].vx -= fx;
            nodes[i].vy -= fy;
            nodes[j].vx += fx;
            nodes[j].vy += fy;
        }
    }

    // Edge springs: attractive past the ideal length, repulsive short of
    // it, applied to both endpoints in opposite directions.
    for edge in &graph.edges {
        let (s, t) = (edge.source, edge.target);
        let dx = nodes[t].x - nodes[s].x;
        let dy = nodes[t].y - nodes[s].y;
        let dist = guard_zero((dx * dx + dy * dy).sqrt());
        let force = (dist - params.ideal_length) * params.spring;
        let fx = dx / dist * force;
        let fy = dy / dist * force;
        nodes[s].vx += fx;
        nodes[s].vy += fy;
        nodes[t].vx -= fx;
        nodes[t].vy -= fy;
    }

    // Center gravity, integration, damping, canvas clamp.
    let mut total_speed = 0.0;
    for node in nodes.iter_mut() {
        node.vx += (cx - node.x) * params.gravity;
        node.vy += (cy - node.y) * params.gravity;

        node.x += node.vx;
        node.y += node.vy;
        node.vx *= params.damping;
        node.vy *= params.damping;

        node.x = node.x.clamp(params.min_x(), params.max_x());
        node.y = node.y.clamp(params.min_y(), params.max_y());

        total_speed += node.vx.hypot(node.vy);
    }
    total_speed
}

fn guard_zero(dist: f64) -> f64 {
    if dist == 0.0 {
        1.0
    } else {
        dist
    }
}
