//! Dependency graph SVG
//!
//! Renders a laid-out [`Graph`] as an SVG document: directed edges with an
//! arrowhead marker, status-colored node circles, truncated name labels,
//! and a dependency-count caption under nodes that have dependencies.

use super::escape_xml;
use crate::graph::layout::LayoutParams;
use crate::graph::Graph;

const MAX_LABEL_CHARS: usize = 12;

/// Render `graph` (positions already computed) at the dimensions in `params`.
pub fn dependency_graph_svg(graph: &Graph, params: &LayoutParams) -> String {
    if graph.nodes.is_empty() {
        return r#"<p class="small">No services available</p>"#.to_string();
    }

    let edges: String = graph
        .edges
        .iter()
        .map(|edge| {
            let s = &graph.nodes[edge.source];
            let t = &graph.nodes[edge.target];
            format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="rgba(0,0,0,0.2)" stroke-width="2" marker-end="url(#arrowhead)" class="dependency-edge"/>"#,
                s.x, s.y, t.x, t.y,
            )
        })
        .collect();

    let nodes: String = graph
        .nodes
        .iter()
        .map(|node| {
            let caption = if node.dependency_count > 0 {
                let plural = if node.dependency_count > 1 { "s" } else { "" };
                format!(
                    r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="10" class="dep-count">{} dep{plural}</text>"#,
                    node.x,
                    node.y + params.node_radius + 15.0,
                    node.dependency_count,
                )
            } else {
                String::new()
            };
            format!(
                concat!(
                    r#"<g class="service-node" data-id="{id}">"#,
                    r#"<circle cx="{x:.2}" cy="{y:.2}" r="{r}" fill="{color}" opacity="0.9" stroke="white" stroke-width="3"/>"#,
                    r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" dominant-baseline="middle" fill="white" font-size="12" font-weight="600">{label}</text>"#,
                    "{caption}",
                    "</g>"
                ),
                id = escape_xml(&node.id),
                x = node.x,
                y = node.y,
                r = params.node_radius,
                color = node.status.color(),
                label = escape_xml(&truncate_label(&node.name)),
                caption = caption,
            )
        })
        .collect();

    format!(
        concat!(
            r#"<svg viewBox="0 0 {w} {h}" class="dependency-graph">"#,
            r#"<defs><marker id="arrowhead" markerWidth="10" markerHeight="10" refX="9" refY="3" orient="auto">"#,
            r#"<polygon points="0 0, 10 3, 0 6" fill="rgba(0,0,0,0.3)"/>"#,
            r#"</marker></defs>"#,
            r#"<g class="edges">{edges}</g>"#,
            r#"<g class="nodes">{nodes}</g>"#,
            "</svg>"
        ),
        w = params.width,
        h = params.height,
        edges = edges,
        nodes = nodes,
    )
}

fn truncate_label(name: &str) -> String {
    if name.chars().count() > MAX_LABEL_CHARS {
        let prefix: String = name.chars().take(MAX_LABEL_CHARS - 2).collect();
        format!("{prefix}...")
    } else {
        name.to_string()
    }
}
