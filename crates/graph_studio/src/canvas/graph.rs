use std::collections::{HashMap, HashSet};

use egui::{Pos2, Rect, Vec2};
use log::warn;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Directed;
use serde_json::Value;

use super::shape;
use crate::label::{Label, NodeData};
use crate::model::{GraphEdge, GraphNode, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasNode {
    pub id: String,
    pub location: Pos2,
    /// Position as loaded. Written back unchanged while the node stays put.
    pub origin: Position,
    /// Payload as loaded. The label is replaced by its resolved text on export.
    pub data: NodeData,
    pub style: Option<Value>,
    /// Resolved display text, computed once on insert.
    pub label: String,
    pub selected: bool,
    pub dragged: bool,
}

impl CanvasNode {
    /// Record position: the loaded one unless the node was moved.
    pub fn position(&self) -> Position {
        if Pos2::from(self.origin) == self.location {
            self.origin
        } else {
            Position::from(self.location)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasEdge {
    pub id: String,
    pub style: Option<Value>,
    pub selected: bool,
}

/// Edge being drawn from a node to the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectDraft {
    pub from: NodeIndex,
    pub to: Pos2,
}

/// Editable graph shown by [`super::CanvasView`].
///
/// Wraps a [`StableGraph`] so indices stay valid across removals and keeps
/// the record ids used on the wire next to each element.
#[derive(Debug, Clone, Default)]
pub struct GraphCanvas {
    g: StableGraph<CanvasNode, CanvasEdge, Directed>,
    by_id: HashMap<String, NodeIndex>,
    selected_nodes: Vec<NodeIndex>,
    selected_edges: Vec<EdgeIndex>,
    dragged_node: Option<NodeIndex>,
    hovered_node: Option<NodeIndex>,
    connect_draft: Option<ConnectDraft>,
}

impl GraphCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the canvas from wire records.
    ///
    /// Nodes with an id seen before are skipped. Edges pointing at unknown
    /// nodes are dropped. Duplicate edge ids get a fresh id.
    pub fn from_records(nodes: &[GraphNode], edges: &[GraphEdge]) -> Self {
        let mut canvas = Self::new();
        for node in nodes {
            if canvas.by_id.contains_key(&node.id) {
                warn!("skipping node with duplicate id {}", node.id);
                continue;
            }
            canvas.add_node(node);
        }

        let mut edge_ids = HashSet::new();
        for edge in edges {
            let endpoints = (canvas.by_id.get(&edge.source), canvas.by_id.get(&edge.target));
            let (Some(&s), Some(&t)) = endpoints else {
                warn!(
                    "dropping edge {} with dangling endpoint ({} -> {})",
                    edge.id, edge.source, edge.target
                );
                continue;
            };
            let id = if edge_ids.contains(&edge.id) {
                let fresh = unique_edge_id(&edge_ids, &edge.source, &edge.target);
                warn!("edge id {} is used twice, renamed to {fresh}", edge.id);
                fresh
            } else {
                edge.id.clone()
            };
            edge_ids.insert(id.clone());
            canvas.g.add_edge(
                s,
                t,
                CanvasEdge {
                    id,
                    style: edge.style.clone(),
                    selected: false,
                },
            );
        }
        canvas
    }

    pub fn add_node(&mut self, node: &GraphNode) -> NodeIndex {
        if let Some(&idx) = self.by_id.get(&node.id) {
            return idx;
        }
        let idx = self.g.add_node(CanvasNode {
            id: node.id.clone(),
            location: node.position.into(),
            origin: node.position,
            label: node.data.display_text(),
            data: node.data.clone(),
            style: node.style.clone(),
            selected: false,
            dragged: false,
        });
        self.by_id.insert(node.id.clone(), idx);
        idx
    }

    pub fn node_records(&self) -> Vec<GraphNode> {
        self.g
            .node_indices()
            .filter_map(|idx| self.g.node_weight(idx))
            .map(|n| GraphNode {
                id: n.id.clone(),
                position: n.position(),
                data: NodeData {
                    label: Label::PlainText(n.label.clone()),
                    ..n.data.clone()
                },
                style: n.style.clone(),
            })
            .collect()
    }

    pub fn edge_records(&self) -> Vec<GraphEdge> {
        self.g
            .edge_references()
            .map(|e| GraphEdge {
                id: e.weight().id.clone(),
                source: self.g[e.source()].id.clone(),
                target: self.g[e.target()].id.clone(),
                style: e.weight().style.clone(),
            })
            .collect()
    }

    pub fn to_records(&self) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        (self.node_records(), self.edge_records())
    }

    pub fn node_count(&self) -> usize {
        self.g.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.g.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.g.node_count() == 0
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.by_id.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&CanvasNode> {
        self.g.node_weight(idx)
    }

    pub fn edge(&self, idx: EdgeIndex) -> Option<&CanvasEdge> {
        self.g.edge_weight(idx)
    }

    pub fn edge_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.g.edge_endpoints(idx)
    }

    pub fn nodes_iter(&self) -> impl Iterator<Item = (NodeIndex, &CanvasNode)> {
        self.g
            .node_indices()
            .filter_map(move |idx| self.g.node_weight(idx).map(|n| (idx, n)))
    }

    pub fn edges_iter(&self) -> impl Iterator<Item = (EdgeIndex, &CanvasEdge)> {
        self.g.edge_references().map(|e| (e.id(), e.weight()))
    }

    /// Adds an edge `source -> target` with a generated id.
    ///
    /// Self-loops and a second edge between the same ordered pair are refused.
    pub fn connect(&mut self, source: NodeIndex, target: NodeIndex) -> Option<EdgeIndex> {
        if source == target || self.g.find_edge(source, target).is_some() {
            return None;
        }
        let source_id = self.g.node_weight(source)?.id.clone();
        let target_id = self.g.node_weight(target)?.id.clone();
        let taken: HashSet<String> = self.g.edge_weights().map(|e| e.id.clone()).collect();
        let id = unique_edge_id(&taken, &source_id, &target_id);
        Some(self.g.add_edge(
            source,
            target,
            CanvasEdge {
                id,
                style: None,
                selected: false,
            },
        ))
    }

    pub fn connect_ids(&mut self, source: &str, target: &str) -> Option<EdgeIndex> {
        let s = self.node_index(source)?;
        let t = self.node_index(target)?;
        self.connect(s, t)
    }

    pub fn move_node(&mut self, idx: NodeIndex, delta: Vec2) {
        if let Some(n) = self.g.node_weight_mut(idx) {
            n.location += delta;
        }
    }

    pub fn set_location(&mut self, idx: NodeIndex, location: Pos2) {
        if let Some(n) = self.g.node_weight_mut(idx) {
            n.location = location;
        }
    }

    pub fn selected_nodes(&self) -> &[NodeIndex] {
        &self.selected_nodes
    }

    pub fn selected_edges(&self) -> &[EdgeIndex] {
        &self.selected_edges
    }

    pub fn has_selection(&self) -> bool {
        !(self.selected_nodes.is_empty() && self.selected_edges.is_empty())
    }

    pub fn set_node_selected(&mut self, idx: NodeIndex, selected: bool) {
        let Some(n) = self.g.node_weight_mut(idx) else {
            return;
        };
        n.selected = selected;
        self.selected_nodes.retain(|i| *i != idx);
        if selected {
            self.selected_nodes.push(idx);
        }
    }

    pub fn set_edge_selected(&mut self, idx: EdgeIndex, selected: bool) {
        let Some(e) = self.g.edge_weight_mut(idx) else {
            return;
        };
        e.selected = selected;
        self.selected_edges.retain(|i| *i != idx);
        if selected {
            self.selected_edges.push(idx);
        }
    }

    pub fn deselect_all(&mut self) {
        for idx in std::mem::take(&mut self.selected_nodes) {
            if let Some(n) = self.g.node_weight_mut(idx) {
                n.selected = false;
            }
        }
        for idx in std::mem::take(&mut self.selected_edges) {
            if let Some(e) = self.g.edge_weight_mut(idx) {
                e.selected = false;
            }
        }
    }

    /// Removes selected edges, then selected nodes with all their edges.
    /// Returns the number of removed elements.
    pub fn remove_selected(&mut self) -> usize {
        let mut removed = 0;
        for idx in std::mem::take(&mut self.selected_edges) {
            if self.g.remove_edge(idx).is_some() {
                removed += 1;
            }
        }
        for idx in std::mem::take(&mut self.selected_nodes) {
            let incident = self.g.edges_directed(idx, petgraph::Direction::Outgoing).count()
                + self.g.edges_directed(idx, petgraph::Direction::Incoming).count();
            if let Some(node) = self.g.remove_node(idx) {
                self.by_id.remove(&node.id);
                removed += 1 + incident;
            }
        }
        if self.dragged_node.is_some_and(|idx| !self.g.contains_node(idx)) {
            self.dragged_node = None;
        }
        if self.hovered_node.is_some_and(|idx| !self.g.contains_node(idx)) {
            self.hovered_node = None;
        }
        removed
    }

    /// Topmost node under `pos` (canvas coordinates).
    pub fn node_at(&self, pos: Pos2) -> Option<NodeIndex> {
        self.nodes_iter()
            .filter(|(_, n)| shape::is_inside(n.location, pos))
            .last()
            .map(|(idx, _)| idx)
    }

    /// Edge passing within `tolerance` of `pos` (canvas coordinates).
    pub fn edge_at(&self, pos: Pos2, tolerance: f32) -> Option<EdgeIndex> {
        self.g.edge_references().find_map(|e| {
            let (a, b) = shape::edge_segment(
                self.g[e.source()].location,
                self.g[e.target()].location,
            );
            (shape::distance_to_segment(pos, a, b) <= tolerance).then(|| e.id())
        })
    }

    /// Bounding box of all node boxes.
    pub fn bounds(&self) -> Option<Rect> {
        self.g
            .node_weights()
            .map(|n| shape::node_rect(n.location))
            .reduce(|a, b| a.union(b))
    }

    pub fn dragged_node(&self) -> Option<NodeIndex> {
        self.dragged_node
    }

    pub fn set_dragged_node(&mut self, idx: Option<NodeIndex>) {
        if let Some(prev) = self.dragged_node.and_then(|i| self.g.node_weight_mut(i)) {
            prev.dragged = false;
        }
        self.dragged_node = idx.filter(|i| self.g.contains_node(*i));
        if let Some(n) = self.dragged_node.and_then(|i| self.g.node_weight_mut(i)) {
            n.dragged = true;
        }
    }

    pub fn hovered_node(&self) -> Option<NodeIndex> {
        self.hovered_node
    }

    pub fn set_hovered_node(&mut self, idx: Option<NodeIndex>) {
        self.hovered_node = idx;
    }

    pub fn connect_draft(&self) -> Option<ConnectDraft> {
        self.connect_draft
    }

    pub fn set_connect_draft(&mut self, draft: Option<ConnectDraft>) {
        self.connect_draft = draft;
    }
}

/// `edge-{source}-{target}`, suffixed with `-{n}` until it is unused.
fn unique_edge_id(taken: &HashSet<String>, source: &str, target: &str) -> String {
    let base = format!("edge-{source}-{target}");
    if !taken.contains(&base) {
        return base;
    }
    (1..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.clone())
}
