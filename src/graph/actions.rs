//! Composable, reversible local graph edits
//!
//! Every action exposes `apply(g) -> bool` / `undo(g) -> bool`. `apply`
//! returns `false` (graph left unchanged) when its preconditions are no
//! longer met; callers treat that as "rejected", not an error. Actions
//! record just enough state during `apply` to make `undo` reconstruct the
//! pre-image, and compose into the rule implementations in `crate::rules`.

use crate::phase::Phase;

use super::vertex::{EdgeType, VertexId, VertexType};
use super::zxgraph::ZXGraph;

/// Flips Z<->X on a non-boundary spider and every incident edge between
/// simple and Hadamard.
#[derive(Clone, Debug)]
pub struct ToggleVertex {
    pub v: VertexId,
    original_type: Option<VertexType>,
}

impl ToggleVertex {
    pub fn new(v: VertexId) -> Self {
        ToggleVertex { v, original_type: None }
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        let Some(vertex) = g.vertex(self.v) else { return false };
        if !vertex.vtype.is_spider() {
            return false;
        }
        let original = vertex.vtype;
        let neighbors = g.neighbors(self.v);
        for (n, e) in neighbors {
            g.remove_edge(self.v, n, e);
            g.add_edge(self.v, n, e.toggled());
        }
        g.set_type(self.v, original.toggled());
        self.original_type = Some(original);
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        if self.original_type.is_none() {
            return false;
        }
        // toggling is its own inverse.
        let neighbors = g.neighbors(self.v);
        for (n, e) in neighbors {
            g.remove_edge(self.v, n, e);
            g.add_edge(self.v, n, e.toggled());
        }
        g.set_type(self.v, self.original_type.take().unwrap());
        true
    }
}

/// Inserts a fresh spider of type `vtype` on an existing edge `(left,
/// right)`, splitting it into two edges whose series composition equals
/// the original edge type.
#[derive(Clone, Debug)]
pub struct AddIdentityVertex {
    pub left: VertexId,
    pub right: VertexId,
    pub vtype: VertexType,
    pub etype_to_left: EdgeType,
    pub new_id: Option<VertexId>,
    inserted: Option<VertexId>,
    original_edge: Option<EdgeType>,
}

impl AddIdentityVertex {
    pub fn new(left: VertexId, right: VertexId, vtype: VertexType, etype_to_left: EdgeType, new_id: Option<VertexId>) -> Self {
        AddIdentityVertex {
            left,
            right,
            vtype,
            etype_to_left,
            new_id,
            inserted: None,
            original_edge: None,
        }
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        let Some(original) = g.get_edge_type(self.left, self.right) else {
            return false;
        };
        let etype_to_right = EdgeType::concat(self.etype_to_left, original);
        g.remove_edge(self.left, self.right, original);
        let mid = g.add_vertex(self.vtype, Phase::ZERO, self.new_id);
        g.add_edge(self.left, mid, self.etype_to_left);
        g.add_edge(mid, self.right, etype_to_right);
        self.inserted = Some(mid);
        self.original_edge = Some(original);
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let Some(mid) = self.inserted.take() else { return false };
        let original = self.original_edge.take().unwrap();
        g.remove_vertex(mid);
        g.add_edge(self.left, self.right, original);
        true
    }
}

/// Removes a degree-2, phase-0 Z/X spider and reconnects its two
/// neighbors with the series-composed edge type.
#[derive(Clone, Debug)]
pub struct RemoveIdentityVertex {
    pub v: VertexId,
    undo_state: Option<(VertexType, VertexId, VertexId, EdgeType)>,
}

impl RemoveIdentityVertex {
    pub fn new(v: VertexId) -> Self {
        RemoveIdentityVertex { v, undo_state: None }
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        let Some(vertex) = g.vertex(self.v) else { return false };
        if !vertex.vtype.is_spider() || !vertex.phase.is_zero() {
            return false;
        }
        let neighbors = g.neighbors(self.v);
        if neighbors.len() != 2 {
            return false;
        }
        let (left, e_left) = neighbors[0];
        let (right, e_right) = neighbors[1];
        let composed = EdgeType::concat(e_left, e_right);
        let vtype = vertex.vtype;
        g.remove_vertex(self.v);
        g.add_edge(left, right, composed);
        self.undo_state = Some((vtype, left, right, e_left));
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let Some((vtype, left, right, e_left)) = self.undo_state.take() else {
            return false;
        };
        let composed = g.get_edge_type(left, right).expect("composed edge must exist");
        g.remove_edge(left, right, composed);
        let restored = g.add_vertex(vtype, Phase::ZERO, Some(self.v));
        let e_right = EdgeType::concat(e_left, composed);
        g.add_edge(left, restored, e_left);
        g.add_edge(restored, right, e_right);
        true
    }
}

/// Ensures `v` ends up with at most one boundary neighbor, splicing a
/// fresh Z-spider-with-Hadamard onto any excess boundary edges.
#[derive(Clone, Debug)]
pub struct BoundaryDetachment {
    pub v: VertexId,
    inserted: Vec<AddIdentityVertex>,
}

impl BoundaryDetachment {
    pub fn new(v: VertexId) -> Self {
        BoundaryDetachment { v, inserted: Vec::new() }
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        if g.vertex(self.v).is_none() {
            return false;
        }
        let boundary_neighbors: Vec<(VertexId, EdgeType)> = g
            .neighbors(self.v)
            .into_iter()
            .filter(|(n, _)| g.is_boundary(*n))
            .collect();
        if boundary_neighbors.is_empty() {
            return true;
        }
        // Keep (at most) the first boundary edge in canonical (Hadamard)
        // form untouched if it's already the sole boundary neighbor in
        // canonical form; splice the rest.
        let canonical_kept = boundary_neighbors.len() == 1 && boundary_neighbors[0].1 == EdgeType::Hadamard;
        let to_splice: Vec<(VertexId, EdgeType)> = if canonical_kept {
            Vec::new()
        } else {
            boundary_neighbors
        };
        for (boundary, etype) in to_splice {
            let mut action = AddIdentityVertex::new(self.v, boundary, VertexType::Z, EdgeType::Hadamard, None);
            // the edge to splice must currently be `etype`; AddIdentityVertex
            // reads the live edge so no extra bookkeeping is needed here.
            let _ = etype;
            if !action.apply(g) {
                return false;
            }
            self.inserted.push(action);
        }
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let mut ok = true;
        for action in self.inserted.iter_mut().rev() {
            ok &= action.undo(g);
        }
        self.inserted.clear();
        ok
    }
}

/// Splits a non-n*pi-phase Z-spider into a phase gadget: `v` keeps
/// `keep_phase`, and a fresh axel/leaf pair carries the remainder.
#[derive(Clone, Debug)]
pub struct GadgetizePhase {
    pub v: VertexId,
    pub keep_phase: Phase,
    original_phase: Option<Phase>,
    axel: Option<VertexId>,
    leaf: Option<VertexId>,
}

impl GadgetizePhase {
    pub fn new(v: VertexId, keep_phase: Phase) -> Self {
        GadgetizePhase {
            v,
            keep_phase,
            original_phase: None,
            axel: None,
            leaf: None,
        }
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        let Some(vertex) = g.vertex(self.v) else { return false };
        if vertex.vtype != VertexType::Z || vertex.phase.is_n_pi() {
            return false;
        }
        let original_phase = vertex.phase;
        let leaf_phase = original_phase - self.keep_phase;
        g.set_phase(self.v, self.keep_phase);
        let axel = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let leaf = g.add_vertex(VertexType::Z, leaf_phase, None);
        g.add_edge(self.v, axel, EdgeType::Hadamard);
        g.add_edge(axel, leaf, EdgeType::Hadamard);
        self.original_phase = Some(original_phase);
        self.axel = Some(axel);
        self.leaf = Some(leaf);
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let (Some(original_phase), Some(axel), Some(leaf)) = (self.original_phase.take(), self.axel.take(), self.leaf.take())
        else {
            return false;
        };
        g.remove_vertex(leaf);
        g.remove_vertex(axel);
        g.set_phase(self.v, original_phase);
        true
    }
}

/// Splits `v` into two same-type spiders sharing a buffer: `v` keeps
/// `kept_phase` and the non-unfused neighbors, while a fresh "unfuse"
/// spider takes the remaining phase and `neighbors_to_unfuse`.
#[derive(Clone, Debug)]
pub struct NeighborUnfusion {
    pub v: VertexId,
    pub kept_phase: Phase,
    pub neighbors_to_unfuse: Vec<VertexId>,
    original_phase: Option<Phase>,
    buffer: Option<VertexId>,
    unfuse: Option<VertexId>,
    moved_edges: Vec<(VertexId, EdgeType)>,
}

impl NeighborUnfusion {
    pub fn new(v: VertexId, kept_phase: Phase, neighbors_to_unfuse: Vec<VertexId>) -> Self {
        NeighborUnfusion {
            v,
            kept_phase,
            neighbors_to_unfuse,
            original_phase: None,
            buffer: None,
            unfuse: None,
            moved_edges: Vec::new(),
        }
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        let Some(vertex) = g.vertex(self.v) else { return false };
        let vtype = vertex.vtype;
        if !vtype.is_spider() {
            return false;
        }
        let original_phase = vertex.phase;
        let unfuse_phase = original_phase - self.kept_phase;

        let mut moved = Vec::new();
        for &n in &self.neighbors_to_unfuse {
            let Some(e) = g.get_edge_type(self.v, n) else { return false };
            moved.push((n, e));
        }

        for &(n, e) in &moved {
            g.remove_edge(self.v, n, e);
        }

        g.set_phase(self.v, self.kept_phase);
        let unfuse = g.add_vertex(vtype, unfuse_phase, None);
        let buffer = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        g.add_edge(self.v, buffer, EdgeType::Hadamard);
        g.add_edge(buffer, unfuse, EdgeType::Hadamard);
        for &(n, e) in &moved {
            g.add_edge(unfuse, n, e);
        }

        self.original_phase = Some(original_phase);
        self.buffer = Some(buffer);
        self.unfuse = Some(unfuse);
        self.moved_edges = moved;
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let (Some(original_phase), Some(buffer), Some(unfuse)) = (self.original_phase.take(), self.buffer.take(), self.unfuse.take())
        else {
            return false;
        };
        for &(n, e) in &self.moved_edges {
            g.remove_edge(unfuse, n, e);
            g.add_edge(self.v, n, e);
        }
        g.remove_vertex(unfuse);
        g.remove_vertex(buffer);
        g.set_phase(self.v, original_phase);
        self.moved_edges.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z(g: &mut ZXGraph, phase: Phase) -> VertexId {
        g.add_vertex(VertexType::Z, phase, None)
    }

    #[test]
    fn toggle_vertex_round_trips() {
        let mut g = ZXGraph::new();
        let a = z(&mut g, Phase::ZERO);
        let b = z(&mut g, Phase::ZERO);
        g.add_edge(a, b, EdgeType::Hadamard);
        let before = g.clone();

        let mut action = ToggleVertex::new(a);
        assert!(action.apply(&mut g));
        assert_eq!(g.vertex_type(a), VertexType::X);
        assert_eq!(g.get_edge_type(a, b), Some(EdgeType::Simple));

        assert!(action.undo(&mut g));
        assert_eq!(g.vertex_type(a), VertexType::Z);
        assert!(g.structurally_eq(&before));
    }

    #[test]
    fn remove_identity_vertex_requires_degree_two_and_phase_zero() {
        let mut g = ZXGraph::new();
        let a = z(&mut g, Phase::ZERO);
        let mid = z(&mut g, Phase::PI);
        let b = z(&mut g, Phase::ZERO);
        g.add_edge(a, mid, EdgeType::Simple);
        g.add_edge(mid, b, EdgeType::Hadamard);

        let mut action = RemoveIdentityVertex::new(mid);
        assert!(!action.apply(&mut g), "nonzero phase must reject");

        g.set_phase(mid, Phase::ZERO);
        let mut action = RemoveIdentityVertex::new(mid);
        assert!(action.apply(&mut g));
        assert_eq!(g.get_edge_type(a, b), Some(EdgeType::Hadamard));
        assert_eq!(g.num_vertices(), 2);

        assert!(action.undo(&mut g));
        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.get_edge_type(a, mid), Some(EdgeType::Simple));
        assert_eq!(g.get_edge_type(mid, b), Some(EdgeType::Hadamard));
    }

    #[test]
    fn gadgetize_phase_round_trips() {
        let mut g = ZXGraph::new();
        let v = z(&mut g, Phase::new(1, 3));
        let mut action = GadgetizePhase::new(v, Phase::ZERO);
        assert!(action.apply(&mut g));
        assert_eq!(g.phase(v), Phase::ZERO);
        assert_eq!(g.num_vertices(), 3);

        assert!(action.undo(&mut g));
        assert_eq!(g.phase(v), Phase::new(1, 3));
        assert_eq!(g.num_vertices(), 1);
    }

    #[test]
    fn neighbor_unfusion_round_trips() {
        let mut g = ZXGraph::new();
        let v = z(&mut g, Phase::new(1, 2));
        let n1 = z(&mut g, Phase::ZERO);
        let n2 = z(&mut g, Phase::ZERO);
        g.add_edge(v, n1, EdgeType::Hadamard);
        g.add_edge(v, n2, EdgeType::Hadamard);

        let mut action = NeighborUnfusion::new(v, Phase::pi_2(), vec![n2]);
        assert!(action.apply(&mut g));
        assert_eq!(g.phase(v), Phase::pi_2());
        assert!(!g.is_neighbor(v, n2));

        assert!(action.undo(&mut g));
        assert_eq!(g.phase(v), Phase::new(1, 2));
        assert!(g.is_neighbor(v, n2));
    }
}
