//! Local complementation: deletes a ±pi/2-phase Z-spider and toggles the
//! Hadamard edges among its neighbors.

use crate::graph::{EdgeType, VertexId, VertexType, ZXGraph};
use crate::phase::Phase;

#[derive(Clone, Debug)]
pub struct LocalComplement {
    pub v: VertexId,
    undo_state: Option<UndoState>,
}

#[derive(Clone, Debug)]
struct UndoState {
    v_phase: Phase,
    neighbors: Vec<(VertexId, EdgeType)>,
    original_neighbor_phases: Vec<(VertexId, Phase)>,
}

impl LocalComplement {
    pub fn new(v: VertexId) -> Self {
        LocalComplement { v, undo_state: None }
    }

    pub fn is_applicable(&self, g: &ZXGraph) -> bool {
        matches_local_complement(g, self.v)
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        if !self.is_applicable(g) {
            return false;
        }
        let v_phase = g.phase(self.v);
        let neighbors = g.neighbors(self.v);
        let original_neighbor_phases: Vec<(VertexId, Phase)> = neighbors.iter().map(|(n, _)| (*n, g.phase(*n))).collect();

        // h_self is always 0: self-loops are folded into the endpoint's
        // phase at add-edge time and never persist as stored edges, so the
        // pi * floor(h_self / 2) term vanishes here.
        let delta = v_phase;

        g.remove_vertex(self.v);
        toggle_hadamard_among(g, &neighbors);
        for &(n, phase) in &original_neighbor_phases {
            g.set_phase(n, phase - delta);
        }

        self.undo_state = Some(UndoState {
            v_phase,
            neighbors,
            original_neighbor_phases,
        });
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let Some(state) = self.undo_state.take() else { return false };
        toggle_hadamard_among(g, &state.neighbors);
        for &(n, phase) in &state.original_neighbor_phases {
            g.set_phase(n, phase);
        }
        let restored = g.add_vertex(VertexType::Z, state.v_phase, Some(self.v));
        for &(n, e) in &state.neighbors {
            g.add_edge(restored, n, e);
        }
        true
    }

    pub fn core_vertices(&self) -> Vec<VertexId> {
        vec![self.v]
    }

    pub fn get_affected_vertices(&self, g: &ZXGraph) -> Vec<VertexId> {
        g.neighbor_ids(self.v)
    }

    pub fn radius(&self) -> usize {
        1
    }
}

/// Toggles, for every pair of distinct vertices in `neighbors`, the
/// Hadamard edge between them: relies on the Z-Z same-color edge algebra
/// (none+hadamard records, hadamard+hadamard cancels) which is exact in
/// graph-like form where every internal Z-Z edge is already Hadamard.
fn toggle_hadamard_among(g: &mut ZXGraph, neighbors: &[(VertexId, EdgeType)]) {
    for i in 0..neighbors.len() {
        for j in (i + 1)..neighbors.len() {
            let (a, _) = neighbors[i];
            let (b, _) = neighbors[j];
            g.add_edge(a, b, EdgeType::Hadamard);
        }
    }
}

pub fn matches_local_complement(g: &ZXGraph, v: VertexId) -> bool {
    let Some(vertex) = g.vertex(v) else { return false };
    if vertex.vtype != VertexType::Z || !vertex.phase.is_pi_2() {
        return false;
    }
    g.neighbors(v)
        .into_iter()
        .all(|(n, e)| e == EdgeType::Hadamard && g.vertex_type(n) == VertexType::Z)
}

pub fn find_matches(g: &ZXGraph, candidates: Option<&[VertexId]>, allow_overlapping: bool) -> Vec<LocalComplement> {
    let pool: Vec<VertexId> = candidates.map(|c| c.to_vec()).unwrap_or_else(|| g.vertices().collect());
    let mut taken = std::collections::HashSet::new();
    let mut result = Vec::new();
    for v in pool {
        if !allow_overlapping && taken.contains(&v) {
            continue;
        }
        if matches_local_complement(g, v) {
            if !allow_overlapping {
                taken.insert(v);
                for n in g.neighbor_ids(v) {
                    taken.insert(n);
                }
            }
            result.push(LocalComplement::new(v));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_edges_among_neighbors_and_shifts_phase() {
        let mut g = ZXGraph::new();
        let v = g.add_vertex(VertexType::Z, Phase::pi_2(), None);
        let a = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let b = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let c = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        g.add_edge(v, a, EdgeType::Hadamard);
        g.add_edge(v, b, EdgeType::Hadamard);
        g.add_edge(v, c, EdgeType::Hadamard);
        let before = g.clone();

        let mut rule = LocalComplement::new(v);
        assert!(rule.apply(&mut g));
        assert!(g.is_neighbor(a, b));
        assert!(g.is_neighbor(a, c));
        assert!(g.is_neighbor(b, c));
        assert_eq!(g.phase(a), -Phase::pi_2());

        assert!(rule.undo(&mut g));
        assert!(g.structurally_eq(&before));
    }
}
