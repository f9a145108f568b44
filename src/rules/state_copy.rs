//! State copy: a boolean-basis state (a degree-1, 0 or pi phase Z-spider)
//! copies itself through a Z-spider hub to every other neighbor of that
//! hub. A boundary neighbor gets a new Z-spider interposed on its edge
//! (with the edge type toggled); any other neighbor just absorbs the
//! copied phase onto its own.

use crate::graph::{EdgeType, VertexId, VertexType, ZXGraph};
use crate::phase::Phase;

#[derive(Clone, Debug)]
pub struct StateCopy {
    pub leaf: VertexId,
    pub hub: VertexId,
    undo_state: Option<UndoState>,
}

#[derive(Clone, Debug)]
struct UndoState {
    leaf_type: VertexType,
    leaf_phase: Phase,
    hub_type: VertexType,
    hub_phase: Phase,
    leaf_hub_edge: EdgeType,
    hub_others: Vec<(VertexId, EdgeType)>,
    /// boundary neighbors: the copy vertex interposed, and the edge type it
    /// was wired up with, so undo can remove it.
    boundary_copies: Vec<(VertexId, EdgeType)>,
    /// non-boundary neighbors: their phase before it absorbed the copy.
    bumped: Vec<(VertexId, Phase)>,
}

impl StateCopy {
    pub fn new(leaf: VertexId, hub: VertexId) -> Self {
        StateCopy { leaf, hub, undo_state: None }
    }

    pub fn is_applicable(&self, g: &ZXGraph) -> bool {
        matches_state_copy(g, self.leaf, self.hub)
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        if !self.is_applicable(g) {
            return false;
        }
        let leaf_type = g.vertex_type(self.leaf);
        let leaf_phase = g.phase(self.leaf);
        let hub_type = g.vertex_type(self.hub);
        let hub_phase = g.phase(self.hub);
        let leaf_hub_edge = g.get_edge_type(self.leaf, self.hub).unwrap();
        let hub_others: Vec<(VertexId, EdgeType)> =
            g.neighbors(self.hub).into_iter().filter(|(n, _)| *n != self.leaf).collect();

        g.remove_vertex(self.leaf);
        g.remove_vertex(self.hub);

        let mut boundary_copies = Vec::new();
        let mut bumped = Vec::new();
        for &(w, e) in &hub_others {
            if g.is_boundary(w) {
                let toggled = e.toggled();
                let copy = g.add_vertex(VertexType::Z, leaf_phase, None);
                g.add_edge(copy, w, toggled);
                boundary_copies.push((copy, toggled));
            } else {
                bumped.push((w, g.phase(w)));
                g.set_phase(w, g.phase(w) + leaf_phase);
            }
        }

        self.undo_state = Some(UndoState {
            leaf_type,
            leaf_phase,
            hub_type,
            hub_phase,
            leaf_hub_edge,
            hub_others,
            boundary_copies,
            bumped,
        });
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let Some(state) = self.undo_state.take() else { return false };
        for (copy, _) in &state.boundary_copies {
            g.remove_vertex(*copy);
        }
        for (w, phase) in state.bumped {
            g.set_phase(w, phase);
        }
        let leaf = g.add_vertex(state.leaf_type, state.leaf_phase, Some(self.leaf));
        let hub = g.add_vertex(state.hub_type, state.hub_phase, Some(self.hub));
        g.add_edge(leaf, hub, state.leaf_hub_edge);
        for &(w, e) in &state.hub_others {
            g.add_edge(hub, w, e);
        }
        true
    }

    pub fn core_vertices(&self) -> Vec<VertexId> {
        vec![self.leaf, self.hub]
    }

    pub fn get_affected_vertices(&self, g: &ZXGraph) -> Vec<VertexId> {
        g.neighbor_ids(self.hub)
    }

    pub fn radius(&self) -> usize {
        1
    }
}

pub fn matches_state_copy(g: &ZXGraph, leaf: VertexId, hub: VertexId) -> bool {
    let (Some(tl), Some(th)) = (g.vertex(leaf), g.vertex(hub)) else { return false };
    if tl.vtype != VertexType::Z || th.vtype != VertexType::Z {
        return false;
    }
    if !tl.phase.is_n_pi() || g.num_neighbors(leaf) != 1 {
        return false;
    }
    g.is_neighbor(leaf, hub)
}

pub fn find_matches(g: &ZXGraph, candidates: Option<&[VertexId]>, allow_overlapping: bool) -> Vec<StateCopy> {
    let pool: Vec<VertexId> = candidates.map(|c| c.to_vec()).unwrap_or_else(|| g.vertices().collect());
    let mut taken = std::collections::HashSet::new();
    let mut result = Vec::new();
    for leaf in pool {
        if !allow_overlapping && taken.contains(&leaf) {
            continue;
        }
        if g.num_neighbors(leaf) != 1 {
            continue;
        }
        let hub = g.neighbor_ids(leaf)[0];
        if matches_state_copy(g, leaf, hub) {
            let mut core = vec![leaf, hub];
            core.extend(g.neighbor_ids(hub));
            if !allow_overlapping {
                if core.iter().any(|c| taken.contains(c)) {
                    continue;
                }
                for c in &core {
                    taken.insert(*c);
                }
            }
            result.push(StateCopy::new(leaf, hub));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_leaf_through_hub_to_every_other_neighbor() {
        let mut g = ZXGraph::new();
        let leaf = g.add_vertex(VertexType::Z, Phase::PI, None);
        let hub = g.add_vertex(VertexType::Z, Phase::new(1, 4), None);
        let w1 = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let w2 = g.add_output(0, None).unwrap();
        g.add_edge(leaf, hub, EdgeType::Simple);
        g.add_edge(hub, w1, EdgeType::Hadamard);
        g.add_edge(hub, w2, EdgeType::Simple);
        let before = g.clone();

        let mut rule = StateCopy::new(leaf, hub);
        assert!(rule.apply(&mut g));
        // leaf and hub are gone, w1 absorbed the phase in place, and w2
        // (a boundary) got a new Z-spider interposed on its edge.
        assert_eq!(g.num_vertices(), 4);
        assert!(g.vertex(leaf).is_none());
        assert!(g.vertex(hub).is_none());
        assert_eq!(g.phase(w1), Phase::ZERO + Phase::PI);
        assert_eq!(g.num_neighbors(w2), 1);

        assert!(rule.undo(&mut g));
        assert!(g.structurally_eq(&before));
    }
}
