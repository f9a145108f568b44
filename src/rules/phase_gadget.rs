//! Phase gadget fusion: merges phase gadgets that share an axel neighbor
//! set into a single gadget.

use crate::graph::{EdgeType, VertexId, VertexType, ZXGraph};
use crate::phase::Phase;

/// A phase-gadget axel/leaf pair: `axel` has phase 0 or pi and is
/// connected by a Hadamard edge to a degree-1 `leaf` carrying the gadget's
/// phase.
fn gadget_leaf_of(g: &ZXGraph, axel: VertexId) -> Option<VertexId> {
    if g.vertex_type(axel) != VertexType::Z || !g.phase(axel).is_n_pi() {
        return None;
    }
    g.neighbors(axel).into_iter().find_map(|(n, e)| {
        if e == EdgeType::Hadamard && g.vertex_type(n) == VertexType::Z && g.num_neighbors(n) == 1 {
            Some(n)
        } else {
            None
        }
    })
}

/// The axel's neighbors other than its own leaf, sorted by id: the "target
/// set" two gadgets must share to be fusable.
fn axel_target_set(g: &ZXGraph, axel: VertexId, leaf: VertexId) -> Vec<(VertexId, EdgeType)> {
    let mut rest: Vec<(VertexId, EdgeType)> = g.neighbors(axel).into_iter().filter(|(n, _)| *n != leaf).collect();
    rest.sort_by_key(|(n, _)| n.0);
    rest
}

#[derive(Clone, Debug)]
pub struct PhaseGadgetFusion {
    pub survivor_axel: VertexId,
    pub survivor_leaf: VertexId,
    pub group: Vec<VertexId>, // other axels to merge in
    undo_state: Option<UndoState>,
}

#[derive(Clone, Debug)]
struct UndoState {
    survivor_axel_phase: Phase,
    survivor_leaf_phase: Phase,
    target_set: Vec<(VertexId, EdgeType)>,
    removed: Vec<RemovedGadget>,
}

#[derive(Clone, Debug)]
struct RemovedGadget {
    axel: VertexId,
    leaf: VertexId,
    axel_phase: Phase,
    leaf_phase: Phase,
}

impl PhaseGadgetFusion {
    pub fn new(survivor_axel: VertexId, survivor_leaf: VertexId, group: Vec<VertexId>) -> Self {
        PhaseGadgetFusion {
            survivor_axel,
            survivor_leaf,
            group,
            undo_state: None,
        }
    }

    pub fn is_applicable(&self, g: &ZXGraph) -> bool {
        let Some(leaf) = gadget_leaf_of(g, self.survivor_axel) else {
            return false;
        };
        if leaf != self.survivor_leaf {
            return false;
        }
        let target = axel_target_set(g, self.survivor_axel, self.survivor_leaf);
        self.group.iter().all(|&axel| {
            gadget_leaf_of(g, axel).is_some() && axel_target_set(g, axel, gadget_leaf_of(g, axel).unwrap()) == target
        })
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        if !self.is_applicable(g) {
            return false;
        }
        let survivor_axel_phase = g.phase(self.survivor_axel);
        let survivor_leaf_phase = g.phase(self.survivor_leaf);
        let target_set = axel_target_set(g, self.survivor_axel, self.survivor_leaf);

        let mut sum = if survivor_axel_phase == Phase::PI {
            -survivor_leaf_phase
        } else {
            survivor_leaf_phase
        };

        let mut removed = Vec::new();
        for &axel in &self.group {
            let leaf = gadget_leaf_of(g, axel).unwrap();
            let axel_phase = g.phase(axel);
            let leaf_phase = g.phase(leaf);
            let contribution = if axel_phase == Phase::PI { -leaf_phase } else { leaf_phase };
            sum = sum + contribution;
            removed.push(RemovedGadget {
                axel,
                leaf,
                axel_phase,
                leaf_phase,
            });
            g.remove_vertex(leaf);
            g.remove_vertex(axel);
        }

        g.set_phase(self.survivor_axel, Phase::ZERO);
        g.set_phase(self.survivor_leaf, sum);

        self.undo_state = Some(UndoState {
            survivor_axel_phase,
            survivor_leaf_phase,
            target_set,
            removed,
        });
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let Some(state) = self.undo_state.take() else { return false };
        g.set_phase(self.survivor_axel, state.survivor_axel_phase);
        g.set_phase(self.survivor_leaf, state.survivor_leaf_phase);
        for removed in state.removed {
            let axel = g.add_vertex(VertexType::Z, removed.axel_phase, Some(removed.axel));
            let leaf = g.add_vertex(VertexType::Z, removed.leaf_phase, Some(removed.leaf));
            g.add_edge(axel, leaf, EdgeType::Hadamard);
            for &(n, e) in &state.target_set {
                g.add_edge(axel, n, e);
            }
        }
        true
    }

    pub fn core_vertices(&self) -> Vec<VertexId> {
        let mut v = vec![self.survivor_axel, self.survivor_leaf];
        v.extend(self.group.iter().copied());
        v
    }

    pub fn get_affected_vertices(&self, g: &ZXGraph) -> Vec<VertexId> {
        g.neighbor_ids(self.survivor_axel)
    }

    pub fn radius(&self) -> usize {
        1
    }
}

/// Groups every phase-gadget axel in `candidates` by its target set and
/// returns one fusion instance per group with more than one member.
pub fn find_matches(g: &ZXGraph, candidates: Option<&[VertexId]>) -> Vec<PhaseGadgetFusion> {
    let pool: Vec<VertexId> = candidates.map(|c| c.to_vec()).unwrap_or_else(|| g.vertices().collect());
    let mut groups: std::collections::HashMap<Vec<(VertexId, EdgeType)>, Vec<VertexId>> = std::collections::HashMap::new();
    for axel in pool {
        if let Some(leaf) = gadget_leaf_of(g, axel) {
            let target = axel_target_set(g, axel, leaf);
            groups.entry(target).or_default().push(axel);
        }
    }
    groups
        .into_values()
        .filter(|axels| axels.len() > 1)
        .map(|mut axels| {
            axels.sort_by_key(|a| a.0);
            let survivor_axel = axels.remove(0);
            let survivor_leaf = gadget_leaf_of(g, survivor_axel).unwrap();
            PhaseGadgetFusion::new(survivor_axel, survivor_leaf, axels)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_two_gadgets_with_identical_targets() {
        let mut g = ZXGraph::new();
        let t1 = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let t2 = g.add_vertex(VertexType::Z, Phase::ZERO, None);

        let axel1 = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let leaf1 = g.add_vertex(VertexType::Z, Phase::new(1, 4), None);
        g.add_edge(axel1, leaf1, EdgeType::Hadamard);
        g.add_edge(axel1, t1, EdgeType::Hadamard);
        g.add_edge(axel1, t2, EdgeType::Hadamard);

        let axel2 = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let leaf2 = g.add_vertex(VertexType::Z, Phase::new(1, 2), None);
        g.add_edge(axel2, leaf2, EdgeType::Hadamard);
        g.add_edge(axel2, t1, EdgeType::Hadamard);
        g.add_edge(axel2, t2, EdgeType::Hadamard);

        let matches = find_matches(&g, None);
        assert_eq!(matches.len(), 1);
        let mut rule = matches.into_iter().next().unwrap();
        assert!(rule.apply(&mut g));
        assert_eq!(g.phase(leaf1), Phase::new(1, 4) + Phase::new(1, 2));
        assert!(g.vertex(axel2).is_none());
    }
}
