//! Identity removal: deletes a phase-0, degree-2 Z/X spider

use crate::graph::actions::RemoveIdentityVertex;
use crate::graph::{VertexId, ZXGraph};

#[derive(Clone, Debug)]
pub struct IdentityRemoval {
    action: RemoveIdentityVertex,
}

impl IdentityRemoval {
    pub fn new(v: VertexId) -> Self {
        IdentityRemoval {
            action: RemoveIdentityVertex::new(v),
        }
    }

    pub fn v(&self) -> VertexId {
        self.action.v
    }

    pub fn is_applicable(&self, g: &ZXGraph) -> bool {
        matches_identity_removal(g, self.v())
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        self.action.apply(g)
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        self.action.undo(g)
    }

    pub fn core_vertices(&self) -> Vec<VertexId> {
        vec![self.v()]
    }

    pub fn get_affected_vertices(&self, g: &ZXGraph) -> Vec<VertexId> {
        g.neighbor_ids(self.v())
    }

    pub fn radius(&self) -> usize {
        1
    }
}

pub fn matches_identity_removal(g: &ZXGraph, v: VertexId) -> bool {
    let Some(vertex) = g.vertex(v) else { return false };
    vertex.vtype.is_spider() && vertex.phase.is_zero() && g.num_neighbors(v) == 2
}

/// Enumerates identity-removal matches over `candidates` (defaulting to
/// every vertex). When `allow_overlapping` is `false`, accepted matches'
/// core vertices are removed from the candidate pool before continuing.
pub fn find_matches(g: &ZXGraph, candidates: Option<&[VertexId]>, allow_overlapping: bool) -> Vec<IdentityRemoval> {
    let pool: Vec<VertexId> = candidates.map(|c| c.to_vec()).unwrap_or_else(|| g.vertices().collect());
    let mut taken = std::collections::HashSet::new();
    let mut result = Vec::new();
    for v in pool {
        if !allow_overlapping && taken.contains(&v) {
            continue;
        }
        if matches_identity_removal(g, v) {
            if !allow_overlapping {
                taken.insert(v);
                for n in g.neighbor_ids(v) {
                    taken.insert(n);
                }
            }
            result.push(IdentityRemoval::new(v));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeType, VertexType};
    use crate::phase::Phase;

    #[test]
    fn chain_reduces_to_single_edge_regardless_of_order() {
        for perm in [[0, 1, 2, 3], [3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]] {
            let mut g = ZXGraph::new();
            let i = g.add_input(0, None).unwrap();
            let o = g.add_output(0, None).unwrap();
            let vs: Vec<_> = (0..4).map(|_| g.add_vertex(VertexType::Z, Phase::ZERO, None)).collect();
            g.add_edge(i, vs[0], EdgeType::Hadamard);
            g.add_edge(vs[0], vs[1], EdgeType::Simple);
            g.add_edge(vs[1], vs[2], EdgeType::Simple);
            g.add_edge(vs[2], vs[3], EdgeType::Simple);
            g.add_edge(vs[3], o, EdgeType::Simple);

            for idx in perm {
                let mut rule = IdentityRemoval::new(vs[idx]);
                assert!(rule.is_applicable(&g));
                assert!(rule.apply(&mut g));
            }

            assert_eq!(g.num_vertices(), 2);
            assert_eq!(g.get_edge_type(i, o), Some(EdgeType::Hadamard));
        }
    }
}
