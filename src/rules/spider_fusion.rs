//! Spider fusion: merges two same-type spiders joined by a simple edge

use crate::graph::{EdgeType, VertexId, VertexType, ZXGraph};
use crate::phase::Phase;

#[derive(Clone, Debug)]
pub struct SpiderFusion {
    pub u: VertexId,
    pub v: VertexId,
    undo_state: Option<UndoState>,
}

#[derive(Clone, Debug)]
struct UndoState {
    v_type: VertexType,
    v_phase: Phase,
    u_original_phase: Phase,
    // (neighbor, edge from v, edge u-neighbor before the merge, if any)
    transferred: Vec<(VertexId, EdgeType, Option<EdgeType>)>,
}

impl SpiderFusion {
    pub fn new(u: VertexId, v: VertexId) -> Self {
        SpiderFusion { u, v, undo_state: None }
    }

    pub fn is_applicable(&self, g: &ZXGraph) -> bool {
        matches_spider_fusion(g, self.u, self.v)
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        if !self.is_applicable(g) {
            return false;
        }
        let v_vertex = g.vertex(self.v).unwrap();
        let v_type = v_vertex.vtype;
        let v_phase = v_vertex.phase;
        let u_original_phase = g.phase(self.u);

        let transferred: Vec<(VertexId, EdgeType, Option<EdgeType>)> = g
            .neighbors(self.v)
            .into_iter()
            .filter(|(n, _)| *n != self.u)
            .map(|(n, e)| (n, e, g.get_edge_type(self.u, n)))
            .collect();

        g.set_phase(self.u, u_original_phase + v_phase);
        for &(n, e, _) in &transferred {
            g.add_edge(self.u, n, e);
        }
        g.remove_vertex(self.v);

        self.undo_state = Some(UndoState {
            v_type,
            v_phase,
            u_original_phase,
            transferred,
        });
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let Some(state) = self.undo_state.take() else { return false };
        let restored = g.add_vertex(state.v_type, state.v_phase, Some(self.v));
        g.add_edge(self.u, restored, EdgeType::Simple);
        for (n, e_from_v, pre_existing) in state.transferred {
            if let Some(current) = g.get_edge_type(self.u, n) {
                g.remove_edge(self.u, n, current);
            }
            if let Some(pre) = pre_existing {
                g.add_edge(self.u, n, pre);
            }
            g.add_edge(restored, n, e_from_v);
        }
        g.set_phase(self.u, state.u_original_phase);
        true
    }

    pub fn core_vertices(&self) -> Vec<VertexId> {
        vec![self.u, self.v]
    }

    pub fn get_affected_vertices(&self, g: &ZXGraph) -> Vec<VertexId> {
        g.neighbor_ids(self.u)
    }

    pub fn radius(&self) -> usize {
        1
    }
}

pub fn matches_spider_fusion(g: &ZXGraph, u: VertexId, v: VertexId) -> bool {
    if u == v {
        return false;
    }
    let (Some(tu), Some(tv)) = (g.vertex(u).map(|x| x.vtype), g.vertex(v).map(|x| x.vtype)) else {
        return false;
    };
    tu.is_spider() && tu == tv && g.get_edge_type(u, v) == Some(EdgeType::Simple)
}

pub fn find_matches(g: &ZXGraph, candidates: Option<&[VertexId]>, allow_overlapping: bool) -> Vec<SpiderFusion> {
    let pool: Vec<VertexId> = candidates.map(|c| c.to_vec()).unwrap_or_else(|| g.vertices().collect());
    let pool_set: std::collections::HashSet<VertexId> = pool.iter().copied().collect();
    let mut taken = std::collections::HashSet::new();
    let mut result = Vec::new();
    for u in pool.iter().copied() {
        if !allow_overlapping && taken.contains(&u) {
            continue;
        }
        for (v, e) in g.neighbors(u) {
            if e != EdgeType::Simple || v.0 <= u.0 || !pool_set.contains(&v) {
                continue;
            }
            if !allow_overlapping && taken.contains(&v) {
                continue;
            }
            if matches_spider_fusion(g, u, v) {
                if !allow_overlapping {
                    taken.insert(u);
                    taken.insert(v);
                }
                result.push(SpiderFusion::new(u, v));
                if !allow_overlapping {
                    break;
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::VertexType;

    #[test]
    fn hopf_self_loop_scenario() {
        let mut g = ZXGraph::new();
        let u = g.add_vertex(VertexType::Z, Phase::new(1, 3), None);
        let v = g.add_vertex(VertexType::Z, Phase::new(2, 3), None);
        g.add_edge(u, u, EdgeType::Hadamard); // folds immediately into phase(u) += pi
        g.add_edge(u, v, EdgeType::Simple);

        let mut rule = SpiderFusion::new(u, v);
        assert!(rule.apply(&mut g));
        assert_eq!(g.num_vertices(), 1);
        assert_eq!(g.phase(u), Phase::ZERO); // 1/3 + pi + 2/3 == 2pi == 0
    }

    #[test]
    fn apply_then_undo_restores_graph() {
        let mut g = ZXGraph::new();
        let u = g.add_vertex(VertexType::Z, Phase::new(1, 4), None);
        let v = g.add_vertex(VertexType::Z, Phase::new(1, 2), None);
        let w = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        g.add_edge(u, v, EdgeType::Simple);
        g.add_edge(v, w, EdgeType::Hadamard);
        let before = g.clone();

        let mut rule = SpiderFusion::new(u, v);
        assert!(rule.apply(&mut g));
        assert!(rule.undo(&mut g));
        assert!(g.structurally_eq(&before));
    }
}
