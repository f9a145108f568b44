//! Hadamard fusion and the Hadamard rule: collapsing arity-2 H-boxes into
//! Hadamard edges.

use crate::graph::{EdgeType, VertexId, VertexType, ZXGraph};
use crate::phase::Phase;

#[derive(Clone, Copy, Debug)]
enum Shape {
    /// a single arity-2 H-box between two neighbors
    SingleBox(VertexId),
    /// two arity-2 H-boxes joined by a simple edge
    DoubleBox(VertexId, VertexId),
}

/// Matches either a lone arity-2 H-box or a pair of arity-2 H-boxes joined
/// by a simple edge, and collapses it to a single edge between the outer
/// neighbors.
#[derive(Clone, Debug)]
pub struct HadamardFusion {
    shape: Shape,
    undo_state: Option<UndoState>,
}

#[derive(Clone, Debug)]
struct UndoState {
    n1: VertexId,
    n2: VertexId,
    e1: EdgeType,
    e2: EdgeType,
    extra_box: Option<VertexId>,
}

impl HadamardFusion {
    pub fn single(h: VertexId) -> Self {
        HadamardFusion {
            shape: Shape::SingleBox(h),
            undo_state: None,
        }
    }

    pub fn double(h1: VertexId, h2: VertexId) -> Self {
        HadamardFusion {
            shape: Shape::DoubleBox(h1, h2),
            undo_state: None,
        }
    }

    pub fn is_applicable(&self, g: &ZXGraph) -> bool {
        match self.shape {
            Shape::SingleBox(h) => is_arity2_hbox(g, h),
            Shape::DoubleBox(h1, h2) => {
                is_arity2_hbox(g, h1) && is_arity2_hbox(g, h2) && g.get_edge_type(h1, h2) == Some(EdgeType::Simple)
            }
        }
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        if !self.is_applicable(g) {
            return false;
        }
        match self.shape {
            Shape::SingleBox(h) => {
                let neighbors = g.neighbors(h);
                let (n1, e1) = neighbors[0];
                let (n2, e2) = neighbors[1];
                g.remove_vertex(h);
                g.add_edge(n1, n2, EdgeType::concat(e1, e2));
                self.undo_state = Some(UndoState { n1, n2, e1, e2, extra_box: None });
            }
            Shape::DoubleBox(h1, h2) => {
                let (n1, e1) = g.neighbors(h1).into_iter().find(|(n, _)| *n != h2).unwrap();
                let (n2, e2) = g.neighbors(h2).into_iter().find(|(n, _)| *n != h1).unwrap();
                g.remove_vertex(h1);
                g.remove_vertex(h2);
                g.add_edge(n1, n2, EdgeType::concat(e1, e2));
                self.undo_state = Some(UndoState {
                    n1,
                    n2,
                    e1,
                    e2,
                    extra_box: Some(h2),
                });
            }
        }
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let Some(state) = self.undo_state.take() else { return false };
        let composed = g.get_edge_type(state.n1, state.n2).expect("composed edge must exist");
        g.remove_edge(state.n1, state.n2, composed);
        match self.shape {
            Shape::SingleBox(h) => {
                let restored = g.add_vertex(VertexType::H, Phase::ZERO, Some(h));
                g.add_edge(state.n1, restored, state.e1);
                g.add_edge(restored, state.n2, state.e2);
            }
            Shape::DoubleBox(h1, _) => {
                let h2 = state.extra_box.unwrap();
                let restored1 = g.add_vertex(VertexType::H, Phase::ZERO, Some(h1));
                let restored2 = g.add_vertex(VertexType::H, Phase::ZERO, Some(h2));
                g.add_edge(state.n1, restored1, state.e1);
                g.add_edge(restored1, restored2, EdgeType::Simple);
                g.add_edge(restored2, state.n2, state.e2);
            }
        }
        true
    }

    pub fn core_vertices(&self) -> Vec<VertexId> {
        match self.shape {
            Shape::SingleBox(h) => vec![h],
            Shape::DoubleBox(h1, h2) => vec![h1, h2],
        }
    }

    pub fn get_affected_vertices(&self, g: &ZXGraph) -> Vec<VertexId> {
        self.core_vertices().into_iter().flat_map(|v| g.neighbor_ids(v)).collect()
    }

    pub fn radius(&self) -> usize {
        1
    }
}

fn is_arity2_hbox(g: &ZXGraph, h: VertexId) -> bool {
    g.vertex(h).map(|v| v.vtype) == Some(VertexType::H) && g.num_neighbors(h) == 2
}

pub fn find_matches(g: &ZXGraph, candidates: Option<&[VertexId]>, allow_overlapping: bool) -> Vec<HadamardFusion> {
    let pool: Vec<VertexId> = candidates.map(|c| c.to_vec()).unwrap_or_else(|| g.vertices().collect());
    let mut taken = std::collections::HashSet::new();
    let mut result = Vec::new();
    for h in pool {
        if !allow_overlapping && taken.contains(&h) {
            continue;
        }
        if !is_arity2_hbox(g, h) {
            continue;
        }
        let double_partner = g
            .neighbors(h)
            .into_iter()
            .find(|(n, e)| *e == EdgeType::Simple && is_arity2_hbox(g, *n) && (allow_overlapping || !taken.contains(n)));
        if let Some((h2, _)) = double_partner {
            if h.0 < h2.0 {
                result.push(HadamardFusion::double(h, h2));
                if !allow_overlapping {
                    taken.insert(h);
                    taken.insert(h2);
                }
                continue;
            }
        }
        result.push(HadamardFusion::single(h));
        if !allow_overlapping {
            taken.insert(h);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::VertexType;

    #[test]
    fn single_hbox_collapses_to_edge() {
        let mut g = ZXGraph::new();
        let n1 = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let n2 = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let h = g.add_vertex(VertexType::H, Phase::ZERO, None);
        g.add_edge(n1, h, EdgeType::Simple);
        g.add_edge(h, n2, EdgeType::Simple);

        let mut rule = HadamardFusion::single(h);
        assert!(rule.apply(&mut g));
        assert_eq!(g.get_edge_type(n1, n2), Some(EdgeType::Simple));
        assert_eq!(g.num_vertices(), 2);

        assert!(rule.undo(&mut g));
        assert_eq!(g.num_vertices(), 3);
    }
}
