//! Bialgebra rule: collapses a bipartite phase-0 cluster into a complete
//! bipartite graph between its neighborhoods.

use crate::graph::{EdgeType, VertexId, VertexType, ZXGraph};
use crate::phase::Phase;

#[derive(Clone, Debug)]
pub struct Bialgebra {
    pub u: VertexId,
    pub v: VertexId,
    undo_state: Option<UndoState>,
}

#[derive(Clone, Debug)]
struct UndoState {
    u_type: VertexType,
    v_type: VertexType,
    u_neighbors: Vec<VertexId>, // excluding v
    v_neighbors: Vec<VertexId>, // excluding u
}

impl Bialgebra {
    pub fn new(u: VertexId, v: VertexId) -> Self {
        Bialgebra { u, v, undo_state: None }
    }

    pub fn is_applicable(&self, g: &ZXGraph) -> bool {
        matches_bialgebra(g, self.u, self.v)
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        if !self.is_applicable(g) {
            return false;
        }
        let u_type = g.vertex_type(self.u);
        let v_type = g.vertex_type(self.v);
        let u_neighbors: Vec<VertexId> = g.neighbor_ids(self.u).into_iter().filter(|&n| n != self.v).collect();
        let v_neighbors: Vec<VertexId> = g.neighbor_ids(self.v).into_iter().filter(|&n| n != self.u).collect();

        g.remove_vertex(self.u);
        g.remove_vertex(self.v);
        for &a in &u_neighbors {
            for &b in &v_neighbors {
                g.add_edge(a, b, EdgeType::Simple);
            }
        }

        self.undo_state = Some(UndoState {
            u_type,
            v_type,
            u_neighbors,
            v_neighbors,
        });
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let Some(state) = self.undo_state.take() else { return false };
        for &a in &state.u_neighbors {
            for &b in &state.v_neighbors {
                g.remove_edge(a, b, EdgeType::Simple);
            }
        }
        let u = g.add_vertex(state.u_type, Phase::ZERO, Some(self.u));
        let v = g.add_vertex(state.v_type, Phase::ZERO, Some(self.v));
        g.add_edge(u, v, EdgeType::Simple);
        for &a in &state.u_neighbors {
            g.add_edge(u, a, EdgeType::Simple);
        }
        for &b in &state.v_neighbors {
            g.add_edge(v, b, EdgeType::Simple);
        }
        true
    }

    pub fn core_vertices(&self) -> Vec<VertexId> {
        vec![self.u, self.v]
    }

    pub fn get_affected_vertices(&self, g: &ZXGraph) -> Vec<VertexId> {
        let mut result = g.neighbor_ids(self.u);
        result.extend(g.neighbor_ids(self.v));
        result
    }

    pub fn radius(&self) -> usize {
        1
    }
}

pub fn matches_bialgebra(g: &ZXGraph, u: VertexId, v: VertexId) -> bool {
    if u == v || g.get_edge_type(u, v) != Some(EdgeType::Simple) {
        return false;
    }
    let (Some(tu), Some(tv)) = (g.vertex(u), g.vertex(v)) else { return false };
    if !tu.vtype.is_spider() || tu.vtype == tv.vtype {
        return false;
    }
    if !tu.phase.is_zero() || !tv.phase.is_zero() {
        return false;
    }
    if g.num_neighbors(u) <= 1 || g.num_neighbors(v) <= 1 {
        return false;
    }
    let opposite_ok = |center: VertexId, other_type: VertexType| {
        g.neighbors(center)
            .into_iter()
            .filter(|(n, _)| *n != u && *n != v)
            .all(|(n, e)| e == EdgeType::Simple && g.vertex_type(n) == other_type && g.phase(n).is_zero())
    };
    if !opposite_ok(u, tv.vtype) || !opposite_ok(v, tu.vtype) {
        return false;
    }
    let mut u_n = g.neighbor_ids(u);
    let mut v_n = g.neighbor_ids(v);
    u_n.retain(|&n| n != v);
    v_n.retain(|&n| n != u);
    let u_set: std::collections::HashSet<_> = u_n.into_iter().collect();
    let v_set: std::collections::HashSet<_> = v_n.into_iter().collect();
    u_set.is_disjoint(&v_set)
}

pub fn find_matches(g: &ZXGraph, candidates: Option<&[VertexId]>, allow_overlapping: bool) -> Vec<Bialgebra> {
    let pool: Vec<VertexId> = candidates.map(|c| c.to_vec()).unwrap_or_else(|| g.vertices().collect());
    let pool_set: std::collections::HashSet<VertexId> = pool.iter().copied().collect();
    let mut taken = std::collections::HashSet::new();
    let mut result = Vec::new();
    for u in pool {
        if !allow_overlapping && taken.contains(&u) {
            continue;
        }
        for (v, _) in g.neighbors(u) {
            if v.0 <= u.0 || !pool_set.contains(&v) {
                continue;
            }
            if !allow_overlapping && taken.contains(&v) {
                continue;
            }
            if matches_bialgebra(g, u, v) {
                let mut core: Vec<VertexId> = vec![u, v];
                core.extend(g.neighbor_ids(u));
                core.extend(g.neighbor_ids(v));
                if !allow_overlapping {
                    for c in &core {
                        taken.insert(*c);
                    }
                }
                result.push(Bialgebra::new(u, v));
            }
        }
    }
    result
}
