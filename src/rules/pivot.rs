//! Pivot and its boundary/gadget variants

use crate::graph::actions::{BoundaryDetachment, GadgetizePhase};
use crate::graph::{EdgeType, VertexId, VertexType, ZXGraph};
use crate::phase::Phase;

/// The plain pivot rewrite: both endpoints already have n*pi phases and
/// every neighbor is either a Hadamard-connected Z-spider or (at most one,
/// shared) boundary.
#[derive(Clone, Debug)]
pub struct Pivot {
    pub u: VertexId,
    pub v: VertexId,
    undo_state: Option<PivotUndoState>,
}

#[derive(Clone, Debug)]
struct PivotUndoState {
    u_phase: Phase,
    v_phase: Phase,
    u_edges: Vec<(VertexId, EdgeType)>, // u's other neighbors
    v_edges: Vec<(VertexId, EdgeType)>, // v's other neighbors
    n_u: Vec<VertexId>,
    n_v: Vec<VertexId>,
    n_uv: Vec<VertexId>,
    original_phases: Vec<(VertexId, Phase)>,
}

impl Pivot {
    pub fn new(u: VertexId, v: VertexId) -> Self {
        Pivot { u, v, undo_state: None }
    }

    pub fn is_applicable(&self, g: &ZXGraph) -> bool {
        matches_pivot(g, self.u, self.v)
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        if !self.is_applicable(g) {
            return false;
        }
        let u_phase = g.phase(self.u);
        let v_phase = g.phase(self.v);
        let u_edges: Vec<(VertexId, EdgeType)> = g.neighbors(self.u).into_iter().filter(|(n, _)| *n != self.v).collect();
        let v_edges: Vec<(VertexId, EdgeType)> = g.neighbors(self.v).into_iter().filter(|(n, _)| *n != self.u).collect();

        let u_ids: std::collections::HashSet<VertexId> = u_edges.iter().map(|(n, _)| *n).collect();
        let v_ids: std::collections::HashSet<VertexId> = v_edges.iter().map(|(n, _)| *n).collect();

        let mut n_u: Vec<VertexId> = u_ids.difference(&v_ids).copied().collect();
        let mut n_v: Vec<VertexId> = v_ids.difference(&u_ids).copied().collect();
        let mut n_uv: Vec<VertexId> = u_ids.intersection(&v_ids).copied().collect();
        n_u.sort_by_key(|x| x.0);
        n_v.sort_by_key(|x| x.0);
        n_uv.sort_by_key(|x| x.0);

        let all: Vec<VertexId> = n_u.iter().chain(n_v.iter()).chain(n_uv.iter()).copied().collect();
        let original_phases: Vec<(VertexId, Phase)> = all.iter().map(|&n| (n, g.phase(n))).collect();

        g.remove_vertex(self.u);
        g.remove_vertex(self.v);

        toggle_all(g, &n_u, &n_v);
        toggle_all(g, &n_u, &n_uv);
        toggle_all(g, &n_v, &n_uv);

        for &n in &n_u {
            let p = g.phase(n);
            g.set_phase(n, p + v_phase);
        }
        for &n in &n_v {
            let p = g.phase(n);
            g.set_phase(n, p + u_phase);
        }
        let uv_delta = u_phase + v_phase + Phase::PI;
        for &n in &n_uv {
            let p = g.phase(n);
            g.set_phase(n, p + uv_delta);
        }

        self.undo_state = Some(PivotUndoState {
            u_phase,
            v_phase,
            u_edges,
            v_edges,
            n_u,
            n_v,
            n_uv,
            original_phases,
        });
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let Some(state) = self.undo_state.take() else { return false };

        toggle_all(g, &state.n_u, &state.n_v);
        toggle_all(g, &state.n_u, &state.n_uv);
        toggle_all(g, &state.n_v, &state.n_uv);

        for &(n, phase) in &state.original_phases {
            g.set_phase(n, phase);
        }

        let u = g.add_vertex(VertexType::Z, state.u_phase, Some(self.u));
        let v = g.add_vertex(VertexType::Z, state.v_phase, Some(self.v));
        g.add_edge(u, v, EdgeType::Hadamard);
        for &(n, e) in &state.u_edges {
            g.add_edge(u, n, e);
        }
        for &(n, e) in &state.v_edges {
            g.add_edge(v, n, e);
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

fn toggle_all(g: &mut ZXGraph, left: &[VertexId], right: &[VertexId]) {
    for &a in left {
        for &b in right {
            g.add_edge(a, b, EdgeType::Hadamard);
        }
    }
}

pub fn matches_pivot(g: &ZXGraph, u: VertexId, v: VertexId) -> bool {
    if u == v || g.get_edge_type(u, v) != Some(EdgeType::Hadamard) {
        return false;
    }
    if g.vertex_type(u) != VertexType::Z || g.vertex_type(v) != VertexType::Z {
        return false;
    }
    if !g.phase(u).is_n_pi() || !g.phase(v).is_n_pi() {
        return false;
    }
    let mut boundary_count = 0;
    for endpoint in [u, v] {
        for (n, e) in g.neighbors(endpoint) {
            if n == u || n == v {
                continue;
            }
            match g.vertex_type(n) {
                VertexType::Z if e == EdgeType::Hadamard => {}
                VertexType::Boundary if e == EdgeType::Simple => boundary_count += 1,
                _ => return false,
            }
        }
    }
    boundary_count <= 1
}

pub fn find_matches(g: &ZXGraph, candidates: Option<&[VertexId]>, allow_overlapping: bool) -> Vec<Pivot> {
    let pool: Vec<VertexId> = candidates.map(|c| c.to_vec()).unwrap_or_else(|| g.vertices().collect());
    let pool_set: std::collections::HashSet<VertexId> = pool.iter().copied().collect();
    let mut taken = std::collections::HashSet::new();
    let mut result = Vec::new();
    for u in pool {
        if !allow_overlapping && taken.contains(&u) {
            continue;
        }
        for (v, e) in g.neighbors(u) {
            if e != EdgeType::Hadamard || v.0 <= u.0 || !pool_set.contains(&v) {
                continue;
            }
            if !allow_overlapping && taken.contains(&v) {
                continue;
            }
            if matches_pivot(g, u, v) {
                if !allow_overlapping {
                    taken.insert(u);
                    taken.insert(v);
                }
                result.push(Pivot::new(u, v));
                if !allow_overlapping {
                    break;
                }
            }
        }
    }
    result
}

/// A composite, reversible sequence of sub-actions (boundary detachment,
/// gadgetization) applied before a plain [`Pivot`].
#[derive(Clone, Debug)]
enum PreStep {
    Detach(BoundaryDetachment),
    Gadgetize(GadgetizePhase),
}

impl PreStep {
    fn apply(&mut self, g: &mut ZXGraph) -> bool {
        match self {
            PreStep::Detach(a) => a.apply(g),
            PreStep::Gadgetize(a) => a.apply(g),
        }
    }
    fn undo(&mut self, g: &mut ZXGraph) -> bool {
        match self {
            PreStep::Detach(a) => a.undo(g),
            PreStep::Gadgetize(a) => a.undo(g),
        }
    }
}

/// Detaches boundary neighbors of `u`/`v` and gadgetizes non-n*pi phases,
/// then applies the plain pivot rewrite.
#[derive(Clone, Debug)]
pub struct PivotBoundary {
    pub u: VertexId,
    pub v: VertexId,
    pre_steps: Vec<PreStep>,
    pivot: Option<Pivot>,
}

impl PivotBoundary {
    pub fn new(u: VertexId, v: VertexId) -> Self {
        PivotBoundary {
            u,
            v,
            pre_steps: Vec::new(),
            pivot: None,
        }
    }

    pub fn is_applicable(&self, g: &ZXGraph) -> bool {
        g.get_edge_type(self.u, self.v) == Some(EdgeType::Hadamard)
            && g.vertex_type(self.u) == VertexType::Z
            && g.vertex_type(self.v) == VertexType::Z
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        if !self.is_applicable(g) {
            return false;
        }
        let mut steps = Vec::new();
        for endpoint in [self.u, self.v] {
            let mut detach = BoundaryDetachment::new(endpoint);
            if !detach.apply(g) {
                undo_steps(&mut steps, g);
                return false;
            }
            steps.push(PreStep::Detach(detach));
        }
        for endpoint in [self.u, self.v] {
            if !g.phase(endpoint).is_n_pi() {
                let mut gadgetize = GadgetizePhase::new(endpoint, Phase::ZERO);
                if !gadgetize.apply(g) {
                    undo_steps(&mut steps, g);
                    return false;
                }
                steps.push(PreStep::Gadgetize(gadgetize));
            }
        }
        let mut pivot = Pivot::new(self.u, self.v);
        if !pivot.apply(g) {
            undo_steps(&mut steps, g);
            return false;
        }
        self.pre_steps = steps;
        self.pivot = Some(pivot);
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let Some(mut pivot) = self.pivot.take() else { return false };
        let ok = pivot.undo(g);
        undo_steps(&mut self.pre_steps, g);
        ok
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
        2
    }
}

fn undo_steps(steps: &mut Vec<PreStep>, g: &mut ZXGraph) {
    for step in steps.iter_mut().rev() {
        step.undo(g);
    }
    steps.clear();
}

/// Matches when exactly one endpoint has an n*pi phase: gadgetizes the
/// other endpoint's phase, then applies the plain pivot rewrite.
#[derive(Clone, Debug)]
pub struct PivotGadget {
    pub u: VertexId,
    pub v: VertexId,
    gadgetize: Option<GadgetizePhase>,
    pivot: Option<Pivot>,
}

impl PivotGadget {
    pub fn new(u: VertexId, v: VertexId) -> Self {
        PivotGadget {
            u,
            v,
            gadgetize: None,
            pivot: None,
        }
    }

    pub fn is_applicable(&self, g: &ZXGraph) -> bool {
        if g.get_edge_type(self.u, self.v) != Some(EdgeType::Hadamard) {
            return false;
        }
        if g.vertex_type(self.u) != VertexType::Z || g.vertex_type(self.v) != VertexType::Z {
            return false;
        }
        g.phase(self.u).is_n_pi() != g.phase(self.v).is_n_pi()
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        if !self.is_applicable(g) {
            return false;
        }
        let to_gadgetize = if g.phase(self.u).is_n_pi() { self.v } else { self.u };
        let mut gadgetize = GadgetizePhase::new(to_gadgetize, Phase::ZERO);
        if !gadgetize.apply(g) {
            return false;
        }
        let mut pivot = Pivot::new(self.u, self.v);
        if !pivot.apply(g) {
            gadgetize.undo(g);
            return false;
        }
        self.gadgetize = Some(gadgetize);
        self.pivot = Some(pivot);
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let (Some(mut pivot), Some(mut gadgetize)) = (self.pivot.take(), self.gadgetize.take()) else {
            return false;
        };
        let ok = pivot.undo(g);
        ok && gadgetize.undo(g)
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
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivot_complement_correctness() {
        let mut g = ZXGraph::new();
        let u = g.add_vertex(VertexType::Z, Phase::PI, None);
        let v = g.add_vertex(VertexType::Z, Phase::PI, None);
        g.add_edge(u, v, EdgeType::Hadamard);

        let nu: Vec<_> = (0..3).map(|_| g.add_vertex(VertexType::Z, Phase::ZERO, None)).collect();
        let nv: Vec<_> = (0..3).map(|_| g.add_vertex(VertexType::Z, Phase::ZERO, None)).collect();
        let shared = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        for &n in &nu {
            g.add_edge(u, n, EdgeType::Hadamard);
        }
        for &n in &nv {
            g.add_edge(v, n, EdgeType::Hadamard);
        }
        g.add_edge(u, shared, EdgeType::Hadamard);
        g.add_edge(v, shared, EdgeType::Hadamard);
        // a cross edge already present before the pivot, to exercise the toggle
        g.add_edge(nu[0], nv[0], EdgeType::Hadamard);

        // only cross-partition pairs (N_u x N_v, N_u x N_uv, N_v x N_uv) are
        // expected to flip; within-partition pairs are untouched.
        let cross_pairs: Vec<(VertexId, VertexId)> = nu
            .iter()
            .flat_map(|&a| nv.iter().map(move |&b| (a, b)))
            .chain(nu.iter().map(|&a| (a, shared)))
            .chain(nv.iter().map(|&a| (a, shared)))
            .collect();
        let before: std::collections::HashMap<(VertexId, VertexId), bool> =
            cross_pairs.iter().map(|&(a, b)| ((a, b), g.is_neighbor(a, b))).collect();

        let mut rule = Pivot::new(u, v);
        assert!(rule.apply(&mut g));
        assert!(g.vertex(u).is_none());
        assert!(g.vertex(v).is_none());

        for (&(a, b), &was_present) in &before {
            let now_present = g.is_neighbor(a, b);
            assert_ne!(was_present, now_present, "pair ({a:?},{b:?}) must flip");
        }
    }
}
