//! Unfusion-backed rewrites: split a neighbor subset off a spider first,
//! then apply a rewrite that the split makes available. Used by the
//! causal-flow-preserving optimizer to search over subsets for a
//! restructuring that lowers the two-qubit gate count without disturbing
//! measurement order.

use crate::graph::actions::{NeighborUnfusion, RemoveIdentityVertex};
use crate::graph::{VertexId, ZXGraph};
use crate::phase::Phase;
use crate::rules::local_complement::LocalComplement;
use crate::rules::pivot::Pivot;

/// Splits `subset` off `v` into a fresh same-type spider and immediately
/// collapses the phase-0 buffer left behind, leaving `v` and the new
/// spider joined by a single edge instead of sharing one high-degree
/// vertex.
#[derive(Clone, Debug)]
pub struct IdentityFusion {
    pub v: VertexId,
    pub subset: Vec<VertexId>,
    unfuse: NeighborUnfusion,
    collapse: Option<RemoveIdentityVertex>,
    buffer: Option<VertexId>,
}

impl IdentityFusion {
    pub fn new(v: VertexId, subset: Vec<VertexId>) -> Self {
        IdentityFusion {
            v,
            subset: subset.clone(),
            unfuse: NeighborUnfusion::new(v, Phase::ZERO, subset),
            collapse: None,
            buffer: None,
        }
    }

    pub fn is_applicable(&self, g: &ZXGraph) -> bool {
        g.vertex(self.v).is_some() && !self.subset.is_empty() && self.subset.iter().all(|&n| g.is_neighbor(self.v, n))
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        if !self.is_applicable(g) {
            return false;
        }
        let kept_phase = g.phase(self.v);
        self.unfuse = NeighborUnfusion::new(self.v, kept_phase, self.subset.clone());
        if !self.unfuse.apply(g) {
            return false;
        }
        let buffer = g.neighbor_ids(self.v)[0];
        let mut collapse = RemoveIdentityVertex::new(buffer);
        if !collapse.apply(g) {
            self.unfuse.undo(g);
            return false;
        }
        self.buffer = Some(buffer);
        self.collapse = Some(collapse);
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let Some(mut collapse) = self.collapse.take() else { return false };
        let ok = collapse.undo(g) && self.unfuse.undo(g);
        self.buffer = None;
        ok
    }

    pub fn core_vertices(&self) -> Vec<VertexId> {
        let mut v = vec![self.v];
        v.extend(self.subset.iter().copied());
        v
    }

    pub fn radius(&self) -> usize {
        2
    }
}

/// Unfuses everything except `subset` off `v` at a fixed pi/2 phase and
/// local-complements the result, exposing an LC move on vertices whose
/// raw phase would otherwise have blocked it.
#[derive(Clone, Debug)]
pub struct LCompUnfusion {
    pub v: VertexId,
    pub subset: Vec<VertexId>,
    unfuse: NeighborUnfusion,
    lcomp: Option<LocalComplement>,
}

impl LCompUnfusion {
    pub fn new(v: VertexId, subset: Vec<VertexId>) -> Self {
        LCompUnfusion {
            v,
            subset: subset.clone(),
            unfuse: NeighborUnfusion::new(v, Phase::pi_2(), subset),
            lcomp: None,
        }
    }

    pub fn is_applicable(&self, g: &ZXGraph) -> bool {
        g.vertex(self.v).is_some() && self.subset.iter().all(|&n| g.is_neighbor(self.v, n))
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        if !self.is_applicable(g) {
            return false;
        }
        self.unfuse = NeighborUnfusion::new(self.v, Phase::pi_2(), self.subset.clone());
        if !self.unfuse.apply(g) {
            return false;
        }
        let mut lcomp = LocalComplement::new(self.v);
        if !lcomp.apply(g) {
            self.unfuse.undo(g);
            return false;
        }
        self.lcomp = Some(lcomp);
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let Some(mut lcomp) = self.lcomp.take() else { return false };
        lcomp.undo(g) && self.unfuse.undo(g)
    }

    pub fn core_vertices(&self) -> Vec<VertexId> {
        let mut v = vec![self.v];
        v.extend(self.subset.iter().copied());
        v
    }

    pub fn radius(&self) -> usize {
        2
    }
}

/// Unfuses `subset_u`/`subset_v` off `u`/`v` to bring both down to n*pi
/// phase, then pivots the pair.
#[derive(Clone, Debug)]
pub struct PivotUnfusion {
    pub u: VertexId,
    pub v: VertexId,
    pub subset_u: Vec<VertexId>,
    pub subset_v: Vec<VertexId>,
    unfuse_u: NeighborUnfusion,
    unfuse_v: NeighborUnfusion,
    pivot: Option<Pivot>,
}

impl PivotUnfusion {
    pub fn new(u: VertexId, v: VertexId, subset_u: Vec<VertexId>, subset_v: Vec<VertexId>) -> Self {
        PivotUnfusion {
            u,
            v,
            unfuse_u: NeighborUnfusion::new(u, Phase::ZERO, subset_u.clone()),
            unfuse_v: NeighborUnfusion::new(v, Phase::ZERO, subset_v.clone()),
            subset_u,
            subset_v,
            pivot: None,
        }
    }

    pub fn is_applicable(&self, g: &ZXGraph) -> bool {
        g.vertex(self.u).is_some()
            && g.vertex(self.v).is_some()
            && self.subset_u.iter().all(|&n| g.is_neighbor(self.u, n))
            && self.subset_v.iter().all(|&n| g.is_neighbor(self.v, n))
    }

    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        if !self.is_applicable(g) {
            return false;
        }
        self.unfuse_u = NeighborUnfusion::new(self.u, Phase::ZERO, self.subset_u.clone());
        if !self.unfuse_u.apply(g) {
            return false;
        }
        self.unfuse_v = NeighborUnfusion::new(self.v, Phase::ZERO, self.subset_v.clone());
        if !self.unfuse_v.apply(g) {
            self.unfuse_u.undo(g);
            return false;
        }
        let mut pivot = Pivot::new(self.u, self.v);
        if !pivot.apply(g) {
            self.unfuse_v.undo(g);
            self.unfuse_u.undo(g);
            return false;
        }
        self.pivot = Some(pivot);
        true
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        let Some(mut pivot) = self.pivot.take() else { return false };
        pivot.undo(g) && self.unfuse_v.undo(g) && self.unfuse_u.undo(g)
    }

    pub fn core_vertices(&self) -> Vec<VertexId> {
        let mut v = vec![self.u, self.v];
        v.extend(self.subset_u.iter().copied());
        v.extend(self.subset_v.iter().copied());
        v
    }

    pub fn radius(&self) -> usize {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeType, VertexType};

    #[test]
    fn identity_fusion_splits_spider_and_undoes() {
        let mut g = ZXGraph::new();
        let v = g.add_vertex(VertexType::Z, Phase::new(1, 4), None);
        let a = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let b = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let c = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        g.add_edge(v, a, EdgeType::Hadamard);
        g.add_edge(v, b, EdgeType::Hadamard);
        g.add_edge(v, c, EdgeType::Hadamard);
        let before = g.clone();

        let mut rule = IdentityFusion::new(v, vec![b, c]);
        assert!(rule.apply(&mut g));
        assert!(!g.is_neighbor(v, b));
        assert_eq!(g.num_vertices(), 5);

        assert!(rule.undo(&mut g));
        assert!(g.structurally_eq(&before));
    }

    #[test]
    fn lcomp_unfusion_round_trips() {
        let mut g = ZXGraph::new();
        let v = g.add_vertex(VertexType::Z, Phase::new(1, 4), None);
        let a = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let b = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        g.add_edge(v, a, EdgeType::Hadamard);
        g.add_edge(v, b, EdgeType::Hadamard);
        let before = g.clone();

        let mut rule = LCompUnfusion::new(v, vec![]);
        assert!(rule.apply(&mut g));
        assert!(g.is_neighbor(a, b));

        assert!(rule.undo(&mut g));
        assert!(g.structurally_eq(&before));
    }
}
