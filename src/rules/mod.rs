//! Rewrite rules over [`ZXGraph`](crate::graph::ZXGraph), each composed
//! from the reversible actions in `crate::graph::actions`.
//!
//! Every rule exposes the same inherent-method contract: `is_applicable`,
//! `apply`, `undo`, `core_vertices`, `get_affected_vertices` (where
//! meaningful) and `radius`. [`Rewrite`] closes them all into one sum type
//! so drivers can hold a heterogeneous worklist.

pub mod bialgebra;
pub mod hadamard;
pub mod identity_removal;
pub mod local_complement;
pub mod phase_gadget;
pub mod pivot;
pub mod spider_fusion;
pub mod state_copy;
pub mod unfusion;

use crate::graph::{VertexId, ZXGraph};

/// A single applied or pending rewrite, closed over every rule in this
/// module so a driver can queue a mix of them.
#[derive(Clone, Debug)]
pub enum Rewrite {
    IdentityRemoval(identity_removal::IdentityRemoval),
    SpiderFusion(spider_fusion::SpiderFusion),
    HadamardFusion(hadamard::HadamardFusion),
    Bialgebra(bialgebra::Bialgebra),
    LocalComplement(local_complement::LocalComplement),
    Pivot(pivot::Pivot),
    PivotBoundary(pivot::PivotBoundary),
    PivotGadget(pivot::PivotGadget),
    PhaseGadgetFusion(phase_gadget::PhaseGadgetFusion),
    StateCopy(state_copy::StateCopy),
    IdentityFusion(unfusion::IdentityFusion),
    LCompUnfusion(unfusion::LCompUnfusion),
    PivotUnfusion(unfusion::PivotUnfusion),
}

macro_rules! dispatch {
    ($self:expr, $method:ident $(, $arg:expr)*) => {
        match $self {
            Rewrite::IdentityRemoval(r) => r.$method($($arg),*),
            Rewrite::SpiderFusion(r) => r.$method($($arg),*),
            Rewrite::HadamardFusion(r) => r.$method($($arg),*),
            Rewrite::Bialgebra(r) => r.$method($($arg),*),
            Rewrite::LocalComplement(r) => r.$method($($arg),*),
            Rewrite::Pivot(r) => r.$method($($arg),*),
            Rewrite::PivotBoundary(r) => r.$method($($arg),*),
            Rewrite::PivotGadget(r) => r.$method($($arg),*),
            Rewrite::PhaseGadgetFusion(r) => r.$method($($arg),*),
            Rewrite::StateCopy(r) => r.$method($($arg),*),
            Rewrite::IdentityFusion(r) => r.$method($($arg),*),
            Rewrite::LCompUnfusion(r) => r.$method($($arg),*),
            Rewrite::PivotUnfusion(r) => r.$method($($arg),*),
        }
    };
}

impl Rewrite {
    pub fn apply(&mut self, g: &mut ZXGraph) -> bool {
        dispatch!(self, apply, g)
    }

    pub fn undo(&mut self, g: &mut ZXGraph) -> bool {
        dispatch!(self, undo, g)
    }

    pub fn core_vertices(&self) -> Vec<VertexId> {
        dispatch!(self, core_vertices)
    }

    pub fn radius(&self) -> usize {
        dispatch!(self, radius)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rewrite::IdentityRemoval(_) => "identity_removal",
            Rewrite::SpiderFusion(_) => "spider_fusion",
            Rewrite::HadamardFusion(_) => "hadamard_fusion",
            Rewrite::Bialgebra(_) => "bialgebra",
            Rewrite::LocalComplement(_) => "local_complement",
            Rewrite::Pivot(_) => "pivot",
            Rewrite::PivotBoundary(_) => "pivot_boundary",
            Rewrite::PivotGadget(_) => "pivot_gadget",
            Rewrite::PhaseGadgetFusion(_) => "phase_gadget_fusion",
            Rewrite::StateCopy(_) => "state_copy",
            Rewrite::IdentityFusion(_) => "identity_fusion",
            Rewrite::LCompUnfusion(_) => "lcomp_unfusion",
            Rewrite::PivotUnfusion(_) => "pivot_unfusion",
        }
    }
}

/// Applies every rewrite in `rewrites` in order, stopping and unwinding on
/// the first rejection. Used by drivers that assembled a worklist from
/// several rules' `find_matches` and want all-or-nothing application of
/// one simplification pass.
pub fn apply_all(g: &mut ZXGraph, rewrites: &mut [Rewrite]) -> bool {
    for (i, r) in rewrites.iter_mut().enumerate() {
        if !r.apply(g) {
            for r in rewrites[..i].iter_mut().rev() {
                r.undo(g);
            }
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeType, VertexType};
    use crate::phase::Phase;

    #[test]
    fn apply_all_unwinds_on_rejection() {
        let mut g = ZXGraph::new();
        let a = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let mid = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let b = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        g.add_edge(a, mid, EdgeType::Simple);
        g.add_edge(mid, b, EdgeType::Simple);
        let before = g.clone();

        let mut rewrites = vec![
            Rewrite::IdentityRemoval(identity_removal::IdentityRemoval::new(mid)),
            // mid no longer exists after the first rewrite: this one must fail
            Rewrite::IdentityRemoval(identity_removal::IdentityRemoval::new(mid)),
        ];
        assert!(!apply_all(&mut g, &mut rewrites));
        assert!(g.structurally_eq(&before));
    }
}
