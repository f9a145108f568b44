//! Simplification drivers: fixpoint passes over individual rules, and the
//! staged strategies (`full_reduce`, `dynamic_reduce`, `symbolic_reduce`,
//! `causal_flow_opt`) built from them.

use itertools::Itertools;
use rand::seq::SliceRandom;
use tracing::{debug, info, trace};

use crate::flow::{calculate_causal_flow, has_causal_flow};
use crate::graph::actions::ToggleVertex;
use crate::graph::{VertexType, ZXGraph};
use crate::heuristics::{calculate_2q_decrease_identity_fusion, calculate_2q_decrease_lcomp_unfusion, calculate_2q_decrease_pivot_unfusion};
use crate::rules::unfusion::{IdentityFusion, LCompUnfusion, PivotUnfusion};
use crate::rules::{bialgebra, hadamard, identity_removal, local_complement, phase_gadget, pivot, spider_fusion, state_copy};
use crate::stop::StopToken;

/// Repeatedly finds and applies non-overlapping matches of one rule until
/// no more are found. Returns the number of rewrites applied.
fn run_to_fixpoint<R>(g: &mut ZXGraph, mut find: impl FnMut(&ZXGraph) -> Vec<R>, mut apply: impl FnMut(&mut R, &mut ZXGraph) -> bool) -> usize {
    let mut total = 0;
    loop {
        let mut matches = find(g);
        if matches.is_empty() {
            break;
        }
        let applied_this_round = matches.iter_mut().filter(|m| apply(m, g)).count();
        total += applied_this_round;
        if applied_this_round == 0 {
            break;
        }
    }
    total
}

pub fn spider_fusion_simp(g: &mut ZXGraph) -> usize {
    run_to_fixpoint(g, |g| spider_fusion::find_matches(g, None, false), |m, g| m.apply(g))
}

pub fn identity_removal_simp(g: &mut ZXGraph) -> usize {
    run_to_fixpoint(g, |g| identity_removal::find_matches(g, None, false), |m, g| m.apply(g))
}

pub fn bialgebra_simp(g: &mut ZXGraph) -> usize {
    run_to_fixpoint(g, |g| bialgebra::find_matches(g, None, false), |m, g| m.apply(g))
}

pub fn state_copy_simp(g: &mut ZXGraph) -> usize {
    run_to_fixpoint(g, |g| state_copy::find_matches(g, None, false), |m, g| m.apply(g))
}

pub fn phase_gadget_simp(g: &mut ZXGraph) -> usize {
    run_to_fixpoint(g, |g| phase_gadget::find_matches(g, None), |m, g| m.apply(g))
}

pub fn hadamard_fusion_simp(g: &mut ZXGraph) -> usize {
    run_to_fixpoint(g, |g| hadamard::find_matches(g, None, false), |m, g| m.apply(g))
}

pub fn local_complement_simp(g: &mut ZXGraph) -> usize {
    run_to_fixpoint(g, |g| local_complement::find_matches(g, None, false), |m, g| m.apply(g))
}

pub fn pivot_simp(g: &mut ZXGraph) -> usize {
    run_to_fixpoint(g, |g| pivot::find_matches(g, None, false), |m, g| m.apply(g))
}

pub fn pivot_boundary_simp(g: &mut ZXGraph) -> usize {
    let candidates: Vec<_> = g.vertices().filter(|&v| g.vertex_type(v) == VertexType::Z).collect();
    let mut total = 0;
    loop {
        let pool = candidates.clone();
        let mut applied_any = false;
        'outer: for i in 0..pool.len() {
            for j in (i + 1)..pool.len() {
                let (u, v) = (pool[i], pool[j]);
                let mut rule = pivot::PivotBoundary::new(u, v);
                if rule.is_applicable(g) && rule.apply(g) {
                    total += 1;
                    applied_any = true;
                    break 'outer;
                }
            }
        }
        if !applied_any {
            break;
        }
    }
    total
}

pub fn pivot_gadget_simp(g: &mut ZXGraph) -> usize {
    let mut total = 0;
    loop {
        let candidates: Vec<_> = g.vertices().collect();
        let mut applied_any = false;
        'outer: for &u in &candidates {
            if g.vertex(u).is_none() || g.vertex_type(u) != VertexType::Z {
                continue;
            }
            for (v, e) in g.neighbors(u) {
                if e != crate::graph::EdgeType::Hadamard || g.vertex_type(v) != VertexType::Z {
                    continue;
                }
                let mut rule = pivot::PivotGadget::new(u, v);
                if rule.is_applicable(g) && rule.apply(g) {
                    total += 1;
                    applied_any = true;
                    break 'outer;
                }
            }
        }
        if !applied_any {
            break;
        }
    }
    total
}

/// Turns every X-spider into a Z-spider, toggling incident edges.
pub fn to_z_graph(g: &mut ZXGraph) {
    let xs: Vec<_> = g.vertices().filter(|&v| g.vertex_type(v) == VertexType::X).collect();
    for v in xs {
        ToggleVertex::new(v).apply(g);
    }
}

/// Turns every Z-spider into an X-spider, toggling incident edges.
pub fn to_x_graph(g: &mut ZXGraph) {
    let zs: Vec<_> = g.vertices().filter(|&v| g.vertex_type(v) == VertexType::Z).collect();
    for v in zs {
        ToggleVertex::new(v).apply(g);
    }
}

/// Fuses spiders then recolors every X to Z, leaving every vertex a
/// Z-spider or boundary and every internal edge a Hadamard edge.
pub fn to_graph_like(g: &mut ZXGraph) {
    spider_fusion_simp(g);
    to_z_graph(g);
}

/// Removes Clifford vertices in the interior of the graph iteratively
/// until no more can be removed. Returns the number of iterations run.
pub fn interior_clifford_simp(g: &mut ZXGraph, stop: &StopToken) -> usize {
    to_graph_like(g);
    let mut iterations = 0;
    while !stop.stop_requested() {
        let i1 = identity_removal_simp(g);
        let i2 = spider_fusion_simp(g);
        let i3 = pivot_simp(g);
        let i4 = local_complement_simp(g);
        trace!(i1, i2, i3, i4, "interior_clifford_simp pass");
        iterations += 1;
        if i1 + i2 + i3 + i4 == 0 {
            return iterations;
        }
    }
    iterations
}

/// Runs `interior_clifford_simp` and `pivot_boundary_simp` iteratively
/// until no pivot-boundary candidate is found.
pub fn clifford_simp(g: &mut ZXGraph, stop: &StopToken) -> usize {
    let mut iterations = 0;
    loop {
        if stop.stop_requested() {
            return iterations;
        }
        iterations += interior_clifford_simp(g, stop);
        if pivot_boundary_simp(g) == 0 {
            break;
        }
    }
    iterations
}

/// Full reduction to a locally-minimal graph-like diagram.
pub fn full_reduce(g: &mut ZXGraph, stop: &StopToken) {
    interior_clifford_simp(g, stop);
    pivot_gadget_simp(g);
    while !stop.stop_requested() {
        clifford_simp(g, stop);
        let i1 = phase_gadget_simp(g);
        interior_clifford_simp(g, stop);
        let i2 = pivot_gadget_simp(g);
        debug!(i1, i2, "full_reduce pass");
        if i1 + i2 == 0 {
            break;
        }
    }
}

/// Runs `full_reduce` on a scratch copy to find the T-optimal count, then
/// reduces `g` only as far as needed to match it.
pub fn dynamic_reduce(g: &mut ZXGraph, stop: &StopToken) {
    hadamard_fusion_simp(g);
    let mut scratch = g.clone();
    info!("full reduce (scratch copy) to find T-optimal count");
    full_reduce(&mut scratch, stop);
    let optimal_t_count = scratch.t_count();
    info!(optimal_t_count, "dynamic reduce");
    dynamic_reduce_to(g, optimal_t_count, stop);
}

/// Reduces `g` just until its T-count matches `optimal_t_count`.
pub fn dynamic_reduce_to(g: &mut ZXGraph, optimal_t_count: usize, stop: &StopToken) {
    interior_clifford_simp(g, stop);
    pivot_gadget_simp(g);
    if g.t_count() == optimal_t_count {
        return;
    }
    while !stop.stop_requested() {
        clifford_simp(g, stop);
        if g.t_count() == optimal_t_count {
            return;
        }
        let i1 = phase_gadget_simp(g);
        if g.t_count() == optimal_t_count {
            return;
        }
        interior_clifford_simp(g, stop);
        if g.t_count() == optimal_t_count {
            return;
        }
        let i2 = pivot_gadget_simp(g);
        if g.t_count() == optimal_t_count || i1 + i2 == 0 {
            return;
        }
    }
}

/// Reduction strategy that keeps boolean-state leaves copied through the
/// graph between passes, useful when T-gates are parameterized.
pub fn symbolic_reduce(g: &mut ZXGraph, stop: &StopToken) {
    interior_clifford_simp(g, stop);
    pivot_gadget_simp(g);
    state_copy_simp(g);
    while !stop.stop_requested() {
        let i1 = phase_gadget_simp(g);
        interior_clifford_simp(g, stop);
        let i2 = pivot_gadget_simp(g);
        state_copy_simp(g);
        if i1 + i2 == 0 {
            break;
        }
    }
    to_x_graph(g);
}

/// One scored candidate for the causal-flow-preserving optimizer.
enum ScoredMatch {
    Identity(IdentityFusion, i64),
    Lcomp(LCompUnfusion, i64),
    Pivot(PivotUnfusion, i64),
}

impl ScoredMatch {
    fn score(&self) -> i64 {
        match self {
            ScoredMatch::Identity(_, s) | ScoredMatch::Lcomp(_, s) | ScoredMatch::Pivot(_, s) => *s,
        }
    }

    fn apply(&mut self, g: &mut ZXGraph) -> bool {
        match self {
            ScoredMatch::Identity(m, _) => m.apply(g),
            ScoredMatch::Lcomp(m, _) => m.apply(g),
            ScoredMatch::Pivot(m, _) => m.apply(g),
        }
    }
}

/// Every subset of `v`'s neighbors up to size `max_len`, smallest first.
fn candidate_subsets(g: &ZXGraph, v: crate::graph::VertexId, max_len: usize) -> Vec<Vec<crate::graph::VertexId>> {
    let neighbors = g.neighbor_ids(v);
    let mut subsets = vec![Vec::new()];
    for size in 1..=max_len.min(neighbors.len()) {
        subsets.extend(neighbors.iter().copied().combinations(size));
    }
    subsets
}

/// Collects every positively-scored identity-fusion/lcomp-unfusion/
/// pivot-unfusion match, sorted ascending by score (so the best candidate
/// can be popped off the back).
fn get_matches_with_scores(g: &ZXGraph, max_lcomp_unfusions: usize, max_pivot_unfusions: usize) -> Vec<ScoredMatch> {
    let mut matches = Vec::new();
    // shuffled so equal-score ties (broken by the later stable sort) don't
    // always favor the same vertex across repeated calls
    let mut vertices: Vec<_> = g.vertices().collect();
    vertices.shuffle(&mut rand::rng());

    for &v in &vertices {
        if g.vertex(v).is_none() || !g.vertex_type(v).is_spider() {
            continue;
        }
        for subset in candidate_subsets(g, v, max_lcomp_unfusions.max(1)) {
            if !subset.is_empty() {
                let rule = IdentityFusion::new(v, subset.clone());
                if let Some(score) = calculate_2q_decrease_identity_fusion(g, &rule) {
                    if score > 0 {
                        matches.push(ScoredMatch::Identity(rule, score));
                    }
                }
            }
            if subset.len() <= max_lcomp_unfusions {
                let rule = LCompUnfusion::new(v, subset.clone());
                if let Some(score) = calculate_2q_decrease_lcomp_unfusion(g, &rule) {
                    if score > 0 {
                        matches.push(ScoredMatch::Lcomp(rule, score));
                    }
                }
            }
        }
    }

    for &u in &vertices {
        for (v, e) in g.neighbors(u) {
            if v.0 <= u.0 || e != crate::graph::EdgeType::Hadamard {
                continue;
            }
            for su in candidate_subsets(g, u, max_pivot_unfusions.max(1)) {
                for sv in candidate_subsets(g, v, max_pivot_unfusions.max(1)) {
                    let rule = PivotUnfusion::new(u, v, su.clone(), sv.clone());
                    if let Some(score) = calculate_2q_decrease_pivot_unfusion(g, &rule) {
                        if score > 0 {
                            matches.push(ScoredMatch::Pivot(rule, score));
                        }
                    }
                }
            }
        }
    }

    matches.sort_by_key(|m| m.score());
    matches
}

/// Causal-flow-preserving simplification: greedily applies the
/// highest-scoring identity-fusion/lcomp-unfusion/pivot-unfusion rewrite,
/// rescoring from scratch after each application, until no positive-score
/// candidate remains or the graph loses causal flow.
pub fn causal_flow_opt(g: &mut ZXGraph, max_lcomp_unfusions: usize, max_pivot_unfusions: usize, stop: &StopToken) {
    to_graph_like(g);
    if !has_causal_flow(g) {
        tracing::error!("graph has no causal flow to begin with");
        return;
    }

    let mut num_applied = 0;
    while !stop.stop_requested() {
        let mut matches = get_matches_with_scores(g, max_lcomp_unfusions, max_pivot_unfusions);
        let Some(mut best) = matches.pop() else { break };
        let mut scratch = g.clone();
        if !best.apply(&mut scratch) || calculate_causal_flow(&scratch).is_none() {
            continue;
        }
        *g = scratch;
        num_applied += 1;
        debug!(num_applied, score = best.score(), "causal_flow_opt applied a rewrite");
    }
    info!(num_applied, "causal_flow_opt finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeType, VertexType};
    use crate::phase::Phase;

    #[test]
    fn to_graph_like_leaves_only_z_and_boundary() {
        let mut g = ZXGraph::new();
        let i = g.add_input(0, None).unwrap();
        let o = g.add_output(0, None).unwrap();
        let x = g.add_vertex(VertexType::X, Phase::new(1, 4), None);
        g.add_edge(i, x, EdgeType::Simple);
        g.add_edge(x, o, EdgeType::Simple);

        to_graph_like(&mut g);
        for v in g.vertices() {
            assert!(g.vertex_type(v) == VertexType::Z || g.is_boundary(v));
        }
    }

    #[test]
    fn interior_clifford_simp_collapses_identity_chain() {
        let mut g = ZXGraph::new();
        let i = g.add_input(0, None).unwrap();
        let o = g.add_output(0, None).unwrap();
        let a = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let b = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        g.add_edge(i, a, EdgeType::Hadamard);
        g.add_edge(a, b, EdgeType::Simple);
        g.add_edge(b, o, EdgeType::Hadamard);

        let stop = StopToken::new();
        interior_clifford_simp(&mut g, &stop);
        assert_eq!(g.num_vertices(), 2);
        assert_eq!(g.get_edge_type(i, o), Some(EdgeType::Hadamard));
    }

    #[test]
    fn causal_flow_opt_preserves_causal_flow() {
        let mut g = ZXGraph::new();
        let i = g.add_input(0, None).unwrap();
        let o = g.add_output(0, None).unwrap();
        let a = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        g.add_edge(i, a, EdgeType::Hadamard);
        g.add_edge(a, o, EdgeType::Hadamard);

        let stop = StopToken::new();
        causal_flow_opt(&mut g, 1, 1, &stop);
        assert!(has_causal_flow(&g));
    }
}
