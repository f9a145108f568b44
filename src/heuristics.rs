//! Two-qubit gate count heuristics: estimates how many edges a candidate
//! unfusion-backed rewrite would remove, without committing the rewrite to
//! the caller's graph.
//!
//! Each edge in a graph-like diagram corresponds to one controlled-Z in
//! the extracted circuit, so the edge-count delta is used directly as the
//! two-qubit gate decrease estimate.

use crate::graph::ZXGraph;
use crate::rules::unfusion::{IdentityFusion, LCompUnfusion, PivotUnfusion};

fn evaluate_on_scratch(g: &ZXGraph, apply: impl FnOnce(&mut ZXGraph) -> bool) -> Option<i64> {
    let before = g.num_edges();
    let mut scratch = g.clone();
    if !apply(&mut scratch) {
        return None;
    }
    Some(before as i64 - scratch.num_edges() as i64)
}

/// Estimated edge-count decrease from applying `rule` to `g`, or `None` if
/// the rule's preconditions aren't met. Positive values mean fewer edges
/// (fewer two-qubit gates) after the rewrite.
pub fn calculate_2q_decrease_identity_fusion(g: &ZXGraph, rule: &IdentityFusion) -> Option<i64> {
    let mut rule = rule.clone();
    evaluate_on_scratch(g, |scratch| rule.apply(scratch))
}

pub fn calculate_2q_decrease_lcomp_unfusion(g: &ZXGraph, rule: &LCompUnfusion) -> Option<i64> {
    let mut rule = rule.clone();
    evaluate_on_scratch(g, |scratch| rule.apply(scratch))
}

pub fn calculate_2q_decrease_pivot_unfusion(g: &ZXGraph, rule: &PivotUnfusion) -> Option<i64> {
    let mut rule = rule.clone();
    evaluate_on_scratch(g, |scratch| rule.apply(scratch))
}

/// Picks the best-scoring candidate from `candidates` by 2Q decrease,
/// breaking ties in favor of the earliest candidate.
pub fn best_by_2q_decrease<'a, T>(g: &ZXGraph, candidates: &'a [T], score: impl Fn(&ZXGraph, &T) -> Option<i64>) -> Option<&'a T> {
    candidates
        .iter()
        .filter_map(|c| score(g, c).map(|s| (s, c)))
        .max_by_key(|(s, _)| *s)
        .map(|(_, c)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeType, VertexType, ZXGraph};
    use crate::phase::Phase;

    #[test]
    fn identity_fusion_decrease_is_nonpositive_locally() {
        let mut g = ZXGraph::new();
        let v = g.add_vertex(VertexType::Z, Phase::new(1, 4), None);
        let a = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let b = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        g.add_edge(v, a, EdgeType::Hadamard);
        g.add_edge(v, b, EdgeType::Hadamard);

        let rule = IdentityFusion::new(v, vec![b]);
        let decrease = calculate_2q_decrease_identity_fusion(&g, &rule).expect("applicable");
        // splitting a spider adds one spider and one edge locally
        assert!(decrease <= 0);
    }

    #[test]
    fn lcomp_unfusion_decrease_reflects_edge_toggle() {
        let mut g = ZXGraph::new();
        let v = g.add_vertex(VertexType::Z, Phase::pi_2(), None);
        let a = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let b = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let c = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        g.add_edge(v, a, EdgeType::Hadamard);
        g.add_edge(v, b, EdgeType::Hadamard);
        g.add_edge(v, c, EdgeType::Hadamard);

        let rule = LCompUnfusion::new(v, vec![]);
        let decrease = calculate_2q_decrease_lcomp_unfusion(&g, &rule).expect("applicable");
        // v's 3 edges are removed, 3 new edges fill in among a, b, c
        assert_eq!(decrease, 0);
    }
}
