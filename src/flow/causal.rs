//! Causal flow: a sufficient condition for a ZX-diagram to realize a
//! deterministic measurement-based computation, found via the corrector
//! layer-propagation algorithm of Perdrix & Mhalla.

use std::collections::{HashMap, HashSet};

use crate::graph::{VertexId, ZXGraph};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CausalFlow {
    /// measurement order: smaller runs first
    pub order: HashMap<VertexId, usize>,
    /// each corrected vertex maps to the vertex it corrects
    pub successor: HashMap<VertexId, VertexId>,
    pub depth: usize,
}

fn neighbor_sets(g: &ZXGraph) -> HashMap<VertexId, HashSet<VertexId>> {
    g.vertices().map(|v| (v, g.neighbor_ids(v).into_iter().collect())).collect()
}

/// Calculates the causal flow of `g`, or `None` if it has none.
///
/// Translated from the corrector-propagation loop: at each depth, every
/// remaining corrector whose only unprocessed neighbor is a single vertex
/// `u` assigns `v` as `u`'s successor and becomes processed itself.
pub fn calculate_causal_flow(g: &ZXGraph) -> Option<CausalFlow> {
    let mut flow = CausalFlow {
        order: HashMap::new(),
        successor: HashMap::new(),
        depth: 1,
    };

    let inputs: HashSet<VertexId> = g.inputs().into_iter().collect();
    let vertices: HashSet<VertexId> = g.vertices().collect();
    let mut processed: HashSet<VertexId> = g.outputs().into_iter().collect();
    let non_inputs: HashSet<VertexId> = vertices.difference(&inputs).copied().collect();
    let mut correctors: HashSet<VertexId> = processed.difference(&inputs).copied().collect();

    let neighbor_sets = neighbor_sets(g);

    loop {
        let mut out_prime = HashSet::new();
        let mut c_prime = HashSet::new();

        for &v in &correctors {
            let unprocessed: Vec<VertexId> = neighbor_sets[&v].difference(&processed).copied().collect();
            if unprocessed.len() != 1 {
                continue;
            }
            let u = unprocessed[0];
            if v == u {
                continue;
            }
            flow.order.insert(v, flow.depth);
            flow.successor.insert(u, v);
            out_prime.insert(u);
            c_prime.insert(v);
        }

        if out_prime.is_empty() {
            return if processed.len() == vertices.len() { Some(flow) } else { None };
        }

        processed.extend(out_prime.iter().copied());
        for v in &c_prime {
            correctors.remove(v);
        }
        correctors.extend(non_inputs.intersection(&out_prime).copied());
        flow.depth += 1;
    }
}

pub fn has_causal_flow(g: &ZXGraph) -> bool {
    calculate_causal_flow(g).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeType, VertexType};
    use crate::phase::Phase;

    #[test]
    fn straight_through_wire_has_causal_flow() {
        let mut g = ZXGraph::new();
        let i = g.add_input(0, None).unwrap();
        let o = g.add_output(0, None).unwrap();
        let v = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        g.add_edge(i, v, EdgeType::Hadamard);
        g.add_edge(v, o, EdgeType::Hadamard);

        let flow = calculate_causal_flow(&g).expect("wire must have causal flow");
        assert_eq!(flow.successor.get(&v), Some(&o));
    }

    #[test]
    fn cycle_without_inputs_breaks_flow() {
        let mut g = ZXGraph::new();
        let a = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let b = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        let c = g.add_vertex(VertexType::Z, Phase::ZERO, None);
        g.add_edge(a, b, EdgeType::Hadamard);
        g.add_edge(b, c, EdgeType::Hadamard);
        g.add_edge(c, a, EdgeType::Hadamard);

        assert!(!has_causal_flow(&g));
    }
}
