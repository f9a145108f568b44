//! The core labelled-multigraph store

use indexmap::{IndexMap, IndexSet};
use petgraph::graphmap::GraphMap;
use petgraph::Undirected;
use tracing::{debug, trace};

use crate::error::{ZxError, ZxResult};
use crate::phase::Phase;

use super::vertex::{EdgeType, Vertex, VertexId, VertexType};

/// A ZX-calculus diagram: a labelled multigraph over Z/X/H/boundary
/// vertices with simple/Hadamard edges.
///
/// Adjacency is stored in a `petgraph` `GraphMap` (at most one edge of each
/// type between any two distinct vertices, enforced by the edge algebra in
/// [`ZXGraph::add_edge`]); vertex attributes live in a separate arena keyed
/// by [`VertexId`] so rule/action code can hold ids across mutations
/// without borrowing the graph.
#[derive(Clone, Debug, Default)]
pub struct ZXGraph {
    arena: IndexMap<VertexId, Vertex>,
    adjacency: GraphMap<VertexId, EdgeType, Undirected>,
    inputs: IndexSet<VertexId>,
    outputs: IndexSet<VertexId>,
    input_list: IndexMap<i32, VertexId>,
    output_list: IndexMap<i32, VertexId>,
    next_vertex_id: usize,
    pub filename: Option<String>,
    pub procedures: Vec<String>,
}

impl ZXGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // id allocation
    // ------------------------------------------------------------------

    fn alloc_id(&mut self, explicit: Option<VertexId>) -> VertexId {
        match explicit {
            Some(id) => {
                if id.0 >= self.next_vertex_id {
                    self.next_vertex_id = id.0 + 1;
                }
                id
            }
            None => {
                let id = VertexId(self.next_vertex_id);
                self.next_vertex_id += 1;
                id
            }
        }
    }

    // ------------------------------------------------------------------
    // mutation: vertices
    // ------------------------------------------------------------------

    pub fn add_vertex(&mut self, vtype: VertexType, phase: Phase, id: Option<VertexId>) -> VertexId {
        let id = self.alloc_id(id);
        let vertex = Vertex::new(id, vtype, phase);
        self.arena.insert(id, vertex);
        self.adjacency.add_node(id);
        trace!(vertex = %id, ?vtype, %phase, "added vertex");
        id
    }

    pub fn add_input(&mut self, qubit: i32, id: Option<VertexId>) -> ZxResult<VertexId> {
        if self.input_list.contains_key(&qubit) {
            return Err(ZxError::DuplicateInputQubit(qubit));
        }
        let id = self.add_vertex(VertexType::Boundary, Phase::ZERO, id);
        self.arena.get_mut(&id).unwrap().qubit = qubit;
        self.inputs.insert(id);
        self.input_list.insert(qubit, id);
        Ok(id)
    }

    pub fn add_output(&mut self, qubit: i32, id: Option<VertexId>) -> ZxResult<VertexId> {
        if self.output_list.contains_key(&qubit) {
            return Err(ZxError::DuplicateOutputQubit(qubit));
        }
        let id = self.add_vertex(VertexType::Boundary, Phase::ZERO, id);
        self.arena.get_mut(&id).unwrap().qubit = qubit;
        self.outputs.insert(id);
        self.output_list.insert(qubit, id);
        Ok(id)
    }

    /// Removes `v` and every edge incident to it. Returns `false` if `v`
    /// does not exist.
    pub fn remove_vertex(&mut self, v: VertexId) -> bool {
        if !self.arena.contains_key(&v) {
            return false;
        }
        let neighbors: Vec<VertexId> = self.adjacency.neighbors(v).collect();
        for n in neighbors {
            self.adjacency.remove_edge(v, n);
        }
        self.adjacency.remove_node(v);
        self.arena.shift_remove(&v);
        if self.inputs.shift_remove(&v) {
            self.input_list.retain(|_, id| *id != v);
        }
        if self.outputs.shift_remove(&v) {
            self.output_list.retain(|_, id| *id != v);
        }
        trace!(vertex = %v, "removed vertex");
        true
    }

    /// Removes every vertex with zero degree. Returns the count removed.
    pub fn remove_isolated_vertices(&mut self) -> usize {
        let isolated: Vec<VertexId> = self
            .arena
            .keys()
            .copied()
            .filter(|v| self.num_neighbors(*v) == 0 && !self.inputs.contains(v) && !self.outputs.contains(v))
            .collect();
        let count = isolated.len();
        for v in isolated {
            self.remove_vertex(v);
        }
        if count > 0 {
            debug!(count, "removed isolated vertices");
        }
        count
    }

    // ------------------------------------------------------------------
    // mutation: edges (edge algebra)
    // ------------------------------------------------------------------

    /// Adds an edge `(u, e, v)`, applying the Z/X collapse rules from the
    /// data model. Panics (a structural violation) if `u` or `v` does not
    /// exist, or if a second edge would be added to a boundary vertex.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId, etype: EdgeType) {
        self.try_add_edge(u, v, etype)
            .expect("add_edge: structural violation");
    }

    pub fn try_add_edge(&mut self, u: VertexId, v: VertexId, etype: EdgeType) -> ZxResult<()> {
        if !self.arena.contains_key(&u) {
            return Err(ZxError::NoSuchVertex(u));
        }
        if !self.arena.contains_key(&v) {
            return Err(ZxError::NoSuchVertex(v));
        }

        if u == v {
            self.fold_self_loop(u, etype);
            return Ok(());
        }

        if self.vertex_type(u) == VertexType::Boundary && self.num_neighbors(u) >= 1 {
            return Err(ZxError::DuplicateBoundaryEdge(u));
        }
        if self.vertex_type(v) == VertexType::Boundary && self.num_neighbors(v) >= 1 {
            return Err(ZxError::DuplicateBoundaryEdge(v));
        }

        let tu = self.vertex_type(u);
        let tv = self.vertex_type(v);

        if tu.is_spider() && tv.is_spider() {
            self.add_spider_edge(u, v, tu, tv, etype);
        } else if tu == VertexType::H || tv == VertexType::H {
            self.add_hbox_edge(u, v, etype);
        } else {
            // boundary <-> spider/H, or boundary <-> boundary: never
            // collides since each boundary admits at most one neighbor,
            // checked above.
            self.record_edge(u, v, etype);
        }
        Ok(())
    }

    fn record_edge(&mut self, u: VertexId, v: VertexId, etype: EdgeType) {
        self.adjacency.add_edge(u, v, etype);
    }

    fn fold_self_loop(&mut self, v: VertexId, etype: EdgeType) {
        if etype == EdgeType::Hadamard {
            let vertex = self.arena.get_mut(&v).unwrap();
            vertex.phase = vertex.phase + Phase::PI;
        }
        // simple self-loops contribute 0 and are otherwise dropped.
    }

    /// Edge algebra between two Z/X spiders, per the collapse table.
    fn add_spider_edge(&mut self, u: VertexId, v: VertexId, tu: VertexType, tv: VertexType, adding: EdgeType) {
        let same_color = tu == tv;
        let existing = self.adjacency.edge_weight(u, v).copied();

        match (existing, adding) {
            (None, _) => self.record_edge(u, v, adding),

            (Some(EdgeType::Simple), EdgeType::Simple) if !same_color => {
                // opposite-color simple + simple: Hopf cancellation
                self.adjacency.remove_edge(u, v);
            }
            (Some(EdgeType::Simple), EdgeType::Hadamard) if !same_color => {
                self.adjacency.remove_edge(u, v);
                self.record_edge(u, v, EdgeType::Hadamard);
            }
            (Some(EdgeType::Hadamard), EdgeType::Simple) if !same_color => {
                // keep hadamard
            }
            (Some(EdgeType::Hadamard), EdgeType::Hadamard) if !same_color => {
                // keep hadamard
            }

            (Some(EdgeType::Simple), EdgeType::Hadamard) if same_color => {
                // induce pi on one endpoint, drop edge
                self.adjacency.remove_edge(u, v);
                let vertex = self.arena.get_mut(&u).unwrap();
                vertex.phase = vertex.phase + Phase::PI;
            }
            (Some(EdgeType::Hadamard), EdgeType::Hadamard) if same_color => {
                // two Hadamards cancel (identity)
                self.adjacency.remove_edge(u, v);
            }
            (Some(EdgeType::Hadamard), EdgeType::Simple) if same_color => {
                // keep simple
                self.adjacency.remove_edge(u, v);
                self.record_edge(u, v, EdgeType::Simple);
            }
            // same_color && existing == Simple && adding == Simple: not in
            // the table (two plain edges between same-color spiders is not
            // produced by any rule); treat as idempotent no-op.
            (Some(EdgeType::Simple), EdgeType::Simple) => {}
        }
    }

    /// H-boxes (and H-box/anything pairs) are not covered by the Z/X
    /// collapse table: when a second edge would land on an existing one, a
    /// fresh identity spider subdivides the new connection instead of
    /// colliding.
    fn add_hbox_edge(&mut self, u: VertexId, v: VertexId, etype: EdgeType) {
        if self.adjacency.edge_weight(u, v).is_some() {
            self.adjacency.remove_edge(u, v);
            let mid = self.add_vertex(VertexType::Z, Phase::ZERO, None);
            self.record_edge(u, mid, etype);
            self.record_edge(mid, v, EdgeType::Simple);
        } else {
            self.record_edge(u, v, etype);
        }
    }

    /// Removes the edge `(u, e, v)`. Structural violation (panics) if it
    /// does not exist.
    pub fn remove_edge(&mut self, u: VertexId, v: VertexId, etype: EdgeType) {
        self.try_remove_edge(u, v, etype)
            .expect("remove_edge: structural violation");
    }

    pub fn try_remove_edge(&mut self, u: VertexId, v: VertexId, etype: EdgeType) -> ZxResult<()> {
        match self.adjacency.edge_weight(u, v) {
            Some(existing) if *existing == etype => {
                self.adjacency.remove_edge(u, v);
                Ok(())
            }
            _ => Err(ZxError::NoSuchEdge { u, v, edge_type: etype }),
        }
    }

    // ------------------------------------------------------------------
    // queries
    // ------------------------------------------------------------------

    pub fn num_vertices(&self) -> usize {
        self.arena.len()
    }

    pub fn num_edges(&self) -> usize {
        self.adjacency.edge_count()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.arena.get(&id)
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.arena.get_mut(&id)
    }

    pub fn vertex_type(&self, id: VertexId) -> VertexType {
        self.arena[&id].vtype
    }

    pub fn phase(&self, id: VertexId) -> Phase {
        self.arena[&id].phase
    }

    pub fn set_phase(&mut self, id: VertexId, phase: Phase) {
        self.arena.get_mut(&id).unwrap().phase = phase;
    }

    pub fn set_type(&mut self, id: VertexId, vtype: VertexType) {
        self.arena.get_mut(&id).unwrap().vtype = vtype;
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.arena.keys().copied()
    }

    pub fn inputs(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.inputs.iter().copied()
    }

    pub fn outputs(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.outputs.iter().copied()
    }

    pub fn is_input(&self, v: VertexId) -> bool {
        self.inputs.contains(&v)
    }

    pub fn is_output(&self, v: VertexId) -> bool {
        self.outputs.contains(&v)
    }

    pub fn is_boundary(&self, v: VertexId) -> bool {
        self.vertex_type(v) == VertexType::Boundary
    }

    /// Neighbors of `v` as (id, edge-type) pairs, in deterministic
    /// (id-sorted) order.
    pub fn neighbors(&self, v: VertexId) -> Vec<(VertexId, EdgeType)> {
        let mut result: Vec<(VertexId, EdgeType)> = self
            .adjacency
            .edges(v)
            .map(|(a, b, w)| (if a == v { b } else { a }, *w))
            .collect();
        result.sort_by_key(|(id, _)| id.0);
        result
    }

    pub fn neighbor_ids(&self, v: VertexId) -> Vec<VertexId> {
        self.neighbors(v).into_iter().map(|(id, _)| id).collect()
    }

    pub fn num_neighbors(&self, v: VertexId) -> usize {
        self.adjacency.edges(v).count()
    }

    pub fn is_neighbor(&self, u: VertexId, v: VertexId) -> bool {
        self.adjacency.contains_edge(u, v)
    }

    pub fn get_edge_type(&self, u: VertexId, v: VertexId) -> Option<EdgeType> {
        self.adjacency.edge_weight(u, v).copied()
    }

    /// Every non-boundary vertex is Z; every Z-Z edge is Hadamard; every
    /// Z-boundary edge is simple; every boundary has exactly one neighbor.
    pub fn is_graph_like(&self) -> bool {
        for v in self.vertices() {
            let vtype = self.vertex_type(v);
            if vtype == VertexType::Boundary {
                if self.num_neighbors(v) != 1 {
                    return false;
                }
                continue;
            }
            if vtype != VertexType::Z {
                return false;
            }
            for (n, e) in self.neighbors(v) {
                match self.vertex_type(n) {
                    VertexType::Z => {
                        if e != EdgeType::Hadamard {
                            return false;
                        }
                    }
                    VertexType::Boundary => {
                        if e != EdgeType::Simple {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }
        }
        true
    }

    /// `true` when the graph is a disjoint union of direct input-output
    /// wires with no internal vertices (up to global scalar, an identity
    /// map).
    pub fn is_identity(&self) -> bool {
        self.vertices().all(|v| self.is_boundary(v))
            && self.inputs.iter().all(|i| {
                self.num_neighbors(*i) == 1
                    && self
                        .neighbors(*i)
                        .first()
                        .map(|(n, _)| self.outputs.contains(n))
                        .unwrap_or(false)
            })
    }

    /// Number of spiders whose phase is an odd multiple of π/4 (T gates).
    pub fn t_count(&self) -> usize {
        self.vertices()
            .filter(|v| {
                let vertex = &self.arena[v];
                vertex.vtype.is_spider() && vertex.phase.denominator() == 4
            })
            .count()
    }

    /// Σ deg(v)² / |V|.
    pub fn density(&self) -> f64 {
        if self.arena.is_empty() {
            return 0.0;
        }
        let sum: usize = self.vertices().map(|v| self.num_neighbors(v).pow(2)).sum();
        sum as f64 / self.arena.len() as f64
    }

    // ------------------------------------------------------------------
    // whole-graph composition
    // ------------------------------------------------------------------

    /// Sequential composition: identifies `self`'s outputs with `other`'s
    /// inputs qubit-by-qubit. Requires the qubit sets to match exactly.
    pub fn compose(&mut self, other: &ZXGraph) -> ZxResult<()> {
        let my_output_qubits: IndexSet<i32> = self.output_list.keys().copied().collect();
        let their_input_qubits: IndexSet<i32> = other.input_list.keys().copied().collect();
        if my_output_qubits != their_input_qubits {
            return Err(ZxError::IncompatibleComposition(
                "output qubits of self do not match input qubits of other".into(),
            ));
        }

        let remap = self.splice_in(other);

        // fuse self's old outputs with other's (remapped) inputs through a
        // direct simple edge per qubit, then drop both boundary vertices.
        for (&qubit, &old_output) in self.output_list.clone().iter() {
            let their_input = other.input_list[&qubit];
            let new_input = remap[&their_input];
            let (far_vertex, far_edge) = self.neighbors(old_output)[0];
            let (new_far_vertex, new_far_edge) = self.neighbors(new_input)[0];
            self.remove_vertex(old_output);
            self.remove_vertex(new_input);
            self.add_edge(far_vertex, new_far_vertex, EdgeType::concat(far_edge, new_far_edge));
        }

        self.outputs.clear();
        self.output_list.clear();
        for (&qubit, &id) in other.output_list.iter() {
            let mapped = remap[&id];
            self.outputs.insert(mapped);
            self.output_list.insert(qubit, mapped);
        }
        Ok(())
    }

    /// Parallel (disjoint) composition.
    pub fn tensor_product(&mut self, other: &ZXGraph) {
        let qubit_shift = self
            .input_list
            .keys()
            .chain(self.output_list.keys())
            .copied()
            .max()
            .map(|q| q + 1)
            .unwrap_or(0);

        let remap = self.splice_in(other);

        for (&qubit, &id) in other.input_list.iter() {
            let mapped = remap[&id];
            self.arena.get_mut(&mapped).unwrap().qubit = qubit + qubit_shift;
            self.inputs.insert(mapped);
            self.input_list.insert(qubit + qubit_shift, mapped);
        }
        for (&qubit, &id) in other.output_list.iter() {
            let mapped = remap[&id];
            self.arena.get_mut(&mapped).unwrap().qubit = qubit + qubit_shift;
            self.outputs.insert(mapped);
            self.output_list.insert(qubit + qubit_shift, mapped);
        }
    }

    /// Copies every vertex/edge of `other` into `self` under fresh ids,
    /// returning the id remap. Does not touch `self`'s boundary sets.
    fn splice_in(&mut self, other: &ZXGraph) -> IndexMap<VertexId, VertexId> {
        let mut remap = IndexMap::new();
        for (&id, vertex) in other.arena.iter() {
            let new_id = self.add_vertex(vertex.vtype, vertex.phase, None);
            let new_vertex = self.arena.get_mut(&new_id).unwrap();
            new_vertex.row = vertex.row;
            new_vertex.col = vertex.col;
            remap.insert(id, new_id);
        }
        for (a, b, w) in other.adjacency.all_edges() {
            self.record_edge(remap[&a], remap[&b], *w);
        }
        remap
    }

    /// Conjugate-transpose: swaps the roles of inputs and outputs and
    /// negates every vertex's phase.
    pub fn adjoint(&mut self) {
        std::mem::swap(&mut self.inputs, &mut self.outputs);
        std::mem::swap(&mut self.input_list, &mut self.output_list);
        for vertex in self.arena.values_mut() {
            vertex.phase = -vertex.phase;
        }
    }

    /// Promotes an internal vertex's scratch `qubit` field into a genuine
    /// new output boundary connected to it.
    pub fn lift_qubit(&mut self, v: VertexId, qubit: i32) -> ZxResult<VertexId> {
        let out = self.add_output(qubit, None)?;
        self.add_edge(v, out, EdgeType::Simple);
        Ok(out)
    }

    /// Structural equality: identical id -> (type, phase, neighbor-set)
    /// correspondence, ignoring `row`/`col` layout coordinates and
    /// arena/adjacency iteration order.
    pub fn structurally_eq(&self, other: &ZXGraph) -> bool {
        if self.arena.len() != other.arena.len() {
            return false;
        }
        for (id, vertex) in self.arena.iter() {
            let Some(other_vertex) = other.arena.get(id) else { return false };
            if vertex.vtype != other_vertex.vtype || vertex.phase != other_vertex.phase {
                return false;
            }
            let mut mine = self.neighbors(*id);
            let mut theirs = other.neighbors(*id);
            mine.sort_by_key(|(n, e)| (n.0, format!("{:?}", e)));
            theirs.sort_by_key(|(n, e)| (n.0, format!("{:?}", e)));
            if mine != theirs {
                return false;
            }
        }
        self.inputs == other.inputs && self.outputs == other.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z(g: &mut ZXGraph, phase: Phase) -> VertexId {
        g.add_vertex(VertexType::Z, phase, None)
    }
    fn x(g: &mut ZXGraph, phase: Phase) -> VertexId {
        g.add_vertex(VertexType::X, phase, None)
    }
    fn h(g: &mut ZXGraph) -> VertexId {
        g.add_vertex(VertexType::H, Phase::ZERO, None)
    }

    #[test]
    fn simple_simple_opposite_color_cancels() {
        let mut g = ZXGraph::new();
        let u = z(&mut g, Phase::ZERO);
        let v = x(&mut g, Phase::ZERO);
        g.add_edge(u, v, EdgeType::Simple);
        g.add_edge(u, v, EdgeType::Simple);
        assert!(!g.is_neighbor(u, v));
    }

    #[test]
    fn simple_then_hadamard_opposite_color_keeps_hadamard() {
        let mut g = ZXGraph::new();
        let u = z(&mut g, Phase::ZERO);
        let v = x(&mut g, Phase::ZERO);
        g.add_edge(u, v, EdgeType::Simple);
        g.add_edge(u, v, EdgeType::Hadamard);
        assert_eq!(g.get_edge_type(u, v), Some(EdgeType::Hadamard));
    }

    #[test]
    fn hadamard_hadamard_same_color_cancels() {
        let mut g = ZXGraph::new();
        let u = z(&mut g, Phase::ZERO);
        let v = z(&mut g, Phase::ZERO);
        g.add_edge(u, v, EdgeType::Hadamard);
        g.add_edge(u, v, EdgeType::Hadamard);
        assert!(!g.is_neighbor(u, v));
    }

    #[test]
    fn simple_then_hadamard_same_color_induces_pi() {
        let mut g = ZXGraph::new();
        let u = z(&mut g, Phase::ZERO);
        let v = z(&mut g, Phase::ZERO);
        g.add_edge(u, v, EdgeType::Simple);
        g.add_edge(u, v, EdgeType::Hadamard);
        assert!(!g.is_neighbor(u, v));
        assert_eq!(g.phase(u), Phase::PI);
    }

    #[test]
    fn self_loop_hadamard_adds_pi() {
        let mut g = ZXGraph::new();
        let v = z(&mut g, Phase::ZERO);
        g.add_edge(v, v, EdgeType::Hadamard);
        assert_eq!(g.phase(v), Phase::PI);
        assert_eq!(g.num_neighbors(v), 0);
    }

    #[test]
    fn boundary_has_at_most_one_neighbor() {
        let mut g = ZXGraph::new();
        let b = g.add_input(0, None).unwrap();
        let v1 = z(&mut g, Phase::ZERO);
        let v2 = z(&mut g, Phase::ZERO);
        g.add_edge(b, v1, EdgeType::Simple);
        assert!(g.try_add_edge(b, v2, EdgeType::Simple).is_err());
    }

    #[test]
    fn edge_count_matches_half_degree_sum() {
        let mut g = ZXGraph::new();
        let u = z(&mut g, Phase::ZERO);
        let v = z(&mut g, Phase::ZERO);
        let w = x(&mut g, Phase::ZERO);
        g.add_edge(u, v, EdgeType::Hadamard);
        g.add_edge(v, w, EdgeType::Simple);
        let half_degree_sum: usize = g.vertices().map(|id| g.num_neighbors(id)).sum::<usize>() / 2;
        assert_eq!(g.num_edges(), half_degree_sum);
    }

    #[test]
    fn remove_vertex_erases_incident_edges() {
        let mut g = ZXGraph::new();
        let u = z(&mut g, Phase::ZERO);
        let v = z(&mut g, Phase::ZERO);
        g.add_edge(u, v, EdgeType::Hadamard);
        g.remove_vertex(v);
        assert_eq!(g.num_neighbors(u), 0);
        assert_eq!(g.num_vertices(), 1);
    }

    #[test]
    fn is_identity_on_straight_through_wire() {
        let mut g = ZXGraph::new();
        let i = g.add_input(0, None).unwrap();
        let o = g.add_output(0, None).unwrap();
        g.add_edge(i, o, EdgeType::Simple);
        assert!(g.is_identity());
    }

    #[test]
    fn second_hbox_edge_subdivides_without_leaving_a_stale_edge() {
        let mut g = ZXGraph::new();
        let u = h(&mut g);
        let v = z(&mut g, Phase::ZERO);
        g.add_edge(u, v, EdgeType::Simple);
        assert_eq!(g.num_neighbors(u), 1);
        assert_eq!(g.num_neighbors(v), 1);

        g.add_edge(u, v, EdgeType::Hadamard);
        // the direct u-v edge is replaced by u-mid-v, not left alongside it
        assert!(!g.is_neighbor(u, v));
        assert_eq!(g.num_neighbors(u), 1);
        assert_eq!(g.num_neighbors(v), 1);
        assert_eq!(g.num_vertices(), 3);
    }
}
