//! DAG-based circuit representation.
//!
//! Every wire (qubit or classical bit) runs from an `In` node to an `Out`
//! node; operations are spliced into the wires they touch. The graph is a
//! [`StableDiGraph`] so removing an operation never invalidates the indices
//! of other nodes, which lets rewrite passes hold on to node handles.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex as PetNodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// Identifier of a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    Qubit(QubitId),
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq)]
pub enum DagNode {
    /// Start of a wire.
    In(WireId),
    /// End of a wire.
    Out(WireId),
    /// An operation. `seq` records insertion order and breaks ties when
    /// ordering independent operations.
    Op { seq: u64, instruction: Instruction },
}

impl DagNode {
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op { instruction, .. } => Some(instruction),
            _ => None,
        }
    }

    #[inline]
    fn instruction_mut(&mut self) -> Option<&mut Instruction> {
        match self {
            DagNode::Op { instruction, .. } => Some(instruction),
            _ => None,
        }
    }
}

/// Edge payload: the wire it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DagEdge {
    pub wire: WireId,
}

/// Wire-connected operation graph.
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    graph: StableDiGraph<DagNode, DagEdge, u32>,
    inputs: FxHashMap<WireId, NodeIndex>,
    outputs: FxHashMap<WireId, NodeIndex>,
    next_seq: u64,
}

impl CircuitDag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a qubit wire. Adding an existing qubit is a no-op.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        self.add_wire(WireId::Qubit(qubit));
    }

    /// Add a classical wire. Adding an existing bit is a no-op.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        self.add_wire(WireId::Clbit(clbit));
    }

    fn add_wire(&mut self, wire: WireId) {
        if self.inputs.contains_key(&wire) {
            return;
        }
        let in_node = self.graph.add_node(DagNode::In(wire));
        let out_node = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(in_node, out_node, DagEdge { wire });
        self.inputs.insert(wire, in_node);
        self.outputs.insert(wire, out_node);
    }

    /// Append an instruction at the end of its wires.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        self.validate(&instruction)?;

        let wires: Vec<WireId> = instruction
            .qubits
            .iter()
            .map(|&q| WireId::Qubit(q))
            .chain(instruction.clbits.iter().map(|&c| WireId::Clbit(c)))
            .collect();

        let seq = self.next_seq;
        self.next_seq += 1;
        let op_node = self.graph.add_node(DagNode::Op { seq, instruction });

        for wire in wires {
            let out_node = self.outputs[&wire];
            let edge = self
                .graph
                .edges_directed(out_node, Direction::Incoming)
                .find(|e| e.weight().wire == wire)
                .map(|e| (e.id(), e.source()))
                .ok_or_else(|| IrError::InvalidDag(format!("wire {wire:?} has no output edge")))?;
            let (edge_id, prev) = edge;
            self.graph.remove_edge(edge_id);
            self.graph.add_edge(prev, op_node, DagEdge { wire });
            self.graph.add_edge(op_node, out_node, DagEdge { wire });
        }

        Ok(op_node)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(g) => Some(g.name().to_string()),
            _ => None,
        };

        if let InstructionKind::Gate(gate) = &instruction.kind {
            if gate.num_qubits() != instruction.qubits.len() {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: gate.num_qubits(),
                    got: instruction.qubits.len(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.inputs.contains_key(&WireId::Qubit(qubit)) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        for &clbit in &instruction.clbits {
            if !self.inputs.contains_key(&WireId::Clbit(clbit)) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Operations in topological order.
    ///
    /// Among operations that are ready at the same time, the one inserted
    /// first comes first, so an unmodified circuit replays in source order.
    pub fn topological_ops(&self) -> Vec<(NodeIndex, &Instruction)> {
        let mut indegree: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut ready = BinaryHeap::new();

        for node in self.graph.node_indices() {
            let deg = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .count();
            if deg == 0 {
                ready.push(Reverse((self.order_key(node), node)));
            } else {
                indegree.insert(node, deg);
            }
        }

        let mut ops = Vec::with_capacity(self.num_ops());
        while let Some(Reverse((_, node))) = ready.pop() {
            if let Some(inst) = self.graph[node].instruction() {
                ops.push((node, inst));
            }
            for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                let succ = edge.target();
                if let Some(deg) = indegree.get_mut(&succ) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(Reverse((self.order_key(succ), succ)));
                    }
                }
            }
        }
        ops
    }

    fn order_key(&self, node: NodeIndex) -> u64 {
        match &self.graph[node] {
            DagNode::Op { seq, .. } => *seq,
            _ => 0,
        }
    }

    #[inline]
    pub fn instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(DagNode::instruction)
    }

    #[inline]
    pub fn instruction_mut(&mut self, node: NodeIndex) -> Option<&mut Instruction> {
        self.graph
            .node_weight_mut(node)
            .and_then(DagNode::instruction_mut)
    }

    /// The operation that follows `node` on `wire`, if any.
    pub fn next_on_wire(&self, node: NodeIndex, wire: WireId) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .find(|e| e.weight().wire == wire)
            .map(|e| e.target())
            .filter(|&n| matches!(self.graph[n], DagNode::Op { .. }))
    }

    /// True when `a` and `b` touch exactly the same wires and `b` directly
    /// follows `a` on every one of them.
    pub fn are_adjacent(&self, a: NodeIndex, b: NodeIndex) -> bool {
        let mut wires = 0;
        for edge in self.graph.edges_directed(a, Direction::Outgoing) {
            wires += 1;
            if edge.target() != b {
                return false;
            }
        }
        wires > 0
            && self
                .graph
                .edges_directed(b, Direction::Incoming)
                .count()
                == wires
    }

    /// Remove an operation and reconnect the wires that passed through it.
    pub fn remove_op(&mut self, node: NodeIndex) -> IrResult<Instruction> {
        if self.instruction(node).is_none() {
            return Err(IrError::InvalidNode);
        }

        let incoming: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| (e.source(), e.weight().wire))
            .collect();
        let outgoing: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.target(), e.weight().wire))
            .collect();

        let Some(DagNode::Op { instruction, .. }) = self.graph.remove_node(node) else {
            return Err(IrError::InvalidNode);
        };

        for (pred, wire) in &incoming {
            let succ = outgoing
                .iter()
                .find(|(_, w)| w == wire)
                .map(|(s, _)| *s)
                .ok_or_else(|| IrError::InvalidDag(format!("wire {wire:?} has no successor")))?;
            self.graph.add_edge(*pred, succ, DagEdge { wire: *wire });
        }

        Ok(instruction)
    }

    /// Group operations into layers (moments): each operation lands in the
    /// first layer after every earlier operation on its wires.
    pub fn layers(&self) -> Vec<Vec<&Instruction>> {
        let mut layers: Vec<Vec<&Instruction>> = vec![];
        let mut wire_depth: FxHashMap<WireId, usize> = FxHashMap::default();

        for (_, inst) in self.topological_ops() {
            let wires: Vec<WireId> = Self::wires_of(inst).collect();
            let layer = wires
                .iter()
                .map(|w| wire_depth.get(w).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            if layers.len() <= layer {
                layers.resize_with(layer + 1, Vec::new);
            }
            layers[layer].push(inst);
            for w in wires {
                wire_depth.insert(w, layer + 1);
            }
        }
        layers
    }

    fn wires_of(inst: &Instruction) -> impl Iterator<Item = WireId> + '_ {
        inst.qubits
            .iter()
            .map(|&q| WireId::Qubit(q))
            .chain(inst.clbits.iter().map(|&c| WireId::Clbit(c)))
    }

    /// Circuit depth, counting every operation except barriers.
    pub fn depth(&self) -> usize {
        self.layers()
            .iter()
            .filter(|layer| layer.iter().any(|i| !i.is_barrier()))
            .count()
    }

    #[inline]
    pub fn num_ops(&self) -> usize {
        self.graph.node_count() - self.inputs.len() - self.outputs.len()
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.inputs
            .keys()
            .filter(|w| matches!(w, WireId::Qubit(_)))
            .count()
    }

    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.inputs.len() - self.num_qubits()
    }

    /// Check that every wire is a single path from its input to its output.
    pub fn verify_integrity(&self) -> IrResult<()> {
        for (&wire, &start) in &self.inputs {
            let end = self.outputs[&wire];
            let mut node = start;
            let mut steps = 0usize;
            while node != end {
                node = self
                    .graph
                    .edges_directed(node, Direction::Outgoing)
                    .find(|e| e.weight().wire == wire)
                    .map(|e| e.target())
                    .ok_or_else(|| IrError::InvalidDag(format!("wire {wire:?} is broken")))?;
                steps += 1;
                if steps > self.graph.node_count() {
                    return Err(IrError::InvalidDag(format!("wire {wire:?} loops")));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    fn bell_dag() -> (CircuitDag, NodeIndex, NodeIndex) {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));
        let h = dag
            .apply(Instruction::gate(StandardGate::H, [QubitId(0)]))
            .unwrap();
        let cx = dag
            .apply(Instruction::gate(StandardGate::CX, [QubitId(0), QubitId(1)]))
            .unwrap();
        (dag, h, cx)
    }

    #[test]
    fn test_apply_and_order() {
        let (dag, h, cx) = bell_dag();
        let order: Vec<_> = dag.topological_ops().into_iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec![h, cx]);
        assert_eq!(dag.num_ops(), 2);
        assert_eq!(dag.depth(), 2);
        dag.verify_integrity().unwrap();
    }

    #[test]
    fn test_independent_ops_keep_insertion_order() {
        let mut dag = CircuitDag::new();
        for q in 0..3 {
            dag.add_qubit(QubitId(q));
        }
        dag.apply(Instruction::gate(StandardGate::X, [QubitId(2)]))
            .unwrap();
        dag.apply(Instruction::gate(StandardGate::Y, [QubitId(0)]))
            .unwrap();
        dag.apply(Instruction::gate(StandardGate::Z, [QubitId(1)]))
            .unwrap();
        let names: Vec<_> = dag
            .topological_ops()
            .into_iter()
            .map(|(_, i)| i.name().to_string())
            .collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        assert_eq!(dag.depth(), 1);
    }

    #[test]
    fn test_remove_op_reconnects_wires() {
        let (mut dag, h, cx) = bell_dag();
        let removed = dag.remove_op(h).unwrap();
        assert_eq!(removed.name(), "h");
        assert_eq!(dag.num_ops(), 1);
        dag.verify_integrity().unwrap();
        // Node handles survive removal of other nodes.
        assert_eq!(dag.instruction(cx).map(Instruction::name), Some("cx"));
    }

    #[test]
    fn test_remove_non_op_fails() {
        let (mut dag, h, _) = bell_dag();
        dag.remove_op(h).unwrap();
        assert!(matches!(dag.remove_op(h), Err(IrError::InvalidNode)));
    }

    #[test]
    fn test_adjacency() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));
        let a = dag
            .apply(Instruction::gate(StandardGate::CX, [QubitId(0), QubitId(1)]))
            .unwrap();
        let b = dag
            .apply(Instruction::gate(StandardGate::CX, [QubitId(0), QubitId(1)]))
            .unwrap();
        let c = dag
            .apply(Instruction::gate(StandardGate::H, [QubitId(0)]))
            .unwrap();
        assert!(dag.are_adjacent(a, b));
        assert!(!dag.are_adjacent(b, c));
        assert_eq!(dag.next_on_wire(a, WireId::Qubit(QubitId(1))), Some(b));
        assert_eq!(dag.next_on_wire(c, WireId::Qubit(QubitId(0))), None);
    }

    #[test]
    fn test_validation_errors() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));

        let err = dag
            .apply(Instruction::gate(StandardGate::H, [QubitId(7)]))
            .unwrap_err();
        assert!(matches!(err, IrError::QubitNotFound { .. }));
        assert!(err.to_string().contains("gate: h"));

        let err = dag
            .apply(Instruction::gate(StandardGate::CX, [QubitId(0), QubitId(0)]))
            .unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { .. }));

        let err = dag
            .apply(Instruction::gate(StandardGate::CX, [QubitId(0)]))
            .unwrap_err();
        assert!(matches!(
            err,
            IrError::QubitCountMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));

        let err = dag
            .apply(Instruction::measure(QubitId(0), ClbitId(0)))
            .unwrap_err();
        assert!(matches!(err, IrError::ClbitNotFound { .. }));
    }

    #[test]
    fn test_layers_ignore_barrier_for_depth() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));
        dag.apply(Instruction::gate(StandardGate::H, [QubitId(0)]))
            .unwrap();
        dag.apply(Instruction::barrier([QubitId(0), QubitId(1)]))
            .unwrap();
        dag.apply(Instruction::gate(StandardGate::X, [QubitId(1)]))
            .unwrap();
        assert_eq!(dag.layers().len(), 3);
        assert_eq!(dag.depth(), 2);
    }
}
