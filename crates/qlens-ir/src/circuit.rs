//! High-level circuit builder API.

use crate::dag::{CircuitDag, NodeIndex};
use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

/// A named, contiguous block of qubits or classical bits.
///
/// `start + size` never overflows a `u32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub name: String,
    /// Id of the first element.
    pub start: u32,
    pub size: u32,
}

impl Register {
    /// Ids covered by the register, in index order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.start..self.start + self.size
    }
}

/// First id of a new register of `size` after `len` existing bits.
fn register_start(len: usize, name: &str, size: u32) -> IrResult<u32> {
    u32::try_from(len)
        .ok()
        .filter(|start| start.checked_add(size).is_some())
        .ok_or_else(|| IrError::RegisterTooLarge {
            name: name.to_string(),
            size,
        })
}

/// A quantum circuit.
///
/// Qubit ids are allocated densely from 0 in declaration order, so with
/// `qreg a[2]; qreg b[1];` the qubit `b[0]` has id 2.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    qregs: Vec<Register>,
    cregs: Vec<Register>,
    dag: CircuitDag,
}

impl Circuit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            qregs: vec![],
            cregs: vec![],
            dag: CircuitDag::new(),
        }
    }

    /// Create a circuit with anonymous qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.qubits.len() as u32);
        self.qubits.push(Qubit::new(id));
        self.dag.add_qubit(id);
        id
    }

    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.clbits.len() as u32);
        self.clbits.push(Clbit::new(id));
        self.dag.add_clbit(id);
        id
    }

    /// Declare a quantum register.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<QubitId>> {
        let name = name.into();
        if self.qregs.iter().any(|r| r.name == name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let start = register_start(self.qubits.len(), &name, size)?;
        let ids: Vec<QubitId> = (0..size)
            .map(|i| {
                let id = QubitId(start + i);
                self.qubits.push(Qubit::with_register(id, &name, i));
                self.dag.add_qubit(id);
                id
            })
            .collect();
        self.qregs.push(Register { name, start, size });
        Ok(ids)
    }

    /// Declare a classical register.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<ClbitId>> {
        let name = name.into();
        if self.cregs.iter().any(|r| r.name == name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let start = register_start(self.clbits.len(), &name, size)?;
        let ids: Vec<ClbitId> = (0..size)
            .map(|i| {
                let id = ClbitId(start + i);
                self.clbits.push(Clbit::with_register(id, &name, i));
                self.dag.add_clbit(id);
                id
            })
            .collect();
        self.cregs.push(Register { name, start, size });
        Ok(ids)
    }

    /// Append any instruction.
    pub fn push(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        self.dag.apply(instruction)
    }

    /// Append a gate.
    pub fn apply(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::gate(gate, qubits))?;
        Ok(self)
    }

    // =========================================================================
    // Common gates
    // =========================================================================

    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::H, [qubit])
    }

    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::X, [qubit])
    }

    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Y, [qubit])
    }

    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Z, [qubit])
    }

    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::S, [qubit])
    }

    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::T, [qubit])
    }

    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Rx(theta), [qubit])
    }

    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Ry(theta), [qubit])
    }

    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Rz(theta), [qubit])
    }

    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CX, [control, target])
    }

    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CZ, [control, target])
    }

    pub fn swap(&mut self, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Swap, [a, b])
    }

    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CCX, [c1, c2, target])
    }

    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::measure(qubit, clbit))?;
        Ok(self)
    }

    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::reset(qubit))?;
        Ok(self)
    }

    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    pub fn qregs(&self) -> &[Register] {
        &self.qregs
    }

    pub fn cregs(&self) -> &[Register] {
        &self.cregs
    }

    /// Look up a quantum register by name.
    pub fn qreg(&self, name: &str) -> Option<&Register> {
        self.qregs.iter().find(|r| r.name == name)
    }

    /// Look up a classical register by name.
    pub fn creg(&self, name: &str) -> Option<&Register> {
        self.cregs.iter().find(|r| r.name == name)
    }

    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    pub fn dag_mut(&mut self) -> &mut CircuitDag {
        &mut self.dag
    }

    /// Instructions in execution order.
    pub fn instructions(&self) -> Vec<&Instruction> {
        self.dag
            .topological_ops()
            .into_iter()
            .map(|(_, inst)| inst)
            .collect()
    }

    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Number of gate instructions (measurements and barriers excluded).
    pub fn gate_count(&self) -> usize {
        self.dag
            .topological_ops()
            .iter()
            .filter(|(_, inst)| inst.is_gate())
            .count()
    }

    // =========================================================================
    // Reference circuits
    // =========================================================================

    /// Two-qubit Bell pair (|00⟩ + |11⟩)/√2.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 0);
        circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
        Ok(circuit)
    }

    /// n-qubit GHZ state.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size(format!("ghz_{n}"), n, 0);
        if n > 0 {
            circuit.h(QubitId(0))?;
        }
        for i in 1..n {
            circuit.cx(QubitId(0), QubitId(i))?;
        }
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell() {
        let circuit = Circuit::bell().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.gate_count(), 2);
        assert_eq!(circuit.depth(), 2);
    }

    #[test]
    fn test_ghz_depth() {
        let circuit = Circuit::ghz(4).unwrap();
        assert_eq!(circuit.gate_count(), 4);
        assert_eq!(circuit.depth(), 4);
    }

    #[test]
    fn test_registers_allocate_dense_ids() {
        let mut circuit = Circuit::new("regs");
        let a = circuit.add_qreg("a", 2).unwrap();
        let b = circuit.add_qreg("b", 1).unwrap();
        let c = circuit.add_creg("c", 2).unwrap();
        assert_eq!(a, vec![QubitId(0), QubitId(1)]);
        assert_eq!(b, vec![QubitId(2)]);
        assert_eq!(c, vec![ClbitId(0), ClbitId(1)]);
        assert_eq!(circuit.qubits()[2].to_string(), "b[0]");
        assert_eq!(circuit.qreg("b").map(|r| r.start), Some(2));
    }

    #[test]
    fn test_duplicate_register() {
        let mut circuit = Circuit::new("dup");
        circuit.add_qreg("q", 1).unwrap();
        assert!(matches!(
            circuit.add_qreg("q", 2),
            Err(IrError::DuplicateRegister(name)) if name == "q"
        ));
    }

    #[test]
    fn test_instructions_in_source_order() {
        let mut circuit = Circuit::with_size("order", 2, 1);
        circuit
            .x(QubitId(1))
            .unwrap()
            .h(QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();
        let names: Vec<_> = circuit
            .instructions()
            .into_iter()
            .map(Instruction::name)
            .collect();
        assert_eq!(names, vec!["x", "h", "measure"]);
        assert_eq!(circuit.gate_count(), 2);
    }

    #[test]
    fn test_register_start_rejects_overflow() {
        assert_eq!(register_start(5, "q", 7).unwrap(), 5);
        assert_eq!(register_start(0, "q", u32::MAX).unwrap(), 0);
        assert!(matches!(
            register_start(3, "r", u32::MAX),
            Err(IrError::RegisterTooLarge { size: u32::MAX, .. })
        ));
        assert!(register_start(usize::MAX, "r", 1).is_err());
    }
}
