//! AST-to-circuit lowering.
//!
//! Declarations must precede use. Statements over whole registers are
//! broadcast element-wise; user `gate` definitions are inlined at each call
//! with their parameters substituted.

use qlens_ir::{Circuit, ClassicalCondition, ClbitId, Instruction, QubitId, StandardGate};
use rustc_hash::{FxHashMap, FxHashSet};
use std::f64::consts::PI;

use crate::ast::{GateCall, GateDef, Operand, Program, Scope, Statement, StatementKind};
use crate::error::{ParseError, ParseResult, Position};
use crate::parser::ParseLimits;

/// Include files whose gates are built in.
const KNOWN_INCLUDES: &[&str] = &["qelib1.inc", "stdgates.inc"];

pub(crate) fn lower_to_circuit(program: &Program, limits: ParseLimits) -> ParseResult<Circuit> {
    let mut lowerer = Lowerer::new(limits);
    for stmt in &program.statements {
        lowerer.lower_statement(stmt, None)?;
    }
    Ok(lowerer.circuit)
}

struct Lowerer<'a> {
    circuit: Circuit,
    /// User gates with their definition order.
    gates: FxHashMap<&'a str, (usize, &'a GateDef)>,
    opaque: FxHashSet<&'a str>,
    limits: ParseLimits,
    /// Gate expansions and instructions emitted so far.
    operations: usize,
}

impl<'a> Lowerer<'a> {
    fn new(limits: ParseLimits) -> Self {
        Self {
            circuit: Circuit::new("circuit"),
            gates: FxHashMap::default(),
            opaque: FxHashSet::default(),
            limits,
            operations: 0,
        }
    }

    fn lower_statement(
        &mut self,
        stmt: &'a Statement,
        condition: Option<&ClassicalCondition>,
    ) -> ParseResult<()> {
        let pos = stmt.pos;
        match &stmt.kind {
            StatementKind::Include(file) => {
                if KNOWN_INCLUDES.contains(&file.as_str()) {
                    Ok(())
                } else {
                    Err(ParseError::UnsupportedInclude {
                        pos,
                        file: file.clone(),
                    })
                }
            }

            StatementKind::QregDecl { name, size } => {
                self.check_fresh_name(name, pos)?;
                let required = grown(self.circuit.num_qubits(), *size);
                if required > self.limits.max_qubits {
                    return Err(ParseError::QubitLimitExceeded {
                        pos,
                        register: name.clone(),
                        required,
                        limit: self.limits.max_qubits,
                    });
                }
                self.circuit.add_qreg(name.clone(), *size)?;
                Ok(())
            }

            StatementKind::CregDecl { name, size } => {
                self.check_fresh_name(name, pos)?;
                let required = grown(self.circuit.num_clbits(), *size);
                if required > self.limits.max_clbits {
                    return Err(ParseError::ClbitLimitExceeded {
                        pos,
                        register: name.clone(),
                        required,
                        limit: self.limits.max_clbits,
                    });
                }
                self.circuit.add_creg(name.clone(), *size)?;
                Ok(())
            }

            StatementKind::GateDef(def) => self.define_gate(def, pos),

            StatementKind::Opaque { name } => {
                self.check_fresh_name(name, pos)?;
                self.opaque.insert(name.as_str());
                Ok(())
            }

            StatementKind::Gate(call) => {
                let params = call
                    .params
                    .iter()
                    .map(|p| p.eval(&Scope::default()))
                    .collect::<ParseResult<Vec<f64>>>()?;
                for args in self.broadcast(&call.qubits, &call.name, pos)? {
                    self.apply_gate(&call.name, &params, &args, pos, condition, usize::MAX)?;
                }
                Ok(())
            }

            StatementKind::Measure { qubit, bit } => {
                let qubits = self.resolve_qubits(qubit)?;
                let bits = self.resolve_clbits(bit)?;
                if qubits.len() != bits.len() {
                    return Err(ParseError::RegisterSizeMismatch {
                        pos,
                        statement: "measure".into(),
                    });
                }
                for (q, c) in qubits.into_iter().zip(bits) {
                    self.push(Instruction::measure(q, c), condition, pos)?;
                }
                Ok(())
            }

            StatementKind::Reset { qubits } => {
                for operand in qubits {
                    for q in self.resolve_qubits(operand)? {
                        self.push(Instruction::reset(q), condition, pos)?;
                    }
                }
                Ok(())
            }

            StatementKind::Barrier { qubits } => {
                let targets: Vec<QubitId> = if qubits.is_empty() {
                    self.circuit.qubits().iter().map(|q| q.id).collect()
                } else {
                    let mut seen = FxHashSet::default();
                    let mut targets = vec![];
                    for operand in qubits {
                        for q in self.resolve_qubits(operand)? {
                            if seen.insert(q) {
                                targets.push(q);
                            }
                        }
                    }
                    targets
                };
                if !targets.is_empty() {
                    self.push(Instruction::barrier(targets), condition, pos)?;
                }
                Ok(())
            }

            StatementKind::If {
                register,
                value,
                body,
            } => {
                if condition.is_some() {
                    return Err(ParseError::Unsupported {
                        pos,
                        feature: "nested 'if'".into(),
                    });
                }
                if self.circuit.creg(register).is_none() {
                    return Err(ParseError::UndefinedRegister {
                        pos,
                        name: register.clone(),
                    });
                }
                match body.kind {
                    StatementKind::Gate(_)
                    | StatementKind::Measure { .. }
                    | StatementKind::Reset { .. } => {
                        let cond = ClassicalCondition::new(register.clone(), *value);
                        self.lower_statement(body, Some(&cond))
                    }
                    _ => Err(ParseError::Unsupported {
                        pos: body.pos,
                        feature: "this statement inside 'if'".into(),
                    }),
                }
            }
        }
    }

    fn check_fresh_name(&self, name: &str, pos: Position) -> ParseResult<()> {
        let taken = self.circuit.qreg(name).is_some()
            || self.circuit.creg(name).is_some()
            || self.gates.contains_key(name)
            || self.opaque.contains(name);
        if taken {
            Err(ParseError::DuplicateDeclaration {
                pos,
                name: name.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate a definition body and record it for later expansion.
    fn define_gate(&mut self, def: &'a GateDef, pos: Position) -> ParseResult<()> {
        self.check_fresh_name(&def.name, pos)?;

        for stmt in &def.body {
            match &stmt.kind {
                StatementKind::Gate(call) => {
                    let known = self.gates.contains_key(call.name.as_str())
                        || builtin_signature(&call.name).is_some();
                    if !known {
                        return Err(ParseError::UnknownGate {
                            pos: stmt.pos,
                            name: call.name.clone(),
                        });
                    }
                    for operand in &call.qubits {
                        Self::check_gate_argument(def, operand)?;
                    }
                }
                StatementKind::Barrier { qubits } => {
                    for operand in qubits {
                        Self::check_gate_argument(def, operand)?;
                    }
                }
                _ => {
                    return Err(ParseError::Unsupported {
                        pos: stmt.pos,
                        feature: format!("this statement inside gate '{}'", def.name),
                    });
                }
            }
        }

        let ordinal = self.gates.len();
        self.gates.insert(def.name.as_str(), (ordinal, def));
        Ok(())
    }

    fn check_gate_argument(def: &GateDef, operand: &Operand) -> ParseResult<()> {
        if operand.index.is_some() || !def.qubits.contains(&operand.register) {
            return Err(ParseError::InvalidOperands {
                pos: operand.pos,
                statement: def.name.clone(),
                message: format!(
                    "'{}' is not an argument of the gate definition",
                    operand.register
                ),
            });
        }
        Ok(())
    }

    /// Apply a gate by name to concrete qubits.
    ///
    /// Only user gates defined before `visible` are considered, so a body
    /// that calls a built-in of the same name as its own gate resolves to the
    /// built-in.
    fn apply_gate(
        &mut self,
        name: &str,
        params: &[f64],
        args: &[QubitId],
        pos: Position,
        condition: Option<&ClassicalCondition>,
        visible: usize,
    ) -> ParseResult<()> {
        if let Some(&(ordinal, def)) = self.gates.get(name) {
            if ordinal < visible {
                check_counts(
                    name,
                    pos,
                    (def.params.len(), params.len()),
                    (def.qubits.len(), args.len()),
                )?;
                return self.expand_user_gate(ordinal, def, params, args, pos, condition);
            }
        }

        if let Some((num_params, num_qubits)) = builtin_signature(name) {
            check_counts(name, pos, (num_params, params.len()), (num_qubits, args.len()))?;
            for (gate, operands) in builtin_gates(name, params) {
                let qubits = operands.iter().map(|&i| args[i]);
                self.push(Instruction::gate(gate, qubits), condition, pos)?;
            }
            return Ok(());
        }

        if self.opaque.contains(name) {
            return Err(ParseError::Unsupported {
                pos,
                feature: format!("opaque gate '{name}'"),
            });
        }

        Err(ParseError::UnknownGate {
            pos,
            name: name.to_string(),
        })
    }

    fn expand_user_gate(
        &mut self,
        ordinal: usize,
        def: &'a GateDef,
        params: &[f64],
        args: &[QubitId],
        call_pos: Position,
        condition: Option<&ClassicalCondition>,
    ) -> ParseResult<()> {
        self.charge(call_pos)?;
        let scope: Scope = def
            .params
            .iter()
            .cloned()
            .zip(params.iter().copied())
            .collect();
        let binding: FxHashMap<&str, QubitId> = def
            .qubits
            .iter()
            .map(String::as_str)
            .zip(args.iter().copied())
            .collect();
        let bind = |operand: &Operand| -> ParseResult<QubitId> {
            binding
                .get(operand.register.as_str())
                .copied()
                .ok_or_else(|| ParseError::InvalidOperands {
                    pos: operand.pos,
                    statement: def.name.clone(),
                    message: format!("'{}' is not bound", operand.register),
                })
        };

        for stmt in &def.body {
            match &stmt.kind {
                StatementKind::Gate(GateCall {
                    name,
                    params: exprs,
                    qubits,
                }) => {
                    let values = exprs
                        .iter()
                        .map(|e| e.eval(&scope))
                        .collect::<ParseResult<Vec<f64>>>()?;
                    let inner = qubits.iter().map(&bind).collect::<ParseResult<Vec<_>>>()?;
                    self.apply_gate(name, &values, &inner, call_pos, condition, ordinal)?;
                }
                StatementKind::Barrier { qubits } => {
                    let inner = qubits.iter().map(&bind).collect::<ParseResult<Vec<_>>>()?;
                    self.push(Instruction::barrier(inner), condition, call_pos)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Expand register operands into per-element argument lists.
    fn broadcast(
        &self,
        operands: &[Operand],
        statement: &str,
        pos: Position,
    ) -> ParseResult<Vec<Vec<QubitId>>> {
        let resolved = operands
            .iter()
            .map(|op| Ok((self.resolve_qubits(op)?, op.index.is_none())))
            .collect::<ParseResult<Vec<_>>>()?;

        let mut width: Option<usize> = None;
        for (ids, whole) in &resolved {
            if *whole {
                match width {
                    Some(w) if w != ids.len() => {
                        return Err(ParseError::RegisterSizeMismatch {
                            pos,
                            statement: statement.to_string(),
                        });
                    }
                    _ => width = Some(ids.len()),
                }
            }
        }

        let rows = width.unwrap_or(1);
        Ok((0..rows)
            .map(|i| {
                resolved
                    .iter()
                    .map(|(ids, whole)| if *whole { ids[i] } else { ids[0] })
                    .collect()
            })
            .collect())
    }

    fn resolve_qubits(&self, operand: &Operand) -> ParseResult<Vec<QubitId>> {
        let reg = self
            .circuit
            .qreg(&operand.register)
            .ok_or_else(|| ParseError::UndefinedRegister {
                pos: operand.pos,
                name: operand.register.clone(),
            })?;
        let ids = select(operand, reg.start, reg.size)?;
        Ok(ids.into_iter().map(QubitId).collect())
    }

    fn resolve_clbits(&self, operand: &Operand) -> ParseResult<Vec<ClbitId>> {
        let reg = self
            .circuit
            .creg(&operand.register)
            .ok_or_else(|| ParseError::UndefinedRegister {
                pos: operand.pos,
                name: operand.register.clone(),
            })?;
        let ids = select(operand, reg.start, reg.size)?;
        Ok(ids.into_iter().map(ClbitId).collect())
    }

    fn push(
        &mut self,
        instruction: Instruction,
        condition: Option<&ClassicalCondition>,
        pos: Position,
    ) -> ParseResult<()> {
        self.charge(pos)?;
        let statement = instruction.name().to_string();
        let instruction = match condition {
            Some(cond) => instruction.with_condition(cond.clone()),
            None => instruction,
        };
        self.circuit
            .push(instruction)
            .map_err(|e| ParseError::InvalidOperands {
                pos,
                statement,
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Count one unit of lowering work against the operation budget.
    fn charge(&mut self, pos: Position) -> ParseResult<()> {
        self.operations += 1;
        if self.operations > self.limits.max_operations {
            return Err(ParseError::OperationLimitExceeded {
                pos,
                limit: self.limits.max_operations,
            });
        }
        Ok(())
    }
}

/// Bit count after adding a register of `size` to `current` bits.
fn grown(current: usize, size: u32) -> usize {
    current.saturating_add(usize::try_from(size).unwrap_or(usize::MAX))
}

/// Ids addressed by an operand within a register of `size` starting at `start`.
fn select(operand: &Operand, start: u32, size: u32) -> ParseResult<Vec<u32>> {
    match operand.index {
        Some(index) if index >= size => Err(ParseError::IndexOutOfBounds {
            pos: operand.pos,
            register: operand.register.clone(),
            index,
            size,
        }),
        Some(index) => Ok(vec![start + index]),
        None => Ok((start..start + size).collect()),
    }
}

fn check_counts(
    name: &str,
    pos: Position,
    (expected_params, got_params): (usize, usize),
    (expected_qubits, got_qubits): (usize, usize),
) -> ParseResult<()> {
    if expected_params != got_params {
        return Err(ParseError::WrongParameterCount {
            pos,
            gate: name.to_string(),
            expected: expected_params,
            got: got_params,
        });
    }
    if expected_qubits != got_qubits {
        return Err(ParseError::WrongQubitCount {
            pos,
            gate: name.to_string(),
            expected: expected_qubits,
            got: got_qubits,
        });
    }
    Ok(())
}

/// `(parameters, qubits)` of a built-in gate.
fn builtin_signature(name: &str) -> Option<(usize, usize)> {
    let signature = match name {
        "id" | "i" | "x" | "y" | "z" | "h" | "s" | "sdg" | "t" | "tdg" | "sx" | "sxdg" => (0, 1),
        "u0" | "rx" | "ry" | "rz" | "p" | "phase" | "u1" => (1, 1),
        "u2" => (2, 1),
        "U" | "u" | "u3" => (3, 1),
        "CX" | "cx" | "cnot" | "cy" | "cz" | "ch" | "swap" | "iswap" => (0, 2),
        "crx" | "cry" | "crz" | "cp" | "cphase" | "cu1" | "rxx" | "ryy" | "rzz" => (1, 2),
        "cu3" => (3, 2),
        "cu" => (4, 2),
        "ccx" | "toffoli" | "cswap" | "fredkin" => (0, 3),
        _ => return None,
    };
    Some(signature)
}

const ONE: &[usize] = &[0];
const TWO: &[usize] = &[0, 1];
const THREE: &[usize] = &[0, 1, 2];

/// Gates implementing a built-in, with operand positions. Arity has already
/// been checked against [`builtin_signature`].
fn builtin_gates(name: &str, p: &[f64]) -> Vec<(StandardGate, &'static [usize])> {
    let gate = match name {
        "id" | "i" | "u0" => StandardGate::I,
        "x" => StandardGate::X,
        "y" => StandardGate::Y,
        "z" => StandardGate::Z,
        "h" => StandardGate::H,
        "s" => StandardGate::S,
        "sdg" => StandardGate::Sdg,
        "t" => StandardGate::T,
        "tdg" => StandardGate::Tdg,
        "sx" => StandardGate::SX,
        "sxdg" => StandardGate::SXdg,
        "rx" => StandardGate::Rx(p[0]),
        "ry" => StandardGate::Ry(p[0]),
        "rz" => StandardGate::Rz(p[0]),
        "p" | "phase" | "u1" => StandardGate::P(p[0]),
        "u2" => StandardGate::U(PI / 2.0, p[0], p[1]),
        "U" | "u" | "u3" => StandardGate::U(p[0], p[1], p[2]),
        "CX" | "cx" | "cnot" => StandardGate::CX,
        "cy" => StandardGate::CY,
        "cz" => StandardGate::CZ,
        "ch" => StandardGate::CH,
        "swap" => StandardGate::Swap,
        "iswap" => StandardGate::ISwap,
        "crx" => StandardGate::CRx(p[0]),
        "cry" => StandardGate::CRy(p[0]),
        "crz" => StandardGate::CRz(p[0]),
        "cp" | "cphase" | "cu1" => StandardGate::CP(p[0]),
        "rxx" => StandardGate::RXX(p[0]),
        "ryy" => StandardGate::RYY(p[0]),
        "rzz" => StandardGate::RZZ(p[0]),
        "cu3" => StandardGate::CU(p[0], p[1], p[2]),
        // cu(θ, φ, λ, γ) adds a phase γ on the control.
        "cu" => {
            return vec![
                (StandardGate::CU(p[0], p[1], p[2]), TWO),
                (StandardGate::P(p[3]), ONE),
            ];
        }
        "ccx" | "toffoli" => StandardGate::CCX,
        "cswap" | "fredkin" => StandardGate::CSwap,
        _ => return vec![],
    };
    let operands = match gate.num_qubits() {
        1 => ONE,
        2 => TWO,
        _ => THREE,
    };
    vec![(gate, operands)]
}
