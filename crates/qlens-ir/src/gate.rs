//! Gate set understood by the IR and the state-vector engine.
//!
//! Angles are stored as concrete radians. Symbolic parameters only exist in
//! the parser's AST and are resolved before a gate reaches a [`Circuit`].
//!
//! [`Circuit`]: crate::Circuit

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// A gate with known unitary semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit fixed gates
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
    /// Hadamard.
    H,
    /// S = sqrt(Z).
    S,
    /// S-dagger.
    Sdg,
    /// T = fourth root of Z.
    T,
    /// T-dagger.
    Tdg,
    /// sqrt(X).
    SX,
    /// sqrt(X)-dagger.
    SXdg,

    // Single-qubit parameterized gates
    /// Rotation about X.
    Rx(f64),
    /// Rotation about Y.
    Ry(f64),
    /// Rotation about Z.
    Rz(f64),
    /// Phase gate diag(1, e^{iλ}).
    P(f64),
    /// Generic single-qubit gate U(θ, φ, λ).
    U(f64, f64, f64),

    // Two-qubit gates, control first
    /// Controlled-X.
    CX,
    /// Controlled-Y.
    CY,
    /// Controlled-Z.
    CZ,
    /// Controlled-Hadamard.
    CH,
    /// SWAP.
    Swap,
    /// iSWAP.
    ISwap,
    /// Controlled Rx.
    CRx(f64),
    /// Controlled Ry.
    CRy(f64),
    /// Controlled Rz.
    CRz(f64),
    /// Controlled phase.
    CP(f64),
    /// Controlled U(θ, φ, λ).
    CU(f64, f64, f64),
    /// exp(-iθ/2 X⊗X).
    RXX(f64),
    /// exp(-iθ/2 Y⊗Y).
    RYY(f64),
    /// exp(-iθ/2 Z⊗Z).
    RZZ(f64),

    // Three-qubit gates
    /// Toffoli.
    CCX,
    /// Fredkin.
    CSwap,
}

impl StandardGate {
    /// Lower-case OpenQASM name of the gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(..) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::ISwap => "iswap",
            StandardGate::CRx(_) => "crx",
            StandardGate::CRy(_) => "cry",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cp",
            StandardGate::CU(..) => "cu",
            StandardGate::RXX(_) => "rxx",
            StandardGate::RYY(_) => "ryy",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Number of qubit operands.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        match self {
            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::ISwap
            | StandardGate::CRx(_)
            | StandardGate::CRy(_)
            | StandardGate::CRz(_)
            | StandardGate::CP(_)
            | StandardGate::CU(..)
            | StandardGate::RXX(_)
            | StandardGate::RYY(_)
            | StandardGate::RZZ(_) => 2,
            StandardGate::CCX | StandardGate::CSwap => 3,
            _ => 1,
        }
    }

    /// Angle parameters in declaration order.
    pub fn params(&self) -> Vec<f64> {
        match *self {
            StandardGate::Rx(a)
            | StandardGate::Ry(a)
            | StandardGate::Rz(a)
            | StandardGate::P(a)
            | StandardGate::CRx(a)
            | StandardGate::CRy(a)
            | StandardGate::CRz(a)
            | StandardGate::CP(a)
            | StandardGate::RXX(a)
            | StandardGate::RYY(a)
            | StandardGate::RZZ(a) => vec![a],
            StandardGate::U(t, p, l) | StandardGate::CU(t, p, l) => vec![t, p, l],
            _ => vec![],
        }
    }

    /// True for gates equal to their own inverse.
    pub fn is_self_inverse(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::X
                | StandardGate::Y
                | StandardGate::Z
                | StandardGate::H
                | StandardGate::CX
                | StandardGate::CY
                | StandardGate::CZ
                | StandardGate::CH
                | StandardGate::Swap
                | StandardGate::CCX
                | StandardGate::CSwap
        )
    }

    /// The inverse gate, exact up to global phase.
    ///
    /// Returns `None` when the inverse is not part of the gate set (iSWAP).
    pub fn inverse(&self) -> Option<StandardGate> {
        let inv = match *self {
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::SX => StandardGate::SXdg,
            StandardGate::SXdg => StandardGate::SX,
            StandardGate::ISwap => return None,
            StandardGate::Rx(a) => StandardGate::Rx(-a),
            StandardGate::Ry(a) => StandardGate::Ry(-a),
            StandardGate::Rz(a) => StandardGate::Rz(-a),
            StandardGate::P(a) => StandardGate::P(-a),
            StandardGate::U(t, p, l) => StandardGate::U(-t, -l, -p),
            StandardGate::CRx(a) => StandardGate::CRx(-a),
            StandardGate::CRy(a) => StandardGate::CRy(-a),
            StandardGate::CRz(a) => StandardGate::CRz(-a),
            StandardGate::CP(a) => StandardGate::CP(-a),
            StandardGate::CU(t, p, l) => StandardGate::CU(-t, -l, -p),
            StandardGate::RXX(a) => StandardGate::RXX(-a),
            StandardGate::RYY(a) => StandardGate::RYY(-a),
            StandardGate::RZZ(a) => StandardGate::RZZ(-a),
            g => g,
        };
        Some(inv)
    }

    /// True when the gate acts as the identity (up to global phase).
    ///
    /// Uncontrolled rotations by 2π equal `-I`, a global phase. Controlled
    /// rotations pick up a relative phase at 2π and only vanish at 4π.
    pub fn is_identity(&self, tolerance: f64) -> bool {
        let near = |a: f64, period: f64| {
            let r = a.rem_euclid(period);
            r < tolerance || period - r < tolerance
        };
        match *self {
            StandardGate::I => true,
            StandardGate::Rx(a) | StandardGate::Ry(a) => near(a, 2.0 * PI),
            StandardGate::Rz(a) | StandardGate::P(a) => near(a, 2.0 * PI),
            StandardGate::RXX(a) | StandardGate::RYY(a) | StandardGate::RZZ(a) => {
                near(a, 2.0 * PI)
            }
            StandardGate::CRx(a) | StandardGate::CRy(a) | StandardGate::CRz(a) => {
                near(a, 4.0 * PI)
            }
            StandardGate::CP(a) => near(a, 2.0 * PI),
            _ => false,
        }
    }

    /// Short human-readable label, e.g. `H` or `Rx(π/2)`.
    pub fn label(&self) -> String {
        let params = self.params();
        let base = self.name().to_uppercase();
        if params.is_empty() {
            base
        } else {
            let rendered: Vec<String> = params.iter().map(|&p| format_angle(p)).collect();
            format!("{base}({})", rendered.join(","))
        }
    }
}

impl fmt::Display for StandardGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Format an angle, recognizing common fractions of π.
pub fn format_angle(value: f64) -> String {
    const EPS: f64 = 1e-10;
    let named = [
        (PI, "π"),
        (PI / 2.0, "π/2"),
        (PI / 4.0, "π/4"),
        (PI / 8.0, "π/8"),
        (2.0 * PI, "2π"),
    ];
    for (v, s) in named {
        if (value - v).abs() < EPS {
            return s.to_string();
        }
        if (value + v).abs() < EPS {
            return format!("-{s}");
        }
    }
    if value.abs() < EPS {
        return "0".to_string();
    }
    format!("{value:.3}")
}

/// Classical condition attached to a gate, `if (creg == value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalCondition {
    pub register: String,
    pub value: u64,
}

impl ClassicalCondition {
    pub fn new(register: impl Into<String>, value: u64) -> Self {
        Self {
            register: register.into(),
            value,
        }
    }
}
