//! Unitary matrices for the standard gate set.
//!
//! Two-qubit matrices use the local basis index `b0 + 2·b1`, where `b0` is
//! the bit of the gate's first qubit operand.

use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

use qlens_ir::StandardGate;

pub type Matrix2 = [[Complex64; 2]; 2];
pub type Matrix4 = [[Complex64; 4]; 4];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// How a gate acts on the state vector.
#[derive(Debug, Clone, Copy)]
pub enum GateAction {
    /// A single-qubit unitary on the last operand, controlled by all
    /// preceding operands.
    Controlled { controls: usize, matrix: Matrix2 },
    /// A two-qubit unitary on the last two operands, controlled by all
    /// preceding operands.
    TwoQubit { controls: usize, matrix: Matrix4 },
}

pub fn pauli_x() -> Matrix2 {
    [[ZERO, ONE], [ONE, ZERO]]
}

pub fn pauli_y() -> Matrix2 {
    [[ZERO, -I], [I, ZERO]]
}

pub fn pauli_z() -> Matrix2 {
    [[ONE, ZERO], [ZERO, -ONE]]
}

fn diag(a: Complex64, b: Complex64) -> Matrix2 {
    [[a, ZERO], [ZERO, b]]
}

fn phase(theta: f64) -> Complex64 {
    Complex64::from_polar(1.0, theta)
}

fn rx(theta: f64) -> Matrix2 {
    let c = ONE * (theta / 2.0).cos();
    let s = -I * (theta / 2.0).sin();
    [[c, s], [s, c]]
}

fn ry(theta: f64) -> Matrix2 {
    let c = ONE * (theta / 2.0).cos();
    let s = ONE * (theta / 2.0).sin();
    [[c, -s], [s, c]]
}

fn rz(theta: f64) -> Matrix2 {
    diag(phase(-theta / 2.0), phase(theta / 2.0))
}

fn u(theta: f64, phi: f64, lambda: f64) -> Matrix2 {
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    [
        [ONE * c, -phase(lambda) * s],
        [phase(phi) * s, phase(phi + lambda) * c],
    ]
}

fn hadamard() -> Matrix2 {
    let h = ONE * FRAC_1_SQRT_2;
    [[h, h], [h, -h]]
}

fn sqrt_x(sign: f64) -> Matrix2 {
    let a = Complex64::new(0.5, 0.5 * sign);
    let b = Complex64::new(0.5, -0.5 * sign);
    [[a, b], [b, a]]
}

fn swap() -> Matrix4 {
    let mut m = [[ZERO; 4]; 4];
    m[0][0] = ONE;
    m[1][2] = ONE;
    m[2][1] = ONE;
    m[3][3] = ONE;
    m
}

fn iswap() -> Matrix4 {
    let mut m = [[ZERO; 4]; 4];
    m[0][0] = ONE;
    m[1][2] = I;
    m[2][1] = I;
    m[3][3] = ONE;
    m
}

/// `exp(-iθ/2 P⊗P)` for a Pauli `P`, i.e. `cos(θ/2)·I - i·sin(θ/2)·P⊗P`.
fn pauli_rotation(theta: f64, pauli: &Matrix2) -> Matrix4 {
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    let mut m = [[ZERO; 4]; 4];
    for (row, m_row) in m.iter_mut().enumerate() {
        for (col, entry) in m_row.iter_mut().enumerate() {
            let pp = pauli[row & 1][col & 1] * pauli[row >> 1][col >> 1];
            let identity = if row == col { ONE * c } else { ZERO };
            *entry = identity - I * s * pp;
        }
    }
    m
}

/// Single-qubit matrix of an uncontrolled single-qubit gate.
pub fn single_qubit_matrix(gate: &StandardGate) -> Option<Matrix2> {
    let m = match *gate {
        StandardGate::I => diag(ONE, ONE),
        StandardGate::X => pauli_x(),
        StandardGate::Y => pauli_y(),
        StandardGate::Z => pauli_z(),
        StandardGate::H => hadamard(),
        StandardGate::S => diag(ONE, I),
        StandardGate::Sdg => diag(ONE, -I),
        StandardGate::T => diag(ONE, phase(PI / 4.0)),
        StandardGate::Tdg => diag(ONE, phase(-PI / 4.0)),
        StandardGate::SX => sqrt_x(1.0),
        StandardGate::SXdg => sqrt_x(-1.0),
        StandardGate::Rx(t) => rx(t),
        StandardGate::Ry(t) => ry(t),
        StandardGate::Rz(t) => rz(t),
        StandardGate::P(t) => diag(ONE, phase(t)),
        StandardGate::U(t, p, l) => u(t, p, l),
        _ => return None,
    };
    Some(m)
}

/// Action of any standard gate.
pub fn gate_action(gate: &StandardGate) -> GateAction {
    let controlled = |controls, matrix| GateAction::Controlled { controls, matrix };
    match *gate {
        StandardGate::CX => controlled(1, pauli_x()),
        StandardGate::CY => controlled(1, pauli_y()),
        StandardGate::CZ => controlled(1, pauli_z()),
        StandardGate::CH => controlled(1, hadamard()),
        StandardGate::CRx(t) => controlled(1, rx(t)),
        StandardGate::CRy(t) => controlled(1, ry(t)),
        StandardGate::CRz(t) => controlled(1, rz(t)),
        StandardGate::CP(t) => controlled(1, diag(ONE, phase(t))),
        StandardGate::CU(t, p, l) => controlled(1, u(t, p, l)),
        StandardGate::CCX => controlled(2, pauli_x()),
        StandardGate::Swap => GateAction::TwoQubit {
            controls: 0,
            matrix: swap(),
        },
        StandardGate::ISwap => GateAction::TwoQubit {
            controls: 0,
            matrix: iswap(),
        },
        StandardGate::RXX(t) => GateAction::TwoQubit {
            controls: 0,
            matrix: pauli_rotation(t, &pauli_x()),
        },
        StandardGate::RYY(t) => GateAction::TwoQubit {
            controls: 0,
            matrix: pauli_rotation(t, &pauli_y()),
        },
        StandardGate::RZZ(t) => GateAction::TwoQubit {
            controls: 0,
            matrix: pauli_rotation(t, &pauli_z()),
        },
        StandardGate::CSwap => GateAction::TwoQubit {
            controls: 1,
            matrix: swap(),
        },
        ref single => controlled(
            0,
            single_qubit_matrix(single).unwrap_or_else(|| diag(ONE, ONE)),
        ),
    }
}
