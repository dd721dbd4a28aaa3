// src/operations/mod.rs

//! The gate library and the operations a circuit is made of.
//!
//! [`Gate`] covers the single-qubit unitaries (fixed and parametrised).
//! [`Operation`] places gates on qubits: directly, under a control qubit, as a
//! SWAP, or as a measurement. [`GateRequest`] is the flat, serialisable shape
//! a caller on the other side of an API boundary sends; it is validated into
//! an [`Operation`] before anything touches a register.

use crate::core::QsimError;
use num_complex::Complex;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};
use std::fmt;

/// 2x2 complex matrix in row-major order.
pub type Matrix2 = [[Complex<f64>; 2]; 2];

/// A single-qubit gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Hadamard
    H,
    /// Pauli X (bit flip)
    X,
    /// Pauli Y
    Y,
    /// Pauli Z (phase flip)
    Z,
    /// Phase(π/2)
    S,
    /// Phase(-π/2)
    Sdg,
    /// Phase(π/4)
    T,
    /// Phase(-π/4)
    Tdg,
    /// Square root of X
    SqrtX,
    /// Rotation about X by θ radians
    Rx(f64),
    /// Rotation about Y by θ radians
    Ry(f64),
    /// Rotation about Z by θ radians
    Rz(f64),
    /// `diag(1, e^(iθ))`
    Phase(f64),
}

impl Gate {
    /// The unitary matrix of this gate.
    pub fn matrix(&self) -> Matrix2 {
        let one = Complex::one();
        let zero = Complex::zero();
        let i = Complex::i();
        match *self {
            Gate::H => {
                let h = Complex::new(FRAC_1_SQRT_2, 0.0);
                [[h, h], [h, -h]]
            }
            Gate::X => [[zero, one], [one, zero]],
            Gate::Y => [[zero, -i], [i, zero]],
            Gate::Z => [[one, zero], [zero, -one]],
            Gate::S => [[one, zero], [zero, i]],
            Gate::Sdg => [[one, zero], [zero, -i]],
            Gate::T => phase_matrix(FRAC_PI_4),
            Gate::Tdg => phase_matrix(-FRAC_PI_4),
            Gate::SqrtX => [
                [Complex::new(0.5, 0.5), Complex::new(0.5, -0.5)],
                [Complex::new(0.5, -0.5), Complex::new(0.5, 0.5)],
            ],
            Gate::Rx(theta) => {
                let (s, c) = (theta / 2.0).sin_cos();
                [[Complex::new(c, 0.0), Complex::new(0.0, -s)], [Complex::new(0.0, -s), Complex::new(c, 0.0)]]
            }
            Gate::Ry(theta) => {
                let (s, c) = (theta / 2.0).sin_cos();
                [[Complex::new(c, 0.0), Complex::new(-s, 0.0)], [Complex::new(s, 0.0), Complex::new(c, 0.0)]]
            }
            Gate::Rz(theta) => {
                let half = theta / 2.0;
                [[Complex::from_polar(1.0, -half), zero], [zero, Complex::from_polar(1.0, half)]]
            }
            Gate::Phase(theta) => phase_matrix(theta),
        }
    }

    /// Short symbol used in circuit diagrams.
    pub fn symbol(&self) -> &'static str {
        match self {
            Gate::H => "H",
            Gate::X => "X",
            Gate::Y => "Y",
            Gate::Z => "Z",
            Gate::S => "S",
            Gate::Sdg => "S†",
            Gate::T => "T",
            Gate::Tdg => "T†",
            Gate::SqrtX => "√X",
            Gate::Rx(_) => "Rx",
            Gate::Ry(_) => "Ry",
            Gate::Rz(_) => "Rz",
            Gate::Phase(_) => "P",
        }
    }

    /// Rejects parametrised gates whose angle is NaN or infinite.
    pub fn validate(&self) -> Result<(), QsimError> {
        match *self {
            Gate::Rx(theta) | Gate::Ry(theta) | Gate::Rz(theta) | Gate::Phase(theta) if !theta.is_finite() => Err(
                QsimError::invalid_argument(format!("{} rotation angle must be finite, got {}", self.symbol(), theta)),
            ),
            _ => Ok(()),
        }
    }
}

fn phase_matrix(theta: f64) -> Matrix2 {
    [[Complex::one(), Complex::zero()], [Complex::zero(), Complex::from_polar(1.0, theta)]]
}

/// An operation applied to a register.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Apply `gate` to `target`.
    Single { gate: Gate, target: usize },
    /// Apply `gate` to `target` on the part of the state where `control` is 1.
    /// CNOT is `Controlled { gate: X, .. }`, CZ is `Controlled { gate: Z, .. }`.
    Controlled { gate: Gate, control: usize, target: usize },
    /// Exchange two qubits.
    Swap { a: usize, b: usize },
    /// Measure `targets` (all qubits when empty) and collapse.
    Measure { targets: Vec<usize> },
}

impl Operation {
    /// Single-qubit gate on `target`.
    pub fn gate(gate: Gate, target: usize) -> Self {
        Operation::Single { gate, target }
    }

    /// CNOT with the given control and target.
    pub fn cnot(control: usize, target: usize) -> Self {
        Operation::Controlled { gate: Gate::X, control, target }
    }

    /// CZ with the given control and target.
    pub fn cz(control: usize, target: usize) -> Self {
        Operation::Controlled { gate: Gate::Z, control, target }
    }

    /// Every qubit index this operation mentions.
    pub fn involved_qubits(&self) -> Vec<usize> {
        match self {
            Operation::Single { target, .. } => vec![*target],
            Operation::Controlled { control, target, .. } => vec![*control, *target],
            Operation::Swap { a, b } => vec![*a, *b],
            Operation::Measure { targets } => targets.clone(),
        }
    }

    /// Whether this is a measurement.
    pub fn is_measurement(&self) -> bool {
        matches!(self, Operation::Measure { .. })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Single { gate, target } => match gate {
                Gate::Rx(t) | Gate::Ry(t) | Gate::Rz(t) | Gate::Phase(t) => {
                    write!(f, "{}({:.4}) q{}", gate.symbol(), t, target)
                }
                _ => write!(f, "{} q{}", gate.symbol(), target),
            },
            Operation::Controlled { gate: Gate::X, control, target } => write!(f, "CNOT q{} -> q{}", control, target),
            Operation::Controlled { gate: Gate::Z, control, target } => write!(f, "CZ q{} -> q{}", control, target),
            Operation::Controlled { gate, control, target } => {
                write!(f, "C{} q{} -> q{}", gate.symbol(), control, target)
            }
            Operation::Swap { a, b } => write!(f, "SWAP q{} q{}", a, b),
            Operation::Measure { targets } if targets.is_empty() => write!(f, "MEASURE all"),
            Operation::Measure { targets } => write!(f, "MEASURE {:?}", targets),
        }
    }
}

/// Gate identifiers accepted across the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateKind {
    H,
    X,
    Y,
    Z,
    S,
    Sdg,
    T,
    Tdg,
    SqrtX,
    Rx,
    Ry,
    Rz,
    Phase,
    Cnot,
    Cz,
    Swap,
}

impl GateKind {
    fn is_parametrised(&self) -> bool {
        matches!(self, GateKind::Rx | GateKind::Ry | GateKind::Rz | GateKind::Phase)
    }

    fn arity(&self) -> usize {
        match self {
            GateKind::Cnot | GateKind::Cz | GateKind::Swap => 2,
            _ => 1,
        }
    }
}

/// A structured gate-application request: identifier, qubit index (or
/// control/target pair) and an optional angle in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateRequest {
    pub gate: GateKind,
    pub qubits: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theta: Option<f64>,
}

impl GateRequest {
    /// Request for a fixed or parametrised single/two-qubit gate.
    pub fn new(gate: GateKind, qubits: impl Into<Vec<usize>>) -> Self {
        Self { gate, qubits: qubits.into(), theta: None }
    }

    /// Sets the rotation angle.
    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = Some(theta);
        self
    }
}

impl TryFrom<&GateRequest> for Operation {
    type Error = QsimError;

    /// Checks arity and angle presence. Index range is checked by the register.
    fn try_from(req: &GateRequest) -> Result<Self, Self::Error> {
        if req.qubits.len() != req.gate.arity() {
            return Err(QsimError::invalid_argument(format!(
                "{:?} takes {} qubit index(es), got {}",
                req.gate,
                req.gate.arity(),
                req.qubits.len()
            )));
        }
        let theta = match (req.gate.is_parametrised(), req.theta) {
            (true, Some(t)) if t.is_finite() => t,
            (true, Some(t)) => return Err(QsimError::invalid_argument(format!("rotation angle must be finite, got {}", t))),
            (true, None) => return Err(QsimError::invalid_argument(format!("{:?} requires a rotation angle", req.gate))),
            (false, _) => 0.0,
        };
        let q = &req.qubits;
        let single = |gate| Operation::Single { gate, target: q[0] };
        Ok(match req.gate {
            GateKind::H => single(Gate::H),
            GateKind::X => single(Gate::X),
            GateKind::Y => single(Gate::Y),
            GateKind::Z => single(Gate::Z),
            GateKind::S => single(Gate::S),
            GateKind::Sdg => single(Gate::Sdg),
            GateKind::T => single(Gate::T),
            GateKind::Tdg => single(Gate::Tdg),
            GateKind::SqrtX => single(Gate::SqrtX),
            GateKind::Rx => single(Gate::Rx(theta)),
            GateKind::Ry => single(Gate::Ry(theta)),
            GateKind::Rz => single(Gate::Rz(theta)),
            GateKind::Phase => single(Gate::Phase(theta)),
            GateKind::Cnot => Operation::cnot(q[0], q[1]),
            GateKind::Cz => Operation::cz(q[0], q[1]),
            GateKind::Swap => Operation::Swap { a: q[0], b: q[1] },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn is_unitary(m: &Matrix2) -> bool {
        // M† M == I
        for r in 0..2 {
            for c in 0..2 {
                let mut acc: Complex<f64> = Complex::zero();
                for k in 0..2 {
                    acc += m[k][r].conj() * m[k][c];
                }
                let expected = if r == c { Complex::one() } else { Complex::zero() };
                if (acc - expected).norm() > TOL {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn test_all_gates_unitary() {
        let gates = [
            Gate::H, Gate::X, Gate::Y, Gate::Z, Gate::S, Gate::Sdg, Gate::T, Gate::Tdg, Gate::SqrtX,
            Gate::Rx(0.3), Gate::Ry(-1.7), Gate::Rz(2.2), Gate::Phase(0.9),
        ];
        for g in gates {
            assert!(is_unitary(&g.matrix()), "{:?} is not unitary", g);
        }
    }

    #[test]
    fn test_non_finite_angles_rejected() {
        for g in [Gate::Rx(f64::NAN), Gate::Ry(f64::INFINITY), Gate::Rz(f64::NEG_INFINITY), Gate::Phase(f64::NAN)] {
            assert!(matches!(g.validate(), Err(QsimError::InvalidArgument { .. })), "{:?} accepted", g);
        }
        assert!(Gate::Rx(0.25).validate().is_ok());
        assert!(Gate::H.validate().is_ok());
    }

    #[test]
    fn test_request_conversion() {
        let op = Operation::try_from(&GateRequest::new(GateKind::Cnot, [0, 1])).unwrap();
        assert_eq!(op, Operation::cnot(0, 1));

        let op = Operation::try_from(&GateRequest::new(GateKind::Ry, [2]).with_theta(0.5)).unwrap();
        assert_eq!(op, Operation::gate(Gate::Ry(0.5), 2));
    }

    #[test]
    fn test_request_validation() {
        let missing_angle = Operation::try_from(&GateRequest::new(GateKind::Rx, [0]));
        assert!(matches!(missing_angle, Err(QsimError::InvalidArgument { .. })));

        let wrong_arity = Operation::try_from(&GateRequest::new(GateKind::Cz, [0]));
        assert!(matches!(wrong_arity, Err(QsimError::InvalidArgument { .. })));
    }

    #[test]
    fn test_request_json_shape() {
        let req: GateRequest = serde_json::from_str(r#"{"gate":"RZ","qubits":[1],"theta":1.5}"#).unwrap();
        assert_eq!(req.gate, GateKind::Rz);
        assert_eq!(req.theta, Some(1.5));
        let req: GateRequest = serde_json::from_str(r#"{"gate":"CNOT","qubits":[0,2]}"#).unwrap();
        assert_eq!(req.gate, GateKind::Cnot);
    }
}
