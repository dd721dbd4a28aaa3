//! Property-based tests for qsim using proptest
//!
//! Norm preservation and measurement collapse must hold for any valid gate
//! sequence, not only the hand-picked circuits in the other suites.

use proptest::prelude::*;
use qsim::simulation::{QuantumRegister, SimulatorConfig};
use qsim::{Gate, Operation};

const NORM_TOLERANCE: f64 = 1e-9;

// Raw draw: (gate selector, first index, second index, angle)
type RawOp = (u8, usize, usize, f64);

fn raw_ops() -> impl Strategy<Value = Vec<RawOp>> {
    prop::collection::vec((0u8..16, any::<usize>(), any::<usize>(), -6.3f64..6.3), 1..24)
}

/// Maps a raw draw onto a valid operation for an `n`-qubit register.
fn to_operation((selector, a, b, theta): RawOp, n: usize) -> Operation {
    let target = a % n;
    let single = |gate| Operation::gate(gate, target);
    if n < 2 && selector >= 13 {
        return single(Gate::H);
    }
    // distinct second index
    let other = (target + 1 + b % (n.max(2) - 1)) % n;
    match selector {
        0 => single(Gate::H),
        1 => single(Gate::X),
        2 => single(Gate::Y),
        3 => single(Gate::Z),
        4 => single(Gate::S),
        5 => single(Gate::Sdg),
        6 => single(Gate::T),
        7 => single(Gate::Tdg),
        8 => single(Gate::SqrtX),
        9 => single(Gate::Rx(theta)),
        10 => single(Gate::Ry(theta)),
        11 => single(Gate::Rz(theta)),
        12 => single(Gate::Phase(theta)),
        13 => Operation::cnot(target, other),
        14 => Operation::cz(target, other),
        _ => Operation::Swap { a: target, b: other },
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: any sequence of valid gates keeps the squared norm at 1
    #[test]
    fn gates_preserve_norm(n in 1usize..=15, ops in raw_ops(), seed in any::<u64>()) {
        let mut register = QuantumRegister::with_config(n, &SimulatorConfig::seeded(seed)).unwrap();
        for raw in ops {
            let op = to_operation(raw, n);
            register.apply(&op).unwrap();
            prop_assert!(
                (register.norm_squared() - 1.0).abs() < NORM_TOLERANCE,
                "norm {} after {}", register.norm_squared(), op
            );
        }
    }

    /// Property: a full measurement collapses onto one basis state whose
    /// label matches the returned bits
    #[test]
    fn measurement_collapses_to_outcome(n in 1usize..=10, ops in raw_ops(), seed in any::<u64>()) {
        let mut register = QuantumRegister::with_config(n, &SimulatorConfig::seeded(seed)).unwrap();
        for raw in ops {
            register.apply(&to_operation(raw, n)).unwrap();
        }
        let bits = register.measure_all().unwrap();
        let states = register.probabilities(None);
        prop_assert_eq!(states.len(), 1);
        let label: String = bits.iter().map(|b| if *b == 1 { '1' } else { '0' }).collect();
        prop_assert_eq!(&states[0].bitstring, &label);
        prop_assert!((states[0].probability - 1.0).abs() < NORM_TOLERANCE);
        prop_assert_eq!(register.measure_all().unwrap(), bits);
    }
}
