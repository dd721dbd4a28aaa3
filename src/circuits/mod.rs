// src/circuits/mod.rs

//! Ordered operation lists and a fluent builder over the gate library.
//!
//! A [`Circuit`] is a plain description; nothing is simulated until it is
//! handed to a [`Simulator`](crate::Simulator) or applied to a
//! [`QuantumRegister`](crate::QuantumRegister).

use crate::operations::{Gate, Operation};
use std::fmt;

/// An ordered sequence of operations on qubits `0..num_qubits`.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    /// One past the highest qubit index mentioned (or the declared width).
    num_qubits: usize,
    /// The order is the order of application.
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates a new, empty circuit.
    pub fn new() -> Self {
        Self { num_qubits: 0, operations: Vec::new() }
    }

    /// Creates an empty circuit declared over `num_qubits` qubits, so idle
    /// qubits still count towards the register size.
    pub fn with_width(num_qubits: usize) -> Self {
        Self { num_qubits, operations: Vec::new() }
    }

    /// Appends an operation, widening the circuit to cover its qubits.
    pub fn add_operation(&mut self, op: Operation) {
        if let Some(max) = op.involved_qubits().into_iter().max() {
            self.num_qubits = self.num_qubits.max(max + 1);
        }
        self.operations.push(op);
    }

    /// Appends several operations in order.
    pub fn add_operations<I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = Operation>,
    {
        for op in ops {
            self.add_operation(op);
        }
    }

    /// Number of qubits the circuit spans.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The operations in application order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the circuit contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoIterator for Circuit {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// Fluent construction of [`Circuit`]s with named gates.
///
/// ```
/// use qsim::CircuitBuilder;
///
/// let circuit = CircuitBuilder::new().h(0).cnot(0, 1).cnot(1, 2).build();
/// assert_eq!(circuit.num_qubits(), 3);
/// assert_eq!(circuit.len(), 3);
/// ```
#[derive(Default)]
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Creates a new, empty CircuitBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder whose circuit spans at least `num_qubits` qubits.
    pub fn with_width(num_qubits: usize) -> Self {
        Self { circuit: Circuit::with_width(num_qubits) }
    }

    /// Bell pair on qubits 0 and 1: H(0), CNOT(0→1).
    pub fn bell() -> Circuit {
        Self::new().h(0).cnot(0, 1).build()
    }

    /// GHZ state on `n` qubits: H(0), then CNOT(i→i+1) down the line.
    pub fn ghz(n: usize) -> Circuit {
        (0..n.saturating_sub(1))
            .fold(Self::with_width(n).h(0), |b, i| b.cnot(i, i + 1))
            .build()
    }

    /// Adds a single operation.
    pub fn add_op(mut self, op: Operation) -> Self {
        self.circuit.add_operation(op);
        self
    }

    /// Adds multiple operations from an iterator.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        self.circuit.add_operations(ops);
        self
    }

    /// Any single-qubit gate.
    pub fn gate(self, gate: Gate, target: usize) -> Self {
        self.add_op(Operation::gate(gate, target))
    }

    pub fn h(self, target: usize) -> Self {
        self.gate(Gate::H, target)
    }

    pub fn x(self, target: usize) -> Self {
        self.gate(Gate::X, target)
    }

    pub fn y(self, target: usize) -> Self {
        self.gate(Gate::Y, target)
    }

    pub fn z(self, target: usize) -> Self {
        self.gate(Gate::Z, target)
    }

    pub fn s(self, target: usize) -> Self {
        self.gate(Gate::S, target)
    }

    pub fn t(self, target: usize) -> Self {
        self.gate(Gate::T, target)
    }

    /// Rotation about X by `theta` radians.
    pub fn rx(self, target: usize, theta: f64) -> Self {
        self.gate(Gate::Rx(theta), target)
    }

    /// Rotation about Y by `theta` radians.
    pub fn ry(self, target: usize, theta: f64) -> Self {
        self.gate(Gate::Ry(theta), target)
    }

    /// Rotation about Z by `theta` radians.
    pub fn rz(self, target: usize, theta: f64) -> Self {
        self.gate(Gate::Rz(theta), target)
    }

    /// `diag(1, e^(iθ))` on `target`.
    pub fn phase(self, target: usize, theta: f64) -> Self {
        self.gate(Gate::Phase(theta), target)
    }

    pub fn cnot(self, control: usize, target: usize) -> Self {
        self.add_op(Operation::cnot(control, target))
    }

    pub fn cz(self, control: usize, target: usize) -> Self {
        self.add_op(Operation::cz(control, target))
    }

    /// Controlled version of any single-qubit gate.
    pub fn controlled(self, gate: Gate, control: usize, target: usize) -> Self {
        self.add_op(Operation::Controlled { gate, control, target })
    }

    pub fn swap(self, a: usize, b: usize) -> Self {
        self.add_op(Operation::Swap { a, b })
    }

    /// Measures `targets`; an empty list measures every qubit.
    pub fn measure(self, targets: impl Into<Vec<usize>>) -> Self {
        self.add_op(Operation::Measure { targets: targets.into() })
    }

    /// Measures every qubit.
    pub fn measure_all(self) -> Self {
        self.measure(Vec::new())
    }

    /// Finalizes the construction process and returns the built `Circuit`.
    pub fn build(self) -> Circuit {
        self.circuit
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operations.is_empty() || self.num_qubits == 0 {
            return writeln!(f, "Circuit[0 operations on {} qubits]", self.num_qubits);
        }

        let ops = &self.operations;
        let num_ops = ops.len();
        let rows = self.num_qubits;

        let max_label_width = format!("q{}", rows - 1).len();
        let label_padding = " ".repeat(max_label_width + 2);

        const GATE_WIDTH: usize = 7;
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] is the wire segment, v_connect[row][time] the
        // connector drawn below that row
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; rows];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; rows];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre = total_dashes / 2;
                let post = total_dashes - pre;
                format!("{}{}{}", H_WIRE.to_string().repeat(pre), symbol, H_WIRE.to_string().repeat(post))
            }
        }

        fn connect(v_connect: &mut [Vec<char>], r1: usize, r2: usize, t: usize) {
            let (lo, hi) = (r1.min(r2), r1.max(r2));
            for row in v_connect.iter_mut().take(hi).skip(lo) {
                row[t] = V_WIRE;
            }
        }

        for (t, op) in ops.iter().enumerate() {
            match op {
                Operation::Single { gate, target } => {
                    op_grid[*target][t] = format_gate(gate.symbol());
                }
                Operation::Controlled { gate, control, target } => {
                    let target_symbol = match gate {
                        Gate::X => "X",
                        Gate::Z => "●",
                        g => g.symbol(),
                    };
                    op_grid[*control][t] = format_gate("@");
                    op_grid[*target][t] = format_gate(target_symbol);
                    connect(&mut v_connect, *control, *target, t);
                }
                Operation::Swap { a, b } => {
                    op_grid[*a][t] = format_gate("x");
                    op_grid[*b][t] = format_gate("x");
                    connect(&mut v_connect, *a, *b, t);
                }
                Operation::Measure { targets } if targets.is_empty() => {
                    for row in op_grid.iter_mut() {
                        row[t] = format_gate("M");
                    }
                }
                Operation::Measure { targets } => {
                    for q in targets {
                        op_grid[*q][t] = format_gate("M");
                    }
                }
            }
        }

        writeln!(f, "Circuit[{} operations on {} qubits]", num_ops, rows)?;
        for r in 0..rows {
            let label = format!("q{}: ", r);
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < rows - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let pad = GATE_WIDTH - 1;
                    let pre = pad / 2;
                    write!(f, "{}{}{}", " ".repeat(pre), v_connect[r][t], " ".repeat(pad - pre))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
