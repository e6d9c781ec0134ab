//! Monospace circuit diagrams.
//!
//! Qubit 0 is the top wire. Operations are placed by DAG layer; a layer
//! whose operations overlap vertically is spread over several columns.

use qlens_ir::{Circuit, Instruction, InstructionKind, StandardGate};

const WIRE: char = '─';
const LINK: char = '│';
const CROSS: char = '┼';
const BARRIER: &str = "░";

/// One operation as drawn in a column.
#[derive(Debug)]
struct Cell {
    lo: usize,
    hi: usize,
    symbols: Vec<(usize, String)>,
    link: char,
    cross: char,
}

impl Cell {
    fn from_instruction(inst: &Instruction) -> Option<Self> {
        let qubits: Vec<usize> = inst.qubits.iter().map(|q| q.index()).collect();
        let lo = *qubits.iter().min()?;
        let hi = *qubits.iter().max()?;

        let mut symbols = match &inst.kind {
            InstructionKind::Gate(gate) => gate_symbols(gate, qubits.len()),
            InstructionKind::Measure => vec!["M".to_string()],
            InstructionKind::Reset => vec!["|0⟩".to_string()],
            InstructionKind::Barrier => vec![BARRIER.to_string(); qubits.len()],
        };
        if let (Some(cond), Some(last)) = (&inst.condition, symbols.last_mut()) {
            last.push_str(&format!(" if {}=={}", cond.register, cond.value));
        }

        let (link, cross) = if matches!(inst.kind, InstructionKind::Barrier) {
            ('░', '░')
        } else {
            (LINK, CROSS)
        };

        Some(Self {
            lo,
            hi,
            symbols: qubits.into_iter().zip(symbols).collect(),
            link,
            cross,
        })
    }

    fn overlaps(&self, other: &Cell) -> bool {
        self.lo <= other.hi && other.lo <= self.hi
    }

    fn symbol_on(&self, qubit: usize) -> Option<&str> {
        self.symbols
            .iter()
            .find(|(q, _)| *q == qubit)
            .map(|(_, s)| s.as_str())
    }
}

fn gate_symbols(gate: &StandardGate, arity: usize) -> Vec<String> {
    let dot = || "●".to_string();
    match gate {
        StandardGate::CX => vec![dot(), "⊕".to_string()],
        StandardGate::CCX => vec![dot(), dot(), "⊕".to_string()],
        StandardGate::CZ => vec![dot(), dot()],
        StandardGate::Swap => vec!["×".to_string(), "×".to_string()],
        StandardGate::CSwap => vec![dot(), "×".to_string(), "×".to_string()],
        StandardGate::CY
        | StandardGate::CH
        | StandardGate::CRx(_)
        | StandardGate::CRy(_)
        | StandardGate::CRz(_)
        | StandardGate::CP(_)
        | StandardGate::CU(..) => {
            let label = gate.label();
            let target = label.strip_prefix('C').unwrap_or(&label).to_string();
            vec![dot(), target]
        }
        _ => vec![gate.label(); arity],
    }
}

/// Group each DAG layer into columns of non-overlapping cells.
fn columns(circuit: &Circuit) -> Vec<Vec<Cell>> {
    let mut columns: Vec<Vec<Cell>> = vec![];
    for layer in circuit.dag().layers() {
        let start = columns.len();
        for cell in layer.into_iter().filter_map(Cell::from_instruction) {
            let slot = columns[start..]
                .iter()
                .position(|col| col.iter().all(|c| !c.overlaps(&cell)));
            match slot {
                Some(i) => columns[start + i].push(cell),
                None => columns.push(vec![cell]),
            }
        }
    }
    columns
}

fn centered(text: &str, width: usize, fill: char) -> String {
    let len = text.chars().count();
    let left = width.saturating_sub(len) / 2;
    let right = width.saturating_sub(len + left);
    let mut out = String::with_capacity(width + text.len());
    out.extend(std::iter::repeat_n(fill, left));
    out.push_str(text);
    out.extend(std::iter::repeat_n(fill, right));
    out
}

/// Draw `circuit` as text, one line per qubit with connector lines between.
pub fn circuit_diagram(circuit: &Circuit) -> String {
    let n = circuit.num_qubits();
    if n == 0 {
        return String::new();
    }

    let labels: Vec<String> = circuit.qubits().iter().map(ToString::to_string).collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut rows: Vec<String> = (0..2 * n - 1)
        .map(|row| {
            if row % 2 == 0 {
                format!("{:>label_width$}: {WIRE}", labels[row / 2])
            } else {
                " ".repeat(label_width + 3)
            }
        })
        .collect();

    for column in columns(circuit) {
        let width = column
            .iter()
            .flat_map(|c| c.symbols.iter())
            .map(|(_, s)| s.chars().count())
            .max()
            .unwrap_or(1)
            + 2;

        for (row, line) in rows.iter_mut().enumerate() {
            let q = row / 2;
            let segment = if row % 2 == 0 {
                if let Some(symbol) = column.iter().find_map(|c| c.symbol_on(q)) {
                    centered(symbol, width, WIRE)
                } else if let Some(c) = column.iter().find(|c| c.lo < q && q < c.hi) {
                    centered(&c.cross.to_string(), width, WIRE)
                } else {
                    centered("", width, WIRE)
                }
            } else if let Some(c) = column.iter().find(|c| c.lo <= q && q < c.hi) {
                centered(&c.link.to_string(), width, ' ')
            } else {
                centered("", width, ' ')
            };
            line.push_str(&segment);
        }
    }

    for line in rows.iter_mut().step_by(2) {
        line.push(WIRE);
    }

    rows.iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}
