use super::opcode::Operation;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Byte width of one encoded operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Byte = 1,
    Half = 2,
    Word = 4,
}

impl Width {
    pub fn bytes(self) -> usize {
        self as usize
    }

    /// Appends the low `self.bytes()` bytes of `v`, most significant first.
    pub fn encode(self, v: i32, out: &mut Vec<u8>) {
        match self {
            Width::Byte => out.push(v as u8),
            Width::Half => out.extend_from_slice(&(v as u16).to_be_bytes()),
            Width::Word => out.extend_from_slice(&v.to_be_bytes()),
        }
    }

    /// Inverse of `encode` over the first `self.bytes()` bytes of `raw`.
    /// Narrow operands are zero-extended.
    pub fn decode(self, raw: &[u8]) -> i32 {
        raw.iter().take(self.bytes()).fold(0u32, |acc, b| (acc << 8) | u32::from(*b)) as i32
    }
}

static OPERANDS: Lazy<HashMap<Operation, &'static [Width]>> = Lazy::new(|| {
    use Operation::*;

    let half: &'static [Width] = &[Width::Half];
    let mut tab: HashMap<Operation, &'static [Width]> = HashMap::new();
    tab.insert(BIPUSH, &[Width::Byte]);
    tab.insert(IPUSH, &[Width::Word]);
    tab.insert(POPN, &[Width::Word]);
    tab.insert(LOADC, half);
    tab.insert(LOADA, &[Width::Half, Width::Word]);
    tab.insert(SNEW, &[Width::Word]);
    tab.insert(CALL, half);
    for op in &[JMP, JE, JNE, JL, JLE, JG, JGE] {
        tab.insert(*op, half);
    }
    tab
});

/// The operand widths of `op`, in order. Opcodes not in the table take no
/// operands.
pub fn operand_widths(op: Operation) -> &'static [Width] {
    OPERANDS.get(&op).copied().unwrap_or(&[])
}

pub fn encoded_len(op: Operation) -> usize {
    1 + operand_widths(op).iter().map(|w| w.bytes()).sum::<usize>()
}
