use crate::{
    isa::Instruction,
    symbols::{SymType, Symbol, SymbolTable},
};
use std::collections::HashMap;

/// Which instruction sequence a piece of code belongs to. On the wire (and in
/// older tooling) the start code is keyed by `-1` and a function by the
/// constant-table index of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Start,
    Function(usize),
}

impl Segment {
    pub const START_KEY: i32 = -1;

    pub fn from_raw(raw: i32) -> Option<Segment> {
        match raw {
            Self::START_KEY => Some(Segment::Start),
            idx if idx >= 0 => Some(Segment::Function(idx as usize)),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Segment::Start => Self::START_KEY,
            Segment::Function(idx) => idx as i32,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeMap {
    segments: HashMap<Segment, Vec<Instruction>>,
}

impl CodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Missing segments read as empty.
    pub fn get(&self, seg: Segment) -> &[Instruction] {
        self.segments.get(&seg).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_mut(&mut self, seg: Segment) -> &mut Vec<Instruction> {
        self.segments.entry(seg).or_default()
    }

    pub fn insert(&mut self, seg: Segment, code: Vec<Instruction>) -> Option<Vec<Instruction>> {
        self.segments.insert(seg, code)
    }

    pub fn contains(&self, seg: Segment) -> bool {
        self.segments.contains_key(&seg)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// What an analyser hands to the emitters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub constants: SymbolTable,
    pub code: CodeMap,
}

/// Constant tags of the module format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstKind {
    Str = 0,
    Int = 1,
    Double = 2,
}

impl ConstKind {
    /// Function names are stored as strings. `char` constants travel as ints.
    pub fn of(sym: &Symbol) -> ConstKind {
        match sym.ty {
            _ if sym.is_function => ConstKind::Str,
            SymType::Int | SymType::Char => ConstKind::Int,
            SymType::Double => ConstKind::Double,
            _ => ConstKind::Str,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<ConstKind> {
        match tag {
            0 => Some(ConstKind::Str),
            1 => Some(ConstKind::Int),
            2 => Some(ConstKind::Double),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            ConstKind::Str => 'S',
            ConstKind::Int => 'I',
            ConstKind::Double => 'D',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub kind: ConstKind,
    /// Only string constants carry their text into the binary form.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name_index: u16,
    pub param_count: u16,
    pub level: u16,
    pub code: Vec<Instruction>,
}

/// The flat form both emitters serialise and the module reader produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub constants: Vec<Constant>,
    pub start: Vec<Instruction>,
    pub functions: Vec<Function>,
}

impl Module {
    pub const LEVEL: u16 = 1;

    /// Lays the program out in constant-table order; every function constant
    /// gets an entry, even if it has no code.
    pub fn lower(prog: &Program) -> Module {
        let constants = prog
            .constants
            .iter()
            .map(|sym| Constant {
                kind: ConstKind::of(sym),
                text: sym.name.clone(),
            })
            .collect();

        let functions = lower_functions(&prog.constants, &prog.code);

        Module {
            constants,
            start: prog.code.get(Segment::Start).to_vec(),
            functions,
        }
    }
}

fn lower_functions(constants: &SymbolTable, code: &CodeMap) -> Vec<Function> {
    constants
        .iter()
        .enumerate()
        .filter(|(_, sym)| sym.is_function)
        .map(|(idx, sym)| Function {
            name_index: idx as u16,
            param_count: sym.param_count as u16,
            level: Module::LEVEL,
            code: code.get(Segment::Function(idx)).to_vec(),
        })
        .collect()
}
