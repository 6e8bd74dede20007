use super::{
    error::{Error, ErrorKind},
    stream::TokenStream,
    Analyser, Analysis,
};
use crate::{
    emit::{CodeMap, Segment},
    isa::{Instruction, Operation},
    symbols::{SymType, SymbolTable},
    tokenizer::{Pos, Token, TokenKind},
};
use log::debug;

/// Single-pass recursive-descent analyser for C0. Code is generated while
/// parsing; jump targets are absolute offsets patched in once known.
#[derive(Debug, Clone, Copy, Default)]
pub struct C0;

impl Analyser for C0 {
    fn analyse(self, tokens: &[Token]) -> Result<Analysis, Error> {
        let mut g = Generator::new(tokens);
        g.program()?;
        Ok(Analysis {
            constants: g.constants,
            code: g.code,
        })
    }
}

#[derive(Debug, Clone)]
pub(super) struct Signature {
    pub name: String,
    pub ret: SymType,
    pub params: Vec<SymType>,
    /// Where the name sits in the constant table; also the code-map key.
    pub const_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    Local,
    Global,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Var {
    pub scope: Scope,
    pub ty: SymType,
    pub offset: i32,
    pub is_const: bool,
    pub is_initialized: bool,
}

#[derive(Debug, Default)]
pub(super) struct Loop {
    /// `None` while the continue target lies ahead (`do ... while`).
    pub continue_target: Option<usize>,
    pub continues: Vec<usize>,
    pub breaks: Vec<usize>,
}

pub(super) struct Generator<'t> {
    pub tokens: TokenStream<'t>,
    pub constants: SymbolTable,
    pub code: CodeMap,
    pub globals: SymbolTable,
    pub locals: SymbolTable,
    pub functions: Vec<Signature>,
    /// Index into `functions` of the body being generated.
    pub current: Option<usize>,
    pub loops: Vec<Loop>,
}

impl<'t> Generator<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Generator {
            tokens: TokenStream::new(tokens),
            constants: SymbolTable::new(),
            code: CodeMap::new(),
            globals: SymbolTable::new(),
            locals: SymbolTable::new(),
            functions: Vec::new(),
            current: None,
            loops: Vec::new(),
        }
    }

    pub fn segment(&self) -> Segment {
        match self.current {
            Some(f) => Segment::Function(self.functions[f].const_index),
            None => Segment::Start,
        }
    }

    pub fn emit(&mut self, inst: Instruction) {
        let seg = self.segment();
        self.code.get_mut(seg).push(inst);
    }

    pub fn op(&mut self, op: Operation) {
        self.emit(Instruction::new(op));
    }

    /// Offset of the next instruction in the current sequence.
    pub fn here(&self) -> usize {
        self.code.get(self.segment()).len()
    }

    pub fn insert(&mut self, at: usize, inst: Instruction) {
        let seg = self.segment();
        self.code.get_mut(seg).insert(at, inst);
    }

    /// Emits a jump with an unknown target and returns its offset.
    pub fn jump(&mut self, op: Operation) -> usize {
        let at = self.here();
        self.emit(Instruction::new(op));
        at
    }

    pub fn patch(&mut self, at: usize, target: usize) {
        let seg = self.segment();
        if let Some(inst) = self.code.get_mut(seg).get_mut(at) {
            inst.set_x(target as i32);
        }
    }

    pub fn push_int(&mut self, v: i32) {
        if (0..=127).contains(&v) {
            self.emit(Instruction::with_x(Operation::BIPUSH, v));
        } else {
            self.emit(Instruction::with_x(Operation::IPUSH, v));
        }
    }

    /// A double is two stack words: the high half of its bits, then the low.
    pub fn push_double(&mut self, v: f64) {
        let bits = v.to_bits();
        self.emit(Instruction::with_x(Operation::IPUSH, (bits >> 32) as u32 as i32));
        self.emit(Instruction::with_x(Operation::IPUSH, bits as u32 as i32));
    }

    pub fn lookup_var(&self, name: &str) -> Option<Var> {
        let (scope, table) = match self.current {
            Some(_) if self.locals.is_declared(name) => (Scope::Local, &self.locals),
            _ if self.globals.is_declared(name) => (Scope::Global, &self.globals),
            _ => return None,
        };

        Some(Var {
            scope,
            ty: table.get_type(name)?,
            offset: table.get_index(name)?,
            is_const: table.is_const(name),
            is_initialized: table.is_init(name),
        })
    }

    pub fn lookup_function(&self, name: &str) -> Option<(usize, &Signature)> {
        self.functions
            .iter()
            .enumerate()
            .find(|(_, sig)| sig.name == name)
    }

    pub fn mark_initialized(&mut self, name: &str, scope: Scope) {
        match scope {
            Scope::Local => self.locals.init_var(name),
            Scope::Global => self.globals.init_var(name),
        }
    }

    /// Pushes the address of a variable. Globals are one frame up from
    /// inside a function.
    pub fn address_of(&mut self, var: &Var) {
        let level = match (var.scope, self.current) {
            (Scope::Global, Some(_)) => 1,
            _ => 0,
        };
        self.emit(Instruction::with_xy(Operation::LOADA, level, var.offset));
    }

    pub fn load(&mut self, ty: SymType) {
        self.op(match ty {
            SymType::Double => Operation::DLOAD,
            _ => Operation::ILOAD,
        });
    }

    pub fn store(&mut self, ty: SymType) {
        self.op(match ty {
            SymType::Double => Operation::DSTORE,
            _ => Operation::ISTORE,
        });
    }

    /// Converts the value on top of the stack from `from` to `to`.
    pub fn convert(&mut self, from: SymType, to: SymType, at: Pos) -> Result<(), Error> {
        match (from, to) {
            (SymType::Void, _) | (_, SymType::Void) => {
                return Err(Error::new(at, ErrorKind::VoidValue))
            }
            (a, b) if a == b => (),
            (SymType::Double, SymType::Char) => {
                self.op(Operation::D2I);
                self.op(Operation::I2C);
            }
            (SymType::Double, _) => self.op(Operation::D2I),
            (_, SymType::Double) => self.op(Operation::I2D),
            (SymType::Int, SymType::Char) => self.op(Operation::I2C),
            _ => (),
        }
        Ok(())
    }

    fn type_specifier(&mut self) -> Result<SymType, Error> {
        let at = self.tokens.here();
        let tk = self.tokens.next()?;
        match tk.kind {
            TokenKind::Void => Ok(SymType::Void),
            TokenKind::Int => Ok(SymType::Int),
            TokenKind::Char => Ok(SymType::Char),
            TokenKind::Double => Ok(SymType::Double),
            TokenKind::Struct => Err(Error::new(at, ErrorKind::UnsupportedFeature(tk.kind))),
            _ => Err(Error::new(at, ErrorKind::ExpectedTypeSpecifier)),
        }
    }

    fn program(&mut self) -> Result<(), Error> {
        let mut seen_function = false;

        while let Some(tk) = self.tokens.peek() {
            let is_const = match tk.kind {
                TokenKind::Const => {
                    self.tokens.next()?;
                    true
                }
                kind if kind.is_type_specifier() => false,
                TokenKind::Struct => {
                    return Err(Error::new(tk.start, ErrorKind::UnsupportedFeature(tk.kind)))
                }
                kind => return Err(Error::new(tk.start, ErrorKind::UnexpectedToken(kind))),
            };

            let ty = self.type_specifier()?;
            let (name, at) = self.tokens.expect_identifier()?;

            if !is_const && self.tokens.peek_kind() == Some(TokenKind::LeftParen) {
                seen_function = true;
                self.function(ty, name, at)?;
            } else if seen_function {
                return Err(Error::new(tk.start, ErrorKind::DeclarationPlacement));
            } else {
                self.declaration(is_const, ty, name, at)?;
            }
        }

        if !self.functions.iter().any(|sig| sig.name == "main") {
            return Err(Error::new(self.tokens.here(), ErrorKind::NoMain));
        }

        debug!(
            "analysed {} functions, {} constants, {} start instructions",
            self.functions.len(),
            self.constants.len(),
            self.code.get(Segment::Start).len()
        );
        Ok(())
    }

    /// The rest of a declaration statement whose first declarator name has
    /// already been read.
    fn declaration(&mut self, is_const: bool, ty: SymType, name: &str, at: Pos) -> Result<(), Error> {
        if ty == SymType::Void {
            return Err(Error::new(at, ErrorKind::VoidVariable(name.to_owned())));
        }

        self.declarator(is_const, ty, name, at)?;
        while self.tokens.eat(TokenKind::Comma).is_some() {
            let (name, at) = self.tokens.expect_identifier()?;
            self.declarator(is_const, ty, name, at)?;
        }
        self.tokens.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    fn declarator(&mut self, is_const: bool, ty: SymType, name: &str, at: Pos) -> Result<(), Error> {
        let redeclared = match self.current {
            Some(_) => self.locals.is_declared(name),
            None => self.globals.is_declared(name) || self.lookup_function(name).is_some(),
        };
        if redeclared {
            return Err(Error::new(at, ErrorKind::Redeclared(name.to_owned())));
        }

        // The initializer runs before the name is visible; its value becomes
        // the variable's slot.
        let initialized = if let Some(eq) = self.tokens.eat(TokenKind::Assign) {
            let value = self.expression()?;
            self.convert(value, ty, eq.start)?;
            true
        } else if is_const {
            return Err(Error::new(at, ErrorKind::ConstNeedsInit(name.to_owned())));
        } else {
            self.emit(Instruction::with_x(Operation::SNEW, ty.slots()));
            false
        };

        let scope = match self.current {
            Some(_) => Scope::Local,
            None => Scope::Global,
        };
        match scope {
            Scope::Local => self.locals.add_var(name, is_const, ty),
            Scope::Global => self.globals.add_var(name, is_const, ty),
        };
        if initialized {
            self.mark_initialized(name, scope);
        }
        Ok(())
    }

    fn function(&mut self, ret: SymType, name: &str, at: Pos) -> Result<(), Error> {
        if self.globals.is_declared(name) || self.lookup_function(name).is_some() {
            return Err(Error::new(at, ErrorKind::Redeclared(name.to_owned())));
        }

        let const_index = self.constants.add_func(name, ret) as usize;
        self.functions.push(Signature {
            name: name.to_owned(),
            ret,
            params: Vec::new(),
            const_index,
        });
        self.current = Some(self.functions.len() - 1);
        self.locals = SymbolTable::new();
        self.code.get_mut(Segment::Function(const_index));

        self.parameters()?;
        let slots = self.locals.len() as i32;
        self.constants.set_param_num(name, slots);

        self.tokens.expect(TokenKind::LeftBrace)?;
        while let Some(kind) = self.tokens.peek_kind() {
            let is_const = kind == TokenKind::Const;
            if !is_const && !kind.is_type_specifier() {
                break;
            }
            self.tokens.next()?;
            let ty = if is_const {
                self.type_specifier()?
            } else {
                self.type_specifier_of(kind)
            };
            let (var, at) = self.tokens.expect_identifier()?;
            self.declaration(is_const, ty, var, at)?;
        }
        while self.tokens.eat(TokenKind::RightBrace).is_none() {
            self.statement()?;
        }

        self.default_return(ret);
        debug!(
            "function '{}': {} param slots, {} instructions",
            name,
            slots,
            self.here()
        );
        self.current = None;
        Ok(())
    }

    fn type_specifier_of(&self, kind: TokenKind) -> SymType {
        match kind {
            TokenKind::Int => SymType::Int,
            TokenKind::Char => SymType::Char,
            TokenKind::Double => SymType::Double,
            _ => SymType::Void,
        }
    }

    fn parameters(&mut self) -> Result<(), Error> {
        self.tokens.expect(TokenKind::LeftParen)?;
        if self.tokens.eat(TokenKind::RightParen).is_some() {
            return Ok(());
        }

        loop {
            let is_const = self.tokens.eat(TokenKind::Const).is_some();
            let ty = self.type_specifier()?;
            let (name, at) = self.tokens.expect_identifier()?;
            if ty == SymType::Void {
                return Err(Error::new(at, ErrorKind::VoidVariable(name.to_owned())));
            }
            if self.locals.is_declared(name) {
                return Err(Error::new(at, ErrorKind::Redeclared(name.to_owned())));
            }

            self.locals.add_var(name, is_const, ty);
            self.locals.init_var(name);
            if let Some(f) = self.current {
                self.functions[f].params.push(ty);
            }

            if self.tokens.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.tokens.expect(TokenKind::RightParen)?;
        Ok(())
    }

    fn default_return(&mut self, ret: SymType) {
        match ret {
            SymType::Double => {
                self.push_double(0.0);
                self.op(Operation::DRET);
            }
            SymType::Int | SymType::Char => {
                self.push_int(0);
                self.op(Operation::IRET);
            }
            _ => self.op(Operation::RET),
        }
    }
}
