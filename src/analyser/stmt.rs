use super::{
    c0::{Generator, Loop},
    error::{Error, ErrorKind},
};
use crate::{
    isa::{Instruction, Operation},
    symbols::SymType,
    tokenizer::{Pos, TokenKind, TokenValue},
};

impl<'t> Generator<'t> {
    pub fn statement(&mut self) -> Result<(), Error> {
        let at = self.tokens.here();
        let kind = match self.tokens.peek_kind() {
            Some(kind) => kind,
            None => return Err(Error::new(at, ErrorKind::UnexpectedEndOfInput)),
        };

        match kind {
            TokenKind::LeftBrace => {
                self.tokens.next()?;
                while self.tokens.eat(TokenKind::RightBrace).is_none() {
                    self.statement()?;
                }
                Ok(())
            }
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Do => self.do_statement(),
            TokenKind::Break | TokenKind::Continue => self.jump_statement(kind, at),
            TokenKind::Return => self.return_statement(),
            TokenKind::Print => self.print_statement(),
            TokenKind::Scan => self.scan_statement(),
            TokenKind::Semicolon => {
                self.tokens.next()?;
                Ok(())
            }
            TokenKind::Identifier => self.identifier_statement(),

            TokenKind::Struct
            | TokenKind::Switch
            | TokenKind::Case
            | TokenKind::Default
            | TokenKind::For => Err(Error::new(at, ErrorKind::UnsupportedFeature(kind))),
            TokenKind::Const => Err(Error::new(at, ErrorKind::DeclarationPlacement)),
            kind if kind.is_type_specifier() => {
                Err(Error::new(at, ErrorKind::DeclarationPlacement))
            }
            kind => Err(Error::new(at, ErrorKind::UnexpectedToken(kind))),
        }
    }

    fn parenthesised_condition(&mut self) -> Result<usize, Error> {
        self.tokens.expect(TokenKind::LeftParen)?;
        let jump = self.condition()?;
        self.tokens.expect(TokenKind::RightParen)?;
        Ok(jump)
    }

    fn if_statement(&mut self) -> Result<(), Error> {
        self.tokens.expect(TokenKind::If)?;
        let to_else = self.parenthesised_condition()?;
        self.statement()?;

        if self.tokens.eat(TokenKind::Else).is_some() {
            let to_end = self.jump(Operation::JMP);
            let target = self.here();
            self.patch(to_else, target);
            self.statement()?;
            let target = self.here();
            self.patch(to_end, target);
        } else {
            let target = self.here();
            self.patch(to_else, target);
        }
        Ok(())
    }

    fn while_statement(&mut self) -> Result<(), Error> {
        self.tokens.expect(TokenKind::While)?;
        let start = self.here();
        let to_end = self.parenthesised_condition()?;

        self.loops.push(Loop {
            continue_target: Some(start),
            ..Loop::default()
        });
        let body = self.statement();
        let ctx = self.loops.pop().unwrap_or_default();
        body?;

        self.emit(Instruction::with_x(Operation::JMP, start as i32));
        let end = self.here();
        self.patch(to_end, end);
        for at in ctx.breaks {
            self.patch(at, end);
        }
        Ok(())
    }

    fn do_statement(&mut self) -> Result<(), Error> {
        self.tokens.expect(TokenKind::Do)?;
        let start = self.here();

        self.loops.push(Loop::default());
        let body = self.statement();
        let ctx = self.loops.pop().unwrap_or_default();
        body?;

        self.tokens.expect(TokenKind::While)?;
        let cond = self.here();
        for at in ctx.continues {
            self.patch(at, cond);
        }
        let to_end = self.parenthesised_condition()?;
        self.tokens.expect(TokenKind::Semicolon)?;

        self.emit(Instruction::with_x(Operation::JMP, start as i32));
        let end = self.here();
        self.patch(to_end, end);
        for at in ctx.breaks {
            self.patch(at, end);
        }
        Ok(())
    }

    fn jump_statement(&mut self, kind: TokenKind, at: Pos) -> Result<(), Error> {
        self.tokens.next()?;
        self.tokens.expect(TokenKind::Semicolon)?;

        let continue_target = match self.loops.last() {
            Some(ctx) => ctx.continue_target,
            None => return Err(Error::new(at, ErrorKind::NotInLoop(kind))),
        };

        match (kind, continue_target) {
            (TokenKind::Continue, Some(target)) => {
                self.emit(Instruction::with_x(Operation::JMP, target as i32));
            }
            (TokenKind::Continue, None) => {
                let jump = self.jump(Operation::JMP);
                if let Some(ctx) = self.loops.last_mut() {
                    ctx.continues.push(jump);
                }
            }
            _ => {
                let jump = self.jump(Operation::JMP);
                if let Some(ctx) = self.loops.last_mut() {
                    ctx.breaks.push(jump);
                }
            }
        }
        Ok(())
    }

    fn return_statement(&mut self) -> Result<(), Error> {
        let at = self.tokens.expect(TokenKind::Return)?.start;
        let ret = match self.current {
            Some(f) => self.functions[f].ret,
            None => SymType::Void,
        };

        if self.tokens.eat(TokenKind::Semicolon).is_some() {
            if ret != SymType::Void {
                return Err(Error::new(at, ErrorKind::MissingReturnValue));
            }
            self.op(Operation::RET);
            return Ok(());
        }

        if ret == SymType::Void {
            return Err(Error::new(at, ErrorKind::ReturnValueFromVoid));
        }
        let value_at = self.tokens.here();
        let ty = self.expression()?;
        self.convert(ty, ret, value_at)?;
        self.tokens.expect(TokenKind::Semicolon)?;
        self.op(if ret == SymType::Double {
            Operation::DRET
        } else {
            Operation::IRET
        });
        Ok(())
    }

    fn print_statement(&mut self) -> Result<(), Error> {
        self.tokens.expect(TokenKind::Print)?;
        self.tokens.expect(TokenKind::LeftParen)?;

        if self.tokens.eat(TokenKind::RightParen).is_none() {
            let mut first = true;
            loop {
                if !first {
                    self.push_int(i32::from(b' '));
                    self.op(Operation::CPRINT);
                }
                first = false;
                self.printable()?;

                if self.tokens.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.tokens.expect(TokenKind::RightParen)?;
        }

        self.tokens.expect(TokenKind::Semicolon)?;
        self.op(Operation::PRINTL);
        Ok(())
    }

    fn printable(&mut self) -> Result<(), Error> {
        if let Some(tk) = self.tokens.eat(TokenKind::StringLiteral) {
            let text = match &tk.value {
                TokenValue::Text(text) => text.as_str(),
                _ => "",
            };
            let index = self.string_constant(text);
            self.emit(Instruction::with_x(Operation::LOADC, index));
            self.op(Operation::SPRINT);
            return Ok(());
        }

        let at = self.tokens.here();
        let op = match self.expression()? {
            SymType::Void => return Err(Error::new(at, ErrorKind::VoidValue)),
            SymType::Double => Operation::DPRINT,
            SymType::Char => Operation::CPRINT,
            _ => Operation::IPRINT,
        };
        self.op(op);
        Ok(())
    }

    /// Index of the string literal in the constant table, added on first use.
    fn string_constant(&mut self, text: &str) -> i32 {
        let existing = self
            .constants
            .iter()
            .position(|s| !s.is_function && s.ty == SymType::String && s.name == text);
        match existing {
            Some(index) => index as i32,
            None => self.constants.add_constant(text, SymType::String),
        }
    }

    fn scan_statement(&mut self) -> Result<(), Error> {
        self.tokens.expect(TokenKind::Scan)?;
        self.tokens.expect(TokenKind::LeftParen)?;
        let (name, at) = self.tokens.expect_identifier()?;
        self.tokens.expect(TokenKind::RightParen)?;
        self.tokens.expect(TokenKind::Semicolon)?;

        let var = self.assignable(name, at)?;
        self.address_of(&var);
        self.op(match var.ty {
            SymType::Double => Operation::DSCAN,
            SymType::Char => Operation::CSCAN,
            _ => Operation::ISCAN,
        });
        self.store(var.ty);
        self.mark_initialized(name, var.scope);
        Ok(())
    }

    fn assignable(&self, name: &str, at: Pos) -> Result<super::c0::Var, Error> {
        let var = match self.lookup_var(name) {
            Some(var) => var,
            None if self.lookup_function(name).is_some() => {
                return Err(Error::new(at, ErrorKind::NotAVariable(name.to_owned())))
            }
            None => return Err(Error::new(at, ErrorKind::Undeclared(name.to_owned()))),
        };
        if var.is_const {
            return Err(Error::new(at, ErrorKind::AssignToConst(name.to_owned())));
        }
        Ok(var)
    }

    /// Assignment or call, both of which start with a name.
    fn identifier_statement(&mut self) -> Result<(), Error> {
        let (name, at) = self.tokens.expect_identifier()?;

        match self.tokens.peek_kind() {
            Some(TokenKind::LeftParen) => {
                match self.call(name, at)? {
                    SymType::Double => self.op(Operation::POP2),
                    SymType::Void => (),
                    _ => self.op(Operation::POP),
                }
                self.tokens.expect(TokenKind::Semicolon)?;
            }
            Some(TokenKind::Assign) => {
                let var = self.assignable(name, at)?;
                let eq = self.tokens.expect(TokenKind::Assign)?;
                self.address_of(&var);
                let ty = self.expression()?;
                self.convert(ty, var.ty, eq.start)?;
                self.store(var.ty);
                self.tokens.expect(TokenKind::Semicolon)?;
                self.mark_initialized(name, var.scope);
            }
            _ => {
                let at = self.tokens.here();
                return Err(Error::new(at, ErrorKind::Expected(TokenKind::Assign)));
            }
        }
        Ok(())
    }
}
