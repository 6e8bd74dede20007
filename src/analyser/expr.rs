use super::{
    c0::Generator,
    error::{Error, ErrorKind},
};
use crate::{
    isa::{Instruction, Operation},
    symbols::SymType,
    tokenizer::{Pos, TokenKind, TokenValue},
};

impl<'t> Generator<'t> {
    pub fn expression(&mut self) -> Result<SymType, Error> {
        let mut lhs = self.term()?;
        loop {
            let (iop, dop) = match self.tokens.peek_kind() {
                Some(TokenKind::Plus) => (Operation::IADD, Operation::DADD),
                Some(TokenKind::Minus) => (Operation::ISUB, Operation::DSUB),
                _ => return Ok(lhs),
            };
            let at = self.tokens.next()?.start;
            let mark = self.here();
            let rhs = self.term()?;
            lhs = self.arithmetic(lhs, rhs, mark, at, iop, dop)?;
        }
    }

    fn term(&mut self) -> Result<SymType, Error> {
        let mut lhs = self.unary()?;
        loop {
            let (iop, dop) = match self.tokens.peek_kind() {
                Some(TokenKind::Star) => (Operation::IMUL, Operation::DMUL),
                Some(TokenKind::Slash) => (Operation::IDIV, Operation::DDIV),
                _ => return Ok(lhs),
            };
            let at = self.tokens.next()?.start;
            let mark = self.here();
            let rhs = self.unary()?;
            lhs = self.arithmetic(lhs, rhs, mark, at, iop, dop)?;
        }
    }

    /// Brings both operands to a common type. `mark` is where the right
    /// operand's code starts, so the left one can be widened in place.
    fn unify(&mut self, lhs: SymType, rhs: SymType, mark: usize, at: Pos) -> Result<SymType, Error> {
        if lhs == SymType::Void || rhs == SymType::Void {
            return Err(Error::new(at, ErrorKind::VoidValue));
        }
        if lhs != SymType::Double && rhs != SymType::Double {
            return Ok(SymType::Int);
        }

        if lhs != SymType::Double {
            self.insert(mark, Instruction::new(Operation::I2D));
        }
        if rhs != SymType::Double {
            self.op(Operation::I2D);
        }
        Ok(SymType::Double)
    }

    fn arithmetic(
        &mut self,
        lhs: SymType,
        rhs: SymType,
        mark: usize,
        at: Pos,
        iop: Operation,
        dop: Operation,
    ) -> Result<SymType, Error> {
        let ty = self.unify(lhs, rhs, mark, at)?;
        self.op(if ty == SymType::Double { dop } else { iop });
        Ok(ty)
    }

    fn unary(&mut self) -> Result<SymType, Error> {
        let negate = match self.tokens.peek_kind() {
            Some(TokenKind::Minus) => true,
            Some(TokenKind::Plus) => false,
            _ => return self.primary(),
        };

        let at = self.tokens.next()?.start;
        let ty = match self.unary()? {
            SymType::Void => return Err(Error::new(at, ErrorKind::VoidValue)),
            SymType::Double => SymType::Double,
            _ => SymType::Int,
        };
        if negate {
            self.op(if ty == SymType::Double {
                Operation::DNEG
            } else {
                Operation::INEG
            });
        }
        Ok(ty)
    }

    fn primary(&mut self) -> Result<SymType, Error> {
        let at = self.tokens.here();
        let tk = self.tokens.next()?;
        match (tk.kind, &tk.value) {
            (TokenKind::LeftParen, _) => {
                let ty = self.expression()?;
                self.tokens.expect(TokenKind::RightParen)?;
                Ok(ty)
            }
            (TokenKind::IntegerLiteral, TokenValue::Integer(v)) => {
                self.push_int(*v);
                Ok(SymType::Int)
            }
            (TokenKind::FloatLiteral, TokenValue::Float(text)) => {
                // The tokenizer only lets well-formed literals through, and
                // out-of-range ones saturate to infinity.
                let v = text.parse::<f64>().unwrap_or(f64::INFINITY);
                self.push_double(v);
                Ok(SymType::Double)
            }
            (TokenKind::CharLiteral, TokenValue::Text(text)) => {
                let c = text.chars().next().map_or(0, u32::from);
                self.push_int(c as i32);
                Ok(SymType::Char)
            }
            (TokenKind::Identifier, TokenValue::Text(name)) => {
                if self.tokens.peek_kind() == Some(TokenKind::LeftParen) {
                    self.call(name, at)
                } else {
                    self.variable(name, at)
                }
            }
            (kind, _) if kind == TokenKind::StringLiteral || kind.spelling().is_some() => {
                Err(Error::new(at, ErrorKind::ExpectedExpression))
            }
            (kind, _) => Err(Error::new(at, ErrorKind::UnexpectedToken(kind))),
        }
    }

    fn variable(&mut self, name: &str, at: Pos) -> Result<SymType, Error> {
        let var = match self.lookup_var(name) {
            Some(var) => var,
            None if self.lookup_function(name).is_some() => {
                return Err(Error::new(at, ErrorKind::NotAVariable(name.to_owned())))
            }
            None => return Err(Error::new(at, ErrorKind::Undeclared(name.to_owned()))),
        };
        if !var.is_initialized {
            return Err(Error::new(at, ErrorKind::UseUninitialized(name.to_owned())));
        }

        self.address_of(&var);
        self.load(var.ty);
        Ok(var.ty)
    }

    /// Generates a call whose name has been consumed; returns the callee's
    /// return type.
    pub fn call(&mut self, name: &str, at: Pos) -> Result<SymType, Error> {
        if self.lookup_var(name).is_some() {
            return Err(Error::new(at, ErrorKind::NotAFunction(name.to_owned())));
        }
        let (order, ret, params) = match self.lookup_function(name) {
            Some((order, sig)) => (order, sig.ret, sig.params.clone()),
            None => return Err(Error::new(at, ErrorKind::Undeclared(name.to_owned()))),
        };

        self.tokens.expect(TokenKind::LeftParen)?;
        let mut found = 0;
        if self.tokens.eat(TokenKind::RightParen).is_none() {
            loop {
                let arg_at = self.tokens.here();
                let ty = self.expression()?;
                match params.get(found) {
                    Some(param) => self.convert(ty, *param, arg_at)?,
                    None if ty == SymType::Void => {
                        return Err(Error::new(arg_at, ErrorKind::VoidValue))
                    }
                    None => (),
                }
                found += 1;
                if self.tokens.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.tokens.expect(TokenKind::RightParen)?;
        }

        if found != params.len() {
            return Err(Error::new(
                at,
                ErrorKind::ArgumentCount {
                    name: name.to_owned(),
                    expected: params.len(),
                    found,
                },
            ));
        }

        self.emit(Instruction::with_x(Operation::CALL, order as i32));
        Ok(ret)
    }

    /// Generates a condition and a jump taken when it is false. Returns the
    /// jump's offset for patching.
    pub fn condition(&mut self) -> Result<usize, Error> {
        let at = self.tokens.here();
        let lhs = self.expression()?;

        let jump = match self.tokens.peek_kind() {
            Some(kind) if kind.is_relational() => {
                let op_at = self.tokens.next()?.start;
                let mark = self.here();
                let rhs = self.expression()?;
                let ty = self.unify(lhs, rhs, mark, op_at)?;
                self.op(if ty == SymType::Double {
                    Operation::DCMP
                } else {
                    Operation::ICMP
                });
                negated_jump(kind)
            }
            _ => {
                match lhs {
                    SymType::Void => return Err(Error::new(at, ErrorKind::VoidValue)),
                    SymType::Double => {
                        self.push_double(0.0);
                        self.op(Operation::DCMP);
                    }
                    _ => (),
                }
                Operation::JE
            }
        };

        Ok(self.jump(jump))
    }
}

fn negated_jump(kind: TokenKind) -> Operation {
    match kind {
        TokenKind::Less => Operation::JGE,
        TokenKind::LessEqual => Operation::JG,
        TokenKind::Greater => Operation::JLE,
        TokenKind::GreaterEqual => Operation::JL,
        TokenKind::Equal => Operation::JNE,
        _ => Operation::JE,
    }
}
