use super::error::{Error, ErrorKind};
use crate::tokenizer::{Pos, Token, TokenKind};

/// Lightweight cursor over the token slice. Tokens are handed out with the
/// slice's lifetime so callers can hold them while mutating the analyser.
#[derive(Debug, Clone)]
pub struct TokenStream<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> TokenStream<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        TokenStream { tokens, pos: 0 }
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|tk| tk.kind)
    }

    pub fn peek_nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|tk| tk.kind)
    }

    /// Where the next token starts, or where the last one ended.
    pub fn here(&self) -> Pos {
        match self.peek() {
            Some(tk) => tk.start,
            None => self.tokens.last().map_or(Pos::default(), |tk| tk.end),
        }
    }

    pub fn next(&mut self) -> Result<&'t Token, Error> {
        let tk = self
            .peek()
            .ok_or_else(|| Error::new(self.here(), ErrorKind::UnexpectedEndOfInput))?;
        self.pos += 1;
        Ok(tk)
    }

    /// Consumes the next token if it is a `kind`.
    pub fn eat(&mut self, kind: TokenKind) -> Option<&'t Token> {
        let tk = self.peek().filter(|tk| tk.kind == kind)?;
        self.pos += 1;
        Some(tk)
    }

    pub fn expect(&mut self, kind: TokenKind) -> Result<&'t Token, Error> {
        let at = self.here();
        self.eat(kind)
            .ok_or_else(|| Error::new(at, ErrorKind::Expected(kind)))
    }

    pub fn expect_identifier(&mut self) -> Result<(&'t str, Pos), Error> {
        let tk = self.expect(TokenKind::Identifier)?;
        Ok((tk.text().unwrap_or_default(), tk.start))
    }
}

#[cfg(test)]
mod tests {
    use super::TokenStream;
    use crate::analyser::{Error, ErrorKind};
    use crate::tokenizer::{tokenize, Pos, TokenKind};

    #[test]
    fn expect_reports_where_the_token_should_be() {
        let tokens = tokenize("a ;\n b").unwrap();
        let mut ts = TokenStream::new(&tokens);
        assert_eq!(ts.expect_identifier().unwrap().0, "a");
        assert!(ts.eat(TokenKind::Comma).is_none());
        assert!(ts.eat(TokenKind::Semicolon).is_some());
        assert_eq!(
            ts.expect(TokenKind::Comma),
            Err(Error::new(Pos::new(1, 1), ErrorKind::Expected(TokenKind::Comma)))
        );
        ts.next().unwrap();
        assert!(ts.is_eof());
        assert_eq!(
            ts.next(),
            Err(Error::new(Pos::new(1, 2), ErrorKind::UnexpectedEndOfInput))
        );
    }
}
