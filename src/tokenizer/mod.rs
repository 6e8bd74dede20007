pub mod cursor;
pub mod dfa;
pub mod error;
pub mod token;

pub use cursor::Pos;
pub use error::{CompilationError, ErrorKind};
pub use token::{Token, TokenKind, TokenValue};

use dfa::{Action, Finish, State};
use log::{debug, trace};
use std::io::Read;
use std::num::IntErrorKind;

enum Buffer<R> {
    Unread(R),
    Ready(cursor::Cursor),
    Failed,
}

/// Scans a character stream into tokens, one `next_token` call at a time.
///
/// The whole stream is read into memory on the first call; a read failure is
/// reported as `ErrorKind::StreamRead` from then on.
pub struct Tokenizer<R: Read> {
    buffer: Buffer<R>,
}

impl<'a> Tokenizer<&'a [u8]> {
    pub fn from_source(source: &'a str) -> Self {
        Tokenizer::new(source.as_bytes())
    }
}

impl<R: Read> Tokenizer<R> {
    pub fn new(reader: R) -> Self {
        Tokenizer {
            buffer: Buffer::Unread(reader),
        }
    }

    fn cursor(&mut self) -> Result<&mut cursor::Cursor, CompilationError> {
        if let Buffer::Unread(reader) = &mut self.buffer {
            let mut bytes = Vec::new();
            self.buffer = match reader.read_to_end(&mut bytes) {
                Ok(len) => {
                    debug!("buffered {} bytes of source", len);
                    Buffer::Ready(cursor::Cursor::from_bytes(&bytes))
                }
                Err(err) => {
                    debug!("reading source failed: {}", err);
                    Buffer::Failed
                }
            };
        }

        match &mut self.buffer {
            Buffer::Ready(cur) => Ok(cur),
            _ => Err(CompilationError::at(0, 0, ErrorKind::StreamRead)),
        }
    }

    /// Returns the next token, or the error which stopped scanning. Running
    /// out of input is reported as `ErrorKind::EndOfInput`.
    pub fn next_token(&mut self) -> Result<Token, CompilationError> {
        let cur = self.cursor()?;
        if cur.is_eof() {
            return Err(CompilationError::at(0, 0, ErrorKind::EndOfInput));
        }

        let tk = scan(cur)?;
        check_token(&tk)?;
        trace!("token {}", tk);
        Ok(tk)
    }

    /// Drains the stream. End of input is success; any other error discards
    /// everything scanned so far.
    pub fn all_tokens(&mut self) -> Result<Vec<Token>, CompilationError> {
        let mut tokens = Vec::new();
        loop {
            match self.next_token() {
                Ok(tk) => tokens.push(tk),
                Err(err) if err.is_end_of_input() => {
                    debug!("scanned {} tokens", tokens.len());
                    return Ok(tokens);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, CompilationError> {
    Tokenizer::from_source(source).all_tokens()
}

fn scan(cur: &mut cursor::Cursor) -> Result<Token, CompilationError> {
    let mut state = State::Initial;
    let mut lexeme = String::new();
    let mut start = cur.position();

    loop {
        if state == State::Initial {
            start = cur.position();
        }

        let c = cur.advance();
        let (next, action) = dfa::step(state, c);

        match action {
            Action::Skip => (),
            Action::Consume => lexeme.extend(c),
            Action::Emit(finish) => {
                lexeme.extend(c);
                return finish_token(finish, lexeme, start, cur.position());
            }
            Action::PushBackAndEmit(finish) => {
                if c.is_some() {
                    cur.retreat();
                }
                return finish_token(finish, lexeme, start, cur.position());
            }
            Action::Fail(kind) => return Err(fail(start, kind)),
            Action::PushBackAndFail(kind) => {
                if c.is_some() {
                    cur.retreat();
                }
                return Err(fail(start, kind));
            }
            Action::Restart => lexeme.clear(),
        }

        state = next;
    }
}

fn fail(start: Pos, kind: ErrorKind) -> CompilationError {
    match kind {
        ErrorKind::EndOfInput => CompilationError::at(0, 0, kind),
        _ => CompilationError::new(start, kind),
    }
}

fn finish_token(
    finish: Finish,
    lexeme: String,
    start: Pos,
    end: Pos,
) -> Result<Token, CompilationError> {
    let err = |kind| CompilationError::new(start, kind);

    let (kind, value) = match finish {
        Finish::Decimal => {
            let v = lexeme.parse::<i32>().map_err(|e| match e.kind() {
                IntErrorKind::PosOverflow => err(ErrorKind::IntegerOverflow),
                _ => err(ErrorKind::InvalidInteger),
            })?;
            (TokenKind::IntegerLiteral, TokenValue::Integer(v))
        }
        Finish::Hexadecimal => {
            let digits = lexeme.get(2..).unwrap_or("");
            let v = i32::from_str_radix(digits, 16).map_err(|e| match e.kind() {
                IntErrorKind::PosOverflow => err(ErrorKind::IntegerOverflow),
                _ => err(ErrorKind::HexIntegerParse),
            })?;
            (TokenKind::IntegerLiteral, TokenValue::Integer(v))
        }
        Finish::Float => (TokenKind::FloatLiteral, TokenValue::Float(lexeme)),
        Finish::Word => (TokenKind::classify_word(&lexeme), TokenValue::Text(lexeme)),
        Finish::Char => (
            TokenKind::CharLiteral,
            TokenValue::Text(unescape(strip_quotes(&lexeme))),
        ),
        Finish::String => (
            TokenKind::StringLiteral,
            TokenValue::Text(unescape(strip_quotes(&lexeme))),
        ),
        Finish::Fixed(kind) => (kind, TokenValue::Text(lexeme)),
    };

    Ok(Token::new(kind, value, start, end))
}

fn strip_quotes(lexeme: &str) -> &str {
    lexeme
        .get(1..lexeme.len().saturating_sub(1))
        .unwrap_or_default()
}

/// Decodes the escapes of a literal body the automaton has already accepted.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('x') => {
                let hex = chars.by_ref().take(2).collect::<String>();
                if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                    out.push(char::from(byte));
                }
            }
            Some(other) => out.push(other),
            None => (),
        }
    }
    out
}

/// An identifier can never start with a digit. The automaton already
/// guarantees this; the check stays as a guard on the token stream.
fn check_token(tk: &Token) -> Result<(), CompilationError> {
    match (tk.kind, tk.text()) {
        (TokenKind::Identifier, Some(text))
            if text.chars().next().map_or(false, |c| c.is_ascii_digit()) =>
        {
            Err(CompilationError::new(tk.start, ErrorKind::InvalidIdentifier))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{tokenize, CompilationError, ErrorKind, Pos, Token, TokenKind, TokenValue, Tokenizer};
    use std::io::Read;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|tk| tk.kind).collect()
    }

    fn single(source: &str) -> Token {
        let mut tokens = tokenize(source).unwrap();
        assert_eq!(tokens.len(), 1, "expected one token from {:?}", source);
        tokens.remove(0)
    }

    fn error(source: &str) -> CompilationError {
        tokenize(source).unwrap_err()
    }

    #[test]
    fn whitespace_only_yields_nothing() {
        assert_eq!(tokenize("").unwrap(), vec![]);
        assert_eq!(tokenize(" \t\r\n\n   \x0b\x0c").unwrap(), vec![]);
    }

    #[test]
    fn decimal_integers_round_trip() {
        for v in &[0, 1, 7, 42, 1000, 65535, 2_147_483_647] {
            let tk = single(&v.to_string());
            assert_eq!(tk.kind, TokenKind::IntegerLiteral);
            assert_eq!(tk.value, TokenValue::Integer(*v));
        }
    }

    #[test]
    fn leading_zeros_stay_decimal() {
        assert_eq!(single("0017").value, TokenValue::Integer(17));
        assert_eq!(single("010").value, TokenValue::Integer(10));
    }

    #[test]
    fn decimal_overflow() {
        assert_eq!(
            error("2147483648"),
            CompilationError::at(0, 0, ErrorKind::IntegerOverflow)
        );
    }

    #[test]
    fn hexadecimal_integers() {
        let tk = single("0x1A");
        assert_eq!(tk.kind, TokenKind::IntegerLiteral);
        assert_eq!(tk.value, TokenValue::Integer(26));
        assert_eq!(tk.end, Pos::new(0, 4));
        assert_eq!(single("0XfF").value, TokenValue::Integer(255));
        assert_eq!(
            error("0x80000000"),
            CompilationError::at(0, 0, ErrorKind::IntegerOverflow)
        );
    }

    #[test]
    fn bare_hex_prefix_is_an_invalid_identifier() {
        // The line's newline ends the prefix like any other non-hex character.
        assert_eq!(
            error("0x"),
            CompilationError::at(0, 0, ErrorKind::InvalidIdentifier)
        );
        assert_eq!(
            error("0xG"),
            CompilationError::at(0, 0, ErrorKind::InvalidIdentifier)
        );
    }

    #[test]
    fn letter_after_bare_zero() {
        assert_eq!(error("0a"), CompilationError::at(0, 0, ErrorKind::InvalidInteger));
        assert_eq!(error(" 0e1"), CompilationError::at(0, 1, ErrorKind::InvalidInteger));
    }

    #[test]
    fn floating_literals_keep_their_text() {
        for text in &["3.14", "3.14e-2", "0.5E+10", ".5", "12e3", "007.25"] {
            let tk = single(text);
            assert_eq!(tk.kind, TokenKind::FloatLiteral);
            assert_eq!(tk.value, TokenValue::Float(text.to_string()));
        }
    }

    #[test]
    fn malformed_floating_literals() {
        for text in &["3.", "3.;", "3.e5", "1e", "1e+", ".x"] {
            assert_eq!(
                error(text),
                CompilationError::at(0, 0, ErrorKind::InvalidInput),
                "{}",
                text
            );
        }
    }

    #[test]
    fn digit_led_word_is_never_an_identifier() {
        let tokens = tokenize("9x").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].value, TokenValue::Integer(9));
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].value, TokenValue::Text("x".to_owned()));
        assert!(tokens
            .iter()
            .filter(|tk| tk.kind == TokenKind::Identifier)
            .all(|tk| !tk.text().unwrap().starts_with(|c: char| c.is_ascii_digit())));
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("const int x1 double print scan struct"),
            vec![
                TokenKind::Const,
                TokenKind::Int,
                TokenKind::Identifier,
                TokenKind::Double,
                TokenKind::Print,
                TokenKind::Scan,
                TokenKind::Struct,
            ]
        );
    }

    #[test]
    fn operators() {
        assert_eq!(
            kinds("+-*/ = == != < <= > >= (){},;"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Assign,
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Comma,
                TokenKind::Semicolon,
            ]
        );
        assert_eq!(kinds("a/"), vec![TokenKind::Identifier, TokenKind::Slash]);
        assert_eq!(error("a !b"), CompilationError::at(0, 2, ErrorKind::InvalidInput));
    }

    #[test]
    fn string_escapes() {
        let tk = single("\"a\\tb\"");
        assert_eq!(tk.kind, TokenKind::StringLiteral);
        assert_eq!(tk.value, TokenValue::Text("a\tb".to_owned()));

        assert_eq!(
            single(r#""\x41\\\"\'\n""#).value,
            TokenValue::Text("A\\\"'\n".to_owned())
        );
        assert_eq!(
            error("\"a\\qb\""),
            CompilationError::at(0, 0, ErrorKind::InvalidStringLiteral)
        );
        assert_eq!(
            error("\"abc"),
            CompilationError::at(0, 0, ErrorKind::InvalidStringLiteral)
        );
        assert_eq!(
            error("\"\\x4\""),
            CompilationError::at(0, 0, ErrorKind::InvalidStringLiteral)
        );
    }

    #[test]
    fn char_literals() {
        assert_eq!(single("'a'").value, TokenValue::Text("a".to_owned()));
        assert_eq!(single("'\"'").value, TokenValue::Text("\"".to_owned()));
        assert_eq!(single("'\\x7e'").value, TokenValue::Text("~".to_owned()));
        assert_eq!(single("'\\''").value, TokenValue::Text("'".to_owned()));
        for bad in &["''", "'ab'", "'a", "'\\z'", "'\n'"] {
            assert_eq!(
                error(bad),
                CompilationError::at(0, 0, ErrorKind::InvalidCharLiteral),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn line_comment_is_elided() {
        let with = tokenize("//comment\nint x;").unwrap();
        let without = tokenize("int x;").unwrap();
        assert_eq!(
            with.iter().map(|tk| (tk.kind, tk.value.clone())).collect::<Vec<_>>(),
            without.iter().map(|tk| (tk.kind, tk.value.clone())).collect::<Vec<_>>()
        );
        assert_eq!(with[0].start, Pos::new(1, 0));
        assert_eq!(with[0].end, Pos::new(1, 3));
    }

    #[test]
    fn block_comments() {
        assert_eq!(
            kinds("a /* b * c **/ d"),
            vec![TokenKind::Identifier, TokenKind::Identifier]
        );
        assert_eq!(
            error("x /* never closed *"),
            CompilationError::at(0, 2, ErrorKind::IncompleteComment)
        );
        assert_eq!(
            error("x\n/* never closed"),
            CompilationError::at(1, 0, ErrorKind::IncompleteComment)
        );
    }

    #[test]
    fn line_comment_may_end_the_source() {
        let tokens = tokenize("int x; // trailing").unwrap();
        assert_eq!(
            tokens.iter().map(|tk| tk.kind).collect::<Vec<_>>(),
            vec![TokenKind::Int, TokenKind::Identifier, TokenKind::Semicolon]
        );
        assert_eq!(kinds("// only a comment"), vec![]);
    }

    #[test]
    fn tokens_at_end_of_input_end_on_their_line() {
        let tokens = tokenize("a\nbc").unwrap();
        assert_eq!(tokens[1].start, Pos::new(1, 0));
        assert_eq!(tokens[1].end, Pos::new(1, 2));
        assert_eq!(single("42").end, Pos::new(0, 2));
    }

    #[test]
    fn positions_span_lines() {
        let tokens = tokenize("int\n  main ( )").unwrap();
        assert_eq!(tokens[0].start, Pos::new(0, 0));
        assert_eq!(tokens[0].end, Pos::new(0, 3));
        assert_eq!(tokens[1].start, Pos::new(1, 2));
        assert_eq!(tokens[1].end, Pos::new(1, 6));
        assert_eq!(tokens[3].start, Pos::new(1, 9));
    }

    #[test]
    fn non_printable_input_is_rejected_in_place() {
        assert_eq!(
            error("int \x01x"),
            CompilationError::at(0, 4, ErrorKind::InvalidInput)
        );
        assert_eq!(error("\u{e9}"), CompilationError::at(0, 0, ErrorKind::InvalidInput));
    }

    #[test]
    fn next_token_reports_end_of_input() {
        let mut tkz = Tokenizer::from_source("x");
        assert_eq!(tkz.next_token().unwrap().kind, TokenKind::Identifier);
        assert_eq!(
            tkz.next_token(),
            Err(CompilationError::at(0, 0, ErrorKind::EndOfInput))
        );
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "broken"))
        }
    }

    #[test]
    fn read_failure_is_a_stream_error() {
        let mut tkz = Tokenizer::new(Broken);
        assert_eq!(
            tkz.all_tokens(),
            Err(CompilationError::at(0, 0, ErrorKind::StreamRead))
        );
    }
}
