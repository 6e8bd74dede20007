//! The scanner automaton.
//!
//! `step` is a pure function from the current state and the next input
//! character (`None` at end of input) to the following state plus an
//! `Action` telling the driver what to do with that character. The driver in
//! `super::Tokenizer` owns the cursor and the lexeme buffer; nothing here
//! touches either, so every transition can be tested in isolation.

use super::error::ErrorKind;
use super::token::TokenKind;

/// Progress through the body of a char or string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    Open,
    Escape,
    HexHigh,
    HexLow,
    /// A char literal has its single element and wants the closing quote.
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Initial,

    Zero,
    ZeroDigit,
    DecimalInteger,
    /// `0x`/`0X` read, no hex digit yet.
    HexPrefix,
    HexadecimalInteger,

    /// A `.` which still needs a digit after it.
    Point,
    /// Digits after the decimal point.
    Digit,
    E,
    ExponentSign,
    ExponentDigit,

    Identifier,

    Char(Body),
    String(Body),

    /// Single-character punctuation which can never be extended.
    Punct(TokenKind),
    Slash,
    Equals,
    Less,
    Greater,
    Bang,

    LineComment,
    BlockComment,
    BlockCommentStar,
}

/// How the driver turns the accumulated lexeme into a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    Decimal,
    Hexadecimal,
    Float,
    Word,
    Char,
    String,
    Fixed(TokenKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Consume the character without recording it.
    Skip,
    /// Append the character to the lexeme.
    Consume,
    /// Append the character (if any) and finish the token.
    Emit(Finish),
    /// Put the character back and finish the token.
    PushBackAndEmit(Finish),
    Fail(ErrorKind),
    PushBackAndFail(ErrorKind),
    /// A comment ended: forget the lexeme and scan a fresh token.
    Restart,
}

pub fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

pub fn is_printable(c: char) -> bool {
    matches!(c, ' '..='~')
}

/// Characters allowed verbatim inside char and string literals.
pub fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            ' ' | '\t'
                | '_'
                | '('
                | ')'
                | '['
                | ']'
                | '{'
                | '}'
                | '<'
                | '='
                | '>'
                | '.'
                | ','
                | ':'
                | ';'
                | '!'
                | '?'
                | '+'
                | '-'
                | '*'
                | '/'
                | '%'
                | '^'
                | '&'
                | '|'
                | '~'
                | '"'
                | '`'
                | '$'
                | '#'
                | '@'
        )
}

pub fn is_simple_escape(c: char) -> bool {
    matches!(c, '\\' | '\'' | '"' | 'n' | 'r' | 't')
}

fn initial(c: Option<char>) -> (State, Action) {
    let c = match c {
        None => return (State::Initial, Action::Fail(ErrorKind::EndOfInput)),
        Some(c) => c,
    };

    if is_space(c) {
        return (State::Initial, Action::Skip);
    }

    if !is_printable(c) {
        return (State::Initial, Action::PushBackAndFail(ErrorKind::InvalidInput));
    }

    let next = match c {
        '0' => State::Zero,
        '1'..='9' => State::DecimalInteger,
        c if c.is_ascii_alphabetic() => State::Identifier,
        '+' => State::Punct(TokenKind::Plus),
        '-' => State::Punct(TokenKind::Minus),
        '*' => State::Punct(TokenKind::Star),
        '(' => State::Punct(TokenKind::LeftParen),
        ')' => State::Punct(TokenKind::RightParen),
        '{' => State::Punct(TokenKind::LeftBrace),
        '}' => State::Punct(TokenKind::RightBrace),
        ',' => State::Punct(TokenKind::Comma),
        ';' => State::Punct(TokenKind::Semicolon),
        '/' => State::Slash,
        '.' => State::Point,
        '=' => State::Equals,
        '<' => State::Less,
        '>' => State::Greater,
        '!' => State::Bang,
        '\'' => State::Char(Body::Open),
        '"' => State::String(Body::Open),
        _ => return (State::Initial, Action::PushBackAndFail(ErrorKind::InvalidInput)),
    };

    (next, Action::Consume)
}

/// Shared by the integer states which may still turn into a floating literal.
fn decimal(state: State, c: Option<char>) -> (State, Action) {
    match c {
        Some(c) if c.is_ascii_digit() => (state, Action::Consume),
        Some('.') => (State::Point, Action::Consume),
        Some('e') | Some('E') => (State::E, Action::Consume),
        _ => (state, Action::PushBackAndEmit(Finish::Decimal)),
    }
}

/// Steps through an escape sequence, or returns `None` if `c` cannot
/// continue the body in its current `Body` state.
fn escape(body: Body, c: char) -> Option<Body> {
    match body {
        Body::Escape if c == 'x' => Some(Body::HexHigh),
        Body::Escape if is_simple_escape(c) => Some(Body::Closing),
        Body::HexHigh if c.is_ascii_hexdigit() => Some(Body::HexLow),
        Body::HexLow if c.is_ascii_hexdigit() => Some(Body::Closing),
        _ => None,
    }
}

fn char_literal(body: Body, c: Option<char>) -> (State, Action) {
    let fail = (State::Char(body), Action::Fail(ErrorKind::InvalidCharLiteral));
    let c = match c {
        Some(c) => c,
        None => return fail,
    };

    match body {
        Body::Open if c == '\\' => (State::Char(Body::Escape), Action::Consume),
        Body::Open if c != '\'' && is_safe_char(c) => (State::Char(Body::Closing), Action::Consume),
        Body::Open => fail,
        Body::Closing if c == '\'' => (State::Char(body), Action::Emit(Finish::Char)),
        Body::Closing => fail,
        _ => match escape(body, c) {
            Some(next) => (State::Char(next), Action::Consume),
            None => fail,
        },
    }
}

fn string_literal(body: Body, c: Option<char>) -> (State, Action) {
    let fail = (State::String(body), Action::Fail(ErrorKind::InvalidStringLiteral));
    let c = match c {
        Some(c) => c,
        None => return fail,
    };

    match body {
        Body::Open if c == '"' => (State::String(body), Action::Emit(Finish::String)),
        Body::Open if c == '\\' => (State::String(Body::Escape), Action::Consume),
        Body::Open if is_safe_char(c) => (State::String(Body::Open), Action::Consume),
        Body::Open => fail,
        _ => match escape(body, c) {
            Some(Body::Closing) => (State::String(Body::Open), Action::Consume),
            Some(next) => (State::String(next), Action::Consume),
            None => fail,
        },
    }
}

fn maybe_followed_by_equals(c: Option<char>, long: TokenKind, short: TokenKind) -> Action {
    match c {
        Some('=') => Action::Emit(Finish::Fixed(long)),
        _ => Action::PushBackAndEmit(Finish::Fixed(short)),
    }
}

pub fn step(state: State, c: Option<char>) -> (State, Action) {
    let is_digit = c.map_or(false, |c| c.is_ascii_digit());

    match state {
        State::Initial => initial(c),

        State::Zero => match c {
            Some('x') | Some('X') => (State::HexPrefix, Action::Consume),
            Some(c) if c.is_ascii_alphabetic() => {
                (state, Action::Fail(ErrorKind::InvalidInteger))
            }
            Some(c) if c.is_ascii_digit() => (State::ZeroDigit, Action::Consume),
            Some('.') => (State::Point, Action::Consume),
            _ => (state, Action::PushBackAndEmit(Finish::Decimal)),
        },
        State::ZeroDigit | State::DecimalInteger => decimal(state, c),

        State::HexPrefix => match c {
            None => (state, Action::Fail(ErrorKind::InvalidInteger)),
            Some(c) if c.is_ascii_hexdigit() => (State::HexadecimalInteger, Action::Consume),
            Some(_) => (state, Action::PushBackAndFail(ErrorKind::InvalidIdentifier)),
        },
        State::HexadecimalInteger => match c {
            Some(c) if c.is_ascii_hexdigit() => (state, Action::Consume),
            _ => (state, Action::PushBackAndEmit(Finish::Hexadecimal)),
        },

        State::Point if is_digit => (State::Digit, Action::Consume),
        State::Point => (state, Action::Fail(ErrorKind::InvalidInput)),
        State::Digit => match c {
            Some(c) if c.is_ascii_digit() => (state, Action::Consume),
            Some('e') | Some('E') => (State::E, Action::Consume),
            _ => (state, Action::PushBackAndEmit(Finish::Float)),
        },
        State::E => match c {
            Some('+') | Some('-') => (State::ExponentSign, Action::Consume),
            Some(c) if c.is_ascii_digit() => (State::ExponentDigit, Action::Consume),
            _ => (state, Action::Fail(ErrorKind::InvalidInput)),
        },
        State::ExponentSign if is_digit => (State::ExponentDigit, Action::Consume),
        State::ExponentSign => (state, Action::Fail(ErrorKind::InvalidInput)),
        State::ExponentDigit if is_digit => (state, Action::Consume),
        State::ExponentDigit => (state, Action::PushBackAndEmit(Finish::Float)),

        State::Identifier => match c {
            Some(c) if c.is_ascii_alphanumeric() => (state, Action::Consume),
            _ => (state, Action::PushBackAndEmit(Finish::Word)),
        },

        State::Char(body) => char_literal(body, c),
        State::String(body) => string_literal(body, c),

        State::Punct(kind) => (state, Action::PushBackAndEmit(Finish::Fixed(kind))),
        State::Slash => match c {
            Some('/') => (State::LineComment, Action::Skip),
            Some('*') => (State::BlockComment, Action::Skip),
            _ => (state, Action::PushBackAndEmit(Finish::Fixed(TokenKind::Slash))),
        },
        State::Equals => (
            state,
            maybe_followed_by_equals(c, TokenKind::Equal, TokenKind::Assign),
        ),
        State::Less => (
            state,
            maybe_followed_by_equals(c, TokenKind::LessEqual, TokenKind::Less),
        ),
        State::Greater => (
            state,
            maybe_followed_by_equals(c, TokenKind::GreaterEqual, TokenKind::Greater),
        ),
        State::Bang => match c {
            Some('=') => (state, Action::Emit(Finish::Fixed(TokenKind::NotEqual))),
            _ => (state, Action::Fail(ErrorKind::InvalidInput)),
        },

        State::LineComment => match c {
            None => (state, Action::Fail(ErrorKind::IncompleteComment)),
            Some('\n') | Some('\r') => (State::Initial, Action::Restart),
            Some(_) => (state, Action::Skip),
        },
        State::BlockComment => match c {
            None => (state, Action::Fail(ErrorKind::IncompleteComment)),
            Some('*') => (State::BlockCommentStar, Action::Skip),
            Some(_) => (state, Action::Skip),
        },
        State::BlockCommentStar => match c {
            None => (state, Action::Fail(ErrorKind::IncompleteComment)),
            Some('/') => (State::Initial, Action::Restart),
            Some('*') => (state, Action::Skip),
            Some(_) => (State::BlockComment, Action::Skip),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{step, Action, Body, Finish, State};
    use crate::tokenizer::error::ErrorKind;
    use crate::tokenizer::token::TokenKind;

    #[test]
    fn leading_zero_branches() {
        assert_eq!(step(State::Initial, Some('0')), (State::Zero, Action::Consume));
        assert_eq!(step(State::Zero, Some('x')), (State::HexPrefix, Action::Consume));
        assert_eq!(step(State::Zero, Some('X')), (State::HexPrefix, Action::Consume));
        assert_eq!(step(State::Zero, Some('7')), (State::ZeroDigit, Action::Consume));
        assert_eq!(step(State::Zero, Some('.')), (State::Point, Action::Consume));
        assert_eq!(
            step(State::Zero, Some('e')),
            (State::Zero, Action::Fail(ErrorKind::InvalidInteger))
        );
        assert_eq!(
            step(State::Zero, Some(';')),
            (State::Zero, Action::PushBackAndEmit(Finish::Decimal))
        );
    }

    #[test]
    fn hex_prefix_failure_depends_on_terminator() {
        assert_eq!(
            step(State::HexPrefix, None),
            (State::HexPrefix, Action::Fail(ErrorKind::InvalidInteger))
        );
        assert_eq!(
            step(State::HexPrefix, Some('G')),
            (
                State::HexPrefix,
                Action::PushBackAndFail(ErrorKind::InvalidIdentifier)
            )
        );
        assert_eq!(
            step(State::HexPrefix, Some('a')),
            (State::HexadecimalInteger, Action::Consume)
        );
    }

    #[test]
    fn decimal_point_needs_a_digit() {
        assert_eq!(
            step(State::DecimalInteger, Some('.')),
            (State::Point, Action::Consume)
        );
        assert_eq!(
            step(State::Point, None),
            (State::Point, Action::Fail(ErrorKind::InvalidInput))
        );
        assert_eq!(
            step(State::Point, Some('e')),
            (State::Point, Action::Fail(ErrorKind::InvalidInput))
        );
        assert_eq!(step(State::Point, Some('1')), (State::Digit, Action::Consume));
    }

    #[test]
    fn exponent_accepts_one_sign_then_digits() {
        assert_eq!(step(State::Digit, Some('E')), (State::E, Action::Consume));
        assert_eq!(step(State::E, Some('-')), (State::ExponentSign, Action::Consume));
        assert_eq!(
            step(State::ExponentSign, Some('+')),
            (State::ExponentSign, Action::Fail(ErrorKind::InvalidInput))
        );
        assert_eq!(
            step(State::ExponentSign, Some('2')),
            (State::ExponentDigit, Action::Consume)
        );
        assert_eq!(
            step(State::ExponentDigit, None),
            (State::ExponentDigit, Action::PushBackAndEmit(Finish::Float))
        );
    }

    #[test]
    fn whitespace_and_garbage_in_initial() {
        assert_eq!(step(State::Initial, Some('\t')), (State::Initial, Action::Skip));
        assert_eq!(
            step(State::Initial, Some('\x07')),
            (State::Initial, Action::PushBackAndFail(ErrorKind::InvalidInput))
        );
        assert_eq!(
            step(State::Initial, Some('#')),
            (State::Initial, Action::PushBackAndFail(ErrorKind::InvalidInput))
        );
        assert_eq!(
            step(State::Initial, None),
            (State::Initial, Action::Fail(ErrorKind::EndOfInput))
        );
    }

    #[test]
    fn relational_operators_look_ahead_one() {
        assert_eq!(
            step(State::Less, Some('=')),
            (State::Less, Action::Emit(Finish::Fixed(TokenKind::LessEqual)))
        );
        assert_eq!(
            step(State::Less, Some('1')),
            (State::Less, Action::PushBackAndEmit(Finish::Fixed(TokenKind::Less)))
        );
        assert_eq!(
            step(State::Bang, Some('x')),
            (State::Bang, Action::Fail(ErrorKind::InvalidInput))
        );
    }

    #[test]
    fn char_literal_takes_exactly_one_element() {
        assert_eq!(
            step(State::Char(Body::Open), Some('a')),
            (State::Char(Body::Closing), Action::Consume)
        );
        assert_eq!(
            step(State::Char(Body::Closing), Some('b')),
            (
                State::Char(Body::Closing),
                Action::Fail(ErrorKind::InvalidCharLiteral)
            )
        );
        assert_eq!(
            step(State::Char(Body::Open), Some('\'')),
            (
                State::Char(Body::Open),
                Action::Fail(ErrorKind::InvalidCharLiteral)
            )
        );
        assert_eq!(
            step(State::Char(Body::HexLow), Some('f')),
            (State::Char(Body::Closing), Action::Consume)
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            step(State::String(Body::Escape), Some('t')),
            (State::String(Body::Open), Action::Consume)
        );
        assert_eq!(
            step(State::String(Body::Escape), Some('x')),
            (State::String(Body::HexHigh), Action::Consume)
        );
        assert_eq!(
            step(State::String(Body::HexHigh), Some('4')),
            (State::String(Body::HexLow), Action::Consume)
        );
        assert_eq!(
            step(State::String(Body::HexLow), Some('1')),
            (State::String(Body::Open), Action::Consume)
        );
        assert_eq!(
            step(State::String(Body::Escape), Some('q')),
            (
                State::String(Body::Escape),
                Action::Fail(ErrorKind::InvalidStringLiteral)
            )
        );
        assert_eq!(
            step(State::String(Body::Open), Some('\n')),
            (
                State::String(Body::Open),
                Action::Fail(ErrorKind::InvalidStringLiteral)
            )
        );
    }

    #[test]
    fn comments_restart_or_fail() {
        assert_eq!(step(State::Slash, Some('/')), (State::LineComment, Action::Skip));
        assert_eq!(step(State::LineComment, Some('\r')), (State::Initial, Action::Restart));
        assert_eq!(
            step(State::LineComment, None),
            (State::LineComment, Action::Fail(ErrorKind::IncompleteComment))
        );
        assert_eq!(
            step(State::BlockCommentStar, Some('*')),
            (State::BlockCommentStar, Action::Skip)
        );
        assert_eq!(
            step(State::BlockCommentStar, Some('/')),
            (State::Initial, Action::Restart)
        );
        assert_eq!(
            step(State::BlockCommentStar, Some('a')),
            (State::BlockComment, Action::Skip)
        );
    }
}
