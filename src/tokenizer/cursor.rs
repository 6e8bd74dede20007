use derive_more::Constructor;
use std::fmt::Display;

/// A zero-based (line, column) location in the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Constructor)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(line: {}, col: {})", self.line, self.col)
    }
}

/// Owned, line-buffered view of the source with one character of pushback.
///
/// Every line ends in a newline, including the last one when the source lacks
/// it, so stepping past the end of a line wraps to column 0 of the next.
/// Reading past the last line is end of input, not an error.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    lines: Vec<Vec<char>>,
    ptr: Pos,
    last: Option<Pos>,
}

impl Cursor {
    /// Each byte is one character; bytes outside ASCII map to the matching
    /// Latin-1 code point and are rejected later as non-printable.
    pub fn from_bytes(bytes: &[u8]) -> Cursor {
        let lines = bytes
            .split_inclusive(|b| *b == b'\n')
            .map(|line| {
                let mut chars: Vec<char> = line.iter().copied().map(char::from).collect();
                if chars.last() != Some(&'\n') {
                    chars.push('\n');
                }
                chars
            })
            .collect();

        Cursor {
            lines,
            ptr: Pos::default(),
            last: None,
        }
    }

    pub fn position(&self) -> Pos {
        self.ptr
    }

    pub fn is_eof(&self) -> bool {
        self.ptr.line >= self.lines.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.lines
            .get(self.ptr.line)
            .and_then(|line| line.get(self.ptr.col))
            .copied()
    }

    /// Returns the character under the cursor and steps over it. At end of
    /// input nothing moves and `None` is returned.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.last = Some(self.ptr);
        self.ptr = self.next_pos();
        Some(c)
    }

    /// Undoes the most recent `advance`. Calling it twice in a row, or before
    /// anything was read, leaves the cursor where it is.
    pub fn retreat(&mut self) {
        if let Some(prev) = self.last.take() {
            self.ptr = prev;
        }
    }

    fn next_pos(&self) -> Pos {
        let len = self.lines.get(self.ptr.line).map_or(0, Vec::len);
        if self.ptr.col + 1 >= len {
            Pos::new(self.ptr.line + 1, 0)
        } else {
            Pos::new(self.ptr.line, self.ptr.col + 1)
        }
    }
}
