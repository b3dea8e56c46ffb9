/// Character-level source iterator for the tokenizer.
///
/// Tracks 1-based `(row, col)` alongside each character, since the
/// tokenizer's own token positions are row/col pairs rather than byte
/// offsets.
pub struct Cursor<'src> {
    chars: std::str::Chars<'src>,
    row: u32,
    col: u32,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            chars: source.chars(),
            row: 1,
            col: 1,
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    /// Consume the current character, advancing row/col.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.row += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_col() {
        let mut c = Cursor::new("ab");
        assert_eq!((c.row(), c.col()), (1, 1));
        c.advance();
        assert_eq!((c.row(), c.col()), (1, 2));
    }

    #[test]
    fn advance_tracks_row_on_newline() {
        let mut c = Cursor::new("a\nb");
        c.advance(); // 'a'
        c.advance(); // '\n'
        assert_eq!((c.row(), c.col()), (2, 1));
    }
}
