/// Pre-computed index of line start byte offsets.
///
/// The tokenizer itself only ever tracks 1-based `(row, col)` pairs
/// while scanning; this index exists purely so the driver's diagnostic
/// renderer can turn a `(row, col)` back into the byte offset `ariadne`
/// needs to underline a span in the original source text.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Convert a 1-based `(row, col)` pair to a byte offset.
    ///
    /// `col` is measured in bytes from the start of the line, 1-based,
    /// matching how the tokenizer advances `col`.
    pub fn offset(&self, row: u32, col: u32) -> u32 {
        let line_idx = (row.saturating_sub(1)) as usize;
        let line_start = self
            .line_starts
            .get(line_idx)
            .copied()
            .unwrap_or_else(|| *self.line_starts.last().unwrap());
        line_start + col.saturating_sub(1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_first_line() {
        let idx = LineIndex::new("hello world");
        assert_eq!(idx.offset(1, 1), 0);
        assert_eq!(idx.offset(1, 7), 6);
    }

    #[test]
    fn offset_multiple_lines() {
        let idx = LineIndex::new("ab\ncd\nef");
        assert_eq!(idx.offset(2, 1), 3);
        assert_eq!(idx.offset(3, 2), 7);
    }

    #[test]
    fn line_count() {
        let idx = LineIndex::new("a\nb\nc");
        assert_eq!(idx.line_count(), 3);
    }
}
