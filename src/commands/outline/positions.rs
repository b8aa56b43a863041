use super::{TextPosition, TextRange};

/// Line table over LF-normalized text. Columns are counted in UTF-16 code units.
pub(super) struct SourceLines<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
    line_starts: Vec<usize>,
}

impl<'a> SourceLines<'a> {
    pub(super) fn new(text: &'a str) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut line_starts = Vec::with_capacity(lines.len());
        let mut offset = 0usize;
        for line in &lines {
            line_starts.push(offset);
            offset += line.len() + 1;
        }

        Self {
            text,
            lines,
            line_starts,
        }
    }

    pub(super) fn text(&self) -> &'a str {
        self.text
    }

    pub(super) fn len(&self) -> usize {
        self.lines.len()
    }

    pub(super) fn last_line(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    pub(super) fn line(&self, index: usize) -> &'a str {
        self.lines.get(index).copied().unwrap_or("")
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        self.lines.iter().copied().enumerate()
    }

    fn clamp_line(&self, line: usize) -> usize {
        line.min(self.last_line())
    }

    pub(super) fn line_width(&self, line: usize) -> usize {
        utf16_len(self.line(self.clamp_line(line)))
    }

    /// Range from column 0 of `start_line` to the end of `end_line`.
    pub(super) fn line_range(&self, start_line: usize, end_line: usize) -> TextRange {
        let start_line = self.clamp_line(start_line);
        let end_line = self.clamp_line(end_line).max(start_line);

        TextRange {
            start: TextPosition {
                line: start_line,
                character: 0,
            },
            end: TextPosition {
                line: end_line,
                character: self.line_width(end_line),
            },
        }
    }

    /// Byte offset to position. Offsets inside a multi-byte character are
    /// moved back to its first byte.
    pub(super) fn position_at(&self, offset: usize) -> TextPosition {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let line_start = self.line_starts[line];

        TextPosition {
            line,
            character: utf16_len(&self.text[line_start..offset]),
        }
    }

    pub(super) fn offset_range(&self, start: usize, end: usize) -> TextRange {
        let start = self.position_at(start);
        let end = self.position_at(end).max(start);
        TextRange { start, end }
    }
}

fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

#[cfg(test)]
mod positions_tests {
    use super::SourceLines;

    #[test]
    fn line_range_should_end_at_utf16_width_of_last_line() {
        let source = SourceLines::new("Sub A()\n  x = \"😀\"\nEnd Sub");
        let range = source.line_range(0, 1);

        assert_eq!(range.start.line, 0);
        assert_eq!(range.start.character, 0);
        assert_eq!(range.end.line, 1);
        assert_eq!(range.end.character, 10);
    }

    #[test]
    fn line_range_should_clamp_past_last_line() {
        let source = SourceLines::new("a\nbc");
        let range = source.line_range(7, 9);

        assert_eq!(range.start.line, 1);
        assert_eq!(range.end.line, 1);
        assert_eq!(range.end.character, 2);
    }

    #[test]
    fn position_at_should_map_offsets_to_line_and_column() {
        let text = "one\nzwei\ndrei";
        let source = SourceLines::new(text);

        let position = source.position_at(text.find("ei\ndrei").unwrap_or(0));
        assert_eq!((position.line, position.character), (1, 2));

        let position = source.position_at(text.len());
        assert_eq!((position.line, position.character), (2, 4));

        let position = source.position_at(4);
        assert_eq!((position.line, position.character), (1, 0));
    }

    #[test]
    fn empty_text_should_still_have_one_line() {
        let source = SourceLines::new("");

        assert_eq!(source.len(), 1);
        assert_eq!(source.line(3), "");
        assert_eq!(source.line_range(0, 0).end.character, 0);
    }
}
