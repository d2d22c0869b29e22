//! Conversions between UTF-8 byte offsets and LSP (UTF-16) positions.

use lsp_types::Position;

/// Byte offset of `position` in `text`, or `None` when it is past the end of its line.
#[must_use]
pub fn position_to_offset(text: &str, position: Position) -> Option<usize> {
    let mut line: u32 = 0;
    let mut col_utf16: u32 = 0;
    let mut offset: usize = 0;

    for ch in text.chars() {
        if line == position.line && col_utf16 == position.character {
            return Some(offset);
        }
        if ch == '\n' && line == position.line {
            return None;
        }

        offset += ch.len_utf8();
        if ch == '\n' {
            line += 1;
            col_utf16 = 0;
        } else {
            col_utf16 += ch.len_utf16() as u32;
        }
    }

    (line == position.line && col_utf16 == position.character).then_some(offset)
}

/// LSP position of byte `offset`; offsets past the end clamp to the end of `text`.
#[must_use]
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    let mut line: u32 = 0;
    let mut col_utf16: u32 = 0;

    for (cur, ch) in text.char_indices() {
        if cur >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col_utf16 = 0;
        } else {
            col_utf16 += ch.len_utf16() as u32;
        }
    }

    Position::new(line, col_utf16)
}

/// Length of `text` in UTF-16 code units, the unit of `Position::character`.
#[must_use]
pub fn utf16_len(text: &str) -> u32 {
    text.chars().map(|ch| ch.len_utf16() as u32).sum()
}

/// The full text of the (0-based) `line`, without its line terminator.
#[must_use]
pub fn line_text(text: &str, line: u32) -> Option<&str> {
    text.split('\n')
        .nth(line as usize)
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
}

/// Leading spaces and tabs of `line`.
#[must_use]
pub fn indentation(line: &str) -> &str {
    let end = line
        .find(|ch: char| ch != ' ' && ch != '\t')
        .unwrap_or(line.len());
    &line[..end]
}
