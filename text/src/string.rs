//! The styled word buffer.
//!
//! A [`TerminalString`] is an ordered list of lines, each an ordered list of
//! words. Every word carries its visible width alongside the style
//! transitions embedded in it, so measurements never rescan text. Styles are
//! recorded as push/pop markers and resolved against an explicit stack only
//! when the buffer is rendered, which lets an appended buffer's resets fall
//! back to whatever style the receiver had active.

use crate::style::{RESET, Style, strip_styles};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Push(Style),
    Pop,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Word {
    pieces: Vec<Piece>,
    width: usize,
}

impl Word {
    fn plain(text: &str) -> Self {
        Self {
            pieces: vec![Piece::Text(text.to_string())],
            width: text.chars().count(),
        }
    }

    fn pushes(&self) -> usize {
        self.pieces
            .iter()
            .filter(|piece| matches!(piece, Piece::Push(_)))
            .count()
    }
}

/// A length-tracking rich text buffer.
///
/// Words are appended with [`word`](Self::word), [`styled`](Self::styled) or
/// [`split`](Self::split); bracket-like delimiters attach to their neighbor
/// with [`open`](Self::open) and [`close`](Self::close). Word count, longest
/// word, line count and line widths are maintained on every mutation.
///
/// # Examples
///
/// ```
/// use option_schema_text::TerminalString;
///
/// let mut text = TerminalString::new();
/// text.open("[").word("-f").close("]").word("-s");
/// assert_eq!(text.word_count(), 2);
/// assert_eq!(text.wrap(None, true), "[-f] -s");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalString {
    lines: Vec<Vec<Word>>,
    indent: usize,
    right_align: bool,
    merge: bool,
    merge_first: bool,
    pending: Vec<Style>,
    open_styles: usize,
    word_count: usize,
    max_word_width: usize,
    line_width: usize,
    max_line_width: usize,
}

impl Default for TerminalString {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalString {
    /// Creates an empty buffer with no indentation.
    pub fn new() -> Self {
        Self {
            lines: vec![Vec::new()],
            indent: 0,
            right_align: false,
            merge: false,
            merge_first: false,
            pending: Vec::new(),
            open_styles: 0,
            word_count: 0,
            max_word_width: 0,
            line_width: 0,
            max_line_width: 0,
        }
    }

    /// Creates an empty buffer whose wrapped lines start at `indent`.
    pub fn with_indent(indent: usize) -> Self {
        Self {
            indent,
            ..Self::new()
        }
    }

    /// Makes wrapped lines align to the right edge of the wrap width.
    pub fn right_aligned(mut self) -> Self {
        self.right_align = true;
        self
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn set_indent(&mut self, indent: usize) {
        self.indent = indent;
    }

    pub fn is_right_aligned(&self) -> bool {
        self.right_align
    }

    /// Number of words, counting fused words once.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Visible width of the longest word.
    pub fn max_word_width(&self) -> usize {
        self.max_word_width
    }

    /// Number of logical lines, including a trailing empty one after a break.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Visible width of the current (last) line.
    pub fn line_width(&self) -> usize {
        self.line_width
    }

    /// Visible width of the widest line when rendered without wrapping.
    pub fn max_line_width(&self) -> usize {
        self.max_line_width
    }

    /// Returns `true` if the buffer holds neither words nor line breaks.
    pub fn is_empty(&self) -> bool {
        self.word_count == 0 && self.lines.len() <= 1
    }

    /// Whether the next word fuses with the last one.
    pub fn merge(&self) -> bool {
        self.merge
    }

    /// Sets whether the next word fuses with the last one.
    pub fn set_merge(&mut self, merge: bool) -> &mut Self {
        self.merge = merge;
        self
    }

    /// Sets whether this buffer's first word fuses with the receiver's last
    /// word when it is [`append`](Self::append)ed.
    pub fn set_merge_first(&mut self, merge_first: bool) -> &mut Self {
        self.merge_first = merge_first;
        self
    }

    /// Appends one word verbatim. Empty text is ignored.
    pub fn word(&mut self, text: &str) -> &mut Self {
        if !text.is_empty() {
            self.push_word(Word::plain(text));
        }
        self
    }

    /// Appends one word wrapped in `style`; the style ends with the word.
    pub fn styled(&mut self, style: &Style, text: &str) -> &mut Self {
        self.push_style(style);
        self.word(text);
        self.pop_style()
    }

    /// Splits `text` on whitespace and appends every word.
    ///
    /// Embedded style sequences are removed. A blank line starts a new
    /// paragraph, and a line opening with a list marker (`-`, `*` or `N.`)
    /// starts a new line.
    pub fn split(&mut self, text: &str) -> &mut Self {
        let stripped = strip_styles(text);
        let mut emitted = false;
        let mut blank = false;
        for line in stripped.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                blank = true;
                continue;
            }
            if emitted {
                if blank {
                    self.break_lines(2);
                } else if is_list_item(trimmed) {
                    self.break_lines(1);
                }
            }
            blank = false;
            for word in trimmed.split_whitespace() {
                self.word(word);
                emitted = true;
            }
        }
        self
    }

    /// Appends an opening delimiter that fuses with the following word.
    pub fn open(&mut self, delimiter: &str) -> &mut Self {
        self.word(delimiter);
        self.merge = true;
        self
    }

    /// Appends a closing delimiter fused to the preceding word.
    pub fn close(&mut self, delimiter: &str) -> &mut Self {
        self.merge = true;
        self.word(delimiter)
    }

    /// Opens a style that applies to every following word until the
    /// matching [`pop_style`](Self::pop_style).
    pub fn push_style(&mut self, style: &Style) -> &mut Self {
        self.pending.push(style.clone());
        self
    }

    /// Closes the innermost open style, restoring the enclosing one.
    ///
    /// A style that never received a word is discarded; popping with
    /// nothing open does nothing.
    pub fn pop_style(&mut self) -> &mut Self {
        if self.pending.pop().is_some() {
            return self;
        }
        if self.open_styles == 0 {
            return self;
        }
        if let Some(last) = self.lines.iter_mut().rev().find_map(|line| line.last_mut()) {
            last.pieces.push(Piece::Pop);
            self.open_styles -= 1;
        }
        self
    }

    /// Ensures at least `count` line feeds follow the last word.
    ///
    /// Feeds already present count toward `count`, so consecutive calls
    /// coalesce instead of stacking blank lines.
    ///
    /// On a buffer without words the feeds are emitted as given, so such a
    /// buffer renders as a leading line feed. Pushed into a
    /// [`StyledMessage`](crate::StyledMessage) after a terminated line, it
    /// yields one blank line.
    ///
    /// ```
    /// use option_schema_text::TerminalString;
    ///
    /// let mut text = TerminalString::new();
    /// text.break_lines(1).word("x");
    /// assert_eq!(text.wrap(None, true), "\nx");
    /// ```
    pub fn break_lines(&mut self, count: usize) -> &mut Self {
        let trailing = self
            .lines
            .iter()
            .rev()
            .take_while(|line| line.is_empty())
            .count();
        let existing = if trailing == self.lines.len() {
            trailing - 1
        } else {
            trailing
        };
        for _ in existing..count {
            self.lines.push(Vec::new());
        }
        if count > 0 {
            self.line_width = 0;
            self.merge = false;
        }
        self
    }

    /// Appends another buffer.
    ///
    /// The first word fuses with this buffer's last word when this buffer
    /// has its merge flag set or `other` has its merge-first flag set; the
    /// other buffer's trailing merge flag carries over. Styles `other` left
    /// open are closed at its end so they cannot leak into later words.
    pub fn append(&mut self, other: &TerminalString) -> &mut Self {
        for (index, line) in other.lines.iter().enumerate() {
            if index > 0 {
                self.lines.push(Vec::new());
                self.line_width = 0;
                self.merge = false;
            }
            for (position, word) in line.iter().enumerate() {
                if index == 0 && position == 0 && other.merge_first {
                    self.merge = true;
                }
                self.push_word(word.clone());
            }
        }
        for _ in 0..other.open_styles {
            self.pop_style();
        }
        if other.word_count > 0 {
            self.merge = other.merge;
        }
        self
    }

    /// Renders the buffer on its own, starting at column zero.
    ///
    /// `width` of `None` (or zero) disables wrapping. With `strip` set the
    /// output carries no escape sequences.
    pub fn wrap(&self, width: Option<usize>, strip: bool) -> String {
        let mut wrapper = Wrapper::new(width, strip);
        self.wrap_into(&mut wrapper);
        wrapper.finish()
    }

    fn current_line(&mut self) -> &mut Vec<Word> {
        if self.lines.is_empty() {
            self.lines.push(Vec::new());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    fn push_word(&mut self, mut word: Word) {
        if !self.pending.is_empty() {
            let mut pieces: Vec<Piece> = self.pending.drain(..).map(Piece::Push).collect();
            pieces.append(&mut word.pieces);
            word.pieces = pieces;
        }
        self.open_styles += word.pushes();
        self.open_styles -= word
            .pieces
            .iter()
            .filter(|piece| matches!(piece, Piece::Pop))
            .count()
            .min(self.open_styles);

        let merge = std::mem::take(&mut self.merge);
        let width = word.width;
        let fused = if merge {
            self.current_line().last_mut().map(|last| {
                last.pieces.append(&mut word.pieces);
                last.width += width;
                last.width
            })
        } else {
            None
        };
        match fused {
            Some(fused_width) => {
                self.line_width += width;
                self.max_word_width = self.max_word_width.max(fused_width);
            }
            None => {
                let line = self.current_line();
                let first = line.is_empty();
                line.push(word);
                self.line_width = if first {
                    width
                } else {
                    self.line_width + 1 + width
                };
                self.word_count += 1;
                self.max_word_width = self.max_word_width.max(width);
            }
        }
        self.max_line_width = self.max_line_width.max(self.line_width);
    }

    /// Lays out the buffer into `wrapper`, continuing from its column.
    pub(crate) fn wrap_into(&self, wrapper: &mut Wrapper) {
        let width = wrapper.width;
        let mut indent = self.indent;
        if let Some(width) = width {
            if indent + self.max_word_width > width {
                indent = 0;
            }
        }
        let mut first = true;
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                wrapper.newline();
            }
            match width {
                Some(width) if self.right_align => {
                    for chunk in chunk_line(line, width.saturating_sub(indent)) {
                        let chunk_width = chunk_width(chunk);
                        let start = width.saturating_sub(chunk_width).max(indent);
                        if wrapper.column > start || (first && indent > 0 && wrapper.column > indent)
                        {
                            wrapper.newline();
                        }
                        wrapper.pad_to(start);
                        for (position, word) in chunk.iter().enumerate() {
                            if position > 0 {
                                wrapper.space();
                            }
                            wrapper.emit(word);
                        }
                        first = false;
                    }
                }
                _ => {
                    for word in line {
                        if first && indent > 0 && wrapper.column > indent {
                            wrapper.newline();
                        }
                        let sep = usize::from(wrapper.column > indent);
                        if let Some(width) = width {
                            if wrapper.column > indent && wrapper.column + sep + word.width > width {
                                wrapper.newline();
                            }
                        }
                        if wrapper.column < indent {
                            wrapper.pad_to(indent);
                        } else if wrapper.column > indent {
                            wrapper.space();
                        }
                        wrapper.emit(word);
                        first = false;
                    }
                }
            }
        }
    }
}

fn is_list_item(line: &str) -> bool {
    let Some(first) = line.split_whitespace().next() else {
        return false;
    };
    if first == "-" || first == "*" {
        return true;
    }
    first.len() > 1
        && first.ends_with('.')
        && first[..first.len() - 1].chars().all(|c| c.is_ascii_digit())
}

fn chunk_width(chunk: &[Word]) -> usize {
    chunk.iter().map(|word| word.width).sum::<usize>() + chunk.len().saturating_sub(1)
}

/// Greedily groups a line's words into chunks no wider than `available`.
fn chunk_line(line: &[Word], available: usize) -> Vec<&[Word]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut current = 0;
    for (index, word) in line.iter().enumerate() {
        let needed = if index == start {
            word.width
        } else {
            current + 1 + word.width
        };
        if index > start && needed > available {
            chunks.push(&line[start..index]);
            start = index;
            current = word.width;
        } else {
            current = needed;
        }
    }
    if start < line.len() {
        chunks.push(&line[start..]);
    }
    chunks
}

/// Output state threaded through rendering: the text produced so far, the
/// current column and the stack of active styles.
#[derive(Debug)]
pub(crate) struct Wrapper {
    out: String,
    column: usize,
    width: Option<usize>,
    strip: bool,
    stack: Vec<Style>,
}

impl Wrapper {
    pub(crate) fn new(width: Option<usize>, strip: bool) -> Self {
        Self {
            out: String::new(),
            column: 0,
            width: width.filter(|&width| width > 0),
            strip,
            stack: Vec::new(),
        }
    }

    pub(crate) fn finish(mut self) -> String {
        if !self.strip && self.stack.iter().any(|style| !style.is_plain()) {
            self.out.push_str(RESET);
        }
        self.out
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.column = 0;
    }

    fn space(&mut self) {
        self.out.push(' ');
        self.column += 1;
    }

    fn pad_to(&mut self, column: usize) {
        while self.column < column {
            self.space();
        }
    }

    fn emit(&mut self, word: &Word) {
        for piece in &word.pieces {
            match piece {
                Piece::Text(text) => self.out.push_str(text),
                Piece::Push(style) => {
                    if !self.strip {
                        self.out.push_str(&style.sequence());
                    }
                    self.stack.push(style.clone());
                }
                Piece::Pop => {
                    let Some(style) = self.stack.pop() else {
                        continue;
                    };
                    if !self.strip && !style.is_plain() {
                        self.out.push_str(RESET);
                        for outer in &self.stack {
                            self.out.push_str(&outer.sequence());
                        }
                    }
                }
            }
        }
        self.column += word.width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn test_measurements_track_mutations() {
        let mut text = TerminalString::new();
        text.word("alpha").word("be");
        assert_eq!(text.word_count(), 2);
        assert_eq!(text.max_word_width(), 5);
        assert_eq!(text.line_width(), 8);

        text.break_lines(1).word("gamma-delta");
        assert_eq!(text.line_count(), 2);
        assert_eq!(text.line_width(), 11);
        assert_eq!(text.max_line_width(), 11);
        assert_eq!(text.max_word_width(), 11);
    }

    #[test]
    fn test_delimiters_do_not_create_words() {
        let mut text = TerminalString::new();
        text.open("(").word("a").word("|").close(")");
        assert_eq!(text.wrap(None, true), "(a |)");

        let mut fused = TerminalString::new();
        fused.open("[").open("(").word("-a").close(")").close("]");
        assert_eq!(fused.word_count(), 1);
        assert_eq!(fused.wrap(None, true), "[(-a)]");
        assert_eq!(fused.max_word_width(), 6);
    }

    #[test]
    fn test_close_on_empty_buffer_renders_literally() {
        let mut text = TerminalString::new();
        text.close("]");
        assert_eq!(text.wrap(None, true), "]");
    }

    #[test]
    fn test_break_lines_coalesce() {
        let mut text = TerminalString::new();
        text.word("a").break_lines(1).break_lines(1).word("b");
        assert_eq!(text.wrap(None, true), "a\nb");

        let mut paragraph = TerminalString::new();
        paragraph.word("a").break_lines(2).break_lines(1).word("b");
        assert_eq!(paragraph.wrap(None, true), "a\n\nb");
    }

    #[test]
    fn test_break_lines_before_first_word() {
        let mut gap = TerminalString::new();
        gap.break_lines(1).break_lines(1);
        assert_eq!(gap.wrap(None, true), "\n");

        let mut text = TerminalString::new();
        text.break_lines(1).word("x");
        assert_eq!(text.wrap(None, true), "\nx");
    }

    #[test]
    fn test_split_paragraphs_and_lists() {
        let mut text = TerminalString::new();
        text.split("First  line\ncontinues.\n\nSecond:\n- one\n- two\n1. three");
        assert_eq!(
            text.wrap(None, true),
            "First line continues.\n\nSecond:\n- one\n- two\n1. three"
        );
    }

    #[test]
    fn test_split_strips_embedded_styles() {
        let mut text = TerminalString::new();
        text.split("\x1b[31mred\x1b[0m word");
        assert_eq!(text.word_count(), 2);
        assert_eq!(text.wrap(None, false), "red word");
    }

    #[test]
    fn test_wrap_with_indent() {
        let mut text = TerminalString::with_indent(2);
        text.split("one two three four");
        assert_eq!(text.wrap(Some(12), true), "  one two\n  three four");
    }

    #[test]
    fn test_wrap_falls_back_to_column_zero_for_long_words() {
        let mut text = TerminalString::with_indent(6);
        text.word("abcdefgh").word("ij");
        assert_eq!(text.wrap(Some(8), true), "abcdefgh\nij");
    }

    #[test]
    fn test_right_alignment() {
        let mut text = TerminalString::new().right_aligned();
        text.split("aa bb cc");
        assert_eq!(text.wrap(Some(6), true), " aa bb\n    cc");
        assert_eq!(text.wrap(None, true), "aa bb cc");
    }

    #[test]
    fn test_styled_word_restores_outer_style() {
        let outer = Style::new().fg(Color::Red);
        let inner = Style::new().bold();
        let mut text = TerminalString::new();
        text.push_style(&outer);
        text.word("a").styled(&inner, "b").word("c");
        text.pop_style();
        assert_eq!(
            text.wrap(None, false),
            "\x1b[31ma \x1b[1mb\x1b[0m\x1b[31m c\x1b[0m"
        );
        assert_eq!(text.wrap(None, true), "a b c");
    }

    #[test]
    fn test_append_reestablishes_outer_context() {
        let outer = Style::new().fg(Color::Green);
        let mut inner = TerminalString::new();
        inner.styled(&Style::new().bold(), "x");

        let mut text = TerminalString::new();
        text.push_style(&outer).word("a");
        text.append(&inner);
        text.word("b").pop_style();
        assert_eq!(
            text.wrap(None, false),
            "\x1b[32ma \x1b[1mx\x1b[0m\x1b[32m b\x1b[0m"
        );
    }

    #[test]
    fn test_append_closes_unbalanced_styles() {
        let mut inner = TerminalString::new();
        inner.push_style(&Style::new().bold()).word("x");

        let mut text = TerminalString::new();
        text.append(&inner).word("y");
        assert_eq!(text.wrap(None, false), "\x1b[1mx\x1b[0m y");
    }

    #[test]
    fn test_append_merge_flags() {
        let mut param = TerminalString::new();
        param.word("=<value>").set_merge_first(true);

        let mut names = TerminalString::new();
        names.word("--opt");
        names.append(&param);
        assert_eq!(names.word_count(), 1);
        assert_eq!(names.wrap(None, true), "--opt=<value>");

        let mut open = TerminalString::new();
        open.open("[");
        let mut text = TerminalString::new();
        text.append(&open).word("-f");
        assert_eq!(text.wrap(None, true), "[-f");
    }

    #[test]
    fn test_unused_style_is_discarded() {
        let mut text = TerminalString::new();
        text.word("a").push_style(&Style::new().bold()).pop_style();
        assert_eq!(text.wrap(None, false), "a");
    }
}
