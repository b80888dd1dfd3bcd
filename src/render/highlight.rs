//! Lightweight code highlighting for fenced blocks.
//!
//! Three language families are understood. Everything else is returned
//! escaped with no markup.
//!
//! | Family | Tags                                   | Comments      | Literals          |
//! |--------|----------------------------------------|---------------|-------------------|
//! | C-like | js, jsx, ts, tsx, javascript, mjs, ... | `//`, `/* */` | `"…"` `'…'` `` `…` `` |
//! | Python | py, python                             | `#`           | `"…"` `'…'`       |
//! | Shell  | sh, bash, shell, zsh                   | `#`           | `"…"` `'…'`       |
//!
//! # Passes
//!
//! The input is HTML-escaped first and never re-escaped afterwards.
//!
//! 1. A tokenizer splits the text into code and literal segments
//!    (comments, strings). Whichever opener appears first wins, so
//!    `// "x"` is one comment and `"a // b"` one string.
//! 2. Whole words in code segments matching the family's keywords become
//!    keyword spans. Boundaries are plain identifier boundaries, so a
//!    property named `default` is highlighted too.
//! 3. Bare integer/decimal literals in code segments become number spans.
//! 4. Segments are joined back in their original order.
//!
//! # Tokenizer States
//!
//! ```text
//!             "//" / "#"          "\n" | "\r" | EOF
//!   Normal ─────────────▶ LineComment ─────────────▶ accept
//!      │      "/*"                     "*/"
//!      ├─────────────────▶ BlockComment ────────────▶ accept   (EOF: reject)
//!      │      quote                    same quote
//!      └─────────────────▶ Quoted ◀──┬──────────────▶ accept   (EOF: reject)
//!                            │ "\"   │ any but newline
//!                            └─▶ Escaped ─┘           (newline: reject)
//! ```
//!
//! A rejected literal leaves its opening character as ordinary code and
//! scanning resumes right after it.

use crate::utils::html::escape_text;

// ============================================================================
// Languages
// ============================================================================

/// Supported language families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    CLike,
    Python,
    Shell,
}

const C_LIKE_KEYWORDS: &[&str] = &[
    "const", "let", "var", "function", "return", "if", "else", "for", "while", "do", "switch",
    "case", "break", "continue", "new", "this", "class", "extends", "import", "export", "default",
    "from", "async", "await", "try", "catch", "throw", "finally", "typeof", "instanceof", "in",
    "of", "yield", "delete", "void", "null", "undefined", "true", "false", "super", "static",
    "get", "set", "require", "module",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "def", "class", "return", "if", "elif", "else", "for", "while", "break", "continue", "import",
    "from", "as", "try", "except", "finally", "raise", "with", "yield", "lambda", "pass", "del",
    "and", "or", "not", "in", "is", "None", "True", "False", "self", "print", "global",
    "nonlocal", "assert", "async", "await",
];

const SHELL_KEYWORDS: &[&str] = &[
    "if", "then", "else", "elif", "fi", "for", "while", "do", "done", "case", "esac",
    "function", "return", "exit", "echo", "export", "local", "readonly", "declare", "set",
    "unset", "source", "true", "false",
];

impl Language {
    /// Map a fence info tag to a family, case-insensitively.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "javascript" | "js" | "jsx" | "ts" | "tsx" | "typescript" | "mjs" | "cjs" => {
                Some(Self::CLike)
            }
            "python" | "py" => Some(Self::Python),
            "bash" | "sh" | "shell" | "zsh" => Some(Self::Shell),
            _ => None,
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::CLike => C_LIKE_KEYWORDS,
            Self::Python => PYTHON_KEYWORDS,
            Self::Shell => SHELL_KEYWORDS,
        }
    }

    fn is_keyword(self, word: &str) -> bool {
        self.keywords().contains(&word)
    }

    /// Literal opened at the start of `rest`, with the opener's byte width.
    fn opening(self, rest: &str) -> Option<(State, usize)> {
        let mut chars = rest.chars();
        let first = chars.next()?;
        let second = chars.next();

        match (self, first, second) {
            (Self::CLike, '/', Some('/')) => Some((State::LineComment, 2)),
            (Self::CLike, '/', Some('*')) => Some((State::BlockComment, 2)),
            (Self::CLike, '`', _) => Some((State::Quoted('`'), 1)),
            (Self::Python | Self::Shell, '#', _) => Some((State::LineComment, 1)),
            (_, q @ ('"' | '\''), _) => Some((State::Quoted(q), 1)),
            _ => None,
        }
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// Classification of a highlighted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Keyword,
    String,
    Comment,
    Number,
}

impl TokenClass {
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Keyword => "hl-kw",
            Self::String => "hl-st",
            Self::Comment => "hl-cm",
            Self::Number => "hl-nu",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Code(&'a str),
    Literal(TokenClass, &'a str),
}

/// Tokenizer state inside a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    LineComment,
    BlockComment,
    Quoted(char),
    Escaped(char),
}

/// Outcome of feeding one character to a [`State`].
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue(State),
    /// Literal ends; the payload is how many bytes from the current
    /// character belong to it.
    Accept(usize),
    Reject,
}

impl State {
    const fn class(self) -> TokenClass {
        match self {
            Self::LineComment | Self::BlockComment => TokenClass::Comment,
            Self::Quoted(_) | Self::Escaped(_) => TokenClass::String,
        }
    }

    fn step(self, c: char, next: Option<char>) -> Step {
        match self {
            Self::LineComment if matches!(c, '\n' | '\r') => Step::Accept(0),
            Self::BlockComment if c == '*' && next == Some('/') => Step::Accept(2),
            Self::Quoted(q) if c == '\\' => Step::Continue(Self::Escaped(q)),
            Self::Quoted(q) if c == q => Step::Accept(c.len_utf8()),
            Self::Escaped(_) if matches!(c, '\n' | '\r') => Step::Reject,
            Self::Escaped(q) => Step::Continue(Self::Quoted(q)),
            state => Step::Continue(state),
        }
    }

    /// Whether the literal is complete when input runs out.
    const fn accepts_eof(self) -> bool {
        matches!(self, Self::LineComment)
    }
}

/// Length of the literal starting at `rest[0]`, if it is well-formed.
fn scan_literal(rest: &str, mut state: State, opener: usize) -> Option<usize> {
    let body = &rest[opener..];

    for (offset, c) in body.char_indices() {
        let next = body[offset + c.len_utf8()..].chars().next();
        match state.step(c, next) {
            Step::Continue(s) => state = s,
            Step::Accept(width) => return Some(opener + offset + width),
            Step::Reject => return None,
        }
    }

    state.accepts_eof().then_some(rest.len())
}

/// Pass 1: split escaped text into code and literal segments.
fn split_literals(text: &str, lang: Language) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];

        let literal = lang
            .opening(rest)
            .and_then(|(state, opener)| Some((state.class(), scan_literal(rest, state, opener)?)));

        if let Some((class, len)) = literal {
            if plain_start < pos {
                segments.push(Segment::Code(&text[plain_start..pos]));
            }
            segments.push(Segment::Literal(class, &text[pos..pos + len]));
            pos += len;
            plain_start = pos;
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    if plain_start < text.len() {
        segments.push(Segment::Code(&text[plain_start..]));
    }

    segments
}

// ============================================================================
// Words and Numbers
// ============================================================================

const fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn push_span(out: &mut String, class: TokenClass, text: &str) {
    out.push_str("<span class=\"");
    out.push_str(class.css_class());
    out.push_str("\">");
    out.push_str(text);
    out.push_str("</span>");
}

/// Passes 2 and 3 over one code segment.
fn mark_words(code: &str, lang: Language, out: &mut String) {
    let bytes = code.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let at_boundary = pos == 0 || !is_word_byte(bytes[pos - 1]);
        let b = bytes[pos];

        if !at_boundary || !is_word_byte(b) {
            let len = code[pos..].chars().next().map_or(1, char::len_utf8);
            out.push_str(&code[pos..pos + len]);
            pos += len;
            continue;
        }

        let word_end = pos + bytes[pos..].iter().take_while(|b| is_word_byte(**b)).count();

        if b.is_ascii_digit() {
            let number_end = number_end(bytes, pos);
            if number_end >= word_end && !bytes.get(number_end).copied().is_some_and(is_word_byte) {
                push_span(out, TokenClass::Number, &code[pos..number_end]);
                pos = number_end;
                continue;
            }
        } else if lang.is_keyword(&code[pos..word_end]) {
            push_span(out, TokenClass::Keyword, &code[pos..word_end]);
            pos = word_end;
            continue;
        }

        out.push_str(&code[pos..word_end]);
        pos = word_end;
    }
}

/// End of `digits[.digits]` starting at `start`.
fn number_end(bytes: &[u8], start: usize) -> usize {
    let digits = |from: usize| from + bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let int_end = digits(start);
    match (bytes.get(int_end), bytes.get(int_end + 1)) {
        (Some(b'.'), Some(d)) if d.is_ascii_digit() => digits(int_end + 1),
        _ => int_end,
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Highlight a code fragment.
///
/// Returns HTML-escaped text; markup is added only for supported tags.
pub fn highlight(code: &str, tag: Option<&str>) -> String {
    let escaped = escape_text(code);

    let Some(lang) = tag.and_then(Language::from_tag) else {
        return escaped;
    };

    let mut out = String::with_capacity(escaped.len() * 2);
    for segment in split_literals(&escaped, lang) {
        match segment {
            Segment::Code(code) => mark_words(code, lang, &mut out),
            Segment::Literal(class, text) => push_span(&mut out, class, text),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_or_missing_tag_only_escapes() {
        let code = "if (a < b) { return \"x\"; }";
        let expected = "if (a &lt; b) { return \"x\"; }";
        assert_eq!(highlight(code, None), expected);
        assert_eq!(highlight(code, Some("cobol")), expected);
        assert_eq!(highlight(code, Some("")), expected);
    }

    #[test]
    fn test_line_comment_wins_over_string() {
        let out = highlight("// comment \"notkeyword\"", Some("js"));
        assert_eq!(out, "<span class=\"hl-cm\">// comment \"notkeyword\"</span>");
    }

    #[test]
    fn test_string_wins_when_first() {
        let out = highlight("\"a // b\"", Some("js"));
        assert_eq!(out, "<span class=\"hl-st\">\"a // b\"</span>");
    }

    #[test]
    fn test_keywords_and_numbers() {
        let out = highlight("const x = 42;", Some("javascript"));
        assert_eq!(
            out,
            "<span class=\"hl-kw\">const</span> x = <span class=\"hl-nu\">42</span>;"
        );
    }

    #[test]
    fn test_keyword_in_property_position_is_still_marked() {
        let out = highlight("obj.default", Some("ts"));
        assert_eq!(out, "obj.<span class=\"hl-kw\">default</span>");
    }

    #[test]
    fn test_identifier_containing_keyword_is_not_marked() {
        assert_eq!(highlight("returned", Some("js")), "returned");
        assert_eq!(highlight("x1", Some("js")), "x1");
        assert_eq!(highlight("12px", Some("js")), "12px");
    }

    #[test]
    fn test_decimal_number() {
        assert_eq!(highlight("3.14", Some("py")), "<span class=\"hl-nu\">3.14</span>");
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let out = highlight("/* a\nb */ let", Some("js"));
        assert_eq!(
            out,
            "<span class=\"hl-cm\">/* a\nb */</span> <span class=\"hl-kw\">let</span>"
        );
    }

    #[test]
    fn test_unterminated_literals_fall_back_to_code() {
        assert_eq!(highlight("/* open", Some("js")), "/* open");
        assert_eq!(
            highlight("x = 'open", Some("py")),
            "x = 'open"
        );
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let out = highlight(r#""a\"b" c"#, Some("js"));
        assert_eq!(out, "<span class=\"hl-st\">\"a\\\"b\"</span> c");
    }

    #[test]
    fn test_hash_comment_for_python_and_shell() {
        assert_eq!(
            highlight("x # note", Some("python")),
            "x <span class=\"hl-cm\"># note</span>"
        );
        assert_eq!(
            highlight("echo hi # note\nfi", Some("bash")),
            "<span class=\"hl-kw\">echo</span> hi <span class=\"hl-cm\"># note</span>\n<span class=\"hl-kw\">fi</span>"
        );
    }

    #[test]
    fn test_hash_is_code_for_c_like() {
        assert_eq!(highlight("#x", Some("js")), "#x");
    }

    #[test]
    fn test_template_literal_only_for_c_like() {
        assert_eq!(
            highlight("`t`", Some("js")),
            "<span class=\"hl-st\">`t`</span>"
        );
        assert_eq!(highlight("`t`", Some("sh")), "`t`");
    }

    #[test]
    fn test_markup_is_escaped_before_highlighting() {
        let out = highlight("if a < b: pass", Some("py"));
        assert_eq!(
            out,
            "<span class=\"hl-kw\">if</span> a &lt; b: <span class=\"hl-kw\">pass</span>"
        );
    }

    #[test]
    fn test_tag_is_case_insensitive() {
        assert_eq!(Language::from_tag("Python"), Some(Language::Python));
        assert_eq!(Language::from_tag("TSX"), Some(Language::CLike));
        assert_eq!(Language::from_tag("rust"), None);
    }

    #[test]
    fn test_split_literals_order() {
        let segments = split_literals("a 'b' c # d", Language::Shell);
        assert_eq!(
            segments,
            vec![
                Segment::Code("a "),
                Segment::Literal(TokenClass::String, "'b'"),
                Segment::Code(" c "),
                Segment::Literal(TokenClass::Comment, "# d"),
            ]
        );
    }

    #[test]
    fn test_state_transitions() {
        assert_eq!(State::LineComment.step('\n', None), Step::Accept(0));
        assert_eq!(State::BlockComment.step('*', Some('/')), Step::Accept(2));
        assert_eq!(State::BlockComment.step('*', Some('x')), Step::Continue(State::BlockComment));
        assert_eq!(State::Quoted('"').step('\\', None), Step::Continue(State::Escaped('"')));
        assert_eq!(State::Escaped('"').step('"', None), Step::Continue(State::Quoted('"')));
        assert_eq!(State::Escaped('"').step('\n', None), Step::Reject);
        assert_eq!(State::Quoted('\'').step('"', None), Step::Continue(State::Quoted('\'')));
    }
}
