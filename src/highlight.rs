//! Read-only syntax highlighting for Clarity output.
//!
//! Clarity is an s-expression language, so a single pass over the text is
//! enough: every byte of the input lands in exactly one token and the tokens
//! concatenate back to the original string.

use crate::theme;
use egui::text::{LayoutJob, TextFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    Comment,
    String,
    Number,
    Buffer,
    Principal,
    Keyword,
    Builtin,
    Type,
    Constant,
    Paren,
    Ident,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

const KEYWORDS: &[&str] = &[
    "define-public",
    "define-private",
    "define-read-only",
    "define-constant",
    "define-data-var",
    "define-map",
    "define-non-fungible-token",
    "define-fungible-token",
    "define-trait",
    "impl-trait",
    "use-trait",
    "let",
    "if",
    "begin",
    "match",
    "asserts!",
    "unwrap!",
    "unwrap-err!",
    "unwrap-panic",
    "unwrap-err-panic",
    "try!",
];

const BUILTINS: &[&str] = &[
    "ok", "err", "some", "and", "or", "not", "is-eq", "is-none", "is-some", "is-ok", "is-err",
    "default-to", "get", "merge", "tuple", "list", "append", "concat", "len", "filter", "fold",
    "map", "print", "as-contract", "contract-call?", "var-get", "var-set", "map-get?", "map-set",
    "map-insert", "map-delete", "nft-mint?", "nft-transfer?", "nft-get-owner?", "nft-burn?",
    "ft-mint?", "ft-transfer?", "ft-burn?", "ft-get-balance", "ft-get-supply", "stx-transfer?",
    "stx-get-balance", "stx-burn?", "to-uint", "to-int", "+", "-", "*", "/", "mod", "pow", ">",
    "<", ">=", "<=",
];

const TYPES: &[&str] = &[
    "uint",
    "int",
    "bool",
    "principal",
    "buff",
    "string-ascii",
    "string-utf8",
    "optional",
    "response",
];

const CONSTANTS: &[&str] = &[
    "true",
    "false",
    "none",
    "tx-sender",
    "contract-caller",
    "block-height",
    "burn-block-height",
    "stacks-block-height",
];

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '{' | '}' | '[' | ']' | '"' | ';')
}

/// Splits `src` into tokens. Never fails; unknown text becomes `Ident`.
pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = src;

    while let Some(c) = rest.chars().next() {
        let (kind, len) = if c.is_whitespace() {
            (TokenKind::Whitespace, rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len()))
        } else if c == ';' {
            (TokenKind::Comment, rest.find('\n').unwrap_or(rest.len()))
        } else if c == '"' {
            (TokenKind::String, string_len(rest, 1))
        } else if rest.starts_with("u\"") {
            (TokenKind::String, string_len(rest, 2))
        } else if matches!(c, '(' | ')' | '{' | '}' | '[' | ']') {
            (TokenKind::Paren, 1)
        } else {
            let len = rest[c.len_utf8()..]
                .find(is_delimiter)
                .map_or(rest.len(), |i| i + c.len_utf8());
            (classify_atom(&rest[..len]), len)
        };
        tokens.push(Token { kind, text: &rest[..len] });
        rest = &rest[len..];
    }

    tokens
}

/// Byte length of a string literal whose body starts at `open`. Runs to the
/// end of input when unterminated.
fn string_len(s: &str, open: usize) -> usize {
    let mut escaped = false;
    for (i, c) in s[open..].char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return open + i + 1,
            _ => {}
        }
    }
    s.len()
}

fn classify_atom(atom: &str) -> TokenKind {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    if let Some(hex) = atom.strip_prefix("0x") {
        if hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return TokenKind::Buffer;
        }
    }
    if digits(atom)
        || atom.strip_prefix('u').is_some_and(digits)
        || atom.strip_prefix('-').is_some_and(digits)
    {
        return TokenKind::Number;
    }
    if (atom.starts_with('\'') || atom.starts_with('.')) && atom.len() > 1 {
        return TokenKind::Principal;
    }
    if KEYWORDS.contains(&atom) {
        TokenKind::Keyword
    } else if BUILTINS.contains(&atom) {
        TokenKind::Builtin
    } else if TYPES.contains(&atom) {
        TokenKind::Type
    } else if CONSTANTS.contains(&atom) {
        TokenKind::Constant
    } else {
        TokenKind::Ident
    }
}

fn color(kind: TokenKind) -> egui::Color32 {
    match kind {
        TokenKind::Whitespace | TokenKind::Ident => theme::SYNTAX_TEXT,
        TokenKind::Comment => theme::SYNTAX_COMMENT,
        TokenKind::String => theme::SYNTAX_STRING,
        TokenKind::Number | TokenKind::Buffer => theme::SYNTAX_NUMBER,
        TokenKind::Principal => theme::SYNTAX_PRINCIPAL,
        TokenKind::Keyword => theme::SYNTAX_KEYWORD,
        TokenKind::Builtin => theme::SYNTAX_BUILTIN,
        TokenKind::Type => theme::SYNTAX_TYPE,
        TokenKind::Constant => theme::SYNTAX_CONSTANT,
        TokenKind::Paren => theme::SYNTAX_PAREN,
    }
}

/// Builds a colored layout for `code` in the monospace font.
pub fn layout_job(code: &str, font_size: f32) -> LayoutJob {
    let mut job = LayoutJob::default();
    let font = egui::FontId::monospace(font_size);
    for token in tokenize(code) {
        let mut format = TextFormat::simple(font.clone(), color(token.kind));
        if token.kind == TokenKind::Comment {
            format.italics = true;
        }
        job.append(token.text, 0.0, format);
    }
    job
}

/// Right-aligned gutter text, one number per displayed row.
pub fn line_numbers(code: &str) -> String {
    let count = code.split('\n').count();
    let width = count.to_string().len();
    (1..=count)
        .map(|n| format!("{:>width$}", n, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}
