//! Zero-copy lexer for the object language.
//!
//! Produces [`Token`] variants that borrow `&'src str` slices directly from
//! the source buffer — no heap allocation for identifiers or literal text.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    Ident(&'src str),
    Int(&'src str),
    Float(&'src str),
    Str(&'src str),
    Char(&'src str),

    KwPackage,
    KwImport,
    KwFunc,
    KwVar,
    KwConst,
    KwType,
    KwStruct,
    KwInterface,
    KwMap,
    KwChan,
    KwIf,
    KwElse,
    KwFor,
    KwRange,
    KwSwitch,
    KwCase,
    KwDefault,
    KwSelect,
    KwReturn,
    KwBreak,
    KwContinue,
    KwGoto,
    KwFallthrough,
    KwGo,
    KwDefer,
    KwNil,
    KwTrue,
    KwFalse,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,
    Ellipsis,

    Assign,    // =
    Define,    // :=
    AddAssign, // +=
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,

    Inc, // ++
    Dec, // --

    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,  // &
    Or,   // |
    Xor,  // ^
    Shl,  // <<
    Shr,  // >>
    Land, // &&
    Lor,  // ||
    Not,  // !
    Arrow, // <-

    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    Eof,
}

#[derive(Debug, Clone)]
pub struct TokenWithOffset<'src> {
    pub token: Token<'src>,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub offset: u32,
    pub message: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lex error at offset {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for LexError {}

fn keyword(s: &str) -> Option<Token<'static>> {
    Some(match s {
        "package" => Token::KwPackage,
        "import" => Token::KwImport,
        "func" => Token::KwFunc,
        "var" => Token::KwVar,
        "const" => Token::KwConst,
        "type" => Token::KwType,
        "struct" => Token::KwStruct,
        "interface" => Token::KwInterface,
        "map" => Token::KwMap,
        "chan" => Token::KwChan,
        "if" => Token::KwIf,
        "else" => Token::KwElse,
        "for" => Token::KwFor,
        "range" => Token::KwRange,
        "switch" => Token::KwSwitch,
        "case" => Token::KwCase,
        "default" => Token::KwDefault,
        "select" => Token::KwSelect,
        "return" => Token::KwReturn,
        "break" => Token::KwBreak,
        "continue" => Token::KwContinue,
        "goto" => Token::KwGoto,
        "fallthrough" => Token::KwFallthrough,
        "go" => Token::KwGo,
        "defer" => Token::KwDefer,
        "nil" => Token::KwNil,
        "true" => Token::KwTrue,
        "false" => Token::KwFalse,
        _ => return None,
    })
}

pub struct Lexer<'src> {
    src: &'src str,
    bytes: &'src [u8],
    pos: usize,
    /// Tracks whether the previous token permits automatic semicolon
    /// insertion at the next newline, following the object language's
    /// line-termination rule (identifiers, literals, `)`/`]`/`}`, and the
    /// `break`/`continue`/`return`/`++`/`--`/`fallthrough` tokens all do).
    insert_semi: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Lexer { src, bytes: src.as_bytes(), pos: 0, insert_semi: false }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, off: usize) -> Option<u8> {
        self.bytes.get(self.pos + off).copied()
    }

    fn bump_byte(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        Some(b)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.src[self.pos..].starts_with(s)
    }

    /// The remaining source text starting at `byte_offset`. Used for a
    /// small amount of raw-text lookahead where a real checkpoint/rewind
    /// would be overkill for a single construct (`for ... range`).
    pub fn source_from(&self, byte_offset: usize) -> &'src str {
        &self.src[byte_offset.min(self.src.len())..]
    }

    pub fn next_token(&mut self) -> Result<TokenWithOffset<'src>, LexError> {
        loop {
            let newline_seen = self.skip_whitespace_and_comments();
            if newline_seen && self.insert_semi {
                self.insert_semi = false;
                return Ok(TokenWithOffset { token: Token::Semicolon, offset: self.pos as u32 });
            }
            break;
        }

        let offset = self.pos as u32;
        let Some(b) = self.peek_byte() else {
            let semi = self.insert_semi;
            self.insert_semi = false;
            if semi {
                return Ok(TokenWithOffset { token: Token::Semicolon, offset });
            }
            return Ok(TokenWithOffset { token: Token::Eof, offset });
        };

        if b.is_ascii_alphabetic() || b == b'_' {
            return Ok(self.lex_ident_or_keyword(offset));
        }
        if b.is_ascii_digit() {
            return Ok(self.lex_number(offset));
        }
        if b == b'"' {
            return self.lex_string(offset);
        }
        if b == b'\'' {
            return self.lex_char(offset);
        }

        self.insert_semi = false;
        let tok = self.lex_operator(offset)?;
        if matches!(tok, Token::RParen | Token::RBrace | Token::RBracket | Token::Inc | Token::Dec) {
            self.insert_semi = true;
        }
        Ok(TokenWithOffset { token: tok, offset })
    }

    /// Returns true if a newline was crossed (relevant for semicolon
    /// insertion).
    fn skip_whitespace_and_comments(&mut self) -> bool {
        let mut saw_newline = false;
        loop {
            match self.peek_byte() {
                Some(b'\n') => {
                    saw_newline = true;
                    self.pos += 1;
                }
                Some(b) if b.is_ascii_whitespace() => {
                    self.pos += 1;
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while !matches!(self.peek_byte(), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.pos += 2;
                    while !self.starts_with("*/") && self.peek_byte().is_some() {
                        if self.peek_byte() == Some(b'\n') {
                            saw_newline = true;
                        }
                        self.pos += 1;
                    }
                    self.pos = (self.pos + 2).min(self.bytes.len());
                }
                _ => break,
            }
        }
        saw_newline
    }

    fn lex_ident_or_keyword(&mut self, offset: u32) -> TokenWithOffset<'src> {
        let start = self.pos;
        while matches!(self.peek_byte(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        let text = &self.src[start..self.pos];
        let token = keyword(text).unwrap_or(Token::Ident(text));
        self.insert_semi = matches!(
            token,
            Token::Ident(_)
                | Token::KwBreak
                | Token::KwContinue
                | Token::KwFallthrough
                | Token::KwReturn
                | Token::KwNil
                | Token::KwTrue
                | Token::KwFalse
        );
        TokenWithOffset { token, offset }
    }

    fn lex_number(&mut self, offset: u32) -> TokenWithOffset<'src> {
        let start = self.pos;
        let mut is_float = false;
        while matches!(self.peek_byte(), Some(b) if b.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        if self.peek_byte() == Some(b'.') && matches!(self.peek_at(1), Some(b) if b.is_ascii_digit()) {
            is_float = true;
            self.pos += 1;
            while matches!(self.peek_byte(), Some(b) if b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text = &self.src[start..self.pos];
        self.insert_semi = true;
        let token = if is_float { Token::Float(text) } else { Token::Int(text) };
        TokenWithOffset { token, offset }
    }

    fn lex_string(&mut self, offset: u32) -> Result<TokenWithOffset<'src>, LexError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.bump_byte() {
                None => return Err(LexError { offset, message: "unterminated string literal".to_string() }),
                Some(b'"') => break,
                Some(b'\\') => {
                    self.pos += 1;
                }
                _ => {}
            }
        }
        self.insert_semi = true;
        Ok(TokenWithOffset { token: Token::Str(&self.src[start..self.pos]), offset })
    }

    fn lex_char(&mut self, offset: u32) -> Result<TokenWithOffset<'src>, LexError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.bump_byte() {
                None => return Err(LexError { offset, message: "unterminated char literal".to_string() }),
                Some(b'\'') => break,
                Some(b'\\') => {
                    self.pos += 1;
                }
                _ => {}
            }
        }
        self.insert_semi = true;
        Ok(TokenWithOffset { token: Token::Char(&self.src[start..self.pos]), offset })
    }

    fn lex_operator(&mut self, offset: u32) -> Result<Token<'src>, LexError> {
        macro_rules! two {
            ($a:expr, $b:expr, $two:expr, $one:expr) => {{
                self.pos += 1;
                if self.peek_byte() == Some($b) {
                    self.pos += 1;
                    $two
                } else {
                    $one
                }
            }};
        }
        let b = self.bump_byte().unwrap();
        Ok(match b {
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'{' => Token::LBrace,
            b'}' => Token::RBrace,
            b'[' => Token::LBracket,
            b']' => Token::RBracket,
            b',' => Token::Comma,
            b';' => Token::Semicolon,
            b':' => {
                if self.peek_byte() == Some(b'=') {
                    self.pos += 1;
                    Token::Define
                } else {
                    Token::Colon
                }
            }
            b'.' => {
                if self.starts_with("..") {
                    self.pos += 2;
                    Token::Ellipsis
                } else {
                    Token::Dot
                }
            }
            b'+' => {
                if self.peek_byte() == Some(b'+') {
                    self.pos += 1;
                    Token::Inc
                } else {
                    self.pos -= 1;
                    two!(b'+', b'=', Token::AddAssign, Token::Add)
                }
            }
            b'-' => {
                if self.peek_byte() == Some(b'-') {
                    self.pos += 1;
                    Token::Dec
                } else {
                    self.pos -= 1;
                    two!(b'-', b'=', Token::SubAssign, Token::Sub)
                }
            }
            b'*' => {
                self.pos -= 1;
                two!(b'*', b'=', Token::MulAssign, Token::Mul)
            }
            b'/' => {
                self.pos -= 1;
                two!(b'/', b'=', Token::QuoAssign, Token::Quo)
            }
            b'%' => {
                self.pos -= 1;
                two!(b'%', b'=', Token::RemAssign, Token::Rem)
            }
            b'&' => {
                if self.peek_byte() == Some(b'&') {
                    self.pos += 1;
                    Token::Land
                } else {
                    Token::And
                }
            }
            b'|' => {
                if self.peek_byte() == Some(b'|') {
                    self.pos += 1;
                    Token::Lor
                } else {
                    Token::Or
                }
            }
            b'^' => Token::Xor,
            b'<' => {
                if self.peek_byte() == Some(b'-') {
                    self.pos += 1;
                    Token::Arrow
                } else if self.peek_byte() == Some(b'<') {
                    self.pos += 1;
                    Token::Shl
                } else if self.peek_byte() == Some(b'=') {
                    self.pos += 1;
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            b'>' => {
                if self.peek_byte() == Some(b'>') {
                    self.pos += 1;
                    Token::Shr
                } else if self.peek_byte() == Some(b'=') {
                    self.pos += 1;
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            b'=' => {
                if self.peek_byte() == Some(b'=') {
                    self.pos += 1;
                    Token::Eq
                } else {
                    Token::Assign
                }
            }
            b'!' => {
                if self.peek_byte() == Some(b'=') {
                    self.pos += 1;
                    Token::Ne
                } else {
                    Token::Not
                }
            }
            other => {
                return Err(LexError {
                    offset,
                    message: format!("unexpected byte 0x{other:02x}"),
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token<'_>> {
        let mut lex = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let t = lex.next_token().unwrap();
            if t.token == Token::Eof {
                out.push(t.token);
                break;
            }
            out.push(t.token);
        }
        out
    }

    #[test]
    fn lexes_keywords_and_idents() {
        let toks = tokens("func main");
        assert_eq!(toks, vec![Token::KwFunc, Token::Ident("main"), Token::Semicolon, Token::Eof]);
    }

    #[test]
    fn inserts_semicolon_after_newline_following_ident() {
        let toks = tokens("x\ny");
        assert_eq!(toks, vec![Token::Ident("x"), Token::Semicolon, Token::Ident("y"), Token::Semicolon, Token::Eof]);
    }

    #[test]
    fn lexes_compound_operators() {
        let toks = tokens("a := b + 1");
        assert_eq!(
            toks,
            vec![Token::Ident("a"), Token::Define, Token::Ident("b"), Token::Add, Token::Int("1"), Token::Semicolon, Token::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut lex = Lexer::new("\"abc");
        let mut result = Ok(TokenWithOffset { token: Token::Eof, offset: 0 });
        for _ in 0..2 {
            result = lex.next_token();
            if result.is_err() {
                break;
            }
        }
        assert!(result.is_err());
    }
}
