use crate::token::{Token, TokenKind};
use compact_str::CompactString;
use smi_diagnostics::{codes, Diagnostic, DiagnosticConfig, Severity, Strictness};
use smi_source_file::SourceCode;
use smi_text_size::TextSize;

/// Byte-oriented hand-written lexer (spec.md §4.1). Never stalls: every
/// branch of `next_token` advances `position` by at least one byte.
pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    position: u32,
}

/// One lexed token plus the diagnostics raised while scanning it. Identifier
/// validation (`identifier-underscore` and friends) happens here rather than
/// in the parser, since it is purely a function of the token's text.
pub struct LexResult {
    pub token: Token,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            position: 0,
        }
    }

    fn offset(&self) -> TextSize {
        TextSize::new(self.position)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position as usize).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.position as usize + ahead).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.position += 1;
        Some(byte)
    }

    fn skip_trivia(&mut self, diagnostics: &mut Vec<Diagnostic>, module: &str, source: &SourceCode<'_>) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.bump();
                }
                Some(b'-') if self.peek_at(1) == Some(b'-') => {
                    self.skip_comment(diagnostics, module, source);
                }
                _ => break,
            }
        }
    }

    /// `--` starts a line comment. It ends at a second `--` on the same
    /// line (strict ASN.1) or at end-of-line (the permissive fallback,
    /// flagged with `comment-dash-dash`).
    fn skip_comment(&mut self, diagnostics: &mut Vec<Diagnostic>, module: &str, source: &SourceCode<'_>) {
        let start = self.offset();
        self.position += 2;
        loop {
            match self.peek() {
                None => break,
                Some(b'\n') => break,
                Some(b'-') if self.peek_at(1) == Some(b'-') => {
                    self.position += 2;
                    return;
                }
                _ => {
                    self.bump();
                }
            }
        }
        diagnostics.push(Diagnostic::new(
            codes::COMMENT_DASH_DASH,
            "comment terminated at end-of-line without a closing `--`",
            module,
            start,
            source,
        ));
    }

    pub fn next_token(
        &mut self,
        config: &DiagnosticConfig,
        strictness: Strictness,
        module: &str,
        source: &SourceCode<'_>,
    ) -> LexResult {
        let mut diagnostics = Vec::new();
        self.skip_trivia(&mut diagnostics, module, source);

        let start = self.offset();
        let Some(byte) = self.peek() else {
            return LexResult {
                token: Token {
                    kind: TokenKind::Eof,
                    range: smi_text_size::TextRange::new(start, start),
                },
                diagnostics,
            };
        };

        let kind = match byte {
            b'{' => {
                self.bump();
                TokenKind::LBrace
            }
            b'}' => {
                self.bump();
                TokenKind::RBrace
            }
            b'(' => {
                self.bump();
                TokenKind::LParen
            }
            b')' => {
                self.bump();
                TokenKind::RParen
            }
            b'[' => {
                self.bump();
                TokenKind::LBracket
            }
            b']' => {
                self.bump();
                TokenKind::RBracket
            }
            b',' => {
                self.bump();
                TokenKind::Comma
            }
            b';' => {
                self.bump();
                TokenKind::Semicolon
            }
            b'|' => {
                self.bump();
                TokenKind::Bar
            }
            b'.' if self.peek_at(1) == Some(b'.') => {
                self.position += 2;
                TokenKind::DotDot
            }
            b':' if self.peek_at(1) == Some(b':') && self.peek_at(2) == Some(b'=') => {
                self.position += 3;
                TokenKind::Assign
            }
            b'"' => self.lex_quoted_string(),
            b'\'' => self.lex_bit_or_hex_string(&mut diagnostics, module, source, start),
            b'-' if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => self.lex_number(),
            b'0'..=b'9' => self.lex_number(),
            b'A'..=b'Z' | b'a'..=b'z' => {
                self.lex_word(&mut diagnostics, strictness, module, source, start)
            }
            _ => {
                self.bump();
                diagnostics.push(Diagnostic::new(
                    codes::LEX_INVALID_CHAR,
                    format!("unexpected byte 0x{byte:02x}"),
                    module,
                    start,
                    source,
                ));
                return self
                    .next_token(config, strictness, module, source)
                    .merged_with(diagnostics);
            }
        };

        let end = self.offset();
        LexResult {
            token: Token {
                kind,
                range: smi_text_size::TextRange::new(start, end),
            },
            diagnostics,
        }
    }

    fn lex_quoted_string(&mut self) -> TokenKind {
        self.bump();
        let content_start = self.position as usize;
        loop {
            match self.peek() {
                None => break,
                Some(b'"') => {
                    break;
                }
                _ => {
                    self.bump();
                }
            }
        }
        let content_end = self.position as usize;
        let text = self.source[content_start..content_end].to_string();
        self.bump();
        TokenKind::QuotedString(text)
    }

    /// `'...'H` (hex) or `'...'B` (binary), per spec.md §4.1. Whitespace
    /// inside the quotes is permitted and skipped; any other non-hex/bit
    /// character simply stops the decoded run short, matching how existing
    /// MIB compilers tolerate malformed literals without halting.
    fn lex_bit_or_hex_string(
        &mut self,
        diagnostics: &mut Vec<Diagnostic>,
        module: &str,
        source: &SourceCode<'_>,
        start: TextSize,
    ) -> TokenKind {
        self.bump();
        let content_start = self.position as usize;
        while self.peek().is_some_and(|b| b != b'\'') {
            self.bump();
        }
        let content_end = self.position as usize;
        let content: String = self.source[content_start..content_end]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        self.bump();
        match self.peek() {
            Some(b'H') | Some(b'h') => {
                self.bump();
                TokenKind::HexString(decode_hex(&content))
            }
            Some(b'B') | Some(b'b') => {
                self.bump();
                TokenKind::BinString(decode_bin(&content))
            }
            _ => {
                diagnostics.push(Diagnostic::new(
                    codes::LEX_INVALID_CHAR,
                    "bit/hex string literal missing its 'H' or 'B' suffix",
                    module,
                    start,
                    source,
                ));
                TokenKind::HexString(decode_hex(&content))
            }
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        let negative = self.peek() == Some(b'-');
        if negative {
            self.bump();
        }
        let digits_start = self.position as usize;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.bump();
        }
        let digits_end = self.position as usize;
        let magnitude: i64 = self.source[digits_start..digits_end]
            .parse()
            .unwrap_or(i64::MAX);
        TokenKind::Number(if negative { -magnitude } else { magnitude })
    }

    fn lex_word(
        &mut self,
        diagnostics: &mut Vec<Diagnostic>,
        strictness: Strictness,
        module: &str,
        source: &SourceCode<'_>,
        start: TextSize,
    ) -> TokenKind {
        let word_start = self.position as usize;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            self.bump();
        }
        let word_end = self.position as usize;
        let text = &self.source[word_start..word_end];
        validate_identifier(text, strictness, module, start, source, diagnostics);
        TokenKind::Word(CompactString::from(text))
    }

    pub fn is_at_end(&self) -> bool {
        self.position as usize >= self.bytes.len()
    }
}

impl LexResult {
    fn merged_with(mut self, mut prefix: Vec<Diagnostic>) -> Self {
        prefix.append(&mut self.diagnostics);
        self.diagnostics = prefix;
        self
    }
}

fn decode_hex(content: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() / 2);
    let mut chars = content.chars().filter_map(|c| c.to_digit(16));
    while let (Some(hi), lo) = (chars.next(), chars.next()) {
        let lo = lo.unwrap_or(0);
        out.push(((hi << 4) | lo) as u8);
    }
    out
}

fn decode_bin(content: &str) -> Vec<u8> {
    let bits: Vec<u8> = content
        .chars()
        .filter_map(|c| c.to_digit(2).map(|d| d as u8))
        .collect();
    let mut out = Vec::with_capacity(bits.len().div_ceil(8));
    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, bit) in chunk.iter().enumerate() {
            byte |= bit << (7 - i);
        }
        out.push(byte);
    }
    out
}

/// Emits the identifier-shape diagnostics of spec.md §4.1. Runs on every
/// `Word` token regardless of whether it turns out to be a reserved word or a
/// user name; callers that need "is this a reserved word" suppress nothing
/// here, since `keyword-reserved` fires only where the parser expects a user
/// name (see `Parser::expect_name`).
///
/// `identifier-underscore`'s severity is strictness-dependent rather than
/// its catalogued `Style` default, the same way `missing-<clause>` is
/// (spec.md §4.2): `Style` sits above both strictness presets' emission
/// level, so a fixed severity would make the check invisible under every
/// preset. Strict promotes it to `Error` so spec.md §8 scenario 6's "two
/// diagnostics under strict, zero under permissive" is reachable at all.
fn validate_identifier(
    text: &str,
    strictness: Strictness,
    module: &str,
    start: TextSize,
    source: &SourceCode<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if text.contains('_') {
        let severity = match strictness {
            Strictness::Strict => Severity::Error,
            Strictness::Permissive => Severity::Style,
        };
        diagnostics.push(Diagnostic::with_severity(
            severity,
            codes::IDENTIFIER_UNDERSCORE,
            format!("identifier `{text}` contains an underscore"),
            module,
            start,
            source,
        ));
    }
    if text.len() > 64 {
        diagnostics.push(Diagnostic::new(
            codes::IDENTIFIER_LENGTH_64,
            format!("identifier `{text}` exceeds 64 characters"),
            module,
            start,
            source,
        ));
    }
    if text.ends_with('-') {
        diagnostics.push(Diagnostic::new(
            codes::IDENTIFIER_HYPHEN_END,
            format!("identifier `{text}` ends with a hyphen"),
            module,
            start,
            source,
        ));
    }
    if text.contains("--") {
        diagnostics.push(Diagnostic::new(
            codes::IDENTIFIER_HYPHEN_DOUBLE,
            format!("identifier `{text}` contains consecutive hyphens"),
            module,
            start,
            source,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smi_source_file::LineIndex;

    fn lex_all(text: &str) -> (Vec<TokenKind>, Vec<Diagnostic>) {
        let index = LineIndex::from_source_text(text);
        let source = SourceCode::new(text, &index);
        let config = DiagnosticConfig::default();
        let mut lexer = Lexer::new(text);
        let mut kinds = Vec::new();
        let mut diagnostics = Vec::new();
        loop {
            let result = lexer.next_token(&config, Strictness::Permissive, "TEST-MIB", &source);
            diagnostics.extend(result.diagnostics);
            let done = matches!(result.token.kind, TokenKind::Eof);
            kinds.push(result.token.kind);
            if done {
                break;
            }
        }
        (kinds, diagnostics)
    }

    #[test]
    fn lexes_punctuation_and_assign() {
        let (kinds, _) = lex_all("{ } ( ) [ ] , ; .. | ::=");
        assert_eq!(
            kinds,
            vec![
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::DotDot,
                TokenKind::Bar,
                TokenKind::Assign,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_hex_string_literal() {
        let (kinds, _) = lex_all("'00FF'H");
        assert_eq!(kinds[0], TokenKind::HexString(vec![0x00, 0xFF]));
    }

    #[test]
    fn lexes_binary_string_literal() {
        let (kinds, _) = lex_all("'1010'B");
        assert_eq!(kinds[0], TokenKind::BinString(vec![0b1010_0000]));
    }

    #[test]
    fn underscore_identifier_emits_diagnostic() {
        let (_, diagnostics) = lex_all("test_object");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::IDENTIFIER_UNDERSCORE);
        assert_eq!(diagnostics[0].severity, Severity::Style);
    }

    #[test]
    fn underscore_identifier_severity_is_promoted_under_strict() {
        let text = "test_object";
        let index = LineIndex::from_source_text(text);
        let source = SourceCode::new(text, &index);
        let config = DiagnosticConfig::default();
        let mut lexer = Lexer::new(text);
        let result = lexer.next_token(&config, Strictness::Strict, "TEST-MIB", &source);
        assert_eq!(result.diagnostics[0].code, codes::IDENTIFIER_UNDERSCORE);
        assert_eq!(result.diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn dash_dash_comment_without_closing_pair_is_style() {
        let (kinds, diagnostics) = lex_all("-- open comment\nBEGIN");
        assert!(matches!(kinds[0], TokenKind::Word(_)));
        assert_eq!(diagnostics[0].code, codes::COMMENT_DASH_DASH);
    }

    #[test]
    fn closed_dash_dash_comment_emits_no_diagnostic() {
        let (_, diagnostics) = lex_all("-- closed -- BEGIN");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn lexer_never_stalls_on_invalid_byte() {
        let (kinds, diagnostics) = lex_all("@@@");
        assert_eq!(kinds, vec![TokenKind::Eof]);
        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics.iter().all(|d| d.code == codes::LEX_INVALID_CHAR));
    }

    #[test]
    fn negative_number_lexes_as_single_token() {
        let (kinds, _) = lex_all("-42");
        assert_eq!(kinds[0], TokenKind::Number(-42));
    }
}
