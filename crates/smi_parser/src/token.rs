use compact_str::CompactString;
use smi_text_size::{Ranged, TextRange};
use std::fmt;

/// The fixed set of ASN.1/SMI reserved words (spec.md §4.1). Matched
/// case-sensitively against an identifier's text once the lexer has already
/// classified it as `Word`.
pub const RESERVED_WORDS: &[&str] = &[
    "BEGIN",
    "END",
    "DEFINITIONS",
    "IMPORTS",
    "EXPORTS",
    "FROM",
    "OBJECT",
    "IDENTIFIER",
    "OBJECT-TYPE",
    "OBJECT-IDENTITY",
    "MODULE-IDENTITY",
    "NOTIFICATION-TYPE",
    "TRAP-TYPE",
    "TEXTUAL-CONVENTION",
    "OBJECT-GROUP",
    "NOTIFICATION-GROUP",
    "MODULE-COMPLIANCE",
    "AGENT-CAPABILITIES",
    "SYNTAX",
    "MAX-ACCESS",
    "ACCESS",
    "STATUS",
    "DESCRIPTION",
    "REFERENCE",
    "INDEX",
    "AUGMENTS",
    "IMPLIED",
    "DEFVAL",
    "UNITS",
    "DISPLAY-HINT",
    "LAST-UPDATED",
    "ORGANIZATION",
    "CONTACT-INFO",
    "REVISION",
    "OBJECTS",
    "NOTIFICATIONS",
    "GROUP",
    "MANDATORY-GROUPS",
    "MODULE",
    "SUPPORTS",
    "INCLUDES",
    "PRODUCT-RELEASE",
    "WRITE-SYNTAX",
    "MIN-ACCESS",
    "SIZE",
    "SEQUENCE",
    "OF",
    "CHOICE",
    "INTEGER",
    "OCTET",
    "STRING",
    "BITS",
    "NULL",
    "TRUE",
    "FALSE",
    "Integer32",
    "Unsigned32",
    "Counter32",
    "Counter64",
    "Gauge32",
    "TimeTicks",
    "IpAddress",
    "Opaque",
];

/// The eight SMIv2 application-wide types (spec.md §4.1's "SMI built-ins").
/// They are reserved words lexically, but legal wherever a type name is
/// expected (a SYNTAX/SEQUENCE field type reference, or an IMPORTS symbol) —
/// not "a position expecting a user name" in `keyword-reserved`'s sense.
pub const BUILTIN_TYPE_NAMES: &[&str] = &[
    "Integer32",
    "Unsigned32",
    "Counter32",
    "Counter64",
    "Gauge32",
    "TimeTicks",
    "IpAddress",
    "Opaque",
];

/// Matches the lexical category, not the grammar role: `foo-bar` lexes as a
/// single `Word` token whether it turns out to mean a reserved word, a type
/// name, or a value name.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Word(CompactString),
    Number(i64),
    /// A `'...'H` literal, already decoded to bytes.
    HexString(Vec<u8>),
    /// A `'...'B` literal, already decoded to bytes (MSB-first packing).
    BinString(Vec<u8>),
    QuotedString(String),
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    DotDot,
    Bar,
    Assign,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word(w) => write!(f, "{w}"),
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::HexString(_) => write!(f, "hex string"),
            TokenKind::BinString(_) => write!(f, "binary string"),
            TokenKind::QuotedString(_) => write!(f, "quoted string"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::DotDot => write!(f, ".."),
            TokenKind::Bar => write!(f, "|"),
            TokenKind::Assign => write!(f, "::="),
            TokenKind::Eof => write!(f, "<eof>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
}

impl Ranged for Token {
    fn range(&self) -> TextRange {
        self.range
    }
}

impl Token {
    pub fn is_word(&self, text: &str) -> bool {
        matches!(&self.kind, TokenKind::Word(w) if w.as_str() == text)
    }
}
