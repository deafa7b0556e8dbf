//! SyntaxKind enum for the tokens the grammar works on.
//!
//! The grammar never sees raw characters: every byte of the working buffer
//! belongs to exactly one token, and each token carries one of these kinds.
//! Element kinds (what the grammar *produces*) live in [`crate::element`].

/// All token kinds produced by the lexer.
///
/// We use SCREAMING_CASE following the rust-analyzer convention for SyntaxKind.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    /// Horizontal whitespace (spaces, tabs)
    WHITESPACE,
    /// Line ending (LF or CRLF)
    NEWLINE,
    /// Plain text content
    TEXT,
    /// `>` for blockquotes and the end of HTML tags
    GT,
    /// `<` for autolinks and HTML
    LT,
    /// `-` for lists, rules and dashes
    DASH,
    /// `*` for lists, emphasis and rules
    STAR,
    /// `+` for lists
    PLUS,
    /// `_` for emphasis and rules
    UNDERSCORE,
    /// Single backtick
    BACKTICK,
    /// `~` for fences and definition marks
    TILDE,
    /// `[`
    LBRACKET,
    /// `]`
    RBRACKET,
    /// `(`
    LPAREN,
    /// `)`
    RPAREN,
    /// `#` for headings
    HASH,
    /// `!` for images
    BANG,
    /// `^` for notes
    CARET,
    /// `:` for reference definitions and definition lists
    COLON,
    /// `\` escapes
    BACKSLASH,
    /// `=` for setext headings
    EQUALS,
    /// `"`
    QUOTE,
    /// `'`
    APOSTROPHE,
    /// `.` for enumerators and ellipses
    DOT,
    /// Past the end of the token stream
    EOF,
}

impl SyntaxKind {
    /// Returns true if this kind is trivia (whitespace/newlines).
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEWLINE)
    }

    /// Returns true for single-character punctuation tokens.
    ///
    /// These are exactly the tokens a backslash can escape.
    pub fn is_punct(self) -> bool {
        !matches!(
            self,
            Self::WHITESPACE | Self::NEWLINE | Self::TEXT | Self::EOF
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivia_detection() {
        assert!(SyntaxKind::WHITESPACE.is_trivia());
        assert!(SyntaxKind::NEWLINE.is_trivia());
        assert!(!SyntaxKind::TEXT.is_trivia());
    }

    #[test]
    fn punctuation_detection() {
        assert!(SyntaxKind::STAR.is_punct());
        assert!(SyntaxKind::BACKSLASH.is_punct());
        assert!(!SyntaxKind::TEXT.is_punct());
        assert!(!SyntaxKind::EOF.is_punct());
    }
}
