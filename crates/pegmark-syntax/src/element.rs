//! Document elements produced by the grammar.
//!
//! An [`Element`] is one node of the parsed document: a kind from the closed
//! [`ElementKind`] enumeration, a [`Contents`] payload and an ordered list of
//! children. Elements live in a [`Tree`](crate::tree::Tree) arena and refer
//! to their children by [`ElementId`](crate::tree::ElementId).

use std::fmt;

use crate::tree::ElementId;

/// Every kind of element the grammar can produce.
///
/// `RAW` is transient: it holds block text whose structure could not be
/// settled in one pass and is replaced by a `LIST` before any formatter sees
/// the tree. `LIST` is a generic sequence of blocks, not a bullet list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum ElementKind {
    // === Blocks ===
    LIST,
    RAW,
    PARA,
    PLAIN,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    BLOCKQUOTE,
    VERBATIM,
    HTMLBLOCK,
    HRULE,
    BULLETLIST,
    ORDEREDLIST,
    LISTITEM,
    REFERENCE,
    NOTE,
    DEFINITIONLIST,
    DEFTITLE,
    DEFDATA,

    // === Inlines ===
    STR,
    SPACE,
    LINEBREAK,
    CODE,
    HTML,
    EMPH,
    STRONG,
    LINK,
    IMAGE,
    ELLIPSIS,
    EMDASH,
    ENDASH,
    APOSTROPHE,
    SINGLEQUOTED,
    DOUBLEQUOTED,
}

impl ElementKind {
    /// Heading kind for an ATX/setext level, clamped to 1..=6.
    pub fn heading(level: usize) -> Self {
        match level {
            0 | 1 => Self::H1,
            2 => Self::H2,
            3 => Self::H3,
            4 => Self::H4,
            5 => Self::H5,
            _ => Self::H6,
        }
    }

    /// Heading level, if this is a heading kind.
    pub fn heading_level(self) -> Option<u8> {
        match self {
            Self::H1 => Some(1),
            Self::H2 => Some(2),
            Self::H3 => Some(3),
            Self::H4 => Some(4),
            Self::H5 => Some(5),
            Self::H6 => Some(6),
            _ => None,
        }
    }

    /// True for kinds that can appear inside a paragraph.
    pub fn is_inline(self) -> bool {
        self >= Self::STR
    }
}

/// The legacy in-band boundary marker between sibling blocks in RAW text.
///
/// Only [`RawText::from_marked`] interprets it; the grammar itself emits
/// [`RawPiece::Split`] and never writes this byte into raw content.
pub const BOUNDARY_MARKER: char = '\u{1}';

/// One piece of RAW content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPiece {
    Text(String),
    /// Boundary between two blocks that had no blank line between them.
    Split,
}

/// Unresolved block text carried by a `RAW` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawText {
    pieces: Vec<RawPiece>,
}

impl RawText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build raw text from a string using [`BOUNDARY_MARKER`] as split points.
    pub fn from_marked(text: &str) -> Self {
        let mut raw = Self::new();
        for (i, chunk) in text.split(BOUNDARY_MARKER).enumerate() {
            if i > 0 {
                raw.push_split();
            }
            raw.push_text(chunk);
        }
        raw
    }

    /// Append text, merging with a preceding text piece.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.pieces.last_mut() {
            Some(RawPiece::Text(last)) => last.push_str(text),
            _ => self.pieces.push(RawPiece::Text(text.to_owned())),
        }
    }

    pub fn push_split(&mut self) {
        self.pieces.push(RawPiece::Split);
    }

    /// Append every piece of `other`.
    pub fn append(&mut self, other: RawText) {
        for piece in other.pieces {
            match piece {
                RawPiece::Text(text) => self.push_text(&text),
                RawPiece::Split => self.push_split(),
            }
        }
    }

    pub fn pieces(&self) -> &[RawPiece] {
        &self.pieces
    }

    /// The text between split points, in order.
    ///
    /// There is always one more chunk than there are splits; chunks may be
    /// empty.
    pub fn chunks(&self) -> Vec<&str> {
        let mut chunks = vec![""];
        for piece in &self.pieces {
            match piece {
                RawPiece::Text(text) => {
                    if let Some(last) = chunks.last_mut() {
                        *last = text.as_str();
                    }
                }
                RawPiece::Split => chunks.push(""),
            }
        }
        chunks
    }

    /// All text with the split points removed.
    pub fn text(&self) -> String {
        self.chunks().concat()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

impl fmt::Display for RawText {
    /// Writes the legacy marked form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in &self.pieces {
            match piece {
                RawPiece::Text(text) => f.write_str(text)?,
                RawPiece::Split => write!(f, "{BOUNDARY_MARKER}")?,
            }
        }
        Ok(())
    }
}

/// Destination of a link, image or reference definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTarget {
    pub url: String,
    pub title: String,
}

/// Payload of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Contents {
    #[default]
    Empty,
    /// Literal text of leaf kinds (`STR`, `CODE`, `VERBATIM`, ...), or the
    /// label of a note definition block.
    Text(String),
    /// Deferred block text of a `RAW` element.
    Raw(RawText),
    Link(LinkTarget),
}

impl Contents {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub contents: Contents,
    pub children: Vec<ElementId>,
}

impl Element {
    pub fn new(kind: ElementKind, contents: Contents) -> Self {
        Self {
            kind,
            contents,
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chunks_split_on_markers() {
        let raw = RawText::from_marked("- a\u{1}- b");
        assert_eq!(raw.chunks(), vec!["- a", "- b"]);
        assert_eq!(
            raw.pieces(),
            &[
                RawPiece::Text("- a".into()),
                RawPiece::Split,
                RawPiece::Text("- b".into())
            ]
        );
    }

    #[test]
    fn chunks_without_markers() {
        let raw = RawText::from_marked("a\n\nb\n");
        assert_eq!(raw.chunks(), vec!["a\n\nb\n"]);
    }

    #[test]
    fn chunks_keep_empty_segments() {
        let mut raw = RawText::new();
        raw.push_split();
        raw.push_text("x");
        assert_eq!(raw.chunks(), vec!["", "x"]);
    }

    #[test]
    fn push_text_merges_adjacent_text() {
        let mut raw = RawText::new();
        raw.push_text("a\n");
        raw.push_text("b\n");
        assert_eq!(raw.pieces(), &[RawPiece::Text("a\nb\n".into())]);
    }

    #[test]
    fn append_merges_boundary_text() {
        let mut raw = RawText::from_marked("a\n");
        raw.append(RawText::from_marked("b\n\u{1}c\n"));
        assert_eq!(raw.chunks(), vec!["a\nb\n", "c\n"]);
    }

    #[test]
    fn text_drops_markers() {
        let raw = RawText::from_marked("a\n\u{1}- b\n");
        assert_eq!(raw.text(), "a\n- b\n");
        assert_eq!(raw.to_string(), "a\n\u{1}- b\n");
    }

    #[test]
    fn heading_levels() {
        assert_eq!(ElementKind::heading(3), ElementKind::H3);
        assert_eq!(ElementKind::heading(9), ElementKind::H6);
        assert_eq!(ElementKind::H2.heading_level(), Some(2));
        assert_eq!(ElementKind::PARA.heading_level(), None);
    }

    #[test]
    fn inline_kinds() {
        assert!(ElementKind::STR.is_inline());
        assert!(ElementKind::DOUBLEQUOTED.is_inline());
        assert!(!ElementKind::DEFDATA.is_inline());
    }
}
