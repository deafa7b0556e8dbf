//! # pegmark-syntax
//!
//! A Markdown grammar engine built on [Logos], following the
//! [rust-analyzer] event-parser model, producing an arena tree of document
//! [`Element`]s.
//!
//! [Logos]: https://docs.rs/logos
//! [rust-analyzer]: https://rust-analyzer.github.io/book/contributing/syntax.html
//!
//! ## Architecture Overview
//!
//! ```text
//! Buffer → Lexer → Tokens → Parser → Events → Sink → Tree
//!          (Logos)          (Grammar)
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! The lexer uses [Logos] to split the working buffer into a flat, lossless
//! sequence of tokens.
//!
//! ```text
//! "# Hello\n" → [HASH, WHITESPACE, TEXT("Hello"), NEWLINE]
//! ```
//!
//! ### 2. Parser ([`parser`] module)
//!
//! Grammar rules drive a token cursor and emit **events** through a marker
//! system. Markers can be rolled back, which lets rules try alternatives
//! in order the way a PEG does.
//!
//! ### 3. Sink ([`parser::sink`] module)
//!
//! The sink replays the events into a [`Tree`]: an arena of elements
//! addressed by [`ElementId`], with ordered children and a list of roots.
//!
//! ## Sessions
//!
//! An [`Engine`] is a session over one working buffer. Each
//! [`GrammarEngine::parse`] call matches a [`Rule`] against a prefix of the
//! buffer, and the reference and notes rules record their definitions in
//! the session's [`SideTables`] for later block parses to use.
//!
//! ## Module Structure
//!
//! ```text
//! pegmark-syntax/
//! ├── lib.rs           # This file - public API and integration tests
//! ├── syntax_kind.rs   # Token kinds
//! ├── lexer.rs         # Logos-based tokenizer
//! ├── element.rs       # ElementKind, Contents, RawText
//! ├── tree.rs          # Arena tree of elements
//! ├── engine.rs        # Rules, extensions, side tables, the Engine session
//! └── parser/
//!     ├── mod.rs       # Parser struct, Marker system
//!     ├── event.rs     # Event enum
//!     ├── sink.rs      # Converts events to a Tree
//!     └── grammar/
//!         ├── mod.rs   # Entry rules (references, notes, docblock, doc)
//!         ├── block.rs # Block-level elements
//!         └── inline.rs# Inline elements
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use pegmark_syntax::{ElementKind, Engine, Extensions, GrammarEngine, Rule};
//!
//! let mut engine = Engine::new(Extensions::default());
//! engine.reset_buffer("# Hello\n".to_owned());
//!
//! let tree = engine.parse(Rule::Doc).unwrap().unwrap();
//! let heading = tree.roots()[0];
//! assert_eq!(tree[heading].kind, ElementKind::H1);
//! assert_eq!(tree.text_content(heading), "Hello");
//! ```

pub mod element;
pub mod engine;
pub mod lexer;
pub mod parser;
pub mod syntax_kind;
pub mod tree;

pub use element::{BOUNDARY_MARKER, Contents, Element, ElementKind, LinkTarget, RawPiece, RawText};
pub use engine::{Engine, EngineError, Extensions, GrammarEngine, Rule, SideTables};
pub use syntax_kind::SyntaxKind;
pub use tree::{ElementId, Tree};

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn parse_doc(input: &str, extensions: Extensions) -> Tree {
        let mut engine = Engine::new(extensions);
        engine.reset_buffer(input.to_owned());
        engine.parse(Rule::References).unwrap();
        engine.reset_buffer(input.to_owned());
        engine.parse(Rule::Doc).unwrap().unwrap_or_default()
    }

    #[test]
    fn snapshot_simple_document() {
        let input = "# Title\n\nSome *text* with a [link](/u).\n\n- one\n- two\n";
        let tree = parse_doc(input, Extensions::default());
        assert_snapshot!(tree.dump(), @r#"
        H1
          STR "Title"
        PARA
          STR "Some "
          EMPH
            STR "text"
          STR " with a "
          LINK </u>
            STR "link"
          STR "."
        BULLETLIST
          LISTITEM
            RAW "one\n"
          LISTITEM
            RAW "two\n"
        "#);
    }

    #[test]
    fn snapshot_reference_links_resolve_after_definitions_pass() {
        let input = "See [the docs].\n\n[The Docs]: http://docs.example \"Docs\"\n";
        let tree = parse_doc(input, Extensions::default());
        assert_snapshot!(tree.dump(), @r#"
        PARA
          STR "See "
          LINK <http://docs.example> "Docs"
            STR "the docs"
          STR "."
        REFERENCE <http://docs.example> "Docs"
        "#);
    }

    #[test]
    fn docblock_walks_a_document_one_block_at_a_time() {
        let mut engine = Engine::new(Extensions::default());
        engine.reset_buffer("# A\n\nb\n\n---\n".to_owned());

        let mut kinds = Vec::new();
        while let Some(tree) = engine.parse(Rule::Docblock).unwrap() {
            kinds.extend(tree.roots().iter().map(|&id| tree[id].kind));
        }
        assert_eq!(
            kinds,
            vec![ElementKind::H1, ElementKind::PARA, ElementKind::HRULE]
        );
    }

    // === Error tolerance ===
    // Half-finished markup never fails to parse; unmatched openers come out
    // as literal text.

    #[test]
    fn snapshot_messy_unclosed_constructs() {
        let input = "Also see [broken link without url\n\nSome *half done emphasis\n\nAnd `unclosed code span\n";
        let tree = parse_doc(input, Extensions::default());
        assert_snapshot!(tree.dump(), @r#"
        PARA
          STR "Also see [broken link without url"
        PARA
          STR "Some *half done emphasis"
        PLAIN
          STR "And `unclosed code span"
        "#);
    }

    #[test]
    fn every_engine_rule_makes_progress_on_arbitrary_text() {
        let inputs = [
            "Hello, world!\n",
            "# Heading\n",
            "> Quote\n",
            "- Item\n",
            "```\ncode\n```\n",
            "[link](url)\n",
            "*emphasis*\n",
            "**strong**\n",
            "`code span`\n",
            "<div>\n",
            "]]]\n\n[[[",
            "\t\t\n   \n",
        ];

        for input in inputs {
            let mut engine = Engine::new(Extensions {
                smart: true,
                notes: true,
                dlists: true,
                ..Extensions::default()
            });
            engine.reset_buffer(input.to_owned());
            while engine.parse(Rule::Docblock).is_ok_and(|tree| tree.is_some()) {}
            assert_eq!(engine.remainder(), "", "leftover for {input:?}");
        }
    }
}
