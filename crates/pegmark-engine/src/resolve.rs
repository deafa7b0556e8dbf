//! Raw block resolution.
//!
//! List items and block quotes come out of a block parse as `RAW` elements
//! holding their unparsed inner text. Resolution walks a tree, re-parses
//! every `RAW` element's chunks as independent documents and hangs the
//! results under the element, which becomes a `LIST`. Element positions
//! never change; only the `RAW` elements change kind.

use log::trace;
use pegmark_syntax::{Contents, ElementId, ElementKind, GrammarEngine, RawText, Rule, Tree};

use crate::driver::parse_rule;
use crate::error::DriverError;

/// Deepest chain of `RAW` elements nested inside each other's expansions.
pub const MAX_RAW_DEPTH: usize = 64;

/// Replace every `RAW` element reachable from `tree`'s roots.
///
/// A tree without `RAW` elements is left untouched.
pub fn resolve<E: GrammarEngine>(engine: &mut E, tree: &mut Tree) -> Result<(), DriverError> {
    let roots = tree.roots().to_vec();
    resolve_siblings(engine, tree, &roots, 0)
}

fn resolve_siblings<E: GrammarEngine>(
    engine: &mut E,
    tree: &mut Tree,
    siblings: &[ElementId],
    depth: usize,
) -> Result<(), DriverError> {
    for &id in siblings {
        let mut child_depth = depth;
        if tree[id].kind == ElementKind::RAW {
            if depth >= MAX_RAW_DEPTH {
                return Err(DriverError::RawNestingTooDeep {
                    limit: MAX_RAW_DEPTH,
                });
            }
            expand(engine, tree, id)?;
            child_depth += 1;
        }

        let children = tree[id].children.clone();
        if !children.is_empty() {
            resolve_siblings(engine, tree, &children, child_depth)?;
        }
    }
    Ok(())
}

/// Turn one `RAW` element into a `LIST` of its parsed chunks.
fn expand<E: GrammarEngine>(
    engine: &mut E,
    tree: &mut Tree,
    id: ElementId,
) -> Result<(), DriverError> {
    let element = &mut tree[id];
    let raw = match std::mem::take(&mut element.contents) {
        Contents::Raw(raw) => raw,
        Contents::Text(marked) => RawText::from_marked(&marked),
        _ => RawText::new(),
    };
    element.kind = ElementKind::LIST;
    element.children.clear();

    for chunk in raw.chunks() {
        trace!("resolving raw chunk {chunk:?}");
        let Some(parsed) = parse_rule(engine, Rule::Doc, chunk.to_owned())? else {
            continue;
        };
        if reproduces(&parsed, chunk) {
            return Err(DriverError::RawNotReduced { rule: Rule::Doc });
        }
        let roots = tree.graft(parsed);
        tree[id].children.extend(roots);
    }
    Ok(())
}

/// True if parsing `chunk` handed back a `RAW` element holding `chunk`.
fn reproduces(parsed: &Tree, chunk: &str) -> bool {
    parsed.descendants().any(|id| match &parsed[id].contents {
        Contents::Raw(raw) => parsed[id].kind == ElementKind::RAW && raw.text() == chunk,
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pegmark_syntax::{Element, Engine, Extensions, RawText};
    use pretty_assertions::assert_eq;

    fn raw_tree(raw: RawText) -> Tree {
        let mut tree = Tree::new();
        tree.push_root(Element::new(ElementKind::RAW, Contents::Raw(raw)));
        tree
    }

    fn leaf_text(tree: &Tree) -> String {
        tree.roots().iter().map(|&id| tree.text_content(id)).collect()
    }

    #[test]
    fn split_chunks_become_sibling_lists() {
        let mut engine = Engine::new(Extensions::default());
        let mut tree = raw_tree(RawText::from_marked("- a\u{1}- b"));

        resolve(&mut engine, &mut tree).unwrap();

        let list = tree.roots()[0];
        assert_eq!(tree[list].kind, ElementKind::LIST);
        assert!(tree[list].contents.is_empty());
        let kinds: Vec<_> = tree
            .children(list)
            .iter()
            .map(|&id| tree[id].kind)
            .collect();
        assert_eq!(kinds, vec![ElementKind::BULLETLIST, ElementKind::BULLETLIST]);
        assert!(tree.is_resolved());
        assert_eq!(leaf_text(&tree), "ab");
    }

    #[test]
    fn nested_raw_is_resolved_recursively() {
        let mut engine = Engine::new(Extensions::default());
        let mut raw = RawText::new();
        raw.push_text("- outer\n");
        raw.push_split();
        raw.push_text("> quoted\n");
        let mut tree = raw_tree(raw);

        resolve(&mut engine, &mut tree).unwrap();

        assert!(tree.is_resolved());
        insta::assert_snapshot!(tree.dump(), @r#"
        LIST
          BULLETLIST
            LISTITEM
              LIST
                PLAIN
                  STR "outer"
          BLOCKQUOTE
            LIST
              PARA
                STR "quoted"
        "#);
    }

    #[test]
    fn resolved_tree_is_unchanged() {
        let mut engine = Engine::new(Extensions::default());
        engine.reset_buffer("# Title\n\n- a\n- b\n\n".to_owned());
        let mut tree = engine.parse(Rule::Doc).unwrap().unwrap();
        engine.reset_buffer(String::new());

        resolve(&mut engine, &mut tree).unwrap();
        let once = tree.clone();
        resolve(&mut engine, &mut tree).unwrap();

        assert_eq!(tree, once);
    }

    #[test]
    fn empty_chunks_are_skipped() {
        let mut engine = Engine::new(Extensions::default());
        let mut tree = raw_tree(RawText::from_marked("\u{1}para\n\u{1}"));

        resolve(&mut engine, &mut tree).unwrap();

        let list = tree.roots()[0];
        assert_eq!(tree.children(list).len(), 1);
        assert_eq!(leaf_text(&tree), "para");
    }

    #[test]
    fn marked_text_contents_are_split() {
        let mut engine = Engine::new(Extensions::default());
        let mut tree = Tree::new();
        tree.push_root(Element::new(ElementKind::RAW, Contents::text("one\n\u{1}two\n")));

        resolve(&mut engine, &mut tree).unwrap();

        assert_eq!(tree.children(tree.roots()[0]).len(), 2);
    }

    fn notes_engine(definitions: &str) -> Engine {
        let mut engine = Engine::new(Extensions {
            notes: true,
            ..Extensions::default()
        });
        engine.reset_buffer(definitions.to_owned());
        engine.parse(Rule::Notes).unwrap();
        engine.reset_buffer(String::new());
        engine
    }

    #[test]
    fn self_referencing_note_does_not_reduce() {
        let mut engine = notes_engine("[^loop]: Again[^loop]\n\n");
        let mut tree = raw_tree(RawText::from_marked("See[^loop]\n"));

        let err = resolve(&mut engine, &mut tree).unwrap_err();

        assert!(matches!(err, DriverError::RawNotReduced { rule: Rule::Doc }));
    }

    #[test]
    fn mutually_referencing_notes_trip_the_depth_guard() {
        let mut engine = notes_engine("[^a]: A[^b]\n\n[^b]: B[^a]\n\n");
        let mut tree = raw_tree(RawText::from_marked("See[^a]\n"));

        let err = resolve(&mut engine, &mut tree).unwrap_err();

        assert!(matches!(
            err,
            DriverError::RawNestingTooDeep {
                limit: MAX_RAW_DEPTH
            }
        ));
    }
}
