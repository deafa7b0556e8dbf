//! Arena-backed element tree.
//!
//! Elements are stored in a flat `Vec` and addressed by [`ElementId`]. A
//! parent's children and the tree's top-level roots are ordered id lists, so
//! sibling order is simply list order and splicing never chases pointers.

use std::fmt::Write as _;
use std::ops::{Index, IndexMut};

use crate::element::{Contents, Element, ElementKind};

/// Index of an element inside one [`Tree`].
///
/// Ids are only meaningful for the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The elements produced by one rule invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Element>,
    roots: Vec<ElementId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an element without attaching it anywhere.
    pub fn alloc(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(element);
        id
    }

    /// Allocate an element and append it to the top-level sequence.
    pub fn push_root(&mut self, element: Element) -> ElementId {
        let id = self.alloc(element);
        self.roots.push(id);
        id
    }

    /// Allocate an element and append it to `parent`'s children.
    pub fn push_child(&mut self, parent: ElementId, element: Element) -> ElementId {
        let id = self.alloc(element);
        self[parent].children.push(id);
        id
    }

    /// Top-level elements in document order.
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of allocated elements, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self[id].children
    }

    /// Move every element of `other` into this arena.
    ///
    /// Returns `other`'s roots, re-addressed for this tree, in order. The
    /// grafted elements are not attached; the caller decides where they go.
    pub fn graft(&mut self, other: Tree) -> Vec<ElementId> {
        let offset = self.nodes.len();
        let shift = |id: ElementId| ElementId(id.0 + offset);

        self.nodes.extend(other.nodes.into_iter().map(|mut element| {
            for child in &mut element.children {
                *child = shift(*child);
            }
            element
        }));
        other.roots.into_iter().map(shift).collect()
    }

    /// Pre-order traversal of everything reachable from the roots.
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack = self.roots.clone();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Concatenated text of every leaf below (and including) `id`.
    ///
    /// `SPACE` contributes its literal text, `RAW` its text without split
    /// points.
    pub fn text_content(&self, id: ElementId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: ElementId, out: &mut String) {
        let element = &self[id];
        match &element.contents {
            Contents::Text(text) if element.kind != ElementKind::NOTE => out.push_str(text),
            Contents::Raw(raw) => out.push_str(&raw.text()),
            _ => {}
        }
        for &child in &element.children {
            self.collect_text(child, out);
        }
    }

    /// Indented one-line-per-element rendering, for debugging and tests.
    ///
    /// ```text
    /// PARA
    ///   STR "Hello"
    /// BULLETLIST
    ///   LISTITEM
    ///     RAW "a\n" | "- b\n"
    /// ```
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.dump_element(root, 0, &mut out);
        }
        out
    }

    fn dump_element(&self, id: ElementId, depth: usize, out: &mut String) {
        let element = &self[id];
        let _ = write!(out, "{:indent$}{:?}", "", element.kind, indent = depth * 2);
        match &element.contents {
            Contents::Empty => {}
            Contents::Text(text) => {
                let _ = write!(out, " {text:?}");
            }
            Contents::Raw(raw) => {
                let chunks: Vec<String> = raw.chunks().iter().map(|c| format!("{c:?}")).collect();
                let _ = write!(out, " {}", chunks.join(" | "));
            }
            Contents::Link(target) => {
                let _ = write!(out, " <{}>", target.url);
                if !target.title.is_empty() {
                    let _ = write!(out, " {:?}", target.title);
                }
            }
        }
        out.push('\n');
        for &child in &element.children {
            self.dump_element(child, depth + 1, out);
        }
    }

    /// True if no `RAW` element is reachable from the roots.
    pub fn is_resolved(&self) -> bool {
        self.descendants()
            .all(|id| self[id].kind != ElementKind::RAW)
    }
}

impl Index<ElementId> for Tree {
    type Output = Element;

    fn index(&self, id: ElementId) -> &Element {
        &self.nodes[id.0]
    }
}

impl IndexMut<ElementId> for Tree {
    fn index_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.nodes[id.0]
    }
}

/// Iterator returned by [`Tree::descendants`].
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<ElementId>,
}

impl Iterator for Descendants<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree[id].children.iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn str_element(text: &str) -> Element {
        Element::new(ElementKind::STR, Contents::text(text))
    }

    #[test]
    fn graft_remaps_children_and_roots() {
        let mut host = Tree::new();
        let list = host.push_root(Element::new(ElementKind::LIST, Contents::Empty));

        let mut other = Tree::new();
        let para = other.push_root(Element::new(ElementKind::PARA, Contents::Empty));
        other.push_child(para, str_element("hello"));
        other.push_root(Element::new(ElementKind::HRULE, Contents::Empty));

        let grafted = host.graft(other);
        host[list].children.extend(grafted.iter().copied());

        assert_eq!(grafted.len(), 2);
        assert_eq!(host[grafted[0]].kind, ElementKind::PARA);
        assert_eq!(host[grafted[1]].kind, ElementKind::HRULE);
        assert_eq!(host.text_content(list), "hello");
        assert_eq!(host.roots(), &[list]);
    }

    #[test]
    fn descendants_are_pre_order() {
        let mut tree = Tree::new();
        let a = tree.push_root(Element::new(ElementKind::PARA, Contents::Empty));
        let b = tree.push_child(a, str_element("b"));
        let c = tree.push_child(a, str_element("c"));
        let d = tree.push_root(Element::new(ElementKind::HRULE, Contents::Empty));

        let order: Vec<_> = tree.descendants().collect();
        assert_eq!(order, vec![a, b, c, d]);
    }

    #[test]
    fn resolved_detection() {
        let mut tree = Tree::new();
        let item = tree.push_root(Element::new(ElementKind::LISTITEM, Contents::Empty));
        assert!(tree.is_resolved());
        tree.push_child(item, Element::new(ElementKind::RAW, Contents::Empty));
        assert!(!tree.is_resolved());
    }

    #[test]
    fn dump_shows_nesting_and_contents() {
        let mut tree = Tree::new();
        let item = tree.push_root(Element::new(ElementKind::LISTITEM, Contents::Empty));
        tree.push_child(
            item,
            Element::new(
                ElementKind::RAW,
                Contents::Raw(crate::element::RawText::from_marked("a\n\u{1}- b\n")),
            ),
        );
        tree.push_root(Element::new(
            ElementKind::LINK,
            Contents::Link(crate::element::LinkTarget {
                url: "/u".into(),
                title: String::new(),
            }),
        ));

        assert_eq!(
            tree.dump(),
            "LISTITEM\n  RAW \"a\\n\" | \"- b\\n\"\nLINK </u>\n"
        );
    }

    #[test]
    fn unattached_elements_are_not_roots() {
        let mut tree = Tree::new();
        tree.alloc(str_element("loose"));
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
    }
}
