//! Sink for converting parser events into an element [`Tree`].

use crate::element::Element;
use crate::parser::event::Event;
use crate::tree::{ElementId, Tree};

/// Replays parser events into a [`Tree`].
pub struct Sink {
    tree: Tree,
    open: Vec<ElementId>,
    events: Vec<Event>,
}

impl Sink {
    /// Create a new sink.
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            tree: Tree::new(),
            open: Vec::new(),
            events,
        }
    }

    /// Consume the sink and build the tree.
    ///
    /// Top-level `Start`/`Leaf` events become roots; everything else is
    /// attached to the innermost open element.
    pub fn finish(mut self) -> Tree {
        for event in std::mem::take(&mut self.events) {
            match event {
                Event::Start { kind, contents } => {
                    let id = self.attach(Element::new(kind, contents));
                    self.open.push(id);
                }
                Event::Leaf { kind, contents } => {
                    self.attach(Element::new(kind, contents));
                }
                Event::Finish => {
                    self.open.pop();
                }
                Event::Placeholder => {}
            }
        }

        debug_assert!(self.open.is_empty(), "unbalanced parser events");
        self.tree
    }

    fn attach(&mut self, element: Element) -> ElementId {
        match self.open.last() {
            Some(&parent) => self.tree.push_child(parent, element),
            None => self.tree.push_root(element),
        }
    }
}
