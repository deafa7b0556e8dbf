use std::io::{self, Write};

use pegmark_syntax::Tree;

use super::Formatter;

/// Writes each block as an indented element dump.
///
/// ```text
/// H1
///   STR "Title"
/// ```
pub struct TreeFormatter<W: Write> {
    out: W,
}

impl<W: Write> TreeFormatter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Formatter for TreeFormatter<W> {
    fn format_block(&mut self, tree: Tree) -> io::Result<()> {
        self.out.write_all(tree.dump().as_bytes())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pegmark_syntax::{Contents, Element, ElementKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn dumps_each_block() {
        let mut formatter = TreeFormatter::new(Vec::new());
        let mut tree = Tree::new();
        let para = tree.push_root(Element::new(ElementKind::PARA, Contents::Empty));
        tree.push_child(para, Element::new(ElementKind::STR, Contents::text("hi")));

        formatter.format_block(tree).unwrap();
        formatter.finish().unwrap();

        assert_eq!(
            String::from_utf8(formatter.into_inner()).unwrap(),
            "PARA\n  STR \"hi\"\n"
        );
    }
}
