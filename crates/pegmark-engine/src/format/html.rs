//! HTML output.
//!
//! Text is escaped with `html-escape`; raw HTML blocks and inline HTML pass
//! through untouched. Note references are numbered in the order they are
//! met and the notes themselves are written as an ordered list when the
//! formatter is finished.

use std::fmt::Write as _;
use std::io::{self, Write};

use html_escape::{encode_double_quoted_attribute, encode_text};
use pegmark_syntax::{Contents, ElementId, ElementKind, Tree};

use super::Formatter;

pub struct HtmlFormatter<W: Write> {
    out: W,
    /// Rendered note bodies, numbered from 1.
    notes: Vec<String>,
}

impl<W: Write> HtmlFormatter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            notes: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn children(&mut self, tree: &Tree, id: ElementId, html: &mut String) {
        for &child in tree.children(id) {
            self.element(tree, child, html);
        }
    }

    /// Children wrapped in `<tag>` and `</tag>`.
    fn wrap(&mut self, tree: &Tree, id: ElementId, tag: &str, html: &mut String) {
        let _ = write!(html, "<{tag}>");
        self.children(tree, id, html);
        let _ = write!(html, "</{tag}>");
    }

    fn element(&mut self, tree: &Tree, id: ElementId, html: &mut String) {
        let element = &tree[id];
        let text = element.contents.as_text().unwrap_or_default();

        match element.kind {
            ElementKind::LIST | ElementKind::PLAIN | ElementKind::RAW => {
                self.children(tree, id, html)
            }
            ElementKind::PARA => {
                self.wrap(tree, id, "p", html);
                html.push('\n');
            }
            kind @ (ElementKind::H1
            | ElementKind::H2
            | ElementKind::H3
            | ElementKind::H4
            | ElementKind::H5
            | ElementKind::H6) => {
                let level = kind.heading_level().unwrap_or(1);
                self.wrap(tree, id, &format!("h{level}"), html);
                html.push('\n');
            }
            ElementKind::BLOCKQUOTE => {
                html.push_str("<blockquote>\n");
                self.children(tree, id, html);
                html.push_str("</blockquote>\n");
            }
            ElementKind::VERBATIM => {
                let _ = writeln!(html, "<pre><code>{}</code></pre>", encode_text(text));
            }
            ElementKind::HTMLBLOCK => {
                html.push_str(text);
                html.push('\n');
            }
            ElementKind::HRULE => html.push_str("<hr />\n"),
            ElementKind::BULLETLIST | ElementKind::ORDEREDLIST => {
                let tag = if element.kind == ElementKind::BULLETLIST {
                    "ul"
                } else {
                    "ol"
                };
                let _ = writeln!(html, "<{tag}>");
                self.children(tree, id, html);
                let _ = writeln!(html, "</{tag}>");
            }
            ElementKind::LISTITEM => {
                self.wrap(tree, id, "li", html);
                html.push('\n');
            }
            ElementKind::DEFINITIONLIST => {
                html.push_str("<dl>\n");
                self.children(tree, id, html);
                html.push_str("</dl>\n");
            }
            ElementKind::DEFTITLE => {
                self.wrap(tree, id, "dt", html);
                html.push('\n');
            }
            ElementKind::DEFDATA => {
                self.wrap(tree, id, "dd", html);
                html.push('\n');
            }
            // Definitions only feed the side tables
            ElementKind::REFERENCE => {}
            ElementKind::NOTE if matches!(element.contents, Contents::Text(_)) => {}
            ElementKind::NOTE => {
                self.notes.push(String::new());
                let n = self.notes.len();
                let mut body = String::new();
                self.children(tree, id, &mut body);
                self.notes[n - 1] = body;
                let _ = write!(
                    html,
                    "<a class=\"noteref\" id=\"fnref{n}\" href=\"#fn{n}\" title=\"Jump to note {n}\">[{n}]</a>"
                );
            }

            ElementKind::STR | ElementKind::SPACE => html.push_str(&encode_text(text)),
            ElementKind::LINEBREAK => html.push_str("<br />\n"),
            ElementKind::CODE => {
                let _ = write!(html, "<code>{}</code>", encode_text(text));
            }
            ElementKind::HTML => html.push_str(text),
            ElementKind::EMPH => self.wrap(tree, id, "em", html),
            ElementKind::STRONG => self.wrap(tree, id, "strong", html),
            ElementKind::LINK => {
                let Contents::Link(target) = &element.contents else {
                    return self.children(tree, id, html);
                };
                let _ = write!(
                    html,
                    "<a href=\"{}\"",
                    encode_double_quoted_attribute(&target.url)
                );
                if !target.title.is_empty() {
                    let _ = write!(
                        html,
                        " title=\"{}\"",
                        encode_double_quoted_attribute(&target.title)
                    );
                }
                html.push('>');
                self.children(tree, id, html);
                html.push_str("</a>");
            }
            ElementKind::IMAGE => {
                let (url, title) = match &element.contents {
                    Contents::Link(target) => (target.url.as_str(), target.title.as_str()),
                    _ => ("", ""),
                };
                let alt = tree.text_content(id);
                let _ = write!(
                    html,
                    "<img src=\"{}\" alt=\"{}\"",
                    encode_double_quoted_attribute(url),
                    encode_double_quoted_attribute(&alt)
                );
                if !title.is_empty() {
                    let _ = write!(html, " title=\"{}\"", encode_double_quoted_attribute(title));
                }
                html.push_str(" />");
            }
            ElementKind::ELLIPSIS => html.push_str("&hellip;"),
            ElementKind::EMDASH => html.push_str("&mdash;"),
            ElementKind::ENDASH => html.push_str("&ndash;"),
            ElementKind::APOSTROPHE => html.push_str("&rsquo;"),
            ElementKind::SINGLEQUOTED => {
                html.push_str("&lsquo;");
                self.children(tree, id, html);
                html.push_str("&rsquo;");
            }
            ElementKind::DOUBLEQUOTED => {
                html.push_str("&ldquo;");
                self.children(tree, id, html);
                html.push_str("&rdquo;");
            }
        }
    }
}

impl<W: Write> Formatter for HtmlFormatter<W> {
    fn format_block(&mut self, tree: Tree) -> io::Result<()> {
        let mut html = String::new();
        for &root in tree.roots() {
            self.element(&tree, root, &mut html);
        }
        self.out.write_all(html.as_bytes())
    }

    fn finish(&mut self) -> io::Result<()> {
        if !self.notes.is_empty() {
            let mut html = String::from("<hr />\n<ol id=\"notes\">\n");
            for (i, body) in self.notes.drain(..).enumerate() {
                let n = i + 1;
                let _ = writeln!(
                    html,
                    "<li id=\"fn{n}\">{body}<a href=\"#fnref{n}\" class=\"back\">[back]</a></li>"
                );
            }
            html.push_str("</ol>\n");
            self.out.write_all(html.as_bytes())?;
        }
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pegmark_syntax::{Element, LinkTarget};
    use pretty_assertions::assert_eq;

    fn render(tree: Tree) -> String {
        let mut formatter = HtmlFormatter::new(Vec::new());
        formatter.format_block(tree).unwrap();
        formatter.finish().unwrap();
        String::from_utf8(formatter.into_inner()).unwrap()
    }

    fn str_leaf(text: &str) -> Element {
        Element::new(ElementKind::STR, Contents::text(text))
    }

    #[test]
    fn escapes_text() {
        let mut tree = Tree::new();
        let para = tree.push_root(Element::new(ElementKind::PARA, Contents::Empty));
        tree.push_child(para, str_leaf("a < b & c"));
        assert_eq!(render(tree), "<p>a &lt; b &amp; c</p>\n");
    }

    #[test]
    fn link_attributes_are_escaped() {
        let mut tree = Tree::new();
        let link = tree.push_root(Element::new(
            ElementKind::LINK,
            Contents::Link(LinkTarget {
                url: "/a?b=1&c=\"2\"".into(),
                title: "T".into(),
            }),
        ));
        tree.push_child(link, str_leaf("x"));
        assert_eq!(
            render(tree),
            "<a href=\"/a?b=1&amp;c=&quot;2&quot;\" title=\"T\">x</a>"
        );
    }

    #[test]
    fn definitions_render_nothing() {
        let mut tree = Tree::new();
        tree.push_root(Element::new(
            ElementKind::REFERENCE,
            Contents::Link(LinkTarget::default()),
        ));
        tree.push_root(Element::new(ElementKind::NOTE, Contents::text("1")));
        assert_eq!(render(tree), "");
    }

    #[test]
    fn notes_are_numbered_and_listed_on_finish() {
        let mut formatter = HtmlFormatter::new(Vec::new());
        for body in ["first", "second"] {
            let mut tree = Tree::new();
            let plain = tree.push_root(Element::new(ElementKind::PLAIN, Contents::Empty));
            let note = tree.push_child(plain, Element::new(ElementKind::NOTE, Contents::Empty));
            let list = tree.push_child(note, Element::new(ElementKind::LIST, Contents::Empty));
            let para = tree.push_child(list, Element::new(ElementKind::PARA, Contents::Empty));
            tree.push_child(para, str_leaf(body));
            formatter.format_block(tree).unwrap();
        }
        formatter.finish().unwrap();

        let html = String::from_utf8(formatter.into_inner()).unwrap();
        assert_eq!(
            html,
            concat!(
                "<a class=\"noteref\" id=\"fnref1\" href=\"#fn1\" title=\"Jump to note 1\">[1]</a>",
                "<a class=\"noteref\" id=\"fnref2\" href=\"#fn2\" title=\"Jump to note 2\">[2]</a>",
                "<hr />\n<ol id=\"notes\">\n",
                "<li id=\"fn1\"><p>first</p>\n<a href=\"#fnref1\" class=\"back\">[back]</a></li>\n",
                "<li id=\"fn2\"><p>second</p>\n<a href=\"#fnref2\" class=\"back\">[back]</a></li>\n",
                "</ol>\n"
            )
        );
    }
}
