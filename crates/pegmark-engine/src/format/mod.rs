//! Output side of the driver.
//!
//! A [`Formatter`] receives every resolved top-level tree in document order
//! and is finished exactly once after the last one.

pub mod html;
pub mod tree;

use std::io;

use pegmark_syntax::Tree;

pub use html::HtmlFormatter;
pub use tree::TreeFormatter;

pub trait Formatter {
    /// Handle one resolved top-level block. Never called with a tree that
    /// still holds `RAW` elements.
    fn format_block(&mut self, tree: Tree) -> io::Result<()>;

    /// Called once after the last block.
    fn finish(&mut self) -> io::Result<()>;
}

impl<F: Formatter + ?Sized> Formatter for &mut F {
    fn format_block(&mut self, tree: Tree) -> io::Result<()> {
        (**self).format_block(tree)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

impl<F: Formatter + ?Sized> Formatter for Box<F> {
    fn format_block(&mut self, tree: Tree) -> io::Result<()> {
        (**self).format_block(tree)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}
