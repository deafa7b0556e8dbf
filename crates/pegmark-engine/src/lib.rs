//! # pegmark-engine
//!
//! Turns Markdown source into resolved element trees and hands them to a
//! [`Formatter`].
//!
//! ```text
//! bytes → Preformatter → text → Driver ⇄ GrammarEngine
//!                                  │
//!                                  ▼
//!                       resolve RAW blocks → Formatter
//! ```
//!
//! The grammar itself lives in `pegmark-syntax`; this crate owns the
//! orchestration around it.
//!
//! ```
//! use pegmark_engine::{Extensions, to_html};
//!
//! let html = to_html("# Hi\n\nThere.\n", Extensions::default()).unwrap();
//! assert_eq!(html, "<h1>Hi</h1>\n<p>There.</p>\n");
//! ```

pub mod driver;
pub mod error;
pub mod format;
pub mod preformat;
pub mod resolve;

pub use driver::{Driver, Phase, TERMINAL_REMAINDERS, parse_rule};
pub use error::DriverError;
pub use format::{Formatter, HtmlFormatter, TreeFormatter};
pub use pegmark_syntax::{Engine, Extensions, GrammarEngine, Rule, Tree};
pub use preformat::Preformatter;

/// Render a whole document to HTML with a fresh driver.
pub fn to_html(src: &str, extensions: Extensions) -> Result<String, DriverError> {
    let mut formatter = HtmlFormatter::new(Vec::new());
    Driver::new(extensions).markdown(src.as_bytes(), &mut formatter)?;
    Ok(String::from_utf8_lossy(&formatter.into_inner()).into_owned())
}
