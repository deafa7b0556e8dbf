//! Block-level grammar rules.
//!
//! Every rule starts at the beginning of a non-blank line. Detection helpers
//! take an absolute token index so a rule can look several lines ahead
//! without moving the cursor; only the rule that wins consumes anything.

use crate::element::{Contents, ElementKind, LinkTarget, RawText};
use crate::parser::{Parser, whitespace_width};
use crate::syntax_kind::SyntaxKind;

use super::inline;

/// Leading whitespace allowed before a block marker.
const NONINDENT: usize = 3;

/// Leading whitespace allowed before a nested list marker (`Indent` plus
/// non-indent space).
const NESTED_INDENT: usize = 7;

/// Width of one level of indentation.
const INDENT: usize = 4;

/// Tags that open an HTML block.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "blockquote",
    "center",
    "dd",
    "dir",
    "div",
    "dl",
    "dt",
    "fieldset",
    "form",
    "frameset",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "isindex",
    "li",
    "menu",
    "noframes",
    "noscript",
    "ol",
    "p",
    "pre",
    "script",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

/// Parse a block element.
///
/// Alternatives are tried in order; a paragraph always matches.
pub(super) fn block(p: &mut Parser<'_, '_>) {
    let at = p.pos();

    if starts_blockquote(p, at) {
        return blockquote(p);
    }
    if is_indented_line(p, at) {
        return verbatim(p);
    }
    if let Some(fence) = fence_start(p, at) {
        return fenced_code(p, fence);
    }
    if p.extensions().notes
        && let Some(note) = note_definition(p, at)
    {
        p.leaf(ElementKind::NOTE, Contents::Text(note.label));
        p.jump(note.end);
        return;
    }
    if let Some(definition) = reference_definition(p, at) {
        p.leaf(ElementKind::REFERENCE, Contents::Link(definition.target));
        p.jump(definition.end);
        p.bump_blank_lines();
        return;
    }
    if is_hrule(p, at) {
        return hrule(p);
    }
    if atx_heading(p) || setext_heading(p) {
        return;
    }
    if p.extensions().dlists && definition_list(p) {
        return;
    }
    match item_mark(p, at, NONINDENT, false) {
        Some((ItemMark::Bullet, _)) => return list(p, ElementKind::BULLETLIST),
        Some((ItemMark::Enumerator, _)) => return list(p, ElementKind::ORDEREDLIST),
        _ => {}
    }
    if let Some(kind) = html_block_start(p, at) {
        return html_block(p, kind);
    }
    paragraph(p)
}

/// Skip one block without producing anything.
///
/// Used by the scanning rules: a paragraph is skipped whole, so definitions
/// only count at the start of a block.
pub(super) fn skip_block(p: &mut Parser<'_, '_>) {
    let start = p.pos();
    if p.is_blank_line(start) {
        p.bump_blank_lines();
        return;
    }
    if p.kind_at(start) == SyntaxKind::HASH || setext_bottom(p, start).is_some() {
        p.jump(p.next_line(start));
        return;
    }

    let mut i = start;
    while !at_eof(p, i)
        && !p.is_blank_line(i)
        && p.kind_at(i) != SyntaxKind::HASH
        && setext_bottom(p, i).is_none()
    {
        i = p.next_line(i);
    }
    p.jump(i);
    p.bump_blank_lines();
}

// === Detection helpers ===

fn at_eof(p: &Parser<'_, '_>, i: usize) -> bool {
    p.kind_at(i) == SyntaxKind::EOF
}

/// Index after leading whitespace, if it is at most `max` columns wide.
fn skip_indent(p: &Parser<'_, '_>, i: usize, max: usize) -> Option<usize> {
    if p.kind_at(i) == SyntaxKind::WHITESPACE {
        (whitespace_width(p.text_at(i)) <= max).then_some(i + 1)
    } else {
        Some(i)
    }
}

/// A non-blank line indented by at least one level.
fn is_indented_line(p: &Parser<'_, '_>, i: usize) -> bool {
    !p.is_blank_line(i) && p.indent_at(i) >= INDENT
}

/// Remove one level of indentation from a line.
fn strip_indent(line: &str) -> &str {
    line.strip_prefix('\t')
        .or_else(|| line.strip_prefix("    "))
        .unwrap_or(line)
}

/// Index after trailing whitespace has been trimmed from `from..end`.
fn trim_end(p: &Parser<'_, '_>, from: usize, mut end: usize) -> usize {
    while end > from && p.kind_at(end - 1) == SyntaxKind::WHITESPACE {
        end -= 1;
    }
    end
}

fn starts_blockquote(p: &Parser<'_, '_>, i: usize) -> bool {
    quote_marker(p, i).is_some()
}

/// Index of the `>` opening a quoted line.
fn quote_marker(p: &Parser<'_, '_>, i: usize) -> Option<usize> {
    let j = skip_indent(p, i, NONINDENT)?;
    (p.kind_at(j) == SyntaxKind::GT).then_some(j)
}

fn is_hrule(p: &Parser<'_, '_>, i: usize) -> bool {
    let Some(j) = skip_indent(p, i, NONINDENT) else {
        return false;
    };
    let rule = p.kind_at(j);
    if !matches!(
        rule,
        SyntaxKind::STAR | SyntaxKind::DASH | SyntaxKind::UNDERSCORE
    ) {
        return false;
    }

    let mut count = 0;
    for k in j..p.line_end(i) {
        match p.kind_at(k) {
            kind if kind == rule => count += 1,
            SyntaxKind::WHITESPACE => {}
            _ => return false,
        }
    }
    count >= 3
}

/// Heading level of a setext underline (`===` or `---`) at `i`.
fn setext_bottom(p: &Parser<'_, '_>, i: usize) -> Option<usize> {
    let kind = p.kind_at(i);
    let level = match kind {
        SyntaxKind::EQUALS => 1,
        SyntaxKind::DASH => 2,
        _ => return None,
    };
    let run = (i..).take_while(|&k| p.kind_at(k) == kind).count();
    let rest_blank = (i + run..p.line_end(i)).all(|k| p.kind_at(k) == SyntaxKind::WHITESPACE);
    (run >= 3 && rest_blank).then_some(level)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    kind: SyntaxKind,
    len: usize,
}

fn fence_start(p: &Parser<'_, '_>, i: usize) -> Option<Fence> {
    let j = skip_indent(p, i, NONINDENT)?;
    let kind = p.kind_at(j);
    if !matches!(kind, SyntaxKind::BACKTICK | SyntaxKind::TILDE) {
        return None;
    }
    let len = (j..).take_while(|&k| p.kind_at(k) == kind).count();
    if len < 3 {
        return None;
    }
    // ```code``` on one line is a code span
    if kind == SyntaxKind::BACKTICK
        && (j + len..p.line_end(i)).any(|k| p.kind_at(k) == SyntaxKind::BACKTICK)
    {
        return None;
    }
    Some(Fence { kind, len })
}

fn is_fence_close(p: &Parser<'_, '_>, i: usize, fence: Fence) -> bool {
    let Some(j) = skip_indent(p, i, NONINDENT) else {
        return false;
    };
    let run = (j..).take_while(|&k| p.kind_at(k) == fence.kind).count();
    run >= fence.len
        && (j + run..p.line_end(i)).all(|k| p.kind_at(k) == SyntaxKind::WHITESPACE)
}

/// Index of the `]` closing the bracket at `open`, on the same line.
fn closing_bracket(p: &Parser<'_, '_>, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for k in open.. {
        match p.kind_at(k) {
            SyntaxKind::LBRACKET => depth += 1,
            SyntaxKind::RBRACKET => {
                depth -= 1;
                if depth == 0 {
                    return Some(k);
                }
            }
            SyntaxKind::NEWLINE | SyntaxKind::EOF => return None,
            _ => {}
        }
    }
    None
}

/// Whitespace with at most one line break in it.
fn skip_spnl(p: &Parser<'_, '_>, mut i: usize) -> usize {
    if p.kind_at(i) == SyntaxKind::WHITESPACE {
        i += 1;
    }
    if p.kind_at(i) == SyntaxKind::NEWLINE && !p.is_blank_line(i + 1) {
        i += 1;
        if p.kind_at(i) == SyntaxKind::WHITESPACE {
            i += 1;
        }
    }
    i
}

/// Optional trailing whitespace, then the end of the line. Returns the index
/// of the next line.
fn line_terminator(p: &Parser<'_, '_>, mut i: usize) -> Option<usize> {
    if p.kind_at(i) == SyntaxKind::WHITESPACE {
        i += 1;
    }
    match p.kind_at(i) {
        SyntaxKind::NEWLINE => Some(i + 1),
        SyntaxKind::EOF => Some(i),
        _ => None,
    }
}

// === Definitions ===

/// A `[label]: url "title"` line.
pub(super) struct ReferenceDefinition {
    pub label: String,
    pub target: LinkTarget,
    pub end: usize,
}

pub(super) fn reference_definition(p: &Parser<'_, '_>, i: usize) -> Option<ReferenceDefinition> {
    let open = skip_indent(p, i, NONINDENT)?;
    if p.kind_at(open) != SyntaxKind::LBRACKET || p.kind_at(open + 1) == SyntaxKind::RBRACKET {
        return None;
    }
    if p.extensions().notes && p.kind_at(open + 1) == SyntaxKind::CARET {
        return None;
    }
    let close = closing_bracket(p, open)?;
    if p.kind_at(close + 1) != SyntaxKind::COLON {
        return None;
    }

    let source = skip_spnl(p, close + 2);
    let after_source = (source..)
        .find(|&k| {
            matches!(
                p.kind_at(k),
                SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE | SyntaxKind::EOF
            )
        })
        .unwrap_or(source);
    if after_source == source {
        return None;
    }
    let url = p.text(source, after_source);
    let url = url
        .strip_prefix('<')
        .and_then(|u| u.strip_suffix('>'))
        .unwrap_or(&url)
        .to_owned();

    let (title, end) = match reference_title(p, after_source) {
        Some(found) => found,
        None => (String::new(), line_terminator(p, after_source)?),
    };

    Some(ReferenceDefinition {
        label: p.text(open + 1, close),
        target: LinkTarget { url, title },
        end,
    })
}

/// A quoted or parenthesised title ending its line. Returns the title and
/// the index of the next line.
fn reference_title(p: &Parser<'_, '_>, i: usize) -> Option<(String, usize)> {
    let open = skip_spnl(p, i);
    let close_kind = match p.kind_at(open) {
        SyntaxKind::QUOTE => SyntaxKind::QUOTE,
        SyntaxKind::APOSTROPHE => SyntaxKind::APOSTROPHE,
        SyntaxKind::LPAREN => SyntaxKind::RPAREN,
        _ => return None,
    };
    for k in open + 1.. {
        match p.kind_at(k) {
            SyntaxKind::NEWLINE | SyntaxKind::EOF => return None,
            kind if kind == close_kind => {
                if let Some(end) = line_terminator(p, k + 1) {
                    return Some((p.text(open + 1, k), end));
                }
            }
            _ => {}
        }
    }
    None
}

/// A `[^label]: text` note with its indented continuation blocks.
pub(super) struct NoteDefinition {
    pub label: String,
    pub text: String,
    pub end: usize,
}

pub(super) fn note_definition(p: &Parser<'_, '_>, i: usize) -> Option<NoteDefinition> {
    let open = skip_indent(p, i, NONINDENT)?;
    if p.kind_at(open) != SyntaxKind::LBRACKET || p.kind_at(open + 1) != SyntaxKind::CARET {
        return None;
    }
    let close = closing_bracket(p, open)?;
    if p.kind_at(close + 1) != SyntaxKind::COLON || close == open + 2 {
        return None;
    }
    let mut first = close + 2;
    if p.kind_at(first) == SyntaxKind::WHITESPACE {
        first += 1;
    }
    if at_eof(p, first) || p.is_blank_line(first) {
        return None;
    }

    let first_line = p.text(first, p.next_line(first));
    let (mut text, mut end) = note_block(p, first_line, p.next_line(first));
    while is_indented_line(p, end) {
        let line = strip_indent(&p.line_text(end)).to_owned();
        let (more, next) = note_block(p, line, p.next_line(end));
        text.push_str(&more);
        end = next;
    }

    Some(NoteDefinition {
        label: p.text(open + 2, close),
        text,
        end,
    })
}

/// One paragraph of a note and the blank lines after it.
fn note_block(p: &Parser<'_, '_>, first_line: String, mut i: usize) -> (String, usize) {
    let mut text = first_line;
    while !at_eof(p, i) && !p.is_blank_line(i) {
        text.push_str(strip_indent(&p.line_text(i)));
        i = p.next_line(i);
    }
    let blank_start = i;
    while p.is_blank_line(i) {
        i = p.next_line(i);
    }
    text.push_str(&p.text(blank_start, i));
    text.push('\n');
    (text, i)
}

// === Simple blocks ===

/// Parse a blockquote.
///
/// The quoted text, with `>` markers removed, becomes a `RAW` child. Lazy
/// continuation lines and blank lines between quoted lines belong to the
/// quote.
fn blockquote(p: &mut Parser<'_, '_>) {
    let mut raw = RawText::new();
    let mut i = p.pos();

    while let Some(gt) = quote_marker(p, i) {
        let rest = p.text(gt + 1, p.next_line(i));
        raw.push_text(rest.strip_prefix(' ').unwrap_or(&rest));
        i = p.next_line(i);

        while !at_eof(p, i) && !p.is_blank_line(i) && !starts_blockquote(p, i) {
            raw.push_text(&p.line_text(i));
            i = p.next_line(i);
        }
        while p.is_blank_line(i) {
            raw.push_text("\n");
            i = p.next_line(i);
        }
    }
    raw.push_text("\n");

    let m = p.start();
    p.leaf(ElementKind::RAW, Contents::Raw(raw));
    p.jump(i);
    m.complete(p, ElementKind::BLOCKQUOTE);
}

/// Parse an indented code block.
///
/// Blank lines inside the block are kept; blank lines after it are not.
fn verbatim(p: &mut Parser<'_, '_>) {
    let mut text = String::new();
    let mut i = p.pos();

    loop {
        let mut j = i;
        let mut blanks = 0;
        while p.is_blank_line(j) {
            blanks += 1;
            j = p.next_line(j);
        }
        if !is_indented_line(p, j) {
            break;
        }
        text.push_str(&"\n".repeat(blanks));
        while is_indented_line(p, j) {
            text.push_str(strip_indent(&p.line_text(j)));
            j = p.next_line(j);
        }
        i = j;
    }

    p.leaf(ElementKind::VERBATIM, Contents::Text(text));
    p.jump(i);
}

/// Parse a fenced code block. An unclosed fence runs to the end of input.
fn fenced_code(p: &mut Parser<'_, '_>, fence: Fence) {
    let mut text = String::new();
    let mut i = p.next_line(p.pos());

    while !at_eof(p, i) {
        if is_fence_close(p, i, fence) {
            i = p.next_line(i);
            break;
        }
        text.push_str(&p.line_text(i));
        i = p.next_line(i);
    }

    p.leaf(ElementKind::VERBATIM, Contents::Text(text));
    p.jump(i);
}

/// Parse a horizontal rule and the blank lines after it.
fn hrule(p: &mut Parser<'_, '_>) {
    p.leaf(ElementKind::HRULE, Contents::Empty);
    p.jump(p.next_line(p.pos()));
    p.bump_blank_lines();
}

/// Parse an ATX heading (`# Title`, optionally closed by `#`s).
fn atx_heading(p: &mut Parser<'_, '_>) -> bool {
    let start = p.pos();
    if p.kind_at(start) != SyntaxKind::HASH {
        return false;
    }
    let hashes = (start..)
        .take_while(|&k| p.kind_at(k) == SyntaxKind::HASH)
        .count();
    let level = hashes.min(6);

    let mut content = start + level;
    if p.kind_at(content) == SyntaxKind::WHITESPACE {
        content += 1;
    }
    let mut end = trim_end(p, content, p.line_end(start));
    while end > content && p.kind_at(end - 1) == SyntaxKind::HASH {
        end -= 1;
    }
    let end = trim_end(p, content, end);
    if end <= content {
        return false;
    }

    let m = p.start();
    p.jump(content);
    inline::inlines(p, end);
    p.jump(p.next_line(start));
    m.complete(p, ElementKind::heading(level));
    true
}

/// Parse a setext heading: one line of text underlined with `===` or `---`.
fn setext_heading(p: &mut Parser<'_, '_>) -> bool {
    let start = p.pos();
    let underline = p.next_line(start);
    let Some(level) = setext_bottom(p, underline) else {
        return false;
    };

    let content = p.skip_whitespace_at(start);
    let end = trim_end(p, content, p.line_end(start));
    if end <= content {
        return false;
    }

    let m = p.start();
    p.jump(content);
    inline::inlines(p, end);
    p.jump(p.next_line(underline));
    m.complete(p, ElementKind::heading(level));
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HtmlBlockKind {
    Block,
    Style,
}

fn html_block_start(p: &Parser<'_, '_>, i: usize) -> Option<HtmlBlockKind> {
    let j = skip_indent(p, i, NONINDENT)?;
    if p.kind_at(j) != SyntaxKind::LT {
        return None;
    }
    if p.kind_at(j + 1) == SyntaxKind::BANG
        && p.kind_at(j + 2) == SyntaxKind::DASH
        && p.kind_at(j + 3) == SyntaxKind::DASH
    {
        return Some(HtmlBlockKind::Block);
    }
    if p.kind_at(j + 1) != SyntaxKind::TEXT {
        return None;
    }

    let name: String = p
        .text_at(j + 1)
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    if name == "style" {
        Some(HtmlBlockKind::Style)
    } else if BLOCK_TAGS.contains(&name.as_str()) {
        Some(HtmlBlockKind::Block)
    } else {
        None
    }
}

/// Parse a raw HTML block: up to the next blank line, or for `<style>` up to
/// the closing tag.
fn html_block(p: &mut Parser<'_, '_>, kind: HtmlBlockKind) {
    let start = p.pos();
    let mut end = None;

    if kind == HtmlBlockKind::Style {
        let mut i = start;
        while !at_eof(p, i) {
            if p.line_text(i).to_ascii_lowercase().contains("</style") {
                end = Some(p.next_line(i));
                break;
            }
            i = p.next_line(i);
        }
    }
    let end = end.unwrap_or_else(|| {
        let mut i = start;
        while !at_eof(p, i) && !p.is_blank_line(i) {
            i = p.next_line(i);
        }
        i
    });

    let filtered = match kind {
        HtmlBlockKind::Block => p.extensions().filter_html,
        HtmlBlockKind::Style => p.extensions().filter_styles,
    };
    if filtered {
        p.leaf(ElementKind::LIST, Contents::Empty);
    } else {
        let text = p.text(start, end);
        let text = text.trim_end_matches(['\r', '\n']);
        p.leaf(ElementKind::HTMLBLOCK, Contents::text(text));
    }
    p.jump(end);
    p.bump_blank_lines();
}

/// Parse a paragraph (default block).
///
/// A paragraph followed by a blank line is a `PARA` and consumes the blank
/// lines; one that runs into something else is `PLAIN`.
fn paragraph(p: &mut Parser<'_, '_>) {
    let mut line = p.pos();
    loop {
        let next = p.next_line(line);
        if at_eof(p, next) || p.is_blank_line(next) || interrupts_paragraph(p, next) {
            break;
        }
        line = next;
    }
    let end = trim_end(p, p.pos(), p.line_end(line));

    let m = p.start();
    p.eat(SyntaxKind::WHITESPACE);
    inline::inlines(p, end);
    p.jump(p.next_line(line));

    if p.is_blank_line(p.pos()) {
        p.bump_blank_lines();
        m.complete(p, ElementKind::PARA);
    } else {
        m.complete(p, ElementKind::PLAIN);
    }
}

/// Lines that end a paragraph without a blank line in between.
fn interrupts_paragraph(p: &Parser<'_, '_>, i: usize) -> bool {
    starts_blockquote(p, i)
        || p.kind_at(i) == SyntaxKind::HASH
        || fence_start(p, i).is_some()
        || setext_bottom(p, p.next_line(i)).is_some()
}

// === Lists ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemMark {
    /// `-`, `*` or `+`
    Bullet,
    /// `1.`
    Enumerator,
    /// `:` or `~` in a definition list
    Definition,
}

/// Detect a list item marker on the line at `i`.
///
/// Returns the marker and the index where the item's text starts. The marker
/// must be followed by whitespace and then something that is not blank.
fn item_mark(
    p: &Parser<'_, '_>,
    i: usize,
    max_indent: usize,
    definitions: bool,
) -> Option<(ItemMark, usize)> {
    let j = skip_indent(p, i, max_indent)?;
    let (mark, after) = match p.kind_at(j) {
        SyntaxKind::DASH | SyntaxKind::STAR | SyntaxKind::PLUS => (ItemMark::Bullet, j + 1),
        SyntaxKind::TEXT
            if p.kind_at(j + 1) == SyntaxKind::DOT
                && p.text_at(j).bytes().all(|b| b.is_ascii_digit()) =>
        {
            (ItemMark::Enumerator, j + 2)
        }
        SyntaxKind::COLON | SyntaxKind::TILDE if definitions => (ItemMark::Definition, j + 1),
        _ => return None,
    };
    if p.kind_at(after) != SyntaxKind::WHITESPACE || p.is_blank_line(after) {
        return None;
    }
    if mark == ItemMark::Bullet && is_hrule(p, i) {
        return None;
    }
    Some((mark, after + 1))
}

/// A line that continues the current list block.
fn is_list_block_line(p: &Parser<'_, '_>, i: usize) -> bool {
    !at_eof(p, i)
        && !p.is_blank_line(i)
        && item_mark(p, i, NESTED_INDENT, false).is_none()
        && !is_hrule(p, i)
}

/// The first line of an item (from `content`) and its continuation lines.
fn list_block(p: &Parser<'_, '_>, content: usize) -> (RawText, usize) {
    let mut raw = RawText::new();
    let mut i = p.next_line(content);
    raw.push_text(&p.text(content, i));
    while is_list_block_line(p, i) {
        raw.push_text(strip_indent(&p.line_text(i)));
        i = p.next_line(i);
    }
    (raw, i)
}

/// Indented blocks that continue an item, with the blank lines before them.
///
/// With no blank line before the block, a split point separates it from the
/// text before so the two are re-parsed as separate blocks.
fn continuation_block(p: &Parser<'_, '_>, start: usize) -> Option<(RawText, usize)> {
    let mut i = start;
    while p.is_blank_line(i) {
        i = p.next_line(i);
    }
    if !is_indented_line(p, i) {
        return None;
    }

    let mut raw = RawText::new();
    if i == start {
        raw.push_split();
    } else {
        raw.push_text(&p.text(start, i));
    }
    while is_indented_line(p, i) {
        raw.push_text(strip_indent(&p.line_text(i)));
        i = p.next_line(i);
        while is_list_block_line(p, i) {
            raw.push_text(strip_indent(&p.line_text(i)));
            i = p.next_line(i);
        }
    }
    Some((raw, i))
}

/// Scan the items of a list starting at `start`.
///
/// Returns each item's deferred text and the index after the list.
fn list_items(p: &Parser<'_, '_>, start: usize) -> (Vec<RawText>, usize) {
    tight_list(p, start).unwrap_or_else(|| loose_list(p, start))
}

/// Items with no blank lines between them. Fails if a blank line turns out
/// to separate items or item paragraphs, so the list is loose instead.
fn tight_list(p: &Parser<'_, '_>, start: usize) -> Option<(Vec<RawText>, usize)> {
    let definitions = p.extensions().dlists;
    let mut items = Vec::new();
    let mut i = start;

    while let Some((_, content)) = item_mark(p, i, NONINDENT, definitions) {
        let (mut raw, mut end) = list_block(p, content);
        while !p.is_blank_line(end) {
            let Some((more, next)) = continuation_block(p, end) else {
                break;
            };
            raw.append(more);
            end = next;
        }
        if continuation_block(p, end).is_some() {
            return None;
        }
        items.push(raw);
        i = end;
    }

    while p.is_blank_line(i) {
        i = p.next_line(i);
    }
    if item_mark(p, i, NONINDENT, false).is_some() {
        return None;
    }
    Some((items, i))
}

/// Items separated by blank lines. Every item's text gets a trailing blank
/// line so its last paragraph re-parses as `PARA`.
fn loose_list(p: &Parser<'_, '_>, start: usize) -> (Vec<RawText>, usize) {
    let definitions = p.extensions().dlists;
    let mut items = Vec::new();
    let mut i = start;

    while let Some((_, content)) = item_mark(p, i, NONINDENT, definitions) {
        let (mut raw, mut end) = list_block(p, content);
        while let Some((more, next)) = continuation_block(p, end) {
            raw.append(more);
            end = next;
        }
        while p.is_blank_line(end) {
            end = p.next_line(end);
        }
        raw.push_text("\n\n");
        items.push(raw);
        i = end;
    }
    (items, i)
}

fn list_item(p: &mut Parser<'_, '_>, kind: ElementKind, raw: RawText) {
    let m = p.start();
    p.leaf(ElementKind::RAW, Contents::Raw(raw));
    m.complete(p, kind);
}

/// Parse a bullet or ordered list.
fn list(p: &mut Parser<'_, '_>, kind: ElementKind) {
    let (items, end) = list_items(p, p.pos());
    let m = p.start();
    for raw in items {
        list_item(p, ElementKind::LISTITEM, raw);
    }
    p.jump(end);
    m.complete(p, kind);
}

/// Where the terms of one definition end and its definitions start.
struct DefinitionTerms {
    end: usize,
    definitions: usize,
    /// A blank line separates terms and definitions.
    loose: bool,
}

/// Term lines followed (after at most one blank line) by a definition
/// marker.
fn definition_terms(p: &Parser<'_, '_>, start: usize) -> Option<DefinitionTerms> {
    let is_definition =
        |i: usize| matches!(item_mark(p, i, NONINDENT, true), Some((ItemMark::Definition, _)));

    let mut i = start;
    while !at_eof(p, i)
        && !p.is_blank_line(i)
        && !is_definition(i)
        && skip_indent(p, i, NONINDENT).is_some()
    {
        i = p.next_line(i);
    }
    if i == start {
        return None;
    }
    let end = i;
    let loose = p.is_blank_line(i);
    if loose {
        i = p.next_line(i);
    }
    is_definition(i).then_some(DefinitionTerms {
        end,
        definitions: i,
        loose,
    })
}

/// Parse a definition list: terms (`DEFTITLE`) each followed by one or more
/// `:`-marked definitions (`DEFDATA`).
fn definition_list(p: &mut Parser<'_, '_>) -> bool {
    if definition_terms(p, p.pos()).is_none() {
        return false;
    }

    let m = p.start();
    while let Some(terms) = definition_terms(p, p.pos()) {
        let mut line = p.pos();
        while line < terms.end {
            let term = p.start();
            let content = p.skip_whitespace_at(line);
            let end = trim_end(p, content, p.line_end(line));
            p.jump(content);
            inline::inlines(p, end);
            term.complete(p, ElementKind::DEFTITLE);
            line = p.next_line(line);
        }

        let (items, end) = if terms.loose {
            loose_list(p, terms.definitions)
        } else {
            list_items(p, terms.definitions)
        };
        for raw in items {
            list_item(p, ElementKind::DEFDATA, raw);
        }
        p.jump(end);
        p.bump_blank_lines();
    }
    m.complete(p, ElementKind::DEFINITIONLIST);
    true
}
