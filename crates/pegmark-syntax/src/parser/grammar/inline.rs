//! # Inline-Level Grammar
//!
//! Inline elements are the formatting within blocks: emphasis, links, code
//! spans, notes. Unlike blocks, inline parsing is driven by **special
//! tokens** rather than line-start patterns, and always runs over a bounded
//! token range (a heading's text, a paragraph's lines) set with
//! [`Parser::set_limit`].
//!
//! ## Dispatch Logic
//!
//! The [`inline`] function checks the current token:
//!
//! | Token | Possible Element |
//! |-------|-----------------|
//! | `*` `_` | Strong, emphasis |
//! | `` ` `` | Code span |
//! | `[` | Link, note reference |
//! | `!` | Image |
//! | `^` | Inline note |
//! | `<` | Autolink, raw HTML |
//! | `\` | Escaped punctuation |
//! | `.` `-` `"` `'` | Smart punctuation (smart extension) |
//! | (other) | Plain text |
//!
//! ## Error Tolerance
//!
//! An opener that finds no matching closer rolls back and is emitted as
//! literal text, so inline parsing never fails:
//! - `*a` is the text `*a`
//! - `[text]` with no matching reference definition is the text `[text]`
//! - an unclosed `` ` `` is a literal backtick
//!
//! Adjacent literal text merges into a single `STR`; whitespace inside a
//! line is part of that text. A soft line break is a `SPACE` holding `"\n"`,
//! a line ending in two or more spaces is a `LINEBREAK`.

use crate::element::{Contents, ElementKind, LinkTarget, RawText};
use crate::parser::{Parser, whitespace_width};
use crate::syntax_kind::SyntaxKind;

/// Parse inline content up to token index `end`.
///
/// This is the entry point called by block parsers.
pub(super) fn inlines(p: &mut Parser<'_, '_>, end: usize) {
    let previous = p.set_limit(end);
    while !p.at_end() {
        inline(p);
    }
    p.set_limit(previous);
}

/// Parse a single inline element. Always consumes at least one token.
fn inline(p: &mut Parser<'_, '_>) {
    let extensions = p.extensions();
    match p.current() {
        SyntaxKind::TEXT => p.bump_as_str(),
        SyntaxKind::WHITESPACE => whitespace(p),
        SyntaxKind::NEWLINE => soft_break(p),
        SyntaxKind::STAR | SyntaxKind::UNDERSCORE => {
            if !emphasis(p) {
                p.bump_as_str();
            }
        }
        SyntaxKind::BACKTICK => code_span(p),
        SyntaxKind::LBRACKET if extensions.notes && p.nth(1) == SyntaxKind::CARET => {
            if !note_reference(p) {
                p.bump_as_str();
            }
        }
        SyntaxKind::LBRACKET => {
            if !link(p, ElementKind::LINK) {
                p.bump_as_str();
            }
        }
        SyntaxKind::BANG if p.nth(1) == SyntaxKind::LBRACKET => {
            if !link(p, ElementKind::IMAGE) {
                p.bump_as_str();
            }
        }
        SyntaxKind::CARET if extensions.notes && p.nth(1) == SyntaxKind::LBRACKET => {
            if !inline_note(p) {
                p.bump_as_str();
            }
        }
        SyntaxKind::LT => {
            if !autolink(p) && !raw_html(p) {
                p.bump_as_str();
            }
        }
        SyntaxKind::BACKSLASH => escape(p),
        SyntaxKind::DOT | SyntaxKind::DASH | SyntaxKind::QUOTE | SyntaxKind::APOSTROPHE
            if extensions.smart =>
        {
            smart_punctuation(p)
        }
        _ => p.bump_as_str(),
    }
}

/// Kind of the token before the cursor.
fn previous(p: &Parser<'_, '_>) -> SyntaxKind {
    match p.pos() {
        0 => SyntaxKind::EOF,
        pos => p.kind_at(pos - 1),
    }
}

/// True if the token `n` ahead is text starting with a letter or digit.
fn alphanumeric_at(p: &Parser<'_, '_>, n: usize) -> bool {
    p.nth(n) == SyntaxKind::TEXT
        && p.text_at(p.pos() + n)
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric)
}

/// True if a token of `kind` appears later in the current range.
fn ahead(p: &Parser<'_, '_>, from: usize, kind: SyntaxKind) -> bool {
    (from..)
        .map(|n| p.nth(n))
        .take_while(|&k| k != SyntaxKind::EOF)
        .any(|k| k == kind)
}

fn whitespace(p: &mut Parser<'_, '_>) {
    let width = whitespace_width(p.current_text());
    match p.nth(1) {
        SyntaxKind::NEWLINE if width >= 2 => {
            p.bump_n(2);
            p.leaf(ElementKind::LINEBREAK, Contents::Empty);
            p.eat(SyntaxKind::WHITESPACE);
        }
        // Trailing whitespace belongs to the line ending
        SyntaxKind::NEWLINE | SyntaxKind::EOF => p.bump(),
        _ => {
            p.push_str(" ");
            p.bump();
        }
    }
}

fn soft_break(p: &mut Parser<'_, '_>) {
    p.bump();
    p.leaf(ElementKind::SPACE, Contents::text("\n"));
    p.eat(SyntaxKind::WHITESPACE);
}

fn escape(p: &mut Parser<'_, '_>) {
    if p.nth(1).is_punct() {
        p.bump();
    }
    p.bump_as_str();
}

// === Emphasis ===

/// Try strong, then emphasis, at a `*` or `_`.
fn emphasis(p: &mut Parser<'_, '_>) -> bool {
    let delim = p.current();
    // snake_case_words
    if delim == SyntaxKind::UNDERSCORE
        && previous(p) == SyntaxKind::TEXT
        && p.nth(1) == SyntaxKind::TEXT
    {
        return false;
    }
    if p.nth(1) == delim && strong(p, delim) {
        return true;
    }
    emph(p, delim)
}

fn can_open(p: &Parser<'_, '_>) -> bool {
    !matches!(
        p.current(),
        SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE | SyntaxKind::EOF
    )
}

/// A closing `_` may not be followed by more word characters.
fn can_close(p: &Parser<'_, '_>, delim: SyntaxKind, width: usize) -> bool {
    delim != SyntaxKind::UNDERSCORE || p.nth(width) != SyntaxKind::TEXT
}

fn emph(p: &mut Parser<'_, '_>, delim: SyntaxKind) -> bool {
    if !ahead(p, 1, delim) {
        return false;
    }
    let m = p.start();
    p.bump();
    if !can_open(p) {
        m.rollback(p);
        return false;
    }

    let content = p.pos();
    loop {
        if p.at_end() {
            m.rollback(p);
            return false;
        }
        if p.at(delim) {
            if p.nth(1) == delim && strong(p, delim) {
                continue;
            }
            if p.pos() > content && can_close(p, delim, 1) {
                p.bump();
                m.complete(p, ElementKind::EMPH);
                return true;
            }
        }
        inline(p);
    }
}

fn strong(p: &mut Parser<'_, '_>, delim: SyntaxKind) -> bool {
    if !ahead(p, 2, delim) {
        return false;
    }
    let m = p.start();
    p.bump_n(2);
    if !can_open(p) {
        m.rollback(p);
        return false;
    }

    let content = p.pos();
    loop {
        if p.at_end() {
            m.rollback(p);
            return false;
        }
        if p.at(delim) && p.nth(1) == delim && p.pos() > content && can_close(p, delim, 2) {
            p.bump_n(2);
            m.complete(p, ElementKind::STRONG);
            return true;
        }
        inline(p);
    }
}

// === Code ===

/// Parse a code span delimited by backtick runs of equal length.
fn code_span(p: &mut Parser<'_, '_>) {
    let start = p.pos();
    let ticks = (0..)
        .take_while(|&n| p.nth(n) == SyntaxKind::BACKTICK)
        .count();

    let mut n = ticks;
    loop {
        match p.nth(n) {
            SyntaxKind::EOF => {
                let run = p.text(start, start + ticks);
                p.push_str(&run);
                p.bump_n(ticks);
                return;
            }
            SyntaxKind::BACKTICK => {
                let run = (n..)
                    .take_while(|&k| p.nth(k) == SyntaxKind::BACKTICK)
                    .count();
                if run == ticks {
                    let code = p.text(start + ticks, start + n);
                    p.leaf(ElementKind::CODE, Contents::text(code.trim()));
                    p.bump_n(n + run);
                    return;
                }
                n += run;
            }
            _ => n += 1,
        }
    }
}

// === Links ===

/// Parse `[label]` followed by a destination, as a `LINK`, or `![alt]...` as
/// an `IMAGE`.
fn link(p: &mut Parser<'_, '_>, kind: ElementKind) -> bool {
    let m = p.start();
    if kind == ElementKind::IMAGE {
        p.bump();
    }
    let Some(label) = label(p) else {
        m.rollback(p);
        return false;
    };
    match destination(p, &label) {
        Some(target) => {
            m.complete_with(p, kind, Contents::Link(target));
            true
        }
        None => {
            m.rollback(p);
            false
        }
    }
}

/// Parse `[inlines]`, returning the raw label text. Emits the inlines.
fn label(p: &mut Parser<'_, '_>) -> Option<String> {
    let open = p.pos();
    if !ahead(p, 1, SyntaxKind::RBRACKET) {
        return None;
    }
    p.bump();
    loop {
        match p.current() {
            SyntaxKind::RBRACKET => {
                let text = p.text(open + 1, p.pos());
                p.bump();
                return Some(text);
            }
            SyntaxKind::EOF => return None,
            _ => inline(p),
        }
    }
}

/// Raw text of a `[label]` that is only used for lookup.
fn bracket_text(p: &mut Parser<'_, '_>) -> Option<String> {
    let open = p.pos();
    let mut n = 1;
    loop {
        match p.nth(n) {
            SyntaxKind::RBRACKET => break,
            SyntaxKind::LBRACKET | SyntaxKind::NEWLINE | SyntaxKind::EOF => return None,
            _ => n += 1,
        }
    }
    let text = p.text(open + 1, open + n);
    p.bump_n(n + 1);
    Some(text)
}

fn skip_spnl(p: &mut Parser<'_, '_>) {
    p.eat(SyntaxKind::WHITESPACE);
    if p.eat(SyntaxKind::NEWLINE) {
        p.eat(SyntaxKind::WHITESPACE);
    }
}

/// What follows a link label: `(url "title")`, `[label]`, `[]` or nothing.
fn destination(p: &mut Parser<'_, '_>, label: &str) -> Option<LinkTarget> {
    let after_label = p.checkpoint();

    if p.at(SyntaxKind::LPAREN) {
        if let Some(target) = explicit_destination(p) {
            return Some(target);
        }
        p.rewind(after_label);
    }

    skip_spnl(p);
    if p.at(SyntaxKind::LBRACKET) && p.nth(1) != SyntaxKind::RBRACKET {
        let found = bracket_text(p).and_then(|reference| p.tables().reference(&reference).cloned());
        if found.is_some() {
            return found;
        }
    }
    p.rewind(after_label);

    let target = p.tables().reference(label).cloned()?;
    let before_empty = p.checkpoint();
    skip_spnl(p);
    if p.at(SyntaxKind::LBRACKET) && p.nth(1) == SyntaxKind::RBRACKET {
        p.bump_n(2);
    } else {
        p.rewind(before_empty);
    }
    Some(target)
}

/// `(url "title")`, with the url optionally in angle brackets.
fn explicit_destination(p: &mut Parser<'_, '_>) -> Option<LinkTarget> {
    p.bump();
    p.eat(SyntaxKind::WHITESPACE);

    let url = if p.at(SyntaxKind::LT) {
        let start = p.pos() + 1;
        while !p.at(SyntaxKind::GT) {
            if p.at_end() || p.at(SyntaxKind::NEWLINE) {
                return None;
            }
            p.bump();
        }
        let url = p.text(start, p.pos());
        p.bump();
        url
    } else {
        let start = p.pos();
        let mut depth = 0usize;
        loop {
            match p.current() {
                SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE | SyntaxKind::EOF => break,
                SyntaxKind::RPAREN if depth == 0 => break,
                SyntaxKind::RPAREN => depth -= 1,
                SyntaxKind::LPAREN => depth += 1,
                _ => {}
            }
            p.bump();
        }
        p.text(start, p.pos())
    };

    skip_spnl(p);
    let title = match p.current() {
        SyntaxKind::QUOTE | SyntaxKind::APOSTROPHE => link_title(p)?,
        _ => String::new(),
    };
    p.eat(SyntaxKind::WHITESPACE);
    p.eat(SyntaxKind::RPAREN).then_some(LinkTarget { url, title })
}

/// A quoted title; the closing quote must be followed by `)`.
fn link_title(p: &mut Parser<'_, '_>) -> Option<String> {
    let quote = p.current();
    p.bump();
    let start = p.pos();
    loop {
        if p.at_end() {
            return None;
        }
        if p.at(quote) {
            let after = if p.nth(1) == SyntaxKind::WHITESPACE { 2 } else { 1 };
            if p.nth(after) == SyntaxKind::RPAREN {
                let title = p.text(start, p.pos());
                p.bump();
                return Some(title);
            }
        }
        p.bump();
    }
}

/// `<scheme://...>` or `<user@host>`.
fn autolink(p: &mut Parser<'_, '_>) -> bool {
    let mut n = 1;
    loop {
        match p.nth(n) {
            SyntaxKind::GT => break,
            SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE | SyntaxKind::EOF | SyntaxKind::LT => {
                return false;
            }
            _ => n += 1,
        }
    }
    let inner = p.text(p.pos() + 1, p.pos() + n);

    let is_url = inner.find("://").is_some_and(|scheme| {
        scheme > 0 && inner[..scheme].chars().all(|c| c.is_ascii_alphabetic())
    });
    let (url, shown) = if is_url {
        (inner.clone(), inner)
    } else if inner.contains('@') {
        let address = inner.strip_prefix("mailto:").unwrap_or(inner.as_str()).to_owned();
        (format!("mailto:{address}"), address)
    } else {
        return false;
    };

    let m = p.start();
    p.push_str(&shown);
    p.bump_n(n + 1);
    m.complete_with(
        p,
        ElementKind::LINK,
        Contents::Link(LinkTarget {
            url,
            title: String::new(),
        }),
    );
    true
}

/// An inline tag (`<b>`, `</span>`) or comment.
fn raw_html(p: &mut Parser<'_, '_>) -> bool {
    let len = if p.nth(1) == SyntaxKind::BANG
        && p.nth(2) == SyntaxKind::DASH
        && p.nth(3) == SyntaxKind::DASH
    {
        let mut n = 4;
        loop {
            match (p.nth(n), p.nth(n + 1), p.nth(n + 2)) {
                (SyntaxKind::EOF, _, _) => return false,
                (SyntaxKind::DASH, SyntaxKind::DASH, SyntaxKind::GT) => break n + 3,
                _ => n += 1,
            }
        }
    } else {
        let name = p.text_at(p.pos() + 1);
        let name = name.strip_prefix('/').unwrap_or(name);
        if p.nth(1) != SyntaxKind::TEXT || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return false;
        }
        let mut n = 2;
        loop {
            match p.nth(n) {
                SyntaxKind::GT => break n + 1,
                SyntaxKind::LT | SyntaxKind::EOF => return false,
                _ => n += 1,
            }
        }
    };

    let html = p.text(p.pos(), p.pos() + len);
    p.bump_n(len);
    if p.extensions().filter_html {
        p.leaf(ElementKind::LIST, Contents::Empty);
    } else {
        p.leaf(ElementKind::HTML, Contents::Text(html));
    }
    true
}

// === Notes ===

/// `[^label]`: a `NOTE` holding the note's text as a `RAW` child, or the
/// literal text if the label is not defined.
fn note_reference(p: &mut Parser<'_, '_>) -> bool {
    let start = p.pos();
    let mut n = 2;
    loop {
        match p.nth(n) {
            SyntaxKind::RBRACKET => break,
            SyntaxKind::LBRACKET | SyntaxKind::NEWLINE | SyntaxKind::EOF => return false,
            _ => n += 1,
        }
    }
    let label = p.text(start + 2, start + n);
    let note = p.tables().note(&label).map(str::to_owned);

    match note {
        Some(text) => {
            let mut raw = RawText::new();
            raw.push_text(&text);
            let m = p.start();
            p.leaf(ElementKind::RAW, Contents::Raw(raw));
            p.bump_n(n + 1);
            m.complete(p, ElementKind::NOTE);
        }
        None => {
            let literal = p.text(start, start + n + 1);
            p.push_str(&literal);
            p.bump_n(n + 1);
        }
    }
    true
}

/// `^[inlines]`: a `NOTE` whose children are the inlines.
fn inline_note(p: &mut Parser<'_, '_>) -> bool {
    let m = p.start();
    p.bump();
    match label(p) {
        Some(text) if !text.is_empty() => {
            m.complete(p, ElementKind::NOTE);
            true
        }
        _ => {
            m.rollback(p);
            false
        }
    }
}

// === Smart punctuation ===

fn smart_punctuation(p: &mut Parser<'_, '_>) {
    match p.current() {
        SyntaxKind::DOT if p.nth(1) == SyntaxKind::DOT && p.nth(2) == SyntaxKind::DOT => {
            p.bump_n(3);
            p.leaf(ElementKind::ELLIPSIS, Contents::Empty);
        }
        SyntaxKind::DASH if p.nth(1) == SyntaxKind::DASH => {
            let len = if p.nth(2) == SyntaxKind::DASH { 3 } else { 2 };
            p.bump_n(len);
            p.leaf(ElementKind::EMDASH, Contents::Empty);
        }
        SyntaxKind::DASH
            if p.nth(1) == SyntaxKind::TEXT
                && p.text_at(p.pos() + 1).starts_with(|c: char| c.is_ascii_digit()) =>
        {
            p.bump();
            p.leaf(ElementKind::ENDASH, Contents::Empty);
        }
        SyntaxKind::QUOTE => {
            if !double_quoted(p) {
                p.bump_as_str();
            }
        }
        SyntaxKind::APOSTROPHE => apostrophe(p),
        _ => p.bump_as_str(),
    }
}

fn apostrophe(p: &mut Parser<'_, '_>) {
    let inside_word = previous(p) == SyntaxKind::TEXT && alphanumeric_at(p, 1);
    if inside_word || !single_quoted(p) {
        p.bump();
        p.leaf(ElementKind::APOSTROPHE, Contents::Empty);
    }
}

/// A `'` that can open a quotation: not followed by space or closing
/// punctuation, and not the start of a contraction (`'s`, `'ll`, ...).
fn single_quote_start(p: &Parser<'_, '_>) -> bool {
    match p.nth(1) {
        SyntaxKind::TEXT => {
            let next = p.text_at(p.pos() + 1);
            if next.starts_with([',', ';', '?']) {
                return false;
            }
            !["s", "t", "m", "ve", "ll", "re"].iter().any(|&suffix| {
                next.strip_prefix(suffix)
                    .is_some_and(|rest| !rest.starts_with(char::is_alphanumeric))
            })
        }
        SyntaxKind::WHITESPACE
        | SyntaxKind::NEWLINE
        | SyntaxKind::EOF
        | SyntaxKind::RPAREN
        | SyntaxKind::RBRACKET
        | SyntaxKind::BANG
        | SyntaxKind::DOT
        | SyntaxKind::COLON
        | SyntaxKind::DASH => false,
        _ => true,
    }
}

fn single_quoted(p: &mut Parser<'_, '_>) -> bool {
    if !single_quote_start(p) || !ahead(p, 1, SyntaxKind::APOSTROPHE) {
        return false;
    }
    let m = p.start();
    p.bump();
    let content = p.pos();
    loop {
        if p.at_end() {
            m.rollback(p);
            return false;
        }
        if p.at(SyntaxKind::APOSTROPHE) && p.pos() > content && !alphanumeric_at(p, 1) {
            p.bump();
            m.complete(p, ElementKind::SINGLEQUOTED);
            return true;
        }
        inline(p);
    }
}

fn double_quoted(p: &mut Parser<'_, '_>) -> bool {
    if !ahead(p, 1, SyntaxKind::QUOTE) {
        return false;
    }
    let m = p.start();
    p.bump();
    let content = p.pos();
    loop {
        if p.at_end() {
            m.rollback(p);
            return false;
        }
        if p.at(SyntaxKind::QUOTE) {
            if p.pos() == content {
                m.rollback(p);
                return false;
            }
            p.bump();
            m.complete(p, ElementKind::DOUBLEQUOTED);
            return true;
        }
        inline(p);
    }
}
