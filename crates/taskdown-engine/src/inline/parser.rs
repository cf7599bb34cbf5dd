use crate::model::{Mark, Node};

use super::{
    cursor::Cursor,
    kinds::{CodeSpan, Emphasis, Link, Strike, Strong},
};

/// Parses a leaf text run into a sequence of styled text leaves.
///
/// # Recognized spans
/// Left-to-right, non-overlapping: inline code (raw zone, checked first),
/// links, bold, strikethrough, italic. A delimiter that never closes, or
/// that closes immediately with empty content, is emitted verbatim as
/// literal text.
///
/// # Totality
/// The parser never fails and never drops characters: concatenating the
/// text of the returned leaves reproduces the input with only the
/// delimiters of recognized spans removed.
pub fn parse_inline(text: &str) -> Vec<Node> {
    parse_with_marks(text, &[])
}

/// Recursive worker: `active` is the mark stack inherited from enclosing
/// spans (a link label being parsed for bold, bold text for italic, ...).
fn parse_with_marks(text: &str, active: &[Mark]) -> Vec<Node> {
    let mut cur = Cursor::new(text);
    let mut out = Vec::new();
    let mut text_start = 0;

    while !cur.eof() {
        let span_start = cur.pos();

        // Raw zone first: backticks suppress every other span.
        if let Some(inner) = try_parse_code_span(&mut cur) {
            flush_text(&mut out, text, text_start, span_start, active);
            out.push(Node::styled_text(inner, marks_with(active, Mark::code())));
            text_start = cur.pos();
            continue;
        }
        if let Some((label, url)) = try_parse_link(&mut cur) {
            flush_text(&mut out, text, text_start, span_start, active);
            out.extend(parse_with_marks(label, &marks_with(active, Mark::link(url))));
            text_start = cur.pos();
            continue;
        }
        if let Some(inner) = try_parse_delimited(&mut cur, Strong::DELIM) {
            flush_text(&mut out, text, text_start, span_start, active);
            out.extend(parse_with_marks(inner, &marks_with(active, Mark::bold())));
            text_start = cur.pos();
            continue;
        }
        if let Some(inner) = try_parse_delimited(&mut cur, Strike::DELIM) {
            flush_text(&mut out, text, text_start, span_start, active);
            out.extend(parse_with_marks(inner, &marks_with(active, Mark::strike())));
            text_start = cur.pos();
            continue;
        }
        if let Some(inner) = try_parse_delimited(&mut cur, Emphasis::STAR)
            .or_else(|| try_parse_delimited(&mut cur, Emphasis::UNDERSCORE))
        {
            flush_text(&mut out, text, text_start, span_start, active);
            out.extend(parse_with_marks(inner, &marks_with(active, Mark::italic())));
            text_start = cur.pos();
            continue;
        }

        cur.bump();
    }

    flush_text(&mut out, text, text_start, cur.pos(), active);
    out
}

fn flush_text(out: &mut Vec<Node>, text: &str, start: usize, end: usize, active: &[Mark]) {
    if end > start {
        out.push(Node::styled_text(&text[start..end], active.to_vec()));
    }
}

fn marks_with(active: &[Mark], extra: Mark) -> Vec<Mark> {
    let mut marks = active.to_vec();
    marks.push(extra);
    marks
}

/// Attempts to parse a code span at the current position.
///
/// Returns the raw inner text; content between backticks is never parsed
/// further. `None` if not at a backtick, the span is unclosed, or the
/// span is empty. On failure the cursor is restored.
fn try_parse_code_span<'a>(cur: &mut Cursor<'a>) -> Option<&'a str> {
    if cur.peek() != Some(CodeSpan::TICK) {
        return None;
    }

    let saved = cur.clone();
    cur.bump();
    let inner_start = cur.pos();

    while !cur.eof() && cur.peek() != Some(CodeSpan::TICK) {
        cur.bump();
    }
    let inner_end = cur.pos();

    if cur.eof() || inner_end == inner_start {
        *cur = saved;
        return None;
    }
    cur.bump();
    Some(cur.slice(inner_start, inner_end))
}

/// Attempts to parse `[label](url)` at the current position.
///
/// The label may itself carry other spans; the caller re-parses it. The
/// url is returned raw. On failure the cursor is restored.
fn try_parse_link<'a>(cur: &mut Cursor<'a>) -> Option<(&'a str, &'a str)> {
    if cur.peek() != Some(Link::LABEL_OPEN) {
        return None;
    }

    let saved = cur.clone();
    cur.bump();
    let label_start = cur.pos();
    while !cur.eof() && cur.peek() != Some(Link::LABEL_CLOSE) {
        cur.bump();
    }
    if cur.eof() {
        *cur = saved;
        return None;
    }
    let label_end = cur.pos();
    cur.bump();

    if cur.peek() != Some(Link::URL_OPEN) {
        *cur = saved;
        return None;
    }
    cur.bump();
    let url_start = cur.pos();
    while !cur.eof() && cur.peek() != Some(Link::URL_CLOSE) {
        cur.bump();
    }
    if cur.eof() {
        *cur = saved;
        return None;
    }
    let url_end = cur.pos();
    cur.bump();

    Some((
        cur.slice(label_start, label_end),
        cur.slice(url_start, url_end),
    ))
}

/// Attempts to parse a symmetric delimited span (`**`, `~~`, `*`, `_`).
///
/// Requires non-empty inner content and a closing delimiter; otherwise
/// restores the cursor so the opener falls through as literal text.
fn try_parse_delimited<'a>(cur: &mut Cursor<'a>, delim: &[u8]) -> Option<&'a str> {
    if !cur.starts_with(delim) {
        return None;
    }

    let saved = cur.clone();
    cur.bump_n(delim.len());
    let inner_start = cur.pos();

    while !cur.eof() && !cur.starts_with(delim) {
        cur.bump();
    }
    let inner_end = cur.pos();

    if cur.eof() || inner_end == inner_start {
        *cur = saved;
        return None;
    }
    cur.bump_n(delim.len());
    Some(cur.slice(inner_start, inner_end))
}
