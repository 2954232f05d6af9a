//! Lexical classification of command-table text.
//!
//! The resolvers only need to know what kind of token sits around the caret,
//! never a full parse. A [`Classifier`] tags spans of the current text with a
//! [`SpanKind`]. Editors that already classify XML can implement the trait
//! themselves; the language server uses [`XmlClassifier`].
//!
//! The tagger is deliberately lenient: it never fails, and an unterminated
//! tag, comment or attribute value is classified up to the end of the input
//! (an unclosed value stops early at the next `<`).
//!
//! For `<Button guid="guidFoo"/>` the spans are:
//!
//! | text | kind |
//! |------|------|
//! | `<` | Other |
//! | `Button` | Name |
//! | `guid` | Attribute |
//! | `=` | Other |
//! | `"` | AttributeQuote |
//! | `guidFoo` | AttributeValue |
//! | `"` | AttributeQuote |
//! | `/>` | Other |

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    /// Element name in a start or end tag.
    Name,
    /// Attribute name.
    Attribute,
    /// Attribute value, without its quotes.
    AttributeValue,
    /// A single quote character around an attribute value.
    AttributeQuote,
    /// Delimiters, text, comments and everything else.
    Other,
}

/// A typed span of text, in byte offsets of the classified text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedSpan {
    pub kind: SpanKind,
    pub start: usize,
    pub len: usize,
}

impl ClassifiedSpan {
    pub fn new(kind: SpanKind, start: usize, len: usize) -> Self {
        ClassifiedSpan { kind, start, len }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    pub fn text<'t>(&self, text: &'t str) -> &'t str {
        text.get(self.range()).unwrap_or_default()
    }

    pub fn is(&self, kind: SpanKind) -> bool {
        self.kind == kind
    }
}

/// Host seam for lexical classification.
///
/// Returns the spans intersecting `span`, ordered by position and clipped to it.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str, span: Range<usize>) -> Vec<ClassifiedSpan>;
}

/// Built-in lexical tagger for XML.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlClassifier;

impl Classifier for XmlClassifier {
    fn classify(&self, text: &str, span: Range<usize>) -> Vec<ClassifiedSpan> {
        // Lex from the top: a line in the middle of a multi-line start tag
        // cannot be classified on its own.
        lex(text)
            .into_iter()
            .filter_map(|s| clip(s, &span))
            .collect()
    }
}

fn clip(span: ClassifiedSpan, to: &Range<usize>) -> Option<ClassifiedSpan> {
    let start = span.start.max(to.start);
    let end = span.end().min(to.end);

    (start < end).then(|| ClassifiedSpan::new(span.kind, start, end - start))
}

/// Classify the whole text.
pub fn lex(text: &str) -> Vec<ClassifiedSpan> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            let end = find(text, pos, "<").unwrap_or(bytes.len());
            push_text(text, pos..end, &mut spans);
            pos = end;
            continue;
        }

        let rest = &text[pos..];
        let markup_end = if rest.starts_with("<!--") {
            Some(skip_past(text, pos, "-->"))
        } else if rest.starts_with("<![CDATA[") {
            Some(skip_past(text, pos, "]]>"))
        } else if rest.starts_with("<?") {
            Some(skip_past(text, pos, "?>"))
        } else if rest.starts_with("<!") {
            Some(skip_past(text, pos, ">"))
        } else {
            None
        };

        pos = match markup_end {
            Some(end) => {
                spans.push(ClassifiedSpan::new(SpanKind::Other, pos, end - pos));
                end
            }
            None => lex_tag(text, pos, &mut spans),
        };
    }

    spans
}

/// Classify one start or end tag beginning at the `<` at `pos`.
///
/// Returns the offset just past the tag, or the offset of the `<` that
/// interrupted it.
pub fn lex_tag(text: &str, mut pos: usize, spans: &mut Vec<ClassifiedSpan>) -> usize {
    let bytes = text.as_bytes();

    let open = if bytes.get(pos + 1) == Some(&b'/') { 2 } else { 1 };
    spans.push(ClassifiedSpan::new(SpanKind::Other, pos, open));
    pos += open;

    let name_end = scan_name(bytes, pos);
    if name_end > pos {
        spans.push(ClassifiedSpan::new(SpanKind::Name, pos, name_end - pos));
        pos = name_end;
    }

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        let Some(&byte) = bytes.get(pos) else {
            return pos;
        };

        match byte {
            b'>' => {
                spans.push(ClassifiedSpan::new(SpanKind::Other, pos, 1));
                return pos + 1;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'>') => {
                spans.push(ClassifiedSpan::new(SpanKind::Other, pos, 2));
                return pos + 2;
            }
            b'<' => return pos,
            b'=' => {
                spans.push(ClassifiedSpan::new(SpanKind::Other, pos, 1));
                pos += 1;
            }
            b'"' | b'\'' => pos = lex_value(bytes, pos, spans),
            _ => {
                let end = scan_name(bytes, pos);
                if end > pos {
                    spans.push(ClassifiedSpan::new(SpanKind::Attribute, pos, end - pos));
                    pos = end;
                } else {
                    // stray `/`
                    spans.push(ClassifiedSpan::new(SpanKind::Other, pos, 1));
                    pos += 1;
                }
            }
        }
    }
}

fn lex_value(bytes: &[u8], pos: usize, spans: &mut Vec<ClassifiedSpan>) -> usize {
    let quote = bytes[pos];
    spans.push(ClassifiedSpan::new(SpanKind::AttributeQuote, pos, 1));

    let value_start = pos + 1;
    let stop = bytes[value_start..]
        .iter()
        .position(|&b| b == quote || b == b'<')
        .map(|i| value_start + i)
        .unwrap_or(bytes.len());

    if stop > value_start {
        spans.push(ClassifiedSpan::new(
            SpanKind::AttributeValue,
            value_start,
            stop - value_start,
        ));
    }

    match bytes.get(stop) {
        Some(&b) if b == quote => {
            spans.push(ClassifiedSpan::new(SpanKind::AttributeQuote, stop, 1));
            stop + 1
        }
        _ => stop,
    }
}

fn scan_name(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b.is_ascii_whitespace() || matches!(b, b'>' | b'/' | b'<' | b'=' | b'"' | b'\''))
        .map(|i| from + i)
        .unwrap_or(bytes.len())
}

fn push_text(text: &str, range: Range<usize>, spans: &mut Vec<ClassifiedSpan>) {
    let run = &text[range.clone()];
    let trimmed = run.trim_start();
    let start = range.start + (run.len() - trimmed.len());
    let len = trimmed.trim_end().len();

    if len > 0 {
        spans.push(ClassifiedSpan::new(SpanKind::Other, start, len));
    }
}

fn find(text: &str, from: usize, needle: &str) -> Option<usize> {
    text[from..].find(needle).map(|i| from + i)
}

fn skip_past(text: &str, from: usize, terminator: &str) -> usize {
    find(text, from, terminator)
        .map(|i| i + terminator.len())
        .unwrap_or(text.len())
}
