//! Which attribute value is the caret in?
//!
//! Both resolvers read classified spans rather than a parse tree, because the
//! text around the caret is usually half typed. They rely on the fixed
//! lexical shape of an attribute:
//!
//! ```text
//! Attribute  Other(=)  AttributeQuote  AttributeValue  AttributeQuote
//! id         =         "               cmdBar          "
//! ```
//!
//! so the attribute naming a value is always three spans before it.

use std::ops::Range;

use crate::classify::{ClassifiedSpan, SpanKind};
use crate::document::{ElementId, SymbolTree};
use crate::snapshot::Snapshot;

/// Spans between an attribute name and its value.
const ATTRIBUTE_TO_VALUE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeContext {
    pub attribute_name: String,
    /// Name of the element the attribute belongs to, when its start tag is in
    /// the classified spans.
    pub element_name: Option<String>,
    /// Byte range of the value text, without quotes. Empty for `""`.
    pub value_extent: Range<usize>,
}

/// Resolve the attribute being completed at `caret`.
///
/// `line_spans` are the classified spans of the caret line. The token just
/// before the caret must be an attribute value.
pub fn resolve_context(
    text: &str,
    line_spans: &[ClassifiedSpan],
    caret: usize,
) -> Option<AttributeContext> {
    let before = caret.checked_sub(1)?;
    line_spans
        .iter()
        .find(|s| s.start <= before && before < s.end())
        .filter(|s| s.is(SpanKind::AttributeValue))?;

    let value_index = line_spans
        .iter()
        .position(|s| s.is(SpanKind::AttributeValue) && s.start <= caret && caret <= s.end())?;
    let attribute = line_spans.get(value_index.checked_sub(ATTRIBUTE_TO_VALUE)?)?;
    if !attribute.is(SpanKind::Attribute) {
        return None;
    }

    Some(AttributeContext {
        attribute_name: attribute.text(text).to_string(),
        element_name: element_name_before(text, &line_spans[..value_index]),
        value_extent: line_spans[value_index].range(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
    pub context: AttributeContext,
    /// The element whose start tag holds the attribute.
    pub element: ElementId,
    pub value: String,
}

/// Resolve the attribute value under `caret` and the element declaring it.
///
/// `spans` classify the whole snapshot and `tree` is the parsed snapshot. An
/// empty value (`""`) resolves when the caret is between its quotes.
pub fn resolve_navigation_context(
    snapshot: &Snapshot,
    spans: &[ClassifiedSpan],
    caret: usize,
    tree: &SymbolTree,
) -> Option<NavigationContext> {
    let open = spans
        .iter()
        .rposition(|s| s.is(SpanKind::AttributeQuote) && s.start < caret)?;
    let open_quote = spans[open];

    let value_extent = match (spans.get(open + 1), spans.get(open + 2)) {
        (Some(close), _) if close.is(SpanKind::AttributeQuote) && close.start == open_quote.end() => {
            if caret != open_quote.end() {
                return None;
            }
            caret..caret
        }
        (Some(value), Some(close))
            if value.is(SpanKind::AttributeValue)
                && close.is(SpanKind::AttributeQuote)
                && caret <= close.start =>
        {
            value.range()
        }
        _ => return None,
    };

    let attribute = spans.get(open.checked_sub(ATTRIBUTE_TO_VALUE - 1)?)?;
    if !attribute.is(SpanKind::Attribute) {
        return None;
    }

    let text = snapshot.text();
    let name = spans[..open].iter().rev().find(|s| s.is(SpanKind::Name))?;
    let element = tree.element_at(snapshot.position_at(name.start))?;

    Some(NavigationContext {
        context: AttributeContext {
            attribute_name: attribute.text(text).to_string(),
            element_name: Some(element.name().to_string()),
            value_extent: value_extent.clone(),
        },
        element: element.id(),
        value: text.get(value_extent).unwrap_or_default().to_string(),
    })
}

fn element_name_before(text: &str, spans: &[ClassifiedSpan]) -> Option<String> {
    spans
        .iter()
        .rev()
        .find(|s| s.is(SpanKind::Name))
        .map(|s| s.text(text).to_string())
}
