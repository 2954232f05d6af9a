//! Parsed command-table documents.
//!
//! A [`SymbolTree`] is an owned, immutable copy of one file's element tree:
//! element names, attributes and, for whole documents, the position each
//! element and attribute was declared at. Trees are parsed once and replaced
//! when their source changes, so they can be shared between requests and
//! threads behind an `Arc`.
//!
//! Elements are stored in document order, which keeps every subtree in one
//! contiguous run and makes descendant queries a slice walk.

mod cache;
mod graph;

pub use cache::{CacheEntry, IncludeCache};
pub use graph::{normalize_path, DocumentGraph, GraphBuilder, BUNDLED_INCLUDE};

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use ropey::Rope;
use tower_lsp::lsp_types::Position;

use crate::classify::{lex_tag, SpanKind};
use crate::error::{Result, VsctError};
use crate::snapshot::position_at;

/// Index of an element inside its [`SymbolTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    /// Position of the attribute name, when parsed with position tracking.
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Local name, without any namespace prefix.
    pub name: String,
    pub attributes: Vec<Attribute>,
    /// Position of the element name, when parsed with position tracking.
    pub position: Option<Position>,
    parent: Option<ElementId>,
    /// One past the last element of this subtree.
    subtree_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTree {
    path: Option<PathBuf>,
    elements: Vec<Element>,
}

static NAMESPACE_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\sxmlns(:[^"=\s]+)?\s*=\s*"[^"]*""#).unwrap());

impl SymbolTree {
    /// Parse a whole document with position tracking.
    ///
    /// Namespace declarations are blanked out first; symbol lookup works on
    /// local names only.
    pub fn parse(text: &str) -> Result<SymbolTree> {
        let text = strip_namespaces(text);
        let doc = roxmltree::Document::parse_with_options(&text, parsing_options())
            .map_err(VsctError::DocumentUnparseable)?;

        let locator = Locator {
            text: &text,
            rope: Rope::from_str(&text),
        };

        let mut elements = Vec::new();
        collect(doc.root_element(), None, Some(&locator), &mut elements);

        Ok(SymbolTree {
            path: None,
            elements,
        })
    }

    /// Build a tree without positions from an already parsed node.
    pub(crate) fn from_node(node: roxmltree::Node<'_, '_>) -> SymbolTree {
        let mut elements = Vec::new();
        collect(node, None, None, &mut elements);

        SymbolTree {
            path: None,
            elements,
        }
    }

    /// A single nameless element without attributes.
    pub(crate) fn anonymous() -> SymbolTree {
        SymbolTree {
            path: None,
            elements: vec![Element {
                name: String::new(),
                attributes: Vec::new(),
                position: None,
                parent: None,
                subtree_end: 1,
            }],
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> SymbolTree {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn root(&self) -> ElementRef<'_> {
        ElementRef {
            tree: self,
            id: ElementId(0),
        }
    }

    pub fn element(&self, id: ElementId) -> ElementRef<'_> {
        ElementRef { tree: self, id }
    }

    /// Every element, in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        (0..self.elements.len()).map(|i| self.element(ElementId(i)))
    }

    /// Every element with the given local name (`//name`).
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.elements().filter(move |e| e.name() == name)
    }

    /// The element whose name was declared at `position`.
    pub fn element_at(&self, position: Position) -> Option<ElementRef<'_>> {
        self.elements().find(|e| e.position() == Some(position))
    }

    /// `href` values of every `Include` element, in declaration order.
    pub fn include_hrefs(&self) -> impl Iterator<Item = &str> + '_ {
        self.elements_named("Include")
            .filter_map(|include| include.attribute("href"))
    }
}

/// A borrowed handle to one element of a [`SymbolTree`].
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    tree: &'a SymbolTree,
    id: ElementId,
}

impl std::fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRef")
            .field("name", &self.name())
            .field("position", &self.position())
            .finish()
    }
}

impl<'a> ElementRef<'a> {
    pub fn id(&self) -> ElementId {
        self.id
    }

    fn data(&self) -> &'a Element {
        &self.tree.elements[self.id.0]
    }

    pub fn name(&self) -> &'a str {
        &self.data().name
    }

    pub fn attributes(&self) -> &'a [Attribute] {
        &self.data().attributes
    }

    pub fn attribute_node(&self, name: &str) -> Option<&'a Attribute> {
        self.attributes().iter().find(|a| a.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attribute_node(name).map(|a| a.value.as_str())
    }

    pub fn position(&self) -> Option<Position> {
        self.data().position
    }

    /// Where navigation to this element should land: its `name` attribute
    /// if that was position-tracked, else the element itself.
    pub fn declaration_position(&self) -> Option<Position> {
        self.attribute_node("name")
            .and_then(|a| a.position)
            .or_else(|| self.position())
    }

    pub fn parent(&self) -> Option<ElementRef<'a>> {
        self.data().parent.map(|id| self.tree.element(id))
    }

    pub fn children(&self) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let this = *self;
        self.descendants()
            .filter(move |e| e.data().parent == Some(this.id))
    }

    pub fn children_named(&self, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.children().filter(move |e| e.name() == name)
    }

    /// Every element below this one, in document order.
    pub fn descendants(&self) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let tree = self.tree;
        (self.id.0 + 1..self.data().subtree_end).map(move |i| tree.element(ElementId(i)))
    }

    pub fn descendants_named(&self, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.descendants().filter(move |e| e.name() == name)
    }
}

struct Locator<'t> {
    text: &'t str,
    rope: Rope,
}

impl Locator<'_> {
    fn element_position(&self, tag_start: usize) -> Position {
        // skip the `<`
        position_at(&self.rope, tag_start + 1)
    }

    /// Positions of the attribute names in the start tag at `tag_start`.
    fn attribute_positions(&self, tag_start: usize) -> Vec<(&str, Position)> {
        let mut spans = Vec::new();
        lex_tag(self.text, tag_start, &mut spans);

        spans
            .into_iter()
            .filter(|s| s.is(SpanKind::Attribute))
            .map(|s| (s.text(self.text), position_at(&self.rope, s.start)))
            .collect()
    }
}

fn collect(
    node: roxmltree::Node<'_, '_>,
    parent: Option<ElementId>,
    locator: Option<&Locator<'_>>,
    elements: &mut Vec<Element>,
) {
    let id = ElementId(elements.len());
    let tag_start = node.range().start;
    let attribute_positions = locator
        .map(|l| l.attribute_positions(tag_start))
        .unwrap_or_default();

    let attributes = node
        .attributes()
        .map(|attribute| Attribute {
            name: attribute.name().to_string(),
            value: attribute.value().to_string(),
            position: attribute_positions
                .iter()
                .find(|(qname, _)| local_name(qname) == attribute.name())
                .map(|(_, position)| *position),
        })
        .collect();

    elements.push(Element {
        name: node.tag_name().name().to_string(),
        attributes,
        position: locator.map(|l| l.element_position(tag_start)),
        parent,
        subtree_end: id.0 + 1,
    });

    for child in node.children().filter(|n| n.is_element()) {
        collect(child, Some(id), locator, elements);
    }

    elements[id.0].subtree_end = elements.len();
}

fn local_name(qname: &str) -> &str {
    qname.rsplit(':').next().unwrap_or(qname)
}

pub(crate) fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}

/// Blank out `xmlns` declarations, keeping every byte offset and line break
/// where it was so positions still match the editor buffer.
pub fn strip_namespaces(text: &str) -> Cow<'_, str> {
    if !text.contains("xmlns") {
        return Cow::Borrowed(text);
    }

    NAMESPACE_DECLARATION.replace_all(text, |caps: &Captures| {
        caps[0]
            .chars()
            .map(|c| match c {
                '\n' | '\r' => c.to_string(),
                _ => " ".repeat(c.len_utf8()),
            })
            .collect::<String>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<CommandTable xmlns="http://schemas.microsoft.com/VisualStudio/2005-10-18/CommandTable" xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <Commands package="guidPkg">
    <Buttons>
      <Button guid="guidFoo" id="cmdBar" priority="0x0100"/>
    </Buttons>
  </Commands>
  <Symbols>
    <GuidSymbol name="guidFoo" value="{00000000-0000-0000-0000-000000000001}">
      <IDSymbol name="cmdBar" value="0x0100" />
    </GuidSymbol>
  </Symbols>
</CommandTable>"#;

    #[test]
    fn parses_elements_in_document_order() {
        let tree = SymbolTree::parse(TABLE).unwrap();

        let names = tree.elements().map(|e| e.name()).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "CommandTable",
                "Commands",
                "Buttons",
                "Button",
                "Symbols",
                "GuidSymbol",
                "IDSymbol"
            ]
        );
    }

    #[test]
    fn tracks_element_and_attribute_positions() {
        let tree = SymbolTree::parse(TABLE).unwrap();
        let id_symbol = tree.elements_named("IDSymbol").next().unwrap();

        assert_eq!(
            id_symbol.position(),
            Some(Position {
                line: 9,
                character: 7
            })
        );
        assert_eq!(
            id_symbol.declaration_position(),
            Some(Position {
                line: 9,
                character: 16
            })
        );
    }

    #[test]
    fn namespace_stripping_keeps_offsets() {
        let stripped = strip_namespaces(TABLE);

        assert_eq!(stripped.len(), TABLE.len());
        assert!(!stripped.contains("xmlns"));
        assert_eq!(stripped.lines().count(), TABLE.lines().count());
    }

    #[test]
    fn text_without_namespaces_is_borrowed() {
        assert!(matches!(
            strip_namespaces("<CommandTable/>"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn subtree_queries() {
        let tree = SymbolTree::parse(TABLE).unwrap();
        let root = tree.root();

        let children = root.children().map(|e| e.name()).collect::<Vec<_>>();
        assert_eq!(children, vec!["Commands", "Symbols"]);

        let symbols = root.children_named("Symbols").next().unwrap();
        let ids = symbols
            .descendants_named("IDSymbol")
            .filter_map(|e| e.attribute("name"))
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["cmdBar"]);
        assert_eq!(
            symbols.descendants().next().and_then(|e| e.parent()).map(|e| e.name()),
            Some("Symbols")
        );
    }

    #[test]
    fn element_at_matches_name_position() {
        let tree = SymbolTree::parse(TABLE).unwrap();

        let button = tree.element_at(Position {
            line: 4,
            character: 7,
        });

        assert_eq!(button.map(|e| e.name()), Some("Button"));
        assert_eq!(button.and_then(|e| e.attribute("guid")), Some("guidFoo"));
    }

    #[test]
    fn invalid_document_is_unparseable() {
        let result = SymbolTree::parse("<CommandTable><Symbols></CommandTable>");

        assert!(matches!(result, Err(VsctError::DocumentUnparseable(_))));
    }

    #[test]
    fn include_hrefs_in_order() {
        let tree = SymbolTree::parse(
            r#"<CommandTable><Include href="a.vsct"/><Include/><Include href="b.vsct"/></CommandTable>"#,
        )
        .unwrap();

        assert_eq!(tree.include_hrefs().collect::<Vec<_>>(), vec!["a.vsct", "b.vsct"]);
    }
}
