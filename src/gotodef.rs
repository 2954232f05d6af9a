//! Go to the declaration of a guid or id.
//!
//! Only the root document is searched, and only its top-level
//! `CommandTable/Symbols/GuidSymbol` declarations. Names compare
//! case-insensitively. A lookup that does not find exactly one declaration
//! never guesses: it lands on the document's single `Symbols` container
//! instead, or nowhere if there is not exactly one.

use tower_lsp::lsp_types::Position;
use tracing::debug;

use crate::document::{ElementRef, SymbolTree};
use crate::error::{Result, VsctError};

const COMMAND_TABLE: &str = "CommandTable";

/// Resolve `attribute_name="value"` on `element` to a position in `root`.
pub fn resolve_definition(
    root: &SymbolTree,
    attribute_name: &str,
    element: ElementRef<'_>,
    value: &str,
) -> Option<Position> {
    if root.root().name() != COMMAND_TABLE {
        return None;
    }

    if attribute_name.eq_ignore_ascii_case("guid") {
        return guid_declaration(root, value).or_else(|| symbols_container(root));
    }

    if attribute_name.eq_ignore_ascii_case("id") {
        let guid = element.attribute("guid").filter(|guid| !guid.is_empty())?;

        return match unique_guid_symbol(root, guid) {
            Ok(symbol) => id_declaration(symbol, value).or_else(|| symbol.declaration_position()),
            Err(err) => {
                debug!(%err, "id lookup falls back to Symbols");
                symbols_container(root)
            }
        };
    }

    None
}

fn guid_declaration(root: &SymbolTree, value: &str) -> Option<Position> {
    if value.is_empty() {
        return None;
    }

    match unique_guid_symbol(root, value) {
        Ok(symbol) => symbol.declaration_position(),
        Err(err) => {
            debug!(%err, "guid lookup falls back to Symbols");
            None
        }
    }
}

fn id_declaration(symbol: ElementRef<'_>, value: &str) -> Option<Position> {
    if value.is_empty() {
        return None;
    }

    let mut ids = symbol
        .descendants_named("IDSymbol")
        .filter(|id| has_name(*id, value));

    match (ids.next(), ids.next()) {
        (Some(id), None) => id.declaration_position(),
        _ => None,
    }
}

/// The one top-level `GuidSymbol` named `name`.
pub fn unique_guid_symbol<'a>(root: &'a SymbolTree, name: &str) -> Result<ElementRef<'a>> {
    let matches = root
        .root()
        .children_named("Symbols")
        .flat_map(|symbols| symbols.children_named("GuidSymbol"))
        .filter(|symbol| has_name(*symbol, name))
        .collect::<Vec<_>>();

    match matches.as_slice() {
        [symbol] => Ok(*symbol),
        _ => Err(VsctError::AmbiguousSymbol {
            name: name.to_string(),
            found: matches.len(),
        }),
    }
}

fn symbols_container(root: &SymbolTree) -> Option<Position> {
    let mut containers = root.root().children_named("Symbols");

    match (containers.next(), containers.next()) {
        (Some(symbols), None) => symbols.position(),
        _ => None,
    }
}

fn has_name(element: ElementRef<'_>, name: &str) -> bool {
    element
        .attribute("name")
        .is_some_and(|n| n.eq_ignore_ascii_case(name))
}
