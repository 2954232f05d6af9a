use crate::document::{ElementRef, SymbolTree};
use crate::registry::{IMAGE_CATALOG_GUID, MAIN_MENU_GUID, VISIBILITY_CONTEXTS};

use super::CompletionCandidate;

/// Every `GuidSymbol` name declared in `tree`, then the well-known guids that
/// make sense for the fragment's element.
pub(super) fn candidates(tree: &SymbolTree, fragment: ElementRef<'_>) -> Vec<CompletionCandidate> {
    let declared = tree
        .elements_named("GuidSymbol")
        .filter_map(|symbol| symbol.attribute("name"))
        .map(CompletionCandidate::symbol);

    declared.chain(well_known(fragment.name())).collect()
}

fn well_known(element_name: &str) -> Vec<CompletionCandidate> {
    let names: &[&str] = if element_name.eq_ignore_ascii_case("Parent") {
        &[MAIN_MENU_GUID]
    } else if element_name.eq_ignore_ascii_case("Icon") {
        &[IMAGE_CATALOG_GUID]
    } else if element_name.eq_ignore_ascii_case("VisibilityItem") {
        VISIBILITY_CONTEXTS
    } else {
        &[]
    };

    names.iter().map(|name| CompletionCandidate::symbol(name)).collect()
}
